use once_cell::sync::Lazy;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use std::net::TcpListener;
use std::process::{Child, Command, Stdio};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;
use tokio::time::sleep;

#[derive(Debug, Deserialize)]
struct NavigationResponse {
    current: String,
    history: Vec<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ClassDetails {
    id: String,
    name: String,
    schedule: Vec<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AttendanceRecord {
    date: String,
    class_id: String,
    status: String,
    biometric_done: bool,
}

#[derive(Debug, Deserialize)]
struct AnalyticsResponse {
    range: String,
    last_7_days: Vec<serde_json::Value>,
    weekly_totals: Vec<serde_json::Value>,
}

struct TestServer {
    base_url: String,
    data_path: String,
    child: Child,
}

impl Drop for TestServer {
    fn drop(&mut self) {
        let _ = self.child.kill();
        let _ = self.child.wait();
        let _ = std::fs::remove_file(&self.data_path);
    }
}

static TEST_LOCK: Lazy<Mutex<()>> = Lazy::new(|| Mutex::new(()));
static SERVER: Lazy<Mutex<Option<Arc<TestServer>>>> = Lazy::new(|| Mutex::new(None));

#[cfg(unix)]
mod cleanup {
    use std::sync::Once;
    use std::sync::atomic::{AtomicI32, Ordering};

    static REGISTER: Once = Once::new();
    static PID: AtomicI32 = AtomicI32::new(0);

    pub fn register(pid: u32) {
        REGISTER.call_once(|| {
            PID.store(pid as i32, Ordering::SeqCst);
            unsafe {
                libc::atexit(on_exit);
            }
        });
    }

    extern "C" fn on_exit() {
        let pid = PID.load(Ordering::SeqCst);
        if pid > 0 {
            unsafe {
                libc::kill(pid, libc::SIGTERM);
            }
        }
    }
}

fn pick_free_port() -> u16 {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind random port");
    let port = listener.local_addr().unwrap().port();
    drop(listener);
    port
}

fn unique_data_path() -> String {
    let nanos = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap()
        .as_nanos();
    let mut path = std::env::temp_dir();
    path.push(format!("attendify_http_{}_{}.json", std::process::id(), nanos));
    path.to_string_lossy().to_string()
}

async fn wait_until_ready(base_url: &str) {
    let client = Client::new();
    let deadline = Instant::now() + Duration::from_secs(3);
    loop {
        if let Ok(resp) = client.get(format!("{base_url}/api/nav")).send().await {
            if resp.status().is_success() {
                return;
            }
        }
        if Instant::now() > deadline {
            panic!("server did not become ready");
        }
        sleep(Duration::from_millis(100)).await;
    }
}

async fn spawn_server() -> TestServer {
    let port = pick_free_port();
    let data_path = unique_data_path();
    let child = Command::new(env!("CARGO_BIN_EXE_attendify"))
        .env("PORT", port.to_string())
        .env("APP_DATA_PATH", &data_path)
        .env("RUST_LOG", "info")
        .stdout(Stdio::inherit())
        .stderr(Stdio::inherit())
        .spawn()
        .expect("failed to spawn server");

    #[cfg(unix)]
    cleanup::register(child.id());

    let base_url = format!("http://127.0.0.1:{port}");
    wait_until_ready(&base_url).await;

    TestServer {
        base_url,
        data_path,
        child,
    }
}

async fn shared_server() -> Arc<TestServer> {
    let mut guard = SERVER.lock().await;
    if let Some(server) = guard.as_ref() {
        return Arc::clone(server);
    }
    let server = Arc::new(spawn_server().await);
    *guard = Some(Arc::clone(&server));
    server
}

async fn navigate(client: &Client, base_url: &str, view: &str) -> NavigationResponse {
    client
        .post(format!("{base_url}/api/nav"))
        .json(&serde_json::json!({ "view": view }))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap()
}

async fn back(client: &Client, base_url: &str) -> NavigationResponse {
    client
        .post(format!("{base_url}/api/nav/back"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap()
}

#[tokio::test]
async fn http_back_navigation_returns_to_dashboard() {
    let server = spawn_server().await;
    let client = Client::new();
    let base = server.base_url.as_str();

    navigate(&client, base, "classes").await;
    let nav = navigate(&client, base, "analytics").await;
    assert_eq!(nav.current, "analytics");
    assert_eq!(nav.history, vec!["dashboard", "classes"]);

    assert_eq!(back(&client, base).await.current, "classes");
    assert_eq!(back(&client, base).await.current, "dashboard");
    let nav = back(&client, base).await;
    assert_eq!(nav.current, "dashboard");
    assert!(nav.history.is_empty());

    let response = client
        .post(format!("{base}/api/nav"))
        .json(&serde_json::json!({ "view": "nowhere" }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn http_index_renders_current_view() {
    let server = spawn_server().await;
    let client = Client::new();
    let base = server.base_url.as_str();

    navigate(&client, base, "settings").await;
    let html = client.get(format!("{base}/")).send().await.unwrap().text().await.unwrap();
    assert!(html.contains(r#"data-view="settings""#));
    assert!(html.contains(r#"data-theme="cosmic""#));
}

#[tokio::test]
async fn http_class_and_attendance_flow() {
    let _guard = TEST_LOCK.lock().await;
    let server = shared_server().await;
    let client = Client::new();
    let base = server.base_url.as_str();

    let response = client
        .post(format!("{base}/api/classes"))
        .json(&serde_json::json!({
            "name": "Chemistry",
            "room": "Lab 1",
            "teacher": "Dr. Curie",
            "schedule": ["Monday", "Thursday"],
            "startTime": "09:00",
            "endTime": "10:00"
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    let class: ClassDetails = response.json().await.unwrap();
    assert_eq!(class.name, "Chemistry");
    assert_eq!(class.schedule, vec!["Monday", "Thursday"]);

    for status in ["missed", "attended"] {
        let response = client
            .put(format!("{base}/api/attendance"))
            .json(&serde_json::json!({
                "date": "2024-05-01",
                "classId": class.id,
                "status": status,
                "biometricDone": true
            }))
            .send()
            .await
            .unwrap();
        assert!(response.status().is_success());
    }

    let records: Vec<AttendanceRecord> = client
        .get(format!("{base}/api/attendance?classId={}", class.id))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].date, "2024-05-01");
    assert_eq!(records[0].class_id, class.id);
    assert_eq!(records[0].status, "attended");
    assert!(records[0].biometric_done);

    let response = client
        .post(format!("{base}/api/classes"))
        .json(&serde_json::json!({
            "name": "Backwards",
            "schedule": ["Friday"],
            "startTime": "11:00",
            "endTime": "10:00"
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn http_analytics_rejects_unknown_range() {
    let _guard = TEST_LOCK.lock().await;
    let server = shared_server().await;
    let client = Client::new();
    let base = server.base_url.as_str();

    let stats: AnalyticsResponse = client
        .get(format!("{base}/api/analytics?range=monthly"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(stats.range, "monthly");
    assert_eq!(stats.last_7_days.len(), 7);
    assert_eq!(stats.weekly_totals.len(), 8);

    let response = client
        .get(format!("{base}/api/analytics?range=yearly"))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn http_theme_persists_to_disk() {
    let _guard = TEST_LOCK.lock().await;
    let server = shared_server().await;
    let client = Client::new();

    let response = client
        .put(format!("{}/api/theme", server.base_url))
        .json(&serde_json::json!({ "theme": "aurora" }))
        .send()
        .await
        .unwrap();
    assert!(response.status().is_success());

    let saved: serde_json::Value =
        serde_json::from_slice(&std::fs::read(&server.data_path).unwrap()).unwrap();
    assert_eq!(saved["theme"], "aurora");
    assert!(saved["dailyBiometrics"].is_array());
}

#[tokio::test]
async fn http_import_and_reset_round_trip() {
    let server = spawn_server().await;
    let client = Client::new();
    let base = server.base_url.as_str();

    let record = serde_json::json!({
        "date": "2024-05-01",
        "classId": "c1",
        "status": "attended",
        "biometricDone": false
    });
    let document = |attendance: Vec<serde_json::Value>| {
        serde_json::json!({
            "classes": [{
                "id": "c1",
                "name": "Biology",
                "room": "L2",
                "teacher": "Dr. Franklin",
                "schedule": ["Wednesday"],
                "startTime": "13:00",
                "endTime": "14:00"
            }],
            "attendance": attendance,
            "holidays": [],
            "dailyBiometrics": ["2024-05-01"],
            "theme": "onyx"
        })
    };

    let response = client
        .put(format!("{base}/api/data"))
        .json(&document(vec![record.clone(), record.clone()]))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = client
        .put(format!("{base}/api/data"))
        .json(&document(vec![record]))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let exported: serde_json::Value = client
        .get(format!("{base}/api/data"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(exported["theme"], "onyx");
    assert_eq!(exported["attendance"].as_array().unwrap().len(), 1);

    let response = client
        .delete(format!("{base}/api/data"))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NO_CONTENT);
    let exported: serde_json::Value = client
        .get(format!("{base}/api/data"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(exported["theme"], "cosmic");
    assert!(exported["classes"].as_array().unwrap().is_empty());
    assert!(exported["attendance"].as_array().unwrap().is_empty());
    assert!(exported["dailyBiometrics"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn http_holidays_create_list_delete() {
    let _guard = TEST_LOCK.lock().await;
    let server = shared_server().await;
    let client = Client::new();
    let base = server.base_url.as_str();

    let response = client
        .post(format!("{base}/api/holidays"))
        .json(&serde_json::json!({ "date": "2024-08-15", "description": "Founders day" }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    let holiday: serde_json::Value = response.json().await.unwrap();
    let id = holiday["id"].as_str().unwrap().to_string();

    let holidays: Vec<serde_json::Value> = client
        .get(format!("{base}/api/holidays"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert!(holidays.iter().any(|h| h["id"] == id.as_str()));

    let response = client
        .delete(format!("{base}/api/holidays/{id}"))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NO_CONTENT);
    let response = client
        .delete(format!("{base}/api/holidays/{id}"))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn http_biometrics_toggle() {
    let _guard = TEST_LOCK.lock().await;
    let server = shared_server().await;
    let client = Client::new();
    let base = server.base_url.as_str();

    for expected in [true, false] {
        let toggled: serde_json::Value = client
            .post(format!("{base}/api/biometrics/2023-02-14"))
            .send()
            .await
            .unwrap()
            .json()
            .await
            .unwrap();
        assert_eq!(toggled["date"], "2023-02-14");
        assert_eq!(toggled["done"], expected);
    }

    let response = client
        .post(format!("{base}/api/biometrics/yesterday"))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn http_delete_form_posts_id_in_body() {
    let _guard = TEST_LOCK.lock().await;
    let server = shared_server().await;
    let client = Client::new();
    let base = server.base_url.as_str();

    let class: ClassDetails = client
        .post(format!("{base}/api/classes"))
        .json(&serde_json::json!({
            "name": "Geography",
            "schedule": ["Tuesday"],
            "startTime": "10:00",
            "endTime": "11:00"
        }))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();

    navigate(&client, base, "classes").await;
    let html = client.get(format!("{base}/")).send().await.unwrap().text().await.unwrap();
    assert!(html.contains(&format!(r#"name="id" value="{}""#, class.id)));

    let response = client
        .post(format!("{base}/classes/delete"))
        .form(&[("id", class.id.as_str())])
        .send()
        .await
        .unwrap();
    assert!(response.status().is_success());
    let classes: Vec<ClassDetails> = client
        .get(format!("{base}/api/classes"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert!(classes.iter().all(|c| c.id != class.id));
}
