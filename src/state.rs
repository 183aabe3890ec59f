use crate::errors::AppError;
use crate::models::{
    AppData, AppTheme, AttendanceRecord, ClassDetails, Holiday, NavigationResponse,
};
use crate::navigation::{AppView, Navigator};
use crate::storage::persist_data;
use std::{path::PathBuf, sync::Arc};
use tokio::sync::Mutex;
use tracing::{debug, error};

/// Sole owner of the in-memory data and navigation state. All writes go
/// through `commit` or `replace`, which swap in a new `AppData` and save it.
#[derive(Clone)]
pub struct AppState {
    pub data_path: PathBuf,
    data: Arc<Mutex<AppData>>,
    nav: Arc<Mutex<Navigator>>,
}

impl AppState {
    pub fn new(data_path: PathBuf, data: AppData, history_limit: usize) -> Self {
        Self {
            data_path,
            data: Arc::new(Mutex::new(data)),
            nav: Arc::new(Mutex::new(Navigator::with_limit(history_limit))),
        }
    }

    pub async fn snapshot(&self) -> AppData {
        self.data.lock().await.clone()
    }

    async fn commit<T>(
        &self,
        update: impl FnOnce(&AppData) -> Result<(AppData, T), AppError>,
    ) -> Result<T, AppError> {
        let mut data = self.data.lock().await;
        let (next, output) = update(&*data)?;
        self.install(&mut data, next).await;
        Ok(output)
    }

    async fn replace(&self, update: impl FnOnce(&AppData) -> AppData) {
        let mut data = self.data.lock().await;
        let next = update(&*data);
        self.install(&mut data, next).await;
    }

    /// A failed save is logged and the new data is kept in memory.
    async fn install(&self, data: &mut AppData, next: AppData) {
        *data = next;
        if let Err(err) = persist_data(&self.data_path, data).await {
            error!("failed to save data: {err}");
        }
    }

    pub async fn update_classes<T>(
        &self,
        update: impl FnOnce(&[ClassDetails]) -> Result<(Vec<ClassDetails>, T), AppError>,
    ) -> Result<T, AppError> {
        self.commit(|data| {
            let (classes, output) = update(&data.classes)?;
            Ok((data.with_classes(classes), output))
        })
        .await
    }

    pub async fn update_attendance<T>(
        &self,
        update: impl FnOnce(&[AttendanceRecord]) -> Result<(Vec<AttendanceRecord>, T), AppError>,
    ) -> Result<T, AppError> {
        self.commit(|data| {
            let (attendance, output) = update(&data.attendance)?;
            Ok((data.with_attendance(attendance), output))
        })
        .await
    }

    pub async fn update_holidays<T>(
        &self,
        update: impl FnOnce(&[Holiday]) -> Result<(Vec<Holiday>, T), AppError>,
    ) -> Result<T, AppError> {
        self.commit(|data| {
            let (holidays, output) = update(&data.holidays)?;
            Ok((data.with_holidays(holidays), output))
        })
        .await
    }

    pub async fn update_daily_biometrics<T>(
        &self,
        update: impl FnOnce(&[String]) -> Result<(Vec<String>, T), AppError>,
    ) -> Result<T, AppError> {
        self.commit(|data| {
            let (dates, output) = update(&data.daily_biometrics)?;
            Ok((data.with_daily_biometrics(dates), output))
        })
        .await
    }

    pub async fn set_theme(&self, theme: AppTheme) {
        self.replace(|data| data.with_theme(theme)).await;
    }

    pub async fn replace_all(&self, next: AppData) {
        self.replace(|_| next).await;
    }

    pub async fn current_view(&self) -> AppView {
        self.nav.lock().await.current()
    }

    pub async fn navigate_to(&self, view: AppView) -> NavigationResponse {
        let mut nav = self.nav.lock().await;
        if nav.navigate_to(view) {
            debug!(view = %view, depth = nav.depth(), "navigated");
        }
        navigation_response(&nav)
    }

    pub async fn go_back(&self) -> NavigationResponse {
        let mut nav = self.nav.lock().await;
        let view = nav.go_back();
        debug!(view = %view, depth = nav.depth(), "went back");
        navigation_response(&nav)
    }

    pub async fn navigation(&self) -> NavigationResponse {
        navigation_response(&*self.nav.lock().await)
    }
}

fn navigation_response(nav: &Navigator) -> NavigationResponse {
    NavigationResponse {
        current: nav.current().as_str().to_string(),
        history: nav.history().map(|view| view.as_str().to_string()).collect(),
    }
}
