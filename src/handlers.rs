use crate::errors::AppError;
use crate::models::{
    AnalyticsQuery, AnalyticsResponse, AppData, AppTheme, AttendanceInput, AttendanceQuery,
    AttendanceRange, AttendanceRecord, AttendanceStatus, BiometricsResponse, ClassDetails,
    ClassInput, DashboardResponse, DayOfWeek, Holiday, HolidayInput, NavigateRequest,
    NavigationResponse, ThemeRequest,
};
use crate::navigation::AppView;
use crate::records;
use crate::state::AppState;
use crate::stats::{build_analytics, build_dashboard};
use crate::ui::render_page;
use crate::views::{ViewContext, render_view};
use axum::{
    Form, Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::{Html, Redirect},
};
use chrono::Local;
use serde::Deserialize;
use tracing::info;

pub async fn index(
    State(state): State<AppState>,
    Query(query): Query<AnalyticsQuery>,
) -> Html<String> {
    let view = state.current_view().await;
    let data = state.snapshot().await;
    let range = query
        .range
        .as_deref()
        .and_then(AttendanceRange::parse)
        .unwrap_or_default();
    let now = Local::now();
    let ctx = ViewContext {
        data: &data,
        today: now.date_naive(),
        range,
    };
    let body = render_view(view, &ctx);
    let clock = now.format("%I:%M %p").to_string();
    Html(render_page(view, data.theme, &clock, &body))
}

pub async fn nav_form(State(state): State<AppState>, Path(view): Path<String>) -> Redirect {
    state.navigate_to(AppView::parse_or_default(&view)).await;
    Redirect::to("/")
}

pub async fn nav_back_form(State(state): State<AppState>) -> Redirect {
    state.go_back().await;
    Redirect::to("/")
}

pub async fn get_navigation(State(state): State<AppState>) -> Json<NavigationResponse> {
    Json(state.navigation().await)
}

pub async fn navigate(
    State(state): State<AppState>,
    Json(payload): Json<NavigateRequest>,
) -> Result<Json<NavigationResponse>, AppError> {
    let view = AppView::parse(payload.view.trim())
        .ok_or_else(|| AppError::bad_request(format!("unknown view '{}'", payload.view)))?;
    Ok(Json(state.navigate_to(view).await))
}

pub async fn go_back(State(state): State<AppState>) -> Json<NavigationResponse> {
    Json(state.go_back().await)
}

pub async fn export_data(State(state): State<AppState>) -> Json<AppData> {
    Json(state.snapshot().await)
}

pub async fn import_data(
    State(state): State<AppState>,
    Json(payload): Json<AppData>,
) -> Result<Json<AppData>, AppError> {
    records::validate_import(&payload)?;
    info!(
        classes = payload.classes.len(),
        attendance = payload.attendance.len(),
        holidays = payload.holidays.len(),
        "importing data"
    );
    state.replace_all(payload).await;
    Ok(Json(state.snapshot().await))
}

pub async fn reset_data(State(state): State<AppState>) -> StatusCode {
    info!("resetting all data");
    state.replace_all(AppData::default()).await;
    StatusCode::NO_CONTENT
}

pub async fn list_classes(State(state): State<AppState>) -> Json<Vec<ClassDetails>> {
    Json(state.snapshot().await.classes)
}

pub async fn create_class(
    State(state): State<AppState>,
    Json(payload): Json<ClassInput>,
) -> Result<(StatusCode, Json<ClassDetails>), AppError> {
    let class = add_class(&state, payload).await?;
    Ok((StatusCode::CREATED, Json(class)))
}

pub async fn update_class(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(payload): Json<ClassInput>,
) -> Result<Json<ClassDetails>, AppError> {
    let stamp = records::timestamp();
    let class = state
        .update_classes(|classes| records::update_class(classes, &id, payload, &stamp))
        .await?;
    Ok(Json(class))
}

pub async fn delete_class(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode, AppError> {
    remove_class(&state, &id).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn list_attendance(
    State(state): State<AppState>,
    Query(query): Query<AttendanceQuery>,
) -> Json<Vec<AttendanceRecord>> {
    let records = state
        .snapshot()
        .await
        .attendance
        .into_iter()
        .filter(|record| query.date.as_deref().is_none_or(|date| record.date == date))
        .filter(|record| {
            query
                .class_id
                .as_deref()
                .is_none_or(|class_id| record.class_id == class_id)
        })
        .collect();
    Json(records)
}

pub async fn upsert_attendance(
    State(state): State<AppState>,
    Json(payload): Json<AttendanceInput>,
) -> Result<Json<AttendanceRecord>, AppError> {
    Ok(Json(mark_attendance(&state, payload).await?))
}

pub async fn delete_attendance(
    State(state): State<AppState>,
    Path((date, class_id)): Path<(String, String)>,
) -> Result<StatusCode, AppError> {
    state
        .update_attendance(|records| {
            records::delete_attendance(records, &date, &class_id).map(|next| (next, ()))
        })
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn list_holidays(State(state): State<AppState>) -> Json<Vec<Holiday>> {
    Json(state.snapshot().await.holidays)
}

pub async fn create_holiday(
    State(state): State<AppState>,
    Json(payload): Json<HolidayInput>,
) -> Result<(StatusCode, Json<Holiday>), AppError> {
    let holiday = add_holiday(&state, payload).await?;
    Ok((StatusCode::CREATED, Json(holiday)))
}

pub async fn delete_holiday(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode, AppError> {
    remove_holiday(&state, &id).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn toggle_biometric(
    State(state): State<AppState>,
    Path(date): Path<String>,
) -> Result<Json<BiometricsResponse>, AppError> {
    Ok(Json(flip_biometric(&state, &date).await?))
}

pub async fn set_theme(
    State(state): State<AppState>,
    Json(payload): Json<ThemeRequest>,
) -> Json<AppData> {
    state.set_theme(payload.theme).await;
    Json(state.snapshot().await)
}

pub async fn get_analytics(
    State(state): State<AppState>,
    Query(query): Query<AnalyticsQuery>,
) -> Result<Json<AnalyticsResponse>, AppError> {
    let range = match query.range.as_deref() {
        None => AttendanceRange::default(),
        Some(value) => AttendanceRange::parse(value.trim()).ok_or_else(|| {
            AppError::bad_request("range must be 'daily', 'weekly' or 'monthly'")
        })?,
    };
    let data = state.snapshot().await;
    Ok(Json(build_analytics(&data, range)))
}

pub async fn get_dashboard(State(state): State<AppState>) -> Json<DashboardResponse> {
    let data = state.snapshot().await;
    Json(build_dashboard(&data))
}

#[derive(Debug, Deserialize)]
pub struct ClassForm {
    pub name: String,
    #[serde(default)]
    pub room: String,
    #[serde(default)]
    pub teacher: String,
    pub start_time: String,
    pub end_time: String,
    pub important_notes: Option<String>,
    pub monday: Option<String>,
    pub tuesday: Option<String>,
    pub wednesday: Option<String>,
    pub thursday: Option<String>,
    pub friday: Option<String>,
    pub saturday: Option<String>,
    pub sunday: Option<String>,
}

impl From<ClassForm> for ClassInput {
    fn from(form: ClassForm) -> Self {
        let ticked = [
            (DayOfWeek::Monday, &form.monday),
            (DayOfWeek::Tuesday, &form.tuesday),
            (DayOfWeek::Wednesday, &form.wednesday),
            (DayOfWeek::Thursday, &form.thursday),
            (DayOfWeek::Friday, &form.friday),
            (DayOfWeek::Saturday, &form.saturday),
            (DayOfWeek::Sunday, &form.sunday),
        ];
        let schedule = ticked
            .into_iter()
            .filter(|(_, value)| value.is_some())
            .map(|(day, _)| day)
            .collect();
        ClassInput {
            schedule,
            name: form.name,
            room: form.room,
            teacher: form.teacher,
            important_notes: form.important_notes,
            start_time: form.start_time,
            end_time: form.end_time,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct AttendanceForm {
    pub date: String,
    pub class_id: String,
    pub status: AttendanceStatus,
    pub note: Option<String>,
    pub biometric_done: Option<String>,
    pub keep_existing: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct AttendanceKeyForm {
    pub date: String,
    pub class_id: String,
}

#[derive(Debug, Deserialize)]
pub struct IdForm {
    pub id: String,
}

#[derive(Debug, Deserialize)]
pub struct DateForm {
    pub date: String,
}

#[derive(Debug, Deserialize)]
pub struct ThemeForm {
    pub theme: String,
}

pub async fn add_class_form(
    State(state): State<AppState>,
    Form(form): Form<ClassForm>,
) -> Result<Redirect, AppError> {
    add_class(&state, form.into()).await?;
    Ok(Redirect::to("/"))
}

pub async fn delete_class_form(
    State(state): State<AppState>,
    Form(form): Form<IdForm>,
) -> Result<Redirect, AppError> {
    remove_class(&state, &form.id).await?;
    Ok(Redirect::to("/"))
}

pub async fn mark_form(
    State(state): State<AppState>,
    Form(form): Form<AttendanceForm>,
) -> Result<Redirect, AppError> {
    let stamp = records::timestamp();
    if form.keep_existing.is_some() {
        // Dashboard status chips change the status only.
        state
            .update_attendance(|records| {
                records::set_attendance_status(
                    records,
                    &form.date,
                    &form.class_id,
                    form.status,
                    &stamp,
                )
            })
            .await?;
    } else {
        let input = AttendanceInput {
            biometric_done: form.biometric_done.is_some(),
            date: form.date,
            class_id: form.class_id,
            status: form.status,
            note: form.note,
        };
        state
            .update_attendance(|records| records::upsert_attendance(records, input, &stamp))
            .await?;
    }
    Ok(Redirect::to("/"))
}

pub async fn unmark_form(
    State(state): State<AppState>,
    Form(form): Form<AttendanceKeyForm>,
) -> Result<Redirect, AppError> {
    state
        .update_attendance(|records| {
            records::delete_attendance(records, &form.date, &form.class_id).map(|next| (next, ()))
        })
        .await?;
    Ok(Redirect::to("/"))
}

pub async fn add_holiday_form(
    State(state): State<AppState>,
    Form(form): Form<HolidayInput>,
) -> Result<Redirect, AppError> {
    add_holiday(&state, form).await?;
    Ok(Redirect::to("/"))
}

pub async fn delete_holiday_form(
    State(state): State<AppState>,
    Form(form): Form<IdForm>,
) -> Result<Redirect, AppError> {
    remove_holiday(&state, &form.id).await?;
    Ok(Redirect::to("/"))
}

pub async fn toggle_biometric_form(
    State(state): State<AppState>,
    Form(form): Form<DateForm>,
) -> Result<Redirect, AppError> {
    flip_biometric(&state, &form.date).await?;
    Ok(Redirect::to("/"))
}

pub async fn theme_form(
    State(state): State<AppState>,
    Form(form): Form<ThemeForm>,
) -> Result<Redirect, AppError> {
    let theme = AppTheme::parse(form.theme.trim())
        .ok_or_else(|| AppError::bad_request(format!("unknown theme '{}'", form.theme)))?;
    state.set_theme(theme).await;
    Ok(Redirect::to("/"))
}

pub async fn reset_form(State(state): State<AppState>) -> Redirect {
    info!("resetting all data");
    state.replace_all(AppData::default()).await;
    Redirect::to("/")
}

async fn add_class(state: &AppState, input: ClassInput) -> Result<ClassDetails, AppError> {
    let stamp = records::timestamp();
    let class = state
        .update_classes(|classes| records::create_class(classes, input, &stamp))
        .await?;
    info!(id = %class.id, name = %class.name, "class created");
    Ok(class)
}

async fn remove_class(state: &AppState, id: &str) -> Result<(), AppError> {
    state
        .update_classes(|classes| records::delete_class(classes, id).map(|next| (next, ())))
        .await?;
    info!(id, "class deleted");
    Ok(())
}

async fn mark_attendance(
    state: &AppState,
    input: AttendanceInput,
) -> Result<AttendanceRecord, AppError> {
    let stamp = records::timestamp();
    state
        .update_attendance(|records| records::upsert_attendance(records, input, &stamp))
        .await
}

async fn add_holiday(state: &AppState, input: HolidayInput) -> Result<Holiday, AppError> {
    let stamp = records::timestamp();
    state
        .update_holidays(|holidays| records::create_holiday(holidays, input, &stamp))
        .await
}

async fn remove_holiday(state: &AppState, id: &str) -> Result<(), AppError> {
    state
        .update_holidays(|holidays| records::delete_holiday(holidays, id).map(|next| (next, ())))
        .await
}

async fn flip_biometric(state: &AppState, date: &str) -> Result<BiometricsResponse, AppError> {
    let done = state
        .update_daily_biometrics(|dates| records::toggle_biometric(dates, date))
        .await?;
    Ok(BiometricsResponse {
        date: date.trim().to_string(),
        done,
    })
}
