use crate::handlers;
use crate::state::AppState;
use axum::{
    Router,
    routing::{delete, get, post, put},
};

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(handlers::index))
        .route("/nav/back", post(handlers::nav_back_form))
        .route("/nav/:view", post(handlers::nav_form))
        .route("/classes", post(handlers::add_class_form))
        .route("/classes/delete", post(handlers::delete_class_form))
        .route("/attendance/mark", post(handlers::mark_form))
        .route("/attendance/delete", post(handlers::unmark_form))
        .route("/holidays", post(handlers::add_holiday_form))
        .route("/holidays/delete", post(handlers::delete_holiday_form))
        .route("/biometrics/toggle", post(handlers::toggle_biometric_form))
        .route("/theme", post(handlers::theme_form))
        .route("/reset", post(handlers::reset_form))
        .route(
            "/api/nav",
            get(handlers::get_navigation).post(handlers::navigate),
        )
        .route("/api/nav/back", post(handlers::go_back))
        .route(
            "/api/data",
            get(handlers::export_data)
                .put(handlers::import_data)
                .delete(handlers::reset_data),
        )
        .route(
            "/api/classes",
            get(handlers::list_classes).post(handlers::create_class),
        )
        .route(
            "/api/classes/:id",
            put(handlers::update_class).delete(handlers::delete_class),
        )
        .route(
            "/api/attendance",
            get(handlers::list_attendance).put(handlers::upsert_attendance),
        )
        .route(
            "/api/attendance/:date/:class_id",
            delete(handlers::delete_attendance),
        )
        .route(
            "/api/holidays",
            get(handlers::list_holidays).post(handlers::create_holiday),
        )
        .route("/api/holidays/:id", delete(handlers::delete_holiday))
        .route("/api/biometrics/:date", post(handlers::toggle_biometric))
        .route("/api/theme", put(handlers::set_theme))
        .route("/api/analytics", get(handlers::get_analytics))
        .route("/api/dashboard", get(handlers::get_dashboard))
        .with_state(state)
}
