use crate::handlers;
use crate::state::AppState;
use axum::{routing::{get, post}, Router};

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(handlers::index))
        .route("/api/reports", get(handlers::get_reports))
        .route("/api/reports/:id", get(handlers::get_report))
        .route("/api/maintenance", get(handlers::get_maintenance))
        .route("/api/maintenance/complete", post(handlers::complete_maintenance))
        .with_state(state)
}
