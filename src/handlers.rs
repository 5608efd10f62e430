use crate::coverage;
use crate::errors::AppError;
use crate::evaluate::{
    dashboard_totals, evaluate_maintenance_at, evaluate_reports_at, maintenance_entries_for,
    summarize_report,
};
use crate::models::{
    CompleteMaintenanceRequest, MaintenanceCompletion, MaintenanceEntry, MaintenanceResponse,
    ReportDetailResponse, ReportsResponse,
};
use crate::state::AppState;
use crate::storage::persist_data;
use crate::ui::render_index;
use axum::{
    extract::{Path, Query, State},
    response::Html,
    Json,
};
use chrono::{DateTime, Utc};
use serde::Deserialize;

/// Optional evaluation timestamp, RFC 3339 or `YYYY-MM-DD`. Defaults to the
/// wall clock; overridable so reads are reproducible.
#[derive(Debug, Deserialize)]
pub struct EvalQuery {
    pub at: Option<String>,
}

pub async fn index(State(state): State<AppState>) -> Html<String> {
    let data = state.data.lock().await;
    let totals = dashboard_totals(&data);
    Html(render_index(&totals))
}

pub async fn get_reports(
    State(state): State<AppState>,
    Query(query): Query<EvalQuery>,
) -> Result<Json<ReportsResponse>, AppError> {
    let now = resolve_now(&query)?;
    let data = state.data.lock().await;
    Ok(Json(evaluate_reports_at(now, &data)))
}

pub async fn get_report(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Query(query): Query<EvalQuery>,
) -> Result<Json<ReportDetailResponse>, AppError> {
    let now = resolve_now(&query)?;
    let data = state.data.lock().await;
    let report = data
        .report(&id)
        .ok_or_else(|| AppError::not_found(format!("no report '{id}'")))?;

    let summary = summarize_report(report, now)?;
    let maintenance = maintenance_entries_for(report, &data, now)?;

    Ok(Json(ReportDetailResponse {
        evaluated_at: now.to_rfc3339(),
        report: summary,
        maintenance,
    }))
}

pub async fn get_maintenance(
    State(state): State<AppState>,
    Query(query): Query<EvalQuery>,
) -> Result<Json<MaintenanceResponse>, AppError> {
    let now = resolve_now(&query)?;
    let data = state.data.lock().await;
    Ok(Json(evaluate_maintenance_at(now, &data)))
}

pub async fn complete_maintenance(
    State(state): State<AppState>,
    Json(payload): Json<CompleteMaintenanceRequest>,
) -> Result<Json<MaintenanceEntry>, AppError> {
    let policy = coverage::find_maintenance_policy(&payload.policy).ok_or_else(|| {
        AppError::bad_request(format!("unknown maintenance policy '{}'", payload.policy))
    })?;

    let now = Utc::now();
    let mut data = state.data.lock().await;
    let report = data
        .report(&payload.report_id)
        .ok_or_else(|| AppError::not_found(format!("no report '{}'", payload.report_id)))?
        .clone();

    // Recording twice is a no-op; the log keeps one entry per pair.
    if !data.is_completed(&report.id, policy.name) {
        data.completed_maintenance.push(MaintenanceCompletion {
            report_id: report.id.clone(),
            policy: policy.name.to_string(),
            completed_at: now.to_rfc3339(),
        });
        persist_data(&state.data_path, &data).await?;
    }

    let entry = maintenance_entries_for(&report, &data, now)?
        .into_iter()
        .find(|entry| entry.policy == policy.name)
        .ok_or_else(|| AppError::bad_request("policy not scheduled for this report"))?;

    Ok(Json(entry))
}

fn resolve_now(query: &EvalQuery) -> Result<DateTime<Utc>, AppError> {
    match query.at.as_deref() {
        None => Ok(Utc::now()),
        Some(raw) => coverage::parse_start_date(raw)
            .map_err(|_| AppError::bad_request(format!("invalid 'at' value '{raw}'"))),
    }
}
