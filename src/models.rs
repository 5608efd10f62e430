use crate::coverage::{CoverageWindow, MaintenanceStatus, WindowStatus};
use serde::{Deserialize, Serialize};

/// Device metadata attached to each repair report.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Device {
    pub brand: String,
    pub model: String,
    pub serial: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Invoice {
    pub number: String,
    pub amount_cents: i64,
}

/// One repair report as stored in the data file. `reported_at` stays a
/// string until evaluation so a bad date skips that record instead of
/// failing the whole file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Report {
    pub id: String,
    pub customer: String,
    pub device: Device,
    pub issue: String,
    pub reported_at: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub invoice: Option<Invoice>,
}

/// A recorded maintenance completion, the external collaborator that feeds
/// the `completed` override.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MaintenanceCompletion {
    pub report_id: String,
    pub policy: String,
    pub completed_at: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct PortalData {
    #[serde(default)]
    pub reports: Vec<Report>,
    #[serde(default)]
    pub completed_maintenance: Vec<MaintenanceCompletion>,
}

impl PortalData {
    pub fn report(&self, id: &str) -> Option<&Report> {
        self.reports.iter().find(|report| report.id == id)
    }

    pub fn is_completed(&self, report_id: &str, policy: &str) -> bool {
        self.completed_maintenance
            .iter()
            .any(|entry| entry.report_id == report_id && entry.policy == policy)
    }
}

#[derive(Debug, Serialize)]
pub struct CoverageView {
    pub policy: String,
    pub start_date: String,
    pub end_date: String,
    pub status: WindowStatus,
    pub total_days: i64,
    pub days_elapsed: i64,
    pub days_remaining: i64,
    pub percent_elapsed: f64,
}

impl CoverageView {
    pub fn from_window(window: &CoverageWindow) -> Self {
        Self {
            policy: window.policy.name.to_string(),
            start_date: window.start_date.date_naive().to_string(),
            end_date: window.end_date.date_naive().to_string(),
            status: window.status,
            total_days: window.total_days,
            days_elapsed: window.days_elapsed,
            days_remaining: window.days_remaining,
            percent_elapsed: (window.percent_elapsed * 10.0).round() / 10.0,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ReportSummary {
    pub id: String,
    pub customer: String,
    pub device: Device,
    pub issue: String,
    pub reported_at: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub invoice: Option<Invoice>,
    pub warranties: Vec<CoverageView>,
}

#[derive(Debug, Serialize)]
pub struct SkippedReport {
    pub id: String,
    pub reason: String,
}

#[derive(Debug, Serialize)]
pub struct ReportsResponse {
    pub evaluated_at: String,
    pub reports: Vec<ReportSummary>,
    pub skipped: Vec<SkippedReport>,
}

#[derive(Debug, Serialize)]
pub struct ReportDetailResponse {
    pub evaluated_at: String,
    pub report: ReportSummary,
    pub maintenance: Vec<MaintenanceEntry>,
}

#[derive(Debug, Serialize)]
pub struct MaintenanceEntry {
    pub report_id: String,
    pub customer: String,
    pub device: String,
    pub policy: String,
    pub due_date: String,
    pub days_remaining: i64,
    pub status: MaintenanceStatus,
}

#[derive(Debug, Serialize)]
pub struct MaintenanceResponse {
    pub evaluated_at: String,
    pub entries: Vec<MaintenanceEntry>,
    pub skipped: Vec<SkippedReport>,
}

#[derive(Debug, Deserialize)]
pub struct CompleteMaintenanceRequest {
    pub report_id: String,
    pub policy: String,
}

/// Headline numbers substituted into the dashboard template.
#[derive(Debug, Default)]
pub struct DashboardTotals {
    pub report_count: usize,
    pub active_warranties: usize,
    pub due_maintenance: usize,
}
