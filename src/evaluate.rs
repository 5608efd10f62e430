use crate::coverage::{
    self, classify_maintenance_status, compute_window, CoverageError, MaintenanceStatus,
    WindowStatus, DEFAULT_UPCOMING_THRESHOLD_DAYS, MAINTENANCE_POLICIES, WARRANTY_POLICIES,
};
use crate::models::{
    CoverageView, DashboardTotals, MaintenanceEntry, MaintenanceResponse, PortalData, Report,
    ReportSummary, ReportsResponse, SkippedReport,
};
use chrono::{DateTime, Utc};
use tracing::warn;

pub fn evaluate_reports(data: &PortalData) -> ReportsResponse {
    evaluate_reports_at(Utc::now(), data)
}

/// Evaluate every report's warranty windows as seen from `now`. A record
/// with an unparsable date is skipped and reported, never fatal to the
/// batch.
pub fn evaluate_reports_at(now: DateTime<Utc>, data: &PortalData) -> ReportsResponse {
    let mut reports = Vec::with_capacity(data.reports.len());
    let mut skipped = Vec::new();

    for report in &data.reports {
        match summarize_report(report, now) {
            Ok(summary) => reports.push(summary),
            Err(err) => {
                warn!("skipping report {}: {err}", report.id);
                skipped.push(SkippedReport {
                    id: report.id.clone(),
                    reason: err.to_string(),
                });
            }
        }
    }

    ReportsResponse {
        evaluated_at: now.to_rfc3339(),
        reports,
        skipped,
    }
}

pub fn summarize_report(report: &Report, now: DateTime<Utc>) -> Result<ReportSummary, CoverageError> {
    let start = coverage::parse_start_date(&report.reported_at)?;
    let mut warranties = Vec::with_capacity(WARRANTY_POLICIES.len());
    for policy in &WARRANTY_POLICIES {
        let window = compute_window(start, policy, now)?;
        warranties.push(CoverageView::from_window(&window));
    }

    Ok(ReportSummary {
        id: report.id.clone(),
        customer: report.customer.clone(),
        device: report.device.clone(),
        issue: report.issue.clone(),
        reported_at: report.reported_at.clone(),
        invoice: report.invoice.clone(),
        warranties,
    })
}

/// Maintenance schedule entries for one report, with completion flags taken
/// from the recorded log.
pub fn maintenance_entries_for(
    report: &Report,
    data: &PortalData,
    now: DateTime<Utc>,
) -> Result<Vec<MaintenanceEntry>, CoverageError> {
    let start = coverage::parse_start_date(&report.reported_at)?;
    let mut entries = Vec::with_capacity(MAINTENANCE_POLICIES.len());
    for policy in &MAINTENANCE_POLICIES {
        let window = compute_window(start, policy, now)?;
        let completed = data.is_completed(&report.id, policy.name);
        let status =
            classify_maintenance_status(&window, DEFAULT_UPCOMING_THRESHOLD_DAYS, completed);
        entries.push(MaintenanceEntry {
            report_id: report.id.clone(),
            customer: report.customer.clone(),
            device: format!("{} {}", report.device.brand, report.device.model),
            policy: policy.name.to_string(),
            due_date: window.end_date.date_naive().to_string(),
            days_remaining: window.days_remaining,
            status,
        });
    }
    Ok(entries)
}

pub fn evaluate_maintenance(data: &PortalData) -> MaintenanceResponse {
    evaluate_maintenance_at(Utc::now(), data)
}

pub fn evaluate_maintenance_at(now: DateTime<Utc>, data: &PortalData) -> MaintenanceResponse {
    let mut entries = Vec::new();
    let mut skipped = Vec::new();

    for report in &data.reports {
        match maintenance_entries_for(report, data, now) {
            Ok(mut report_entries) => entries.append(&mut report_entries),
            Err(err) => {
                warn!("skipping report {}: {err}", report.id);
                skipped.push(SkippedReport {
                    id: report.id.clone(),
                    reason: err.to_string(),
                });
            }
        }
    }

    MaintenanceResponse {
        evaluated_at: now.to_rfc3339(),
        entries,
        skipped,
    }
}

pub fn dashboard_totals(data: &PortalData) -> DashboardTotals {
    dashboard_totals_at(Utc::now(), data)
}

pub fn dashboard_totals_at(now: DateTime<Utc>, data: &PortalData) -> DashboardTotals {
    let reports = evaluate_reports_at(now, data);
    let maintenance = evaluate_maintenance_at(now, data);

    DashboardTotals {
        report_count: data.reports.len(),
        active_warranties: reports
            .reports
            .iter()
            .filter(|report| {
                report
                    .warranties
                    .iter()
                    .any(|warranty| warranty.status == WindowStatus::Active)
            })
            .count(),
        due_maintenance: maintenance
            .entries
            .iter()
            .filter(|entry| entry.status == MaintenanceStatus::Due)
            .count(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Device, MaintenanceCompletion};
    use chrono::NaiveDateTime;

    fn report(id: &str, reported_at: &str) -> Report {
        Report {
            id: id.to_string(),
            customer: "Maya Okafor".to_string(),
            device: Device {
                brand: "Nimbus".to_string(),
                model: "X2".to_string(),
                serial: "NX2-4411".to_string(),
            },
            issue: "screen flicker".to_string(),
            reported_at: reported_at.to_string(),
            invoice: None,
        }
    }

    fn at(raw: &str) -> DateTime<Utc> {
        raw.parse::<NaiveDateTime>().unwrap().and_utc()
    }

    #[test]
    fn reports_with_bad_dates_are_skipped_not_fatal() {
        let data = PortalData {
            reports: vec![report("r-1", "2025-01-01"), report("r-2", "not a date")],
            completed_maintenance: Vec::new(),
        };

        let response = evaluate_reports_at(at("2025-02-01T00:00:00"), &data);
        assert_eq!(response.reports.len(), 1);
        assert_eq!(response.reports[0].id, "r-1");
        assert_eq!(response.skipped.len(), 1);
        assert_eq!(response.skipped[0].id, "r-2");
    }

    #[test]
    fn summary_evaluates_all_warranty_policies() {
        let summary =
            summarize_report(&report("r-1", "2025-01-01"), at("2025-01-10T12:00:00")).unwrap();
        assert_eq!(summary.warranties.len(), 3);

        let replacement = summary
            .warranties
            .iter()
            .find(|w| w.policy == "replacement")
            .expect("missing replacement warranty");
        assert_eq!(replacement.days_remaining, 4);
        assert_eq!(replacement.end_date, "2025-01-15");
        assert_eq!(replacement.status, WindowStatus::Active);
    }

    #[test]
    fn completion_log_flows_into_maintenance_entries() {
        let data = PortalData {
            reports: vec![report("r-1", "2023-05-15")],
            completed_maintenance: vec![MaintenanceCompletion {
                report_id: "r-1".to_string(),
                policy: "periodic_maintenance_1".to_string(),
                completed_at: "2023-11-20T09:00:00Z".to_string(),
            }],
        };

        let response = evaluate_maintenance_at(at("2025-08-01T00:00:00"), &data);
        assert_eq!(response.entries.len(), 2);

        let first = &response.entries[0];
        assert_eq!(first.policy, "periodic_maintenance_1");
        assert_eq!(first.status, MaintenanceStatus::Completed);

        let second = &response.entries[1];
        assert_eq!(second.policy, "periodic_maintenance_2");
        assert_eq!(second.status, MaintenanceStatus::Due);
        assert_eq!(second.due_date, "2024-05-15");
    }

    #[test]
    fn totals_count_active_warranties_and_due_maintenance() {
        let data = PortalData {
            reports: vec![report("r-1", "2025-01-01"), report("r-2", "2023-05-15")],
            completed_maintenance: Vec::new(),
        };

        let totals = dashboard_totals_at(at("2025-01-10T12:00:00"), &data);
        assert_eq!(totals.report_count, 2);
        // r-1 is inside every warranty window; r-2 is long expired.
        assert_eq!(totals.active_warranties, 1);
        // both of r-2's maintenance windows are overdue, r-1's are not.
        assert_eq!(totals.due_maintenance, 2);
    }
}
