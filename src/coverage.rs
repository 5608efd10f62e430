//! Warranty and maintenance coverage windows.
//!
//! Every window is recomputed from `(start_date, policy, now)` on each call;
//! nothing here reads a clock or touches I/O. Month and year advancement is
//! calendar-aware and clamps to the last day of a shorter target month
//! (Jan 31 + 1 month = Feb 28, or Feb 29 in a leap year). Day counts are
//! measured in whole milliseconds: elapsed days round up (a started day
//! counts), remaining days round down (only fully available days count).

use chrono::{DateTime, Duration, Months, NaiveDate, NaiveTime, Utc};
use serde::Serialize;
use thiserror::Error;

pub const DEFAULT_UPCOMING_THRESHOLD_DAYS: i64 = 30;

const MS_PER_DAY: i64 = 86_400_000;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DurationUnit {
    Days,
    Months,
    Years,
}

/// A named coverage duration. The fixed catalog below is the only set the
/// portal evaluates; the calculator itself accepts any policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CoveragePolicy {
    pub name: &'static str,
    pub duration_value: u32,
    pub duration_unit: DurationUnit,
}

pub const MANUFACTURING_DEFECT: CoveragePolicy = CoveragePolicy {
    name: "manufacturing_defect",
    duration_value: 6,
    duration_unit: DurationUnit::Months,
};

pub const REPLACEMENT: CoveragePolicy = CoveragePolicy {
    name: "replacement",
    duration_value: 14,
    duration_unit: DurationUnit::Days,
};

pub const PERIODIC_MAINTENANCE_1: CoveragePolicy = CoveragePolicy {
    name: "periodic_maintenance_1",
    duration_value: 6,
    duration_unit: DurationUnit::Months,
};

pub const PERIODIC_MAINTENANCE_2: CoveragePolicy = CoveragePolicy {
    name: "periodic_maintenance_2",
    duration_value: 12,
    duration_unit: DurationUnit::Months,
};

pub const GENERAL_MAINTENANCE_WARRANTY: CoveragePolicy = CoveragePolicy {
    name: "general_maintenance_warranty",
    duration_value: 1,
    duration_unit: DurationUnit::Years,
};

pub const WARRANTY_POLICIES: [CoveragePolicy; 3] = [
    MANUFACTURING_DEFECT,
    REPLACEMENT,
    GENERAL_MAINTENANCE_WARRANTY,
];

pub const MAINTENANCE_POLICIES: [CoveragePolicy; 2] =
    [PERIODIC_MAINTENANCE_1, PERIODIC_MAINTENANCE_2];

pub fn find_maintenance_policy(name: &str) -> Option<CoveragePolicy> {
    MAINTENANCE_POLICIES
        .iter()
        .copied()
        .find(|policy| policy.name == name)
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CoverageError {
    #[error("invalid policy '{name}': duration must be positive")]
    InvalidPolicy { name: String },
    #[error("invalid date: {reason}")]
    InvalidDate { reason: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum WindowStatus {
    Active,
    Expired,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MaintenanceStatus {
    Due,
    Upcoming,
    Scheduled,
    Completed,
}

/// The result of evaluating one policy against one report date. A value
/// object: built fresh per evaluation, never stored.
#[derive(Debug, Clone, PartialEq)]
pub struct CoverageWindow {
    pub policy: CoveragePolicy,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
    pub now: DateTime<Utc>,
    pub total_days: i64,
    pub days_elapsed: i64,
    pub days_remaining: i64,
    pub percent_elapsed: f64,
    pub status: WindowStatus,
}

/// Evaluate `policy` anchored at `start_date` as seen from `now`.
///
/// Expired is a normal outcome, not an error. Errors are reserved for a
/// zero-length policy and for calendar arithmetic leaving chrono's
/// representable range.
pub fn compute_window(
    start_date: DateTime<Utc>,
    policy: &CoveragePolicy,
    now: DateTime<Utc>,
) -> Result<CoverageWindow, CoverageError> {
    if policy.duration_value == 0 {
        return Err(CoverageError::InvalidPolicy {
            name: policy.name.to_string(),
        });
    }

    let end_date = advance(start_date, policy)?;
    let total_days = days_ceil(end_date - start_date);
    let days_elapsed = days_ceil(now - start_date);
    let days_remaining = days_floor(end_date - now);
    let percent_elapsed =
        (days_elapsed as f64 / total_days as f64 * 100.0).clamp(0.0, 100.0);
    let status = if now <= end_date {
        WindowStatus::Active
    } else {
        WindowStatus::Expired
    };

    Ok(CoverageWindow {
        policy: *policy,
        start_date,
        end_date,
        now,
        total_days,
        days_elapsed,
        days_remaining,
        percent_elapsed,
        status,
    })
}

/// Refine a maintenance window into its schedule bucket. Completion is
/// recorded by an external log, so it arrives here as a plain flag and wins
/// over the dates.
pub fn classify_maintenance_status(
    window: &CoverageWindow,
    upcoming_threshold_days: i64,
    completed: bool,
) -> MaintenanceStatus {
    if completed {
        return MaintenanceStatus::Completed;
    }
    match window.status {
        WindowStatus::Expired => MaintenanceStatus::Due,
        WindowStatus::Active if window.days_remaining <= upcoming_threshold_days => {
            MaintenanceStatus::Upcoming
        }
        WindowStatus::Active => MaintenanceStatus::Scheduled,
    }
}

/// Parse a report date as RFC 3339 or a plain `YYYY-MM-DD` (taken as
/// midnight UTC). Records with unparsable dates are skipped by callers, so
/// the error carries the offending text.
pub fn parse_start_date(raw: &str) -> Result<DateTime<Utc>, CoverageError> {
    if let Ok(parsed) = DateTime::parse_from_rfc3339(raw) {
        return Ok(parsed.with_timezone(&Utc));
    }
    if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        return Ok(date.and_time(NaiveTime::MIN).and_utc());
    }
    Err(CoverageError::InvalidDate {
        reason: format!("unparsable date '{raw}'"),
    })
}

fn advance(
    start_date: DateTime<Utc>,
    policy: &CoveragePolicy,
) -> Result<DateTime<Utc>, CoverageError> {
    let end = match policy.duration_unit {
        DurationUnit::Days => Duration::try_days(i64::from(policy.duration_value))
            .and_then(|delta| start_date.checked_add_signed(delta)),
        DurationUnit::Months => start_date.checked_add_months(Months::new(policy.duration_value)),
        DurationUnit::Years => policy
            .duration_value
            .checked_mul(12)
            .and_then(|months| start_date.checked_add_months(Months::new(months))),
    };

    end.ok_or_else(|| CoverageError::InvalidDate {
        reason: format!(
            "advancing {} by {} {:?} leaves the supported date range",
            start_date, policy.duration_value, policy.duration_unit
        ),
    })
}

fn days_ceil(delta: Duration) -> i64 {
    let ms = delta.num_milliseconds();
    if ms <= 0 {
        0
    } else {
        (ms + MS_PER_DAY - 1) / MS_PER_DAY
    }
}

fn days_floor(delta: Duration) -> i64 {
    let ms = delta.num_milliseconds();
    if ms <= 0 {
        0
    } else {
        ms / MS_PER_DAY
    }
}
