//! Wire and report types for the leave balance engine.
//!
//! Input shapes mirror the institute backend's REST payloads (`leave_type`,
//! `from_date`, `total_days`, `approval_status`, ...). Report shapes are
//! constructed fresh by [`compute_balance`](crate::compute_balance) on every
//! call; they carry no persisted identity.

use std::collections::BTreeMap;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::policy::PolicyClass;

/// Approval state of a leave request as recorded by the backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ApprovalStatus {
    Pending,
    Approved,
    Rejected,
}

/// The leave buckets the engine recognises.
///
/// Backend records carry free-text type strings ("CL", "cl", "HalfDay", ...);
/// [`LeaveType::parse`] normalises them on ingestion. A string that matches
/// no bucket is surfaced as a diagnostic, never silently dropped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LeaveType {
    Casual,
    Earned,
    Normal,
    HalfDay,
    WithoutPay,
}

impl LeaveType {
    /// Parse a raw `leave_type` string.
    ///
    /// Matching is case-insensitive and ignores spaces, hyphens, and
    /// underscores, so "CL", "cl", "Casual Leave", and "casual_leave" all
    /// resolve to [`LeaveType::Casual`]. Returns `None` for unrecognised
    /// strings.
    pub fn parse(raw: &str) -> Option<Self> {
        let key: String = raw
            .chars()
            .filter(|c| !matches!(c, ' ' | '-' | '_'))
            .collect::<String>()
            .to_ascii_lowercase();
        match key.as_str() {
            "cl" | "casual" | "casualleave" => Some(Self::Casual),
            "el" | "earned" | "earnedleave" => Some(Self::Earned),
            "nl" | "normal" | "normalleave" => Some(Self::Normal),
            "hd" | "halfday" => Some(Self::HalfDay),
            "lwp" | "leavewithoutpay" => Some(Self::WithoutPay),
            _ => None,
        }
    }
}

/// A leave request record, owned by the backend and immutable here.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LeaveRequest {
    /// Raw type string as stored by the backend; normalised on ingestion.
    pub leave_type: String,
    pub from_date: NaiveDate,
    pub to_date: NaiveDate,
    /// Day count as recorded by the requester. For half-day records this is
    /// the number of half-day events, not elapsed days.
    pub total_days: f64,
    pub approval_status: ApprovalStatus,
    /// Informational only; the balance computation never reads it.
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

/// Employee profile fields the engine consumes.
///
/// `joining_date` is optional because HR may not have entered it yet; the
/// balance is undefined without it, which the engine reports as
/// [`BalanceError::MissingJoiningDate`](crate::BalanceError::MissingJoiningDate).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EmployeeProfile {
    #[serde(default)]
    pub joining_date: Option<NaiveDate>,
    /// Free-text position; mapped to a policy class by substring match.
    #[serde(default)]
    pub position: Option<String>,
    #[serde(default)]
    pub department: Option<String>,
}

/// One row of an accrual bucket's monthly history.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MonthRow {
    /// First day of the calendar month.
    pub month: NaiveDate,
    pub credit: f64,
    pub used: f64,
    /// Running balance after this month's credit and usage.
    pub balance: f64,
}

/// A fixed-yearly bucket (casual leave): allocated once per leave year,
/// resets on the joining-date anniversary, no carry-forward.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct YearlyBucket {
    pub allocated: f64,
    /// Approved usage within the current leave year, half-day charges
    /// included where the policy folds them into this bucket.
    pub used: f64,
    /// Floored at zero; a yearly bucket cannot go negative.
    pub remaining: f64,
    /// Pending (unapproved) days; informational, never deducted.
    pub pending: f64,
    pub year_start: NaiveDate,
    pub year_end: NaiveDate,
}

/// A monthly-accruing bucket (earned leave, or normal leave under the YP
/// policy): credits a fixed rate per calendar month, carries forward, and
/// may go negative. A negative `remaining` is a deficit that future monthly
/// credits recover, not an error.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AccrualBucket {
    pub per_month: f64,
    /// Sum of all credited amounts, independent of usage.
    pub accumulated: f64,
    /// Approved same-type usage across all months.
    pub used: f64,
    /// Final running balance; signed.
    pub remaining: f64,
    /// Pending (unapproved) days; informational, never deducted.
    pub pending: f64,
    /// Most recent six months of credit/usage/balance rows.
    pub history: Vec<MonthRow>,
}

/// Usage totals for a bucket the employee's policy does not offer, kept on
/// the report for reference only and excluded from every active total.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReferenceUsage {
    pub used: f64,
    pub pending: f64,
}

/// How pending half-day day-equivalents would split across buckets if they
/// were charged the way approved ones are. Only produced when
/// [`EngineConfig::apportion_pending_half_days`](crate::EngineConfig) is set.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HalfDaySplit {
    pub from_casual: f64,
    pub from_earned: f64,
    pub from_normal: f64,
}

/// Half-day totals and their apportionment into the other buckets.
///
/// Each half-day unit is 0.5 day-equivalents. `from_*` are the approved
/// day-equivalents actually charged to each bucket; records outside the
/// active charging windows (e.g. a previous leave year) appear in the
/// totals but in no `from_*` field.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HalfDaySummary {
    pub approved_units: f64,
    pub approved_days: f64,
    pub pending_units: f64,
    pub pending_days: f64,
    pub from_casual: f64,
    pub from_earned: f64,
    pub from_normal: f64,
    pub pending_split: Option<HalfDaySplit>,
}

/// Leave without pay: no allocation, deduction only. `remaining` is
/// `-used` and therefore never positive.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DeductionBucket {
    pub used: f64,
    pub pending: f64,
    pub remaining: f64,
}

/// The balance report: one entry per bucket that applies to the employee's
/// policy class, plus diagnostics for records the engine could not place.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LeaveBalanceReport {
    pub policy: PolicyClass,
    pub as_of: NaiveDate,
    pub months_since_joining: u32,
    pub years_since_joining: u32,
    pub casual: YearlyBucket,
    /// Standard policy only.
    pub earned: Option<AccrualBucket>,
    /// YP policy only.
    pub normal: Option<AccrualBucket>,
    /// JRF/YP: earned-leave records on file, reported for reference only.
    pub earned_reference: Option<ReferenceUsage>,
    pub half_day: HalfDaySummary,
    pub without_pay: DeductionBucket,
    /// Unrecognised `leave_type` strings and how often each occurred.
    pub unknown_types: BTreeMap<String, u32>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn leave_type_aliases_resolve() {
        assert_eq!(LeaveType::parse("CL"), Some(LeaveType::Casual));
        assert_eq!(LeaveType::parse("cl"), Some(LeaveType::Casual));
        assert_eq!(LeaveType::parse("Casual Leave"), Some(LeaveType::Casual));
        assert_eq!(LeaveType::parse("casual_leave"), Some(LeaveType::Casual));
        assert_eq!(LeaveType::parse("EL"), Some(LeaveType::Earned));
        assert_eq!(LeaveType::parse("earned-leave"), Some(LeaveType::Earned));
        assert_eq!(LeaveType::parse("NL"), Some(LeaveType::Normal));
        assert_eq!(LeaveType::parse("HalfDay"), Some(LeaveType::HalfDay));
        assert_eq!(LeaveType::parse("half day"), Some(LeaveType::HalfDay));
        assert_eq!(LeaveType::parse("HD"), Some(LeaveType::HalfDay));
        assert_eq!(LeaveType::parse("LWP"), Some(LeaveType::WithoutPay));
        assert_eq!(
            LeaveType::parse("Leave Without Pay"),
            Some(LeaveType::WithoutPay)
        );
    }

    #[test]
    fn leave_type_rejects_unknown() {
        assert_eq!(LeaveType::parse("Sabbatical"), None);
        assert_eq!(LeaveType::parse(""), None);
        assert_eq!(LeaveType::parse("CLX"), None);
    }

    #[test]
    fn leave_request_decodes_backend_payload() {
        let json = r#"{
            "leave_type": "CL",
            "from_date": "2025-03-10",
            "to_date": "2025-03-12",
            "total_days": 3,
            "approval_status": "approved",
            "created_at": "2025-03-01T09:30:00Z"
        }"#;
        let leave: LeaveRequest = serde_json::from_str(json).unwrap();
        assert_eq!(leave.leave_type, "CL");
        assert_eq!(
            leave.from_date,
            NaiveDate::from_ymd_opt(2025, 3, 10).unwrap()
        );
        assert_eq!(leave.total_days, 3.0);
        assert_eq!(leave.approval_status, ApprovalStatus::Approved);
        assert!(leave.created_at.is_some());
    }

    #[test]
    fn leave_request_tolerates_missing_created_at() {
        let json = r#"{
            "leave_type": "HalfDay",
            "from_date": "2025-03-10",
            "to_date": "2025-03-10",
            "total_days": 1,
            "approval_status": "pending"
        }"#;
        let leave: LeaveRequest = serde_json::from_str(json).unwrap();
        assert!(leave.created_at.is_none());
        assert_eq!(leave.approval_status, ApprovalStatus::Pending);
    }

    #[test]
    fn profile_fields_all_optional() {
        let profile: EmployeeProfile = serde_json::from_str("{}").unwrap();
        assert!(profile.joining_date.is_none());
        assert!(profile.position.is_none());
        assert!(profile.department.is_none());
    }

    #[test]
    fn approval_status_is_lowercase_on_the_wire() {
        let json = serde_json::to_string(&ApprovalStatus::Rejected).unwrap();
        assert_eq!(json, r#""rejected""#);
    }
}
