//! The leave balance computation.
//!
//! A pure function over an employee profile and their leave records: no
//! I/O, no shared state, safe to call repeatedly (the consuming layer may
//! invoke it on every render) and from any number of call sites at once.
//! The one precondition is ordering, not locking: the caller must have
//! finished fetching the records before invoking it.
//!
//! All arithmetic is full-precision `f64`; day quantities are multiples of
//! 0.5, so sums stay exact. Rounding is a presentation concern and happens
//! at the display boundary, never here.

use std::collections::BTreeMap;

use chrono::{Datelike, Months, NaiveDate};
use thiserror::Error;

use crate::policy::{AccrualRule, AccrualStart, EngineConfig, HalfDayRouting, PolicyClass};
use crate::types::{
    AccrualBucket, ApprovalStatus, DeductionBucket, EmployeeProfile, HalfDaySplit,
    HalfDaySummary, LeaveBalanceReport, LeaveRequest, LeaveType, MonthRow, ReferenceUsage,
    YearlyBucket,
};

/// Monthly history rows retained per accrual bucket.
const HISTORY_MONTHS: usize = 6;

/// Day-equivalents per half-day unit.
const HALF_DAY: f64 = 0.5;

#[derive(Debug, Error, PartialEq)]
pub enum BalanceError {
    /// Joining date not yet entered: the balance is undefined, not broken.
    /// Callers should render this as a display state rather than a failure.
    #[error("joining date not available; cannot calculate leave balance")]
    MissingJoiningDate,

    /// A record carried a non-finite or negative day count. Rejected at the
    /// boundary so NaN never propagates into a report.
    #[error("leave record {index}: invalid day count {value}")]
    InvalidDayCount { index: usize, value: f64 },
}

/// Compute the leave balance report for one employee as of a given date.
///
/// Idempotent: the same `(profile, leaves, as_of, config)` always yields an
/// identical report. The policy class is derived from the profile's
/// position string; which buckets appear on the report follows from it.
pub fn compute_balance(
    profile: &EmployeeProfile,
    leaves: &[LeaveRequest],
    as_of: NaiveDate,
    config: &EngineConfig,
) -> Result<LeaveBalanceReport, BalanceError> {
    let joining = profile
        .joining_date
        .ok_or(BalanceError::MissingJoiningDate)?;

    for (index, leave) in leaves.iter().enumerate() {
        if !leave.total_days.is_finite() || leave.total_days < 0.0 {
            return Err(BalanceError::InvalidDayCount {
                index,
                value: leave.total_days,
            });
        }
    }

    let policy = PolicyClass::from_position(profile.position.as_deref());
    let rules = policy.rules();

    // Tenure is calendar-month granular: the joining month and the as-of
    // month both count.
    let month_span = (as_of.year() - joining.year()) * 12
        + (as_of.month() as i32 - joining.month() as i32)
        + 1;
    let months_since_joining = month_span.max(0) as u32;
    let years_since_joining = months_since_joining / 12;

    // Leave year anchored to the joining-date anniversary.
    let year_start = add_months(joining, years_since_joining * 12);
    let year_end = add_months(year_start, 12);

    // Accrual usage is charged month by month, so it stops at the end of
    // the as-of month; records dated past it must not inflate the reported
    // usage either.
    let horizon = add_months(first_of_month(joining), months_since_joining);

    // Normalise record types once; unrecognised strings become diagnostics
    // and take part in no bucket.
    let mut unknown_types: BTreeMap<String, u32> = BTreeMap::new();
    let mut records: Vec<(LeaveType, &LeaveRequest)> = Vec::with_capacity(leaves.len());
    for leave in leaves {
        match LeaveType::parse(&leave.leave_type) {
            Some(kind) => records.push((kind, leave)),
            None => {
                tracing::warn!(
                    leave_type = %leave.leave_type,
                    "unrecognised leave type, excluded from all buckets"
                );
                *unknown_types.entry(leave.leave_type.clone()).or_insert(0) += 1;
            }
        }
    }

    let in_leave_year = |d: NaiveDate| d >= year_start && d < year_end;

    // Casual leave: fixed yearly allocation, anniversary window, floored
    // at zero.
    let cl_typed_used = typed_days_between(
        &records,
        LeaveType::Casual,
        ApprovalStatus::Approved,
        year_start,
        year_end,
    );
    let mut cl_pending = typed_days(&records, LeaveType::Casual, ApprovalStatus::Pending);

    // Approved half-day day-equivalents charged per bucket.
    let (hd_from_casual, hd_from_earned, hd_from_normal) = match rules.half_day {
        HalfDayRouting::SpillToEarned => {
            let h = HALF_DAY * half_day_units(&records, ApprovalStatus::Approved, in_leave_year);
            let headroom = (rules.casual_per_year - cl_typed_used).max(0.0);
            let from_casual = h.min(headroom);
            (from_casual, h - from_casual, 0.0)
        }
        HalfDayRouting::AllCasual => {
            let h = HALF_DAY * half_day_units(&records, ApprovalStatus::Approved, in_leave_year);
            (h, 0.0, 0.0)
        }
        HalfDayRouting::CutoverToNormal { cutover } => {
            let before = HALF_DAY
                * half_day_units(&records, ApprovalStatus::Approved, |d| {
                    in_leave_year(d) && d < cutover
                });
            let after = HALF_DAY
                * half_day_units(&records, ApprovalStatus::Approved, |d| {
                    d >= cutover && d < horizon
                });
            (before, 0.0, after)
        }
    };

    let cl_used = cl_typed_used + hd_from_casual;
    let cl_remaining = (rules.casual_per_year - cl_used).max(0.0);

    // Pending half-days are only apportioned when configured; the source
    // systems never agreed on this.
    let pending_split = config.apportion_pending_half_days.then(|| match rules.half_day {
        HalfDayRouting::SpillToEarned => {
            let h = HALF_DAY * half_day_units(&records, ApprovalStatus::Pending, in_leave_year);
            let from_casual = h.min(cl_remaining);
            HalfDaySplit {
                from_casual,
                from_earned: h - from_casual,
                from_normal: 0.0,
            }
        }
        HalfDayRouting::AllCasual => HalfDaySplit {
            from_casual: HALF_DAY
                * half_day_units(&records, ApprovalStatus::Pending, in_leave_year),
            from_earned: 0.0,
            from_normal: 0.0,
        },
        HalfDayRouting::CutoverToNormal { cutover } => HalfDaySplit {
            from_casual: HALF_DAY
                * half_day_units(&records, ApprovalStatus::Pending, |d| {
                    in_leave_year(d) && d < cutover
                }),
            from_earned: 0.0,
            from_normal: HALF_DAY
                * half_day_units(&records, ApprovalStatus::Pending, |d| d >= cutover),
        },
    });

    let (mut pending_earned_extra, mut pending_normal_extra) = (0.0, 0.0);
    if let Some(split) = &pending_split {
        cl_pending += split.from_casual;
        pending_earned_extra = split.from_earned;
        pending_normal_extra = split.from_normal;
    }

    let earned = rules.earned.map(|rule| {
        accrue(
            &records,
            LeaveType::Earned,
            rule,
            joining,
            months_since_joining,
            horizon,
            None,
            hd_from_earned,
            pending_earned_extra,
        )
    });

    let normal_cutover = match rules.half_day {
        HalfDayRouting::CutoverToNormal { cutover } => Some(cutover),
        _ => None,
    };
    let normal = rules.normal.map(|rule| {
        accrue(
            &records,
            LeaveType::Normal,
            rule,
            joining,
            months_since_joining,
            horizon,
            normal_cutover,
            0.0,
            pending_normal_extra,
        )
    });

    // Earned-leave records under a policy that does not offer EL stay on
    // the report for reference and join no active total.
    let earned_reference = rules.earned.is_none().then(|| ReferenceUsage {
        used: typed_days(&records, LeaveType::Earned, ApprovalStatus::Approved),
        pending: typed_days(&records, LeaveType::Earned, ApprovalStatus::Pending),
    });

    let approved_units = half_day_units(&records, ApprovalStatus::Approved, |_| true);
    let pending_units = half_day_units(&records, ApprovalStatus::Pending, |_| true);
    let half_day = HalfDaySummary {
        approved_units,
        approved_days: HALF_DAY * approved_units,
        pending_units,
        pending_days: HALF_DAY * pending_units,
        from_casual: hd_from_casual,
        from_earned: hd_from_earned,
        from_normal: hd_from_normal,
        pending_split,
    };

    let lwp_used = typed_days(&records, LeaveType::WithoutPay, ApprovalStatus::Approved);
    let without_pay = DeductionBucket {
        used: lwp_used,
        pending: typed_days(&records, LeaveType::WithoutPay, ApprovalStatus::Pending),
        remaining: -lwp_used,
    };

    Ok(LeaveBalanceReport {
        policy,
        as_of,
        months_since_joining,
        years_since_joining,
        casual: YearlyBucket {
            allocated: rules.casual_per_year,
            used: cl_used,
            remaining: cl_remaining,
            pending: cl_pending,
            year_start,
            year_end,
        },
        earned,
        normal,
        earned_reference,
        half_day,
        without_pay,
        unknown_types,
    })
}

/// Run one accrual schedule month by month from the joining month through
/// the as-of month.
///
/// `half_day_cutover` makes post-cutover half-day day-equivalents part of
/// each month's usage (the YP normal-leave rule). `lump_deduction` is
/// subtracted from the final balance without touching any history row (the
/// standard policy's half-day spillover into earned leave). The bucket's
/// `used` total is bounded at `horizon` so it covers the same months the
/// loop charges.
#[allow(clippy::too_many_arguments)]
fn accrue(
    records: &[(LeaveType, &LeaveRequest)],
    kind: LeaveType,
    rule: AccrualRule,
    joining: NaiveDate,
    months_since_joining: u32,
    horizon: NaiveDate,
    half_day_cutover: Option<NaiveDate>,
    lump_deduction: f64,
    pending_extra: f64,
) -> AccrualBucket {
    let joining_month = first_of_month(joining);
    let mut balance = 0.0;
    let mut accumulated = 0.0;
    let mut history = Vec::with_capacity(months_since_joining as usize);

    for i in 0..months_since_joining {
        let month_start = add_months(joining_month, i);
        let month_end = add_months(month_start, 1);

        let credit = match rule.start {
            AccrualStart::SecondMonth if i == 0 => 0.0,
            AccrualStart::FromDate(start) if month_start < first_of_month(start) => 0.0,
            _ => rule.per_month,
        };
        balance += credit;
        accumulated += credit;

        let mut used = typed_days_between(
            records,
            kind,
            ApprovalStatus::Approved,
            month_start,
            month_end,
        );
        if let Some(cutover) = half_day_cutover {
            used += HALF_DAY
                * half_day_units(records, ApprovalStatus::Approved, |d| {
                    d >= cutover && d >= month_start && d < month_end
                });
        }
        balance -= used;

        history.push(MonthRow {
            month: month_start,
            credit,
            used,
            balance,
        });
    }

    balance -= lump_deduction;

    if history.len() > HISTORY_MONTHS {
        history.drain(..history.len() - HISTORY_MONTHS);
    }

    AccrualBucket {
        per_month: rule.per_month,
        accumulated,
        used: typed_days_between(records, kind, ApprovalStatus::Approved, NaiveDate::MIN, horizon),
        remaining: balance,
        pending: typed_days(records, kind, ApprovalStatus::Pending) + pending_extra,
        history,
    }
}

fn typed_days(
    records: &[(LeaveType, &LeaveRequest)],
    kind: LeaveType,
    status: ApprovalStatus,
) -> f64 {
    records
        .iter()
        .filter(|(k, l)| *k == kind && l.approval_status == status)
        .map(|(_, l)| l.total_days)
        .sum()
}

/// Sum of `total_days` for records of `kind`/`status` whose `from_date`
/// falls in `[start, end)`.
fn typed_days_between(
    records: &[(LeaveType, &LeaveRequest)],
    kind: LeaveType,
    status: ApprovalStatus,
    start: NaiveDate,
    end: NaiveDate,
) -> f64 {
    records
        .iter()
        .filter(|(k, l)| {
            *k == kind && l.approval_status == status && l.from_date >= start && l.from_date < end
        })
        .map(|(_, l)| l.total_days)
        .sum()
}

/// Sum of half-day units (not day-equivalents) matching `status` and the
/// date predicate.
fn half_day_units(
    records: &[(LeaveType, &LeaveRequest)],
    status: ApprovalStatus,
    pred: impl Fn(NaiveDate) -> bool,
) -> f64 {
    records
        .iter()
        .filter(|(k, l)| {
            *k == LeaveType::HalfDay && l.approval_status == status && pred(l.from_date)
        })
        .map(|(_, l)| l.total_days)
        .sum()
}

fn first_of_month(d: NaiveDate) -> NaiveDate {
    NaiveDate::from_ymd_opt(d.year(), d.month(), 1).expect("first of month is valid")
}

fn add_months(d: NaiveDate, months: u32) -> NaiveDate {
    d.checked_add_months(Months::new(months))
        .expect("date within chrono range")
}
