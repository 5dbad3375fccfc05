//! Sectioned card rendering for leave balance reports.
//!
//! The engine keeps full precision; every day quantity is rounded to one
//! decimal here and nowhere else.

use std::fmt::Display;

use leavedesk_core::{
    AccrualBucket, LeaveBalanceReport, PolicyClass, ReferenceUsage, YearlyBucket,
};

/// Format a day quantity at one-decimal display precision.
pub fn fmt_days(days: f64) -> String {
    format!("{days:.1}")
}

/// Label for an accrual balance. A deficit is a valid state that future
/// monthly credits recover, so it is labelled, not flagged.
pub fn balance_label(remaining: f64) -> String {
    if remaining < 0.0 {
        format!("{} days deficit (recovers monthly)", fmt_days(-remaining))
    } else {
        format!("{} days left", fmt_days(remaining))
    }
}

fn policy_name(policy: PolicyClass) -> &'static str {
    match policy {
        PolicyClass::Standard => "Standard",
        PolicyClass::Jrf => "JRF",
        PolicyClass::Yp => "YP",
    }
}

/// Print a balance report as a grouped, human-readable card.
pub fn print_report(report: &LeaveBalanceReport) {
    println!(
        "=== Leave Balance ({} policy) ===",
        policy_name(report.policy)
    );
    println!("As of {}", report.as_of);
    println!();

    println!("Tenure");
    field("months since joining", report.months_since_joining);
    field("years since joining", report.years_since_joining);
    println!();

    print_casual(&report.casual);

    match (&report.earned, &report.earned_reference) {
        (Some(bucket), _) => print_accrual("Earned Leave (EL)", bucket),
        (None, Some(reference)) => print_reference("Earned Leave (EL)", reference),
        (None, None) => {}
    }

    if let Some(bucket) = &report.normal {
        print_accrual("Normal Leave (NL)", bucket);
    }

    println!("Half-day");
    field("approved units", fmt_days(report.half_day.approved_units));
    field("approved days", fmt_days(report.half_day.approved_days));
    field("pending days", fmt_days(report.half_day.pending_days));
    field("charged to CL", fmt_days(report.half_day.from_casual));
    field("charged to EL", fmt_days(report.half_day.from_earned));
    field("charged to NL", fmt_days(report.half_day.from_normal));
    if let Some(split) = &report.half_day.pending_split {
        field(
            "pending split (CL/EL/NL)",
            format!(
                "{} / {} / {}",
                fmt_days(split.from_casual),
                fmt_days(split.from_earned),
                fmt_days(split.from_normal)
            ),
        );
    }
    println!();

    println!("Leave Without Pay (LWP)");
    field("used", fmt_days(report.without_pay.used));
    field("pending", fmt_days(report.without_pay.pending));
    field("impact", fmt_days(report.without_pay.remaining));
    println!();

    if !report.unknown_types.is_empty() {
        println!("Diagnostics");
        for (raw, count) in &report.unknown_types {
            field(
                "unrecognised type",
                format!("{raw:?} ({count} record{})", if *count == 1 { "" } else { "s" }),
            );
        }
        println!();
    }
}

fn print_casual(bucket: &YearlyBucket) {
    println!("Casual Leave (CL)");
    field("allocated / year", fmt_days(bucket.allocated));
    field("used this year", fmt_days(bucket.used));
    field("remaining", format!("{} days left", fmt_days(bucket.remaining)));
    field("pending", fmt_days(bucket.pending));
    field(
        "leave year",
        format!("{} to {}", bucket.year_start, bucket.year_end),
    );
    println!();
}

fn print_accrual(header: &str, bucket: &AccrualBucket) {
    println!("{header}");
    field("monthly credit", fmt_days(bucket.per_month));
    field("accumulated", fmt_days(bucket.accumulated));
    field("used", fmt_days(bucket.used));
    field("pending", fmt_days(bucket.pending));
    field("balance", balance_label(bucket.remaining));
    if !bucket.history.is_empty() {
        println!("  last {} months:", bucket.history.len());
        for row in &bucket.history {
            println!(
                "    {}  +{}  -{}  {}",
                row.month.format("%b %Y"),
                fmt_days(row.credit),
                fmt_days(row.used),
                fmt_days(row.balance)
            );
        }
    }
    println!();
}

fn print_reference(header: &str, reference: &ReferenceUsage) {
    println!("{header}");
    field("offered", "no (shown for reference only)");
    field("used on record", fmt_days(reference.used));
    field("pending on record", fmt_days(reference.pending));
    println!();
}

fn field(name: &str, value: impl Display) {
    println!("  {name:<26} {value}");
}
