//! Policy classes and the rule table that parameterises the engine.
//!
//! The institute runs three leave policies keyed off the employee's
//! free-text position: the standard staff policy, the JRF (junior research
//! fellow) policy, and the YP (young professional) policy. The differences
//! are entirely data: which buckets exist, accrual rates and start
//! conditions, and where half-day units are charged. One rule table per
//! class keeps the balance computation itself single-sourced.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// First day of the YP policy's normal-leave era. Half-days dated on or
/// after it are charged to normal leave instead of casual leave.
pub fn yp_cutover() -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 1, 1).expect("static date")
}

/// The rule set governing an employee's buckets, derived from their
/// position string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PolicyClass {
    Standard,
    Jrf,
    Yp,
}

impl PolicyClass {
    /// Derive the policy class from a free-text position.
    ///
    /// Substring match, case-insensitive: "jrf" → [`PolicyClass::Jrf`],
    /// "yp" → [`PolicyClass::Yp`], anything else (including a missing
    /// position) → [`PolicyClass::Standard`]. When a position contains both
    /// substrings, JRF takes precedence; the order is fixed and deliberate.
    pub fn from_position(position: Option<&str>) -> Self {
        let Some(position) = position else {
            return Self::Standard;
        };
        let position = position.to_lowercase();
        if position.contains("jrf") {
            Self::Jrf
        } else if position.contains("yp") {
            Self::Yp
        } else {
            Self::Standard
        }
    }

    /// The rule table for this class.
    pub fn rules(self) -> PolicyRules {
        match self {
            Self::Standard => PolicyRules {
                casual_per_year: 8.0,
                earned: Some(AccrualRule {
                    per_month: 2.5,
                    start: AccrualStart::SecondMonth,
                }),
                normal: None,
                half_day: HalfDayRouting::SpillToEarned,
            },
            Self::Jrf => PolicyRules {
                casual_per_year: 8.0,
                earned: None,
                normal: None,
                half_day: HalfDayRouting::AllCasual,
            },
            Self::Yp => PolicyRules {
                casual_per_year: 8.0,
                earned: None,
                normal: Some(AccrualRule {
                    per_month: 1.5,
                    start: AccrualStart::FromDate(yp_cutover()),
                }),
                half_day: HalfDayRouting::CutoverToNormal {
                    cutover: yp_cutover(),
                },
            },
        }
    }
}

/// Bucket rules for one policy class.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PolicyRules {
    /// Casual leave allocation per leave year (anniversary-anchored).
    pub casual_per_year: f64,
    /// Earned leave accrual, if the class offers it.
    pub earned: Option<AccrualRule>,
    /// Normal leave accrual, if the class offers it.
    pub normal: Option<AccrualRule>,
    /// Where approved half-day units are charged.
    pub half_day: HalfDayRouting,
}

/// A monthly accrual schedule.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AccrualRule {
    pub per_month: f64,
    pub start: AccrualStart,
}

/// When an accrual schedule begins crediting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccrualStart {
    /// Credits begin the second calendar month after joining.
    SecondMonth,
    /// Credits begin at a fixed calendar date, and never before the
    /// joining month.
    FromDate(NaiveDate),
}

/// Where half-day units land.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HalfDayRouting {
    /// Charge casual leave first; spill the excess into earned leave.
    SpillToEarned,
    /// Fold every half-day into casual leave.
    AllCasual,
    /// Charge casual leave before the cutover date, normal leave from it.
    CutoverToNormal { cutover: NaiveDate },
}

/// Engine knobs for behaviour the institute has not pinned down.
#[derive(Debug, Clone, Copy, Default)]
pub struct EngineConfig {
    /// Apportion pending half-days across buckets the same way approved
    /// ones are charged. The source systems disagree on this, so it is a
    /// switch rather than a rule; off by default, in which case pending
    /// half-days appear only in the half-day summary.
    pub apportion_pending_half_days: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_position_is_standard() {
        assert_eq!(PolicyClass::from_position(None), PolicyClass::Standard);
    }

    #[test]
    fn plain_positions_are_standard() {
        assert_eq!(
            PolicyClass::from_position(Some("Senior Engineer")),
            PolicyClass::Standard
        );
        assert_eq!(
            PolicyClass::from_position(Some("Project Scientist")),
            PolicyClass::Standard
        );
    }

    #[test]
    fn jrf_substring_matches_case_insensitively() {
        assert_eq!(PolicyClass::from_position(Some("JRF")), PolicyClass::Jrf);
        assert_eq!(
            PolicyClass::from_position(Some("Senior jrf (Chemistry)")),
            PolicyClass::Jrf
        );
    }

    #[test]
    fn yp_substring_matches_case_insensitively() {
        assert_eq!(
            PolicyClass::from_position(Some("YP Fellow")),
            PolicyClass::Yp
        );
        assert_eq!(
            PolicyClass::from_position(Some("yp-2024 batch")),
            PolicyClass::Yp
        );
    }

    #[test]
    fn jrf_wins_when_both_substrings_present() {
        assert_eq!(
            PolicyClass::from_position(Some("JRF (YP track)")),
            PolicyClass::Jrf
        );
        assert_eq!(
            PolicyClass::from_position(Some("yp jrf")),
            PolicyClass::Jrf
        );
    }

    #[test]
    fn rule_table_shapes() {
        let standard = PolicyClass::Standard.rules();
        assert_eq!(standard.casual_per_year, 8.0);
        assert_eq!(standard.earned.unwrap().per_month, 2.5);
        assert!(standard.normal.is_none());
        assert_eq!(standard.half_day, HalfDayRouting::SpillToEarned);

        let jrf = PolicyClass::Jrf.rules();
        assert!(jrf.earned.is_none());
        assert!(jrf.normal.is_none());
        assert_eq!(jrf.half_day, HalfDayRouting::AllCasual);

        let yp = PolicyClass::Yp.rules();
        assert!(yp.earned.is_none());
        let normal = yp.normal.unwrap();
        assert_eq!(normal.per_month, 1.5);
        assert_eq!(normal.start, AccrualStart::FromDate(yp_cutover()));
        assert_eq!(
            yp.half_day,
            HalfDayRouting::CutoverToNormal {
                cutover: yp_cutover()
            }
        );
    }
}
