//! Leave balance engine: a pure computation from an employee profile and
//! their leave records to a per-bucket balance report.

pub mod balance;
pub mod policy;
pub mod types;

pub use balance::{BalanceError, compute_balance};
pub use policy::{EngineConfig, PolicyClass, PolicyRules};
pub use types::{
    AccrualBucket, ApprovalStatus, DeductionBucket, EmployeeProfile, HalfDaySplit,
    HalfDaySummary, LeaveBalanceReport, LeaveRequest, LeaveType, MonthRow, ReferenceUsage,
    YearlyBucket,
};
