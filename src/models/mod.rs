//! Core data models for the payroll engine.
//!
//! This module contains all the domain models used throughout the engine.

mod actor;
mod attendance;
mod audit;
mod employee;
mod payroll;
mod period;
mod run;

pub use actor::Actor;
pub use attendance::{AttendanceRecord, AttendanceStatus, AttendanceSummary};
pub use audit::AuditStep;
pub use employee::{
    Compensation, CompensationStructure, Department, Employee, EmployeeStatus, MAX_COMPONENT,
};
pub use payroll::{Deductions, Earnings, PayrollFigures, PayrollRecord, PayrollTotals, ProrationMode};
pub use period::{MAX_YEAR, MIN_YEAR, PayPeriod};
pub use run::{
    BatchReport, EmployeeFailure, Outcome, PayrollRun, PayrollSummary, RowFailure, RunReport,
    RunState,
};
