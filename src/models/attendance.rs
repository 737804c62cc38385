//! Attendance models.
//!
//! One [`AttendanceRecord`] exists per (employee, date). The
//! [`AttendanceSummary`] is the per-period digest consumed by the payroll
//! rules.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::{EngineError, EngineResult};

use super::PayPeriod;

/// Presence status of an employee on one day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AttendanceStatus {
    /// Worked that day.
    Present,
    /// Did not work and is not covered by leave.
    Absent,
    /// On approved leave.
    Leave,
    /// Public or company holiday.
    Holiday,
}

impl AttendanceStatus {
    /// Returns the storage representation of the status.
    pub fn as_str(&self) -> &'static str {
        match self {
            AttendanceStatus::Present => "present",
            AttendanceStatus::Absent => "absent",
            AttendanceStatus::Leave => "leave",
            AttendanceStatus::Holiday => "holiday",
        }
    }
}

impl fmt::Display for AttendanceStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AttendanceStatus {
    type Err = EngineError;

    fn from_str(s: &str) -> EngineResult<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "present" => Ok(AttendanceStatus::Present),
            "absent" => Ok(AttendanceStatus::Absent),
            "leave" => Ok(AttendanceStatus::Leave),
            "holiday" => Ok(AttendanceStatus::Holiday),
            other => Err(EngineError::validation(
                "status",
                format!("unknown attendance status '{}'", other),
            )),
        }
    }
}

/// A single day of attendance for one employee.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttendanceRecord {
    /// The employee the record belongs to.
    pub employee_id: String,
    /// The calendar date.
    pub date: NaiveDate,
    /// Time the employee checked in.
    pub check_in: Option<NaiveTime>,
    /// Time the employee checked out.
    pub check_out: Option<NaiveTime>,
    /// Hours derived from check-in and check-out, clamped to [0, 24].
    pub hours_worked: Option<Decimal>,
    /// Presence status for the day.
    pub status: AttendanceStatus,
    /// Actor that recorded or uploaded the entry.
    pub recorded_by: String,
    /// When the entry was written.
    pub recorded_at: DateTime<Utc>,
}

/// Attendance digest of one employee over one period.
///
/// # Example
///
/// ```
/// use payroll_engine::models::{AttendanceSummary, PayPeriod};
///
/// let period = PayPeriod::new(4, 2026).unwrap();
/// let summary = AttendanceSummary::empty("EMP0001", period);
/// assert_eq!(summary.absent_days, 30);
/// assert_eq!(summary.payable_days, 0);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttendanceSummary {
    /// The employee summarized.
    pub employee_id: String,
    /// The period summarized.
    pub period: PayPeriod,
    /// Days the employee is compensated for.
    pub payable_days: u32,
    /// Days marked present.
    pub present_days: u32,
    /// Days marked absent plus days with no record.
    pub absent_days: u32,
    /// Days on approved leave.
    pub leave_days: u32,
    /// Days marked as holidays.
    pub holiday_days: u32,
    /// Sum of derived hours worked.
    pub total_hours: Decimal,
}

impl AttendanceSummary {
    /// A summary with no recorded days: every day of the period is absent.
    pub fn empty(employee_id: impl Into<String>, period: PayPeriod) -> Self {
        Self {
            employee_id: employee_id.into(),
            period,
            payable_days: 0,
            present_days: 0,
            absent_days: period.days_in_month(),
            leave_days: 0,
            holiday_days: 0,
            total_hours: Decimal::ZERO,
        }
    }
}
