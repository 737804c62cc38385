//! Payroll run state and the reports returned by bulk operations.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{EngineError, EngineResult};

use super::{PayPeriod, PayrollRecord, PayrollTotals};

/// Lifecycle of a payroll run for one period.
///
/// `NotStarted → InProgress → Completed`. A run left `InProgress` by a
/// process that died is moved to `Failed` on recovery and may be retried.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunState {
    /// No run has been attempted for the period.
    NotStarted,
    /// A run is executing.
    InProgress,
    /// Every employee was attempted and the outcome recorded.
    Completed,
    /// The run was interrupted; safe to retry or force-resume.
    Failed,
}

impl RunState {
    /// Returns the storage representation of the state.
    pub fn as_str(&self) -> &'static str {
        match self {
            RunState::NotStarted => "not_started",
            RunState::InProgress => "in_progress",
            RunState::Completed => "completed",
            RunState::Failed => "failed",
        }
    }
}

impl fmt::Display for RunState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RunState {
    type Err = EngineError;

    fn from_str(s: &str) -> EngineResult<Self> {
        match s {
            "not_started" => Ok(RunState::NotStarted),
            "in_progress" => Ok(RunState::InProgress),
            "completed" => Ok(RunState::Completed),
            "failed" => Ok(RunState::Failed),
            other => Err(EngineError::Storage(format!("unknown run state '{}'", other))),
        }
    }
}

/// One payroll generation attempt for a period.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PayrollRun {
    /// Unique identifier of the attempt.
    pub run_id: Uuid,
    /// The period being generated.
    pub period: PayPeriod,
    /// Current state.
    pub state: RunState,
    /// Whether the run was started as a correction.
    pub forced: bool,
    /// Actor that started the run.
    pub started_by: String,
    /// When the run started.
    pub started_at: DateTime<Utc>,
    /// When the run reached a terminal state.
    pub finished_at: Option<DateTime<Utc>>,
    /// Employees with a persisted record after the run.
    pub succeeded: usize,
    /// Employees that failed.
    pub failed: usize,
}

impl PayrollRun {
    /// A fresh in-progress run.
    pub fn start(period: PayPeriod, started_by: impl Into<String>, forced: bool) -> Self {
        Self {
            run_id: Uuid::new_v4(),
            period,
            state: RunState::InProgress,
            forced,
            started_by: started_by.into(),
            started_at: Utc::now(),
            finished_at: None,
            succeeded: 0,
            failed: 0,
        }
    }
}

/// Whether a bulk operation processed every item cleanly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    /// Every item succeeded.
    Complete,
    /// The operation finished but some items failed and are listed.
    PartialFailure,
}

impl Outcome {
    fn from_failures(failures: usize) -> Self {
        if failures == 0 {
            Outcome::Complete
        } else {
            Outcome::PartialFailure
        }
    }
}

/// A batch row that was skipped.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RowFailure {
    /// Zero-based index of the row in the batch.
    pub row: usize,
    /// Employee id from the row, when it had one.
    pub employee_id: Option<String>,
    /// Why the row was skipped.
    pub reason: String,
}

/// Result of an attendance batch ingestion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchReport {
    /// Rows written to the store.
    pub committed: usize,
    /// Of the committed rows, how many replaced an existing record.
    pub replaced: usize,
    /// Rows skipped, in input order.
    pub failed: Vec<RowFailure>,
    /// Overall outcome.
    pub outcome: Outcome,
}

impl BatchReport {
    /// Builds a report and derives its outcome.
    pub fn new(committed: usize, replaced: usize, failed: Vec<RowFailure>) -> Self {
        let outcome = Outcome::from_failures(failed.len());
        Self {
            committed,
            replaced,
            failed,
            outcome,
        }
    }
}

/// An employee the payroll run could not pay.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmployeeFailure {
    /// The employee.
    pub employee_id: String,
    /// Why no record was produced.
    pub reason: String,
}

/// Result of a payroll run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunReport {
    /// The run the report belongs to.
    pub run_id: Uuid,
    /// The period generated.
    pub period: PayPeriod,
    /// Records written by this run, corrections included.
    pub succeeded: usize,
    /// Of the succeeded records, how many replaced an earlier generation.
    pub corrected: usize,
    /// Employees left untouched because a record already existed.
    pub skipped: Vec<String>,
    /// Employees that failed, in processing order.
    pub failed: Vec<EmployeeFailure>,
    /// Overall outcome.
    pub outcome: Outcome,
}

impl RunReport {
    /// Builds a report and derives its outcome.
    pub fn new(
        run_id: Uuid,
        period: PayPeriod,
        succeeded: usize,
        corrected: usize,
        skipped: Vec<String>,
        failed: Vec<EmployeeFailure>,
    ) -> Self {
        let outcome = Outcome::from_failures(failed.len());
        Self {
            run_id,
            period,
            succeeded,
            corrected,
            skipped,
            failed,
            outcome,
        }
    }
}

/// Everything known about payroll for one period.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PayrollSummary {
    /// The period.
    pub period: PayPeriod,
    /// State of the latest run, `NotStarted` if none.
    pub state: RunState,
    /// The latest run, if any.
    pub run: Option<PayrollRun>,
    /// Records for the period, ordered by employee id.
    pub records: Vec<PayrollRecord>,
    /// Totals over `records`.
    pub totals: PayrollTotals,
}
