//! Persistence for the payroll engine.
//!
//! [`HrStore`] is the seam between the engine and its backing storage. The
//! engine depends on this abstraction, not on a concrete backend:
//! [`MemoryStore`] serves tests and embedded use, [`SqliteStore`] is the
//! durable relational backend.
//!
//! Uniqueness of (employee, date) attendance, (employee, month, year)
//! payroll records and (month, year) runs is enforced by the store.

mod memory;
mod sqlite;

use chrono::NaiveDate;

use crate::error::{EngineError, EngineResult};
use crate::models::{
    AttendanceRecord, Compensation, Department, Employee, EmployeeStatus, PayPeriod,
    PayrollRecord, PayrollRun, RunState,
};

pub use memory::MemoryStore;
pub use sqlite::SqliteStore;

/// Abstraction over an HR data store backend.
///
/// All methods are synchronous and the trait is object safe so the engine
/// can hold an `Arc<dyn HrStore>`.
pub trait HrStore: Send + Sync {
    // ── Departments ──────────────────────────────────────────────────────

    /// Persist a new department. `Conflict` if the id exists.
    fn insert_department(&self, department: &Department) -> EngineResult<()>;

    /// Look up a department by id.
    fn department(&self, id: &str) -> EngineResult<Option<Department>>;

    // ── Employees ────────────────────────────────────────────────────────

    /// Persist a new employee. `Conflict` if the id or email exists.
    fn insert_employee(&self, employee: &Employee) -> EngineResult<()>;

    /// Replace only the compensation of an existing employee and return the
    /// stored row. `NotFound` if the id is unknown.
    fn update_compensation(&self, id: &str, compensation: &Compensation)
    -> EngineResult<Employee>;

    /// Set only the status of an existing employee and return the stored
    /// row. `NotFound` if the id is unknown.
    fn set_employee_status(&self, id: &str, status: EmployeeStatus) -> EngineResult<Employee>;

    /// Look up an employee by id.
    fn employee(&self, id: &str) -> EngineResult<Option<Employee>>;

    /// Active employees ordered by id.
    fn active_employees(&self) -> EngineResult<Vec<Employee>>;

    // ── Attendance ───────────────────────────────────────────────────────

    /// Insert or replace the record for (employee, date).
    ///
    /// Returns `true` when an existing record was replaced.
    fn upsert_attendance(&self, record: &AttendanceRecord) -> EngineResult<bool>;

    /// The record for (employee, date), if any.
    fn attendance(&self, employee_id: &str, date: NaiveDate)
    -> EngineResult<Option<AttendanceRecord>>;

    /// An employee's records within `period`, ordered by date.
    fn employee_attendance(
        &self,
        employee_id: &str,
        period: PayPeriod,
    ) -> EngineResult<Vec<AttendanceRecord>>;

    /// All records within `period`, ordered by employee then date.
    fn period_attendance(&self, period: PayPeriod) -> EngineResult<Vec<AttendanceRecord>>;

    // ── Payroll records ──────────────────────────────────────────────────

    /// The record for (employee, period), if any.
    fn payroll_record(
        &self,
        employee_id: &str,
        period: PayPeriod,
    ) -> EngineResult<Option<PayrollRecord>>;

    /// Persist a first-generation record. `Conflict` if one exists.
    fn insert_payroll(&self, record: &PayrollRecord) -> EngineResult<()>;

    /// Replace an existing record as a correction. `NotFound` if none exists.
    fn replace_payroll(&self, record: &PayrollRecord) -> EngineResult<()>;

    /// All records for `period`, ordered by employee id.
    fn period_payroll(&self, period: PayPeriod) -> EngineResult<Vec<PayrollRecord>>;

    /// All records for an employee, newest period first.
    fn employee_payroll(&self, employee_id: &str) -> EngineResult<Vec<PayrollRecord>>;

    // ── Runs ─────────────────────────────────────────────────────────────

    /// The latest run for `period`, if any.
    fn payroll_run(&self, period: PayPeriod) -> EngineResult<Option<PayrollRun>>;

    /// Atomically claim `run.period` for `run`.
    ///
    /// Fails with `Conflict` when the period has an `InProgress` run, or a
    /// `Completed` run and `run.forced` is false. A `Failed` run is replaced.
    fn begin_run(&self, run: &PayrollRun) -> EngineResult<()>;

    /// Persist the terminal state of a run previously claimed by `begin_run`.
    fn finish_run(&self, run: &PayrollRun) -> EngineResult<()>;

    /// Move every `InProgress` run to `Failed`, returning their periods.
    ///
    /// Called once at startup: a run still in progress then was abandoned by
    /// a process that exited.
    fn fail_in_progress_runs(&self) -> EngineResult<Vec<PayPeriod>>;
}

/// Decides whether `run` may claim its period given the period's latest run.
pub(crate) fn check_run_claim(existing: Option<&PayrollRun>, run: &PayrollRun) -> EngineResult<()> {
    let Some(existing) = existing else {
        return Ok(());
    };
    match existing.state {
        RunState::InProgress => Err(EngineError::conflict(format!(
            "payroll run {} for {} is already in progress",
            existing.run_id, existing.period
        ))),
        RunState::Completed if !run.forced => Err(EngineError::conflict(format!(
            "payroll for {} was already completed by run {}; regenerate with force to correct it",
            existing.period, existing.run_id
        ))),
        _ => Ok(()),
    }
}

#[cfg(test)]
pub(crate) mod contract;
