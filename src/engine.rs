//! The engine facade.
//!
//! [`Engine`] is the inbound interface for a presentation layer: every write
//! takes an explicit [`Actor`], every read is side-effect free. It wires the
//! attendance operations, the payroll rules and the run coordinator to one
//! [`HrStore`].

use std::sync::Arc;

use tracing::info;

use crate::attendance::{self, AttendanceEntry, AttendanceRow, Recorded};
use crate::config::EngineConfig;
use crate::error::{EngineError, EngineResult};
use crate::models::{
    Actor, AttendanceRecord, AttendanceSummary, BatchReport, Compensation, Department, Employee,
    EmployeeStatus, PayPeriod, PayrollRecord, PayrollSummary, RunReport,
};
use crate::payroll::PayrollCoordinator;
use crate::store::HrStore;

/// Attendance reconciliation and payroll over one HR store.
///
/// # Example
///
/// ```
/// use std::sync::Arc;
///
/// use payroll_engine::config::EngineConfig;
/// use payroll_engine::engine::Engine;
/// use payroll_engine::models::{Actor, RunState};
/// use payroll_engine::store::MemoryStore;
///
/// let engine = Engine::new(Arc::new(MemoryStore::new()), EngineConfig::default());
/// let actor = Actor::new("payroll-admin").unwrap();
///
/// let report = engine.generate_payroll(9, 2026, &actor, false).unwrap();
/// assert_eq!(report.succeeded, 0);
/// assert_eq!(engine.get_payroll_summary(9, 2026).unwrap().state, RunState::Completed);
/// ```
pub struct Engine {
    store: Arc<dyn HrStore>,
    config: EngineConfig,
    coordinator: PayrollCoordinator,
}

impl Engine {
    /// Creates an engine over `store` configured by `config`.
    pub fn new(store: Arc<dyn HrStore>, config: EngineConfig) -> Self {
        let coordinator = PayrollCoordinator::new(
            Arc::clone(&store),
            config.payroll.clone(),
            config.attendance.clone(),
        );
        Self {
            store,
            config,
            coordinator,
        }
    }

    /// The configuration the engine runs with.
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    // ── Departments & employees ──────────────────────────────────────────────

    /// Registers a new department.
    pub fn register_department(&self, department: Department, actor: &Actor) -> EngineResult<Department> {
        if department.id.trim().is_empty() {
            return Err(EngineError::validation("id", "department id must not be empty"));
        }
        if department.name.trim().is_empty() {
            return Err(EngineError::validation("name", "department name must not be empty"));
        }
        self.store.insert_department(&department)?;
        info!(department_id = %department.id, actor = %actor, "Department registered");
        Ok(department)
    }

    /// Registers a new employee.
    ///
    /// The referenced department, if any, must exist.
    pub fn register_employee(&self, employee: Employee, actor: &Actor) -> EngineResult<Employee> {
        employee.validate()?;
        if let Some(department_id) = &employee.department_id
            && self.store.department(department_id)?.is_none()
        {
            return Err(EngineError::not_found("department", department_id.clone()));
        }
        self.store.insert_employee(&employee)?;
        info!(
            employee_id = %employee.id,
            status = %employee.status,
            actor = %actor,
            "Employee registered"
        );
        Ok(employee)
    }

    /// Looks up an employee.
    pub fn employee(&self, employee_id: &str) -> EngineResult<Employee> {
        self.store
            .employee(employee_id)?
            .ok_or_else(|| EngineError::not_found("employee", employee_id))
    }

    /// Replaces an employee's compensation structure.
    ///
    /// Existing payroll records keep the figures they were generated with.
    pub fn update_compensation(
        &self,
        employee_id: &str,
        compensation: Compensation,
        actor: &Actor,
    ) -> EngineResult<Employee> {
        compensation.validate()?;
        let employee = self.store.update_compensation(employee_id, &compensation)?;
        info!(employee_id = %employee.id, actor = %actor, "Compensation updated");
        Ok(employee)
    }

    /// Changes an employee's status. Employees are never deleted.
    pub fn set_employee_status(
        &self,
        employee_id: &str,
        status: EmployeeStatus,
        actor: &Actor,
    ) -> EngineResult<Employee> {
        let employee = self.store.set_employee_status(employee_id, status)?;
        info!(employee_id = %employee.id, status = %status, actor = %actor, "Employee status set");
        Ok(employee)
    }

    // ── Attendance ───────────────────────────────────────────────────────────

    /// Records one day of attendance, replacing any earlier record.
    pub fn record_attendance(&self, entry: AttendanceEntry, actor: &Actor) -> EngineResult<Recorded> {
        attendance::record(self.store.as_ref(), entry, actor)
    }

    /// Ingests a batch of raw rows, each committed independently.
    pub fn ingest_attendance_batch(
        &self,
        rows: &[AttendanceRow],
        actor: &Actor,
    ) -> EngineResult<BatchReport> {
        attendance::ingest_batch(self.store.as_ref(), rows, actor)
    }

    /// Ingests a CSV upload with a header line. Unreadable records are
    /// reported per row like any other bad row.
    pub fn ingest_attendance_csv(&self, input: &str, actor: &Actor) -> EngineResult<BatchReport> {
        attendance::ingest_csv(self.store.as_ref(), input, actor)
    }

    /// Summarizes an employee's attendance for a month.
    pub fn attendance_summary(
        &self,
        employee_id: &str,
        month: u32,
        year: i32,
    ) -> EngineResult<AttendanceSummary> {
        let period = PayPeriod::new(month, year)?;
        let employee = self.employee(employee_id)?;
        let records = self.store.employee_attendance(&employee.id, period)?;
        Ok(attendance::summarize(
            &employee.id,
            period,
            &records,
            &self.config.attendance,
        ))
    }

    /// Every attendance record for a month, ordered by employee then date.
    pub fn period_attendance(&self, month: u32, year: i32) -> EngineResult<Vec<AttendanceRecord>> {
        self.store.period_attendance(PayPeriod::new(month, year)?)
    }

    // ── Payroll ──────────────────────────────────────────────────────────────

    /// Generates payroll for a month. See [`PayrollCoordinator::generate`].
    pub fn generate_payroll(
        &self,
        month: u32,
        year: i32,
        actor: &Actor,
        force: bool,
    ) -> EngineResult<RunReport> {
        self.coordinator
            .generate(PayPeriod::new(month, year)?, actor, force)
    }

    /// Run state, records and totals for a month.
    pub fn get_payroll_summary(&self, month: u32, year: i32) -> EngineResult<PayrollSummary> {
        self.coordinator.summary(PayPeriod::new(month, year)?)
    }

    /// An employee's payroll history, newest month first.
    pub fn employee_payroll(&self, employee_id: &str) -> EngineResult<Vec<PayrollRecord>> {
        let employee = self.employee(employee_id)?;
        self.store.employee_payroll(&employee.id)
    }

    /// Marks runs interrupted by a previous process as failed.
    pub fn recover_stale_runs(&self) -> EngineResult<Vec<PayPeriod>> {
        self.coordinator.recover_stale_runs()
    }
}
