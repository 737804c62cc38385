//! [`MemoryStore`]: an in-process [`HrStore`] backed by ordered maps.

use std::collections::BTreeMap;
use std::sync::{Mutex, MutexGuard};

use chrono::NaiveDate;

use crate::error::{EngineError, EngineResult};
use crate::models::{
    AttendanceRecord, Compensation, Department, Employee, EmployeeStatus, PayPeriod,
    PayrollRecord, PayrollRun, RunState,
};

use super::{HrStore, check_run_claim};

#[derive(Debug, Default)]
struct Tables {
    departments: BTreeMap<String, Department>,
    employees: BTreeMap<String, Employee>,
    attendance: BTreeMap<(String, NaiveDate), AttendanceRecord>,
    payroll: BTreeMap<(String, PayPeriod), PayrollRecord>,
    runs: BTreeMap<PayPeriod, PayrollRun>,
}

/// A volatile store holding everything in memory.
///
/// A single mutex guards all tables, so every trait method is atomic.
#[derive(Debug, Default)]
pub struct MemoryStore {
    tables: Mutex<Tables>,
}

impl MemoryStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> EngineResult<MutexGuard<'_, Tables>> {
        self.tables
            .lock()
            .map_err(|_| EngineError::Storage("memory store lock poisoned".to_string()))
    }
}

impl HrStore for MemoryStore {
    fn insert_department(&self, department: &Department) -> EngineResult<()> {
        let mut tables = self.lock()?;
        if tables.departments.contains_key(&department.id) {
            return Err(EngineError::conflict(format!(
                "department {} already exists",
                department.id
            )));
        }
        tables
            .departments
            .insert(department.id.clone(), department.clone());
        Ok(())
    }

    fn department(&self, id: &str) -> EngineResult<Option<Department>> {
        Ok(self.lock()?.departments.get(id).cloned())
    }

    fn insert_employee(&self, employee: &Employee) -> EngineResult<()> {
        let mut tables = self.lock()?;
        if tables.employees.contains_key(&employee.id) {
            return Err(EngineError::conflict(format!(
                "employee {} already exists",
                employee.id
            )));
        }
        if let Some(email) = &employee.email
            && tables
                .employees
                .values()
                .any(|other| other.email.as_deref() == Some(email.as_str()))
        {
            return Err(EngineError::conflict(format!(
                "email {} is already in use",
                email
            )));
        }
        tables
            .employees
            .insert(employee.id.clone(), employee.clone());
        Ok(())
    }

    fn update_compensation(
        &self,
        id: &str,
        compensation: &Compensation,
    ) -> EngineResult<Employee> {
        let mut tables = self.lock()?;
        let employee = tables
            .employees
            .get_mut(id)
            .ok_or_else(|| EngineError::not_found("employee", id))?;
        employee.compensation = compensation.clone();
        Ok(employee.clone())
    }

    fn set_employee_status(&self, id: &str, status: EmployeeStatus) -> EngineResult<Employee> {
        let mut tables = self.lock()?;
        let employee = tables
            .employees
            .get_mut(id)
            .ok_or_else(|| EngineError::not_found("employee", id))?;
        employee.status = status;
        Ok(employee.clone())
    }

    fn employee(&self, id: &str) -> EngineResult<Option<Employee>> {
        Ok(self.lock()?.employees.get(id).cloned())
    }

    fn active_employees(&self) -> EngineResult<Vec<Employee>> {
        Ok(self
            .lock()?
            .employees
            .values()
            .filter(|e| e.is_active())
            .cloned()
            .collect())
    }

    fn upsert_attendance(&self, record: &AttendanceRecord) -> EngineResult<bool> {
        let key = (record.employee_id.clone(), record.date);
        let previous = self.lock()?.attendance.insert(key, record.clone());
        Ok(previous.is_some())
    }

    fn attendance(
        &self,
        employee_id: &str,
        date: NaiveDate,
    ) -> EngineResult<Option<AttendanceRecord>> {
        let key = (employee_id.to_string(), date);
        Ok(self.lock()?.attendance.get(&key).cloned())
    }

    fn employee_attendance(
        &self,
        employee_id: &str,
        period: PayPeriod,
    ) -> EngineResult<Vec<AttendanceRecord>> {
        let start = (employee_id.to_string(), period.first_day());
        let end = (employee_id.to_string(), period.last_day());
        Ok(self
            .lock()?
            .attendance
            .range(start..=end)
            .map(|(_, record)| record.clone())
            .collect())
    }

    fn period_attendance(&self, period: PayPeriod) -> EngineResult<Vec<AttendanceRecord>> {
        Ok(self
            .lock()?
            .attendance
            .values()
            .filter(|record| period.contains(record.date))
            .cloned()
            .collect())
    }

    fn payroll_record(
        &self,
        employee_id: &str,
        period: PayPeriod,
    ) -> EngineResult<Option<PayrollRecord>> {
        let key = (employee_id.to_string(), period);
        Ok(self.lock()?.payroll.get(&key).cloned())
    }

    fn insert_payroll(&self, record: &PayrollRecord) -> EngineResult<()> {
        let mut tables = self.lock()?;
        let key = (record.employee_id.clone(), record.period);
        if tables.payroll.contains_key(&key) {
            return Err(EngineError::conflict(format!(
                "payroll record for {} in {} already exists",
                record.employee_id, record.period
            )));
        }
        tables.payroll.insert(key, record.clone());
        Ok(())
    }

    fn replace_payroll(&self, record: &PayrollRecord) -> EngineResult<()> {
        let mut tables = self.lock()?;
        let key = (record.employee_id.clone(), record.period);
        match tables.payroll.get_mut(&key) {
            Some(existing) => {
                *existing = record.clone();
                Ok(())
            }
            None => Err(EngineError::not_found(
                "payroll record",
                format!("{}/{}", record.employee_id, record.period),
            )),
        }
    }

    fn period_payroll(&self, period: PayPeriod) -> EngineResult<Vec<PayrollRecord>> {
        Ok(self
            .lock()?
            .payroll
            .values()
            .filter(|record| record.period == period)
            .cloned()
            .collect())
    }

    fn employee_payroll(&self, employee_id: &str) -> EngineResult<Vec<PayrollRecord>> {
        let mut records: Vec<PayrollRecord> = self
            .lock()?
            .payroll
            .values()
            .filter(|record| record.employee_id == employee_id)
            .cloned()
            .collect();
        records.sort_by(|a, b| b.period.cmp(&a.period));
        Ok(records)
    }

    fn payroll_run(&self, period: PayPeriod) -> EngineResult<Option<PayrollRun>> {
        Ok(self.lock()?.runs.get(&period).cloned())
    }

    fn begin_run(&self, run: &PayrollRun) -> EngineResult<()> {
        let mut tables = self.lock()?;
        check_run_claim(tables.runs.get(&run.period), run)?;
        tables.runs.insert(run.period, run.clone());
        Ok(())
    }

    fn finish_run(&self, run: &PayrollRun) -> EngineResult<()> {
        let mut tables = self.lock()?;
        match tables.runs.get_mut(&run.period) {
            Some(existing) if existing.run_id == run.run_id => {
                *existing = run.clone();
                Ok(())
            }
            _ => Err(EngineError::not_found("payroll run", run.run_id.to_string())),
        }
    }

    fn fail_in_progress_runs(&self) -> EngineResult<Vec<PayPeriod>> {
        let mut tables = self.lock()?;
        let now = chrono::Utc::now();
        let mut recovered = Vec::new();
        for run in tables.runs.values_mut() {
            if run.state == RunState::InProgress {
                run.state = RunState::Failed;
                run.finished_at = Some(now);
                recovered.push(run.period);
            }
        }
        Ok(recovered)
    }
}
