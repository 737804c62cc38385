//! [`SqliteStore`]: the SQLite implementation of [`HrStore`].

mod encode;
mod schema;

use std::fs;
use std::path::Path;
use std::sync::{Mutex, MutexGuard};

use chrono::{NaiveDate, Utc};
use rusqlite::{Connection, OptionalExtension as _, params};

use crate::error::{EngineError, EngineResult};
use crate::models::{
    AttendanceRecord, Compensation, Department, Employee, EmployeeStatus, PayPeriod,
    PayrollRecord, PayrollRun, RunState,
};

use self::encode::{
    RawAttendance, RawDepartment, RawEmployee, RawPayroll, RawRun, decode_period, encode_date,
    encode_decimal, encode_dt, encode_time,
};
use self::schema::SCHEMA;
use super::{HrStore, check_run_claim};

/// An HR store backed by a single SQLite file.
///
/// The connection sits behind a mutex, so each trait method runs alone
/// against the database and read-check-write sequences are atomic.
pub struct SqliteStore {
    conn: Mutex<Connection>,
}

impl SqliteStore {
    /// Open (or create) a store at `path` and run schema initialisation.
    ///
    /// Missing parent directories are created.
    pub fn open(path: impl AsRef<Path>) -> EngineResult<Self> {
        let path = path.as_ref();
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent).map_err(|e| {
                EngineError::Storage(format!("cannot create {}: {}", parent.display(), e))
            })?;
        }
        Self::init(Connection::open(path)?)
    }

    /// Open an in-memory store, useful for testing.
    pub fn open_in_memory() -> EngineResult<Self> {
        Self::init(Connection::open_in_memory()?)
    }

    fn init(conn: Connection) -> EngineResult<Self> {
        conn.execute_batch(SCHEMA)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn lock(&self) -> EngineResult<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|_| EngineError::Storage("sqlite connection lock poisoned".to_string()))
    }
}

/// Maps a uniqueness violation to `Conflict`, anything else to `Storage`.
fn conflict_on_constraint(error: rusqlite::Error, message: impl FnOnce() -> String) -> EngineError {
    match error.sqlite_error_code() {
        Some(rusqlite::ErrorCode::ConstraintViolation) => EngineError::conflict(message()),
        _ => error.into(),
    }
}

fn select_employee(conn: &Connection, id: &str) -> EngineResult<Option<Employee>> {
    let raw = conn
        .query_row(
            &format!(
                "SELECT {} FROM employees WHERE employee_id = ?1",
                RawEmployee::COLUMNS
            ),
            params![id],
            RawEmployee::from_row,
        )
        .optional()?;
    raw.map(RawEmployee::into_employee).transpose()
}

fn payroll_params(record: &PayrollRecord) -> EngineResult<[Box<dyn rusqlite::ToSql>; 18]> {
    let figures = &record.figures;
    Ok([
        Box::new(record.employee_id.clone()),
        Box::new(record.period.year()),
        Box::new(record.period.month()),
        Box::new(figures.payable_days),
        Box::new(figures.days_in_month),
        Box::new(figures.proration.as_str()),
        Box::new(encode_decimal(figures.earnings.basic)),
        Box::new(encode_decimal(figures.earnings.housing_allowance)),
        Box::new(encode_decimal(figures.earnings.conveyance)),
        Box::new(encode_decimal(figures.gross)),
        Box::new(encode_decimal(figures.deductions.provident_fund)),
        Box::new(encode_decimal(figures.deductions.insurance)),
        Box::new(encode_decimal(figures.total_deductions)),
        Box::new(encode_decimal(figures.net)),
        Box::new(serde_json::to_string(&figures.audit_steps)?),
        Box::new(record.revision),
        Box::new(record.generated_by.clone()),
        Box::new(encode_dt(record.generated_at)),
    ])
}

fn select_run(conn: &Connection, period: PayPeriod) -> EngineResult<Option<PayrollRun>> {
    let raw = conn
        .query_row(
            &format!(
                "SELECT {} FROM payroll_runs WHERE year = ?1 AND month = ?2",
                RawRun::COLUMNS
            ),
            params![period.year(), period.month()],
            RawRun::from_row,
        )
        .optional()?;
    raw.map(RawRun::into_run).transpose()
}

impl HrStore for SqliteStore {
    // ── Departments ──────────────────────────────────────────────────────────

    fn insert_department(&self, department: &Department) -> EngineResult<()> {
        let conn = self.lock()?;
        conn.execute(
            "INSERT INTO departments (department_id, name, company) VALUES (?1, ?2, ?3)",
            params![department.id, department.name, department.company],
        )
        .map_err(|e| {
            conflict_on_constraint(e, || format!("department {} already exists", department.id))
        })?;
        Ok(())
    }

    fn department(&self, id: &str) -> EngineResult<Option<Department>> {
        let conn = self.lock()?;
        let raw = conn
            .query_row(
                &format!(
                    "SELECT {} FROM departments WHERE department_id = ?1",
                    RawDepartment::COLUMNS
                ),
                params![id],
                RawDepartment::from_row,
            )
            .optional()?;
        Ok(raw.map(RawDepartment::into_department))
    }

    // ── Employees ────────────────────────────────────────────────────────────

    fn insert_employee(&self, employee: &Employee) -> EngineResult<()> {
        let conn = self.lock()?;
        let c = &employee.compensation;
        conn.execute(
            &format!(
                "INSERT INTO employees ({}) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)",
                RawEmployee::COLUMNS
            ),
            params![
                employee.id,
                employee.first_name,
                employee.last_name,
                employee.email,
                employee.department_id,
                employee.date_of_joining.map(encode_date),
                c.basic.map(encode_decimal),
                c.housing_allowance.map(encode_decimal),
                c.conveyance.map(encode_decimal),
                c.provident_fund.map(encode_decimal),
                c.insurance.map(encode_decimal),
                employee.status.as_str(),
            ],
        )
        .map_err(|e| {
            conflict_on_constraint(e, || {
                format!("employee {} or its email already exists", employee.id)
            })
        })?;
        Ok(())
    }

    fn update_compensation(
        &self,
        id: &str,
        compensation: &Compensation,
    ) -> EngineResult<Employee> {
        let conn = self.lock()?;
        let changed = conn.execute(
            "UPDATE employees SET basic_salary = ?2, hra = ?3, conveyance = ?4, pf = ?5, esic = ?6
             WHERE employee_id = ?1",
            params![
                id,
                compensation.basic.map(encode_decimal),
                compensation.housing_allowance.map(encode_decimal),
                compensation.conveyance.map(encode_decimal),
                compensation.provident_fund.map(encode_decimal),
                compensation.insurance.map(encode_decimal),
            ],
        )?;
        if changed == 0 {
            return Err(EngineError::not_found("employee", id));
        }
        select_employee(&conn, id)?.ok_or_else(|| EngineError::not_found("employee", id))
    }

    fn set_employee_status(&self, id: &str, status: EmployeeStatus) -> EngineResult<Employee> {
        let conn = self.lock()?;
        let changed = conn.execute(
            "UPDATE employees SET status = ?2 WHERE employee_id = ?1",
            params![id, status.as_str()],
        )?;
        if changed == 0 {
            return Err(EngineError::not_found("employee", id));
        }
        select_employee(&conn, id)?.ok_or_else(|| EngineError::not_found("employee", id))
    }

    fn employee(&self, id: &str) -> EngineResult<Option<Employee>> {
        let conn = self.lock()?;
        select_employee(&conn, id)
    }

    fn active_employees(&self) -> EngineResult<Vec<Employee>> {
        let conn = self.lock()?;
        let mut stmt = conn.prepare(&format!(
            "SELECT {} FROM employees WHERE status = 'active' ORDER BY employee_id",
            RawEmployee::COLUMNS
        ))?;
        let raws = stmt
            .query_map([], RawEmployee::from_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        raws.into_iter().map(RawEmployee::into_employee).collect()
    }

    // ── Attendance ───────────────────────────────────────────────────────────

    fn upsert_attendance(&self, record: &AttendanceRecord) -> EngineResult<bool> {
        let mut conn = self.lock()?;
        let tx = conn.transaction()?;
        let date = encode_date(record.date);

        let existed = tx
            .query_row(
                "SELECT 1 FROM attendance WHERE employee_id = ?1 AND date = ?2",
                params![record.employee_id, date],
                |_| Ok(()),
            )
            .optional()?
            .is_some();

        tx.execute(
            &format!(
                "INSERT OR REPLACE INTO attendance ({}) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
                RawAttendance::COLUMNS
            ),
            params![
                record.employee_id,
                date,
                record.check_in.map(encode_time),
                record.check_out.map(encode_time),
                record.hours_worked.map(encode_decimal),
                record.status.as_str(),
                record.recorded_by,
                encode_dt(record.recorded_at),
            ],
        )?;
        tx.commit()?;

        Ok(existed)
    }

    fn attendance(
        &self,
        employee_id: &str,
        date: NaiveDate,
    ) -> EngineResult<Option<AttendanceRecord>> {
        let conn = self.lock()?;
        let raw = conn
            .query_row(
                &format!(
                    "SELECT {} FROM attendance WHERE employee_id = ?1 AND date = ?2",
                    RawAttendance::COLUMNS
                ),
                params![employee_id, encode_date(date)],
                RawAttendance::from_row,
            )
            .optional()?;
        raw.map(RawAttendance::into_record).transpose()
    }

    fn employee_attendance(
        &self,
        employee_id: &str,
        period: PayPeriod,
    ) -> EngineResult<Vec<AttendanceRecord>> {
        let conn = self.lock()?;
        let mut stmt = conn.prepare(&format!(
            "SELECT {} FROM attendance
             WHERE employee_id = ?1 AND date BETWEEN ?2 AND ?3
             ORDER BY date",
            RawAttendance::COLUMNS
        ))?;
        let raws = stmt
            .query_map(
                params![
                    employee_id,
                    encode_date(period.first_day()),
                    encode_date(period.last_day())
                ],
                RawAttendance::from_row,
            )?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        raws.into_iter().map(RawAttendance::into_record).collect()
    }

    fn period_attendance(&self, period: PayPeriod) -> EngineResult<Vec<AttendanceRecord>> {
        let conn = self.lock()?;
        let mut stmt = conn.prepare(&format!(
            "SELECT {} FROM attendance
             WHERE date BETWEEN ?1 AND ?2
             ORDER BY employee_id, date",
            RawAttendance::COLUMNS
        ))?;
        let raws = stmt
            .query_map(
                params![encode_date(period.first_day()), encode_date(period.last_day())],
                RawAttendance::from_row,
            )?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        raws.into_iter().map(RawAttendance::into_record).collect()
    }

    // ── Payroll records ──────────────────────────────────────────────────────

    fn payroll_record(
        &self,
        employee_id: &str,
        period: PayPeriod,
    ) -> EngineResult<Option<PayrollRecord>> {
        let conn = self.lock()?;
        let raw = conn
            .query_row(
                &format!(
                    "SELECT {} FROM payroll WHERE employee_id = ?1 AND year = ?2 AND month = ?3",
                    RawPayroll::COLUMNS
                ),
                params![employee_id, period.year(), period.month()],
                RawPayroll::from_row,
            )
            .optional()?;
        raw.map(RawPayroll::into_record).transpose()
    }

    fn insert_payroll(&self, record: &PayrollRecord) -> EngineResult<()> {
        let conn = self.lock()?;
        let values = payroll_params(record)?;
        conn.execute(
            &format!(
                "INSERT INTO payroll ({}) VALUES
                 (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16, ?17, ?18)",
                RawPayroll::COLUMNS
            ),
            rusqlite::params_from_iter(values.iter()),
        )
        .map_err(|e| {
            conflict_on_constraint(e, || {
                format!(
                    "payroll record for {} in {} already exists",
                    record.employee_id, record.period
                )
            })
        })?;
        Ok(())
    }

    fn replace_payroll(&self, record: &PayrollRecord) -> EngineResult<()> {
        let mut conn = self.lock()?;
        let tx = conn.transaction()?;
        let deleted = tx.execute(
            "DELETE FROM payroll WHERE employee_id = ?1 AND year = ?2 AND month = ?3",
            params![record.employee_id, record.period.year(), record.period.month()],
        )?;
        if deleted == 0 {
            return Err(EngineError::not_found(
                "payroll record",
                format!("{}/{}", record.employee_id, record.period),
            ));
        }
        let values = payroll_params(record)?;
        tx.execute(
            &format!(
                "INSERT INTO payroll ({}) VALUES
                 (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16, ?17, ?18)",
                RawPayroll::COLUMNS
            ),
            rusqlite::params_from_iter(values.iter()),
        )?;
        tx.commit()?;
        Ok(())
    }

    fn period_payroll(&self, period: PayPeriod) -> EngineResult<Vec<PayrollRecord>> {
        let conn = self.lock()?;
        let mut stmt = conn.prepare(&format!(
            "SELECT {} FROM payroll WHERE year = ?1 AND month = ?2 ORDER BY employee_id",
            RawPayroll::COLUMNS
        ))?;
        let raws = stmt
            .query_map(params![period.year(), period.month()], RawPayroll::from_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        raws.into_iter().map(RawPayroll::into_record).collect()
    }

    fn employee_payroll(&self, employee_id: &str) -> EngineResult<Vec<PayrollRecord>> {
        let conn = self.lock()?;
        let mut stmt = conn.prepare(&format!(
            "SELECT {} FROM payroll WHERE employee_id = ?1 ORDER BY year DESC, month DESC",
            RawPayroll::COLUMNS
        ))?;
        let raws = stmt
            .query_map(params![employee_id], RawPayroll::from_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        raws.into_iter().map(RawPayroll::into_record).collect()
    }

    // ── Runs ─────────────────────────────────────────────────────────────────

    fn payroll_run(&self, period: PayPeriod) -> EngineResult<Option<PayrollRun>> {
        let conn = self.lock()?;
        select_run(&conn, period)
    }

    fn begin_run(&self, run: &PayrollRun) -> EngineResult<()> {
        let mut conn = self.lock()?;
        let tx = conn.transaction()?;
        check_run_claim(select_run(&tx, run.period)?.as_ref(), run)?;
        tx.execute(
            &format!(
                "INSERT OR REPLACE INTO payroll_runs ({}) VALUES
                 (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
                RawRun::COLUMNS
            ),
            params![
                run.period.year(),
                run.period.month(),
                run.run_id.to_string(),
                run.state.as_str(),
                run.forced,
                run.started_by,
                encode_dt(run.started_at),
                run.finished_at.map(encode_dt),
                run.succeeded as i64,
                run.failed as i64,
            ],
        )?;
        tx.commit()?;
        Ok(())
    }

    fn finish_run(&self, run: &PayrollRun) -> EngineResult<()> {
        let conn = self.lock()?;
        let changed = conn.execute(
            "UPDATE payroll_runs
             SET state = ?2, finished_at = ?3, succeeded = ?4, failed = ?5
             WHERE run_id = ?1",
            params![
                run.run_id.to_string(),
                run.state.as_str(),
                run.finished_at.map(encode_dt),
                run.succeeded as i64,
                run.failed as i64,
            ],
        )?;
        if changed == 0 {
            return Err(EngineError::not_found("payroll run", run.run_id.to_string()));
        }
        Ok(())
    }

    fn fail_in_progress_runs(&self) -> EngineResult<Vec<PayPeriod>> {
        let mut conn = self.lock()?;
        let tx = conn.transaction()?;

        let stale: Vec<(i64, i64)> = {
            let mut stmt = tx.prepare(
                "SELECT year, month FROM payroll_runs WHERE state = ?1 ORDER BY year, month",
            )?;
            stmt.query_map(params![RunState::InProgress.as_str()], |row| {
                Ok((row.get(0)?, row.get(1)?))
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?
        };

        tx.execute(
            "UPDATE payroll_runs SET state = ?1, finished_at = ?2 WHERE state = ?3",
            params![
                RunState::Failed.as_str(),
                encode_dt(Utc::now()),
                RunState::InProgress.as_str()
            ],
        )?;
        tx.commit()?;

        stale
            .into_iter()
            .map(|(year, month)| decode_period(year, month))
            .collect()
    }
}
