//! Encoding and decoding helpers between domain types and the plain-text
//! representations stored in SQLite columns.
//!
//! Dates are stored as `YYYY-MM-DD`, times as `HH:MM:SS`, timestamps as
//! RFC 3339 strings and money as decimal strings, so values sort and compare
//! correctly as text and never pass through floating point.

use std::str::FromStr;

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use rust_decimal::Decimal;
use uuid::Uuid;

use crate::error::{EngineError, EngineResult};
use crate::models::{
    AttendanceRecord, AttendanceStatus, AuditStep, Compensation, Deductions, Department, Earnings,
    Employee, EmployeeStatus, PayPeriod, PayrollFigures, PayrollRecord, PayrollRun, ProrationMode,
    RunState,
};

const DATE_FORMAT: &str = "%Y-%m-%d";
const TIME_FORMAT: &str = "%H:%M:%S";

fn corrupt(column: &str, value: &str, detail: impl std::fmt::Display) -> EngineError {
    EngineError::Storage(format!("bad {} value {:?}: {}", column, value, detail))
}

// ─── Scalars ─────────────────────────────────────────────────────────────────

pub fn encode_date(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

pub fn decode_date(s: &str) -> EngineResult<NaiveDate> {
    NaiveDate::parse_from_str(s, DATE_FORMAT).map_err(|e| corrupt("date", s, e))
}

pub fn encode_time(time: NaiveTime) -> String {
    time.format(TIME_FORMAT).to_string()
}

pub fn decode_time(s: &str) -> EngineResult<NaiveTime> {
    NaiveTime::parse_from_str(s, TIME_FORMAT).map_err(|e| corrupt("time", s, e))
}

pub fn encode_dt(dt: DateTime<Utc>) -> String {
    dt.to_rfc3339()
}

pub fn decode_dt(s: &str) -> EngineResult<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| corrupt("timestamp", s, e))
}

pub fn encode_decimal(value: Decimal) -> String {
    value.to_string()
}

pub fn decode_decimal(s: &str) -> EngineResult<Decimal> {
    Decimal::from_str(s).map_err(|e| corrupt("decimal", s, e))
}

fn decode_opt<T>(
    value: Option<String>,
    decode: impl Fn(&str) -> EngineResult<T>,
) -> EngineResult<Option<T>> {
    value.as_deref().map(decode).transpose()
}

fn decode_count(column: &str, value: i64) -> EngineResult<u32> {
    u32::try_from(value).map_err(|e| corrupt(column, &value.to_string(), e))
}

pub fn decode_period(year: i64, month: i64) -> EngineResult<PayPeriod> {
    let year = i32::try_from(year).map_err(|e| corrupt("year", &year.to_string(), e))?;
    PayPeriod::new(decode_count("month", month)?, year)
}

// ─── Row types ───────────────────────────────────────────────────────────────

/// Raw values read directly from a `departments` row.
pub struct RawDepartment {
    pub department_id: String,
    pub name: String,
    pub company: Option<String>,
}

impl RawDepartment {
    pub const COLUMNS: &'static str = "department_id, name, company";

    pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            department_id: row.get(0)?,
            name: row.get(1)?,
            company: row.get(2)?,
        })
    }

    pub fn into_department(self) -> Department {
        Department {
            id: self.department_id,
            name: self.name,
            company: self.company,
        }
    }
}

/// Raw values read directly from an `employees` row.
pub struct RawEmployee {
    pub employee_id: String,
    pub first_name: String,
    pub last_name: String,
    pub email: Option<String>,
    pub department_id: Option<String>,
    pub date_of_joining: Option<String>,
    pub basic_salary: Option<String>,
    pub hra: Option<String>,
    pub conveyance: Option<String>,
    pub pf: Option<String>,
    pub esic: Option<String>,
    pub status: String,
}

impl RawEmployee {
    pub const COLUMNS: &'static str = "employee_id, first_name, last_name, email, department_id, \
         date_of_joining, basic_salary, hra, conveyance, pf, esic, status";

    pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            employee_id: row.get(0)?,
            first_name: row.get(1)?,
            last_name: row.get(2)?,
            email: row.get(3)?,
            department_id: row.get(4)?,
            date_of_joining: row.get(5)?,
            basic_salary: row.get(6)?,
            hra: row.get(7)?,
            conveyance: row.get(8)?,
            pf: row.get(9)?,
            esic: row.get(10)?,
            status: row.get(11)?,
        })
    }

    pub fn into_employee(self) -> EngineResult<Employee> {
        Ok(Employee {
            id: self.employee_id,
            first_name: self.first_name,
            last_name: self.last_name,
            email: self.email,
            department_id: self.department_id,
            date_of_joining: decode_opt(self.date_of_joining, decode_date)?,
            compensation: Compensation {
                basic: decode_opt(self.basic_salary, decode_decimal)?,
                housing_allowance: decode_opt(self.hra, decode_decimal)?,
                conveyance: decode_opt(self.conveyance, decode_decimal)?,
                provident_fund: decode_opt(self.pf, decode_decimal)?,
                insurance: decode_opt(self.esic, decode_decimal)?,
            },
            status: EmployeeStatus::from_str(&self.status)
                .map_err(|e| corrupt("status", &self.status, e))?,
        })
    }
}

/// Raw values read directly from an `attendance` row.
pub struct RawAttendance {
    pub employee_id: String,
    pub date: String,
    pub check_in: Option<String>,
    pub check_out: Option<String>,
    pub hours_worked: Option<String>,
    pub status: String,
    pub uploaded_by: String,
    pub uploaded_at: String,
}

impl RawAttendance {
    pub const COLUMNS: &'static str =
        "employee_id, date, check_in, check_out, hours_worked, status, uploaded_by, uploaded_at";

    pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            employee_id: row.get(0)?,
            date: row.get(1)?,
            check_in: row.get(2)?,
            check_out: row.get(3)?,
            hours_worked: row.get(4)?,
            status: row.get(5)?,
            uploaded_by: row.get(6)?,
            uploaded_at: row.get(7)?,
        })
    }

    pub fn into_record(self) -> EngineResult<AttendanceRecord> {
        Ok(AttendanceRecord {
            employee_id: self.employee_id,
            date: decode_date(&self.date)?,
            check_in: decode_opt(self.check_in, decode_time)?,
            check_out: decode_opt(self.check_out, decode_time)?,
            hours_worked: decode_opt(self.hours_worked, decode_decimal)?,
            status: AttendanceStatus::from_str(&self.status)
                .map_err(|e| corrupt("status", &self.status, e))?,
            recorded_by: self.uploaded_by,
            recorded_at: decode_dt(&self.uploaded_at)?,
        })
    }
}

/// Raw values read directly from a `payroll` row.
pub struct RawPayroll {
    pub employee_id: String,
    pub year: i64,
    pub month: i64,
    pub payable_days: i64,
    pub days_in_month: i64,
    pub proration: String,
    pub basic: String,
    pub hra: String,
    pub conveyance: String,
    pub gross: String,
    pub pf: String,
    pub esic: String,
    pub total_deductions: String,
    pub net_salary: String,
    pub audit_json: String,
    pub revision: i64,
    pub generated_by: String,
    pub generated_at: String,
}

impl RawPayroll {
    pub const COLUMNS: &'static str = "employee_id, year, month, payable_days, days_in_month, \
         proration, basic, hra, conveyance, gross, pf, esic, total_deductions, net_salary, \
         audit_json, revision, generated_by, generated_at";

    pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            employee_id: row.get(0)?,
            year: row.get(1)?,
            month: row.get(2)?,
            payable_days: row.get(3)?,
            days_in_month: row.get(4)?,
            proration: row.get(5)?,
            basic: row.get(6)?,
            hra: row.get(7)?,
            conveyance: row.get(8)?,
            gross: row.get(9)?,
            pf: row.get(10)?,
            esic: row.get(11)?,
            total_deductions: row.get(12)?,
            net_salary: row.get(13)?,
            audit_json: row.get(14)?,
            revision: row.get(15)?,
            generated_by: row.get(16)?,
            generated_at: row.get(17)?,
        })
    }

    pub fn into_record(self) -> EngineResult<PayrollRecord> {
        let audit_steps: Vec<AuditStep> = serde_json::from_str(&self.audit_json)?;
        Ok(PayrollRecord {
            employee_id: self.employee_id,
            period: decode_period(self.year, self.month)?,
            figures: PayrollFigures {
                payable_days: decode_count("payable_days", self.payable_days)?,
                days_in_month: decode_count("days_in_month", self.days_in_month)?,
                proration: ProrationMode::from_str(&self.proration)
                    .map_err(|e| corrupt("proration", &self.proration, e))?,
                earnings: Earnings {
                    basic: decode_decimal(&self.basic)?,
                    housing_allowance: decode_decimal(&self.hra)?,
                    conveyance: decode_decimal(&self.conveyance)?,
                },
                gross: decode_decimal(&self.gross)?,
                deductions: Deductions {
                    provident_fund: decode_decimal(&self.pf)?,
                    insurance: decode_decimal(&self.esic)?,
                },
                total_deductions: decode_decimal(&self.total_deductions)?,
                net: decode_decimal(&self.net_salary)?,
                audit_steps,
            },
            revision: decode_count("revision", self.revision)?,
            generated_by: self.generated_by,
            generated_at: decode_dt(&self.generated_at)?,
        })
    }
}

/// Raw values read directly from a `payroll_runs` row.
pub struct RawRun {
    pub year: i64,
    pub month: i64,
    pub run_id: String,
    pub state: String,
    pub forced: bool,
    pub started_by: String,
    pub started_at: String,
    pub finished_at: Option<String>,
    pub succeeded: i64,
    pub failed: i64,
}

impl RawRun {
    pub const COLUMNS: &'static str = "year, month, run_id, state, forced, started_by, \
         started_at, finished_at, succeeded, failed";

    pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            year: row.get(0)?,
            month: row.get(1)?,
            run_id: row.get(2)?,
            state: row.get(3)?,
            forced: row.get(4)?,
            started_by: row.get(5)?,
            started_at: row.get(6)?,
            finished_at: row.get(7)?,
            succeeded: row.get(8)?,
            failed: row.get(9)?,
        })
    }

    pub fn into_run(self) -> EngineResult<PayrollRun> {
        Ok(PayrollRun {
            run_id: Uuid::parse_str(&self.run_id).map_err(|e| corrupt("run_id", &self.run_id, e))?,
            period: decode_period(self.year, self.month)?,
            state: RunState::from_str(&self.state)?,
            forced: self.forced,
            started_by: self.started_by,
            started_at: decode_dt(&self.started_at)?,
            finished_at: decode_opt(self.finished_at, decode_dt)?,
            succeeded: decode_count("succeeded", self.succeeded)? as usize,
            failed: decode_count("failed", self.failed)? as usize,
        })
    }
}
