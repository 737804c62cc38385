//! Recording a single attendance day.

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::Deserialize;
use tracing::debug;

use crate::error::{EngineError, EngineResult};
use crate::models::{Actor, AttendanceRecord, AttendanceStatus};
use crate::store::HrStore;

use super::hours::{hours_worked, resolve_status};

/// A typed attendance entry for one (employee, date).
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct AttendanceEntry {
    /// The employee the entry is for.
    pub employee_id: String,
    /// The calendar day.
    pub date: NaiveDate,
    /// Check-in time, if punched.
    #[serde(default)]
    pub check_in: Option<NaiveTime>,
    /// Check-out time, if punched.
    #[serde(default)]
    pub check_out: Option<NaiveTime>,
    /// Explicit status; derived from the punches when omitted.
    #[serde(default)]
    pub status: Option<AttendanceStatus>,
}

impl AttendanceEntry {
    /// Builds the record this entry produces for `actor` at `recorded_at`.
    pub fn into_record(self, actor: &Actor, recorded_at: DateTime<Utc>) -> AttendanceRecord {
        AttendanceRecord {
            hours_worked: hours_worked(self.check_in, self.check_out),
            status: resolve_status(self.status, self.check_in, self.check_out),
            employee_id: self.employee_id,
            date: self.date,
            check_in: self.check_in,
            check_out: self.check_out,
            recorded_by: actor.id().to_string(),
            recorded_at,
        }
    }
}

/// The outcome of recording one day.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Recorded {
    /// The record now stored for (employee, date).
    pub record: AttendanceRecord,
    /// Whether an earlier record for the same day was overwritten.
    pub replaced: bool,
}

/// Records attendance for one day, replacing any existing record.
///
/// The employee must exist; inactive employees may still have attendance
/// recorded for days they worked.
pub fn record(store: &dyn HrStore, entry: AttendanceEntry, actor: &Actor) -> EngineResult<Recorded> {
    if entry.employee_id.trim().is_empty() {
        return Err(EngineError::validation("employee_id", "must not be blank"));
    }
    if store.employee(&entry.employee_id)?.is_none() {
        return Err(EngineError::not_found("employee", entry.employee_id));
    }

    let record = entry.into_record(actor, Utc::now());
    let replaced = store.upsert_attendance(&record)?;
    debug!(
        employee_id = %record.employee_id,
        date = %record.date,
        status = %record.status,
        replaced,
        "Attendance recorded"
    );

    Ok(Recorded { record, replaced })
}
