//! Batch ingestion of raw attendance rows.
//!
//! Rows arrive as text, either from a JSON request or a CSV upload with the
//! columns `employee_id,date,check_in,check_out[,status]`. Each row is
//! validated and committed on its own; a bad row is reported with its index
//! and never aborts the batch.

use std::borrow::Borrow;

use chrono::{NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::error::{EngineError, EngineResult};
use crate::models::{Actor, AttendanceStatus, BatchReport, RowFailure};
use crate::store::HrStore;

use super::record::AttendanceEntry;

const TIME_FORMATS: [&str; 2] = ["%H:%M:%S", "%H:%M"];

/// One unparsed attendance row.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttendanceRow {
    /// Employee identifier.
    pub employee_id: String,
    /// Day as `YYYY-MM-DD`.
    pub date: String,
    /// Check-in as `HH:MM` or `HH:MM:SS`; blank means none.
    #[serde(default)]
    pub check_in: Option<String>,
    /// Check-out as `HH:MM` or `HH:MM:SS`; blank means none.
    #[serde(default)]
    pub check_out: Option<String>,
    /// Explicit status; blank means derived.
    #[serde(default)]
    pub status: Option<String>,
}

fn non_blank(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

fn parse_time(field: &str, value: &str) -> EngineResult<NaiveTime> {
    TIME_FORMATS
        .iter()
        .find_map(|format| NaiveTime::parse_from_str(value, format).ok())
        .ok_or_else(|| EngineError::validation(field, format!("'{}' is not a time", value)))
}

impl AttendanceRow {
    /// Parses the row into a typed entry.
    pub fn parse(&self) -> EngineResult<AttendanceEntry> {
        let employee_id = self.employee_id.trim();
        if employee_id.is_empty() {
            return Err(EngineError::validation("employee_id", "must not be blank"));
        }

        let date = NaiveDate::parse_from_str(self.date.trim(), "%Y-%m-%d").map_err(|_| {
            EngineError::validation("date", format!("'{}' is not a YYYY-MM-DD date", self.date))
        })?;
        let check_in = non_blank(&self.check_in)
            .map(|v| parse_time("check_in", v))
            .transpose()?;
        let check_out = non_blank(&self.check_out)
            .map(|v| parse_time("check_out", v))
            .transpose()?;
        let status = non_blank(&self.status)
            .map(str::parse::<AttendanceStatus>)
            .transpose()?;

        Ok(AttendanceEntry {
            employee_id: employee_id.to_string(),
            date,
            check_in,
            check_out,
            status,
        })
    }
}

/// Columns every CSV upload must carry.
const REQUIRED_COLUMNS: [&str; 2] = ["employee_id", "date"];

/// Reads attendance rows from CSV text with a header line.
///
/// Each record is returned on its own: a record that cannot be read as a
/// row (too few fields, bad encoding) becomes a [`RowFailure`] at its index
/// and the records around it are unaffected. Field-level problems such as
/// a bad date are left to ingestion.
///
/// # Errors
///
/// Returns `Validation` only when the header line is unreadable or lacks
/// the `employee_id` or `date` column.
pub fn read_csv(input: &str) -> EngineResult<Vec<Result<AttendanceRow, RowFailure>>> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .flexible(true)
        .from_reader(input.as_bytes());

    let headers = reader
        .headers()
        .map_err(|e| EngineError::validation("csv", format!("unreadable header: {}", e)))?
        .clone();
    for column in REQUIRED_COLUMNS {
        if !headers.iter().any(|h| h == column) {
            return Err(EngineError::validation(
                "csv",
                format!("header is missing the '{}' column", column),
            ));
        }
    }
    let id_column = headers.iter().position(|h| h == "employee_id");

    let rows = reader
        .records()
        .enumerate()
        .map(|(index, record)| {
            let record = record.map_err(|e| RowFailure {
                row: index,
                employee_id: None,
                reason: format!("unreadable CSV record: {}", e),
            })?;
            record
                .deserialize::<AttendanceRow>(Some(&headers))
                .map_err(|e| RowFailure {
                    row: index,
                    employee_id: id_column
                        .and_then(|i| record.get(i))
                        .filter(|id| !id.is_empty())
                        .map(str::to_string),
                    reason: format!("malformed CSV record: {}", e),
                })
        })
        .collect();
    Ok(rows)
}

/// Ingests a batch of rows, committing each valid row independently.
///
/// Rows that fail to parse or name an unknown employee are reported in the
/// returned [`BatchReport`]. Only a storage failure aborts the batch; rows
/// committed before it stay committed.
pub fn ingest_batch(
    store: &dyn HrStore,
    rows: &[AttendanceRow],
    actor: &Actor,
) -> EngineResult<BatchReport> {
    ingest_rows(store, rows.iter().map(Ok), actor)
}

/// Ingests a CSV upload, see [`read_csv`] and [`ingest_batch`].
///
/// Records that cannot be read are reported alongside rows that fail
/// validation; only an unusable header rejects the whole upload.
pub fn ingest_csv(store: &dyn HrStore, input: &str, actor: &Actor) -> EngineResult<BatchReport> {
    let rows = read_csv(input)?;
    ingest_rows(store, rows.into_iter(), actor)
}

fn ingest_rows<R: Borrow<AttendanceRow>>(
    store: &dyn HrStore,
    rows: impl Iterator<Item = Result<R, RowFailure>>,
    actor: &Actor,
) -> EngineResult<BatchReport> {
    let recorded_at = Utc::now();
    let mut total = 0;
    let mut committed = 0;
    let mut replaced = 0;
    let mut failed = Vec::new();

    for (index, row) in rows.enumerate() {
        total += 1;
        let row = match row {
            Ok(row) => row,
            Err(failure) => {
                failed.push(failure);
                continue;
            }
        };
        let row: &AttendanceRow = row.borrow();
        let entry = match row.parse() {
            Ok(entry) => entry,
            Err(e) => {
                failed.push(RowFailure {
                    row: index,
                    employee_id: Some(row.employee_id.trim())
                        .filter(|id| !id.is_empty())
                        .map(str::to_string),
                    reason: e.to_string(),
                });
                continue;
            }
        };

        if store.employee(&entry.employee_id)?.is_none() {
            failed.push(RowFailure {
                row: index,
                employee_id: Some(entry.employee_id.clone()),
                reason: EngineError::not_found("employee", entry.employee_id).to_string(),
            });
            continue;
        }

        let record = entry.into_record(actor, recorded_at);
        if store.upsert_attendance(&record)? {
            replaced += 1;
        }
        committed += 1;
    }

    let report = BatchReport::new(committed, replaced, failed);
    if report.failed.is_empty() {
        info!(rows = total, committed, replaced, "Attendance batch ingested");
    } else {
        warn!(
            rows = total,
            committed,
            replaced,
            failed = report.failed.len(),
            "Attendance batch ingested with failures"
        );
    }

    Ok(report)
}
