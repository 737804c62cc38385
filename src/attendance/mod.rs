//! Attendance recording and reconciliation.
//!
//! This module derives hours worked from check-in and check-out times,
//! records single days, ingests batches of raw rows, and summarizes a
//! period into the [`AttendanceSummary`](crate::models::AttendanceSummary)
//! the payroll rules consume.

mod hours;
mod ingest;
mod record;
mod summary;

pub use hours::{MAX_DAILY_HOURS, hours_worked, resolve_status};
pub use ingest::{AttendanceRow, ingest_batch, ingest_csv, read_csv};
pub use record::{AttendanceEntry, Recorded, record};
pub use summary::summarize;
