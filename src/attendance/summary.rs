//! Per-period attendance reconciliation.

use std::collections::HashMap;

use chrono::NaiveDate;

use crate::config::AttendanceSettings;
use crate::models::{AttendanceRecord, AttendanceStatus, AttendanceSummary, PayPeriod};

/// Summarizes an employee's attendance over `period`.
///
/// Every calendar day of the period is counted exactly once. A day with no
/// record is absent. Payable days are days present or on leave, plus
/// holidays when `settings.holidays_payable` is set. Records for other
/// employees or outside the period are ignored.
pub fn summarize(
    employee_id: &str,
    period: PayPeriod,
    records: &[AttendanceRecord],
    settings: &AttendanceSettings,
) -> AttendanceSummary {
    let by_date: HashMap<NaiveDate, &AttendanceRecord> = records
        .iter()
        .filter(|r| r.employee_id == employee_id && period.contains(r.date))
        .map(|r| (r.date, r))
        .collect();

    let mut summary = AttendanceSummary::empty(employee_id, period);
    summary.absent_days = 0;

    for day in period.dates() {
        let record = by_date.get(&day).copied();

        let status = record.map_or(AttendanceStatus::Absent, |r| r.status);
        match status {
            AttendanceStatus::Present => summary.present_days += 1,
            AttendanceStatus::Absent => summary.absent_days += 1,
            AttendanceStatus::Leave => summary.leave_days += 1,
            AttendanceStatus::Holiday => summary.holiday_days += 1,
        }

        if let Some(hours) = record.and_then(|r| r.hours_worked) {
            summary.total_hours += hours;
        }
    }

    summary.payable_days = summary.present_days + summary.leave_days;
    if settings.holidays_payable {
        summary.payable_days += summary.holiday_days;
    }
    summary
}
