//! Hours and status derivation for a single attendance day.

use chrono::NaiveTime;
use rust_decimal::Decimal;
use rust_decimal::RoundingStrategy;

use crate::models::AttendanceStatus;

/// Upper bound on hours credited for a single day.
pub const MAX_DAILY_HOURS: Decimal = Decimal::from_parts(24, 0, 0, false, 0);

/// Derives hours worked from check-in and check-out times.
///
/// Returns `None` unless both times are present. The difference is clamped
/// to `[0, 24]` and rounded to 2 decimal places; a check-out earlier than the
/// check-in yields zero hours.
///
/// # Examples
///
/// ```
/// use chrono::NaiveTime;
/// use payroll_engine::attendance::hours_worked;
/// use rust_decimal::Decimal;
///
/// let hours = hours_worked(
///     NaiveTime::from_hms_opt(9, 0, 0),
///     NaiveTime::from_hms_opt(17, 30, 0),
/// );
/// assert_eq!(hours, Some(Decimal::new(850, 2)));
/// ```
pub fn hours_worked(check_in: Option<NaiveTime>, check_out: Option<NaiveTime>) -> Option<Decimal> {
    let (check_in, check_out) = (check_in?, check_out?);
    let seconds = (check_out - check_in).num_seconds();
    let hours = Decimal::from(seconds) / Decimal::from(3600);
    Some(
        hours
            .clamp(Decimal::ZERO, MAX_DAILY_HOURS)
            .round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero),
    )
}

/// Resolves the status of a day.
///
/// An explicit status wins. Otherwise a day with any punch is present and a
/// day with none is absent.
pub fn resolve_status(
    explicit: Option<AttendanceStatus>,
    check_in: Option<NaiveTime>,
    check_out: Option<NaiveTime>,
) -> AttendanceStatus {
    match explicit {
        Some(status) => status,
        None if check_in.is_some() || check_out.is_some() => AttendanceStatus::Present,
        None => AttendanceStatus::Absent,
    }
}
