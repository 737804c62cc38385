//! Payroll rules.
//!
//! This module turns a compensation structure and an attendance summary into
//! payroll figures: basic proration, gross earnings, flat deductions and net
//! pay. Every rule records an [`AuditStep`](crate::models::AuditStep) so a
//! stored record can explain its numbers.

mod compute;
mod deductions;
mod earnings;
mod proration;

use rust_decimal::{Decimal, RoundingStrategy};

use crate::error::{EngineError, EngineResult};

pub use compute::compute;
pub use deductions::{DeductionsResult, calculate_deductions};
pub use earnings::{EarningsResult, calculate_earnings};
pub use proration::{ProrationResult, prorate_basic};

/// Decimal places kept for every monetary amount.
pub const MONEY_SCALE: u32 = 2;

/// Rounds a monetary amount to cents, midpoints away from zero.
///
/// The result always carries exactly two decimal places so amounts render
/// consistently.
///
/// ```
/// use payroll_engine::calculation::round_money;
/// use rust_decimal::Decimal;
///
/// assert_eq!(round_money(Decimal::new(12345, 3)).to_string(), "12.35");
/// assert_eq!(round_money(Decimal::from(7)).to_string(), "7.00");
/// ```
pub fn round_money(amount: Decimal) -> Decimal {
    let mut rounded = amount.round_dp_with_strategy(MONEY_SCALE, RoundingStrategy::MidpointAwayFromZero);
    rounded.rescale(MONEY_SCALE);
    rounded
}

/// Unwraps a checked money operation, reporting overflow as `Validation` on
/// `field`.
fn in_range(value: Option<Decimal>, field: &str) -> EngineResult<Decimal> {
    value.ok_or_else(|| EngineError::validation(field, "amount is out of range"))
}
