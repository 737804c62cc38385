//! Basic salary proration by attendance.

use rust_decimal::Decimal;

use crate::error::{EngineError, EngineResult};
use crate::models::{AuditStep, ProrationMode};

use super::{in_range, round_money};

/// The result of prorating basic salary, including the audit step.
#[derive(Debug, Clone)]
pub struct ProrationResult {
    /// Basic salary payable for the period, rounded to cents.
    pub basic: Decimal,
    /// Payable days the basic was paid for.
    pub payable_days: u32,
    /// The audit step recording this calculation.
    pub audit_step: AuditStep,
}

/// Scales basic salary by payable days over calendar days.
///
/// In [`ProrationMode::Flat`] the basic is paid in full and every calendar
/// day is payable, whatever the attendance.
///
/// # Errors
///
/// Returns `Validation` when `days_in_month` is zero or `payable_days`
/// exceeds it. Out-of-range payable days are never clamped.
///
/// # Examples
///
/// ```
/// use payroll_engine::calculation::prorate_basic;
/// use payroll_engine::models::ProrationMode;
/// use rust_decimal::Decimal;
///
/// let result = prorate_basic(Decimal::from(3000), 15, 30, ProrationMode::Prorated, 1).unwrap();
/// assert_eq!(result.basic, Decimal::from(1500));
/// ```
pub fn prorate_basic(
    basic: Decimal,
    payable_days: u32,
    days_in_month: u32,
    mode: ProrationMode,
    step_number: u32,
) -> EngineResult<ProrationResult> {
    if days_in_month == 0 {
        return Err(EngineError::validation(
            "days_in_month",
            "must be at least 1",
        ));
    }
    if payable_days > days_in_month {
        return Err(EngineError::validation(
            "payable_days",
            format!(
                "{} exceeds the {} days in the month",
                payable_days, days_in_month
            ),
        ));
    }

    let (prorated, payable_days, reasoning) = match mode {
        ProrationMode::Prorated => {
            let scaled = basic
                .checked_mul(Decimal::from(payable_days))
                .and_then(|v| v.checked_div(Decimal::from(days_in_month)));
            let prorated = round_money(in_range(scaled, "basic")?);
            let reasoning = format!(
                "{} x {}/{} days = {}",
                basic.normalize(),
                payable_days,
                days_in_month,
                prorated
            );
            (prorated, payable_days, reasoning)
        }
        ProrationMode::Flat => {
            let prorated = round_money(basic);
            let reasoning = format!(
                "Flat basic {} paid for all {} days regardless of attendance",
                prorated, days_in_month
            );
            (prorated, days_in_month, reasoning)
        }
    };

    let audit_step = AuditStep {
        step_number,
        rule_id: "basic_proration".to_string(),
        rule_name: "Basic Salary Proration".to_string(),
        input: serde_json::json!({
            "basic": basic.normalize().to_string(),
            "payable_days": payable_days,
            "days_in_month": days_in_month,
            "mode": mode.as_str()
        }),
        output: serde_json::json!({
            "prorated_basic": prorated.to_string()
        }),
        reasoning,
    };

    Ok(ProrationResult {
        basic: prorated,
        payable_days,
        audit_step,
    })
}
