//! Gross earnings from prorated basic and fixed allowances.

use rust_decimal::Decimal;

use crate::error::EngineResult;
use crate::models::{AuditStep, CompensationStructure, Earnings};

use super::{in_range, round_money};

/// The result of summing earnings, including the audit step.
#[derive(Debug, Clone)]
pub struct EarningsResult {
    /// The earnings breakdown.
    pub earnings: Earnings,
    /// Total gross pay.
    pub gross: Decimal,
    /// The audit step recording this calculation.
    pub audit_step: AuditStep,
}

/// Adds housing allowance and conveyance to the prorated basic.
///
/// Allowances are paid in full; only basic depends on attendance. Fails
/// with `Validation` when the sum overflows.
pub fn calculate_earnings(
    comp: &CompensationStructure,
    prorated_basic: Decimal,
    step_number: u32,
) -> EngineResult<EarningsResult> {
    let earnings = Earnings {
        basic: prorated_basic,
        housing_allowance: round_money(comp.housing_allowance),
        conveyance: round_money(comp.conveyance),
    };
    let gross = in_range(earnings.checked_total(), "gross")?;

    let audit_step = AuditStep {
        step_number,
        rule_id: "gross_earnings".to_string(),
        rule_name: "Gross Earnings".to_string(),
        input: serde_json::json!({
            "prorated_basic": earnings.basic.to_string(),
            "housing_allowance": earnings.housing_allowance.to_string(),
            "conveyance": earnings.conveyance.to_string()
        }),
        output: serde_json::json!({
            "gross": gross.to_string()
        }),
        reasoning: format!(
            "{} + {} + {} = {}",
            earnings.basic, earnings.housing_allowance, earnings.conveyance, gross
        ),
    };

    Ok(EarningsResult {
        earnings,
        gross,
        audit_step,
    })
}
