//! Flat statutory deductions.

use rust_decimal::Decimal;

use crate::error::EngineResult;
use crate::models::{AuditStep, CompensationStructure, Deductions};

use super::{in_range, round_money};

/// The result of totalling deductions, including the audit step.
#[derive(Debug, Clone)]
pub struct DeductionsResult {
    /// The deductions breakdown.
    pub deductions: Deductions,
    /// Sum of all deductions.
    pub total: Decimal,
    /// The audit step recording this calculation.
    pub audit_step: AuditStep,
}

/// Totals provident fund and insurance. Neither is prorated.
pub fn calculate_deductions(
    comp: &CompensationStructure,
    step_number: u32,
) -> EngineResult<DeductionsResult> {
    let deductions = Deductions {
        provident_fund: round_money(comp.provident_fund),
        insurance: round_money(comp.insurance),
    };
    let total = in_range(deductions.checked_total(), "total_deductions")?;

    let audit_step = AuditStep {
        step_number,
        rule_id: "flat_deductions".to_string(),
        rule_name: "Flat Deductions".to_string(),
        input: serde_json::json!({
            "provident_fund": deductions.provident_fund.to_string(),
            "insurance": deductions.insurance.to_string()
        }),
        output: serde_json::json!({
            "total_deductions": total.to_string()
        }),
        reasoning: format!(
            "PF {} + insurance {} = {}",
            deductions.provident_fund, deductions.insurance, total
        ),
    };

    Ok(DeductionsResult {
        deductions,
        total,
        audit_step,
    })
}
