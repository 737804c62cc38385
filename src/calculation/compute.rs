//! The payroll computation for one employee and one month.

use crate::error::EngineResult;
use crate::models::{
    AttendanceSummary, AuditStep, CompensationStructure, PayrollFigures, ProrationMode,
};

use super::deductions::calculate_deductions;
use super::earnings::calculate_earnings;
use super::in_range;
use super::proration::prorate_basic;

/// Computes gross, deductions and net pay for one employee-month.
///
/// The pipeline is:
/// 1. Prorate basic salary by payable days (or pay it flat)
/// 2. Add housing allowance and conveyance to reach gross
/// 3. Total the flat deductions
/// 4. Net = gross - deductions
///
/// Each step appends an [`AuditStep`] to the returned figures. The function
/// is pure: it reads nothing but its arguments.
///
/// # Errors
///
/// Returns `Validation` when the summary's payable days exceed
/// `days_in_month`, or when an amount overflows.
///
/// # Examples
///
/// ```
/// use payroll_engine::calculation::compute;
/// use payroll_engine::models::{
///     AttendanceSummary, CompensationStructure, PayPeriod, ProrationMode,
/// };
/// use rust_decimal::Decimal;
///
/// let comp = CompensationStructure {
///     basic: Decimal::from(3000),
///     housing_allowance: Decimal::from(500),
///     conveyance: Decimal::from(200),
///     provident_fund: Decimal::from(150),
///     insurance: Decimal::from(50),
/// };
/// let period = PayPeriod::new(9, 2026).unwrap();
/// let mut summary = AttendanceSummary::empty("EMP0001", period);
/// summary.payable_days = 30;
///
/// let figures = compute(&comp, &summary, 30, ProrationMode::Prorated).unwrap();
/// assert_eq!(figures.gross, Decimal::from(3700));
/// assert_eq!(figures.total_deductions, Decimal::from(200));
/// assert_eq!(figures.net, Decimal::from(3500));
/// ```
pub fn compute(
    comp: &CompensationStructure,
    summary: &AttendanceSummary,
    days_in_month: u32,
    mode: ProrationMode,
) -> EngineResult<PayrollFigures> {
    let mut audit_steps = Vec::new();
    let mut current_step = 1;

    // Step 1: Basic proration
    let proration = prorate_basic(
        comp.basic,
        summary.payable_days,
        days_in_month,
        mode,
        current_step,
    )?;
    audit_steps.push(proration.audit_step);
    current_step += 1;

    // Step 2: Gross earnings
    let earnings = calculate_earnings(comp, proration.basic, current_step)?;
    audit_steps.push(earnings.audit_step);
    current_step += 1;

    // Step 3: Deductions
    let deductions = calculate_deductions(comp, current_step)?;
    audit_steps.push(deductions.audit_step);
    current_step += 1;

    // Step 4: Net pay
    let net = in_range(earnings.gross.checked_sub(deductions.total), "net")?;
    audit_steps.push(AuditStep {
        step_number: current_step,
        rule_id: "net_pay".to_string(),
        rule_name: "Net Pay".to_string(),
        input: serde_json::json!({
            "gross": earnings.gross.to_string(),
            "total_deductions": deductions.total.to_string()
        }),
        output: serde_json::json!({
            "net": net.to_string()
        }),
        reasoning: format!("{} - {} = {}", earnings.gross, deductions.total, net),
    });

    Ok(PayrollFigures {
        payable_days: proration.payable_days,
        days_in_month,
        proration: mode,
        earnings: earnings.earnings,
        gross: earnings.gross,
        deductions: deductions.deductions,
        total_deductions: deductions.total,
        net,
        audit_steps,
    })
}
