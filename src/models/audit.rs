//! Audit steps recorded by payroll computations.

use serde::{Deserialize, Serialize};

/// A single step in the audit trace recording a calculation decision.
///
/// Each step captures the input, output, and reasoning for a rule application,
/// so a stored payroll record can explain how its figures were reached.
///
/// # Example
///
/// ```
/// use payroll_engine::models::AuditStep;
///
/// let step = AuditStep {
///     step_number: 1,
///     rule_id: "basic_proration".to_string(),
///     rule_name: "Basic Salary Proration".to_string(),
///     input: serde_json::json!({ "basic": "3000", "payable_days": 15 }),
///     output: serde_json::json!({ "prorated_basic": "1500.00" }),
///     reasoning: "Basic 3000 x 15/30 days = 1500.00".to_string(),
/// };
/// assert_eq!(step.rule_id, "basic_proration");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditStep {
    /// The sequential step number.
    pub step_number: u32,
    /// The unique identifier of the rule that was applied.
    pub rule_id: String,
    /// The human-readable name of the rule.
    pub rule_name: String,
    /// The input data for this step.
    pub input: serde_json::Value,
    /// The output data from this step.
    pub output: serde_json::Value,
    /// Human-readable explanation of the decision.
    pub reasoning: String,
}
