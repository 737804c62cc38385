//! Payroll figures and persisted payroll records.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::{EngineError, EngineResult};

use super::{AuditStep, PayPeriod};

/// How basic salary relates to attendance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProrationMode {
    /// Basic is scaled by payable days over calendar days.
    #[default]
    Prorated,
    /// Basic is paid in full and every calendar day is payable.
    Flat,
}

impl ProrationMode {
    /// Returns the storage representation of the mode.
    pub fn as_str(&self) -> &'static str {
        match self {
            ProrationMode::Prorated => "prorated",
            ProrationMode::Flat => "flat",
        }
    }
}

impl fmt::Display for ProrationMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ProrationMode {
    type Err = EngineError;

    fn from_str(s: &str) -> EngineResult<Self> {
        match s {
            "prorated" => Ok(ProrationMode::Prorated),
            "flat" => Ok(ProrationMode::Flat),
            other => Err(EngineError::validation(
                "proration",
                format!("unknown proration mode '{}'", other),
            )),
        }
    }
}

/// Earnings components making up gross pay.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Earnings {
    /// Basic salary after proration.
    pub basic: Decimal,
    /// Housing allowance.
    pub housing_allowance: Decimal,
    /// Conveyance allowance.
    pub conveyance: Decimal,
}

impl Earnings {
    /// Sum of all earnings components, or `None` on overflow.
    pub fn checked_total(&self) -> Option<Decimal> {
        self.basic
            .checked_add(self.housing_allowance)?
            .checked_add(self.conveyance)
    }
}

/// Deduction components.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Deductions {
    /// Provident fund deduction.
    pub provident_fund: Decimal,
    /// Insurance (ESIC) deduction.
    pub insurance: Decimal,
}

impl Deductions {
    /// Sum of all deductions, or `None` on overflow.
    pub fn checked_total(&self) -> Option<Decimal> {
        self.provident_fund.checked_add(self.insurance)
    }
}

/// The output of the payroll rules for one employee and period.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PayrollFigures {
    /// Days compensated.
    pub payable_days: u32,
    /// Calendar length of the period.
    pub days_in_month: u32,
    /// Proration mode the figures were computed under.
    pub proration: ProrationMode,
    /// Earnings breakdown.
    pub earnings: Earnings,
    /// Total earnings.
    pub gross: Decimal,
    /// Deduction breakdown.
    pub deductions: Deductions,
    /// Total deductions.
    pub total_deductions: Decimal,
    /// Gross minus deductions.
    pub net: Decimal,
    /// How the figures were reached.
    pub audit_steps: Vec<AuditStep>,
}

/// A persisted payroll result, unique per (employee, month, year).
///
/// Records are immutable. A forced regeneration replaces a record as a
/// correction and bumps `revision`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PayrollRecord {
    /// The employee paid.
    pub employee_id: String,
    /// The period paid.
    pub period: PayPeriod,
    /// Computed figures.
    #[serde(flatten)]
    pub figures: PayrollFigures,
    /// 1 for the first generation, incremented by each correction.
    pub revision: u32,
    /// Actor that generated the record.
    pub generated_by: String,
    /// When the record was generated.
    pub generated_at: DateTime<Utc>,
}

impl PayrollRecord {
    /// Returns true if the record replaced an earlier generation.
    pub fn is_correction(&self) -> bool {
        self.revision > 1
    }
}

/// Aggregate amounts over a set of payroll records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PayrollTotals {
    /// Number of employees paid.
    pub employees: usize,
    /// Sum of gross pay.
    pub gross: Decimal,
    /// Sum of deductions.
    pub deductions: Decimal,
    /// Sum of net pay.
    pub net: Decimal,
}

impl PayrollTotals {
    /// Totals over the given records.
    pub fn from_records(records: &[PayrollRecord]) -> Self {
        records.iter().fold(Self::default(), |mut totals, record| {
            totals.employees += 1;
            totals.gross += record.figures.gross;
            totals.deductions += record.figures.total_deductions;
            totals.net += record.figures.net;
            totals
        })
    }
}
