//! Employee, compensation and department models.
//!
//! Employees are never deleted. Leaving the company is a status transition
//! to [`EmployeeStatus::Inactive`], which removes them from payroll runs
//! while keeping their attendance and payroll history intact.

use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::{EngineError, EngineResult};

/// Employment status of an employee.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EmployeeStatus {
    /// Included in payroll runs.
    #[default]
    Active,
    /// Excluded from payroll runs; history retained.
    Inactive,
}

impl EmployeeStatus {
    /// Returns the storage representation of the status.
    pub fn as_str(&self) -> &'static str {
        match self {
            EmployeeStatus::Active => "active",
            EmployeeStatus::Inactive => "inactive",
        }
    }
}

impl fmt::Display for EmployeeStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EmployeeStatus {
    type Err = EngineError;

    fn from_str(s: &str) -> EngineResult<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "active" => Ok(EmployeeStatus::Active),
            "inactive" => Ok(EmployeeStatus::Inactive),
            other => Err(EngineError::validation(
                "status",
                format!("unknown employee status '{}'", other),
            )),
        }
    }
}

/// Largest accepted amount for any single compensation component: one
/// trillion per month.
pub const MAX_COMPONENT: Decimal = Decimal::from_parts(3_567_587_328, 232, 0, false, 0);

/// Compensation as held on the employee record.
///
/// Every component is optional because HR data is entered incrementally.
/// [`Compensation::resolve`] turns it into a [`CompensationStructure`]
/// usable by the payroll rules.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Compensation {
    /// Monthly basic salary.
    #[serde(default)]
    pub basic: Option<Decimal>,
    /// Monthly housing allowance (HRA).
    #[serde(default)]
    pub housing_allowance: Option<Decimal>,
    /// Monthly conveyance allowance.
    #[serde(default)]
    pub conveyance: Option<Decimal>,
    /// Monthly provident fund deduction.
    #[serde(default)]
    pub provident_fund: Option<Decimal>,
    /// Monthly insurance (ESIC) deduction.
    #[serde(default)]
    pub insurance: Option<Decimal>,
}

impl Compensation {
    /// Rejects negative components and components above [`MAX_COMPONENT`].
    /// Missing components are allowed here.
    pub fn validate(&self) -> EngineResult<()> {
        let components = [
            ("basic", self.basic),
            ("housing_allowance", self.housing_allowance),
            ("conveyance", self.conveyance),
            ("provident_fund", self.provident_fund),
            ("insurance", self.insurance),
        ];
        for (field, value) in components {
            if let Some(amount) = value
                && amount < Decimal::ZERO
            {
                return Err(EngineError::validation(
                    field,
                    format!("must not be negative, got {}", amount),
                ));
            }
            if let Some(amount) = value
                && amount > MAX_COMPONENT
            {
                return Err(EngineError::validation(
                    field,
                    format!("must not exceed {}, got {}", MAX_COMPONENT, amount),
                ));
            }
        }
        Ok(())
    }

    /// Resolves the stored compensation into a complete structure.
    ///
    /// Basic salary is required. Allowances and deductions that were never
    /// entered count as zero.
    ///
    /// # Example
    ///
    /// ```
    /// use payroll_engine::models::Compensation;
    /// use rust_decimal::Decimal;
    ///
    /// let stored = Compensation {
    ///     basic: Some(Decimal::from(3000)),
    ///     housing_allowance: Some(Decimal::from(500)),
    ///     ..Default::default()
    /// };
    /// let resolved = stored.resolve().unwrap();
    /// assert_eq!(resolved.conveyance, Decimal::ZERO);
    ///
    /// assert!(Compensation::default().resolve().is_err());
    /// ```
    pub fn resolve(&self) -> EngineResult<CompensationStructure> {
        self.validate()?;
        let basic = self.basic.ok_or_else(|| {
            EngineError::validation("basic", "basic salary is not set")
        })?;
        Ok(CompensationStructure {
            basic,
            housing_allowance: self.housing_allowance.unwrap_or(Decimal::ZERO),
            conveyance: self.conveyance.unwrap_or(Decimal::ZERO),
            provident_fund: self.provident_fund.unwrap_or(Decimal::ZERO),
            insurance: self.insurance.unwrap_or(Decimal::ZERO),
        })
    }
}

/// A complete monthly compensation structure, input to the payroll rules.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompensationStructure {
    /// Monthly basic salary, prorated by attendance.
    pub basic: Decimal,
    /// Monthly housing allowance, paid flat.
    pub housing_allowance: Decimal,
    /// Monthly conveyance allowance, paid flat.
    pub conveyance: Decimal,
    /// Flat provident fund deduction.
    pub provident_fund: Decimal,
    /// Flat insurance deduction.
    pub insurance: Decimal,
}

/// An employee known to the HR store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Employee {
    /// Unique, immutable employee code (e.g. "EMP0001").
    pub id: String,
    /// Given name.
    pub first_name: String,
    /// Family name.
    pub last_name: String,
    /// Contact email, unique when present.
    #[serde(default)]
    pub email: Option<String>,
    /// Department the employee belongs to.
    #[serde(default)]
    pub department_id: Option<String>,
    /// Date the employee joined.
    #[serde(default)]
    pub date_of_joining: Option<NaiveDate>,
    /// Monthly compensation.
    #[serde(default)]
    pub compensation: Compensation,
    /// Employment status.
    #[serde(default)]
    pub status: EmployeeStatus,
}

impl Employee {
    /// Returns true if the employee takes part in payroll runs.
    pub fn is_active(&self) -> bool {
        self.status == EmployeeStatus::Active
    }

    /// Checks the fields that registration requires.
    pub fn validate(&self) -> EngineResult<()> {
        if self.id.trim().is_empty() {
            return Err(EngineError::validation("id", "employee id must not be empty"));
        }
        if self.first_name.trim().is_empty() {
            return Err(EngineError::validation(
                "first_name",
                "first name must not be empty",
            ));
        }
        if let Some(email) = &self.email
            && !email.contains('@')
        {
            return Err(EngineError::validation(
                "email",
                format!("'{}' is not an email address", email),
            ));
        }
        self.compensation.validate()
    }
}

/// An organisational department employees can belong to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Department {
    /// Unique department code.
    pub id: String,
    /// Department name.
    pub name: String,
    /// Name of the company the department belongs to.
    #[serde(default)]
    pub company: Option<String>,
}
