use chrono::NaiveDate;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Versioned payroll ruleset. Rows are never mutated once created; a newer
/// config supersedes an older one by `effective_from`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct PayrollConfig {
    #[schema(example = 1)]
    pub id: u64,
    #[schema(example = 22)]
    pub standard_working_days: i32,
    #[schema(value_type = String, example = "11000000")]
    pub personal_tax_deduction: Decimal,
    /// Percent, e.g. 17.5
    #[schema(value_type = String, example = "17.5")]
    pub company_insurance_rate: Decimal,
    /// Percent, e.g. 10.5
    #[schema(value_type = String, example = "10.5")]
    pub employee_insurance_rate: Decimal,
    #[schema(example = "2026-01-01", value_type = String, format = "date")]
    pub effective_from: NaiveDate,
    #[schema(example = "2026-12-31", value_type = Option<String>, format = "date")]
    pub effective_to: Option<NaiveDate>,
    pub is_active: bool,
}

impl PayrollConfig {
    /// True when `date` falls inside `[effective_from, effective_to]`.
    pub fn is_effective_on(&self, date: NaiveDate) -> bool {
        self.effective_from <= date && self.effective_to.is_none_or(|to| to >= date)
    }
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct NewPayrollConfig {
    #[serde(default = "default_standard_working_days")]
    #[schema(example = 22)]
    pub standard_working_days: i32,
    #[serde(default = "default_personal_tax_deduction")]
    #[schema(value_type = String, example = "11000000")]
    pub personal_tax_deduction: Decimal,
    #[serde(default = "default_company_insurance_rate")]
    #[schema(value_type = String, example = "17.5")]
    pub company_insurance_rate: Decimal,
    #[serde(default = "default_employee_insurance_rate")]
    #[schema(value_type = String, example = "10.5")]
    pub employee_insurance_rate: Decimal,
    #[schema(example = "2026-01-01", value_type = String, format = "date")]
    pub effective_from: NaiveDate,
    #[schema(value_type = Option<String>, format = "date")]
    pub effective_to: Option<NaiveDate>,
    #[serde(default = "default_is_active")]
    pub is_active: bool,
}

impl NewPayrollConfig {
    pub fn starting(effective_from: NaiveDate) -> Self {
        Self {
            standard_working_days: default_standard_working_days(),
            personal_tax_deduction: default_personal_tax_deduction(),
            company_insurance_rate: default_company_insurance_rate(),
            employee_insurance_rate: default_employee_insurance_rate(),
            effective_from,
            effective_to: None,
            is_active: default_is_active(),
        }
    }

    pub fn into_config(self, id: u64) -> PayrollConfig {
        PayrollConfig {
            id,
            standard_working_days: self.standard_working_days,
            personal_tax_deduction: self.personal_tax_deduction,
            company_insurance_rate: self.company_insurance_rate,
            employee_insurance_rate: self.employee_insurance_rate,
            effective_from: self.effective_from,
            effective_to: self.effective_to,
            is_active: self.is_active,
        }
    }
}

fn default_standard_working_days() -> i32 {
    22
}

fn default_personal_tax_deduction() -> Decimal {
    dec!(11000000)
}

fn default_company_insurance_rate() -> Decimal {
    dec!(17.5)
}

fn default_employee_insurance_rate() -> Decimal {
    dec!(10.5)
}

fn default_is_active() -> bool {
    true
}
