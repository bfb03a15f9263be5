use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumString};
use utoipa::ToSchema;

use crate::payroll::PayPeriod;

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema, Display, EnumString,
    AsRefStr,
)]
pub enum PayrollStatus {
    Draft,
    Approved,
    Paid,
}

/// Payroll record for one employee and one month.
///
/// Currency fields are stored with two decimal places. `deleted_at` marks a
/// soft-deleted record; every "live" query filters on it explicitly.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[schema(example = json!({
    "id": 1,
    "employee_id": 1001,
    "year": 2026,
    "month": 1,
    "base_salary": "15000000.00",
    "kpi_bonus": "0.00",
    "responsibility_allowance": "0.00",
    "lunch_allowance": "0.00",
    "phone_allowance": "0.00",
    "travel_allowance": "0.00",
    "standard_working_days": 22,
    "actual_working_days": 22,
    "insurance_salary": "15000000.00",
    "company_insurance": "2625000.00",
    "employee_insurance": "1575000.00",
    "personal_income_tax": "121250.00",
    "net_salary": "13303750.00",
    "status": "Draft",
    "created_at": "2026-02-01T00:00:00Z"
}))]
pub struct Payroll {
    pub id: u64,
    pub employee_id: u64,
    pub year: i32,
    pub month: u32,
    #[schema(value_type = String)]
    pub base_salary: Decimal,
    #[schema(value_type = String)]
    pub kpi_bonus: Decimal,
    #[schema(value_type = String)]
    pub responsibility_allowance: Decimal,
    #[schema(value_type = String)]
    pub lunch_allowance: Decimal,
    #[schema(value_type = String)]
    pub phone_allowance: Decimal,
    #[schema(value_type = String)]
    pub travel_allowance: Decimal,
    pub standard_working_days: u32,
    pub actual_working_days: u32,
    #[schema(value_type = String)]
    pub insurance_salary: Decimal,
    #[schema(value_type = String)]
    pub company_insurance: Decimal,
    #[schema(value_type = String)]
    pub employee_insurance: Decimal,
    #[schema(value_type = String)]
    pub personal_income_tax: Decimal,
    #[schema(value_type = String)]
    pub net_salary: Decimal,
    pub status: PayrollStatus,
    #[schema(value_type = String, format = "date-time")]
    pub created_at: DateTime<Utc>,
    #[schema(value_type = Option<String>, format = "date-time")]
    pub updated_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[schema(value_type = Option<String>, format = "date-time")]
    pub deleted_at: Option<DateTime<Utc>>,
}

impl Payroll {
    pub fn period(&self) -> PayPeriod {
        PayPeriod {
            year: self.year,
            month: self.month,
        }
    }

    /// Build the stored record from a freshly inserted breakdown.
    pub fn from_new(id: u64, new: NewPayroll) -> Self {
        Self {
            id,
            employee_id: new.employee_id,
            year: new.year,
            month: new.month,
            base_salary: new.base_salary,
            kpi_bonus: Decimal::ZERO,
            responsibility_allowance: Decimal::ZERO,
            lunch_allowance: Decimal::ZERO,
            phone_allowance: Decimal::ZERO,
            travel_allowance: Decimal::ZERO,
            standard_working_days: new.standard_working_days,
            actual_working_days: new.actual_working_days,
            insurance_salary: new.insurance_salary,
            company_insurance: new.company_insurance,
            employee_insurance: new.employee_insurance,
            personal_income_tax: new.personal_income_tax,
            net_salary: new.net_salary,
            status: new.status,
            created_at: new.created_at,
            updated_at: None,
            deleted_at: None,
        }
    }
}

/// Calculator output, not yet persisted.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NewPayroll {
    pub employee_id: u64,
    pub year: i32,
    pub month: u32,
    pub base_salary: Decimal,
    pub standard_working_days: u32,
    pub actual_working_days: u32,
    pub insurance_salary: Decimal,
    pub company_insurance: Decimal,
    pub employee_insurance: Decimal,
    pub personal_income_tax: Decimal,
    pub net_salary: Decimal,
    pub status: PayrollStatus,
    pub created_at: DateTime<Utc>,
}

/// Manual post-generation edits. `None` leaves a field unchanged.
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct PayrollAdjustment {
    #[schema(value_type = Option<String>, example = "500000")]
    pub kpi_bonus: Option<Decimal>,
    #[schema(value_type = Option<String>)]
    pub responsibility_allowance: Option<Decimal>,
    #[schema(value_type = Option<String>, example = "730000")]
    pub lunch_allowance: Option<Decimal>,
    #[schema(value_type = Option<String>)]
    pub phone_allowance: Option<Decimal>,
    #[schema(value_type = Option<String>)]
    pub travel_allowance: Option<Decimal>,
}

impl PayrollAdjustment {
    pub fn is_empty(&self) -> bool {
        self.values().all(|v| v.is_none())
    }

    pub fn has_negative(&self) -> bool {
        self.values().flatten().any(|v| v.is_sign_negative() && !v.is_zero())
    }

    fn values(&self) -> impl Iterator<Item = Option<Decimal>> {
        [
            self.kpi_bonus,
            self.responsibility_allowance,
            self.lunch_allowance,
            self.phone_allowance,
            self.travel_allowance,
        ]
        .into_iter()
    }
}
