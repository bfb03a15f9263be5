use chrono::{DateTime, Utc};
use rust_decimal::{Decimal, RoundingStrategy};
use rust_decimal_macros::dec;
use serde::Serialize;

use crate::model::employee::Employee;
use crate::model::payroll::{NewPayroll, PayrollStatus};
use crate::model::payroll_config::PayrollConfig;
use crate::payroll::error::{PayrollError, PayrollResult};
use crate::payroll::period::PayPeriod;
use crate::payroll::tax::compute_tax;

/// Stored currency precision.
const CURRENCY_DP: u32 = 2;

fn to_currency(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(CURRENCY_DP, RoundingStrategy::MidpointNearestEven)
}

/// Full-precision intermediate values, kept for audit and tests.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PayrollBreakdown {
    pub daily_salary: Decimal,
    pub calculated_base_salary: Decimal,
    pub insurance_salary: Decimal,
    pub company_insurance: Decimal,
    pub employee_insurance: Decimal,
    pub gross_salary: Decimal,
    pub taxable_income: Decimal,
    pub personal_income_tax: Decimal,
    pub net_salary: Decimal,
}

pub fn validate_config(config: &PayrollConfig) -> PayrollResult<u32> {
    if config.standard_working_days <= 0 {
        return Err(PayrollError::Configuration(format!(
            "standard working days must be positive, got {} (config {})",
            config.standard_working_days, config.id
        )));
    }
    let rates = [
        ("company insurance rate", config.company_insurance_rate),
        ("employee insurance rate", config.employee_insurance_rate),
    ];
    for (name, rate) in rates {
        if rate < Decimal::ZERO || rate > dec!(100) {
            return Err(PayrollError::Configuration(format!(
                "{name} must be between 0 and 100, got {rate} (config {})",
                config.id
            )));
        }
    }
    if config.personal_tax_deduction < Decimal::ZERO {
        return Err(PayrollError::Configuration(format!(
            "personal tax deduction cannot be negative (config {})",
            config.id
        )));
    }
    // validated positive above
    Ok(config.standard_working_days as u32)
}

/// Compute the breakdown for one employee and month. Pure: no I/O, no clock.
///
/// Net is floored at zero. With low attendance the full employee insurance is
/// still recorded, so `net = gross - employee_insurance - tax` no longer holds
/// for those records.
pub fn compute_breakdown(
    base_salary: Decimal,
    actual_working_days: u32,
    config: &PayrollConfig,
) -> PayrollResult<PayrollBreakdown> {
    let standard_days = Decimal::from(validate_config(config)?);
    let actual_days = Decimal::from(actual_working_days);
    let hundred = dec!(100);

    let daily_salary = base_salary / standard_days;
    // multiply first so full attendance reproduces the base salary exactly
    let calculated_base_salary = base_salary * actual_days / standard_days;

    let insurance_salary = base_salary;
    let company_insurance = insurance_salary * config.company_insurance_rate / hundred;
    let employee_insurance = insurance_salary * config.employee_insurance_rate / hundred;

    let gross_salary = calculated_base_salary;
    let taxable_income = gross_salary - employee_insurance - config.personal_tax_deduction;
    let personal_income_tax = compute_tax(taxable_income);

    let net_salary = (gross_salary - employee_insurance - personal_income_tax).max(Decimal::ZERO);

    Ok(PayrollBreakdown {
        daily_salary,
        calculated_base_salary,
        insurance_salary,
        company_insurance,
        employee_insurance,
        gross_salary,
        taxable_income,
        personal_income_tax,
        net_salary,
    })
}

/// Build the Draft record for `employee`. Persistence is the caller's job.
pub fn calculate(
    employee: &Employee,
    period: PayPeriod,
    actual_working_days: u32,
    config: &PayrollConfig,
    now: DateTime<Utc>,
) -> PayrollResult<NewPayroll> {
    period.validate()?;
    let standard_working_days = validate_config(config)?;
    let breakdown = compute_breakdown(employee.base_salary, actual_working_days, config)?;

    Ok(NewPayroll {
        employee_id: employee.id,
        year: period.year,
        month: period.month,
        base_salary: to_currency(employee.base_salary),
        standard_working_days,
        actual_working_days,
        insurance_salary: to_currency(breakdown.insurance_salary),
        company_insurance: to_currency(breakdown.company_insurance),
        employee_insurance: to_currency(breakdown.employee_insurance),
        personal_income_tax: to_currency(breakdown.personal_income_tax),
        net_salary: to_currency(breakdown.net_salary),
        status: PayrollStatus::Draft,
        created_at: now,
    })
}
