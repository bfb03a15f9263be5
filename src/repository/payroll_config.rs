use async_trait::async_trait;
use chrono::NaiveDate;
use sqlx::MySqlPool;

use crate::model::payroll_config::{NewPayrollConfig, PayrollConfig};
use crate::payroll::error::PayrollResult;
use crate::payroll::store::ConfigStore;

#[derive(Debug, sqlx::FromRow)]
struct PayrollConfigRow {
    id: u64,
    standard_working_days: i32,
    personal_tax_deduction: rust_decimal::Decimal,
    company_insurance_rate: rust_decimal::Decimal,
    employee_insurance_rate: rust_decimal::Decimal,
    effective_from: NaiveDate,
    effective_to: Option<NaiveDate>,
    is_active: bool,
}

impl From<PayrollConfigRow> for PayrollConfig {
    fn from(row: PayrollConfigRow) -> Self {
        Self {
            id: row.id,
            standard_working_days: row.standard_working_days,
            personal_tax_deduction: row.personal_tax_deduction,
            company_insurance_rate: row.company_insurance_rate,
            employee_insurance_rate: row.employee_insurance_rate,
            effective_from: row.effective_from,
            effective_to: row.effective_to,
            is_active: row.is_active,
        }
    }
}

#[derive(Clone)]
pub struct MySqlPayrollConfigs {
    pool: MySqlPool,
}

impl MySqlPayrollConfigs {
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ConfigStore for MySqlPayrollConfigs {
    async fn get_active_config(&self) -> PayrollResult<Option<PayrollConfig>> {
        let row = sqlx::query_as::<_, PayrollConfigRow>(
            r#"
            SELECT id, standard_working_days, personal_tax_deduction, company_insurance_rate,
                   employee_insurance_rate, effective_from, effective_to, is_active
            FROM payroll_configs
            WHERE is_active = TRUE
            ORDER BY effective_from DESC, id DESC
            LIMIT 1
            "#,
        )
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!(error = %e, "Failed to fetch active payroll config");
            e
        })?;

        Ok(row.map(PayrollConfig::from))
    }

    async fn get_config_as_of(&self, date: NaiveDate) -> PayrollResult<Option<PayrollConfig>> {
        let row = sqlx::query_as::<_, PayrollConfigRow>(
            r#"
            SELECT id, standard_working_days, personal_tax_deduction, company_insurance_rate,
                   employee_insurance_rate, effective_from, effective_to, is_active
            FROM payroll_configs
            WHERE effective_from <= ?
            AND (effective_to IS NULL OR effective_to >= ?)
            ORDER BY effective_from DESC, id DESC
            LIMIT 1
            "#,
        )
        .bind(date)
        .bind(date)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!(error = %e, %date, "Failed to fetch payroll config by date");
            e
        })?;

        Ok(row.map(PayrollConfig::from))
    }

    async fn insert(&self, config: NewPayrollConfig) -> PayrollResult<PayrollConfig> {
        let result = sqlx::query(
            r#"
            INSERT INTO payroll_configs
            (standard_working_days, personal_tax_deduction, company_insurance_rate,
             employee_insurance_rate, effective_from, effective_to, is_active)
            VALUES (?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(config.standard_working_days)
        .bind(config.personal_tax_deduction)
        .bind(config.company_insurance_rate)
        .bind(config.employee_insurance_rate)
        .bind(config.effective_from)
        .bind(config.effective_to)
        .bind(config.is_active)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!(error = %e, "Failed to create payroll config");
            e
        })?;

        Ok(config.into_config(result.last_insert_id()))
    }

    async fn list(&self) -> PayrollResult<Vec<PayrollConfig>> {
        let rows = sqlx::query_as::<_, PayrollConfigRow>(
            r#"
            SELECT id, standard_working_days, personal_tax_deduction, company_insurance_rate,
                   employee_insurance_rate, effective_from, effective_to, is_active
            FROM payroll_configs
            ORDER BY effective_from DESC, id DESC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(PayrollConfig::from).collect())
    }
}
