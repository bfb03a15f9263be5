use std::str::FromStr;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::{FromRow, MySqlPool};

use crate::model::payroll::{NewPayroll, Payroll, PayrollAdjustment, PayrollStatus};
use crate::payroll::error::{PayrollError, PayrollResult};
use crate::payroll::period::PayPeriod;
use crate::payroll::store::PayrollStore;

const SELECT_PAYROLL: &str = r#"
    SELECT id, employee_id, year, month, base_salary, kpi_bonus,
           responsibility_allowance, lunch_allowance, phone_allowance, travel_allowance,
           standard_working_days, actual_working_days, insurance_salary,
           company_insurance, employee_insurance, personal_income_tax, net_salary,
           status, created_at, updated_at, deleted_at
    FROM payroll
"#;

#[derive(Debug, FromRow)]
struct PayrollRow {
    id: u64,
    employee_id: u64,
    year: i32,
    month: u32,
    base_salary: Decimal,
    kpi_bonus: Decimal,
    responsibility_allowance: Decimal,
    lunch_allowance: Decimal,
    phone_allowance: Decimal,
    travel_allowance: Decimal,
    standard_working_days: u32,
    actual_working_days: u32,
    insurance_salary: Decimal,
    company_insurance: Decimal,
    employee_insurance: Decimal,
    personal_income_tax: Decimal,
    net_salary: Decimal,
    status: String,
    created_at: DateTime<Utc>,
    updated_at: Option<DateTime<Utc>>,
    deleted_at: Option<DateTime<Utc>>,
}

impl TryFrom<PayrollRow> for Payroll {
    type Error = PayrollError;

    fn try_from(row: PayrollRow) -> Result<Self, Self::Error> {
        let status = PayrollStatus::from_str(&row.status).map_err(|_| {
            PayrollError::Database(sqlx::Error::Decode(
                format!("unknown payroll status `{}` on payroll {}", row.status, row.id).into(),
            ))
        })?;

        Ok(Payroll {
            id: row.id,
            employee_id: row.employee_id,
            year: row.year,
            month: row.month,
            base_salary: row.base_salary,
            kpi_bonus: row.kpi_bonus,
            responsibility_allowance: row.responsibility_allowance,
            lunch_allowance: row.lunch_allowance,
            phone_allowance: row.phone_allowance,
            travel_allowance: row.travel_allowance,
            standard_working_days: row.standard_working_days,
            actual_working_days: row.actual_working_days,
            insurance_salary: row.insurance_salary,
            company_insurance: row.company_insurance,
            employee_insurance: row.employee_insurance,
            personal_income_tax: row.personal_income_tax,
            net_salary: row.net_salary,
            status,
            created_at: row.created_at,
            updated_at: row.updated_at,
            deleted_at: row.deleted_at,
        })
    }
}

fn into_payrolls(rows: Vec<PayrollRow>) -> PayrollResult<Vec<Payroll>> {
    rows.into_iter().map(Payroll::try_from).collect()
}

#[derive(Clone)]
pub struct MySqlPayrolls {
    pool: MySqlPool,
}

impl MySqlPayrolls {
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl PayrollStore for MySqlPayrolls {
    async fn exists(&self, employee_id: u64, period: PayPeriod) -> PayrollResult<bool> {
        let found: Option<u64> = sqlx::query_scalar(
            r#"
            SELECT id FROM payroll
            WHERE employee_id = ? AND year = ? AND month = ? AND deleted_at IS NULL
            LIMIT 1
            "#,
        )
        .bind(employee_id)
        .bind(period.year)
        .bind(period.month)
        .fetch_optional(&self.pool)
        .await?;

        Ok(found.is_some())
    }

    async fn insert(&self, payroll: NewPayroll) -> PayrollResult<Payroll> {
        let result = sqlx::query(
            r#"
            INSERT INTO payroll
            (employee_id, year, month, base_salary, kpi_bonus, responsibility_allowance,
             lunch_allowance, phone_allowance, travel_allowance, standard_working_days,
             actual_working_days, insurance_salary, company_insurance, employee_insurance,
             personal_income_tax, net_salary, status, created_at)
            VALUES (?, ?, ?, ?, 0, 0, 0, 0, 0, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(payroll.employee_id)
        .bind(payroll.year)
        .bind(payroll.month)
        .bind(payroll.base_salary)
        .bind(payroll.standard_working_days)
        .bind(payroll.actual_working_days)
        .bind(payroll.insurance_salary)
        .bind(payroll.company_insurance)
        .bind(payroll.employee_insurance)
        .bind(payroll.personal_income_tax)
        .bind(payroll.net_salary)
        .bind(payroll.status.as_ref())
        .bind(payroll.created_at)
        .execute(&self.pool)
        .await;

        match result {
            Ok(done) => Ok(Payroll::from_new(done.last_insert_id(), payroll)),
            Err(e) => {
                // live rows are unique on (employee_id, year, month)
                if let sqlx::Error::Database(db_err) = &e {
                    if db_err.is_unique_violation() {
                        return Err(PayrollError::DuplicatePayroll {
                            employee_id: payroll.employee_id,
                            year: payroll.year,
                            month: payroll.month,
                        });
                    }
                }

                tracing::error!(error = %e, employee_id = payroll.employee_id, "Payroll insert failed");
                Err(e.into())
            }
        }
    }

    async fn update_computed(
        &self,
        id: u64,
        computed: &NewPayroll,
        at: DateTime<Utc>,
    ) -> PayrollResult<bool> {
        let result = sqlx::query(
            r#"
            UPDATE payroll
            SET base_salary = ?, standard_working_days = ?, actual_working_days = ?,
                insurance_salary = ?, company_insurance = ?, employee_insurance = ?,
                personal_income_tax = ?, net_salary = ?, status = 'Draft', updated_at = ?
            WHERE id = ?
            AND deleted_at IS NULL
            AND status IN ('Draft', 'Approved')
            "#,
        )
        .bind(computed.base_salary)
        .bind(computed.standard_working_days)
        .bind(computed.actual_working_days)
        .bind(computed.insurance_salary)
        .bind(computed.company_insurance)
        .bind(computed.employee_insurance)
        .bind(computed.personal_income_tax)
        .bind(computed.net_salary)
        .bind(at)
        .bind(id)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!(error = %e, payroll_id = id, "Payroll recalculation write failed");
            e
        })?;

        Ok(result.rows_affected() > 0)
    }

    async fn update_adjustments(
        &self,
        id: u64,
        adjustment: &PayrollAdjustment,
        at: DateTime<Utc>,
    ) -> PayrollResult<bool> {
        // NULL keeps the stored value
        let result = sqlx::query(
            r#"
            UPDATE payroll
            SET kpi_bonus = COALESCE(?, kpi_bonus),
                responsibility_allowance = COALESCE(?, responsibility_allowance),
                lunch_allowance = COALESCE(?, lunch_allowance),
                phone_allowance = COALESCE(?, phone_allowance),
                travel_allowance = COALESCE(?, travel_allowance),
                updated_at = ?
            WHERE id = ?
            AND deleted_at IS NULL
            AND status <> 'Paid'
            "#,
        )
        .bind(adjustment.kpi_bonus)
        .bind(adjustment.responsibility_allowance)
        .bind(adjustment.lunch_allowance)
        .bind(adjustment.phone_allowance)
        .bind(adjustment.travel_allowance)
        .bind(at)
        .bind(id)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!(error = %e, payroll_id = id, "Payroll adjustment write failed");
            e
        })?;

        Ok(result.rows_affected() > 0)
    }

    async fn set_status(
        &self,
        id: u64,
        from: PayrollStatus,
        to: PayrollStatus,
        at: DateTime<Utc>,
    ) -> PayrollResult<bool> {
        let result = sqlx::query(
            r#"
            UPDATE payroll
            SET status = ?, updated_at = ?
            WHERE id = ?
            AND deleted_at IS NULL
            AND status = ?
            "#,
        )
        .bind(to.as_ref())
        .bind(at)
        .bind(id)
        .bind(from.as_ref())
        .execute(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!(error = %e, payroll_id = id, %from, %to, "Payroll status write failed");
            e
        })?;

        Ok(result.rows_affected() > 0)
    }

    async fn soft_delete(&self, id: u64, at: DateTime<Utc>) -> PayrollResult<bool> {
        let result = sqlx::query(
            r#"
            UPDATE payroll
            SET deleted_at = ?, updated_at = ?
            WHERE id = ?
            AND deleted_at IS NULL
            AND status <> 'Paid'
            "#,
        )
        .bind(at)
        .bind(at)
        .bind(id)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!(error = %e, payroll_id = id, "Payroll delete failed");
            e
        })?;

        Ok(result.rows_affected() > 0)
    }

    async fn get(&self, id: u64) -> PayrollResult<Option<Payroll>> {
        let sql = format!("{SELECT_PAYROLL} WHERE id = ? AND deleted_at IS NULL");
        let row = sqlx::query_as::<_, PayrollRow>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        row.map(Payroll::try_from).transpose()
    }

    async fn find_by_employee_and_period(
        &self,
        employee_id: u64,
        period: PayPeriod,
    ) -> PayrollResult<Option<Payroll>> {
        let sql = format!(
            "{SELECT_PAYROLL} WHERE employee_id = ? AND year = ? AND month = ? AND deleted_at IS NULL"
        );
        let row = sqlx::query_as::<_, PayrollRow>(&sql)
            .bind(employee_id)
            .bind(period.year)
            .bind(period.month)
            .fetch_optional(&self.pool)
            .await?;

        row.map(Payroll::try_from).transpose()
    }

    async fn list_by_period(&self, period: PayPeriod) -> PayrollResult<Vec<Payroll>> {
        let sql = format!(
            "{SELECT_PAYROLL} WHERE year = ? AND month = ? AND deleted_at IS NULL ORDER BY employee_id"
        );
        let rows = sqlx::query_as::<_, PayrollRow>(&sql)
            .bind(period.year)
            .bind(period.month)
            .fetch_all(&self.pool)
            .await?;

        into_payrolls(rows)
    }

    async fn list_by_employee(&self, employee_id: u64) -> PayrollResult<Vec<Payroll>> {
        let sql = format!(
            "{SELECT_PAYROLL} WHERE employee_id = ? AND deleted_at IS NULL ORDER BY year DESC, month DESC"
        );
        let rows = sqlx::query_as::<_, PayrollRow>(&sql)
            .bind(employee_id)
            .fetch_all(&self.pool)
            .await?;

        into_payrolls(rows)
    }

    async fn list_by_status(&self, status: PayrollStatus) -> PayrollResult<Vec<Payroll>> {
        let sql = format!(
            "{SELECT_PAYROLL} WHERE status = ? AND deleted_at IS NULL ORDER BY year DESC, month DESC, employee_id"
        );
        let rows = sqlx::query_as::<_, PayrollRow>(&sql)
            .bind(status.as_ref())
            .fetch_all(&self.pool)
            .await?;

        into_payrolls(rows)
    }
}
