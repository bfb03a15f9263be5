use async_trait::async_trait;
use sqlx::MySqlPool;

use crate::model::attendance::AttendanceStatus;
use crate::payroll::error::{PayrollError, PayrollResult};
use crate::payroll::period::PayPeriod;
use crate::payroll::store::AttendanceAggregator;

#[derive(Clone)]
pub struct MySqlAttendance {
    pool: MySqlPool,
}

impl MySqlAttendance {
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl AttendanceAggregator for MySqlAttendance {
    async fn count_working_days(&self, employee_id: u64, period: PayPeriod) -> PayrollResult<u32> {
        let (Some(from), Some(until)) = (period.first_day(), period.next_first_day()) else {
            return Err(PayrollError::InvalidPeriod {
                year: period.year,
                month: period.month,
            });
        };
        let [present, late] = AttendanceStatus::WORKING;

        let count: i64 = sqlx::query_scalar(
            r#"
            SELECT COUNT(*)
            FROM attendance
            WHERE employee_id = ?
            AND date >= ?
            AND date < ?
            AND status IN (?, ?)
            "#,
        )
        .bind(employee_id)
        .bind(from)
        .bind(until)
        .bind(present.as_ref())
        .bind(late.as_ref())
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!(error = %e, employee_id, %period, "Failed to count working days");
            PayrollError::AttendanceLookup {
                employee_id,
                reason: e.to_string(),
            }
        })?;

        u32::try_from(count).map_err(|_| PayrollError::AttendanceLookup {
            employee_id,
            reason: format!("working day count out of range: {count}"),
        })
    }
}
