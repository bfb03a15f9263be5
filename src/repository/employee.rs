use async_trait::async_trait;
use sqlx::MySqlPool;

use crate::model::employee::{Employee, EmployeeRow};
use crate::payroll::error::PayrollResult;
use crate::payroll::store::EmployeeDirectory;

#[derive(Clone)]
pub struct MySqlEmployees {
    pool: MySqlPool,
}

impl MySqlEmployees {
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl EmployeeDirectory for MySqlEmployees {
    async fn get_active_employees(&self) -> PayrollResult<Vec<Employee>> {
        let rows = sqlx::query_as::<_, EmployeeRow>(
            r#"
            SELECT id, employee_code, first_name, last_name, base_salary, status
            FROM employees
            WHERE status = 'active'
            ORDER BY id
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!(error = %e, "Failed to fetch active employees");
            e
        })?;

        Ok(rows.into_iter().map(Employee::from).collect())
    }

    async fn get_employee(&self, id: u64) -> PayrollResult<Option<Employee>> {
        let row = sqlx::query_as::<_, EmployeeRow>(
            r#"
            SELECT id, employee_code, first_name, last_name, base_salary, status
            FROM employees
            WHERE id = ?
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!(error = %e, employee_id = id, "Failed to fetch employee");
            e
        })?;

        Ok(row.map(Employee::from))
    }
}
