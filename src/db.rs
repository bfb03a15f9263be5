use std::sync::Arc;

use anyhow::{Context, Result};
use sqlx::MySqlPool;

use crate::payroll::{PayrollService, PayrollSettings};
use crate::repository::{MySqlAttendance, MySqlEmployees, MySqlPayrollConfigs, MySqlPayrolls};

pub async fn init_db(database_url: &str) -> Result<MySqlPool> {
    MySqlPool::connect(database_url)
        .await
        .context("Failed to connect to database")
}

/// Payroll service backed by the MySQL repositories.
pub fn payroll_service(pool: &MySqlPool, settings: PayrollSettings) -> PayrollService {
    PayrollService::new(
        Arc::new(MySqlAttendance::new(pool.clone())),
        Arc::new(MySqlEmployees::new(pool.clone())),
        Arc::new(MySqlPayrollConfigs::new(pool.clone())),
        Arc::new(MySqlPayrolls::new(pool.clone())),
        settings,
    )
}
