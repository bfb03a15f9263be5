//! Collaborators the payroll engine consumes. MySQL implementations live in
//! `crate::repository`; tests supply in-memory ones.

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};

use crate::model::employee::Employee;
use crate::model::payroll::{NewPayroll, Payroll, PayrollAdjustment, PayrollStatus};
use crate::model::payroll_config::{NewPayrollConfig, PayrollConfig};
use crate::payroll::error::PayrollResult;
use crate::payroll::period::PayPeriod;

#[async_trait]
pub trait AttendanceAggregator: Send + Sync {
    /// Days in `period` whose attendance status is Present or Late.
    async fn count_working_days(&self, employee_id: u64, period: PayPeriod) -> PayrollResult<u32>;
}

#[async_trait]
pub trait EmployeeDirectory: Send + Sync {
    async fn get_active_employees(&self) -> PayrollResult<Vec<Employee>>;

    async fn get_employee(&self, id: u64) -> PayrollResult<Option<Employee>>;
}

#[async_trait]
pub trait ConfigStore: Send + Sync {
    /// Active config with the greatest `effective_from`.
    async fn get_active_config(&self) -> PayrollResult<Option<PayrollConfig>>;

    /// Config whose effective window contains `date`, greatest `effective_from` first.
    async fn get_config_as_of(&self, date: NaiveDate) -> PayrollResult<Option<PayrollConfig>>;

    async fn insert(&self, config: NewPayrollConfig) -> PayrollResult<PayrollConfig>;

    async fn list(&self) -> PayrollResult<Vec<PayrollConfig>>;
}

/// Every read returns live (not soft-deleted) records only.
#[async_trait]
pub trait PayrollStore: Send + Sync {
    async fn exists(&self, employee_id: u64, period: PayPeriod) -> PayrollResult<bool>;

    /// Must fail with `PayrollError::DuplicatePayroll` when a live record for the
    /// same employee and period already exists, even under concurrent inserts.
    async fn insert(&self, payroll: NewPayroll) -> PayrollResult<Payroll>;

    /// Overwrite the computed columns and move the record back to Draft.
    /// Bonus and allowance columns are left alone. Returns `false` when the
    /// live row is missing or already Paid.
    async fn update_computed(
        &self,
        id: u64,
        computed: &NewPayroll,
        at: DateTime<Utc>,
    ) -> PayrollResult<bool>;

    /// Set only the bonus and allowance columns present in `adjustment`.
    /// Returns `false` when the live row is missing or already Paid.
    async fn update_adjustments(
        &self,
        id: u64,
        adjustment: &PayrollAdjustment,
        at: DateTime<Utc>,
    ) -> PayrollResult<bool>;

    /// Compare-and-set on `status`. Returns `false` unless the live row is
    /// currently in `from`.
    async fn set_status(
        &self,
        id: u64,
        from: PayrollStatus,
        to: PayrollStatus,
        at: DateTime<Utc>,
    ) -> PayrollResult<bool>;

    /// Set `deleted_at`. Returns `false` when the live row is missing or Paid.
    async fn soft_delete(&self, id: u64, at: DateTime<Utc>) -> PayrollResult<bool>;

    async fn get(&self, id: u64) -> PayrollResult<Option<Payroll>>;

    async fn find_by_employee_and_period(
        &self,
        employee_id: u64,
        period: PayPeriod,
    ) -> PayrollResult<Option<Payroll>>;

    async fn list_by_period(&self, period: PayPeriod) -> PayrollResult<Vec<Payroll>>;

    async fn list_by_employee(&self, employee_id: u64) -> PayrollResult<Vec<Payroll>>;

    async fn list_by_status(&self, status: PayrollStatus) -> PayrollResult<Vec<Payroll>>;
}
