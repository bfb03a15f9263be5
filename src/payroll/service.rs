use std::collections::HashSet;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use actix_web::rt::time::timeout;
use chrono::{NaiveDate, Utc};
use futures::{StreamExt, future, stream};
use rust_decimal::Decimal;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::model::employee::Employee;
use crate::model::payroll::{NewPayroll, Payroll, PayrollAdjustment, PayrollStatus};
use crate::model::payroll_config::{NewPayrollConfig, PayrollConfig};
use crate::payroll::batch::{BatchError, BatchResult, CancelToken, EmployeeOutcome, GeneratePayroll};
use crate::payroll::calculator;
use crate::payroll::error::{PayrollError, PayrollResult};
use crate::payroll::lifecycle::{self, ApprovePolicy, LifecycleAction, Transition};
use crate::payroll::period::PayPeriod;
use crate::payroll::resolver::{self, ConfigLookup};
use crate::payroll::store::{AttendanceAggregator, ConfigStore, EmployeeDirectory, PayrollStore};
use crate::payroll::tax;

/// Which config a recalculation runs against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RecalculationPolicy {
    /// The config active right now, re-rating old payrolls under current rules.
    #[default]
    ActiveConfig,
    /// The config effective on the last day of the payroll's own month.
    PeriodConfig,
}

impl FromStr for RecalculationPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "active" => Ok(RecalculationPolicy::ActiveConfig),
            "period" => Ok(RecalculationPolicy::PeriodConfig),
            other => Err(format!("unknown recalculation policy `{other}`")),
        }
    }
}

#[derive(Debug, Clone)]
pub struct PayrollSettings {
    pub recalculation_policy: RecalculationPolicy,
    pub approve_policy: ApprovePolicy,
    /// Employees computed at the same time during generation.
    pub batch_concurrency: usize,
    pub attendance_timeout: Duration,
    /// Extra attempts after a failed attendance lookup.
    pub attendance_retries: u32,
}

impl Default for PayrollSettings {
    fn default() -> Self {
        Self {
            recalculation_policy: RecalculationPolicy::default(),
            approve_policy: ApprovePolicy::default(),
            batch_concurrency: 4,
            attendance_timeout: Duration::from_secs(5),
            attendance_retries: 1,
        }
    }
}

/// Entry point for every payroll operation. Holds the collaborators and the
/// policies; carries no mutable state of its own.
pub struct PayrollService {
    attendance: Arc<dyn AttendanceAggregator>,
    employees: Arc<dyn EmployeeDirectory>,
    configs: Arc<dyn ConfigStore>,
    payrolls: Arc<dyn PayrollStore>,
    settings: PayrollSettings,
}

impl PayrollService {
    pub fn new(
        attendance: Arc<dyn AttendanceAggregator>,
        employees: Arc<dyn EmployeeDirectory>,
        configs: Arc<dyn ConfigStore>,
        payrolls: Arc<dyn PayrollStore>,
        settings: PayrollSettings,
    ) -> Self {
        Self {
            attendance,
            employees,
            configs,
            payrolls,
            settings,
        }
    }

    pub fn compute_tax(&self, taxable_income: Decimal) -> Decimal {
        tax::compute_tax(taxable_income)
    }

    pub async fn resolve_config(&self, lookup: ConfigLookup) -> PayrollResult<PayrollConfig> {
        resolver::resolve(self.configs.as_ref(), lookup).await
    }

    /// Attendance count with a timeout per attempt and bounded retries.
    /// Every failure surfaces as `AttendanceLookup`.
    async fn count_working_days(&self, employee_id: u64, period: PayPeriod) -> PayrollResult<u32> {
        let mut attempt = 0;
        loop {
            let lookup = self.attendance.count_working_days(employee_id, period);
            let reason = match timeout(self.settings.attendance_timeout, lookup).await {
                Ok(Ok(days)) => return Ok(days),
                Ok(Err(PayrollError::AttendanceLookup { reason, .. })) => reason,
                Ok(Err(other)) => other.to_string(),
                Err(_) => format!(
                    "timed out after {} ms",
                    self.settings.attendance_timeout.as_millis()
                ),
            };

            if attempt >= self.settings.attendance_retries {
                return Err(PayrollError::AttendanceLookup {
                    employee_id,
                    reason,
                });
            }
            attempt += 1;
            warn!(employee_id, %period, attempt, reason = %reason, "Retrying attendance lookup");
        }
    }

    /// Attendance lookup followed by the pure calculation. Nothing is persisted.
    pub async fn calculate(
        &self,
        employee: &Employee,
        period: PayPeriod,
        config: &PayrollConfig,
    ) -> PayrollResult<NewPayroll> {
        period.validate()?;
        calculator::validate_config(config)?;
        let actual_working_days = self.count_working_days(employee.id, period).await?;
        calculator::calculate(employee, period, actual_working_days, config, Utc::now())
    }

    /// Generate Draft payrolls for a month.
    ///
    /// Only a missing active config (or an invalid period) fails the whole
    /// call; every per-employee problem ends up in `BatchResult::errors`.
    pub async fn generate(
        &self,
        request: GeneratePayroll,
        cancel: &CancelToken,
    ) -> PayrollResult<BatchResult> {
        let period = PayPeriod::new(request.year, request.month)?;
        let config = self.resolve_config(ConfigLookup::Active).await?;
        let run_id = Uuid::new_v4();

        let (targets, rejected) = self.select_targets(request.employee_ids.as_deref()).await?;
        let mut result = BatchResult::new(
            run_id,
            period.year,
            period.month,
            targets.len() + rejected.len(),
        );

        info!(
            %run_id,
            %period,
            config_id = config.id,
            targets = targets.len(),
            rejected = rejected.len(),
            "Payroll generation started"
        );

        for error in rejected {
            result.reject(error);
        }

        let gate = cancel.clone();
        let mut outcomes = stream::iter(targets)
            .take_while(move |_| future::ready(!gate.is_cancelled()))
            .map(|employee| self.generate_one(employee, period, &config))
            .buffer_unordered(self.settings.batch_concurrency.max(1));

        while let Some(outcome) = outcomes.next().await {
            result.record(outcome);
        }

        let result = result.finish(cancel.is_cancelled());
        info!(
            %run_id,
            %period,
            total = result.total,
            succeeded = result.succeeded,
            failed = result.failed,
            not_processed = result.not_processed,
            cancelled = result.cancelled,
            "Payroll generation finished"
        );
        Ok(result)
    }

    /// Explicit ids are de-duplicated in request order; missing or inactive
    /// ones are reported instead of silently dropped.
    async fn select_targets(
        &self,
        employee_ids: Option<&[u64]>,
    ) -> PayrollResult<(Vec<Employee>, Vec<BatchError>)> {
        let ids = match employee_ids {
            Some(ids) if !ids.is_empty() => ids,
            _ => return Ok((self.employees.get_active_employees().await?, Vec::new())),
        };

        let mut seen = HashSet::new();
        let mut targets = Vec::new();
        let mut rejected = Vec::new();
        for &id in ids {
            if !seen.insert(id) {
                continue;
            }
            match self.employees.get_employee(id).await {
                Ok(Some(employee)) if employee.is_active => targets.push(employee),
                Ok(Some(employee)) => rejected.push(BatchError::new(
                    id,
                    Some(employee.display_name()),
                    &PayrollError::InactiveEmployee(id),
                )),
                Ok(None) => rejected.push(BatchError::new(
                    id,
                    None,
                    &PayrollError::EmployeeNotFound(id),
                )),
                Err(e) => rejected.push(BatchError::new(id, None, &e)),
            }
        }
        Ok((targets, rejected))
    }

    async fn generate_one(
        &self,
        employee: Employee,
        period: PayPeriod,
        config: &PayrollConfig,
    ) -> EmployeeOutcome {
        match self.try_generate_one(&employee, period, config).await {
            Ok(payroll) => {
                debug!(employee_id = employee.id, payroll_id = payroll.id, %period, "Payroll created");
                EmployeeOutcome::Created {
                    payroll_id: payroll.id,
                }
            }
            Err(e) => {
                warn!(employee_id = employee.id, %period, kind = e.kind(), error = %e, "Payroll generation failed for employee");
                EmployeeOutcome::Failed(BatchError::new(employee.id, Some(employee.display_name()), &e))
            }
        }
    }

    async fn try_generate_one(
        &self,
        employee: &Employee,
        period: PayPeriod,
        config: &PayrollConfig,
    ) -> PayrollResult<Payroll> {
        // fast path only; the store's unique index is what actually guards
        if self.payrolls.exists(employee.id, period).await? {
            return Err(PayrollError::DuplicatePayroll {
                employee_id: employee.id,
                year: period.year,
                month: period.month,
            });
        }
        let record = self.calculate(employee, period, config).await?;
        self.payrolls.insert(record).await
    }

    /// Re-run the calculator for a Draft or Approved payroll and move it back to Draft.
    pub async fn recalculate(&self, payroll_id: u64) -> PayrollResult<Payroll> {
        let current = self.get(payroll_id).await?;
        lifecycle::transition(
            payroll_id,
            current.status,
            LifecycleAction::Recalculate,
            self.settings.approve_policy,
        )?;

        let period = current.period();
        let lookup = match self.settings.recalculation_policy {
            RecalculationPolicy::ActiveConfig => ConfigLookup::Active,
            RecalculationPolicy::PeriodConfig => {
                let last_day = period.last_day().ok_or(PayrollError::InvalidPeriod {
                    year: period.year,
                    month: period.month,
                })?;
                ConfigLookup::AsOf(last_day)
            }
        };
        let config = self.resolve_config(lookup).await?;

        let employee = self
            .employees
            .get_employee(current.employee_id)
            .await?
            .ok_or(PayrollError::EmployeeNotFound(current.employee_id))?;

        let record = self.calculate(&employee, period, &config).await?;
        let written = self
            .payrolls
            .update_computed(payroll_id, &record, Utc::now())
            .await?;
        let updated = self.written(payroll_id, written, LifecycleAction::Recalculate).await?;

        info!(payroll_id, config_id = config.id, %period, "Payroll recalculated");
        Ok(updated)
    }

    pub async fn approve(&self, payroll_id: u64) -> PayrollResult<Payroll> {
        let payroll = self.get(payroll_id).await?;
        match lifecycle::transition(
            payroll_id,
            payroll.status,
            LifecycleAction::Approve,
            self.settings.approve_policy,
        )? {
            Transition::NoOp => {
                debug!(payroll_id, "Payroll already approved");
                Ok(payroll)
            }
            Transition::To(status) => {
                let written = self
                    .payrolls
                    .set_status(payroll_id, payroll.status, status, Utc::now())
                    .await?;
                let approved = self.written(payroll_id, written, LifecycleAction::Approve).await?;
                info!(payroll_id, "Payroll approved");
                Ok(approved)
            }
        }
    }

    /// Soft delete: sets `deleted_at`; the row stays for audit.
    pub async fn delete(&self, payroll_id: u64) -> PayrollResult<()> {
        let payroll = self.get(payroll_id).await?;
        lifecycle::transition(
            payroll_id,
            payroll.status,
            LifecycleAction::Delete,
            self.settings.approve_policy,
        )?;

        if !self.payrolls.soft_delete(payroll_id, Utc::now()).await? {
            return Err(self.refused(payroll_id, LifecycleAction::Delete).await);
        }
        info!(payroll_id, "Payroll deleted");
        Ok(())
    }

    /// Manual KPI bonus and allowance edits. Computed fields are not touched.
    pub async fn adjust(
        &self,
        payroll_id: u64,
        adjustment: PayrollAdjustment,
    ) -> PayrollResult<Payroll> {
        if adjustment.is_empty() {
            return Err(PayrollError::Validation("No fields provided for update".into()));
        }
        if adjustment.has_negative() {
            return Err(PayrollError::Validation(
                "Bonus and allowance amounts cannot be negative".into(),
            ));
        }

        let payroll = self.get(payroll_id).await?;
        lifecycle::transition(
            payroll_id,
            payroll.status,
            LifecycleAction::Adjust,
            self.settings.approve_policy,
        )?;
        let written = self
            .payrolls
            .update_adjustments(payroll_id, &adjustment, Utc::now())
            .await?;
        self.written(payroll_id, written, LifecycleAction::Adjust).await
    }

    /// Each lifecycle write touches only its own columns, so the stored row
    /// is re-read to pick up concurrent writes to the others.
    async fn written(
        &self,
        payroll_id: u64,
        written: bool,
        action: LifecycleAction,
    ) -> PayrollResult<Payroll> {
        if !written {
            return Err(self.refused(payroll_id, action).await);
        }
        self.get(payroll_id).await
    }

    /// A refused write means the row was paid, deleted or moved on since it was read.
    async fn refused(&self, payroll_id: u64, action: LifecycleAction) -> PayrollError {
        match self.payrolls.get(payroll_id).await {
            Ok(Some(stored)) => PayrollError::InvalidState {
                payroll_id,
                status: stored.status,
                action: action.verb(),
            },
            Ok(None) => PayrollError::PayrollNotFound(payroll_id),
            Err(e) => e,
        }
    }

    pub async fn get(&self, payroll_id: u64) -> PayrollResult<Payroll> {
        self.payrolls
            .get(payroll_id)
            .await?
            .ok_or(PayrollError::PayrollNotFound(payroll_id))
    }

    pub async fn get_by_employee_and_period(
        &self,
        employee_id: u64,
        year: i32,
        month: u32,
    ) -> PayrollResult<Option<Payroll>> {
        let period = PayPeriod::new(year, month)?;
        self.payrolls
            .find_by_employee_and_period(employee_id, period)
            .await
    }

    pub async fn list_by_period(&self, year: i32, month: u32) -> PayrollResult<Vec<Payroll>> {
        let period = PayPeriod::new(year, month)?;
        self.payrolls.list_by_period(period).await
    }

    pub async fn list_by_employee(&self, employee_id: u64) -> PayrollResult<Vec<Payroll>> {
        self.payrolls.list_by_employee(employee_id).await
    }

    pub async fn list_by_status(&self, status: PayrollStatus) -> PayrollResult<Vec<Payroll>> {
        self.payrolls.list_by_status(status).await
    }

    pub async fn active_config(&self) -> PayrollResult<PayrollConfig> {
        self.resolve_config(ConfigLookup::Active).await
    }

    pub async fn config_as_of(&self, date: NaiveDate) -> PayrollResult<PayrollConfig> {
        self.resolve_config(ConfigLookup::AsOf(date)).await
    }

    pub async fn list_configs(&self) -> PayrollResult<Vec<PayrollConfig>> {
        self.configs.list().await
    }

    /// Configs are append-only; a new one supersedes older ones by `effective_from`.
    pub async fn create_config(&self, new: NewPayrollConfig) -> PayrollResult<PayrollConfig> {
        if let Some(to) = new.effective_to {
            if to < new.effective_from {
                return Err(PayrollError::Validation(
                    "effective_to cannot be before effective_from".into(),
                ));
            }
        }
        calculator::validate_config(&new.clone().into_config(0))?;

        let config = self.configs.insert(new).await?;
        info!(
            config_id = config.id,
            effective_from = %config.effective_from,
            is_active = config.is_active,
            "Payroll config created"
        );
        Ok(config)
    }
}
