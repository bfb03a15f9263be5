//! In-memory collaborators for exercising `PayrollService` without MySQL.

#![allow(dead_code)]

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;

use hrm_payroll::model::employee::Employee;
use hrm_payroll::model::payroll::{NewPayroll, Payroll, PayrollAdjustment, PayrollStatus};
use hrm_payroll::model::payroll_config::{NewPayrollConfig, PayrollConfig};
use hrm_payroll::payroll::resolver;
use hrm_payroll::payroll::store::{AttendanceAggregator, ConfigStore, EmployeeDirectory, PayrollStore};
use hrm_payroll::payroll::{ConfigLookup, PayPeriod, PayrollError, PayrollResult, PayrollService, PayrollSettings};

pub fn employee(id: u64, base_salary: Decimal) -> Employee {
    Employee {
        id,
        employee_code: format!("EMP-{id:03}"),
        first_name: "Test".into(),
        last_name: format!("Employee{id}"),
        base_salary,
        is_active: true,
    }
}

pub fn inactive(id: u64, base_salary: Decimal) -> Employee {
    Employee {
        is_active: false,
        ..employee(id, base_salary)
    }
}

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).expect("valid date")
}

// ---------------------------------------------------------------------------

/// Working days per employee; unknown employees default to `default_days`.
pub struct MemoryAttendance {
    days: HashMap<u64, u32>,
    default_days: u32,
    failing: HashSet<u64>,
    delay: Option<Duration>,
    calls: AtomicUsize,
}

impl MemoryAttendance {
    pub fn uniform(days: u32) -> Self {
        Self {
            days: HashMap::new(),
            default_days: days,
            failing: HashSet::new(),
            delay: None,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn with_days(mut self, employee_id: u64, days: u32) -> Self {
        self.days.insert(employee_id, days);
        self
    }

    pub fn failing_for(mut self, employee_id: u64) -> Self {
        self.failing.insert(employee_id);
        self
    }

    pub fn slow(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl AttendanceAggregator for MemoryAttendance {
    async fn count_working_days(&self, employee_id: u64, _period: PayPeriod) -> PayrollResult<u32> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(delay) = self.delay {
            actix_web::rt::time::sleep(delay).await;
        }
        if self.failing.contains(&employee_id) {
            return Err(PayrollError::AttendanceLookup {
                employee_id,
                reason: "attendance service unavailable".into(),
            });
        }
        Ok(self.days.get(&employee_id).copied().unwrap_or(self.default_days))
    }
}

// ---------------------------------------------------------------------------

pub struct MemoryEmployees {
    employees: Vec<Employee>,
}

impl MemoryEmployees {
    pub fn new(employees: Vec<Employee>) -> Self {
        Self { employees }
    }
}

#[async_trait]
impl EmployeeDirectory for MemoryEmployees {
    async fn get_active_employees(&self) -> PayrollResult<Vec<Employee>> {
        Ok(self.employees.iter().filter(|e| e.is_active).cloned().collect())
    }

    async fn get_employee(&self, id: u64) -> PayrollResult<Option<Employee>> {
        Ok(self.employees.iter().find(|e| e.id == id).cloned())
    }
}

// ---------------------------------------------------------------------------

#[derive(Default)]
pub struct MemoryConfigs {
    configs: Mutex<Vec<PayrollConfig>>,
}

impl MemoryConfigs {
    pub fn with(configs: Vec<NewPayrollConfig>) -> Self {
        let configs = configs
            .into_iter()
            .enumerate()
            .map(|(i, c)| c.into_config(i as u64 + 1))
            .collect();
        Self {
            configs: Mutex::new(configs),
        }
    }
}

#[async_trait]
impl ConfigStore for MemoryConfigs {
    async fn get_active_config(&self) -> PayrollResult<Option<PayrollConfig>> {
        let configs = self.configs.lock().unwrap();
        Ok(resolver::select(&configs, ConfigLookup::Active).cloned())
    }

    async fn get_config_as_of(&self, date: NaiveDate) -> PayrollResult<Option<PayrollConfig>> {
        let configs = self.configs.lock().unwrap();
        Ok(resolver::select(&configs, ConfigLookup::AsOf(date)).cloned())
    }

    async fn insert(&self, config: NewPayrollConfig) -> PayrollResult<PayrollConfig> {
        let mut configs = self.configs.lock().unwrap();
        let stored = config.into_config(configs.len() as u64 + 1);
        configs.push(stored.clone());
        Ok(stored)
    }

    async fn list(&self) -> PayrollResult<Vec<PayrollConfig>> {
        Ok(self.configs.lock().unwrap().clone())
    }
}

// ---------------------------------------------------------------------------

/// Keeps soft-deleted rows so tests can assert on them; enforces the same
/// live-row uniqueness and Paid guard as the MySQL schema.
#[derive(Default)]
pub struct MemoryPayrolls {
    rows: Mutex<Vec<Payroll>>,
}

impl MemoryPayrolls {
    /// Insert a record directly, bypassing the engine (e.g. to seed a Paid row).
    pub fn seed(&self, new: NewPayroll, status: PayrollStatus) -> Payroll {
        let mut rows = self.rows.lock().unwrap();
        let mut payroll = Payroll::from_new(rows.len() as u64 + 1, new);
        payroll.status = status;
        rows.push(payroll.clone());
        payroll
    }

    /// Raw row, deleted or not.
    pub fn raw(&self, id: u64) -> Option<Payroll> {
        self.rows.lock().unwrap().iter().find(|p| p.id == id).cloned()
    }

    pub fn live_count(&self) -> usize {
        self.rows.lock().unwrap().iter().filter(|p| p.deleted_at.is_none()).count()
    }

    /// Simulate a payment recorded by another system.
    pub fn mark_paid(&self, id: u64) {
        let mut rows = self.rows.lock().unwrap();
        if let Some(row) = rows.iter_mut().find(|p| p.id == id) {
            row.status = PayrollStatus::Paid;
        }
    }

    /// Apply `write` to the live row `id` under the lock; the closure
    /// decides whether its guard holds.
    fn write_live(&self, id: u64, write: impl FnOnce(&mut Payroll) -> bool) -> bool {
        let mut rows = self.rows.lock().unwrap();
        match rows.iter_mut().find(|p| p.id == id && p.deleted_at.is_none()) {
            Some(row) => write(row),
            None => false,
        }
    }

    fn live(&self) -> Vec<Payroll> {
        self.rows
            .lock()
            .unwrap()
            .iter()
            .filter(|p| p.deleted_at.is_none())
            .cloned()
            .collect()
    }
}

#[async_trait]
impl PayrollStore for MemoryPayrolls {
    async fn exists(&self, employee_id: u64, period: PayPeriod) -> PayrollResult<bool> {
        Ok(self
            .live()
            .iter()
            .any(|p| p.employee_id == employee_id && p.period() == period))
    }

    async fn insert(&self, payroll: NewPayroll) -> PayrollResult<Payroll> {
        let mut rows = self.rows.lock().unwrap();
        let duplicate = rows.iter().any(|p| {
            p.deleted_at.is_none()
                && p.employee_id == payroll.employee_id
                && p.year == payroll.year
                && p.month == payroll.month
        });
        if duplicate {
            return Err(PayrollError::DuplicatePayroll {
                employee_id: payroll.employee_id,
                year: payroll.year,
                month: payroll.month,
            });
        }
        let stored = Payroll::from_new(rows.len() as u64 + 1, payroll);
        rows.push(stored.clone());
        Ok(stored)
    }

    async fn update_computed(
        &self,
        id: u64,
        computed: &NewPayroll,
        at: DateTime<Utc>,
    ) -> PayrollResult<bool> {
        Ok(self.write_live(id, |row| {
            if row.status == PayrollStatus::Paid {
                return false;
            }
            row.base_salary = computed.base_salary;
            row.standard_working_days = computed.standard_working_days;
            row.actual_working_days = computed.actual_working_days;
            row.insurance_salary = computed.insurance_salary;
            row.company_insurance = computed.company_insurance;
            row.employee_insurance = computed.employee_insurance;
            row.personal_income_tax = computed.personal_income_tax;
            row.net_salary = computed.net_salary;
            row.status = PayrollStatus::Draft;
            row.updated_at = Some(at);
            true
        }))
    }

    async fn update_adjustments(
        &self,
        id: u64,
        adjustment: &PayrollAdjustment,
        at: DateTime<Utc>,
    ) -> PayrollResult<bool> {
        Ok(self.write_live(id, |row| {
            if row.status == PayrollStatus::Paid {
                return false;
            }
            let fields = [
                (&mut row.kpi_bonus, adjustment.kpi_bonus),
                (&mut row.responsibility_allowance, adjustment.responsibility_allowance),
                (&mut row.lunch_allowance, adjustment.lunch_allowance),
                (&mut row.phone_allowance, adjustment.phone_allowance),
                (&mut row.travel_allowance, adjustment.travel_allowance),
            ];
            for (field, value) in fields {
                if let Some(value) = value {
                    *field = value;
                }
            }
            row.updated_at = Some(at);
            true
        }))
    }

    async fn set_status(
        &self,
        id: u64,
        from: PayrollStatus,
        to: PayrollStatus,
        at: DateTime<Utc>,
    ) -> PayrollResult<bool> {
        Ok(self.write_live(id, |row| {
            if row.status != from {
                return false;
            }
            row.status = to;
            row.updated_at = Some(at);
            true
        }))
    }

    async fn soft_delete(&self, id: u64, at: DateTime<Utc>) -> PayrollResult<bool> {
        Ok(self.write_live(id, |row| {
            if row.status == PayrollStatus::Paid {
                return false;
            }
            row.deleted_at = Some(at);
            row.updated_at = Some(at);
            true
        }))
    }

    async fn get(&self, id: u64) -> PayrollResult<Option<Payroll>> {
        Ok(self.live().into_iter().find(|p| p.id == id))
    }

    async fn find_by_employee_and_period(
        &self,
        employee_id: u64,
        period: PayPeriod,
    ) -> PayrollResult<Option<Payroll>> {
        Ok(self
            .live()
            .into_iter()
            .find(|p| p.employee_id == employee_id && p.period() == period))
    }

    async fn list_by_period(&self, period: PayPeriod) -> PayrollResult<Vec<Payroll>> {
        let mut rows: Vec<_> = self.live().into_iter().filter(|p| p.period() == period).collect();
        rows.sort_by_key(|p| p.employee_id);
        Ok(rows)
    }

    async fn list_by_employee(&self, employee_id: u64) -> PayrollResult<Vec<Payroll>> {
        let mut rows: Vec<_> = self
            .live()
            .into_iter()
            .filter(|p| p.employee_id == employee_id)
            .collect();
        rows.sort_by_key(|p| std::cmp::Reverse((p.year, p.month)));
        Ok(rows)
    }

    async fn list_by_status(&self, status: PayrollStatus) -> PayrollResult<Vec<Payroll>> {
        Ok(self.live().into_iter().filter(|p| p.status == status).collect())
    }
}

// ---------------------------------------------------------------------------

pub struct Harness {
    pub service: PayrollService,
    pub attendance: Arc<MemoryAttendance>,
    pub configs: Arc<MemoryConfigs>,
    pub payrolls: Arc<MemoryPayrolls>,
}

pub fn default_config() -> NewPayrollConfig {
    NewPayrollConfig::starting(date(2024, 1, 1))
}

pub fn harness(
    employees: Vec<Employee>,
    attendance: MemoryAttendance,
    configs: Vec<NewPayrollConfig>,
    settings: PayrollSettings,
) -> Harness {
    let attendance = Arc::new(attendance);
    let configs = Arc::new(MemoryConfigs::with(configs));
    let payrolls = Arc::new(MemoryPayrolls::default());
    let service = PayrollService::new(
        attendance.clone(),
        Arc::new(MemoryEmployees::new(employees)),
        configs.clone(),
        payrolls.clone(),
        settings,
    );
    Harness {
        service,
        attendance,
        configs,
        payrolls,
    }
}

/// A record shaped like calculator output, for seeding.
pub fn draft_record(employee_id: u64, year: i32, month: u32, base_salary: Decimal) -> NewPayroll {
    NewPayroll {
        employee_id,
        year,
        month,
        base_salary,
        standard_working_days: 22,
        actual_working_days: 22,
        insurance_salary: base_salary,
        company_insurance: Decimal::ZERO,
        employee_insurance: Decimal::ZERO,
        personal_income_tax: Decimal::ZERO,
        net_salary: base_salary,
        status: PayrollStatus::Draft,
        created_at: Utc::now(),
    }
}
