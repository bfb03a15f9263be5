use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::payroll::error::PayrollError;

/// Cooperative cancellation for a generation batch. Cancelling stops new
/// employees from being scheduled; work already started runs to completion.
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    cancelled: Arc<AtomicBool>,
}

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::Release);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Acquire)
    }
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct GeneratePayroll {
    #[schema(example = 2026)]
    pub year: i32,
    #[schema(example = 1)]
    pub month: u32,
    /// `null` or empty means every active employee.
    #[schema(example = json!([1001, 1002]))]
    pub employee_ids: Option<Vec<u64>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct BatchError {
    pub employee_id: u64,
    pub employee_name: Option<String>,
    #[schema(example = "duplicate_payroll")]
    pub kind: String,
    pub message: String,
}

impl BatchError {
    pub fn new(employee_id: u64, employee_name: Option<String>, error: &PayrollError) -> Self {
        Self {
            employee_id,
            employee_name,
            kind: error.kind().to_string(),
            message: error.to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[schema(example = json!({
    "run_id": "6f1c2b4e-7d0a-4c55-9a52-3d8f0e1b2a77",
    "year": 2026,
    "month": 1,
    "total": 3,
    "succeeded": 2,
    "failed": 1,
    "not_processed": 0,
    "cancelled": false,
    "created_ids": [11, 12],
    "errors": [{
        "employee_id": 1002,
        "employee_name": "John Doe (EMP-002)",
        "kind": "duplicate_payroll",
        "message": "Payroll already exists for employee 1002 (2026-01)"
    }]
}))]
pub struct BatchResult {
    #[schema(value_type = String)]
    pub run_id: Uuid,
    pub year: i32,
    pub month: u32,
    pub total: usize,
    pub succeeded: usize,
    pub failed: usize,
    /// Employees never scheduled because the batch was cancelled.
    pub not_processed: usize,
    pub cancelled: bool,
    pub created_ids: Vec<u64>,
    pub errors: Vec<BatchError>,
}

/// Result of one employee's unit of work.
#[derive(Debug)]
pub enum EmployeeOutcome {
    Created { payroll_id: u64 },
    Failed(BatchError),
}

impl BatchResult {
    pub fn new(run_id: Uuid, year: i32, month: u32, total: usize) -> Self {
        Self {
            run_id,
            year,
            month,
            total,
            succeeded: 0,
            failed: 0,
            not_processed: total,
            cancelled: false,
            created_ids: Vec::new(),
            errors: Vec::new(),
        }
    }

    pub fn record(&mut self, outcome: EmployeeOutcome) {
        self.not_processed = self.not_processed.saturating_sub(1);
        match outcome {
            EmployeeOutcome::Created { payroll_id } => {
                self.succeeded += 1;
                self.created_ids.push(payroll_id);
            }
            EmployeeOutcome::Failed(error) => {
                self.failed += 1;
                self.errors.push(error);
            }
        }
    }

    /// Errors for employees rejected before scheduling (missing or inactive).
    pub fn reject(&mut self, error: BatchError) {
        self.record(EmployeeOutcome::Failed(error));
    }

    /// Sort outputs so concurrent completion order doesn't leak into results.
    pub fn finish(mut self, cancelled: bool) -> Self {
        self.cancelled = cancelled && self.not_processed > 0;
        self.created_ids.sort_unstable();
        self.errors.sort_by_key(|e| e.employee_id);
        self
    }
}
