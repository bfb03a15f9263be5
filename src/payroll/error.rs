use actix_web::{HttpResponse, ResponseError, http::StatusCode};
use serde_json::json;
use thiserror::Error;

use crate::model::payroll::PayrollStatus;

pub type PayrollResult<T> = Result<T, PayrollError>;

#[derive(Debug, Error)]
pub enum PayrollError {
    #[error("No applicable payroll configuration found")]
    ConfigNotFound,

    #[error("Invalid payroll configuration: {0}")]
    Configuration(String),

    #[error("Payroll already exists for employee {employee_id} ({year}-{month:02})")]
    DuplicatePayroll {
        employee_id: u64,
        year: i32,
        month: u32,
    },

    #[error("Employee {0} not found")]
    EmployeeNotFound(u64),

    #[error("Employee {0} is not active")]
    InactiveEmployee(u64),

    #[error("Payroll {0} not found")]
    PayrollNotFound(u64),

    #[error("Cannot {action} payroll {payroll_id} in status {status}")]
    InvalidState {
        payroll_id: u64,
        status: PayrollStatus,
        action: &'static str,
    },

    #[error("Attendance lookup failed for employee {employee_id}: {reason}")]
    AttendanceLookup { employee_id: u64, reason: String },

    #[error("Invalid payroll period {year}-{month}")]
    InvalidPeriod { year: i32, month: u32 },

    #[error("{0}")]
    Validation(String),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl PayrollError {
    /// Stable machine-readable code, used in batch reports and JSON bodies.
    pub fn kind(&self) -> &'static str {
        match self {
            PayrollError::ConfigNotFound => "config_not_found",
            PayrollError::Configuration(_) => "configuration_error",
            PayrollError::DuplicatePayroll { .. } => "duplicate_payroll",
            PayrollError::EmployeeNotFound(_) => "employee_not_found",
            PayrollError::InactiveEmployee(_) => "inactive_employee",
            PayrollError::PayrollNotFound(_) => "payroll_not_found",
            PayrollError::InvalidState { .. } => "invalid_state",
            PayrollError::AttendanceLookup { .. } => "attendance_lookup_error",
            PayrollError::InvalidPeriod { .. } => "invalid_period",
            PayrollError::Validation(_) => "validation_error",
            PayrollError::Database(_) => "database_error",
        }
    }
}

impl ResponseError for PayrollError {
    fn status_code(&self) -> StatusCode {
        match self {
            PayrollError::EmployeeNotFound(_) | PayrollError::PayrollNotFound(_) => {
                StatusCode::NOT_FOUND
            }
            PayrollError::InvalidState { .. } | PayrollError::DuplicatePayroll { .. } => {
                StatusCode::CONFLICT
            }
            PayrollError::ConfigNotFound
            | PayrollError::Configuration(_)
            | PayrollError::InactiveEmployee(_)
            | PayrollError::InvalidPeriod { .. }
            | PayrollError::Validation(_) => StatusCode::BAD_REQUEST,
            PayrollError::AttendanceLookup { .. } => StatusCode::BAD_GATEWAY,
            PayrollError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let message = match self {
            PayrollError::Database(e) => {
                tracing::error!(error = %e, "Payroll database failure");
                "Internal Server Error".to_string()
            }
            other => other.to_string(),
        };

        HttpResponse::build(self.status_code()).json(json!({
            "message": message,
            "kind": self.kind(),
        }))
    }
}
