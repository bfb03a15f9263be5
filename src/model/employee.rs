use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Employee as seen by the payroll engine (read-only).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[schema(
    example = json!({
        "id": 1,
        "employee_code": "EMP-001",
        "first_name": "John",
        "last_name": "Doe",
        "base_salary": "15000000.00",
        "is_active": true
    })
)]
pub struct Employee {
    #[schema(example = 1)]
    pub id: u64,

    #[schema(example = "EMP-001")]
    pub employee_code: String,

    #[schema(example = "John")]
    pub first_name: String,

    #[schema(example = "Doe")]
    pub last_name: String,

    #[schema(value_type = String, example = "15000000.00")]
    pub base_salary: Decimal,

    pub is_active: bool,
}

impl Employee {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
            .trim()
            .to_string()
    }

    /// `"John Doe (EMP-001)"`, used in batch error reports.
    pub fn display_name(&self) -> String {
        format!("{} ({})", self.full_name(), self.employee_code)
    }
}

/// Row shape of the `employees` table; `status = 'active'` marks eligibility.
#[derive(Debug, sqlx::FromRow)]
pub struct EmployeeRow {
    pub id: u64,
    pub employee_code: String,
    pub first_name: String,
    pub last_name: String,
    pub base_salary: Decimal,
    pub status: String,
}

impl From<EmployeeRow> for Employee {
    fn from(row: EmployeeRow) -> Self {
        Self {
            is_active: row.status.eq_ignore_ascii_case("active"),
            id: row.id,
            employee_code: row.employee_code,
            first_name: row.first_name,
            last_name: row.last_name,
            base_salary: row.base_salary,
        }
    }
}
