use crate::api::payroll::{ComputeTax, PayrollListResponse, TaxResponse};
use crate::model::payroll::{Payroll, PayrollAdjustment, PayrollStatus};
use crate::model::payroll_config::{NewPayrollConfig, PayrollConfig};
use crate::payroll::{BatchError, BatchResult, GeneratePayroll};
use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "HRM Payroll API",
        version = "1.0.0",
        description = r#"
## Payroll Calculation Engine

Turns attendance, base salary and a versioned payroll configuration into
auditable monthly payroll records.

### Key Features
- **Generation**: batch generation per month with per-employee error reporting
- **Lifecycle**: Draft, Approved and Paid, with recalculation and soft delete
- **Tax**: Vietnamese progressive personal income tax, exposed on its own
- **Configuration**: versioned insurance rates, tax deduction and working days

### Security
Every endpoint requires a **JWT Bearer** token. Generation, recalculation,
approval, deletion and configuration require the **HR** or **Admin** role;
employees may read their own payroll records.

### Response Format
JSON; currency amounts are decimal strings.
"#,
    ),
    paths(
        crate::api::payroll::generate_payroll,
        crate::api::payroll::recalculate_payroll,
        crate::api::payroll::approve_payroll,
        crate::api::payroll::delete_payroll,
        crate::api::payroll::adjust_payroll,
        crate::api::payroll::compute_tax,
        crate::api::payroll::get_payroll,
        crate::api::payroll::list_by_month,
        crate::api::payroll::list_by_employee,
        crate::api::payroll::get_by_employee_and_month,
        crate::api::payroll::list_by_status,

        crate::api::payroll_config::create_config,
        crate::api::payroll_config::list_configs,
        crate::api::payroll_config::active_config,
        crate::api::payroll_config::config_as_of
    ),
    components(
        schemas(
            Payroll,
            PayrollStatus,
            PayrollAdjustment,
            PayrollListResponse,
            GeneratePayroll,
            BatchResult,
            BatchError,
            ComputeTax,
            TaxResponse,
            PayrollConfig,
            NewPayrollConfig
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Payroll", description = "Payroll generation, lifecycle and tax APIs"),
        (name = "Payroll Config", description = "Payroll configuration APIs"),
    )
)]
pub struct ApiDoc;

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "bearer_auth",
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .bearer_format("JWT")
                    .build(),
            ),
        );
    }
}
