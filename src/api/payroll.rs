use actix_web::{HttpResponse, Responder, web};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::str::FromStr;
use utoipa::ToSchema;

use crate::auth::auth::AuthUser;
use crate::model::payroll::{Payroll, PayrollAdjustment, PayrollStatus};
use crate::payroll::{BatchResult, CancelToken, GeneratePayroll, PayrollError, PayrollService};

#[derive(Deserialize, ToSchema)]
pub struct ComputeTax {
    #[schema(value_type = String, example = "15000000")]
    pub taxable_income: Decimal,
}

#[derive(Serialize, ToSchema)]
pub struct TaxResponse {
    #[schema(value_type = String, example = "15000000")]
    pub taxable_income: Decimal,
    #[schema(value_type = String, example = "1500000")]
    pub personal_income_tax: Decimal,
}

#[derive(Serialize, ToSchema)]
pub struct PayrollListResponse {
    pub data: Vec<Payroll>,
    #[schema(example = 1)]
    pub total: usize,
}

impl From<Vec<Payroll>> for PayrollListResponse {
    fn from(data: Vec<Payroll>) -> Self {
        Self {
            total: data.len(),
            data,
        }
    }
}

/// Generate draft payrolls for a month
#[utoipa::path(
    post,
    path = "/api/payroll/generate",
    request_body = GeneratePayroll,
    responses(
        (status = 200, description = "Generation finished; per-employee failures are listed in errors", body = BatchResult),
        (status = 400, description = "Invalid period or no active payroll configuration", body = Object, example = json!({
            "message": "No applicable payroll configuration found",
            "kind": "config_not_found"
        })),
        (status = 401),
        (status = 403)
    ),
    security(("bearer_auth" = [])),
    tag = "Payroll"
)]
pub async fn generate_payroll(
    auth: AuthUser,
    service: web::Data<PayrollService>,
    payload: web::Json<GeneratePayroll>,
) -> actix_web::Result<impl Responder> {
    auth.require_hr_or_admin()?;

    tracing::info!(user_id = auth.user_id, "Payroll generation requested");
    let result = service
        .generate(payload.into_inner(), &CancelToken::new())
        .await?;

    Ok(HttpResponse::Ok().json(result))
}

/// Recalculate a Draft or Approved payroll
#[utoipa::path(
    post,
    path = "/api/payroll/{payroll_id}/recalculate",
    params(
        ("payroll_id" = u64, Path, description = "Payroll ID")
    ),
    responses(
        (status = 200, description = "Payroll recalculated", body = Payroll),
        (status = 404, description = "Payroll not found"),
        (status = 409, description = "Payroll is already paid")
    ),
    security(("bearer_auth" = [])),
    tag = "Payroll"
)]
pub async fn recalculate_payroll(
    auth: AuthUser,
    service: web::Data<PayrollService>,
    path: web::Path<u64>,
) -> actix_web::Result<impl Responder> {
    auth.require_hr_or_admin()?;

    let payroll = service.recalculate(path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(payroll))
}

/// Approve a payroll
#[utoipa::path(
    post,
    path = "/api/payroll/{payroll_id}/approve",
    params(
        ("payroll_id" = u64, Path, description = "Payroll ID")
    ),
    responses(
        (status = 200, description = "Payroll approved", body = Object, example = json!({
            "message": "Payroll approved successfully",
            "status": "Approved"
        })),
        (status = 404, description = "Payroll not found"),
        (status = 409, description = "Payroll is already paid")
    ),
    security(("bearer_auth" = [])),
    tag = "Payroll"
)]
pub async fn approve_payroll(
    auth: AuthUser,
    service: web::Data<PayrollService>,
    path: web::Path<u64>,
) -> actix_web::Result<impl Responder> {
    auth.require_hr_or_admin()?;

    let payroll = service.approve(path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(json!({
        "message": "Payroll approved successfully",
        "status": payroll.status
    })))
}

/// Soft delete a payroll
#[utoipa::path(
    delete,
    path = "/api/payroll/{payroll_id}",
    params(
        ("payroll_id" = u64, Path, description = "Payroll ID")
    ),
    responses(
        (status = 200, description = "Payroll deleted", body = Object, example = json!({
            "message": "Payroll deleted successfully"
        })),
        (status = 404, description = "Payroll not found"),
        (status = 409, description = "Cannot delete paid payroll")
    ),
    security(("bearer_auth" = [])),
    tag = "Payroll"
)]
pub async fn delete_payroll(
    auth: AuthUser,
    service: web::Data<PayrollService>,
    path: web::Path<u64>,
) -> actix_web::Result<impl Responder> {
    auth.require_hr_or_admin()?;

    service.delete(path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(json!({
        "message": "Payroll deleted successfully"
    })))
}

/// Set KPI bonus and allowances
#[utoipa::path(
    put,
    path = "/api/payroll/{payroll_id}/adjustments",
    request_body = PayrollAdjustment,
    params(
        ("payroll_id" = u64, Path, description = "Payroll ID")
    ),
    responses(
        (status = 200, description = "Payroll updated", body = Payroll),
        (status = 400, description = "Empty or negative adjustment"),
        (status = 404, description = "Payroll not found"),
        (status = 409, description = "Payroll is already paid")
    ),
    security(("bearer_auth" = [])),
    tag = "Payroll"
)]
pub async fn adjust_payroll(
    auth: AuthUser,
    service: web::Data<PayrollService>,
    path: web::Path<u64>,
    body: web::Json<PayrollAdjustment>,
) -> actix_web::Result<impl Responder> {
    auth.require_hr_or_admin()?;

    let payroll = service
        .adjust(path.into_inner(), body.into_inner())
        .await?;
    Ok(HttpResponse::Ok().json(payroll))
}

/// Compute personal income tax for a taxable income
#[utoipa::path(
    post,
    path = "/api/payroll/tax",
    request_body = ComputeTax,
    responses(
        (status = 200, body = TaxResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Payroll"
)]
pub async fn compute_tax(
    service: web::Data<PayrollService>,
    payload: web::Json<ComputeTax>,
) -> impl Responder {
    let taxable_income = payload.taxable_income;
    HttpResponse::Ok().json(TaxResponse {
        taxable_income,
        personal_income_tax: service.compute_tax(taxable_income),
    })
}

#[utoipa::path(
    get,
    path = "/api/payroll/{payroll_id}",
    params(
        ("payroll_id" = u64, Path, description = "Payroll ID")
    ),
    responses(
        (status = 200, body = Payroll),
        (status = 404)
    ),
    security(("bearer_auth" = [])),
    tag = "Payroll"
)]
pub async fn get_payroll(
    auth: AuthUser,
    service: web::Data<PayrollService>,
    path: web::Path<u64>,
) -> actix_web::Result<impl Responder> {
    let payroll = service.get(path.into_inner()).await?;
    auth.require_self_or_hr(payroll.employee_id)?;

    Ok(HttpResponse::Ok().json(payroll))
}

#[utoipa::path(
    get,
    path = "/api/payroll/month/{year}/{month}",
    params(
        ("year" = i32, Path, description = "Payroll year"),
        ("month" = u32, Path, description = "Payroll month (1-12)")
    ),
    responses(
        (status = 200, body = PayrollListResponse),
        (status = 400, description = "Invalid period")
    ),
    security(("bearer_auth" = [])),
    tag = "Payroll"
)]
pub async fn list_by_month(
    auth: AuthUser,
    service: web::Data<PayrollService>,
    path: web::Path<(i32, u32)>,
) -> actix_web::Result<impl Responder> {
    auth.require_hr_or_admin()?;

    let (year, month) = path.into_inner();
    let data = service.list_by_period(year, month).await?;
    Ok(HttpResponse::Ok().json(PayrollListResponse::from(data)))
}

#[utoipa::path(
    get,
    path = "/api/payroll/employee/{employee_id}",
    params(
        ("employee_id" = u64, Path, description = "Employee ID")
    ),
    responses(
        (status = 200, body = PayrollListResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Payroll"
)]
pub async fn list_by_employee(
    auth: AuthUser,
    service: web::Data<PayrollService>,
    path: web::Path<u64>,
) -> actix_web::Result<impl Responder> {
    let employee_id = path.into_inner();
    auth.require_self_or_hr(employee_id)?;

    let data = service.list_by_employee(employee_id).await?;
    Ok(HttpResponse::Ok().json(PayrollListResponse::from(data)))
}

#[utoipa::path(
    get,
    path = "/api/payroll/employee/{employee_id}/month/{year}/{month}",
    params(
        ("employee_id" = u64, Path, description = "Employee ID"),
        ("year" = i32, Path, description = "Payroll year"),
        ("month" = u32, Path, description = "Payroll month (1-12)")
    ),
    responses(
        (status = 200, body = Payroll),
        (status = 404, description = "Payroll not found")
    ),
    security(("bearer_auth" = [])),
    tag = "Payroll"
)]
pub async fn get_by_employee_and_month(
    auth: AuthUser,
    service: web::Data<PayrollService>,
    path: web::Path<(u64, i32, u32)>,
) -> actix_web::Result<impl Responder> {
    let (employee_id, year, month) = path.into_inner();
    auth.require_self_or_hr(employee_id)?;

    match service
        .get_by_employee_and_period(employee_id, year, month)
        .await?
    {
        Some(p) => Ok(HttpResponse::Ok().json(p)),
        None => Ok(HttpResponse::NotFound().json(json!({
            "message": "Payroll not found"
        }))),
    }
}

#[utoipa::path(
    get,
    path = "/api/payroll/status/{status}",
    params(
        ("status" = String, Path, description = "Draft, Approved or Paid")
    ),
    responses(
        (status = 200, body = PayrollListResponse),
        (status = 400, description = "Unknown status")
    ),
    security(("bearer_auth" = [])),
    tag = "Payroll"
)]
pub async fn list_by_status(
    auth: AuthUser,
    service: web::Data<PayrollService>,
    path: web::Path<String>,
) -> actix_web::Result<impl Responder> {
    auth.require_hr_or_admin()?;

    let raw = path.into_inner();
    let status = PayrollStatus::from_str(&raw)
        .map_err(|_| PayrollError::Validation(format!("Unknown payroll status `{raw}`")))?;

    let data = service.list_by_status(status).await?;
    Ok(HttpResponse::Ok().json(PayrollListResponse::from(data)))
}
