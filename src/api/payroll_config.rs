use actix_web::{HttpResponse, Responder, web};
use chrono::NaiveDate;

use crate::auth::auth::AuthUser;
use crate::model::payroll_config::{NewPayrollConfig, PayrollConfig};
use crate::payroll::PayrollService;

/// Create a payroll configuration
#[utoipa::path(
    post,
    path = "/api/payroll/config",
    request_body = NewPayrollConfig,
    responses(
        (status = 201, description = "Payroll configuration created", body = PayrollConfig),
        (status = 400, description = "Invalid configuration"),
        (status = 401),
        (status = 403)
    ),
    security(("bearer_auth" = [])),
    tag = "Payroll Config"
)]
pub async fn create_config(
    auth: AuthUser,
    service: web::Data<PayrollService>,
    payload: web::Json<NewPayrollConfig>,
) -> actix_web::Result<impl Responder> {
    auth.require_hr_or_admin()?;

    let config = service.create_config(payload.into_inner()).await?;
    Ok(HttpResponse::Created().json(config))
}

#[utoipa::path(
    get,
    path = "/api/payroll/config",
    responses(
        (status = 200, body = Vec<PayrollConfig>)
    ),
    security(("bearer_auth" = [])),
    tag = "Payroll Config"
)]
pub async fn list_configs(
    auth: AuthUser,
    service: web::Data<PayrollService>,
) -> actix_web::Result<impl Responder> {
    auth.require_hr_or_admin()?;

    Ok(HttpResponse::Ok().json(service.list_configs().await?))
}

#[utoipa::path(
    get,
    path = "/api/payroll/config/active",
    responses(
        (status = 200, body = PayrollConfig),
        (status = 400, description = "No active payroll configuration")
    ),
    security(("bearer_auth" = [])),
    tag = "Payroll Config"
)]
pub async fn active_config(
    auth: AuthUser,
    service: web::Data<PayrollService>,
) -> actix_web::Result<impl Responder> {
    auth.require_hr_or_admin()?;

    Ok(HttpResponse::Ok().json(service.active_config().await?))
}

#[utoipa::path(
    get,
    path = "/api/payroll/config/as-of/{date}",
    params(
        ("date" = String, Path, description = "Date in YYYY-MM-DD format")
    ),
    responses(
        (status = 200, body = PayrollConfig),
        (status = 400, description = "No configuration effective on that date")
    ),
    security(("bearer_auth" = [])),
    tag = "Payroll Config"
)]
pub async fn config_as_of(
    auth: AuthUser,
    service: web::Data<PayrollService>,
    path: web::Path<NaiveDate>,
) -> actix_web::Result<impl Responder> {
    auth.require_hr_or_admin()?;

    Ok(HttpResponse::Ok().json(service.config_as_of(path.into_inner()).await?))
}
