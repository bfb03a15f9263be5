use crate::auth::auth::AuthUser;
use crate::auth::jwt::verify_token;
use crate::config::Config;
use crate::model::role::Role;
use actix_web::middleware::Next;
use actix_web::{
    Error, HttpMessage, HttpResponse,
    body::BoxBody,
    dev::{ServiceRequest, ServiceResponse},
    web::Data,
};
use serde_json::json;

fn unauthorized(req: ServiceRequest, body: serde_json::Value) -> ServiceResponse<BoxBody> {
    let resp = HttpResponse::Unauthorized().json(body);
    req.into_response(resp.map_into_boxed_body())
}

pub async fn auth_middleware(
    req: ServiceRequest,
    next: Next<BoxBody>,
) -> Result<ServiceResponse<BoxBody>, Error> {
    let config = req
        .app_data::<Data<Config>>()
        .cloned()
        .ok_or_else(|| actix_web::error::ErrorInternalServerError("App config missing"))?;

    let header_value = match req.headers().get("Authorization") {
        Some(h) => h
            .to_str()
            .map_err(|_| {
                actix_web::error::ErrorUnauthorized(
                    json!({"error": "Invalid Authorization header encoding"}),
                )
            })?
            .to_string(),
        None => {
            return Ok(unauthorized(req, json!({"error": "Missing Authorization header"})));
        }
    };

    let token = match header_value.strip_prefix("Bearer ") {
        Some(t) => t,
        None => {
            return Ok(unauthorized(
                req,
                json!({"error": "Authorization header must start with Bearer"}),
            ));
        }
    };

    let claims = match verify_token(token, &config.jwt_secret) {
        Ok(c) => c,
        Err(e) => {
            return Ok(unauthorized(
                req,
                json!({"error": "Invalid or expired token", "details": e}),
            ));
        }
    };

    let role = match Role::from_id(claims.role) {
        Some(role) => role,
        None => return Ok(unauthorized(req, json!({"error": "Invalid role"}))),
    };

    let auth_user = AuthUser {
        user_id: claims.user_id,
        username: claims.sub,
        role,
        employee_id: claims.employee_id,
    };

    req.extensions_mut().insert(auth_user);

    next.call(req).await
}
