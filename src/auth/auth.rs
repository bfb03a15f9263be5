use crate::model::role::Role;
use actix_web::{FromRequest, HttpMessage, HttpRequest, dev::Payload, error::ErrorUnauthorized};
use futures::future::{Ready, ready};

#[derive(Debug, Clone)]
pub struct AuthUser {
    pub user_id: u64,
    pub username: String,
    pub role: Role,

    /// Present only if this user is linked to an employee record
    pub employee_id: Option<u64>,
}

impl FromRequest for AuthUser {
    type Error = actix_web::Error;
    type Future = Ready<Result<Self, Self::Error>>;

    /// Set by `auth_middleware`, which guards every payroll route.
    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        ready(
            req.extensions()
                .get::<AuthUser>()
                .cloned()
                .ok_or_else(|| ErrorUnauthorized("Missing token")),
        )
    }
}

impl AuthUser {
    pub fn require_hr_or_admin(&self) -> actix_web::Result<()> {
        if self.role.can_manage_payroll() {
            Ok(())
        } else {
            Err(actix_web::error::ErrorForbidden("HR/Admin only"))
        }
    }

    /// HR/Admin see everyone; an employee sees only their own records.
    pub fn require_self_or_hr(&self, employee_id: u64) -> actix_web::Result<()> {
        if self.role.can_manage_payroll() || self.employee_id == Some(employee_id) {
            Ok(())
        } else {
            Err(actix_web::error::ErrorForbidden("Not allowed to view this employee"))
        }
    }
}
