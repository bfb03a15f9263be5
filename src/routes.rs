use crate::{
    api::{payroll, payroll_config},
    auth::middleware::auth_middleware,
    config::Config,
};
use actix_governor::{
    Governor, GovernorConfig, GovernorConfigBuilder, PeerIpKeyExtractor, governor::middleware::NoOpMiddleware,
};
use actix_web::{middleware::from_fn, web};

fn build_limiter(requests_per_min: u32) -> Governor<PeerIpKeyExtractor, NoOpMiddleware> {
    let burst = requests_per_min.max(1);
    let per_ms = (60_000 / burst as u64).max(1);
    let cfg = GovernorConfigBuilder::default()
        .per_millisecond(per_ms)
        .burst_size(burst)
        .key_extractor(PeerIpKeyExtractor)
        .finish()
        .unwrap_or_else(|| {
            tracing::warn!(requests_per_min, "Invalid rate limit, using governor defaults");
            GovernorConfig::default()
        });
    Governor::new(&cfg)
}

pub fn configure(cfg: &mut web::ServiceConfig, config: Config) {
    let protected_limiter = build_limiter(config.rate_protected_per_min);

    // Protected routes
    cfg.service(
        web::scope(&config.api_prefix)
            .wrap(from_fn(auth_middleware)) // authentication
            .wrap(protected_limiter) // rate limiting
            .service(
                web::scope("/payroll")
                    // /payroll/generate
                    .service(
                        web::resource("/generate").route(web::post().to(payroll::generate_payroll)),
                    )
                    // /payroll/tax
                    .service(web::resource("/tax").route(web::post().to(payroll::compute_tax)))
                    // /payroll/config
                    .service(
                        web::resource("/config")
                            .route(web::get().to(payroll_config::list_configs))
                            .route(web::post().to(payroll_config::create_config)),
                    )
                    .service(
                        web::resource("/config/active")
                            .route(web::get().to(payroll_config::active_config)),
                    )
                    .service(
                        web::resource("/config/as-of/{date}")
                            .route(web::get().to(payroll_config::config_as_of)),
                    )
                    // /payroll/month/{year}/{month}
                    .service(
                        web::resource("/month/{year}/{month}")
                            .route(web::get().to(payroll::list_by_month)),
                    )
                    // /payroll/status/{status}
                    .service(
                        web::resource("/status/{status}")
                            .route(web::get().to(payroll::list_by_status)),
                    )
                    // /payroll/employee/{employee_id}
                    .service(
                        web::resource("/employee/{employee_id}")
                            .route(web::get().to(payroll::list_by_employee)),
                    )
                    .service(
                        web::resource("/employee/{employee_id}/month/{year}/{month}")
                            .route(web::get().to(payroll::get_by_employee_and_month)),
                    )
                    // /payroll/{id}
                    .service(
                        web::resource("/{id}")
                            .route(web::get().to(payroll::get_payroll))
                            .route(web::delete().to(payroll::delete_payroll)),
                    )
                    .service(
                        web::resource("/{id}/recalculate")
                            .route(web::post().to(payroll::recalculate_payroll)),
                    )
                    .service(
                        web::resource("/{id}/approve")
                            .route(web::post().to(payroll::approve_payroll)),
                    )
                    .service(
                        web::resource("/{id}/adjustments")
                            .route(web::put().to(payroll::adjust_payroll)),
                    ),
            ),
    );
}
