use actix_web::middleware::NormalizePath;
use actix_web::web::Data;
use actix_web::{App, HttpServer, Responder, get};

use hrm_payroll::config::Config;
use hrm_payroll::db::{init_db, payroll_service};
use hrm_payroll::docs::ApiDoc;
use hrm_payroll::routes;
use tracing::info;
use tracing_appender::rolling;
use utoipa::OpenApi; // ApiDoc::openapi()
use utoipa_swagger_ui::SwaggerUi;

#[get("/")]
async fn index() -> impl Responder {
    "HRM Payroll"
}

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::from_env()?;

    // Rolling daily log
    let file_appender = rolling::daily("logs", "app.log");
    let (non_blocking, _guard) = tracing_appender::non_blocking(file_appender);

    tracing_subscriber::fmt()
        .with_writer(non_blocking)
        .with_max_level(tracing::Level::DEBUG)
        .with_ansi(false)
        .with_target(false)
        .with_level(true)
        .pretty()
        .init();

    info!("Server starting...");

    let pool = init_db(&config.database_url).await?;
    let service = Data::new(payroll_service(&pool, config.payroll.clone()));

    info!(
        recalculation = ?config.payroll.recalculation_policy,
        approve = ?config.payroll.approve_policy,
        concurrency = config.payroll.batch_concurrency,
        "Payroll engine ready"
    );

    let server_addr = config.server_addr.clone();
    let config_data = config.clone();

    HttpServer::new(move || {
        App::new()
            .wrap(actix_web::middleware::Logger::default())
            .wrap(NormalizePath::trim())
            .service(
                // wildcard {_:.*} matches the JS/CSS assets
                SwaggerUi::new("/swagger-ui/{_:.*}")
                    .url("/api-doc/openapi.json", ApiDoc::openapi()),
            )
            .app_data(Data::new(config.clone()))
            .app_data(service.clone())
            .service(index)
            .configure(|cfg| routes::configure(cfg, config_data.clone()))
    })
    .bind(server_addr)?
    .run()
    .await?;

    Ok(())
}
