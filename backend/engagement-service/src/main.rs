use actix_web::{web, App, HttpResponse, HttpServer, Responder};
use anyhow::{Context, Result};
use sqlx::PgPool;
use tracing::info;
use tracing_subscriber::EnvFilter;

use engagement_service::config::Config;

async fn health(pool: web::Data<PgPool>) -> impl Responder {
    match db_pool::health_check(pool.get_ref()).await {
        Ok(()) => HttpResponse::Ok().json(serde_json::json!({
            "status": "ok",
            "service": "engagement-service",
        })),
        Err(e) => HttpResponse::ServiceUnavailable().json(serde_json::json!({
            "status": "degraded",
            "error": e.to_string(),
        })),
    }
}

#[actix_web::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = Config::from_env().context("failed to load configuration")?;
    info!(
        "Starting engagement-service (env={}, port={})",
        config.app.env, config.app.http_port
    );

    let db_config = db_pool::DbConfig {
        service_name: "engagement-service".to_string(),
        database_url: config.database.url.clone(),
        max_connections: config.database.max_connections,
        min_connections: config.database.min_connections,
        ..db_pool::DbConfig::default()
    };
    db_config.log_config();

    let pool = db_pool::create_pool(db_config)
        .await
        .context("failed to create database pool")?;

    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .context("failed to run database migrations")?;
    info!("Database migrations applied");

    // The engagement operations themselves are mounted by the external route
    // layer; this process owns the store bootstrap and liveness reporting.
    let bind_addr = (config.app.host.clone(), config.app.http_port);
    let server_pool = pool.clone();
    HttpServer::new(move || {
        App::new()
            .app_data(web::Data::new(server_pool.clone()))
            .route("/health", web::get().to(health))
    })
    .bind(bind_addr)
    .context("failed to bind health endpoint")?
    .run()
    .await?;

    db_pool::close_pool(&pool).await;
    info!("engagement-service stopped");
    Ok(())
}
