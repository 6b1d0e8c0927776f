use std::sync::Arc;

use actix_web::{App, HttpServer, middleware::Logger, web};
use anyhow::Context;
use tracing_subscriber::EnvFilter;

use storefront::config::AppConfig;
use storefront::db;
use storefront::routes;
use storefront::services::payment::{BraintreeGateway, PaymentGateway};

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info,sqlx=warn")),
        )
        .init();

    let config = AppConfig::from_env()?;

    tracing::info!("connecting to database");
    let db = db::establish_connection(&config.database_url)
        .await
        .context("Failed to connect to database")?;

    if config.auto_migrate {
        db::create_schema(&db)
            .await
            .context("Failed to create database schema")?;
        tracing::info!("schema ready");
    }

    let gateway: Arc<dyn PaymentGateway> = Arc::new(BraintreeGateway::new(config.braintree.clone()));
    let gateway = web::Data::from(gateway);

    let db = web::Data::new(db);
    let bind = (config.host.clone(), config.port);
    let config = web::Data::new(config);

    tracing::info!(host = %bind.0, port = bind.1, "starting server");

    HttpServer::new(move || {
        App::new()
            .wrap(Logger::default())
            .app_data(db.clone())
            .app_data(config.clone())
            .app_data(gateway.clone())
            .configure(routes::configure_routes)
    })
    .bind(bind)?
    .run()
    .await?;

    Ok(())
}
