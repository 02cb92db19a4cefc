//! # Yatube Web Server
//!
//! The main entry point for the Actix-web HTTP server.

use actix_web::{App, HttpServer, web};
use tracing_actix_web::TracingLogger;

mod config;
mod handlers;
mod middleware;
mod state;
mod telemetry;
mod templates;

use config::AppConfig;
use middleware::csrf::Csrf;
use middleware::error::error_pages;
use state::AppState;
use telemetry::TelemetryConfig;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    // Load .env file if present
    dotenvy::dotenv().ok();

    telemetry::init_telemetry(&TelemetryConfig::from_env());

    let config = AppConfig::from_env();

    tracing::info!(
        host = %config.host,
        port = config.port,
        "Starting Yatube web server"
    );

    // Build application state
    let state = AppState::new(&config).await;

    HttpServer::new(move || {
        let limiter = state.auth_limiter.clone();
        App::new()
            .wrap(Csrf)
            .wrap(error_pages())
            .wrap(TracingLogger::default())
            .app_data(web::Data::new(state.clone()))
            .configure(move |cfg| handlers::configure_routes(cfg, limiter))
            .default_service(web::to(handlers::not_found))
    })
    .bind((config.host.as_str(), config.port))?
    .run()
    .await
}
