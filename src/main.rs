use std::net::SocketAddr;
use tower_http::cors::CorsLayer;
use tracing_subscriber::EnvFilter;

use catering_api_rust::app;
use catering_api_rust::config;
use catering_api_rust::is_production;
use catering_api_rust::middleware::{OperatorGuard, TenantBinder};
use catering_api_rust::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present so cargo run picks up DATABASE_URL, JWT_SECRET, etc.
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = config::config();
    tracing::info!("Starting Catering API in {:?} mode", config.environment);

    if is_production!() && config.security.jwt_secret.is_empty() {
        tracing::warn!("JWT_SECRET is not set; tenant claims in bearer tokens will be ignored");
    }

    let state = AppState::connect(config).await?;

    if config.tenancy.eager_warmup {
        match state.registry().get_all().await {
            Ok(report) => tracing::info!(
                "Warmed up {} tenant pool(s), {} failed",
                report.ready.len(),
                report.failed.len()
            ),
            Err(e) => tracing::warn!("Tenant warm-up skipped: {}", e),
        }
    }

    if config.security.operator_token.is_empty() && !config.security.operator_localhost {
        tracing::warn!("OPERATOR_TOKEN is not set; /api/root/* will reject every request");
    }

    let binder = TenantBinder::from_config(config)?;
    let mut app = app::router(state.clone(), binder, OperatorGuard::from_config(config));
    if config.security.enable_cors {
        app = app.layer(CorsLayer::permissive());
    }

    // Allow tests or deployments to override port via env
    let port = std::env::var("CATERING_API_PORT")
        .ok()
        .or_else(|| std::env::var("PORT").ok())
        .and_then(|s| s.parse::<u16>().ok())
        .unwrap_or(3000);

    let bind_addr = format!("0.0.0.0:{}", port);
    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    tracing::info!("Catering API listening on http://{}", bind_addr);

    axum::serve(listener, app.into_make_service_with_connect_info::<SocketAddr>())
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    state.registry().close_all().await;
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
