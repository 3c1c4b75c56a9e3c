//! PaperHub API Gateway
//!
//! The entry point for all external API requests.

use metrics_exporter_prometheus::PrometheusBuilder;
use paperhub_common::{config::AppConfig, db::DbPool, metrics, observability};
use paperhub_gateway::{build_router, middleware::rate_limit::spawn_sweeper, AppState};
use std::net::SocketAddr;
use tokio::signal;
use tracing::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables
    dotenvy::dotenv().ok();

    // Load configuration
    let config = AppConfig::load()?;
    // Fail before touching the database
    config.auth.jwt_secret()?;

    // Initialize tracing
    observability::init_tracing(&config.observability);

    info!("Starting PaperHub API Gateway v{}", paperhub_common::VERSION);

    // Initialize database connection
    info!("Connecting to database...");
    let db = DbPool::new(&config.database).await?;

    if config.server.auto_migrate {
        db.migrate().await?;
    }

    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port).parse()?;
    let sweep_every = config.rate_limit.sweep_interval();
    let metrics_enabled = config.observability.metrics_enabled;

    let mut state = AppState::new(config, db)?;

    if metrics_enabled {
        let handle = PrometheusBuilder::new().install_recorder()?;
        metrics::register_metrics();
        state = state.with_metrics(handle);
    }

    if state.config.rate_limit.enabled {
        spawn_sweeper(state.limiters.api.clone(), sweep_every);
        spawn_sweeper(state.limiters.auth.clone(), sweep_every);
    }

    // Build the router
    let app = build_router(state);

    info!("Listening on {}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await?;

    info!("Server shutdown complete");
    Ok(())
}

/// Graceful shutdown signal handler
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("Received Ctrl+C, starting shutdown..."),
        _ = terminate => info!("Received SIGTERM, starting shutdown..."),
    }
}
