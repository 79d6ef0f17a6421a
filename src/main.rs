//! cpamm-gateway server entry point.
//!
//! Loads configuration, optionally restores pools from PostgreSQL, and
//! serves the REST and WebSocket endpoints.

use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use tracing_subscriber::EnvFilter;

use cpamm_gateway::app_state::AppState;
use cpamm_gateway::build_app;
use cpamm_gateway::config::{GatewayConfig, LogFormat};
use cpamm_gateway::domain::{EventBus, PoolRegistry};
use cpamm_gateway::persistence::{PostgresPersistence, tasks};
use cpamm_gateway::service::PoolService;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = GatewayConfig::from_env().context("loading configuration")?;
    init_tracing(config.log_format);
    tracing::info!(addr = %config.listen_addr, "starting cpamm-gateway");

    // Domain and service layers
    let registry = Arc::new(PoolRegistry::new());
    let event_bus = EventBus::new(config.event_bus_capacity);
    let pool_service = Arc::new(PoolService::new(registry, event_bus.clone()));

    if config.persistence_enabled {
        let persistence = PostgresPersistence::connect(&config)
            .await
            .context("connecting to postgres")?;
        tasks::restore_pools(&persistence, &pool_service)
            .await
            .context("restoring pools")?;

        if config.event_log_enabled {
            tasks::spawn_event_writer(persistence.clone(), event_bus.subscribe());
        }
        tasks::spawn_snapshot_task(
            persistence.clone(),
            Arc::clone(&pool_service),
            Duration::from_secs(config.snapshot_interval_secs),
        );
        if config.cleanup_after_days > 0 {
            tasks::spawn_cleanup_task(persistence, config.cleanup_after_days);
        }
    } else {
        tracing::info!("persistence disabled, pools live in memory only");
    }

    let app = build_app(
        AppState::new(pool_service),
        Duration::from_secs(config.request_timeout_secs),
    );

    let listener = tokio::net::TcpListener::bind(config.listen_addr)
        .await
        .with_context(|| format!("binding {}", config.listen_addr))?;
    tracing::info!(addr = %config.listen_addr, "server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("server stopped");
    Ok(())
}

fn init_tracing(format: LogFormat) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    match format {
        LogFormat::Json => tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .init(),
        LogFormat::Pretty => tracing_subscriber::fmt().with_env_filter(filter).init(),
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "failed to listen for shutdown signal");
    }
}
