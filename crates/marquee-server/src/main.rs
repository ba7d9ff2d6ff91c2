//! Marquee Server - Main entry point

use anyhow::{Context, Result};
use marquee_common::logging::{init_logging, LogConfig};
use std::future::IntoFuture;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::{signal, sync::Notify};
use tracing::{info, warn};

use marquee_server::{
    api,
    config::Config,
    db,
    features::{movies::PgMovieStore, FeatureState},
    middleware::RateLimiter,
};

#[tokio::main]
async fn main() -> Result<()> {
    // Environment variables take precedence over these defaults.
    let log_config = LogConfig::builder()
        .log_file_prefix("marquee-server")
        .filter_directives("marquee_server=debug,tower_http=debug,sqlx=warn")
        .build()
        .merge_env()?;

    let _log_guard = init_logging(&log_config)?;

    info!("Starting Marquee Server");

    let config = Config::load().context("Invalid configuration")?;
    info!(
        host = %config.server.host,
        port = config.server.port,
        environment = %config.server.environment,
        "Configuration loaded"
    );

    let pool = db::create_pool(&config.database).await?;
    db::health_check(&pool).await?;
    db::run_migrations(&pool).await?;

    let store = PgMovieStore::new(pool.clone(), config.database.query_timeout());

    let limiter = RateLimiter::new(config.rate_limit.clone());
    let sweeper = if limiter.is_enabled() {
        info!(
            rps = config.rate_limit.rps,
            burst = config.rate_limit.burst,
            sweep_interval = ?config.rate_limit.sweep_interval,
            "Rate limiter enabled"
        );
        Some(limiter.spawn_sweeper())
    } else {
        warn!("Rate limiter disabled (LIMITER_ENABLED=false)");
        None
    };

    let state = FeatureState {
        movies: Arc::new(store),
        environment: config.server.environment,
    };
    let app = api::create_router(state, &limiter, &config);

    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port)
        .parse()
        .with_context(|| {
            format!("Invalid listen address {}:{}", config.server.host, config.server.port)
        })?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(%addr, "Server listening");

    let shutdown_started = Arc::new(Notify::new());
    let server = axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown({
        let shutdown_started = Arc::clone(&shutdown_started);
        async move {
            shutdown_signal().await;
            shutdown_started.notify_one();
        }
    });

    let grace = config.server.shutdown_timeout();
    tokio::select! {
        result = server.into_future() => result?,
        _ = async {
            shutdown_started.notified().await;
            tokio::time::sleep(grace).await;
        } => {
            warn!(timeout = ?grace, "Connections still open after shutdown timeout, exiting");
        },
    }

    if let Some(sweeper) = sweeper {
        sweeper.abort();
    }
    pool.close().await;

    info!("Server shut down gracefully");

    Ok(())
}

/// Graceful shutdown signal handler
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            },
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            },
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, starting graceful shutdown");
        },
        _ = terminate => {
            info!("Received terminate signal, starting graceful shutdown");
        },
    }
}
