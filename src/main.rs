use std::sync::Arc;

use anyhow::Context;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use category_store::{
    api::{create_router, AppState},
    config::{BackendKind, Config},
    db::{create_redis_client, InMemoryBackend, KeyValueBackend, RedisBackend},
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,tower_http=debug")),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env()?;

    // Backend handle lives for the whole server run and is dropped on shutdown
    let backend: Arc<dyn KeyValueBackend> = match config.store_backend {
        BackendKind::Redis => {
            let client = create_redis_client(&config.redis_url)?;
            let backend = RedisBackend::connect(client)
                .await
                .context("Failed to connect to Redis")?;
            Arc::new(backend)
        }
        BackendKind::Memory => {
            tracing::warn!("Using in-memory backend, data will not survive a restart");
            Arc::new(InMemoryBackend::new())
        }
    };

    tracing::info!(
        backend = backend.name(),
        max_write_attempts = config.max_write_attempts,
        corrupt_records = ?config.corrupt_record_policy,
        "Store initialized"
    );

    let app = create_router(AppState::new(backend.clone(), &config));

    let listener = tokio::net::TcpListener::bind(config.bind_address())
        .await
        .with_context(|| format!("Failed to bind {}", config.bind_address()))?;
    tracing::info!(addr = %listener.local_addr()?, "Server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    drop(backend);
    tracing::info!("Server stopped, backend connection closed");

    Ok(())
}

/// Resolves on Ctrl-C or SIGTERM
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to listen for Ctrl-C");
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received");
}
