mod api;
mod lookup;
mod middleware;
mod mirror;
mod photos;
mod storage;

use std::sync::Arc;

use tracing_subscriber::EnvFilter;

use crate::api::{build_app, AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Arc::new(mise_core::load_app_config()?);
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    let storage = Arc::new(storage::init_storage(&config).await);
    let sources = Arc::new(mise_sources::SourceRegistry::new(
        config.source_timeout_secs,
        &config.user_agent,
        config.upcitemdb_api_key.clone(),
    )?);
    let photos = Arc::new(photos::PhotoResolver::new(
        config.r2_public_base_url.clone(),
        config.photos_dir.clone(),
        &config.user_agent,
    )?);
    let mirror = mirror::from_config(&config)?;
    let mirror_paths = storage.durable_paths();

    let app = build_app(AppState {
        storage,
        sources,
        photos,
        mirror,
        mirror_paths,
        static_dir: config.static_dir.clone(),
    });

    let listener = tokio::net::TcpListener::bind(config.bind_addr).await?;
    tracing::info!(addr = %config.bind_addr, "mise-scanner listening");
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to listen for ctrl-c");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }

    tracing::info!("received shutdown signal, starting graceful shutdown");
}
