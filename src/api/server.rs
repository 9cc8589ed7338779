use std::net::SocketAddr;

use axum::{Router, routing::get, routing::post};
use tokio::net::TcpListener;
use tower_http::{decompression::RequestDecompressionLayer, trace::TraceLayer};
use tracing::info;

use super::{
    services::{health, parse, save_result},
    state::AppState,
};
use crate::config::Config;

type AnyError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Build the relay router over `state`
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/parse", post(parse))
        .route("/{bundle}/save", post(save_result))
        .route("/health", get(health))
        .with_state(state)
        // Transparently inflate gzip request bodies
        .layer(RequestDecompressionLayer::new())
        .layer(TraceLayer::new_for_http())
}

pub async fn run(config: Config) -> Result<(), AnyError> {
    let address = config.server.bind_addr;

    info!(
        servers = %config.roster.servers_path.display(),
        sessions = %config.roster.sessions_path.display(),
        saved = %config.storage.saved_dir.display(),
        "Starting relay"
    );

    let state = AppState::new(config).map_err(|e| format!("Failed to build HTTP client: {}", e))?;
    let app = router(state);

    let listener = TcpListener::bind(address).await?;
    info!(%address, "taskrelay API listening");

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await?;

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{SignalKind, signal};
        match signal(SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "failed to install signal handler");
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

    info!("Shutdown signal received");
}
