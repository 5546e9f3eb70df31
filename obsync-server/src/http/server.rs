//! Axum server setup
//!
//! Server skeleton with:
//! - Localhost and Obsidian-app CORS by default
//! - Tracing middleware
//! - Graceful shutdown on SIGTERM/Ctrl+C

use std::sync::Arc;

use axum::extract::DefaultBodyLimit;
use axum::http::HeaderValue;
use axum::Router;
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use obsync_core::{PostService, SyncConfig, SyncError};

use super::routes;

/// Shared application state
pub struct AppState {
    pub posts: PostService,
    pub config: SyncConfig,
}

impl AppState {
    pub fn new(config: SyncConfig) -> Self {
        Self {
            posts: PostService::from_config(&config),
            config,
        }
    }
}

/// Origins the Obsidian desktop and mobile apps send
const DEFAULT_ORIGINS: [HeaderValue; 5] = [
    HeaderValue::from_static("app://obsidian.md"),
    HeaderValue::from_static("capacitor://localhost"),
    HeaderValue::from_static("http://localhost"),
    HeaderValue::from_static("http://127.0.0.1"),
    HeaderValue::from_static("http://localhost:1312"),
];

fn cors_layer(permissive: bool) -> CorsLayer {
    if permissive {
        tracing::warn!("CORS: Permissive mode enabled - all origins allowed");
        CorsLayer::permissive()
    } else {
        CorsLayer::new()
            .allow_origin(DEFAULT_ORIGINS)
            .allow_methods(Any)
            .allow_headers(Any)
    }
}

/// Build the application router with all routes
pub fn build_router(state: Arc<AppState>) -> Router {
    let cors = cors_layer(state.config.cors_permissive);
    let body_limit = DefaultBodyLimit::max(state.config.max_body_bytes);

    Router::new()
        .merge(routes::health::router())
        .merge(routes::posts::router())
        .layer(body_limit)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Run the HTTP server until Ctrl+C or SIGTERM.
pub async fn run_server(config: SyncConfig) -> Result<(), ServerError> {
    let bind_addr = config.bind_addr()?;
    tracing::info!(
        content_root = %config.content_root.display(),
        static_root = %config.static_root.display(),
        strict_paths = config.strict_attachment_paths,
        "config loaded"
    );

    let app = build_router(Arc::new(AppState::new(config)));

    let listener = TcpListener::bind(bind_addr).await?;
    tracing::info!("Server listening on {}", bind_addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server shutdown complete");
    Ok(())
}

/// Wait for shutdown signal (Ctrl+C or SIGTERM).
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C, starting shutdown");
        }
        _ = terminate => {
            tracing::info!("Received SIGTERM, starting shutdown");
        }
    }
}

/// Server error type
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Config(#[from] SyncError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bad_bind_address_is_config_error() {
        let config = SyncConfig {
            host: "::not-an-ip::".to_string(),
            ..SyncConfig::default()
        };
        let rt = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .unwrap();
        let err = rt.block_on(run_server(config)).unwrap_err();
        assert!(matches!(err, ServerError::Config(_)));
    }
}
