//! Webhook server.
//!
//! Receives download events from the 4K catalog instance and relocates the
//! imported file into the main library.

pub mod handlers;
pub mod pipeline;

use crate::core::{Relocator, RelocatorConfig};
use crate::models::config::Config;
use crate::services::CatalogApi;
use crate::Result;
use axum::routing::{get, post};
use axum::Router;
use std::path::PathBuf;
use std::sync::Arc;
use tower_http::trace::TraceLayer;

/// Shared state for HTTP handlers.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub relocator: Arc<Relocator>,
    /// Destination instance.
    pub main_catalog: Arc<dyn CatalogApi>,
    /// Source (4K) instance.
    pub uhd_catalog: Arc<dyn CatalogApi>,
    pub log_file: PathBuf,
}

impl AppState {
    pub fn new(
        config: Config,
        main_catalog: Arc<dyn CatalogApi>,
        uhd_catalog: Arc<dyn CatalogApi>,
    ) -> Self {
        let relocator = Relocator::with_config(RelocatorConfig::from(&config));
        let log_file = config.log_file_path();
        Self {
            config: Arc::new(config),
            relocator: Arc::new(relocator),
            main_catalog,
            uhd_catalog,
            log_file,
        }
    }
}

/// Build the router with all routes and layers applied.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(handlers::health))
        .route("/webhook/radarr-4k", post(handlers::webhook))
        .route("/config", get(handlers::config))
        .route("/quality-mappings", get(handlers::quality_mappings))
        .route("/logs", get(handlers::logs))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Bind `host:port` and serve until Ctrl-C.
pub async fn serve(state: AppState, host: &str, port: u16) -> Result<()> {
    let app = build_router(state);
    let listener = tokio::net::TcpListener::bind((host, port)).await?;
    let addr = listener.local_addr()?;

    tracing::info!("Listening on http://{}", addr);
    tracing::info!("Webhook endpoint: http://{}/webhook/radarr-4k", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown requested");
}
