//! Serve command implementation.

use super::catalog_clients;
use crate::models::config::Config;
use crate::preflight;
use crate::server::{self, AppState};
use crate::Result;

/// Run the webhook server until interrupted.
pub async fn serve(mut config: Config, host: Option<String>, port: Option<u16>) -> Result<()> {
    if let Some(host) = host {
        config.server.host = host;
    }
    if let Some(port) = port {
        config.server.port = port;
    }

    config.validate()?;
    config.ensure_config_dir()?;

    tracing::info!("Starting combiner");
    tracing::info!("Config directory: {}", config.config_dir.display());
    tracing::info!(
        "Plex naming: {}, quality suffix: {}, append to original name: {}",
        config.naming.enabled,
        config.naming.add_quality_suffix,
        config.naming.append_to_original_name
    );

    let (main, uhd) = catalog_clients(&config)?;

    let results = preflight::run_preflight_checks(Some(main.as_ref()), Some(uhd.as_ref())).await;
    preflight::log_results(&results);
    if !preflight::all_passed(&results) {
        tracing::warn!("Some catalog instances are unreachable; events may fail until they recover");
    }

    let host = config.server.host.clone();
    let port = config.server.port;
    let state = AppState::new(config, main, uhd);

    server::serve(state, &host, port).await
}
