//! CLI command implementations.

pub mod check;
pub mod classify;
pub mod qualities;
pub mod relocate;
pub mod serve;

use crate::models::config::Config;
use crate::services::{CatalogApi, CatalogClient};
use crate::Result;
use std::sync::Arc;

/// Clients for the main and 4K catalog instances.
pub(crate) fn catalog_clients(config: &Config) -> Result<(Arc<dyn CatalogApi>, Arc<dyn CatalogApi>)> {
    let timeout = config.catalog.timeout_secs;
    let main = CatalogClient::from_config(&config.catalog.main, timeout)?;
    let uhd = CatalogClient::from_config(&config.catalog.uhd, timeout)?;
    Ok((Arc::new(main), Arc::new(uhd)))
}

/// Client for one instance, or `None` when it is not configured.
pub(crate) fn optional_client(
    instance: &crate::models::config::CatalogInstanceConfig,
    timeout_secs: u64,
) -> Option<CatalogClient> {
    CatalogClient::from_config(instance, timeout_secs).ok()
}
