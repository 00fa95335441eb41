//! Catalog connection preflight check.

use super::CheckResult;
use crate::services::CatalogApi;

/// Check that a catalog instance answers with the configured key.
pub async fn check(name: &str, catalog: Option<&dyn CatalogApi>, env_prefix: &str) -> CheckResult {
    let Some(catalog) = catalog else {
        return CheckResult::fail(
            name,
            "URL or API key not configured",
            &format!("Set {0}_URL and {0}_API_KEY", env_prefix),
        );
    };

    if catalog.check_connection().await {
        CheckResult::ok(name, &format!("connected ({})", catalog.base_url()))
    } else {
        CheckResult::fail(
            name,
            &format!("connection failed ({})", catalog.base_url()),
            &format!("Check {0}_URL and {0}_API_KEY and that the instance is running", env_prefix),
        )
    }
}
