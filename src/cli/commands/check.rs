//! Check command implementation.
//!
//! Verifies both catalog instances are reachable with their API keys.

use super::optional_client;
use crate::models::config::Config;
use crate::preflight;
use crate::services::CatalogApi;
use crate::Result;
use colored::Colorize;

/// Run the catalog connection checks.
pub async fn check(config: &Config) -> Result<()> {
    println!("{}", "Running preflight checks...".bold());
    println!();

    if let Err(e) = config.validate() {
        println!("{} {}", "[WARN]".yellow(), e);
    }

    let timeout = config.catalog.timeout_secs;
    let main = optional_client(&config.catalog.main, timeout);
    let uhd = optional_client(&config.catalog.uhd, timeout);

    let results = preflight::run_preflight_checks(
        main.as_ref().map(|c| c as &dyn CatalogApi),
        uhd.as_ref().map(|c| c as &dyn CatalogApi),
    )
    .await;
    preflight::print_results(&results);

    println!();

    if !preflight::all_passed(&results) {
        return Err(crate::Error::other(
            "Preflight checks failed. Fix the issues above and try again.".to_string(),
        ));
    }

    println!("{}", "All checks passed".green());
    Ok(())
}
