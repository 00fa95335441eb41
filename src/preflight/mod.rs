//! Preflight checks module.

mod catalog;

use crate::services::CatalogApi;
use colored::Colorize;

/// Result of a preflight check.
#[derive(Debug)]
pub struct CheckResult {
    pub name: String,
    pub success: bool,
    pub message: String,
    pub hint: Option<String>,
}

impl CheckResult {
    pub fn ok(name: &str, message: &str) -> Self {
        Self {
            name: name.to_string(),
            success: true,
            message: message.to_string(),
            hint: None,
        }
    }

    pub fn fail(name: &str, message: &str, hint: &str) -> Self {
        Self {
            name: name.to_string(),
            success: false,
            message: message.to_string(),
            hint: Some(hint.to_string()),
        }
    }
}

/// Check both catalog instances. `None` means the instance is not configured.
pub async fn run_preflight_checks(
    main: Option<&dyn CatalogApi>,
    uhd: Option<&dyn CatalogApi>,
) -> Vec<CheckResult> {
    let (main, uhd) = tokio::join!(
        catalog::check("Main Radarr", main, "RADARR_MAIN"),
        catalog::check("4K Radarr", uhd, "RADARR_4K"),
    );
    vec![main, uhd]
}

/// Print preflight check results.
pub fn print_results(results: &[CheckResult]) {
    for result in results {
        if result.success {
            println!(
                "{} {}: {}",
                "[OK]".green(),
                result.name.bold(),
                result.message
            );
        } else {
            println!(
                "{} {}: {}",
                "[FAIL]".red(),
                result.name.bold(),
                result.message
            );
            if let Some(ref hint) = result.hint {
                println!("  {} {}", "->".yellow(), hint);
            }
        }
    }
}

/// Log preflight results instead of printing them.
pub fn log_results(results: &[CheckResult]) {
    for result in results {
        if result.success {
            tracing::info!("{}: {}", result.name, result.message);
        } else {
            tracing::warn!("{}: {}", result.name, result.message);
        }
    }
}

/// Check if all preflight checks passed.
pub fn all_passed(results: &[CheckResult]) -> bool {
    results.iter().all(|r| r.success)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_unconfigured_instances_fail() {
        let results = run_preflight_checks(None, None).await;
        assert_eq!(results.len(), 2);
        assert!(!all_passed(&results));
        assert!(results[1].hint.as_deref().unwrap().contains("RADARR_4K_URL"));
    }
}
