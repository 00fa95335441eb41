//! Qualities command implementation.

use crate::core::classifier::QUALITY_TABLE;
use crate::models::quality::QualityTier;
use crate::Result;
use colored::Colorize;

/// Print the quality name to tier table, grouped by tier.
pub fn qualities() -> Result<()> {
    println!("{}", "Quality mappings".bold().cyan());
    println!();

    for tier in QualityTier::ALL {
        let names: Vec<&str> = QUALITY_TABLE
            .iter()
            .filter(|(_, t)| *t == tier)
            .map(|(name, _)| *name)
            .collect();
        if names.is_empty() {
            continue;
        }

        println!("{}", tier.label().bold());
        for name in names {
            println!("  {}", name);
        }
    }

    println!();
    println!("Total: {}", QUALITY_TABLE.len());
    println!(
        "Unlisted names fall back to path tokens, then {}",
        QualityTier::default().label()
    );
    Ok(())
}
