//! Command line argument definitions.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Combiner - Move 4K downloads into the main movie library
#[derive(Parser, Debug)]
#[command(name = "combiner")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Directory holding config.toml and the log file
    #[arg(long, global = true, value_name = "DIR")]
    pub config_dir: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run the webhook server
    Serve {
        /// Address to bind
        #[arg(long)]
        host: Option<String>,

        /// Port to listen on
        #[arg(short, long)]
        port: Option<u16>,
    },

    /// Relocate one file into the main library
    Relocate(RelocateArgs),

    /// Check connections to both catalog instances
    Check,

    /// Show the quality name to tier table
    Qualities,

    /// Show the tier inferred for a path
    Classify {
        /// Quality name as reported by the catalog
        #[arg(short, long)]
        quality: Option<String>,

        /// File path to classify
        #[arg(value_name = "PATH")]
        path: String,
    },
}

#[derive(clap::Args, Debug)]
pub struct RelocateArgs {
    /// File to relocate
    #[arg(value_name = "SOURCE")]
    pub source: PathBuf,

    /// Movie title (defaults to the source folder name)
    #[arg(short, long)]
    pub title: Option<String>,

    /// Movie year
    #[arg(short, long)]
    pub year: Option<u32>,

    /// Quality name as reported by the catalog
    #[arg(short, long)]
    pub quality: Option<String>,

    /// Source library root (repeatable; fetched from the 4K catalog if omitted)
    #[arg(long = "source-root", value_name = "DIR")]
    pub source_roots: Vec<PathBuf>,

    /// Destination library root (repeatable; fetched from the main catalog if omitted)
    #[arg(long = "dest-root", value_name = "DIR")]
    pub dest_roots: Vec<PathBuf>,

    /// Force quality suffix naming on
    #[arg(long, conflicts_with = "no_quality_suffix")]
    pub quality_suffix: bool,

    /// Force quality suffix naming off
    #[arg(long)]
    pub no_quality_suffix: bool,

    /// Print the outcome as JSON
    #[arg(long)]
    pub json: bool,
}

impl RelocateArgs {
    /// Suffix override from the command line, if any.
    pub fn suffix_override(&self) -> Option<bool> {
        match (self.quality_suffix, self.no_quality_suffix) {
            (true, _) => Some(true),
            (_, true) => Some(false),
            _ => None,
        }
    }
}
