//! Combiner CLI
//!
//! Moves finished 4K downloads into the main movie library.

use clap::Parser;
use combiner::cli::{
    args::{Cli, Commands},
    commands::{check, classify, qualities, relocate, serve},
};
use combiner::models::config::{load_config, log_file_in, resolve_config_dir};
use std::path::Path;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Parse command line arguments
    let cli = Cli::parse();

    let config_dir = resolve_config_dir(cli.config_dir.as_deref());

    // Only the server keeps a log file
    let log_file = matches!(cli.command, Commands::Serve { .. }).then(|| log_file_in(&config_dir));
    init_logging(cli.verbose, log_file.as_deref());

    let config = load_config(Some(&config_dir))?;

    match cli.command {
        Commands::Serve { host, port } => {
            serve::serve(config, host, port).await?;
        }

        Commands::Relocate(args) => {
            relocate::relocate(&config, &args).await?;
        }

        Commands::Check => {
            check::check(&config).await?;
        }

        Commands::Qualities => {
            qualities::qualities()?;
        }

        Commands::Classify { quality, path } => {
            classify::classify(&config, &path, quality.as_deref())?;
        }
    }

    Ok(())
}

/// Initialize the logging system.
fn init_logging(verbose: bool, log_file: Option<&Path>) {
    use std::sync::Arc;
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        if verbose {
            EnvFilter::new("combiner=debug")
        } else {
            EnvFilter::new("combiner=info")
        }
    });

    let file_layer = log_file.and_then(|path| {
        if let Some(parent) = path.parent() {
            let _ = std::fs::create_dir_all(parent);
        }
        match std::fs::OpenOptions::new().create(true).append(true).open(path) {
            Ok(file) => Some(
                fmt::layer()
                    .with_ansi(false)
                    .with_target(false)
                    .with_writer(Arc::new(file)),
            ),
            Err(e) => {
                eprintln!("Cannot open log file {}: {}", path.display(), e);
                None
            }
        }
    });

    tracing_subscriber::registry()
        .with(fmt::layer().with_target(false))
        .with(file_layer)
        .with(filter)
        .init();
}
