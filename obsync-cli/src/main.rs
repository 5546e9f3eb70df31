//! obsync CLI - publish Obsidian notes to a Hugo site
//!
//! Entry point for the `obsync` binary:
//! - `serve` runs the HTTP API that Obsidian posts notes to
//! - `config` inspects the effective configuration

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};

use obsync_core::SyncConfig;

mod commands;
mod tracing_setup;

use tracing_setup::{init_tracing, TracingConfig};

#[derive(Parser, Debug)]
#[command(
    name = "obsync",
    author,
    version,
    about = "Sync Obsidian notes and attachments into a Hugo site",
    long_about = "Receives notes from the Obsidian plugin, writes them as Hugo markdown with \
                  frontmatter under content/{category}/, and stores their attachments under \
                  static/media/."
)]
struct Cli {
    /// Enable debug logging (RUST_LOG still wins when set)
    #[arg(long, global = true)]
    debug: bool,

    /// Config file (default: ~/.obsync/config.toml when present)
    #[arg(long, global = true, env = "OBSIDIAN_SYNC_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Run the HTTP API server
    Serve(commands::serve::ServeArgs),
    /// Inspect configuration (show, path)
    Config(commands::config::ConfigArgs),
}

#[tokio::main]
async fn main() -> Result<()> {
    // A missing .env is fine; values may come from the real environment
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    let config = SyncConfig::load(cli.config.as_deref()).context("Failed to load configuration")?;

    match cli.command {
        Commands::Serve(args) => {
            init_tracing(&TracingConfig {
                debug: cli.debug,
                default_level: config.log_level.clone(),
            })
            .context("Failed to initialize tracing")?;
            commands::run_serve(args, config).await?
        }
        Commands::Config(args) => commands::run_config(args, &config, cli.config.as_deref())?,
    }

    Ok(())
}
