//! Inspect the effective configuration

use std::path::Path;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};

use obsync_core::SyncConfig;

#[derive(Parser, Debug)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommands,
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Print the effective configuration (file + environment) as TOML
    Show,
    /// Show config file path
    Path,
}

pub fn run_config(args: ConfigArgs, config: &SyncConfig, explicit: Option<&Path>) -> Result<()> {
    match args.command {
        ConfigCommands::Show => {
            let rendered = toml::to_string_pretty(config).context("Failed to render config")?;
            print!("{}", rendered);
        }
        ConfigCommands::Path => {
            let path = explicit
                .map(Path::to_path_buf)
                .unwrap_or_else(SyncConfig::default_config_path);
            println!("{}", path.display());
        }
    }
    Ok(())
}
