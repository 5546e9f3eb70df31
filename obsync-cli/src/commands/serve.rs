//! HTTP server command
//!
//! Runs the post sync API until Ctrl+C or SIGTERM.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;

use obsync_core::SyncConfig;
use obsync_server::run_server;

/// Arguments for the serve command. Each flag overrides the loaded config.
#[derive(Parser, Debug, Default)]
pub struct ServeArgs {
    /// Host to bind to (default: 0.0.0.0)
    #[arg(long)]
    pub host: Option<String>,

    /// Port to bind to (default: 1312)
    #[arg(long, short = 'p')]
    pub port: Option<u16>,

    /// Hugo content directory
    #[arg(long)]
    pub content_root: Option<PathBuf>,

    /// Hugo static directory
    #[arg(long)]
    pub static_root: Option<PathBuf>,

    /// Allow permissive CORS (all origins) - use with caution
    #[arg(long)]
    pub cors_permissive: bool,
}

impl ServeArgs {
    /// Fold the flags into `config`
    pub fn apply(self, config: &mut SyncConfig) {
        if let Some(host) = self.host {
            config.host = host;
        }
        if let Some(port) = self.port {
            config.port = port;
        }
        if let Some(root) = self.content_root {
            config.content_root = root;
        }
        if let Some(root) = self.static_root {
            config.static_root = root;
        }
        if self.cors_permissive {
            config.cors_permissive = true;
        }
    }
}

/// Run the HTTP server
pub async fn run_serve(args: ServeArgs, mut config: SyncConfig) -> Result<()> {
    args.apply(&mut config);

    tracing::info!("Starting obsync server on {}:{}", config.host, config.port);

    run_server(config).await.context("Server error")?;

    Ok(())
}
