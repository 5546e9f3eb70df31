//! Tracing setup for the obsync CLI
//!
//! Usage:
//!   obsync --debug serve              # Debug logging to console
//!   RUST_LOG=obsync_core=debug obsync # Fine-grained log control
//!
//! Without `RUST_LOG` the level comes from the `log_level` config key.

use anyhow::{anyhow, Result};
use tracing_subscriber::EnvFilter;

/// Tracing configuration options
#[derive(Debug, Clone)]
pub struct TracingConfig {
    /// Force debug logging unless RUST_LOG is set
    pub debug: bool,
    /// Filter used when RUST_LOG is unset
    pub default_level: String,
}

impl Default for TracingConfig {
    fn default() -> Self {
        Self {
            debug: false,
            default_level: "info".to_string(),
        }
    }
}

impl TracingConfig {
    fn fallback_filter(&self) -> EnvFilter {
        let level = if self.debug { "debug" } else { self.default_level.as_str() };
        EnvFilter::try_new(level).unwrap_or_else(|_| EnvFilter::new("info"))
    }
}

/// Initialize console tracing
pub fn init_tracing(config: &TracingConfig) -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| config.fallback_filter());

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(config.debug)
        .compact()
        .try_init()
        .map_err(|err| anyhow!(err))
}
