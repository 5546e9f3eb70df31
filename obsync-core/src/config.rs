//! Service configuration - paths, bind address, limits
//!
//! Loaded once at startup and handed to every component constructor.
//! Precedence (lowest first): built-in defaults, TOML file, `OBSIDIAN_SYNC_*`
//! environment variables. The CLI applies its own flags on top.

use std::env;
use std::fs;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{Result, SyncError};

/// Prefix shared by every environment override
pub const ENV_PREFIX: &str = "OBSIDIAN_SYNC_";

/// Default request body limit: attachments arrive base64-inlined in JSON.
const DEFAULT_MAX_BODY_BYTES: usize = 50 * 1024 * 1024;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SyncConfig {
    pub host: String,
    pub port: u16,
    /// Hugo `content/` directory; one subdirectory per category
    pub content_root: PathBuf,
    /// Hugo `static/` directory; attachments go under `media/`
    pub static_root: PathBuf,
    pub log_level: String,
    /// Site path the static tree is served under (e.g. `/blog`)
    pub media_url_prefix: String,
    pub max_body_bytes: usize,
    /// Allow any CORS origin instead of localhost and the Obsidian app
    pub cors_permissive: bool,
    /// Reject attachment paths with trailing characters after the grammar
    pub strict_attachment_paths: bool,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 1312,
            content_root: PathBuf::from("/app/content"),
            static_root: PathBuf::from("/app/static"),
            log_level: "info".to_string(),
            media_url_prefix: "/blog".to_string(),
            max_body_bytes: DEFAULT_MAX_BODY_BYTES,
            cors_permissive: false,
            strict_attachment_paths: true,
        }
    }
}

impl SyncConfig {
    /// Create config with explicit roots (for testing)
    pub fn with_roots(content_root: impl Into<PathBuf>, static_root: impl Into<PathBuf>) -> Self {
        Self {
            content_root: content_root.into(),
            static_root: static_root.into(),
            ..Self::default()
        }
    }

    /// Default config file path: ~/.obsync/config.toml
    pub fn default_config_path() -> PathBuf {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".obsync/config.toml")
    }

    /// Load config from a TOML file, then apply environment overrides.
    ///
    /// Without an explicit path the default location is used when it exists;
    /// a missing default file is not an error.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        let mut config = match explicit {
            Some(path) => Self::from_file(path)?,
            None => {
                let path = Self::default_config_path();
                if path.exists() {
                    Self::from_file(&path)?
                } else {
                    Self::default()
                }
            }
        };

        config.apply_env_overrides()?;
        Ok(config)
    }

    /// Parse a TOML config file. Missing keys keep their defaults.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|e| {
            SyncError::config(format!("failed to read {}: {}", path.display(), e))
        })?;

        toml::from_str(&content).map_err(|e| {
            SyncError::config(format!("invalid TOML in {}: {}", path.display(), e))
        })
    }

    /// Apply `OBSIDIAN_SYNC_*` environment variables
    pub fn apply_env_overrides(&mut self) -> Result<()> {
        self.apply_overrides(|key| env::var(format!("{ENV_PREFIX}{key}")).ok())
    }

    fn apply_overrides<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(host) = lookup("HOST") {
            self.host = host;
        }
        if let Some(port) = lookup("PORT") {
            self.port = parse_value("PORT", &port)?;
        }
        if let Some(root) = lookup("CONTENT_ROOT") {
            self.content_root = PathBuf::from(root);
        }
        if let Some(root) = lookup("STATIC_ROOT") {
            self.static_root = PathBuf::from(root);
        }
        if let Some(level) = lookup("LOG_LEVEL") {
            self.log_level = level;
        }
        if let Some(prefix) = lookup("MEDIA_URL_PREFIX") {
            self.media_url_prefix = prefix;
        }
        if let Some(limit) = lookup("MAX_BODY_BYTES") {
            self.max_body_bytes = parse_value("MAX_BODY_BYTES", &limit)?;
        }
        if let Some(flag) = lookup("CORS_PERMISSIVE") {
            self.cors_permissive = parse_flag("CORS_PERMISSIVE", &flag)?;
        }
        if let Some(flag) = lookup("STRICT_ATTACHMENT_PATHS") {
            self.strict_attachment_paths = parse_flag("STRICT_ATTACHMENT_PATHS", &flag)?;
        }
        Ok(())
    }

    /// Socket address built from `host` and `port`
    pub fn bind_addr(&self) -> Result<SocketAddr> {
        format!("{}:{}", self.host, self.port)
            .parse()
            .map_err(|e| SyncError::config(format!("invalid bind address {}:{}: {}", self.host, self.port, e)))
    }

    /// `{static_root}/media`
    pub fn media_root(&self) -> PathBuf {
        self.static_root.join("media")
    }
}

fn parse_value<T>(key: &str, raw: &str) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    raw.trim()
        .parse()
        .map_err(|e| SyncError::config(format!("{ENV_PREFIX}{key}={raw}: {e}")))
}

fn parse_flag(key: &str, raw: &str) -> Result<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(SyncError::config(format!(
            "{ENV_PREFIX}{key}={raw}: expected true or false"
        ))),
    }
}
