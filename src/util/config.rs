//! Configuration file support for ngjest.
//!
//! Two configuration file locations are read:
//! - Global: `<config dir>/ngjest/config.toml` - User-wide defaults
//! - Project: `.ngjest/config.toml` in the workspace root - Project overrides
//!
//! Project config takes precedence over global config; the `--registry` flag
//! takes precedence over both.
//!
//! ```toml
//! [registry]
//! url = "https://registry.npmjs.org"
//! user_agent = "ngjest/0.1.0"
//! ```

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use url::Url;

/// Default npm registry.
pub const DEFAULT_REGISTRY_URL: &str = "https://registry.npmjs.org";

/// ngjest configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Registry settings
    pub registry: RegistryConfig,
}

/// Registry-related configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RegistryConfig {
    /// Base URL of the npm registry (None = registry.npmjs.org)
    pub url: Option<String>,

    /// User-Agent header sent with metadata requests
    pub user_agent: Option<String>,
}

impl Config {
    /// Load configuration from a file.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config file: {}", path.display()))?;

        toml::from_str(&contents)
            .with_context(|| format!("failed to parse config file: {}", path.display()))
    }

    /// Load configuration with fallback to defaults if file doesn't exist.
    pub fn load_or_default(path: &Path) -> Self {
        if path.exists() {
            Self::load(path).unwrap_or_else(|e| {
                tracing::warn!("Failed to load config from {}: {:#}", path.display(), e);
                Self::default()
            })
        } else {
            Self::default()
        }
    }

    /// Merge another config into this one (other takes precedence).
    pub fn merge(&mut self, other: Config) {
        if other.registry.url.is_some() {
            self.registry.url = other.registry.url;
        }
        if other.registry.user_agent.is_some() {
            self.registry.user_agent = other.registry.user_agent;
        }
    }

    /// The registry URL to query, validated.
    pub fn registry_url(&self) -> Result<Url> {
        let raw = self.registry.url.as_deref().unwrap_or(DEFAULT_REGISTRY_URL);
        parse_registry_url(raw)
    }

    /// The User-Agent header to send.
    pub fn user_agent(&self) -> String {
        self.registry
            .user_agent
            .clone()
            .unwrap_or_else(|| format!("ngjest/{}", env!("CARGO_PKG_VERSION")))
    }
}

/// Parse and validate a registry base URL.
pub fn parse_registry_url(raw: &str) -> Result<Url> {
    let url = Url::parse(raw).with_context(|| format!("invalid registry URL `{}`", raw))?;
    match url.scheme() {
        "http" | "https" => Ok(url),
        scheme => anyhow::bail!(
            "invalid registry URL `{}`: unsupported scheme `{}`, expected http or https",
            raw,
            scheme
        ),
    }
}

/// Load merged configuration from global and project locations.
///
/// Order of precedence (highest to lowest):
/// 1. Project config (.ngjest/config.toml)
/// 2. Global config
/// 3. Defaults
pub fn load_config(global_path: Option<&Path>, project_path: &Path) -> Config {
    let mut config = Config::default();

    if let Some(global_path) = global_path {
        config.merge(Config::load_or_default(global_path));
    }

    config.merge(Config::load_or_default(project_path));

    config
}

/// Get the project config path (.ngjest/config.toml).
pub fn project_config_path(workspace_root: &Path) -> PathBuf {
    workspace_root.join(".ngjest").join("config.toml")
}
