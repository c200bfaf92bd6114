//! TOML Configuration File Support
//!
//! Configuration for the mini-app core, with an optional TOML file at
//! `~/.config/nightlab/miniapp.toml`.
//!
//! # Configuration Priority
//!
//! Values are loaded with the following priority (highest first):
//! 1. CLI arguments (via [`ConfigOverrides`])
//! 2. Environment variables
//! 3. TOML configuration file
//! 4. Default values
//!
//! # Example Configuration
//!
//! ```toml
//! [api]
//! base_url = "https://api.nightlab.example.com"
//! timeout_secs = 30
//! identity_header = "X-Init-Data"
//!
//! [lists]
//! page_size = 20
//! notifications_limit = 50
//!
//! [links]
//! support_handle = "nightlab_support"
//! ```

use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Default API origin
pub const DEFAULT_API_URL: &str = "https://api.nightlab.example.com";

// =============================================================================
// Error Types
// =============================================================================

/// Errors that can occur when loading configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to read config file
    #[error("Failed to read config file at {path}: {source}")]
    ReadError {
        /// The path that was attempted
        path: PathBuf,
        /// The underlying IO error
        source: std::io::Error,
    },

    /// Failed to parse TOML
    #[error("Failed to parse TOML config: {0}")]
    ParseError(#[from] toml::de::Error),

    /// Invalid configuration value
    #[error("Invalid configuration: {0}")]
    ValidationError(String),
}

// =============================================================================
// Configuration Source Tracking
// =============================================================================

/// Tracks where a configuration value came from
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConfigSource {
    /// Value from command-line argument
    Cli,
    /// Value from environment variable
    Env,
    /// Value from TOML configuration file
    File,
    /// Default value
    Default,
}

impl std::fmt::Display for ConfigSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Cli => write!(f, "CLI"),
            Self::Env => write!(f, "environment"),
            Self::File => write!(f, "config file"),
            Self::Default => write!(f, "default"),
        }
    }
}

// =============================================================================
// TOML Configuration Structures
// =============================================================================

/// `[api]` section
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiToml {
    /// API origin
    pub base_url: Option<String>,
    /// Request timeout in seconds
    pub timeout_secs: Option<u64>,
    /// Header carrying the identity token
    pub identity_header: Option<String>,
}

/// `[lists]` section
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ListsToml {
    /// Applications per page
    pub page_size: Option<usize>,
    /// Notifications fetched at once
    pub notifications_limit: Option<usize>,
}

/// `[links]` section
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct LinksToml {
    /// Support account handle (without `@`)
    pub support_handle: Option<String>,
}

/// Top-level TOML configuration structure
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct MiniAppToml {
    /// API section
    pub api: ApiToml,
    /// Lists section
    pub lists: ListsToml,
    /// Links section
    pub links: LinksToml,
}

// =============================================================================
// Main Configuration Struct
// =============================================================================

/// Resolved configuration for the mini-app core
#[derive(Clone, Debug)]
pub struct MiniAppConfig {
    /// API origin, injected at boot
    pub api_base_url: String,

    /// Per-request timeout
    pub request_timeout: Duration,

    /// Header carrying the identity token
    pub identity_header: String,

    /// Applications per page
    pub page_size: usize,

    /// Notifications fetched at once
    pub notifications_limit: usize,

    /// Support account handle (without `@`)
    pub support_handle: String,

    /// Path to the config file that was loaded (if any)
    pub config_file_path: Option<PathBuf>,

    /// Source of configuration values
    source: ConfigSource,
}

impl Default for MiniAppConfig {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_API_URL.to_string(),
            request_timeout: Duration::from_secs(30),
            identity_header: "X-Init-Data".to_string(),
            page_size: 20,
            notifications_limit: 50,
            support_handle: "nightlab_support".to_string(),
            config_file_path: None,
            source: ConfigSource::Default,
        }
    }
}

impl MiniAppConfig {
    /// Create a new configuration with default values
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Configuration pointing at a specific API origin
    #[must_use]
    pub fn with_api_url(api_base_url: impl Into<String>) -> Self {
        Self {
            api_base_url: api_base_url.into(),
            ..Self::default()
        }
    }

    /// Get the primary source of this configuration
    #[must_use]
    pub fn source(&self) -> ConfigSource {
        self.source
    }

    /// Set the configuration source
    pub fn set_source(&mut self, source: ConfigSource) {
        self.source = source;
    }

    /// Check values that would otherwise fail later at request time
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::ValidationError`] for a non-http(s) base URL or a
    /// zero page size / notifications limit.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let url = reqwest::Url::parse(&self.api_base_url).map_err(|e| {
            ConfigError::ValidationError(format!("api base url {:?}: {e}", self.api_base_url))
        })?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(ConfigError::ValidationError(format!(
                "api base url must be http or https, got {}",
                url.scheme()
            )));
        }
        if self.page_size == 0 {
            return Err(ConfigError::ValidationError(
                "page_size must be greater than zero".to_string(),
            ));
        }
        if self.notifications_limit == 0 {
            return Err(ConfigError::ValidationError(
                "notifications_limit must be greater than zero".to_string(),
            ));
        }
        if self.identity_header.trim().is_empty() {
            return Err(ConfigError::ValidationError(
                "identity_header must not be empty".to_string(),
            ));
        }
        Ok(())
    }
}

// =============================================================================
// Configuration Loading
// =============================================================================

/// Get the default configuration file path
///
/// Returns `$XDG_CONFIG_HOME/nightlab/miniapp.toml` or
/// `~/.config/nightlab/miniapp.toml` if `XDG_CONFIG_HOME` is not set.
#[must_use]
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|p| p.join("nightlab").join("miniapp.toml"))
}

/// Load configuration from all sources with proper priority
///
/// # Errors
///
/// Returns an error if the config file exists but cannot be parsed, or the
/// resulting configuration is invalid. A missing file is not an error.
pub fn load_config() -> Result<MiniAppConfig, ConfigError> {
    load_config_from_path(default_config_path())
}

/// Load configuration from a specific path
///
/// # Errors
///
/// Returns an error if the specified config file cannot be read or parsed,
/// or the resulting configuration is invalid.
pub fn load_config_from_path(path: Option<PathBuf>) -> Result<MiniAppConfig, ConfigError> {
    let mut config = MiniAppConfig::default();

    if let Some(ref config_path) = path {
        if config_path.exists() {
            let toml_content =
                std::fs::read_to_string(config_path).map_err(|e| ConfigError::ReadError {
                    path: config_path.clone(),
                    source: e,
                })?;

            let toml_config: MiniAppToml = toml::from_str(&toml_content)?;
            apply_toml_config(&mut config, &toml_config);
            config.config_file_path = Some(config_path.clone());
            config.source = ConfigSource::File;

            tracing::info!(
                path = %config_path.display(),
                "Loaded configuration from file"
            );
        } else {
            tracing::debug!(
                path = %config_path.display(),
                "Config file not found, using defaults"
            );
        }
    }

    apply_env_config(&mut config);
    config.validate()?;

    Ok(config)
}

/// Apply TOML configuration values to the config struct
fn apply_toml_config(config: &mut MiniAppConfig, toml: &MiniAppToml) {
    if let Some(ref url) = toml.api.base_url {
        config.api_base_url = url.clone();
    }
    if let Some(secs) = toml.api.timeout_secs {
        config.request_timeout = Duration::from_secs(secs);
    }
    if let Some(ref header) = toml.api.identity_header {
        config.identity_header = header.clone();
    }

    if let Some(size) = toml.lists.page_size {
        config.page_size = size;
    }
    if let Some(limit) = toml.lists.notifications_limit {
        config.notifications_limit = limit;
    }

    if let Some(ref handle) = toml.links.support_handle {
        config.support_handle = handle.trim_start_matches('@').to_string();
    }
}

/// Apply environment variable overrides to the config
fn apply_env_config(config: &mut MiniAppConfig) {
    if let Ok(url) = std::env::var("NIGHTLAB_API_URL") {
        config.api_base_url = url;
        config.source = ConfigSource::Env;
    }
    if let Ok(timeout) = std::env::var("NIGHTLAB_API_TIMEOUT") {
        if let Ok(secs) = timeout.parse::<u64>() {
            config.request_timeout = Duration::from_secs(secs);
            config.source = ConfigSource::Env;
        }
    }
    if let Ok(size) = std::env::var("NIGHTLAB_PAGE_SIZE") {
        if let Ok(n) = size.parse::<usize>() {
            config.page_size = n;
            config.source = ConfigSource::Env;
        }
    }
    if let Ok(limit) = std::env::var("NIGHTLAB_NOTIFICATIONS_LIMIT") {
        if let Ok(n) = limit.parse::<usize>() {
            config.notifications_limit = n;
            config.source = ConfigSource::Env;
        }
    }
    if let Ok(handle) = std::env::var("NIGHTLAB_SUPPORT_HANDLE") {
        config.support_handle = handle.trim_start_matches('@').to_string();
        config.source = ConfigSource::Env;
    }
}

// =============================================================================
// CLI Override Support
// =============================================================================

/// Builder for applying CLI overrides to configuration
///
/// Use this after [`load_config`] to apply command-line argument overrides.
#[derive(Clone, Debug, Default)]
pub struct ConfigOverrides {
    /// API origin override
    pub api_base_url: Option<String>,

    /// Request timeout override (seconds)
    pub timeout_secs: Option<u64>,

    /// Page size override
    pub page_size: Option<usize>,
}

impl ConfigOverrides {
    /// Create a new empty set of overrides
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set API origin override
    #[must_use]
    pub fn with_api_base_url(mut self, url: String) -> Self {
        self.api_base_url = Some(url);
        self
    }

    /// Set request timeout override
    #[must_use]
    pub fn with_timeout_secs(mut self, secs: u64) -> Self {
        self.timeout_secs = Some(secs);
        self
    }

    /// Set page size override
    #[must_use]
    pub fn with_page_size(mut self, size: usize) -> Self {
        self.page_size = Some(size);
        self
    }

    /// Apply overrides to a configuration
    pub fn apply(&self, config: &mut MiniAppConfig) {
        if self.api_base_url.is_some() || self.timeout_secs.is_some() || self.page_size.is_some()
        {
            config.source = ConfigSource::Cli;
        }

        if let Some(ref url) = self.api_base_url {
            config.api_base_url = url.clone();
        }

        if let Some(secs) = self.timeout_secs {
            config.request_timeout = Duration::from_secs(secs);
        }

        if let Some(size) = self.page_size {
            config.page_size = size;
        }
    }
}

// =============================================================================
// Tests
// =============================================================================
