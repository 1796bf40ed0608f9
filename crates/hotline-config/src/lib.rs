//! Configuration management for hotline.
//!
//! Parses `hotline.toml` configuration files with serde and provides
//! auto-discovery of config files in parent directories.
//!
//! CLI settings can be applied during load via [`CliSettings`].
//!
//! ## Environment Variable Expansion
//!
//! String configuration values support environment variable expansion:
//!
//! - `${VAR}` - expands to the value of VAR, errors if unset
//! - `${VAR:-default}` - expands to VAR if set, otherwise uses default
//!
//! Expanded fields:
//! - `client.url`
//! - `reload.command`

mod expand;

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;

/// CLI settings that override configuration file values.
///
/// All fields are optional. Only non-None values override the loaded config.
#[derive(Debug, Default)]
pub struct CliSettings {
    /// Override the page URL.
    pub url: Option<String>,
    /// Override the retry delay in milliseconds.
    pub retry_delay_ms: Option<u64>,
    /// Override the reload command.
    pub command: Option<String>,
}

/// Configuration filename to search for.
const CONFIG_FILENAME: &str = "hotline.toml";

/// Upper bound for `client.retry_delay_ms`.
const MAX_RETRY_DELAY_MS: u64 = 60_000;

/// Application configuration.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Client configuration.
    pub client: ClientConfig,
    /// Reload hook configuration.
    pub reload: ReloadConfig,

    /// Path to the config file (set after loading).
    #[serde(skip)]
    pub config_path: Option<PathBuf>,
}

/// Live reload client configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// URL of the page served by the development server.
    pub url: String,
    /// Delay between an unexpected disconnect and the next attempt.
    pub retry_delay_ms: u64,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            url: "http://127.0.0.1:7979".to_owned(),
            retry_delay_ms: 2000,
        }
    }
}

impl ClientConfig {
    /// Retry delay as a [`Duration`].
    #[must_use]
    pub fn retry_delay(&self) -> Duration {
        Duration::from_millis(self.retry_delay_ms)
    }
}

/// Actions performed when the page reloads.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct ReloadConfig {
    /// Shell command run on every reload.
    pub command: Option<String>,
    /// Clear the terminal before running the command.
    pub clear_screen: bool,
}

/// Configuration error.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// File not found.
    #[error("Configuration file not found: {}", .0.display())]
    NotFound(PathBuf),
    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    /// TOML parsing error.
    #[error("TOML parse error: {0}")]
    Parse(#[from] toml::de::Error),
    /// Validation error.
    #[error("Configuration error: {0}")]
    Validation(String),
    /// Environment variable error during expansion.
    #[error("Environment variable error in {field}: {message}")]
    EnvVar {
        /// Config field path (e.g., "`client.url`").
        field: String,
        /// Error message (e.g., "${`DEV_HOST`} not set").
        message: String,
    },
}

/// Require a string field to be non-empty.
fn require_non_empty(value: &str, field: &str) -> Result<(), ConfigError> {
    if value.is_empty() {
        return Err(ConfigError::Validation(format!("{field} cannot be empty")));
    }
    Ok(())
}

/// Require a URL field to use an HTTP or WebSocket scheme.
fn require_page_url(url: &str, field: &str) -> Result<(), ConfigError> {
    const SCHEMES: [&str; 4] = ["http://", "https://", "ws://", "wss://"];

    // Schemes are case-insensitive.
    let has_scheme = |scheme: &str| {
        url.get(..scheme.len())
            .is_some_and(|prefix| prefix.eq_ignore_ascii_case(scheme))
    };

    if !SCHEMES.iter().any(|scheme| has_scheme(scheme)) {
        return Err(ConfigError::Validation(format!(
            "{field} must start with http://, https://, ws:// or wss://"
        )));
    }
    Ok(())
}

impl Config {
    /// Load configuration from file with optional CLI settings.
    ///
    /// If `config_path` is provided, loads from that file.
    /// Otherwise, searches for `hotline.toml` in current directory and parents.
    ///
    /// CLI settings are applied after loading, allowing CLI arguments to take
    /// precedence over config file values. The merged result is validated.
    ///
    /// # Errors
    ///
    /// Returns error if explicit `config_path` doesn't exist, parsing fails,
    /// or the merged configuration is invalid.
    pub fn load(
        config_path: Option<&Path>,
        cli_settings: Option<&CliSettings>,
    ) -> Result<Self, ConfigError> {
        let mut config = if let Some(path) = config_path {
            if !path.exists() {
                return Err(ConfigError::NotFound(path.to_path_buf()));
            }
            Self::load_from_file(path)?
        } else if let Some(discovered) = Self::discover_config() {
            Self::load_from_file(&discovered)?
        } else {
            Self::default()
        };

        if let Some(settings) = cli_settings {
            config.apply_cli_settings(settings);
        }

        config.validate()?;
        Ok(config)
    }

    /// Apply CLI settings to the configuration.
    fn apply_cli_settings(&mut self, settings: &CliSettings) {
        if let Some(url) = &settings.url {
            self.client.url.clone_from(url);
        }
        if let Some(retry_delay_ms) = settings.retry_delay_ms {
            self.client.retry_delay_ms = retry_delay_ms;
        }
        if let Some(command) = &settings.command {
            self.reload.command = Some(command.clone());
        }
    }

    /// Search for config file in current directory and parents.
    fn discover_config() -> Option<PathBuf> {
        let current = std::env::current_dir().ok()?;
        Self::discover_config_from(current)
    }

    /// Search for config file in `start` and its parents.
    fn discover_config_from(mut current: PathBuf) -> Option<PathBuf> {
        loop {
            let candidate = current.join(CONFIG_FILENAME);
            if candidate.exists() {
                return Some(candidate);
            }
            if !current.pop() {
                return None;
            }
        }
    }

    /// Load configuration from a specific file.
    fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let mut config: Self = toml::from_str(&content)?;

        config.expand_env_vars()?;
        config.config_path = Some(path.to_path_buf());

        Ok(config)
    }

    /// Validate configuration values.
    ///
    /// Called automatically by [`Config::load`] after CLI settings are applied.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Validation` if any validation fails.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.validate_client()?;
        self.validate_reload()?;
        Ok(())
    }

    /// Validate client configuration.
    fn validate_client(&self) -> Result<(), ConfigError> {
        require_non_empty(&self.client.url, "client.url")?;
        require_page_url(&self.client.url, "client.url")?;

        let delay = self.client.retry_delay_ms;
        if delay == 0 {
            return Err(ConfigError::Validation(
                "client.retry_delay_ms must be greater than 0".to_owned(),
            ));
        }
        if delay > MAX_RETRY_DELAY_MS {
            return Err(ConfigError::Validation(format!(
                "client.retry_delay_ms cannot exceed {MAX_RETRY_DELAY_MS}"
            )));
        }

        Ok(())
    }

    /// Validate reload configuration.
    fn validate_reload(&self) -> Result<(), ConfigError> {
        if let Some(ref command) = self.reload.command {
            require_non_empty(command.trim(), "reload.command")?;
        }
        Ok(())
    }

    /// Expand environment variable references in configuration strings.
    fn expand_env_vars(&mut self) -> Result<(), ConfigError> {
        self.client.url = expand::expand_env(&self.client.url, "client.url")?;

        if let Some(ref command) = self.reload.command {
            self.reload.command = Some(expand::expand_env(command, "reload.command")?);
        }

        Ok(())
    }
}
