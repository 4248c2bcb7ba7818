//! Console configuration.
//!
//! Settings come from an optional TOML file, then environment variables
//! override individual fields:
//!
//! | Variable | Field |
//! |---|---|
//! | `RURAL_HEALTH_CONFIG` | path of the TOML file (default `rural_health.toml`) |
//! | `RURAL_HEALTH_API_URL` | `api_base_url` |
//! | `RURAL_HEALTH_SESSION_PATH` | `session_path` |

use std::path::{Path, PathBuf};
use std::time::Duration;

use rural_health_client::ClientConfig;
use rural_health_client::http::{DEFAULT_BASE_URL, DEFAULT_TIMEOUT};
use serde::Deserialize;

/// Environment variable naming the config file.
pub const CONFIG_PATH_ENV: &str = "RURAL_HEALTH_CONFIG";

/// Environment variable overriding the service root.
pub const API_URL_ENV: &str = "RURAL_HEALTH_API_URL";

/// Environment variable overriding the session file location.
pub const SESSION_PATH_ENV: &str = "RURAL_HEALTH_SESSION_PATH";

/// Config file read when [`CONFIG_PATH_ENV`] is unset.
pub const DEFAULT_CONFIG_PATH: &str = "rural_health.toml";

/// Errors loading the configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// The config file could not be read.
    #[error("Failed to read config {}: {source}", .path.display())]
    Io {
        /// File that failed.
        path: PathBuf,
        /// Underlying error.
        source: std::io::Error,
    },

    /// The config file is not valid TOML for [`ConsoleConfig`].
    #[error("Invalid config {}: {source}", .path.display())]
    Parse {
        /// File that failed.
        path: PathBuf,
        /// Underlying error.
        source: toml::de::Error,
    },
}

/// Resolved console settings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ConsoleConfig {
    /// Analytics service root.
    pub api_base_url: String,
    /// Per-request timeout in seconds.
    pub request_timeout_secs: u64,
    /// Where the session is persisted between runs.
    pub session_path: PathBuf,
    /// Allocation batch the driver dashboard routes by default.
    pub batch_id: i64,
}

impl Default for ConsoleConfig {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_BASE_URL.to_string(),
            request_timeout_secs: DEFAULT_TIMEOUT.as_secs(),
            session_path: PathBuf::from("data/session.toml"),
            batch_id: 1,
        }
    }
}

impl ConsoleConfig {
    /// Loads the config from the file and environment.
    ///
    /// A missing default config file is not an error; a missing file named
    /// by [`CONFIG_PATH_ENV`] is.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if the file cannot be read or parsed.
    pub fn load() -> Result<Self, ConfigError> {
        let explicit = std::env::var(CONFIG_PATH_ENV).ok();
        let path = PathBuf::from(explicit.as_deref().unwrap_or(DEFAULT_CONFIG_PATH));

        let mut config = Self::from_file(&path, explicit.is_some())?;
        config.apply_overrides(|key| std::env::var(key).ok());
        Ok(config)
    }

    /// Reads `path`, falling back to defaults when it does not exist and
    /// `required` is `false`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if the file cannot be read or parsed.
    pub fn from_file(path: &Path, required: bool) -> Result<Self, ConfigError> {
        let contents = match std::fs::read_to_string(path) {
            Ok(contents) => contents,
            Err(e) if !required && e.kind() == std::io::ErrorKind::NotFound => {
                log::debug!("No config at {}, using defaults", path.display());
                return Ok(Self::default());
            }
            Err(source) => {
                return Err(ConfigError::Io {
                    path: path.to_path_buf(),
                    source,
                });
            }
        };

        toml::from_str(&contents).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Applies environment overrides, looked up through `lookup`.
    /// Empty values are ignored.
    pub fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        let get = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        if let Some(url) = get(API_URL_ENV) {
            self.api_base_url = url;
        }
        if let Some(path) = get(SESSION_PATH_ENV) {
            self.session_path = PathBuf::from(path);
        }
    }

    /// Connection settings for the analytics client.
    #[must_use]
    pub fn client_config(&self) -> ClientConfig {
        ClientConfig {
            base_url: self.api_base_url.clone(),
            timeout: Duration::from_secs(self.request_timeout_secs),
        }
    }
}
