//! Application configuration for collaborators of the client.
//!
//! The client itself only accepts plain constructor arguments. Tools built
//! on top of it (the CLI, desktop viewers) load an `AppConfig` from a TOML
//! file and the `SA_*` environment variables, then hand the resolved values
//! to the client.

use std::fmt;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::constants;
use crate::error::{SaError, SaResult};
use crate::platform::Platform;

/// Top-level configuration file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// API credentials.
    #[serde(default)]
    pub credentials: CredentialsConfig,

    /// Server connection settings.
    #[serde(default)]
    pub server: ServerConfig,

    /// Logging settings.
    #[serde(default)]
    pub logging: LoggingConfig,

    /// Defaults applied to commands.
    #[serde(default)]
    pub defaults: DefaultsConfig,
}

/// API credentials. Both are required for export and admin endpoints.
#[derive(Clone, Default, Serialize, Deserialize)]
pub struct CredentialsConfig {
    /// API key, conventionally starting with `sa_api_key_`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    /// User id, conventionally starting with `sa_user_id_`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
}

impl fmt::Debug for CredentialsConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let shown = |v: &Option<String>| if v.is_some() { "<set>" } else { "<unset>" };
        f.debug_struct("CredentialsConfig")
            .field("api_key", &shown(&self.api_key))
            .field("user_id", &shown(&self.user_id))
            .finish()
    }
}

/// Server connection configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// API origin.
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Request timeout in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Custom `User-Agent`; the client default is used when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_agent: Option<String>,
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level: trace, debug, info, warn, error.
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Directory for log files. If empty, uses the platform default.
    #[serde(default)]
    pub directory: String,

    /// Write JSON lines to the log file.
    #[serde(default)]
    pub json_output: bool,
}

/// Defaults for commands that take a hostname.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DefaultsConfig {
    /// Website to query when none is given on the command line.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hostname: Option<String>,

    /// Timezone sent with stats and export queries.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timezone: Option<String>,
}

fn default_base_url() -> String {
    constants::DEFAULT_BASE_URL.to_string()
}

fn default_timeout_secs() -> u64 {
    constants::DEFAULT_TIMEOUT_SECS
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout_secs: default_timeout_secs(),
            user_agent: None,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            directory: String::new(),
            json_output: false,
        }
    }
}

impl AppConfig {
    /// Load from the default path, falling back to defaults if it is missing.
    pub fn load_default() -> SaResult<Self> {
        let path = Self::default_config_path()?;
        if path.exists() {
            Self::load_from_file(&path)
        } else {
            Ok(Self::default())
        }
    }

    /// Load configuration from a specific file path.
    pub fn load_from_file(path: &Path) -> SaResult<Self> {
        let contents = std::fs::read_to_string(path)?;
        let config: AppConfig = toml::from_str(&contents)?;
        Ok(config)
    }

    /// Save configuration to a specific file path.
    pub fn save_to_file(&self, path: &Path) -> SaResult<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let contents = toml::to_string_pretty(self)
            .map_err(|e| SaError::Config(format!("failed to serialize config: {e}")))?;
        std::fs::write(path, contents)?;
        Ok(())
    }

    /// Default configuration file path.
    pub fn default_config_path() -> SaResult<PathBuf> {
        Ok(Platform::config_dir()?.join("config.toml"))
    }

    /// Effective log directory, using the configured path or the default.
    pub fn effective_log_dir(&self) -> SaResult<PathBuf> {
        if self.logging.directory.is_empty() {
            Platform::log_dir()
        } else {
            Ok(PathBuf::from(&self.logging.directory))
        }
    }

    /// Apply `SA_API_KEY`, `SA_USER_ID` and `SA_HOSTNAME` from the process
    /// environment. Empty variables are ignored.
    pub fn apply_env(&mut self) {
        self.apply_env_from(|name| std::env::var(name).ok());
    }

    /// Apply overrides from an arbitrary variable source.
    pub fn apply_env_from<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        if let Some(key) = non_empty(constants::env::API_KEY) {
            self.credentials.api_key = Some(key.trim().to_string());
        }
        if let Some(user) = non_empty(constants::env::USER_ID) {
            self.credentials.user_id = Some(user.trim().to_string());
        }
        if let Some(host) = non_empty(constants::env::HOSTNAME) {
            self.defaults.hostname = Some(host.trim().to_string());
        }
    }

    /// Whether both credentials are present.
    pub fn has_credentials(&self) -> bool {
        let present = |v: &Option<String>| v.as_deref().is_some_and(|s| !s.trim().is_empty());
        present(&self.credentials.api_key) && present(&self.credentials.user_id)
    }

    /// Normalize a user-supplied base URL.
    ///
    /// Trims whitespace and quotes, defaults the scheme to https, and strips
    /// trailing slashes.
    pub fn sanitize_base_url(address: &str) -> String {
        let bare = address.trim().trim_matches('"').trim().trim_end_matches('/');
        match bare {
            "" => String::new(),
            url if url.starts_with("http://") || url.starts_with("https://") => url.to_owned(),
            host => format!("https://{host}"),
        }
    }
}
