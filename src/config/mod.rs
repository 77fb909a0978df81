//! Configuration management.
//!
//! Configuration is layered: built-in defaults, then an optional TOML file,
//! then environment variables prefixed with `COLABFIT_MCP` (nested keys are
//! separated by `__`, e.g. `COLABFIT_MCP_API__BASE_URL`). `COLABFIT_USERNAME`
//! and `COLABFIT_PASSWORD` are applied last and win over every other layer.

mod file_config;

pub use file_config::{write_default_config, ConfigFileError};

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Base URL of the ColabFit MCP endpoints
pub const DEFAULT_BASE_URL: &str = "https://materials.colabfit.org/mcp";

/// Credentials the ColabFit service publishes for MCP tool access
const DEFAULT_USERNAME: &str = "mcp-tool";
const DEFAULT_PASSWORD: &str = "mcp-secret";

/// Size of the write buffer used while streaming downloads to disk
pub const DEFAULT_CHUNK_SIZE: usize = 10_000_000;

const ENV_PREFIX: &str = "COLABFIT_MCP";

const USERNAME_VAR: &str = "COLABFIT_USERNAME";
const PASSWORD_VAR: &str = "COLABFIT_PASSWORD";

/// Application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Remote service endpoint and credentials
    #[serde(default)]
    pub api: ApiConfig,

    /// Download settings
    #[serde(default)]
    pub downloads: DownloadConfig,

    /// HTTP client settings
    #[serde(default)]
    pub http: HttpConfig,

    /// Logging settings
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Remote service configuration
#[derive(Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Never written out by `init-config`
    #[serde(default = "default_username", skip_serializing)]
    pub username: String,

    #[serde(default = "default_password", skip_serializing)]
    pub password: String,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            username: default_username(),
            password: default_password(),
        }
    }
}

impl std::fmt::Debug for ApiConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiConfig")
            .field("base_url", &self.base_url)
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

fn default_username() -> String {
    DEFAULT_USERNAME.to_string()
}

fn default_password() -> String {
    DEFAULT_PASSWORD.to_string()
}

impl ApiConfig {
    /// Replace the credentials with any non-empty value `lookup` returns
    fn apply_credential_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(username) = lookup(USERNAME_VAR).filter(|v| !v.is_empty()) {
            self.username = username;
        }
        if let Some(password) = lookup(PASSWORD_VAR).filter(|v| !v.is_empty()) {
            self.password = password;
        }
    }
}

/// Download configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DownloadConfig {
    /// Directory downloaded datasets are written to.
    /// Falls back to the platform download directory when unset.
    #[serde(default)]
    pub directory: Option<PathBuf>,

    /// Write buffer size in bytes
    #[serde(default = "default_chunk_size")]
    pub chunk_size: usize,
}

impl Default for DownloadConfig {
    fn default() -> Self {
        Self {
            directory: None,
            chunk_size: default_chunk_size(),
        }
    }
}

fn default_chunk_size() -> usize {
    DEFAULT_CHUNK_SIZE
}

/// HTTP client configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HttpConfig {
    /// Overall request timeout. Unset means requests may run indefinitely,
    /// which large dataset downloads rely on.
    #[serde(default)]
    pub timeout_secs: Option<u64>,

    #[serde(default = "default_connect_timeout")]
    pub connect_timeout_secs: u64,

    #[serde(default)]
    pub user_agent: Option<String>,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout_secs: None,
            connect_timeout_secs: default_connect_timeout(),
            user_agent: None,
        }
    }
}

fn default_connect_timeout() -> u64 {
    30
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,

    /// `"json"` for structured output, anything else for human-readable lines
    #[serde(default)]
    pub format: Option<String>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: None,
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

impl LoggingConfig {
    pub fn is_json(&self) -> bool {
        self.format
            .as_deref()
            .is_some_and(|f| f.eq_ignore_ascii_case("json"))
    }
}

/// Load configuration from an optional file plus the environment
pub fn load_config(path: Option<&Path>) -> Result<Config, config::ConfigError> {
    load_config_with(path, |name| std::env::var(name).ok())
}

fn load_config_with(
    path: Option<&Path>,
    lookup: impl Fn(&str) -> Option<String>,
) -> Result<Config, config::ConfigError> {
    let mut builder = config::Config::builder();

    if let Some(path) = path {
        builder = builder.add_source(config::File::from(path));
    }

    let settings = builder
        .add_source(
            config::Environment::with_prefix(ENV_PREFIX)
                .prefix_separator("_")
                .separator("__"),
        )
        .build()?;

    let mut config: Config = settings.try_deserialize()?;
    config.api.apply_credential_overrides(lookup);
    Ok(config)
}

/// Default location of the configuration file
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("colabfit-mcp").join("config.toml"))
}

/// Find an existing configuration file in the default location
pub fn find_config_file() -> Option<PathBuf> {
    default_config_path().filter(|path| path.is_file())
}
