use serde::Deserialize;
use std::fs;
use std::io::ErrorKind;
use std::path::Path;
use std::time::Duration;

use crate::error::ConfigError;
use crate::services::CommitPolicy;

/// Poll period of the dashboard (5 seconds).
pub const UPDATE_TIME: Duration = Duration::from_millis(5000);

pub const BACKEND_PORT: u16 = 9000;
pub const SUPPLY_INFO_PATH: &str = "supply_info";
pub const DEFAULT_CONFIG_PATH: &str = "config.toml";

#[derive(Debug, Deserialize, Clone, Default)]
pub struct Config {
    #[serde(default)]
    pub backend: BackendConfig,
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub poller: PollerConfig,
}

/// Where the supply info backend lives.
#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
pub struct BackendConfig {
    #[serde(default = "default_scheme")]
    pub scheme: String,
    #[serde(default = "default_backend_host")]
    pub host: String,
    #[serde(default = "default_backend_port")]
    pub port: u16,
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
}

#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    #[serde(default)]
    pub enabled: bool,
    #[serde(default = "default_server_host")]
    pub host: String,
    #[serde(default = "default_server_port")]
    pub port: u16,
}

#[derive(Debug, Deserialize, Clone, Default, PartialEq, Eq)]
pub struct PollerConfig {
    /// `latest_issued` (default) or `last_resolved`
    #[serde(default)]
    pub commit_policy: CommitPolicy,
}

fn default_scheme() -> String { "https".to_string() }
fn default_backend_host() -> String { "localhost".to_string() }
fn default_backend_port() -> u16 { BACKEND_PORT }
fn default_request_timeout() -> u64 { 10 }
fn default_server_host() -> String { "127.0.0.1".to_string() }
fn default_server_port() -> u16 { 3000 }

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            scheme: default_scheme(),
            host: default_backend_host(),
            port: default_backend_port(),
            request_timeout_secs: default_request_timeout(),
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            host: default_server_host(),
            port: default_server_port(),
        }
    }
}

impl BackendConfig {
    /// Full URL of the supply info endpoint, e.g. `https://localhost:9000/supply_info`.
    pub fn endpoint_url(&self) -> String {
        format!("{}://{}:{}/{}", self.scheme, self.host, self.port, SUPPLY_INFO_PATH)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

impl Config {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path)?;
        Self::parse(&content)
    }

    pub fn parse(content: &str) -> Result<Self, ConfigError> {
        let config: Config = toml::from_str(content)?;
        Ok(config)
    }

    /// Like [`Config::load`], but a missing file means defaults.
    pub fn load_or_default(path: &Path) -> Result<Self, ConfigError> {
        match Self::load(path) {
            Err(ConfigError::Io(e)) if e.kind() == ErrorKind::NotFound => {
                tracing::debug!("No config at {}, using defaults", path.display());
                Ok(Self::default())
            }
            other => other,
        }
    }
}
