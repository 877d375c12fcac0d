use std::path::{Path, PathBuf};

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const DEFAULT_BACKEND_URL: &str = "http://localhost:8000";
pub const DEFAULT_PUBLIC_URL: &str = "http://localhost:3000";
pub const ENV_PREFIX: &str = "FINQA_";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Invalid configuration: {0}")]
    Load(#[from] Box<figment::Error>),

    #[error("Failed to render configuration: {0}")]
    Render(#[from] toml::ser::Error),
}

/// Top-level application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub relay: RelayConfig,
    pub tui: TuiConfig,
    pub data: DataConfig,
}

/// Where the relay listens.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

/// Relay-to-backend settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RelayConfig {
    /// Backend-facing URL. Takes precedence over `base_api_url`.
    pub backend_api_url: Option<String>,
    /// Public-facing URL, also used as the backend fallback.
    pub base_api_url: Option<String>,
    /// Per-request timeout for backend calls, in seconds.
    pub timeout_secs: u64,
    /// Largest accepted upload body, in bytes.
    pub max_upload_bytes: usize,
}

/// TUI-specific configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TuiConfig {
    /// Tick interval in milliseconds for the event loop.
    pub tick_rate_ms: u64,
    /// How long a notification stays visible.
    pub toast_duration_ms: u64,
    /// Relay the terminal client talks to. Falls back to the public URL.
    pub relay_url: Option<String>,
}

/// Data directory configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DataConfig {
    /// Override the default data directory.
    pub data_dir: Option<PathBuf>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 3000,
        }
    }
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            backend_api_url: None,
            base_api_url: None,
            timeout_secs: 120,
            max_upload_bytes: 50 * 1024 * 1024,
        }
    }
}

impl Default for TuiConfig {
    fn default() -> Self {
        Self {
            tick_rate_ms: 100,
            toast_duration_ms: 3000,
            relay_url: None,
        }
    }
}

fn non_blank(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

impl RelayConfig {
    /// Backend URL: explicit backend URL, then the public URL, then localhost.
    pub fn backend_url(&self) -> String {
        non_blank(&self.backend_api_url)
            .or_else(|| non_blank(&self.base_api_url))
            .unwrap_or(DEFAULT_BACKEND_URL)
            .to_string()
    }

    pub fn public_url(&self) -> String {
        non_blank(&self.base_api_url)
            .unwrap_or(DEFAULT_PUBLIC_URL)
            .to_string()
    }
}

impl AppConfig {
    /// Layered sources: defaults, then the TOML file, then `FINQA_*` env vars.
    ///
    /// `FINQA_RELAY__TIMEOUT_SECS=30` sets `relay.timeout_secs`. The two
    /// deployment knobs `FINQA_BACKEND_API_URL` and `FINQA_BASE_API_URL` map
    /// straight onto the `relay` section.
    pub fn figment(path: Option<&Path>) -> Figment {
        let path = path.map(Path::to_path_buf).unwrap_or_else(Self::config_path);

        Figment::from(Serialized::defaults(AppConfig::default()))
            .merge(Toml::file(path))
            .merge(
                Env::prefixed(ENV_PREFIX)
                    .ignore(&["backend_api_url", "base_api_url"])
                    .split("__"),
            )
            .merge(
                Env::prefixed(ENV_PREFIX)
                    .only(&["backend_api_url", "base_api_url"])
                    .map(|key| format!("relay.{key}").into()),
            )
    }

    /// Load configuration, `~/.config/finqa/config.toml` unless `path` is given.
    /// A missing file is not an error.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let config: Self = Self::figment(path).extract().map_err(Box::new)?;
        log::debug!("Configuration resolved, backend at {}", config.relay.backend_url());
        Ok(config)
    }

    /// URL the terminal client uses to reach the relay.
    pub fn relay_url(&self) -> String {
        non_blank(&self.tui.relay_url)
            .map(str::to_string)
            .unwrap_or_else(|| self.relay.public_url())
    }

    /// Resolved data directory (override or XDG default).
    pub fn data_dir(&self) -> PathBuf {
        self.data.data_dir.clone().unwrap_or_else(|| {
            dirs::data_dir()
                .map(|d| d.join("finqa"))
                .unwrap_or_else(|| PathBuf::from("data"))
        })
    }

    pub fn to_toml(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }

    pub fn config_path() -> PathBuf {
        dirs::config_dir()
            .map(|d| d.join("finqa").join("config.toml"))
            .unwrap_or_else(|| PathBuf::from("config.toml"))
    }
}
