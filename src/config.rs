//! Service configuration.
//!
//! Loaded from a JSON file (every field optional) and then overridden by
//! `GEOQUERY_*` environment variables.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing_subscriber::EnvFilter;

use crate::fetch::{PageLimits, DEFAULT_LIMIT, DEFAULT_MAX_FANOUT, MAX_LIMIT};

pub const DEFAULT_BIND: &str = "0.0.0.0:8080";
pub const DEFAULT_GEOCODER_URL: &str = "https://nominatim.openstreetmap.org";
pub const DEFAULT_USER_AGENT: &str = concat!("geoquery/", env!("CARGO_PKG_VERSION"));

pub const ENV_CONFIG: &str = "GEOQUERY_CONFIG";
pub const ENV_BIND: &str = "GEOQUERY_BIND";
pub const ENV_GEOCODER_URL: &str = "GEOQUERY_GEOCODER_URL";
pub const ENV_USER_AGENT: &str = "GEOQUERY_USER_AGENT";
pub const ENV_LOG: &str = "GEOQUERY_LOG";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("invalid config: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,

    #[serde(default)]
    pub geocoder: GeocoderConfig,

    #[serde(default)]
    pub query: QueryConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Listen address, e.g. `"127.0.0.1:8080"`.
    #[serde(default = "default_bind")]
    pub bind: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self { bind: default_bind() }
    }
}

fn default_bind() -> String {
    DEFAULT_BIND.to_string()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeocoderConfig {
    #[serde(default = "default_geocoder_url")]
    pub base_url: String,

    /// Nominatim's usage policy requires an identifying agent.
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

impl Default for GeocoderConfig {
    fn default() -> Self {
        Self {
            base_url: default_geocoder_url(),
            user_agent: default_user_agent(),
        }
    }
}

fn default_geocoder_url() -> String {
    DEFAULT_GEOCODER_URL.to_string()
}

fn default_user_agent() -> String {
    DEFAULT_USER_AGENT.to_string()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueryConfig {
    #[serde(default = "default_limit")]
    pub default_limit: u32,

    #[serde(default = "default_max_limit")]
    pub max_limit: u32,

    /// Upper bound on concurrent sub-queries per fetch.
    #[serde(default = "default_max_fanout")]
    pub max_fanout: usize,
}

impl QueryConfig {
    /// Pagination bounds for request parsing.
    pub fn page_limits(&self) -> PageLimits {
        PageLimits {
            default_limit: self.default_limit,
            max_limit: self.max_limit,
        }
    }
}

impl Default for QueryConfig {
    fn default() -> Self {
        Self {
            default_limit: default_limit(),
            max_limit: default_max_limit(),
            max_fanout: default_max_fanout(),
        }
    }
}

fn default_limit() -> u32 {
    DEFAULT_LIMIT
}

fn default_max_limit() -> u32 {
    MAX_LIMIT
}

fn default_max_fanout() -> usize {
    DEFAULT_MAX_FANOUT
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// `EnvFilter` directives; `RUST_LOG` takes precedence when set.
    #[serde(default = "default_log_filter")]
    pub filter: String,

    #[serde(default)]
    pub ansi: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: default_log_filter(),
            ansi: false,
        }
    }
}

fn default_log_filter() -> String {
    "info".to_string()
}

impl Config {
    /// Read and parse a JSON config file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&raw)
    }

    /// Parse a JSON document; missing fields take their defaults.
    pub fn from_json(raw: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(raw)?)
    }

    /// File named by `GEOQUERY_CONFIG` (defaults otherwise), then the
    /// remaining `GEOQUERY_*` overrides, then validation.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let mut config = match lookup(ENV_CONFIG).filter(|p| !p.trim().is_empty()) {
            Some(path) => Self::from_file(path.trim())?,
            None => Self::default(),
        };
        config.apply_overrides(&lookup);
        config.validate()?;
        Ok(config)
    }

    pub fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        let set = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        if let Some(bind) = set(ENV_BIND) {
            self.server.bind = bind;
        }
        if let Some(url) = set(ENV_GEOCODER_URL) {
            self.geocoder.base_url = url;
        }
        if let Some(agent) = set(ENV_USER_AGENT) {
            self.geocoder.user_agent = agent;
        }
        if let Some(filter) = set(ENV_LOG) {
            self.logging.filter = filter;
        }
    }

    /// Reject values the service cannot run with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.server.bind.trim().is_empty() {
            return Err(ConfigError::Invalid("server.bind must not be empty".into()));
        }

        let url = &self.geocoder.base_url;
        if !(url.starts_with("http://") || url.starts_with("https://")) {
            return Err(ConfigError::Invalid(format!(
                "geocoder.base_url must be an http(s) URL, got {:?}",
                url
            )));
        }
        if self.geocoder.user_agent.trim().is_empty() {
            return Err(ConfigError::Invalid("geocoder.user_agent must not be empty".into()));
        }

        let query = &self.query;
        if query.default_limit == 0 || query.default_limit > query.max_limit {
            return Err(ConfigError::Invalid(format!(
                "query.default_limit must be in 1..={}, got {}",
                query.max_limit, query.default_limit
            )));
        }
        if query.max_fanout == 0 {
            return Err(ConfigError::Invalid("query.max_fanout must be positive".into()));
        }

        EnvFilter::try_new(&self.logging.filter).map_err(|e| {
            ConfigError::Invalid(format!("logging.filter {:?}: {}", self.logging.filter, e))
        })?;

        Ok(())
    }
}
