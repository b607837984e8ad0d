use crate::common::constants::{
    DEFAULT_API_BASE, DEFAULT_CACHE_TTL_SECS, DEFAULT_TIMEOUT_SECS, REMOTE_CALL_TIMEOUT_SECS,
};
use crate::common::error::{ApiError, Result};
use crate::endpoints::{EndpointRegistry, EndpointSpec};
use reqwest::Method;
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

pub const CONFIG_ENV: &str = "EVENTBRITE_CONFIG";
pub const DEFAULT_CONFIG_PATH: &str = "eventbrite.toml";

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub api: ApiConfig,
    pub cache: CacheConfig,
    pub endpoints: Vec<ExtraEndpoint>,
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    pub base_url: String,
    /// Timeout while an Eventbrite call is in flight
    pub timeout_seconds: u64,
    /// Baseline timeout of the HTTP client
    pub default_timeout_seconds: u64,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_API_BASE.to_string(),
            timeout_seconds: REMOTE_CALL_TIMEOUT_SECS,
            default_timeout_seconds: DEFAULT_TIMEOUT_SECS,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CacheBackend {
    Memory,
    Sqlite,
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    pub ttl_seconds: u64,
    pub backend: CacheBackend,
    pub path: PathBuf,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            ttl_seconds: DEFAULT_CACHE_TTL_SECS,
            backend: CacheBackend::Sqlite,
            path: PathBuf::from("data/eventbrite.db"),
        }
    }
}

/// An endpoint added on top of the built-in table. Its parameters are unrestricted.
#[derive(Debug, Deserialize)]
pub struct ExtraEndpoint {
    pub name: String,
    pub path: String,
    #[serde(default = "default_method")]
    pub method: String,
    #[serde(default)]
    pub params: Vec<String>,
}

fn default_method() -> String {
    "GET".to_string()
}

impl Config {
    /// Load from `$EVENTBRITE_CONFIG` or `eventbrite.toml`; a missing file means defaults.
    pub fn load() -> Result<Self> {
        let path = std::env::var(CONFIG_ENV).unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string());
        let path = Path::new(&path);
        if !path.exists() {
            return Ok(Self::default());
        }
        Self::from_file(path)
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let config_content = fs::read_to_string(path).map_err(|e| {
            ApiError::Config(format!("Failed to read config file '{}': {}", path.display(), e))
        })?;
        Self::from_str(&config_content)
    }

    pub fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.cache.ttl_seconds)
    }

    pub fn call_timeout(&self) -> Duration {
        Duration::from_secs(self.api.timeout_seconds)
    }

    pub fn default_timeout(&self) -> Duration {
        Duration::from_secs(self.api.default_timeout_seconds)
    }

    /// The built-in endpoint table plus any configured extras.
    ///
    /// Methods are parsed here but only GET and POST can actually be called.
    pub fn registry(&self) -> Result<EndpointRegistry> {
        self.endpoints.iter().try_fold(EndpointRegistry::eventbrite(), |registry, extra| {
            let method = Method::from_str(&extra.method.to_uppercase()).map_err(|e| {
                ApiError::Config(format!("Invalid method '{}' for {}: {}", extra.method, extra.name, e))
            })?;
            let spec = extra
                .params
                .iter()
                .fold(EndpointSpec::new(&extra.name, &extra.path, method), |spec, p| {
                    spec.param(p, crate::endpoints::ParamDomain::Any)
                });
            Ok(registry.with_endpoint(spec))
        })
    }
}

impl FromStr for Config {
    type Err = ApiError;

    fn from_str(s: &str) -> Result<Self> {
        Ok(toml::from_str(s)?)
    }
}
