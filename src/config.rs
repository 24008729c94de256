use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::http_client::DEFAULT_BASE_HOST;

/// Trait for abstracting environment variable access
pub trait EnvProvider {
    fn get(&self, key: &str) -> Option<String>;
}

/// System environment variable provider for production use
pub struct SystemEnvProvider;

impl EnvProvider for SystemEnvProvider {
    fn get(&self, key: &str) -> Option<String> {
        std::env::var(key).ok()
    }
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parsing error: {0}")]
    TomlParsing(#[from] toml::de::Error),

    #[error("JSON parsing error: {0}")]
    JsonParsing(#[from] serde_json::Error),

    #[error("Configuration validation error: {0}")]
    Validation(String),

    #[error("Environment variable error: {0}")]
    Environment(String),

    #[error("Unsupported configuration file format: {0}")]
    UnsupportedFormat(String),
}

pub type Result<T> = std::result::Result<T, ConfigError>;

/// Main client configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(default)]
pub struct Config {
    pub api: ApiSection,
    pub network: NetworkConfig,
    pub cache: CacheConfig,
}

/// Remote API settings
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ApiSection {
    /// Host serving the XML API
    pub base_host: String,
    /// API key id, sent as `keyID`
    pub key_id: Option<i64>,
    /// API verification code, sent as `vCode`
    pub vcode: Option<String>,
    /// Text appended to the library user agent
    pub user_agent: Option<String>,
    /// Store error responses for their stated lifetime. The
    /// `EVEAPI_CACHE_ERRORS` override takes `true`/`false` or `1`/`0`.
    pub cache_errors: bool,
}

/// Network configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct NetworkConfig {
    /// HTTP request timeout in seconds
    pub timeout_seconds: u64,
}

/// Which cache stores response bodies
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum CacheBackend {
    #[default]
    Memory,
    Disk,
    Tiered,
    None,
}

impl std::str::FromStr for CacheBackend {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "memory" => Ok(CacheBackend::Memory),
            "disk" => Ok(CacheBackend::Disk),
            "tiered" => Ok(CacheBackend::Tiered),
            "none" => Ok(CacheBackend::None),
            other => Err(ConfigError::Validation(format!(
                "Unknown cache backend: {}",
                other
            ))),
        }
    }
}

/// Cache configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct CacheConfig {
    pub backend: CacheBackend,
    /// Directory for the disk cache
    pub directory: PathBuf,
    /// Maximum number of entries in memory cache
    pub max_memory_entries: u64,
}

impl Default for ApiSection {
    fn default() -> Self {
        Self {
            base_host: DEFAULT_BASE_HOST.to_string(),
            key_id: None,
            vcode: None,
            user_agent: None,
            cache_errors: true,
        }
    }
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            timeout_seconds: 60,
        }
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            backend: CacheBackend::Memory,
            directory: dirs::cache_dir()
                .unwrap_or_else(std::env::temp_dir)
                .join("eveapi"),
            max_memory_entries: 10_000,
        }
    }
}

/// Configuration manager for loading and merging configurations
pub struct ConfigManager;

impl ConfigManager {
    /// Load configuration with precedence: defaults -> file -> environment
    pub fn load(path: Option<&Path>) -> Result<Config> {
        Self::load_with(&SystemEnvProvider, path)
    }

    pub fn load_with(env: &impl EnvProvider, path: Option<&Path>) -> Result<Config> {
        let config = match path {
            Some(path) => Self::load_from_file(path)?,
            None => Self::find_config_file()?.unwrap_or_default(),
        };

        let config = Self::apply_environment_overrides_with(env, config)?;
        Self::validate_config(&config)?;

        Ok(config)
    }

    /// Load configuration from a file (TOML or JSON)
    pub fn load_from_file(path: &Path) -> Result<Config> {
        let content = std::fs::read_to_string(path)?;

        match path.extension().and_then(|ext| ext.to_str()) {
            Some("toml") => Ok(toml::from_str(&content)?),
            Some("json") => Ok(serde_json::from_str(&content)?),
            Some(ext) => Err(ConfigError::UnsupportedFormat(ext.to_string())),
            None => {
                // Try to parse as TOML first, then JSON
                if let Ok(config) = toml::from_str::<Config>(&content) {
                    Ok(config)
                } else {
                    Ok(serde_json::from_str(&content)?)
                }
            }
        }
    }

    /// Find configuration file in standard locations
    pub fn find_config_file() -> Result<Option<Config>> {
        let config_names = ["eveapi.toml", "eveapi.json", ".eveapi.toml", ".eveapi.json"];

        for name in &config_names {
            let path = PathBuf::from(name);
            if path.exists() {
                return Ok(Some(Self::load_from_file(&path)?));
            }
        }

        if let Some(config_dir) = dirs::config_dir() {
            let app_config_dir = config_dir.join("eveapi");
            for name in &config_names {
                let path = app_config_dir.join(name);
                if path.exists() {
                    return Ok(Some(Self::load_from_file(&path)?));
                }
            }
        }

        Ok(None)
    }

    /// Apply environment variable overrides using the system environment
    pub fn apply_environment_overrides(config: Config) -> Result<Config> {
        Self::apply_environment_overrides_with(&SystemEnvProvider, config)
    }

    fn parse_env<T: std::str::FromStr>(key: &str, value: &str) -> Result<T> {
        value
            .trim()
            .parse()
            .map_err(|_| ConfigError::Environment(format!("Invalid {} value: {}", key, value)))
    }

    /// Booleans in the API's own `1`/`0` form or as `true`/`false`
    fn parse_env_flag(key: &str, value: &str) -> Result<bool> {
        match value.trim().to_ascii_lowercase().as_str() {
            "1" | "true" => Ok(true),
            "0" | "false" => Ok(false),
            _ => Err(ConfigError::Environment(format!(
                "Invalid {} value: {}",
                key, value
            ))),
        }
    }

    /// Apply environment variable overrides with a custom environment provider
    pub fn apply_environment_overrides_with(
        env: &impl EnvProvider,
        mut config: Config,
    ) -> Result<Config> {
        if let Some(host) = env.get("EVEAPI_BASE_HOST") {
            config.api.base_host = host;
        }

        if let Some(key_id) = env.get("EVEAPI_KEY_ID") {
            config.api.key_id = Some(Self::parse_env("EVEAPI_KEY_ID", &key_id)?);
        }

        if let Some(vcode) = env.get("EVEAPI_VCODE") {
            config.api.vcode = Some(vcode);
        }

        if let Some(user_agent) = env.get("EVEAPI_USER_AGENT") {
            config.api.user_agent = Some(user_agent);
        }

        if let Some(cache_errors) = env.get("EVEAPI_CACHE_ERRORS") {
            config.api.cache_errors = Self::parse_env_flag("EVEAPI_CACHE_ERRORS", &cache_errors)?;
        }

        if let Some(timeout) = env.get("EVEAPI_TIMEOUT") {
            config.network.timeout_seconds = Self::parse_env("EVEAPI_TIMEOUT", &timeout)?;
        }

        if let Some(backend) = env.get("EVEAPI_CACHE_BACKEND") {
            config.cache.backend = backend.parse().map_err(|_| {
                ConfigError::Environment(format!("Invalid EVEAPI_CACHE_BACKEND value: {}", backend))
            })?;
        }

        if let Some(cache_dir) = env.get("EVEAPI_CACHE_DIR") {
            config.cache.directory = PathBuf::from(cache_dir);
        }

        Ok(config)
    }

    /// Validate configuration values
    pub fn validate_config(config: &Config) -> Result<()> {
        if config.api.base_host.trim().is_empty() {
            return Err(ConfigError::Validation(
                "Base host must not be empty".to_string(),
            ));
        }

        if config.api.base_host.contains('/') {
            return Err(ConfigError::Validation(format!(
                "Base host must be a host name, not a URL: {}",
                config.api.base_host
            )));
        }

        if config.api.key_id.is_some() != config.api.vcode.is_some() {
            return Err(ConfigError::Validation(
                "key_id and vcode must be set together".to_string(),
            ));
        }

        if config.network.timeout_seconds == 0 {
            return Err(ConfigError::Validation(
                "Timeout must be greater than 0".to_string(),
            ));
        }

        if config.cache.max_memory_entries == 0 {
            return Err(ConfigError::Validation(
                "Memory cache must hold at least one entry".to_string(),
            ));
        }

        Ok(())
    }
}
