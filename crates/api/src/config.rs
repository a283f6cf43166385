// SPDX-FileCopyrightText: 2025 Semiotic Labs
//
// SPDX-License-Identifier: Apache-2.0

//! Server configuration module
//!
//! This module provides configuration structures and logic for the price proxy
//! server, supporting different environments and validation of configuration
//! parameters, including the upstream provider settings and the CryptoCompare
//! key pool.

use std::{
    fmt,
    net::{IpAddr, Ipv4Addr, SocketAddr},
    time::Duration,
};

use anyhow::{Result, anyhow, ensure};
use config::{Config, ConfigError, Environment as ConfigEnv, File};
use external_apis::{CoinGeckoConfig, CryptoCompareConfig};
use serde::{Deserialize, Deserializer, Serialize, de};
use url::Url;

use crate::error::{ServerError, ServerResult};

const DEFAULT_CRYPTOCOMPARE_URL: &str = "https://min-api.cryptocompare.com";
const DEFAULT_COINGECKO_URL: &str = "https://api.coingecko.com";
const DEFAULT_MAX_RETRIES: u32 = 3;
const DEFAULT_BASE_DELAY_MS: u64 = 1000;

/// A validated server port that ensures the value is appropriate for the environment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ServerPort {
    port: u16,
    environment: Environment,
}

impl ServerPort {
    /// Create a new `ServerPort`, ensuring it's valid for the given environment
    ///
    /// # Errors
    ///
    /// Returns an error if the port is 0 in non-testing environments
    pub fn new(port: u16, environment: Environment) -> Result<Self> {
        if port == 0 && environment != Environment::Testing {
            return Err(anyhow!("port cannot be 0 in non-testing environments"));
        }
        Ok(Self { port, environment })
    }

    /// Create a safe default port for development
    pub const fn default_development() -> Self {
        Self {
            port: 3000,
            environment: Environment::Development,
        }
    }

    /// Create a safe testing port (port 0)
    pub const fn testing() -> Self {
        Self {
            port: 0,
            environment: Environment::Testing,
        }
    }

    /// Get the port value
    pub fn value(&self) -> u16 {
        self.port
    }
}

impl<'de> Deserialize<'de> for ServerPort {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let port = u16::deserialize(deserializer)?;
        // Re-validated during loading once the environment is known
        Ok(Self {
            port,
            environment: Environment::Development,
        })
    }
}

/// A validated upstream request timeout
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TimeoutSeconds(Duration);

impl TimeoutSeconds {
    /// Create a new `TimeoutSeconds`, ensuring the value is within valid bounds
    ///
    /// # Errors
    ///
    /// Returns an error if timeout is 0 or greater than 300 seconds
    pub fn new(seconds: u64) -> Result<Self> {
        ensure!(seconds != 0, "timeout must be greater than 0");
        ensure!(seconds <= 300, "timeout cannot exceed 300");
        Ok(Self(Duration::from_secs(seconds)))
    }

    /// Create a safe default timeout (30 seconds)
    pub const fn default_value() -> Self {
        Self(Duration::from_secs(30))
    }

    /// Create a safe testing timeout (5 seconds)
    pub const fn testing() -> Self {
        Self(Duration::from_secs(5))
    }

    /// Get the timeout value
    pub fn value(&self) -> Duration {
        self.0
    }
}

impl<'de> Deserialize<'de> for TimeoutSeconds {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let seconds = u64::deserialize(deserializer)?;
        Self::new(seconds).map_err(|e| de::Error::custom(e.to_string()))
    }
}

impl Default for TimeoutSeconds {
    fn default() -> Self {
        Self::default_value()
    }
}

/// Environment types for configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    /// Production environment
    Production,
    /// Development environment
    Development,
    /// Testing environment
    Testing,
}

/// Retry budget applied to every upstream request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct RetrySettings {
    /// Maximum network attempts per request (at least 1)
    pub max_retries: u32,
    /// Base backoff delay in milliseconds, doubled per attempt
    pub base_delay_ms: u64,
}

impl Default for RetrySettings {
    fn default() -> Self {
        Self {
            max_retries: DEFAULT_MAX_RETRIES,
            base_delay_ms: DEFAULT_BASE_DELAY_MS,
        }
    }
}

impl RetrySettings {
    fn validate(&self) -> Result<()> {
        ensure!(self.max_retries >= 1, "max_retries must be at least 1");
        Ok(())
    }
}

/// CryptoCompare provider settings
#[derive(Clone, Deserialize)]
#[serde(default)]
pub struct CryptoCompareSettings {
    /// Base URL of the CryptoCompare API
    pub base_url: String,
    /// API key pool, rotated per attempt
    pub api_keys: Vec<String>,
    /// Upstream request timeout
    pub timeout_seconds: TimeoutSeconds,
    /// Retry budget
    pub retry: RetrySettings,
}

impl Default for CryptoCompareSettings {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_CRYPTOCOMPARE_URL.to_string(),
            api_keys: Vec::new(),
            timeout_seconds: TimeoutSeconds::default(),
            retry: RetrySettings::default(),
        }
    }
}

impl fmt::Debug for CryptoCompareSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CryptoCompareSettings")
            .field("base_url", &self.base_url)
            .field("api_keys", &format_args!("[{} redacted]", self.api_keys.len()))
            .field("timeout_seconds", &self.timeout_seconds)
            .field("retry", &self.retry)
            .finish()
    }
}

/// CoinGecko provider settings
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CoinGeckoSettings {
    /// Base URL of the CoinGecko API
    pub base_url: String,
    /// Upstream request timeout
    pub timeout_seconds: TimeoutSeconds,
    /// Retry budget
    pub retry: RetrySettings,
}

impl Default for CoinGeckoSettings {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_COINGECKO_URL.to_string(),
            timeout_seconds: TimeoutSeconds::default(),
            retry: RetrySettings::default(),
        }
    }
}

/// Upstream provider settings
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ProvidersConfig {
    /// Primary provider
    pub cryptocompare: CryptoCompareSettings,
    /// Secondary provider
    pub coingecko: CoinGeckoSettings,
}

impl ProvidersConfig {
    /// Validate provider settings
    ///
    /// # Errors
    ///
    /// Returns an error if a base URL does not parse, a retry budget is zero,
    /// or the CryptoCompare key pool is empty or holds a blank key.
    pub fn validate(&self) -> Result<()> {
        Url::parse(&self.cryptocompare.base_url)
            .map_err(|e| anyhow!("invalid cryptocompare base_url: {e}"))?;
        Url::parse(&self.coingecko.base_url)
            .map_err(|e| anyhow!("invalid coingecko base_url: {e}"))?;

        ensure!(
            !self.cryptocompare.api_keys.is_empty(),
            "at least one CryptoCompare API key is required"
        );
        ensure!(
            self.cryptocompare
                .api_keys
                .iter()
                .all(|key| !key.trim().is_empty()),
            "CryptoCompare API keys cannot be blank"
        );

        self.cryptocompare.retry.validate()?;
        self.coingecko.retry.validate()?;
        Ok(())
    }

    /// Client configuration for the CryptoCompare integration
    pub fn cryptocompare_client_config(&self) -> CryptoCompareConfig {
        let settings = &self.cryptocompare;
        CryptoCompareConfig {
            base_url: settings.base_url.clone(),
            api_keys: settings.api_keys.clone(),
            timeout_seconds: settings.timeout_seconds.value().as_secs(),
            max_retries: settings.retry.max_retries,
            base_delay_ms: settings.retry.base_delay_ms,
        }
    }

    /// Client configuration for the CoinGecko integration
    pub fn coingecko_client_config(&self) -> CoinGeckoConfig {
        let settings = &self.coingecko;
        CoinGeckoConfig {
            base_url: settings.base_url.clone(),
            timeout_seconds: settings.timeout_seconds.value().as_secs(),
            max_retries: settings.retry.max_retries,
            base_delay_ms: settings.retry.base_delay_ms,
        }
    }
}

/// Server configuration for different environments
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Server host address
    pub host: IpAddr,
    /// Server port (validated for environment compatibility)
    pub port: ServerPort,
    /// Environment type
    pub environment: Environment,
    /// Upstream price providers
    #[serde(default)]
    pub providers: ProvidersConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: IpAddr::V4(Ipv4Addr::LOCALHOST),
            port: ServerPort::default_development(),
            environment: Environment::Development,
            providers: ProvidersConfig::default(),
        }
    }
}

impl ServerConfig {
    /// Create configuration from environment variables and optional configuration files
    ///
    /// # Errors
    ///
    /// Returns `ServerError::Config` if configuration is invalid or cannot be loaded.
    pub fn from_env() -> ServerResult<Self> {
        Self::load().map_err(|e| ServerError::Config {
            message: format!("failed to load configuration: {e}"),
        })
    }

    /// Load configuration using the config crate with hierarchical sources
    ///
    /// Configuration is loaded in the following order (later sources override earlier ones):
    /// 1. Default values
    /// 2. Configuration file (config.json)
    /// 3. Environment-specific files (config.{env}.json)
    /// 4. Environment variables with `SERVER__` prefix and `__` nesting, e.g.
    ///    `SERVER__PROVIDERS__CRYPTOCOMPARE__API_KEYS=key1,key2`
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if configuration cannot be loaded or is invalid.
    pub fn load() -> Result<Self, ConfigError> {
        let env_var = std::env::var("ENVIRONMENT").unwrap_or_else(|_| "development".to_string());

        let mut config_builder = Config::builder()
            .set_default("host", "127.0.0.1")?
            .set_default("port", 3000)?
            .set_default("environment", "development")?
            .add_source(File::with_name("config.json").required(false))
            .add_source(
                File::with_name(&format!("config.{}.json", env_var.to_lowercase())).required(false),
            )
            .add_source(
                ConfigEnv::with_prefix("SERVER")
                    .prefix_separator("__")
                    .separator("__")
                    .list_separator(",")
                    .with_list_parse_key("providers.cryptocompare.api_keys")
                    .try_parsing(true),
            );

        if std::env::var("ENVIRONMENT").is_ok() {
            config_builder = config_builder.set_override("environment", env_var.to_lowercase())?;
        }

        let config = config_builder.build()?;
        let mut server_config: Self = config.try_deserialize()?;

        // Fix the ServerPort to have the correct environment context
        server_config.port = ServerPort::new(server_config.port.value(), server_config.environment)
            .map_err(|e| ConfigError::Message(format!("invalid port configuration: {e}")))?;

        server_config
            .providers
            .validate()
            .map_err(|e| ConfigError::Message(format!("invalid provider configuration: {e}")))?;

        Ok(server_config)
    }

    /// Create configuration optimized for testing
    ///
    /// Providers point at the public endpoints with a placeholder key; tests
    /// that make upstream calls override `providers` with mock server URLs.
    pub fn for_testing() -> Self {
        let retry = RetrySettings {
            max_retries: DEFAULT_MAX_RETRIES,
            base_delay_ms: 1,
        };
        Self {
            host: IpAddr::V4(Ipv4Addr::LOCALHOST),
            port: ServerPort::testing(), // let OS choose available port
            environment: Environment::Testing,
            providers: ProvidersConfig {
                cryptocompare: CryptoCompareSettings {
                    api_keys: vec!["test-api-key".to_string()],
                    timeout_seconds: TimeoutSeconds::testing(),
                    retry,
                    ..Default::default()
                },
                coingecko: CoinGeckoSettings {
                    timeout_seconds: TimeoutSeconds::testing(),
                    retry,
                    ..Default::default()
                },
            },
        }
    }

    /// Get socket address for binding
    pub fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port.value())
    }
}

impl fmt::Display for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Environment::Production => write!(f, "production"),
            Environment::Development => write!(f, "development"),
            Environment::Testing => write!(f, "testing"),
        }
    }
}
