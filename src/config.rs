use serde::Deserialize;
use std::env;
use std::fs;
use std::time::Duration;

use crate::dispatch::ModelTier;
use crate::error::{RelayError, Result};
use crate::transform::Dialect;

#[derive(Debug, Clone, Deserialize)]
pub struct RelayConfig {
    pub server: ServerConfig,
    pub upstream: UpstreamConfig,
    pub models: ModelTier,
    #[serde(default)]
    pub stream: StreamConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub listen_addr: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UpstreamConfig {
    /// Scheme and host, e.g. "https://api.example.com"
    pub endpoint: String,

    #[serde(default = "default_chat_path")]
    pub chat_path: String,

    #[serde(default)]
    pub dialect: Dialect,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StreamConfig {
    /// Inter-frame delay for simulated streaming, in milliseconds
    #[serde(default = "default_char_delay_ms")]
    pub char_delay_ms: u64,
}

impl Default for StreamConfig {
    fn default() -> Self {
        Self {
            char_delay_ms: default_char_delay_ms(),
        }
    }
}

impl StreamConfig {
    pub fn char_delay(&self) -> Duration {
        Duration::from_millis(self.char_delay_ms)
    }
}

fn default_chat_path() -> String {
    "/v1/chat/completions".to_string()
}

fn default_char_delay_ms() -> u64 {
    10
}

impl RelayConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        let listen_addr =
            env::var("RELAY_LISTEN_ADDR").unwrap_or_else(|_| "127.0.0.1:8080".to_string());

        let endpoint = env::var("RELAY_UPSTREAM_ENDPOINT")
            .map_err(|_| RelayError::ConfigError("RELAY_UPSTREAM_ENDPOINT not set".to_string()))?;

        let chat_path = env::var("RELAY_CHAT_PATH").unwrap_or_else(|_| default_chat_path());

        let dialect = match env::var("RELAY_DIALECT") {
            Ok(value) => value.parse()?,
            Err(_) => Dialect::default(),
        };

        let primary = env::var("RELAY_PRIMARY_MODEL")
            .map_err(|_| RelayError::ConfigError("RELAY_PRIMARY_MODEL not set".to_string()))?;

        let fallback = env::var("RELAY_FALLBACK_MODEL")
            .map_err(|_| RelayError::ConfigError("RELAY_FALLBACK_MODEL not set".to_string()))?;

        let char_delay_ms = match env::var("RELAY_STREAM_DELAY_MS") {
            Ok(value) => value.parse::<u64>().map_err(|e| {
                RelayError::ConfigError(format!("Invalid RELAY_STREAM_DELAY_MS: {e}"))
            })?,
            Err(_) => default_char_delay_ms(),
        };

        Ok(RelayConfig {
            server: ServerConfig { listen_addr },
            upstream: UpstreamConfig {
                endpoint,
                chat_path,
                dialect,
            },
            models: ModelTier { primary, fallback },
            stream: StreamConfig { char_delay_ms },
        })
    }

    /// Load configuration from a TOML file
    pub fn from_file(path: &str) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .map_err(|e| RelayError::ConfigError(format!("Failed to read config file: {e}")))?;

        let mut config: RelayConfig = toml::from_str(&contents)
            .map_err(|e| RelayError::ConfigError(format!("Failed to parse config file: {e}")))?;

        // Allow environment variables to override file config
        if let Ok(endpoint) = env::var("RELAY_UPSTREAM_ENDPOINT") {
            config.upstream.endpoint = endpoint;
        }
        if let Ok(primary) = env::var("RELAY_PRIMARY_MODEL") {
            config.models.primary = primary;
        }
        if let Ok(fallback) = env::var("RELAY_FALLBACK_MODEL") {
            config.models.fallback = fallback;
        }

        Ok(config)
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        if self.server.listen_addr.is_empty() {
            return Err(RelayError::ConfigError(
                "Listen address is empty".to_string(),
            ));
        }

        if self.upstream.endpoint.is_empty() {
            return Err(RelayError::ConfigError(
                "Upstream endpoint is empty".to_string(),
            ));
        }

        if !self.upstream.chat_path.starts_with('/') {
            return Err(RelayError::ConfigError(
                "Chat path must start with '/'".to_string(),
            ));
        }

        if self.models.primary.is_empty() || self.models.fallback.is_empty() {
            return Err(RelayError::ConfigError(
                "Both primary and fallback models must be set".to_string(),
            ));
        }

        Ok(())
    }
}
