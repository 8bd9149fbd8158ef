//! Configuration for the wheelhouse service.
//!
//! Loads a TOML file, applies `WHEELHOUSE_*` environment overrides, and
//! validates the result before anything starts.

use crate::engine::types::{Amount, MAX_SETTLEABLE_STAKE};
use serde::{Deserialize, Serialize};
use std::env;
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to load configuration: {0}")]
    LoadFailed(String),

    #[error("invalid value for {field}: '{value}' ({reason})")]
    InvalidValue {
        field: String,
        value: String,
        reason: String,
    },
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct WheelhouseConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub game: GameConfig,
    #[serde(default)]
    pub storage: StorageConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub allowed_origins: Vec<String>,
    pub request_timeout_secs: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
            allowed_origins: vec!["*".to_string()],
            request_timeout_secs: 30,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameConfig {
    /// Minimum wait between accepted spin attempts per player.
    pub spin_cooldown_ms: u64,
    /// Table limit: maximum total stake per spin, in minor units.
    pub max_total_stake: Amount,
    /// Hard cap on the `limit` of history queries.
    pub max_history_limit: usize,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            spin_cooldown_ms: 2000,
            max_total_stake: 1_000_000_000, // 10M major units in cents
            max_history_limit: 100,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    pub data_dir: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            data_dir: "./wheelhouse_data".to_string(),
        }
    }
}

/// Configuration loader with environment variable support.
pub struct ConfigLoader {
    config_path: Option<String>,
}

impl ConfigLoader {
    pub fn new() -> Self {
        Self { config_path: None }
    }

    pub fn with_path<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.config_path = Some(path.as_ref().to_string_lossy().to_string());
        self
    }

    /// Load configuration from file and environment variables.
    pub fn load(&self) -> Result<WheelhouseConfig, ConfigError> {
        let mut config = if let Some(ref path) = self.config_path {
            self.load_from_file(path)?
        } else {
            WheelhouseConfig::default()
        };

        self.apply_env_overrides(&mut config)?;
        self.validate(&config)?;

        Ok(config)
    }

    fn load_from_file(&self, path: &str) -> Result<WheelhouseConfig, ConfigError> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::LoadFailed(format!("failed to read {}: {}", path, e)))?;

        toml::from_str(&content)
            .map_err(|e| ConfigError::LoadFailed(format!("failed to parse TOML: {}", e)))
    }

    fn apply_env_overrides(&self, config: &mut WheelhouseConfig) -> Result<(), ConfigError> {
        if let Ok(host) = env::var("WHEELHOUSE_SERVER_HOST") {
            config.server.host = host;
        }
        if let Ok(port) = env::var("WHEELHOUSE_SERVER_PORT") {
            config.server.port = port.parse().map_err(|_| ConfigError::InvalidValue {
                field: "WHEELHOUSE_SERVER_PORT".to_string(),
                value: port,
                reason: "invalid port number".to_string(),
            })?;
        }
        if let Ok(data_dir) = env::var("WHEELHOUSE_DATA_DIR") {
            config.storage.data_dir = data_dir;
        }
        if let Ok(cooldown) = env::var("WHEELHOUSE_SPIN_COOLDOWN_MS") {
            config.game.spin_cooldown_ms =
                cooldown.parse().map_err(|_| ConfigError::InvalidValue {
                    field: "WHEELHOUSE_SPIN_COOLDOWN_MS".to_string(),
                    value: cooldown,
                    reason: "invalid millisecond count".to_string(),
                })?;
        }
        if let Ok(limit) = env::var("WHEELHOUSE_MAX_TOTAL_STAKE") {
            config.game.max_total_stake =
                limit.parse().map_err(|_| ConfigError::InvalidValue {
                    field: "WHEELHOUSE_MAX_TOTAL_STAKE".to_string(),
                    value: limit,
                    reason: "invalid amount".to_string(),
                })?;
        }
        Ok(())
    }

    fn validate(&self, config: &WheelhouseConfig) -> Result<(), ConfigError> {
        if config.server.port == 0 {
            return Err(ConfigError::InvalidValue {
                field: "server.port".to_string(),
                value: "0".to_string(),
                reason: "port cannot be zero".to_string(),
            });
        }
        if config.storage.data_dir.is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "storage.data_dir".to_string(),
                value: String::new(),
                reason: "data directory cannot be empty".to_string(),
            });
        }
        if config.game.max_total_stake == 0 || config.game.max_total_stake > MAX_SETTLEABLE_STAKE
        {
            return Err(ConfigError::InvalidValue {
                field: "game.max_total_stake".to_string(),
                value: config.game.max_total_stake.to_string(),
                reason: format!("must be within 1..={}", MAX_SETTLEABLE_STAKE),
            });
        }
        if config.game.max_history_limit == 0 {
            return Err(ConfigError::InvalidValue {
                field: "game.max_history_limit".to_string(),
                value: "0".to_string(),
                reason: "history limit cannot be zero".to_string(),
            });
        }
        Ok(())
    }
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}
