//! Configuration for the settlement scheduler

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::NodeRole;

/// Fixed delay between secret checks of a gated task.
pub const DEFAULT_RETRY_DELAY_SECS: u64 = 120;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid value for {key}: {reason}")]
    Invalid { key: &'static str, reason: String },
}

/// Scheduler configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SchedulerConfig {
    /// Which side of the channel this node is
    pub role: NodeRole,

    /// Delay before re-checking an unrevealed secret (default: 120s)
    pub retry_delay_secs: u64,

    /// Also broadcast the fallback transaction after the secret-gated branch
    /// was taken and authorized (default: true)
    pub broadcast_fallback_after_settlement: bool,

    /// Timer loop polling interval in milliseconds
    pub tick_millis: u64,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            role: NodeRole::Server,
            retry_delay_secs: DEFAULT_RETRY_DELAY_SECS,
            broadcast_fallback_after_settlement: true,
            tick_millis: 1000,
        }
    }
}

impl SchedulerConfig {
    pub fn retry_delay(&self) -> Duration {
        Duration::from_secs(self.retry_delay_secs)
    }

    pub fn tick(&self) -> Duration {
        Duration::from_millis(self.tick_millis)
    }

    /// Load from a TOML file; missing keys take their defaults
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml(&content)
    }

    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let config: SchedulerConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load from environment variables on top of the defaults
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`from_env`](Self::from_env) with an injectable variable source.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let mut config = SchedulerConfig::default();

        if let Some(role) = lookup("SETTLER_ROLE") {
            config.role = role.parse().map_err(|e: crate::domain::role::ParseRoleError| {
                ConfigError::Invalid {
                    key: "SETTLER_ROLE",
                    reason: e.to_string(),
                }
            })?;
        }

        if let Some(secs) = lookup("SETTLER_RETRY_DELAY_SECS") {
            config.retry_delay_secs = parse_number("SETTLER_RETRY_DELAY_SECS", &secs)?;
        }

        if let Some(flag) = lookup("SETTLER_FALLBACK_AFTER_SETTLEMENT") {
            config.broadcast_fallback_after_settlement = parse_flag(&flag)?;
        }

        if let Some(millis) = lookup("SETTLER_TICK_MILLIS") {
            config.tick_millis = parse_number("SETTLER_TICK_MILLIS", &millis)?;
        }

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.retry_delay_secs == 0 {
            return Err(ConfigError::Invalid {
                key: "retry_delay_secs",
                reason: "must be greater than zero".to_string(),
            });
        }
        if self.tick_millis == 0 {
            return Err(ConfigError::Invalid {
                key: "tick_millis",
                reason: "must be greater than zero".to_string(),
            });
        }
        Ok(())
    }
}

fn parse_number(key: &'static str, value: &str) -> Result<u64, ConfigError> {
    value.trim().parse().map_err(|e| ConfigError::Invalid {
        key,
        reason: format!("{value:?}: {e}"),
    })
}

fn parse_flag(value: &str) -> Result<bool, ConfigError> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        other => Err(ConfigError::Invalid {
            key: "SETTLER_FALLBACK_AFTER_SETTLEMENT",
            reason: format!("{other:?} is not a boolean"),
        }),
    }
}
