//! # Configuration
//!
//! Tunables of the system, loaded from TOML. Every field has a default, so an empty file
//! (or no file) is a valid configuration.
//!
//! ```toml
//! channel_capacity = 32
//! max_transaction_attempts = 32
//! page_size = 10
//! removal_buffer = 16
//! ```

use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Invalid config value: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ShopConfig {
    /// Request queue length of each store.
    pub channel_capacity: usize,
    /// Compare-and-set rounds a transaction or add-to-cart may run before giving up.
    pub max_transaction_attempts: u32,
    /// Products added to the feed window per page.
    pub page_size: usize,
    /// Pending removal confirmations kept per cart.
    pub removal_buffer: usize,
}

impl Default for ShopConfig {
    fn default() -> Self {
        Self {
            channel_capacity: 32,
            max_transaction_attempts: 32,
            page_size: 10,
            removal_buffer: 16,
        }
    }
}

impl ShopConfig {
    pub fn from_toml_str(raw: &str) -> Result<Self, ConfigError> {
        let config: ShopConfig = toml::from_str(raw)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path)?;
        Self::from_toml_str(&raw)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let positive = [
            ("channel_capacity", self.channel_capacity),
            ("max_transaction_attempts", self.max_transaction_attempts as usize),
            ("page_size", self.page_size),
            ("removal_buffer", self.removal_buffer),
        ];
        match positive.iter().find(|(_, value)| *value == 0) {
            Some((name, _)) => Err(ConfigError::Invalid(format!("{name} must be at least 1"))),
            None => Ok(()),
        }
    }
}
