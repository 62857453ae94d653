//! Configuration management for Peerbeam.
//!
//! The engine itself keeps no persistent state; configuration is a plain
//! value the host constructs, deserializes from TOML, or takes as default.
//!
//! ## Example
//!
//! ```rust,ignore
//! use peerbeam_core::config::Config;
//!
//! let config = Config::from_toml_str(&std::fs::read_to_string("config.toml")?)?;
//! println!("chunk size: {}", config.transfer.chunk_size);
//! ```

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Main configuration struct for the engine.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Transfer settings
    pub transfer: TransferConfig,
    /// Signaling settings
    pub signaling: SignalingConfig,
}

impl Config {
    /// Parse a configuration from TOML text and validate it.
    ///
    /// # Errors
    ///
    /// Returns an error if the TOML is malformed or a value is invalid.
    pub fn from_toml_str(text: &str) -> Result<Self> {
        let config: Self = toml::from_str(text).map_err(|e| Error::InvalidConfig {
            key: "config".to_string(),
            reason: e.to_string(),
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Check value constraints.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidConfig`] naming the offending key.
    pub fn validate(&self) -> Result<()> {
        if self.transfer.chunk_size == 0 {
            return Err(Error::InvalidConfig {
                key: "transfer.chunk_size".to_string(),
                reason: "must be at least 1 byte".to_string(),
            });
        }
        if self.signaling.ice_servers.is_empty() {
            return Err(Error::InvalidConfig {
                key: "signaling.ice_servers".to_string(),
                reason: "at least one server is required".to_string(),
            });
        }
        Ok(())
    }
}

/// Transfer configuration options.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TransferConfig {
    /// Chunk size for file transfers
    pub chunk_size: usize,
}

impl Default for TransferConfig {
    fn default() -> Self {
        Self {
            chunk_size: crate::DEFAULT_CHUNK_SIZE,
        }
    }
}

/// Signaling configuration options.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SignalingConfig {
    /// ICE server URLs handed to the peer connector
    pub ice_servers: Vec<String>,
}

impl Default for SignalingConfig {
    fn default() -> Self {
        Self {
            ice_servers: vec![crate::DEFAULT_STUN_SERVER.to_string()],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::default();

        assert_eq!(config.transfer.chunk_size, crate::DEFAULT_CHUNK_SIZE);
        assert_eq!(
            config.signaling.ice_servers,
            vec![crate::DEFAULT_STUN_SERVER.to_string()]
        );
        config.validate().expect("defaults are valid");
    }

    #[test]
    fn test_partial_toml_fills_defaults() {
        let config = Config::from_toml_str(
            r#"
            [transfer]
            chunk_size = 4096
            "#,
        )
        .expect("parse");

        assert_eq!(config.transfer.chunk_size, 4096);
        assert_eq!(
            config.signaling.ice_servers,
            vec![crate::DEFAULT_STUN_SERVER.to_string()]
        );
    }

    #[test]
    fn test_full_toml() {
        let config = Config::from_toml_str(
            r#"
            [transfer]
            chunk_size = 8192

            [signaling]
            ice_servers = ["stun:stun.example.net:3478", "turn:turn.example.net:3478"]
            "#,
        )
        .expect("parse");

        assert_eq!(config.transfer.chunk_size, 8192);
        assert_eq!(config.signaling.ice_servers.len(), 2);
    }

    #[test]
    fn test_zero_chunk_size_rejected() {
        let result = Config::from_toml_str(
            r#"
            [transfer]
            chunk_size = 0
            "#,
        );
        assert!(matches!(result, Err(Error::InvalidConfig { .. })));
    }

    #[test]
    fn test_empty_ice_servers_rejected() {
        let result = Config::from_toml_str(
            r#"
            [signaling]
            ice_servers = []
            "#,
        );
        assert!(matches!(result, Err(Error::InvalidConfig { .. })));
    }

    #[test]
    fn test_malformed_toml_rejected() {
        let result = Config::from_toml_str("transfer = ");
        assert!(matches!(result, Err(Error::InvalidConfig { .. })));
    }
}
