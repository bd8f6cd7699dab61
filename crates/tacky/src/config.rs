//! Server configuration.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::TackyError;

/// Default address: every interface, port 8081.
pub const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8081";

/// Default capacity of each session's outbound queue.
pub const DEFAULT_OUTBOUND_CAPACITY: usize = 4;

/// Smallest usable outbound capacity: one request line can produce two
/// replies, and both are reserved before the registry is locked.
pub const MIN_OUTBOUND_CAPACITY: usize = 2;

/// Configuration for a Tacky server.
///
/// Every field has a default, so a config file only needs the fields it
/// wants to change:
///
/// ```json
/// { "bind_addr": "127.0.0.1:9000" }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Address the TCP listener binds to.
    pub bind_addr: String,

    /// How many replies may wait for a session's write task before the
    /// sender has to wait.
    pub outbound_capacity: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: DEFAULT_BIND_ADDR.to_string(),
            outbound_capacity: DEFAULT_OUTBOUND_CAPACITY,
        }
    }
}

impl ServerConfig {
    /// Reads a JSON config file.
    ///
    /// # Errors
    /// - [`TackyError::Io`] if the file can't be read
    /// - [`TackyError::Config`] if it isn't valid JSON for this struct
    /// - [`TackyError::InvalidConfig`] if a value is out of range
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, TackyError> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json_str(&text)
    }

    /// Parses a JSON config document.
    ///
    /// # Errors
    /// Returns [`TackyError::Config`] on malformed JSON and
    /// [`TackyError::InvalidConfig`] on out-of-range values.
    pub fn from_json_str(text: &str) -> Result<Self, TackyError> {
        let config: Self = serde_json::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Checks values serde can't reject on its own.
    ///
    /// # Errors
    /// Returns [`TackyError::InvalidConfig`] if `outbound_capacity` is
    /// below [`MIN_OUTBOUND_CAPACITY`].
    pub fn validate(&self) -> Result<(), TackyError> {
        if self.outbound_capacity < MIN_OUTBOUND_CAPACITY {
            return Err(TackyError::InvalidConfig(format!(
                "outbound_capacity must be at least {MIN_OUTBOUND_CAPACITY}, got {}",
                self.outbound_capacity
            )));
        }
        Ok(())
    }
}
