//! Configuration for the snapshot HTTP client.
//!
//! [`CaptureConfig`] is small, cheap to clone, and deserializable from the
//! `capture:` section of the camsnap YAML file.
//!
//! ```rust
//! use capture::CaptureConfig;
//!
//! let cfg = CaptureConfig::default();
//! assert_eq!(cfg.request_timeout_secs, 60);
//! cfg.validate().expect("defaults are valid");
//! ```
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Default client-wide timeout for a single snapshot GET.
pub const DEFAULT_TIMEOUT_SECS: u64 = 60;

/// Runtime configuration for the HTTP client used to pull snapshots.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CaptureConfig {
    /// Client-wide timeout applied to every request, in seconds.
    ///
    /// Default: `60`
    #[serde(default = "default_timeout_secs")]
    pub request_timeout_secs: u64,

    /// Optional `User-Agent` header. When unset the client default is sent.
    #[serde(default)]
    pub user_agent: Option<String>,
}

impl Default for CaptureConfig {
    fn default() -> Self {
        Self {
            request_timeout_secs: DEFAULT_TIMEOUT_SECS,
            user_agent: None,
        }
    }
}

impl CaptureConfig {
    /// Check the configuration for values the client cannot honour.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.request_timeout_secs == 0 {
            return Err(ConfigError::InvalidTimeout);
        }
        if let Some(agent) = &self.user_agent {
            if agent.trim().is_empty() {
                return Err(ConfigError::EmptyUserAgent);
            }
        }
        Ok(())
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

/// Configuration validation errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("request_timeout_secs must be greater than zero")]
    InvalidTimeout,
    #[error("user_agent must not be blank when set")]
    EmptyUserAgent,
}

fn default_timeout_secs() -> u64 {
    DEFAULT_TIMEOUT_SECS
}
