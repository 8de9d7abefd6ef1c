//! YAML Configuration File Support for camsnap
//!
//! A single file describes where snapshots go, how often they are taken, how
//! the HTTP client behaves, and which cameras to poll.
//!
//! ## Example YAML Configuration
//!
//! ```yaml
//! version: "1.0"
//! output_dir: "/data"
//! interval_secs: 60
//! log_level: "info"
//!
//! capture:
//!   request_timeout_secs: 60
//!   user_agent: "camsnap/0.1"
//!
//! cameras:
//!   - name: "front"
//!     url: "http://cam.local/snap.jpg"
//!     save_to: "/srv/www/front.jpg"
//!   - name: "garage"
//!     url: "http://garage.local/snap.jpg"
//!     auth:
//!       username: "admin"
//!       password: "secret"
//! ```

use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use capture::{CameraDescriptor, CaptureConfig};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors that can occur when loading YAML configuration files
#[derive(Debug, Error)]
pub enum ConfigLoadError {
    #[error("failed to read config file: {0}")]
    FileRead(#[from] std::io::Error),

    #[error("failed to parse YAML: {0}")]
    YamlParse(#[from] serde_yaml::Error),

    #[error("validation error: {0}")]
    Validation(String),

    #[error("unsupported config version: {0}")]
    UnsupportedVersion(String),
}

/// Top-level camsnap configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct CamsnapConfig {
    /// Configuration format version
    pub version: String,

    /// Base directory; each camera gets a subdirectory named after it
    pub output_dir: PathBuf,

    /// Seconds between capture cycles
    #[serde(default = "default_interval_secs")]
    pub interval_secs: u64,

    /// Default tracing filter when neither the CLI nor `RUST_LOG` set one
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// HTTP client settings shared by every camera
    #[serde(default)]
    pub capture: CaptureConfig,

    /// Cameras captured in order on every cycle
    #[serde(default)]
    pub cameras: Vec<CameraDescriptor>,
}

impl CamsnapConfig {
    /// Load a YAML configuration file from the given path
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigLoadError> {
        let content = fs::read_to_string(path)?;
        Self::from_yaml(&content)
    }

    /// Parse YAML configuration from a string
    pub fn from_yaml(yaml: &str) -> Result<Self, ConfigLoadError> {
        let config: CamsnapConfig = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), ConfigLoadError> {
        match self.version.as_str() {
            "1.0" | "1" => Ok(()),
            v => Err(ConfigLoadError::UnsupportedVersion(v.to_string())),
        }?;

        if self.interval_secs == 0 {
            return Err(ConfigLoadError::Validation(
                "interval_secs must be >= 1".to_string(),
            ));
        }

        self.capture
            .validate()
            .map_err(|e| ConfigLoadError::Validation(format!("capture: {e}")))?;

        if self.cameras.is_empty() {
            return Err(ConfigLoadError::Validation(
                "at least one camera must be configured".to_string(),
            ));
        }

        let mut seen = HashSet::new();
        for camera in &self.cameras {
            validate_camera(camera)?;
            if !seen.insert(camera.name.as_str()) {
                return Err(ConfigLoadError::Validation(format!(
                    "duplicate camera name '{}'",
                    camera.name
                )));
            }
        }

        Ok(())
    }

    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval_secs)
    }
}

fn validate_camera(camera: &CameraDescriptor) -> Result<(), ConfigLoadError> {
    if camera.name.trim().is_empty() {
        return Err(ConfigLoadError::Validation(
            "camera name must not be empty".to_string(),
        ));
    }
    // The name becomes a single directory component.
    if camera.name.contains(['/', '\\']) || camera.name == "." || camera.name == ".." {
        return Err(ConfigLoadError::Validation(format!(
            "camera name '{}' must be a single path segment",
            camera.name
        )));
    }
    if camera.url.trim().is_empty() {
        return Err(ConfigLoadError::Validation(format!(
            "camera '{}' has no url",
            camera.name
        )));
    }
    Ok(())
}

fn default_interval_secs() -> u64 {
    60
}

fn default_log_level() -> String {
    "info".to_string()
}
