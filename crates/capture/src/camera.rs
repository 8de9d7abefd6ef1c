//! Camera descriptors as they appear in the config file.
//!
//! An empty `save_to` means "no mirror". Credentials are carried but never
//! printed.
use std::fmt;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Deserializer, Serialize};

/// One capture target.
///
/// `name` doubles as the subdirectory under the output directory and as the
/// tag on every log line for this camera.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CameraDescriptor {
    pub name: String,
    pub url: String,

    /// Credentials for the camera. Authenticated capture is not supported;
    /// a camera carrying credentials is skipped.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub auth: Option<CameraAuth>,

    /// Fixed path that receives a copy of every validated capture.
    /// An empty string in config means no mirroring.
    #[serde(
        default,
        deserialize_with = "empty_path_as_none",
        skip_serializing_if = "Option::is_none"
    )]
    pub save_to: Option<PathBuf>,
}

impl CameraDescriptor {
    pub fn new(name: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            url: url.into(),
            auth: None,
            save_to: None,
        }
    }

    pub fn with_auth(mut self, auth: CameraAuth) -> Self {
        self.auth = Some(auth);
        self
    }

    /// Set the mirror path. An empty path clears it.
    pub fn with_save_to(mut self, path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        self.save_to = if path.as_os_str().is_empty() {
            None
        } else {
            Some(path)
        };
        self
    }

    pub fn mirror_path(&self) -> Option<&Path> {
        self.save_to.as_deref()
    }

    pub fn requires_auth(&self) -> bool {
        self.auth.is_some()
    }
}

#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CameraAuth {
    pub username: String,
    pub password: String,
}

impl fmt::Debug for CameraAuth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CameraAuth")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

fn empty_path_as_none<'de, D>(deserializer: D) -> Result<Option<PathBuf>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    Ok(raw.filter(|s| !s.is_empty()).map(PathBuf::from))
}
