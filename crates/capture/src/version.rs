//! The `version.json` record naming the latest capture of a camera.
//!
//! ```json
//! { "Directory": "/data/front", "Camera": "front", "Latest": "20240101-120000UTC.jpg" }
//! ```
//!
//! One record per camera directory, overwritten after every successful
//! capture. No history is kept.
use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// File name of the record inside a camera directory.
pub const VERSION_FILE: &str = "version.json";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct VersionRecord {
    /// Camera directory holding both the images and this record.
    pub directory: PathBuf,
    pub camera: String,
    /// Basename of the newest image, relative to `directory`.
    pub latest: String,
}

#[derive(Debug, Error)]
pub enum VersionError {
    #[error("failed to read version file: {0}")]
    Read(#[from] io::Error),
    #[error("failed to parse version file: {0}")]
    Parse(#[from] serde_json::Error),
}

impl VersionRecord {
    pub fn new(
        directory: impl Into<PathBuf>,
        camera: impl Into<String>,
        latest: impl Into<String>,
    ) -> Self {
        Self {
            directory: directory.into(),
            camera: camera.into(),
            latest: latest.into(),
        }
    }

    /// Location of the record for a camera directory.
    pub fn path_in(dir: &Path) -> PathBuf {
        dir.join(VERSION_FILE)
    }

    /// Full path of the image the record points at.
    pub fn latest_path(&self) -> PathBuf {
        self.directory.join(&self.latest)
    }

    /// Write the record to `<directory>/version.json`, replacing any previous one.
    pub fn save(&self) -> io::Result<()> {
        let data = serde_json::to_vec(self).map_err(io::Error::other)?;
        let mut file = OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(true)
            .open(Self::path_in(&self.directory))?;
        file.write_all(&data)?;
        file.flush()
    }

    /// Read the record stored in `dir`.
    pub fn load(dir: &Path) -> Result<Self, VersionError> {
        let data = fs::read(Self::path_in(dir))?;
        Ok(serde_json::from_slice(&data)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn json_uses_capitalized_keys() {
        let record = VersionRecord::new("/data/front", "front", "20240101-120000UTC.jpg");
        let json = serde_json::to_string(&record).unwrap();
        assert_eq!(
            json,
            r#"{"Directory":"/data/front","Camera":"front","Latest":"20240101-120000UTC.jpg"}"#
        );
    }

    #[test]
    fn save_then_load() {
        let tmp = tempdir().unwrap();
        let record = VersionRecord::new(tmp.path(), "front", "a.jpg");
        record.save().unwrap();
        assert_eq!(VersionRecord::load(tmp.path()).unwrap(), record);
        assert_eq!(record.latest_path(), tmp.path().join("a.jpg"));
    }

    #[test]
    fn shorter_record_overwrites_cleanly() {
        let tmp = tempdir().unwrap();
        VersionRecord::new(tmp.path(), "front", "a-very-long-file-name-20240101.jpg")
            .save()
            .unwrap();
        let short = VersionRecord::new(tmp.path(), "front", "b.jpg");
        short.save().unwrap();
        assert_eq!(VersionRecord::load(tmp.path()).unwrap(), short);
    }

    #[test]
    fn load_missing_is_read_error() {
        let tmp = tempdir().unwrap();
        assert!(matches!(
            VersionRecord::load(tmp.path()),
            Err(VersionError::Read(_))
        ));
    }

    #[test]
    fn load_garbage_is_parse_error() {
        let tmp = tempdir().unwrap();
        fs::write(tmp.path().join(VERSION_FILE), b"{not json").unwrap();
        assert!(matches!(
            VersionRecord::load(tmp.path()),
            Err(VersionError::Parse(_))
        ));
    }
}
