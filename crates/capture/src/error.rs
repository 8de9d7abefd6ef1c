//! Error types produced by the capture crate.
//!
//! Every failure the pipeline can hit is returned to the caller at the first
//! failing step. Nothing is retried internally and nothing panics for
//! recoverable I/O or decode conditions.
//!
//! # Error Categories
//!
//! | Error | Category | Description |
//! |-------|----------|-------------|
//! | [`Filesystem`](CaptureError::Filesystem) | Local I/O | Directory creation, image or version file open/write |
//! | [`Network`](CaptureError::Network) | Transport | GET failed or the body could not be read |
//! | [`Integrity`](CaptureError::Integrity) | Validation | Saved bytes do not decode as JPEG |
//!
//! A camera with credentials configured is not an error: the pipeline skips it
//! and reports [`CaptureOutcome::SkippedAuth`](crate::CaptureOutcome::SkippedAuth).
//!
//! # Examples
//!
//! ```rust
//! use capture::{CaptureError, CaptureStage};
//! use std::io;
//!
//! let err = CaptureError::Filesystem {
//!     camera: "front".into(),
//!     stage: CaptureStage::WritePrimary,
//!     source: io::Error::new(io::ErrorKind::PermissionDenied, "denied"),
//! };
//!
//! assert_eq!(err.camera(), "front");
//! assert_eq!(err.stage(), CaptureStage::WritePrimary);
//! assert!(err.to_string().contains("write primary image"));
//! ```
use std::fmt;
use std::io;
use std::path::PathBuf;

use thiserror::Error;

use crate::fetch::FetchError;

/// The pipeline step a failure happened in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CaptureStage {
    /// Creating `<output_dir>/<camera>`.
    CameraDirectory,
    /// Creating the parent directory of the mirror path.
    MirrorDirectory,
    /// Issuing the GET or reading the response body.
    Fetch,
    /// Opening or writing the timestamped image.
    WritePrimary,
    /// Re-reading the timestamped image for validation or mirroring.
    ReadPrimary,
    /// JPEG decode of the saved bytes.
    Verify,
    /// Opening or writing the mirror file.
    WriteMirror,
    /// Writing `version.json`.
    WriteVersion,
}

impl CaptureStage {
    /// Short human-readable name used in error messages and log fields.
    pub fn as_str(self) -> &'static str {
        match self {
            CaptureStage::CameraDirectory => "create camera directory",
            CaptureStage::MirrorDirectory => "create mirror directory",
            CaptureStage::Fetch => "fetch snapshot",
            CaptureStage::WritePrimary => "write primary image",
            CaptureStage::ReadPrimary => "read primary image",
            CaptureStage::Verify => "verify image",
            CaptureStage::WriteMirror => "write mirror image",
            CaptureStage::WriteVersion => "write version record",
        }
    }
}

impl fmt::Display for CaptureStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Errors surfaced by [`capture`](crate::capture).
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum CaptureError {
    /// Local filesystem failure at the given stage.
    #[error("[{camera}] failed to {stage}: {source}")]
    Filesystem {
        camera: String,
        stage: CaptureStage,
        #[source]
        source: io::Error,
    },

    /// Transport-level failure contacting the camera.
    ///
    /// Timeouts, refused connections, and body read failures all land here;
    /// they are not distinguished further.
    #[error("[{camera}] failed to fetch {url}: {source}")]
    Network {
        camera: String,
        url: String,
        #[source]
        source: FetchError,
    },

    /// The saved file is not a decodable JPEG. The file is left on disk.
    #[error("[{camera}] {} is not a valid JPEG: {source}", .path.display())]
    Integrity {
        camera: String,
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },
}

impl CaptureError {
    /// Name of the camera the failure belongs to.
    pub fn camera(&self) -> &str {
        match self {
            CaptureError::Filesystem { camera, .. }
            | CaptureError::Network { camera, .. }
            | CaptureError::Integrity { camera, .. } => camera,
        }
    }

    /// Pipeline step that failed.
    pub fn stage(&self) -> CaptureStage {
        match self {
            CaptureError::Filesystem { stage, .. } => *stage,
            CaptureError::Network { .. } => CaptureStage::Fetch,
            CaptureError::Integrity { .. } => CaptureStage::Verify,
        }
    }

    pub(crate) fn fs(camera: &str, stage: CaptureStage, source: io::Error) -> Self {
        CaptureError::Filesystem {
            camera: camera.to_string(),
            stage,
            source,
        }
    }
}
