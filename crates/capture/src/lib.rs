//! camsnap capture layer
//!
//! This is the whole job of camsnap in one place: pull a still JPEG from a
//! network camera, put it on disk under a timestamped name, prove it decodes,
//! optionally mirror it to a fixed "latest" path, and point `version.json` at it.
//!
//! ## What we do here
//!
//! - **Prepare directories** - `<output_dir>/<camera>` and the mirror's parent are
//!   created before any network traffic, so a bad path fails fast.
//! - **Fetch** - one GET through an injected [`SnapshotSource`]. No retries.
//! - **Persist** - the body is streamed straight into
//!   `<output_dir>/<camera>/<YYYYMMDD-HHMMSS><TZ>.jpg`.
//! - **Verify** - the saved file is re-read and fully decoded as JPEG. Bad bytes
//!   stay on disk for inspection but nothing downstream happens.
//! - **Mirror and record** - only validated bytes are copied to `save_to` and
//!   named in `version.json`.
//!
//! Cameras with credentials are skipped with a warning and reported as
//! [`CaptureOutcome::SkippedAuth`]. Authenticated capture is not implemented.
//!
//! ## Example
//!
//! ```no_run
//! use capture::{capture, CameraDescriptor, CaptureConfig, HttpSource};
//! use std::path::Path;
//!
//! let source = HttpSource::new(&CaptureConfig::default()).unwrap();
//! let camera = CameraDescriptor::new("front", "http://cam.local/snap.jpg")
//!     .with_save_to("/srv/www/front.jpg");
//!
//! let outcome = capture(&source, Path::new("/data"), &camera).unwrap();
//! if let Some(report) = outcome.report() {
//!     println!("saved {}", report.primary.display());
//! }
//! ```
use std::fmt;
use std::fs::{File, OpenOptions};
use std::io::{self, BufReader, Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};
use std::time::Instant;

use chrono::{DateTime, Local, TimeZone, Utc};
use chrono_tz::Tz;
use tracing::{debug, info, trace, warn, Level};

mod camera;
mod config;
mod error;
mod fetch;
mod fsutil;
mod integrity;
mod version;

pub use crate::camera::{CameraAuth, CameraDescriptor};
pub use crate::config::{CaptureConfig, ConfigError, DEFAULT_TIMEOUT_SECS};
pub use crate::error::{CaptureError, CaptureStage};
pub use crate::fetch::{FetchError, HttpSource, Snapshot, SnapshotSource};
pub use crate::fsutil::{ensure_dir, mirror_parent};
pub use crate::integrity::verify_image;
pub use crate::version::{VersionError, VersionRecord, VERSION_FILE};

/// Result of a capture that did not fail.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CaptureOutcome {
    /// A fresh image was saved, validated, and recorded.
    Saved(CaptureReport),
    /// The camera carries credentials, so nothing was fetched or written
    /// beyond directory creation.
    SkippedAuth,
}

impl CaptureOutcome {
    pub fn is_saved(&self) -> bool {
        matches!(self, CaptureOutcome::Saved(_))
    }

    pub fn report(&self) -> Option<&CaptureReport> {
        match self {
            CaptureOutcome::Saved(report) => Some(report),
            CaptureOutcome::SkippedAuth => None,
        }
    }
}

/// What a successful capture produced on disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CaptureReport {
    pub primary: PathBuf,
    pub mirror: Option<PathBuf>,
    pub bytes: u64,
    pub version: VersionRecord,
}

/// Capture `camera` into `output_dir` using the current local time.
pub fn capture<S>(
    source: &S,
    output_dir: &Path,
    camera: &CameraDescriptor,
) -> Result<CaptureOutcome, CaptureError>
where
    S: SnapshotSource + ?Sized,
{
    match local_zone() {
        Some(zone) => capture_at(source, output_dir, camera, &Utc::now().with_timezone(&zone)),
        None => capture_at(source, output_dir, camera, &Local::now()),
    }
}

/// The system zone by IANA name: `TZ` when set, else the platform setting.
///
/// `None` when the name is unknown to the tz database, in which case the
/// caller falls back to a numeric offset.
pub fn local_zone() -> Option<Tz> {
    let name = match std::env::var("TZ") {
        Ok(tz) => tz.trim_start_matches(':').to_string(),
        Err(_) => iana_time_zone::get_timezone().ok()?,
    };
    match name.parse::<Tz>() {
        Ok(zone) => Some(zone),
        Err(_) => {
            debug!(zone = %name, "unknown time zone name, using numeric offset");
            None
        }
    }
}

/// Capture with an explicit timestamp for the image filename.
pub fn capture_at<S, Z>(
    source: &S,
    output_dir: &Path,
    camera: &CameraDescriptor,
    now: &DateTime<Z>,
) -> Result<CaptureOutcome, CaptureError>
where
    S: SnapshotSource + ?Sized,
    Z: TimeZone,
    Z::Offset: fmt::Display,
{
    let start = Instant::now();
    let span = tracing::span!(Level::INFO, "capture.capture", camera = %camera.name);
    let _guard = span.enter();

    match capture_inner(source, output_dir, camera, now) {
        Ok(outcome) => {
            let elapsed_micros = start.elapsed().as_micros();
            match &outcome {
                CaptureOutcome::Saved(report) => info!(
                    path = %report.primary.display(),
                    bytes = report.bytes,
                    mirrored = report.mirror.is_some(),
                    elapsed_micros,
                    "capture_success"
                ),
                CaptureOutcome::SkippedAuth => info!(elapsed_micros, "capture_skipped"),
            }
            Ok(outcome)
        }
        Err(err) => {
            let elapsed_micros = start.elapsed().as_micros();
            warn!(
                stage = %err.stage(),
                error = %err,
                elapsed_micros,
                "capture_failure"
            );
            Err(err)
        }
    }
}

fn capture_inner<S, Z>(
    source: &S,
    output_dir: &Path,
    camera: &CameraDescriptor,
    now: &DateTime<Z>,
) -> Result<CaptureOutcome, CaptureError>
where
    S: SnapshotSource + ?Sized,
    Z: TimeZone,
    Z::Offset: fmt::Display,
{
    let name = camera.name.as_str();
    let camera_dir = output_dir.join(name);
    let filename = snapshot_filename(now);
    let primary = camera_dir.join(&filename);

    ensure_dir(&camera_dir)
        .map_err(|e| CaptureError::fs(name, CaptureStage::CameraDirectory, e))?;
    if let Some(save_to) = camera.mirror_path() {
        ensure_dir(&mirror_parent(save_to))
            .map_err(|e| CaptureError::fs(name, CaptureStage::MirrorDirectory, e))?;
    }

    if camera.requires_auth() {
        warn!(camera = name, "found auth, not implemented, skipping camera");
        return Ok(CaptureOutcome::SkippedAuth);
    }

    trace!(url = %camera.url, "initiating request");
    let snapshot = source
        .fetch(&camera.url)
        .map_err(|source| network(camera, source))?;
    trace!(url = %camera.url, status = snapshot.status, "got response");

    trace!(path = %primary.display(), "saving image");
    let mut file = OpenOptions::new()
        .read(true)
        .write(true)
        .create(true)
        .truncate(true)
        .open(&primary)
        .map_err(|e| CaptureError::fs(name, CaptureStage::WritePrimary, e))?;
    let bytes = stream_body(snapshot.body, &mut file, camera)?;

    file.seek(SeekFrom::Start(0))
        .map_err(|e| CaptureError::fs(name, CaptureStage::ReadPrimary, e))?;
    verify_image(BufReader::new(&mut file)).map_err(|source| CaptureError::Integrity {
        camera: name.to_string(),
        path: primary.clone(),
        source,
    })?;
    trace!(path = %primary.display(), bytes, "image verified");

    let mirror = match camera.mirror_path() {
        Some(save_to) => {
            copy_to_mirror(&mut file, save_to, name)?;
            Some(save_to.to_path_buf())
        }
        None => None,
    };

    let version = VersionRecord::new(&camera_dir, name, filename);
    version
        .save()
        .map_err(|e| CaptureError::fs(name, CaptureStage::WriteVersion, e))?;

    info!(path = %primary.display(), "saved image");
    Ok(CaptureOutcome::Saved(CaptureReport {
        primary,
        mirror,
        bytes,
        version,
    }))
}

/// `YYYYMMDD-HHMMSS` followed by the zone abbreviation, e.g. `CET`.
///
/// Zones without an abbreviation yield `+HHMM`/`-HHMM`, and a bare zero offset
/// yields `UTC`. Colons are dropped so the name is valid on every filesystem.
pub fn snapshot_filename<Z>(now: &DateTime<Z>) -> String
where
    Z: TimeZone,
    Z::Offset: fmt::Display,
{
    let stamp = now.format("%Y%m%d-%H%M%S");
    let zone: String = now
        .offset()
        .to_string()
        .chars()
        .filter(|&c| c != ':')
        .collect();
    match zone.as_str() {
        "+0000" => format!("{stamp}UTC.jpg"),
        _ => format!("{stamp}{zone}.jpg"),
    }
}

fn network(camera: &CameraDescriptor, source: FetchError) -> CaptureError {
    CaptureError::Network {
        camera: camera.name.clone(),
        url: camera.url.clone(),
        source,
    }
}

/// Copy the response body into `file`, keeping read and write failures apart.
/// The body is dropped, closing the response, before this returns.
fn stream_body(
    mut body: Box<dyn Read + Send>,
    file: &mut File,
    camera: &CameraDescriptor,
) -> Result<u64, CaptureError> {
    let mut buf = [0u8; 8 * 1024];
    let mut total = 0u64;
    loop {
        let n = match body.read(&mut buf) {
            Ok(0) => break,
            Ok(n) => n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(network(camera, FetchError::Body(e))),
        };
        file.write_all(&buf[..n])
            .map_err(|e| CaptureError::fs(&camera.name, CaptureStage::WritePrimary, e))?;
        total += n as u64;
    }
    file.flush()
        .map_err(|e| CaptureError::fs(&camera.name, CaptureStage::WritePrimary, e))?;
    Ok(total)
}

fn copy_to_mirror(primary: &mut File, save_to: &Path, camera: &str) -> Result<u64, CaptureError> {
    trace!(path = %save_to.display(), "saving image to mirror");
    primary
        .seek(SeekFrom::Start(0))
        .map_err(|e| CaptureError::fs(camera, CaptureStage::ReadPrimary, e))?;

    let mut mirror = OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .open(save_to)
        .map_err(|e| CaptureError::fs(camera, CaptureStage::WriteMirror, e))?;
    let copied = io::copy(primary, &mut mirror)
        .and_then(|n| mirror.flush().map(|()| n))
        .map_err(|e| CaptureError::fs(camera, CaptureStage::WriteMirror, e))?;

    info!(path = %save_to.display(), bytes = copied, "saved image to mirror");
    Ok(copied)
}
