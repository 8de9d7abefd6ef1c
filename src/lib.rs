//! Workspace umbrella crate for camsnap.
//!
//! This crate wraps the single-camera capture pipeline from the `capture`
//! crate with the pieces a long-running archiver needs: a YAML config, a
//! cycle that walks every configured camera, and a fixed-interval schedule.

pub mod config;

pub use capture::{
    CameraAuth, CameraDescriptor, CaptureConfig, CaptureError, CaptureOutcome, CaptureReport,
    CaptureStage, FetchError, HttpSource, Snapshot, SnapshotSource, VersionError, VersionRecord,
    capture, capture_at, ensure_dir, snapshot_filename, verify_image,
};
pub use config::{CamsnapConfig, ConfigLoadError};

use std::sync::mpsc::{Receiver, RecvTimeoutError};
use std::time::Instant;

use tracing::{Level, error, info};

/// Tally of one pass over all configured cameras.
#[derive(Debug, Default)]
pub struct CycleSummary {
    pub saved: usize,
    pub skipped: usize,
    pub failures: Vec<CaptureError>,
}

impl CycleSummary {
    pub fn failed(&self) -> usize {
        self.failures.len()
    }

    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }

    pub fn attempted(&self) -> usize {
        self.saved + self.skipped + self.failed()
    }
}

/// Capture every configured camera once, in config order.
///
/// A failing camera is logged and recorded; the remaining cameras still run.
pub fn run_cycle<S>(config: &CamsnapConfig, source: &S) -> CycleSummary
where
    S: SnapshotSource + ?Sized,
{
    let start = Instant::now();
    let span = tracing::span!(Level::INFO, "camsnap.cycle", cameras = config.cameras.len());
    let _guard = span.enter();

    let mut summary = CycleSummary::default();
    for camera in &config.cameras {
        match capture(source, &config.output_dir, camera) {
            Ok(CaptureOutcome::Saved(_)) => summary.saved += 1,
            Ok(CaptureOutcome::SkippedAuth) => summary.skipped += 1,
            Err(err) => {
                error!(camera = %camera.name, stage = %err.stage(), error = %err, "camera failed");
                summary.failures.push(err);
            }
        }
    }

    info!(
        saved = summary.saved,
        skipped = summary.skipped,
        failed = summary.failed(),
        elapsed_ms = start.elapsed().as_millis() as u64,
        "cycle_complete"
    );
    summary
}

/// Run capture cycles every `config.interval_secs` until told to stop.
///
/// The first cycle starts immediately. Any message on `shutdown`, or the
/// sender hanging up, ends the loop at the next wait. Returns the number of
/// cycles that ran.
pub fn run_schedule<S>(config: &CamsnapConfig, source: &S, shutdown: &Receiver<()>) -> usize
where
    S: SnapshotSource + ?Sized,
{
    let interval = config.interval();
    info!(
        interval_secs = interval.as_secs(),
        cameras = config.cameras.len(),
        output_dir = %config.output_dir.display(),
        "schedule started"
    );

    let mut cycles = 0;
    loop {
        let started = Instant::now();
        run_cycle(config, source);
        cycles += 1;

        let wait = interval.saturating_sub(started.elapsed());
        match shutdown.recv_timeout(wait) {
            Err(RecvTimeoutError::Timeout) => continue,
            Ok(()) | Err(RecvTimeoutError::Disconnected) => break,
        }
    }

    info!(cycles, "schedule stopped");
    cycles
}
