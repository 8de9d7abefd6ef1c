use std::collections::HashMap;
use std::fs;
use std::io::Cursor;
use std::path::Path;
use std::sync::Mutex;
use std::sync::mpsc;
use std::time::{Duration, Instant};

use camsnap::{
    CamsnapConfig, FetchError, Snapshot, SnapshotSource, VersionRecord, run_cycle, run_schedule,
};
use tempfile::tempdir;

fn jpeg(width: u32, height: u32) -> Vec<u8> {
    let img = image::RgbImage::from_pixel(width, height, image::Rgb([10, 120, 200]));
    let mut out = Cursor::new(Vec::new());
    img.write_to(&mut out, image::ImageFormat::Jpeg)
        .expect("encode fixture");
    out.into_inner()
}

/// Serves canned bodies per URL and records every request.
#[derive(Default)]
struct FakeCameras {
    bodies: HashMap<String, Vec<u8>>,
    requests: Mutex<Vec<String>>,
}

impl FakeCameras {
    fn with(mut self, url: &str, body: Vec<u8>) -> Self {
        self.bodies.insert(url.to_string(), body);
        self
    }

    fn requests(&self) -> Vec<String> {
        self.requests.lock().unwrap().clone()
    }
}

impl SnapshotSource for FakeCameras {
    fn fetch(&self, url: &str) -> Result<Snapshot, FetchError> {
        self.requests.lock().unwrap().push(url.to_string());
        match self.bodies.get(url) {
            Some(body) => Ok(Snapshot::new(200, Cursor::new(body.clone()))),
            None => Err(FetchError::Body(std::io::Error::new(
                std::io::ErrorKind::ConnectionRefused,
                "no camera at this address",
            ))),
        }
    }
}

fn config_for(output_dir: &Path, cameras_yaml: &str) -> CamsnapConfig {
    let yaml = format!(
        "version: \"1.0\"\noutput_dir: \"{}\"\ninterval_secs: 1\ncameras:\n{cameras_yaml}",
        output_dir.display()
    );
    CamsnapConfig::from_yaml(&yaml).expect("valid test config")
}

#[test]
fn cycle_captures_every_camera_and_continues_past_failures() {
    let data = tempdir().unwrap();
    let front = jpeg(10, 10);
    let source = FakeCameras::default()
        .with("http://front/snap.jpg", front.clone())
        .with("http://bad/snap.jpg", b"<html>oops</html>".to_vec());
    let config = config_for(
        data.path(),
        r#"
  - { name: "front", url: "http://front/snap.jpg" }
  - { name: "bad", url: "http://bad/snap.jpg" }
  - { name: "gone", url: "http://gone/snap.jpg" }
  - name: "locked"
    url: "http://locked/snap.jpg"
    auth: { username: "u", password: "p" }
"#,
    );

    let summary = run_cycle(&config, &source);

    assert_eq!(summary.saved, 1);
    assert_eq!(summary.skipped, 1);
    assert_eq!(summary.failed(), 2);
    assert_eq!(summary.attempted(), 4);
    assert!(!summary.is_clean());

    let failed: Vec<&str> = summary.failures.iter().map(|e| e.camera()).collect();
    assert_eq!(failed, ["bad", "gone"]);

    // The locked camera is never contacted.
    assert_eq!(
        source.requests(),
        [
            "http://front/snap.jpg",
            "http://bad/snap.jpg",
            "http://gone/snap.jpg"
        ]
    );

    let record = VersionRecord::load(&data.path().join("front")).unwrap();
    assert_eq!(fs::read(record.latest_path()).unwrap(), front);
    assert!(VersionRecord::load(&data.path().join("bad")).is_err());
}

#[test]
fn mirror_tracks_latest_capture() {
    let data = tempdir().unwrap();
    let mirror = data.path().join("public").join("front.jpg");
    let body = jpeg(12, 12);
    let source = FakeCameras::default().with("http://front/snap.jpg", body.clone());
    let config = config_for(
        data.path(),
        &format!(
            "  - {{ name: \"front\", url: \"http://front/snap.jpg\", save_to: \"{}\" }}\n",
            mirror.display()
        ),
    );

    let summary = run_cycle(&config, &source);

    assert!(summary.is_clean());
    assert_eq!(fs::read(&mirror).unwrap(), body);
}

#[test]
fn schedule_stops_on_shutdown_signal() {
    let data = tempdir().unwrap();
    let source = FakeCameras::default().with("http://front/snap.jpg", jpeg(10, 10));
    let config = config_for(
        data.path(),
        "  - { name: \"front\", url: \"http://front/snap.jpg\" }\n",
    );

    let (tx, rx) = mpsc::channel();
    tx.send(()).unwrap();

    let started = Instant::now();
    let cycles = run_schedule(&config, &source, &rx);

    assert_eq!(cycles, 1);
    assert!(started.elapsed() < Duration::from_secs(1));
    assert_eq!(source.requests().len(), 1);
}

#[test]
fn schedule_stops_when_sender_dropped() {
    let data = tempdir().unwrap();
    let source = FakeCameras::default().with("http://front/snap.jpg", jpeg(10, 10));
    let config = config_for(
        data.path(),
        "  - { name: \"front\", url: \"http://front/snap.jpg\" }\n",
    );

    let (tx, rx) = mpsc::channel::<()>();
    drop(tx);

    assert_eq!(run_schedule(&config, &source, &rx), 1);
}

#[test]
fn schedule_repeats_on_interval() {
    let data = tempdir().unwrap();
    let source = FakeCameras::default().with("http://front/snap.jpg", jpeg(10, 10));
    let config = config_for(
        data.path(),
        "  - { name: \"front\", url: \"http://front/snap.jpg\" }\n",
    );

    let (tx, rx) = mpsc::channel();
    let stopper = std::thread::spawn(move || {
        std::thread::sleep(Duration::from_millis(1500));
        tx.send(()).unwrap();
    });

    let cycles = run_schedule(&config, &source, &rx);
    stopper.join().unwrap();

    assert_eq!(cycles, 2);
    assert_eq!(source.requests().len(), 2);
}
