use std::fs;
use std::io::Cursor;

use camsnap::{
    CameraDescriptor, CamsnapConfig, CaptureError, CaptureStage, ConfigLoadError, FetchError,
    Snapshot, SnapshotSource, capture,
};
use tempfile::tempdir;

struct Garbage;

impl SnapshotSource for Garbage {
    fn fetch(&self, _url: &str) -> Result<Snapshot, FetchError> {
        Ok(Snapshot::new(200, Cursor::new(vec![0x42; 256])))
    }
}

#[test]
fn invalid_yaml_is_parse_error() {
    let result = CamsnapConfig::from_yaml("version: [unterminated");
    assert!(matches!(result, Err(ConfigLoadError::YamlParse(_))));
}

#[test]
fn missing_output_dir_is_parse_error() {
    let yaml = r#"
version: "1.0"
cameras:
  - { name: "front", url: "http://a/snap.jpg" }
"#;
    assert!(matches!(
        CamsnapConfig::from_yaml(yaml),
        Err(ConfigLoadError::YamlParse(_))
    ));
}

#[test]
fn integrity_failure_carries_camera_and_path() {
    let data = tempdir().unwrap();
    let camera = CameraDescriptor::new("porch", "http://porch/snap.jpg");

    let err = capture(&Garbage, data.path(), &camera).unwrap_err();

    assert_eq!(err.camera(), "porch");
    assert_eq!(err.stage(), CaptureStage::Verify);
    let CaptureError::Integrity { path, .. } = &err else {
        panic!("expected integrity error, got {err:?}");
    };
    assert_eq!(fs::read(path).unwrap(), vec![0x42; 256]);
    assert!(err.to_string().contains("[porch]"));
}

#[test]
fn unwritable_mirror_reports_write_mirror_stage() {
    let data = tempdir().unwrap();
    // A directory where the mirror file should go cannot be opened for writing.
    let mirror = data.path().join("mirror-is-a-dir");
    fs::create_dir_all(&mirror).unwrap();

    struct Valid;
    impl SnapshotSource for Valid {
        fn fetch(&self, _url: &str) -> Result<Snapshot, FetchError> {
            let img = image::RgbImage::from_pixel(10, 10, image::Rgb([0, 0, 0]));
            let mut out = Cursor::new(Vec::new());
            img.write_to(&mut out, image::ImageFormat::Jpeg)
                .expect("encode fixture");
            Ok(Snapshot::new(200, Cursor::new(out.into_inner())))
        }
    }

    let camera = CameraDescriptor::new("front", "http://front/snap.jpg").with_save_to(&mirror);
    let err = capture(&Valid, data.path(), &camera).unwrap_err();

    assert_eq!(err.stage(), CaptureStage::WriteMirror);
    assert!(matches!(err, CaptureError::Filesystem { .. }));
    // Validation passed but the record is only written after the mirror.
    assert!(!data.path().join("front").join("version.json").exists());
}
