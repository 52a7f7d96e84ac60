// SPDX-License-Identifier: MPL-2.0

//! Integration tests for configuration module

use barcode_scanner::Config;
use barcode_scanner::constants::capture;
use barcode_scanner::errors::AppError;
use std::path::PathBuf;

fn temp_path(name: &str) -> PathBuf {
    std::env::temp_dir().join(format!(
        "barcode-scanner-{}-{}.json",
        name,
        std::process::id()
    ))
}

#[test]
fn test_config_default() {
    let config = Config::default();

    assert!(config.camera_path.is_none());
    assert_eq!(config.capture_width, capture::DEFAULT_WIDTH);
    assert_eq!(config.capture_height, capture::DEFAULT_HEIGHT);
    assert!(
        config.metadata_queue_depth >= 1,
        "Metadata queue must hold at least one delivery"
    );
}

#[test]
fn test_missing_file_yields_defaults() {
    let config = Config::load_from(&temp_path("missing")).unwrap();
    assert_eq!(config, Config::default());
}

#[test]
fn test_load_from_file() {
    let path = temp_path("load");
    std::fs::write(
        &path,
        r#"{ "camera_path": "/dev/video2", "detection_max_dimension": 640 }"#,
    )
    .unwrap();

    let config = Config::load_from(&path).unwrap();
    std::fs::remove_file(&path).ok();

    assert_eq!(config.camera_path.as_deref(), Some("/dev/video2"));
    assert_eq!(config.detection_max_dimension, 640);
    assert_eq!(config.framerate, capture::DEFAULT_FRAMERATE);
}

#[test]
fn test_malformed_file_is_config_error() {
    let path = temp_path("malformed");
    std::fs::write(&path, "camera_path = /dev/video0").unwrap();

    let result = Config::load_from(&path);
    std::fs::remove_file(&path).ok();

    assert!(matches!(result, Err(AppError::Config(_))));
}

#[test]
fn test_default_path_location() {
    if let Some(path) = Config::default_path() {
        assert!(path.ends_with("barcode-scanner/config.json"));
    }
}
