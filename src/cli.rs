// SPDX-License-Identifier: GPL-3.0-only

//! CLI commands
//!
//! This module provides command-line functionality for:
//! - Scanning continuously from a camera or an image file
//! - Listing available cameras
//! - Decoding barcodes in image files

use barcode_scanner::app::{AlertItem, ScannerViewModel, StatusColor, UiScanState};
use barcode_scanner::backends::camera::types::{CameraFormat, Framerate};
use barcode_scanner::backends::camera::{CameraBackend, get_backend};
use barcode_scanner::backends::virtual_camera::{StillImageBackend, load_image_as_frame};
use barcode_scanner::constants::{text, timing};
use barcode_scanner::errors::{AppError, CameraError};
use barcode_scanner::scanner::{
    BarcodeDecoder, RxingDecoder, ScanEvent, Scanner, SessionState, Symbology, detect_barcode,
};
use barcode_scanner::Config;
use chrono::Local;
use std::cell::RefCell;
use std::path::PathBuf;
use std::rc::Rc;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// Options of the `scan` command
#[derive(Debug, Default)]
pub struct ScanOptions {
    pub camera: Option<usize>,
    pub image: Option<PathBuf>,
    pub once: bool,
}

/// Run the scanning pipeline until Ctrl+C, a fatal error or source exhaustion
pub fn scan(mut config: Config, options: ScanOptions) -> Result<(), Box<dyn std::error::Error>> {
    let backend: Box<dyn CameraBackend> = match &options.image {
        Some(path) => Box::new(StillImageBackend::from_paths(
            std::slice::from_ref(path),
            Framerate::from_int(config.framerate),
        )),
        None => {
            if let Some(index) = options.camera {
                let cameras = get_backend(&config).enumerate_cameras();
                let camera = cameras.get(index).ok_or_else(|| {
                    AppError::Other(format!(
                        "Camera index {} out of range ({} cameras found)",
                        index,
                        cameras.len()
                    ))
                })?;
                config.camera_path = Some(camera.path.clone());
            }
            get_backend(&config)
        }
    };

    let decoder = Arc::new(RxingDecoder::with_max_dimension(
        config.detection_max_dimension,
    ));
    let mut scanner = Scanner::new(backend, decoder, config.metadata_queue_depth);

    let view_model = Rc::new(RefCell::new(ScannerViewModel::new()));
    scanner.register_listener(&view_model);
    let mut state_receiver = view_model.borrow().subscribe();

    println!("{}", text::TITLE);
    println!();
    print_state(&view_model.borrow().state());

    let stop_flag = Arc::new(AtomicBool::new(false));
    let stop_flag_clone = stop_flag.clone();
    ctrlc::set_handler(move || {
        stop_flag_clone.store(true, Ordering::SeqCst);
    })?;

    if scanner.setup().is_ok() {
        if let Some(configuration) = scanner.configuration() {
            println!(
                "Using camera: {} ({})",
                configuration.device, configuration.format
            );
        }
        scanner.start();
        println!("Scanning... (press Ctrl+C to stop)");
    }

    let mut failure = None;
    loop {
        scanner.dispatch_pending();

        if state_receiver.has_changed().unwrap_or(false) {
            let state = state_receiver.borrow_and_update().clone();
            print_state(&state);

            if let Some(alert) = &state.alert_item {
                print_alert(alert);
                view_model.borrow().dismiss_alert();
                state_receiver.borrow_and_update();
            }

            if options.once && !state.scanned_code.is_empty() {
                break;
            }
        }

        if scanner.state() == SessionState::Error {
            failure = Some(CameraError::InvalidDeviceInput);
            break;
        }

        if stop_flag.load(Ordering::SeqCst) {
            println!();
            println!("Stopping...");
            break;
        }

        // Finite sources (image files) end on their own
        if !scanner.is_acquiring() && !scanner.has_pending_source() {
            break;
        }

        std::thread::sleep(timing::DISPATCH_INTERVAL);
    }

    scanner.stop();

    match failure {
        Some(error) => Err(AppError::from(error).into()),
        None => Ok(()),
    }
}

fn print_state(state: &UiScanState) {
    let color = match state.status_color() {
        StatusColor::Red => "red",
        StatusColor::Green => "green",
    };
    println!(
        "[{}] {} {} ({})",
        Local::now().format("%H:%M:%S%.3f"),
        text::SCANNED_BARCODE_LABEL,
        state.status_text(),
        color
    );
}

fn print_alert(alert: &AlertItem) {
    println!(
        "[{}] ! {}: {} [{}]",
        Local::now().format("%H:%M:%S%.3f"),
        alert.title,
        alert.message,
        alert.dismiss_button
    );
}

/// List all available cameras
pub fn list_cameras(config: &Config) -> Result<(), Box<dyn std::error::Error>> {
    let backend = get_backend(config);
    let cameras = backend.enumerate_cameras();

    if cameras.is_empty() {
        println!("No cameras found.");
        return Ok(());
    }

    println!("Available cameras ({}):", backend.name());
    println!();
    for (index, camera) in cameras.iter().enumerate() {
        println!("  [{}] {}", index, camera.name);
        println!("      Path: {}", camera.path);
        if let Some(info) = &camera.device_info {
            println!("      Driver: {} ({})", info.driver, info.bus);
        }

        let formats = backend.supported_formats(camera);
        if !formats.is_empty() {
            println!("      Formats: {}", summarize_formats(&formats).join(", "));
        }
        println!();
    }

    Ok(())
}

/// Distinct resolutions per pixel format, largest first, at most three
fn summarize_formats(formats: &[CameraFormat]) -> Vec<String> {
    let mut entries: Vec<(u32, u32, String)> = Vec::new();
    for format in formats {
        let label = format.pixel_format.to_string();
        if !entries
            .iter()
            .any(|(w, h, l)| *w == format.width && *h == format.height && *l == label)
        {
            entries.push((format.width, format.height, label));
        }
    }

    entries.sort_by(|a, b| (b.0 * b.1).cmp(&(a.0 * a.1)));
    entries
        .into_iter()
        .take(3)
        .map(|(w, h, label)| format!("{}x{} {}", w, h, label))
        .collect()
}

/// Decode each image once and print the outcome
pub fn decode_files(config: &Config, files: &[PathBuf]) -> Result<(), Box<dyn std::error::Error>> {
    let decoder = RxingDecoder::with_max_dimension(config.detection_max_dimension);
    let mut decoded = 0;

    for path in files {
        let frame = match load_image_as_frame(path) {
            Ok(frame) => frame,
            Err(e) => {
                println!("{}: {}", path.display(), e);
                continue;
            }
        };

        let objects = decoder.detect(&frame, &Symbology::SCANNED);
        match detect_barcode(&objects) {
            ScanEvent::Decoded { barcode } => {
                decoded += 1;
                let symbology = objects
                    .first()
                    .and_then(|object| object.as_machine_readable_code())
                    .map(|code| code.symbology.to_string())
                    .unwrap_or_default();
                println!("{}: {} ({})", path.display(), barcode, symbology);
            }
            ScanEvent::Failed(error) => {
                println!("{}: {}", path.display(), AlertItem::for_error(error).title);
            }
        }
    }

    if decoded == 0 {
        return Err(AppError::from(CameraError::InvalidScannedValue).into());
    }
    Ok(())
}
