// SPDX-License-Identifier: GPL-3.0-only

//! Test doubles shared by the integration tests

#![allow(dead_code)]

use barcode_scanner::backends::camera::types::{
    BackendError, BackendResult, CameraDevice, CameraFormat, CameraFrame, PixelFormat,
};
use barcode_scanner::backends::camera::{CameraBackend, DeviceInput};
use barcode_scanner::errors::CameraError;
use barcode_scanner::scanner::{BarcodeDecoder, MetadataObject, ScanResultListener, Scanner, Symbology};
use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::thread;
use std::time::{Duration, Instant};

/// Everything a listener received, in order
#[derive(Debug, Default)]
pub struct Recorder {
    pub events: Vec<Result<String, CameraError>>,
}

impl Recorder {
    pub fn errors(&self) -> Vec<CameraError> {
        self.events.iter().filter_map(|e| e.clone().err()).collect()
    }
}

impl ScanResultListener for Recorder {
    fn on_decoded(&mut self, barcode: &str) {
        self.events.push(Ok(barcode.to_string()));
    }

    fn on_error(&mut self, error: CameraError) {
        self.events.push(Err(error));
    }
}

pub fn camera(path: &str) -> CameraDevice {
    CameraDevice {
        name: format!("Test camera {}", path),
        path: path.to_string(),
        device_info: None,
    }
}

/// What `create_input` of a [`MockBackend`] does
pub enum InputBehavior {
    /// Fail with the given error
    Fail(BackendError),
    /// Deliver the frames, then the given error
    Frames {
        format: PixelFormat,
        count: u64,
        end: BackendError,
    },
}

/// Backend with scripted devices and inputs
pub struct MockBackend {
    pub devices: Vec<CameraDevice>,
    pub behavior: InputBehavior,
    pub inputs_created: Arc<AtomicUsize>,
}

impl MockBackend {
    pub fn without_devices() -> Self {
        Self {
            devices: Vec::new(),
            behavior: InputBehavior::Fail(BackendError::DeviceNotFound("none".into())),
            inputs_created: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn with_behavior(behavior: InputBehavior) -> Self {
        Self {
            devices: vec![camera("/dev/video0")],
            behavior,
            inputs_created: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn streaming(count: u64, end: BackendError) -> Self {
        Self::with_behavior(InputBehavior::Frames {
            format: PixelFormat::Gray8,
            count,
            end,
        })
    }
}

impl CameraBackend for MockBackend {
    fn enumerate_cameras(&self) -> Vec<CameraDevice> {
        self.devices.clone()
    }

    fn create_input(&self, device: &CameraDevice) -> BackendResult<Box<dyn DeviceInput>> {
        self.inputs_created.fetch_add(1, Ordering::SeqCst);
        match &self.behavior {
            InputBehavior::Fail(error) => Err(error.clone()),
            InputBehavior::Frames { format, count, end } => Ok(Box::new(MockInput {
                device: device.clone(),
                format: CameraFormat {
                    width: 4,
                    height: 4,
                    framerate: None,
                    pixel_format: *format,
                },
                remaining: *count,
                end: end.clone(),
                sequence: 0,
            })),
        }
    }

    fn name(&self) -> &'static str {
        "Mock"
    }
}

pub struct MockInput {
    device: CameraDevice,
    format: CameraFormat,
    remaining: u64,
    end: BackendError,
    sequence: u64,
}

impl DeviceInput for MockInput {
    fn device(&self) -> &CameraDevice {
        &self.device
    }

    fn format(&self) -> &CameraFormat {
        &self.format
    }

    fn next_frame(&mut self) -> BackendResult<CameraFrame> {
        if self.remaining == 0 {
            return Err(self.end.clone());
        }
        self.remaining -= 1;
        self.sequence += 1;
        thread::sleep(Duration::from_millis(1));

        let mut frame = CameraFrame::from_gray(4, 4, vec![0; 16]);
        frame.sequence = self.sequence;
        Ok(frame)
    }
}

/// Decoder answering from a per-sequence script; unscripted frames are empty
pub struct ScriptedDecoder {
    pub supported: Vec<Symbology>,
    pub script: HashMap<u64, Vec<MetadataObject>>,
    pub queries: AtomicUsize,
}

impl ScriptedDecoder {
    pub fn new(script: Vec<(u64, Vec<MetadataObject>)>) -> Self {
        Self {
            supported: Symbology::SCANNED.to_vec(),
            script: script.into_iter().collect(),
            queries: AtomicUsize::new(0),
        }
    }

    pub fn supporting(supported: Vec<Symbology>) -> Self {
        Self {
            supported,
            script: HashMap::new(),
            queries: AtomicUsize::new(0),
        }
    }
}

impl BarcodeDecoder for ScriptedDecoder {
    fn supported_symbologies(&self) -> &[Symbology] {
        self.queries.fetch_add(1, Ordering::SeqCst);
        &self.supported
    }

    fn detect(&self, frame: &CameraFrame, _symbologies: &[Symbology]) -> Vec<MetadataObject> {
        self.script.get(&frame.sequence).cloned().unwrap_or_default()
    }
}

/// Dispatch until the capture thread ended and the queue is drained
pub fn run_to_completion(scanner: &mut Scanner) {
    let deadline = Instant::now() + Duration::from_secs(10);
    while (scanner.is_acquiring() || scanner.has_pending_source()) && Instant::now() < deadline {
        scanner.dispatch_pending();
        thread::sleep(Duration::from_millis(2));
    }
    scanner.dispatch_pending();
}

/// Wait without dispatching until the capture thread has exited
pub fn wait_for_capture_end(scanner: &Scanner) {
    let deadline = Instant::now() + Duration::from_secs(10);
    while scanner.is_acquiring() && Instant::now() < deadline {
        thread::sleep(Duration::from_millis(2));
    }
}
