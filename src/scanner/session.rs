// SPDX-License-Identifier: GPL-3.0-only

//! Capture session
//!
//! A session wires one device input to one metadata output. While running,
//! a dedicated capture thread pulls frames from the input, runs the metadata
//! output on each one, publishes the frame for preview and queues metadata
//! deliveries for the UI context.
//!
//! ```text
//! capture thread                         UI context
//! ──────────────                         ──────────
//! DeviceInput::next_frame
//!        │
//!        ├──► PreviewLayer slot  ◄──────  latest_frame()
//!        │
//! MetadataOutput::process
//!        │
//!        └──► broadcast ring  ──────────► Scanner::dispatch_pending
//! ```

use super::metadata::{MetadataObject, MetadataOutput};
use crate::backends::camera::frame_loop::{CaptureLoopController, LoopAction};
use crate::backends::camera::types::{
    BackendError, CameraDevice, CameraFormat, CameraFrame,
};
use crate::backends::camera::DeviceInput;
use crate::constants::{capture, timing};
use std::sync::{Arc, Mutex, PoisonError};
use tokio::sync::broadcast;
use tracing::{debug, info, warn};

/// Lifecycle of a scanning session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SessionState {
    /// Nothing configured yet
    #[default]
    Idle,
    /// Setup in progress, or configured and waiting to start
    Configuring,
    /// Frames are being acquired
    Running,
    /// Acquisition stopped; the session is not restarted
    Stopped,
    /// Setup failed or the device faulted
    Error,
}

/// Metadata produced for one frame
#[derive(Debug, Clone, PartialEq)]
pub struct MetadataBatch {
    pub sequence: u64,
    pub objects: Vec<MetadataObject>,
}

/// UI-side end of the metadata queue
///
/// When the UI context lags, the oldest deliveries are overwritten, so the
/// newest ones (including a disappearance) are always kept.
pub type MetadataReceiver = broadcast::Receiver<MetadataBatch>;

type FrameSlot = Arc<Mutex<Option<CameraFrame>>>;

/// Capture session with at most one input and one output
pub struct CaptureSession {
    input: Option<Box<dyn DeviceInput>>,
    output: Option<MetadataOutput>,
    input_device: Option<CameraDevice>,
    input_format: Option<CameraFormat>,
    preview_slot: FrameSlot,
    fault: Arc<Mutex<Option<BackendError>>>,
    capture_loop: Option<CaptureLoopController>,
    queue_depth: usize,
}

impl CaptureSession {
    /// Create an empty session
    ///
    /// `queue_depth` bounds the number of metadata deliveries waiting for the
    /// UI context; once full, each new delivery overwrites the oldest one.
    pub fn new(queue_depth: usize) -> Self {
        Self {
            input: None,
            output: None,
            input_device: None,
            input_format: None,
            preview_slot: Arc::new(Mutex::new(None)),
            fault: Arc::new(Mutex::new(None)),
            capture_loop: None,
            queue_depth: queue_depth.clamp(1, capture::MAX_METADATA_QUEUE_DEPTH),
        }
    }

    /// Whether `input` could be attached
    ///
    /// Rejected when an input is already attached or the device delivers a
    /// format without a usable luma plane.
    pub fn can_add_input(&self, input: &dyn DeviceInput) -> bool {
        if self.input_device.is_some() {
            debug!("Session already has an input");
            return false;
        }
        if !input.format().pixel_format.supports_luma() {
            debug!(format = %input.format(), "Input format unusable for detection");
            return false;
        }
        true
    }

    /// Attach `input`; a rejected input is dropped, releasing its device
    pub fn add_input(&mut self, input: Box<dyn DeviceInput>) -> bool {
        if !self.can_add_input(input.as_ref()) {
            return false;
        }

        info!(device = %input.device(), format = %input.format(), "Input attached");
        self.input_device = Some(input.device().clone());
        self.input_format = Some(input.format().clone());
        self.input = Some(input);
        true
    }

    /// Whether `output` could be attached
    ///
    /// Rejected when an output is already attached or it reports no types.
    pub fn can_add_output(&self, output: &MetadataOutput) -> bool {
        if self.output.is_some() || self.capture_loop.is_some() {
            debug!("Session already has an output");
            return false;
        }
        if output.metadata_object_types().is_empty() {
            debug!("Output reports no metadata object types");
            return false;
        }
        true
    }

    pub fn add_output(&mut self, output: MetadataOutput) -> bool {
        if !self.can_add_output(&output) {
            return false;
        }

        info!(types = ?output.metadata_object_types(), "Metadata output attached");
        self.output = Some(output);
        true
    }

    /// Input and output are both attached and not yet running
    pub fn is_configured(&self) -> bool {
        self.input.is_some() && self.output.is_some()
    }

    pub fn input_device(&self) -> Option<&CameraDevice> {
        self.input_device.as_ref()
    }

    pub fn input_format(&self) -> Option<&CameraFormat> {
        self.input_format.as_ref()
    }

    /// Start acquiring on the capture thread
    ///
    /// Returns the metadata queue, or `None` when the session is not
    /// configured or was started before.
    pub fn start_running(&mut self) -> Option<MetadataReceiver> {
        if !self.is_configured() {
            warn!("Cannot start an unconfigured session");
            return None;
        }
        let (mut input, mut output) = (self.input.take()?, self.output.take()?);

        let (sender, receiver) = broadcast::channel(self.queue_depth);
        let preview_slot = Arc::clone(&self.preview_slot);
        let fault = Arc::clone(&self.fault);
        let name = format!("capture-{}", thread_suffix(input.device()));

        let controller = CaptureLoopController::start(&name, move || {
            let frame = match input.next_frame() {
                Ok(frame) => frame,
                Err(BackendError::EndOfStream) => {
                    info!(device = %input.device(), "Device stream ended");
                    return LoopAction::Stop;
                }
                Err(e) => {
                    warn!(device = %input.device(), error = %e, "Frame acquisition failed");
                    *fault.lock().unwrap_or_else(PoisonError::into_inner) = Some(e);
                    return LoopAction::Stop;
                }
            };

            if frame.sequence % timing::FRAME_LOG_INTERVAL == 0 {
                debug!(
                    sequence = frame.sequence,
                    width = frame.width,
                    height = frame.height,
                    "Captured frame"
                );
            }

            let sequence = frame.sequence;
            let objects = output.process(&frame);
            *preview_slot.lock().unwrap_or_else(PoisonError::into_inner) = Some(frame);

            if let Some(objects) = objects {
                if sender.send(MetadataBatch { sequence, objects }).is_err() {
                    debug!("Metadata receiver gone, stopping capture");
                    return LoopAction::Stop;
                }
            }

            LoopAction::Continue
        });

        self.capture_loop = Some(controller);
        Some(receiver)
    }

    /// Request the capture thread to stop; does not wait for it
    ///
    /// A frame already being processed completes and may still deliver.
    pub fn stop_running(&mut self) {
        if let Some(controller) = &self.capture_loop {
            controller.request_stop();
        }
    }

    /// Whether the capture thread is alive
    pub fn is_running(&self) -> bool {
        self.capture_loop
            .as_ref()
            .is_some_and(CaptureLoopController::is_running)
    }

    /// Device fault recorded by the capture thread, reported once
    pub fn take_fault(&self) -> Option<BackendError> {
        self.fault
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take()
    }
}

impl Drop for CaptureSession {
    fn drop(&mut self) {
        if let Some(mut controller) = self.capture_loop.take() {
            debug!("Capture session dropped, releasing device");
            controller.stop();
        }
    }
}

fn thread_suffix(device: &CameraDevice) -> String {
    device
        .path
        .rsplit('/')
        .next()
        .unwrap_or(&device.path)
        .to_string()
}

/// Live camera preview bound to a session
///
/// Holds the most recent captured frame. Cloning shares the same slot.
#[derive(Clone)]
pub struct PreviewLayer {
    slot: FrameSlot,
}

impl PreviewLayer {
    pub fn new(session: &CaptureSession) -> Self {
        Self {
            slot: Arc::clone(&session.preview_slot),
        }
    }

    /// The most recent frame, if any was captured
    pub fn latest_frame(&self) -> Option<CameraFrame> {
        self.slot
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn has_frame(&self) -> bool {
        self.slot
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .is_some()
    }
}
