// SPDX-License-Identifier: GPL-3.0-only

//! Scanner controller
//!
//! Owns the capture session and turns its metadata deliveries into listener
//! callbacks on the UI context. Setup is a fixed sequence of steps; the first
//! failing step aborts setup and reports `InvalidDeviceInput` exactly once.

use super::detector::{ScanEvent, detect_barcode};
use super::metadata::{BarcodeDecoder, MetadataOutput, Symbology};
use super::notifier::{ScanNotifier, ScanResultListener};
use super::session::{CaptureSession, MetadataReceiver, PreviewLayer, SessionState};
use crate::backends::camera::types::{CameraDevice, CameraFormat};
use crate::backends::camera::CameraBackend;
use crate::errors::CameraError;
use std::cell::RefCell;
use std::rc::Rc;
use std::sync::Arc;
use tokio::sync::broadcast::error::TryRecvError;
use tracing::{debug, error, info, warn};

/// Description of a successfully configured session
#[derive(Debug, Clone, PartialEq)]
pub struct CaptureConfiguration {
    pub device: CameraDevice,
    pub format: CameraFormat,
    pub symbologies: Vec<Symbology>,
}

/// Barcode scanning controller
///
/// Lives on the UI context. `setup`, `start`, `stop` and `dispatch_pending`
/// must all be called from there; frame acquisition and decoding run on the
/// session's capture thread.
pub struct Scanner {
    backend: Box<dyn CameraBackend>,
    decoder: Arc<dyn BarcodeDecoder>,
    session: CaptureSession,
    preview: Option<PreviewLayer>,
    metadata: Option<MetadataReceiver>,
    configuration: Option<CaptureConfiguration>,
    notifier: ScanNotifier,
    state: SessionState,
}

impl Scanner {
    pub fn new(
        backend: Box<dyn CameraBackend>,
        decoder: Arc<dyn BarcodeDecoder>,
        queue_depth: usize,
    ) -> Self {
        Self {
            backend,
            decoder,
            session: CaptureSession::new(queue_depth),
            preview: None,
            metadata: None,
            configuration: None,
            notifier: ScanNotifier::new(),
            state: SessionState::Idle,
        }
    }

    /// Register the listener for scan outcomes (held weakly)
    pub fn register_listener<L: ScanResultListener + 'static>(&mut self, listener: &Rc<RefCell<L>>) {
        self.notifier.register(listener);
    }

    pub fn unregister_listener(&mut self) {
        self.notifier.unregister();
    }

    /// Configure the capture session
    ///
    /// Steps, in order: pick the default device, open it, attach it as input,
    /// attach a metadata output restricted to EAN-8/EAN-13, bind the preview.
    /// The preview is bound only after every earlier step succeeded.
    pub fn setup(&mut self) -> Result<(), CameraError> {
        self.state = SessionState::Configuring;
        info!(backend = self.backend.name(), "Setting up capture session");

        let Some(device) = self.backend.default_video_device() else {
            return self.fail_setup("no video device available");
        };

        let input = match self.backend.create_input(&device) {
            Ok(input) => input,
            Err(e) => {
                error!(device = %device, error = %e, "Failed to open device");
                return self.fail_setup("device could not be opened");
            }
        };
        let format = input.format().clone();

        if !self.session.add_input(input) {
            return self.fail_setup("session rejected the device input");
        }

        let mut output = MetadataOutput::new(Arc::clone(&self.decoder));
        output.set_metadata_object_types(&Symbology::SCANNED);
        let symbologies = output.metadata_object_types().to_vec();
        if !self.session.add_output(output) {
            return self.fail_setup("session rejected the metadata output");
        }

        self.preview = Some(PreviewLayer::new(&self.session));
        self.configuration = Some(CaptureConfiguration {
            device,
            format,
            symbologies,
        });

        info!(configuration = ?self.configuration, "Capture session configured");
        Ok(())
    }

    fn fail_setup(&mut self, reason: &str) -> Result<(), CameraError> {
        warn!(reason, "Capture session setup failed");
        self.state = SessionState::Error;
        let error = CameraError::InvalidDeviceInput;
        self.notifier.notify(&ScanEvent::Failed(error));
        Err(error)
    }

    /// Begin frame acquisition; returns immediately
    pub fn start(&mut self) {
        if self.state != SessionState::Configuring || !self.session.is_configured() {
            warn!(state = ?self.state, "Scanner is not ready to start");
            return;
        }

        match self.session.start_running() {
            Some(receiver) => {
                self.metadata = Some(receiver);
                self.state = SessionState::Running;
                info!("Scanner started");
            }
            None => warn!("Capture session did not start"),
        }
    }

    /// Halt acquisition; returns immediately
    ///
    /// A frame already in flight may still be delivered by a later
    /// [`Self::dispatch_pending`].
    pub fn stop(&mut self) {
        // A failed second setup leaves the capture thread of the first one
        let acquiring = self.session.is_running();
        if acquiring {
            self.session.stop_running();
        }

        match self.state {
            SessionState::Running | SessionState::Configuring => {
                self.state = SessionState::Stopped;
                self.configuration = None;
                info!("Scanner stopped");
            }
            state if acquiring => info!(?state, "Capture stopped"),
            state => debug!(?state, "Stop ignored"),
        }
    }

    /// Deliver queued scan outcomes to the listener
    ///
    /// Returns the number of outcomes produced. A device fault observed by
    /// the capture thread is reported after the deliveries that preceded it.
    pub fn dispatch_pending(&mut self) -> usize {
        let mut produced = self.drain_metadata();

        if self.state == SessionState::Running {
            if let Some(fault) = self.session.take_fault() {
                // Deliveries queued before the fault was recorded come first
                produced += self.drain_metadata();

                error!(error = %fault, "Camera device fault");
                self.state = SessionState::Error;
                self.notifier
                    .notify(&ScanEvent::Failed(CameraError::InvalidDeviceInput));
                produced += 1;
            }
        }

        produced
    }

    fn drain_metadata(&mut self) -> usize {
        let Some(receiver) = self.metadata.as_mut() else {
            return 0;
        };

        let mut produced = 0;
        let mut closed = false;
        loop {
            match receiver.try_recv() {
                Ok(batch) => {
                    let event = detect_barcode(&batch.objects);
                    debug!(sequence = batch.sequence, ?event, "Scan outcome");
                    self.notifier.notify(&event);
                    produced += 1;
                }
                Err(TryRecvError::Lagged(skipped)) => {
                    debug!(skipped, "Dispatch lagging, older deliveries overwritten");
                }
                Err(TryRecvError::Closed) => {
                    closed = true;
                    break;
                }
                Err(TryRecvError::Empty) => break,
            }
        }

        if closed {
            debug!("Metadata queue closed");
            self.metadata = None;
        }
        produced
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Whether frames are currently being acquired
    pub fn is_acquiring(&self) -> bool {
        self.session.is_running()
    }

    /// Whether queued deliveries may still arrive
    pub fn has_pending_source(&self) -> bool {
        self.metadata.is_some()
    }

    /// Preview bound during a successful setup
    pub fn preview(&self) -> Option<&PreviewLayer> {
        self.preview.as_ref()
    }

    pub fn configuration(&self) -> Option<&CaptureConfiguration> {
        self.configuration.as_ref()
    }
}
