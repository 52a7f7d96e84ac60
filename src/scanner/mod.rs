// SPDX-License-Identifier: GPL-3.0-only

//! Barcode scanning pipeline
//!
//! - [`metadata`]: recognised objects and the per-frame output stage
//! - [`decoder`]: rxing-backed [`BarcodeDecoder`]
//! - [`detector`]: one metadata delivery to one [`ScanEvent`]
//! - [`notifier`]: weak listener registration
//! - [`session`]: capture thread, preview slot and metadata queue
//! - [`controller`]: the [`Scanner`] driving setup and dispatch

pub mod controller;
pub mod decoder;
pub mod detector;
pub mod metadata;
pub mod notifier;
pub mod session;

pub use controller::{CaptureConfiguration, Scanner};
pub use decoder::RxingDecoder;
pub use detector::{ScanEvent, detect_barcode};
pub use metadata::{
    BarcodeDecoder, FrameRegion, MachineReadableCodeObject, MetadataObject, MetadataOutput,
    Symbology,
};
pub use notifier::{ScanNotifier, ScanResultListener};
pub use session::{CaptureSession, MetadataBatch, PreviewLayer, SessionState};
