// SPDX-License-Identifier: MPL-2.0

//! Barcode Scanner - EAN-8/EAN-13 scanning from a live camera
//!
//! This library provides the capture-to-result pipeline: a capture session
//! acquiring frames from a camera device, a metadata stage recognising codes
//! in each frame, and a presentation binding exposing the latest result.
//!
//! # Architecture
//!
//! The crate is organized into several modules:
//!
//! - [`backends`]: Camera subsystem abstraction (V4L2, still-image virtual camera)
//! - [`scanner`]: Capture session, decoder boundary, detector and controller
//! - [`app`]: Observable UI state and alert table
//! - [`config`]: User configuration handling
//!
//! # Example
//!
//! ```ignore
//! let view_model = Rc::new(RefCell::new(ScannerViewModel::new()));
//! let mut scanner = Scanner::new(get_backend(&config), Arc::new(RxingDecoder::new()), 4);
//! scanner.register_listener(&view_model);
//! if scanner.setup().is_ok() {
//!     scanner.start();
//! }
//! loop {
//!     scanner.dispatch_pending();
//!     render(&view_model.borrow().state());
//! }
//! ```

pub mod app;
pub mod backends;
pub mod config;
pub mod constants;
pub mod errors;
pub mod scanner;

// Re-export commonly used types
pub use app::{AlertItem, AlertKind, ScannerViewModel, StatusColor, UiScanState};
pub use config::Config;
pub use errors::{AppError, AppResult, CameraError};
pub use scanner::{
    BarcodeDecoder, CaptureConfiguration, MetadataObject, RxingDecoder, ScanEvent,
    ScanResultListener, Scanner, SessionState, Symbology,
};
