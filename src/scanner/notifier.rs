// SPDX-License-Identifier: GPL-3.0-only

//! Scan result listener registration
//!
//! The notifier holds at most one listener, non-owning. When the listener has
//! been dropped, results are discarded silently.

use super::detector::ScanEvent;
use crate::errors::CameraError;
use std::cell::RefCell;
use std::rc::{Rc, Weak};
use tracing::trace;

/// Receiver of scan outcomes
///
/// Called on the UI context only.
pub trait ScanResultListener {
    fn on_decoded(&mut self, barcode: &str);

    fn on_error(&mut self, error: CameraError);
}

/// Weak slot for the single registered listener
#[derive(Default)]
pub struct ScanNotifier {
    listener: Option<Weak<RefCell<dyn ScanResultListener>>>,
}

impl ScanNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `listener`, replacing any previous one
    pub fn register<L: ScanResultListener + 'static>(&mut self, listener: &Rc<RefCell<L>>) {
        let listener: Rc<RefCell<dyn ScanResultListener>> = listener.clone();
        self.listener = Some(Rc::downgrade(&listener));
    }

    pub fn unregister(&mut self) {
        self.listener = None;
    }

    /// Whether a live listener is registered
    pub fn has_listener(&self) -> bool {
        self.listener
            .as_ref()
            .is_some_and(|listener| listener.strong_count() > 0)
    }

    /// Forward `event` to the listener
    ///
    /// Returns false when nobody was listening.
    pub fn notify(&self, event: &ScanEvent) -> bool {
        let Some(listener) = self.listener.as_ref().and_then(Weak::upgrade) else {
            trace!(?event, "No listener, discarding scan event");
            return false;
        };

        let mut listener = listener.borrow_mut();
        match event {
            ScanEvent::Decoded { barcode } => listener.on_decoded(barcode),
            ScanEvent::Failed(error) => listener.on_error(*error),
        }
        true
    }
}
