// SPDX-License-Identifier: GPL-3.0-only

//! Observable scan state
//!
//! The view model is the registered scan listener. Every callback updates a
//! single-slot watch channel that the rendering layer subscribes to; updates
//! that would not change the state are not published.

use super::alert::{AlertItem, AlertKind};
use crate::constants::text;
use crate::errors::CameraError;
use crate::scanner::ScanResultListener;
use tokio::sync::watch;
use tracing::debug;

/// Colour of the status text
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusColor {
    Red,
    Green,
}

/// State rendered by the UI
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UiScanState {
    /// Latest decoded barcode, empty until something was scanned
    pub scanned_code: String,
    /// Alert waiting to be shown
    pub alert_item: Option<AlertItem>,
}

impl UiScanState {
    pub fn status_text(&self) -> &str {
        if self.scanned_code.is_empty() {
            text::NOT_YET_SCANNED
        } else {
            &self.scanned_code
        }
    }

    pub fn status_color(&self) -> StatusColor {
        if self.scanned_code.is_empty() {
            StatusColor::Red
        } else {
            StatusColor::Green
        }
    }
}

/// Presentation binding between the scanner and the UI
pub struct ScannerViewModel {
    state: watch::Sender<UiScanState>,
}

impl Default for ScannerViewModel {
    fn default() -> Self {
        Self::new()
    }
}

impl ScannerViewModel {
    pub fn new() -> Self {
        let (state, _) = watch::channel(UiScanState::default());
        Self { state }
    }

    /// New receiver observing state changes
    pub fn subscribe(&self) -> watch::Receiver<UiScanState> {
        self.state.subscribe()
    }

    /// Snapshot of the current state
    pub fn state(&self) -> UiScanState {
        self.state.borrow().clone()
    }

    /// Clear the pending alert after the user dismissed it
    pub fn dismiss_alert(&self) {
        self.state
            .send_if_modified(|state| state.alert_item.take().is_some());
    }
}

impl ScanResultListener for ScannerViewModel {
    fn on_decoded(&mut self, barcode: &str) {
        let changed = self.state.send_if_modified(|state| {
            if state.scanned_code == barcode {
                return false;
            }
            state.scanned_code = barcode.to_string();
            true
        });
        if changed {
            debug!(barcode, "Scanned code updated");
        }
    }

    fn on_error(&mut self, error: CameraError) {
        let kind = AlertKind::from(error);
        let changed = self.state.send_if_modified(|state| {
            if state.alert_item.as_ref().is_some_and(|alert| alert.kind == kind) {
                return false;
            }
            state.alert_item = Some(AlertItem::new(kind));
            true
        });
        if changed {
            debug!(error = error.as_str(), "Alert raised");
        }
    }
}
