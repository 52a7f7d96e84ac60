// SPDX-License-Identifier: MPL-2.0

//! Presentation binding
//!
//! - `view_model`: [`ScannerViewModel`], the listener turning scan outcomes
//!   into observable [`UiScanState`]
//! - `alert`: the fixed alert table keyed by pipeline error
//!
//! Rendering is left to the consumer: subscribe to the view model and draw
//! the state however the front end likes.

mod alert;
mod view_model;

pub use alert::{AlertItem, AlertKind};
pub use view_model::{ScannerViewModel, StatusColor, UiScanState};
