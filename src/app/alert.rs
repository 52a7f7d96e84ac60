// SPDX-License-Identifier: GPL-3.0-only

//! Modal alerts keyed by pipeline error

use crate::constants::text;
use crate::errors::CameraError;
use uuid::Uuid;

/// Which fixed alert is shown
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AlertKind {
    InvalidDeviceInput,
    InvalidScanType,
}

impl From<CameraError> for AlertKind {
    fn from(error: CameraError) -> Self {
        match error {
            CameraError::InvalidDeviceInput => AlertKind::InvalidDeviceInput,
            CameraError::InvalidScannedValue => AlertKind::InvalidScanType,
        }
    }
}

/// A pending alert for the rendering layer
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AlertItem {
    pub id: Uuid,
    pub kind: AlertKind,
    pub title: &'static str,
    pub message: &'static str,
    pub dismiss_button: &'static str,
}

impl AlertItem {
    pub fn new(kind: AlertKind) -> Self {
        let (title, message) = match kind {
            AlertKind::InvalidDeviceInput => (
                text::INVALID_DEVICE_INPUT_TITLE,
                text::INVALID_DEVICE_INPUT_MESSAGE,
            ),
            AlertKind::InvalidScanType => (
                text::INVALID_SCAN_TYPE_TITLE,
                text::INVALID_SCAN_TYPE_MESSAGE,
            ),
        };

        Self {
            id: Uuid::new_v4(),
            kind,
            title,
            message,
            dismiss_button: text::DISMISS_BUTTON,
        }
    }

    /// Alert for a pipeline error
    pub fn for_error(error: CameraError) -> Self {
        Self::new(error.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_alert_table() {
        let alert = AlertItem::for_error(CameraError::InvalidDeviceInput);
        assert_eq!(alert.title, "Invalid Device Input");
        assert_eq!(
            alert.message,
            "Something is wrong with the camera. Unable to capture the input."
        );
        assert_eq!(alert.dismiss_button, "Ok");

        let alert = AlertItem::for_error(CameraError::InvalidScannedValue);
        assert_eq!(alert.kind, AlertKind::InvalidScanType);
        assert_eq!(alert.title, "Invalid Scan Type");
    }

    #[test]
    fn test_alerts_get_distinct_ids() {
        let a = AlertItem::new(AlertKind::InvalidScanType);
        let b = AlertItem::new(AlertKind::InvalidScanType);
        assert_ne!(a.id, b.id);
    }
}
