// SPDX-License-Identifier: MPL-2.0

//! Error types for the barcode scanner

use std::fmt;

use crate::backends::camera::BackendError;

/// Result type alias using AppError
pub type AppResult<T> = Result<T, AppError>;

/// Errors surfaced by the capture-to-result pipeline
///
/// Every pipeline failure is one of these two kinds. Setup-path failures are
/// always `InvalidDeviceInput`; per-frame interpretation failures are always
/// `InvalidScannedValue` and never stop acquisition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CameraError {
    /// No usable camera, device busy, or pipeline wiring failure
    InvalidDeviceInput,
    /// Frame metadata could not be interpreted as a barcode string
    InvalidScannedValue,
}

impl CameraError {
    /// Stable identifier, matching the names used in logs
    pub fn as_str(&self) -> &'static str {
        match self {
            CameraError::InvalidDeviceInput => "invalidDeviceInput",
            CameraError::InvalidScannedValue => "invalidScannedValue",
        }
    }
}

/// Application-level error type used by the CLI and configuration loading
#[derive(Debug, Clone)]
pub enum AppError {
    /// Pipeline error
    Camera(CameraError),
    /// Camera subsystem error
    Backend(BackendError),
    /// Configuration errors
    Config(String),
    /// Filesystem errors
    Storage(String),
    /// Generic error with message
    Other(String),
}

impl fmt::Display for CameraError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CameraError::InvalidDeviceInput => {
                write!(f, "Invalid device input: unable to capture camera input")
            }
            CameraError::InvalidScannedValue => {
                write!(f, "Invalid scanned value: not an EAN-8 or EAN-13 code")
            }
        }
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::Camera(e) => write!(f, "Camera error: {}", e),
            AppError::Backend(e) => write!(f, "Backend error: {}", e),
            AppError::Config(msg) => write!(f, "Configuration error: {}", msg),
            AppError::Storage(msg) => write!(f, "Storage error: {}", msg),
            AppError::Other(msg) => write!(f, "{}", msg),
        }
    }
}

impl std::error::Error for CameraError {}
impl std::error::Error for AppError {}

impl From<CameraError> for AppError {
    fn from(err: CameraError) -> Self {
        AppError::Camera(err)
    }
}

impl From<BackendError> for AppError {
    fn from(err: BackendError) -> Self {
        AppError::Backend(err)
    }
}

impl From<String> for AppError {
    fn from(msg: String) -> Self {
        AppError::Other(msg)
    }
}

impl From<&str> for AppError {
    fn from(msg: &str) -> Self {
        AppError::Other(msg.to_string())
    }
}

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        AppError::Storage(err.to_string())
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::Config(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_camera_error_names() {
        assert_eq!(CameraError::InvalidDeviceInput.as_str(), "invalidDeviceInput");
        assert_eq!(
            CameraError::InvalidScannedValue.as_str(),
            "invalidScannedValue"
        );
    }

    #[test]
    fn test_app_error_from_camera_error() {
        let err: AppError = CameraError::InvalidDeviceInput.into();
        assert!(matches!(
            err,
            AppError::Camera(CameraError::InvalidDeviceInput)
        ));
        assert!(err.to_string().starts_with("Camera error:"));
    }
}
