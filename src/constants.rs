// SPDX-License-Identifier: GPL-3.0-only

//! Application-wide constants

/// Capture defaults
pub mod capture {
    /// Requested capture width; barcodes need resolution more than frame rate
    pub const DEFAULT_WIDTH: u32 = 1280;

    /// Requested capture height
    pub const DEFAULT_HEIGHT: u32 = 720;

    /// Requested frame rate
    pub const DEFAULT_FRAMERATE: u32 = 30;

    /// Frames are downscaled so neither side exceeds this before detection
    pub const DEFAULT_DETECTION_MAX_DIMENSION: u32 = 1280;

    /// Metadata batches buffered between the capture thread and the UI context
    pub const DEFAULT_METADATA_QUEUE_DEPTH: usize = 4;

    /// Upper bound for the configured metadata queue depth
    pub const MAX_METADATA_QUEUE_DEPTH: usize = 1024;
}

/// UI timing constants
pub mod timing {
    use std::time::Duration;

    /// How often the CLI drains queued metadata (~60Hz)
    pub const DISPATCH_INTERVAL: Duration = Duration::from_millis(16);

    /// Frame counter modulo for periodic logging
    pub const FRAME_LOG_INTERVAL: u64 = 30;
}

/// User-visible text
pub mod text {
    /// Navigation title
    pub const TITLE: &str = "Barcode Scanner";

    /// Label in front of the scan result
    pub const SCANNED_BARCODE_LABEL: &str = "Scanned Barcode:";

    /// Status text before anything was scanned
    pub const NOT_YET_SCANNED: &str = "Not Yet Scanned";

    /// Alert shown for `invalidDeviceInput`
    pub const INVALID_DEVICE_INPUT_TITLE: &str = "Invalid Device Input";
    pub const INVALID_DEVICE_INPUT_MESSAGE: &str =
        "Something is wrong with the camera. Unable to capture the input.";

    /// Alert shown for `invalidScannedValue`
    pub const INVALID_SCAN_TYPE_TITLE: &str = "Invalid Scan Type";
    pub const INVALID_SCAN_TYPE_MESSAGE: &str =
        "The value scanned is not valid. This app scans EAN-8 and EAN-13.";

    /// Dismiss button of every alert
    pub const DISMISS_BUTTON: &str = "Ok";
}

/// Supported file formats for the still-image virtual camera
pub mod file_formats {
    /// Supported image file extensions
    pub const IMAGE_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "gif", "bmp", "webp"];

    /// Check if a file extension is a supported image format
    pub fn is_image_extension(ext: &str) -> bool {
        IMAGE_EXTENSIONS.contains(&ext.to_lowercase().as_str())
    }
}

/// Application information utilities
pub mod app_info {
    /// Get the application version from build-time environment
    pub fn version() -> &'static str {
        env!("GIT_VERSION")
    }

    /// Name of the per-user configuration directory
    pub const CONFIG_DIR_NAME: &str = "barcode-scanner";

    /// Configuration file inside [`CONFIG_DIR_NAME`]
    pub const CONFIG_FILE_NAME: &str = "config.json";
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_image_extensions_case_insensitive() {
        assert!(file_formats::is_image_extension("JPG"));
        assert!(file_formats::is_image_extension("png"));
        assert!(!file_formats::is_image_extension("mkv"));
    }
}
