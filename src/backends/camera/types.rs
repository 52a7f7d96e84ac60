// SPDX-License-Identifier: GPL-3.0-only
// Shared types for camera backend abstraction

//! Shared types for camera backends

use std::sync::Arc;
use std::time::Instant;

/// Device information from V4L2 capability
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DeviceInfo {
    /// Name of the device (V4L2 card)
    pub card: String,
    /// Driver name (V4L2 driver)
    pub driver: String,
    /// Bus the device hangs off (e.g., usb-0000:00:14.0-1)
    pub bus: String,
}

/// Represents a camera device
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CameraDevice {
    pub name: String,
    pub path: String, // Device node (/dev/videoN) or source file path
    pub device_info: Option<DeviceInfo>,
}

impl std::fmt::Display for CameraDevice {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({})", self.name, self.path)
    }
}

/// Framerate as a fraction (numerator/denominator)
/// Stores exact framerate to handle NTSC rates like 59.94fps (60000/1001)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Framerate {
    pub num: u32,
    pub denom: u32,
}

impl Framerate {
    /// Create a new framerate from numerator and denominator
    pub fn new(num: u32, denom: u32) -> Self {
        Self {
            num,
            denom: if denom == 0 { 1 } else { denom },
        }
    }

    /// Create a framerate from an integer (e.g., 30 becomes 30/1)
    pub fn from_int(fps: u32) -> Self {
        Self { num: fps, denom: 1 }
    }

    /// Get the framerate as a floating point value
    pub fn as_f64(&self) -> f64 {
        self.num as f64 / self.denom as f64
    }

    /// Get the rounded-down integer framerate
    pub fn as_int(&self) -> u32 {
        self.num / self.denom
    }

    /// Time between two frames at this rate
    pub fn frame_duration(&self) -> std::time::Duration {
        if self.num == 0 {
            return std::time::Duration::ZERO;
        }
        std::time::Duration::from_secs_f64(self.denom as f64 / self.num as f64)
    }
}

impl std::fmt::Display for Framerate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.denom != 1 {
            write!(f, "{:.2}", self.as_f64())
        } else {
            write!(f, "{}", self.num)
        }
    }
}

impl Default for Framerate {
    fn default() -> Self {
        Self { num: 30, denom: 1 }
    }
}

/// Pixel format for camera frames
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PixelFormat {
    /// RGBA - 32-bit with alpha (4 bytes per pixel)
    RGBA,
    /// RGB24 - 24-bit RGB (3 bytes per pixel, no alpha)
    RGB24,
    /// Gray8 - 8-bit grayscale (single channel)
    Gray8,
    /// YUYV - Packed 4:2:2 (Y0 U Y1 V interleaved)
    YUYV,
    /// UYVY - Packed 4:2:2 (U Y0 V Y1 interleaved)
    UYVY,
    /// NV12 - Semi-planar 4:2:0 (Y plane + interleaved UV plane)
    NV12,
    /// I420 - Planar 4:2:0 (separate Y, U, V planes)
    I420,
    /// Motion JPEG, one JPEG image per frame
    MJPEG,
    /// H.264 elementary stream; needs a video decoder the pipeline does not have
    H264,
}

impl PixelFormat {
    /// Formats in the order the V4L2 backend asks the device for them
    pub const PREFERRED: [PixelFormat; 4] = [
        PixelFormat::YUYV,
        PixelFormat::MJPEG,
        PixelFormat::NV12,
        PixelFormat::Gray8,
    ];

    /// Whether a luma plane can be derived from frames in this format
    pub fn supports_luma(&self) -> bool {
        !matches!(self, Self::H264)
    }

    /// Bytes per pixel in the first plane, for stride calculation
    pub fn bytes_per_pixel(&self) -> u32 {
        match self {
            Self::RGBA => 4,
            Self::RGB24 => 3,
            Self::YUYV | Self::UYVY => 2,
            Self::Gray8 | Self::NV12 | Self::I420 => 1,
            Self::MJPEG | Self::H264 => 0,
        }
    }

    /// V4L2 FourCC code
    pub fn fourcc(&self) -> [u8; 4] {
        match self {
            Self::RGBA => *b"AB24",
            Self::RGB24 => *b"RGB3",
            Self::Gray8 => *b"GREY",
            Self::YUYV => *b"YUYV",
            Self::UYVY => *b"UYVY",
            Self::NV12 => *b"NV12",
            Self::I420 => *b"YU12",
            Self::MJPEG => *b"MJPG",
            Self::H264 => *b"H264",
        }
    }

    /// Parse a V4L2 FourCC code
    pub fn from_fourcc(code: &[u8; 4]) -> Option<Self> {
        match code {
            b"AB24" | b"RGBA" => Some(Self::RGBA),
            b"RGB3" => Some(Self::RGB24),
            b"GREY" | b"Y800" => Some(Self::Gray8),
            b"YUYV" | b"YUY2" => Some(Self::YUYV),
            b"UYVY" => Some(Self::UYVY),
            b"NV12" => Some(Self::NV12),
            b"YU12" | b"I420" => Some(Self::I420),
            b"MJPG" | b"JPEG" => Some(Self::MJPEG),
            b"H264" => Some(Self::H264),
            _ => None,
        }
    }
}

impl std::fmt::Display for PixelFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let code = self.fourcc();
        write!(f, "{}", String::from_utf8_lossy(&code))
    }
}

/// Camera format specification
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CameraFormat {
    pub width: u32,
    pub height: u32,
    pub framerate: Option<Framerate>,
    pub pixel_format: PixelFormat,
}

impl std::fmt::Display for CameraFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if let Some(fps) = &self.framerate {
            write!(
                f,
                "{}x{} @ {}fps {}",
                self.width, self.height, fps, self.pixel_format
            )
        } else {
            write!(f, "{}x{} {}", self.width, self.height, self.pixel_format)
        }
    }
}

/// A single frame from the camera
#[derive(Debug, Clone)]
pub struct CameraFrame {
    pub width: u32,
    pub height: u32,
    /// Frame bytes; planes are contiguous for planar YUV formats
    pub data: Arc<[u8]>,
    /// Pixel format of the data
    pub format: PixelFormat,
    /// Row stride of the first plane (bytes per row, may include padding)
    pub stride: u32,
    /// Per-input frame counter
    pub sequence: u64,
    /// Timestamp when frame was captured (for latency diagnostics)
    pub captured_at: Instant,
}

impl CameraFrame {
    /// Build a tightly packed RGBA frame
    pub fn from_rgba(width: u32, height: u32, data: Vec<u8>) -> Self {
        Self {
            width,
            height,
            data: Arc::from(data.into_boxed_slice()),
            format: PixelFormat::RGBA,
            stride: width * 4,
            sequence: 0,
            captured_at: Instant::now(),
        }
    }

    /// Build a tightly packed 8-bit grayscale frame
    pub fn from_gray(width: u32, height: u32, data: Vec<u8>) -> Self {
        Self {
            width,
            height,
            data: Arc::from(data.into_boxed_slice()),
            format: PixelFormat::Gray8,
            stride: width,
            sequence: 0,
            captured_at: Instant::now(),
        }
    }

    pub fn data_slice(&self) -> &[u8] {
        &self.data
    }
}

/// Result type for backend operations
pub type BackendResult<T> = Result<T, BackendError>;

/// Error types for backend operations
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BackendError {
    /// Camera device not found
    DeviceNotFound(String),
    /// Device exists but could not be opened (permissions, busy)
    AccessDenied(String),
    /// Format not supported
    FormatNotSupported(String),
    /// A finite source has no more frames
    EndOfStream,
    /// Device vanished or stopped delivering frames
    Disconnected(String),
    /// General I/O error
    IoError(String),
    /// Other errors
    Other(String),
}

impl std::fmt::Display for BackendError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BackendError::DeviceNotFound(msg) => write!(f, "Device not found: {}", msg),
            BackendError::AccessDenied(msg) => write!(f, "Access denied: {}", msg),
            BackendError::FormatNotSupported(msg) => write!(f, "Format not supported: {}", msg),
            BackendError::EndOfStream => write!(f, "End of stream"),
            BackendError::Disconnected(msg) => write!(f, "Device disconnected: {}", msg),
            BackendError::IoError(msg) => write!(f, "I/O error: {}", msg),
            BackendError::Other(msg) => write!(f, "Error: {}", msg),
        }
    }
}

impl std::error::Error for BackendError {}

impl From<std::io::Error> for BackendError {
    fn from(err: std::io::Error) -> Self {
        match err.kind() {
            std::io::ErrorKind::PermissionDenied => BackendError::AccessDenied(err.to_string()),
            std::io::ErrorKind::NotFound => BackendError::DeviceNotFound(err.to_string()),
            _ => BackendError::IoError(err.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fourcc_roundtrip_for_preferred_formats() {
        for format in PixelFormat::PREFERRED {
            assert_eq!(PixelFormat::from_fourcc(&format.fourcc()), Some(format));
        }
    }

    #[test]
    fn test_h264_has_no_luma() {
        assert!(!PixelFormat::H264.supports_luma());
        assert!(PixelFormat::MJPEG.supports_luma());
        assert!(PixelFormat::YUYV.supports_luma());
    }

    #[test]
    fn test_framerate_zero_denominator() {
        let fps = Framerate::new(30, 0);
        assert_eq!(fps.as_int(), 30);
        assert_eq!(Framerate::new(60000, 1001).to_string(), "59.94");
    }

    #[test]
    fn test_io_error_mapping() {
        let err: BackendError =
            std::io::Error::new(std::io::ErrorKind::PermissionDenied, "nope").into();
        assert!(matches!(err, BackendError::AccessDenied(_)));
    }
}
