// SPDX-License-Identifier: MPL-2.0

//! Camera backend abstraction
//!
//! The scanner only talks to the camera subsystem through the two traits in
//! this module, so hardware access stays swappable (V4L2 devices, still-image
//! virtual cameras, test doubles).
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────┐
//! │   Scanner / CLI     │
//! └──────────┬──────────┘
//!            │
//!            ▼
//! ┌─────────────────────┐
//! │ CameraBackend Trait │  ← Enumeration, input construction
//! └──────────┬──────────┘
//!            │
//!            ▼
//! ┌─────────────────────┐
//! │  DeviceInput Trait  │  ← Opened device, frame acquisition
//! └──────────┬──────────┘
//!            │
//!       ┌────┴─────┐
//!       ▼          ▼
//!   ┌──────┐  ┌─────────┐
//!   │ V4L2 │  │ Virtual │
//!   └──────┘  └─────────┘
//! ```

pub mod format_converters;
pub mod frame_loop;
pub mod types;
pub mod v4l2;

pub use types::*;

/// Camera subsystem entry point
pub trait CameraBackend: Send {
    /// Enumerate available cameras on this backend
    fn enumerate_cameras(&self) -> Vec<CameraDevice>;

    /// Get the camera used when none is chosen explicitly
    fn default_video_device(&self) -> Option<CameraDevice> {
        self.enumerate_cameras().into_iter().next()
    }

    /// Open a device and negotiate its capture format
    ///
    /// Permission and busy errors surface here, not on the first frame.
    fn create_input(&self, device: &CameraDevice) -> BackendResult<Box<dyn DeviceInput>>;

    /// Formats the device can deliver, for display purposes
    fn supported_formats(&self, _device: &CameraDevice) -> Vec<CameraFormat> {
        Vec::new()
    }

    /// Human readable backend name
    fn name(&self) -> &'static str;
}

/// An opened camera device producing frames
///
/// Dropping the input releases the device.
pub trait DeviceInput: Send {
    /// The device this input was created from
    fn device(&self) -> &CameraDevice;

    /// The negotiated capture format
    fn format(&self) -> &CameraFormat;

    /// Block until the next frame is available
    ///
    /// Returns `BackendError::EndOfStream` when a finite source is exhausted.
    fn next_frame(&mut self) -> BackendResult<CameraFrame>;
}

/// Get the hardware backend with the given capture preferences
pub fn get_backend(config: &crate::config::Config) -> Box<dyn CameraBackend> {
    Box::new(v4l2::V4l2Backend::new(
        config.capture_width,
        config.capture_height,
        config.framerate,
        config.camera_path.clone(),
    ))
}
