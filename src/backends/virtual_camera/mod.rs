// SPDX-License-Identifier: GPL-3.0-only

//! Still-image virtual camera
//!
//! Presents image files as camera devices. Each device streams its image at a
//! fixed frame rate, either forever or a bounded number of times, which makes
//! the full capture pipeline usable without camera hardware.

mod file_source;

pub use file_source::{is_image_path, load_image_as_frame};

use crate::backends::camera::types::{
    BackendError, BackendResult, CameraDevice, CameraFormat, CameraFrame, Framerate,
};
use crate::backends::camera::{CameraBackend, DeviceInput};
use std::path::PathBuf;
use std::time::{Duration, Instant};
use tracing::debug;

/// Where a virtual device gets its image from
#[derive(Debug, Clone)]
enum StillSource {
    File(PathBuf),
    Frame(CameraFrame),
}

/// Backend exposing still images as cameras
pub struct StillImageBackend {
    sources: Vec<(CameraDevice, StillSource)>,
    framerate: Framerate,
    repeat: Option<u64>,
}

impl StillImageBackend {
    /// One virtual camera per image file
    pub fn from_paths(paths: &[PathBuf], framerate: Framerate) -> Self {
        let sources = paths
            .iter()
            .map(|path| {
                let device = CameraDevice {
                    name: path
                        .file_name()
                        .map(|n| n.to_string_lossy().to_string())
                        .unwrap_or_else(|| path.display().to_string()),
                    path: path.display().to_string(),
                    device_info: None,
                };
                (device, StillSource::File(path.clone()))
            })
            .collect();

        Self {
            sources,
            framerate,
            repeat: None,
        }
    }

    /// One virtual camera per in-memory frame
    pub fn from_frames(frames: Vec<(String, CameraFrame)>, framerate: Framerate) -> Self {
        let sources = frames
            .into_iter()
            .enumerate()
            .map(|(index, (name, frame))| {
                let device = CameraDevice {
                    name,
                    path: format!("memory:{}", index),
                    device_info: None,
                };
                (device, StillSource::Frame(frame))
            })
            .collect();

        Self {
            sources,
            framerate,
            repeat: None,
        }
    }

    /// Emit each image `count` times, then report end of stream
    pub fn with_repeat(mut self, count: u64) -> Self {
        self.repeat = Some(count);
        self
    }
}

impl CameraBackend for StillImageBackend {
    fn enumerate_cameras(&self) -> Vec<CameraDevice> {
        self.sources.iter().map(|(device, _)| device.clone()).collect()
    }

    fn create_input(&self, device: &CameraDevice) -> BackendResult<Box<dyn DeviceInput>> {
        let source = self
            .sources
            .iter()
            .find(|(d, _)| d.path == device.path)
            .map(|(_, source)| source)
            .ok_or_else(|| BackendError::DeviceNotFound(device.path.clone()))?;

        let frame = match source {
            StillSource::File(path) => load_image_as_frame(path)?,
            StillSource::Frame(frame) => frame.clone(),
        };

        let format = CameraFormat {
            width: frame.width,
            height: frame.height,
            framerate: Some(self.framerate),
            pixel_format: frame.format,
        };

        Ok(Box::new(StillImageInput {
            device: device.clone(),
            format,
            frame,
            interval: self.framerate.frame_duration(),
            remaining: self.repeat,
            last_emit: None,
            sequence: 0,
        }))
    }

    fn supported_formats(&self, device: &CameraDevice) -> Vec<CameraFormat> {
        self.create_input(device)
            .map(|input| vec![input.format().clone()])
            .unwrap_or_default()
    }

    fn name(&self) -> &'static str {
        "Still image"
    }
}

/// Opened still-image device
pub struct StillImageInput {
    device: CameraDevice,
    format: CameraFormat,
    frame: CameraFrame,
    interval: Duration,
    remaining: Option<u64>,
    last_emit: Option<Instant>,
    sequence: u64,
}

impl DeviceInput for StillImageInput {
    fn device(&self) -> &CameraDevice {
        &self.device
    }

    fn format(&self) -> &CameraFormat {
        &self.format
    }

    fn next_frame(&mut self) -> BackendResult<CameraFrame> {
        if let Some(remaining) = self.remaining.as_mut() {
            if *remaining == 0 {
                debug!(device = %self.device.path, "Still image source exhausted");
                return Err(BackendError::EndOfStream);
            }
            *remaining -= 1;
        }

        // Pace like a real camera
        if let Some(last) = self.last_emit {
            let elapsed = last.elapsed();
            if elapsed < self.interval {
                std::thread::sleep(self.interval - elapsed);
            }
        }

        let now = Instant::now();
        self.last_emit = Some(now);
        self.sequence += 1;

        let mut frame = self.frame.clone();
        frame.sequence = self.sequence;
        frame.captured_at = now;
        Ok(frame)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn gray_frame() -> CameraFrame {
        CameraFrame::from_gray(4, 4, vec![128; 16])
    }

    #[test]
    fn test_enumerates_one_device_per_frame() {
        let backend = StillImageBackend::from_frames(
            vec![("a".into(), gray_frame()), ("b".into(), gray_frame())],
            Framerate::from_int(30),
        );
        let cameras = backend.enumerate_cameras();
        assert_eq!(cameras.len(), 2);
        assert_eq!(backend.default_video_device(), Some(cameras[0].clone()));
    }

    #[test]
    fn test_repeat_ends_stream() {
        let backend = StillImageBackend::from_frames(
            vec![("a".into(), gray_frame())],
            Framerate::from_int(1000),
        )
        .with_repeat(2);
        let device = backend.default_video_device().unwrap();
        let mut input = backend.create_input(&device).unwrap();

        assert_eq!(input.next_frame().unwrap().sequence, 1);
        assert_eq!(input.next_frame().unwrap().sequence, 2);
        assert_eq!(input.next_frame().unwrap_err(), BackendError::EndOfStream);
    }

    #[test]
    fn test_unknown_device_is_rejected() {
        let backend = StillImageBackend::from_frames(vec![], Framerate::from_int(30));
        let device = CameraDevice {
            name: "ghost".into(),
            path: "memory:9".into(),
            device_info: None,
        };
        assert!(backend.default_video_device().is_none());
        assert!(matches!(
            backend.create_input(&device),
            Err(BackendError::DeviceNotFound(_))
        ));
    }
}
