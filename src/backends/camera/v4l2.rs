// SPDX-License-Identifier: GPL-3.0-only

//! V4L2 camera backend
//!
//! Talks to `/dev/video*` capture nodes through the v4l crate. Opening the
//! device and negotiating a format happens in [`V4l2Backend::create_input`],
//! so permission and busy errors are reported during setup. The memory-mapped
//! buffer stream is created lazily on the first frame read, i.e. on the
//! capture thread.

use super::types::*;
use super::{CameraBackend, DeviceInput};
use std::time::Instant;
use tracing::{debug, info, warn};
use v4l::buffer::Type;
use v4l::framesize::FrameSizeEnum;
use v4l::io::traits::CaptureStream;
use v4l::prelude::*;
use v4l::video::Capture;
use v4l::video::capture::Parameters;
use v4l::{Format, FourCC};

/// Number of memory-mapped capture buffers
const BUFFER_COUNT: u32 = 4;

/// V4L2 backend with the capture size the scanner asks devices for
pub struct V4l2Backend {
    width: u32,
    height: u32,
    framerate: u32,
    preferred_path: Option<String>,
}

impl V4l2Backend {
    pub fn new(width: u32, height: u32, framerate: u32, preferred_path: Option<String>) -> Self {
        Self {
            width,
            height,
            framerate,
            preferred_path,
        }
    }

    /// Pick the pixel format and frame size closest to the requested size
    fn negotiate(&self, dev: &Device) -> BackendResult<Format> {
        let available: Vec<FourCC> = dev
            .enum_formats()
            .map_err(BackendError::from)?
            .into_iter()
            .map(|desc| desc.fourcc)
            .collect();

        let Some((pixel_format, fourcc)) = PixelFormat::PREFERRED.iter().find_map(|format| {
            let fourcc = FourCC::new(&format.fourcc());
            available.contains(&fourcc).then_some((*format, fourcc))
        }) else {
            // Nothing we prefer; keep whatever the device is configured for
            let current = dev.format().map_err(BackendError::from)?;
            debug!(fourcc = %current.fourcc, "No preferred format, keeping device format");
            return Ok(current);
        };

        let (width, height) = self.closest_size(dev, fourcc);
        debug!(%pixel_format, width, height, "Negotiating capture format");

        dev.set_format(&Format::new(width, height, fourcc))
            .map_err(|e| BackendError::FormatNotSupported(e.to_string()))
    }

    fn closest_size(&self, dev: &Device, fourcc: FourCC) -> (u32, u32) {
        let sizes = dev
            .enum_framesizes(fourcc)
            .unwrap_or_default()
            .into_iter()
            .map(|size| match size.size {
                FrameSizeEnum::Discrete(discrete) => (discrete.width, discrete.height),
                FrameSizeEnum::Stepwise(step) => (
                    self.width.clamp(step.min_width, step.max_width),
                    self.height.clamp(step.min_height, step.max_height),
                ),
            });

        nearest_size(sizes, self.width, self.height)
    }
}

/// The size whose pixel count is closest to `width` x `height`
///
/// Falls back to the requested size when `sizes` is empty.
fn nearest_size(sizes: impl IntoIterator<Item = (u32, u32)>, width: u32, height: u32) -> (u32, u32) {
    let area = |w: u32, h: u32| u64::from(w) * u64::from(h);
    let target = area(width, height);

    sizes
        .into_iter()
        .min_by_key(|&(w, h)| area(w, h).abs_diff(target))
        .unwrap_or((width, height))
}

impl CameraBackend for V4l2Backend {
    fn enumerate_cameras(&self) -> Vec<CameraDevice> {
        let mut cameras: Vec<CameraDevice> = v4l::context::enum_devices()
            .into_iter()
            .filter_map(|node| {
                let path = node.path().to_string_lossy().to_string();
                let dev = Device::with_path(node.path()).ok()?;

                // Metadata nodes of UVC cameras have no capture formats
                let has_formats = dev.enum_formats().map(|f| !f.is_empty()).unwrap_or(false);
                if !has_formats {
                    return None;
                }

                let caps = dev.query_caps().ok();
                let name = caps
                    .as_ref()
                    .map(|c| c.card.clone())
                    .or_else(|| node.name())
                    .unwrap_or_else(|| path.clone());

                Some(CameraDevice {
                    name,
                    path,
                    device_info: caps.map(|c| DeviceInfo {
                        card: c.card,
                        driver: c.driver,
                        bus: c.bus,
                    }),
                })
            })
            .collect();

        cameras.sort_by(|a, b| a.path.cmp(&b.path));
        debug!(count = cameras.len(), "Enumerated V4L2 cameras");
        cameras
    }

    fn default_video_device(&self) -> Option<CameraDevice> {
        let cameras = self.enumerate_cameras();
        if let Some(preferred) = &self.preferred_path
            && let Some(camera) = cameras.iter().find(|c| &c.path == preferred)
        {
            return Some(camera.clone());
        }
        cameras.into_iter().next()
    }

    fn create_input(&self, device: &CameraDevice) -> BackendResult<Box<dyn DeviceInput>> {
        info!(device = %device, "Opening V4L2 device");

        let dev = Device::with_path(&device.path).map_err(BackendError::from)?;
        let format = self.negotiate(&dev)?;

        if let Err(e) = dev.set_params(&Parameters::with_fps(self.framerate)) {
            warn!(error = %e, fps = self.framerate, "Could not set frame rate");
        }
        let framerate = dev
            .params()
            .ok()
            .map(|p| Framerate::new(p.interval.denominator, p.interval.numerator));

        let pixel_format = PixelFormat::from_fourcc(&format.fourcc.repr).ok_or_else(|| {
            BackendError::FormatNotSupported(format!("unknown fourcc {}", format.fourcc))
        })?;

        let stride = if format.stride > 0 {
            format.stride
        } else {
            format.width * pixel_format.bytes_per_pixel()
        };

        let camera_format = CameraFormat {
            width: format.width,
            height: format.height,
            framerate,
            pixel_format,
        };
        info!(format = %camera_format, "V4L2 format negotiated");

        Ok(Box::new(V4l2Input {
            stream: None,
            dev,
            device: device.clone(),
            format: camera_format,
            stride,
            sequence: 0,
        }))
    }

    fn supported_formats(&self, device: &CameraDevice) -> Vec<CameraFormat> {
        let Ok(dev) = Device::with_path(&device.path) else {
            return Vec::new();
        };

        let descriptions = dev.enum_formats().unwrap_or_default();
        descriptions
            .iter()
            .filter_map(|desc| {
                let pixel_format = PixelFormat::from_fourcc(&desc.fourcc.repr)?;
                let sizes = dev.enum_framesizes(desc.fourcc).unwrap_or_default();
                Some(sizes.into_iter().filter_map(move |size| match size.size {
                    FrameSizeEnum::Discrete(discrete) => Some(CameraFormat {
                        width: discrete.width,
                        height: discrete.height,
                        framerate: None,
                        pixel_format,
                    }),
                    FrameSizeEnum::Stepwise(_) => None,
                }))
            })
            .flatten()
            .collect()
    }

    fn name(&self) -> &'static str {
        "V4L2"
    }
}

/// An opened V4L2 device
pub struct V4l2Input {
    // Declared before `dev` so streaming is turned off before the fd closes
    stream: Option<MmapStream<'static>>,
    dev: Device,
    device: CameraDevice,
    format: CameraFormat,
    stride: u32,
    sequence: u64,
}

impl DeviceInput for V4l2Input {
    fn device(&self) -> &CameraDevice {
        &self.device
    }

    fn format(&self) -> &CameraFormat {
        &self.format
    }

    fn next_frame(&mut self) -> BackendResult<CameraFrame> {
        if self.stream.is_none() {
            let stream = MmapStream::with_buffers(&self.dev, Type::VideoCapture, BUFFER_COUNT)
                .map_err(|e| BackendError::Disconnected(format!("stream setup: {}", e)))?;
            info!(device = %self.device.path, "V4L2 capture stream started");
            self.stream = Some(stream);
        }
        let Some(stream) = self.stream.as_mut() else {
            return Err(BackendError::Other("capture stream missing".into()));
        };

        let (buf, meta) = stream
            .next()
            .map_err(|e| BackendError::Disconnected(e.to_string()))?;

        // Compressed frames only fill part of the buffer
        let used = meta.bytesused as usize;
        let bytes = if used > 0 && used <= buf.len() {
            &buf[..used]
        } else {
            buf
        };

        self.sequence += 1;
        Ok(CameraFrame {
            width: self.format.width,
            height: self.format.height,
            data: std::sync::Arc::from(bytes),
            format: self.format.pixel_format,
            stride: self.stride,
            sequence: self.sequence,
            captured_at: Instant::now(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_nearest_size_picks_closest_area() {
        let sizes = [(320, 240), (640, 480), (1920, 1080)];
        assert_eq!(nearest_size(sizes, 800, 600), (640, 480));
        assert_eq!(nearest_size(sizes, 1280, 720), (1920, 1080));
    }

    #[test]
    fn test_nearest_size_without_sizes_keeps_request() {
        assert_eq!(nearest_size([], 1280, 720), (1280, 720));
    }

    #[test]
    fn test_nearest_size_large_dimensions() {
        // Areas past u32::MAX
        let sizes = [(65_536, 65_536), (70_000, 70_000), (1920, 1080)];
        assert_eq!(nearest_size(sizes, 69_000, 69_000), (70_000, 70_000));
        assert_eq!(nearest_size(sizes, u32::MAX, u32::MAX), (70_000, 70_000));
    }
}
