// SPDX-License-Identifier: GPL-3.0-only
//! Pixel format conversion to 8-bit luma
//!
//! Barcode readers only need brightness, so every supported capture format is
//! reduced to a tightly packed luma plane before detection.

use super::types::{CameraFrame, PixelFormat};
use tracing::debug;

/// A tightly packed 8-bit luma plane
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LumaPlane {
    pub width: u32,
    pub height: u32,
    pub data: Vec<u8>,
}

/// Extract the luma plane of a frame
///
/// Returns `None` for formats without a luma representation (H.264) and for
/// frames whose buffer is too short for the advertised geometry.
pub fn frame_to_luma(frame: &CameraFrame) -> Option<LumaPlane> {
    let width = frame.width as usize;
    let height = frame.height as usize;
    let stride = frame.stride as usize;
    let data = frame.data_slice();

    let luma = match frame.format {
        // Y plane first, chroma follows and is ignored
        PixelFormat::Gray8 | PixelFormat::NV12 | PixelFormat::I420 => {
            gather_rows(data, width, height, stride, 1, |px| px[0])?
        }
        PixelFormat::YUYV => gather_pairs(data, width, height, stride, [0, 2])?,
        PixelFormat::UYVY => gather_pairs(data, width, height, stride, [1, 3])?,
        PixelFormat::RGBA => gather_rows(data, width, height, stride, 4, rgb_luma)?,
        PixelFormat::RGB24 => gather_rows(data, width, height, stride, 3, rgb_luma)?,
        PixelFormat::MJPEG => return mjpeg_to_luma(data),
        PixelFormat::H264 => return None,
    };

    Some(LumaPlane {
        width: frame.width,
        height: frame.height,
        data: luma,
    })
}

/// BT.601 luma from the first three channels
fn rgb_luma(px: &[u8]) -> u8 {
    let r = px[0] as u32;
    let g = px[1] as u32;
    let b = px[2] as u32;
    ((r * 299 + g * 587 + b * 114) / 1000) as u8
}

fn gather_rows(
    data: &[u8],
    width: usize,
    height: usize,
    stride: usize,
    bytes_per_pixel: usize,
    pick: impl Fn(&[u8]) -> u8,
) -> Option<Vec<u8>> {
    let row_bytes = width * bytes_per_pixel;
    if height == 0 || data.len() < (height - 1) * stride + row_bytes {
        return None;
    }

    let mut luma = Vec::with_capacity(width * height);
    for y in 0..height {
        let row = &data[y * stride..y * stride + row_bytes];
        luma.extend(row.chunks_exact(bytes_per_pixel).map(&pick));
    }
    Some(luma)
}

/// Packed 4:2:2 - two pixels per 4-byte group, luma at `offsets`
fn gather_pairs(
    data: &[u8],
    width: usize,
    height: usize,
    stride: usize,
    offsets: [usize; 2],
) -> Option<Vec<u8>> {
    let row_bytes = width.div_ceil(2) * 4;
    if height == 0 || data.len() < (height - 1) * stride + row_bytes {
        return None;
    }

    let mut luma = Vec::with_capacity(width * height);
    for y in 0..height {
        let row = &data[y * stride..y * stride + row_bytes];
        for group in row.chunks_exact(4) {
            luma.push(group[offsets[0]]);
            luma.push(group[offsets[1]]);
        }
        // Odd widths carry one padding pixel per row
        luma.truncate((y + 1) * width);
    }
    Some(luma)
}

fn mjpeg_to_luma(data: &[u8]) -> Option<LumaPlane> {
    match image::load_from_memory_with_format(data, image::ImageFormat::Jpeg) {
        Ok(img) => {
            let gray = img.to_luma8();
            Some(LumaPlane {
                width: gray.width(),
                height: gray.height(),
                data: gray.into_raw(),
            })
        }
        Err(e) => {
            debug!(error = %e, "Failed to decode MJPEG frame");
            None
        }
    }
}

/// Downscale a luma plane so neither side exceeds `max_dimension`
///
/// Uses bilinear interpolation. Returns the plane unchanged when it already
/// fits, together with the applied scale factor (source / destination).
pub fn downscale_luma(plane: LumaPlane, max_dimension: u32) -> (LumaPlane, f32) {
    if max_dimension == 0 || (plane.width <= max_dimension && plane.height <= max_dimension) {
        return (plane, 1.0);
    }

    let scale = (plane.width as f32 / max_dimension as f32)
        .max(plane.height as f32 / max_dimension as f32);
    let dst_width = ((plane.width as f32 / scale) as u32).max(1);
    let dst_height = ((plane.height as f32 / scale) as u32).max(1);

    let src_width = plane.width as usize;
    let src_height = plane.height as usize;
    let x_ratio = src_width as f32 / dst_width as f32;
    let y_ratio = src_height as f32 / dst_height as f32;

    let get = |px: usize, py: usize| -> f32 {
        plane.data.get(py * src_width + px).copied().unwrap_or(0) as f32
    };

    let mut result = Vec::with_capacity((dst_width * dst_height) as usize);
    for y in 0..dst_height {
        for x in 0..dst_width {
            let src_x = x as f32 * x_ratio;
            let src_y = y as f32 * y_ratio;

            let x0 = src_x as usize;
            let y0 = src_y as usize;
            let x1 = (x0 + 1).min(src_width - 1);
            let y1 = (y0 + 1).min(src_height - 1);

            let x_frac = src_x - x0 as f32;
            let y_frac = src_y - y0 as f32;

            let value = get(x0, y0) * (1.0 - x_frac) * (1.0 - y_frac)
                + get(x1, y0) * x_frac * (1.0 - y_frac)
                + get(x0, y1) * (1.0 - x_frac) * y_frac
                + get(x1, y1) * x_frac * y_frac;

            result.push(value as u8);
        }
    }

    (
        LumaPlane {
            width: dst_width,
            height: dst_height,
            data: result,
        },
        scale,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::time::Instant;

    fn frame(width: u32, height: u32, stride: u32, format: PixelFormat, data: Vec<u8>) -> CameraFrame {
        CameraFrame {
            width,
            height,
            data: Arc::from(data.as_slice()),
            format,
            stride,
            sequence: 0,
            captured_at: Instant::now(),
        }
    }

    #[test]
    fn test_rgba_luma_skips_stride_padding() {
        let data: Vec<u8> = vec![
            255, 255, 255, 255, // White
            0, 0, 0, 255, // Black
            9, 9, // stride padding
            255, 0, 0, 255, // Red
            0, 255, 0, 255, // Green
            9, 9, // stride padding
        ];

        let luma = frame_to_luma(&frame(2, 2, 10, PixelFormat::RGBA, data)).unwrap();
        assert_eq!(luma.data.len(), 4);
        assert_eq!(luma.data[0], 255);
        assert_eq!(luma.data[1], 0);
        assert_eq!(luma.data[2], 76); // 0.299 * 255
        assert_eq!(luma.data[3], 149); // 0.587 * 255
    }

    #[test]
    fn test_yuyv_and_uyvy_luma() {
        let yuyv = vec![10, 128, 20, 128, 30, 128, 40, 128];
        let luma = frame_to_luma(&frame(4, 1, 8, PixelFormat::YUYV, yuyv)).unwrap();
        assert_eq!(luma.data, vec![10, 20, 30, 40]);

        let uyvy = vec![128, 10, 128, 20];
        let luma = frame_to_luma(&frame(2, 1, 4, PixelFormat::UYVY, uyvy)).unwrap();
        assert_eq!(luma.data, vec![10, 20]);
    }

    #[test]
    fn test_nv12_uses_y_plane_only() {
        // 2x2 Y plane followed by one UV pair
        let data = vec![1, 2, 3, 4, 128, 128];
        let luma = frame_to_luma(&frame(2, 2, 2, PixelFormat::NV12, data)).unwrap();
        assert_eq!(luma.data, vec![1, 2, 3, 4]);
    }

    #[test]
    fn test_truncated_buffer_is_rejected() {
        let data = vec![0u8; 5];
        assert!(frame_to_luma(&frame(2, 2, 8, PixelFormat::RGBA, data)).is_none());
    }

    #[test]
    fn test_h264_has_no_luma() {
        assert!(frame_to_luma(&frame(2, 2, 0, PixelFormat::H264, vec![0; 16])).is_none());
    }

    #[test]
    fn test_downscale_luma() {
        let plane = LumaPlane {
            width: 4,
            height: 2,
            data: vec![0, 85, 170, 255, 0, 85, 170, 255],
        };

        let (small, scale) = downscale_luma(plane, 2);
        assert_eq!((small.width, small.height), (2, 1));
        assert_eq!(scale, 2.0);
        assert!(small.data[0] < 100);
        assert!(small.data[1] > 150);
    }

    #[test]
    fn test_downscale_noop_when_small() {
        let plane = LumaPlane {
            width: 2,
            height: 2,
            data: vec![1, 2, 3, 4],
        };
        let (same, scale) = downscale_luma(plane.clone(), 640);
        assert_eq!(same, plane);
        assert_eq!(scale, 1.0);
    }
}
