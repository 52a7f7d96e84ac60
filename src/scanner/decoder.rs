// SPDX-License-Identifier: GPL-3.0-only

//! Barcode decoder backed by rxing
//!
//! Frames are reduced to a luma plane, downscaled when large, and handed to
//! rxing's multi-format reader. Recognised codes are mapped onto
//! [`MetadataObject`]s with normalized bounds.

use super::metadata::{
    BarcodeDecoder, FrameRegion, MachineReadableCodeObject, MetadataObject, Symbology,
};
use crate::backends::camera::format_converters::{downscale_luma, frame_to_luma};
use crate::backends::camera::types::CameraFrame;
use crate::constants::capture;
use rxing::BarcodeFormat;
use tracing::trace;

/// Symbologies rxing recognises that this crate can name
const RXING_SYMBOLOGIES: [Symbology; 7] = Symbology::ALL;

/// Barcode decoder
///
/// Optimized for real-time processing with frame downscaling.
pub struct RxingDecoder {
    /// Maximum dimension for processing (0 disables downscaling)
    max_dimension: u32,
}

impl Default for RxingDecoder {
    fn default() -> Self {
        Self::new()
    }
}

impl RxingDecoder {
    pub fn new() -> Self {
        Self {
            max_dimension: capture::DEFAULT_DETECTION_MAX_DIMENSION,
        }
    }

    /// Create a decoder with custom max dimension
    pub fn with_max_dimension(max_dimension: u32) -> Self {
        Self { max_dimension }
    }
}

impl BarcodeDecoder for RxingDecoder {
    fn supported_symbologies(&self) -> &[Symbology] {
        &RXING_SYMBOLOGIES
    }

    fn detect(&self, frame: &CameraFrame, symbologies: &[Symbology]) -> Vec<MetadataObject> {
        if symbologies.is_empty() {
            return Vec::new();
        }

        let start = std::time::Instant::now();

        let Some(luma) = frame_to_luma(frame) else {
            trace!(format = %frame.format, "Frame has no usable luma plane");
            return Vec::new();
        };
        let (luma, scale) = downscale_luma(luma, self.max_dimension);
        let (width, height) = (luma.width, luma.height);

        let results = match rxing::helpers::detect_multiple_in_luma(luma.data, width, height) {
            Ok(results) => results,
            Err(e) => {
                // rxing reports "nothing found" as an error
                trace!(error = ?e, "No barcodes in frame");
                return Vec::new();
            }
        };

        let objects: Vec<MetadataObject> = results
            .iter()
            .filter_map(|result| {
                let symbology = symbology_from_format(result.getBarcodeFormat())?;
                if !symbologies.contains(&symbology) {
                    return None;
                }

                let points: Vec<(f32, f32)> =
                    result.getPoints().iter().map(|p| (p.x, p.y)).collect();
                let text = result.getText();

                Some(MetadataObject::MachineReadableCode(
                    MachineReadableCodeObject {
                        symbology,
                        string_value: (!text.is_empty()).then(|| text.to_string()),
                        bounds: FrameRegion::bounding(&points, width, height),
                    },
                ))
            })
            .collect();

        trace!(
            width,
            height,
            scale,
            count = objects.len(),
            elapsed_ms = start.elapsed().as_millis(),
            "Barcode detection complete"
        );

        objects
    }
}

fn symbology_from_format(format: &BarcodeFormat) -> Option<Symbology> {
    match format {
        BarcodeFormat::EAN_8 => Some(Symbology::Ean8),
        BarcodeFormat::EAN_13 => Some(Symbology::Ean13),
        BarcodeFormat::UPC_A => Some(Symbology::UpcA),
        BarcodeFormat::UPC_E => Some(Symbology::UpcE),
        BarcodeFormat::CODE_39 => Some(Symbology::Code39),
        BarcodeFormat::CODE_128 => Some(Symbology::Code128),
        BarcodeFormat::QR_CODE => Some(Symbology::Qr),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blank_frame_has_no_codes() {
        let decoder = RxingDecoder::default();
        let frame = CameraFrame::from_gray(64, 64, vec![255; 64 * 64]);
        assert!(decoder.detect(&frame, &Symbology::SCANNED).is_empty());
    }

    #[test]
    fn test_no_requested_symbologies_skips_detection() {
        let decoder = RxingDecoder::with_max_dimension(0);
        let frame = CameraFrame::from_gray(8, 8, vec![0; 64]);
        assert!(decoder.detect(&frame, &[]).is_empty());
    }

    #[test]
    fn test_supports_ean() {
        let decoder = RxingDecoder::new();
        for symbology in Symbology::SCANNED {
            assert!(decoder.supported_symbologies().contains(&symbology));
        }
    }

    #[test]
    fn test_format_mapping() {
        assert_eq!(symbology_from_format(&BarcodeFormat::EAN_13), Some(Symbology::Ean13));
        assert_eq!(symbology_from_format(&BarcodeFormat::EAN_8), Some(Symbology::Ean8));
        assert_eq!(symbology_from_format(&BarcodeFormat::PDF_417), None);
    }
}
