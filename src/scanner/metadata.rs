// SPDX-License-Identifier: MPL-2.0

//! Metadata objects and the metadata output stage
//!
//! A metadata object is something the decoder recognised in a frame. The
//! output stage runs the injected decoder on every captured frame, keeps only
//! the symbologies the session asked for, and decides which frames produce a
//! metadata delivery at all.

use crate::backends::camera::types::CameraFrame;
use std::sync::Arc;
use tracing::{trace, warn};

/// Barcode encoding standard
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Symbology {
    Ean8,
    Ean13,
    UpcA,
    UpcE,
    Code39,
    Code128,
    Qr,
}

impl Symbology {
    /// Symbologies a scanning session is restricted to
    pub const SCANNED: [Symbology; 2] = [Symbology::Ean8, Symbology::Ean13];

    /// Every symbology the crate can name
    pub const ALL: [Symbology; 7] = [
        Symbology::Ean8,
        Symbology::Ean13,
        Symbology::UpcA,
        Symbology::UpcE,
        Symbology::Code39,
        Symbology::Code128,
        Symbology::Qr,
    ];

    pub fn display_name(&self) -> &'static str {
        match self {
            Symbology::Ean8 => "EAN-8",
            Symbology::Ean13 => "EAN-13",
            Symbology::UpcA => "UPC-A",
            Symbology::UpcE => "UPC-E",
            Symbology::Code39 => "Code 39",
            Symbology::Code128 => "Code 128",
            Symbology::Qr => "QR",
        }
    }
}

impl std::fmt::Display for Symbology {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.display_name())
    }
}

/// A rectangular region within a frame
///
/// Coordinates are normalized (0.0 to 1.0) relative to the frame dimensions.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct FrameRegion {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl FrameRegion {
    /// Bounding box of a set of pixel coordinates
    pub fn bounding(points: &[(f32, f32)], frame_width: u32, frame_height: u32) -> Self {
        if points.is_empty() || frame_width == 0 || frame_height == 0 {
            return Self::default();
        }

        let (mut min_x, mut min_y) = (f32::MAX, f32::MAX);
        let (mut max_x, mut max_y) = (f32::MIN, f32::MIN);
        for &(x, y) in points {
            min_x = min_x.min(x);
            min_y = min_y.min(y);
            max_x = max_x.max(x);
            max_y = max_y.max(y);
        }

        let fw = frame_width as f32;
        let fh = frame_height as f32;
        let x = (min_x / fw).clamp(0.0, 1.0);
        let y = (min_y / fh).clamp(0.0, 1.0);
        Self {
            x,
            y,
            width: (max_x / fw).clamp(0.0, 1.0) - x,
            height: (max_y / fh).clamp(0.0, 1.0) - y,
        }
    }
}

/// A recognised code with its (possibly missing) payload
#[derive(Debug, Clone, PartialEq)]
pub struct MachineReadableCodeObject {
    pub symbology: Symbology,
    /// `None` when the code was located but its payload could not be read
    pub string_value: Option<String>,
    pub bounds: FrameRegion,
}

/// A region of interest recognised in one frame
#[derive(Debug, Clone, PartialEq)]
pub enum MetadataObject {
    /// A scannable code
    MachineReadableCode(MachineReadableCodeObject),
    /// Anything else a detector may report (faces, bodies, ...)
    Other { kind: String, bounds: FrameRegion },
}

impl MetadataObject {
    /// Convenience constructor for a decoded code
    pub fn code(symbology: Symbology, value: impl Into<String>) -> Self {
        MetadataObject::MachineReadableCode(MachineReadableCodeObject {
            symbology,
            string_value: Some(value.into()),
            bounds: FrameRegion::default(),
        })
    }

    pub fn as_machine_readable_code(&self) -> Option<&MachineReadableCodeObject> {
        match self {
            MetadataObject::MachineReadableCode(code) => Some(code),
            MetadataObject::Other { .. } => None,
        }
    }
}

/// External barcode recognition capability
///
/// Symbology decoding itself is not implemented in this crate; implementors
/// wrap a decoder library (see [`super::decoder::RxingDecoder`]).
pub trait BarcodeDecoder: Send + Sync {
    /// Symbologies this decoder can recognise
    fn supported_symbologies(&self) -> &[Symbology];

    /// Recognise objects in a frame, restricted to `symbologies`
    fn detect(&self, frame: &CameraFrame, symbologies: &[Symbology]) -> Vec<MetadataObject>;
}

/// Metadata output stage of a capture session
///
/// A delivery is produced for every frame with at least one recognised
/// object, plus a single empty delivery when objects disappear from view.
/// Frames that stay empty produce nothing.
pub struct MetadataOutput {
    decoder: Arc<dyn BarcodeDecoder>,
    object_types: Vec<Symbology>,
    had_objects: bool,
}

impl MetadataOutput {
    pub fn new(decoder: Arc<dyn BarcodeDecoder>) -> Self {
        Self {
            decoder,
            object_types: Vec::new(),
            had_objects: false,
        }
    }

    /// Types the decoder can report
    pub fn available_metadata_object_types(&self) -> &[Symbology] {
        self.decoder.supported_symbologies()
    }

    /// Restrict reported codes to `types`
    ///
    /// Types the decoder cannot recognise are ignored.
    pub fn set_metadata_object_types(&mut self, types: &[Symbology]) {
        let available = self.decoder.supported_symbologies();
        self.object_types = types
            .iter()
            .copied()
            .filter(|t| {
                let supported = available.contains(t);
                if !supported {
                    warn!(symbology = %t, "Decoder does not support symbology");
                }
                supported
            })
            .collect();
    }

    pub fn metadata_object_types(&self) -> &[Symbology] {
        &self.object_types
    }

    /// Run detection on one frame
    ///
    /// Returns the objects to deliver, or `None` when this frame produces no
    /// delivery.
    pub fn process(&mut self, frame: &CameraFrame) -> Option<Vec<MetadataObject>> {
        let objects: Vec<MetadataObject> = self
            .decoder
            .detect(frame, &self.object_types)
            .into_iter()
            .filter(|object| match object {
                MetadataObject::MachineReadableCode(code) => {
                    self.object_types.contains(&code.symbology)
                }
                MetadataObject::Other { .. } => true,
            })
            .collect();

        let had_objects = std::mem::replace(&mut self.had_objects, !objects.is_empty());
        if objects.is_empty() && !had_objects {
            return None;
        }

        trace!(
            sequence = frame.sequence,
            count = objects.len(),
            "Metadata objects for frame"
        );
        Some(objects)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    /// Decoder returning a scripted answer per call
    struct ScriptedDecoder {
        script: Mutex<Vec<Vec<MetadataObject>>>,
    }

    impl BarcodeDecoder for ScriptedDecoder {
        fn supported_symbologies(&self) -> &[Symbology] {
            &Symbology::SCANNED
        }

        fn detect(&self, _frame: &CameraFrame, _symbologies: &[Symbology]) -> Vec<MetadataObject> {
            let mut script = self.script.lock().unwrap();
            if script.is_empty() {
                Vec::new()
            } else {
                script.remove(0)
            }
        }
    }

    fn output(script: Vec<Vec<MetadataObject>>) -> MetadataOutput {
        let mut output = MetadataOutput::new(Arc::new(ScriptedDecoder {
            script: Mutex::new(script),
        }));
        output.set_metadata_object_types(&Symbology::SCANNED);
        output
    }

    fn frame() -> CameraFrame {
        CameraFrame::from_gray(2, 2, vec![0; 4])
    }

    #[test]
    fn test_unsupported_types_are_ignored() {
        let mut output = output(vec![]);
        output.set_metadata_object_types(&[Symbology::Qr, Symbology::Ean13]);
        assert_eq!(output.metadata_object_types(), &[Symbology::Ean13]);
    }

    #[test]
    fn test_empty_delivery_only_on_disappearance() {
        let code = MetadataObject::code(Symbology::Ean13, "4006381333931");
        let mut output = output(vec![vec![], vec![code.clone()], vec![], vec![]]);

        assert_eq!(output.process(&frame()), None);
        assert_eq!(output.process(&frame()), Some(vec![code]));
        assert_eq!(output.process(&frame()), Some(vec![]));
        assert_eq!(output.process(&frame()), None);
    }

    #[test]
    fn test_unrequested_symbologies_are_filtered() {
        let mut output = output(vec![vec![
            MetadataObject::code(Symbology::Qr, "https://example.com"),
            MetadataObject::code(Symbology::Ean8, "96385074"),
        ]]);

        let objects = output.process(&frame()).unwrap();
        assert_eq!(objects, vec![MetadataObject::code(Symbology::Ean8, "96385074")]);
    }

    #[test]
    fn test_frame_region_bounding() {
        let region = FrameRegion::bounding(&[(10.0, 20.0), (30.0, 60.0), (20.0, 40.0)], 100, 100);
        assert_eq!(region.x, 0.1);
        assert_eq!(region.y, 0.2);
        assert!((region.width - 0.2).abs() < 1e-6);
        assert!((region.height - 0.4).abs() < 1e-6);
    }
}
