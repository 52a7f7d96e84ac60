// SPDX-License-Identifier: GPL-3.0-only

//! Frame metadata to scan outcome
//!
//! Each metadata delivery yields exactly one [`ScanEvent`]. Only the first
//! object of a delivery is considered; additional simultaneous codes are
//! ignored.

use super::metadata::MetadataObject;
use crate::errors::CameraError;
use tracing::debug;

/// Outcome of interpreting one metadata delivery
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScanEvent {
    /// A barcode string was read
    Decoded { barcode: String },
    /// The pipeline failed
    Failed(CameraError),
}

impl ScanEvent {
    pub fn is_decoded(&self) -> bool {
        matches!(self, ScanEvent::Decoded { .. })
    }
}

/// Interpret the objects of one frame
///
/// An empty delivery, a non-code object and a code without a payload all map
/// to `InvalidScannedValue`. No validation of the payload is performed.
pub fn detect_barcode(objects: &[MetadataObject]) -> ScanEvent {
    let Some(first) = objects.first() else {
        debug!("Metadata delivery without objects");
        return ScanEvent::Failed(CameraError::InvalidScannedValue);
    };

    let Some(code) = first.as_machine_readable_code() else {
        debug!("First metadata object is not a machine readable code");
        return ScanEvent::Failed(CameraError::InvalidScannedValue);
    };

    match &code.string_value {
        Some(value) => ScanEvent::Decoded {
            barcode: value.clone(),
        },
        None => {
            debug!(symbology = %code.symbology, "Code has no string value");
            ScanEvent::Failed(CameraError::InvalidScannedValue)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scanner::metadata::{FrameRegion, MachineReadableCodeObject, Symbology};

    #[test]
    fn test_first_object_wins() {
        let objects = vec![
            MetadataObject::code(Symbology::Ean13, "4006381333931"),
            MetadataObject::code(Symbology::Ean8, "96385074"),
        ];
        assert_eq!(
            detect_barcode(&objects),
            ScanEvent::Decoded {
                barcode: "4006381333931".into()
            }
        );
    }

    #[test]
    fn test_empty_delivery_is_invalid() {
        assert_eq!(
            detect_barcode(&[]),
            ScanEvent::Failed(CameraError::InvalidScannedValue)
        );
    }

    #[test]
    fn test_missing_payload_is_invalid() {
        let objects = vec![MetadataObject::MachineReadableCode(
            MachineReadableCodeObject {
                symbology: Symbology::Ean8,
                string_value: None,
                bounds: FrameRegion::default(),
            },
        )];
        assert_eq!(
            detect_barcode(&objects),
            ScanEvent::Failed(CameraError::InvalidScannedValue)
        );
    }

    #[test]
    fn test_non_code_object_is_invalid() {
        let objects = vec![
            MetadataObject::Other {
                kind: "face".into(),
                bounds: FrameRegion::default(),
            },
            MetadataObject::code(Symbology::Ean8, "96385074"),
        ];
        assert!(!detect_barcode(&objects).is_decoded());
    }

    #[test]
    fn test_payload_is_not_validated() {
        let objects = vec![MetadataObject::code(Symbology::Ean13, "")];
        assert_eq!(
            detect_barcode(&objects),
            ScanEvent::Decoded {
                barcode: String::new()
            }
        );
    }
}
