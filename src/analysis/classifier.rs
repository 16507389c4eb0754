// src/analysis/classifier.rs
use crate::capture::source::ImagePayload;

use super::error::ClassifyResult;
use super::types::WasteClassification;

/// Trait defining the interface for waste-classification backends
pub trait WasteClassifier: Send + Sync {
    /// Analyze one image and return the structured classification
    fn classify(&self, payload: &ImagePayload) -> ClassifyResult<WasteClassification>;
}


#[cfg(test)]
mod tests {
    use super::testing::{pet_bottle, FakeClassifier};
    use super::*;
    use crate::analysis::error::ClassifyError;
    use crate::analysis::types::DustbinColor;

    #[test]
    fn transport_failure_carries_displayable_message() {
        let classifier = FakeClassifier::failing(|| ClassifyError::ServiceStatus {
            status: reqwest::StatusCode::BAD_GATEWAY,
            body: "upstream unavailable".to_string(),
        });
        let payload = ImagePayload::from_jpeg_bytes(b"jpegdata").unwrap();

        let err = classifier.classify(&payload).unwrap_err();
        assert!(err.is_transport());
        assert!(!err.to_string().is_empty());
    }

    #[test]
    fn classify_twice_yields_identical_values() {
        let classifier = FakeClassifier::returning(pet_bottle());
        let payload = ImagePayload::from_jpeg_bytes(b"jpegdata").unwrap();

        let first = classifier.classify(&payload).unwrap();
        let second = classifier.classify(&payload).unwrap();

        assert_eq!(first, second);
        assert_eq!(first.dustbin_color, DustbinColor::Blue);
        assert_eq!(first.disposal_instructions.len(), 3);
    }
}
