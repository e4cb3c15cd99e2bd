//! OCR engine boundary.

use crate::detection::{Detection, OcrError, OcrResult};

/// An external OCR engine that reads text out of an encoded image.
pub trait OcrEngine {
    fn recognize(&self, image: &[u8]) -> OcrResult<Vec<Detection>>;
}

/// Mock engine for testing without a real OCR backend.
///
/// Returns the same detections for every non-empty image.
pub struct MockOcrEngine {
    detections: Vec<Detection>,
}

impl MockOcrEngine {
    pub fn new(detections: Vec<Detection>) -> Self {
        Self { detections }
    }

    /// Build a mock from whitespace-separated words, one detection per word.
    pub fn from_words(text: &str) -> Self {
        Self::new(
            text.split_whitespace()
                .map(|w| Detection::new(w, 1.0))
                .collect(),
        )
    }
}

impl OcrEngine for MockOcrEngine {
    fn recognize(&self, image: &[u8]) -> OcrResult<Vec<Detection>> {
        if image.is_empty() {
            return Err(OcrError::Engine("empty image".into()));
        }
        Ok(self.detections.clone())
    }
}
