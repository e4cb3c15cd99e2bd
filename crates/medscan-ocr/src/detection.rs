//! OCR detections and recognized-text assembly.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

/// OCR adapter errors.
#[derive(Error, Debug)]
pub enum OcrError {
    #[error("JSON parse error: {0}")]
    JsonParse(#[from] serde_json::Error),

    #[error("Invalid OCR output format: {0}")]
    InvalidFormat(String),

    #[error("OCR engine error: {0}")]
    Engine(String),
}

pub type OcrResult<T> = Result<T, OcrError>;

/// One piece of text recognized by the OCR engine.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Detection {
    pub text: String,
    #[serde(default)]
    pub confidence: f64,
}

impl Detection {
    pub fn new(text: impl Into<String>, confidence: f64) -> Self {
        Self {
            text: text.into(),
            confidence,
        }
    }
}

/// Envelope layout: `{"detections": [{"text": "...", "confidence": 0.9}]}`.
#[derive(Debug, Deserialize)]
struct DetectionEnvelope {
    #[serde(default)]
    detections: Vec<Detection>,
}

/// Parse raw OCR engine output into detections.
///
/// Two layouts are accepted:
/// - the envelope object `{"detections": [...]}`
/// - the PaddleOCR nested list `[[[box, [text, confidence]], ...]]`, of which
///   only the first page is read. A `null` page means nothing was detected.
pub fn parse_engine_output(raw: &str) -> OcrResult<Vec<Detection>> {
    let trimmed = raw.trim();
    match trimmed.chars().next() {
        Some('{') => {
            let envelope: DetectionEnvelope = serde_json::from_str(trimmed)?;
            Ok(envelope.detections)
        }
        Some('[') => {
            let value: Value = serde_json::from_str(trimmed)?;
            parse_paddle_pages(&value)
        }
        Some(_) => Err(OcrError::InvalidFormat(
            "expected a JSON object or array".into(),
        )),
        None => Ok(Vec::new()),
    }
}

fn parse_paddle_pages(value: &Value) -> OcrResult<Vec<Detection>> {
    let pages = value
        .as_array()
        .ok_or_else(|| OcrError::InvalidFormat("top level is not an array".into()))?;

    let page = match pages.first() {
        None | Some(Value::Null) => return Ok(Vec::new()),
        Some(Value::Array(lines)) => lines,
        Some(_) => {
            return Err(OcrError::InvalidFormat(
                "page entry is not an array".into(),
            ))
        }
    };

    // Lines without a (text, confidence) pair are skipped, not rejected.
    let detections = page
        .iter()
        .filter_map(|line| {
            let pair = line.get(1)?.as_array()?;
            let text = pair.first()?.as_str()?;
            let confidence = pair.get(1).and_then(Value::as_f64).unwrap_or(0.0);
            Some(Detection::new(text, confidence))
        })
        .collect();

    Ok(detections)
}

/// Join detections into the text the matcher consumes.
///
/// Each detection is trimmed; strings of one character or less are dropped;
/// the rest are joined with single spaces in detection order.
pub fn recognized_text(detections: &[Detection]) -> String {
    detections
        .iter()
        .map(|d| d.text.trim())
        .filter(|t| t.chars().count() > 1)
        .collect::<Vec<_>>()
        .join(" ")
}
