//! Scan pipeline: detections → recognized text → ranked matches, and
//! selected record → interactions.

use medscan_ocr::{recognized_text, Detection, OcrEngine, OcrError};
use thiserror::Error;
use tracing::info;

use crate::config::{ConfigError, ScanConfig};
use crate::interactions::{InteractionError, InteractionService, OpenFdaClient};
use crate::matcher::{Matcher, MatcherError};
use crate::models::{InteractionLookup, MatchReport, MedicationRecord};

/// Scan errors. Each one ends the current pass only.
#[derive(Error, Debug)]
pub enum ScanError {
    #[error("Medication catalog is unavailable")]
    CatalogUnavailable,

    #[error("No text detected in the image")]
    NoTextDetected,

    #[error("OCR failed: {0}")]
    Ocr(#[from] OcrError),

    #[error("Matcher setup failed: {0}")]
    Matcher(#[from] MatcherError),

    #[error("Interaction client setup failed: {0}")]
    Interaction(#[from] InteractionError),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
}

pub type ScanResult<T> = Result<T, ScanError>;

/// Owns the catalog and runs matching passes over it.
pub struct Scanner {
    catalog: Vec<MedicationRecord>,
    matcher: Matcher,
    interactions: InteractionService,
    summary_size: usize,
}

impl Scanner {
    pub fn new(
        catalog: Vec<MedicationRecord>,
        matcher: Matcher,
        interactions: InteractionService,
        summary_size: usize,
    ) -> Self {
        Self {
            catalog,
            matcher,
            interactions,
            summary_size,
        }
    }

    /// Build a scanner wired to openFDA from configuration.
    pub fn from_config(config: &ScanConfig, catalog: Vec<MedicationRecord>) -> ScanResult<Self> {
        let matcher = Matcher::with_vocabulary(&config.vocabulary()?)?;
        let client = OpenFdaClient::new(
            &config.openfda_url,
            config.openfda_api_key.clone(),
            config.timeout(),
        )?;
        Ok(Self::new(
            catalog,
            matcher,
            InteractionService::new(Box::new(client)),
            config.summary_size,
        ))
    }

    pub fn catalog(&self) -> &[MedicationRecord] {
        &self.catalog
    }

    /// First record named `name`, ignoring case and surrounding spaces.
    pub fn find_record(&self, name: &str) -> Option<&MedicationRecord> {
        let name = name.trim().to_lowercase();
        self.catalog
            .iter()
            .find(|r| r.name.trim().to_lowercase() == name)
    }

    /// Swap in a new catalog. The interaction cache is kept.
    pub fn replace_catalog(&mut self, catalog: Vec<MedicationRecord>) {
        self.catalog = catalog;
    }

    pub fn summary_size(&self) -> usize {
        self.summary_size
    }

    /// Match already-recognized text against the catalog.
    pub fn match_text(&self, text: &str) -> ScanResult<MatchReport<'_>> {
        let text = text.trim();
        if text.is_empty() {
            return Err(ScanError::NoTextDetected);
        }
        if self.catalog.is_empty() {
            return Err(ScanError::CatalogUnavailable);
        }

        let report = self.matcher.match_text(text, &self.catalog);
        info!(
            matches = report.candidates.len(),
            best = report.best().map(|c| c.record.name.as_str()).unwrap_or(""),
            "scan complete"
        );
        Ok(report)
    }

    /// Assemble recognized text from OCR detections and match it.
    pub fn scan_detections(&self, detections: &[Detection]) -> ScanResult<MatchReport<'_>> {
        self.match_text(&recognized_text(detections))
    }

    /// Run an OCR engine over an image and match the result.
    pub fn scan_image(&self, engine: &dyn OcrEngine, image: &[u8]) -> ScanResult<MatchReport<'_>> {
        let detections = engine.recognize(image)?;
        self.scan_detections(&detections)
    }

    /// Interactions for a record's primary active ingredient.
    pub fn interactions_for(&self, record: &MedicationRecord) -> InteractionLookup {
        match record.primary_ingredient() {
            Some(ingredient) => self.interactions.lookup(ingredient),
            None => InteractionLookup::default(),
        }
    }

    /// Interactions for an ingredient name.
    pub fn lookup_interactions(&self, ingredient: &str) -> InteractionLookup {
        self.interactions.lookup(ingredient)
    }
}
