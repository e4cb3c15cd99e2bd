//! MedScan Core Library
//!
//! Identifies a medication package from OCR text by fuzzy matching against a
//! catalog, then surfaces known interaction warnings for its active
//! ingredient.
//!
//! # Architecture
//!
//! ```text
//! Image → OCR (external) → Detections → Recognized text
//!                                              │
//!                                     Feature Extraction
//!                                   (dosages, form tokens)
//!                                              │
//!                              Scoring against every catalog record
//!                         total = 0.6 × name partial ratio + 0.4 × dosage
//!                                              │
//!                                  Threshold (≥ 55) + stable sort
//!                                              │
//!                                     Ranked match list
//!                                              │
//!                                   user selects a record
//!                                              │
//!                          primary ingredient → Interaction cache
//!                                              │ miss
//!                                      openFDA drug label
//! ```
//!
//! # Modules
//!
//! - [`models`]: Domain types (MedicationRecord, ScoredCandidate, etc.)
//! - [`matcher`]: Feature extraction, scoring and ranking
//! - [`interactions`]: Memoizing interaction lookup
//! - [`catalog`]: Catalog loading from JSON or the catalog database
//! - [`db`]: SQLite catalog store
//! - [`config`]: Scanner configuration
//! - [`pipeline`]: End-to-end scan pipeline

pub mod catalog;
pub mod config;
pub mod db;
pub mod interactions;
pub mod matcher;
pub mod models;
pub mod pipeline;

// Re-export commonly used types
pub use catalog::CatalogSource;
pub use config::ScanConfig;
pub use db::Database;
pub use interactions::{InteractionCache, InteractionService, InteractionSource};
pub use matcher::{FeatureExtractor, FormVocabulary, Matcher, ScoringEngine};
pub use models::{
    ExtractedFeatures, InteractionLookup, MatchReport, MedicationRecord, ScoredCandidate,
};
pub use pipeline::{ScanError, Scanner};

// UniFFI setup - using proc macros
uniffi::setup_scaffolding!();

use std::sync::{Arc, Mutex, RwLock};

// =========================================================================
// FFI Error Type
// =========================================================================

#[derive(Debug, thiserror::Error, uniffi::Error)]
pub enum MedScanError {
    #[error("Database error: {0}")]
    DatabaseError(String),

    #[error("Catalog error: {0}")]
    CatalogError(String),

    #[error("Medication catalog is unavailable")]
    CatalogUnavailable,

    #[error("No text detected in the image")]
    NoTextDetected,

    #[error("Scan failed: {0}")]
    ScanFailed(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),
}

impl From<db::DbError> for MedScanError {
    fn from(e: db::DbError) -> Self {
        MedScanError::DatabaseError(e.to_string())
    }
}

impl From<catalog::CatalogError> for MedScanError {
    fn from(e: catalog::CatalogError) -> Self {
        MedScanError::CatalogError(e.to_string())
    }
}

impl From<config::ConfigError> for MedScanError {
    fn from(e: config::ConfigError) -> Self {
        MedScanError::ConfigError(e.to_string())
    }
}

impl From<ScanError> for MedScanError {
    fn from(e: ScanError) -> Self {
        match e {
            ScanError::CatalogUnavailable => MedScanError::CatalogUnavailable,
            ScanError::NoTextDetected => MedScanError::NoTextDetected,
            other => MedScanError::ScanFailed(other.to_string()),
        }
    }
}

impl<T> From<std::sync::PoisonError<T>> for MedScanError {
    fn from(e: std::sync::PoisonError<T>) -> Self {
        MedScanError::DatabaseError(format!("Lock poisoned: {}", e))
    }
}

// =========================================================================
// Factory Functions (exported to FFI)
// =========================================================================

/// Open or create a catalog database and build a scanner over it.
///
/// `config_json` follows [`ScanConfig`]; defaults apply when absent.
#[uniffi::export]
pub fn open_scanner(
    path: String,
    config_json: Option<String>,
) -> Result<Arc<MedScanCore>, MedScanError> {
    let db = Database::open(&path)?;
    MedScanCore::build(db, config_json)
}

/// Create a scanner over an in-memory catalog database (for testing).
#[uniffi::export]
pub fn open_scanner_in_memory(
    config_json: Option<String>,
) -> Result<Arc<MedScanCore>, MedScanError> {
    let db = Database::open_in_memory()?;
    MedScanCore::build(db, config_json)
}

// =========================================================================
// Main API Object
// =========================================================================

/// Thread-safe scanner wrapper for FFI.
#[derive(uniffi::Object)]
pub struct MedScanCore {
    db: Mutex<Database>,
    scanner: RwLock<Scanner>,
}

impl MedScanCore {
    fn build(db: Database, config_json: Option<String>) -> Result<Arc<Self>, MedScanError> {
        let config = match config_json {
            Some(json) => ScanConfig::from_json_str(&json)?,
            None => ScanConfig::default(),
        }
        .with_api_key_fallback(std::env::var(config::API_KEY_ENV).ok());

        let catalog = db.load_catalog()?;
        let scanner = Scanner::from_config(&config, catalog)?;

        Ok(Arc::new(Self {
            db: Mutex::new(db),
            scanner: RwLock::new(scanner),
        }))
    }
}

#[uniffi::export]
impl MedScanCore {
    // =========================================================================
    // Catalog Operations
    // =========================================================================

    /// Replace the catalog with a JSON array of records.
    pub fn import_catalog_json(&self, json: String) -> Result<u32, MedScanError> {
        let records = catalog::parse_json_catalog(&json)?;
        let count = self.db.lock()?.replace_catalog(&records)?;
        self.scanner.write()?.replace_catalog(records);
        Ok(count as u32)
    }

    /// Number of records in the catalog.
    pub fn catalog_size(&self) -> Result<u32, MedScanError> {
        Ok(self.scanner.read()?.catalog().len() as u32)
    }

    // =========================================================================
    // Matching Operations
    // =========================================================================

    /// Match recognized text against the catalog.
    pub fn match_text(&self, text: String) -> Result<FfiMatchReport, MedScanError> {
        let scanner = self.scanner.read()?;
        let report = scanner.match_text(&text)?;
        Ok(report.into())
    }

    /// Match OCR detections against the catalog.
    pub fn scan_detections(
        &self,
        detections: Vec<FfiDetection>,
    ) -> Result<FfiMatchReport, MedScanError> {
        let detections: Vec<medscan_ocr::Detection> =
            detections.into_iter().map(|d| d.into()).collect();
        let scanner = self.scanner.read()?;
        let report = scanner.scan_detections(&detections)?;
        Ok(report.into())
    }

    // =========================================================================
    // Interaction Operations
    // =========================================================================

    /// Look up interactions for an active ingredient.
    pub fn lookup_interactions(
        &self,
        ingredient: String,
    ) -> Result<FfiInteractionLookup, MedScanError> {
        let scanner = self.scanner.read()?;
        Ok(scanner.lookup_interactions(&ingredient).into())
    }

    /// Look up interactions for a record's primary active ingredient.
    pub fn interactions_for_record(
        &self,
        record: FfiMedicationRecord,
    ) -> Result<FfiInteractionLookup, MedScanError> {
        let record: MedicationRecord = record.into();
        let scanner = self.scanner.read()?;
        Ok(scanner.interactions_for(&record).into())
    }
}

// =========================================================================
// FFI Types
// =========================================================================

/// FFI-safe catalog record.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiMedicationRecord {
    pub name: String,
    pub form: String,
    pub dosage: String,
    pub presentation: String,
    pub active_ingredient: String,
    pub therapeutic_class: String,
    pub sub_class: String,
    pub manufacturer: String,
    pub registration_number: String,
    pub prescription_status: String,
    pub primary_packaging: String,
    pub shelf_life: String,
    pub code: String,
    pub indications: String,
}

impl From<&MedicationRecord> for FfiMedicationRecord {
    fn from(record: &MedicationRecord) -> Self {
        Self {
            name: record.name.clone(),
            form: record.form.clone(),
            dosage: record.dosage.clone(),
            presentation: record.presentation.clone(),
            active_ingredient: record.active_ingredient.clone(),
            therapeutic_class: record.therapeutic_class.clone(),
            sub_class: record.sub_class.clone(),
            manufacturer: record.manufacturer.clone(),
            registration_number: record.registration_number.clone(),
            prescription_status: record.prescription_status.clone(),
            primary_packaging: record.primary_packaging.clone(),
            shelf_life: record.shelf_life.clone(),
            code: record.code.clone(),
            indications: record.indications.clone(),
        }
    }
}

impl From<FfiMedicationRecord> for MedicationRecord {
    fn from(record: FfiMedicationRecord) -> Self {
        MedicationRecord {
            name: record.name,
            form: record.form,
            dosage: record.dosage,
            presentation: record.presentation,
            active_ingredient: record.active_ingredient,
            therapeutic_class: record.therapeutic_class,
            sub_class: record.sub_class,
            manufacturer: record.manufacturer,
            registration_number: record.registration_number,
            prescription_status: record.prescription_status,
            primary_packaging: record.primary_packaging,
            shelf_life: record.shelf_life,
            code: record.code,
            indications: record.indications,
        }
    }
}

/// FFI-safe OCR detection.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiDetection {
    pub text: String,
    pub confidence: f64,
}

impl From<FfiDetection> for medscan_ocr::Detection {
    fn from(detection: FfiDetection) -> Self {
        medscan_ocr::Detection::new(detection.text, detection.confidence)
    }
}

/// FFI-safe scored match.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiMatch {
    pub record: FfiMedicationRecord,
    pub matched_form: Option<String>,
    pub name_score: u8,
    pub dosage_score: u8,
    pub total_score: f64,
}

impl From<&ScoredCandidate<'_>> for FfiMatch {
    fn from(candidate: &ScoredCandidate<'_>) -> Self {
        Self {
            record: candidate.record.into(),
            matched_form: candidate.matched_form.clone(),
            name_score: candidate.name_score,
            dosage_score: candidate.dosage_score,
            total_score: candidate.total_score,
        }
    }
}

/// FFI-safe match report. Matches are best first.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiMatchReport {
    pub recognized_text: String,
    pub dosages: Vec<String>,
    pub forms: Vec<String>,
    pub matches: Vec<FfiMatch>,
}

impl From<MatchReport<'_>> for FfiMatchReport {
    fn from(report: MatchReport<'_>) -> Self {
        Self {
            matches: report.candidates.iter().map(FfiMatch::from).collect(),
            recognized_text: report.recognized_text,
            dosages: report.features.dosages,
            forms: report.features.forms.into_iter().collect(),
        }
    }
}

/// FFI-safe interaction lookup result.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiInteractionLookup {
    pub ingredient: String,
    pub entries: Vec<String>,
    pub cached: bool,
    pub warning: Option<String>,
}

impl From<InteractionLookup> for FfiInteractionLookup {
    fn from(lookup: InteractionLookup) -> Self {
        Self {
            ingredient: lookup.ingredient,
            entries: lookup.entries,
            cached: lookup.cached,
            warning: lookup.warning,
        }
    }
}
