//! Catalog loading.
//!
//! The catalog comes either from a JSON array of records or from the SQLite
//! catalog store. Both keep record order, which decides ranking ties.

use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::info;

use crate::db::{Database, DbError};
use crate::models::MedicationRecord;

/// Catalog loading errors.
#[derive(Error, Debug)]
pub enum CatalogError {
    #[error("Catalog not found: {0}")]
    NotFound(PathBuf),

    #[error("I/O error reading catalog: {0}")]
    Io(#[from] std::io::Error),

    #[error("Catalog is not a valid JSON record array: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Catalog database error: {0}")]
    Database(#[from] DbError),
}

pub type CatalogResult<T> = Result<T, CatalogError>;

/// Where to read the catalog from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CatalogSource {
    /// JSON array of records
    Json(PathBuf),
    /// SQLite catalog store
    Database(PathBuf),
}

impl CatalogSource {
    /// Pick the source kind from the file extension: `.json` is a record
    /// array, anything else is a catalog database.
    pub fn from_path<P: AsRef<Path>>(path: P) -> Self {
        let path = path.as_ref();
        let is_json = path
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| e.eq_ignore_ascii_case("json"));
        if is_json {
            Self::Json(path.to_path_buf())
        } else {
            Self::Database(path.to_path_buf())
        }
    }

    pub fn path(&self) -> &Path {
        match self {
            Self::Json(path) | Self::Database(path) => path,
        }
    }

    /// Load every record in catalog order.
    pub fn load(&self) -> CatalogResult<Vec<MedicationRecord>> {
        if !self.path().exists() {
            return Err(CatalogError::NotFound(self.path().to_path_buf()));
        }

        let records = match self {
            Self::Json(path) => load_json_catalog(path)?,
            Self::Database(path) => Database::open(path)?.load_catalog()?,
        };

        info!(
            path = %self.path().display(),
            records = records.len(),
            "catalog loaded"
        );
        Ok(records)
    }
}

/// Parse a JSON array of catalog records.
pub fn parse_json_catalog(json: &str) -> CatalogResult<Vec<MedicationRecord>> {
    Ok(serde_json::from_str(json)?)
}

/// Read a JSON array of catalog records from a file.
pub fn load_json_catalog<P: AsRef<Path>>(path: P) -> CatalogResult<Vec<MedicationRecord>> {
    let json = std::fs::read_to_string(path)?;
    parse_json_catalog(&json)
}

#[cfg(test)]
mod tests {
    use super::*;

    const CATALOG_JSON: &str = r#"[
        {"Name": "Doliprane", "Dosage": "1000mg", "Form": "comprime", "ActiveIngredient": "Paracetamol"},
        {"Nom": "Clamoxyl", "Dosage": 500, "Forme": "gelule", "DCI": "Amoxicilline"}
    ]"#;

    #[test]
    fn test_parse_json_catalog() {
        let records = parse_json_catalog(CATALOG_JSON).unwrap();

        assert_eq!(records.len(), 2);
        assert_eq!(records[0].name, "Doliprane");
        assert_eq!(records[1].dosage, "500");
        assert_eq!(records[1].primary_ingredient(), Some("Amoxicilline"));
    }

    #[test]
    fn test_parse_rejects_non_array() {
        let result = parse_json_catalog(r#"{"Name": "Doliprane"}"#);
        assert!(matches!(result, Err(CatalogError::Json(_))));
    }

    #[test]
    fn test_source_from_extension() {
        assert_eq!(
            CatalogSource::from_path("meds.JSON"),
            CatalogSource::Json(PathBuf::from("meds.JSON"))
        );
        assert_eq!(
            CatalogSource::from_path("meds.db"),
            CatalogSource::Database(PathBuf::from("meds.db"))
        );
    }

    #[test]
    fn test_missing_file_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let source = CatalogSource::from_path(dir.path().join("absent.json"));

        assert!(matches!(source.load(), Err(CatalogError::NotFound(_))));

        // A missing database must not be created as a side effect
        let db_source = CatalogSource::from_path(dir.path().join("absent.db"));
        assert!(matches!(db_source.load(), Err(CatalogError::NotFound(_))));
        assert!(!dir.path().join("absent.db").exists());
    }

    #[test]
    fn test_load_json_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("catalog.json");
        std::fs::write(&path, CATALOG_JSON).unwrap();

        let records = CatalogSource::from_path(&path).load().unwrap();
        assert_eq!(records.len(), 2);
    }

    #[test]
    fn test_load_corrupt_json_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("catalog.json");
        std::fs::write(&path, "[{\"Name\": ").unwrap();

        assert!(matches!(
            CatalogSource::from_path(&path).load(),
            Err(CatalogError::Json(_))
        ));
    }

    #[test]
    fn test_load_database_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("catalog.db");
        {
            let mut db = Database::open(&path).unwrap();
            db.replace_catalog(&parse_json_catalog(CATALOG_JSON).unwrap())
                .unwrap();
        }

        let records = CatalogSource::from_path(&path).load().unwrap();
        assert_eq!(records[0].name, "Doliprane");
        assert_eq!(records[1].name, "Clamoxyl");
    }
}
