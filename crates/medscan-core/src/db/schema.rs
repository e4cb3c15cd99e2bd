//! SQLite schema definition.

/// Stored in `PRAGMA user_version`; bump when the table layout changes.
pub const SCHEMA_VERSION: i32 = 1;

/// Complete database schema for the medication catalog.
pub const SCHEMA: &str = r#"
-- ============================================================================
-- Medication Catalog
-- ============================================================================

-- position preserves catalog order, which decides ties when ranking
CREATE TABLE IF NOT EXISTS medications (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    position INTEGER NOT NULL UNIQUE,
    name TEXT NOT NULL DEFAULT '',
    form TEXT NOT NULL DEFAULT '',
    dosage TEXT NOT NULL DEFAULT '',
    presentation TEXT NOT NULL DEFAULT '',
    active_ingredient TEXT NOT NULL DEFAULT '',
    therapeutic_class TEXT NOT NULL DEFAULT '',
    sub_class TEXT NOT NULL DEFAULT '',
    manufacturer TEXT NOT NULL DEFAULT '',
    registration_number TEXT NOT NULL DEFAULT '',
    prescription_status TEXT NOT NULL DEFAULT '',
    primary_packaging TEXT NOT NULL DEFAULT '',
    shelf_life TEXT NOT NULL DEFAULT '',
    code TEXT NOT NULL DEFAULT '',
    indications TEXT NOT NULL DEFAULT '',
    created_at TEXT NOT NULL DEFAULT (datetime('now'))
);

CREATE INDEX IF NOT EXISTS idx_medications_name ON medications(name COLLATE NOCASE);
"#;
