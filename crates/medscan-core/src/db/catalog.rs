//! Catalog database operations.

use rusqlite::{params, Connection, Row};

use super::{Database, DbResult};
use crate::models::MedicationRecord;

const SELECT_COLUMNS: &str = r#"
    SELECT name, form, dosage, presentation, active_ingredient,
           therapeutic_class, sub_class, manufacturer, registration_number,
           prescription_status, primary_packaging, shelf_life, code, indications
    FROM medications
"#;

impl Database {
    /// Replace the whole catalog, keeping the given order.
    pub fn replace_catalog(&mut self, records: &[MedicationRecord]) -> DbResult<usize> {
        let tx = self.conn.transaction()?;
        tx.execute("DELETE FROM medications", [])?;
        for (position, record) in records.iter().enumerate() {
            insert_record(&tx, position as i64, record)?;
        }
        tx.commit()?;
        Ok(records.len())
    }

    /// Load the full catalog in catalog order.
    pub fn load_catalog(&self) -> DbResult<Vec<MedicationRecord>> {
        let sql = format!("{} ORDER BY position", SELECT_COLUMNS);
        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt.query_map([], record_from_row)?;

        let mut records = Vec::new();
        for row in rows {
            records.push(row?);
        }
        Ok(records)
    }
}

const INSERT_SQL: &str = r#"
    INSERT INTO medications (
        position, name, form, dosage, presentation, active_ingredient,
        therapeutic_class, sub_class, manufacturer, registration_number,
        prescription_status, primary_packaging, shelf_life, code, indications
    ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15)
"#;

fn insert_record(conn: &Connection, position: i64, record: &MedicationRecord) -> rusqlite::Result<()> {
    let mut stmt = conn.prepare_cached(INSERT_SQL)?;
    stmt.execute(params![
        position,
        record.name,
        record.form,
        record.dosage,
        record.presentation,
        record.active_ingredient,
        record.therapeutic_class,
        record.sub_class,
        record.manufacturer,
        record.registration_number,
        record.prescription_status,
        record.primary_packaging,
        record.shelf_life,
        record.code,
        record.indications,
    ])?;
    Ok(())
}

fn record_from_row(row: &Row<'_>) -> rusqlite::Result<MedicationRecord> {
    Ok(MedicationRecord {
        name: row.get(0)?,
        form: row.get(1)?,
        dosage: row.get(2)?,
        presentation: row.get(3)?,
        active_ingredient: row.get(4)?,
        therapeutic_class: row.get(5)?,
        sub_class: row.get(6)?,
        manufacturer: row.get(7)?,
        registration_number: row.get(8)?,
        prescription_status: row.get(9)?,
        primary_packaging: row.get(10)?,
        shelf_life: row.get(11)?,
        code: row.get(12)?,
        indications: row.get(13)?,
    })
}
