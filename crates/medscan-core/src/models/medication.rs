//! Medication catalog models.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// A single product in the medication catalog.
///
/// Every field is a string. Missing values are empty strings, so nothing
/// null-like ever reaches the scorer.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct MedicationRecord {
    /// Brand or product name
    #[serde(rename = "Name", alias = "Nom", default, deserialize_with = "lenient_string")]
    pub name: String,
    /// Pharmaceutical form (e.g., "comprime", "sirop")
    #[serde(rename = "Form", alias = "Forme", default, deserialize_with = "lenient_string")]
    pub form: String,
    /// Strength as free text (e.g., "500mg")
    #[serde(rename = "Dosage", default, deserialize_with = "lenient_string")]
    pub dosage: String,
    #[serde(rename = "Presentation", default, deserialize_with = "lenient_string")]
    pub presentation: String,
    /// One or more comma-separated active ingredients
    #[serde(rename = "ActiveIngredient", alias = "DCI", default, deserialize_with = "lenient_string")]
    pub active_ingredient: String,
    #[serde(rename = "Class", alias = "Classe", default, deserialize_with = "lenient_string")]
    pub therapeutic_class: String,
    #[serde(rename = "SubClass", alias = "Sous Classe", default, deserialize_with = "lenient_string")]
    pub sub_class: String,
    #[serde(rename = "Manufacturer", alias = "Laboratoire", default, deserialize_with = "lenient_string")]
    pub manufacturer: String,
    /// Marketing authorization number
    #[serde(rename = "RegistrationNumber", alias = "AMM", default, deserialize_with = "lenient_string")]
    pub registration_number: String,
    /// Prescription status code
    #[serde(rename = "PrescriptionStatus", alias = "G/P/B", default, deserialize_with = "lenient_string")]
    pub prescription_status: String,
    #[serde(rename = "PrimaryPackaging", alias = "Conditionnement primaire", default, deserialize_with = "lenient_string")]
    pub primary_packaging: String,
    #[serde(rename = "ShelfLife", alias = "Duree de conservation", default, deserialize_with = "lenient_string")]
    pub shelf_life: String,
    /// Internal product code
    #[serde(rename = "Code", alias = "VEIC", default, deserialize_with = "lenient_string")]
    pub code: String,
    #[serde(rename = "Indications", default, deserialize_with = "lenient_string")]
    pub indications: String,
}

impl MedicationRecord {
    /// Create a record with the fields the matcher scores on.
    pub fn new(name: impl Into<String>, dosage: impl Into<String>, form: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            dosage: dosage.into(),
            form: form.into(),
            ..Self::default()
        }
    }

    /// Every field with a display label, in catalog column order.
    pub fn labeled_fields(&self) -> [(&'static str, &str); 14] {
        [
            ("Name", self.name.as_str()),
            ("Form", self.form.as_str()),
            ("Dosage", self.dosage.as_str()),
            ("Presentation", self.presentation.as_str()),
            ("Active ingredient", self.active_ingredient.as_str()),
            ("Class", self.therapeutic_class.as_str()),
            ("Sub-class", self.sub_class.as_str()),
            ("Manufacturer", self.manufacturer.as_str()),
            ("Registration number", self.registration_number.as_str()),
            ("Prescription status", self.prescription_status.as_str()),
            ("Primary packaging", self.primary_packaging.as_str()),
            ("Shelf life", self.shelf_life.as_str()),
            ("Code", self.code.as_str()),
            ("Indications", self.indications.as_str()),
        ]
    }

    /// First comma-separated active ingredient, trimmed.
    ///
    /// This is the key used for interaction lookups.
    pub fn primary_ingredient(&self) -> Option<&str> {
        let first = self.active_ingredient.split(',').next()?.trim();
        if first.is_empty() {
            None
        } else {
            Some(first)
        }
    }
}

/// Accept strings, numbers, booleans and null for a text field.
///
/// Spreadsheet exports routinely store registration numbers or dosages as
/// numbers; null becomes the empty string.
fn lenient_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(match value {
        Value::Null => String::new(),
        Value::String(s) => s,
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        other => other.to_string(),
    })
}
