//! Interaction lookup models.

use serde::{Deserialize, Serialize};

/// Result of looking up interactions for one active ingredient.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct InteractionLookup {
    /// Ingredient as passed by the caller
    pub ingredient: String,
    /// Interaction statements followed by warnings, in label order
    pub entries: Vec<String>,
    /// True when served from the cache
    pub cached: bool,
    /// Non-fatal failure message; entries are empty when set
    pub warning: Option<String>,
}

impl InteractionLookup {
    pub fn found(ingredient: &str, entries: Vec<String>, cached: bool) -> Self {
        Self {
            ingredient: ingredient.to_string(),
            entries,
            cached,
            warning: None,
        }
    }

    pub fn failed(ingredient: &str, warning: String) -> Self {
        Self {
            ingredient: ingredient.to_string(),
            entries: Vec::new(),
            cached: false,
            warning: Some(warning),
        }
    }

    pub fn is_failure(&self) -> bool {
        self.warning.is_some()
    }

    /// No known interactions and no failure.
    pub fn is_clear(&self) -> bool {
        self.entries.is_empty() && self.warning.is_none()
    }
}
