//! Interaction cache.
//!
//! Entries live for the whole process: no expiry, no eviction, no capacity
//! bound. Ingredient cardinality is bounded by the catalog.

use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};

/// Key/value store for interaction lists, keyed by normalized ingredient.
pub trait InteractionCache: Send + Sync {
    fn get(&self, key: &str) -> Option<Vec<String>>;
    fn put(&self, key: &str, entries: Vec<String>);
}

/// Normalize an ingredient into a cache key: trimmed and lowercased.
pub fn cache_key(ingredient: &str) -> String {
    ingredient.trim().to_lowercase()
}

/// Mutex-guarded in-memory cache.
#[derive(Debug, Default)]
pub struct MemoryInteractionCache {
    entries: Mutex<HashMap<String, Vec<String>>>,
}

impl MemoryInteractionCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl InteractionCache for MemoryInteractionCache {
    fn get(&self, key: &str) -> Option<Vec<String>> {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(key)
            .cloned()
    }

    fn put(&self, key: &str, entries: Vec<String>) {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(key.to_string(), entries);
    }
}
