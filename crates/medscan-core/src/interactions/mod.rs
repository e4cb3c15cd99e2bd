//! Drug interaction lookup with a process-lifetime cache.
//!
//! A lookup for an ingredient hits the external source at most once per
//! successful response. Failures are never cached, so the next lookup for
//! the same ingredient tries again.

mod cache;
mod openfda;

pub use cache::*;
pub use openfda::*;

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

use thiserror::Error;
use tracing::{debug, warn};

use crate::models::InteractionLookup;

/// Interaction lookup errors.
#[derive(Error, Debug)]
pub enum InteractionError {
    #[error("HTTP error: {0}")]
    Http(String),

    #[error("Interaction API returned status {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Malformed response: {0}")]
    Malformed(String),
}

pub type InteractionResult<T> = Result<T, InteractionError>;

/// External source of interaction data.
pub trait InteractionSource: Send + Sync {
    /// Fetch interaction entries for one ingredient.
    ///
    /// `Ok(None)` means the source answered but has no label for it.
    fn fetch(&self, ingredient: &str) -> InteractionResult<Option<Vec<String>>>;
}

/// Memoizing interaction lookup.
///
/// Concurrent lookups for the same key wait on a per-key lock and re-check
/// the cache, so one successful external call serves all of them.
pub struct InteractionService {
    source: Box<dyn InteractionSource>,
    cache: Arc<dyn InteractionCache>,
    key_locks: Mutex<HashMap<String, Arc<Mutex<()>>>>,
}

impl InteractionService {
    /// Create a service with a fresh in-memory cache.
    pub fn new(source: Box<dyn InteractionSource>) -> Self {
        Self::with_cache(source, Arc::new(MemoryInteractionCache::new()))
    }

    pub fn with_cache(source: Box<dyn InteractionSource>, cache: Arc<dyn InteractionCache>) -> Self {
        Self {
            source,
            cache,
            key_locks: Mutex::new(HashMap::new()),
        }
    }

    /// Look up interactions for an ingredient.
    ///
    /// The caller passes a single ingredient (see
    /// [`MedicationRecord::primary_ingredient`](crate::models::MedicationRecord::primary_ingredient)).
    /// Never fails: a failed fetch yields empty entries and a warning.
    pub fn lookup(&self, ingredient: &str) -> InteractionLookup {
        let key = cache_key(ingredient);
        if key.is_empty() {
            return InteractionLookup::found(ingredient, Vec::new(), false);
        }

        if let Some(entries) = self.cache.get(&key) {
            return InteractionLookup::found(ingredient, entries, true);
        }

        let key_lock = self.key_lock(&key);
        let _guard = key_lock.lock().unwrap_or_else(PoisonError::into_inner);

        // Another caller may have filled the entry while we waited
        if let Some(entries) = self.cache.get(&key) {
            return InteractionLookup::found(ingredient, entries, true);
        }

        match self.source.fetch(ingredient.trim()) {
            Ok(Some(entries)) => {
                debug!(ingredient = %key, entries = entries.len(), "caching interactions");
                self.cache.put(&key, entries.clone());
                InteractionLookup::found(ingredient, entries, false)
            }
            Ok(None) => {
                debug!(ingredient = %key, "no label found");
                InteractionLookup::found(ingredient, Vec::new(), false)
            }
            Err(e) => {
                warn!(ingredient = %key, error = %e, "interaction lookup failed");
                InteractionLookup::failed(
                    ingredient,
                    format!("Failed to fetch interactions for {}: {}", ingredient.trim(), e),
                )
            }
        }
    }

    fn key_lock(&self, key: &str) -> Arc<Mutex<()>> {
        let mut locks = self.key_locks.lock().unwrap_or_else(PoisonError::into_inner);
        locks
            .entry(key.to_string())
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone()
    }
}
