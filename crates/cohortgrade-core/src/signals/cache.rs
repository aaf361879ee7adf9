//! Shared cache of extracted signal sets
//!
//! Keyed by entity id. Safe to share across extraction threads; when two
//! threads extract the same entity the first stored result wins and the
//! later one is discarded.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, RwLock};

use tracing::trace;

use super::{EntitySignals, SignalExtractor};
use crate::error::{GradeError, Result};

#[derive(Debug, Default)]
pub struct SignalCache {
    entries: RwLock<HashMap<String, Arc<EntitySignals>>>,
    hits: AtomicU64,
    misses: AtomicU64,
}

impl SignalCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Look up an entity, recording a hit or miss
    pub fn get(&self, entity_id: &str) -> Option<Arc<EntitySignals>> {
        let entries = self.entries.read().unwrap_or_else(|e| e.into_inner());
        match entries.get(entity_id) {
            Some(signals) => {
                self.hits.fetch_add(1, Ordering::Relaxed);
                Some(Arc::clone(signals))
            }
            None => {
                self.misses.fetch_add(1, Ordering::Relaxed);
                None
            }
        }
    }

    /// Store signals unless the entity is already cached; returns the stored value
    pub fn insert(&self, signals: EntitySignals) -> Arc<EntitySignals> {
        let mut entries = self.entries.write().unwrap_or_else(|e| e.into_inner());
        let stored = entries
            .entry(signals.entity_id().to_string())
            .or_insert_with(|| Arc::new(signals));
        Arc::clone(stored)
    }

    /// Return cached signals, extracting and caching them on a miss
    pub fn get_or_extract(
        &self,
        entity_id: &str,
        extractor: &dyn SignalExtractor,
    ) -> Result<Arc<EntitySignals>> {
        if let Some(signals) = self.get(entity_id) {
            trace!(entity = entity_id, "signal_cache_hit");
            return Ok(signals);
        }

        let signals = extractor.extract(entity_id)?;
        if signals.entity_id() != entity_id {
            return Err(GradeError::extraction(
                entity_id,
                format!("extractor returned signals for {}", signals.entity_id()),
            ));
        }
        Ok(self.insert(signals))
    }

    pub fn contains(&self, entity_id: &str) -> bool {
        let entries = self.entries.read().unwrap_or_else(|e| e.into_inner());
        entries.contains_key(entity_id)
    }

    pub fn len(&self) -> usize {
        let entries = self.entries.read().unwrap_or_else(|e| e.into_inner());
        entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn hits(&self) -> u64 {
        self.hits.load(Ordering::Relaxed)
    }

    pub fn misses(&self) -> u64 {
        self.misses.load(Ordering::Relaxed)
    }
}
