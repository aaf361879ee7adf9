//! Criteria vocabulary discovery
//!
//! The vocabulary is the union of every criterion key seen across the
//! cohort. Discovery can run in overlapping windows over the entity
//! sequence; the window size changes only the order of the evolution log,
//! never which keys end up in the vocabulary.

use std::collections::{BTreeMap, HashSet};

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::criterion::{CriterionKey, DimensionPayload};
use crate::error::Result;
use crate::run::EntityFailure;
use crate::signals::{EntitySignals, SignalCache, SignalExtractor};
use crate::{bail_input, trace_time};

/// One known criterion and the sub-properties last reported for it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VocabularyEntry {
    pub display_name: String,
    pub discovered_by: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub properties: Option<DimensionPayload>,
}

/// First observation of a criterion
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiscoveryEvent {
    /// Position in the evolution log, starting at 1
    pub sequence: usize,
    /// Window the observation happened in, starting at 1
    pub window: usize,
    pub entity_id: String,
    pub key: CriterionKey,
    pub display_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub properties: Option<DimensionPayload>,
}

/// Finished vocabulary with its evolution log
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Vocabulary {
    #[serde(default)]
    pub criteria: BTreeMap<CriterionKey, VocabularyEntry>,
    #[serde(default)]
    pub evolution: Vec<DiscoveryEvent>,
}

impl Vocabulary {
    pub fn len(&self) -> usize {
        self.criteria.len()
    }

    pub fn is_empty(&self) -> bool {
        self.criteria.is_empty()
    }

    pub fn contains(&self, key: &CriterionKey) -> bool {
        self.criteria.contains_key(key)
    }

    /// Keys in sorted order
    pub fn keys(&self) -> impl Iterator<Item = &CriterionKey> {
        self.criteria.keys()
    }
}

/// Number of windows for `entities` entities with windows of `window_size`
pub fn window_count(entities: usize, window_size: usize) -> usize {
    if entities < window_size {
        1
    } else {
        entities - window_size + 1
    }
}

/// Accretes the vocabulary one entity at a time
#[derive(Debug, Default)]
pub struct VocabularyBuilder {
    vocabulary: Vocabulary,
    window: usize,
}

impl VocabularyBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Merge one entity's criteria into the vocabulary.
    ///
    /// New keys are logged as discovery events attributed to `entity_id`.
    /// Known keys only refresh their properties. Returns the keys this call
    /// introduced.
    pub fn observe(&mut self, entity_id: &str, signals: &EntitySignals) -> Vec<CriterionKey> {
        let mut introduced = Vec::new();

        for (key, name) in signals.criteria() {
            let properties = signals.dimension(key);

            if let Some(entry) = self.vocabulary.criteria.get_mut(key) {
                if let Some(newer) = properties {
                    match entry.properties.as_mut() {
                        Some(current) => current.refresh(newer),
                        None => entry.properties = Some(newer.clone()),
                    }
                }
                continue;
            }

            self.vocabulary.evolution.push(DiscoveryEvent {
                sequence: self.vocabulary.evolution.len() + 1,
                window: self.window.max(1),
                entity_id: entity_id.to_string(),
                key: key.clone(),
                display_name: name.to_string(),
                properties: properties.cloned(),
            });
            self.vocabulary.criteria.insert(
                key.clone(),
                VocabularyEntry {
                    display_name: name.to_string(),
                    discovered_by: entity_id.to_string(),
                    properties: properties.cloned(),
                },
            );
            introduced.push(key.clone());
        }

        if !introduced.is_empty() {
            debug!(entity = entity_id, new = introduced.len(), "criteria_discovered");
        }
        introduced
    }

    /// Observe `entities` in overlapping windows of `window_size`.
    ///
    /// Signals are fetched through `cache`, so an entity that appears in
    /// several windows is extracted once. An entity whose extraction fails
    /// is skipped in every window and reported once in the returned list.
    pub fn run_windows(
        &mut self,
        entities: &[String],
        window_size: usize,
        extractor: &dyn SignalExtractor,
        cache: &SignalCache,
    ) -> Result<Vec<EntityFailure>> {
        if entities.is_empty() {
            bail_input!("discovery", "entity list is empty");
        }
        if window_size < 1 {
            bail_input!("discovery", format!("window size must be at least 1, got {}", window_size));
        }

        let start = std::time::Instant::now();
        let windows = window_count(entities.len(), window_size);
        let width = window_size.min(entities.len());
        debug!(entities = entities.len(), window_size, windows, "discovery_start");

        let mut failures = Vec::new();
        let mut failed: HashSet<&str> = HashSet::new();

        for index in 0..windows {
            self.window = index + 1;
            for entity_id in &entities[index..index + width] {
                if failed.contains(entity_id.as_str()) {
                    continue;
                }
                match cache.get_or_extract(entity_id, extractor) {
                    Ok(signals) => {
                        self.observe(entity_id, &signals);
                    }
                    Err(e) => {
                        warn!(entity = %entity_id, error = %e, "skip_entity");
                        failed.insert(entity_id.as_str());
                        failures.push(EntityFailure::new(entity_id, "extraction", &e));
                    }
                }
            }
        }

        trace_time!(start, "discovery", criteria = self.vocabulary.len());
        debug!(
            criteria = self.vocabulary.len(),
            cache_hits = cache.hits(),
            cache_misses = cache.misses(),
            "discovery_complete"
        );
        Ok(failures)
    }

    pub fn vocabulary(&self) -> &Vocabulary {
        &self.vocabulary
    }

    pub fn evolution(&self) -> &[DiscoveryEvent] {
        &self.vocabulary.evolution
    }

    pub fn finish(self) -> Vocabulary {
        self.vocabulary
    }
}
