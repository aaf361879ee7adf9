//! Per-entity signal sets and the extractor seam
//!
//! An extractor turns an entity id into the criteria that entity exhibits.
//! How criteria are detected is the extractor's business; the engine only
//! consumes materialized [`EntitySignals`].

pub mod cache;
pub mod manifest;

use std::collections::BTreeMap;

use serde::Deserialize;
use tracing::debug;

use crate::criterion::{display_name, CriterionKey, DimensionPayload};
use crate::error::Result;

pub use cache::SignalCache;
pub use manifest::{open_signal_source, DirectoryExtractor, ManifestExtractor};

/// Produces the signal set for one entity.
///
/// Extraction must be idempotent and free of side effects per entity, so
/// implementations may be called from several threads.
pub trait SignalExtractor: Send + Sync {
    fn extract(&self, entity_id: &str) -> Result<EntitySignals>;

    /// Entities this source knows about, in cohort order
    fn entity_ids(&self) -> Vec<String>;
}

/// The criteria (and optional dimension payloads) one entity holds
#[derive(Debug, Clone, PartialEq, Default)]
pub struct EntitySignals {
    entity_id: String,
    /// Criterion key -> display name (first text seen for the key)
    criteria: BTreeMap<CriterionKey, String>,
    dimensions: BTreeMap<CriterionKey, DimensionPayload>,
}

impl EntitySignals {
    /// Build a signal set from raw criterion texts.
    ///
    /// Texts that normalize to nothing are dropped.
    pub fn new<I, S>(entity_id: impl Into<String>, criteria: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut signals = Self {
            entity_id: entity_id.into(),
            ..Default::default()
        };
        for text in criteria {
            signals.add_criterion(text.as_ref());
        }
        signals
    }

    /// Add one criterion by raw text; returns false when the text is not a key
    pub fn add_criterion(&mut self, text: &str) -> bool {
        match CriterionKey::normalize(text) {
            Some(key) => {
                self.criteria.entry(key).or_insert_with(|| display_name(text));
                true
            }
            None => {
                debug!(entity = %self.entity_id, text, "skip_empty_criterion");
                false
            }
        }
    }

    /// Attach a dimension payload. A present dimension implies the entity
    /// holds the criterion of the same key.
    pub fn with_dimension(mut self, name: &str, payload: DimensionPayload) -> Self {
        self.add_dimension(name, payload);
        self
    }

    pub fn add_dimension(&mut self, name: &str, payload: DimensionPayload) {
        let Some(key) = CriterionKey::normalize(name) else {
            debug!(entity = %self.entity_id, name, "skip_empty_dimension");
            return;
        };
        if payload.present {
            self.criteria
                .entry(key.clone())
                .or_insert_with(|| display_name(name));
        }
        self.dimensions.insert(key, payload);
    }

    pub fn entity_id(&self) -> &str {
        &self.entity_id
    }

    /// Criterion keys in sorted order
    pub fn keys(&self) -> impl Iterator<Item = &CriterionKey> {
        self.criteria.keys()
    }

    /// Criterion keys with their display names
    pub fn criteria(&self) -> impl Iterator<Item = (&CriterionKey, &str)> {
        self.criteria.iter().map(|(k, v)| (k, v.as_str()))
    }

    pub fn contains(&self, key: &CriterionKey) -> bool {
        self.criteria.contains_key(key)
    }

    pub fn display_name(&self, key: &CriterionKey) -> Option<&str> {
        self.criteria.get(key).map(String::as_str)
    }

    pub fn dimension(&self, key: &CriterionKey) -> Option<&DimensionPayload> {
        self.dimensions.get(key)
    }

    pub fn dimensions(&self) -> &BTreeMap<CriterionKey, DimensionPayload> {
        &self.dimensions
    }

    pub fn len(&self) -> usize {
        self.criteria.len()
    }

    pub fn is_empty(&self) -> bool {
        self.criteria.is_empty()
    }
}

/// On-disk shape of one entity's signals
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawSignals {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub criteria: Vec<String>,
    #[serde(default)]
    pub dimensions: BTreeMap<String, DimensionPayload>,
}

impl RawSignals {
    pub fn into_signals(self, entity_id: &str) -> EntitySignals {
        let mut signals = EntitySignals::new(entity_id, &self.criteria);
        for (name, payload) in self.dimensions {
            signals.add_dimension(&name, payload);
        }
        signals
    }
}

/// In-memory extractor over already materialized signal sets
#[derive(Debug, Clone, Default)]
pub struct StaticExtractor {
    order: Vec<String>,
    entities: BTreeMap<String, EntitySignals>,
}

impl StaticExtractor {
    pub fn new(signals: impl IntoIterator<Item = EntitySignals>) -> Self {
        let mut extractor = Self::default();
        for s in signals {
            if !extractor.entities.contains_key(s.entity_id()) {
                extractor.order.push(s.entity_id().to_string());
            }
            extractor.entities.insert(s.entity_id().to_string(), s);
        }
        extractor
    }
}

impl SignalExtractor for StaticExtractor {
    fn extract(&self, entity_id: &str) -> Result<EntitySignals> {
        self.entities
            .get(entity_id)
            .cloned()
            .ok_or_else(|| crate::error::GradeError::extraction(entity_id, "no signals recorded"))
    }

    fn entity_ids(&self) -> Vec<String> {
        self.order.clone()
    }
}
