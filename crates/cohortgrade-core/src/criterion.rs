//! Criterion identity and per-dimension payloads
//!
//! A criterion is identified by a normalized key: case-, whitespace- and
//! punctuation-insensitive. `"Unit Tests"`, `"unit-tests"` and
//! `" UNIT__tests! "` all normalize to `unit_tests`.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Normalized criterion key
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CriterionKey(String);

impl CriterionKey {
    /// Normalize free text into a key.
    ///
    /// Returns `None` when nothing alphanumeric remains.
    pub fn normalize(text: &str) -> Option<Self> {
        let key = text
            .to_lowercase()
            .split(|c: char| !c.is_alphanumeric())
            .filter(|piece| !piece.is_empty())
            .collect::<Vec<_>>()
            .join("_");

        if key.is_empty() {
            None
        } else {
            Some(CriterionKey(key))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The key with separators turned back into spaces, for keyword matching
    pub fn spaced(&self) -> String {
        self.0.replace('_', " ")
    }
}

impl fmt::Display for CriterionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for CriterionKey {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Display form of raw criterion text: trimmed with inner whitespace collapsed
pub fn display_name(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Structured sub-features attached to a discovered dimension.
///
/// Only `present` and `weight` carry meaning; every other field is kept
/// verbatim for reporting.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct DimensionPayload {
    /// Whether the entity exhibits this dimension
    #[serde(default)]
    pub present: bool,

    /// Extractor-suggested weight (reporting only)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weight: Option<f64>,

    /// Opaque passthrough fields
    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_json::Value>,
}

impl DimensionPayload {
    pub fn present() -> Self {
        Self {
            present: true,
            ..Default::default()
        }
    }

    /// Merge newer properties over these (last writer wins per field)
    pub fn refresh(&mut self, newer: &DimensionPayload) {
        self.present = newer.present;
        if newer.weight.is_some() {
            self.weight = newer.weight;
        }
        for (key, value) in &newer.extra {
            self.extra.insert(key.clone(), value.clone());
        }
    }
}
