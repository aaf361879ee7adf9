use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::criterion::CriterionKey;

/// Tolerance used when comparing weight sums
pub const WEIGHT_EPSILON: f64 = 1e-9;

/// One criterion of the finalized graph
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Criterion {
    pub key: CriterionKey,
    pub display_name: String,
    pub category: String,
    /// Holder entity ids in cohort order
    pub holders: Vec<String>,
    pub count: usize,
    /// count / total_entities
    pub prevalence: f64,
    /// prevalence plus any rarity bonus
    pub weight: f64,
    /// Bonus applied to the weight (0 unless rare)
    pub rarity_bonus: f64,
    pub rare: bool,
}

impl Criterion {
    pub fn is_held_by(&self, entity_id: &str) -> bool {
        self.holders.iter().any(|h| h == entity_id)
    }
}

/// Run-level facts about a graph
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GraphMetadata {
    pub total_entities: usize,
    pub total_criteria: usize,
    pub generated_at: DateTime<Utc>,
    /// Σ weight over all criteria, fixed when the graph is built
    pub max_possible_score: f64,
    pub rarity_threshold: f64,
    pub rarity_bonus: f64,
}

/// Immutable criteria graph shared by every scoring pass of a run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CriteriaGraph {
    metadata: GraphMetadata,
    criteria: BTreeMap<CriterionKey, Criterion>,
}

impl CriteriaGraph {
    /// Freeze a set of criteria into a graph.
    ///
    /// `max_possible_score` is summed here once, in key order.
    pub(crate) fn new(
        criteria: BTreeMap<CriterionKey, Criterion>,
        total_entities: usize,
        rarity_threshold: f64,
        rarity_bonus: f64,
    ) -> Self {
        let max_possible_score = criteria.values().map(|c| c.weight).sum();
        let graph = Self {
            metadata: GraphMetadata {
                total_entities,
                total_criteria: criteria.len(),
                generated_at: Utc::now(),
                max_possible_score,
                rarity_threshold,
                rarity_bonus,
            },
            criteria,
        };
        debug_assert!(graph.validate().is_empty(), "{:?}", graph.validate());
        graph
    }

    pub fn metadata(&self) -> &GraphMetadata {
        &self.metadata
    }

    pub fn max_possible_score(&self) -> f64 {
        self.metadata.max_possible_score
    }

    pub fn total_entities(&self) -> usize {
        self.metadata.total_entities
    }

    pub fn get(&self, key: &CriterionKey) -> Option<&Criterion> {
        self.criteria.get(key)
    }

    pub fn contains(&self, key: &CriterionKey) -> bool {
        self.criteria.contains_key(key)
    }

    /// Weight of a criterion; unknown keys weigh nothing
    pub fn weight_of(&self, key: &CriterionKey) -> f64 {
        self.criteria.get(key).map_or(0.0, |c| c.weight)
    }

    /// Criteria in key order
    pub fn criteria(&self) -> impl Iterator<Item = &Criterion> {
        self.criteria.values()
    }

    pub fn keys(&self) -> impl Iterator<Item = &CriterionKey> {
        self.criteria.keys()
    }

    pub fn rare_criteria(&self) -> impl Iterator<Item = &Criterion> {
        self.criteria.values().filter(|c| c.rare)
    }

    pub fn len(&self) -> usize {
        self.criteria.len()
    }

    pub fn is_empty(&self) -> bool {
        self.criteria.is_empty()
    }

    /// Check structural invariants.
    /// Returns a list of violations (empty if valid)
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();
        let total = self.metadata.total_entities;

        if self.metadata.total_criteria != self.criteria.len() {
            errors.push(format!(
                "total_criteria is {} but graph holds {} criteria",
                self.metadata.total_criteria,
                self.criteria.len()
            ));
        }

        for (key, criterion) in &self.criteria {
            if &criterion.key != key {
                errors.push(format!("criterion {} stored under key {}", criterion.key, key));
            }
            if criterion.count != criterion.holders.len() {
                errors.push(format!(
                    "criterion {} has count {} but {} holders",
                    key,
                    criterion.count,
                    criterion.holders.len()
                ));
            }
            if criterion.count > total {
                errors.push(format!(
                    "criterion {} has count {} above total entities {}",
                    key, criterion.count, total
                ));
            }
            if !criterion.weight.is_finite() || criterion.weight < 0.0 {
                errors.push(format!("criterion {} has invalid weight {}", key, criterion.weight));
            }
            if criterion.weight + WEIGHT_EPSILON < criterion.prevalence {
                errors.push(format!(
                    "criterion {} weight {} is below its prevalence {}",
                    key, criterion.weight, criterion.prevalence
                ));
            }
        }

        let sum: f64 = self.criteria.values().map(|c| c.weight).sum();
        if (sum - self.metadata.max_possible_score).abs() > WEIGHT_EPSILON {
            errors.push(format!(
                "max_possible_score {} does not match weight sum {}",
                self.metadata.max_possible_score, sum
            ));
        }

        errors
    }
}
