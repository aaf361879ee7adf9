//! Build a [`CriteriaGraph`] from the cohort's signal sets

use std::collections::{BTreeMap, HashSet};

use tracing::debug;

use super::types::{CriteriaGraph, Criterion};
use crate::bail_input;
use crate::category::CategoryClassifier;
use crate::config::RarityConfig;
use crate::criterion::CriterionKey;
use crate::error::Result;
use crate::signals::EntitySignals;

/// Turns per-entity criterion sets into weighted criteria
pub struct GraphAggregator<'a> {
    rarity: RarityConfig,
    classifier: &'a dyn CategoryClassifier,
}

impl<'a> GraphAggregator<'a> {
    pub fn new(rarity: RarityConfig, classifier: &'a dyn CategoryClassifier) -> Self {
        Self { rarity, classifier }
    }

    /// Aggregate the cohort, given in cohort order.
    ///
    /// A criterion is rare when its prevalence is at or below the rarity
    /// threshold; rare criteria carry the rarity bonus on top of their
    /// prevalence.
    #[tracing::instrument(skip_all, fields(entities = entities.len()))]
    pub fn aggregate(&self, entities: &[EntitySignals]) -> Result<CriteriaGraph> {
        let total_entities = entities.len();
        if total_entities == 0 {
            bail_input!("aggregate", "total entities is zero, prevalence is undefined");
        }

        let mut seen = HashSet::new();
        for entity in entities {
            if !seen.insert(entity.entity_id()) {
                bail_input!(
                    "aggregate",
                    format!("duplicate entity id: {}", entity.entity_id())
                );
            }
        }

        let mut holders: BTreeMap<&CriterionKey, (&str, Vec<String>)> = BTreeMap::new();
        for entity in entities {
            for (key, name) in entity.criteria() {
                holders
                    .entry(key)
                    .or_insert_with(|| (name, Vec::new()))
                    .1
                    .push(entity.entity_id().to_string());
            }
        }

        let total = total_entities as f64;
        let criteria: BTreeMap<CriterionKey, Criterion> = holders
            .into_iter()
            .map(|(key, (name, holders))| {
                let count = holders.len();
                let prevalence = count as f64 / total;
                let rare = prevalence <= self.rarity.threshold;
                let rarity_bonus = if rare { self.rarity.bonus } else { 0.0 };

                let criterion = Criterion {
                    key: key.clone(),
                    display_name: name.to_string(),
                    category: self.classifier.classify(key),
                    holders,
                    count,
                    prevalence,
                    weight: prevalence + rarity_bonus,
                    rarity_bonus,
                    rare,
                };
                (key.clone(), criterion)
            })
            .collect();

        let graph = CriteriaGraph::new(
            criteria,
            total_entities,
            self.rarity.threshold,
            self.rarity.bonus,
        );
        debug!(
            criteria = graph.len(),
            rare = graph.rare_criteria().count(),
            max_possible_score = graph.max_possible_score(),
            "graph_aggregated"
        );
        Ok(graph)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::category::KeywordClassifier;
    use crate::error::GradeError;

    fn key(text: &str) -> CriterionKey {
        CriterionKey::normalize(text).unwrap()
    }

    fn rarity(threshold: f64) -> RarityConfig {
        RarityConfig {
            threshold,
            bonus: 1.0,
        }
    }

    fn scenario() -> Vec<EntitySignals> {
        vec![
            EntitySignals::new("e1", ["A", "B"]),
            EntitySignals::new("e2", ["A"]),
            EntitySignals::new("e3", Vec::<String>::new()),
        ]
    }

    #[test]
    fn test_weights_and_rarity() {
        let classifier = KeywordClassifier::default();
        let graph = GraphAggregator::new(rarity(0.34), &classifier)
            .aggregate(&scenario())
            .unwrap();

        let a = graph.get(&key("a")).unwrap();
        assert_eq!(a.holders, vec!["e1", "e2"]);
        assert!(!a.rare);
        assert!((a.weight - 2.0 / 3.0).abs() < 1e-9);

        let b = graph.get(&key("b")).unwrap();
        assert!(b.rare);
        assert_eq!(b.rarity_bonus, 1.0);
        assert!((b.weight - (1.0 / 3.0 + 1.0)).abs() < 1e-9);

        assert!((graph.max_possible_score() - 2.0).abs() < 1e-9);
        assert_eq!(graph.total_entities(), 3);
        assert!(graph.validate().is_empty());
    }

    #[test]
    fn test_weight_never_below_prevalence() {
        let classifier = KeywordClassifier::default();
        let graph = GraphAggregator::new(RarityConfig::default(), &classifier)
            .aggregate(&scenario())
            .unwrap();

        for criterion in graph.criteria() {
            assert_eq!(criterion.count, criterion.holders.len());
            assert!(criterion.weight >= criterion.prevalence);
            assert!(criterion.count <= graph.total_entities());
        }
        let sum: f64 = graph.criteria().map(|c| c.weight).sum();
        assert!((sum - graph.max_possible_score()).abs() < 1e-9);
    }

    #[test]
    fn test_adding_holders_only_removes_rarity() {
        let classifier = KeywordClassifier::default();
        let aggregator = GraphAggregator::new(rarity(0.25), &classifier);

        let mut cohort: Vec<EntitySignals> = (0..4)
            .map(|i| EntitySignals::new(format!("e{}", i), ["common"]))
            .collect();
        cohort.push(EntitySignals::new("rare-holder", ["common", "kubernetes"]));

        let graph = aggregator.aggregate(&cohort).unwrap();
        let mut previous = graph.get(&key("kubernetes")).unwrap().clone();
        assert!(previous.rare);

        for i in 0..4 {
            cohort.push(EntitySignals::new(format!("late{}", i), ["kubernetes"]));
            let graph = aggregator.aggregate(&cohort).unwrap();
            let current = graph.get(&key("kubernetes")).unwrap().clone();

            assert!(current.prevalence > previous.prevalence);
            assert!(previous.rare || !current.rare, "rarity regained at step {}", i);
            if previous.rare && !current.rare {
                assert!(current.weight < previous.weight);
            }
            previous = current;
        }
        assert!(!previous.rare);
    }

    #[test]
    fn test_category_assignment() {
        let classifier = KeywordClassifier::default();
        let graph = GraphAggregator::new(RarityConfig::default(), &classifier)
            .aggregate(&[EntitySignals::new("e1", ["Unit Tests", "frobnicator"])])
            .unwrap();

        assert_eq!(graph.get(&key("unit tests")).unwrap().category, "Testing");
        assert_eq!(graph.get(&key("frobnicator")).unwrap().category, "Uncategorized");
    }

    #[test]
    fn test_empty_cohort_is_invalid_input() {
        let classifier = KeywordClassifier::default();
        let err = GraphAggregator::new(RarityConfig::default(), &classifier)
            .aggregate(&[])
            .unwrap_err();
        assert!(matches!(err, GradeError::InvalidInput { ref stage, .. } if stage == "aggregate"));
    }

    #[test]
    fn test_duplicate_entities_rejected() {
        let classifier = KeywordClassifier::default();
        let result = GraphAggregator::new(RarityConfig::default(), &classifier).aggregate(&[
            EntitySignals::new("e1", ["x"]),
            EntitySignals::new("e1", ["y"]),
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn test_no_criteria_graph_is_valid() {
        let classifier = KeywordClassifier::default();
        let graph = GraphAggregator::new(RarityConfig::default(), &classifier)
            .aggregate(&[EntitySignals::new("e1", Vec::<String>::new())])
            .unwrap();
        assert!(graph.is_empty());
        assert_eq!(graph.max_possible_score(), 0.0);
    }
}
