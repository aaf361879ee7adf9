//! Per-entity scores against a frozen criteria graph

use serde::{Deserialize, Serialize};
use tracing::{trace, warn};

use crate::graph::CriteriaGraph;
use crate::run::RunWarning;
use crate::signals::EntitySignals;

/// Raw and normalized score of one entity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntityScore {
    pub entity_id: String,
    /// Σ weight of held criteria that are in the graph
    pub raw_score: f64,
    pub max_possible_score: f64,
    /// 100 · raw_score / max_possible_score, or 0 when the maximum is 0
    pub percentage: f64,
    /// Part of `raw_score` that came from rarity bonuses
    pub bonus: f64,
    /// Percentage over prevalence alone, with every rarity bonus left out
    #[serde(default)]
    pub base_percentage: f64,
    pub criteria_count: usize,
    pub rare_count: usize,
    /// Held keys the graph does not know about (contribute nothing)
    #[serde(default)]
    pub unknown_criteria: usize,
}

/// Scores for a cohort, plus any degenerate-state warning
#[derive(Debug, Clone, Default)]
pub struct CohortScores {
    pub scores: Vec<EntityScore>,
    pub warnings: Vec<RunWarning>,
}

pub struct ScoreCalculator<'a> {
    graph: &'a CriteriaGraph,
    max_possible_score: f64,
    max_base_score: f64,
}

impl<'a> ScoreCalculator<'a> {
    pub fn new(graph: &'a CriteriaGraph) -> Self {
        Self {
            graph,
            max_possible_score: graph.max_possible_score(),
            max_base_score: graph.criteria().map(|c| c.prevalence).sum(),
        }
    }

    pub fn score(&self, entity: &EntitySignals) -> EntityScore {
        let mut raw_score = 0.0;
        let mut base_score = 0.0;
        let mut bonus = 0.0;
        let mut criteria_count = 0;
        let mut rare_count = 0;
        let mut unknown_criteria = 0;

        for key in entity.keys() {
            match self.graph.get(key) {
                Some(criterion) => {
                    raw_score += criterion.weight;
                    base_score += criterion.prevalence;
                    bonus += criterion.rarity_bonus;
                    criteria_count += 1;
                    if criterion.rare {
                        rare_count += 1;
                    }
                }
                None => unknown_criteria += 1,
            }
        }

        let percentage = percent_of(raw_score, self.max_possible_score);
        let base_percentage = percent_of(base_score, self.max_base_score);

        trace!(
            entity = entity.entity_id(),
            raw_score,
            percentage,
            unknown_criteria,
            "entity_scored"
        );

        EntityScore {
            entity_id: entity.entity_id().to_string(),
            raw_score,
            max_possible_score: self.max_possible_score,
            percentage,
            bonus,
            base_percentage,
            criteria_count,
            rare_count,
            unknown_criteria,
        }
    }

    /// Score every entity, in the given order
    pub fn score_all(&self, entities: &[EntitySignals]) -> CohortScores {
        let mut warnings = Vec::new();
        if self.max_possible_score <= 0.0 {
            warn!(entities = entities.len(), "no criteria discovered, all percentages are 0");
            warnings.push(RunWarning::NoCriteria {
                entities: entities.len(),
            });
        }

        let scores = entities.iter().map(|e| self.score(e)).collect();
        debug_assert_eq!(self.max_possible_score, self.graph.max_possible_score());

        CohortScores { scores, warnings }
    }
}

fn percent_of(score: f64, max: f64) -> f64 {
    if max > 0.0 {
        100.0 * score / max
    } else {
        0.0
    }
}
