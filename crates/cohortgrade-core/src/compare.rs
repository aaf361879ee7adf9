//! Diff two grading reports

use std::collections::{BTreeSet, HashMap};

use serde::Serialize;

use crate::criterion::CriterionKey;
use crate::grading::GradeRecord;
use crate::graph::WEIGHT_EPSILON;
use crate::run::GradingReport;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EntityDelta {
    pub entity_id: String,
    pub grade_before: f64,
    pub grade_after: f64,
    pub grade_delta: f64,
    pub rank_before: usize,
    pub rank_after: usize,
    /// Positive when the entity moved up
    pub rank_delta: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WeightChange {
    pub key: CriterionKey,
    pub weight_before: f64,
    pub weight_after: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReportComparison {
    pub same_input: bool,
    /// Largest absolute grade change first, then entity id
    pub entities: Vec<EntityDelta>,
    pub entities_added: Vec<String>,
    pub entities_removed: Vec<String>,
    pub criteria_added: Vec<CriterionKey>,
    pub criteria_removed: Vec<CriterionKey>,
    pub weight_changes: Vec<WeightChange>,
}

impl ReportComparison {
    pub fn is_unchanged(&self) -> bool {
        self.entities_added.is_empty()
            && self.entities_removed.is_empty()
            && self.criteria_added.is_empty()
            && self.criteria_removed.is_empty()
            && self.weight_changes.is_empty()
            && self
                .entities
                .iter()
                .all(|d| d.grade_delta.abs() <= WEIGHT_EPSILON && d.rank_delta == 0)
    }
}

pub fn compare_reports(before: &GradingReport, after: &GradingReport) -> ReportComparison {
    let before_grades: HashMap<&str, &GradeRecord> =
        before.grades.iter().map(|g| (g.entity_id(), g)).collect();
    let after_grades: HashMap<&str, &GradeRecord> =
        after.grades.iter().map(|g| (g.entity_id(), g)).collect();

    let mut entities: Vec<EntityDelta> = after
        .grades
        .iter()
        .filter_map(|new| {
            let old = before_grades.get(new.entity_id())?;
            Some(EntityDelta {
                entity_id: new.entity_id().to_string(),
                grade_before: old.grade,
                grade_after: new.grade,
                grade_delta: new.grade - old.grade,
                rank_before: old.rank,
                rank_after: new.rank,
                rank_delta: old.rank as i64 - new.rank as i64,
            })
        })
        .collect();
    entities.sort_by(|a, b| {
        b.grade_delta
            .abs()
            .total_cmp(&a.grade_delta.abs())
            .then_with(|| a.entity_id.cmp(&b.entity_id))
    });

    let before_keys: BTreeSet<&CriterionKey> = before.graph.keys().collect();
    let after_keys: BTreeSet<&CriterionKey> = after.graph.keys().collect();

    let weight_changes = before_keys
        .intersection(&after_keys)
        .filter_map(|key| {
            let weight_before = before.graph.weight_of(key);
            let weight_after = after.graph.weight_of(key);
            ((weight_after - weight_before).abs() > WEIGHT_EPSILON).then(|| WeightChange {
                key: (*key).clone(),
                weight_before,
                weight_after,
            })
        })
        .collect();

    ReportComparison {
        same_input: before.metadata.input_fingerprint == after.metadata.input_fingerprint,
        entities,
        entities_added: missing_ids(after, &before_grades),
        entities_removed: missing_ids(before, &after_grades),
        criteria_added: after_keys.difference(&before_keys).map(|k| (*k).clone()).collect(),
        criteria_removed: before_keys.difference(&after_keys).map(|k| (*k).clone()).collect(),
        weight_changes,
    }
}

/// Entities graded in `from` but absent from `other`, sorted
fn missing_ids(from: &GradingReport, other: &HashMap<&str, &GradeRecord>) -> Vec<String> {
    let mut ids: Vec<String> = from
        .grades
        .iter()
        .map(|g| g.entity_id())
        .filter(|id| !other.contains_key(id))
        .map(str::to_string)
        .collect();
    ids.sort();
    ids
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GradingConfig;
    use crate::run::GradingRun;
    use crate::signals::{EntitySignals, SignalExtractor, StaticExtractor};

    fn run(signals: Vec<EntitySignals>) -> GradingReport {
        let extractor = StaticExtractor::new(signals);
        GradingRun::new(GradingConfig::default())
            .execute(&extractor.entity_ids(), &extractor)
            .unwrap()
    }

    #[test]
    fn test_identical_runs_are_unchanged() {
        let cohort = || {
            vec![
                EntitySignals::new("a", ["readme", "tests"]),
                EntitySignals::new("b", ["readme"]),
            ]
        };
        let comparison = compare_reports(&run(cohort()), &run(cohort()));

        assert!(comparison.same_input);
        assert!(comparison.is_unchanged());
        assert_eq!(comparison.entities.len(), 2);
    }

    #[test]
    fn test_detects_added_removed_and_reweighted() {
        let before = run(vec![
            EntitySignals::new("a", ["readme", "tests"]),
            EntitySignals::new("b", ["readme", "docker"]),
        ]);
        let after = run(vec![
            EntitySignals::new("a", ["readme", "tests"]),
            EntitySignals::new("c", ["tests", "kubernetes"]),
        ]);
        let comparison = compare_reports(&before, &after);

        assert!(!comparison.same_input);
        assert_eq!(comparison.entities_added, vec!["c"]);
        assert_eq!(comparison.entities_removed, vec!["b"]);
        assert_eq!(comparison.criteria_added[0].as_str(), "kubernetes");
        assert_eq!(comparison.criteria_removed[0].as_str(), "docker");

        let changed: Vec<&str> = comparison.weight_changes.iter().map(|w| w.key.as_str()).collect();
        assert_eq!(changed, vec!["readme", "tests"]);
        assert_eq!(comparison.entities.len(), 1);
        assert_eq!(comparison.entities[0].entity_id, "a");
    }
}
