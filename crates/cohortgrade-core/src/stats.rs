//! Cohort-level statistics over final grades and the criteria graph

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::criterion::CriterionKey;
use crate::grading::GradeRecord;
use crate::graph::CriteriaGraph;

/// Grade bands aligned with the curve breakpoints, highest first
pub const GRADE_BANDS: &[(&str, f64)] = &[
    ("90-100", 90.0),
    ("75-89", 75.0),
    ("60-74", 60.0),
    ("below 60", f64::NEG_INFINITY),
];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GradeBand {
    pub label: String,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategorySummary {
    pub category: String,
    pub criteria: usize,
    pub total_weight: f64,
    pub average_weight: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CohortSummary {
    pub entities: usize,
    pub mean: f64,
    pub median: f64,
    pub min: f64,
    pub max: f64,
    /// Population standard deviation
    pub std_dev: f64,
    pub bands: Vec<GradeBand>,
    pub categories: Vec<CategorySummary>,
    pub rare_criteria: Vec<CriterionKey>,
}

impl CohortSummary {
    pub fn compute(graph: &CriteriaGraph, records: &[GradeRecord]) -> Self {
        let mut grades: Vec<f64> = records.iter().map(|r| r.grade).collect();
        grades.sort_by(f64::total_cmp);

        let n = grades.len();
        let (mean, median, min, max, std_dev) = if n == 0 {
            (0.0, 0.0, 0.0, 0.0, 0.0)
        } else {
            let mean = grades.iter().sum::<f64>() / n as f64;
            let median = if n % 2 == 0 {
                (grades[n / 2 - 1] + grades[n / 2]) / 2.0
            } else {
                grades[n / 2]
            };
            let variance = grades.iter().map(|g| (g - mean).powi(2)).sum::<f64>() / n as f64;
            (mean, median, grades[0], grades[n - 1], variance.sqrt())
        };

        let bands = GRADE_BANDS
            .iter()
            .enumerate()
            .map(|(i, (label, floor))| {
                let ceiling = if i == 0 {
                    f64::INFINITY
                } else {
                    GRADE_BANDS[i - 1].1
                };
                GradeBand {
                    label: label.to_string(),
                    count: grades.iter().filter(|&&g| g >= *floor && g < ceiling).count(),
                }
            })
            .collect();

        let mut by_category: BTreeMap<&str, (usize, f64)> = BTreeMap::new();
        for criterion in graph.criteria() {
            let entry = by_category.entry(criterion.category.as_str()).or_default();
            entry.0 += 1;
            entry.1 += criterion.weight;
        }
        let categories = by_category
            .into_iter()
            .map(|(category, (criteria, total_weight))| CategorySummary {
                category: category.to_string(),
                criteria,
                total_weight,
                average_weight: total_weight / criteria as f64,
            })
            .collect();

        Self {
            entities: n,
            mean,
            median,
            min,
            max,
            std_dev,
            bands,
            categories,
            rare_criteria: graph.rare_criteria().map(|c| c.key.clone()).collect(),
        }
    }

    pub fn band(&self, label: &str) -> Option<usize> {
        self.bands.iter().find(|b| b.label == label).map(|b| b.count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::category::KeywordClassifier;
    use crate::config::RarityConfig;
    use crate::graph::GraphAggregator;
    use crate::scoring::EntityScore;
    use crate::signals::EntitySignals;

    fn record(id: &str, grade: f64) -> GradeRecord {
        GradeRecord {
            score: EntityScore {
                entity_id: id.to_string(),
                raw_score: 0.0,
                max_possible_score: 0.0,
                percentage: grade,
                bonus: 0.0,
                base_percentage: grade,
                criteria_count: 0,
                rare_count: 0,
                unknown_criteria: 0,
            },
            grade,
            rank: 0,
        }
    }

    fn graph() -> CriteriaGraph {
        let classifier = KeywordClassifier::default();
        GraphAggregator::new(RarityConfig::default(), &classifier)
            .aggregate(&[
                EntitySignals::new("a", ["unit tests", "coverage report", "docker"]),
                EntitySignals::new("b", ["unit tests"]),
            ])
            .unwrap()
    }

    #[test]
    fn test_grade_statistics() {
        let records = [
            record("a", 100.0),
            record("b", 80.0),
            record("c", 60.0),
            record("d", 40.0),
        ];
        let summary = CohortSummary::compute(&graph(), &records);

        assert_eq!(summary.entities, 4);
        assert!((summary.mean - 70.0).abs() < 1e-9);
        assert!((summary.median - 70.0).abs() < 1e-9);
        assert_eq!(summary.min, 40.0);
        assert_eq!(summary.max, 100.0);
        assert!((summary.std_dev - 500.0_f64.sqrt()).abs() < 1e-9);
    }

    #[test]
    fn test_bands() {
        let records = [
            record("a", 100.0),
            record("b", 90.0),
            record("c", 89.9),
            record("d", 60.0),
            record("e", 12.0),
        ];
        let summary = CohortSummary::compute(&graph(), &records);

        assert_eq!(summary.band("90-100"), Some(2));
        assert_eq!(summary.band("75-89"), Some(1));
        assert_eq!(summary.band("60-74"), Some(1));
        assert_eq!(summary.band("below 60"), Some(1));
    }

    #[test]
    fn test_category_summary() {
        let summary = CohortSummary::compute(&graph(), &[record("a", 100.0)]);

        let testing = summary
            .categories
            .iter()
            .find(|c| c.category == "Testing")
            .unwrap();
        assert_eq!(testing.criteria, 2);
        assert!((testing.total_weight - 1.5).abs() < 1e-9);
        assert!((testing.average_weight - 0.75).abs() < 1e-9);
    }

    #[test]
    fn test_empty_records() {
        let summary = CohortSummary::compute(&graph(), &[]);
        assert_eq!(summary.entities, 0);
        assert_eq!(summary.mean, 0.0);
        assert!(summary.bands.iter().all(|b| b.count == 0));
    }
}
