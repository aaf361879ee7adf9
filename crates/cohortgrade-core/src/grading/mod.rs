//! Relative grading and ranking
//!
//! Grades are relative to the best performer of the cohort. Under the
//! curve policy the best percentage maps to exactly 100 and everyone else
//! is placed on the piecewise curve in [`curve`]. The additive policy
//! starts from the prevalence-only percentage and adds the rarity bonus per
//! rare criterion held, capped at 100.

pub mod curve;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

pub use curve::{curve_grade, MAX_GRADE};

use crate::bail_input;
use crate::config::{GradingPolicy, RankStrategy};
use crate::error::Result;
use crate::run::RunWarning;
use crate::scoring::EntityScore;

/// Grades closer than this are ties
pub const GRADE_EPSILON: f64 = 1e-9;

/// Percentages within this fraction of the best one are tied with it
pub const RATIO_EPSILON: f64 = 1e-9;

/// Final grade and rank of one entity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GradeRecord {
    #[serde(flatten)]
    pub score: EntityScore,
    pub grade: f64,
    /// 1-based
    pub rank: usize,
}

impl GradeRecord {
    pub fn entity_id(&self) -> &str {
        &self.score.entity_id
    }
}

/// Graded cohort, best first
#[derive(Debug, Clone, Default)]
pub struct GradedCohort {
    pub records: Vec<GradeRecord>,
    pub warnings: Vec<RunWarning>,
}

#[derive(Debug, Clone, Copy)]
pub struct Grader {
    policy: GradingPolicy,
    rank: RankStrategy,
    rarity_bonus: f64,
}

impl Grader {
    pub fn new(policy: GradingPolicy, rank: RankStrategy, rarity_bonus: f64) -> Self {
        Self {
            policy,
            rank,
            rarity_bonus,
        }
    }

    pub fn policy(&self) -> GradingPolicy {
        self.policy
    }

    pub fn rank_strategy(&self) -> RankStrategy {
        self.rank
    }

    /// Grade and rank the cohort. Records come back in rank order.
    pub fn grade(&self, scores: Vec<EntityScore>) -> Result<GradedCohort> {
        if scores.is_empty() {
            bail_input!("grading", "no entities to grade, no best performer to anchor the scale");
        }

        let best = scores
            .iter()
            .map(|s| s.percentage)
            .fold(f64::NEG_INFINITY, f64::max);

        let mut warnings = Vec::new();
        if best <= 0.0 {
            warn!(entities = scores.len(), "every entity scored zero, all grades are 0");
            warnings.push(RunWarning::AllScoresZero {
                entities: scores.len(),
            });
        }

        let mut records: Vec<GradeRecord> = scores
            .into_iter()
            .map(|score| {
                let grade = self.grade_one(&score, best);
                GradeRecord {
                    score,
                    grade,
                    rank: 0,
                }
            })
            .collect();

        order_by_grade(&mut records);
        assign_ranks(&mut records, self.rank);

        debug!(
            entities = records.len(),
            policy = %self.policy,
            rank = %self.rank,
            best_percentage = best,
            "cohort_graded"
        );
        Ok(GradedCohort { records, warnings })
    }

    fn grade_one(&self, score: &EntityScore, best: f64) -> f64 {
        match self.policy {
            GradingPolicy::Curve => {
                if best <= 0.0 {
                    0.0
                } else {
                    curve_grade(ratio_to_best(score.percentage, best))
                }
            }
            GradingPolicy::Additive => {
                let grade = score.base_percentage + self.rarity_bonus * score.rare_count as f64;
                grade.clamp(0.0, MAX_GRADE)
            }
        }
    }
}

/// `percentage / best`, snapped to 1.0 when the two differ only by
/// summation rounding
fn ratio_to_best(percentage: f64, best: f64) -> f64 {
    if best - percentage <= RATIO_EPSILON * best {
        1.0
    } else {
        percentage / best
    }
}

/// Sort by grade descending; entities with tied grades by id ascending
fn order_by_grade(records: &mut [GradeRecord]) {
    records.sort_by(|a, b| b.grade.total_cmp(&a.grade));

    let mut start = 0;
    while start < records.len() {
        let anchor = records[start].grade;
        let mut end = start + 1;
        while end < records.len() && (anchor - records[end].grade).abs() <= GRADE_EPSILON {
            end += 1;
        }
        records[start..end].sort_by(|a, b| a.score.entity_id.cmp(&b.score.entity_id));
        start = end;
    }
}

fn assign_ranks(records: &mut [GradeRecord], strategy: RankStrategy) {
    let mut tie_run = (0.0, 0);
    for (position, record) in records.iter_mut().enumerate() {
        if position == 0 || (tie_run.0 - record.grade).abs() > GRADE_EPSILON {
            tie_run = (record.grade, position + 1);
        }
        record.rank = match strategy {
            RankStrategy::Shared => tie_run.1,
            RankStrategy::Positional => position + 1,
        };
    }
}
