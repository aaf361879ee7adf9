//! End-to-end grading run
//!
//! Discovery, aggregation, scoring, grading and summary for one cohort.
//! A single entity whose signals cannot be produced is recorded as a
//! failure and left out; the rest of the cohort is still graded.

use std::collections::HashSet;
use std::fmt;
use std::time::Instant;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use tracing::{debug, info, warn};

use crate::category::KeywordClassifier;
use crate::config::{GradingConfig, GradingPolicy, RankStrategy};
use crate::error::Result;
use crate::grading::{GradeRecord, Grader};
use crate::graph::{CriteriaGraph, GraphAggregator};
use crate::scoring::ScoreCalculator;
use crate::signals::{EntitySignals, SignalCache, SignalExtractor};
use crate::stats::CohortSummary;
use crate::vocabulary::{DiscoveryEvent, Vocabulary, VocabularyBuilder};
use crate::{bail_input, trace_time};

/// An entity that dropped out of the run, and where
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntityFailure {
    pub entity: String,
    pub stage: String,
    pub reason: String,
}

impl EntityFailure {
    pub fn new(entity: &str, stage: &str, reason: impl fmt::Display) -> Self {
        Self {
            entity: entity.to_string(),
            stage: stage.to_string(),
            reason: reason.to_string(),
        }
    }
}

/// Degenerate but valid states the run continued through
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RunWarning {
    /// No criteria were discovered; every percentage is 0
    NoCriteria { entities: usize },
    /// The best percentage is 0; every grade is 0
    AllScoresZero { entities: usize },
}

impl fmt::Display for RunWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RunWarning::NoCriteria { entities } => write!(
                f,
                "no criteria discovered across {} entities, all percentages are 0",
                entities
            ),
            RunWarning::AllScoresZero { entities } => {
                write!(f, "all {} entities scored zero, all grades are 0", entities)
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportMetadata {
    pub tool_version: String,
    pub generated_at: DateTime<Utc>,
    pub policy: GradingPolicy,
    pub rank: RankStrategy,
    pub rarity_threshold: f64,
    pub rarity_bonus: f64,
    pub window_size: usize,
    pub entities_requested: usize,
    pub entities_graded: usize,
    /// SHA-256 over sorted entity ids and their sorted criterion keys
    pub input_fingerprint: String,
}

/// Everything a grading run produces
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GradingReport {
    pub metadata: ReportMetadata,
    pub graph: CriteriaGraph,
    /// Rank order
    pub grades: Vec<GradeRecord>,
    pub evolution: Vec<DiscoveryEvent>,
    #[serde(default)]
    pub failures: Vec<EntityFailure>,
    #[serde(default)]
    pub warnings: Vec<RunWarning>,
    pub summary: CohortSummary,
}

impl GradingReport {
    pub fn grade_of(&self, entity_id: &str) -> Option<&GradeRecord> {
        self.grades.iter().find(|g| g.entity_id() == entity_id)
    }
}

/// Vocabulary-only outcome of the discovery pass
#[derive(Debug, Clone)]
pub struct DiscoveryOutcome {
    pub vocabulary: Vocabulary,
    pub failures: Vec<EntityFailure>,
    pub window_size: usize,
}

/// Hash the graded input so two reports can tell whether they saw the same data
pub fn input_fingerprint(entities: &[EntitySignals]) -> String {
    let mut sorted: Vec<&EntitySignals> = entities.iter().collect();
    sorted.sort_by(|a, b| a.entity_id().cmp(b.entity_id()));

    let mut hasher = Sha256::new();
    for entity in sorted {
        hasher.update(entity.entity_id().as_bytes());
        hasher.update([0u8]);
        for key in entity.keys() {
            hasher.update(key.as_str().as_bytes());
            hasher.update([0x1fu8]);
        }
        hasher.update([0x1eu8]);
    }
    hex::encode(hasher.finalize())
}

pub struct GradingRun {
    config: GradingConfig,
    classifier: KeywordClassifier,
}

impl GradingRun {
    pub fn new(config: GradingConfig) -> Self {
        let classifier = KeywordClassifier::from_config(&config.categories);
        Self { config, classifier }
    }

    pub fn config(&self) -> &GradingConfig {
        &self.config
    }

    /// Run the windowed discovery pass only
    pub fn discover(
        &self,
        entity_ids: &[String],
        extractor: &dyn SignalExtractor,
    ) -> Result<DiscoveryOutcome> {
        check_entity_ids(entity_ids)?;
        self.config.validate()?;
        let window_size = self.config.discovery.window_size;
        let mut builder = VocabularyBuilder::new();
        let failures =
            builder.run_windows(entity_ids, window_size, extractor, &SignalCache::new())?;

        Ok(DiscoveryOutcome {
            vocabulary: builder.finish(),
            failures,
            window_size,
        })
    }

    /// Grade the cohort `entity_ids` (in cohort order)
    #[tracing::instrument(skip_all, fields(entities = entity_ids.len()))]
    pub fn execute(
        &self,
        entity_ids: &[String],
        extractor: &dyn SignalExtractor,
    ) -> Result<GradingReport> {
        let start = Instant::now();
        check_entity_ids(entity_ids)?;
        self.config.validate()?;

        let window_size = self.config.discovery.window_size;
        let cache = SignalCache::new();
        let mut builder = VocabularyBuilder::new();
        let mut failures = builder.run_windows(entity_ids, window_size, extractor, &cache)?;
        let vocabulary = builder.finish();

        let cohort = collect_signals(entity_ids, extractor, &cache, &mut failures)?;
        trace_time!(start, "collect_signals", entities = cohort.len());

        let graph = GraphAggregator::new(self.config.rarity, &self.classifier).aggregate(&cohort)?;
        let scored = ScoreCalculator::new(&graph).score_all(&cohort);
        let grader = Grader::new(
            self.config.grading.policy,
            self.config.grading.rank,
            self.config.rarity.bonus,
        );
        let graded = grader.grade(scored.scores)?;
        let summary = CohortSummary::compute(&graph, &graded.records);

        let mut warnings = scored.warnings;
        warnings.extend(graded.warnings);

        let metadata = ReportMetadata {
            tool_version: env!("CARGO_PKG_VERSION").to_string(),
            generated_at: Utc::now(),
            policy: self.config.grading.policy,
            rank: self.config.grading.rank,
            rarity_threshold: self.config.rarity.threshold,
            rarity_bonus: self.config.rarity.bonus,
            window_size,
            entities_requested: entity_ids.len(),
            entities_graded: cohort.len(),
            input_fingerprint: input_fingerprint(&cohort),
        };

        debug_assert_eq!(graph.total_entities(), cohort.len());
        if !failures.is_empty() {
            info!(failed = failures.len(), graded = cohort.len(), "run_completed_with_failures");
        }
        trace_time!(start, "grading_run", entities = cohort.len());
        debug!(
            entities = cohort.len(),
            criteria = graph.len(),
            warnings = warnings.len(),
            "grading_run_complete"
        );

        Ok(GradingReport {
            metadata,
            graph,
            grades: graded.records,
            evolution: vocabulary.evolution,
            failures,
            warnings,
            summary,
        })
    }
}

/// Gather the signals of every entity that survived discovery.
///
/// Entities that fail here are appended to `failures`. A run with no
/// surviving entity is an input error.
fn collect_signals(
    entity_ids: &[String],
    extractor: &dyn SignalExtractor,
    cache: &SignalCache,
    failures: &mut Vec<EntityFailure>,
) -> Result<Vec<EntitySignals>> {
    let failed: HashSet<String> = failures.iter().map(|f| f.entity.clone()).collect();
    let mut cohort = Vec::with_capacity(entity_ids.len());
    for entity_id in entity_ids {
        if failed.contains(entity_id) {
            continue;
        }
        match cache.get_or_extract(entity_id, extractor) {
            Ok(signals) => cohort.push(EntitySignals::clone(&signals)),
            Err(e) => {
                warn!(entity = %entity_id, error = %e, "skip_entity");
                failures.push(EntityFailure::new(entity_id, "extraction", &e));
            }
        }
    }

    if cohort.is_empty() {
        bail_input!(
            "extraction",
            format!("all {} entities failed signal extraction", entity_ids.len())
        );
    }
    Ok(cohort)
}

fn check_entity_ids(entity_ids: &[String]) -> Result<()> {
    if entity_ids.is_empty() {
        bail_input!("run", "entity list is empty");
    }
    let mut seen = HashSet::new();
    for id in entity_ids {
        if !seen.insert(id.as_str()) {
            bail_input!("run", format!("duplicate entity id: {}", id));
        }
    }
    Ok(())
}
