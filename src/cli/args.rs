//! Command argument structures

use std::path::PathBuf;

use clap::Args;
use cohortgrade_core::config::{GradingConfig, GradingPolicy, RankStrategy};

use super::parse::{parse_policy, parse_rank};

#[derive(Args, Debug)]
pub struct InitArgs {
    /// Overwrite an existing configuration file
    #[arg(long)]
    pub force: bool,
}

/// Policy constants that override the configuration file
#[derive(Args, Debug, Clone, Default)]
pub struct PolicyArgs {
    /// Entities per discovery window
    #[arg(long, short = 'w')]
    pub window_size: Option<usize>,

    /// Grading policy (curve, additive)
    #[arg(long, value_parser = parse_policy)]
    pub policy: Option<GradingPolicy>,

    /// Rank tie handling (shared, positional)
    #[arg(long, value_parser = parse_rank)]
    pub rank: Option<RankStrategy>,

    /// Prevalence at or below which a criterion is rare (0.0-1.0)
    #[arg(long)]
    pub rarity_threshold: Option<f64>,

    /// Weight bonus for rare criteria
    #[arg(long)]
    pub rarity_bonus: Option<f64>,
}

impl PolicyArgs {
    pub fn apply(&self, config: &mut GradingConfig) {
        if let Some(window_size) = self.window_size {
            config.discovery.window_size = window_size;
        }
        if let Some(policy) = self.policy {
            config.grading.policy = policy;
        }
        if let Some(rank) = self.rank {
            config.grading.rank = rank;
        }
        if let Some(threshold) = self.rarity_threshold {
            config.rarity.threshold = threshold;
        }
        if let Some(bonus) = self.rarity_bonus {
            config.rarity.bonus = bonus;
        }
    }
}

#[derive(Args, Debug)]
pub struct DiscoverArgs {
    /// Signal manifest (JSON/YAML) or directory of per-entity signal files
    pub signals: PathBuf,

    /// Entities per discovery window
    #[arg(long, short = 'w')]
    pub window_size: Option<usize>,

    /// Save the vocabulary as YAML
    #[arg(long, short)]
    pub output: Option<PathBuf>,
}

#[derive(Args, Debug)]
pub struct GradeArgs {
    /// Signal manifest (JSON/YAML) or directory of per-entity signal files
    pub signals: PathBuf,

    #[command(flatten)]
    pub policy: PolicyArgs,

    /// Save the full report as JSON
    #[arg(long, short)]
    pub output: Option<PathBuf>,

    /// Show only the N best-ranked entities
    #[arg(long)]
    pub top: Option<usize>,
}

#[derive(Args, Debug)]
pub struct CriteriaArgs {
    /// Saved grading report (JSON)
    pub report: PathBuf,

    /// Show only rare criteria
    #[arg(long)]
    pub rare: bool,
}

#[derive(Args, Debug)]
pub struct CompareArgs {
    /// Earlier report
    pub before: PathBuf,

    /// Later report
    pub after: PathBuf,
}
