//! Configuration type definitions

use serde::{Deserialize, Serialize};

use crate::error::GradeError;

/// Current config format version
pub const CONFIG_FORMAT_VERSION: u32 = 1;

/// Prevalence at or below which a criterion earns the rarity bonus
pub const DEFAULT_RARITY_THRESHOLD: f64 = 0.15;

/// Additive weight granted to rare criteria
pub const DEFAULT_RARITY_BONUS: f64 = 1.0;

/// Entities per discovery window
pub const DEFAULT_WINDOW_SIZE: usize = 3;

/// Label for criteria no category rule matches
pub const DEFAULT_CATEGORY_LABEL: &str = "Uncategorized";

/// Grading configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GradingConfig {
    /// Config format version for compatibility checking
    #[serde(default = "default_version")]
    pub version: u32,

    /// Rarity bonus policy
    #[serde(default)]
    pub rarity: RarityConfig,

    /// Windowed vocabulary discovery
    #[serde(default)]
    pub discovery: DiscoveryConfig,

    /// Grade curve and ranking
    #[serde(default)]
    pub grading: PolicyConfig,

    /// Category classification rules
    #[serde(default)]
    pub categories: CategoryConfig,
}

/// Rarity policy constants
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RarityConfig {
    /// Prevalence threshold (inclusive) for the rarity bonus
    #[serde(default = "default_rarity_threshold")]
    pub threshold: f64,

    /// Bonus added to a rare criterion's weight
    #[serde(default = "default_rarity_bonus")]
    pub bonus: f64,
}

/// Configuration for windowed discovery
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiscoveryConfig {
    /// Number of consecutive entities per window
    #[serde(default = "default_window_size")]
    pub window_size: usize,
}

/// Grading policy selection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PolicyConfig {
    /// How percentages become grades
    #[serde(default)]
    pub policy: GradingPolicy,

    /// How ties are ranked
    #[serde(default)]
    pub rank: RankStrategy,
}

/// How a percentage is mapped onto the final grade
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GradingPolicy {
    /// Piecewise curve relative to the best performer (best = 100)
    #[default]
    Curve,
    /// Percentage plus one rarity bonus per rare criterion held, capped at 100
    Additive,
}

/// Rank assignment for tied grades
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RankStrategy {
    /// Ties share a rank; the next distinct grade resumes at its position (1, 1, 3)
    #[default]
    #[serde(alias = "dense")]
    Shared,
    /// Every entity gets its 1-based position; ties ordered by entity id
    Positional,
}

/// Category rule resolution mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CategoryMode {
    /// Use only the built-in rules
    #[default]
    Default,
    /// Custom rules first, then the built-in rules
    Extended,
    /// Custom rules only
    Replacement,
}

/// A single keyword rule mapping criteria onto a category label
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryRule {
    /// Category label
    pub name: String,

    /// Keywords; a criterion matches when its key contains any of them
    #[serde(default)]
    pub keywords: Vec<String>,
}

/// Configuration for category classification
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryConfig {
    /// How custom rules combine with the built-ins
    #[serde(default)]
    pub mode: CategoryMode,

    /// Label for unmatched criteria
    #[serde(default = "default_category_label")]
    pub default_label: String,

    /// Custom rules, evaluated in order
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub rules: Vec<CategoryRule>,
}

fn default_version() -> u32 {
    CONFIG_FORMAT_VERSION
}

fn default_rarity_threshold() -> f64 {
    DEFAULT_RARITY_THRESHOLD
}

fn default_rarity_bonus() -> f64 {
    DEFAULT_RARITY_BONUS
}

fn default_window_size() -> usize {
    DEFAULT_WINDOW_SIZE
}

fn default_category_label() -> String {
    DEFAULT_CATEGORY_LABEL.to_string()
}

impl Default for GradingConfig {
    fn default() -> Self {
        Self {
            version: CONFIG_FORMAT_VERSION,
            rarity: RarityConfig::default(),
            discovery: DiscoveryConfig::default(),
            grading: PolicyConfig::default(),
            categories: CategoryConfig::default(),
        }
    }
}

impl Default for RarityConfig {
    fn default() -> Self {
        Self {
            threshold: DEFAULT_RARITY_THRESHOLD,
            bonus: DEFAULT_RARITY_BONUS,
        }
    }
}

impl Default for DiscoveryConfig {
    fn default() -> Self {
        Self {
            window_size: DEFAULT_WINDOW_SIZE,
        }
    }
}

impl Default for CategoryConfig {
    fn default() -> Self {
        Self {
            mode: CategoryMode::Default,
            default_label: DEFAULT_CATEGORY_LABEL.to_string(),
            rules: Vec::new(),
        }
    }
}

impl std::fmt::Display for GradingPolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            GradingPolicy::Curve => write!(f, "curve"),
            GradingPolicy::Additive => write!(f, "additive"),
        }
    }
}

impl std::fmt::Display for RankStrategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RankStrategy::Shared => write!(f, "shared"),
            RankStrategy::Positional => write!(f, "positional"),
        }
    }
}

impl std::str::FromStr for GradingPolicy {
    type Err = GradeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "curve" => Ok(GradingPolicy::Curve),
            "additive" => Ok(GradingPolicy::Additive),
            other => Err(GradeError::invalid_value(
                "grading policy (expected: curve or additive)",
                other,
            )),
        }
    }
}

impl std::str::FromStr for RankStrategy {
    type Err = GradeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "shared" | "dense" => Ok(RankStrategy::Shared),
            "positional" => Ok(RankStrategy::Positional),
            other => Err(GradeError::invalid_value(
                "rank strategy (expected: shared or positional)",
                other,
            )),
        }
    }
}
