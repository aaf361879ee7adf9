//! Category classification for criteria
//!
//! Categories are resolved from keyword rules. The configured mode decides how
//! custom rules combine with the built-in rule set (default, extended, or
//! replacement). Classification is total: anything unmatched falls into the
//! default label.

use crate::config::{CategoryConfig, CategoryMode, CategoryRule};
use crate::criterion::CriterionKey;

/// Built-in category rules, evaluated in order (first match wins)
const STANDARD_RULES: &[(&str, &[&str])] = &[
    (
        "CodeQuality",
        &[
            "eslint", "pylint", "ruff", "flake8", "black", "prettier", "pre commit",
            "typescript", "mypy", "type checking", "linting", "linter", "formatting",
            "code quality", "code review", "style guide", "pep8", "pep 8", "static analysis",
        ],
    ),
    ("Testing", &["test", "coverage", "pytest", "jest", "mocha", "junit", "tdd"]),
    (
        "DevOps",
        &[
            "ci cd", "continuous integration", "github actions", "gitlab ci", "docker",
            "kubernetes", "k8s", "deployment", "pipeline", "gitignore", "terraform",
        ],
    ),
    (
        "Documentation",
        &[
            "readme", "documentation", "api doc", "changelog", "contributing", "user guide",
            "usage guide", "installation", "getting started", "faq", "troubleshooting",
            "license",
        ],
    ),
    (
        "Planning",
        &[
            "prd", "problem statement", "requirements", "architecture", "success metrics",
            "assumptions", "roadmap", "use case", "user stories", "design decision",
        ],
    ),
    (
        "Research",
        &["cost analysis", "risk analysis", "roi", "market research", "research", "benchmark"],
    ),
    (
        "Visuals",
        &["screenshot", "diagram", "visualization", "flowchart", "mockup", "wireframe"],
    ),
    ("Security", &["secret", "security", "env"]),
];

/// Maps a criterion key onto a human category label
pub trait CategoryClassifier {
    fn classify(&self, key: &CriterionKey) -> String;
}

/// A rule with keywords pre-normalized to the spaced key form
#[derive(Debug, Clone)]
struct CompiledRule {
    name: String,
    keywords: Vec<String>,
}

impl CompiledRule {
    fn new(name: &str, keywords: impl IntoIterator<Item = impl AsRef<str>>) -> Self {
        Self {
            name: name.to_string(),
            keywords: keywords
                .into_iter()
                .filter_map(|k| CriterionKey::normalize(k.as_ref()))
                .map(|k| k.spaced())
                .collect(),
        }
    }

    fn matches(&self, spaced_key: &str) -> bool {
        self.keywords.iter().any(|k| spaced_key.contains(k.as_str()))
    }
}

/// Keyword-substring classifier resolved from configuration
#[derive(Debug, Clone)]
pub struct KeywordClassifier {
    rules: Vec<CompiledRule>,
    default_label: String,
}

impl KeywordClassifier {
    /// Create a classifier from configuration, resolving based on mode
    pub fn from_config(config: &CategoryConfig) -> Self {
        let custom = config.rules.iter().map(compile_custom);

        let rules = match config.mode {
            CategoryMode::Default => standard_rules().collect(),
            CategoryMode::Extended => custom.chain(standard_rules()).collect(),
            CategoryMode::Replacement => custom.collect(),
        };

        Self {
            rules,
            default_label: config.default_label.clone(),
        }
    }

    /// Category labels this classifier can produce, in rule order, default last
    pub fn labels(&self) -> Vec<String> {
        let mut labels: Vec<String> = Vec::new();
        for rule in &self.rules {
            if !labels.contains(&rule.name) {
                labels.push(rule.name.clone());
            }
        }
        if !labels.contains(&self.default_label) {
            labels.push(self.default_label.clone());
        }
        labels
    }
}

impl Default for KeywordClassifier {
    fn default() -> Self {
        Self::from_config(&CategoryConfig::default())
    }
}

impl CategoryClassifier for KeywordClassifier {
    fn classify(&self, key: &CriterionKey) -> String {
        let spaced = key.spaced();
        self.rules
            .iter()
            .find(|rule| rule.matches(&spaced))
            .map(|rule| rule.name.clone())
            .unwrap_or_else(|| self.default_label.clone())
    }
}

fn standard_rules() -> impl Iterator<Item = CompiledRule> {
    STANDARD_RULES
        .iter()
        .map(|(name, keywords)| CompiledRule::new(name, keywords.iter()))
}

fn compile_custom(rule: &CategoryRule) -> CompiledRule {
    CompiledRule::new(&rule.name, rule.keywords.iter())
}
