use cohortgrade_core::config::{GradingPolicy, RankStrategy};
use cohortgrade_core::format::OutputFormat;

/// Parse output format from string
pub fn parse_format(s: &str) -> std::result::Result<OutputFormat, String> {
    s.parse::<OutputFormat>().map_err(|e| e.to_string())
}

/// Parse grading policy from string
pub fn parse_policy(s: &str) -> std::result::Result<GradingPolicy, String> {
    s.parse::<GradingPolicy>().map_err(|e| e.to_string())
}

/// Parse rank strategy from string
pub fn parse_rank(s: &str) -> std::result::Result<RankStrategy, String> {
    s.parse::<RankStrategy>().map_err(|e| e.to_string())
}
