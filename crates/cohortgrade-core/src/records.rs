//! Line formats for `--format records`
//!
//! Every line starts with a one-letter record type:
//! - `H` header (one per output)
//! - `C` criterion
//! - `E` discovery event
//! - `G` grade
//! - `F` failed entity
//! - `W` run warning

use crate::format::round2;
use crate::grading::GradeRecord;
use crate::graph::Criterion;
use crate::run::{EntityFailure, RunWarning};
use crate::vocabulary::DiscoveryEvent;

/// Escape double quotes in a string for records format.
/// Replaces `"` with `\"` to allow safe embedding in quoted fields.
pub fn escape_quotes(s: &str) -> String {
    s.replace('\"', r#"\""#)
}

/// Entity ids come from the input and may hold spaces, so they are always quoted
pub fn quote_id(id: &str) -> String {
    format!("\"{}\"", escape_quotes(id))
}

/// Header line: `H cohortgrade=<version> <command> key=value...`
pub fn format_header_record(command: &str, fields: &[(&str, String)]) -> String {
    let mut line = format!("H cohortgrade={} {}", env!("CARGO_PKG_VERSION"), command);
    for (key, value) in fields {
        line.push_str(&format!(" {}={}", key, value));
    }
    line
}

pub fn format_criterion_record(criterion: &Criterion) -> String {
    format!(
        "C {} category={} count={} prevalence={:.4} weight={:.4} rare={} \"{}\"",
        criterion.key,
        criterion.category,
        criterion.count,
        criterion.prevalence,
        criterion.weight,
        criterion.rare,
        escape_quotes(&criterion.display_name)
    )
}

pub fn format_evolution_record(event: &DiscoveryEvent) -> String {
    format!(
        "E {} window={} entity={} key={} \"{}\"",
        event.sequence,
        event.window,
        quote_id(&event.entity_id),
        event.key,
        escape_quotes(&event.display_name)
    )
}

pub fn format_grade_record(record: &GradeRecord) -> String {
    format!(
        "G {} rank={} grade={:.2} percentage={:.2} raw={:.4} max={:.4} bonus={:.4} criteria={} rare={}",
        quote_id(record.entity_id()),
        record.rank,
        round2(record.grade),
        round2(record.score.percentage),
        record.score.raw_score,
        record.score.max_possible_score,
        record.score.bonus,
        record.score.criteria_count,
        record.score.rare_count
    )
}

pub fn format_failure_record(failure: &EntityFailure) -> String {
    format!(
        "F {} stage={} \"{}\"",
        quote_id(&failure.entity),
        failure.stage,
        escape_quotes(&failure.reason)
    )
}

pub fn format_warning_record(warning: &RunWarning) -> String {
    format!("W \"{}\"", escape_quotes(&warning.to_string()))
}
