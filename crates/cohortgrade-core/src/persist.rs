//! Durable documents for reports and vocabularies
//!
//! Reports are pretty JSON. Vocabularies are YAML with `criteria` and
//! `evolution` sections. A loaded report is re-checked against the graph
//! invariants before it is handed back.

use std::collections::HashSet;
use std::fs;
use std::path::Path;

use tracing::debug;

use crate::error::{GradeError, Result};
use crate::run::GradingReport;
use crate::vocabulary::Vocabulary;

fn ensure_parent(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }
    Ok(())
}

pub fn save_report(report: &GradingReport, path: &Path) -> Result<()> {
    ensure_parent(path)?;
    let content = serde_json::to_string_pretty(report)?;
    fs::write(path, content)?;
    debug!(path = %path.display(), entities = report.grades.len(), "report_saved");
    Ok(())
}

pub fn load_report(path: &Path) -> Result<GradingReport> {
    if !path.exists() {
        return Err(GradeError::not_found("report", path.display()));
    }
    let content = fs::read_to_string(path)?;
    let report: GradingReport = serde_json::from_str(&content)
        .map_err(|e| GradeError::corrupt_report(path, e))?;

    let errors = report_violations(&report);
    if !errors.is_empty() {
        return Err(GradeError::corrupt_report(path, errors.join("; ")));
    }
    Ok(report)
}

/// Graph invariants plus consistency between grades and graph
pub fn report_violations(report: &GradingReport) -> Vec<String> {
    let mut errors = report.graph.validate();
    let max = report.graph.max_possible_score();

    if report.grades.len() != report.graph.total_entities() {
        errors.push(format!(
            "{} grade records for {} graded entities",
            report.grades.len(),
            report.graph.total_entities()
        ));
    }

    let mut seen = HashSet::new();
    for record in &report.grades {
        if !seen.insert(record.entity_id()) {
            errors.push(format!("duplicate grade record for {}", record.entity_id()));
        }
        if (record.score.max_possible_score - max).abs() > crate::graph::WEIGHT_EPSILON {
            errors.push(format!(
                "grade record for {} uses max_possible_score {} instead of {}",
                record.entity_id(),
                record.score.max_possible_score,
                max
            ));
        }
        if !(0.0..=100.0).contains(&record.grade) {
            errors.push(format!(
                "grade {} for {} is outside 0-100",
                record.grade,
                record.entity_id()
            ));
        }
    }

    errors
}

pub fn save_vocabulary(vocabulary: &Vocabulary, path: &Path) -> Result<()> {
    ensure_parent(path)?;
    let content = serde_yaml::to_string(vocabulary)?;
    fs::write(path, content)?;
    debug!(path = %path.display(), criteria = vocabulary.len(), "vocabulary_saved");
    Ok(())
}

pub fn load_vocabulary(path: &Path) -> Result<Vocabulary> {
    if !path.exists() {
        return Err(GradeError::not_found("vocabulary", path.display()));
    }
    let content = fs::read_to_string(path)?;
    Ok(serde_yaml::from_str(&content)?)
}
