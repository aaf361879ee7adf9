//! Human-readable output for the grade command

use std::path::Path;

use cohortgrade_core::format::round2;
use cohortgrade_core::run::GradingReport;

use crate::cli::Cli;

pub fn output_human(cli: &Cli, report: &GradingReport, shown: usize, saved_to: Option<&Path>) {
    let meta = &report.metadata;
    println!(
        "Graded {} of {} entities against {} criteria (policy {}, rank {})",
        meta.entities_graded,
        meta.entities_requested,
        report.graph.len(),
        meta.policy,
        meta.rank
    );
    println!();

    let width = report.grades[..shown]
        .iter()
        .map(|g| g.entity_id().len())
        .max()
        .unwrap_or(6)
        .max(6);

    println!(
        "{:>4}  {:<width$}  {:>6}  {:>7}  {:>8}  {:>4}",
        "Rank",
        "Entity",
        "Grade",
        "Percent",
        "Raw",
        "Rare",
        width = width
    );
    for record in &report.grades[..shown] {
        println!(
            "{:>4}  {:<width$}  {:>6.2}  {:>7.2}  {:>8.4}  {:>4}",
            record.rank,
            record.entity_id(),
            round2(record.grade),
            round2(record.score.percentage),
            record.score.raw_score,
            record.score.rare_count,
            width = width
        );
    }
    if shown < report.grades.len() {
        println!("  ... {} more", report.grades.len() - shown);
    }

    if !report.failures.is_empty() {
        println!();
        println!("Not graded:");
        for failure in &report.failures {
            println!("  {} ({}): {}", failure.entity, failure.stage, failure.reason);
        }
    }

    if !report.warnings.is_empty() {
        println!();
        for warning in &report.warnings {
            println!("warning: {}", warning);
        }
    }

    if cli.quiet {
        return;
    }

    let summary = &report.summary;
    println!();
    println!(
        "Mean {:.2}  median {:.2}  min {:.2}  max {:.2}  std dev {:.2}",
        summary.mean, summary.median, summary.min, summary.max, summary.std_dev
    );
    let bands: Vec<String> = summary
        .bands
        .iter()
        .map(|b| format!("{}: {}", b.label, b.count))
        .collect();
    println!("Bands: {}", bands.join(", "));
    if !summary.rare_criteria.is_empty() {
        let rare: Vec<&str> = summary.rare_criteria.iter().map(|k| k.as_str()).collect();
        println!("Rare criteria: {}", rare.join(", "));
    }

    if let Some(path) = saved_to {
        println!();
        println!("Saved report to {}", path.display());
    }
}
