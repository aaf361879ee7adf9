//! `cohortgrade compare` command - diff two saved reports

use cohortgrade_core::compare::{compare_reports, ReportComparison};
use cohortgrade_core::error::Result;
use cohortgrade_core::format::round2;
use cohortgrade_core::persist::load_report;
use cohortgrade_core::records::{format_header_record, quote_id};

use crate::cli::CompareArgs;
use crate::commands::dispatch::CommandContext;
use crate::commands::format::{output_by_format_result, print_json};

/// Execute the compare command
pub fn execute(ctx: &CommandContext, args: &CompareArgs) -> Result<()> {
    let before = load_report(&args.before)?;
    let after = load_report(&args.after)?;
    let comparison = compare_reports(&before, &after);

    output_by_format_result!(ctx.cli.format,
        json => { print_json(&comparison) },
        human => { output_human(&comparison); },
        records => { output_records(&comparison); }
    )
}

fn output_human(comparison: &ReportComparison) {
    if comparison.is_unchanged() {
        println!("No changes");
        return;
    }
    if comparison.same_input {
        println!("Same input, different policy or configuration");
    }

    for delta in comparison
        .entities
        .iter()
        .filter(|d| d.grade_delta != 0.0 || d.rank_delta != 0)
    {
        println!(
            "{}: {:.2} -> {:.2} ({:+.2}), rank {} -> {}",
            quote_id(&delta.entity_id),
            round2(delta.grade_before),
            round2(delta.grade_after),
            round2(delta.grade_delta),
            delta.rank_before,
            delta.rank_after
        );
    }

    let lists = [
        ("Entities added", &comparison.entities_added),
        ("Entities removed", &comparison.entities_removed),
    ];
    for (label, ids) in lists {
        if !ids.is_empty() {
            println!("{}: {}", label, ids.join(", "));
        }
    }

    let keys = [
        ("Criteria added", &comparison.criteria_added),
        ("Criteria removed", &comparison.criteria_removed),
    ];
    for (label, list) in keys {
        if !list.is_empty() {
            let names: Vec<&str> = list.iter().map(|k| k.as_str()).collect();
            println!("{}: {}", label, names.join(", "));
        }
    }

    for change in &comparison.weight_changes {
        println!(
            "Weight {}: {:.4} -> {:.4}",
            change.key, change.weight_before, change.weight_after
        );
    }
}

fn output_records(comparison: &ReportComparison) {
    println!(
        "{}",
        format_header_record(
            "compare",
            &[
                ("same_input", comparison.same_input.to_string()),
                ("entities", comparison.entities.len().to_string()),
            ],
        )
    );
    for delta in &comparison.entities {
        println!(
            "D {} grade={:.2}->{:.2} delta={:+.2} rank={}->{}",
            delta.entity_id,
            round2(delta.grade_before),
            round2(delta.grade_after),
            round2(delta.grade_delta),
            delta.rank_before,
            delta.rank_after
        );
    }
    for id in &comparison.entities_added {
        println!("A entity {}", quote_id(id));
    }
    for id in &comparison.entities_removed {
        println!("R entity {}", quote_id(id));
    }
    for key in &comparison.criteria_added {
        println!("A criterion {}", key);
    }
    for key in &comparison.criteria_removed {
        println!("R criterion {}", key);
    }
    for change in &comparison.weight_changes {
        println!(
            "V {} weight={:.4}->{:.4}",
            change.key, change.weight_before, change.weight_after
        );
    }
}
