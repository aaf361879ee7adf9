//! `cohortgrade criteria` command - show the criteria graph of a saved report

use cohortgrade_core::error::Result;
use cohortgrade_core::graph::Criterion;
use cohortgrade_core::persist::load_report;
use cohortgrade_core::records::{format_criterion_record, format_header_record};

use crate::cli::CriteriaArgs;
use crate::commands::dispatch::CommandContext;
use crate::commands::format::{output_by_format_result, print_json};

/// Execute the criteria command
pub fn execute(ctx: &CommandContext, args: &CriteriaArgs) -> Result<()> {
    let report = load_report(&args.report)?;
    let criteria: Vec<&Criterion> = report
        .graph
        .criteria()
        .filter(|c| !args.rare || c.rare)
        .collect();

    output_by_format_result!(ctx.cli.format,
        json => { print_json(&criteria) },
        human => {
            let meta = report.graph.metadata();
            println!(
                "{} criteria over {} entities (max possible score {:.4})",
                meta.total_criteria, meta.total_entities, meta.max_possible_score
            );
            println!();
            for criterion in &criteria {
                println!(
                    "{:<32} {:<14} {:>3}/{:<3} weight {:.4}{}",
                    criterion.display_name,
                    criterion.category,
                    criterion.count,
                    meta.total_entities,
                    criterion.weight,
                    if criterion.rare { "  rare" } else { "" }
                );
            }
        },
        records => {
            println!(
                "{}",
                format_header_record(
                    "criteria",
                    &[
                        ("entities", report.graph.total_entities().to_string()),
                        ("criteria", criteria.len().to_string()),
                    ],
                )
            );
            for criterion in &criteria {
                println!("{}", format_criterion_record(criterion));
            }
        }
    )
}
