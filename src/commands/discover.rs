//! `cohortgrade discover` command - windowed criteria discovery

use cohortgrade_core::error::Result;
use cohortgrade_core::persist::save_vocabulary;
use cohortgrade_core::records::{
    format_evolution_record, format_failure_record, format_header_record,
};
use cohortgrade_core::run::{DiscoveryOutcome, GradingRun};
use cohortgrade_core::signals::open_signal_source;
use serde_json::json;
use tracing::debug;

use crate::cli::DiscoverArgs;
use crate::commands::dispatch::CommandContext;
use crate::commands::format::{output_by_format_result, print_json};

/// Execute the discover command
pub fn execute(ctx: &CommandContext, args: &DiscoverArgs) -> Result<()> {
    let mut config = ctx.load_config()?;
    if let Some(window_size) = args.window_size {
        config.discovery.window_size = window_size;
    }
    config.validate()?;

    let source = open_signal_source(&args.signals)?;
    let entity_ids = source.entity_ids();
    let outcome = GradingRun::new(config).discover(&entity_ids, source.as_ref())?;
    debug!(elapsed = ?ctx.start.elapsed(), criteria = outcome.vocabulary.len(), "discover");

    if let Some(path) = &args.output {
        save_vocabulary(&outcome.vocabulary, path)?;
    }

    output_by_format_result!(ctx.cli.format,
        json => {
            print_json(&json!({
                "window_size": outcome.window_size,
                "entities": entity_ids.len(),
                "criteria": outcome.vocabulary.criteria,
                "evolution": outcome.vocabulary.evolution,
                "failures": outcome.failures,
            }))
        },
        human => { output_human(ctx, &outcome, entity_ids.len(), args); },
        records => { output_records(&outcome, entity_ids.len()); }
    )
}

fn output_human(
    ctx: &CommandContext,
    outcome: &DiscoveryOutcome,
    entities: usize,
    args: &DiscoverArgs,
) {
    let vocabulary = &outcome.vocabulary;
    println!(
        "Discovered {} criteria across {} entities (window size {})",
        vocabulary.len(),
        entities,
        outcome.window_size
    );

    if !ctx.cli.quiet {
        let mut window = 0;
        for event in &vocabulary.evolution {
            if event.window != window {
                window = event.window;
                println!();
                println!("Window {}:", window);
            }
            println!("  [NEW] {} added {}", event.entity_id, event.display_name);
        }
    }

    if !outcome.failures.is_empty() {
        println!();
        println!("Skipped:");
        for failure in &outcome.failures {
            println!("  {}: {}", failure.entity, failure.reason);
        }
    }

    if let Some(path) = &args.output {
        println!();
        println!("Saved vocabulary to {}", path.display());
    }
}

fn output_records(outcome: &DiscoveryOutcome, entities: usize) {
    println!(
        "{}",
        format_header_record(
            "discover",
            &[
                ("entities", entities.to_string()),
                ("criteria", outcome.vocabulary.len().to_string()),
                ("window_size", outcome.window_size.to_string()),
            ],
        )
    );
    for event in &outcome.vocabulary.evolution {
        println!("{}", format_evolution_record(event));
    }
    for failure in &outcome.failures {
        println!("{}", format_failure_record(failure));
    }
}
