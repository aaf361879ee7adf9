//! `cohortgrade grade` command - grade a cohort relative to its best performer
//!
//! Entities whose signals fail to load are listed and skipped. The command
//! fails only when no entity could be graded.

mod human;
mod records;

use cohortgrade_core::error::Result;
use cohortgrade_core::persist::save_report;
use cohortgrade_core::run::GradingRun;
use cohortgrade_core::signals::open_signal_source;
use tracing::{debug, warn};

use crate::cli::GradeArgs;
use crate::commands::dispatch::CommandContext;
use crate::commands::format::{output_by_format_result, print_json};

/// Execute the grade command
pub fn execute(ctx: &CommandContext, args: &GradeArgs) -> Result<()> {
    let mut config = ctx.load_config()?;
    args.policy.apply(&mut config);
    config.validate()?;

    let source = open_signal_source(&args.signals)?;
    let entity_ids = source.entity_ids();
    debug!(elapsed = ?ctx.start.elapsed(), entities = entity_ids.len(), "open_signals");

    let report = GradingRun::new(config).execute(&entity_ids, source.as_ref())?;
    debug!(elapsed = ?ctx.start.elapsed(), "grading_run");

    for failure in &report.failures {
        warn!(entity = %failure.entity, stage = %failure.stage, "entity_not_graded");
    }

    if let Some(path) = &args.output {
        save_report(&report, path)?;
    }

    let shown = args.top.unwrap_or(report.grades.len()).min(report.grades.len());

    output_by_format_result!(ctx.cli.format,
        json => { print_json(&report) },
        human => { human::output_human(ctx.cli, &report, shown, args.output.as_deref()); },
        records => { records::output_records(&report, shown); }
    )
}
