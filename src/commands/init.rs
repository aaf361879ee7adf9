//! `cohortgrade init` command - write a default configuration file
//!
//! Writes to `--config` when given, else `./cohortgrade.toml`. An existing
//! file is left alone unless `--force` is passed.

use cohortgrade_core::config::{GradingConfig, LOCAL_CONFIG_FILE};
use cohortgrade_core::error::{GradeError, Result};
use cohortgrade_core::records::format_header_record;
use serde_json::json;

use crate::cli::InitArgs;
use crate::commands::dispatch::CommandContext;
use crate::commands::format::{output_by_format_result, print_json_status};

/// Execute the init command
pub fn execute(ctx: &CommandContext, args: &InitArgs) -> Result<()> {
    let path = match &ctx.cli.config {
        Some(path) if path.is_absolute() => path.clone(),
        Some(path) => ctx.root.join(path),
        None => ctx.root.join(LOCAL_CONFIG_FILE),
    };

    if path.exists() && !args.force {
        return Err(GradeError::already_exists(
            "config file (use --force to overwrite)",
            path.display(),
        ));
    }

    GradingConfig::default().save(&path)?;

    output_by_format_result!(ctx.cli.format,
        json => {
            print_json_status(
                "ok",
                Some("Configuration written"),
                &[("path", json!(path.display().to_string()))],
            )
        },
        human => {
            if !ctx.cli.quiet {
                println!("Wrote default configuration to {}", path.display());
            }
        },
        records => {
            println!(
                "{}",
                format_header_record("init", &[("path", path.display().to_string())])
            );
        }
    )
}
