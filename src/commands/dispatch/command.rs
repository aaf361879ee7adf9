//! Command trait and context for dispatching commands

use std::path::PathBuf;
use std::time::Instant;

use cohortgrade_core::config::GradingConfig;
use cohortgrade_core::error::Result;
use tracing::debug;

use crate::cli::Cli;

/// Shared context for command execution
pub struct CommandContext<'a> {
    pub cli: &'a Cli,
    pub root: &'a PathBuf,
    pub start: Instant,
}

impl<'a> CommandContext<'a> {
    pub fn new(cli: &'a Cli, root: &'a PathBuf, start: Instant) -> Self {
        Self { cli, root, start }
    }

    /// Resolve the grading configuration for this invocation
    pub fn load_config(&self) -> Result<GradingConfig> {
        let config = GradingConfig::resolve(self.cli.config.as_deref(), self.root)?;
        debug!(elapsed = ?self.start.elapsed(), "load_config");
        Ok(config)
    }
}

/// Trait for commands that can be executed
pub trait Command {
    fn execute(&self, ctx: &CommandContext) -> Result<()>;
}

/// No-op command (when no subcommand is provided)
pub struct NoCommand;

impl Command for NoCommand {
    fn execute(&self, _ctx: &CommandContext) -> Result<()> {
        println!("cohortgrade {}", env!("CARGO_PKG_VERSION"));
        println!();
        println!("Criteria discovery and relative grading for cohorts.");
        println!();
        println!("Run `cohortgrade --help` for usage information.");
        Ok(())
    }
}
