//! Command dispatch logic for cohortgrade

use std::env;
use std::path::PathBuf;
use std::time::Instant;

use cohortgrade_core::error::Result;
use tracing::debug;

use crate::cli::{Cli, Commands};
use crate::commands;

mod command;

pub use command::{Command, CommandContext, NoCommand};

pub fn run(cli: &Cli, start: Instant) -> Result<()> {
    let root = env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
    debug!(elapsed = ?start.elapsed(), root = %root.display(), "resolve_root");

    let ctx = CommandContext::new(cli, &root, start);

    let result = match &cli.command {
        None => NoCommand.execute(&ctx),
        Some(cmd) => cmd.execute(&ctx),
    };
    debug!(elapsed = ?start.elapsed(), "execute_command");
    result
}

impl Command for Commands {
    fn execute(&self, ctx: &CommandContext) -> Result<()> {
        match self {
            Commands::Init(args) => commands::init::execute(ctx, args),
            Commands::Discover(args) => commands::discover::execute(ctx, args),
            Commands::Grade(args) => commands::grade::execute(ctx, args),
            Commands::Criteria(args) => commands::criteria::execute(ctx, args),
            Commands::Compare(args) => commands::compare::execute(ctx, args),
        }
    }
}
