//! CLI argument parsing for cohortgrade
//!
//! Global flags: --config, --format, --quiet, --verbose, --log-level, --log-json

pub mod args;
pub mod parse;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

pub use args::{CompareArgs, CriteriaArgs, DiscoverArgs, GradeArgs, InitArgs};
pub use cohortgrade_core::format::OutputFormat;
use parse::parse_format;

/// Cohortgrade - criteria discovery and relative grading for cohorts
#[derive(Parser, Debug)]
#[command(name = "cohortgrade")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Configuration file (default: ./cohortgrade.toml, then the global config)
    #[arg(long, global = true, env = "COHORTGRADE_CONFIG")]
    pub config: Option<PathBuf>,

    /// Output format (human, json, records)
    #[arg(long, global = true, value_parser = parse_format, default_value = "human")]
    pub format: OutputFormat,

    /// Suppress non-essential output
    #[arg(long, short, global = true)]
    pub quiet: bool,

    /// Enable debug logging
    #[arg(long, short, global = true)]
    pub verbose: bool,

    /// Log level or filter directive (e.g. `trace`, `cohortgrade_core=debug`)
    #[arg(long, global = true)]
    pub log_level: Option<String>,

    /// Emit logs as JSON
    #[arg(long, global = true)]
    pub log_json: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Write a default configuration file
    Init(InitArgs),

    /// Discover the criteria vocabulary of a cohort
    Discover(DiscoverArgs),

    /// Grade a cohort relative to its best performer
    Grade(GradeArgs),

    /// Show the criteria graph of a saved report
    Criteria(CriteriaArgs),

    /// Compare two saved reports
    Compare(CompareArgs),
}
