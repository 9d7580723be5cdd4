//! CLI interface for trade-lifecycle
//!
//! Provides subcommands for:
//! - `size`: Size a new position
//! - `evaluate`: Run the exit chain and health score for one position
//! - `report`: Performance report over a file of closed trades
//! - `config`: Show the effective configuration

mod evaluate;
mod report;
mod size;

pub use evaluate::EvaluateArgs;
pub use report::{OutputFormat, ReportArgs};
pub use size::SizeArgs;

use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "trade-lifecycle")]
#[command(about = "Position sizing, exit decisions and performance analytics")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Path to configuration file
    #[arg(short, long, default_value = "config.toml")]
    pub config: String,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Size a new position
    Size(SizeArgs),
    /// Evaluate exits and health for a position
    Evaluate(EvaluateArgs),
    /// Performance report from recorded trades
    Report(ReportArgs),
    /// Show configuration
    Config,
}
