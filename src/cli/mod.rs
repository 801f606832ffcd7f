//! Command line interface for release_gate.
//!
//! Argument parsing, colored operator output and the release command.

mod args;
pub mod commands;
mod output;

pub use args::{Args, RuntimeConfig};
pub use commands::execute_command;
pub use output::OutputManager;

use crate::error::Result;

/// Main CLI entry point
pub async fn run(args: Args) -> Result<i32> {
    execute_command(args).await
}

/// Parse arguments without executing
pub fn parse_args() -> Args {
    Args::parse_args()
}
