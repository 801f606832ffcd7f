//! Command execution.
//!
//! Turns parsed arguments into a configured release run and maps its result to
//! a process exit code.

mod release;

use crate::cli::{Args, RuntimeConfig};
use crate::config::EnvConfig;
use crate::error::Result;

pub use release::execute_release;

/// Execute the release described by `args`, returning the process exit code
pub async fn execute_command(args: Args) -> Result<i32> {
    if let Err(validation_error) = args.validate() {
        let output = super::OutputManager::new(false);
        output.error(&format!("Invalid arguments: {validation_error}"));
        return Ok(1);
    }

    let config = RuntimeConfig::from(&args);
    let release_config = args.release_config();
    let env = EnvConfig::from_process();

    execute_release(&args.project_dir, &release_config, &env, &config).await
}
