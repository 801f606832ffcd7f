//! Release Gate - gated Maven release with pre- and post-publication checks.

use release_gate::cli;
use release_gate::cli::OutputManager;
use std::process;

#[tokio::main]
async fn main() {
    let args = cli::parse_args();

    env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or(args.log_filter()),
    )
    .init();

    match cli::run(args).await {
        Ok(exit_code) => {
            process::exit(exit_code);
        }
        Err(e) => {
            let output = OutputManager::new(false);
            output.error(&format!("Fatal error: {e}"));
            process::exit(e.exit_code());
        }
    }
}
