//! Release command execution.

use crate::cli::RuntimeConfig;
use crate::config::{EnvConfig, ReleaseConfig};
use crate::error::{ReleaseError, Result};
use crate::github::GitHubIdentityClient;
use crate::orchestrator::ReleaseOrchestrator;
use crate::process::ProcessRunner;
use crate::registry::RegistryClient;
use crate::state::{ReleaseRun, RunOutcome};
use std::path::Path;

/// Run a release in `project_dir` and return the exit code
///
/// Ctrl-C ends the run as interrupted (exit 130).
pub async fn execute_release(
    project_dir: &Path,
    release_config: &ReleaseConfig,
    env: &EnvConfig,
    config: &RuntimeConfig,
) -> Result<i32> {
    let steps = ProcessRunner::new(release_config.clone(), project_dir);
    let registry = RegistryClient::new(release_config)?;
    let identity = GitHubIdentityClient::new(release_config)?;

    let orchestrator =
        ReleaseOrchestrator::new(release_config, env, config, &steps, &registry, &identity);
    let mut run = ReleaseRun::new();

    let interrupt = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            log::warn!("Cannot listen for Ctrl-C: {e}");
            std::future::pending::<()>().await;
        }
    };

    match orchestrator.execute_until(&mut run, interrupt).await {
        Ok(()) => {
            report_success(&run, config);
            Ok(0)
        }
        Err(error) => {
            report_failure(&run, &error, config);
            Ok(error.exit_code())
        }
    }
}

fn report_success(run: &ReleaseRun, config: &RuntimeConfig) {
    match run.outcome() {
        Some(RunOutcome::DryRun) => {
            config.success_println("Dry run complete: version is not yet published");
        }
        _ => {
            config.section("Release complete");
            if let Some(post) = run.post_check() {
                config.success_println(&format!(
                    "{} {} confirmed published at {}",
                    post.name,
                    post.version,
                    post.checked_at.to_rfc3339()
                ));
            }
        }
    }
    print_summary(run, config);
}

/// Print the diagnostic, captured tool output and recovery suggestions for a failed run
fn report_failure(run: &ReleaseRun, error: &ReleaseError, config: &RuntimeConfig) {
    if let Some(output) = error.captured_output() {
        config.captured_println(output);
    }
    config.error_println(&format!("{}: {}", error.category(), error));

    if let Some(warning) = partial_release_warning(run) {
        config.error_println(warning);
    }

    let suggestions = error.recovery_suggestions();
    if !suggestions.is_empty() {
        config.println("\n💡 Recovery suggestions:");
        for suggestion in suggestions {
            config.indent(&format!("• {suggestion}"));
        }
    }
    print_summary(run, config);
}

/// Warning owed to the operator once jgitflow may have changed the repository
fn partial_release_warning(run: &ReleaseRun) -> Option<&'static str> {
    run.release_attempted().then_some(
        "jgitflow release actions were launched; re-running this release is not automatically safe",
    )
}

fn print_summary(run: &ReleaseRun, config: &RuntimeConfig) {
    config.println(&format!("\n{}", run.summary()));
    for (label, status) in [("pre-check", run.pre_check()), ("post-check", run.post_check())] {
        if let Some(status) = status {
            config.indent(&format!(
                "{label}: published={} at {}",
                status.published,
                status.checked_at.to_rfc3339()
            ));
        }
    }
    for transition in run.history() {
        log::debug!("{} at {}", transition.phase, transition.at.to_rfc3339());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_warning_before_release_actions() {
        let mut run = ReleaseRun::new();
        run.fail(&ReleaseError::Interrupted);
        assert_eq!(partial_release_warning(&run), None);
    }

    #[test]
    fn test_warning_after_interrupted_release_start() {
        let mut run = ReleaseRun::new();
        run.mark_release_attempted();
        run.fail(&ReleaseError::Interrupted);
        let warning = partial_release_warning(&run).unwrap();
        assert!(warning.contains("not automatically safe"));
    }
}
