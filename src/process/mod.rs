//! External build-tool, branching-tool and git invocations.
//!
//! Every subprocess the release needs is a [`Step`]. The orchestrator only sees
//! the [`StepRunner`] trait, so tests can swap in a recorder instead of spawning
//! real processes.

mod runner;

pub use runner::ProcessRunner;

use crate::config::ReleaseConfig;
use crate::credentials::{SIGNING_KEY_VAR, SIGNING_PASSPHRASE_VAR};
use crate::error::Result;
use std::future::Future;

/// One external invocation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Step {
    /// `help:evaluate` of `project.version`
    ResolveVersion,
    /// `help:evaluate` of `project.artifactId`
    ResolveName,
    /// Package and GPG-sign, tests skipped
    BuildAndSign,
    /// Formatting check
    LintCheck,
    /// Branching tool: start the release branch
    ReleaseStart,
    /// Branching tool: merge, tag and remove the release branch
    ReleaseFinish,
    /// Look up a tag on `origin`
    RemoteTagLookup {
        /// Tag name
        tag: String,
    },
    /// Verify a local branch exists
    LocalBranchLookup {
        /// Branch name
        branch: String,
    },
}

/// Program plus arguments for a step
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandSpec {
    /// Program to execute
    pub program: String,
    /// Arguments, never containing secret values
    pub args: Vec<String>,
    /// Inherit the terminal instead of capturing output
    pub stream_output: bool,
}

impl CommandSpec {
    /// Human-readable command line for diagnostics
    pub fn display(&self) -> String {
        std::iter::once(self.program.as_str())
            .chain(self.args.iter().map(String::as_str))
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// How a step ended
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExitOutcome {
    /// Exit code, `None` when killed by a signal
    pub code: Option<i32>,
    /// Standard output alone (empty for streamed steps)
    pub stdout: String,
    /// Stdout and stderr lines in the order they arrived (empty for streamed steps)
    pub output: String,
}

impl ExitOutcome {
    /// Successful exit that printed `stdout` and nothing on stderr
    pub fn ok(stdout: impl Into<String>) -> Self {
        let stdout = stdout.into();
        Self {
            code: Some(0),
            output: stdout.clone(),
            stdout,
        }
    }

    /// Failed exit with the given code and diagnostic output
    pub fn failed(code: i32, output: impl Into<String>) -> Self {
        Self {
            code: Some(code),
            stdout: String::new(),
            output: output.into(),
        }
    }

    /// Exit code zero
    pub fn success(&self) -> bool {
        self.code == Some(0)
    }
}

impl Step {
    /// Build descriptor expression evaluated by resolution steps
    pub fn expression(&self) -> Option<&'static str> {
        match self {
            Step::ResolveVersion => Some("project.version"),
            Step::ResolveName => Some("project.artifactId"),
            _ => None,
        }
    }

    /// Short label for output and error messages
    pub fn label(&self) -> String {
        match self {
            Step::ResolveVersion => "resolve-version".to_string(),
            Step::ResolveName => "resolve-name".to_string(),
            Step::BuildAndSign => "build-and-sign".to_string(),
            Step::LintCheck => "spotless:check".to_string(),
            Step::ReleaseStart => "jgitflow:release-start".to_string(),
            Step::ReleaseFinish => "jgitflow:release-finish".to_string(),
            Step::RemoteTagLookup { tag } => format!("ls-remote {tag}"),
            Step::LocalBranchLookup { branch } => format!("rev-parse {branch}"),
        }
    }

    /// Whether the step changes the repository or remote state
    pub fn is_release_action(&self) -> bool {
        matches!(self, Step::ReleaseStart | Step::ReleaseFinish)
    }

    /// Concrete command for this step under `config`
    pub fn command(&self, config: &ReleaseConfig) -> CommandSpec {
        let tool = config.build_tool.clone();
        let batch = |mut rest: Vec<String>| {
            let mut args = vec![
                "--batch-mode".to_string(),
                "-s".to_string(),
                config.settings_file.clone(),
                "-U".to_string(),
            ];
            args.append(&mut rest);
            args
        };

        let (program, args, stream_output) = match self {
            Step::ResolveVersion | Step::ResolveName => (
                tool,
                vec![
                    "-q".to_string(),
                    "-Dexec.skip=true".to_string(),
                    "help:evaluate".to_string(),
                    format!("-Dexpression={}", self.expression().unwrap_or_default()),
                    "-DforceStdout".to_string(),
                ],
                false,
            ),
            Step::BuildAndSign => (
                tool,
                batch(vec![
                    "-q".to_string(),
                    "package".to_string(),
                    "gpg:sign".to_string(),
                    format!("-Dgpg.keyEnvName={SIGNING_KEY_VAR}"),
                    format!("-Dgpg.passphraseEnvName={SIGNING_PASSPHRASE_VAR}"),
                    "-DskipTests".to_string(),
                ]),
                false,
            ),
            Step::LintCheck => (tool, vec!["spotless:check".to_string()], false),
            Step::ReleaseStart => (
                tool,
                batch(vec![
                    "clean".to_string(),
                    "jgitflow:release-start".to_string(),
                    format!("-P{}", config.release_start_profile),
                ]),
                true,
            ),
            Step::ReleaseFinish => (
                tool,
                batch(vec!["jgitflow:release-finish".to_string()]),
                true,
            ),
            Step::RemoteTagLookup { tag } => (
                "git".to_string(),
                vec![
                    "ls-remote".to_string(),
                    "--tags".to_string(),
                    "origin".to_string(),
                    tag.clone(),
                ],
                false,
            ),
            Step::LocalBranchLookup { branch } => (
                "git".to_string(),
                vec![
                    "rev-parse".to_string(),
                    "--verify".to_string(),
                    "--quiet".to_string(),
                    branch.clone(),
                ],
                false,
            ),
        };

        CommandSpec {
            program,
            args,
            stream_output,
        }
    }
}

/// Capability to execute steps
pub trait StepRunner {
    /// Fail fast if a required command is unavailable
    fn check_tools(&self, tools: &[&str]) -> Result<()>;

    /// Run `step` to completion
    ///
    /// A non-zero exit is an `Ok` outcome; only failure to spawn is an error.
    fn run(&self, step: &Step) -> impl Future<Output = Result<ExitOutcome>>;
}
