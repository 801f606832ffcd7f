//! Command line argument parsing and validation.
//!
//! Run from the project root with no arguments for a normal release; every
//! setting can also come from the environment.

use crate::config::{
    DEFAULT_IDENTITY_URL, DEFAULT_NAMESPACE, DEFAULT_REGISTRY_URL, ReleaseConfig,
};
use clap::Parser;
use std::path::PathBuf;

/// Gated Maven release: verify, start/finish with jgitflow, confirm publication
#[derive(Parser, Debug)]
#[command(
    name = "release_gate",
    version,
    about = "Gated Maven release: verify, start/finish with jgitflow, confirm publication",
    long_about = "Builds and signs the project, checks the GitHub token and formatting, refuses
to release a version the registry already has, runs jgitflow release-start and
release-finish, then confirms the registry reports the version as published.

Required environment:
  OSSRH_TOKEN_NAME, OSSRH_TOKEN_PASSWORD   registry user token
  GPG_KEYNAME, GPG_PASSPHRASE              signing key (passed to Maven by name)
Optional:
  GITHUB_TOKEN | GH_TOKEN | GIT_TOKEN      enables the GitHub identity check"
)]
pub struct Args {
    /// Project directory containing the build tool and settings file
    #[arg(long, value_name = "DIR", default_value = ".", env = "RELEASE_PROJECT_DIR")]
    pub project_dir: PathBuf,

    /// Build tool, relative to the project directory or on PATH
    #[arg(long, value_name = "PATH", default_value = "./mvnw", env = "RELEASE_BUILD_TOOL")]
    pub build_tool: String,

    /// Settings file passed to the build tool
    #[arg(long, value_name = "FILE", default_value = "settings.xml", env = "RELEASE_SETTINGS")]
    pub settings: String,

    /// Registry namespace (groupId)
    #[arg(long, default_value = DEFAULT_NAMESPACE, env = "RELEASE_NAMESPACE")]
    pub namespace: String,

    /// Registry publication-status endpoint
    #[arg(long, value_name = "URL", default_value = DEFAULT_REGISTRY_URL, env = "RELEASE_REGISTRY_URL")]
    pub registry_url: String,

    /// Identity endpoint used to check the GitHub token
    #[arg(long, value_name = "URL", default_value = DEFAULT_IDENTITY_URL, env = "RELEASE_IDENTITY_URL")]
    pub identity_url: String,

    /// Profile activated for jgitflow:release-start
    #[arg(long, value_name = "PROFILE", default_value = "jgitflowStart")]
    pub start_profile: String,

    /// Stop after the publication pre-check
    #[arg(long)]
    pub dry_run: bool,

    /// After publication, check the release tag exists and the release branch is gone
    #[arg(long)]
    pub verify_repo: bool,

    /// Debug logging (HTTP requests, commands)
    #[arg(short, long, conflicts_with = "quiet")]
    pub verbose: bool,

    /// Only print errors
    #[arg(short, long)]
    pub quiet: bool,
}

impl Args {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Validate arguments for consistency
    pub fn validate(&self) -> Result<(), String> {
        if self.build_tool.trim().is_empty() {
            return Err("Build tool must not be empty".to_string());
        }
        if self.namespace.trim().is_empty() {
            return Err("Namespace must not be empty".to_string());
        }
        for (name, value) in [
            ("--registry-url", &self.registry_url),
            ("--identity-url", &self.identity_url),
        ] {
            url::Url::parse(value).map_err(|e| format!("{name} '{value}' is not a URL: {e}"))?;
        }
        Ok(())
    }

    /// Release settings derived from the arguments
    pub fn release_config(&self) -> ReleaseConfig {
        ReleaseConfig {
            build_tool: self.build_tool.clone(),
            settings_file: self.settings.clone(),
            namespace: self.namespace.clone(),
            registry_url: self.registry_url.clone(),
            identity_url: self.identity_url.clone(),
            release_start_profile: self.start_profile.clone(),
            dry_run: self.dry_run,
            verify_repo: self.verify_repo,
        }
    }

    /// Default log filter for the chosen verbosity
    pub fn log_filter(&self) -> &'static str {
        if self.verbose { "debug" } else { "warn" }
    }
}

/// Configuration derived from command line arguments
#[derive(Debug, Clone)]
pub struct RuntimeConfig {
    /// Output manager for colored terminal output
    output: super::OutputManager,
}

impl RuntimeConfig {
    /// Create runtime configuration
    pub fn new(quiet: bool) -> Self {
        Self {
            output: super::OutputManager::new(quiet),
        }
    }

    /// Print a section header
    pub fn section(&self, title: &str) {
        let _ = self.output.section(title);
    }

    /// Print message
    pub fn println(&self, message: &str) {
        let _ = self.output.println(message);
    }

    /// Print error message (always shown)
    pub fn error_println(&self, message: &str) {
        self.output.error(message);
    }

    /// Print warning message
    pub fn warning_println(&self, message: &str) {
        let _ = self.output.warn(message);
    }

    /// Print success message
    pub fn success_println(&self, message: &str) {
        let _ = self.output.success(message);
    }

    /// Print captured tool output to stderr
    pub fn captured_println(&self, output: &str) {
        self.output.captured(output);
    }

    /// Print indented text
    pub fn indent(&self, message: &str) {
        let _ = self.output.indent(message);
    }
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self::new(false)
    }
}

impl From<&Args> for RuntimeConfig {
    fn from(args: &Args) -> Self {
        Self::new(args.quiet)
    }
}
