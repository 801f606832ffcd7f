//! Local preconditions that must hold before the registry is consulted.
//!
//! Order: build-and-sign, GitHub identity check, formatting check. The first
//! failure stops the gate; nothing remote has been touched at that point.

use crate::cli::RuntimeConfig;
use crate::config::ReleaseConfig;
use crate::credentials::Credentials;
use crate::error::{PreconditionError, Result};
use crate::github::IdentityProbe;
use crate::process::{Step, StepRunner};

/// Result of the identity check
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IdentityCheck {
    /// Token accepted for this login
    Authenticated(String),
    /// No token configured
    Skipped,
}

/// Runs build, identity and lint preconditions in order
pub struct BuildGate<'a, S, I> {
    config: &'a ReleaseConfig,
    output: &'a RuntimeConfig,
    steps: &'a S,
    identity: &'a I,
}

impl<'a, S: StepRunner, I: IdentityProbe> BuildGate<'a, S, I> {
    /// Gate using `steps` for subprocesses and `identity` for the token check
    pub fn new(
        config: &'a ReleaseConfig,
        output: &'a RuntimeConfig,
        steps: &'a S,
        identity: &'a I,
    ) -> Self {
        Self {
            config,
            output,
            steps,
            identity,
        }
    }

    /// Run all three checks
    pub async fn verify(&self, credentials: &Credentials) -> Result<IdentityCheck> {
        self.build_and_sign().await?;
        let identity = self.identity_check(credentials).await?;
        self.lint_check().await?;
        Ok(identity)
    }

    /// Package and sign; signing material reaches the build tool by variable name
    pub async fn build_and_sign(&self) -> Result<()> {
        self.output
            .section("Verifying GPG signing setup by building and signing");
        let outcome = self.steps.run(&Step::BuildAndSign).await?;
        if !outcome.success() {
            return Err(PreconditionError::BuildAndSign {
                exit_code: outcome.code,
                output: outcome.output,
            }
            .into());
        }
        self.output.success_println("Build and signing succeeded");
        Ok(())
    }

    /// Check the GitHub token, or skip when none is configured
    pub async fn identity_check(&self, credentials: &Credentials) -> Result<IdentityCheck> {
        self.output.section("Checking GitHub token authentication");
        let Some(token) = credentials.vcs_token() else {
            self.output.indent("Skipped: no GitHub token configured");
            return Ok(IdentityCheck::Skipped);
        };

        let login = self.identity.authenticated_login(token).await?;
        self.output
            .success_println(&format!("Authenticated to GitHub as: {login}"));
        Ok(IdentityCheck::Authenticated(login))
    }

    /// Formatting check; the fix command is part of the failure
    pub async fn lint_check(&self) -> Result<()> {
        self.output.section("Checking spotless");
        let outcome = self.steps.run(&Step::LintCheck).await?;
        if !outcome.success() {
            return Err(PreconditionError::Lint {
                exit_code: outcome.code,
                output: outcome.output,
                fix_command: self.config.lint_fix_command(),
            }
            .into());
        }
        self.output.success_println("Formatting is clean");
        Ok(())
    }
}
