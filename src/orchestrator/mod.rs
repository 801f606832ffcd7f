//! Release orchestration state machine.
//!
//! Drives a [`ReleaseRun`] through
//! `INIT → IDENTITY_RESOLVED → CREDENTIALS_VALIDATED → BUILD_VERIFIED →
//! PUBLICATION_PRECHECKED → RELEASE_STARTED → RELEASE_FINISHED →
//! PUBLICATION_POSTCHECKED → SUCCESS`, dropping to `FAILED` on the first error.
//!
//! Credentials and tool availability are checked while still in `INIT`, before
//! the first subprocess. The registry is queried twice with the identity
//! captured at the start; the release actions only run when the first query
//! says the version is unpublished, and the run only succeeds when the second
//! says it is published. Nothing is rolled back and nothing is retried.

use crate::build_gate::BuildGate;
use crate::cli::RuntimeConfig;
use crate::config::{EnvConfig, ReleaseConfig};
use crate::credentials::{CredentialValidator, Credentials};
use crate::error::{ReleaseError, Result};
use crate::github::IdentityProbe;
use crate::process::{Step, StepRunner};
use crate::registry::PublicationRegistry;
use crate::state::{ReleasePhase, ReleaseRun};
use crate::version::ReleaseIdentity;
use std::future::Future;

/// Ties credentials, build gate, registry and branching tool together
pub struct ReleaseOrchestrator<'a, S, R, I> {
    config: &'a ReleaseConfig,
    env: &'a EnvConfig,
    output: &'a RuntimeConfig,
    steps: &'a S,
    registry: &'a R,
    identity: &'a I,
}

impl<'a, S, R, I> ReleaseOrchestrator<'a, S, R, I>
where
    S: StepRunner,
    R: PublicationRegistry,
    I: IdentityProbe,
{
    /// Orchestrator over the given collaborators
    pub fn new(
        config: &'a ReleaseConfig,
        env: &'a EnvConfig,
        output: &'a RuntimeConfig,
        steps: &'a S,
        registry: &'a R,
        identity: &'a I,
    ) -> Self {
        Self {
            config,
            env,
            output,
            steps,
            registry,
            identity,
        }
    }

    /// Drive `run` to a terminal state
    ///
    /// On error the run is moved to `FAILED` before the error is returned.
    pub async fn execute(&self, run: &mut ReleaseRun) -> Result<()> {
        self.execute_until(run, std::future::pending()).await
    }

    /// Drive `run` like [`execute`](Self::execute), giving up as
    /// [`ReleaseError::Interrupted`] as soon as `interrupt` completes
    ///
    /// The in-flight step is dropped, which kills its subprocess.
    pub async fn execute_until<F>(&self, run: &mut ReleaseRun, interrupt: F) -> Result<()>
    where
        F: Future<Output = ()>,
    {
        let result = tokio::select! {
            result = self.drive(run) => result,
            () = interrupt => Err(ReleaseError::Interrupted),
        };
        if let Err(ref error) = result {
            log::debug!("Run failed in {}: {}", run.phase(), error);
            run.fail(error);
        }
        result
    }

    async fn drive(&self, run: &mut ReleaseRun) -> Result<()> {
        // INIT: pure checks only, nothing spawned or sent yet
        self.output.section("Validating OSSRH credentials");
        let validated = CredentialValidator.validate(self.env)?;
        for warning in &validated.warnings {
            self.output.warning_println(warning);
        }
        self.steps.check_tools(&self.config.required_tools())?;

        self.output.section("Resolving project identity");
        let identity = ReleaseIdentity::resolve(self.steps).await?;
        self.output.indent(&format!("name={}", identity.name()));
        self.output.indent(&format!("version={}", identity.version()));
        run.resolve_identity(identity.clone())?;

        run.bind_credentials(validated.credentials)?;
        let credentials = bound_credentials(run)?;

        BuildGate::new(self.config, self.output, self.steps, self.identity)
            .verify(&credentials)
            .await?;
        run.advance(ReleasePhase::BuildVerified)?;

        self.output.section(&format!(
            "Checking if version {} is already published on Central",
            identity.version()
        ));
        let pre_check = self.registry.query_published(&identity, &credentials).await?;
        self.output.indent(&format!("published={}", pre_check.published));
        let already_published = pre_check.published;
        run.record_pre_check(pre_check);
        run.advance(ReleasePhase::PublicationPrechecked)?;

        if already_published {
            return Err(ReleaseError::AlreadyPublished {
                name: identity.name().to_string(),
                version: identity.version().to_string(),
            });
        }

        if self.config.dry_run {
            self.output
                .warning_println("Dry run enabled: release-start and release-finish skipped");
            return run.finish_dry_run();
        }

        self.output.section("Starting release via jgitflow");
        run.mark_release_attempted();
        self.release_action(Step::ReleaseStart).await?;
        run.advance(ReleasePhase::ReleaseStarted)?;

        self.output.section("Finishing release via jgitflow");
        self.release_action(Step::ReleaseFinish).await?;
        run.advance(ReleasePhase::ReleaseFinished)?;

        // Same identity as the pre-check; nothing is re-resolved after the branching tool ran.
        self.output.section(&format!(
            "Re-checking publication status for version {}",
            identity.version()
        ));
        let post_check = self.registry.query_published(&identity, &credentials).await?;
        self.output.indent(&format!("published={}", post_check.published));
        let published = post_check.published;
        run.record_post_check(post_check);
        run.advance(ReleasePhase::PublicationPostchecked)?;

        if !published {
            return Err(ReleaseError::PublicationVerification {
                name: identity.name().to_string(),
                version: identity.version().to_string(),
            });
        }

        if self.config.verify_repo {
            self.verify_repository(&identity).await?;
        }

        run.succeed()
    }

    async fn release_action(&self, step: Step) -> Result<()> {
        let outcome = self.steps.run(&step).await?;
        if !outcome.success() {
            return Err(ReleaseError::ReleaseAction {
                action: step.label(),
                exit_code: outcome.code,
            });
        }
        self.output.success_println(&format!("{} completed", step.label()));
        Ok(())
    }

    async fn verify_repository(&self, identity: &ReleaseIdentity) -> Result<()> {
        self.output.section("Post-release repo checks");
        let version = identity.version().as_str();

        let tag = self
            .steps
            .run(&Step::RemoteTagLookup {
                tag: version.to_string(),
            })
            .await?;
        if !tag.success() || tag.stdout.trim().is_empty() {
            return Err(ReleaseError::RepositoryCheck {
                reason: format!("Tag refs/tags/{version} not created on origin"),
            });
        }
        self.output
            .success_println(&format!("Tag {version} present on origin"));

        let branch = format!("release/{version}");
        let lookup = self
            .steps
            .run(&Step::LocalBranchLookup {
                branch: branch.clone(),
            })
            .await?;
        if lookup.success() {
            return Err(ReleaseError::RepositoryCheck {
                reason: format!("Branch {branch} not removed"),
            });
        }
        self.output
            .success_println(&format!("Branch {branch} removed"));
        Ok(())
    }
}

fn bound_credentials(run: &ReleaseRun) -> Result<Credentials> {
    run.credentials()
        .cloned()
        .ok_or_else(|| ReleaseError::InvalidTransition {
            from: run.phase().to_string(),
            to: ReleasePhase::CredentialsValidated.to_string(),
        })
}
