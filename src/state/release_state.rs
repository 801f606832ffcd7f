//! In-memory release run state.
//!
//! A run lives for one process. Nothing here is written to disk; re-running the
//! tool is the only recovery path.

use crate::credentials::Credentials;
use crate::error::{ErrorCategory, ReleaseError, Result};
use crate::registry::PublicationStatus;
use crate::version::ReleaseIdentity;

/// Phase of the release run
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ReleasePhase {
    /// Nothing done yet
    Init,
    /// Name and version resolved
    IdentityResolved,
    /// Credentials bound to the run
    CredentialsValidated,
    /// Build, sign, identity and lint checks passed
    BuildVerified,
    /// Registry confirmed the version is not yet published
    PublicationPrechecked,
    /// Branching tool started the release
    ReleaseStarted,
    /// Branching tool finished the release
    ReleaseFinished,
    /// Registry confirmed publication
    PublicationPostchecked,
    /// Release verified
    Success,
    /// Run aborted
    Failed,
}

impl ReleasePhase {
    /// The only phase a successful step may move to
    pub fn successor(self) -> Option<ReleasePhase> {
        match self {
            ReleasePhase::Init => Some(ReleasePhase::IdentityResolved),
            ReleasePhase::IdentityResolved => Some(ReleasePhase::CredentialsValidated),
            ReleasePhase::CredentialsValidated => Some(ReleasePhase::BuildVerified),
            ReleasePhase::BuildVerified => Some(ReleasePhase::PublicationPrechecked),
            ReleasePhase::PublicationPrechecked => Some(ReleasePhase::ReleaseStarted),
            ReleasePhase::ReleaseStarted => Some(ReleasePhase::ReleaseFinished),
            ReleasePhase::ReleaseFinished => Some(ReleasePhase::PublicationPostchecked),
            ReleasePhase::PublicationPostchecked => Some(ReleasePhase::Success),
            ReleasePhase::Success | ReleasePhase::Failed => None,
        }
    }

    /// Whether the run has ended
    pub fn is_terminal(self) -> bool {
        matches!(self, ReleasePhase::Success | ReleasePhase::Failed)
    }
}

impl std::fmt::Display for ReleasePhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ReleasePhase::Init => write!(f, "INIT"),
            ReleasePhase::IdentityResolved => write!(f, "IDENTITY_RESOLVED"),
            ReleasePhase::CredentialsValidated => write!(f, "CREDENTIALS_VALIDATED"),
            ReleasePhase::BuildVerified => write!(f, "BUILD_VERIFIED"),
            ReleasePhase::PublicationPrechecked => write!(f, "PUBLICATION_PRECHECKED"),
            ReleasePhase::ReleaseStarted => write!(f, "RELEASE_STARTED"),
            ReleasePhase::ReleaseFinished => write!(f, "RELEASE_FINISHED"),
            ReleasePhase::PublicationPostchecked => write!(f, "PUBLICATION_POSTCHECKED"),
            ReleasePhase::Success => write!(f, "SUCCESS"),
            ReleasePhase::Failed => write!(f, "FAILED"),
        }
    }
}

/// How the run ended
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunOutcome {
    /// Post-check confirmed publication
    Released,
    /// Stopped after the pre-check on request
    DryRun,
    /// Aborted
    Failed {
        /// Failure classification
        category: ErrorCategory,
        /// One-line diagnostic
        message: String,
        /// Phase the run was in when it failed
        phase: ReleasePhase,
    },
}

/// A phase change with its timestamp
#[derive(Debug, Clone)]
pub struct PhaseTransition {
    /// Phase entered
    pub phase: ReleasePhase,
    /// When it was entered
    pub at: chrono::DateTime<chrono::Utc>,
}

/// Everything one release invocation knows
#[derive(Debug)]
pub struct ReleaseRun {
    phase: ReleasePhase,
    identity: Option<ReleaseIdentity>,
    credentials: Option<Credentials>,
    pre_check: Option<PublicationStatus>,
    post_check: Option<PublicationStatus>,
    outcome: Option<RunOutcome>,
    release_attempted: bool,
    started_at: chrono::DateTime<chrono::Utc>,
    history: Vec<PhaseTransition>,
}

impl Default for ReleaseRun {
    fn default() -> Self {
        Self::new()
    }
}

impl ReleaseRun {
    /// Fresh run in `INIT`
    pub fn new() -> Self {
        let now = chrono::Utc::now();
        Self {
            phase: ReleasePhase::Init,
            identity: None,
            credentials: None,
            pre_check: None,
            post_check: None,
            outcome: None,
            release_attempted: false,
            started_at: now,
            history: vec![PhaseTransition {
                phase: ReleasePhase::Init,
                at: now,
            }],
        }
    }

    /// Current phase
    pub fn phase(&self) -> ReleasePhase {
        self.phase
    }

    /// Resolved identity
    pub fn identity(&self) -> Option<&ReleaseIdentity> {
        self.identity.as_ref()
    }

    /// Credentials bound to the run
    pub fn credentials(&self) -> Option<&Credentials> {
        self.credentials.as_ref()
    }

    /// Whether a branching-tool action was launched, whatever its result
    pub fn release_attempted(&self) -> bool {
        self.release_attempted
    }

    /// Note that a branching-tool action is about to run
    ///
    /// From here on a failure or interruption may leave branches or tags behind.
    pub fn mark_release_attempted(&mut self) {
        self.release_attempted = true;
    }

    /// Registry snapshot taken before the release actions
    pub fn pre_check(&self) -> Option<&PublicationStatus> {
        self.pre_check.as_ref()
    }

    /// Registry snapshot taken after the release actions
    pub fn post_check(&self) -> Option<&PublicationStatus> {
        self.post_check.as_ref()
    }

    /// Terminal outcome, once reached
    pub fn outcome(&self) -> Option<&RunOutcome> {
        self.outcome.as_ref()
    }

    /// Phases entered so far, in order
    pub fn history(&self) -> &[PhaseTransition] {
        &self.history
    }

    /// Move to `next`, which must be the successor of the current phase
    pub fn advance(&mut self, next: ReleasePhase) -> Result<()> {
        if self.phase.successor() != Some(next) {
            return Err(ReleaseError::InvalidTransition {
                from: self.phase.to_string(),
                to: next.to_string(),
            });
        }
        self.enter(next);
        Ok(())
    }

    /// Record the resolved identity and enter `IDENTITY_RESOLVED`
    ///
    /// The identity is fixed from here on.
    pub fn resolve_identity(&mut self, identity: ReleaseIdentity) -> Result<()> {
        self.advance(ReleasePhase::IdentityResolved)?;
        self.identity = Some(identity);
        Ok(())
    }

    /// Bind credentials and enter `CREDENTIALS_VALIDATED`
    pub fn bind_credentials(&mut self, credentials: Credentials) -> Result<()> {
        self.advance(ReleasePhase::CredentialsValidated)?;
        self.credentials = Some(credentials);
        Ok(())
    }

    /// Record the pre-check snapshot
    pub fn record_pre_check(&mut self, status: PublicationStatus) {
        self.pre_check = Some(status);
    }

    /// Record the post-check snapshot
    pub fn record_post_check(&mut self, status: PublicationStatus) {
        self.post_check = Some(status);
    }

    /// End the run successfully
    pub fn succeed(&mut self) -> Result<()> {
        self.advance(ReleasePhase::Success)?;
        self.outcome = Some(RunOutcome::Released);
        Ok(())
    }

    /// End a dry run after the pre-check
    pub fn finish_dry_run(&mut self) -> Result<()> {
        if self.phase != ReleasePhase::PublicationPrechecked {
            return Err(ReleaseError::InvalidTransition {
                from: self.phase.to_string(),
                to: "DRY_RUN".to_string(),
            });
        }
        self.outcome = Some(RunOutcome::DryRun);
        Ok(())
    }

    /// Move straight to `FAILED`, remembering where it happened
    pub fn fail(&mut self, error: &ReleaseError) {
        if self.phase.is_terminal() {
            return;
        }
        let phase = self.phase;
        self.enter(ReleasePhase::Failed);
        self.outcome = Some(RunOutcome::Failed {
            category: error.category(),
            message: error.to_string(),
            phase,
        });
    }

    /// Whether any phase at or past `phase` was entered
    pub fn reached(&self, phase: ReleasePhase) -> bool {
        self.history
            .iter()
            .any(|t| t.phase != ReleasePhase::Failed && t.phase >= phase)
    }

    /// Time since the run started
    pub fn elapsed_time(&self) -> chrono::Duration {
        chrono::Utc::now() - self.started_at
    }

    /// One-line summary of where the run stands
    pub fn summary(&self) -> String {
        let target = self
            .identity
            .as_ref()
            .map(|id| id.to_string())
            .unwrap_or_else(|| "<unresolved>".to_string());
        format!(
            "Release {} ({}) - {} elapsed",
            target,
            self.phase,
            format_duration(self.elapsed_time())
        )
    }

    fn enter(&mut self, phase: ReleasePhase) {
        log::debug!("{} -> {}", self.phase, phase);
        self.phase = phase;
        self.history.push(PhaseTransition {
            phase,
            at: chrono::Utc::now(),
        });
    }
}

fn format_duration(duration: chrono::Duration) -> String {
    let total_seconds = duration.num_seconds();
    let hours = total_seconds / 3600;
    let minutes = (total_seconds % 3600) / 60;
    let seconds = total_seconds % 60;

    if hours > 0 {
        format!("{}h {}m {}s", hours, minutes, seconds)
    } else if minutes > 0 {
        format!("{}m {}s", minutes, seconds)
    } else {
        format!("{}s", seconds)
    }
}
