//! Error types for release_gate operations.
//!
//! Every failure a run can hit is a variant here, each carrying enough context
//! for a one-line diagnostic plus the recovery suggestions shown to the operator.

use thiserror::Error;

/// Result type alias for release_gate operations
pub type Result<T> = std::result::Result<T, ReleaseError>;

/// Main error type for all release_gate operations
#[derive(Error, Debug)]
pub enum ReleaseError {
    /// Missing tool or credential, detected before anything runs
    #[error(transparent)]
    Configuration(#[from] ConfigurationError),

    /// Project name or version could not be resolved
    #[error(transparent)]
    Identity(#[from] IdentityError),

    /// Build, sign, identity or lint precondition failed
    #[error(transparent)]
    Precondition(#[from] PreconditionError),

    /// Registry query failed
    #[error(transparent)]
    Registry(#[from] RegistryError),

    /// Pre-check found the version already published
    #[error("Artifact '{name}' version '{version}' is already published; bump the version")]
    AlreadyPublished {
        /// Artifact name
        name: String,
        /// Version string
        version: String,
    },

    /// Branching tool start/finish exited non-zero
    #[error("Release action '{action}' failed{}", exit_suffix(.exit_code))]
    ReleaseAction {
        /// Action that failed
        action: String,
        /// Exit code of the branching tool, if it exited normally
        exit_code: Option<i32>,
    },

    /// Post-check did not see the version published
    #[error(
        "Artifact '{name}' version '{version}' was not published: published step did not take effect"
    )]
    PublicationVerification {
        /// Artifact name
        name: String,
        /// Version string
        version: String,
    },

    /// Post-release tag/branch verification failed
    #[error("Repository check failed: {reason}")]
    RepositoryCheck {
        /// Reason for the error
        reason: String,
    },

    /// Network failure talking to an HTTP endpoint other than the registry
    #[error("Request to {endpoint} failed: {reason}")]
    Transport {
        /// Endpoint URL
        endpoint: String,
        /// Reason for the error
        reason: String,
    },

    /// Run state machine was driven out of order
    #[error("Invalid phase transition from {from} to {to}")]
    InvalidTransition {
        /// Phase the run was in
        from: String,
        /// Phase that was requested
        to: String,
    },

    /// A subprocess could not be spawned or awaited
    #[error("Failed to run '{command}': {source}")]
    Spawn {
        /// Command line that failed
        command: String,
        /// Underlying IO error
        #[source]
        source: std::io::Error,
    },

    /// Operator pressed Ctrl-C
    #[error("Aborted by user.")]
    Interrupted,
}

/// Pre-flight configuration errors
#[derive(Error, Debug)]
pub enum ConfigurationError {
    /// Mandatory environment variable absent or blank
    #[error("{variable} is not specified")]
    MissingCredential {
        /// Environment variable name
        variable: String,
    },

    /// Required command is not on PATH
    #[error("Required command '{tool}' not found in PATH")]
    MissingTool {
        /// Tool name
        tool: String,
    },

    /// Relative tool path is missing or lacks the execute bit
    #[error("Required command '{tool}' not found or not executable")]
    ToolNotExecutable {
        /// Tool path as configured
        tool: String,
    },
}

/// Errors resolving the release identity from the build descriptor
#[derive(Error, Debug)]
pub enum IdentityError {
    /// help:evaluate exited non-zero
    #[error("Could not resolve {expression}{}", exit_suffix(.exit_code))]
    ResolutionFailed {
        /// Build descriptor expression being evaluated
        expression: String,
        /// Exit code of the build tool
        exit_code: Option<i32>,
        /// Combined output of the build tool
        output: String,
    },

    /// help:evaluate produced nothing usable
    #[error("Could not resolve {expression}")]
    Empty {
        /// Build descriptor expression being evaluated
        expression: String,
    },
}

/// BuildGate precondition failures
#[derive(Error, Debug)]
pub enum PreconditionError {
    /// Build-and-sign step exited non-zero
    #[error(
        "GPG signing failed. Ensure GPG_KEYNAME and GPG_PASSPHRASE env vars are set and key is available."
    )]
    BuildAndSign {
        /// Exit code of the build tool
        exit_code: Option<i32>,
        /// Combined output of the build tool
        output: String,
    },

    /// Collaboration platform rejected a configured token
    #[error("GitHub authentication failed. Check your token. ({reason})")]
    IdentityRejected {
        /// Reason for the error
        reason: String,
    },

    /// Formatting check exited non-zero
    #[error("Spotless check failed. Run '{fix_command}' to fix.")]
    Lint {
        /// Exit code of the build tool
        exit_code: Option<i32>,
        /// Combined output of the build tool
        output: String,
        /// Command the operator should run to fix formatting
        fix_command: String,
    },
}

/// Registry query errors
#[derive(Error, Debug)]
pub enum RegistryError {
    /// Network call could not complete
    #[error("Registry unreachable at {url}: {reason}")]
    Unreachable {
        /// Request URL
        url: String,
        /// Reason for the error
        reason: String,
    },

    /// Registry rejected the credentials
    #[error("Registry rejected credentials (HTTP {status})")]
    AuthRejected {
        /// HTTP status code
        status: u16,
    },

    /// Query URL could not be built
    #[error("Invalid registry URL '{url}': {reason}")]
    InvalidUrl {
        /// Configured base URL
        url: String,
        /// Reason for the error
        reason: String,
    },
}

/// Operator-facing classification of a failure
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// Missing tool/credential, no side effects yet
    Configuration,
    /// Build/sign/lint failure, no remote state changed
    Precondition,
    /// Pre-check positive, no remote state changed
    AlreadyPublished,
    /// Branching tool failure, remote state may be partially changed
    ReleaseAction,
    /// Post-check negative, release likely partially succeeded
    PublicationVerification,
    /// Network unreachable
    Transport,
    /// Operator interruption
    Interrupted,
}

impl std::fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            ErrorCategory::Configuration => "ConfigurationError",
            ErrorCategory::Precondition => "PreconditionFailure",
            ErrorCategory::AlreadyPublished => "AlreadyPublishedError",
            ErrorCategory::ReleaseAction => "ReleaseActionFailure",
            ErrorCategory::PublicationVerification => "PublicationVerificationFailure",
            ErrorCategory::Transport => "TransportError",
            ErrorCategory::Interrupted => "Interrupted",
        };
        f.write_str(name)
    }
}

fn exit_suffix(code: &Option<i32>) -> String {
    match code {
        Some(code) => format!(" with code {code}"),
        None => " (terminated by signal)".to_string(),
    }
}

impl ReleaseError {
    /// Classify this error for diagnostics
    pub fn category(&self) -> ErrorCategory {
        match self {
            ReleaseError::Configuration(_) | ReleaseError::Identity(_) => {
                ErrorCategory::Configuration
            }
            ReleaseError::InvalidTransition { .. } | ReleaseError::Spawn { .. } => {
                ErrorCategory::Configuration
            }
            ReleaseError::Precondition(_) => ErrorCategory::Precondition,
            ReleaseError::Registry(RegistryError::AuthRejected { .. }) => {
                ErrorCategory::Configuration
            }
            ReleaseError::Registry(RegistryError::InvalidUrl { .. }) => {
                ErrorCategory::Configuration
            }
            ReleaseError::Registry(RegistryError::Unreachable { .. })
            | ReleaseError::Transport { .. } => ErrorCategory::Transport,
            ReleaseError::AlreadyPublished { .. } => ErrorCategory::AlreadyPublished,
            ReleaseError::ReleaseAction { .. } => ErrorCategory::ReleaseAction,
            ReleaseError::PublicationVerification { .. } | ReleaseError::RepositoryCheck { .. } => {
                ErrorCategory::PublicationVerification
            }
            ReleaseError::Interrupted => ErrorCategory::Interrupted,
        }
    }

    /// Process exit code for this error
    ///
    /// Subprocess failures propagate the child's exit code; everything else is 1,
    /// except interruption which is 130.
    pub fn exit_code(&self) -> i32 {
        let propagated = match self {
            ReleaseError::Identity(IdentityError::ResolutionFailed { exit_code, .. })
            | ReleaseError::Precondition(PreconditionError::BuildAndSign { exit_code, .. })
            | ReleaseError::Precondition(PreconditionError::Lint { exit_code, .. })
            | ReleaseError::ReleaseAction { exit_code, .. } => *exit_code,
            ReleaseError::Interrupted => return 130,
            _ => None,
        };
        propagated.filter(|code| *code != 0).unwrap_or(1)
    }

    /// Captured subprocess output worth echoing before the diagnostic
    pub fn captured_output(&self) -> Option<&str> {
        match self {
            ReleaseError::Identity(IdentityError::ResolutionFailed { output, .. })
            | ReleaseError::Precondition(PreconditionError::BuildAndSign { output, .. })
            | ReleaseError::Precondition(PreconditionError::Lint { output, .. }) => {
                Some(output.as_str()).filter(|o| !o.trim().is_empty())
            }
            _ => None,
        }
    }

    /// Get actionable recovery suggestions for this error
    pub fn recovery_suggestions(&self) -> Vec<String> {
        match self {
            ReleaseError::Configuration(ConfigurationError::MissingCredential { variable }) => {
                vec![format!("Export {variable} before running the release")]
            }
            ReleaseError::Configuration(ConfigurationError::ToolNotExecutable { tool }) => vec![
                format!("Run from the project root so '{tool}' resolves"),
                format!("Make it executable: chmod +x {tool}"),
            ],
            ReleaseError::Precondition(PreconditionError::BuildAndSign { .. }) => vec![
                "Export GPG_KEYNAME and GPG_PASSPHRASE".to_string(),
                "Check the key is imported: gpg --list-secret-keys".to_string(),
            ],
            ReleaseError::Precondition(PreconditionError::IdentityRejected { .. }) => vec![
                "Regenerate the token in GITHUB_TOKEN, GH_TOKEN or GIT_TOKEN".to_string(),
                "Unset the token variables to skip the GitHub check".to_string(),
            ],
            ReleaseError::Precondition(PreconditionError::Lint { fix_command, .. }) => {
                vec![format!("Run '{fix_command}' and commit the result")]
            }
            ReleaseError::Registry(RegistryError::AuthRejected { .. }) => vec![
                "Check OSSRH_TOKEN_NAME and OSSRH_TOKEN_PASSWORD hold a valid user token"
                    .to_string(),
            ],
            ReleaseError::AlreadyPublished { .. } => vec![
                "You need to update the version using './mvnw versions:set'".to_string(),
            ],
            ReleaseError::ReleaseAction { .. } => vec![
                "The release branch may exist locally or on origin; inspect before re-running"
                    .to_string(),
                "Re-running after a partial release is not automatically safe".to_string(),
            ],
            ReleaseError::PublicationVerification { .. } | ReleaseError::RepositoryCheck { .. } => {
                vec![
                    "Release actions already ran; inspect the registry, tags and branches manually"
                        .to_string(),
                    "Do not re-run the release for this version until inspected".to_string(),
                ]
            }
            ReleaseError::Interrupted => vec![
                "If jgitflow had started, check for a release branch or tag before re-running"
                    .to_string(),
            ],
            _ => vec![],
        }
    }
}
