//! # Release Gate
//!
//! Gated release orchestration for Maven projects released with jgitflow and
//! published to Sonatype Central.
//!
//! A release only starts once the project builds and signs, the GitHub token
//! (if any) authenticates, formatting is clean and the registry reports the
//! version as unpublished. It only counts as successful once the registry
//! reports the version as published afterwards.
//!
//! ## Usage
//!
//! ```bash
//! release_gate                 # full release from the project root
//! release_gate --dry-run       # stop after the publication pre-check
//! release_gate --verify-repo   # also check tag and release branch afterwards
//! ```
//!
//! ## Re-running
//!
//! A run that failed before `jgitflow:release-start` can simply be run again.
//! Once the release actions have run, re-running is the operator's call: the
//! branch may already be merged and tagged.

#![deny(unsafe_code)]
#![warn(missing_docs)]
#![warn(rust_2018_idioms)]

pub mod build_gate;
pub mod cli;
pub mod config;
pub mod credentials;
pub mod error;
pub mod github;
pub mod orchestrator;
pub mod process;
pub mod registry;
pub mod state;
pub mod version;

// Re-export main types for public API
pub use build_gate::{BuildGate, IdentityCheck};
pub use cli::{Args, RuntimeConfig};
pub use config::{EnvConfig, ReleaseConfig};
pub use credentials::{CredentialValidator, Credentials};
pub use error::{ErrorCategory, ReleaseError, Result};
pub use github::{GitHubIdentityClient, IdentityProbe};
pub use orchestrator::ReleaseOrchestrator;
pub use process::{ExitOutcome, ProcessRunner, Step, StepRunner};
pub use registry::{PublicationRegistry, PublicationStatus, RegistryClient};
pub use state::{ReleasePhase, ReleaseRun, RunOutcome};
pub use version::{ReleaseIdentity, VersionString};
