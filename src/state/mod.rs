//! State tracking for a release run.
//!
//! The run is held in memory for the lifetime of the process and discarded at
//! exit.

mod release_state;

pub use release_state::{PhaseTransition, ReleasePhase, ReleaseRun, RunOutcome};
