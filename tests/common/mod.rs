//! Shared fakes for orchestrator tests.

#![allow(dead_code)]

use release_gate::error::{PreconditionError, ReleaseError, Result};
use release_gate::{
    Credentials, EnvConfig, ExitOutcome, IdentityProbe, PublicationRegistry, PublicationStatus,
    ReleaseIdentity, Step, StepRunner,
};
use std::cell::{Cell, RefCell};
use std::collections::{HashMap, VecDeque};

/// Environment with every credential the release needs, minus the GitHub token
pub fn release_env() -> EnvConfig {
    EnvConfig::from_pairs([
        ("OSSRH_TOKEN_NAME", "user"),
        ("OSSRH_TOKEN_PASSWORD", "secret"),
        ("GPG_KEYNAME", "ABCDEF12"),
        ("GPG_PASSPHRASE", "passphrase"),
    ])
}

/// `release_env` plus a GitHub token
pub fn release_env_with_token() -> EnvConfig {
    EnvConfig::from_pairs([
        ("OSSRH_TOKEN_NAME", "user"),
        ("OSSRH_TOKEN_PASSWORD", "secret"),
        ("GPG_KEYNAME", "ABCDEF12"),
        ("GPG_PASSPHRASE", "passphrase"),
        ("GITHUB_TOKEN", "ghp_test"),
    ])
}

/// Records every step and answers with scripted outcomes
pub struct RecordingRunner {
    calls: RefCell<Vec<Step>>,
    outcomes: RefCell<HashMap<String, ExitOutcome>>,
    hang_on: RefCell<Option<Step>>,
    tool_checks: Cell<usize>,
}

impl RecordingRunner {
    /// Runner resolving `name` / `raw_version`, every other step exiting 0
    pub fn new(name: &str, raw_version: &str) -> Self {
        let runner = Self {
            calls: RefCell::new(Vec::new()),
            outcomes: RefCell::new(HashMap::new()),
            hang_on: RefCell::new(None),
            tool_checks: Cell::new(0),
        };
        runner.respond(&Step::ResolveVersion, ExitOutcome::ok(format!("{raw_version}\n")));
        runner.respond(&Step::ResolveName, ExitOutcome::ok(format!("{name}\n")));
        runner
    }

    /// Script the outcome of `step`
    pub fn respond(&self, step: &Step, outcome: ExitOutcome) {
        self.outcomes.borrow_mut().insert(step.label(), outcome);
    }

    /// Make `step` never finish, like a tool waiting on the terminal
    pub fn hang_on(&self, step: Step) {
        *self.hang_on.borrow_mut() = Some(step);
    }

    /// Steps run so far
    pub fn calls(&self) -> Vec<Step> {
        self.calls.borrow().clone()
    }

    /// Whether `step` was run
    pub fn ran(&self, step: &Step) -> bool {
        self.calls.borrow().contains(step)
    }

    /// Whether either branching-tool action was run
    pub fn ran_release_action(&self) -> bool {
        self.calls.borrow().iter().any(Step::is_release_action)
    }

    /// Number of tool availability checks
    pub fn tool_checks(&self) -> usize {
        self.tool_checks.get()
    }
}

impl StepRunner for RecordingRunner {
    fn check_tools(&self, _tools: &[&str]) -> Result<()> {
        self.tool_checks.set(self.tool_checks.get() + 1);
        Ok(())
    }

    async fn run(&self, step: &Step) -> Result<ExitOutcome> {
        self.calls.borrow_mut().push(step.clone());
        let hangs = self.hang_on.borrow().as_ref() == Some(step);
        if hangs {
            std::future::pending::<()>().await;
        }
        Ok(self
            .outcomes
            .borrow()
            .get(&step.label())
            .cloned()
            .unwrap_or_else(|| ExitOutcome::ok("")))
    }
}

/// Registry answering from a queue of `published` flags
pub struct ScriptedRegistry {
    answers: RefCell<VecDeque<bool>>,
    queries: RefCell<Vec<(String, String)>>,
}

impl ScriptedRegistry {
    /// Registry answering `answers` in order
    pub fn new(answers: &[bool]) -> Self {
        Self {
            answers: RefCell::new(answers.iter().copied().collect()),
            queries: RefCell::new(Vec::new()),
        }
    }

    /// `(name, version)` of every query made
    pub fn queries(&self) -> Vec<(String, String)> {
        self.queries.borrow().clone()
    }
}

impl PublicationRegistry for ScriptedRegistry {
    async fn query_published(
        &self,
        identity: &ReleaseIdentity,
        _credentials: &Credentials,
    ) -> Result<PublicationStatus> {
        self.queries.borrow_mut().push((
            identity.name().to_string(),
            identity.version().to_string(),
        ));
        let published = self
            .answers
            .borrow_mut()
            .pop_front()
            .expect("registry queried more often than scripted");
        Ok(PublicationStatus::snapshot(identity, published))
    }
}

/// Identity probe with a fixed answer
pub struct FakeIdentity {
    login: Option<String>,
    calls: Cell<usize>,
}

impl FakeIdentity {
    /// Probe accepting any token as `login`
    pub fn accepting(login: &str) -> Self {
        Self {
            login: Some(login.to_string()),
            calls: Cell::new(0),
        }
    }

    /// Probe rejecting every token
    pub fn rejecting() -> Self {
        Self {
            login: None,
            calls: Cell::new(0),
        }
    }

    /// Number of identity checks made
    pub fn calls(&self) -> usize {
        self.calls.get()
    }
}

impl IdentityProbe for FakeIdentity {
    async fn authenticated_login(&self, _token: &str) -> Result<String> {
        self.calls.set(self.calls.get() + 1);
        self.login.clone().ok_or_else(|| {
            ReleaseError::from(PreconditionError::IdentityRejected {
                reason: "HTTP 401".to_string(),
            })
        })
    }
}
