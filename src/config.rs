//! Run configuration: settings from the command line and an environment snapshot.
//!
//! Both are built once in `main` and handed to every component by reference.

use std::collections::HashMap;

/// Default registry endpoint answering "is this (namespace, name, version) published"
pub const DEFAULT_REGISTRY_URL: &str = "https://central.sonatype.com/api/v1/publisher/published";

/// Default collaboration-platform identity endpoint
pub const DEFAULT_IDENTITY_URL: &str = "https://api.github.com/user";

/// Default registry namespace (Maven groupId)
pub const DEFAULT_NAMESPACE: &str = "com.github.squirrelgrip";

/// Settings for one release run
#[derive(Debug, Clone)]
pub struct ReleaseConfig {
    /// Build tool used for every subprocess step (usually the Maven wrapper)
    pub build_tool: String,
    /// Settings file handed to the build tool with `-s`
    pub settings_file: String,
    /// Registry namespace the artifact is published under
    pub namespace: String,
    /// Registry publication-status endpoint
    pub registry_url: String,
    /// Identity endpoint for the token check
    pub identity_url: String,
    /// Build profile activated for the release-start action
    pub release_start_profile: String,
    /// Stop after the pre-check without touching the branching tool
    pub dry_run: bool,
    /// Check tag and release branch after a verified publication
    pub verify_repo: bool,
}

impl Default for ReleaseConfig {
    fn default() -> Self {
        Self {
            build_tool: "./mvnw".to_string(),
            settings_file: "settings.xml".to_string(),
            namespace: DEFAULT_NAMESPACE.to_string(),
            registry_url: DEFAULT_REGISTRY_URL.to_string(),
            identity_url: DEFAULT_IDENTITY_URL.to_string(),
            release_start_profile: "jgitflowStart".to_string(),
            dry_run: false,
            verify_repo: false,
        }
    }
}

impl ReleaseConfig {
    /// Commands that must be available before anything runs
    pub fn required_tools(&self) -> Vec<&str> {
        let mut tools = vec![self.build_tool.as_str(), "gpg"];
        if self.verify_repo {
            tools.push("git");
        }
        tools
    }

    /// Command the operator runs to fix formatting
    pub fn lint_fix_command(&self) -> String {
        format!("{} spotless:apply", self.build_tool)
    }
}

/// Snapshot of the process environment taken at startup
#[derive(Clone, Default)]
pub struct EnvConfig {
    vars: HashMap<String, String>,
}

impl EnvConfig {
    /// Capture the current process environment
    pub fn from_process() -> Self {
        Self {
            vars: std::env::vars().collect(),
        }
    }

    /// Build from explicit pairs
    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            vars: pairs
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }

    /// Value of `name`, treating blank values as unset
    pub fn get(&self, name: &str) -> Option<String> {
        self.vars
            .get(name)
            .filter(|value| !value.trim().is_empty())
            .cloned()
    }

    /// First non-blank value among `names`, with the name that supplied it
    pub fn first_of<'a>(&self, names: &[&'a str]) -> Option<(&'a str, String)> {
        names
            .iter()
            .find_map(|name| self.get(name).map(|value| (*name, value)))
    }

    /// Whether `name` is set to a non-blank value
    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }
}

// Values are credentials; only names are printed.
impl std::fmt::Debug for EnvConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut names: Vec<&String> = self.vars.keys().collect();
        names.sort();
        f.debug_struct("EnvConfig").field("vars", &names).finish()
    }
}
