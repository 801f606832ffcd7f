//! Release identity: artifact name and normalized version.

use crate::error::{IdentityError, Result};
use crate::process::{Step, StepRunner};

/// Pre-release marker removed from development versions
pub const SNAPSHOT_SUFFIX: &str = "-SNAPSHOT";

/// Version with the development suffix removed
///
/// Only constructed through [`VersionString::normalize`], so every value has been
/// stripped exactly once.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct VersionString(String);

impl VersionString {
    /// Trim whitespace and remove one trailing `-SNAPSHOT`
    pub fn normalize(raw: &str) -> Option<Self> {
        let trimmed = raw.trim();
        let version = trimmed.strip_suffix(SNAPSHOT_SUFFIX).unwrap_or(trimmed);
        if version.is_empty() {
            None
        } else {
            Some(Self(version.to_string()))
        }
    }

    /// Version as used in external calls
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for VersionString {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// What is being released
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReleaseIdentity {
    name: String,
    version: VersionString,
}

impl ReleaseIdentity {
    /// Construct from an already-normalized version
    pub fn new(name: impl Into<String>, version: VersionString) -> Self {
        Self {
            name: name.into(),
            version,
        }
    }

    /// Artifact name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Normalized version
    pub fn version(&self) -> &VersionString {
        &self.version
    }

    /// Resolve version then name by evaluating the build descriptor
    pub async fn resolve<S: StepRunner>(steps: &S) -> Result<Self> {
        let raw_version = evaluate(steps, Step::ResolveVersion).await?;
        let version = VersionString::normalize(&raw_version).ok_or_else(|| IdentityError::Empty {
            expression: Step::ResolveVersion.expression().unwrap_or_default().to_string(),
        })?;

        let name = evaluate(steps, Step::ResolveName).await?;
        let name = name.trim();
        if name.is_empty() {
            return Err(IdentityError::Empty {
                expression: Step::ResolveName.expression().unwrap_or_default().to_string(),
            }
            .into());
        }

        Ok(Self::new(name, version))
    }
}

impl std::fmt::Display for ReleaseIdentity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.name, self.version)
    }
}

async fn evaluate<S: StepRunner>(steps: &S, step: Step) -> Result<String> {
    let outcome = steps.run(&step).await?;
    if !outcome.success() {
        return Err(IdentityError::ResolutionFailed {
            expression: step.expression().unwrap_or_default().to_string(),
            exit_code: outcome.code,
            output: outcome.output,
        }
        .into());
    }
    // Build tools print JVM and wrapper notices on stderr; only stdout carries the value.
    Ok(outcome.stdout)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_snapshot_suffix_removed() {
        let v = VersionString::normalize("2.3.0-SNAPSHOT").unwrap();
        assert_eq!(v.as_str(), "2.3.0");
    }

    #[test]
    fn test_release_version_unchanged() {
        let v = VersionString::normalize("2.3.0").unwrap();
        assert_eq!(v.as_str(), "2.3.0");
    }

    #[test]
    fn test_suffix_removed_only_once() {
        let v = VersionString::normalize("1.0-SNAPSHOT-SNAPSHOT").unwrap();
        assert_eq!(v.as_str(), "1.0-SNAPSHOT");
    }

    #[test]
    fn test_suffix_must_be_trailing() {
        let v = VersionString::normalize("1.0-SNAPSHOT.1").unwrap();
        assert_eq!(v.as_str(), "1.0-SNAPSHOT.1");
    }

    #[test]
    fn test_whitespace_from_tool_output_trimmed() {
        let v = VersionString::normalize("  4.1.2-SNAPSHOT\n").unwrap();
        assert_eq!(v.as_str(), "4.1.2");
    }

    #[test]
    fn test_empty_version_rejected() {
        assert!(VersionString::normalize("").is_none());
        assert!(VersionString::normalize("-SNAPSHOT").is_none());
        assert!(VersionString::normalize("   ").is_none());
    }

    #[test]
    fn test_identity_display() {
        let id = ReleaseIdentity::new("example-lib", VersionString::normalize("2.3.0").unwrap());
        assert_eq!(id.to_string(), "example-lib:2.3.0");
    }
}
