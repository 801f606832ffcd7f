//! Credential validation.
//!
//! Reads the registry account, its token and the optional GitHub token from the
//! environment snapshot. Runs before any subprocess or network call.

use crate::config::EnvConfig;
use crate::error::{ConfigurationError, Result};
use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;

/// Registry account identifier
pub const REGISTRY_USER_VAR: &str = "OSSRH_TOKEN_NAME";

/// Registry account token
pub const REGISTRY_TOKEN_VAR: &str = "OSSRH_TOKEN_PASSWORD";

/// GitHub token variables, first non-empty wins
pub const VCS_TOKEN_VARS: [&str; 3] = ["GITHUB_TOKEN", "GH_TOKEN", "GIT_TOKEN"];

/// Signing key identifier, passed to the build tool by name
pub const SIGNING_KEY_VAR: &str = "GPG_KEYNAME";

/// Signing key passphrase, passed to the build tool by name
pub const SIGNING_PASSPHRASE_VAR: &str = "GPG_PASSPHRASE";

/// Authentication material for one run, held in memory only
#[derive(Clone)]
pub struct Credentials {
    registry_user: String,
    registry_token: String,
    vcs_token: Option<String>,
}

impl Credentials {
    /// Construct directly
    pub fn new(
        registry_user: impl Into<String>,
        registry_token: impl Into<String>,
        vcs_token: Option<String>,
    ) -> Self {
        Self {
            registry_user: registry_user.into(),
            registry_token: registry_token.into(),
            vcs_token,
        }
    }

    /// Registry account identifier
    pub fn registry_user(&self) -> &str {
        &self.registry_user
    }

    /// GitHub token, if one was configured
    pub fn vcs_token(&self) -> Option<&str> {
        self.vcs_token.as_deref()
    }

    /// `base64(user:token)` for the registry's Basic auth header
    pub fn basic_token(&self) -> String {
        STANDARD.encode(format!("{}:{}", self.registry_user, self.registry_token))
    }
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("registry_user", &self.registry_user)
            .field("registry_token", &"<redacted>")
            .field("vcs_token", &self.vcs_token.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

/// Outcome of validation: the credentials plus any non-fatal warnings
#[derive(Debug)]
pub struct ValidatedCredentials {
    /// Credentials for the run
    pub credentials: Credentials,
    /// Non-fatal problems the operator should see
    pub warnings: Vec<String>,
}

/// Validates presence of required authentication material
#[derive(Debug, Default)]
pub struct CredentialValidator;

impl CredentialValidator {
    /// Validate the environment snapshot
    ///
    /// Missing registry variables are fatal and name the variable. A missing
    /// GitHub token or signing variable only produces a warning.
    pub fn validate(&self, env: &EnvConfig) -> Result<ValidatedCredentials> {
        let registry_user = require(env, REGISTRY_USER_VAR)?;
        let registry_token = require(env, REGISTRY_TOKEN_VAR)?;

        let mut warnings = Vec::new();

        let vcs_token = match env.first_of(&VCS_TOKEN_VARS) {
            Some((name, token)) => {
                log::debug!("Using GitHub token from {}", name);
                Some(token)
            }
            None => {
                warnings.push(format!(
                    "No GitHub token found (expected {}). Skipping GitHub auth check.",
                    VCS_TOKEN_VARS.join(", ")
                ));
                None
            }
        };

        for var in [SIGNING_KEY_VAR, SIGNING_PASSPHRASE_VAR] {
            if !env.contains(var) {
                warnings.push(format!("{var} is not set; signing will likely fail"));
            }
        }

        Ok(ValidatedCredentials {
            credentials: Credentials::new(registry_user, registry_token, vcs_token),
            warnings,
        })
    }
}

fn require(env: &EnvConfig, variable: &str) -> Result<String> {
    env.get(variable).ok_or_else(|| {
        ConfigurationError::MissingCredential {
            variable: variable.to_string(),
        }
        .into()
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ReleaseError;

    fn full_env() -> EnvConfig {
        EnvConfig::from_pairs([
            (REGISTRY_USER_VAR, "user"),
            (REGISTRY_TOKEN_VAR, "secret"),
            ("GIT_TOKEN", "ghp_abc"),
            (SIGNING_KEY_VAR, "ABCDEF"),
            (SIGNING_PASSPHRASE_VAR, "pass"),
        ])
    }

    #[test]
    fn test_complete_environment_validates_without_warnings() {
        let validated = CredentialValidator.validate(&full_env()).unwrap();
        assert_eq!(validated.credentials.registry_user(), "user");
        assert_eq!(validated.credentials.vcs_token(), Some("ghp_abc"));
        assert!(validated.warnings.is_empty());
    }

    #[test]
    fn test_missing_registry_user_is_named() {
        let env = EnvConfig::from_pairs([(REGISTRY_TOKEN_VAR, "secret")]);
        match CredentialValidator.validate(&env) {
            Err(ReleaseError::Configuration(ConfigurationError::MissingCredential {
                variable,
            })) => assert_eq!(variable, REGISTRY_USER_VAR),
            other => panic!("expected missing credential, got {other:?}"),
        }
    }

    #[test]
    fn test_blank_registry_token_is_missing() {
        let env = EnvConfig::from_pairs([(REGISTRY_USER_VAR, "user"), (REGISTRY_TOKEN_VAR, "")]);
        let err = CredentialValidator.validate(&env).unwrap_err();
        assert!(err.to_string().contains(REGISTRY_TOKEN_VAR));
    }

    #[test]
    fn test_missing_vcs_token_warns() {
        let env = EnvConfig::from_pairs([
            (REGISTRY_USER_VAR, "user"),
            (REGISTRY_TOKEN_VAR, "secret"),
            (SIGNING_KEY_VAR, "ABCDEF"),
            (SIGNING_PASSPHRASE_VAR, "pass"),
        ]);
        let validated = CredentialValidator.validate(&env).unwrap();
        assert!(validated.credentials.vcs_token().is_none());
        assert_eq!(validated.warnings.len(), 1);
        assert!(validated.warnings[0].contains("Skipping GitHub auth check"));
    }

    #[test]
    fn test_basic_token_encoding() {
        let creds = Credentials::new("user", "secret", None);
        assert_eq!(creds.basic_token(), "dXNlcjpzZWNyZXQ=");
    }

    #[test]
    fn test_debug_redacts_tokens() {
        let creds = Credentials::new("user", "secret", Some("ghp_abc".to_string()));
        let printed = format!("{creds:?}");
        assert!(!printed.contains("secret"));
        assert!(!printed.contains("ghp_abc"));
    }
}
