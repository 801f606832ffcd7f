//! Token identity check against the GitHub user endpoint

use crate::config::ReleaseConfig;
use crate::error::{PreconditionError, ReleaseError, Result};
use serde::Deserialize;
use std::future::Future;
use std::time::Duration;

/// Resolves the account a token belongs to
pub trait IdentityProbe {
    /// Login name for `token`
    ///
    /// Rejected tokens and responses without a login are errors.
    fn authenticated_login(&self, token: &str) -> impl Future<Output = Result<String>>;
}

#[derive(Debug, Deserialize)]
struct UserResponse {
    login: Option<String>,
}

/// HTTP client for the identity endpoint
#[derive(Debug, Clone)]
pub struct GitHubIdentityClient {
    http: reqwest::Client,
    endpoint: String,
}

impl GitHubIdentityClient {
    /// Create a client for the endpoint in `config`
    pub fn new(config: &ReleaseConfig) -> Result<Self> {
        let http = reqwest::Client::builder()
            .user_agent(concat!("release_gate/", env!("CARGO_PKG_VERSION")))
            .connect_timeout(Duration::from_secs(15))
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| ReleaseError::Transport {
                endpoint: config.identity_url.clone(),
                reason: format!("failed to build HTTP client: {e}"),
            })?;

        Ok(Self {
            http,
            endpoint: config.identity_url.clone(),
        })
    }

    fn transport_error(&self, reason: String) -> ReleaseError {
        ReleaseError::Transport {
            endpoint: self.endpoint.clone(),
            reason,
        }
    }
}

impl IdentityProbe for GitHubIdentityClient {
    async fn authenticated_login(&self, token: &str) -> Result<String> {
        log::debug!("> GET {}", self.endpoint);

        let response = self
            .http
            .get(&self.endpoint)
            .header(reqwest::header::AUTHORIZATION, format!("Bearer {token}"))
            .send()
            .await
            .map_err(|e| self.transport_error(e.to_string()))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| self.transport_error(format!("failed to read response body: {e}")))?;
        log::debug!("< {}", status);

        if status != reqwest::StatusCode::OK {
            return Err(PreconditionError::IdentityRejected {
                reason: format!("HTTP {}", status.as_u16()),
            }
            .into());
        }

        serde_json::from_str::<UserResponse>(&body)
            .ok()
            .and_then(|user| user.login)
            .filter(|login| !login.trim().is_empty())
            .ok_or_else(|| {
                PreconditionError::IdentityRejected {
                    reason: "response did not include a login".to_string(),
                }
                .into()
            })
    }
}
