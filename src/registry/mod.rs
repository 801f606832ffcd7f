//! Registry publication-status queries.
//!
//! Each query is a fresh authenticated GET scoped to one exact
//! `(namespace, name, version)`. Nothing is cached between the pre-check and the
//! post-check.

use crate::config::ReleaseConfig;
use crate::credentials::Credentials;
use crate::error::{RegistryError, Result};
use crate::version::ReleaseIdentity;
use chrono::{DateTime, Utc};
use serde::Deserialize;
use std::future::Future;
use std::time::Duration;

/// Publication state of one identity at one point in time
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublicationStatus {
    /// Artifact name queried
    pub name: String,
    /// Version queried
    pub version: String,
    /// Whether the registry reported the version as published
    pub published: bool,
    /// When the registry answered
    pub checked_at: DateTime<Utc>,
}

impl PublicationStatus {
    /// Snapshot for `identity` taken now
    pub fn snapshot(identity: &ReleaseIdentity, published: bool) -> Self {
        Self {
            name: identity.name().to_string(),
            version: identity.version().to_string(),
            published,
            checked_at: Utc::now(),
        }
    }
}

/// Source of publication status
pub trait PublicationRegistry {
    /// Query whether `identity` is published
    fn query_published(
        &self,
        identity: &ReleaseIdentity,
        credentials: &Credentials,
    ) -> impl Future<Output = Result<PublicationStatus>>;
}

#[derive(Debug, Deserialize)]
struct PublishedResponse {
    published: Option<bool>,
}

/// Interpret a response body
///
/// A missing field or unparsable body means not published.
pub fn parse_published(body: &str) -> bool {
    serde_json::from_str::<PublishedResponse>(body)
        .ok()
        .and_then(|response| response.published)
        .unwrap_or(false)
}

/// HTTP client for the registry's publication endpoint
#[derive(Debug, Clone)]
pub struct RegistryClient {
    http: reqwest::Client,
    base_url: String,
    namespace: String,
}

impl RegistryClient {
    /// Create a client for the endpoint and namespace in `config`
    pub fn new(config: &ReleaseConfig) -> Result<Self> {
        let http = reqwest::Client::builder()
            .user_agent(concat!("release_gate/", env!("CARGO_PKG_VERSION")))
            .connect_timeout(Duration::from_secs(15))
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| RegistryError::Unreachable {
                url: config.registry_url.clone(),
                reason: format!("failed to build HTTP client: {e}"),
            })?;

        Ok(Self {
            http,
            base_url: config.registry_url.clone(),
            namespace: config.namespace.clone(),
        })
    }

    /// Query URL for `identity`
    pub fn query_url(&self, identity: &ReleaseIdentity) -> Result<url::Url> {
        url::Url::parse_with_params(
            &self.base_url,
            &[
                ("namespace", self.namespace.as_str()),
                ("name", identity.name()),
                ("version", identity.version().as_str()),
            ],
        )
        .map_err(|e| {
            RegistryError::InvalidUrl {
                url: self.base_url.clone(),
                reason: e.to_string(),
            }
            .into()
        })
    }
}

impl PublicationRegistry for RegistryClient {
    async fn query_published(
        &self,
        identity: &ReleaseIdentity,
        credentials: &Credentials,
    ) -> Result<PublicationStatus> {
        let url = self.query_url(identity)?;
        log::debug!("> GET {}", url);

        let response = self
            .http
            .get(url.clone())
            .header(reqwest::header::ACCEPT, "application/json")
            .header(
                reqwest::header::AUTHORIZATION,
                format!("Basic {}", credentials.basic_token()),
            )
            .send()
            .await
            .map_err(|e| RegistryError::Unreachable {
                url: url.to_string(),
                reason: e.to_string(),
            })?;

        let status = response.status();
        log::debug!("< {}", status);

        if status == reqwest::StatusCode::UNAUTHORIZED || status == reqwest::StatusCode::FORBIDDEN
        {
            return Err(RegistryError::AuthRejected {
                status: status.as_u16(),
            }
            .into());
        }

        let body = response.text().await.map_err(|e| RegistryError::Unreachable {
            url: url.to_string(),
            reason: format!("failed to read response body: {e}"),
        })?;
        log::debug!("< {}", body);

        if !status.is_success() {
            log::warn!(
                "Registry answered HTTP {} for {}; treating as not published",
                status,
                identity
            );
        }

        Ok(PublicationStatus::snapshot(identity, parse_published(&body)))
    }
}
