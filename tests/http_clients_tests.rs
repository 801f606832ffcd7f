//! Registry and identity clients against a mock HTTP server.

mod common;

use common::{FakeIdentity, RecordingRunner, release_env};
use release_gate::error::{PreconditionError, RegistryError, ReleaseError};
use release_gate::{
    Credentials, ErrorCategory, GitHubIdentityClient, IdentityProbe, PublicationRegistry,
    RegistryClient, ReleaseConfig, ReleaseIdentity, ReleaseOrchestrator, ReleasePhase, ReleaseRun,
    RuntimeConfig, VersionString,
};
use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const PUBLISHED_PATH: &str = "/api/v1/publisher/published";

fn config_for(server: &MockServer) -> ReleaseConfig {
    ReleaseConfig {
        registry_url: format!("{}{}", server.uri(), PUBLISHED_PATH),
        identity_url: format!("{}/user", server.uri()),
        ..ReleaseConfig::default()
    }
}

fn example_identity() -> ReleaseIdentity {
    let version = VersionString::normalize("2.3.0-SNAPSHOT").expect("valid version");
    ReleaseIdentity::new("example-lib", version)
}

fn credentials() -> Credentials {
    Credentials::new("user", "secret", None)
}

fn published_body(published: bool) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(serde_json::json!({ "published": published }))
}

#[tokio::test]
async fn test_registry_query_sends_identity_and_basic_auth() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(PUBLISHED_PATH))
        .and(query_param("namespace", "com.github.squirrelgrip"))
        .and(query_param("name", "example-lib"))
        .and(query_param("version", "2.3.0"))
        .and(header("authorization", "Basic dXNlcjpzZWNyZXQ="))
        .and(header("accept", "application/json"))
        .respond_with(published_body(true))
        .expect(1)
        .mount(&server)
        .await;

    let client = RegistryClient::new(&config_for(&server)).expect("client");
    let status = client
        .query_published(&example_identity(), &credentials())
        .await
        .expect("query succeeds");

    assert!(status.published);
    assert_eq!(status.name, "example-lib");
    assert_eq!(status.version, "2.3.0");
}

#[tokio::test]
async fn test_registry_missing_field_means_unpublished() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(PUBLISHED_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_string("{}"))
        .mount(&server)
        .await;

    let client = RegistryClient::new(&config_for(&server)).expect("client");
    let status = client
        .query_published(&example_identity(), &credentials())
        .await
        .expect("query succeeds");

    assert!(!status.published);
}

#[tokio::test]
async fn test_registry_server_error_body_is_still_interpreted() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(PUBLISHED_PATH))
        .respond_with(ResponseTemplate::new(500).set_body_string("internal error"))
        .mount(&server)
        .await;

    let client = RegistryClient::new(&config_for(&server)).expect("client");
    let status = client
        .query_published(&example_identity(), &credentials())
        .await
        .expect("non-2xx is not a transport failure");

    assert!(!status.published);
}

#[tokio::test]
async fn test_registry_rejected_credentials() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(PUBLISHED_PATH))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;

    let client = RegistryClient::new(&config_for(&server)).expect("client");
    let error = client
        .query_published(&example_identity(), &credentials())
        .await
        .expect_err("401 must be rejected");

    assert!(matches!(
        error,
        ReleaseError::Registry(RegistryError::AuthRejected { status: 401 })
    ));
    assert_eq!(error.category(), ErrorCategory::Configuration);
}

#[tokio::test]
async fn test_registry_unreachable_is_transport_error() {
    let config = ReleaseConfig {
        registry_url: "http://127.0.0.1:9/api/v1/publisher/published".to_string(),
        ..ReleaseConfig::default()
    };
    let client = RegistryClient::new(&config).expect("client");
    let error = client
        .query_published(&example_identity(), &credentials())
        .await
        .expect_err("closed port must fail");

    assert_eq!(error.category(), ErrorCategory::Transport);
}

#[tokio::test]
async fn test_identity_returns_login() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/user"))
        .and(header("authorization", "Bearer ghp_test"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(serde_json::json!({ "login": "release-bot" })),
        )
        .expect(1)
        .mount(&server)
        .await;

    let client = GitHubIdentityClient::new(&config_for(&server)).expect("client");
    let login = client
        .authenticated_login("ghp_test")
        .await
        .expect("token accepted");

    assert_eq!(login, "release-bot");
}

#[tokio::test]
async fn test_identity_without_login_is_rejected() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/user"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({ "id": 7 })))
        .mount(&server)
        .await;

    let client = GitHubIdentityClient::new(&config_for(&server)).expect("client");
    let error = client
        .authenticated_login("ghp_test")
        .await
        .expect_err("missing login must be rejected");

    assert!(matches!(
        error,
        ReleaseError::Precondition(PreconditionError::IdentityRejected { .. })
    ));
}

#[tokio::test]
async fn test_identity_unauthorized_is_rejected() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/user"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;

    let client = GitHubIdentityClient::new(&config_for(&server)).expect("client");
    let error = client
        .authenticated_login("ghp_bad")
        .await
        .expect_err("401 must be rejected");

    assert_eq!(error.category(), ErrorCategory::Precondition);
    assert!(error.to_string().contains("401"));
}

#[tokio::test]
async fn test_release_against_registry_checks_before_and_after() {
    let server = MockServer::start().await;
    // Mounted first, so it answers the pre-check and is then exhausted.
    Mock::given(method("GET"))
        .and(path(PUBLISHED_PATH))
        .and(query_param("version", "2.3.0"))
        .respond_with(published_body(false))
        .up_to_n_times(1)
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path(PUBLISHED_PATH))
        .and(query_param("version", "2.3.0"))
        .respond_with(published_body(true))
        .expect(1)
        .mount(&server)
        .await;

    let config = config_for(&server);
    let env = release_env();
    let output = RuntimeConfig::new(true);
    let steps = RecordingRunner::new("example-lib", "2.3.0-SNAPSHOT");
    let registry = RegistryClient::new(&config).expect("client");
    let identity = FakeIdentity::accepting("release-bot");

    let orchestrator =
        ReleaseOrchestrator::new(&config, &env, &output, &steps, &registry, &identity);
    let mut run = ReleaseRun::new();
    let result = orchestrator.execute(&mut run).await;

    assert!(result.is_ok(), "unexpected error: {result:?}");
    assert_eq!(run.phase(), ReleasePhase::Success);
    assert!(steps.ran_release_action());
}

#[tokio::test]
async fn test_registry_auth_rejection_blocks_release() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(PUBLISHED_PATH))
        .respond_with(ResponseTemplate::new(403))
        .expect(1)
        .mount(&server)
        .await;

    let config = config_for(&server);
    let env = release_env();
    let output = RuntimeConfig::new(true);
    let steps = RecordingRunner::new("example-lib", "2.3.0-SNAPSHOT");
    let registry = RegistryClient::new(&config).expect("client");
    let identity = FakeIdentity::accepting("release-bot");

    let orchestrator =
        ReleaseOrchestrator::new(&config, &env, &output, &steps, &registry, &identity);
    let mut run = ReleaseRun::new();
    let error = orchestrator
        .execute(&mut run)
        .await
        .expect_err("rejected credentials must abort");

    assert_eq!(error.category(), ErrorCategory::Configuration);
    assert!(!steps.ran_release_action());
    assert_eq!(run.phase(), ReleasePhase::Failed);
}
