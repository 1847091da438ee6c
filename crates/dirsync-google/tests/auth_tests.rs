//! Token exchange and caching tests against a mock token endpoint

use std::io::Write;
use std::sync::Arc;

use dirsync_core::DirectoryClient;
use dirsync_google::{
    scopes, GoogleConfig, GoogleDirectoryClient, GoogleError, ServiceAccountKey,
    ServiceAccountTokenProvider, TokenProvider,
};
use serde_json::json;
use wiremock::matchers::{body_string_contains, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const FIXTURE: &str = include_str!("fixtures/service_account.json");

fn provider_for(server: &MockServer) -> ServiceAccountTokenProvider {
    ServiceAccountTokenProvider::new(ServiceAccountKey::from_json(FIXTURE).unwrap())
        .unwrap()
        .with_token_url(format!("{}/token", server.uri()))
}

fn token_response(token: &str, expires_in: i64) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(json!({
        "access_token": token,
        "expires_in": expires_in,
        "token_type": "Bearer"
    }))
}

#[tokio::test]
async fn test_token_exchange_uses_jwt_bearer_grant() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/token"))
        .and(body_string_contains(
            "grant_type=urn%3Aietf%3Aparams%3Aoauth%3Agrant-type%3Ajwt-bearer",
        ))
        .and(body_string_contains("assertion="))
        .respond_with(token_response("ya29.first", 3600))
        .expect(1)
        .mount(&server)
        .await;

    let provider = provider_for(&server);
    let token = provider
        .access_token(&[scopes::DIRECTORY_GROUP], Some("admin@example.com"))
        .await
        .unwrap();
    assert_eq!(token, "ya29.first");
}

#[tokio::test]
async fn test_tokens_cached_per_scope_and_subject() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/token"))
        .respond_with(token_response("ya29.cached", 3600))
        .expect(3)
        .mount(&server)
        .await;

    let provider = provider_for(&server);
    let admin = Some("admin@example.com");

    provider.access_token(&[scopes::DIRECTORY_GROUP], admin).await.unwrap();
    provider.access_token(&[scopes::DIRECTORY_GROUP], admin).await.unwrap();
    provider.access_token(&[scopes::GROUPS_SETTINGS], admin).await.unwrap();
    provider
        .access_token(&[scopes::GMAIL_SETTINGS_BASIC], Some("u1@example.com"))
        .await
        .unwrap();
    provider.access_token(&[scopes::GROUPS_SETTINGS], admin).await.unwrap();
}

#[tokio::test]
async fn test_token_near_expiry_is_refreshed() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/token"))
        .respond_with(token_response("ya29.short", 30))
        .expect(2)
        .mount(&server)
        .await;

    let provider = provider_for(&server);
    provider.access_token(&[scopes::USER_SECURITY], None).await.unwrap();
    provider.access_token(&[scopes::USER_SECURITY], None).await.unwrap();
}

#[tokio::test]
async fn test_invalidate_forces_refresh() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/token"))
        .respond_with(token_response("ya29.again", 3600))
        .expect(2)
        .mount(&server)
        .await;

    let provider = provider_for(&server);
    provider.access_token(&[scopes::USER_SECURITY], None).await.unwrap();
    provider.invalidate().await;
    provider.access_token(&[scopes::USER_SECURITY], None).await.unwrap();
}

#[tokio::test]
async fn test_rejected_grant_is_token_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/token"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({
            "error": "unauthorized_client",
            "error_description": "Client is unauthorized to retrieve access tokens using this method"
        })))
        .mount(&server)
        .await;

    let error = provider_for(&server)
        .access_token(&[scopes::DIRECTORY_GROUP], Some("admin@example.com"))
        .await
        .unwrap_err();
    assert!(matches!(error, GoogleError::Token(ref message) if message.contains("unauthorized_client")));
}

#[tokio::test]
async fn test_client_from_credentials_file() {
    let server = MockServer::start().await;

    let mut key: serde_json::Value = serde_json::from_str(FIXTURE).unwrap();
    key["token_uri"] = json!(format!("{}/token", server.uri()));
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(key.to_string().as_bytes()).unwrap();

    Mock::given(method("POST"))
        .and(path("/token"))
        .respond_with(token_response("ya29.file", 3600))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/admin/directory/v1/users/u1@example.com/signOut"))
        .and(header("authorization", "Bearer ya29.file"))
        .respond_with(ResponseTemplate::new(204))
        .expect(2)
        .mount(&server)
        .await;

    let config = GoogleConfig::new()
        .with_base_url(&server.uri())
        .with_subject("admin@example.com");
    let client = GoogleDirectoryClient::from_credentials_file(config, file.path())
        .await
        .unwrap();

    client.sign_out_user("u1@example.com").await.unwrap();
    client.sign_out_user("u1@example.com").await.unwrap();
}

#[tokio::test]
async fn test_token_failure_surfaces_as_auth_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/token"))
        .respond_with(ResponseTemplate::new(400).set_body_string("invalid_grant"))
        .mount(&server)
        .await;

    let provider = Arc::new(provider_for(&server));
    let client = GoogleDirectoryClient::new(
        GoogleConfig::new().with_base_url(&server.uri()),
        provider,
    )
    .unwrap();

    let error = client.get_group("eng@example.com").await.unwrap_err();
    assert!(error.is_auth_error());
}

#[tokio::test]
async fn test_missing_credentials_file() {
    let error = ServiceAccountKey::load("/nonexistent/key.json").await.unwrap_err();
    assert!(matches!(error, GoogleError::Credentials(_)));
}
