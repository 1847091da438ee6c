//! Service account authentication with domain-wide delegation

use std::collections::HashMap;
use std::path::Path;

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;
use tracing::{debug, instrument};

use crate::error::{GoogleError, Result};

/// OAuth scopes requested per API family
pub mod scopes {
    pub const DIRECTORY_GROUP_READONLY: &str =
        "https://www.googleapis.com/auth/admin.directory.group.readonly";
    pub const DIRECTORY_GROUP: &str = "https://www.googleapis.com/auth/admin.directory.group";
    pub const USER_SECURITY: &str = "https://www.googleapis.com/auth/admin.directory.user.security";
    pub const GROUPS_SETTINGS: &str = "https://www.googleapis.com/auth/apps.groups.settings";
    pub const GMAIL_SETTINGS_BASIC: &str = "https://www.googleapis.com/auth/gmail.settings.basic";
}

const JWT_BEARER_GRANT: &str = "urn:ietf:params:oauth:grant-type:jwt-bearer";
const DEFAULT_TOKEN_URI: &str = "https://oauth2.googleapis.com/token";
const ASSERTION_LIFETIME_SECS: i64 = 3600;

/// Supplies bearer tokens for a scope set, optionally impersonating a user
#[async_trait]
pub trait TokenProvider: Send + Sync {
    async fn access_token(&self, scopes: &[&str], subject: Option<&str>) -> Result<String>;
}

/// A fixed token, for local endpoints that do not check it
#[derive(Debug, Clone)]
pub struct StaticTokenProvider {
    token: String,
}

impl StaticTokenProvider {
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
        }
    }
}

#[async_trait]
impl TokenProvider for StaticTokenProvider {
    async fn access_token(&self, _scopes: &[&str], _subject: Option<&str>) -> Result<String> {
        Ok(self.token.clone())
    }
}

/// Fields of a service account JSON key file that matter here
#[derive(Clone, Deserialize)]
pub struct ServiceAccountKey {
    pub client_email: String,
    pub private_key: String,
    #[serde(default)]
    pub private_key_id: Option<String>,
    #[serde(default = "default_token_uri")]
    pub token_uri: String,
}

impl std::fmt::Debug for ServiceAccountKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServiceAccountKey")
            .field("client_email", &self.client_email)
            .field("private_key_id", &self.private_key_id)
            .field("token_uri", &self.token_uri)
            .finish_non_exhaustive()
    }
}

impl ServiceAccountKey {
    pub fn from_json(content: &str) -> Result<Self> {
        serde_json::from_str(content).map_err(|e| GoogleError::Credentials(e.to_string()))
    }

    pub async fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = tokio::fs::read_to_string(path).await.map_err(|e| {
            GoogleError::Credentials(format!("cannot read {}: {}", path.display(), e))
        })?;
        Self::from_json(&content)
    }
}

fn default_token_uri() -> String {
    DEFAULT_TOKEN_URI.to_string()
}

/// Claims of the signed assertion exchanged for an access token
#[derive(Debug, Serialize, Deserialize)]
pub(crate) struct AssertionClaims {
    iss: String,
    scope: String,
    aud: String,
    iat: i64,
    exp: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    sub: Option<String>,
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    expires_in: i64,
}

#[derive(Debug, Clone)]
struct CachedToken {
    access_token: String,
    expires_at: DateTime<Utc>,
}

impl CachedToken {
    fn is_expired(&self, grace_period: Duration) -> bool {
        Utc::now() + grace_period >= self.expires_at
    }
}

/// (space-joined scopes, impersonated subject)
type TokenKey = (String, Option<String>);

/// Exchanges signed service account assertions for access tokens and
/// caches one token per scope set and subject.
pub struct ServiceAccountTokenProvider {
    key: ServiceAccountKey,
    encoding_key: EncodingKey,
    token_url: String,
    http: reqwest::Client,
    cache: RwLock<HashMap<TokenKey, CachedToken>>,
    /// Tokens this close to expiry are refreshed
    grace_period: Duration,
}

impl ServiceAccountTokenProvider {
    pub fn new(key: ServiceAccountKey) -> Result<Self> {
        let encoding_key = EncodingKey::from_rsa_pem(key.private_key.as_bytes())
            .map_err(|e| GoogleError::Credentials(format!("invalid private key: {}", e)))?;

        Ok(Self {
            token_url: key.token_uri.clone(),
            key,
            encoding_key,
            http: reqwest::Client::new(),
            cache: RwLock::new(HashMap::new()),
            grace_period: Duration::seconds(60),
        })
    }

    /// Exchange tokens somewhere other than the key file's `token_uri`
    pub fn with_token_url(mut self, token_url: impl Into<String>) -> Self {
        self.token_url = token_url.into();
        self
    }

    pub fn with_http_client(mut self, http: reqwest::Client) -> Self {
        self.http = http;
        self
    }

    pub fn client_email(&self) -> &str {
        &self.key.client_email
    }

    /// Sign an RS256 assertion for `scopes`, impersonating `subject` if given
    pub(crate) fn assertion(&self, scopes: &[&str], subject: Option<&str>) -> Result<String> {
        let now = Utc::now().timestamp();
        let claims = AssertionClaims {
            iss: self.key.client_email.clone(),
            scope: scopes.join(" "),
            aud: self.token_url.clone(),
            iat: now,
            exp: now + ASSERTION_LIFETIME_SECS,
            sub: subject.map(str::to_string),
        };

        let mut header = Header::new(Algorithm::RS256);
        header.kid = self.key.private_key_id.clone();

        encode(&header, &claims, &self.encoding_key)
            .map_err(|e| GoogleError::Credentials(format!("cannot sign assertion: {}", e)))
    }

    #[instrument(skip(self, scopes), fields(scopes = scopes.len()))]
    async fn acquire_token(&self, scopes: &[&str], subject: Option<&str>) -> Result<CachedToken> {
        let assertion = self.assertion(scopes, subject)?;
        let params = [("grant_type", JWT_BEARER_GRANT), ("assertion", assertion.as_str())];

        let response = self
            .http
            .post(&self.token_url)
            .form(&params)
            .send()
            .await
            .map_err(|e| GoogleError::Token(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(GoogleError::Token(format!("status {}: {}", status, body.trim())));
        }

        let token: TokenResponse = response
            .json()
            .await
            .map_err(|e| GoogleError::Token(format!("unreadable token response: {}", e)))?;

        let expires_at = Utc::now() + Duration::seconds(token.expires_in);
        debug!(expires_at = %expires_at, "Acquired access token");

        Ok(CachedToken {
            access_token: token.access_token,
            expires_at,
        })
    }

    /// Drop every cached token
    pub async fn invalidate(&self) {
        self.cache.write().await.clear();
    }
}

#[async_trait]
impl TokenProvider for ServiceAccountTokenProvider {
    async fn access_token(&self, scopes: &[&str], subject: Option<&str>) -> Result<String> {
        let key: TokenKey = (scopes.join(" "), subject.map(str::to_string));

        if let Some(token) = self.cache.read().await.get(&key) {
            if !token.is_expired(self.grace_period) {
                return Ok(token.access_token.clone());
            }
        }

        let token = self.acquire_token(scopes, subject).await?;
        let access_token = token.access_token.clone();
        self.cache.write().await.insert(key, token);
        Ok(access_token)
    }
}
