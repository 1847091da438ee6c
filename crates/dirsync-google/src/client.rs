//! Google Workspace implementation of the directory client

use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use dirsync_core::{
    DirectoryClient, DirectoryGroup, DirectoryResult, GroupDefinition, MemberSet, SettingsRecord,
};
use reqwest::{Method, Response};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::{debug, instrument};
use url::Url;

use crate::auth::{scopes, ServiceAccountKey, ServiceAccountTokenProvider, TokenProvider};
use crate::config::GoogleConfig;
use crate::error::{GoogleError, Result};
use crate::middleware::{RetryConfig, RetryMiddleware};

/// One page of `groups/{key}/members`
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct MembersPage {
    #[serde(default)]
    members: Vec<MemberEntry>,
    #[serde(default)]
    next_page_token: Option<String>,
}

#[derive(Debug, Deserialize)]
struct MemberEntry {
    #[serde(default)]
    email: Option<String>,
}

/// Directory, Groups Settings and Gmail calls over HTTPS
///
/// Each call asks the token provider for the narrowest scope it needs.
/// Directory, settings and security calls impersonate the configured admin
/// subject; signature updates impersonate the user being updated.
pub struct GoogleDirectoryClient {
    http: reqwest::Client,
    config: GoogleConfig,
    tokens: Arc<dyn TokenProvider>,
    retry: RetryMiddleware,
}

impl GoogleDirectoryClient {
    pub fn new(config: GoogleConfig, tokens: Arc<dyn TokenProvider>) -> Result<Self> {
        config.validate()?;

        let http = reqwest::Client::builder()
            .timeout(config.timeout)
            .connect_timeout(config.connect_timeout)
            .user_agent(&config.user_agent)
            .build()
            .map_err(|e| GoogleError::BuildError(e.to_string()))?;

        let retry = RetryMiddleware::new(RetryConfig {
            max_retries: config.retry_count,
            initial_delay: config.retry_delay,
            ..Default::default()
        });

        Ok(Self {
            http,
            config,
            tokens,
            retry,
        })
    }

    /// Build a client authenticated with a service account key file
    pub async fn from_credentials_file(
        config: GoogleConfig,
        credential_file: impl AsRef<Path>,
    ) -> Result<Self> {
        let key = ServiceAccountKey::load(credential_file).await?;
        let provider = ServiceAccountTokenProvider::new(key)?;
        debug!(client_email = provider.client_email(), "Loaded service account");
        Self::new(config, Arc::new(provider))
    }

    pub fn config(&self) -> &GoogleConfig {
        &self.config
    }

    fn admin(&self) -> Option<&str> {
        self.config.subject.as_deref()
    }

    /// Append percent-encoded path segments to a base URL
    fn endpoint(base: &str, segments: &[&str]) -> Result<Url> {
        let mut url = Url::parse(base).map_err(|e| GoogleError::InvalidUrl(e.to_string()))?;
        url.path_segments_mut()
            .map_err(|_| GoogleError::InvalidUrl(format!("{} cannot be a base", base)))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    /// Send one authenticated request, retrying transient failures
    ///
    /// Reads and PATCH converge when repeated. POST and DELETE are only
    /// repeated when the failure shows the first attempt was not applied,
    /// otherwise a lost response would turn into a false 409 or 404.
    async fn send(
        &self,
        method: Method,
        url: &Url,
        scopes: &[&str],
        subject: Option<&str>,
        body: Option<&Value>,
    ) -> Result<Response> {
        let replayable = [Method::GET, Method::HEAD, Method::PUT, Method::PATCH].contains(&method);
        let retryable: fn(&GoogleError) -> bool = if replayable {
            GoogleError::is_retryable
        } else {
            GoogleError::is_unapplied
        };
        let method = &method;

        self.retry
            .execute_if(
                || async move {
                    let token = self.tokens.access_token(scopes, subject).await?;
                    debug!(method = %method, url = %url, "Google API request");

                    let mut request = self
                        .http
                        .request(method.clone(), url.clone())
                        .bearer_auth(token);
                    if let Some(body) = body {
                        request = request.json(body);
                    }

                    let response = request.send().await?;
                    let status = response.status();
                    if status.is_success() {
                        return Ok(response);
                    }

                    let text = response.text().await.unwrap_or_default();
                    Err(GoogleError::from_body(status, &text))
                },
                retryable,
            )
            .await
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        url: &Url,
        scopes: &[&str],
        subject: Option<&str>,
    ) -> Result<T> {
        let response = self.send(Method::GET, url, scopes, subject, None).await?;
        let text = response.text().await?;
        serde_json::from_str(&text).map_err(|e| {
            GoogleError::InvalidResponse(format!("unexpected body from {}: {}", url.path(), e))
        })
    }
}

#[async_trait]
impl DirectoryClient for GoogleDirectoryClient {
    #[instrument(skip(self))]
    async fn get_group(&self, group: &str) -> DirectoryResult<DirectoryGroup> {
        let url = Self::endpoint(&self.config.directory_url, &["groups", group])?;
        let found = self
            .get_json(&url, &[scopes::DIRECTORY_GROUP_READONLY], self.admin())
            .await?;
        Ok(found)
    }

    #[instrument(skip(self))]
    async fn get_group_settings(&self, group: &str) -> DirectoryResult<SettingsRecord> {
        let mut url = Self::endpoint(&self.config.groups_settings_url, &[group])?;
        url.query_pairs_mut().append_pair("alt", "json");
        let settings = self
            .get_json(&url, &[scopes::GROUPS_SETTINGS], self.admin())
            .await?;
        Ok(settings)
    }

    #[instrument(skip(self))]
    async fn list_members(&self, group: &str) -> DirectoryResult<MemberSet> {
        let base = Self::endpoint(&self.config.directory_url, &["groups", group, "members"])?;
        let page_size = self.config.page_size.to_string();

        let mut members = MemberSet::new();
        let mut page_token: Option<String> = None;
        let mut pages = 0;

        loop {
            let mut url = base.clone();
            {
                let mut query = url.query_pairs_mut();
                query.append_pair("maxResults", &page_size);
                if let Some(token) = &page_token {
                    query.append_pair("pageToken", token);
                }
            }

            let page: MembersPage = self
                .get_json(&url, &[scopes::DIRECTORY_GROUP_READONLY], self.admin())
                .await?;
            pages += 1;

            // Customer-type members carry no email and cannot be diffed
            members.extend(page.members.into_iter().filter_map(|m| m.email));

            match page.next_page_token {
                Some(next) if page_token.as_deref() == Some(next.as_str()) => {
                    return Err(GoogleError::InvalidResponse(format!(
                        "member listing of {} repeated page token",
                        group
                    ))
                    .into());
                }
                Some(next) if !next.is_empty() => page_token = Some(next),
                _ => break,
            }
        }

        debug!(pages, members = members.len(), "Listed members");
        Ok(members)
    }

    #[instrument(skip(self))]
    async fn insert_member(&self, group: &str, member: &str) -> DirectoryResult<()> {
        let url = Self::endpoint(&self.config.directory_url, &["groups", group, "members"])?;
        let body = json!({ "email": member, "role": "MEMBER" });
        self.send(
            Method::POST,
            &url,
            &[scopes::DIRECTORY_GROUP],
            self.admin(),
            Some(&body),
        )
        .await?;
        Ok(())
    }

    #[instrument(skip(self))]
    async fn delete_member(&self, group: &str, member: &str) -> DirectoryResult<()> {
        let url = Self::endpoint(
            &self.config.directory_url,
            &["groups", group, "members", member],
        )?;
        self.send(
            Method::DELETE,
            &url,
            &[scopes::DIRECTORY_GROUP],
            self.admin(),
            None,
        )
        .await?;
        Ok(())
    }

    #[instrument(skip(self, definition), fields(group = %definition.mail))]
    async fn create_group(&self, definition: &GroupDefinition) -> DirectoryResult<()> {
        let url = Self::endpoint(&self.config.directory_url, &["groups"])?;
        let body = json!({
            "email": definition.mail,
            "name": definition.name,
            "description": definition.description,
        });
        self.send(
            Method::POST,
            &url,
            &[scopes::DIRECTORY_GROUP],
            self.admin(),
            Some(&body),
        )
        .await?;
        Ok(())
    }

    #[instrument(skip(self))]
    async fn sign_out_user(&self, user: &str) -> DirectoryResult<()> {
        let url = Self::endpoint(&self.config.directory_url, &["users", user, "signOut"])?;
        self.send(
            Method::POST,
            &url,
            &[scopes::USER_SECURITY],
            self.admin(),
            None,
        )
        .await?;
        Ok(())
    }

    #[instrument(skip(self, signature))]
    async fn patch_send_as(&self, user: &str, signature: &str) -> DirectoryResult<()> {
        let url = Self::endpoint(
            &self.config.gmail_url,
            &["users", user, "settings", "sendAs", user],
        )?;
        let body = json!({ "signature": signature });
        self.send(
            Method::PATCH,
            &url,
            &[scopes::GMAIL_SETTINGS_BASIC],
            Some(user),
            Some(&body),
        )
        .await?;
        Ok(())
    }
}
