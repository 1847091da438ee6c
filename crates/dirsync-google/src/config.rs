//! Adapter configuration

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{GoogleError, Result};

pub const DEFAULT_DIRECTORY_URL: &str = "https://admin.googleapis.com/admin/directory/v1";
pub const DEFAULT_GROUPS_SETTINGS_URL: &str = "https://www.googleapis.com/groups/v1/groups";
pub const DEFAULT_GMAIL_URL: &str = "https://gmail.googleapis.com/gmail/v1";

/// Endpoints, identity and HTTP behavior of the Google adapter
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GoogleConfig {
    /// Admin account impersonated for directory, settings and security calls
    #[serde(default)]
    pub subject: Option<String>,

    /// Admin SDK Directory API base
    #[serde(default = "default_directory_url")]
    pub directory_url: String,

    /// Groups Settings API base
    #[serde(default = "default_groups_settings_url")]
    pub groups_settings_url: String,

    /// Gmail API base
    #[serde(default = "default_gmail_url")]
    pub gmail_url: String,

    /// Request timeout
    #[serde(default = "default_timeout")]
    pub timeout: Duration,

    /// Connection timeout
    #[serde(default = "default_connect_timeout")]
    pub connect_timeout: Duration,

    /// Retries after the first attempt for transient failures
    #[serde(default = "default_retry_count")]
    pub retry_count: u32,

    /// Initial retry delay (exponential backoff)
    #[serde(default = "default_retry_delay")]
    pub retry_delay: Duration,

    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    /// Page size used when listing members
    #[serde(default = "default_page_size")]
    pub page_size: u32,
}

impl Default for GoogleConfig {
    fn default() -> Self {
        Self {
            subject: None,
            directory_url: default_directory_url(),
            groups_settings_url: default_groups_settings_url(),
            gmail_url: default_gmail_url(),
            timeout: default_timeout(),
            connect_timeout: default_connect_timeout(),
            retry_count: default_retry_count(),
            retry_delay: default_retry_delay(),
            user_agent: default_user_agent(),
            page_size: default_page_size(),
        }
    }
}

impl GoogleConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Point every API at one base URL (used with a local mock server)
    pub fn with_base_url(mut self, base: &str) -> Self {
        let base = base.trim_end_matches('/');
        self.directory_url = format!("{}/admin/directory/v1", base);
        self.groups_settings_url = format!("{}/groups/v1/groups", base);
        self.gmail_url = format!("{}/gmail/v1", base);
        self
    }

    pub fn with_subject(mut self, subject: impl Into<String>) -> Self {
        self.subject = Some(subject.into());
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_retry_count(mut self, count: u32) -> Self {
        self.retry_count = count;
        self
    }

    pub fn with_retry_delay(mut self, delay: Duration) -> Self {
        self.retry_delay = delay;
        self
    }

    pub fn with_page_size(mut self, page_size: u32) -> Self {
        self.page_size = page_size;
        self
    }

    /// Check URLs, timeouts and paging before any client is built
    pub fn validate(&self) -> Result<()> {
        for (name, value) in [
            ("directory_url", &self.directory_url),
            ("groups_settings_url", &self.groups_settings_url),
            ("gmail_url", &self.gmail_url),
        ] {
            let parsed = url::Url::parse(value)
                .map_err(|e| GoogleError::InvalidUrl(format!("{}: {}", name, e)))?;
            if parsed.cannot_be_a_base() {
                return Err(GoogleError::InvalidUrl(format!(
                    "{}: {} cannot be used as a base URL",
                    name, value
                )));
            }
        }

        if self.timeout.is_zero() {
            return Err(GoogleError::Config("timeout must be greater than zero".into()));
        }
        if self.page_size == 0 || self.page_size > 200 {
            return Err(GoogleError::Config("page_size must be between 1 and 200".into()));
        }
        if matches!(&self.subject, Some(subject) if !subject.contains('@')) {
            return Err(GoogleError::Config("subject must be an email address".into()));
        }
        Ok(())
    }
}

fn default_directory_url() -> String {
    DEFAULT_DIRECTORY_URL.to_string()
}

fn default_groups_settings_url() -> String {
    DEFAULT_GROUPS_SETTINGS_URL.to_string()
}

fn default_gmail_url() -> String {
    DEFAULT_GMAIL_URL.to_string()
}

fn default_timeout() -> Duration {
    Duration::from_secs(30)
}

fn default_connect_timeout() -> Duration {
    Duration::from_secs(10)
}

fn default_retry_count() -> u32 {
    3
}

fn default_retry_delay() -> Duration {
    Duration::from_millis(500)
}

fn default_user_agent() -> String {
    format!("dirsync/{}", env!("CARGO_PKG_VERSION"))
}

fn default_page_size() -> u32 {
    200
}
