// Tool configuration: file layered with DIRSYNC_* environment variables

use std::path::{Path, PathBuf};
use std::time::Duration;

use ::config::{Config, Environment, File};
use dirsync_core::RunOptions;
use dirsync_google::config::{
    DEFAULT_DIRECTORY_URL, DEFAULT_GMAIL_URL, DEFAULT_GROUPS_SETTINGS_URL,
};
use dirsync_google::GoogleConfig;
use serde::{Deserialize, Serialize};

use crate::error::{CliError, CliResult};

pub const ENV_PREFIX: &str = "DIRSYNC";

/// Settings shared by every command
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppConfig {
    /// Service account JSON key
    #[serde(default)]
    pub credential_file: PathBuf,

    /// Admin user the service account acts as
    #[serde(default)]
    pub subject: String,

    #[serde(default = "default_concurrency")]
    pub concurrency: usize,

    /// Folder holding `<style>.hbs` signature templates
    #[serde(default)]
    pub signature_folder: Option<PathBuf>,

    #[serde(default)]
    pub http: HttpSettings,

    #[serde(default)]
    pub api: ApiUrls,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HttpSettings {
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    #[serde(default = "default_connect_timeout_secs")]
    pub connect_timeout_secs: u64,
    #[serde(default = "default_retry_count")]
    pub retry_count: u32,
    #[serde(default = "default_retry_delay_ms")]
    pub retry_delay_ms: u64,
    #[serde(default)]
    pub user_agent: Option<String>,
}

/// API base URLs, overridable to point at a local server
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiUrls {
    #[serde(default = "default_directory_url")]
    pub directory_url: String,
    #[serde(default = "default_groups_settings_url")]
    pub groups_settings_url: String,
    #[serde(default = "default_gmail_url")]
    pub gmail_url: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            credential_file: PathBuf::new(),
            subject: String::new(),
            concurrency: default_concurrency(),
            signature_folder: None,
            http: HttpSettings::default(),
            api: ApiUrls::default(),
        }
    }
}

impl Default for HttpSettings {
    fn default() -> Self {
        Self {
            timeout_secs: default_timeout_secs(),
            connect_timeout_secs: default_connect_timeout_secs(),
            retry_count: default_retry_count(),
            retry_delay_ms: default_retry_delay_ms(),
            user_agent: None,
        }
    }
}

impl Default for ApiUrls {
    fn default() -> Self {
        Self {
            directory_url: default_directory_url(),
            groups_settings_url: default_groups_settings_url(),
            gmail_url: default_gmail_url(),
        }
    }
}

impl AppConfig {
    /// Check the fields every remote command depends on
    pub fn validate(&self) -> CliResult<()> {
        if self.credential_file.as_os_str().is_empty() {
            return Err(CliError::Config("credential_file is not set".to_string()));
        }
        if self.subject.trim().is_empty() {
            return Err(CliError::Config("subject is not set".to_string()));
        }
        if self.http.timeout_secs == 0 {
            return Err(CliError::Config(
                "http.timeout_secs must be greater than 0".to_string(),
            ));
        }
        if self.concurrency == 0 {
            return Err(CliError::Config(
                "concurrency must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    /// Adapter settings derived from this configuration
    pub fn google_config(&self) -> GoogleConfig {
        let mut google = GoogleConfig {
            subject: Some(self.subject.clone()),
            directory_url: self.api.directory_url.clone(),
            groups_settings_url: self.api.groups_settings_url.clone(),
            gmail_url: self.api.gmail_url.clone(),
            timeout: Duration::from_secs(self.http.timeout_secs),
            connect_timeout: Duration::from_secs(self.http.connect_timeout_secs),
            retry_count: self.http.retry_count,
            retry_delay: Duration::from_millis(self.http.retry_delay_ms),
            ..GoogleConfig::default()
        };
        if let Some(user_agent) = &self.http.user_agent {
            google.user_agent = user_agent.clone();
        }
        google
    }

    pub fn run_options(&self, dry_run: bool) -> RunOptions {
        RunOptions::new()
            .with_dry_run(dry_run)
            .with_concurrency(self.concurrency)
    }
}

/// Loads [`AppConfig`] from a TOML file and the environment
pub struct ConfigManager {
    config_path: PathBuf,
    /// An explicitly named file must exist
    required: bool,
    env_prefix: String,
}

impl ConfigManager {
    /// Use the default location; a missing file is fine
    pub fn new() -> Self {
        Self {
            config_path: Self::default_config_path(),
            required: false,
            env_prefix: ENV_PREFIX.to_string(),
        }
    }

    /// Use an explicit file, which must exist
    pub fn with_path(path: impl Into<PathBuf>) -> Self {
        Self {
            config_path: path.into(),
            required: true,
            env_prefix: ENV_PREFIX.to_string(),
        }
    }

    pub fn with_env_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.env_prefix = prefix.into();
        self
    }

    pub fn config_path(&self) -> &Path {
        &self.config_path
    }

    /// `<config_dir>/dirsync/config.toml`
    pub fn default_config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("dirsync")
            .join("config.toml")
    }

    pub fn load(&self) -> CliResult<AppConfig> {
        if self.required && !self.config_path.exists() {
            return Err(CliError::Config(format!(
                "config file not found: {}",
                self.config_path.display()
            )));
        }

        let config = Config::builder()
            .add_source(File::from(self.config_path.clone()).required(false))
            .add_source(
                Environment::with_prefix(&self.env_prefix)
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        let app_config: AppConfig = config.try_deserialize()?;
        tracing::debug!(path = %self.config_path.display(), "Loaded configuration");
        Ok(app_config)
    }
}

impl Default for ConfigManager {
    fn default() -> Self {
        Self::new()
    }
}

fn default_concurrency() -> usize {
    1
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_connect_timeout_secs() -> u64 {
    10
}

fn default_retry_count() -> u32 {
    3
}

fn default_retry_delay_ms() -> u64 {
    500
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
