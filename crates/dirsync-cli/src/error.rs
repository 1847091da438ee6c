// CLI error types and user-facing messages

use dirsync_core::SyncError;
use dirsync_google::GoogleError;
use dirsync_templates::TemplateLoadError;
use thiserror::Error;

/// Errors that stop a command before it produces a result
#[derive(Error, Debug)]
pub enum CliError {
    #[error("Invalid argument: {message}")]
    InvalidArgument { message: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Credentials error: {0}")]
    Credentials(String),

    #[error("Definitions error: {0}")]
    Definitions(String),

    #[error("Template error: {0}")]
    Template(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl CliError {
    /// User-friendly message with a hint on how to fix it
    pub fn user_message(&self) -> String {
        match self {
            CliError::InvalidArgument { message } => {
                format!(
                    "Invalid argument: {}\n\nRun 'dirsync --help' for usage information.",
                    message
                )
            }
            CliError::Io(e) => format!("File operation failed: {}", e),
            CliError::Config(msg) => {
                format!(
                    "Configuration error: {}\n\nCheck your dirsync config file or DIRSYNC_* environment variables.",
                    msg
                )
            }
            CliError::Credentials(msg) => {
                format!(
                    "Credentials error: {}\n\nCheck that credential_file points to a service account key with domain-wide delegation.",
                    msg
                )
            }
            CliError::Definitions(msg) => {
                format!("Could not load definitions: {}", msg)
            }
            CliError::Template(msg) => format!("Signature templates unavailable: {}", msg),
            CliError::Internal(msg) => {
                format!("Internal error: {}\n\nPlease report this issue.", msg)
            }
        }
    }

    /// Technical details for verbose mode
    pub fn technical_details(&self) -> String {
        format!("{:?}", self)
    }
}

impl From<SyncError> for CliError {
    fn from(error: SyncError) -> Self {
        CliError::Definitions(error.to_string())
    }
}

impl From<GoogleError> for CliError {
    fn from(error: GoogleError) -> Self {
        match error {
            GoogleError::Credentials(msg) | GoogleError::Token(msg) => CliError::Credentials(msg),
            GoogleError::Config(msg) | GoogleError::InvalidUrl(msg) => CliError::Config(msg),
            other => CliError::Internal(other.to_string()),
        }
    }
}

impl From<TemplateLoadError> for CliError {
    fn from(error: TemplateLoadError) -> Self {
        CliError::Template(error.to_string())
    }
}

impl From<::config::ConfigError> for CliError {
    fn from(error: ::config::ConfigError) -> Self {
        CliError::Config(error.to_string())
    }
}

pub type CliResult<T> = Result<T, CliError>;
