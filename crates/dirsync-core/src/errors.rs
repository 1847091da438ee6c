//! Error types shared by the engine and directory adapters

use thiserror::Error;

/// Failure kinds a [`DirectoryClient`](crate::DirectoryClient) adapter reports
///
/// The engine only branches on [`DirectoryError::is_not_found`]; every other
/// kind travels as detail text into the aggregated result.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DirectoryError {
    /// The addressed group, member or user does not exist
    #[error("Not found: {0}")]
    NotFound(String),

    /// The resource already exists (duplicate member, duplicate group)
    #[error("Already exists: {0}")]
    AlreadyExists(String),

    /// Credentials were rejected
    #[error("Authentication failed: {0}")]
    Auth(String),

    /// Authenticated but not allowed to perform the call
    #[error("Permission denied: {0}")]
    PermissionDenied(String),

    /// Quota exhausted after the adapter's own retries
    #[error("Rate limit exceeded: {0}")]
    RateLimited(String),

    /// Any other error status returned by the remote API
    #[error("Directory API error: {0}")]
    Api(String),

    /// Transport failure before a response was received
    #[error("Network error: {0}")]
    Network(String),

    /// The remote answered with something that could not be decoded
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// Generic error
    #[error("{0}")]
    Other(String),
}

impl DirectoryError {
    /// Create a new not found error
    pub fn not_found(msg: impl Into<String>) -> Self {
        DirectoryError::NotFound(msg.into())
    }

    /// Create a new API error
    pub fn api_error(msg: impl Into<String>) -> Self {
        DirectoryError::Api(msg.into())
    }

    /// Create a new network error
    pub fn network_error(msg: impl Into<String>) -> Self {
        DirectoryError::Network(msg.into())
    }

    /// Check if this is a not found error
    pub fn is_not_found(&self) -> bool {
        matches!(self, DirectoryError::NotFound(_))
    }

    /// Check if this is an auth or permission error
    pub fn is_auth_error(&self) -> bool {
        matches!(
            self,
            DirectoryError::Auth(_) | DirectoryError::PermissionDenied(_)
        )
    }
}

/// Result type for directory calls
pub type DirectoryResult<T> = std::result::Result<T, DirectoryError>;

/// Errors raised by the reconciliation engine itself
///
/// `DefinitionMissing`, `TypeMissing` and `NoTargets` are structural: they
/// abort the affected group or batch before any mutating call. The other
/// variants describe a single failed item or probe.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SyncError {
    /// No group definition is declared for this mail address
    #[error("No definition for group {0}")]
    DefinitionMissing(String),

    /// The group's declared type has no entry in the type catalog
    #[error("No settings defined for type '{type_name}' of group {group}")]
    TypeMissing { group: String, type_name: String },

    /// Neither users nor non-empty groups were supplied to a batch
    #[error("Need users or groups")]
    NoTargets,

    /// The existence probe failed with something other than "not found"
    #[error("Could not determine whether {target} exists: {detail}")]
    RemoteIndeterminate { target: String, detail: String },

    /// A single member/user/group operation failed
    #[error("{item}: {detail}")]
    PerItemFailure { item: String, detail: String },

    /// The desired-state document could not be read or is inconsistent
    #[error("Invalid desired-state document: {0}")]
    Document(String),
}

impl SyncError {
    /// Create a per-item failure from any displayable cause
    pub fn item(item: impl Into<String>, detail: impl std::fmt::Display) -> Self {
        SyncError::PerItemFailure {
            item: item.into(),
            detail: detail.to_string(),
        }
    }
}

impl From<serde_yaml::Error> for SyncError {
    fn from(e: serde_yaml::Error) -> Self {
        SyncError::Document(e.to_string())
    }
}

impl From<std::io::Error> for SyncError {
    fn from(e: std::io::Error) -> Self {
        SyncError::Document(e.to_string())
    }
}

/// Result type for engine operations
pub type Result<T> = std::result::Result<T, SyncError>;
