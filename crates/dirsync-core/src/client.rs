//! Collaborator interfaces consumed by the engine

use async_trait::async_trait;
use thiserror::Error;

use crate::errors::DirectoryResult;
use crate::models::{DirectoryGroup, GroupDefinition, MemberSet, SettingsRecord, UserProfile};

/// Remote directory operations the engine needs
///
/// Adapters own transport, authentication, scoping and retries. Every method
/// returns a classified [`DirectoryError`](crate::DirectoryError) on failure
/// so the engine can branch on error kind instead of catching everything.
#[async_trait]
pub trait DirectoryClient: Send + Sync {
    /// Fetch group metadata; "not found" must map to `DirectoryError::NotFound`
    async fn get_group(&self, group: &str) -> DirectoryResult<DirectoryGroup>;

    /// Fetch the group's sharing and posting settings
    async fn get_group_settings(&self, group: &str) -> DirectoryResult<SettingsRecord>;

    /// List every current member of the group
    async fn list_members(&self, group: &str) -> DirectoryResult<MemberSet>;

    /// Add a member to the group
    ///
    /// Some directories accept identifiers that do not resolve to a real
    /// account without complaint. Success here only means the API accepted
    /// the call; the engine does not verify the member is reachable.
    async fn insert_member(&self, group: &str, member: &str) -> DirectoryResult<()>;

    /// Remove a member from the group
    async fn delete_member(&self, group: &str, member: &str) -> DirectoryResult<()>;

    /// Create the group described by `definition`
    async fn create_group(&self, definition: &GroupDefinition) -> DirectoryResult<()>;

    /// Close every web and device session of the user
    async fn sign_out_user(&self, user: &str) -> DirectoryResult<()>;

    /// Replace the signature of the user's primary send-as address
    async fn patch_send_as(&self, user: &str, signature: &str) -> DirectoryResult<()>;
}

/// Errors from signature rendering
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RenderError {
    /// No template exists for the profile's style key
    #[error("No signature template for style '{0}'")]
    TemplateNotFound(String),

    /// The template exists but could not be rendered
    #[error("Failed to render signature: {0}")]
    Render(String),
}

/// Maps a user profile to a rendered signature body
#[async_trait]
pub trait SignatureRenderer: Send + Sync {
    async fn render(&self, profile: &UserProfile) -> std::result::Result<String, RenderError>;
}
