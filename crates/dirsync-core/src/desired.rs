//! Desired-state document

use std::collections::HashSet;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::errors::{Result, SyncError};
use crate::models::{GroupDefinition, GroupTypeDefinition, SettingsRecord, UserProfile};

/// Caller-supplied desired state: group definitions, the group type catalog
/// and the known user profiles
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DesiredState {
    #[serde(default, rename = "groups_definition")]
    pub groups: Vec<GroupDefinition>,
    #[serde(default, rename = "groups_types")]
    pub group_types: Vec<GroupTypeDefinition>,
    #[serde(default, rename = "current_users")]
    pub users: Vec<UserProfile>,
}

impl DesiredState {
    /// Parse and validate a YAML document
    pub fn from_yaml(content: &str) -> Result<Self> {
        let state: DesiredState = serde_yaml::from_str(content)?;
        state.validate()?;
        debug!(
            groups = state.groups.len(),
            group_types = state.group_types.len(),
            users = state.users.len(),
            "Loaded desired state"
        );
        Ok(state)
    }

    /// Read, parse and validate a YAML file
    pub async fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = tokio::fs::read_to_string(path).await.map_err(|e| {
            SyncError::Document(format!("Failed to read {}: {}", path.display(), e))
        })?;
        Self::from_yaml(&content)
    }

    /// Reject duplicate group mails, type names and user emails
    pub fn validate(&self) -> Result<()> {
        check_unique("group", self.groups.iter().map(|g| g.mail.as_str()))?;
        check_unique("group type", self.group_types.iter().map(|t| t.name.as_str()))?;
        check_unique("user", self.users.iter().map(|u| u.email.as_str()))?;
        Ok(())
    }

    /// Look up a group definition by mail
    pub fn group(&self, mail: &str) -> Option<&GroupDefinition> {
        self.groups.iter().find(|g| g.mail == mail)
    }

    /// Look up a group definition, failing with `DefinitionMissing`
    pub fn require_group(&self, mail: &str) -> Result<&GroupDefinition> {
        self.group(mail)
            .ok_or_else(|| SyncError::DefinitionMissing(mail.to_string()))
    }

    /// Canonical settings for a type name
    pub fn settings_for_type(&self, type_name: &str) -> Option<&SettingsRecord> {
        self.group_types
            .iter()
            .find(|t| t.name == type_name)
            .map(|t| &t.settings)
    }

    /// Canonical settings for a group's declared type, failing with `TypeMissing`
    pub fn require_settings(&self, definition: &GroupDefinition) -> Result<&SettingsRecord> {
        self.settings_for_type(&definition.group_type)
            .ok_or_else(|| SyncError::TypeMissing {
                group: definition.mail.clone(),
                type_name: definition.group_type.clone(),
            })
    }

    /// Profile of a known user
    pub fn user(&self, email: &str) -> Option<&UserProfile> {
        self.users.iter().find(|u| u.email == email)
    }
}

fn check_unique<'a>(kind: &str, keys: impl Iterator<Item = &'a str>) -> Result<()> {
    let mut seen = HashSet::new();
    for key in keys {
        if !seen.insert(key) {
            return Err(SyncError::Document(format!("Duplicate {} '{}'", kind, key)));
        }
    }
    Ok(())
}
