//! Shared test doubles for the engine tests

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use dirsync_core::{
    DesiredState, DirectoryClient, DirectoryError, DirectoryGroup, DirectoryResult,
    GroupDefinition, GroupTypeDefinition, MemberSet, RenderError, SettingsRecord,
    SignatureRenderer, UserProfile,
};

/// A remote call as seen by the mock
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Call {
    GetGroup(String),
    GetSettings(String),
    ListMembers(String),
    Insert(String, String),
    Delete(String, String),
    Create(String),
    SignOut(String),
    PatchSendAs(String),
}

impl Call {
    pub fn is_mutation(&self) -> bool {
        matches!(
            self,
            Call::Insert(..) | Call::Delete(..) | Call::Create(_) | Call::SignOut(_) | Call::PatchSendAs(_)
        )
    }
}

/// In-memory directory that records every call and fails on demand
#[derive(Default)]
pub struct MockDirectoryClient {
    groups: Mutex<HashMap<String, MemberSet>>,
    settings: HashMap<String, SettingsRecord>,
    failures: HashMap<Call, DirectoryError>,
    calls: Mutex<Vec<Call>>,
    signatures: Mutex<HashMap<String, String>>,
}

impl MockDirectoryClient {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_group(self, mail: &str, members: &[&str]) -> Self {
        self.groups
            .lock()
            .unwrap()
            .insert(mail.to_string(), members.iter().copied().collect());
        self
    }

    pub fn with_settings(mut self, mail: &str, settings: SettingsRecord) -> Self {
        self.settings.insert(mail.to_string(), settings);
        self
    }

    pub fn failing(mut self, call: Call, error: DirectoryError) -> Self {
        self.failures.insert(call, error);
        self
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub fn mutations(&self) -> Vec<Call> {
        self.calls().into_iter().filter(Call::is_mutation).collect()
    }

    pub fn members(&self, mail: &str) -> Option<MemberSet> {
        self.groups.lock().unwrap().get(mail).cloned()
    }

    pub fn signature(&self, user: &str) -> Option<String> {
        self.signatures.lock().unwrap().get(user).cloned()
    }

    fn record(&self, call: Call) -> DirectoryResult<()> {
        self.calls.lock().unwrap().push(call.clone());
        match self.failures.get(&call) {
            Some(error) => Err(error.clone()),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl DirectoryClient for MockDirectoryClient {
    async fn get_group(&self, group: &str) -> DirectoryResult<DirectoryGroup> {
        self.record(Call::GetGroup(group.to_string()))?;
        if self.groups.lock().unwrap().contains_key(group) {
            Ok(DirectoryGroup {
                email: group.to_string(),
                name: group.to_string(),
                description: String::new(),
            })
        } else {
            Err(DirectoryError::not_found(group))
        }
    }

    async fn get_group_settings(&self, group: &str) -> DirectoryResult<SettingsRecord> {
        self.record(Call::GetSettings(group.to_string()))?;
        self.settings
            .get(group)
            .cloned()
            .ok_or_else(|| DirectoryError::not_found(group))
    }

    async fn list_members(&self, group: &str) -> DirectoryResult<MemberSet> {
        self.record(Call::ListMembers(group.to_string()))?;
        self.groups
            .lock()
            .unwrap()
            .get(group)
            .cloned()
            .ok_or_else(|| DirectoryError::not_found(group))
    }

    async fn insert_member(&self, group: &str, member: &str) -> DirectoryResult<()> {
        self.record(Call::Insert(group.to_string(), member.to_string()))?;
        if let Some(members) = self.groups.lock().unwrap().get_mut(group) {
            members.insert(member);
        }
        Ok(())
    }

    async fn delete_member(&self, group: &str, member: &str) -> DirectoryResult<()> {
        self.record(Call::Delete(group.to_string(), member.to_string()))?;
        if let Some(members) = self.groups.lock().unwrap().get_mut(group) {
            *members = members.difference(&[member].into_iter().collect());
        }
        Ok(())
    }

    async fn create_group(&self, definition: &GroupDefinition) -> DirectoryResult<()> {
        self.record(Call::Create(definition.mail.clone()))?;
        self.groups
            .lock()
            .unwrap()
            .insert(definition.mail.clone(), MemberSet::new());
        Ok(())
    }

    async fn sign_out_user(&self, user: &str) -> DirectoryResult<()> {
        self.record(Call::SignOut(user.to_string()))
    }

    async fn patch_send_as(&self, user: &str, signature: &str) -> DirectoryResult<()> {
        self.record(Call::PatchSendAs(user.to_string()))?;
        self.signatures
            .lock()
            .unwrap()
            .insert(user.to_string(), signature.to_string());
        Ok(())
    }
}

/// Renders "<style>:<name>" and knows only the listed styles
pub struct MockRenderer {
    pub styles: Vec<String>,
}

impl MockRenderer {
    pub fn with_styles(styles: &[&str]) -> Self {
        Self {
            styles: styles.iter().map(|s| s.to_string()).collect(),
        }
    }
}

#[async_trait]
impl SignatureRenderer for MockRenderer {
    async fn render(&self, profile: &UserProfile) -> Result<String, RenderError> {
        if self.styles.contains(&profile.style_key) {
            Ok(format!("{}:{}", profile.style_key, profile.full_name))
        } else {
            Err(RenderError::TemplateNotFound(profile.style_key.clone()))
        }
    }
}

pub fn standard_settings() -> SettingsRecord {
    SettingsRecord {
        who_can_join: "INVITED_CAN_JOIN".into(),
        who_can_add: "ALL_MANAGERS_CAN_ADD".into(),
        who_can_invite: "ALL_MANAGERS_CAN_INVITE".into(),
        who_can_view_membership: "ALL_IN_DOMAIN_CAN_VIEW".into(),
        allow_external_members: false,
        who_can_contact_owner: "ALL_IN_DOMAIN_CAN_CONTACT".into(),
        who_can_view_group: "ALL_MEMBERS_CAN_VIEW".into(),
        who_can_post_message: "ALL_IN_DOMAIN_CAN_POST".into(),
    }
}

pub fn group(mail: &str, group_type: &str, members: &[&str]) -> GroupDefinition {
    GroupDefinition {
        mail: mail.to_string(),
        name: mail.to_string(),
        description: String::new(),
        members: members.iter().copied().collect(),
        group_type: group_type.to_string(),
    }
}

pub fn profile(email: &str, style: &str) -> UserProfile {
    UserProfile {
        email: email.to_string(),
        full_name: format!("Name of {}", email),
        title: "Engineer".to_string(),
        phone: None,
        style_key: style.to_string(),
    }
}

pub fn desired(groups: Vec<GroupDefinition>) -> DesiredState {
    DesiredState {
        groups,
        group_types: vec![GroupTypeDefinition {
            name: "standard".to_string(),
            settings: standard_settings(),
        }],
        users: Vec::new(),
    }
}

pub fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}
