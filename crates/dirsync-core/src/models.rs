//! Directory data models

use std::collections::BTreeSet;

use serde::{Deserialize, Deserializer, Serialize};

/// A set of user identifiers (usually email addresses)
///
/// Backed by an ordered set so iteration, and therefore the order of the
/// operations derived from it, is deterministic.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MemberSet(BTreeSet<String>);

impl MemberSet {
    /// Create an empty member set
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a member, returning false if it was already present
    pub fn insert(&mut self, member: impl Into<String>) -> bool {
        self.0.insert(member.into())
    }

    /// Check membership
    pub fn contains(&self, member: &str) -> bool {
        self.0.contains(member)
    }

    /// Number of members
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether the set is empty
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterate members in sorted order
    pub fn iter(&self) -> impl Iterator<Item = &String> {
        self.0.iter()
    }

    /// Members of `self` that are not in `other`
    pub fn difference(&self, other: &MemberSet) -> MemberSet {
        self.0.difference(&other.0).cloned().collect()
    }

    /// Members of either set
    pub fn union(&self, other: &MemberSet) -> MemberSet {
        self.0.union(&other.0).cloned().collect()
    }
}

impl<S: Into<String>> FromIterator<S> for MemberSet {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        MemberSet(iter.into_iter().map(Into::into).collect())
    }
}

impl<S: Into<String>> Extend<S> for MemberSet {
    fn extend<I: IntoIterator<Item = S>>(&mut self, iter: I) {
        self.0.extend(iter.into_iter().map(Into::into));
    }
}

impl IntoIterator for MemberSet {
    type Item = String;
    type IntoIter = std::collections::btree_set::IntoIter<String>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl<'a> IntoIterator for &'a MemberSet {
    type Item = &'a String;
    type IntoIter = std::collections::btree_set::Iter<'a, String>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

/// Desired definition of one group
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupDefinition {
    /// Group mail address, the group's identifier
    pub mail: String,
    /// Display name
    pub name: String,
    /// Description
    #[serde(default)]
    pub description: String,
    /// Declared members
    #[serde(default)]
    pub members: MemberSet,
    /// Group type name, a key into the type catalog
    #[serde(rename = "type")]
    pub group_type: String,
}

/// Sharing and posting settings of a group
///
/// All eight fields are always present; two records are equal only when
/// every field matches.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SettingsRecord {
    pub who_can_join: String,
    pub who_can_add: String,
    pub who_can_invite: String,
    pub who_can_view_membership: String,
    #[serde(deserialize_with = "bool_or_string")]
    pub allow_external_members: bool,
    pub who_can_contact_owner: String,
    pub who_can_view_group: String,
    pub who_can_post_message: String,
}

/// The Groups Settings API encodes booleans as "true"/"false" strings
fn bool_or_string<'de, D>(deserializer: D) -> std::result::Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Bool(bool),
        Text(String),
    }

    match Raw::deserialize(deserializer)? {
        Raw::Bool(b) => Ok(b),
        Raw::Text(s) => match s.to_ascii_lowercase().as_str() {
            "true" => Ok(true),
            "false" => Ok(false),
            other => Err(serde::de::Error::custom(format!(
                "expected true or false, got '{}'",
                other
            ))),
        },
    }
}

/// Named group type and its canonical settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupTypeDefinition {
    /// Type name referenced by [`GroupDefinition::group_type`]
    pub name: String,
    /// Canonical settings for groups of this type
    pub settings: SettingsRecord,
}

/// Per-user profile used to render mailbox signatures
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    /// Primary email
    pub email: String,
    /// Full name
    #[serde(rename = "name")]
    pub full_name: String,
    /// Job title
    #[serde(default)]
    pub title: String,
    /// Phone number
    #[serde(default)]
    pub phone: Option<String>,
    /// Signature style key, selects the template
    #[serde(rename = "signature")]
    pub style_key: String,
}

/// Group metadata as returned by the directory
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DirectoryGroup {
    /// Group mail address
    pub email: String,
    /// Display name
    #[serde(default)]
    pub name: String,
    /// Description
    #[serde(default)]
    pub description: String,
}
