//! Settings comparison

use crate::models::SettingsRecord;

/// Strict field-wise equality of all eight settings
pub fn settings_equal(desired: &SettingsRecord, observed: &SettingsRecord) -> bool {
    differing_fields(desired, observed).is_empty()
}

/// Names (API spelling) of the fields that differ
pub fn differing_fields(desired: &SettingsRecord, observed: &SettingsRecord) -> Vec<&'static str> {
    let checks = [
        ("whoCanJoin", desired.who_can_join == observed.who_can_join),
        ("whoCanAdd", desired.who_can_add == observed.who_can_add),
        ("whoCanInvite", desired.who_can_invite == observed.who_can_invite),
        (
            "whoCanViewMembership",
            desired.who_can_view_membership == observed.who_can_view_membership,
        ),
        (
            "allowExternalMembers",
            desired.allow_external_members == observed.allow_external_members,
        ),
        (
            "whoCanContactOwner",
            desired.who_can_contact_owner == observed.who_can_contact_owner,
        ),
        (
            "whoCanViewGroup",
            desired.who_can_view_group == observed.who_can_view_group,
        ),
        (
            "whoCanPostMessage",
            desired.who_can_post_message == observed.who_can_post_message,
        ),
    ];

    checks
        .into_iter()
        .filter(|(_, same)| !same)
        .map(|(name, _)| name)
        .collect()
}
