//! Tests for the read-only settings audit

mod common;

use std::sync::Arc;

use common::*;
use dirsync_core::{DirectoryError, GroupAuditor, Message};

const ENG: &str = "eng@example.com";
const OPS: &str = "ops@example.com";

#[tokio::test]
async fn test_mismatch_reports_both_records() {
    let mut observed = standard_settings();
    observed.who_can_join = "ALL_IN_DOMAIN_CAN_JOIN".into();
    let client = Arc::new(MockDirectoryClient::new().with_settings(ENG, observed.clone()));
    let state = desired(vec![group(ENG, "standard", &[])]);

    let result = GroupAuditor::new(client)
        .audit(&strings(&[ENG]), &state)
        .await;

    assert!(result.failed);
    assert!(!result.changed);
    assert_eq!(
        result.messages,
        vec![Message::Settings {
            group: ENG.into(),
            desired: standard_settings(),
            observed,
        }]
    );
}

#[tokio::test]
async fn test_match_reports_single_message() {
    let client = Arc::new(MockDirectoryClient::new().with_settings(ENG, standard_settings()));
    let state = desired(vec![group(ENG, "standard", &[])]);

    let result = GroupAuditor::new(client)
        .audit(&strings(&[ENG]), &state)
        .await;

    assert!(!result.failed);
    assert!(!result.changed);
    assert_eq!(
        result.messages,
        vec![Message::text("eng@example.com: settings match")]
    );
}

#[tokio::test]
async fn test_every_group_is_audited() {
    let mut drifted = standard_settings();
    drifted.allow_external_members = true;
    let client = Arc::new(
        MockDirectoryClient::new()
            .with_settings(ENG, standard_settings())
            .with_settings(OPS, drifted),
    );
    let state = desired(vec![
        group(ENG, "standard", &[]),
        group(OPS, "standard", &[]),
    ]);

    let result = GroupAuditor::new(client.clone())
        .audit(&strings(&[ENG, OPS]), &state)
        .await;

    assert!(result.failed);
    assert_eq!(result.messages.len(), 2);
    assert_eq!(result.messages[0], Message::text("eng@example.com: settings match"));
    assert!(matches!(&result.messages[1], Message::Settings { group, .. } if group == OPS));
    assert_eq!(
        client.calls(),
        vec![Call::GetSettings(ENG.into()), Call::GetSettings(OPS.into())]
    );
}

#[tokio::test]
async fn test_missing_definition_aborts_before_any_call() {
    let client = Arc::new(MockDirectoryClient::new().with_settings(ENG, standard_settings()));
    let state = desired(vec![group(ENG, "standard", &[])]);

    let result = GroupAuditor::new(client.clone())
        .audit(&strings(&[ENG, "ghost@example.com"]), &state)
        .await;

    assert!(result.failed);
    assert_eq!(
        result.messages,
        vec![Message::error("No definition for group ghost@example.com")]
    );
    assert!(client.calls().is_empty());
}

#[tokio::test]
async fn test_missing_type_is_distinct_failure() {
    let client = Arc::new(MockDirectoryClient::new().with_settings(ENG, standard_settings()));
    let state = desired(vec![group(ENG, "restricted", &[])]);

    let result = GroupAuditor::new(client.clone())
        .audit(&strings(&[ENG]), &state)
        .await;

    assert!(result.failed);
    assert_eq!(
        result.messages,
        vec![Message::error(
            "No settings defined for type 'restricted' of group eng@example.com"
        )]
    );
    assert!(client.calls().is_empty());
}

#[tokio::test]
async fn test_fetch_failure_does_not_stop_audit() {
    let client = Arc::new(
        MockDirectoryClient::new()
            .with_settings(OPS, standard_settings())
            .failing(
                Call::GetSettings(ENG.into()),
                DirectoryError::Auth("token expired".into()),
            ),
    );
    let state = desired(vec![
        group(ENG, "standard", &[]),
        group(OPS, "standard", &[]),
    ]);

    let result = GroupAuditor::new(client)
        .audit(&strings(&[ENG, OPS]), &state)
        .await;

    assert!(result.failed);
    assert_eq!(
        result.messages,
        vec![
            Message::item(ENG, "Authentication failed: token expired"),
            Message::text("ops@example.com: settings match"),
        ]
    );
}
