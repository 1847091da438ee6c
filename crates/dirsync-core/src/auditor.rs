//! Read-only settings compliance audit

use std::sync::Arc;

use tracing::{info, warn};

use crate::client::DirectoryClient;
use crate::desired::DesiredState;
use crate::errors::SyncError;
use crate::models::SettingsRecord;
use crate::options::{map_ordered, RunOptions};
use crate::result::{AuditResult, Message, RunResult};
use crate::settings::{differing_fields, settings_equal};

/// Compares each group's observed settings with its type's canonical record
///
/// Every requested group is checked. Definitions and types for all groups
/// are resolved before the first remote call, so a missing definition or
/// type fails the whole audit without touching the directory.
pub struct GroupAuditor {
    client: Arc<dyn DirectoryClient>,
    options: RunOptions,
}

impl GroupAuditor {
    pub fn new(client: Arc<dyn DirectoryClient>) -> Self {
        Self {
            client,
            options: RunOptions::default(),
        }
    }

    pub fn with_options(mut self, options: RunOptions) -> Self {
        self.options = options;
        self
    }

    pub async fn audit(&self, groups: &[String], desired: &DesiredState) -> AuditResult {
        let targets = match resolve_expected(groups, desired) {
            Ok(targets) => targets,
            Err(e) => {
                warn!(error = %e, "Audit aborted");
                return RunResult::aborted(&e);
            }
        };

        let client = &self.client;
        let observed = map_ordered(targets, self.options.concurrency, |(group, expected)| async move {
            let observed = client.get_group_settings(group).await;
            (group, expected, observed)
        })
        .await;

        let mut result = RunResult::new();
        for (group, expected, observed) in observed {
            match observed {
                Ok(observed) if settings_equal(expected, &observed) => {
                    result.note(format!("{}: settings match", group));
                }
                Ok(observed) => {
                    warn!(
                        group = %group,
                        fields = ?differing_fields(expected, &observed),
                        "Group settings drifted"
                    );
                    result.fail(Message::Settings {
                        group: group.to_string(),
                        desired: expected.clone(),
                        observed,
                    });
                }
                Err(e) => {
                    warn!(group = %group, error = %e, "Settings fetch failed");
                    result.record_error(&SyncError::item(group, e));
                }
            }
        }

        info!(groups = groups.len(), failed = result.failed, "Audit complete");
        result
    }
}

fn resolve_expected<'a>(
    groups: &'a [String],
    desired: &'a DesiredState,
) -> Result<Vec<(&'a str, &'a SettingsRecord)>, SyncError> {
    groups
        .iter()
        .map(|group| {
            let definition = desired.require_group(group)?;
            let settings = desired.require_settings(definition)?;
            Ok((group.as_str(), settings))
        })
        .collect()
}
