//! Group existence and membership reconciliation

use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::client::DirectoryClient;
use crate::desired::DesiredState;
use crate::diff::{diff, MembershipPlan};
use crate::errors::SyncError;
use crate::models::GroupDefinition;
use crate::options::{map_ordered, RunOptions};
use crate::result::{ExistenceState, OperationOutcome, ReconciliationResult, RunResult};

/// Direction of a single membership change
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MemberAction {
    Add,
    Remove,
}

/// One member call derived from a [`MembershipPlan`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemberChange {
    pub member: String,
    pub action: MemberAction,
}

impl MemberChange {
    /// Removals first, then additions, each in set order
    pub fn from_plan(plan: &MembershipPlan) -> Vec<MemberChange> {
        let removals = plan.to_remove.iter().map(|m| MemberChange {
            member: m.clone(),
            action: MemberAction::Remove,
        });
        let additions = plan.to_add.iter().map(|m| MemberChange {
            member: m.clone(),
            action: MemberAction::Add,
        });
        removals.chain(additions).collect()
    }

    fn describe(&self) -> String {
        match self.action {
            MemberAction::Add => format!("would add {}", self.member),
            MemberAction::Remove => format!("would remove {}", self.member),
        }
    }
}

/// Converges one group's existence and membership to its definition
///
/// A group that does not exist yet is created and nothing else happens in
/// that pass; membership is converged on the next run once the new group
/// has propagated.
pub struct GroupReconciler {
    client: Arc<dyn DirectoryClient>,
    options: RunOptions,
}

impl GroupReconciler {
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

    /// Reconcile the group identified by `mail`. Never returns an error;
    /// every failure is captured in the result.
    pub async fn reconcile(&self, mail: &str, desired: &DesiredState) -> ReconciliationResult {
        let definition = match desired.require_group(mail) {
            Ok(definition) => definition,
            Err(e) => {
                warn!(group = %mail, error = %e, "Group definition missing");
                return RunResult::aborted(&e);
            }
        };

        let probe = self.client.get_group(mail).await;
        match ExistenceState::classify(&probe) {
            ExistenceState::Exists => {
                debug!(group = %mail, "Group exists, converging membership");
                self.converge_members(definition).await
            }
            ExistenceState::NotExists => {
                debug!(group = %mail, "Group not found, creating");
                self.create(definition).await
            }
            ExistenceState::Indeterminate(detail) => {
                warn!(group = %mail, error = %detail, "Existence probe failed");
                RunResult::aborted(&SyncError::RemoteIndeterminate {
                    target: mail.to_string(),
                    detail,
                })
            }
        }
    }

    async fn create(&self, definition: &GroupDefinition) -> ReconciliationResult {
        let mut result = RunResult::new();

        if self.options.dry_run {
            result.mark_changed();
            result.note(format!("would create group {}", definition.mail));
            return result;
        }

        match self.client.create_group(definition).await {
            Ok(()) => {
                info!(group = %definition.mail, "Group created");
                result.mark_changed();
                result.note(format!("Group {} created", definition.mail));
            }
            Err(e) => {
                warn!(group = %definition.mail, error = %e, "Group creation failed");
                result.record_error(&SyncError::item(&definition.mail, e));
            }
        }
        result
    }

    async fn converge_members(&self, definition: &GroupDefinition) -> ReconciliationResult {
        let group = definition.mail.as_str();

        let current = match self.client.list_members(group).await {
            Ok(current) => current,
            Err(e) => {
                warn!(group = %group, error = %e, "Member listing failed, not diffing");
                return RunResult::aborted(&SyncError::item(group, e));
            }
        };

        let plan = diff(&definition.members, &current);
        let mut result = RunResult::new();

        if plan.is_empty() {
            result.note(format!("Group {} already up to date", group));
            return result;
        }

        let changes = MemberChange::from_plan(&plan);

        if self.options.dry_run {
            result.mark_changed();
            for change in &changes {
                result.note(change.describe());
            }
            return result;
        }

        let client = &self.client;
        let outcomes = map_ordered(changes, self.options.concurrency, |change| async move {
            let outcome = match change.action {
                MemberAction::Add => client.insert_member(group, &change.member).await,
                MemberAction::Remove => client.delete_member(group, &change.member).await,
            };
            if let Err(e) = &outcome {
                warn!(group = %group, member = %change.member, action = ?change.action, error = %e, "Member update failed");
            }
            (change, OperationOutcome::from(outcome))
        })
        .await;

        let mut added = 0usize;
        let mut removed = 0usize;
        for (change, outcome) in outcomes {
            if outcome.is_success() {
                match change.action {
                    MemberAction::Add => added += 1,
                    MemberAction::Remove => removed += 1,
                }
            }
            result.record_outcome(&change.member, outcome);
        }

        info!(group = %group, added, removed, failed = result.failed, "Membership reconciled");

        if !result.failed {
            result.note(format!(
                "Group {} membership converged (+{}/-{})",
                group, added, removed
            ));
        }
        result
    }
}
