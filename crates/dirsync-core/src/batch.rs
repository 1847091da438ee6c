//! Per-user batch operations: session sign-out and signature provisioning

use std::collections::HashSet;
use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::client::{DirectoryClient, SignatureRenderer};
use crate::desired::DesiredState;
use crate::errors::{Result, SyncError};
use crate::models::UserProfile;
use crate::options::{map_ordered, RunOptions};
use crate::result::{BatchResult, OperationOutcome, RunResult};

/// Users and groups a batch applies to
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BatchTargets {
    pub users: Vec<String>,
    pub groups: Vec<String>,
}

impl BatchTargets {
    pub fn new(users: Vec<String>, groups: Vec<String>) -> Self {
        Self { users, groups }
    }

    pub fn is_empty(&self) -> bool {
        self.users.is_empty() && self.groups.is_empty()
    }
}

/// Users resolved from explicit ids and group membership
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResolvedTargets {
    /// Unique users, explicit ones first, then group members in group order
    pub users: Vec<String>,
    /// Groups whose membership could not be listed
    pub failures: Vec<SyncError>,
}

/// Applies one per-user operation across explicit users and group members
///
/// Every user is processed regardless of earlier failures.
pub struct BatchUserOperator {
    client: Arc<dyn DirectoryClient>,
    options: RunOptions,
}

impl BatchUserOperator {
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

    /// Union explicit users with the members of every listed group
    ///
    /// Fails with `NoTargets` without any remote call when nothing was
    /// supplied, and after listing when every group turned out empty.
    pub async fn resolve_targets(&self, targets: &BatchTargets) -> Result<ResolvedTargets> {
        if targets.is_empty() {
            return Err(SyncError::NoTargets);
        }

        let client = &self.client;
        let listings = map_ordered(&targets.groups, self.options.concurrency, |group| async move {
            (group, client.list_members(group).await)
        })
        .await;

        let mut seen = HashSet::new();
        let mut resolved = ResolvedTargets::default();

        for user in &targets.users {
            if seen.insert(user.clone()) {
                resolved.users.push(user.clone());
            }
        }

        for (group, listing) in listings {
            match listing {
                Ok(members) => {
                    debug!(group = %group, members = members.len(), "Resolved group members");
                    for member in members {
                        if seen.insert(member.clone()) {
                            resolved.users.push(member);
                        }
                    }
                }
                Err(e) => {
                    warn!(group = %group, error = %e, "Could not list group members");
                    resolved.failures.push(SyncError::item(group, e));
                }
            }
        }

        if resolved.users.is_empty() && resolved.failures.is_empty() {
            return Err(SyncError::NoTargets);
        }
        Ok(resolved)
    }

    /// Close every session of every resolved user
    pub async fn sign_out(&self, targets: &BatchTargets) -> BatchResult {
        let (mut result, users) = match self.prepare(targets).await {
            Ok(prepared) => prepared,
            Err(aborted) => return aborted,
        };

        if self.options.dry_run {
            for user in &users {
                result.mark_changed();
                result.note(format!("would sign out {}", user));
            }
            return result;
        }

        let client = &self.client;
        let outcomes = map_ordered(users, self.options.concurrency, |user| async move {
            let outcome = client.sign_out_user(&user).await;
            if let Err(e) = &outcome {
                warn!(user = %user, error = %e, "Sign-out failed");
            }
            (user, OperationOutcome::from(outcome))
        })
        .await;

        for (user, outcome) in outcomes {
            result.record_outcome(&user, outcome);
        }

        info!(changed = result.changed, failed = result.failed, "Sign-out batch complete");
        if !result.failed {
            result.note("All sessions closed");
        }
        result
    }

    /// Render and install the signature of every resolved user with a known
    /// profile; users without a profile are skipped.
    pub async fn apply_signatures(
        &self,
        targets: &BatchTargets,
        desired: &DesiredState,
        renderer: Arc<dyn SignatureRenderer>,
    ) -> BatchResult {
        let (mut result, users) = match self.prepare(targets).await {
            Ok(prepared) => prepared,
            Err(aborted) => return aborted,
        };

        let profiles: Vec<&UserProfile> = users
            .iter()
            .filter_map(|user| {
                let profile = desired.user(user);
                if profile.is_none() {
                    debug!(user = %user, "No profile, skipping signature");
                }
                profile
            })
            .collect();

        if profiles.is_empty() {
            if !result.failed {
                result.note("No users with a known profile");
            }
            return result;
        }

        let client = &self.client;
        let renderer = &renderer;
        let dry_run = self.options.dry_run;
        let outcomes = map_ordered(profiles, self.options.concurrency, |profile| async move {
            let outcome = match renderer.render(profile).await {
                Err(e) => OperationOutcome::Failed(e.to_string()),
                Ok(_) if dry_run => OperationOutcome::Succeeded,
                Ok(body) => client.patch_send_as(&profile.email, &body).await.into(),
            };
            if let OperationOutcome::Failed(detail) = &outcome {
                warn!(user = %profile.email, error = %detail, "Signature update failed");
            }
            (profile.email.as_str(), outcome)
        })
        .await;

        for (user, outcome) in outcomes {
            if dry_run && outcome.is_success() {
                result.mark_changed();
                result.note(format!("would update signature for {}", user));
            } else {
                result.record_outcome(user, outcome);
            }
        }

        info!(changed = result.changed, failed = result.failed, "Signature batch complete");
        if !result.failed && !dry_run {
            result.note("Signatures updated");
        }
        result
    }

    /// Resolve targets, folding group listing failures into a fresh result
    async fn prepare(
        &self,
        targets: &BatchTargets,
    ) -> std::result::Result<(RunResult, Vec<String>), RunResult> {
        match self.resolve_targets(targets).await {
            Ok(resolved) => {
                let mut result = RunResult::new();
                for failure in &resolved.failures {
                    result.record_error(failure);
                }
                Ok((result, resolved.users))
            }
            Err(e) => {
                warn!(error = %e, "Batch aborted");
                Err(RunResult::aborted(&e))
            }
        }
    }
}
