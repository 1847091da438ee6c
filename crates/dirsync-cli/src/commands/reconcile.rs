// Bring groups in line with their definitions

use std::path::PathBuf;

use dirsync_core::{GroupReconciler, RunResult};
use tracing::info;

use super::{load_definitions, Command, CommandContext};
use crate::error::CliResult;

/// Reconcile each named group in argument order
pub struct ReconcileCommand {
    definitions: PathBuf,
    groups: Vec<String>,
}

impl ReconcileCommand {
    pub fn new(definitions: PathBuf, groups: Vec<String>) -> Self {
        Self {
            definitions,
            groups,
        }
    }
}

#[async_trait::async_trait]
impl Command for ReconcileCommand {
    async fn execute(&self, ctx: &CommandContext) -> CliResult<RunResult> {
        let desired = load_definitions(&self.definitions).await?;
        let reconciler = GroupReconciler::new(ctx.client.clone()).with_options(ctx.options);

        let mut result = RunResult::new();
        for group in &self.groups {
            info!(group = %group, dry_run = ctx.options.dry_run, "Reconciling group");
            result.merge(reconciler.reconcile(group, &desired).await);
        }
        Ok(result)
    }
}
