// Compare group settings with their type's canonical settings

use std::path::PathBuf;

use dirsync_core::{GroupAuditor, RunResult};

use super::{load_definitions, Command, CommandContext};
use crate::error::CliResult;

pub struct AuditCommand {
    definitions: PathBuf,
    groups: Vec<String>,
}

impl AuditCommand {
    pub fn new(definitions: PathBuf, groups: Vec<String>) -> Self {
        Self {
            definitions,
            groups,
        }
    }
}

#[async_trait::async_trait]
impl Command for AuditCommand {
    async fn execute(&self, ctx: &CommandContext) -> CliResult<RunResult> {
        let desired = load_definitions(&self.definitions).await?;
        let auditor = GroupAuditor::new(ctx.client.clone()).with_options(ctx.options);
        Ok(auditor.audit(&self.groups, &desired).await)
    }
}
