// Close every session of the targeted users

use dirsync_core::{BatchTargets, BatchUserOperator, RunResult};

use super::{Command, CommandContext};
use crate::error::CliResult;

pub struct SignoutCommand {
    targets: BatchTargets,
}

impl SignoutCommand {
    pub fn new(users: Vec<String>, groups: Vec<String>) -> Self {
        Self {
            targets: BatchTargets::new(users, groups),
        }
    }
}

#[async_trait::async_trait]
impl Command for SignoutCommand {
    async fn execute(&self, ctx: &CommandContext) -> CliResult<RunResult> {
        let operator = BatchUserOperator::new(ctx.client.clone()).with_options(ctx.options);
        Ok(operator.sign_out(&self.targets).await)
    }
}
