// Render and install mailbox signatures

use std::path::PathBuf;
use std::sync::Arc;

use dirsync_core::{BatchTargets, BatchUserOperator, RunResult};
use dirsync_templates::HandlebarsSignatureRenderer;
use tracing::debug;

use super::{load_definitions, Command, CommandContext};
use crate::error::{CliError, CliResult};

pub struct SignatureCommand {
    definitions: PathBuf,
    targets: BatchTargets,
    templates: Option<PathBuf>,
}

impl SignatureCommand {
    pub fn new(
        definitions: PathBuf,
        users: Vec<String>,
        groups: Vec<String>,
        templates: Option<PathBuf>,
    ) -> Self {
        Self {
            definitions,
            targets: BatchTargets::new(users, groups),
            templates,
        }
    }

    /// `--templates` wins over `signature_folder` from the config
    fn template_folder(&self, ctx: &CommandContext) -> CliResult<PathBuf> {
        self.templates
            .clone()
            .or_else(|| ctx.config.signature_folder.clone())
            .ok_or_else(|| CliError::InvalidArgument {
                message: "no signature template folder; pass --templates or set signature_folder"
                    .to_string(),
            })
    }
}

#[async_trait::async_trait]
impl Command for SignatureCommand {
    async fn execute(&self, ctx: &CommandContext) -> CliResult<RunResult> {
        let folder = self.template_folder(ctx)?;
        let desired = load_definitions(&self.definitions).await?;

        // Compile every template before touching any user
        let renderer = Arc::new(HandlebarsSignatureRenderer::new(folder));
        let loaded = renderer.preload().await?;
        debug!(loaded, "Signature templates compiled");

        let operator = BatchUserOperator::new(ctx.client.clone()).with_options(ctx.options);
        Ok(operator
            .apply_signatures(&self.targets, &desired, renderer)
            .await)
    }
}
