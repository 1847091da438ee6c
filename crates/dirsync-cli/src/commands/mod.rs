// Command handlers for the dirsync CLI

pub mod audit;
pub mod reconcile;
pub mod signature;
pub mod signout;

pub use audit::AuditCommand;
pub use reconcile::ReconcileCommand;
pub use signature::SignatureCommand;
pub use signout::SignoutCommand;

use std::path::Path;
use std::sync::Arc;

use dirsync_core::{DesiredState, DirectoryClient, RunOptions, RunResult};

use crate::config::AppConfig;
use crate::error::CliResult;

/// Everything a command needs from the environment
pub struct CommandContext {
    pub client: Arc<dyn DirectoryClient>,
    pub options: RunOptions,
    pub config: AppConfig,
}

impl CommandContext {
    pub fn new(client: Arc<dyn DirectoryClient>, config: AppConfig, dry_run: bool) -> Self {
        Self {
            client,
            options: config.run_options(dry_run),
            config,
        }
    }
}

/// Trait for command handlers
#[async_trait::async_trait]
pub trait Command: Send + Sync {
    /// Execute the command, returning the run's aggregated result
    async fn execute(&self, ctx: &CommandContext) -> CliResult<RunResult>;
}

pub(crate) async fn load_definitions(path: &Path) -> CliResult<DesiredState> {
    Ok(DesiredState::load(path).await?)
}
