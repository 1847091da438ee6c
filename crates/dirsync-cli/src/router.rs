// Command line parsing and dispatch

use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use dirsync_core::{DirectoryClient, RunResult};
use dirsync_google::GoogleDirectoryClient;
use tracing::debug;

use crate::commands::*;
use crate::config::{AppConfig, ConfigManager};
use crate::error::CliResult;
use crate::output::OutputFormat;

/// dirsync - keep Google Workspace groups in line with a desired-state file
#[derive(Parser, Debug)]
#[command(name = "dirsync")]
#[command(bin_name = "dirsync")]
#[command(about = "Reconcile directory groups, audit group settings and run per-user batches")]
#[command(
    long_about = "dirsync reads group definitions, group types and user profiles from a YAML file and brings a Google Workspace directory in line with them.\n\nEvery command prints {changed, failed, messages} and exits 1 when anything failed."
)]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Configuration file (default: <config dir>/dirsync/config.toml)
    #[arg(short, long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Enable verbose output
    #[arg(short, long, global = true, conflicts_with = "quiet")]
    pub verbose: bool,

    /// Only log warnings and errors
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Explicit log level (trace, debug, info, warn, error)
    #[arg(long, global = true, value_name = "LEVEL")]
    pub log_level: Option<String>,

    /// Report planned changes without applying them
    #[arg(long, global = true)]
    pub dry_run: bool,

    /// Maximum number of per-item calls in flight
    #[arg(long, global = true, value_name = "N")]
    pub concurrency: Option<usize>,

    /// Output format
    #[arg(long, global = true, value_enum, default_value_t = OutputFormat::Json)]
    pub format: OutputFormat,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Create missing groups and converge memberships
    Reconcile {
        /// Desired-state YAML file
        #[arg(short, long, value_name = "FILE")]
        definitions: PathBuf,

        /// Group mail to reconcile (repeatable)
        #[arg(short, long = "group", value_name = "MAIL", required = true)]
        groups: Vec<String>,
    },

    /// Check group settings against their type
    Audit {
        /// Desired-state YAML file
        #[arg(short, long, value_name = "FILE")]
        definitions: PathBuf,

        /// Group mail to audit (repeatable)
        #[arg(short, long = "group", value_name = "MAIL", required = true)]
        groups: Vec<String>,
    },

    /// Sign users out of every session
    Signout {
        /// User to sign out (repeatable)
        #[arg(short, long = "user", value_name = "ID")]
        users: Vec<String>,

        /// Sign out every member of this group (repeatable)
        #[arg(short, long = "group", value_name = "MAIL")]
        groups: Vec<String>,
    },

    /// Render and install mailbox signatures
    Signature {
        /// Desired-state YAML file with user profiles
        #[arg(short, long, value_name = "FILE")]
        definitions: PathBuf,

        /// User to update (repeatable)
        #[arg(short, long = "user", value_name = "ID")]
        users: Vec<String>,

        /// Update every member of this group (repeatable)
        #[arg(short, long = "group", value_name = "MAIL")]
        groups: Vec<String>,

        /// Signature template folder (overrides signature_folder)
        #[arg(short, long, value_name = "DIR")]
        templates: Option<PathBuf>,
    },
}

impl Commands {
    /// Build the handler for this subcommand
    pub fn handler(&self) -> Box<dyn Command> {
        match self.clone() {
            Commands::Reconcile {
                definitions,
                groups,
            } => Box::new(ReconcileCommand::new(definitions, groups)),
            Commands::Audit {
                definitions,
                groups,
            } => Box::new(AuditCommand::new(definitions, groups)),
            Commands::Signout { users, groups } => Box::new(SignoutCommand::new(users, groups)),
            Commands::Signature {
                definitions,
                users,
                groups,
                templates,
            } => Box::new(SignatureCommand::new(definitions, users, groups, templates)),
        }
    }
}

/// Routes a parsed command line to its handler
pub struct CommandRouter;

impl CommandRouter {
    /// Load configuration for the parsed flags, applying command-line overrides
    pub fn load_config(cli: &Cli) -> CliResult<AppConfig> {
        let manager = match &cli.config {
            Some(path) => ConfigManager::with_path(path),
            None => ConfigManager::new(),
        };
        let mut config = manager.load()?;
        if let Some(concurrency) = cli.concurrency {
            config.concurrency = concurrency;
        }
        config.validate()?;
        Ok(config)
    }

    /// Connect to the directory with the configured service account
    pub async fn connect(config: &AppConfig) -> CliResult<Arc<dyn DirectoryClient>> {
        let client =
            GoogleDirectoryClient::from_credentials_file(config.google_config(), &config.credential_file)
                .await?;
        Ok(Arc::new(client))
    }

    /// Run the parsed command line end to end
    pub async fn route(cli: &Cli) -> CliResult<RunResult> {
        let config = Self::load_config(cli)?;
        let client = Self::connect(&config).await?;
        let ctx = CommandContext::new(client, config, cli.dry_run);
        Self::execute(&cli.command, &ctx).await
    }

    /// Run one command against an already built context
    pub async fn execute(command: &Commands, ctx: &CommandContext) -> CliResult<RunResult> {
        debug!(command = ?command, dry_run = ctx.options.dry_run, "Executing command");
        command.handler().execute(ctx).await
    }
}
