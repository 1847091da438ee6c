// dirsync CLI library

pub mod commands;
pub mod config;
pub mod error;
pub mod logging;
pub mod output;
pub mod router;

pub use commands::{Command, CommandContext};
pub use config::{AppConfig, ConfigManager};
pub use error::{CliError, CliResult};
pub use logging::{init_logging, VerbosityLevel};
pub use output::{OutputFormat, OutputStyle};
pub use router::{Cli, CommandRouter, Commands};

/// Exit code for a run whose result has `failed=true`
pub const EXIT_FAILED: i32 = 1;
/// Exit code for errors that prevented the run
pub const EXIT_ERROR: i32 = 2;

/// Map a finished run to the process exit code
pub fn exit_code(result: &CliResult<dirsync_core::RunResult>) -> i32 {
    match result {
        Ok(run) if run.failed => EXIT_FAILED,
        Ok(_) => 0,
        Err(_) => EXIT_ERROR,
    }
}
