// Logging initialisation and verbosity control

use tracing::Level;

use crate::error::{CliError, CliResult};

/// Verbosity selected on the command line
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum VerbosityLevel {
    /// Warnings and errors only
    Quiet,
    /// Progress and summaries
    Normal,
    /// Per-request detail
    Verbose,
}

impl VerbosityLevel {
    pub fn from_flags(verbose: bool, quiet: bool) -> Self {
        if quiet {
            VerbosityLevel::Quiet
        } else if verbose {
            VerbosityLevel::Verbose
        } else {
            VerbosityLevel::Normal
        }
    }

    pub fn level(self) -> Level {
        match self {
            VerbosityLevel::Quiet => Level::WARN,
            VerbosityLevel::Normal => Level::INFO,
            VerbosityLevel::Verbose => Level::DEBUG,
        }
    }
}

/// Parse an explicit `--log-level` value
pub fn parse_level(value: &str) -> CliResult<Level> {
    match value.to_lowercase().as_str() {
        "trace" => Ok(Level::TRACE),
        "debug" => Ok(Level::DEBUG),
        "info" => Ok(Level::INFO),
        "warn" | "warning" => Ok(Level::WARN),
        "error" => Ok(Level::ERROR),
        other => Err(CliError::InvalidArgument {
            message: format!("unknown log level '{}'", other),
        }),
    }
}

/// Pick the effective level; an explicit level wins over the flags
pub fn resolve_level(verbose: bool, quiet: bool, log_level: Option<&str>) -> CliResult<Level> {
    match log_level {
        Some(value) => parse_level(value),
        None => Ok(VerbosityLevel::from_flags(verbose, quiet).level()),
    }
}

/// Install the stderr subscriber; stdout is reserved for results
pub fn init_logging(verbose: bool, quiet: bool, log_level: Option<&str>) -> CliResult<()> {
    let level = resolve_level(verbose, quiet, log_level)?;

    // A subscriber may already be installed when running under a test harness
    let _ = tracing_subscriber::fmt()
        .with_max_level(level)
        .with_target(level >= Level::DEBUG)
        .with_writer(std::io::stderr)
        .try_init();

    Ok(())
}
