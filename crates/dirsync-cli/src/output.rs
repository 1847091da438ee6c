// Result rendering and terminal styling

use clap::ValueEnum;
use colored::Colorize;
use dirsync_core::{differing_fields, Message, RunResult};

use crate::error::{CliError, CliResult};

/// How results are printed on stdout
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    /// `{changed, failed, messages}` as JSON
    #[default]
    Json,
    /// One line per message
    Text,
}

/// Output styling configuration
pub struct OutputStyle {
    pub use_colors: bool,
}

impl Default for OutputStyle {
    fn default() -> Self {
        Self {
            use_colors: atty::is(atty::Stream::Stdout),
        }
    }
}

impl OutputStyle {
    pub fn plain() -> Self {
        Self { use_colors: false }
    }

    pub fn success(&self, msg: &str) -> String {
        if self.use_colors {
            format!("{} {}", "✓".green().bold(), msg)
        } else {
            format!("✓ {}", msg)
        }
    }

    pub fn error(&self, msg: &str) -> String {
        if self.use_colors {
            format!("{} {}", "✗".red().bold(), msg)
        } else {
            format!("✗ {}", msg)
        }
    }

    pub fn warning(&self, msg: &str) -> String {
        if self.use_colors {
            format!("{} {}", "⚠".yellow(), msg)
        } else {
            format!("⚠ {}", msg)
        }
    }

    pub fn info(&self, msg: &str) -> String {
        if self.use_colors {
            format!("{} {}", "ℹ".blue(), msg)
        } else {
            format!("ℹ {}", msg)
        }
    }

    pub fn header(&self, title: &str) -> String {
        if self.use_colors {
            title.bold().to_string()
        } else {
            title.to_string()
        }
    }
}

/// Render a result in the requested format
pub fn render_result(result: &RunResult, format: OutputFormat, style: &OutputStyle) -> CliResult<String> {
    match format {
        OutputFormat::Json => serde_json::to_string_pretty(result)
            .map_err(|e| CliError::Internal(format!("cannot serialize result: {}", e))),
        OutputFormat::Text => Ok(render_text(result, style)),
    }
}

fn render_text(result: &RunResult, style: &OutputStyle) -> String {
    let status = format!(
        "changed: {}, failed: {}",
        yes_no(result.changed),
        yes_no(result.failed)
    );
    let mut lines = vec![style.header(&status)];

    for message in &result.messages {
        let line = match message {
            Message::Text(text) if result.failed => style.info(text),
            Message::Text(text) => style.success(text),
            Message::Item { item, detail } => style.error(&format!("{}: {}", item, detail)),
            Message::Error { error } => style.error(error),
            Message::Settings {
                group,
                desired,
                observed,
            } => {
                let fields = differing_fields(desired, observed);
                style.warning(&format!(
                    "{}: settings differ ({})",
                    group,
                    fields.join(", ")
                ))
            }
        };
        lines.push(line);
    }

    lines.join("\n")
}

fn yes_no(flag: bool) -> &'static str {
    if flag {
        "yes"
    } else {
        "no"
    }
}

/// Print an error to stderr
pub fn print_error(msg: &str) {
    let style = OutputStyle {
        use_colors: atty::is(atty::Stream::Stderr),
    };
    eprintln!("{}", style.error(msg));
}
