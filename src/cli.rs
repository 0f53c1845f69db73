// src/cli.rs

//! CLI argument parsing using `clap`.
//!
//! The positional surface is intentionally loose (`clap` accepts any number
//! of positionals) so that a wrong argument count prints the usage text and
//! exits successfully instead of producing a clap error.

use std::path::PathBuf;

use clap::{Parser, ValueEnum};

use crate::errors::{Result, RunnerError};

/// Usage line printed when the positional arguments don't fit.
pub const USAGE: &str =
    "Usage: procrunner \"command line to run\" [optional process id to attach to initially]";

/// Command-line arguments for `procrunner`.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "procrunner",
    version,
    about = "Keep a single process running, restarting it whenever it exits.",
    long_about = None
)]
pub struct CliArgs {
    /// Command line of the process to supervise.
    #[arg(value_name = "COMMAND", allow_hyphen_values = true)]
    pub command: Option<String>,

    /// Process id of an already running instance to attach to first.
    #[arg(value_name = "PID", allow_hyphen_values = true)]
    pub process_id: Option<String>,

    #[arg(hide = true, allow_hyphen_values = true)]
    pub extra: Vec<String>,

    /// Path to an optional config file (TOML).
    #[arg(long, value_name = "PATH", env = "PROCRUNNER_CONFIG")]
    pub config: Option<PathBuf>,

    /// Logging level (error, warn, info, debug, trace).
    ///
    /// If omitted, `PROCRUNNER_LOG`, then the config file, then `info`.
    #[arg(long, value_enum, value_name = "LEVEL")]
    pub log_level: Option<LogLevel>,
}

/// Log level as exposed on the CLI.
#[derive(Debug, Copy, Clone, PartialEq, Eq, ValueEnum)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// What the binary should do with the given arguments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Invocation {
    /// Print [`USAGE`] and exit successfully.
    Usage,
    Run(RunRequest),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunRequest {
    pub command_line: String,
    pub attach_pid: Option<u32>,
}

impl CliArgs {
    /// Resolve the positionals into an [`Invocation`].
    ///
    /// The process id is validated here, before anything is opened.
    pub fn invocation(&self) -> Result<Invocation> {
        if !self.extra.is_empty() {
            return Ok(Invocation::Usage);
        }

        let Some(command_line) = self.command.clone() else {
            return Ok(Invocation::Usage);
        };

        let attach_pid = self
            .process_id
            .as_deref()
            .map(parse_process_id)
            .transpose()?;

        Ok(Invocation::Run(RunRequest {
            command_line,
            attach_pid,
        }))
    }
}

/// Parse a process id argument.
///
/// The whole string must be base-10 digits; signs, whitespace and trailing
/// characters are rejected.
pub fn parse_process_id(raw: &str) -> Result<u32> {
    if raw.is_empty() || !raw.bytes().all(|b| b.is_ascii_digit()) {
        return Err(RunnerError::InvalidProcessId(raw.to_string()));
    }
    raw.parse::<u32>()
        .map_err(|_| RunnerError::InvalidProcessId(raw.to_string()))
}

/// Convenience wrapper around `CliArgs::parse()`.
pub fn parse() -> CliArgs {
    CliArgs::parse()
}
