// src/errors.rs

//! Crate-wide error type and helpers.
//!
//! Every variant here is a *fatal* startup/supervision error: the binary
//! prints it and exits with a failure status. Non-fatal runtime problems
//! (e.g. an unobtainable exit code) are logged where they happen and never
//! travel through this type.

use std::io;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum RunnerError {
    #[error("invalid process id: {0}")]
    InvalidProcessId(String),

    #[error("invalid command line: {0}")]
    InvalidCommandLine(String),

    #[error("failed to set console handler. {}", describe_os_error(.0))]
    SignalRegistration(#[source] io::Error),

    #[error("could not attach to process with id: {pid}. {}", describe_os_error(.source))]
    Attach {
        pid: u32,
        #[source]
        source: io::Error,
    },

    #[error("failed to start process '{command}'. {}", describe_os_error(.source))]
    Spawn {
        command: String,
        #[source]
        source: io::Error,
    },

    #[error("configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("TOML parsing error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

pub use anyhow::Error;
pub type Result<T> = std::result::Result<T, RunnerError>;

/// Render an OS error as `Error <code>: <description>`.
///
/// Errors that did not come from the OS (no raw errno) are rendered with
/// their plain `Display` text.
pub fn describe_os_error(err: &io::Error) -> String {
    match err.raw_os_error() {
        Some(code) => format!("Error {code}: {}", os_error_text(code, err)),
        None => format!("Error: {err}"),
    }
}

#[cfg(unix)]
fn os_error_text(code: i32, _err: &io::Error) -> String {
    nix::errno::Errno::from_raw(code).desc().to_string()
}

#[cfg(not(unix))]
fn os_error_text(_code: i32, err: &io::Error) -> String {
    err.to_string()
}
