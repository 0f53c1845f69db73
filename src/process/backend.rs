// src/process/backend.rs

//! Pluggable process backend abstraction.
//!
//! The supervision loop talks to a `ProcessBackend` instead of calling
//! `tokio::process` directly. This makes it easy to swap in a scripted fake
//! in tests while keeping the production implementation in [`spawn`] and
//! [`attach`].
//!
//! [`spawn`]: super::spawn
//! [`attach`]: super::attach

use std::io;

use super::command_line::CommandLine;
use super::target::TargetProcess;

/// Trait abstracting how target processes are created or opened.
///
/// Production code uses [`RealProcessBackend`]; tests can provide their own
/// implementation that doesn't touch real processes.
pub trait ProcessBackend: Send {
    /// Open a handle to an existing process (wait + limited query rights).
    fn open(&mut self, pid: u32) -> io::Result<Box<dyn TargetProcess>>;

    /// Create a new process from the command line.
    fn spawn(&mut self, command: &CommandLine) -> io::Result<Box<dyn TargetProcess>>;
}

/// Real process backend used in production.
#[derive(Debug, Clone, Copy, Default)]
pub struct RealProcessBackend;

impl RealProcessBackend {
    pub fn new() -> Self {
        Self
    }
}

impl ProcessBackend for RealProcessBackend {
    fn open(&mut self, pid: u32) -> io::Result<Box<dyn TargetProcess>> {
        super::attach::open_process(pid)
    }

    fn spawn(&mut self, command: &CommandLine) -> io::Result<Box<dyn TargetProcess>> {
        let target = super::spawn::spawn_process(command)?;
        Ok(Box::new(target))
    }
}
