// src/supervisor/mod.rs

//! Supervision core for procrunner.
//!
//! This module ties together:
//! - the supervision loop ([`runner`]): attach-or-spawn, the dual wait on
//!   "target exited" / "shutdown requested", and the restart delay
//! - the shutdown coordinator ([`coordinator`]): reacts to host
//!   interrupt/close notifications
//! - the shared state between them ([`context`])
//!
//! The loop and the coordinator never call each other; everything flows
//! through the `SupervisorContext`.

use std::time::Duration;

use crate::config::ConfigFile;
use crate::process::CommandLine;

pub mod context;
pub mod coordinator;
pub mod runner;

pub use context::SupervisorContext;
pub use coordinator::{GraceOutcome, Notification, ShutdownCoordinator, coordinate};
pub use runner::Supervisor;

/// Why the supervision wait returned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WakeReason {
    TargetExited,
    ShutdownRequested,
}

/// Static inputs of the supervision loop.
#[derive(Debug, Clone)]
pub struct SupervisorOptions {
    pub command: CommandLine,
    /// Attach to this pid on the first iteration instead of spawning.
    pub attach_pid: Option<u32>,
    pub restart_delay: Duration,
}

impl SupervisorOptions {
    pub fn new(command: CommandLine, attach_pid: Option<u32>, cfg: &ConfigFile) -> Self {
        Self {
            command,
            attach_pid,
            restart_delay: cfg.restart_delay(),
        }
    }
}
