// src/process/target.rs

use std::fmt;
use std::future::Future;
use std::io;
use std::pin::Pin;

/// What the supervisor is currently watching.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SupervisedTarget {
    /// An already-running process we opened by id.
    Attached { pid: u32 },
    /// A process we created from the command line.
    Spawned { command_line: String },
}

impl fmt::Display for SupervisedTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SupervisedTarget::Attached { pid } => write!(f, "attached pid {pid}"),
            SupervisedTarget::Spawned { command_line } => write!(f, "spawned '{command_line}'"),
        }
    }
}

/// Result of asking a terminated process for its exit code.
#[derive(Debug)]
pub enum ExitReport {
    Code(i32),
    /// Unix only: the process was terminated by this signal.
    Signal(i32),
    /// The code could not be obtained; carries the OS error.
    Unknown(io::Error),
}

/// An open handle to the live target process.
///
/// Exactly one of these exists at a time. Dropping or [`close`](Self::close)-ing
/// it releases the handle; it never terminates the process.
pub trait TargetProcess: Send {
    /// OS process id.
    fn id(&self) -> u32;

    /// Resolve once the process has exited.
    ///
    /// Must be cancel-safe: the supervisor races this against the shutdown
    /// request and drops it if shutdown wins.
    fn wait_exit(&mut self) -> Pin<Box<dyn Future<Output = ()> + Send + '_>>;

    /// Best-effort exit code query, only meaningful after `wait_exit` resolved.
    fn exit_code(&mut self) -> ExitReport;

    /// Release the handle.
    fn close(self: Box<Self>) {}
}
