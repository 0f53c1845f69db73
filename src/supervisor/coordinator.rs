// src/supervisor/coordinator.rs

//! Shutdown coordinator: turns host interrupt/close notifications into an
//! orderly stop of the supervision loop.
//!
//! It runs as its own Tokio task and only ever touches the shared
//! [`SupervisorContext`]: clear the continuation flag (which wakes the loop),
//! then give the loop a bounded grace period to signal completion.

use std::fmt;
use std::io;
use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::errors::{Result, RunnerError};

use super::context::SupervisorContext;

/// A host notification the coordinator handles.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Notification {
    /// Operator interrupt (Ctrl+C / SIGINT).
    Interrupt,
    /// Termination request (SIGTERM).
    Terminate,
    /// Console/terminal went away (SIGHUP, Windows console close).
    Close,
}

impl fmt::Display for Notification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Notification::Interrupt => "interrupt",
            Notification::Terminate => "terminate",
            Notification::Close => "close",
        };
        f.write_str(name)
    }
}

/// How the grace period ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GraceOutcome {
    /// The loop signalled ShutdownComplete in time.
    Completed,
    /// The grace period ran out first.
    Expired,
}

/// Handle one notification: log, request shutdown, wait (bounded) for the
/// loop to finish.
///
/// Shutdown proceeds regardless of the outcome.
pub async fn coordinate(
    context: &SupervisorContext,
    grace: Duration,
    notification: Notification,
) -> GraceOutcome {
    info!(%notification, "exiting");

    if !context.request_shutdown() {
        debug!("shutdown was already requested");
    }

    if context.wait_complete(grace).await {
        debug!("supervision loop confirmed shutdown");
        GraceOutcome::Completed
    } else {
        warn!(
            grace_ms = grace.as_millis() as u64,
            "supervision loop did not finish within the grace period"
        );
        GraceOutcome::Expired
    }
}

/// Registered signal handlers plus the context they act on.
pub struct ShutdownCoordinator {
    context: Arc<SupervisorContext>,
    grace: Duration,
    listener: NotificationListener,
}

impl fmt::Debug for ShutdownCoordinator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ShutdownCoordinator")
            .field("grace", &self.grace)
            .finish_non_exhaustive()
    }
}

impl ShutdownCoordinator {
    /// Install the interrupt/close handlers.
    ///
    /// Must be called from within a Tokio runtime. Signals not listed in
    /// [`Notification`] keep their default disposition.
    pub fn register(context: Arc<SupervisorContext>, grace: Duration) -> Result<Self> {
        let listener = NotificationListener::new().map_err(RunnerError::SignalRegistration)?;
        debug!("shutdown handlers registered");
        Ok(Self {
            context,
            grace,
            listener,
        })
    }

    /// Wait for the first notification and coordinate the shutdown.
    pub async fn run(mut self) -> GraceOutcome {
        let notification = self.listener.recv().await;
        coordinate(&self.context, self.grace, notification).await
    }

    /// Run the coordinator on its own task.
    pub fn spawn(self) -> JoinHandle<GraceOutcome> {
        tokio::spawn(self.run())
    }
}

#[cfg(unix)]
struct NotificationListener {
    interrupt: tokio::signal::unix::Signal,
    terminate: tokio::signal::unix::Signal,
    hangup: tokio::signal::unix::Signal,
}

#[cfg(unix)]
impl NotificationListener {
    fn new() -> io::Result<Self> {
        use tokio::signal::unix::{SignalKind, signal};

        Ok(Self {
            interrupt: signal(SignalKind::interrupt())?,
            terminate: signal(SignalKind::terminate())?,
            hangup: signal(SignalKind::hangup())?,
        })
    }

    async fn recv(&mut self) -> Notification {
        tokio::select! {
            _ = self.interrupt.recv() => Notification::Interrupt,
            _ = self.terminate.recv() => Notification::Terminate,
            _ = self.hangup.recv() => Notification::Close,
        }
    }
}

#[cfg(windows)]
struct NotificationListener {
    ctrl_c: tokio::signal::windows::CtrlC,
    close: tokio::signal::windows::CtrlClose,
}

#[cfg(windows)]
impl NotificationListener {
    fn new() -> io::Result<Self> {
        Ok(Self {
            ctrl_c: tokio::signal::windows::ctrl_c()?,
            close: tokio::signal::windows::ctrl_close()?,
        })
    }

    async fn recv(&mut self) -> Notification {
        tokio::select! {
            _ = self.ctrl_c.recv() => Notification::Interrupt,
            _ = self.close.recv() => Notification::Close,
        }
    }
}
