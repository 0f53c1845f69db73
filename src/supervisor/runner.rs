// src/supervisor/runner.rs

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, info, warn};

use crate::errors::{Result, RunnerError, describe_os_error};
use crate::process::{ExitReport, ProcessBackend, SupervisedTarget, TargetProcess};

use super::context::SupervisorContext;
use super::{SupervisorOptions, WakeReason};

/// The supervision loop.
///
/// Keeps exactly one target process alive at a time, restarting it after
/// `restart_delay` whenever it exits, until the [`SupervisorContext`]'s
/// continuation flag is cleared.
pub struct Supervisor<B: ProcessBackend> {
    backend: B,
    options: SupervisorOptions,
    context: Arc<SupervisorContext>,
    restarts: u64,
}

impl<B: ProcessBackend> fmt::Debug for Supervisor<B> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Supervisor")
            .field("options", &self.options)
            .field("restarts", &self.restarts)
            .finish_non_exhaustive()
    }
}

impl<B: ProcessBackend> Supervisor<B> {
    pub fn new(backend: B, options: SupervisorOptions, context: Arc<SupervisorContext>) -> Self {
        Self {
            backend,
            options,
            context,
            restarts: 0,
        }
    }

    /// Run until shutdown is requested or a fatal error occurs.
    ///
    /// ShutdownComplete is signalled on every exit path, including fatal
    /// attach/spawn failures, so the coordinator never waits for nothing.
    pub async fn run(mut self) -> Result<()> {
        info!(cmd = %self.options.command.raw(), "supervisor started");

        let result = self.supervise().await;

        self.context.signal_complete();
        debug!(restarts = self.restarts, "shutdown complete signalled");

        result
    }

    async fn supervise(&mut self) -> Result<()> {
        let mut attach_pid = self.options.attach_pid.take();

        while self.context.is_running() {
            let (descriptor, mut process) = match attach_pid.take() {
                Some(pid) => self.attach(pid)?,
                None => self.spawn()?,
            };

            let reason = wait_for_target(&self.context, process.as_mut()).await;
            debug!(?reason, target = %descriptor, "supervision wait returned");

            if self.context.is_running() {
                report_exit(process.id(), process.exit_code());
            }

            process.close();

            if !self.context.is_running() {
                break;
            }
            if !restart_delay(&self.context, self.options.restart_delay).await {
                debug!("shutdown requested during restart delay");
                break;
            }

            self.restarts += 1;
        }

        info!("supervision loop finished");
        Ok(())
    }

    fn attach(&mut self, pid: u32) -> Result<(SupervisedTarget, Box<dyn TargetProcess>)> {
        let process = self
            .backend
            .open(pid)
            .map_err(|source| RunnerError::Attach { pid, source })?;
        info!(pid, "attached to process {pid}");
        Ok((SupervisedTarget::Attached { pid }, process))
    }

    fn spawn(&mut self) -> Result<(SupervisedTarget, Box<dyn TargetProcess>)> {
        info!(restarts = self.restarts, "starting process");
        let command = &self.options.command;
        let process = self
            .backend
            .spawn(command)
            .map_err(|source| RunnerError::Spawn {
                command: command.raw().to_string(),
                source,
            })?;
        let pid = process.id();
        info!(pid, "attached to process {pid}");
        Ok((
            SupervisedTarget::Spawned {
                command_line: command.raw().to_string(),
            },
            process,
        ))
    }
}

/// Block until the target exits or shutdown is requested, whichever comes
/// first. No timeout.
async fn wait_for_target(
    context: &SupervisorContext,
    process: &mut dyn TargetProcess,
) -> WakeReason {
    tokio::select! {
        _ = process.wait_exit() => WakeReason::TargetExited,
        _ = context.shutdown_requested() => WakeReason::ShutdownRequested,
    }
}

/// Sleep for the restart delay unless shutdown is requested first.
///
/// Returns `false` if the delay was cut short by a shutdown request.
async fn restart_delay(context: &SupervisorContext, delay: Duration) -> bool {
    debug!(delay_ms = delay.as_millis() as u64, "waiting before restart");

    tokio::select! {
        _ = tokio::time::sleep(delay) => true,
        _ = context.shutdown_requested() => false,
    }
}

fn report_exit(pid: u32, report: ExitReport) {
    match report {
        ExitReport::Code(code) => {
            info!(pid, exit_code = code, "process terminated with code {code}");
        }
        ExitReport::Signal(signal) => {
            info!(pid, signal, "process terminated by signal {signal}");
        }
        ExitReport::Unknown(err) => {
            warn!(
                pid,
                "process terminated. could not obtain process exit code. {}",
                describe_os_error(&err)
            );
        }
    }
}
