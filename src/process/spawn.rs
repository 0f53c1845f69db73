// src/process/spawn.rs

//! Spawned target processes.

use std::future::Future;
use std::io;
use std::pin::Pin;
use std::process::{ExitStatus, Stdio};

use tokio::process::Child;
use tracing::debug;

use super::command_line::CommandLine;
use super::target::{ExitReport, TargetProcess};

/// A child we created. Owns the `tokio::process::Child`; dropping it leaves
/// the process running (tokio reaps it in the background once it exits).
#[derive(Debug)]
pub struct SpawnedProcess {
    child: Child,
    pid: u32,
    status: Option<io::Result<ExitStatus>>,
}

/// Start the command with inherited stdio.
pub fn spawn_process(command: &CommandLine) -> io::Result<SpawnedProcess> {
    let mut cmd = command.to_command();
    cmd.stdin(Stdio::inherit())
        .stdout(Stdio::inherit())
        .stderr(Stdio::inherit())
        .kill_on_drop(false);

    let child = cmd.spawn()?;
    let pid = child.id().unwrap_or(0);
    debug!(pid, cmd = %command.raw(), "spawned target process");

    Ok(SpawnedProcess {
        child,
        pid,
        status: None,
    })
}

impl TargetProcess for SpawnedProcess {
    fn id(&self) -> u32 {
        self.pid
    }

    fn wait_exit(&mut self) -> Pin<Box<dyn Future<Output = ()> + Send + '_>> {
        Box::pin(async move {
            if self.status.is_some() {
                return;
            }
            // `Child::wait` is cancel-safe, so losing a select! is fine.
            let res = self.child.wait().await;
            self.status = Some(res);
        })
    }

    fn exit_code(&mut self) -> ExitReport {
        let status = match self.status.take() {
            Some(res) => res,
            None => match self.child.try_wait() {
                Ok(Some(status)) => Ok(status),
                Ok(None) => Err(io::Error::new(
                    io::ErrorKind::WouldBlock,
                    "process has not exited",
                )),
                Err(e) => Err(e),
            },
        };

        match status {
            Ok(status) => report_from_status(status),
            Err(e) => ExitReport::Unknown(e),
        }
    }

    fn close(self: Box<Self>) {
        debug!(pid = self.pid, "releasing spawned process handle");
    }
}

fn report_from_status(status: ExitStatus) -> ExitReport {
    if let Some(code) = status.code() {
        return ExitReport::Code(code);
    }

    #[cfg(unix)]
    {
        use std::os::unix::process::ExitStatusExt;
        if let Some(signal) = status.signal() {
            return ExitReport::Signal(signal);
        }
    }

    ExitReport::Unknown(io::Error::other(format!(
        "exit status carries no code: {status}"
    )))
}
