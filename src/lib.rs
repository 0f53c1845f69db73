// src/lib.rs

pub mod cli;
pub mod config;
pub mod errors;
pub mod logging;
pub mod process;
pub mod supervisor;

use std::future::Future;
use std::sync::Arc;

use tokio::task::JoinHandle;
use tracing::warn;

use crate::cli::RunRequest;
use crate::config::ConfigFile;
use crate::errors::Result;
use crate::process::{CommandLine, RealProcessBackend};
use crate::supervisor::{
    GraceOutcome, ShutdownCoordinator, Supervisor, SupervisorContext, SupervisorOptions,
};

/// High-level entry point used by `main.rs`.
///
/// This wires together:
/// - command-line parsing of the target
/// - the shutdown coordinator (signal handlers)
/// - the supervision loop with the real process backend
pub async fn run(request: RunRequest, cfg: ConfigFile) -> Result<()> {
    let command = CommandLine::parse(&request.command_line, cfg.supervisor.use_shell)?;
    print_banner(&command);

    let context = SupervisorContext::shared();

    // Interrupt/close → graceful shutdown.
    let coordinator = ShutdownCoordinator::register(Arc::clone(&context), cfg.grace_period())?;
    let coordinator = coordinator.spawn();

    let options = SupervisorOptions::new(command, request.attach_pid, &cfg);
    let supervisor = Supervisor::new(RealProcessBackend::new(), options, context);

    supervise_until_shutdown(supervisor.run(), coordinator).await
}

/// Drive the supervision loop, but stop waiting for it once the coordinator
/// gives up on its grace period.
pub async fn supervise_until_shutdown<F>(
    supervision: F,
    coordinator: JoinHandle<GraceOutcome>,
) -> Result<()>
where
    F: Future<Output = Result<()>>,
{
    tokio::pin!(supervision);

    tokio::select! {
        biased;

        res = &mut supervision => res,

        outcome = coordinator => match outcome {
            Ok(GraceOutcome::Completed) => supervision.await,
            Ok(GraceOutcome::Expired) => {
                warn!("grace period expired before the supervision loop finished; exiting anyway");
                Ok(())
            }
            Err(e) => {
                warn!(error = %e, "shutdown coordinator task failed");
                supervision.await
            }
        },
    }
}

/// Startup banner on plain stdout (not a log line).
fn print_banner(command: &CommandLine) {
    println!("Press Ctrl+C to detach from the running process and terminate procrunner.");
    println!("{}", command.raw());
    println!();
}
