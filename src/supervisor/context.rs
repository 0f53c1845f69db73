// src/supervisor/context.rs

//! Shared state between the supervision loop and the shutdown coordinator.
//!
//! Two `watch` channels carry everything the two sides ever exchange:
//!
//! - `running`: the continuation flag. Starts `true`, flips to `false` once
//!   and never back. The flip doubles as the ShutdownRequest signal.
//! - `completed`: the ShutdownComplete signal, set by the loop on exit.
//!
//! Both are level-triggered: a waiter that shows up after the signal fired
//! returns immediately.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;

#[derive(Debug)]
pub struct SupervisorContext {
    running: watch::Sender<bool>,
    completed: watch::Sender<bool>,
}

impl SupervisorContext {
    pub fn new() -> Self {
        let (running, _) = watch::channel(true);
        let (completed, _) = watch::channel(false);
        Self { running, completed }
    }

    pub fn shared() -> Arc<Self> {
        Arc::new(Self::new())
    }

    /// The continuation flag.
    pub fn is_running(&self) -> bool {
        *self.running.borrow()
    }

    /// Clear the continuation flag and wake everyone waiting in
    /// [`shutdown_requested`](Self::shutdown_requested).
    ///
    /// Returns `true` only for the call that performed the transition.
    pub fn request_shutdown(&self) -> bool {
        self.running.send_if_modified(|running| {
            if *running {
                *running = false;
                true
            } else {
                false
            }
        })
    }

    /// Resolve once shutdown has been requested.
    pub async fn shutdown_requested(&self) {
        let mut rx = self.running.subscribe();
        // The sender lives in `self`, so this can't observe a closed channel.
        let _ = rx.wait_for(|running| !*running).await;
    }

    /// Signal ShutdownComplete.
    pub fn signal_complete(&self) {
        self.completed.send_replace(true);
    }

    pub fn is_complete(&self) -> bool {
        *self.completed.borrow()
    }

    /// Wait for ShutdownComplete for at most `grace`.
    ///
    /// Returns whether completion was observed in time.
    pub async fn wait_complete(&self, grace: Duration) -> bool {
        let mut rx = self.completed.subscribe();
        matches!(
            tokio::time::timeout(grace, rx.wait_for(|done| *done)).await,
            Ok(Ok(_))
        )
    }
}

impl Default for SupervisorContext {
    fn default() -> Self {
        Self::new()
    }
}
