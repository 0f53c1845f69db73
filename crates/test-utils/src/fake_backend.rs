use std::collections::VecDeque;
use std::future::Future;
use std::io;
use std::pin::Pin;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use procrunner::process::{CommandLine, ExitReport, ProcessBackend, TargetProcess};
use tokio::time::Instant;

/// How a scripted fake process behaves once created.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FakeRun {
    /// Exit after this long with the given code.
    ExitAfter(Duration, i32),
    /// Exit after this long; the exit code query fails with this errno.
    ExitUnknownAfter(Duration, i32),
    /// Never exit on its own.
    RunForever,
    /// Creating the process fails with this errno.
    FailToStart(i32),
}

/// Everything the fake backend observed, in order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FakeEvent {
    OpenAttempted(u32),
    Opened(u32),
    SpawnAttempted(String),
    Spawned(u32),
    ExitCodeQueried(u32),
    Closed(u32),
}

#[derive(Debug, Default)]
struct RecorderState {
    events: Vec<FakeEvent>,
    live: usize,
    max_live: usize,
}

/// Shared view of what happened inside a [`FakeBackend`].
#[derive(Debug, Clone, Default)]
pub struct FakeRecorder {
    state: Arc<Mutex<RecorderState>>,
}

impl FakeRecorder {
    pub fn events(&self) -> Vec<FakeEvent> {
        self.state.lock().unwrap().events.clone()
    }

    pub fn spawn_count(&self) -> usize {
        self.count(|e| matches!(e, FakeEvent::Spawned(_)))
    }

    pub fn spawn_attempts(&self) -> usize {
        self.count(|e| matches!(e, FakeEvent::SpawnAttempted(_)))
    }

    pub fn exit_code_queries(&self) -> usize {
        self.count(|e| matches!(e, FakeEvent::ExitCodeQueried(_)))
    }

    /// Handles currently open.
    pub fn live(&self) -> usize {
        self.state.lock().unwrap().live
    }

    /// Highest number of handles that were ever open at once.
    pub fn max_live(&self) -> usize {
        self.state.lock().unwrap().max_live
    }

    fn count(&self, pred: impl Fn(&FakeEvent) -> bool) -> usize {
        self.state
            .lock()
            .unwrap()
            .events
            .iter()
            .filter(|e| pred(e))
            .count()
    }

    fn record(&self, event: FakeEvent) {
        self.state.lock().unwrap().events.push(event);
    }

    fn opened(&self, event: FakeEvent) {
        let mut guard = self.state.lock().unwrap();
        guard.events.push(event);
        guard.live += 1;
        guard.max_live = guard.max_live.max(guard.live);
    }

    fn closed(&self, pid: u32) {
        let mut guard = self.state.lock().unwrap();
        guard.events.push(FakeEvent::Closed(pid));
        guard.live -= 1;
    }
}

/// A process backend driven by a script instead of the OS.
///
/// Each `spawn` consumes the next [`FakeRun`]; once the script is exhausted
/// spawned processes run forever. `open` uses `attach_run`.
#[derive(Debug)]
pub struct FakeBackend {
    spawn_script: VecDeque<FakeRun>,
    attach_run: FakeRun,
    next_pid: u32,
    recorder: FakeRecorder,
}

impl FakeBackend {
    pub fn new(spawn_script: impl IntoIterator<Item = FakeRun>) -> Self {
        Self {
            spawn_script: spawn_script.into_iter().collect(),
            attach_run: FakeRun::RunForever,
            next_pid: 1000,
            recorder: FakeRecorder::default(),
        }
    }

    /// Behaviour of the process returned by `open`.
    pub fn with_attach(mut self, run: FakeRun) -> Self {
        self.attach_run = run;
        self
    }

    pub fn recorder(&self) -> FakeRecorder {
        self.recorder.clone()
    }

    fn create(&mut self, pid: u32, run: FakeRun) -> io::Result<Box<dyn TargetProcess>> {
        let (deadline, exit) = match run {
            FakeRun::FailToStart(errno) => return Err(io::Error::from_raw_os_error(errno)),
            FakeRun::RunForever => (None, FakeExit::Code(0)),
            FakeRun::ExitAfter(after, code) => (Some(Instant::now() + after), FakeExit::Code(code)),
            FakeRun::ExitUnknownAfter(after, errno) => {
                (Some(Instant::now() + after), FakeExit::Unknown(errno))
            }
        };
        Ok(Box::new(FakeProcess {
            pid,
            deadline,
            exit,
            recorder: self.recorder.clone(),
        }))
    }
}

impl ProcessBackend for FakeBackend {
    fn open(&mut self, pid: u32) -> io::Result<Box<dyn TargetProcess>> {
        self.recorder.record(FakeEvent::OpenAttempted(pid));
        let process = self.create(pid, self.attach_run)?;
        self.recorder.opened(FakeEvent::Opened(pid));
        Ok(process)
    }

    fn spawn(&mut self, command: &CommandLine) -> io::Result<Box<dyn TargetProcess>> {
        self.recorder
            .record(FakeEvent::SpawnAttempted(command.raw().to_string()));
        let run = self.spawn_script.pop_front().unwrap_or(FakeRun::RunForever);
        let pid = self.next_pid;
        let process = self.create(pid, run)?;
        self.next_pid += 1;
        self.recorder.opened(FakeEvent::Spawned(pid));
        Ok(process)
    }
}

#[derive(Debug, Clone, Copy)]
enum FakeExit {
    Code(i32),
    Unknown(i32),
}

struct FakeProcess {
    pid: u32,
    deadline: Option<Instant>,
    exit: FakeExit,
    recorder: FakeRecorder,
}

impl TargetProcess for FakeProcess {
    fn id(&self) -> u32 {
        self.pid
    }

    fn wait_exit(&mut self) -> Pin<Box<dyn Future<Output = ()> + Send + '_>> {
        let deadline = self.deadline;
        Box::pin(async move {
            match deadline {
                Some(deadline) => tokio::time::sleep_until(deadline).await,
                None => std::future::pending::<()>().await,
            }
        })
    }

    fn exit_code(&mut self) -> ExitReport {
        self.recorder.record(FakeEvent::ExitCodeQueried(self.pid));
        match self.exit {
            FakeExit::Code(code) => ExitReport::Code(code),
            FakeExit::Unknown(errno) => ExitReport::Unknown(io::Error::from_raw_os_error(errno)),
        }
    }
}

impl Drop for FakeProcess {
    fn drop(&mut self) {
        self.recorder.closed(self.pid);
    }
}
