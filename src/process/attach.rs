// src/process/attach.rs

//! Attaching to an already-running process by id.
//!
//! - Linux: `pidfd_open(2)`; the pidfd becomes readable when the process
//!   exits, so waiting is a plain reactor wait via `AsyncFd`.
//! - Windows: `OpenProcess(SYNCHRONIZE | PROCESS_QUERY_LIMITED_INFORMATION)`;
//!   the handle is waited on from the blocking pool and the exit code is read
//!   with `GetExitCodeProcess`.
//! - Other Unix (macOS, the BSDs): platform gap. There is no pidfd, so the
//!   target is re-checked with `kill(pid, 0)` every 250 ms. Exit is noticed up
//!   to one interval late.
//!
//! The exit status of a process that is not our child cannot be collected on
//! Unix, so [`exit_code`](crate::process::TargetProcess::exit_code) reports
//! `ECHILD` for attached targets there. Windows reports the real code.

#[cfg(unix)]
use std::io;

pub use imp::open_process;

#[cfg(target_os = "linux")]
mod imp {
    use std::future::Future;
    use std::io;
    use std::os::fd::OwnedFd;
    use std::pin::Pin;

    use nix::libc;
    use rustix::process::{Pid, PidfdFlags, pidfd_open};
    use tokio::io::Interest;
    use tokio::io::unix::AsyncFd;
    use tracing::{debug, warn};

    use crate::process::target::{ExitReport, TargetProcess};

    pub struct AttachedProcess {
        pid: u32,
        fd: AsyncFd<OwnedFd>,
        exited: bool,
        wait_error: Option<io::Error>,
    }

    pub fn open_process(pid: u32) -> io::Result<Box<dyn TargetProcess>> {
        let target = Pid::from_raw(super::raw_pid(pid)?)
            .ok_or_else(|| io::Error::from_raw_os_error(libc::ESRCH))?;
        let fd = pidfd_open(target, PidfdFlags::empty()).map_err(io::Error::from)?;

        // SAFETY: the `OwnedFd` moves into the `AsyncFd`, so the descriptor
        // stays open and unchanged until the `AsyncFd` is dropped.
        let fd = unsafe { AsyncFd::register_with_interest(fd, Interest::READABLE) }?;
        debug!(pid, "opened pidfd for target process");

        Ok(Box::new(AttachedProcess {
            pid,
            fd,
            exited: false,
            wait_error: None,
        }))
    }

    impl TargetProcess for AttachedProcess {
        fn id(&self) -> u32 {
            self.pid
        }

        fn wait_exit(&mut self) -> Pin<Box<dyn Future<Output = ()> + Send + '_>> {
            Box::pin(async move {
                if self.exited {
                    return;
                }
                match self.fd.readable().await {
                    Ok(_guard) => {}
                    Err(e) => {
                        warn!(pid = self.pid, error = %e, "waiting on pidfd failed");
                        self.wait_error = Some(e);
                    }
                }
                self.exited = true;
            })
        }

        fn exit_code(&mut self) -> ExitReport {
            ExitReport::Unknown(
                self.wait_error
                    .take()
                    .unwrap_or_else(|| io::Error::from_raw_os_error(libc::ECHILD)),
            )
        }

        fn close(self: Box<Self>) {
            debug!(pid = self.pid, "closing pidfd");
        }
    }
}

#[cfg(all(unix, not(target_os = "linux")))]
mod imp {
    use std::future::Future;
    use std::io;
    use std::pin::Pin;
    use std::time::Duration;

    use nix::errno::Errno;
    use nix::sys::signal::kill;
    use nix::unistd::Pid;
    use tracing::debug;

    use crate::process::target::{ExitReport, TargetProcess};

    const POLL_INTERVAL: Duration = Duration::from_millis(250);

    pub struct AttachedProcess {
        pid: Pid,
        exited: bool,
    }

    pub fn open_process(pid: u32) -> io::Result<Box<dyn TargetProcess>> {
        let pid = Pid::from_raw(super::raw_pid(pid)?);
        if !is_alive(pid)? {
            return Err(io::Error::from(Errno::ESRCH));
        }
        debug!(pid = pid.as_raw(), "attached to target process by polling");
        Ok(Box::new(AttachedProcess { pid, exited: false }))
    }

    /// `EPERM` still means the process exists; we only need to observe it.
    fn is_alive(pid: Pid) -> io::Result<bool> {
        match kill(pid, None) {
            Ok(()) | Err(Errno::EPERM) => Ok(true),
            Err(Errno::ESRCH) => Ok(false),
            Err(e) => Err(io::Error::from(e)),
        }
    }

    impl TargetProcess for AttachedProcess {
        fn id(&self) -> u32 {
            self.pid.as_raw() as u32
        }

        fn wait_exit(&mut self) -> Pin<Box<dyn Future<Output = ()> + Send + '_>> {
            Box::pin(async move {
                while !self.exited {
                    tokio::time::sleep(POLL_INTERVAL).await;
                    self.exited = !matches!(is_alive(self.pid), Ok(true));
                }
            })
        }

        fn exit_code(&mut self) -> ExitReport {
            ExitReport::Unknown(io::Error::from(Errno::ECHILD))
        }
    }
}

#[cfg(windows)]
mod imp {
    use std::future::Future;
    use std::io;
    use std::pin::Pin;
    use std::sync::Arc;

    use tracing::{debug, warn};
    use windows::Win32::Foundation::{CloseHandle, HANDLE, WAIT_FAILED, WAIT_OBJECT_0};
    use windows::Win32::System::Threading::{
        GetExitCodeProcess, OpenProcess, PROCESS_QUERY_LIMITED_INFORMATION, PROCESS_SYNCHRONIZE,
        WaitForSingleObject,
    };

    use crate::process::target::{ExitReport, TargetProcess};

    /// Upper bound on one blocking wait, so a cancelled `wait_exit` releases
    /// its blocking-pool thread promptly.
    const WAIT_SLICE_MS: u32 = 250;

    /// Owned process handle, closed on drop.
    struct ProcessHandle(HANDLE);

    // SAFETY: a process handle is a kernel object reference usable from any
    // thread; it is only closed in `Drop`, after every user is gone.
    unsafe impl Send for ProcessHandle {}
    unsafe impl Sync for ProcessHandle {}

    impl ProcessHandle {
        fn raw(&self) -> HANDLE {
            self.0
        }
    }

    impl Drop for ProcessHandle {
        fn drop(&mut self) {
            // SAFETY: the handle came from `OpenProcess` and is closed once.
            if let Err(e) = unsafe { CloseHandle(self.0) } {
                warn!(error = %e, "closing process handle failed");
            }
        }
    }

    fn to_io_error(err: windows::core::Error) -> io::Error {
        io::Error::from_raw_os_error(err.code().0 & 0xFFFF)
    }

    pub struct AttachedProcess {
        pid: u32,
        handle: Arc<ProcessHandle>,
        exited: bool,
        wait_error: Option<io::Error>,
    }

    pub fn open_process(pid: u32) -> io::Result<Box<dyn TargetProcess>> {
        // SAFETY: plain FFI call; ownership of the returned handle passes to
        // `ProcessHandle`.
        let handle = unsafe {
            OpenProcess(
                PROCESS_SYNCHRONIZE | PROCESS_QUERY_LIMITED_INFORMATION,
                false,
                pid,
            )
        }
        .map_err(to_io_error)?;
        debug!(pid, "opened handle for target process");

        Ok(Box::new(AttachedProcess {
            pid,
            handle: Arc::new(ProcessHandle(handle)),
            exited: false,
            wait_error: None,
        }))
    }

    /// One bounded wait: `Ok(true)` once the process has exited.
    fn wait_slice(handle: &ProcessHandle) -> io::Result<bool> {
        // SAFETY: the handle is open for as long as `handle` is borrowed.
        let event = unsafe { WaitForSingleObject(handle.raw(), WAIT_SLICE_MS) };
        if event == WAIT_OBJECT_0 {
            Ok(true)
        } else if event == WAIT_FAILED {
            Err(io::Error::last_os_error())
        } else {
            Ok(false)
        }
    }

    impl TargetProcess for AttachedProcess {
        fn id(&self) -> u32 {
            self.pid
        }

        fn wait_exit(&mut self) -> Pin<Box<dyn Future<Output = ()> + Send + '_>> {
            Box::pin(async move {
                while !self.exited {
                    let handle = Arc::clone(&self.handle);
                    let waited = tokio::task::spawn_blocking(move || wait_slice(&handle))
                        .await
                        .map_err(io::Error::other)
                        .and_then(|res| res);
                    match waited {
                        Ok(exited) => self.exited = exited,
                        Err(e) => {
                            warn!(pid = self.pid, error = %e, "waiting on process handle failed");
                            self.wait_error = Some(e);
                            self.exited = true;
                        }
                    }
                }
            })
        }

        fn exit_code(&mut self) -> ExitReport {
            if let Some(e) = self.wait_error.take() {
                return ExitReport::Unknown(e);
            }
            let mut code = 0u32;
            // SAFETY: the handle is open and `code` outlives the call.
            match unsafe { GetExitCodeProcess(self.handle.raw(), &mut code) } {
                Ok(()) => ExitReport::Code(code as i32),
                Err(e) => ExitReport::Unknown(to_io_error(e)),
            }
        }

        fn close(self: Box<Self>) {
            debug!(pid = self.pid, "closing process handle");
        }
    }
}

#[cfg(not(any(unix, windows)))]
mod imp {
    use std::io;

    use crate::process::target::TargetProcess;

    pub fn open_process(_pid: u32) -> io::Result<Box<dyn TargetProcess>> {
        Err(io::Error::new(
            io::ErrorKind::Unsupported,
            "attaching to a running process is not supported on this platform",
        ))
    }
}

/// Pids that don't fit a `pid_t` (or are non-positive) can't name a process.
#[cfg(unix)]
fn raw_pid(pid: u32) -> io::Result<i32> {
    match i32::try_from(pid) {
        Ok(raw) if raw > 0 => Ok(raw),
        _ => Err(io::Error::from_raw_os_error(nix::libc::ESRCH)),
    }
}
