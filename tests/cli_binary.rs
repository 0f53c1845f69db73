// tests/cli_binary.rs
//
// End-to-end checks against the compiled `procrunner` binary.

use std::process::{Command, Output};

fn procrunner(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_procrunner"))
        .args(args)
        .env_remove("PROCRUNNER_CONFIG")
        .env_remove("PROCRUNNER_LOG")
        .output()
        .expect("failed to run procrunner binary")
}

fn stdout(out: &Output) -> String {
    String::from_utf8_lossy(&out.stdout).into_owned()
}

fn stderr(out: &Output) -> String {
    String::from_utf8_lossy(&out.stderr).into_owned()
}

#[test]
fn no_arguments_prints_usage_and_succeeds() {
    let out = procrunner(&[]);
    assert!(out.status.success());
    assert!(stdout(&out).contains("Usage: procrunner"));
}

#[test]
fn too_many_arguments_prints_usage_and_succeeds() {
    let out = procrunner(&["sleep 1", "1", "2"]);
    assert!(out.status.success());
    assert!(stdout(&out).contains("Usage: procrunner"));
}

#[test]
fn malformed_pid_fails_before_anything_runs() {
    let out = procrunner(&["sleep 1", "12abc"]);
    assert!(!out.status.success());
    assert!(stderr(&out).contains("invalid process id: 12abc"));
    assert!(!stdout(&out).contains("starting process"));
}

#[test]
fn negative_pid_is_reported_as_invalid() {
    let out = procrunner(&["sleep 1", "-5"]);
    assert!(!out.status.success());
    assert!(stderr(&out).contains("invalid process id: -5"));
}

#[test]
fn spawn_failure_exits_with_failure() {
    let out = procrunner(&["/definitely/not/a/real/program-xyz --flag"]);
    assert!(!out.status.success());
    let err = stderr(&out);
    assert!(err.contains("failed to start process"), "stderr: {err}");
    assert!(err.contains("Error "), "stderr: {err}");
}

#[cfg(target_os = "linux")]
#[test]
fn attach_to_missing_pid_exits_with_failure() {
    let pid = i32::MAX.to_string();
    let out = procrunner(&["sleep 1", &pid]);
    assert!(!out.status.success());
    let err = stderr(&out);
    assert!(err.contains("could not attach to process with id"), "stderr: {err}");
    assert!(!stdout(&out).contains("starting process"));
}

#[cfg(unix)]
#[test]
fn interrupt_shuts_down_cleanly() {
    use std::time::{Duration, Instant};

    use nix::sys::signal::{Signal, kill};
    use nix::unistd::Pid;

    let mut child = Command::new(env!("CARGO_BIN_EXE_procrunner"))
        .arg("sleep 2")
        .env_remove("PROCRUNNER_CONFIG")
        .env_remove("PROCRUNNER_LOG")
        .stdout(std::process::Stdio::piped())
        .stderr(std::process::Stdio::piped())
        .spawn()
        .expect("failed to start procrunner");

    std::thread::sleep(Duration::from_millis(500));
    kill(Pid::from_raw(child.id() as i32), Signal::SIGINT).expect("send SIGINT");

    let deadline = Instant::now() + Duration::from_secs(10);
    while child.try_wait().expect("try_wait").is_none() {
        assert!(Instant::now() < deadline, "procrunner did not exit after SIGINT");
        std::thread::sleep(Duration::from_millis(50));
    }

    let out = child.wait_with_output().expect("collect output");
    assert!(out.status.success(), "stderr: {}", stderr(&out));
    let text = stdout(&out);
    assert!(text.contains("starting process"), "stdout: {text}");
    assert!(text.contains("exiting"), "stdout: {text}");
    assert!(!text.contains("process terminated"), "stdout: {text}");
}
