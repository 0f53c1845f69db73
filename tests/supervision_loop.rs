// tests/supervision_loop.rs

use std::error::Error;
use std::sync::Arc;
use std::time::Duration;

use tokio::time::{Instant, sleep_until};

use procrunner::errors::RunnerError;
use procrunner::supervisor::{Supervisor, SupervisorContext};
use procrunner_test_utils::builders::OptionsBuilder;
use procrunner_test_utils::fake_backend::{FakeBackend, FakeEvent, FakeRun};
use procrunner_test_utils::{init_tracing, with_timeout};

type TestResult = Result<(), Box<dyn Error>>;

const ESRCH: i32 = 3;
const ENOENT: i32 = 2;
const ECHILD: i32 = 10;

fn secs(s: f64) -> Duration {
    Duration::from_secs_f64(s)
}

#[tokio::test(start_paused = true)]
async fn spawn_failure_is_fatal_and_never_waits() -> TestResult {
    init_tracing();

    let backend = FakeBackend::new([FakeRun::FailToStart(ENOENT)]);
    let recorder = backend.recorder();
    let ctx = SupervisorContext::shared();
    let supervisor = Supervisor::new(backend, OptionsBuilder::new("worker").build(), Arc::clone(&ctx));

    let result = with_timeout(supervisor.run()).await;

    match result {
        Err(RunnerError::Spawn { command, source }) => {
            assert_eq!(command, "worker");
            assert_eq!(source.raw_os_error(), Some(ENOENT));
        }
        other => panic!("expected spawn error, got {other:?}"),
    }
    assert_eq!(recorder.spawn_attempts(), 1);
    assert_eq!(recorder.spawn_count(), 0);
    assert_eq!(recorder.live(), 0);
    // Completion is still signalled so a pending coordinator doesn't stall.
    assert!(ctx.is_complete());
    Ok(())
}

#[tokio::test(start_paused = true)]
async fn attach_failure_is_fatal_without_spawning() -> TestResult {
    init_tracing();

    let backend = FakeBackend::new([]).with_attach(FakeRun::FailToStart(ESRCH));
    let recorder = backend.recorder();
    let options = OptionsBuilder::new("worker").attach(99999).build();
    let supervisor = Supervisor::new(backend, options, SupervisorContext::shared());

    let result = with_timeout(supervisor.run()).await;

    match result {
        Err(RunnerError::Attach { pid, source }) => {
            assert_eq!(pid, 99999);
            assert_eq!(source.raw_os_error(), Some(ESRCH));
        }
        other => panic!("expected attach error, got {other:?}"),
    }
    assert_eq!(recorder.events(), vec![FakeEvent::OpenAttempted(99999)]);
    assert_eq!(recorder.spawn_attempts(), 0);
    Ok(())
}

#[tokio::test(start_paused = true)]
async fn restarts_after_fixed_delay() -> TestResult {
    init_tracing();

    let backend = FakeBackend::new([
        FakeRun::ExitAfter(secs(1.0), 1),
        FakeRun::ExitAfter(secs(1.0), 0),
    ]);
    let recorder = backend.recorder();
    let ctx = SupervisorContext::shared();
    let options = OptionsBuilder::new("worker --flag")
        .restart_delay(Duration::from_millis(5000))
        .build();
    let start = Instant::now();
    let handle = tokio::spawn(Supervisor::new(backend, options, Arc::clone(&ctx)).run());

    // First process runs 0s..1s, restart delay until 6s.
    sleep_until(start + secs(0.5)).await;
    assert_eq!(recorder.spawn_count(), 1);

    sleep_until(start + secs(5.9)).await;
    assert_eq!(recorder.spawn_count(), 1, "restart must wait for the delay");
    assert_eq!(recorder.exit_code_queries(), 1);
    assert_eq!(recorder.live(), 0, "handle is released before the delay");

    sleep_until(start + secs(6.1)).await;
    assert_eq!(recorder.spawn_count(), 2);

    // Second process runs 6s..7s, third starts at 12s and runs forever.
    sleep_until(start + secs(12.5)).await;
    assert_eq!(recorder.spawn_count(), 3);
    assert_eq!(recorder.exit_code_queries(), 2);

    ctx.request_shutdown();
    with_timeout(handle).await??;

    assert_eq!(recorder.max_live(), 1, "never more than one live handle");
    assert_eq!(recorder.live(), 0);
    assert_eq!(recorder.exit_code_queries(), 2);
    assert!(ctx.is_complete());
    Ok(())
}

#[tokio::test(start_paused = true)]
async fn shutdown_mid_run_releases_handle_without_exit_query() -> TestResult {
    init_tracing();

    let backend = FakeBackend::new([FakeRun::RunForever]);
    let recorder = backend.recorder();
    let ctx = SupervisorContext::shared();
    let handle = tokio::spawn(
        Supervisor::new(backend, OptionsBuilder::new("worker").build(), Arc::clone(&ctx)).run(),
    );

    tokio::time::sleep(secs(3.0)).await;
    assert_eq!(recorder.live(), 1);

    ctx.request_shutdown();
    with_timeout(handle).await??;

    assert_eq!(recorder.exit_code_queries(), 0);
    assert_eq!(recorder.spawn_count(), 1);
    assert_eq!(
        recorder.events(),
        vec![
            FakeEvent::SpawnAttempted("worker".to_string()),
            FakeEvent::Spawned(1000),
            FakeEvent::Closed(1000),
        ]
    );
    assert!(ctx.is_complete());
    Ok(())
}

#[tokio::test(start_paused = true)]
async fn shutdown_during_restart_delay_is_immediate() -> TestResult {
    init_tracing();

    let backend = FakeBackend::new([FakeRun::ExitAfter(Duration::from_millis(100), 3)]);
    let recorder = backend.recorder();
    let ctx = SupervisorContext::shared();
    let start = Instant::now();
    let handle = tokio::spawn(
        Supervisor::new(backend, OptionsBuilder::new("worker").build(), Arc::clone(&ctx)).run(),
    );

    // Well inside the 5s restart delay.
    sleep_until(start + secs(1.0)).await;
    assert_eq!(recorder.live(), 0);

    let requested_at = Instant::now();
    ctx.request_shutdown();
    with_timeout(handle).await??;

    assert!(
        requested_at.elapsed() < Duration::from_millis(100),
        "delay should be preempted, took {:?}",
        requested_at.elapsed()
    );
    assert_eq!(recorder.spawn_count(), 1, "no respawn after shutdown");
    Ok(())
}

#[tokio::test(start_paused = true)]
async fn nothing_is_started_once_shutdown_was_requested() -> TestResult {
    init_tracing();

    let backend = FakeBackend::new([]);
    let recorder = backend.recorder();
    let ctx = SupervisorContext::shared();
    ctx.request_shutdown();

    let options = OptionsBuilder::new("worker").attach(42).build();
    with_timeout(Supervisor::new(backend, options, Arc::clone(&ctx)).run()).await?;

    assert!(recorder.events().is_empty());
    assert!(ctx.is_complete());
    Ok(())
}

#[tokio::test(start_paused = true)]
async fn attaches_first_then_spawns_replacements() -> TestResult {
    init_tracing();

    let backend = FakeBackend::new([FakeRun::RunForever])
        .with_attach(FakeRun::ExitAfter(secs(1.0), 0));
    let recorder = backend.recorder();
    let ctx = SupervisorContext::shared();
    let options = OptionsBuilder::new("worker").attach(42).build();
    let start = Instant::now();
    let handle = tokio::spawn(Supervisor::new(backend, options, Arc::clone(&ctx)).run());

    sleep_until(start + secs(7.0)).await;
    ctx.request_shutdown();
    with_timeout(handle).await??;

    assert_eq!(
        recorder.events(),
        vec![
            FakeEvent::OpenAttempted(42),
            FakeEvent::Opened(42),
            FakeEvent::ExitCodeQueried(42),
            FakeEvent::Closed(42),
            FakeEvent::SpawnAttempted("worker".to_string()),
            FakeEvent::Spawned(1000),
            FakeEvent::Closed(1000),
        ]
    );
    Ok(())
}

#[tokio::test(start_paused = true)]
async fn unknown_exit_code_is_not_fatal() -> TestResult {
    init_tracing();

    let backend = FakeBackend::new([FakeRun::ExitUnknownAfter(secs(1.0), ECHILD)]);
    let recorder = backend.recorder();
    let ctx = SupervisorContext::shared();
    let start = Instant::now();
    let handle = tokio::spawn(
        Supervisor::new(backend, OptionsBuilder::new("worker").build(), Arc::clone(&ctx)).run(),
    );

    sleep_until(start + secs(6.5)).await;
    assert_eq!(recorder.exit_code_queries(), 1);
    assert_eq!(recorder.spawn_count(), 2, "loop keeps going after an unknown code");

    ctx.request_shutdown();
    with_timeout(handle).await??;
    Ok(())
}
