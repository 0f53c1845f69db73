pub mod builders;
pub mod fake_backend;

use std::future::Future;
use std::sync::Once;
use std::time::Duration;

use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt;

static INIT: Once = Once::new();

/// How long [`with_timeout`] lets a supervision scenario run.
///
/// Generous on purpose: under paused time the fake backend's sleeps advance
/// instantly, so only a real hang reaches this.
pub const SCENARIO_TIMEOUT: Duration = Duration::from_secs(30);

/// Initialise tracing for tests.
///
/// The filter comes from `PROCRUNNER_LOG` (same variable as the binary),
/// falling back to `procrunner=debug` so the supervisor's lifecycle lines
/// show up in a failing test's captured output. Output goes through the test
/// writer, so it is only printed for failures or with `--nocapture`.
pub fn init_tracing() {
    INIT.call_once(|| {
        let filter = EnvFilter::try_from_env("PROCRUNNER_LOG")
            .unwrap_or_else(|_| EnvFilter::new("procrunner=debug"));

        let _ = fmt()
            .with_env_filter(filter)
            .with_test_writer()
            .with_target(false)
            .try_init();
    });
}

/// Drive a supervision scenario to completion or panic after
/// [`SCENARIO_TIMEOUT`].
pub async fn with_timeout<F, T>(scenario: F) -> T
where
    F: Future<Output = T>,
{
    match tokio::time::timeout(SCENARIO_TIMEOUT, scenario).await {
        Ok(out) => out,
        Err(_) => panic!("supervision scenario still running after {SCENARIO_TIMEOUT:?}"),
    }
}
