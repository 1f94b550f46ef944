pub mod builders;
pub mod scripted_backend;

use std::sync::Once;

use tracing_subscriber::{EnvFilter, fmt};

use frecklaunch::errors::Result;
use frecklaunch::exec::{RunHandle, RunSummary, relay_events};
use frecklaunch::logging::LOG_ENV;

static INIT: Once = Once::new();

/// Initialise tracing for tests.
///
/// Logs go through `with_test_writer()`, so the harness only shows them for
/// failing tests (or with `-- --nocapture`). The filter is read from
/// `FRECKLAUNCH_LOG` like the binary does, then `RUST_LOG`, then `info`:
/// `FRECKLAUNCH_LOG=frecklaunch::exec=debug cargo test`
pub fn init_tracing() {
    INIT.call_once(|| {
        let filter = EnvFilter::try_from_env(LOG_ENV)
            .or_else(|_| EnvFilter::try_from_default_env())
            .unwrap_or_else(|_| EnvFilter::new("info"));

        fmt()
            .with_env_filter(filter)
            .with_test_writer()
            .with_target(true)
            .init();
    });
}

/// Run a future with a 5-second timeout.
pub async fn with_timeout<F, T>(f: F) -> T
where
    F: std::future::Future<Output = T>,
{
    tokio::time::timeout(std::time::Duration::from_secs(5), f)
        .await
        .expect("Test timed out after 5 seconds")
}

/// Relay a run into memory and return what the console would have shown.
pub async fn relay_to_string(handle: &mut RunHandle) -> Result<(RunSummary, String)> {
    let mut out = Vec::new();
    let summary = with_timeout(relay_events(handle, &mut out)).await?;
    Ok((summary, String::from_utf8_lossy(&out).into_owned()))
}
