//! Shared helpers for the `signalwatch` integration tests.

pub mod builders;
pub mod recording_emitter;

use std::future::Future;
use std::sync::Once;
use std::time::Duration;

use signalwatch::{SignalBatch, Value};
use tracing_subscriber::EnvFilter;

/// Upper bound for any single await in async tests.
pub const TEST_TIMEOUT: Duration = Duration::from_secs(5);

static TRACING: Once = Once::new();

/// Install a test-writer subscriber once per test binary.
///
/// Output is captured by the harness and only shown for failing tests.
/// `RUST_LOG=signalwatch=debug` narrows or widens it.
pub fn init_tracing() {
    TRACING.call_once(|| {
        let filter = EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new("signalwatch=debug,warn"));

        // Another harness may already have installed a subscriber.
        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_test_writer()
            .try_init();
    });
}

/// Await `fut`, panicking if it takes longer than [`TEST_TIMEOUT`].
pub async fn with_timeout<F: Future>(fut: F) -> F::Output {
    match tokio::time::timeout(TEST_TIMEOUT, fut).await {
        Ok(out) => out,
        Err(_) => panic!("test step did not finish within {TEST_TIMEOUT:?}"),
    }
}

/// Build an ordered batch from `(name, value)` pairs.
pub fn batch<V, I>(pairs: I) -> SignalBatch
where
    V: Into<Value>,
    I: IntoIterator<Item = (&'static str, V)>,
{
    pairs
        .into_iter()
        .map(|(name, value)| (name.to_string(), value.into()))
        .collect()
}
