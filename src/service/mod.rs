use std::future::Future;
use std::time::Duration;

use tokio_retry::strategy::{jitter, FixedInterval};
use tokio_retry::RetryIf;

pub mod blobs;
pub mod catalog;
pub mod favorites;
pub mod histogram;
pub mod ledger;
pub mod users;

mod error;

pub use error::{EngineError, Result};

/// Upper bound on attempts for a contended write before the engine gives up
/// with [EngineError::ConflictRetryExhausted].
pub(crate) const MAX_WRITE_ATTEMPTS: usize = 16;

const RETRY_INTERVAL: Duration = Duration::from_millis(3);

fn backoff() -> impl Iterator<Item = Duration> {
    FixedInterval::new(RETRY_INTERVAL)
        .map(jitter)
        .take(MAX_WRITE_ATTEMPTS - 1)
}

/// Runs a mutating operation, retrying while it fails with a transient write
/// conflict. Conflicts that survive every attempt are reported as
/// [EngineError::ConflictRetryExhausted]; other errors pass through untouched.
pub(crate) async fn with_write_retry<T, F, Fut>(action: F) -> Result<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T>>,
{
    match RetryIf::spawn(backoff(), action, EngineError::is_transient).await {
        Err(error) if error.is_transient() => error::ConflictRetryExhaustedSnafu {
            attempts: MAX_WRITE_ATTEMPTS,
        }
        .fail(),
        result => result,
    }
}
