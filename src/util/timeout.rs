//! Timeout helper.

use std::future::Future;
use std::time::Duration;

use crate::error::MikiError;

/// Wrap a future with a timeout.
pub async fn with_timeout<T>(
    duration: Duration,
    future: impl Future<Output = Result<T, MikiError>>,
) -> Result<T, MikiError> {
    match tokio::time::timeout(duration, future).await {
        Ok(result) => result,
        Err(_) => Err(MikiError::Timeout(millis(duration))),
    }
}

fn millis(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}
