//! Exponential backoff retry for GitHub requests.

use std::future::Future;
use std::time::Duration;

use backoff::ExponentialBackoff;
use backoff::backoff::Backoff;
use tracing::warn;

use crate::error::GitHubError;

/// Default: 3 total attempts, base 1s, max 30s.
pub const DEFAULT_MAX_ATTEMPTS: u32 = 3;
const INITIAL_INTERVAL_SECS: u64 = 1;
const MAX_INTERVAL_SECS: u64 = 30;

/// Retry a request with exponential backoff.
///
/// Only transient errors (see [`GitHubError::is_transient`]) are retried; a
/// missing repository fails immediately. When every attempt fails, the last
/// error is wrapped in [`GitHubError::RetriesExhausted`].
pub async fn retry_with_backoff<T, Fut, F>(
    max_attempts: u32,
    mut attempt: F,
) -> Result<T, GitHubError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, GitHubError>>,
{
    let mut backoff = ExponentialBackoff {
        initial_interval: Duration::from_secs(INITIAL_INTERVAL_SECS),
        max_interval: Duration::from_secs(MAX_INTERVAL_SECS),
        max_elapsed_time: None,
        ..Default::default()
    };

    let max_attempts = max_attempts.max(1);
    let mut attempts = 0;

    loop {
        attempts += 1;

        match attempt().await {
            Ok(value) => return Ok(value),
            Err(e) if !e.is_transient() => return Err(e),
            Err(e) if attempts >= max_attempts => {
                return Err(if max_attempts > 1 {
                    GitHubError::RetriesExhausted(Box::new(e))
                } else {
                    e
                });
            }
            Err(e) => {
                warn!(attempt = attempts, error = %e, "GitHub request failed, retrying");
                if let Some(wait_duration) = backoff.next_backoff() {
                    tokio::time::sleep(wait_duration).await;
                }
            }
        }
    }
}
