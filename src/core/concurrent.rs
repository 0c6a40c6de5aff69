use crate::utils::error::{JewelMusicError, Result};
use futures::stream::{self, StreamExt};
use std::future::Future;
use std::time::Duration;
use tokio::time::Instant;

/// Run independent requests with at most `limit` in flight.
///
/// Results come back in input order. A `limit` of zero is treated as one.
pub async fn run_concurrently<I, F, T>(limit: usize, futures: I) -> Vec<T>
where
    I: IntoIterator<Item = F>,
    F: Future<Output = T>,
{
    stream::iter(futures).buffered(limit.max(1)).collect().await
}

/// Call `fetch` every `interval` until `is_complete` accepts the result.
///
/// Errors from `fetch` end polling immediately. Gives up with
/// [`JewelMusicError::Timeout`] once `timeout` has elapsed.
pub async fn poll_until<T, F, Fut, P>(
    operation: &str,
    interval: Duration,
    timeout: Duration,
    mut fetch: F,
    is_complete: P,
) -> Result<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T>>,
    P: Fn(&T) -> bool,
{
    let started = Instant::now();
    let deadline = started + timeout;

    loop {
        let value = fetch().await?;
        if is_complete(&value) {
            return Ok(value);
        }

        let now = Instant::now();
        if now >= deadline {
            return Err(JewelMusicError::Timeout {
                operation: operation.to_string(),
                waited: now - started,
            });
        }

        tracing::debug!("{} not finished, polling again in {:?}", operation, interval);
        tokio::time::sleep(interval.min(deadline - now)).await;
    }
}
