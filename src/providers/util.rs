use anyhow::Result;
use std::future::Future;
use std::time::Duration;
use tracing::debug;

/// Retries a fallible async fetch a bounded number of times.
///
/// Retry lives here at the network boundary; the core stores never retry.
/// Total runs = 1 initial attempt + `retries`.
pub async fn with_retry<F, Fut, T>(mut operation: F, retries: usize, delay_ms: u64) -> Result<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T>>,
{
    let mut attempt = 1;
    loop {
        match operation().await {
            Ok(value) => return Ok(value),
            Err(err) if attempt <= retries => {
                debug!("Attempt {attempt} failed: {err}. Retrying...");
                attempt += 1;
                tokio::time::sleep(Duration::from_millis(delay_ms)).await;
            }
            Err(err) => return Err(err),
        }
    }
}
