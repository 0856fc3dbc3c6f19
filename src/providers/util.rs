use anyhow::Error;
use std::future::Future;
use std::time::Duration;
use tracing::debug;

/// Retries an async operation with exponential backoff
///
/// # Parameters
/// - `operation`: Closure returning a future
/// - `retries`: Number of retry attempts (total runs = 1 initial + retries)
/// - `delay_ms`: Milliseconds before the first retry, doubled on each further retry
///
/// # Returns
/// Either the successful result or the error after all attempts
pub async fn with_retry<F, Fut, T, E>(
    mut operation: F,
    retries: usize,
    delay_ms: u64,
) -> Result<T, Error>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: Into<Error>,
{
    let mut attempt = 1;
    loop {
        match operation().await.map_err(Into::into) {
            Ok(val) => return Ok(val),
            Err(err) => {
                if attempt > retries {
                    return Err(err);
                }
                let backoff = backoff_ms(delay_ms, attempt);
                debug!(
                    "Attempt {}/{} failed: {:#}. Retrying in {}ms...",
                    attempt, retries, err, backoff
                );
                attempt += 1;
                tokio::time::sleep(Duration::from_millis(backoff)).await;
            }
        }
    }
}

fn backoff_ms(delay_ms: u64, attempt: usize) -> u64 {
    let exponent = u32::try_from(attempt.saturating_sub(1)).unwrap_or(u32::MAX);
    delay_ms.saturating_mul(2u64.saturating_pow(exponent))
}
