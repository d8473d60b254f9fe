//! Circuit breaker guarding the LLM upstream.
//!
//! One instance is shared by an enrichment engine across all LLM calls for
//! a single project run, not shared process-wide. The failure counter is the only mutable shared state
//! in the reliability substrate and is guarded by a `tokio::sync::Mutex`,
//! per the concurrency model's mutex-or-atomic requirement.

use std::future::Future;
use std::time::{Duration, Instant};

use tokio::sync::Mutex;

use crate::error::EnrichmentError;

#[derive(Debug, Clone, Copy)]
pub struct CircuitBreakerConfig {
    pub threshold: u32,
    pub reset_after: Duration,
}

impl Default for CircuitBreakerConfig {
    fn default() -> Self {
        Self { threshold: 5, reset_after: Duration::from_secs(30) }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    Closed,
    Open,
    HalfOpen,
}

struct Inner {
    state: State,
    consecutive_failures: u32,
    opened_at: Option<Instant>,
}

pub struct CircuitBreaker {
    config: CircuitBreakerConfig,
    inner: Mutex<Inner>,
}

impl CircuitBreaker {
    pub fn new(config: CircuitBreakerConfig) -> Self {
        Self {
            config,
            inner: Mutex::new(Inner { state: State::Closed, consecutive_failures: 0, opened_at: None }),
        }
    }

    /// Run `op`, respecting the breaker's current state.
    ///
    /// While open (and the cool-down has not elapsed) the call fails fast
    /// with `EnrichmentError::CircuitOpen` without ever invoking `op`.
    /// After `reset_after` elapses, exactly one probing call is allowed
    /// through (half-open); its outcome decides whether the breaker closes
    /// or reopens with a fresh timer.
    pub async fn call<F, Fut, T>(&self, op: F) -> Result<T, EnrichmentError>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, EnrichmentError>>,
    {
        if !self.admit().await {
            return Err(EnrichmentError::CircuitOpen);
        }

        match op().await {
            Ok(value) => {
                self.on_success().await;
                Ok(value)
            },
            Err(err) => {
                self.on_failure().await;
                Err(err)
            },
        }
    }

    /// Decide whether a call may proceed, transitioning Open -> HalfOpen
    /// when the cool-down has elapsed.
    async fn admit(&self) -> bool {
        let mut inner = self.inner.lock().await;
        match inner.state {
            State::Closed => true,
            State::HalfOpen => false, // a probe is already in flight
            State::Open => {
                let elapsed = inner.opened_at.map(|t| t.elapsed()).unwrap_or_default();
                if elapsed >= self.config.reset_after {
                    inner.state = State::HalfOpen;
                    true
                } else {
                    false
                }
            },
        }
    }

    async fn on_success(&self) {
        let mut inner = self.inner.lock().await;
        inner.state = State::Closed;
        inner.consecutive_failures = 0;
        inner.opened_at = None;
    }

    async fn on_failure(&self) {
        let mut inner = self.inner.lock().await;
        match inner.state {
            State::HalfOpen => {
                inner.state = State::Open;
                inner.opened_at = Some(Instant::now());
                inner.consecutive_failures = self.config.threshold;
            },
            State::Closed | State::Open => {
                inner.consecutive_failures += 1;
                if inner.consecutive_failures >= self.config.threshold {
                    inner.state = State::Open;
                    inner.opened_at = Some(Instant::now());
                }
            },
        }
    }

    #[cfg(test)]
    async fn is_open(&self) -> bool {
        matches!(self.inner.lock().await.state, State::Open)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn opens_after_threshold_consecutive_failures() {
        let breaker = CircuitBreaker::new(CircuitBreakerConfig {
            threshold: 3,
            reset_after: Duration::from_secs(30),
        });

        for _ in 0..3 {
            let result = breaker.call(|| async { Err::<(), _>(EnrichmentError::other("boom")) }).await;
            assert!(result.is_err());
        }

        assert!(breaker.is_open().await);

        // next request fails fast without invoking upstream
        let result: Result<(), _> =
            breaker.call(|| async { panic!("must not be called while open") }).await;
        assert!(matches!(result, Err(EnrichmentError::CircuitOpen)));
    }

    #[tokio::test]
    async fn successes_clear_the_counter() {
        let breaker = CircuitBreaker::new(CircuitBreakerConfig {
            threshold: 3,
            reset_after: Duration::from_secs(30),
        });

        for _ in 0..2 {
            let _ = breaker.call(|| async { Err::<(), _>(EnrichmentError::other("boom")) }).await;
        }
        let _ = breaker.call(|| async { Ok::<_, EnrichmentError>(()) }).await;
        assert!(!breaker.is_open().await);

        for _ in 0..2 {
            let _ = breaker.call(|| async { Err::<(), _>(EnrichmentError::other("boom")) }).await;
        }
        assert!(!breaker.is_open().await);
    }

    #[tokio::test]
    async fn half_open_probe_recovers_to_closed() {
        let breaker = CircuitBreaker::new(CircuitBreakerConfig {
            threshold: 1,
            reset_after: Duration::from_millis(10),
        });

        let _ = breaker.call(|| async { Err::<(), _>(EnrichmentError::other("boom")) }).await;
        assert!(breaker.is_open().await);

        tokio::time::sleep(Duration::from_millis(20)).await;

        let result = breaker.call(|| async { Ok::<_, EnrichmentError>(()) }).await;
        assert!(result.is_ok());
        assert!(!breaker.is_open().await);
    }

    #[tokio::test]
    async fn half_open_probe_failure_reopens_with_fresh_timer() {
        let breaker = CircuitBreaker::new(CircuitBreakerConfig {
            threshold: 1,
            reset_after: Duration::from_millis(10),
        });

        let _ = breaker.call(|| async { Err::<(), _>(EnrichmentError::other("boom")) }).await;
        tokio::time::sleep(Duration::from_millis(20)).await;
        let result = breaker.call(|| async { Err::<(), _>(EnrichmentError::other("still down")) }).await;
        assert!(result.is_err());
        assert!(breaker.is_open().await);
    }
}
