//! Reliability substrate shared by the enrichment and discovery engines:
//! worker pool admission, circuit breaker, and retry policy.

pub mod circuit_breaker;
pub mod retry;
pub mod worker_pool;

pub use circuit_breaker::{CircuitBreaker, CircuitBreakerConfig};
pub use retry::{retry_with_backoff, RetryConfig};
pub use worker_pool::WorkerPool;
