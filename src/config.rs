//! Runtime configuration for the enrichment and discovery engines.
//!
//! Loading this from a CLI, environment variables, or a config file is an
//! external collaborator's job; this module only defines the shape and
//! sane defaults, the way `reliability` defines its own per-component
//! config structs. A deployment wires a `Config` together however it
//! likes (file, env, hardcoded) and passes the pieces to `WorkerPool`,
//! `CircuitBreaker`, `RetryConfig`, and the enrichment/discovery engines.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::reliability::{CircuitBreakerConfig, RetryConfig};

/// Bounds how many table-level tasks run concurrently within one project.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(default)]
pub struct WorkerPoolConfig {
    pub max_concurrent: usize,
}

impl Default for WorkerPoolConfig {
    fn default() -> Self {
        Self { max_concurrent: 8 }
    }
}

/// Serde-friendly front end for `reliability::CircuitBreakerConfig`, whose
/// `Duration` field doesn't deserialize from a plain integer.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(default)]
pub struct CircuitBreakerSettings {
    pub threshold: u32,
    pub reset_after_secs: u64,
}

impl Default for CircuitBreakerSettings {
    fn default() -> Self {
        let defaults = CircuitBreakerConfig::default();
        Self { threshold: defaults.threshold, reset_after_secs: defaults.reset_after.as_secs() }
    }
}

impl From<CircuitBreakerSettings> for CircuitBreakerConfig {
    fn from(settings: CircuitBreakerSettings) -> Self {
        Self { threshold: settings.threshold, reset_after: Duration::from_secs(settings.reset_after_secs) }
    }
}

/// Serde-friendly front end for `reliability::RetryConfig`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(default)]
pub struct RetrySettings {
    pub max_attempts: u32,
    pub base_delay_ms: u64,
}

impl Default for RetrySettings {
    fn default() -> Self {
        let defaults = RetryConfig::default();
        Self { max_attempts: defaults.max_attempts, base_delay_ms: defaults.base_delay.as_millis() as u64 }
    }
}

impl From<RetrySettings> for RetryConfig {
    fn from(settings: RetrySettings) -> Self {
        Self { max_attempts: settings.max_attempts, base_delay: Duration::from_millis(settings.base_delay_ms) }
    }
}

/// Knobs governing enrichment and discovery behavior that aren't owned by
/// the reliability substrate: chunk size for column enrichment, the
/// distinct-value ceiling below which a column is treated as an enum
/// candidate, and the reverse-orphan-rate ceiling used when collecting
/// relationship candidates.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(default)]
pub struct EnrichmentConfig {
    pub chunk_size: usize,
    pub enum_distinct_threshold: u64,
    pub reverse_orphan_threshold: f64,
}

impl Default for EnrichmentConfig {
    fn default() -> Self {
        Self { chunk_size: 50, enum_distinct_threshold: 50, reverse_orphan_threshold: 0.5 }
    }
}

/// Top-level configuration bundle. A deployment typically builds one of
/// these per project run and derives the reliability-substrate types from
/// its sub-structs before constructing `ColumnEnrichmentEngine` and
/// `RelationshipDiscoveryEngine`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    pub worker_pool: WorkerPoolConfig,
    pub circuit_breaker: CircuitBreakerSettings,
    pub retry: RetrySettings,
    pub enrichment: EnrichmentConfig,
}

impl Config {
    pub fn circuit_breaker_config(&self) -> CircuitBreakerConfig {
        self.circuit_breaker.into()
    }

    pub fn retry_config(&self) -> RetryConfig {
        self.retry.into()
    }
}
