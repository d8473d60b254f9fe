//! Relationship Discovery Pipeline orchestrator: wires the collector,
//! validator, and persister into one `discover_project` entry point.

use std::sync::Arc;

use tokio_util::sync::CancellationToken;

use crate::error::EnrichmentError;
use crate::llm::LlmFactory;
use crate::reliability::{CircuitBreaker, CircuitBreakerConfig, RetryConfig, WorkerPool};
use crate::tenant::{self, Provenance};

use super::collector::{CandidateCollector, ProgressCallback};
use super::persister::RelationshipPersister;
use super::validator::RelationshipValidator;

pub struct RelationshipDiscoveryEngine {
    pub pool: sqlx::SqlitePool,
    pub collector: CandidateCollector,
    pub persister: RelationshipPersister,
    pub llm_factory: Arc<dyn LlmFactory>,
    pub worker_pool: WorkerPool,
    pub retry_config: RetryConfig,
    pub circuit_breaker_config: CircuitBreakerConfig,
}

#[derive(Debug, Clone, Default)]
pub struct DiscoveryResult {
    pub relationships_persisted: usize,
    pub candidates_considered: usize,
}

impl RelationshipDiscoveryEngine {
    pub async fn discover_project(
        &self,
        project_id: i64,
        table_names: &[String],
        cancel: &CancellationToken,
        progress: Option<&ProgressCallback<'_>>,
    ) -> Result<DiscoveryResult, EnrichmentError> {
        let _scope = tenant::acquire_with_provenance(
            self.pool.clone(),
            project_id,
            Provenance::inferred("relationship_discovery_engine"),
        );

        let candidates = self.collector.collect_candidates(project_id, table_names, progress).await?;
        let candidates_considered = candidates.len();
        if candidates.is_empty() {
            return Ok(DiscoveryResult { relationships_persisted: 0, candidates_considered });
        }

        let breaker = CircuitBreaker::new(self.circuit_breaker_config);
        let llm_client: Arc<_> = self.llm_factory.create_for_project(project_id).await?.into();

        let validator = RelationshipValidator {
            llm_client,
            worker_pool: self.worker_pool.clone(),
            retry_config: self.retry_config,
        };
        let validated = validator.validate_all(candidates, &breaker, cancel).await;

        let relationships_persisted = self.persister.persist_all(project_id, &validated).await?;

        Ok(DiscoveryResult { relationships_persisted, candidates_considered })
    }
}
