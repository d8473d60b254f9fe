//! Relationship Validator: asks the LLM to confirm or refute
//! each candidate and assign a cardinality, with the same retry/circuit-
//! breaker/worker-pool machinery as column enrichment.

use std::sync::Arc;

use serde::Deserialize;
use tokio_util::sync::CancellationToken;

use crate::error::EnrichmentError;
use crate::llm::prompts::{build_relationship_validation_prompt, RELATIONSHIP_VALIDATION_SYSTEM_MESSAGE};
use crate::llm::LlmClient;
use crate::model::relationship::{Cardinality, RelationshipCandidate, ValidatedRelationship};
use crate::reliability::{retry_with_backoff, CircuitBreaker, RetryConfig, WorkerPool};

#[derive(Debug, Deserialize)]
struct ValidationResponse {
    is_valid_fk: bool,
    confidence: f64,
    cardinality: String,
    reasoning: String,
    #[serde(default)]
    source_role: Option<String>,
}

fn parse_cardinality(raw: &str) -> Cardinality {
    match raw {
        "1:1" => Cardinality::OneToOne,
        "1:N" => Cardinality::OneToMany,
        "N:M" => Cardinality::ManyToMany,
        _ => Cardinality::ManyToOne,
    }
}

pub struct RelationshipValidator {
    pub llm_client: Arc<dyn LlmClient>,
    pub worker_pool: WorkerPool,
    pub retry_config: RetryConfig,
}

impl RelationshipValidator {
    /// Validates every candidate in parallel through the worker pool.
    /// A circuit-open failure falls back to accepting only declared FKs;
    /// every other candidate is dropped from the result rather than
    /// propagating the error.
    pub async fn validate_all(
        &self,
        candidates: Vec<RelationshipCandidate>,
        breaker: &CircuitBreaker,
        cancel: &CancellationToken,
    ) -> Vec<ValidatedRelationship> {
        let results = self
            .worker_pool
            .run_all(cancel, candidates.into_iter(), |candidate| {
                let llm_client = self.llm_client.clone();
                let retry_config = self.retry_config;
                async move { self.validate_one(&llm_client, retry_config, breaker, cancel, candidate).await }
            })
            .await;

        results.into_iter().filter_map(|r| r.ok()).flatten().collect()
    }

    async fn validate_one(
        &self,
        llm_client: &Arc<dyn LlmClient>,
        retry_config: RetryConfig,
        breaker: &CircuitBreaker,
        cancel: &CancellationToken,
        candidate: RelationshipCandidate,
    ) -> Result<Option<ValidatedRelationship>, EnrichmentError> {
        let prompt = build_relationship_validation_prompt(&candidate);

        let outcome = retry_with_backoff(retry_config, cancel, || {
            let prompt = prompt.clone();
            async {
                breaker
                    .call(|| llm_client.generate_response(&prompt, RELATIONSHIP_VALIDATION_SYSTEM_MESSAGE, 0.1))
                    .await
            }
        })
        .await;

        match outcome {
            Ok(raw) => {
                let parsed: ValidationResponse =
                    serde_json::from_str(&raw).map_err(|e| EnrichmentError::LlmParse(e.to_string()))?;
                Ok(Some(ValidatedRelationship {
                    is_valid_fk: parsed.is_valid_fk,
                    confidence: parsed.confidence.clamp(0.0, 1.0),
                    cardinality: parse_cardinality(&parsed.cardinality),
                    reasoning: parsed.reasoning,
                    source_role: parsed.source_role,
                    candidate,
                }))
            },
            Err(err) if err.is_circuit_open() => {
                if candidate.is_declared_fk {
                    Ok(Some(ValidatedRelationship {
                        is_valid_fk: true,
                        confidence: 1.0,
                        cardinality: Cardinality::ManyToOne,
                        reasoning: "circuit open; accepted as a declared database foreign key".to_string(),
                        source_role: None,
                        candidate,
                    }))
                } else {
                    Ok(None)
                }
            },
            Err(err) => Err(err),
        }
    }
}
