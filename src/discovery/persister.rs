//! Relationship Persister: upserts each accepted relationship
//! and its inverted mirror, with the confidence rules tied to how the
//! relationship was inferred.

use std::sync::Arc;

use chrono::Utc;

use crate::error::EnrichmentError;
use crate::model::relationship::{DiscoveryMetrics, InferenceMethod, SchemaRelationship, ValidatedRelationship};
use crate::repository::RelationshipRepo;

pub struct RelationshipPersister {
    pub relationship_repo: Arc<dyn RelationshipRepo>,
}

impl RelationshipPersister {
    /// Persists every valid, accepted relationship as a forward row plus
    /// its cardinality-inverted mirror. Rejected candidates are skipped
    /// entirely (never persisted).
    pub async fn persist_all(
        &self,
        project_id: i64,
        validated: &[ValidatedRelationship],
    ) -> Result<usize, EnrichmentError> {
        let mut persisted = 0;
        for v in validated {
            if !v.is_valid_fk {
                continue;
            }
            self.persist_one(project_id, v).await?;
            persisted += 1;
        }
        Ok(persisted)
    }

    async fn persist_one(&self, project_id: i64, validated: &ValidatedRelationship) -> Result<(), EnrichmentError> {
        let candidate = &validated.candidate;
        let inference_method = if candidate.is_declared_fk {
            InferenceMethod::ForeignKey
        } else if candidate.detection_method.as_deref() == Some("column_features") {
            InferenceMethod::ColumnFeatures
        } else {
            InferenceMethod::PkMatch
        };
        let confidence = confidence_for(inference_method, validated.confidence);

        let now = Utc::now();
        let forward = SchemaRelationship {
            id: 0,
            project_id,
            source_table: candidate.source.table.clone(),
            source_column: candidate.source.column.clone(),
            target_table: candidate.target.table.clone(),
            target_column: candidate.target.column.clone(),
            relationship_type: "foreign_key".to_string(),
            cardinality: validated.cardinality.as_str().to_string(),
            confidence,
            inference_method: inference_method.as_str().to_string(),
            is_validated: true,
            description: validated.reasoning.clone(),
            created_at: now,
            updated_at: now,
        };

        let reverse = SchemaRelationship {
            id: 0,
            project_id,
            source_table: candidate.target.table.clone(),
            source_column: candidate.target.column.clone(),
            target_table: candidate.source.table.clone(),
            target_column: candidate.source.column.clone(),
            relationship_type: "foreign_key".to_string(),
            cardinality: validated.cardinality.invert().as_str().to_string(),
            confidence,
            inference_method: inference_method.as_str().to_string(),
            is_validated: true,
            // Filled by a separate enrichment pass.
            description: String::new(),
            created_at: now,
            updated_at: now,
        };

        self.relationship_repo.upsert(&forward).await?;
        self.relationship_repo.upsert(&reverse).await?;

        if !candidate.is_declared_fk {
            let metrics = DiscoveryMetrics::from_candidate(candidate);
            self.relationship_repo
                .save_discovery_metrics(
                    project_id,
                    &candidate.source.table,
                    &candidate.source.column,
                    &candidate.target.table,
                    &candidate.target.column,
                    &metrics,
                )
                .await?;
        }

        Ok(())
    }
}

fn confidence_for(method: InferenceMethod, llm_confidence: f64) -> f64 {
    match method {
        InferenceMethod::ForeignKey => 1.0,
        InferenceMethod::ColumnFeatures => 0.9,
        InferenceMethod::PkMatch | InferenceMethod::LlmValidated => llm_confidence,
    }
}
