//! Column Enrichment Engine: per-table, chunked LLM-driven
//! column description with deterministic pattern overrides, enum merging,
//! and project-scoped progress/failure accounting.

use std::collections::HashMap;
use std::sync::Arc;

use tokio_util::sync::CancellationToken;

use crate::detectors::{self, DetectorKind};
use crate::enum_catalog::{self, merge_enum_values};
use crate::error::EnrichmentError;
use crate::llm::prompts::{build_column_chunk_prompt, COLUMN_ENRICHMENT_SYSTEM_MESSAGE};
use crate::llm::LlmFactory;
use crate::model::column::{ResolvedFkTarget, SchemaColumn};
use crate::model::column_detail::{ColumnDetail, ColumnRole};
use crate::model::enum_value::EnumDefinition;
use crate::model::relationship::SchemaRelationship;
use crate::reliability::{retry_with_backoff, CircuitBreaker, CircuitBreakerConfig, RetryConfig, WorkerPool};
use crate::repository::{EntityRepo, OntologyRepo, RelationshipRepo, SchemaRepo};
use crate::discoverer::SchemaDiscoverer;
use crate::tenant::{self, Provenance};

use super::response::ChunkResponse;

pub const CHUNK_SIZE: usize = 50;

/// Result of one `EnrichProject` run. Never carries an error: per-table
/// failures are recorded here, not propagated.
#[derive(Debug, Clone, Default)]
pub struct EnrichmentResult {
    pub tables_enriched: Vec<String>,
    pub tables_failed: Vec<String>,
}

/// `fn(current, total, message)`, invoked once per table completion.
pub type ProgressCallback<'a> = dyn Fn(usize, usize, &str) + Send + Sync + 'a;

pub struct ColumnEnrichmentEngine {
    pub pool: sqlx::SqlitePool,
    pub entity_repo: Arc<dyn EntityRepo>,
    pub schema_repo: Arc<dyn SchemaRepo>,
    pub relationship_repo: Arc<dyn RelationshipRepo>,
    pub ontology_repo: Arc<dyn OntologyRepo>,
    pub discoverer: Arc<dyn SchemaDiscoverer>,
    pub llm_factory: Arc<dyn LlmFactory>,
    pub project_enum_defs: Vec<EnumDefinition>,
    pub worker_pool: WorkerPool,
    pub retry_config: RetryConfig,
    pub circuit_breaker_config: CircuitBreakerConfig,
}

impl ColumnEnrichmentEngine {
    /// Enriches every named table, recovering per-table failures so the
    /// project run as a whole never errors.
    pub async fn enrich_project(
        &self,
        project_id: i64,
        table_names: &[String],
        cancel: &CancellationToken,
        progress: Option<&ProgressCallback<'_>>,
    ) -> EnrichmentResult {
        let mut result = EnrichmentResult::default();
        if table_names.is_empty() {
            return result;
        }

        let breaker = Arc::new(CircuitBreaker::new(self.circuit_breaker_config));
        let total = table_names.len();

        for (idx, table) in table_names.iter().enumerate() {
            if cancel.is_cancelled() {
                result.tables_failed.push(table.clone());
                continue;
            }

            let scope = tenant::acquire_with_provenance(
                self.pool.clone(),
                project_id,
                Provenance::inferred("column_enrichment_engine"),
            );
            let outcome = self.enrich_table(project_id, table, &breaker, cancel).await;
            drop(scope);
            let message = match &outcome {
                Ok(()) => {
                    result.tables_enriched.push(table.clone());
                    format!("enriched {table}")
                },
                Err(err) => {
                    tracing::warn!(table = %table, error = %err, "table enrichment failed");
                    result.tables_failed.push(table.clone());
                    format!("failed {table}: {err}")
                },
            };

            if let Some(cb) = progress {
                cb(idx + 1, total, &message);
            }
        }

        result
    }

    /// Enriches a single table. Returns an error (rather than recording a
    /// failure itself) so `enrich_project` controls accounting.
    pub async fn enrich_table(
        &self,
        project_id: i64,
        table: &str,
        breaker: &CircuitBreaker,
        cancel: &CancellationToken,
    ) -> Result<(), EnrichmentError> {
        let entities = self.entity_repo.get_by_project(project_id).await?;
        let entity = entities
            .iter()
            .find(|e| e.primary_table == table)
            .ok_or_else(|| EnrichmentError::no_entity(table))?;

        let table_name = table.to_string();
        let mut columns_by_table =
            self.schema_repo.get_columns_by_tables(project_id, std::slice::from_ref(&table_name), false).await?;
        let columns = columns_by_table.remove(table).unwrap_or_default();
        if columns.is_empty() {
            return Ok(());
        }

        let relationships = self.relationship_repo.get_by_tables(project_id, std::slice::from_ref(&table_name)).await?;
        let (fk_info, fk_detailed) = build_fk_lookups(table, &relationships);

        let enum_samples = self.sample_enum_candidates(table, &columns).await;

        let llm_client = self.llm_factory.create_for_project(project_id).await?;

        let chunks: Vec<&[SchemaColumn]> = columns.chunks(CHUNK_SIZE).collect();
        let total_chunks = chunks.len();

        let responses = self
            .worker_pool
            .run_all(cancel, chunks.into_iter().enumerate(), |(chunk_index, chunk)| {
                let entity_name = entity.name.clone();
                let entity_description = entity.description.clone();
                let table = table.to_string();
                let chunk_columns = chunk.to_vec();
                let fk_detailed = fk_detailed.clone();
                let enum_samples = enum_samples.clone();
                let retry_config = self.retry_config;
                let llm_client = llm_client.as_ref();
                async move {
                    retry_with_backoff(retry_config, cancel, || {
                        let prompt = build_column_chunk_prompt(
                            &entity_name,
                            &entity_description,
                            &table,
                            &chunk_columns,
                            &fk_detailed,
                            &enum_samples,
                        );
                        async move {
                            breaker
                                .call(|| llm_client.generate_response(&prompt, COLUMN_ENRICHMENT_SYSTEM_MESSAGE, 0.2))
                                .await
                        }
                    })
                    .await
                    .and_then(|raw| {
                        serde_json::from_str::<ChunkResponse>(&raw).map_err(|e| EnrichmentError::LlmParse(e.to_string()))
                    })
                    .map_err(|e| EnrichmentError::chunk_failed(chunk_index, total_chunks, e))
                }
            })
            .await;

        llm_client.close().await;

        let mut enrichment_by_name: HashMap<String, super::response::ColumnEnrichment> = HashMap::new();
        for result in responses {
            let response = result?;
            for column in response.columns {
                enrichment_by_name.insert(column.name.clone(), column);
            }
        }

        let details: Vec<ColumnDetail> = columns
            .iter()
            .map(|column| {
                convert_column(
                    column,
                    enrichment_by_name.get(&column.name),
                    fk_detailed.get(&column.name),
                    fk_info.get(&column.name),
                    &self.project_enum_defs,
                    enum_samples.get(&column.name),
                )
            })
            .collect();

        self.ontology_repo.update_column_details(project_id, table, &details).await?;
        Ok(())
    }

    async fn sample_enum_candidates(&self, table: &str, columns: &[SchemaColumn]) -> HashMap<String, Vec<String>> {
        let mut samples = HashMap::new();
        for column in columns {
            if !enum_catalog::identify_enum_candidates(&column.name, column.distinct_count) {
                continue;
            }
            match self.discoverer.get_distinct_values(table, table, &column.name, 50).await {
                Ok(values) => {
                    samples.insert(column.name.clone(), values);
                },
                Err(err) => {
                    tracing::warn!(table, column = %column.name, error = %err, "enum sampling failed, proceeding without");
                },
            }
        }
        samples
    }
}

/// Builds the `column_name -> target_table` and `column_name ->
/// ResolvedFkTarget` lookups from relationships already persisted for this
/// table.
fn build_fk_lookups(
    table: &str,
    relationships: &[SchemaRelationship],
) -> (HashMap<String, String>, HashMap<String, ResolvedFkTarget>) {
    let mut fk_info = HashMap::new();
    let mut fk_detailed = HashMap::new();

    for rel in relationships {
        if rel.source_table != table {
            continue;
        }
        fk_info.insert(rel.source_column.clone(), rel.target_table.clone());
        fk_detailed.insert(
            rel.source_column.clone(),
            ResolvedFkTarget {
                target_table: rel.target_table.clone(),
                target_column: rel.target_column.clone(),
                detection_method: rel.inference_method.clone(),
                confidence: rel.confidence,
                is_db_constraint: rel.inference_method == "foreign_key",
            },
        );
    }

    (fk_info, fk_detailed)
}

fn parse_role(raw: &str) -> ColumnRole {
    match raw.to_ascii_lowercase().as_str() {
        "identifier" => ColumnRole::Identifier,
        "dimension" => ColumnRole::Dimension,
        "measure" => ColumnRole::Measure,
        _ => ColumnRole::Attribute,
    }
}

/// Converts one column's LLM enrichment plus deterministic overrides into
/// its persisted `ColumnDetail`.
fn convert_column(
    column: &SchemaColumn,
    llm: Option<&super::response::ColumnEnrichment>,
    fk_target: Option<&ResolvedFkTarget>,
    fk_table: Option<&String>,
    project_enum_defs: &[EnumDefinition],
    enum_samples: Option<&Vec<String>>,
) -> ColumnDetail {
    let mut detail = match llm {
        Some(llm) => ColumnDetail {
            name: llm.name.clone(),
            description: llm.description.clone(),
            semantic_type: llm.semantic_type.clone(),
            role: parse_role(&llm.role),
            synonyms: llm.synonyms.clone(),
            enum_values: llm.enum_values.clone(),
            fk_association: llm.fk_association.clone(),
            is_foreign_key: false,
            foreign_table: None,
            detected_role: None,
            features: Vec::new(),
        },
        None => ColumnDetail::from_llm_defaults(&column.name, "", "unknown", ColumnRole::Attribute),
    };

    if let Some(pattern) = detectors::detect_all(column, fk_target) {
        detail.description = pattern.description.clone();
        detail.semantic_type = pattern.semantic_type.clone();
        detail.role = pattern.role;
        if pattern.detector == DetectorKind::ForeignKey {
            if let Some(role) = &pattern.detected_role {
                detail.detected_role = Some(role.clone());
                if detail.fk_association.as_deref().unwrap_or("").is_empty() {
                    detail.fk_association = Some(role.clone());
                }
            }
        }
        detail.features.push(format!("{:?}", pattern.detector));
    }

    if let Some(target) = fk_target {
        detail.is_foreign_key = true;
        detail.foreign_table = Some(target.target_table.clone());
    } else if let Some(table) = fk_table {
        detail.is_foreign_key = true;
        detail.foreign_table = Some(table.clone());
    }

    if enum_catalog::identify_enum_candidates(&column.name, column.distinct_count) {
        // Prefer the broader sample fetched by `sample_enum_candidates`
        // (a dedicated `get_distinct_values` round trip) over the column's
        // small pre-existing `sample_values`, which is what it falls back
        // to when sampling wasn't attempted or came back empty.
        let samples: &[String] = match enum_samples {
            Some(fetched) if !fetched.is_empty() => fetched,
            _ => column.samples(),
        };
        if !samples.is_empty() {
            let merged = merge_enum_values(&column.table, &column.name, samples, project_enum_defs, None);
            if !merged.is_empty() {
                detail.enum_values = Some(merged);
            }
        }
    }

    detail
}
