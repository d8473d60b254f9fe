//! Candidate Collector: finds plausible foreign-key column
//! pairs by type compatibility and column features, then filters by
//! value-overlap join statistics against the live source database.

use std::sync::Arc;

use crate::discoverer::SchemaDiscoverer;
use crate::error::EnrichmentError;
use crate::model::column::{ClassificationPath, SchemaColumn, StructuralRole};
use crate::model::relationship::{CandidateEndpoint, RelationshipCandidate};
use crate::repository::SchemaRepo;

use super::type_category;

#[derive(Debug, Clone, Copy)]
pub struct CollectorConfig {
    /// Empirical 0.5 default, made configurable.
    pub reverse_orphan_threshold: f64,
    pub small_lookup_max_value: i64,
    pub small_lookup_min_target_distinct: u64,
    pub status_column_distinct_ratio: f64,
}

impl Default for CollectorConfig {
    fn default() -> Self {
        Self {
            reverse_orphan_threshold: 0.5,
            small_lookup_max_value: 10,
            small_lookup_min_target_distinct: 10,
            status_column_distinct_ratio: 0.01,
        }
    }
}

pub struct CandidateCollector {
    pub schema_repo: Arc<dyn SchemaRepo>,
    pub discoverer: Arc<dyn SchemaDiscoverer>,
    pub config: CollectorConfig,
}

/// `fn(current, total, message)`.
pub type ProgressCallback<'a> = dyn Fn(usize, usize, &str) + Send + Sync + 'a;

impl CandidateCollector {
    /// Returns whether `column` is eligible as an FK source.
    fn is_source(column: &SchemaColumn) -> bool {
        if column.is_primary_key {
            return false;
        }
        if matches!(
            column
                .features
                .as_ref()
                .map(|f| f.classification_path())
                .unwrap_or(ClassificationPath::Other),
            ClassificationPath::Timestamp | ClassificationPath::Boolean | ClassificationPath::Json
        ) {
            return false;
        }
        if type_category::classify(&column.data_type)
            .map(|c| {
                matches!(
                    c,
                    crate::model::relationship::TypeCategory::Timestamp
                        | crate::model::relationship::TypeCategory::Boolean
                        | crate::model::relationship::TypeCategory::Json
                )
            })
            .unwrap_or(false)
        {
            return false;
        }

        let Some(features) = &column.features else { return false };
        features.role() == Some(StructuralRole::ForeignKey)
            || features.purpose() == crate::model::column::Purpose::Identifier
            || matches!(features.classification_path(), ClassificationPath::Uuid | ClassificationPath::ExternalId)
            || features.is_joinable()
    }

    /// Spec §4.H step 3: only PK or unique columns qualify as targets.
    fn is_target(column: &SchemaColumn) -> bool {
        column.is_primary_key || column.is_unique
    }

    pub async fn collect_candidates(
        &self,
        project_id: i64,
        table_names: &[String],
        progress: Option<&ProgressCallback<'_>>,
    ) -> Result<Vec<RelationshipCandidate>, EnrichmentError> {
        let columns_by_table = self.schema_repo.get_columns_by_tables(project_id, table_names, false).await?;

        let mut sources = Vec::new();
        let mut targets = Vec::new();
        for columns in columns_by_table.values() {
            for column in columns {
                if Self::is_source(column) {
                    sources.push(column.clone());
                }
                if Self::is_target(column) {
                    targets.push(column.clone());
                }
            }
        }

        let mut seen_pairs = std::collections::HashSet::new();
        let mut candidates = self.collect_declared_fk_candidates(&columns_by_table, &mut seen_pairs).await?;

        let total_pairs = sources.len() * targets.len();
        let mut checked = 0usize;

        for source in &sources {
            for target in &targets {
                checked += 1;
                if let Some(cb) = progress {
                    cb(checked, total_pairs.max(1), &format!("{}.{} -> {}.{}", source.table, source.name, target.table, target.name));
                }

                if source.table == target.table && source.name == target.name {
                    continue;
                }
                if !type_category::compatible(&source.data_type, &target.data_type) {
                    continue;
                }
                let pair_key = (source.table.clone(), source.name.clone(), target.table.clone(), target.name.clone());
                if seen_pairs.contains(&pair_key) {
                    continue;
                }

                let join = self
                    .discoverer
                    .analyze_join(&source.table, &source.table, &source.name, &target.table, &target.table, &target.name)
                    .await?;

                if join.source_matched == 0 || join.orphan_count > 0 {
                    continue;
                }
                if let Some(max_value) = join.max_source_value {
                    if max_value <= self.config.small_lookup_max_value
                        && target.distinct_count.unwrap_or(0) > self.config.small_lookup_min_target_distinct
                    {
                        continue;
                    }
                }
                if let (Some(distinct), Some(rows)) = (target.distinct_count, target.row_count) {
                    if rows > 0 && (distinct as f64 / rows as f64) < self.config.status_column_distinct_ratio {
                        continue;
                    }
                }
                let reverse_denom = join.target_matched + join.reverse_orphan_count;
                if reverse_denom > 0
                    && join.reverse_orphan_count as f64 / reverse_denom as f64 > self.config.reverse_orphan_threshold
                {
                    continue;
                }

                let source_samples = self
                    .discoverer
                    .get_distinct_values(&source.table, &source.table, &source.name, 10)
                    .await
                    .unwrap_or_default();
                let target_samples = self
                    .discoverer
                    .get_distinct_values(&target.table, &target.table, &target.name, 10)
                    .await
                    .unwrap_or_default();

                candidates.push(RelationshipCandidate {
                    source: CandidateEndpoint {
                        table: source.table.clone(),
                        column: source.name.clone(),
                        data_type: source.data_type.clone(),
                        is_primary_key: source.is_primary_key,
                        purpose: source.features.as_ref().map(|f| f.purpose()),
                        role: source.features.as_ref().and_then(|f| f.role()),
                        distinct_count: source.distinct_count,
                        null_rate: source.null_count().zip(source.row_count).map(|(n, r)| {
                            if r == 0 { 0.0 } else { n as f64 / r as f64 }
                        }),
                        samples: source_samples,
                    },
                    target: CandidateEndpoint {
                        table: target.table.clone(),
                        column: target.name.clone(),
                        data_type: target.data_type.clone(),
                        is_primary_key: target.is_primary_key,
                        purpose: target.features.as_ref().map(|f| f.purpose()),
                        role: target.features.as_ref().and_then(|f| f.role()),
                        distinct_count: target.distinct_count,
                        null_rate: target.null_count().zip(target.row_count).map(|(n, r)| {
                            if r == 0 { 0.0 } else { n as f64 / r as f64 }
                        }),
                        samples: target_samples,
                    },
                    join_count: join.join_count,
                    source_matched: join.source_matched,
                    target_matched: join.target_matched,
                    orphan_count: join.orphan_count,
                    reverse_orphan_count: join.reverse_orphan_count,
                    is_declared_fk: false,
                    detection_method: source.features.as_ref().and_then(|f| f.fk_target()).map(|t| t.detection_method.clone()),
                });
                seen_pairs.insert(pair_key);
            }
        }

        Ok(candidates)
    }

    /// Seeds candidates directly from declared DB foreign-key constraints
    /// carried on a column's resolved FK target (the collector is
    /// the only place that builds `RelationshipCandidate`s; declared FKs
    /// still need one so the validator's circuit-open fallback and the
    /// persister's `InferenceMethod::ForeignKey` confidence rule have
    /// something to act on). These bypass the join-statistics rejection
    /// heuristics in step 5 — a database-enforced constraint cannot have
    /// orphans — but still probe `analyze_join` for the stats the
    /// candidate carries downstream (samples, distinct counts).
    async fn collect_declared_fk_candidates(
        &self,
        columns_by_table: &std::collections::HashMap<String, Vec<SchemaColumn>>,
        seen_pairs: &mut std::collections::HashSet<(String, String, String, String)>,
    ) -> Result<Vec<RelationshipCandidate>, EnrichmentError> {
        let mut candidates = Vec::new();

        for columns in columns_by_table.values() {
            for source in columns {
                if source.is_primary_key {
                    continue;
                }
                let Some(fk_target) = source.features.as_ref().and_then(|f| f.fk_target()) else { continue };
                if !fk_target.is_db_constraint {
                    continue;
                }
                let Some(target) = columns_by_table
                    .get(&fk_target.target_table)
                    .and_then(|cols| cols.iter().find(|c| c.name == fk_target.target_column))
                else {
                    continue;
                };

                let pair_key = (source.table.clone(), source.name.clone(), target.table.clone(), target.name.clone());
                if seen_pairs.contains(&pair_key) {
                    continue;
                }

                let join = self
                    .discoverer
                    .analyze_join(&source.table, &source.table, &source.name, &target.table, &target.table, &target.name)
                    .await
                    .unwrap_or_default();

                let source_samples = self
                    .discoverer
                    .get_distinct_values(&source.table, &source.table, &source.name, 10)
                    .await
                    .unwrap_or_default();
                let target_samples = self
                    .discoverer
                    .get_distinct_values(&target.table, &target.table, &target.name, 10)
                    .await
                    .unwrap_or_default();

                candidates.push(RelationshipCandidate {
                    source: CandidateEndpoint {
                        table: source.table.clone(),
                        column: source.name.clone(),
                        data_type: source.data_type.clone(),
                        is_primary_key: source.is_primary_key,
                        purpose: source.features.as_ref().map(|f| f.purpose()),
                        role: source.features.as_ref().and_then(|f| f.role()),
                        distinct_count: source.distinct_count,
                        null_rate: source.null_count().zip(source.row_count).map(|(n, r)| {
                            if r == 0 { 0.0 } else { n as f64 / r as f64 }
                        }),
                        samples: source_samples,
                    },
                    target: CandidateEndpoint {
                        table: target.table.clone(),
                        column: target.name.clone(),
                        data_type: target.data_type.clone(),
                        is_primary_key: target.is_primary_key,
                        purpose: target.features.as_ref().map(|f| f.purpose()),
                        role: target.features.as_ref().and_then(|f| f.role()),
                        distinct_count: target.distinct_count,
                        null_rate: target.null_count().zip(target.row_count).map(|(n, r)| {
                            if r == 0 { 0.0 } else { n as f64 / r as f64 }
                        }),
                        samples: target_samples,
                    },
                    join_count: join.join_count,
                    source_matched: join.source_matched,
                    target_matched: join.target_matched,
                    orphan_count: join.orphan_count,
                    reverse_orphan_count: join.reverse_orphan_count,
                    is_declared_fk: true,
                    detection_method: Some(fk_target.detection_method.clone()),
                });
                seen_pairs.insert(pair_key);
            }
        }

        Ok(candidates)
    }
}
