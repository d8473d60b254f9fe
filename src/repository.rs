//! Tenant-scoped repository interfaces. Grouped by capability rather than
//! by table: tests inject minimal stubs, and the reference SQLite
//! implementation below satisfies all four from one connection pool.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::Utc;
use sqlx::SqlitePool;

use crate::error::EnrichmentError;
use crate::model::column::SchemaColumn;
use crate::model::column_detail::ColumnDetail;
use crate::model::entity::OntologyEntity;
use crate::model::relationship::{DiscoveryMetrics, SchemaRelationship};

#[async_trait]
pub trait OntologyRepo: Send + Sync {
    /// Replaces all column-detail rows for `table` atomically.
    async fn update_column_details(
        &self,
        project_id: i64,
        table: &str,
        details: &[ColumnDetail],
    ) -> Result<(), EnrichmentError>;
}

#[async_trait]
pub trait EntityRepo: Send + Sync {
    async fn get_by_project(&self, project_id: i64) -> Result<Vec<OntologyEntity>, EnrichmentError>;
}

#[async_trait]
pub trait RelationshipRepo: Send + Sync {
    async fn get_by_tables(
        &self,
        project_id: i64,
        table_names: &[String],
    ) -> Result<Vec<SchemaRelationship>, EnrichmentError>;

    /// Upserts one relationship row, keyed by `(project, source_col,
    /// target_col)`. Idempotent: calling twice with identical values leaves
    /// a single row.
    async fn upsert(&self, relationship: &SchemaRelationship) -> Result<(), EnrichmentError>;

    /// Persists discovery metrics for the relationship identified by its
    /// natural key, not a caller-supplied row id — the persister only ever
    /// knows a just-upserted relationship by `(project, source, target)`.
    async fn save_discovery_metrics(
        &self,
        project_id: i64,
        source_table: &str,
        source_column: &str,
        target_table: &str,
        target_column: &str,
        metrics: &DiscoveryMetrics,
    ) -> Result<(), EnrichmentError>;
}

#[async_trait]
pub trait SchemaRepo: Send + Sync {
    async fn get_columns_by_tables(
        &self,
        project_id: i64,
        table_names: &[String],
        selected_only: bool,
    ) -> Result<HashMap<String, Vec<SchemaColumn>>, EnrichmentError>;
}

/// Reference implementation of all four repository traits over one SQLite
/// pool. Production deployments may split these across schemas/tenants;
/// nothing here requires that they share a pool.
pub struct SqliteRepositories {
    pool: SqlitePool,
}

impl SqliteRepositories {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    #[cfg(test)]
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}

#[async_trait]
impl OntologyRepo for SqliteRepositories {
    async fn update_column_details(
        &self,
        project_id: i64,
        table: &str,
        details: &[ColumnDetail],
    ) -> Result<(), EnrichmentError> {
        let mut tx = self.pool.begin().await?;

        sqlx::query("DELETE FROM column_details WHERE project_id = ? AND table_name = ?")
            .bind(project_id)
            .bind(table)
            .execute(&mut *tx)
            .await?;

        for detail in details {
            let payload = serde_json::to_string(detail)?;
            sqlx::query(
                "INSERT INTO column_details (project_id, table_name, column_name, payload, created_at) \
                 VALUES (?, ?, ?, ?, ?)",
            )
            .bind(project_id)
            .bind(table)
            .bind(&detail.name)
            .bind(payload)
            .bind(Utc::now())
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Ok(())
    }
}

#[async_trait]
impl EntityRepo for SqliteRepositories {
    async fn get_by_project(&self, project_id: i64) -> Result<Vec<OntologyEntity>, EnrichmentError> {
        sqlx::query_as::<_, OntologyEntity>(
            "SELECT id, project_id, name, description, primary_table, created_at, updated_at \
             FROM ontology_entities WHERE project_id = ?",
        )
        .bind(project_id)
        .fetch_all(&self.pool)
        .await
        .map_err(EnrichmentError::from)
    }
}

#[async_trait]
impl RelationshipRepo for SqliteRepositories {
    async fn get_by_tables(
        &self,
        project_id: i64,
        table_names: &[String],
    ) -> Result<Vec<SchemaRelationship>, EnrichmentError> {
        if table_names.is_empty() {
            return Ok(Vec::new());
        }
        let placeholders = table_names.iter().map(|_| "?").collect::<Vec<_>>().join(",");
        let sql = format!(
            "SELECT id, project_id, source_table, source_column, target_table, target_column, \
             relationship_type, cardinality, confidence, inference_method, is_validated, \
             description, created_at, updated_at \
             FROM schema_relationships \
             WHERE project_id = ? AND (source_table IN ({placeholders}) OR target_table IN ({placeholders}))"
        );
        let mut query = sqlx::query_as::<_, SchemaRelationship>(&sql).bind(project_id);
        for name in table_names.iter().chain(table_names.iter()) {
            query = query.bind(name);
        }
        query.fetch_all(&self.pool).await.map_err(EnrichmentError::from)
    }

    async fn upsert(&self, relationship: &SchemaRelationship) -> Result<(), EnrichmentError> {
        sqlx::query(
            "INSERT INTO schema_relationships \
             (project_id, source_table, source_column, target_table, target_column, \
              relationship_type, cardinality, confidence, inference_method, is_validated, \
              description, created_at, updated_at) \
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?) \
             ON CONFLICT (project_id, source_table, source_column, target_table, target_column) \
             DO UPDATE SET \
                relationship_type = excluded.relationship_type, \
                cardinality = excluded.cardinality, \
                confidence = excluded.confidence, \
                inference_method = excluded.inference_method, \
                is_validated = excluded.is_validated, \
                description = excluded.description, \
                updated_at = excluded.updated_at",
        )
        .bind(relationship.project_id)
        .bind(&relationship.source_table)
        .bind(&relationship.source_column)
        .bind(&relationship.target_table)
        .bind(&relationship.target_column)
        .bind(&relationship.relationship_type)
        .bind(&relationship.cardinality)
        .bind(relationship.confidence)
        .bind(&relationship.inference_method)
        .bind(relationship.is_validated)
        .bind(&relationship.description)
        .bind(relationship.created_at)
        .bind(relationship.updated_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn save_discovery_metrics(
        &self,
        project_id: i64,
        source_table: &str,
        source_column: &str,
        target_table: &str,
        target_column: &str,
        metrics: &DiscoveryMetrics,
    ) -> Result<(), EnrichmentError> {
        let relationship_id: i64 = sqlx::query_scalar(
            "SELECT id FROM schema_relationships \
             WHERE project_id = ? AND source_table = ? AND source_column = ? \
               AND target_table = ? AND target_column = ?",
        )
        .bind(project_id)
        .bind(source_table)
        .bind(source_column)
        .bind(target_table)
        .bind(target_column)
        .fetch_one(&self.pool)
        .await?;

        sqlx::query(
            "INSERT INTO discovery_metrics \
             (relationship_id, match_rate, source_distinct, target_distinct, matched_count) \
             VALUES (?, ?, ?, ?, ?) \
             ON CONFLICT (relationship_id) DO UPDATE SET \
                match_rate = excluded.match_rate, \
                source_distinct = excluded.source_distinct, \
                target_distinct = excluded.target_distinct, \
                matched_count = excluded.matched_count",
        )
        .bind(relationship_id)
        .bind(metrics.match_rate)
        .bind(metrics.source_distinct as i64)
        .bind(metrics.target_distinct as i64)
        .bind(metrics.matched_count as i64)
        .execute(&self.pool)
        .await?;
        Ok(())
    }
}

#[async_trait]
impl SchemaRepo for SqliteRepositories {
    async fn get_columns_by_tables(
        &self,
        _project_id: i64,
        table_names: &[String],
        _selected_only: bool,
    ) -> Result<HashMap<String, Vec<SchemaColumn>>, EnrichmentError> {
        // Column metadata is imported and owned by the schema-import subsystem
        // (out of scope here); this reference impl returns empty sets and
        // exists so callers have a concrete type to construct in non-test
        // wiring. Real deployments supply their own `SchemaRepo`.
        Ok(table_names.iter().map(|t| (t.clone(), Vec::new())).collect())
    }
}
