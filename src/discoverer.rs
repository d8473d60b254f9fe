//! `SchemaDiscoverer`: the source-database adapter consumed by relationship
//! discovery and enum-candidate sampling. The adapter itself (query
//! construction against a live MySQL/Postgres/StarRocks source) is out of
//! scope here; this crate only depends on the interface.

use async_trait::async_trait;

use crate::error::EnrichmentError;

#[derive(Debug, Clone, Copy, Default)]
pub struct JoinAnalysis {
    pub join_count: u64,
    pub source_matched: u64,
    pub target_matched: u64,
    pub orphan_count: u64,
    pub reverse_orphan_count: u64,
    pub max_source_value: Option<i64>,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct ColumnStats {
    pub row_count: u64,
    pub non_null_count: u64,
    pub distinct_count: u64,
}

#[async_trait]
pub trait SchemaDiscoverer: Send + Sync {
    async fn analyze_join(
        &self,
        source_schema: &str,
        source_table: &str,
        source_column: &str,
        target_schema: &str,
        target_table: &str,
        target_column: &str,
    ) -> Result<JoinAnalysis, EnrichmentError>;

    async fn get_distinct_values(
        &self,
        schema: &str,
        table: &str,
        column: &str,
        limit: u32,
    ) -> Result<Vec<String>, EnrichmentError>;

    async fn analyze_column_stats(
        &self,
        schema: &str,
        table: &str,
        column_names: &[String],
    ) -> Result<Vec<ColumnStats>, EnrichmentError>;

    async fn check_value_overlap(
        &self,
        source_schema: &str,
        source_table: &str,
        source_column: &str,
        target_schema: &str,
        target_table: &str,
        target_column: &str,
        sample_limit: u32,
    ) -> Result<f64, EnrichmentError>;

    async fn close(&self);
}
