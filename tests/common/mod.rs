//! Shared test doubles for the end-to-end tests in this directory: a
//! scriptable `LlmClient`/`LlmFactory` pair whose response is a pure
//! function of the call index and prompt, plus minimal in-memory
//! repository/discoverer stand-ins.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::Utc;
use sqlx::sqlite::SqlitePoolOptions;
use sqlx::SqlitePool;

use schema_enrichment::discoverer::{ColumnStats, JoinAnalysis, SchemaDiscoverer};
use schema_enrichment::error::EnrichmentError;
use schema_enrichment::llm::{LlmClient, LlmFactory};
use schema_enrichment::model::{ColumnDetail, OntologyEntity, SchemaColumn, SchemaRelationship};
use schema_enrichment::{EntityRepo, OntologyRepo, RelationshipRepo, SchemaRepo};

/// An in-memory SQLite pool good enough to satisfy `TenantScope::pool`;
/// none of these tests touch `SqliteRepositories` or run migrations.
pub async fn test_pool() -> SqlitePool {
    SqlitePoolOptions::new().connect("sqlite::memory:").await.expect("in-memory sqlite pool")
}

/// Routes `tracing` output through the test harness's captured writer, so
/// `cargo test -- --nocapture` shows the same `RUST_LOG`-filtered logs a
/// real run would produce. Safe to call from every test; only the first
/// call wins.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// LLM double whose response is a pure function of `(call_index, prompt)`,
/// so tests can script transient failures, per-table failures, or a fixed
/// reply regardless of which chunk is asking.
pub struct ScriptedLlmClient {
    pub calls: AtomicUsize,
    responder: Box<dyn Fn(usize, &str) -> Result<String, EnrichmentError> + Send + Sync>,
}

impl ScriptedLlmClient {
    pub fn new(responder: impl Fn(usize, &str) -> Result<String, EnrichmentError> + Send + Sync + 'static) -> Self {
        Self { calls: AtomicUsize::new(0), responder: Box::new(responder) }
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl LlmClient for ScriptedLlmClient {
    async fn generate_response(&self, prompt: &str, _system_message: &str, _temperature: f64) -> Result<String, EnrichmentError> {
        let call = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
        (self.responder)(call, prompt)
    }

    async fn close(&self) {}
}

/// Wraps a shared `ScriptedLlmClient` so every `create_for_project` call
/// hands back a handle into the same call counter instead of a fresh one.
pub struct SharedLlmFactory(pub Arc<ScriptedLlmClient>);

struct ForwardingLlmClient(Arc<ScriptedLlmClient>);

#[async_trait]
impl LlmClient for ForwardingLlmClient {
    async fn generate_response(&self, prompt: &str, system_message: &str, temperature: f64) -> Result<String, EnrichmentError> {
        self.0.generate_response(prompt, system_message, temperature).await
    }

    async fn close(&self) {
        self.0.close().await
    }
}

#[async_trait]
impl LlmFactory for SharedLlmFactory {
    async fn create_for_project(&self, _project_id: i64) -> Result<Box<dyn LlmClient>, EnrichmentError> {
        Ok(Box::new(ForwardingLlmClient(self.0.clone())))
    }
}

/// Fixed set of ontology entities, one per selected table.
pub struct FixedEntityRepo(pub Vec<OntologyEntity>);

#[async_trait]
impl EntityRepo for FixedEntityRepo {
    async fn get_by_project(&self, _project_id: i64) -> Result<Vec<OntologyEntity>, EnrichmentError> {
        Ok(self.0.clone())
    }
}

pub fn entity(id: i64, name: &str, table: &str) -> OntologyEntity {
    let now = Utc::now();
    OntologyEntity {
        id,
        project_id: 1,
        name: name.to_string(),
        description: format!("{name} entity"),
        primary_table: table.to_string(),
        created_at: now,
        updated_at: now,
    }
}

/// Fixed `table -> columns` map, as schema import would have populated it.
pub struct FixedSchemaRepo(pub HashMap<String, Vec<SchemaColumn>>);

#[async_trait]
impl SchemaRepo for FixedSchemaRepo {
    async fn get_columns_by_tables(
        &self,
        _project_id: i64,
        table_names: &[String],
        _selected_only: bool,
    ) -> Result<HashMap<String, Vec<SchemaColumn>>, EnrichmentError> {
        Ok(table_names.iter().map(|t| (t.clone(), self.0.get(t).cloned().unwrap_or_default())).collect())
    }
}

/// Records every `update_column_details` call so assertions can inspect
/// exactly what was persisted, keyed by `(project_id, table)`.
#[derive(Default)]
pub struct RecordingOntologyRepo {
    pub saved: Mutex<HashMap<(i64, String), Vec<ColumnDetail>>>,
}

#[async_trait]
impl OntologyRepo for RecordingOntologyRepo {
    async fn update_column_details(&self, project_id: i64, table: &str, details: &[ColumnDetail]) -> Result<(), EnrichmentError> {
        self.saved.lock().unwrap().insert((project_id, table.to_string()), details.to_vec());
        Ok(())
    }
}

impl RecordingOntologyRepo {
    pub fn get(&self, project_id: i64, table: &str) -> Vec<ColumnDetail> {
        self.saved.lock().unwrap().get(&(project_id, table.to_string())).cloned().unwrap_or_default()
    }
}

/// Fixed relationship rows, as would already be persisted from a prior
/// discovery run; used to exercise the FK-lookup construction in
/// `enrich_table` step 3.
pub struct FixedRelationshipRepo(pub Vec<SchemaRelationship>);

#[async_trait]
impl RelationshipRepo for FixedRelationshipRepo {
    async fn get_by_tables(&self, _project_id: i64, table_names: &[String]) -> Result<Vec<SchemaRelationship>, EnrichmentError> {
        Ok(self
            .0
            .iter()
            .filter(|r| table_names.iter().any(|t| t == &r.source_table || t == &r.target_table))
            .cloned()
            .collect())
    }

    async fn upsert(&self, _relationship: &SchemaRelationship) -> Result<(), EnrichmentError> {
        Ok(())
    }

    async fn save_discovery_metrics(
        &self,
        _project_id: i64,
        _source_table: &str,
        _source_column: &str,
        _target_table: &str,
        _target_column: &str,
        _metrics: &schema_enrichment::model::DiscoveryMetrics,
    ) -> Result<(), EnrichmentError> {
        Ok(())
    }
}

/// Records every upserted relationship (forward and reverse rows alike) in
/// insertion order, keyed by `(source_table, source_column, target_table,
/// target_column)` so a test can assert idempotence and mirror-row shape.
#[derive(Default)]
pub struct RecordingRelationshipRepo {
    pub upserted: Mutex<Vec<SchemaRelationship>>,
    /// Keyed the same way `SqliteRepositories` resolves a relationship id:
    /// by natural key, not a caller-supplied row id.
    pub metrics: Mutex<HashMap<(String, String, String, String), schema_enrichment::model::DiscoveryMetrics>>,
}

#[async_trait]
impl RelationshipRepo for RecordingRelationshipRepo {
    async fn get_by_tables(&self, _project_id: i64, _table_names: &[String]) -> Result<Vec<SchemaRelationship>, EnrichmentError> {
        Ok(Vec::new())
    }

    async fn upsert(&self, relationship: &SchemaRelationship) -> Result<(), EnrichmentError> {
        let mut rows = self.upserted.lock().unwrap();
        if let Some(existing) = rows.iter_mut().find(|r| {
            r.source_table == relationship.source_table
                && r.source_column == relationship.source_column
                && r.target_table == relationship.target_table
                && r.target_column == relationship.target_column
        }) {
            *existing = relationship.clone();
        } else {
            rows.push(relationship.clone());
        }
        Ok(())
    }

    async fn save_discovery_metrics(
        &self,
        _project_id: i64,
        source_table: &str,
        source_column: &str,
        target_table: &str,
        target_column: &str,
        metrics: &schema_enrichment::model::DiscoveryMetrics,
    ) -> Result<(), EnrichmentError> {
        let key = (source_table.to_string(), source_column.to_string(), target_table.to_string(), target_column.to_string());
        self.metrics.lock().unwrap().insert(key, metrics.clone());
        Ok(())
    }
}

impl RecordingRelationshipRepo {
    pub fn rows(&self) -> Vec<SchemaRelationship> {
        self.upserted.lock().unwrap().clone()
    }

    pub fn metrics_for(&self, source_table: &str, source_column: &str, target_table: &str, target_column: &str) -> Option<schema_enrichment::model::DiscoveryMetrics> {
        let key = (source_table.to_string(), source_column.to_string(), target_table.to_string(), target_column.to_string());
        self.metrics.lock().unwrap().get(&key).cloned()
    }
}

/// `SchemaDiscoverer` double whose join/value/stats answers are looked up
/// by `(source_table, source_column, target_table, target_column)`, with a
/// clean, overlap-free default for anything not explicitly scripted.
#[derive(Default)]
pub struct ScriptedDiscoverer {
    pub joins: HashMap<(String, String, String, String), JoinAnalysis>,
    pub distinct_values: HashMap<(String, String), Vec<String>>,
}

#[async_trait]
impl SchemaDiscoverer for ScriptedDiscoverer {
    async fn analyze_join(
        &self,
        _source_schema: &str,
        source_table: &str,
        source_column: &str,
        _target_schema: &str,
        target_table: &str,
        target_column: &str,
    ) -> Result<JoinAnalysis, EnrichmentError> {
        let key = (source_table.to_string(), source_column.to_string(), target_table.to_string(), target_column.to_string());
        Ok(self.joins.get(&key).copied().unwrap_or(JoinAnalysis {
            join_count: 10,
            source_matched: 10,
            target_matched: 10,
            orphan_count: 0,
            reverse_orphan_count: 0,
            max_source_value: None,
        }))
    }

    async fn get_distinct_values(&self, _schema: &str, table: &str, column: &str, _limit: u32) -> Result<Vec<String>, EnrichmentError> {
        let key = (table.to_string(), column.to_string());
        Ok(self.distinct_values.get(&key).cloned().unwrap_or_else(|| vec!["1".to_string(), "2".to_string()]))
    }

    async fn analyze_column_stats(&self, _schema: &str, _table: &str, _column_names: &[String]) -> Result<Vec<ColumnStats>, EnrichmentError> {
        Ok(Vec::new())
    }

    async fn check_value_overlap(
        &self,
        _source_schema: &str,
        _source_table: &str,
        _source_column: &str,
        _target_schema: &str,
        _target_table: &str,
        _target_column: &str,
        _sample_limit: u32,
    ) -> Result<f64, EnrichmentError> {
        Ok(1.0)
    }

    async fn close(&self) {}
}

/// Plain `bigint`/`varchar`-flavored column with just the fields a given
/// test cares about; callers override what they need.
pub fn column(table: &str, name: &str, data_type: &str, is_primary_key: bool) -> SchemaColumn {
    SchemaColumn {
        table: table.to_string(),
        name: name.to_string(),
        data_type: data_type.to_string(),
        is_primary_key,
        is_unique: is_primary_key,
        is_nullable: !is_primary_key,
        row_count: None,
        non_null_count: None,
        distinct_count: None,
        min_length: None,
        max_length: None,
        sample_values: None,
        features: None,
    }
}
