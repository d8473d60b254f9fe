use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// One logical business object per selected table. Created before
/// enrichment runs; the enrichment engine only reads these.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct OntologyEntity {
    pub id: i64,
    pub project_id: i64,
    pub name: String,
    pub description: String,
    pub primary_table: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
