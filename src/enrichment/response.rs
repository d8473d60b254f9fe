//! Wire shape of the LLM's column-enrichment response for one chunk.

use serde::{Deserialize, Serialize};

use crate::model::enum_value::EnumValue;

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ColumnEnrichment {
    pub name: String,
    pub description: String,
    pub semantic_type: String,
    pub role: String,
    #[serde(default)]
    pub fk_association: Option<String>,
    #[serde(default)]
    pub synonyms: Option<Vec<String>>,
    #[serde(default)]
    pub enum_values: Option<Vec<EnumValue>>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct FollowUpQuestion {
    pub category: String,
    pub priority: String,
    pub question: String,
    #[serde(default)]
    pub context: String,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct ChunkResponse {
    pub columns: Vec<ColumnEnrichment>,
    #[serde(default)]
    pub questions: Vec<FollowUpQuestion>,
}
