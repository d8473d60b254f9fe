use serde::{Deserialize, Serialize};

use super::enum_value::EnumValue;

/// Per-ColumnDetail structural role, distinct from `StructuralRole` (which
/// describes raw schema-import features). One of these four only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ColumnRole {
    Identifier,
    Dimension,
    Measure,
    Attribute,
}

/// The enriched, persisted description of one column. Produced by the
/// Column Enrichment Engine; replaces wholesale per `(project, table)` on
/// each successful run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ColumnDetail {
    pub name: String,
    pub description: String,
    pub semantic_type: String,
    pub role: ColumnRole,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub synonyms: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enum_values: Option<Vec<EnumValue>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fk_association: Option<String>,
    pub is_foreign_key: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub foreign_table: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detected_role: Option<String>,
    #[serde(default)]
    pub features: Vec<String>,
}

impl ColumnDetail {
    pub fn from_llm_defaults(
        name: impl Into<String>,
        description: impl Into<String>,
        semantic_type: impl Into<String>,
        role: ColumnRole,
    ) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            semantic_type: semantic_type.into(),
            role,
            synonyms: None,
            enum_values: None,
            fk_association: None,
            is_foreign_key: false,
            foreign_table: None,
            detected_role: None,
            features: Vec::new(),
        }
    }
}
