//! Schema column input and the column-feature bag attached to it.

use serde::{Deserialize, Serialize};

/// A column as discovered by schema import (read-only input to enrichment).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SchemaColumn {
    pub table: String,
    pub name: String,
    /// Source-DB dialect type string, e.g. "bigint", "varchar(255)".
    pub data_type: String,
    pub is_primary_key: bool,
    pub is_unique: bool,
    pub is_nullable: bool,

    pub row_count: Option<u64>,
    pub non_null_count: Option<u64>,
    pub distinct_count: Option<u64>,
    pub min_length: Option<u32>,
    pub max_length: Option<u32>,
    pub sample_values: Option<Vec<String>>,

    pub features: Option<ColumnFeatures>,
}

impl SchemaColumn {
    pub fn samples(&self) -> &[String] {
        self.sample_values.as_deref().unwrap_or(&[])
    }

    /// `active_rate`-style stat helper: non-null count falls back from the
    /// explicit field to `row_count - null_count` when only one is known.
    pub fn null_count(&self) -> Option<u64> {
        match (self.row_count, self.non_null_count) {
            (Some(rows), Some(non_null)) => Some(rows.saturating_sub(non_null)),
            _ => None,
        }
    }
}

/// Coarse category of a column, used both as the classification-path tag
/// and to drive type-compatibility checks in relationship discovery.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClassificationPath {
    Identifier,
    Uuid,
    ExternalId,
    Timestamp,
    Boolean,
    Json,
    Numeric,
    Text,
    Other,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Purpose {
    Identifier,
    Enum,
    Flag,
    Measure,
    Timestamp,
    Descriptor,
    Other,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StructuralRole {
    PrimaryKey,
    ForeignKey,
    Attribute,
    Other,
}

/// Resolved FK target, attached to a column either from a declared DB
/// constraint or from the candidate collector's inference.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResolvedFkTarget {
    pub target_table: String,
    pub target_column: String,
    pub detection_method: String,
    pub confidence: f64,
    pub is_db_constraint: bool,
}

/// Polymorphic feature bag extracted for a column ahead of enrichment.
///
/// Previously-extracted metadata arrives in the source system as a
/// polymorphic structure keyed by classification path. We model that as a
/// tagged variant rather than a bag of optional fields: each variant
/// carries only the payload that makes sense for it, and `Other` keeps
/// forward compatibility with classification paths this crate doesn't
/// special-case.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "classification_path", rename_all = "snake_case")]
pub enum ColumnFeatures {
    Identifier {
        purpose: Purpose,
        role: StructuralRole,
        #[serde(default)]
        is_joinable: bool,
        fk_target: Option<ResolvedFkTarget>,
    },
    Uuid {
        purpose: Purpose,
        role: StructuralRole,
        #[serde(default)]
        is_joinable: bool,
        fk_target: Option<ResolvedFkTarget>,
    },
    ExternalId {
        purpose: Purpose,
        role: StructuralRole,
        #[serde(default)]
        is_joinable: bool,
        fk_target: Option<ResolvedFkTarget>,
    },
    Timestamp {
        purpose: Purpose,
    },
    Boolean {
        purpose: Purpose,
    },
    Json {
        purpose: Purpose,
    },
    Enum {
        purpose: Purpose,
    },
    Other {
        purpose: Purpose,
        role: StructuralRole,
        #[serde(default)]
        is_joinable: bool,
    },
}

impl ColumnFeatures {
    pub fn classification_path(&self) -> ClassificationPath {
        match self {
            Self::Identifier { .. } => ClassificationPath::Identifier,
            Self::Uuid { .. } => ClassificationPath::Uuid,
            Self::ExternalId { .. } => ClassificationPath::ExternalId,
            Self::Timestamp { .. } => ClassificationPath::Timestamp,
            Self::Boolean { .. } => ClassificationPath::Boolean,
            Self::Json { .. } => ClassificationPath::Json,
            Self::Enum { .. } => ClassificationPath::Other,
            Self::Other { .. } => ClassificationPath::Other,
        }
    }

    pub fn purpose(&self) -> Purpose {
        match self {
            Self::Identifier { purpose, .. }
            | Self::Uuid { purpose, .. }
            | Self::ExternalId { purpose, .. }
            | Self::Timestamp { purpose }
            | Self::Boolean { purpose }
            | Self::Json { purpose }
            | Self::Enum { purpose }
            | Self::Other { purpose, .. } => *purpose,
        }
    }

    pub fn role(&self) -> Option<StructuralRole> {
        match self {
            Self::Identifier { role, .. } | Self::Uuid { role, .. } | Self::ExternalId { role, .. } => {
                Some(*role)
            },
            Self::Other { role, .. } => Some(*role),
            _ => None,
        }
    }

    pub fn is_joinable(&self) -> bool {
        match self {
            Self::Identifier { is_joinable, .. }
            | Self::Uuid { is_joinable, .. }
            | Self::ExternalId { is_joinable, .. }
            | Self::Other { is_joinable, .. } => *is_joinable,
            _ => false,
        }
    }

    pub fn fk_target(&self) -> Option<&ResolvedFkTarget> {
        match self {
            Self::Identifier { fk_target, .. }
            | Self::Uuid { fk_target, .. }
            | Self::ExternalId { fk_target, .. } => fk_target.as_ref(),
            _ => None,
        }
    }
}
