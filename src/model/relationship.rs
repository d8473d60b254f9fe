use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use super::column::{ClassificationPath, Purpose, StructuralRole};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Cardinality {
    #[serde(rename = "1:1")]
    OneToOne,
    #[serde(rename = "N:1")]
    ManyToOne,
    #[serde(rename = "1:N")]
    OneToMany,
    #[serde(rename = "N:M")]
    ManyToMany,
}

impl Cardinality {
    /// Maps a forward cardinality to its reverse-row equivalent.
    pub fn invert(self) -> Self {
        match self {
            Self::OneToOne => Self::OneToOne,
            Self::ManyToOne => Self::OneToMany,
            Self::OneToMany => Self::ManyToOne,
            Self::ManyToMany => Self::ManyToMany,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::OneToOne => "1:1",
            Self::ManyToOne => "N:1",
            Self::OneToMany => "1:N",
            Self::ManyToMany => "N:M",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InferenceMethod {
    ForeignKey,
    ColumnFeatures,
    PkMatch,
    LlmValidated,
}

impl InferenceMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ForeignKey => "foreign_key",
            Self::ColumnFeatures => "column_features",
            Self::PkMatch => "pk_match",
            Self::LlmValidated => "llm_validated",
        }
    }
}

/// One endpoint (source or target) of a relationship candidate.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CandidateEndpoint {
    pub table: String,
    pub column: String,
    pub data_type: String,
    pub is_primary_key: bool,
    pub purpose: Option<Purpose>,
    pub role: Option<StructuralRole>,
    pub distinct_count: Option<u64>,
    pub null_rate: Option<f64>,
    pub samples: Vec<String>,
}

/// A `(source_column, target_column)` pair proposed as a possible
/// foreign-key relationship, along with its join statistics.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RelationshipCandidate {
    pub source: CandidateEndpoint,
    pub target: CandidateEndpoint,
    pub join_count: u64,
    pub source_matched: u64,
    pub target_matched: u64,
    pub orphan_count: u64,
    pub reverse_orphan_count: u64,
    /// True when this pair is already a declared DB foreign key, as
    /// opposed to one the collector inferred from type compatibility and
    /// join statistics. Declared FKs still run through validation (for
    /// cardinality), but survive a circuit-open fallback that inferred
    /// candidates do not.
    #[serde(default)]
    pub is_declared_fk: bool,
    /// The source column's `ResolvedFkTarget::detection_method`, if its
    /// features already resolved an FK target (`"column_features"` for a
    /// non-constraint resolution, `"db_constraint"` for a declared one).
    /// `None` when the candidate was found purely by type compatibility
    /// and join overlap against a PK/unique target, with no prior feature
    /// resolution to draw on.
    #[serde(default)]
    pub detection_method: Option<String>,
}

impl RelationshipCandidate {
    /// Fraction of distinct source values that appear in the target.
    pub fn match_rate(&self) -> f64 {
        safe_ratio(self.source_matched, self.source.distinct_count)
    }

    /// Fraction of distinct target values matched from the source side.
    pub fn coverage_rate(&self) -> f64 {
        safe_ratio(self.target_matched, self.target.distinct_count)
    }

    pub fn orphan_rate(&self) -> f64 {
        safe_ratio(self.orphan_count, self.source.distinct_count)
    }

    /// Fraction of the target-side join universe that had no matching
    /// source value, used by the collector's "coincidental small overlap"
    /// rejection.
    pub fn reverse_orphan_rate(&self) -> f64 {
        let denom = self.target_matched + self.reverse_orphan_count;
        if denom == 0 { 0.0 } else { self.reverse_orphan_count as f64 / denom as f64 }
    }
}

fn safe_ratio(numerator: u64, denominator: Option<u64>) -> f64 {
    match denominator {
        Some(0) | None => 0.0,
        Some(d) => numerator as f64 / d as f64,
    }
}

/// A candidate the LLM has validated (or rejected) as a genuine FK.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidatedRelationship {
    pub candidate: RelationshipCandidate,
    pub is_valid_fk: bool,
    pub confidence: f64,
    pub cardinality: Cardinality,
    pub reasoning: String,
    pub source_role: Option<String>,
}

/// A relationship row as persisted. Bidirectional: every accepted
/// relationship is written as this row and a mirrored reverse row with
/// swapped endpoints and inverted cardinality.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct SchemaRelationship {
    pub id: i64,
    pub project_id: i64,
    pub source_table: String,
    pub source_column: String,
    pub target_table: String,
    pub target_column: String,
    pub relationship_type: String,
    pub cardinality: String,
    pub confidence: f64,
    pub inference_method: String,
    pub is_validated: bool,
    #[serde(default)]
    pub description: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Discovery metrics persisted alongside each *inferred* relationship
/// Kept as a side record rather than folded into
/// `SchemaRelationship` so the persisted-relationship shape stays exact.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiscoveryMetrics {
    pub match_rate: f64,
    pub source_distinct: u64,
    pub target_distinct: u64,
    pub matched_count: u64,
}

impl DiscoveryMetrics {
    pub fn from_candidate(candidate: &RelationshipCandidate) -> Self {
        Self {
            match_rate: candidate.match_rate(),
            source_distinct: candidate.source.distinct_count.unwrap_or(0),
            target_distinct: candidate.target.distinct_count.unwrap_or(0),
            matched_count: candidate.source_matched,
        }
    }
}

/// Type-compatibility category used by the candidate collector (spec
/// §4.H.1). Declared separately from `ClassificationPath` because it
/// classifies raw dialect type strings, not previously-extracted column
/// features.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TypeCategory {
    Uuid,
    Integer,
    String,
    Numeric,
    Boolean,
    Timestamp,
    Json,
}

impl TypeCategory {
    /// Categories isolated from all others, even themselves across rows
    /// of different declared category (boolean/timestamp/json never match
    /// anything but their own category).
    pub fn compatible_with(self, other: Self) -> bool {
        self == other
    }
}

/// Classify `classification_path` straight into the equivalent type
/// category, used when the column already carries extracted features.
impl From<ClassificationPath> for Option<TypeCategory> {
    fn from(path: ClassificationPath) -> Self {
        match path {
            ClassificationPath::Uuid => Some(TypeCategory::Uuid),
            ClassificationPath::Timestamp => Some(TypeCategory::Timestamp),
            ClassificationPath::Boolean => Some(TypeCategory::Boolean),
            ClassificationPath::Json => Some(TypeCategory::Json),
            ClassificationPath::Numeric => Some(TypeCategory::Numeric),
            ClassificationPath::Text => Some(TypeCategory::String),
            ClassificationPath::Identifier | ClassificationPath::ExternalId => None,
            ClassificationPath::Other => None,
        }
    }
}
