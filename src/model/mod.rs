//! Data model shared by the enrichment engine and the discovery pipeline.

pub mod column;
pub mod column_detail;
pub mod entity;
pub mod enum_value;
pub mod relationship;

pub use column::{
    ClassificationPath, ColumnFeatures, Purpose, ResolvedFkTarget, SchemaColumn, StructuralRole,
};
pub use column_detail::{ColumnDetail, ColumnRole};
pub use entity::OntologyEntity;
pub use enum_value::{EnumDefinition, EnumDistributionResult, EnumValue, EnumValueStats};
pub use relationship::{
    CandidateEndpoint, Cardinality, DiscoveryMetrics, InferenceMethod, RelationshipCandidate,
    SchemaRelationship, TypeCategory, ValidatedRelationship,
};
