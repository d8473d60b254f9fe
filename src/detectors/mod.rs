//! Deterministic pattern detectors over column name, type, and sampled
//! statistics. Pure and side-effect-free: each takes a `SchemaColumn` (and,
//! for the FK detector, an externally-resolved target) and returns an
//! `Option<PatternResult>`.

mod boolean_naming;
mod common;
mod fk_pattern;
mod monetary_amount;
mod soft_delete;
mod timestamp_scale;
mod uuid_text;

use crate::model::column::{ResolvedFkTarget, SchemaColumn};
use crate::model::column_detail::ColumnRole;

/// Override payload produced by a matching detector. Any non-`None` field
/// overrides the corresponding LLM-provided field during conversion.
#[derive(Debug, Clone)]
pub struct PatternResult {
    pub detector: DetectorKind,
    pub description: String,
    pub semantic_type: String,
    pub role: ColumnRole,
    /// Set only by the FK pattern detector's role-detection table.
    pub detected_role: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DetectorKind {
    ForeignKey,
    SoftDelete,
    MonetaryAmount,
    TimestampScale,
    UuidText,
    BooleanNaming,
}

/// Runs every detector against `column` in precedence order (FK pattern >
/// soft-delete > monetary > timestamp-scale > UUID-text > boolean-naming)
/// and returns the first match. Enum-candidate flagging is handled
/// separately by [`crate::enum_catalog::identify_enum_candidates`] since it
/// doesn't produce an override, only a sampling hint.
pub fn detect_all(column: &SchemaColumn, fk_target: Option<&ResolvedFkTarget>) -> Option<PatternResult> {
    fk_pattern::detect(column, fk_target)
        .or_else(|| soft_delete::detect(column))
        .or_else(|| monetary_amount::detect(column))
        .or_else(|| timestamp_scale::detect(column))
        .or_else(|| uuid_text::detect(column))
        .or_else(|| boolean_naming::detect(column))
}

pub use boolean_naming::detect as detect_boolean_naming;
pub use fk_pattern::{detect as detect_fk_pattern, resolve_role};
pub use monetary_amount::detect as detect_monetary_amount;
pub use soft_delete::detect as detect_soft_delete;
pub use timestamp_scale::detect as detect_timestamp_scale;
pub use uuid_text::detect as detect_uuid_text;
