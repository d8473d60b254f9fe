use crate::model::column::{ResolvedFkTarget, SchemaColumn};
use crate::model::column_detail::ColumnRole;

use super::{DetectorKind, PatternResult};

/// Maps a foreign-key column name to a business role and short
/// description, used to enrich the FK pattern's description and to set
/// `fk_association` on the converted `ColumnDetail` (the role-
/// detection table). Generic names (plain `_id`) resolve to `None`.
const ROLE_TABLE: &[(&str, &str, &str)] = &[
    ("host_id", "host", "the hosting entity"),
    ("payer_id", "payer", "the paying party"),
    ("source_account_id", "source", "the originating account"),
    ("destination_account_id", "destination", "the receiving account"),
    ("owner_id", "owner", "the owning entity"),
    ("creator_id", "creator", "the creating user"),
    ("manager_id", "manager", "the supervising employee"),
    ("parent_id", "parent", "the parent record"),
    ("assignee_id", "assignee", "the assigned user"),
];

pub fn resolve_role(column_name: &str) -> Option<(&'static str, &'static str)> {
    ROLE_TABLE
        .iter()
        .find(|(name, _, _)| column_name.eq_ignore_ascii_case(name))
        .map(|(_, role, desc)| (*role, *desc))
}

/// Only runs when a resolved FK target is supplied externally (from a
/// declared DB constraint or the candidate collector); not a pure function
/// of `column` alone.
pub fn detect(column: &SchemaColumn, fk_target: Option<&ResolvedFkTarget>) -> Option<PatternResult> {
    let target = fk_target?;

    let mut description = if target.is_db_constraint {
        format!("Foreign key to {}.{}.", target.target_table, target.target_column)
    } else {
        format!(
            "Foreign key to {}.{} ({:.0}% confidence). No database constraint; logical reference validated via data overlap.",
            target.target_table,
            target.target_column,
            target.confidence * 100.0
        )
    };

    let detected_role = resolve_role(&column.name).map(|(role, desc)| {
        description.push_str(&format!(" Role: {role} ({desc})"));
        role.to_string()
    });

    Some(PatternResult {
        detector: DetectorKind::ForeignKey,
        description,
        semantic_type: if target.is_db_constraint { "foreign_key" } else { "logical_foreign_key" }.to_string(),
        role: ColumnRole::Identifier,
        detected_role,
    })
}
