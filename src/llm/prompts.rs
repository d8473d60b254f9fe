//! Prompt construction for the two LLM-driven stages: per-chunk column
//! enrichment and per-candidate relationship validation. Follows the same
//! static-base-plus-dynamic-sections shape used elsewhere in this crate's
//! LLM-facing code: a fixed instructional preamble, with a `push_str`-built
//! table of per-row facts appended underneath.

use std::collections::HashMap;

use crate::model::column::{ResolvedFkTarget, SchemaColumn};
use crate::model::relationship::RelationshipCandidate;

pub const COLUMN_ENRICHMENT_SYSTEM_MESSAGE: &str =
    "You are a database schema analyst. You describe columns precisely and conservatively, \
     inferring business meaning from names, types, and sample data. Respond with JSON only.";

const COLUMN_ENRICHMENT_PROMPT_BASE: &str = "\
Analyze the following table's columns and produce a semantic description for each.

Return JSON of the exact shape:
{
  \"columns\": [
    {
      \"name\": \"...\",
      \"description\": \"...\",
      \"semantic_type\": \"...\",
      \"role\": \"identifier|dimension|measure|attribute\",
      \"fk_association\": \"...\",        // optional
      \"synonyms\": [\"...\"],            // optional
      \"enum_values\": [{\"value\": \"...\", \"label\": \"...\", \"description\": \"...\"}]  // optional
    }
  ],
  \"questions\": [{\"category\": \"...\", \"priority\": \"...\", \"question\": \"...\", \"context\": \"...\"}]  // optional
}

Guidance:
- Role must be exactly one of: identifier, dimension, measure, attribute.
- For enum values: return as objects, not bare strings. Infer labels from column context.
  For integer enums, infer what each integer code plausibly represents. For string enums,
  normalize the label but keep the raw value as `value`.
- Include a description for an enum value only if you can infer its business meaning with
  reasonable confidence; otherwise omit it rather than guess.
- Do not invent foreign keys that are not indicated by the column's name or provided hints.
";

fn push_column_row(prompt: &mut String, column: &SchemaColumn, fk_target: Option<&ResolvedFkTarget>) {
    let samples = if column.samples().is_empty() {
        "-".to_string()
    } else {
        column.samples().iter().take(5).cloned().collect::<Vec<_>>().join(", ")
    };
    let fk = fk_target
        .map(|t| format!("{}.{}", t.target_table, t.target_column))
        .unwrap_or_else(|| "-".to_string());

    prompt.push_str(&format!(
        "| {} | {} | {} | {} | {} | {} |\n",
        column.name,
        column.data_type,
        if column.is_primary_key { "yes" } else { "no" },
        if column.is_nullable { "yes" } else { "no" },
        samples,
        fk,
    ));
}

fn push_enum_samples(prompt: &mut String, enum_samples: &HashMap<String, Vec<String>>) {
    if enum_samples.is_empty() {
        return;
    }
    prompt.push_str("\nObserved distinct values for candidate enum columns:\n");
    for (column, values) in enum_samples {
        prompt.push_str(&format!("- {}: {}\n", column, values.join(", ")));
    }
}

/// Builds the prompt for one chunk (<= 50 columns) of a table's columns.
pub fn build_column_chunk_prompt(
    entity_name: &str,
    entity_description: &str,
    table_name: &str,
    columns: &[SchemaColumn],
    fk_targets: &HashMap<String, ResolvedFkTarget>,
    enum_samples: &HashMap<String, Vec<String>>,
) -> String {
    let mut prompt = String::with_capacity(COLUMN_ENRICHMENT_PROMPT_BASE.len() + columns.len() * 96);
    prompt.push_str(COLUMN_ENRICHMENT_PROMPT_BASE);

    prompt.push_str(&format!("\nEntity: {entity_name} - {entity_description}\n"));
    prompt.push_str(&format!("Table: {table_name}\n\n"));
    prompt.push_str("| column | type | PK? | nullable? | sample_values | fk_target? |\n");
    prompt.push_str("|---|---|---|---|---|---|\n");
    for column in columns {
        push_column_row(&mut prompt, column, fk_targets.get(&column.name));
    }

    push_enum_samples(&mut prompt, enum_samples);

    prompt
}

pub const RELATIONSHIP_VALIDATION_SYSTEM_MESSAGE: &str =
    "You are a database schema analyst validating candidate foreign-key relationships from \
     join statistics and column metadata. Be conservative: only confirm a relationship when the \
     evidence supports it. Respond with JSON only.";

const RELATIONSHIP_VALIDATION_PROMPT_BASE: &str = "\
Evaluate whether the following candidate column pair represents a genuine foreign-key
relationship, and if so, what its cardinality is.

Return JSON of the exact shape:
{
  \"is_valid_fk\": true|false,
  \"confidence\": 0.0,
  \"cardinality\": \"1:1\"|\"N:1\"|\"1:N\"|\"N:M\",
  \"reasoning\": \"...\",
  \"source_role\": \"...\"   // optional, e.g. \"manager\", \"payer\"
}
";

/// Builds the validation prompt for a single relationship candidate.
pub fn build_relationship_validation_prompt(candidate: &RelationshipCandidate) -> String {
    let mut prompt = String::with_capacity(RELATIONSHIP_VALIDATION_PROMPT_BASE.len() + 512);
    prompt.push_str(RELATIONSHIP_VALIDATION_PROMPT_BASE);

    prompt.push_str(&format!(
        "\nSource: {}.{} (type {}, samples: {})\n",
        candidate.source.table,
        candidate.source.column,
        candidate.source.data_type,
        candidate.source.samples.join(", "),
    ));
    prompt.push_str(&format!(
        "Target: {}.{} (type {}, samples: {})\n",
        candidate.target.table,
        candidate.target.column,
        candidate.target.data_type,
        candidate.target.samples.join(", "),
    ));
    prompt.push_str(&format!(
        "Join metrics: match_rate={:.3}, coverage_rate={:.3}, join_count={}, orphan_count={}, reverse_orphan_count={}\n",
        candidate.match_rate(),
        candidate.coverage_rate(),
        candidate.join_count,
        candidate.orphan_count,
        candidate.reverse_orphan_count,
    ));

    prompt
}

#[cfg(test)]
mod tests {
    use super::*;

    fn column(name: &str) -> SchemaColumn {
        SchemaColumn {
            table: "users".into(),
            name: name.into(),
            data_type: "bigint".into(),
            is_primary_key: false,
            is_unique: false,
            is_nullable: true,
            row_count: None,
            non_null_count: None,
            distinct_count: None,
            min_length: None,
            max_length: None,
            sample_values: Some(vec!["1".into(), "2".into()]),
            features: None,
        }
    }

    #[test]
    fn chunk_prompt_includes_table_rows() {
        let cols = vec![column("id"), column("manager_id")];
        let prompt = build_column_chunk_prompt("User", "A system user", "users", &cols, &HashMap::new(), &HashMap::new());
        assert!(prompt.contains("Table: users"));
        assert!(prompt.contains("manager_id"));
    }
}
