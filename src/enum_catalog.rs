//! Enum value catalog construction: merges sampled column values against
//! project-defined enum catalogs and, where available, an earlier
//! distribution-analysis pass.

use crate::model::enum_value::{EnumDefinition, EnumDistributionResult, EnumValue};

const ENUM_NAME_SUFFIXES: &[&str] =
    &["_status", "_type", "_level", "_state", "_category", "_kind", "_flag"];

const DEFAULT_LOW_CARDINALITY_THRESHOLD: u64 = 50;

/// Flags a column for distribution sampling ahead of enrichment: either its
/// name carries one of the enum-ish suffixes, or its known distinct count
/// is low enough to plausibly be an enumeration.
pub fn identify_enum_candidates(column_name: &str, distinct_count: Option<u64>) -> bool {
    identify_enum_candidates_with_threshold(column_name, distinct_count, DEFAULT_LOW_CARDINALITY_THRESHOLD)
}

pub fn identify_enum_candidates_with_threshold(
    column_name: &str,
    distinct_count: Option<u64>,
    low_cardinality_threshold: u64,
) -> bool {
    let lower = column_name.to_ascii_lowercase();
    if ENUM_NAME_SUFFIXES.iter().any(|suffix| lower.ends_with(suffix)) {
        return true;
    }
    matches!(distinct_count, Some(n) if n <= low_cardinality_threshold)
}

/// Result of splitting a def string of the form `"LABEL - description"`.
#[derive(Debug, PartialEq, Eq)]
enum DescSplit {
    /// Both sides of the first `" - "` were non-empty.
    Labeled(String, String),
    /// No separator at all: the whole string becomes the description.
    DescriptionOnly(String),
    /// Separator found but one side was empty; falls back to a bare value.
    Bare,
}

/// Splits a def string of the form `"LABEL - description"`. Boundary
/// behaviour:
/// - `" - X"` (empty label) or `"X - "` (empty description) -> `Bare`
/// - `"A - B - C"` splits on the *first* `" - "` -> `Labeled("A", "B - C")`
/// - no separator at all -> `DescriptionOnly` (label empty)
fn split_enum_description(raw: &str) -> DescSplit {
    match raw.find(" - ") {
        Some(idx) => {
            let label = raw[..idx].trim();
            let description = raw[idx + 3..].trim();
            if label.is_empty() || description.is_empty() {
                DescSplit::Bare
            } else {
                DescSplit::Labeled(label.to_string(), description.to_string())
            }
        },
        None => DescSplit::DescriptionOnly(raw.trim().to_string()),
    }
}

fn find_matching_def<'a>(
    defs: &'a [EnumDefinition],
    table: &str,
    column: &str,
) -> Option<&'a EnumDefinition> {
    let exact = defs
        .iter()
        .find(|d| d.column.eq_ignore_ascii_case(column) && d.table_pattern == table);
    exact.or_else(|| {
        defs.iter()
            .find(|d| d.column.eq_ignore_ascii_case(column) && d.table_pattern == "*")
    })
}

/// Builds the `EnumValue` catalog for `(table, column)` from its sampled
/// values, any matching project enum definition, and an optional
/// distribution-analysis result.
pub fn merge_enum_values(
    table: &str,
    column: &str,
    sampled_values: &[String],
    project_enum_defs: &[EnumDefinition],
    distribution_result: Option<&EnumDistributionResult>,
) -> Vec<EnumValue> {
    if sampled_values.is_empty() {
        return Vec::new();
    }

    let def = find_matching_def(project_enum_defs, table, column);

    let mut values: Vec<EnumValue> = sampled_values
        .iter()
        .map(|raw_value| match def {
            Some(def) => match def.values.get(raw_value) {
                Some(def_string) => match split_enum_description(def_string) {
                    DescSplit::Labeled(label, description) => EnumValue {
                        value: raw_value.clone(),
                        label: Some(label),
                        description: Some(description),
                        ..Default::default()
                    },
                    DescSplit::DescriptionOnly(description) => EnumValue {
                        value: raw_value.clone(),
                        label: None,
                        description: Some(description),
                        ..Default::default()
                    },
                    DescSplit::Bare => EnumValue::bare(raw_value.clone()),
                },
                None => EnumValue::bare(raw_value.clone()),
            },
            None => EnumValue::bare(raw_value.clone()),
        })
        .collect();

    if let Some(dist) = distribution_result {
        for value in &mut values {
            if let Some(stats) = dist.per_value.get(&value.value) {
                value.count = Some(stats.count);
                value.percentage = Some(stats.percentage);
                value.completion_rate = Some(stats.completion_rate);
                value.is_likely_initial_state = Some(stats.is_likely_initial_state);
                value.is_likely_terminal_state = Some(stats.is_likely_terminal_state);
                value.is_likely_error_state = Some(stats.is_likely_error_state);
            }
        }
    }

    values
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    #[test]
    fn split_rejects_leading_empty_label() {
        assert_eq!(split_enum_description(" - X"), DescSplit::Bare);
    }

    #[test]
    fn split_rejects_trailing_empty_description() {
        assert_eq!(split_enum_description("X - "), DescSplit::Bare);
    }

    #[test]
    fn split_uses_first_separator() {
        assert_eq!(
            split_enum_description("A - B - C"),
            DescSplit::Labeled("A".to_string(), "B - C".to_string())
        );
    }

    #[test]
    fn split_no_separator_is_description_only() {
        assert_eq!(split_enum_description("just text"), DescSplit::DescriptionOnly("just text".to_string()));
    }

    #[test]
    fn merge_applies_def_labels() {
        let mut values = HashMap::new();
        values.insert("1".to_string(), "STARTED - Transaction started".to_string());
        values.insert("2".to_string(), "ENDED - Transaction ended".to_string());
        let defs = vec![EnumDefinition {
            table_pattern: "transactions".to_string(),
            column: "transaction_state".to_string(),
            values,
        }];

        let merged = merge_enum_values(
            "transactions",
            "transaction_state",
            &["1".to_string(), "2".to_string(), "3".to_string()],
            &defs,
            None,
        );

        assert_eq!(merged.len(), 3);
        assert_eq!(merged[0].label.as_deref(), Some("STARTED"));
        assert_eq!(merged[1].label.as_deref(), Some("ENDED"));
        assert_eq!(merged[2].label, None);
    }

    #[test]
    fn merge_falls_back_to_bare_on_empty_label() {
        let mut values = HashMap::new();
        values.insert("1".to_string(), " - no label here".to_string());
        let defs = vec![EnumDefinition {
            table_pattern: "transactions".to_string(),
            column: "transaction_state".to_string(),
            values,
        }];

        let merged = merge_enum_values("transactions", "transaction_state", &["1".to_string()], &defs, None);

        assert_eq!(merged[0].label, None);
        assert_eq!(merged[0].description, None);
    }

    #[test]
    fn merge_without_def_returns_bare_values() {
        let merged = merge_enum_values("orders", "status", &["a".to_string(), "b".to_string()], &[], None);
        assert_eq!(merged.len(), 2);
        assert!(merged.iter().all(|v| v.label.is_none() && v.description.is_none()));
    }

    #[test]
    fn empty_samples_return_empty() {
        let merged = merge_enum_values("orders", "status", &[], &[], None);
        assert!(merged.is_empty());
    }

    #[test]
    fn exact_table_pattern_wins_over_wildcard() {
        let mut wildcard_values = HashMap::new();
        wildcard_values.insert("a".to_string(), "WILDCARD - from star".to_string());
        let mut exact_values = HashMap::new();
        exact_values.insert("a".to_string(), "EXACT - from orders".to_string());
        let defs = vec![
            EnumDefinition { table_pattern: "*".to_string(), column: "status".to_string(), values: wildcard_values },
            EnumDefinition { table_pattern: "orders".to_string(), column: "status".to_string(), values: exact_values },
        ];

        let merged = merge_enum_values("orders", "status", &["a".to_string()], &defs, None);
        assert_eq!(merged[0].label.as_deref(), Some("EXACT"));
    }

    #[test]
    fn low_cardinality_flags_candidate() {
        assert!(identify_enum_candidates("random_col", Some(10)));
        assert!(!identify_enum_candidates("random_col", Some(200)));
        assert!(identify_enum_candidates("account_status", None));
    }
}
