use once_cell::sync::Lazy;
use regex::Regex;

use crate::model::column::SchemaColumn;
use crate::model::column_detail::ColumnRole;

use super::common::is_text_family;
use super::{DetectorKind, PatternResult};

static UUID_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)^[0-9a-f]{8}-[0-9a-f]{4}-[0-9a-f]{4}-[0-9a-f]{4}-[0-9a-f]{12}$").expect("static regex")
});

/// Matches text-family columns whose non-empty sample values are more than
/// 99% canonical 8-4-4-4-12 UUID strings. Braces, URN prefixes, and
/// malformed lengths all fail the match.
pub fn detect(column: &SchemaColumn) -> Option<PatternResult> {
    if !is_text_family(&column.data_type) {
        return None;
    }

    let samples: Vec<&String> = column.samples().iter().filter(|v| !v.is_empty()).collect();
    if samples.is_empty() {
        return None;
    }

    let matched = samples.iter().filter(|v| UUID_RE.is_match(v)).count();
    let ratio = matched as f64 / samples.len() as f64;
    if ratio <= 0.99 {
        return None;
    }

    Some(PatternResult {
        detector: DetectorKind::UuidText,
        description: "Text column storing canonical UUID values.".to_string(),
        semantic_type: "uuid_text".to_string(),
        role: ColumnRole::Identifier,
        detected_role: None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn col(samples: Vec<&str>) -> SchemaColumn {
        SchemaColumn {
            table: "t".into(),
            name: "external_ref".into(),
            data_type: "varchar(36)".into(),
            is_primary_key: false,
            is_unique: false,
            is_nullable: true,
            row_count: None,
            non_null_count: None,
            distinct_count: None,
            min_length: None,
            max_length: None,
            sample_values: Some(samples.into_iter().map(String::from).collect()),
            features: None,
        }
    }

    #[test]
    fn all_matching_detects() {
        let c = col(vec![
            "550e8400-e29b-41d4-a716-446655440000",
            "123e4567-e89b-12d3-a456-426614174000",
        ]);
        assert!(detect(&c).is_some());
    }

    #[test]
    fn exactly_99_percent_rejects() {
        // 99 of 100 match: exactly 99%, must strictly exceed to accept.
        let mut samples: Vec<String> = (0..99)
            .map(|_| "550e8400-e29b-41d4-a716-446655440000".to_string())
            .collect();
        samples.push("not-a-uuid".to_string());
        let c = SchemaColumn {
            sample_values: Some(samples),
            ..col(vec![])
        };
        assert!(detect(&c).is_none());
    }

    #[test]
    fn rejects_braces_and_urn_prefix() {
        let c = col(vec!["{550e8400-e29b-41d4-a716-446655440000}", "urn:uuid:123e4567-e89b-12d3-a456-426614174000"]);
        assert!(detect(&c).is_none());
    }
}
