use crate::model::column::SchemaColumn;
use crate::model::column_detail::ColumnRole;

use super::common::{is_boolean_family, is_integer_family, starts_with_token};
use super::{DetectorKind, PatternResult};

const PREFIXES: &[&str] = &["is_", "has_", "can_", "should_", "allow_", "allows_", "needs_", "was_", "will_"];

const ABBREVIATIONS: &[(&str, &str)] = &[
    ("pc", "PC"),
    ("api", "API"),
    ("ssl", "SSL"),
    ("mfa", "MFA"),
    ("sso", "SSO"),
    ("id", "ID"),
    ("uuid", "UUID"),
    ("url", "URL"),
    ("http", "HTTP"),
    ("https", "HTTPS"),
    ("tls", "TLS"),
    ("2fa", "2FA"),
];

fn matching_prefix(name: &str) -> Option<&'static str> {
    PREFIXES.iter().copied().find(|p| starts_with_token(name, p))
}

fn is_bool_like_sample(value: &str) -> bool {
    matches!(value.to_ascii_lowercase().as_str(), "0" | "1" | "true" | "false")
}

fn feature_name(name: &str, prefix: &str) -> String {
    let suffix = &name[prefix.len()..];
    suffix
        .split('_')
        .filter(|w| !w.is_empty())
        .map(|word| {
            let lower = word.to_ascii_lowercase();
            ABBREVIATIONS
                .iter()
                .find(|(abbr, _)| *abbr == lower)
                .map(|(_, upper)| upper.to_string())
                .unwrap_or_else(|| word.to_string())
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// Matches boolean-typed or 2-valued integer columns whose name begins with
/// a boolean-ish prefix (`is_`, `has_`, `can_`, ...).
pub fn detect(column: &SchemaColumn) -> Option<PatternResult> {
    let is_bool_typed = is_boolean_family(&column.data_type);
    let is_two_valued_int = is_integer_family(&column.data_type)
        && column.distinct_count == Some(2)
        && {
            let samples = column.samples();
            !samples.is_empty() && samples.iter().all(|v| is_bool_like_sample(v))
        };
    if !is_bool_typed && !is_two_valued_int {
        return None;
    }

    let prefix = matching_prefix(&column.name)?;
    let feature = feature_name(&column.name, prefix);

    Some(PatternResult {
        detector: DetectorKind::BooleanNaming,
        description: format!("Boolean flag: {feature}."),
        semantic_type: "boolean_flag".to_string(),
        role: ColumnRole::Dimension,
        detected_role: None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn col(name: &str, data_type: &str) -> SchemaColumn {
        SchemaColumn {
            table: "t".into(),
            name: name.into(),
            data_type: data_type.into(),
            is_primary_key: false,
            is_unique: false,
            is_nullable: true,
            row_count: None,
            non_null_count: None,
            distinct_count: None,
            min_length: None,
            max_length: None,
            sample_values: None,
            features: None,
        }
    }

    #[test]
    fn matches_bool_typed() {
        let c = col("is_active", "boolean");
        let r = detect(&c).expect("should match");
        assert_eq!(r.description, "Boolean flag: active.");
    }

    #[test]
    fn uppercases_known_abbreviation() {
        let c = col("has_sso", "bool");
        let r = detect(&c).expect("should match");
        assert_eq!(r.description, "Boolean flag: SSO.");
    }

    #[test]
    fn matches_two_valued_integer() {
        let mut c = col("allows_api_access", "int4");
        c.distinct_count = Some(2);
        c.sample_values = Some(vec!["0".into(), "1".into()]);
        let r = detect(&c).expect("should match");
        assert_eq!(r.description, "Boolean flag: API access.");
    }

    #[test]
    fn rejects_without_prefix() {
        let c = col("active_flag", "boolean");
        assert!(detect(&c).is_none());
    }

    #[test]
    fn rejects_integer_without_binary_samples() {
        let mut c = col("is_legacy", "int4");
        c.distinct_count = Some(2);
        c.sample_values = Some(vec!["5".into(), "9".into()]);
        assert!(detect(&c).is_none());
    }
}
