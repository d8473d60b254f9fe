use once_cell::sync::Lazy;
use regex::Regex;

use crate::model::column::SchemaColumn;
use crate::model::column_detail::ColumnRole;

use super::common::{ends_with_token, is_integer_family};
use super::{DetectorKind, PatternResult};

const SUFFIXES: &[&str] = &["amount", "share", "price", "cost", "fee", "value", "total"];

fn name_matches(name: &str) -> bool {
    SUFFIXES.iter().any(|s| ends_with_token(name, s))
}

static CURRENCY_CODE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[A-Z]{3}$").expect("static regex"));

/// Returns the sibling column name (`currency` or `*_currency`) this
/// monetary column should be paired with, if present among `siblings` and
/// its sample values are ≥50% valid ISO-4217-shaped codes.
pub fn find_currency_sibling(siblings: &[SchemaColumn]) -> Option<String> {
    siblings
        .iter()
        .filter(|c| c.name.eq_ignore_ascii_case("currency") || ends_with_token(&c.name, "currency"))
        .find(|c| {
            let samples = c.samples();
            if samples.is_empty() {
                return false;
            }
            let matches = samples.iter().filter(|v| CURRENCY_CODE_RE.is_match(v)).count();
            matches as f64 / samples.len() as f64 >= 0.5
        })
        .map(|c| c.name.clone())
}

/// True for integer-family types plus `numeric`, which this detector
/// alone treats as an integer-minor-units encoding; `is_integer_family`
/// stays narrow since `boolean_naming.rs` also depends on it.
fn is_monetary_numeric_family(data_type: &str) -> bool {
    is_integer_family(data_type) || data_type.to_ascii_lowercase().starts_with("numeric")
}

/// Matches integer-family (plus `numeric`) columns whose name ends, on a
/// token boundary, with one of `amount`/`share`/`price`/`cost`/`fee`/
/// `value`/`total`.
pub fn detect(column: &SchemaColumn) -> Option<PatternResult> {
    if !is_monetary_numeric_family(&column.data_type) {
        return None;
    }
    if !name_matches(&column.name) {
        return None;
    }

    Some(PatternResult {
        detector: DetectorKind::MonetaryAmount,
        description: "Monetary amount stored as currency_cents (integer minor units).".to_string(),
        semantic_type: "currency_cents".to_string(),
        role: ColumnRole::Measure,
        detected_role: None,
    })
}
