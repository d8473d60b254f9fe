use std::collections::HashMap;

use crate::model::column::SchemaColumn;
use crate::model::column_detail::ColumnRole;

use super::common::type_family;
use super::{DetectorKind, PatternResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
enum Scale {
    Seconds,
    Milliseconds,
    Microseconds,
    Nanoseconds,
}

impl Scale {
    fn from_digit_len(len: usize) -> Option<Self> {
        match len {
            9..=11 => Some(Self::Seconds),
            12..=14 => Some(Self::Milliseconds),
            15..=17 => Some(Self::Microseconds),
            18..=20 => Some(Self::Nanoseconds),
            _ => None,
        }
    }

    fn label(self) -> &'static str {
        match self {
            Self::Seconds => "seconds",
            Self::Milliseconds => "milliseconds",
            Self::Microseconds => "microseconds",
            Self::Nanoseconds => "nanoseconds",
        }
    }
}

fn digit_len(sample: &str) -> Option<usize> {
    let trimmed = sample.trim();
    if trimmed.is_empty() || !trimmed.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    if trimmed.starts_with('0') && trimmed.len() > 1 {
        return None;
    }
    Some(trimmed.len())
}

/// Matches `bigint`/`int8` columns whose name contains `time` or ends in
/// `_at`, where at least 80% of valid (9-20 digit) samples share the same
/// scale class.
pub fn detect(column: &SchemaColumn) -> Option<PatternResult> {
    let fam = type_family(&column.data_type);
    if fam != "bigint" && fam != "int8" {
        return None;
    }

    let lower_name = column.name.to_ascii_lowercase();
    if !lower_name.contains("time") && !lower_name.ends_with("_at") {
        return None;
    }

    let samples = column.samples();
    if samples.is_empty() {
        return None;
    }

    let mut counts: HashMap<Scale, usize> = HashMap::new();
    let mut valid_total = 0usize;
    for sample in samples {
        if let Some(len) = digit_len(sample) {
            if let Some(scale) = Scale::from_digit_len(len) {
                *counts.entry(scale).or_insert(0) += 1;
                valid_total += 1;
            }
        }
    }
    if valid_total == 0 {
        return None;
    }

    let (dominant, dominant_count) = counts.into_iter().max_by_key(|(_, n)| *n)?;
    if dominant_count as f64 / valid_total as f64 < 0.80 {
        return None;
    }

    let mut description = format!("Epoch timestamp stored as bigint, scale: {}.", dominant.label());
    if lower_name.contains("marker") || lower_name.contains("cursor") {
        description.push_str(" Likely used for cursor-based pagination.");
    }
    if matches!(lower_name.as_str(), "created_at" | "updated_at" | "deleted_at" | "occurred_at") {
        description.push_str(" Record timestamp.");
    }

    Some(PatternResult {
        detector: DetectorKind::TimestampScale,
        description,
        semantic_type: "epoch_timestamp".to_string(),
        role: ColumnRole::Attribute,
        detected_role: None,
    })
}
