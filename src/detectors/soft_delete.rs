use crate::model::column::SchemaColumn;
use crate::model::column_detail::ColumnRole;

use super::common::is_timestamp_family;
use super::{DetectorKind, PatternResult};

/// Matches `deleted_at` nullable timestamp columns used for soft deletes.
/// When stats are available the active rate must be at least 90%; absent
/// stats are assumed 100% active.
pub fn detect(column: &SchemaColumn) -> Option<PatternResult> {
    if !column.name.eq_ignore_ascii_case("deleted_at") {
        return None;
    }
    if !is_timestamp_family(&column.data_type) || !column.is_nullable {
        return None;
    }

    let active_rate = match (column.row_count, column.null_count()) {
        (Some(rows), Some(nulls)) if rows > 0 => nulls as f64 / rows as f64,
        (Some(0), _) | (None, _) => 1.0,
        _ => 1.0,
    };
    if active_rate < 0.90 {
        return None;
    }

    Some(PatternResult {
        detector: DetectorKind::SoftDelete,
        description: format!(
            "Soft delete timestamp. NULL = active record. {:.1}% of rows are active.",
            active_rate * 100.0
        ),
        semantic_type: "soft_delete_timestamp".to_string(),
        role: ColumnRole::Attribute,
        detected_role: None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn col(name: &str, row_count: Option<u64>, non_null: Option<u64>) -> SchemaColumn {
        SchemaColumn {
            table: "t".into(),
            name: name.into(),
            data_type: "timestamp".into(),
            is_primary_key: false,
            is_unique: false,
            is_nullable: true,
            row_count,
            non_null_count: non_null,
            distinct_count: None,
            min_length: None,
            max_length: None,
            sample_values: None,
            features: None,
        }
    }

    #[test]
    fn matches_high_active_rate() {
        let c = col("deleted_at", Some(10_000), Some(1));
        let r = detect(&c).expect("should match");
        assert_eq!(r.semantic_type, "soft_delete_timestamp");
        assert!(r.description.contains("NULL = active record"));
    }

    #[test]
    fn rejects_just_below_threshold() {
        // active_rate = 8999/10000 = 89.99%
        let c = col("deleted_at", Some(10_000), Some(1001));
        assert!(detect(&c).is_none());
    }

    #[test]
    fn accepts_exactly_threshold() {
        // active_rate = 9000/10000 = 90.00%
        let c = col("deleted_at", Some(10_000), Some(1000));
        assert!(detect(&c).is_some());
    }

    #[test]
    fn no_stats_assumes_active() {
        let c = col("deleted_at", None, None);
        assert!(detect(&c).is_some());
    }

    #[test]
    fn name_must_match_exactly() {
        let c = col("deleted_on", Some(100), Some(1));
        assert!(detect(&c).is_none());
    }

    #[test]
    fn requires_nullable() {
        let mut c = col("deleted_at", Some(100), Some(1));
        c.is_nullable = false;
        assert!(detect(&c).is_none());
    }
}
