//! Dialect type-string to type-category classification.

use crate::model::relationship::TypeCategory;

/// Classifies a raw dialect type string into a compatibility category.
/// Unknown types return `None` and are incompatible with everything,
/// including themselves.
pub fn classify(data_type: &str) -> Option<TypeCategory> {
    let lower = data_type.to_ascii_lowercase();
    let family = match lower.find('(') {
        Some(idx) => lower[..idx].trim(),
        None => lower.trim(),
    };

    match family {
        "uuid" => Some(TypeCategory::Uuid),
        "int" | "int2" | "int4" | "int8" | "integer" | "smallint" | "bigint" | "serial"
        | "smallserial" | "bigserial" | "tinyint" => Some(TypeCategory::Integer),
        "text" | "varchar" | "char" | "character" | "character varying" | "bpchar" | "nvarchar"
        | "nchar" | "ntext" | "string" => Some(TypeCategory::String),
        "numeric" | "decimal" | "float" | "float4" | "float8" | "real" | "double precision" | "money" => {
            Some(TypeCategory::Numeric)
        },
        "boolean" | "bool" | "bit" => Some(TypeCategory::Boolean),
        "date" => Some(TypeCategory::Timestamp),
        other if other.starts_with("timestamp") || other.starts_with("datetime") || other.starts_with("time") => {
            Some(TypeCategory::Timestamp)
        },
        "json" | "jsonb" => Some(TypeCategory::Json),
        _ => None,
    }
}

pub fn compatible(a: &str, b: &str) -> bool {
    match (classify(a), classify(b)) {
        (Some(x), Some(y)) => x.compatible_with(y),
        _ => false,
    }
}
