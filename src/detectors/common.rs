//! Shared type-family and naming helpers used by several detectors.

/// Normalizes a dialect type string for family matching: lowercase, and
/// strips a trailing parenthesized precision/length, e.g. `VARCHAR(255)` ->
/// `varchar`.
pub fn type_family(data_type: &str) -> String {
    let lower = data_type.to_ascii_lowercase();
    match lower.find('(') {
        Some(idx) => lower[..idx].trim().to_string(),
        None => lower.trim().to_string(),
    }
}

pub fn is_integer_family(data_type: &str) -> bool {
    matches!(
        type_family(data_type).as_str(),
        "int" | "int2" | "int4" | "int8" | "integer" | "smallint" | "bigint" | "serial"
            | "smallserial" | "bigserial" | "tinyint"
    )
}

pub fn is_text_family(data_type: &str) -> bool {
    matches!(
        type_family(data_type).as_str(),
        "text" | "varchar" | "char" | "character" | "character varying" | "bpchar" | "nvarchar"
            | "nchar" | "ntext" | "string"
    )
}

pub fn is_timestamp_family(data_type: &str) -> bool {
    let fam = type_family(data_type);
    fam.starts_with("timestamp") || fam.starts_with("datetime") || fam == "date" || fam.starts_with("time")
}

pub fn is_boolean_family(data_type: &str) -> bool {
    matches!(type_family(data_type).as_str(), "boolean" | "bool" | "bit" | "bit(1)")
}

/// True if `name` ends with `suffix` on a `_`-delimited token boundary, or
/// equals it outright. Used for the monetary-amount name match so
/// `preamount` and `amount_type` are rejected but `total_amount` matches.
pub fn ends_with_token(name: &str, suffix: &str) -> bool {
    let lower = name.to_ascii_lowercase();
    let suffix = suffix.to_ascii_lowercase();
    if lower == suffix {
        return true;
    }
    lower.ends_with(&format!("_{suffix}"))
}

/// `prefix` already includes its trailing underscore (e.g. `"is_"`).
pub fn starts_with_token(name: &str, prefix: &str) -> bool {
    name.to_ascii_lowercase().starts_with(prefix)
}
