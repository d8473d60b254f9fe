use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// One value in a column's enumeration catalog.
///
/// `value` is always present; `label`/`description` may be absent when no
/// enum definition or LLM inference covered the value; the statistical
/// fields are only populated when a distribution-analysis pass ran.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EnumValue {
    pub value: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub count: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub percentage: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub completion_rate: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_likely_initial_state: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_likely_terminal_state: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_likely_error_state: Option<bool>,
}

impl EnumValue {
    pub fn bare(value: impl Into<String>) -> Self {
        Self { value: value.into(), ..Default::default() }
    }
}

/// A project-level enum definition: for `(table_pattern, column)`, a map
/// from raw value to a `"LABEL - description"` string. `table_pattern`
/// may be `*` to match every table.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnumDefinition {
    pub table_pattern: String,
    pub column: String,
    pub values: HashMap<String, String>,
}

/// Per-value distribution statistics from an earlier data-profiling pass,
/// merged into enum values by exact value match.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EnumDistributionResult {
    pub per_value: HashMap<String, EnumValueStats>,
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct EnumValueStats {
    pub count: u64,
    pub percentage: f64,
    pub completion_rate: f64,
    pub is_likely_initial_state: bool,
    pub is_likely_terminal_state: bool,
    pub is_likely_error_state: bool,
}
