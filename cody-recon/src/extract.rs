//! Field extraction from loosely-typed records
//!
//! Values come back from external systems as numbers, numeric strings, or
//! junk. Extraction returns the first listed spelling whose value parses;
//! anything non-parseable is absent, never coerced to zero.

use crate::fields::FieldTable;
use cody_common::types::Endgame;
use serde_json::Value;
use std::collections::BTreeMap;

/// Parse a value as a finite number
///
/// Accepts native JSON numbers and full-string float parses ("3", "2.5").
/// NaN/infinity and partial-numeric strings ("3 coral") are absent.
pub fn parse_finite(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64().filter(|f| f.is_finite()),
        Value::String(s) => s.trim().parse::<f64>().ok().filter(|f| f.is_finite()),
        _ => None,
    }
}

/// Extract a numeric score field, trying each listed spelling in order
///
/// Returns the first spelling present whose value parses as a finite number.
/// An unknown field name (not in the table) is absent.
pub fn number_field(
    fields: &BTreeMap<String, Value>,
    table: &FieldTable,
    field: &str,
) -> Option<f64> {
    table
        .spellings(field)?
        .find_map(|spelling| fields.get(spelling).and_then(parse_finite))
}

/// Extract the endgame state, trying each listed spelling in order
pub fn endgame_field(fields: &BTreeMap<String, Value>, table: &FieldTable) -> Option<Endgame> {
    table
        .endgame_spellings()
        .find_map(|spelling| fields.get(spelling))
        .and_then(|value| value.as_str())
        .and_then(Endgame::parse)
}
