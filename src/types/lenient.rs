//! Forgiving serde helpers for values coming from JavaScript.
//!
//! Hosts hand us whatever their UI code produced: numbers as strings,
//! booleans as `0`/`1`, nulls where a size was cleared. These helpers decode
//! through `serde_json::Value` and fall back to a default instead of failing.

use serde::{Deserialize, Deserializer};
use std::collections::HashMap;

/// Interpret a loose JSON value as an integer, mirroring `parseInt`:
/// numbers are truncated, strings are parsed from their leading digits.
#[allow(clippy::cast_possible_truncation)]
pub fn value_to_i64(value: &serde_json::Value) -> Option<i64> {
    match value {
        serde_json::Value::Number(n) => n
            .as_i64()
            .or_else(|| n.as_f64().filter(|f| f.is_finite()).map(|f| f.trunc() as i64)),
        serde_json::Value::String(s) => parse_int_prefix(s),
        _ => None,
    }
}

/// Parse the leading integer of a string (`"12px"` → 12, `"abc"` → None).
pub fn parse_int_prefix(s: &str) -> Option<i64> {
    let trimmed = s.trim_start();
    let (sign, digits) = match trimmed.strip_prefix('-') {
        Some(rest) => (-1, rest),
        None => (1, trimmed.strip_prefix('+').unwrap_or(trimmed)),
    };
    let end = digits
        .char_indices()
        .find(|(_, c)| !c.is_ascii_digit())
        .map_or(digits.len(), |(i, _)| i);
    let number: i64 = digits.get(..end)?.parse().ok()?;
    Some(sign * number)
}

/// Interpret a loose JSON value as a positive pixel size.
pub fn value_to_size(value: &serde_json::Value) -> Option<u32> {
    value_to_i64(value)
        .filter(|v| *v > 0)
        .and_then(|v| u32::try_from(v).ok())
}

/// Interpret a loose JSON value as a row/column index; negatives and
/// non-numbers become 0.
pub fn value_to_index(value: &serde_json::Value) -> u32 {
    value_to_i64(value)
        .and_then(|v| u32::try_from(v.max(0)).ok())
        .unwrap_or(0)
}

/// Interpret a loose JSON value as a flag (`true`, `1`, `"true"`).
pub fn value_to_bool(value: &serde_json::Value) -> bool {
    match value {
        serde_json::Value::Bool(b) => *b,
        serde_json::Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        serde_json::Value::String(s) => matches!(s.trim(), "true" | "1"),
        _ => false,
    }
}

/// Deserialize a non-negative integer, falling back to 0 for anything else.
pub fn lenient_u32<'de, D>(deserializer: D) -> Result<u32, D::Error>
where
    D: Deserializer<'de>,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(value_to_index(&value))
}

/// Deserialize a span count; anything below 1 means "no span".
pub fn lenient_span<'de, D>(deserializer: D) -> Result<u32, D::Error>
where
    D: Deserializer<'de>,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(value_to_size(&value).unwrap_or(1))
}

/// Deserialize a flag leniently.
pub fn lenient_bool<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(value_to_bool(&value))
}

/// Deserialize an optional string, dropping non-string and blank values.
pub fn lenient_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(match value {
        serde_json::Value::String(s) if !s.trim().is_empty() => Some(s),
        _ => None,
    })
}

/// Decode a size-override object (`{"A": 120, "C": "80"}`), dropping
/// entries that are not positive integers.
pub fn size_map(value: &serde_json::Value) -> HashMap<String, u32> {
    let mut sizes = HashMap::new();
    if let serde_json::Value::Object(entries) = value {
        for (key, raw) in entries {
            if let Some(size) = value_to_size(raw) {
                sizes.insert(key.clone(), size);
            }
        }
    }
    sizes
}

/// Decode a row size-override object keyed by row index.
pub fn row_size_map(value: &serde_json::Value) -> HashMap<u32, u32> {
    size_map(value)
        .into_iter()
        .filter_map(|(key, size)| key.trim().parse::<u32>().ok().map(|row| (row, size)))
        .collect()
}
