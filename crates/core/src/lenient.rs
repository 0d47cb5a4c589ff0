//! Serde helpers for backend payloads that mix strings and numbers.
//!
//! The conversion backend stores most numeric settings as strings
//! (`"24"`, `"42.5"`) but nothing stops a hand-edited settings file or
//! a newer backend from sending bare numbers. These helpers normalize
//! both into the string form the rest of the client works with.

use serde::{Deserialize, Deserializer};
use serde_json::Value;

/// Render a JSON value as the text the backend would have sent.
///
/// `null` becomes the empty string; strings are taken verbatim;
/// everything else uses its compact JSON rendering.
pub fn value_to_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

/// Deserialize a string field that may arrive as a number or `null`.
pub fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(value_to_text(&value))
}
