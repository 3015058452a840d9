//! Lenient field decoders for extraction-service output.
//!
//! The service is asked for a schema but does not always honour it: a list may
//! come back as `null`, a GPA as a number, honors as an array. These helpers
//! accept the common variations so a single odd field never sinks the record.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer};
use serde_json::Value;
use tracing::debug;

/// `null`/absent becomes an empty list. Elements that do not fit `T` are
/// dropped rather than failing the whole record. A bare scalar is treated as a
/// one-element list.
pub fn list<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let items = match Value::deserialize(deserializer)? {
        Value::Null => return Ok(Vec::new()),
        Value::Array(items) => items,
        other => vec![other],
    };

    Ok(items
        .into_iter()
        .filter_map(|item| match serde_json::from_value::<T>(item) {
            Ok(parsed) => Some(parsed),
            Err(e) => {
                debug!("Dropping malformed list element: {e}");
                None
            }
        })
        .collect())
}

/// A nested record that is not an object (e.g. a bare string where an object
/// was expected) decodes as `None` instead of failing the parent.
pub fn opt_record<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    match Value::deserialize(deserializer)? {
        value @ Value::Object(_) => Ok(serde_json::from_value(value).ok()),
        _ => Ok(None),
    }
}

/// Any scalar becomes text; arrays of scalars are joined with ", ".
pub fn opt_text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(value_to_text(Value::deserialize(deserializer)?))
}

/// Like [`opt_text`] for fields that must be present.
pub fn text<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    value_to_text(Value::deserialize(deserializer)?)
        .ok_or_else(|| serde::de::Error::custom("expected a text value"))
}

/// A 0–100 figure given as a number or a numeric string (`"85"`, `"85%"`).
/// Out-of-range values are clamped; anything unparseable is `None`.
pub fn opt_percent<'de, D>(deserializer: D) -> Result<Option<u8>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = match Value::deserialize(deserializer)? {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().trim_end_matches('%').trim().parse::<f64>().ok(),
        _ => None,
    };
    Ok(raw
        .filter(|v| v.is_finite())
        .map(|v| v.round().clamp(0.0, 100.0) as u8))
}

// Patch variants: an absent field stays `None` through `#[serde(default)]`;
// a present one, `null` included, becomes `Some(..)` so it can clear.

pub fn patch_list<'de, D, T>(deserializer: D) -> Result<Option<Vec<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    list(deserializer).map(Some)
}

pub fn patch_record<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    opt_record(deserializer).map(Some)
}

pub fn patch_text<'de, D>(deserializer: D) -> Result<Option<Option<String>>, D::Error>
where
    D: Deserializer<'de>,
{
    opt_text(deserializer).map(Some)
}

pub fn patch_percent<'de, D>(deserializer: D) -> Result<Option<Option<u8>>, D::Error>
where
    D: Deserializer<'de>,
{
    opt_percent(deserializer).map(Some)
}

fn value_to_text(value: Value) -> Option<String> {
    match value {
        Value::Null | Value::Object(_) => None,
        Value::String(s) => Some(s),
        Value::Bool(b) => Some(b.to_string()),
        Value::Number(n) => Some(n.to_string()),
        Value::Array(items) => {
            let parts: Vec<String> = items.into_iter().filter_map(value_to_text).collect();
            if parts.is_empty() {
                None
            } else {
                Some(parts.join(", "))
            }
        }
    }
}
