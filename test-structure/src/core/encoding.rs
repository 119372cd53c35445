//! JSON encoding for persisted records, plus the shallow emptiness check.

use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;

/// Encode `value` as JSON with a trailing newline.
pub fn encode<T: Serialize + ?Sized>(value: &T, pretty: bool) -> serde_json::Result<Vec<u8>> {
    let mut buf = if pretty {
        serde_json::to_vec_pretty(value)?
    } else {
        serde_json::to_vec(value)?
    };
    buf.push(b'\n');
    Ok(buf)
}

/// Decode JSON bytes into the caller's target shape.
pub fn decode<T: DeserializeOwned>(bytes: &[u8]) -> serde_json::Result<T> {
    serde_json::from_slice(bytes)
}

/// Classify an encoding as "empty" for presence checks.
///
/// Zero-length (or whitespace-only) input, `null`, `false`, numeric zero, `{}`
/// and `[]` are empty. Strings are never empty, including `""`.
///
/// The check is shallow: only the top-level value is inspected, so
/// `{"key": null}` and `[0]` are not empty. Malformed JSON is an error rather
/// than a classification.
pub fn is_empty_encoding(bytes: &[u8]) -> serde_json::Result<bool> {
    if bytes.iter().all(u8::is_ascii_whitespace) {
        return Ok(true);
    }
    let value: Value = serde_json::from_slice(bytes)?;
    Ok(is_empty_value(&value))
}

fn is_empty_value(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Bool(flag) => !flag,
        Value::Number(number) => number.as_f64() == Some(0.0),
        Value::String(_) => false,
        Value::Array(items) => items.is_empty(),
        Value::Object(members) => members.is_empty(),
    }
}
