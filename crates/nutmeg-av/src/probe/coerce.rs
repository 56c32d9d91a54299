//! Best-effort numeric coercion of ffprobe's textual values.

use serde_json::{Map, Number, Value};

/// Interpret `text` as an integer, else a finite float, else leave it as text.
///
/// Total and deterministic: empty or unparsable input comes back unchanged
/// as a string.
pub fn coerce(text: &str) -> Value {
    if let Ok(i) = text.parse::<i64>() {
        return Value::Number(i.into());
    }

    if let Ok(u) = text.parse::<u64>() {
        return Value::Number(u.into());
    }

    text.parse::<f64>()
        .ok()
        .and_then(Number::from_f64)
        .map(Value::Number)
        .unwrap_or_else(|| Value::String(text.to_string()))
}

/// Coerce every top-level string value of a record.
///
/// Nested objects and arrays (e.g. `tags`, `disposition`) are kept as-is.
pub fn coerce_record(record: Map<String, Value>) -> Map<String, Value> {
    record
        .into_iter()
        .map(|(key, value)| {
            let value = match value {
                Value::String(s) => coerce(&s),
                other => other,
            };
            (key, value)
        })
        .collect()
}
