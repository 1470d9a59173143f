// src/value_utils.rs
//! Shared helpers for working with JSON document values: dot-path lookup,
//! the value ordering behind sorts, and canonical token keys for grouping.

use serde_json::Value;
use std::cmp::Ordering;

/// Look up a field with dot-notation support ("address.city").
///
/// Returns `None` as soon as any path segment is missing or the value
/// being descended into is not an object.
pub fn get_path<'a>(doc: &'a Value, path: &str) -> Option<&'a Value> {
    if !path.contains('.') {
        return doc.get(path);
    }
    let mut value = doc;
    for part in path.split('.') {
        value = value.get(part)?;
    }
    Some(value)
}

/// Total order over optional JSON values, used when sorting query results.
///
/// Missing values sort first. Numbers, strings and booleans compare
/// within their own type; across types a fixed rank keeps the sort stable.
pub fn order_values(a: Option<&Value>, b: Option<&Value>) -> Ordering {
    match (a, b) {
        (None, None) => Ordering::Equal,
        (None, Some(_)) => Ordering::Less,
        (Some(_), None) => Ordering::Greater,
        (Some(Value::Number(x)), Some(Value::Number(y))) => {
            let fx = x.as_f64().unwrap_or(0.0);
            let fy = y.as_f64().unwrap_or(0.0);
            fx.partial_cmp(&fy).unwrap_or(Ordering::Equal)
        }
        (Some(Value::String(x)), Some(Value::String(y))) => x.cmp(y),
        (Some(Value::Bool(x)), Some(Value::Bool(y))) => x.cmp(y),
        (Some(x), Some(y)) => type_rank(x).cmp(&type_rank(y)),
    }
}

fn type_rank(value: &Value) -> u8 {
    match value {
        Value::Null => 0,
        Value::Number(_) => 1,
        Value::String(_) => 2,
        Value::Bool(_) => 3,
        Value::Object(_) => 4,
        Value::Array(_) => 5,
    }
}

/// Canonical string form of an identifier token, used as a grouping key.
///
/// Plain strings are used raw, so string and ObjectId-style tokens collide
/// exactly when their text matches. Anything else serializes canonically
/// (object keys sorted) so structurally equal tokens always produce the
/// same key regardless of insertion order.
pub fn token_key(token: &Value) -> String {
    match token {
        Value::String(s) => s.clone(),
        other => canonical_string(other),
    }
}

/// Deterministic serialization: object keys sorted alphabetically at
/// every level.
pub fn canonical_string(value: &Value) -> String {
    match value {
        Value::Object(map) => {
            let mut pairs: Vec<_> = map.iter().collect();
            pairs.sort_by(|a, b| a.0.cmp(b.0));
            let inner: Vec<String> = pairs
                .iter()
                .map(|(k, v)| format!("\"{}\":{}", k, canonical_string(v)))
                .collect();
            format!("{{{}}}", inner.join(","))
        }
        Value::Array(items) => {
            let inner: Vec<String> = items.iter().map(canonical_string).collect();
            format!("[{}]", inner.join(","))
        }
        _ => value.to_string(),
    }
}
