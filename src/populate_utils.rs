// src/populate_utils.rs
//! Pure grouping and identity helpers behind reverse population. No I/O.

use crate::value_utils::{get_path, token_key};
use ahash::AHashMap;
use serde_json::Value;

/// View of a related document's foreign-key field.
///
/// Grouping branches on this explicitly: a scalar token means exactly one
/// group, an array of tokens means membership in every listed group, and
/// a missing or null key means the record participates in none.
enum ForeignKey<'a> {
    One(&'a Value),
    Many(&'a [Value]),
    None,
}

fn foreign_key_of<'a>(record: &'a Value, key_field: &str) -> ForeignKey<'a> {
    match get_path(record, key_field) {
        None | Some(Value::Null) => ForeignKey::None,
        Some(Value::Array(tokens)) => ForeignKey::Many(tokens),
        Some(token) => ForeignKey::One(token),
    }
}

/// The identifier token behind a value that is either a raw token or a
/// document wrapping one (a populated reference).
pub fn id_token(value: &Value) -> Option<&Value> {
    match value {
        Value::Null => None,
        Value::Object(fields) => fields.get("_id").filter(|v| !v.is_null()),
        token => Some(token),
    }
}

/// Compare two identifier-bearing values for equality. Either side may be
/// a raw token or a document carrying one.
pub fn id_match(a: &Value, b: &Value) -> bool {
    match (id_token(a), id_token(b)) {
        (Some(x), Some(y)) => token_key(x) == token_key(y),
        _ => false,
    }
}

/// True when both slices carry the same identifier set, order-insensitive.
pub fn ids_match(a: &[Value], b: &[Value]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.iter().all(|x| b.iter().any(|y| id_match(x, y)))
}

/// Group `records` by the identifier tokens held in `key_field`.
///
/// A record with an array-valued key is copied into the group of every
/// element, which is what makes many-to-many back-references work.
/// Records without a usable key are skipped. Within each group the input
/// order of `records` is preserved.
pub fn group_by_key(records: &[Value], key_field: &str) -> AHashMap<String, Vec<Value>> {
    let mut groups: AHashMap<String, Vec<Value>> = AHashMap::new();
    let push = |groups: &mut AHashMap<String, Vec<Value>>, token: &Value, record: &Value| {
        if let Some(token) = id_token(token) {
            groups
                .entry(token_key(token))
                .or_default()
                .push(record.clone());
        }
    };

    for record in records {
        match foreign_key_of(record, key_field) {
            ForeignKey::One(token) => push(&mut groups, token, record),
            ForeignKey::Many(tokens) => {
                // a key listing the same parent twice still means one membership
                let mut seen: Vec<String> = Vec::with_capacity(tokens.len());
                for token in tokens {
                    let Some(token) = id_token(token) else { continue };
                    let key = token_key(token);
                    if seen.contains(&key) {
                        continue;
                    }
                    seen.push(key);
                    push(&mut groups, token, record);
                }
            }
            ForeignKey::None => {}
        }
    }
    groups
}
