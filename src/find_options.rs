// src/find_options.rs
// Query description handed to a related-model executor, plus the
// select/sort/projection helpers bundled executors share.

use crate::value_utils::{get_path, order_values};
use serde_json::Value;
use std::collections::HashMap;

/// One lookup against a related collection.
///
/// `filter` is a MongoDB-style filter document. The remaining fields are
/// mongoose-flavored strings: `select` is a space-delimited field list
/// (`-` prefix excludes), `sort` a space-delimited field list with `-`
/// for descending, `populate` the name of a reference field to expand.
#[derive(Debug, Clone)]
pub struct FindQuery {
    pub filter: Value,
    pub select: Option<String>,
    pub sort: Option<String>,
    pub populate: Option<String>,
    /// Request plain-data results instead of behavior-bearing objects.
    pub lean: bool,
}

impl FindQuery {
    pub fn new(filter: Value) -> Self {
        FindQuery {
            filter,
            select: None,
            sort: None,
            populate: None,
            lean: false,
        }
    }

    pub fn with_select(mut self, select: impl Into<String>) -> Self {
        self.select = Some(select.into());
        self
    }

    pub fn with_sort(mut self, sort: impl Into<String>) -> Self {
        self.sort = Some(sort.into());
        self
    }

    pub fn with_populate(mut self, populate: impl Into<String>) -> Self {
        self.populate = Some(populate.into());
        self
    }

    pub fn with_lean(mut self, lean: bool) -> Self {
        self.lean = lean;
        self
    }
}

impl Default for FindQuery {
    fn default() -> Self {
        FindQuery::new(Value::Object(serde_json::Map::new()))
    }
}

/// Ensure `required` is part of a space-delimited select string.
///
/// `None` (and blank strings) mean "all fields" and stay unrestricted; a
/// populated list gets `required` appended only when it is not already
/// listed.
pub fn build_select(select: Option<&str>, required: &str) -> Option<String> {
    let select = select?.trim();
    if select.is_empty() {
        return None;
    }
    let mut fields: Vec<&str> = select.split_whitespace().collect();
    if fields.iter().any(|f| *f == required) {
        return Some(fields.join(" "));
    }
    fields.push(required);
    Some(fields.join(" "))
}

/// Parse a select string into a projection map: field -> 1 (include) or
/// 0 (exclude, `-` prefix).
pub fn select_projection(select: &str) -> HashMap<String, i32> {
    let mut projection = HashMap::new();
    for field in select.split_whitespace() {
        match field.strip_prefix('-') {
            Some(stripped) => projection.insert(stripped.to_string(), 0),
            None => projection.insert(field.to_string(), 1),
        };
    }
    projection
}

/// Parse a sort string ("title", "-created name") into (field, direction)
/// pairs, direction 1 ascending / -1 descending.
pub fn parse_sort(sort: &str) -> Vec<(String, i32)> {
    sort.split_whitespace()
        .map(|field| match field.strip_prefix('-') {
            Some(stripped) => (stripped.to_string(), -1),
            None => (field.to_string(), 1),
        })
        .collect()
}

/// Sort documents by the given (field, direction) pairs. Fields resolve
/// with dot notation; documents missing a field sort first ascending.
pub fn apply_sort(docs: &mut [Value], sort: &[(String, i32)]) {
    if sort.is_empty() {
        return;
    }
    docs.sort_by(|a, b| {
        for (field, direction) in sort {
            let ordering = order_values(get_path(a, field), get_path(b, field));
            if ordering != std::cmp::Ordering::Equal {
                return if *direction >= 0 {
                    ordering
                } else {
                    ordering.reverse()
                };
            }
        }
        std::cmp::Ordering::Equal
    });
}

/// Apply a projection to one document.
///
/// Include mode keeps the listed fields plus `_id` (unless `_id` is
/// explicitly excluded); exclude mode keeps everything except the listed
/// fields. Top-level fields only.
pub fn apply_projection(doc: &Value, projection: &HashMap<String, i32>) -> Value {
    let Value::Object(fields) = doc else {
        return doc.clone();
    };
    if projection.is_empty() {
        return doc.clone();
    }

    let include_mode = projection.values().any(|&action| action == 1);
    let mut result = serde_json::Map::new();

    if include_mode {
        for (field, &action) in projection {
            if action == 1 {
                if let Some(value) = fields.get(field) {
                    result.insert(field.clone(), value.clone());
                }
            }
        }
        if projection.get("_id") != Some(&0) {
            if let Some(id) = fields.get("_id") {
                result.insert("_id".to_string(), id.clone());
            }
        }
    } else {
        for (key, value) in fields {
            if projection.get(key) != Some(&0) {
                result.insert(key.clone(), value.clone());
            }
        }
    }
    Value::Object(result)
}
