// src/memory.rs
//! In-memory related-collection executor.
//!
//! Backs the crate's test suite and doubles as a reference implementation
//! of the [`RelatedModel`](crate::model::RelatedModel) contract for
//! adapter authors. Documents live in a `Vec` behind an `RwLock`; the
//! find pipeline is the classic match -> sort -> populate -> project.
//! It is deliberately small and is not a database.

use crate::document::DocumentId;
use crate::error::{Result, RevPopError};
use crate::find_options::{
    apply_projection, apply_sort, parse_sort, select_projection, FindQuery,
};
use crate::model::RelatedModel;
use crate::populate_utils::id_match;
use crate::value_utils::get_path;
use ahash::AHashMap;
use parking_lot::RwLock;
use serde_json::Value;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Named in-memory collection of JSON documents.
#[derive(Debug)]
pub struct MemoryModel {
    name: String,
    documents: RwLock<Vec<Value>>,
    /// Reference sets for nested populate: field name -> candidate docs.
    refs: RwLock<AHashMap<String, Vec<Value>>>,
    /// Number of finds executed, for tests asserting query counts.
    finds: AtomicUsize,
    last_query: RwLock<Option<FindQuery>>,
}

impl MemoryModel {
    pub fn new(name: impl Into<String>) -> Self {
        MemoryModel {
            name: name.into(),
            documents: RwLock::new(Vec::new()),
            refs: RwLock::new(AHashMap::new()),
            finds: AtomicUsize::new(0),
            last_query: RwLock::new(None),
        }
    }

    /// Insert one document, assigning an ObjectId-style `_id` when the
    /// document does not carry one. Returns the document's id token.
    pub fn insert(&self, document: Value) -> Result<DocumentId> {
        let Value::Object(mut fields) = document else {
            return Err(RevPopError::InvalidDocument(
                "document must be an object".to_string(),
            ));
        };

        let id = match fields.get("_id") {
            Some(value) => serde_json::from_value(value.clone()).map_err(|e| {
                RevPopError::InvalidDocument(format!("unusable _id: {}", e))
            })?,
            None => {
                let id = DocumentId::new_object_id();
                fields.insert("_id".to_string(), id.to_value());
                id
            }
        };

        self.documents.write().push(Value::Object(fields));
        Ok(id)
    }

    pub fn insert_many(&self, documents: Vec<Value>) -> Result<Vec<DocumentId>> {
        documents.into_iter().map(|doc| self.insert(doc)).collect()
    }

    /// Register the candidate documents a populate of `field` draws from.
    pub fn register_ref(&self, field: impl Into<String>, documents: Vec<Value>) {
        self.refs.write().insert(field.into(), documents);
    }

    pub fn len(&self) -> usize {
        self.documents.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.read().is_empty()
    }

    /// How many finds this model has executed.
    pub fn find_count(&self) -> usize {
        self.finds.load(Ordering::Relaxed)
    }

    /// The most recent query this model executed, if any.
    pub fn last_query(&self) -> Option<FindQuery> {
        self.last_query.read().clone()
    }
}

impl RelatedModel for MemoryModel {
    fn name(&self) -> &str {
        &self.name
    }

    fn find(&self, query: &FindQuery) -> Result<Vec<Value>> {
        self.finds.fetch_add(1, Ordering::Relaxed);
        *self.last_query.write() = Some(query.clone());

        let mut results = Vec::new();
        for document in self.documents.read().iter() {
            if matches_filter(document, &query.filter)? {
                results.push(document.clone());
            }
        }

        if let Some(ref sort) = query.sort {
            apply_sort(&mut results, &parse_sort(sort));
        }

        if let Some(ref field) = query.populate {
            let refs = self.refs.read();
            if let Some(candidates) = refs.get(field) {
                for document in &mut results {
                    expand_refs(document, field, candidates);
                }
            }
        }

        if let Some(ref select) = query.select {
            let projection = select_projection(select);
            results = results
                .iter()
                .map(|document| apply_projection(document, &projection))
                .collect();
        }

        // lean: documents here are plain data already, nothing to strip
        Ok(results)
    }
}

/// Replace reference token(s) in `field` with the full documents they
/// point to. Tokens without a candidate are dropped (scalar slots are
/// left as-is).
fn expand_refs(document: &mut Value, field: &str, candidates: &[Value]) {
    let Some(slot) = document.get_mut(field) else {
        return;
    };
    match slot {
        Value::Array(tokens) => {
            let expanded = tokens
                .iter()
                .filter_map(|token| lookup_ref(token, candidates))
                .collect();
            *slot = Value::Array(expanded);
        }
        Value::Null => {}
        ref token => {
            if let Some(full) = lookup_ref(token, candidates) {
                *slot = full;
            }
        }
    }
}

fn lookup_ref(token: &Value, candidates: &[Value]) -> Option<Value> {
    candidates
        .iter()
        .find(|candidate| id_match(candidate, token))
        .cloned()
}

/// Match one document against a MongoDB-style filter.
///
/// Implements the operator subset the bundled executor needs: implicit
/// equality plus `$eq`, `$ne`, `$in`, `$exists` at field level and
/// `$and`/`$or` at the top. Anything else is rejected as an invalid
/// query rather than silently ignored.
pub fn matches_filter(document: &Value, filter: &Value) -> Result<bool> {
    let conditions = filter.as_object().ok_or_else(|| {
        RevPopError::InvalidQuery("filter must be an object".to_string())
    })?;

    for (key, condition) in conditions {
        if let Some(op) = key.strip_prefix('$') {
            if op != "and" && op != "or" {
                return Err(RevPopError::InvalidQuery(format!(
                    "Unknown top-level operator: ${}",
                    op
                )));
            }
            let branches = condition.as_array().ok_or_else(|| {
                RevPopError::InvalidQuery(format!("${} requires an array of filters", op))
            })?;
            let hit = if op == "and" {
                let mut all = true;
                for branch in branches {
                    all &= matches_filter(document, branch)?;
                }
                all
            } else {
                let mut any = false;
                for branch in branches {
                    any |= matches_filter(document, branch)?;
                }
                any
            };
            if !hit {
                return Ok(false);
            }
        } else {
            let doc_value = get_path(document, key);
            if !matches_condition(doc_value, condition)? {
                return Ok(false);
            }
        }
    }
    Ok(true)
}

fn matches_condition(doc_value: Option<&Value>, condition: &Value) -> Result<bool> {
    if let Value::Object(ops) = condition {
        if ops.keys().any(|k| k.starts_with('$')) {
            for (op, operand) in ops {
                let hit = match op.as_str() {
                    "$eq" => value_eq(doc_value, operand),
                    "$ne" => !value_eq(doc_value, operand),
                    "$in" => {
                        let set = operand.as_array().ok_or_else(|| {
                            RevPopError::InvalidQuery("$in requires an array".to_string())
                        })?;
                        in_set(doc_value, set)
                    }
                    "$exists" => {
                        let expected = operand.as_bool().ok_or_else(|| {
                            RevPopError::InvalidQuery("$exists requires a boolean".to_string())
                        })?;
                        doc_value.is_some() == expected
                    }
                    other => {
                        return Err(RevPopError::InvalidQuery(format!(
                            "Unknown operator: {}",
                            other
                        )))
                    }
                };
                if !hit {
                    return Ok(false);
                }
            }
            return Ok(true);
        }
    }
    // implicit equality against a literal
    Ok(value_eq(doc_value, condition))
}

/// Equality with MongoDB array semantics: an array field matches when the
/// whole array equals the operand or when any element does.
fn value_eq(doc_value: Option<&Value>, operand: &Value) -> bool {
    match doc_value {
        None => operand.is_null(),
        Some(value) => {
            if value == operand {
                return true;
            }
            match value {
                Value::Array(elements) => elements.contains(operand),
                _ => false,
            }
        }
    }
}

fn in_set(doc_value: Option<&Value>, set: &[Value]) -> bool {
    match doc_value {
        None => false,
        Some(value) => {
            if set.contains(value) {
                return true;
            }
            match value {
                Value::Array(elements) => {
                    elements.iter().any(|element| set.contains(element))
                }
                _ => false,
            }
        }
    }
}
