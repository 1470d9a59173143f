// src/document.rs
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

/// Identifier token for a document.
///
/// Untagged so ids appear as bare values inside documents: `{"_id": 2}` or
/// `{"_id": "d3b1..."}`. Tokens are opaque and compare by value only --
/// never by in-memory identity.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(untagged)]
pub enum DocumentId {
    Int(i64),
    String(String),
    ObjectId(String),
}

impl DocumentId {
    /// Generate a fresh ObjectId-style token (UUID v4)
    pub fn new_object_id() -> Self {
        DocumentId::ObjectId(Uuid::new_v4().to_string())
    }

    /// The token as it appears in a document's `_id` slot
    pub fn to_value(&self) -> Value {
        match self {
            DocumentId::Int(n) => Value::from(*n),
            DocumentId::String(s) | DocumentId::ObjectId(s) => Value::from(s.as_str()),
        }
    }
}
