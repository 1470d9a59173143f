// src/error.rs
// Crate-wide error type and Result alias

use thiserror::Error;

/// Errors surfaced by the reverse-populate pipeline
#[derive(Debug, Error)]
pub enum RevPopError {
    /// A required option was not supplied. Raised during validation,
    /// before any query is issued.
    #[error("Missing mandatory field '{0}'.")]
    MissingField(&'static str),

    /// The filter handed to the executor was malformed
    #[error("Invalid query: {0}")]
    InvalidQuery(String),

    /// The executor failed while running the lookup query
    #[error("Query failed: {0}")]
    QueryFailed(String),

    /// A document handed to an executor was not usable (e.g. not an object)
    #[error("Invalid document: {0}")]
    InvalidDocument(String),
}

pub type Result<T> = std::result::Result<T, RevPopError>;
