// src/model.rs
//! The executor seam: anything able to run one lookup against a related
//! collection can sit behind a reverse populate.
//!
//! Backends implement this trait rather than the pipeline knowing about
//! any particular store. The crate ships one implementation,
//! [`crate::memory::MemoryModel`], used by the test suite and usable as a
//! reference for adapters over real stores.

use crate::error::Result;
use crate::find_options::FindQuery;
use serde_json::Value;

/// Query capability of a related collection.
///
/// Implementations run exactly the query described by the [`FindQuery`]
/// and return the matching documents. The filter language must at minimum
/// support field-level `$in` and combining predicates under `$and` --
/// that is all the reverse-populate pipeline emits on its own; caller
/// filters pass through untouched.
pub trait RelatedModel {
    /// Collection name, used in log output.
    fn name(&self) -> &str;

    /// Execute one find.
    ///
    /// Failures propagate to the reverse-populate caller unchanged and no
    /// partial result is produced.
    fn find(&self, query: &FindQuery) -> Result<Vec<Value>>;
}
