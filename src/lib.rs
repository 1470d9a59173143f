// src/lib.rs
//! Reverse population for document collections.
//!
//! Forward populate follows a reference stored on the document you hold;
//! reverse populate inverts that: given parents and a related collection
//! whose documents point back at them, one query fetches the related
//! documents, they are grouped by the back-reference, and each group is
//! attached onto its parent. One-to-many and many-to-many
//! back-references without denormalizing the schema.
//!
//! ```
//! use revpop::{reverse_populate, MemoryModel, PopulateOptions};
//! use serde_json::json;
//!
//! let posts = MemoryModel::new("posts");
//! posts.insert(json!({"title": "intro", "author": 1})).unwrap();
//! posts.insert(json!({"title": "next", "author": 1})).unwrap();
//!
//! let authors = vec![json!({"_id": 1, "name": "ann"})];
//! let opts = PopulateOptions::new()
//!     .with_model_array(authors)
//!     .with_store_where("posts")
//!     .with_array_pop(true)
//!     .with_model(&posts)
//!     .with_id_field("author");
//!
//! let annotated = reverse_populate(opts).unwrap();
//! assert_eq!(annotated[0]["posts"][0]["title"], "intro");
//! assert_eq!(annotated[0]["posts"][1]["title"], "next");
//! ```

pub mod document;
pub mod error;
pub mod find_options;
pub mod logging;
pub mod memory;
pub mod model;
pub mod options;
pub mod populate;
pub mod populate_utils;
pub mod value_utils;

#[cfg(test)]
mod test_reverse_populate;

// Public exports
pub use document::DocumentId;
pub use error::{Result, RevPopError};
pub use find_options::FindQuery;
pub use logging::{get_log_level, set_log_level, LogLevel};
pub use memory::MemoryModel;
pub use model::RelatedModel;
pub use options::PopulateOptions;
pub use populate::reverse_populate;
