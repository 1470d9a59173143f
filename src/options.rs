// src/options.rs
// The invocation contract for one reverse-populate call.

use crate::error::{Result, RevPopError};
use crate::model::RelatedModel;
use serde_json::Value;

/// Options for one reverse-populate call.
///
/// Required: `model_array`, `store_where`, `array_pop`, `model` and
/// `id_field`; the rest shape the lookup query. Every required field is
/// `Option`-typed so validation can report each omission by name before
/// any query is issued. `array_pop` in particular is checked for
/// presence, not truthiness: `false` is a perfectly valid value.
pub struct PopulateOptions<'a, M: RelatedModel> {
    /// Ordered parents to annotate.
    pub model_array: Option<Vec<Value>>,
    /// Field on each parent that receives the attached result.
    pub store_where: Option<String>,
    /// `true` attaches an array of matches, `false` a single match or null.
    pub array_pop: Option<bool>,
    /// Query-capable handle of the related collection.
    pub model: Option<&'a M>,
    /// Foreign-key field on related documents used for grouping.
    pub id_field: Option<String>,
    /// Extra predicate ANDed into the lookup query.
    pub filters: Option<Value>,
    /// Space-delimited projection; `id_field` is force-included.
    pub select: Option<String>,
    /// Nested reference field to expand on related documents.
    pub populate: Option<String>,
    /// Sort spec passed through to the executor.
    pub sort: Option<String>,
    /// Request plain-data results from the executor.
    pub lean: bool,
}

impl<'a, M: RelatedModel> PopulateOptions<'a, M> {
    pub fn new() -> Self {
        PopulateOptions {
            model_array: None,
            store_where: None,
            array_pop: None,
            model: None,
            id_field: None,
            filters: None,
            select: None,
            populate: None,
            sort: None,
            lean: false,
        }
    }

    pub fn with_model_array(mut self, parents: Vec<Value>) -> Self {
        self.model_array = Some(parents);
        self
    }

    pub fn with_store_where(mut self, field: impl Into<String>) -> Self {
        self.store_where = Some(field.into());
        self
    }

    pub fn with_array_pop(mut self, array_pop: bool) -> Self {
        self.array_pop = Some(array_pop);
        self
    }

    pub fn with_model(mut self, model: &'a M) -> Self {
        self.model = Some(model);
        self
    }

    pub fn with_id_field(mut self, field: impl Into<String>) -> Self {
        self.id_field = Some(field.into());
        self
    }

    pub fn with_filters(mut self, filters: Value) -> Self {
        self.filters = Some(filters);
        self
    }

    pub fn with_select(mut self, select: impl Into<String>) -> Self {
        self.select = Some(select.into());
        self
    }

    pub fn with_populate(mut self, populate: impl Into<String>) -> Self {
        self.populate = Some(populate.into());
        self
    }

    pub fn with_sort(mut self, sort: impl Into<String>) -> Self {
        self.sort = Some(sort.into());
        self
    }

    pub fn with_lean(mut self, lean: bool) -> Self {
        self.lean = lean;
        self
    }

    /// Validate presence of every required field, in declaration order,
    /// and hand back the checked view the pipeline runs on.
    pub(crate) fn checked(self) -> Result<CheckedOptions<'a, M>> {
        Ok(CheckedOptions {
            model_array: self
                .model_array
                .ok_or(RevPopError::MissingField("model_array"))?,
            store_where: self
                .store_where
                .ok_or(RevPopError::MissingField("store_where"))?,
            array_pop: self
                .array_pop
                .ok_or(RevPopError::MissingField("array_pop"))?,
            model: self.model.ok_or(RevPopError::MissingField("model"))?,
            id_field: self.id_field.ok_or(RevPopError::MissingField("id_field"))?,
            filters: self.filters,
            select: self.select,
            populate: self.populate,
            sort: self.sort,
            lean: self.lean,
        })
    }
}

impl<'a, M: RelatedModel> Default for PopulateOptions<'a, M> {
    fn default() -> Self {
        Self::new()
    }
}

/// Options with every required field proven present.
#[derive(Debug)]
pub(crate) struct CheckedOptions<'a, M: RelatedModel> {
    pub(crate) model_array: Vec<Value>,
    pub(crate) store_where: String,
    pub(crate) array_pop: bool,
    pub(crate) model: &'a M,
    pub(crate) id_field: String,
    pub(crate) filters: Option<Value>,
    pub(crate) select: Option<String>,
    pub(crate) populate: Option<String>,
    pub(crate) sort: Option<String>,
    pub(crate) lean: bool,
}
