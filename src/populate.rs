// src/populate.rs
// The orchestrator: one query, one grouping pass, one attachment pass.

use crate::error::Result;
use crate::find_options::{build_select, FindQuery};
use crate::model::RelatedModel;
use crate::options::PopulateOptions;
use crate::populate_utils::{group_by_key, id_token};
use crate::value_utils::token_key;
use serde_json::{json, Value};

/// Attach related documents onto their parents by back-reference.
///
/// Queries the related collection once for every document whose
/// `id_field` references one of the parents in `model_array`, groups the
/// results by that field, and stores each group on its parent under
/// `store_where`. Parents come back in their original order; with
/// `array_pop` set each carries an array (empty when nothing matched),
/// without it a single document or null.
///
/// The call settles exactly once: either the fully annotated parents or
/// an error, never a partial result.
pub fn reverse_populate<M: RelatedModel>(options: PopulateOptions<'_, M>) -> Result<Vec<Value>> {
    let opts = options.checked()?;

    if opts.model_array.is_empty() {
        return Ok(Vec::new());
    }

    let ids: Vec<Value> = opts
        .model_array
        .iter()
        .filter_map(id_token)
        .cloned()
        .collect();

    // Constrain the foreign key to the parents' id tokens; caller filters
    // are ANDed in rather than merged so they cannot clobber the key
    // constraint.
    let mut key_filter = serde_json::Map::new();
    key_filter.insert(opts.id_field.clone(), json!({ "$in": ids }));
    let mut filter = Value::Object(key_filter);
    if let Some(extra) = opts.filters {
        filter = json!({ "$and": [filter, extra] });
    }

    let mut query = FindQuery::new(filter);
    query.select = build_select(opts.select.as_deref(), &opts.id_field);
    query.sort = opts.sort;
    query.populate = opts.populate;
    query.lean = opts.lean;

    crate::log_debug!(
        "reverse populate: querying '{}' over '{}' for {} parents",
        opts.model.name(),
        opts.id_field,
        opts.model_array.len()
    );

    let related = opts.model.find(&query)?;

    let mut groups = group_by_key(&related, &opts.id_field);
    crate::log_trace!(
        "{} related documents grouped into {} buckets",
        related.len(),
        groups.len()
    );

    let mut parents = opts.model_array;
    for parent in &mut parents {
        let matched = id_token(parent)
            .map(token_key)
            .and_then(|key| groups.remove(&key));

        let attached = if opts.array_pop {
            Value::Array(matched.unwrap_or_default())
        } else {
            match matched {
                Some(group) => {
                    if group.len() > 1 {
                        crate::log_debug!(
                            "{} documents matched one parent under a singular attach; keeping the first",
                            group.len()
                        );
                    }
                    group.into_iter().next().unwrap_or(Value::Null)
                }
                None => Value::Null,
            }
        };

        if let Value::Object(fields) = parent {
            fields.insert(opts.store_where.clone(), attached);
        }
    }

    Ok(parents)
}
