//! The synchronous reference implementation of the processing pipeline:
//! search, then variant-specific filters, then a stable sort.
//!
//! Both the synchronous path and the worker runtime call exactly this code,
//! so the routing decision can never change the answer.

pub mod filter;
pub mod search;
pub mod sort;

use std::sync::Arc;

use crate::error::ListError;
use crate::item::{AuxContext, DataType, FilterState, Item, ProcessedView};

/// Run the full pipeline over a collection snapshot.
///
/// Items whose variant does not match `data_type` are skipped rather than
/// treated as an error; the store contract guarantees same-variant
/// collections, so a mismatch here is logged noise, not a failure.
pub fn process(
    collection: &[Arc<Item>],
    data_type: DataType,
    filter_state: &FilterState,
    aux: &AuxContext,
) -> Result<ProcessedView, ListError> {
    filter_state.sort_key.validate(data_type)?;

    let mut view: ProcessedView = collection
        .iter()
        .filter(|item| item.data_type() == data_type)
        .filter(|item| search::matches(item, &filter_state.query))
        .filter(|item| filter::matches(item, &filter_state.aux, aux))
        .cloned()
        .collect();

    sort::apply(&mut view, filter_state.sort_key, filter_state.sort_direction);
    Ok(view)
}
