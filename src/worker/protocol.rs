//! Host ↔ worker message protocol.
//!
//! Every request carries a correlation id that the matching response echoes
//! unchanged; responses are matched strictly by id, never by arrival order.
//! The protocol is in-process (one channel pair per worker instance), so
//! ids are plain counters rather than strings.

use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::item::{AuxContext, DataType, FilterState, Item, ProcessedView, SortDirection, SortKey};

/// A request posted to the worker runtime.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Request {
    /// Correlation id, echoed in the response.
    pub id: u64,
    /// The operation to perform.
    pub kind: RequestKind,
}

/// The four operations the worker runtime answers.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum RequestKind {
    /// Replace the runtime's working set and run the full pipeline.
    ProcessData {
        /// Collection snapshot (structurally owned by the worker from here).
        collection: Vec<Arc<Item>>,
        /// Variant of the collection.
        data_type: DataType,
        /// Filter state to apply.
        filter_state: FilterState,
        /// Host-supplied context for the auxiliary filters.
        aux: AuxContext,
        /// Monotonically increasing generation; responses for non-latest
        /// generations are discarded by the manager.
        generation: u64,
    },
    /// Slice the last processed view; never reprocesses.
    GetBatch {
        /// Start index into the processed view.
        start: usize,
        /// Maximum number of items to return.
        size: usize,
    },
    /// Re-run search + sort with a new query, keeping the other filter
    /// state fields last seen by `ProcessData`.
    Search {
        /// The new free-text query.
        query: String,
    },
    /// Re-order the last processed view without altering filters.
    Sort {
        /// Sort field.
        key: SortKey,
        /// Sort direction.
        direction: SortDirection,
    },
}

impl RequestKind {
    /// Short operation label for logs.
    pub fn label(&self) -> &'static str {
        match self {
            RequestKind::ProcessData { .. } => "process",
            RequestKind::GetBatch { .. } => "get-batch",
            RequestKind::Search { .. } => "search",
            RequestKind::Sort { .. } => "sort",
        }
    }
}

/// A response from the worker runtime, tagged with the request's id.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Response {
    /// Correlation id of the originating request.
    pub id: u64,
    /// Result payload, 1:1 with the request kind (or `Error`).
    pub kind: ResponseKind,
}

/// Response payloads.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum ResponseKind {
    /// Answer to [`RequestKind::ProcessData`].
    ProcessedData {
        /// The full ordered result.
        view: ProcessedView,
        /// `view.len()`, precomputed for the host.
        count: usize,
        /// Worker-side processing time.
        elapsed: Duration,
        /// Echo of the request's generation.
        generation: u64,
    },
    /// Answer to [`RequestKind::GetBatch`].
    BatchData {
        /// The requested slice (possibly empty).
        batch: Vec<Arc<Item>>,
        /// Size of the whole processed view.
        total_count: usize,
        /// Whether items remain past this batch.
        has_more: bool,
    },
    /// Answer to [`RequestKind::Search`].
    SearchResults {
        /// The re-searched, re-sorted view.
        view: ProcessedView,
        /// `view.len()`.
        count: usize,
        /// Worker-side processing time.
        elapsed: Duration,
    },
    /// Answer to [`RequestKind::Sort`].
    SortResults {
        /// The re-ordered view.
        view: ProcessedView,
        /// `view.len()`.
        count: usize,
        /// Worker-side processing time.
        elapsed: Duration,
    },
    /// Tagged failure for a malformed request; never thrown uncaught.
    Error {
        /// Human-readable reason, for logs only.
        message: String,
    },
}

impl ResponseKind {
    /// Short payload label for logs.
    pub fn label(&self) -> &'static str {
        match self {
            ResponseKind::ProcessedData { .. } => "processed-data",
            ResponseKind::BatchData { .. } => "batch-data",
            ResponseKind::SearchResults { .. } => "search-results",
            ResponseKind::SortResults { .. } => "sort-results",
            ResponseKind::Error { .. } => "error",
        }
    }
}
