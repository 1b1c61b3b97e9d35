//! Error taxonomy.
//!
//! Transient worker faults ([`WorkerError`]) are recoverable by design: the
//! filter manager catches them and falls back to the synchronous path.
//! Configuration errors ([`ListError`]) indicate a caller bug and fail fast.

use std::time::Duration;

use thiserror::Error;

use crate::item::{DataType, SortKey};

/// Crate-level error type.
#[derive(Error, Debug)]
pub enum ListError {
    /// A sort key was requested for a variant it does not apply to.
    #[error("unsupported sort key `{key}` for {data_type} collections")]
    UnsupportedSortKey {
        /// The offending key
        key: SortKey,
        /// The collection variant
        data_type: DataType,
    },

    /// A worker round-trip failed and no synchronous recovery was possible.
    #[error(transparent)]
    Worker(#[from] WorkerError),
}

/// Faults at the worker boundary. All variants are transient except as used
/// by callers that opted into debounced semantics.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum WorkerError {
    /// The request did not settle within its deadline. The worker may still
    /// be computing; its late response will be dropped.
    #[error("worker request timed out after {0:?}")]
    Timeout(Duration),

    /// The worker thread died while requests were in flight.
    #[error("worker crashed")]
    Crashed,

    /// The worker is down and has not been respawned yet.
    #[error("worker unavailable")]
    Unavailable,

    /// A newer call with the same debounce key superseded this one inside
    /// the debounce window.
    #[error("superseded by a newer debounced call")]
    Superseded,

    /// A `process` response arrived for a generation that is no longer the
    /// latest issued; its payload must not be treated as current.
    #[error("stale process response (generation {got}, latest {latest})")]
    Stale {
        /// Generation carried by the response
        got: u64,
        /// Latest generation issued
        latest: u64,
    },

    /// The worker rejected the request as malformed, or answered with an
    /// unexpected response kind.
    #[error("malformed worker exchange: {0}")]
    Malformed(String),
}
