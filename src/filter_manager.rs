//! The filter manager: single entry point for producing a processed view,
//! hiding whether computation happened on the worker or the calling task.
//!
//! Routing policy: offload when the worker is available and the collection
//! is larger than the threshold; otherwise compute synchronously with the
//! identical [`crate::engine`] code. Any worker fault is caught, logged,
//! and recovered by recomputing synchronously, so callers never see an
//! unhandled rejection.

use std::fmt;
use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::sync::mpsc::UnboundedSender;

use crate::engine;
use crate::error::{ListError, WorkerError};
use crate::item::{AuxContext, Collection, DataType, FilterState, ProcessedView};
use crate::options::ListOptions;
use crate::worker::{ProcessOutput, WorkerManager, WorkerOptions};

/// Which pipeline operation a processing cycle ran.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    /// Full reprocess
    Process,
    /// Search-only refresh
    Search,
    /// Sort-only refresh
    Sort,
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Operation::Process => write!(f, "process"),
            Operation::Search => write!(f, "search"),
            Operation::Sort => write!(f, "sort"),
        }
    }
}

/// Performance sample emitted after every cycle, whichever path ran it.
#[derive(Debug, Clone)]
pub struct PerfSample {
    /// The operation measured.
    pub operation: Operation,
    /// Processing time (worker-side time for offloaded cycles).
    pub elapsed: Duration,
    /// Number of items in the resulting view.
    pub item_count: usize,
}

/// Signals for UI spinners and diagnostics.
#[derive(Debug, Clone)]
pub enum ProcessingEvent {
    /// A cycle began.
    Started(Operation),
    /// A cycle completed (successfully or after fallback).
    Finished(Operation),
    /// Timing sample for the completed cycle.
    Perf(PerfSample),
}

/// Policy layer deciding where each processing cycle runs.
pub struct FilterManager {
    worker: Option<WorkerManager>,
    worker_threshold: usize,
    events: Option<UnboundedSender<ProcessingEvent>>,
}

impl FilterManager {
    /// Build from host options; spawns a worker if enabled.
    ///
    /// Must be called within a tokio runtime when the worker is enabled.
    pub fn new(options: &ListOptions) -> Self {
        let worker = options.enable_worker.then(|| {
            WorkerManager::new(WorkerOptions {
                timeout: options.worker_timeout,
                debounce: options.search_debounce,
                respawn_backoff: options.respawn_backoff,
            })
        });
        FilterManager {
            worker,
            worker_threshold: options.effective_worker_threshold(),
            events: None,
        }
    }

    /// Construct without a worker; every cycle runs synchronously.
    pub fn without_worker(worker_threshold: usize) -> Self {
        FilterManager {
            worker: None,
            worker_threshold,
            events: None,
        }
    }

    /// Wire the processing-event sink.
    pub fn set_event_sink(&mut self, events: UnboundedSender<ProcessingEvent>) {
        self.events = Some(events);
    }

    /// Whether a collection of `len` items would be offloaded right now.
    pub fn would_offload(&self, len: usize) -> bool {
        self.offload_worker(len).is_some()
    }

    fn offload_worker(&self, len: usize) -> Option<&WorkerManager> {
        self.worker
            .as_ref()
            .filter(|w| w.is_available() && len > self.worker_threshold)
    }

    /// Produce a processed view for the given snapshot and filter state.
    pub async fn process_data(
        &self,
        collection: &Collection,
        data_type: DataType,
        filter_state: &FilterState,
        aux: &AuxContext,
    ) -> Result<ProcessedView, ListError> {
        self.emit(ProcessingEvent::Started(Operation::Process));
        let result = self.process_inner(collection, data_type, filter_state, aux).await;
        self.finish(Operation::Process, &result);
        result
    }

    async fn process_inner(
        &self,
        collection: &Collection,
        data_type: DataType,
        filter_state: &FilterState,
        aux: &AuxContext,
    ) -> Result<ProcessedView, ListError> {
        if let Some(worker) = self.offload_worker(collection.len()) {
            match worker.send_process(collection, data_type, filter_state, aux).await {
                Ok(ProcessOutput { view, count, elapsed }) => {
                    trace!("filter manager: worker processed {count} items in {elapsed:?}");
                    self.emit_perf(Operation::Process, elapsed, count);
                    return Ok(view);
                }
                Err(WorkerError::Stale { .. }) => {
                    // A newer process is in flight; its response will carry
                    // the current answer. Recompute here so this caller
                    // still gets a view consistent with its own inputs.
                    debug!("filter manager: stale process response, recomputing synchronously");
                }
                Err(e) => {
                    warn!("filter manager: worker process failed ({e}), falling back to sync");
                }
            }
        }
        self.process_sync(collection, data_type, filter_state, aux, Operation::Process)
    }

    /// Debounced search path. Collections above the threshold go through
    /// the worker's named debounce; superseded calls surface as
    /// [`WorkerError::Superseded`] so the caller can ignore them knowingly.
    /// Any other worker fault falls back to a synchronous full pass.
    pub async fn search(
        &self,
        collection: &Collection,
        data_type: DataType,
        filter_state: &FilterState,
        aux: &AuxContext,
    ) -> Result<ProcessedView, ListError> {
        self.emit(ProcessingEvent::Started(Operation::Search));
        let result = self.search_inner(collection, data_type, filter_state, aux).await;
        match &result {
            Err(ListError::Worker(WorkerError::Superseded)) => {}
            _ => self.finish(Operation::Search, &result),
        }
        result
    }

    async fn search_inner(
        &self,
        collection: &Collection,
        data_type: DataType,
        filter_state: &FilterState,
        aux: &AuxContext,
    ) -> Result<ProcessedView, ListError> {
        if let Some(worker) = self.offload_worker(collection.len()) {
            match worker.send_search_debounced("search", &filter_state.query).await {
                Ok(ProcessOutput { view, count, elapsed }) => {
                    self.emit_perf(Operation::Search, elapsed, count);
                    return Ok(view);
                }
                Err(WorkerError::Superseded) => return Err(WorkerError::Superseded.into()),
                Err(e) => {
                    warn!("filter manager: worker search failed ({e}), falling back to sync");
                }
            }
        }
        self.process_sync(collection, data_type, filter_state, aux, Operation::Search)
    }

    /// Sort-only refresh; worker when offloaded, else a synchronous pass.
    pub async fn sort(
        &self,
        collection: &Collection,
        data_type: DataType,
        filter_state: &FilterState,
        aux: &AuxContext,
    ) -> Result<ProcessedView, ListError> {
        self.emit(ProcessingEvent::Started(Operation::Sort));
        let result = self.sort_inner(collection, data_type, filter_state, aux).await;
        self.finish(Operation::Sort, &result);
        result
    }

    async fn sort_inner(
        &self,
        collection: &Collection,
        data_type: DataType,
        filter_state: &FilterState,
        aux: &AuxContext,
    ) -> Result<ProcessedView, ListError> {
        // Fail fast on caller bugs before touching any path.
        filter_state.sort_key.validate(data_type)?;
        if let Some(worker) = self.offload_worker(collection.len()) {
            match worker
                .send_sort(filter_state.sort_key, filter_state.sort_direction)
                .await
            {
                Ok(ProcessOutput { view, count, elapsed }) => {
                    self.emit_perf(Operation::Sort, elapsed, count);
                    return Ok(view);
                }
                Err(e) => {
                    warn!("filter manager: worker sort failed ({e}), falling back to sync");
                }
            }
        }
        self.process_sync(collection, data_type, filter_state, aux, Operation::Sort)
    }

    /// The synchronous reference path. Also used directly by tests to check
    /// worker/sync equivalence.
    pub fn process_sync(
        &self,
        collection: &[Arc<crate::item::Item>],
        data_type: DataType,
        filter_state: &FilterState,
        aux: &AuxContext,
        operation: Operation,
    ) -> Result<ProcessedView, ListError> {
        let started = Instant::now();
        let view = engine::process(collection, data_type, filter_state, aux)?;
        self.emit_perf(operation, started.elapsed(), view.len());
        Ok(view)
    }

    fn finish(&self, operation: Operation, result: &Result<ProcessedView, ListError>) {
        if let Err(e) = result {
            debug!("filter manager: {operation} cycle failed: {e}");
        }
        self.emit(ProcessingEvent::Finished(operation));
    }

    fn emit(&self, event: ProcessingEvent) {
        if let Some(events) = &self.events {
            let _ = events.send(event);
        }
    }

    fn emit_perf(&self, operation: Operation, elapsed: Duration, item_count: usize) {
        debug!("filter manager: {operation} took {elapsed:?} over {item_count} items");
        self.emit(ProcessingEvent::Perf(PerfSample {
            operation,
            elapsed,
            item_count,
        }));
    }

    #[cfg(test)]
    pub(crate) fn worker(&self) -> Option<&WorkerManager> {
        self.worker.as_ref()
    }
}
