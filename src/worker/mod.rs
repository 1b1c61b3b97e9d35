//! The worker manager: bridges the host side and the worker runtime as
//! asynchronous request/response pairs.
//!
//! The manager owns the worker's lifecycle (spawn, crash-restart with
//! backoff), a correlation table of pending requests, per-request timeouts,
//! a named-debounce facility for repeated search calls, and the generation
//! counter that guards against stale `process` responses. No operation here
//! blocks the calling task; results arrive through futures.

pub mod protocol;
mod runtime;

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use tokio::sync::mpsc::{UnboundedReceiver, unbounded_channel};
use tokio::sync::oneshot;
use tokio::time::timeout;

use crate::error::WorkerError;
use crate::item::{AuxContext, DataType, FilterState, Item, ProcessedView, SortDirection, SortKey};

use protocol::{Request, RequestKind, Response, ResponseKind};

/// Tunables for the worker boundary.
#[derive(Debug, Clone)]
pub struct WorkerOptions {
    /// Deadline for every round-trip. There are no timeout-free calls.
    pub timeout: Duration,
    /// Debounce window for [`WorkerManager::send_search_debounced`].
    pub debounce: Duration,
    /// Pause before respawning a crashed worker.
    pub respawn_backoff: Duration,
}

impl Default for WorkerOptions {
    fn default() -> Self {
        WorkerOptions {
            timeout: Duration::from_secs(10),
            debounce: Duration::from_millis(200),
            respawn_backoff: Duration::from_secs(1),
        }
    }
}

/// Result of a full process, search, or sort round-trip.
#[derive(Debug, Clone)]
pub struct ProcessOutput {
    /// The ordered view.
    pub view: ProcessedView,
    /// `view.len()`.
    pub count: usize,
    /// Worker-side processing time.
    pub elapsed: Duration,
}

/// Result of a batch round-trip.
#[derive(Debug, Clone)]
pub struct BatchOutput {
    /// The requested slice.
    pub batch: Vec<Arc<Item>>,
    /// Size of the whole processed view.
    pub total_count: usize,
    /// Whether items remain past this batch.
    pub has_more: bool,
}

struct PendingRequest {
    reply: oneshot::Sender<Result<ResponseKind, WorkerError>>,
}

struct Inner {
    tx: Option<tokio::sync::mpsc::UnboundedSender<Request>>,
    pending: HashMap<u64, PendingRequest>,
}

struct Shared {
    inner: Mutex<Inner>,
    next_id: AtomicU64,
    latest_generation: AtomicU64,
    available: AtomicBool,
    shutdown: AtomicBool,
    debounce_seq: Mutex<HashMap<String, u64>>,
}

impl Shared {
    fn new() -> Self {
        Shared {
            inner: Mutex::new(Inner {
                tx: None,
                pending: HashMap::new(),
            }),
            next_id: AtomicU64::new(0),
            latest_generation: AtomicU64::new(0),
            available: AtomicBool::new(false),
            shutdown: AtomicBool::new(false),
            debounce_seq: Mutex::new(HashMap::new()),
        }
    }

    fn lock_inner(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Spawn a fresh runtime thread and wire it up; returns the new
    /// response stream for the dispatch loop.
    fn respawn(&self) -> UnboundedReceiver<Response> {
        let (req_tx, req_rx) = unbounded_channel();
        let (resp_tx, resp_rx) = unbounded_channel();
        runtime::spawn(req_rx, resp_tx);
        self.lock_inner().tx = Some(req_tx);
        self.available.store(true, Ordering::SeqCst);
        resp_rx
    }

    /// Settle one response against the correlation table. Responses for ids
    /// no longer in the table (timed out or swept) are dropped, never
    /// resurrected.
    fn resolve(&self, response: Response) {
        let Some(pending) = self.lock_inner().pending.remove(&response.id) else {
            debug!(
                "worker manager: dropping late {} response for id {}",
                response.kind.label(),
                response.id
            );
            return;
        };
        let result = match response.kind {
            ResponseKind::Error { message } => Err(WorkerError::Malformed(message)),
            ResponseKind::ProcessedData { generation, .. }
                if generation != self.latest_generation.load(Ordering::SeqCst) =>
            {
                Err(WorkerError::Stale {
                    got: generation,
                    latest: self.latest_generation.load(Ordering::SeqCst),
                })
            }
            kind => Ok(kind),
        };
        // The caller may have timed out between removal and here; a dropped
        // receiver is fine.
        let _ = pending.reply.send(result);
    }

    /// Reject every pending request with `reason` and clear the table.
    fn sweep(&self, reason: WorkerError) {
        let pending = std::mem::take(&mut self.lock_inner().pending);
        if !pending.is_empty() {
            warn!("worker manager: rejecting {} in-flight requests", pending.len());
        }
        for (_, entry) in pending {
            let _ = entry.reply.send(Err(reason.clone()));
        }
    }
}

/// Drains worker responses and supervises crash recovery. One long-lived
/// task per manager; it outlives individual worker incarnations.
async fn run_dispatch(shared: Arc<Shared>, opts: WorkerOptions, mut rx: UnboundedReceiver<Response>) {
    loop {
        while let Some(response) = rx.recv().await {
            shared.resolve(response);
        }
        if shared.shutdown.load(Ordering::SeqCst) {
            break;
        }
        warn!(
            "worker manager: worker died, respawning after {:?}",
            opts.respawn_backoff
        );
        shared.available.store(false, Ordering::SeqCst);
        shared.lock_inner().tx = None;
        shared.sweep(WorkerError::Crashed);
        tokio::time::sleep(opts.respawn_backoff).await;
        if shared.shutdown.load(Ordering::SeqCst) {
            break;
        }
        rx = shared.respawn();
    }
    debug!("worker manager: dispatch loop exited");
}

/// Owns one worker runtime instance. Constructed per mounted list and
/// disposed with it; nothing here is a process-wide singleton.
pub struct WorkerManager {
    shared: Arc<Shared>,
    opts: WorkerOptions,
}

impl WorkerManager {
    /// Spawn the worker thread and its supervising dispatch task.
    ///
    /// Must be called within a tokio runtime.
    pub fn new(opts: WorkerOptions) -> Self {
        let shared = Arc::new(Shared::new());
        let rx = shared.respawn();
        tokio::spawn(run_dispatch(shared.clone(), opts.clone(), rx));
        WorkerManager { shared, opts }
    }

    /// Whether the worker can currently accept requests. False while a
    /// crashed worker waits out its respawn backoff, so callers can route
    /// synchronously instead of hanging.
    pub fn is_available(&self) -> bool {
        self.shared.available.load(Ordering::SeqCst) && !self.shared.shutdown.load(Ordering::SeqCst)
    }

    /// Full reprocess: replaces the worker's working set.
    ///
    /// Carries a fresh generation; if a newer process is issued before this
    /// one settles, this call resolves with [`WorkerError::Stale`].
    pub async fn send_process(
        &self,
        collection: &[Arc<Item>],
        data_type: DataType,
        filter_state: &FilterState,
        aux: &AuxContext,
    ) -> Result<ProcessOutput, WorkerError> {
        let generation = self.shared.latest_generation.fetch_add(1, Ordering::SeqCst) + 1;
        let kind = RequestKind::ProcessData {
            collection: collection.to_vec(),
            data_type,
            filter_state: filter_state.clone(),
            aux: aux.clone(),
            generation,
        };
        match self.send(kind).await? {
            ResponseKind::ProcessedData {
                view, count, elapsed, ..
            } => Ok(ProcessOutput { view, count, elapsed }),
            other => Err(unexpected("processed-data", other)),
        }
    }

    /// Fetch one page of the worker's last processed view.
    pub async fn send_get_batch(&self, start: usize, size: usize) -> Result<BatchOutput, WorkerError> {
        match self.send(RequestKind::GetBatch { start, size }).await? {
            ResponseKind::BatchData {
                batch,
                total_count,
                has_more,
            } => Ok(BatchOutput {
                batch,
                total_count,
                has_more,
            }),
            other => Err(unexpected("batch-data", other)),
        }
    }

    /// Debounced search: calls sharing `debounce_key` within the debounce
    /// window collapse to the last one issued. Superseded calls settle with
    /// [`WorkerError::Superseded`]; only the last call ever carries worker
    /// output.
    pub async fn send_search_debounced(
        &self,
        debounce_key: &str,
        query: &str,
    ) -> Result<ProcessOutput, WorkerError> {
        let seq = {
            let mut map = self.shared.debounce_seq.lock().unwrap_or_else(|e| e.into_inner());
            let entry = map.entry(debounce_key.to_string()).or_insert(0);
            *entry += 1;
            *entry
        };
        tokio::time::sleep(self.opts.debounce).await;
        let latest = {
            let map = self.shared.debounce_seq.lock().unwrap_or_else(|e| e.into_inner());
            map.get(debounce_key).copied().unwrap_or(0)
        };
        if latest != seq {
            trace!("worker manager: search {query:?} superseded within debounce window");
            return Err(WorkerError::Superseded);
        }
        match self
            .send(RequestKind::Search {
                query: query.to_string(),
            })
            .await?
        {
            ResponseKind::SearchResults { view, count, elapsed } => Ok(ProcessOutput { view, count, elapsed }),
            other => Err(unexpected("search-results", other)),
        }
    }

    /// Re-order the worker's last processed view.
    pub async fn send_sort(
        &self,
        key: SortKey,
        direction: SortDirection,
    ) -> Result<ProcessOutput, WorkerError> {
        match self.send(RequestKind::Sort { key, direction }).await? {
            ResponseKind::SortResults { view, count, elapsed } => Ok(ProcessOutput { view, count, elapsed }),
            other => Err(unexpected("sort-results", other)),
        }
    }

    /// Tear down the worker. Pending requests are rejected; the runtime
    /// thread exits once its request channel drains.
    pub fn close(&self) {
        self.shared.shutdown.store(true, Ordering::SeqCst);
        self.shared.available.store(false, Ordering::SeqCst);
        self.shared.lock_inner().tx = None;
        self.shared.sweep(WorkerError::Unavailable);
    }

    async fn send(&self, kind: RequestKind) -> Result<ResponseKind, WorkerError> {
        let id = self.shared.next_id.fetch_add(1, Ordering::SeqCst) + 1;
        let label = kind.label();
        let (reply_tx, reply_rx) = oneshot::channel();
        {
            let mut inner = self.shared.lock_inner();
            if !self.is_available() {
                return Err(WorkerError::Unavailable);
            }
            let Some(tx) = inner.tx.clone() else {
                return Err(WorkerError::Unavailable);
            };
            inner.pending.insert(id, PendingRequest { reply: reply_tx });
            if tx.send(Request { id, kind }).is_err() {
                inner.pending.remove(&id);
                return Err(WorkerError::Crashed);
            }
        }
        trace!("worker manager: sent {label} request id {id}");
        match timeout(self.opts.timeout, reply_rx).await {
            Ok(Ok(result)) => result,
            // The reply sender was dropped without an answer; only the
            // crash sweep does that without sending first.
            Ok(Err(_)) => Err(WorkerError::Crashed),
            Err(_) => {
                self.shared.lock_inner().pending.remove(&id);
                debug!("worker manager: {label} request id {id} timed out; any late response will be dropped");
                Err(WorkerError::Timeout(self.opts.timeout))
            }
        }
    }

    /// Drop the request channel without marking shutdown, which is
    /// indistinguishable from a worker death as seen by the dispatch loop.
    #[cfg(test)]
    pub(crate) fn sever(&self) {
        self.shared.lock_inner().tx = None;
    }
}

impl Drop for WorkerManager {
    fn drop(&mut self) {
        self.close();
    }
}

fn unexpected(wanted: &str, got: ResponseKind) -> WorkerError {
    WorkerError::Malformed(format!("expected {wanted} response, got {}", got.label()))
}
