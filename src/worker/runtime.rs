//! The worker runtime: a dedicated thread draining requests one at a time.
//!
//! The loop is cooperative and strictly serial: one request runs to
//! completion before the next is considered. It never touches host state:
//! it owns its copy of the collection and filter state outright. The thread
//! exits when the request channel closes.

use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Instant;

use tokio::sync::mpsc::{UnboundedReceiver, UnboundedSender};

use crate::engine;
use crate::item::{AuxContext, DataType, FilterState, Item, ProcessedView};

use super::protocol::{Request, RequestKind, Response, ResponseKind};

/// Spawn the runtime thread. Responses go out on `tx`; if the host side
/// hangs up the thread stops.
pub(crate) fn spawn(mut rx: UnboundedReceiver<Request>, tx: UnboundedSender<Response>) -> JoinHandle<()> {
    thread::spawn(move || {
        debug!("worker runtime: thread started");
        let mut state = RuntimeState::default();
        while let Some(request) = rx.blocking_recv() {
            let id = request.id;
            trace!("worker runtime: handling {} (id {id})", request.kind.label());
            let kind = state.handle(request.kind);
            if tx.send(Response { id, kind }).is_err() {
                break;
            }
        }
        debug!("worker runtime: thread stopped");
    })
}

/// The worker's working set: one current collection + filter state, plus
/// the view produced by the last processing pass.
#[derive(Default)]
struct RuntimeState {
    current: Option<Loaded>,
}

struct Loaded {
    collection: Vec<Arc<Item>>,
    data_type: DataType,
    filter_state: FilterState,
    aux: AuxContext,
    view: ProcessedView,
}

impl RuntimeState {
    fn handle(&mut self, kind: RequestKind) -> ResponseKind {
        match kind {
            RequestKind::ProcessData {
                collection,
                data_type,
                filter_state,
                aux,
                generation,
            } => self.process(collection, data_type, filter_state, aux, generation),
            RequestKind::GetBatch { start, size } => self.get_batch(start, size),
            RequestKind::Search { query } => self.search(query),
            RequestKind::Sort { key, direction } => self.sort(key, direction),
        }
    }

    fn process(
        &mut self,
        collection: Vec<Arc<Item>>,
        data_type: DataType,
        filter_state: FilterState,
        aux: AuxContext,
        generation: u64,
    ) -> ResponseKind {
        let started = Instant::now();
        match engine::process(&collection, data_type, &filter_state, &aux) {
            Ok(view) => {
                let count = view.len();
                self.current = Some(Loaded {
                    collection,
                    data_type,
                    filter_state,
                    aux,
                    view: view.clone(),
                });
                ResponseKind::ProcessedData {
                    view,
                    count,
                    elapsed: started.elapsed(),
                    generation,
                }
            }
            Err(e) => ResponseKind::Error {
                message: e.to_string(),
            },
        }
    }

    fn get_batch(&mut self, start: usize, size: usize) -> ResponseKind {
        let Some(current) = &self.current else {
            return no_processed_data();
        };
        let total_count = current.view.len();
        // Out-of-range start fails silently: empty batch, nothing more.
        let batch: Vec<Arc<Item>> = current.view.iter().skip(start).take(size).cloned().collect();
        let has_more = start.saturating_add(batch.len()) < total_count;
        ResponseKind::BatchData {
            batch,
            total_count,
            has_more,
        }
    }

    fn search(&mut self, query: String) -> ResponseKind {
        let started = Instant::now();
        let Some(current) = &mut self.current else {
            return no_processed_data();
        };
        let mut filter_state = current.filter_state.clone();
        filter_state.query = query;
        match engine::process(&current.collection, current.data_type, &filter_state, &current.aux) {
            Ok(view) => {
                current.filter_state = filter_state;
                current.view = view.clone();
                ResponseKind::SearchResults {
                    count: view.len(),
                    view,
                    elapsed: started.elapsed(),
                }
            }
            Err(e) => ResponseKind::Error {
                message: e.to_string(),
            },
        }
    }

    fn sort(&mut self, key: crate::item::SortKey, direction: crate::item::SortDirection) -> ResponseKind {
        let started = Instant::now();
        let Some(current) = &mut self.current else {
            return no_processed_data();
        };
        if let Err(e) = key.validate(current.data_type) {
            return ResponseKind::Error {
                message: e.to_string(),
            };
        }
        engine::sort::apply(&mut current.view, key, direction);
        current.filter_state.sort_key = key;
        current.filter_state.sort_direction = direction;
        ResponseKind::SortResults {
            view: current.view.clone(),
            count: current.view.len(),
            elapsed: started.elapsed(),
        }
    }
}

fn no_processed_data() -> ResponseKind {
    ResponseKind::Error {
        message: "no processed data: send a process request first".into(),
    }
}
