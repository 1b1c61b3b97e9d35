//! The data list itself: one component tying store, filter manager,
//! pagination and selection together behind a small imperative API.
//!
//! The list is single-owner and message-driven. User-facing mutators
//! (`set_query`, `set_sort`, ...) run to completion and emit a
//! [`ListEvent::ViewChanged`]; background signals (store changes, scroll
//! load requests, processing telemetry) are drained by [`DataList::tick`],
//! which the host calls from its event loop.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use indexmap::IndexSet;
use tokio::sync::mpsc::{UnboundedReceiver, UnboundedSender, unbounded_channel};

use crate::error::{ListError, WorkerError};
use crate::filter_manager::{FilterManager, ProcessingEvent};
use crate::item::{AuxContext, AuxFilter, DataType, FilterState, Item, ProcessedView, SortDirection, SortKey};
use crate::options::{DisplayMode, ListOptions};
use crate::pagination::{PaginationManager, Window};
use crate::store::CollectionStore;

/// Everything a host needs to react to list changes.
#[derive(Debug, Clone)]
pub enum ListEvent {
    /// The visible window changed: new items, new filter results, or a
    /// pagination move.
    ViewChanged {
        /// Items the window currently reveals, in display order.
        visible: Vec<Arc<Item>>,
        /// Size of the full processed view behind the window.
        total_matched: usize,
        /// Pagination snapshot.
        window: Window,
    },
    /// Processing telemetry (started/finished/perf), for spinners.
    Processing(ProcessingEvent),
    /// An item was selected or deselected.
    SelectionChanged {
        /// Item id.
        id: String,
        /// Selected state after the toggle.
        selected: bool,
    },
}

/// Per-item context handed to the renderer.
#[derive(Debug, Clone)]
pub struct RenderContext<'a> {
    /// Layout in effect.
    pub display_mode: DisplayMode,
    /// Field names to show; empty means all.
    pub show_fields: &'a [String],
    /// Whether the item is currently selected.
    pub selected: bool,
}

/// Host-side rendering hook. The list calls it once per visible item, in
/// display order.
pub trait ItemRenderer {
    fn render(&mut self, item: &Item, ctx: &RenderContext);
}

/// A searchable, filterable, sortable, paged list over one data type.
pub struct DataList {
    options: ListOptions,
    data_type: DataType,
    store: Arc<dyn CollectionStore>,
    filter: FilterState,
    aux: AuxContext,
    filter_manager: FilterManager,
    pagination: PaginationManager,
    view: ProcessedView,
    selection: IndexSet<String>,
    events_tx: UnboundedSender<ListEvent>,
    events_rx: Option<UnboundedReceiver<ListEvent>>,
    processing_rx: UnboundedReceiver<ProcessingEvent>,
    store_rx: UnboundedReceiver<()>,
    load_tx: UnboundedSender<()>,
    load_rx: UnboundedReceiver<()>,
    has_more_flag: Arc<AtomicBool>,
    loading_flag: Arc<AtomicBool>,
}

impl DataList {
    /// Build a list over `store` for `data_type`. Spawns the background
    /// worker when the options enable it, so this must run inside a tokio
    /// runtime. The initial view is empty until [`DataList::refresh`] (or
    /// the first store notification) runs.
    pub fn new(options: ListOptions, data_type: DataType, store: Arc<dyn CollectionStore>) -> Self {
        let mut filter_manager = FilterManager::new(&options);
        let (processing_tx, processing_rx) = unbounded_channel();
        filter_manager.set_event_sink(processing_tx);

        let (events_tx, events_rx) = unbounded_channel();
        let (load_tx, load_rx) = unbounded_channel();
        let store_rx = store.subscribe(data_type);
        let pagination = PaginationManager::new(options.page_mode(), options.items_per_page, options.max_items);

        DataList {
            data_type,
            store,
            filter: FilterState::for_data_type(data_type),
            aux: AuxContext::default(),
            filter_manager,
            pagination,
            view: Vec::new(),
            selection: IndexSet::new(),
            events_tx,
            events_rx: Some(events_rx),
            processing_rx,
            store_rx,
            load_tx,
            load_rx,
            has_more_flag: Arc::new(AtomicBool::new(false)),
            loading_flag: Arc::new(AtomicBool::new(false)),
            options,
        }
    }

    /// Take the event stream. Yields `None` after the first call.
    pub fn take_events(&mut self) -> Option<UnboundedReceiver<ListEvent>> {
        self.events_rx.take()
    }

    /// The data type currently displayed.
    pub fn data_type(&self) -> DataType {
        self.data_type
    }

    /// Current filter state (query, sort, aux filter).
    pub fn filter(&self) -> &FilterState {
        &self.filter
    }

    /// The full processed view, before windowing.
    pub fn matched(&self) -> &[Arc<Item>] {
        &self.view
    }

    /// The slice of the processed view the window currently reveals.
    pub fn visible(&self) -> &[Arc<Item>] {
        self.pagination.slice(&self.view)
    }

    /// Pagination snapshot.
    pub fn window(&self) -> Window {
        self.pagination.window()
    }

    /// Drive one background step: a store change triggers a reprocess, a
    /// scroll load request grows the window, telemetry is forwarded.
    /// Returns `false` when every signal source has closed.
    pub async fn tick(&mut self) -> Result<bool, ListError> {
        // Queued telemetry is forwarded eagerly so one tick always serves
        // the most consequential pending signal.
        while let Ok(event) = self.processing_rx.try_recv() {
            let _ = self.events_tx.send(ListEvent::Processing(event));
        }
        tokio::select! {
            biased;
            Some(()) = self.store_rx.recv() => {
                debug!("list: store changed, reprocessing {}", self.data_type);
                self.refresh().await?;
            }
            Some(()) = self.load_rx.recv() => {
                self.load_more();
            }
            Some(event) = self.processing_rx.recv() => {
                let _ = self.events_tx.send(ListEvent::Processing(event));
            }
            else => return Ok(false),
        }
        Ok(true)
    }

    /// Reprocess the current store snapshot through the full pipeline.
    pub async fn refresh(&mut self) -> Result<(), ListError> {
        let collection = self.store.snapshot(self.data_type);
        self.view = self
            .filter_manager
            .process_data(&collection, self.data_type, &self.filter, &self.aux)
            .await?;
        self.pagination.set_total(self.view.len());
        self.emit_view();
        Ok(())
    }

    /// Update the search query. Debounced when offloaded: rapid successive
    /// calls settle on the last query, earlier ones return without touching
    /// the view.
    pub async fn set_query(&mut self, query: impl Into<String>) -> Result<(), ListError> {
        self.filter.query = query.into();
        let collection = self.store.snapshot(self.data_type);
        match self
            .filter_manager
            .search(&collection, self.data_type, &self.filter, &self.aux)
            .await
        {
            Ok(view) => {
                self.view = view;
                self.adopt_filtered_view();
                Ok(())
            }
            // Superseded by a later keystroke; that call updates the view.
            Err(ListError::Worker(WorkerError::Superseded)) => Ok(()),
            Err(e) => Err(e),
        }
    }

    /// Change the sort. Fails fast on a key the current data type does not
    /// support, leaving the previous order in place.
    pub async fn set_sort(&mut self, key: SortKey, direction: SortDirection) -> Result<(), ListError> {
        key.validate(self.data_type)?;
        self.filter.sort_key = key;
        self.filter.sort_direction = direction;
        let collection = self.store.snapshot(self.data_type);
        self.view = self
            .filter_manager
            .sort(&collection, self.data_type, &self.filter, &self.aux)
            .await?;
        self.adopt_filtered_view();
        Ok(())
    }

    /// Replace the type-specific auxiliary filter and reprocess.
    pub async fn set_aux_filter(&mut self, aux_filter: AuxFilter) -> Result<(), ListError> {
        self.filter.aux = aux_filter;
        let collection = self.store.snapshot(self.data_type);
        self.view = self
            .filter_manager
            .process_data(&collection, self.data_type, &self.filter, &self.aux)
            .await?;
        self.adopt_filtered_view();
        Ok(())
    }

    /// Replace the ambient filter context (e.g. the set of owned pools) and
    /// reprocess.
    pub async fn set_aux_context(&mut self, aux: AuxContext) -> Result<(), ListError> {
        self.aux = aux;
        let collection = self.store.snapshot(self.data_type);
        self.view = self
            .filter_manager
            .process_data(&collection, self.data_type, &self.filter, &self.aux)
            .await?;
        self.adopt_filtered_view();
        Ok(())
    }

    /// Switch to a different data type. Full reset: default filter state
    /// for the new type, selection cleared, pagination back to the start,
    /// store subscription moved over.
    pub async fn set_data_type(&mut self, data_type: DataType) -> Result<(), ListError> {
        if data_type == self.data_type {
            return Ok(());
        }
        debug!("list: switching from {} to {}", self.data_type, data_type);
        self.data_type = data_type;
        self.filter = FilterState::for_data_type(data_type);
        self.selection.clear();
        self.store_rx = self.store.subscribe(data_type);
        self.pagination.reset(self.options.page_mode(), 0);
        self.refresh().await
    }

    /// Toggle selection of an item by id; returns the state after the
    /// toggle. Selection survives filter and pagination changes.
    pub fn toggle_selection(&mut self, id: &str) -> bool {
        let selected = if self.selection.shift_remove(id) {
            false
        } else {
            self.selection.insert(id.to_string());
            true
        };
        let _ = self.events_tx.send(ListEvent::SelectionChanged {
            id: id.to_string(),
            selected,
        });
        selected
    }

    /// Whether an item is currently selected.
    pub fn is_selected(&self, id: &str) -> bool {
        self.selection.contains(id)
    }

    /// Ids of all selected items, in selection order.
    pub fn selected_ids(&self) -> Vec<&str> {
        self.selection.iter().map(String::as_str).collect()
    }

    /// Jump to a page (paged mode). Out-of-range pages are rejected without
    /// a view change.
    pub fn go_to_page(&mut self, page: usize) -> bool {
        let moved = self.pagination.go_to_page(page);
        if moved {
            self.emit_view();
        }
        moved
    }

    /// Grow the infinite window by one step. Returns whether the window
    /// changed.
    pub fn load_more(&mut self) -> bool {
        let grew = self.pagination.load_more();
        if grew {
            self.emit_view();
        } else {
            self.sync_scroll_flags();
        }
        grew
    }

    /// Callbacks for wiring an [`crate::scroll::InfiniteScrollManager`]:
    /// the gate checks "more to show and not mid-load", the action posts a
    /// load request that the next [`DataList::tick`] serves.
    pub fn scroll_hooks(
        &self,
    ) -> (
        Arc<dyn Fn() -> bool + Send + Sync>,
        Arc<dyn Fn() + Send + Sync>,
    ) {
        let has_more = self.has_more_flag.clone();
        let loading = self.loading_flag.clone();
        let can_load: Arc<dyn Fn() -> bool + Send + Sync> = Arc::new(move || {
            has_more.load(Ordering::SeqCst) && !loading.load(Ordering::SeqCst)
        });
        let load_tx = self.load_tx.clone();
        let load_more: Arc<dyn Fn() + Send + Sync> = Arc::new(move || {
            let _ = load_tx.send(());
        });
        (can_load, load_more)
    }

    /// Render the visible window through the host's renderer, in display
    /// order.
    pub fn render_visible(&self, renderer: &mut dyn ItemRenderer) {
        for item in self.visible() {
            let ctx = RenderContext {
                display_mode: self.options.display_mode,
                show_fields: &self.options.show_fields,
                selected: self.selection.contains(item.id()),
            };
            renderer.render(item, &ctx);
        }
    }

    // Filter edits land the user back at the start of the results.
    fn adopt_filtered_view(&mut self) {
        self.pagination.reset(self.options.page_mode(), self.view.len());
        self.emit_view();
    }

    fn emit_view(&mut self) {
        self.sync_scroll_flags();
        let _ = self.events_tx.send(ListEvent::ViewChanged {
            visible: self.visible().to_vec(),
            total_matched: self.view.len(),
            window: self.pagination.window(),
        });
    }

    fn sync_scroll_flags(&self) {
        self.has_more_flag.store(self.pagination.has_more(), Ordering::SeqCst);
        self.loading_flag
            .store(self.pagination.load_in_flight(), Ordering::SeqCst);
    }
}
