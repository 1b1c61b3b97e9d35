//! Re-exports of everything a typical host needs.

pub use crate::error::{ListError, WorkerError};
pub use crate::filter_manager::{FilterManager, Operation, PerfSample, ProcessingEvent};
pub use crate::item::{
    AuxContext, AuxFilter, ChainKind, Collection, DataType, FilterState, Item, ProcessedView,
    SortDirection, SortKey, TokenRef,
};
pub use crate::list::{DataList, ItemRenderer, ListEvent, RenderContext};
pub use crate::options::{DisplayMode, ListOptions, ListOptionsBuilder};
pub use crate::pagination::{PageMode, PaginationManager, Window};
pub use crate::scroll::{
    ElementId, InfiniteScrollManager, ScrollOptions, ScrollRoot, ScrollTree, VisibilityObserver,
    resolve_scroll_root,
};
pub use crate::store::{CollectionStore, MemoryStore};
pub use crate::worker::{BatchOutput, ProcessOutput, WorkerManager, WorkerOptions};
