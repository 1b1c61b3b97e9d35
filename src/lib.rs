//! A generic data-list engine: search, filter, sort and paginate
//! collections of tokens, chains and liquidity pools.
//!
//! The pipeline is the same wherever it runs: variant filter, free-text
//! search, type-specific auxiliary filter, stable sort. Small collections
//! are processed on the calling task; large ones are offloaded to a
//! dedicated worker thread with request correlation, timeouts, debounce
//! and crash recovery. On top of the processed view sit a pagination
//! manager (paged or infinite window) and an infinite-scroll manager that
//! turns visibility geometry into load requests.
//!
//! ```no_run
//! use std::sync::Arc;
//! use datalist::prelude::*;
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() -> Result<(), ListError> {
//! let store = Arc::new(MemoryStore::new());
//! let options = ListOptionsBuilder::default()
//!     .infinite_scroll(true)
//!     .items_per_page(20)
//!     .build()
//!     .unwrap();
//! let mut list = DataList::new(options, DataType::Token, store);
//! list.refresh().await?;
//! list.set_query("osmo").await?;
//! for item in list.visible() {
//!     println!("{}", item.name());
//! }
//! # Ok(())
//! # }
//! ```

#[macro_use]
extern crate log;

pub mod engine;
pub mod error;
pub mod filter_manager;
pub mod item;
pub mod list;
pub mod options;
pub mod pagination;
pub mod prelude;
pub mod scroll;
pub mod store;
pub mod worker;

pub use crate::error::{ListError, WorkerError};
pub use crate::item::{AuxContext, AuxFilter, DataType, FilterState, Item, SortDirection, SortKey};
pub use crate::list::{DataList, ListEvent};
pub use crate::options::{DisplayMode, ListOptions, ListOptionsBuilder};
