//! Host-facing configuration for a data list.

use std::time::Duration;

use derive_builder::Builder;

use crate::pagination::PageMode;
use crate::scroll::ScrollOptions;

/// How items are laid out by the renderer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DisplayMode {
    /// Card per item.
    Card,
    /// Dense single-line rows.
    #[default]
    ListItem,
    /// Minimal rows for constrained surfaces.
    Compact,
    /// Multi-column grid of cards.
    Grid,
}

/// All tunables in one place. Construct through [`ListOptionsBuilder`];
/// every field has a sensible default, so `ListOptionsBuilder::default()
/// .build()` gives a working paged list.
#[derive(Debug, Clone, Builder)]
#[builder(build_fn(error = "ListOptionsBuilderError"))]
pub struct ListOptions {
    /// Layout the renderer should use.
    #[builder(default)]
    pub display_mode: DisplayMode,

    /// Infinite scroll instead of explicit pages.
    #[builder(default)]
    pub infinite_scroll: bool,

    /// Observe triggers against the nearest scrollable ancestor rather
    /// than the viewport.
    #[builder(default = "true")]
    pub use_parent_scroll: bool,

    /// How many of the last rendered items act as scroll triggers.
    #[builder(default = "3")]
    pub trigger_items: usize,

    /// Intersection threshold for trigger elements.
    #[builder(default = "0.1")]
    pub threshold: f64,

    /// Page size (paged mode) or growth step (infinite mode).
    #[builder(default = "12")]
    pub items_per_page: usize,

    /// Hard ceiling on items ever revealed in infinite mode.
    #[builder(default = "500")]
    pub max_items: usize,

    /// Offload processing of large collections to the background worker.
    #[builder(default = "true")]
    pub enable_worker: bool,

    /// Explicit offload threshold; `None` derives one from the scroll mode.
    #[builder(default)]
    pub worker_threshold: Option<usize>,

    /// How long to wait for any single worker response.
    #[builder(default = "Duration::from_secs(10)")]
    pub worker_timeout: Duration,

    /// Quiet period before a typed query is actually searched.
    #[builder(default = "Duration::from_millis(200)")]
    pub search_debounce: Duration,

    /// Quiet period coalescing scroll-trigger firings.
    #[builder(default = "Duration::from_millis(100)")]
    pub scroll_debounce: Duration,

    /// Pause before respawning a crashed worker.
    #[builder(default = "Duration::from_secs(1)")]
    pub respawn_backoff: Duration,

    /// Field names the renderer should show; empty means all.
    #[builder(default)]
    pub show_fields: Vec<String>,
}

/// Builder validation error. The builder has no required fields, so this
/// only fires on programmer misuse (a field set twice through extension
/// code, for instance).
#[derive(Debug, thiserror::Error)]
#[error("invalid list options: {0}")]
pub struct ListOptionsBuilderError(String);

impl From<derive_builder::UninitializedFieldError> for ListOptionsBuilderError {
    fn from(e: derive_builder::UninitializedFieldError) -> Self {
        ListOptionsBuilderError(e.to_string())
    }
}

impl Default for ListOptions {
    fn default() -> Self {
        ListOptions {
            display_mode: DisplayMode::default(),
            infinite_scroll: false,
            use_parent_scroll: true,
            trigger_items: 3,
            threshold: 0.1,
            items_per_page: 12,
            max_items: 500,
            enable_worker: true,
            worker_threshold: None,
            worker_timeout: Duration::from_secs(10),
            search_debounce: Duration::from_millis(200),
            scroll_debounce: Duration::from_millis(100),
            respawn_backoff: Duration::from_secs(1),
            show_fields: Vec::new(),
        }
    }
}

impl ListOptions {
    /// The paging mode implied by `infinite_scroll`.
    pub fn page_mode(&self) -> PageMode {
        if self.infinite_scroll {
            PageMode::Infinite
        } else {
            PageMode::Paged
        }
    }

    /// The scroll-manager tunables carried by these options.
    pub fn scroll_options(&self) -> ScrollOptions {
        ScrollOptions {
            trigger_items: self.trigger_items,
            threshold: self.threshold,
            debounce: self.scroll_debounce,
        }
    }

    /// The offload threshold in effect: the explicit override when set,
    /// otherwise lower for infinite scroll (smaller, more frequent passes)
    /// than for paged display.
    pub fn effective_worker_threshold(&self) -> usize {
        match self.worker_threshold {
            Some(threshold) => threshold,
            None if self.infinite_scroll => 25,
            None => 50,
        }
    }
}
