//! The pagination manager: translates a processed view plus a display mode
//! into the subset that should currently render.
//!
//! Pure bookkeeping; no network or worker calls originate here. The actual
//! "more data" refill, if any, is the caller's responsibility, triggered
//! through its own channel or callback.

use std::sync::Arc;

use crate::item::Item;

/// Display paging mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageMode {
    /// Classic page window with a pager.
    Paged,
    /// Monotonically growing window fed by scroll triggers.
    Infinite,
}

/// Snapshot of the current window, for listeners and rendering.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Window {
    /// Paged-mode window.
    Paged {
        /// Current page, 1-based.
        page: usize,
        /// Items per page.
        page_size: usize,
        /// `ceil(total / page_size)`, at least 1 even when empty.
        total_pages: usize,
    },
    /// Infinite-mode window.
    Infinite {
        /// Number of items currently displayed.
        displayed_count: usize,
        /// Whether more items can still be revealed.
        has_more: bool,
    },
}

enum State {
    Paged { page: usize },
    Infinite { displayed: usize, has_more: bool },
}

type Listener = Box<dyn Fn(&Window) + Send>;

/// Mode-switchable accumulator over the processed view.
pub struct PaginationManager {
    page_size: usize,
    max_items: usize,
    total: usize,
    state: State,
    load_in_flight: bool,
    listener: Option<Listener>,
}

impl PaginationManager {
    /// Create a manager for the given mode. `page_size` must be positive;
    /// zero is clamped to 1 rather than made a runtime error.
    pub fn new(mode: PageMode, page_size: usize, max_items: usize) -> Self {
        let mut manager = PaginationManager {
            page_size: page_size.max(1),
            max_items,
            total: 0,
            state: State::Paged { page: 1 },
            load_in_flight: false,
            listener: None,
        };
        manager.reset(mode, 0);
        manager
    }

    /// Register the change listener; notified synchronously on every window
    /// change.
    pub fn set_listener(&mut self, listener: impl Fn(&Window) + Send + 'static) {
        self.listener = Some(Box::new(listener));
    }

    /// Current mode.
    pub fn mode(&self) -> PageMode {
        match self.state {
            State::Paged { .. } => PageMode::Paged,
            State::Infinite { .. } => PageMode::Infinite,
        }
    }

    /// Fully reset for a mode/data-type switch: paged back to page 1,
    /// infinite back to one page worth of items.
    pub fn reset(&mut self, mode: PageMode, total: usize) {
        self.total = total;
        self.load_in_flight = false;
        self.state = match mode {
            PageMode::Paged => State::Paged { page: 1 },
            PageMode::Infinite => {
                let displayed = self.page_size.min(total).min(self.max_items);
                State::Infinite {
                    displayed,
                    has_more: displayed < total && displayed < self.max_items,
                }
            }
        };
        self.notify();
    }

    /// Adopt a new processed-view size without changing mode. The current
    /// position is clamped into the new bounds.
    pub fn set_total(&mut self, total: usize) {
        self.total = total;
        match &mut self.state {
            State::Paged { page } => {
                let total_pages = total_pages(total, self.page_size);
                if *page > total_pages {
                    *page = total_pages;
                }
            }
            State::Infinite { displayed, has_more } => {
                // Keep the window monotone within one view, but never show
                // past the view or the hard ceiling.
                let cap = total.min(self.max_items);
                if *displayed > cap {
                    *displayed = cap;
                } else if *displayed == 0 {
                    *displayed = self.page_size.min(cap);
                }
                *has_more = *displayed < total && *displayed < self.max_items;
            }
        }
        self.notify();
    }

    /// Number of pages for the current view, at least 1.
    pub fn total_pages(&self) -> usize {
        total_pages(self.total, self.page_size)
    }

    /// Current page (paged mode); 1 in infinite mode.
    pub fn current_page(&self) -> usize {
        match self.state {
            State::Paged { page } => page,
            State::Infinite { .. } => 1,
        }
    }

    /// Number of items the window currently reveals.
    pub fn displayed_count(&self) -> usize {
        match self.state {
            State::Paged { page } => {
                let start = (page - 1) * self.page_size;
                self.total.saturating_sub(start).min(self.page_size)
            }
            State::Infinite { displayed, .. } => displayed,
        }
    }

    /// Whether the infinite window can still grow. Always false in paged
    /// mode.
    pub fn has_more(&self) -> bool {
        match self.state {
            State::Paged { .. } => false,
            State::Infinite { has_more, .. } => has_more,
        }
    }

    /// Jump to a page. A no-op (no state change, no notification) when `n`
    /// is outside `[1, total_pages]` or in infinite mode.
    pub fn go_to_page(&mut self, n: usize) -> bool {
        let total_pages = self.total_pages();
        match &mut self.state {
            State::Paged { page } if n >= 1 && n <= total_pages => {
                *page = n;
                self.notify();
                true
            }
            _ => {
                trace!("pagination: go_to_page({n}) rejected (total pages {total_pages})");
                false
            }
        }
    }

    /// Force page 1 and recompute the page count for the current view.
    pub fn reset_to_first_page(&mut self) {
        if let State::Paged { page } = &mut self.state {
            *page = 1;
            self.notify();
        }
    }

    /// Grow the infinite window by up to one page. Returns whether the
    /// window changed. No-op while a load is in flight, when nothing
    /// remains, or in paged mode.
    pub fn load_more(&mut self) -> bool {
        if self.load_in_flight {
            return false;
        }
        let max_items = self.max_items;
        let page_size = self.page_size;
        let total = self.total;
        match &mut self.state {
            State::Infinite { displayed, has_more } => {
                if !*has_more {
                    return false;
                }
                let requested = page_size.min(total.saturating_sub(*displayed));
                if requested == 0 {
                    *has_more = false;
                    self.notify();
                    return false;
                }
                *displayed = (*displayed + requested).min(total).min(max_items);
                *has_more = *displayed < total && *displayed < max_items;
                debug!(
                    "pagination: grew window to {} of {total} (has_more: {})",
                    *displayed, *has_more
                );
                self.notify();
                true
            }
            State::Paged { .. } => false,
        }
    }

    /// Mark a refill in flight; `load_more` is a no-op until finished.
    pub fn begin_load(&mut self) {
        self.load_in_flight = true;
    }

    /// Clear the in-flight flag.
    pub fn finish_load(&mut self) {
        self.load_in_flight = false;
    }

    /// Whether a refill is currently in flight.
    pub fn load_in_flight(&self) -> bool {
        self.load_in_flight
    }

    /// Snapshot of the current window.
    pub fn window(&self) -> Window {
        match self.state {
            State::Paged { page } => Window::Paged {
                page,
                page_size: self.page_size,
                total_pages: self.total_pages(),
            },
            State::Infinite { displayed, has_more } => Window::Infinite {
                displayed_count: displayed,
                has_more,
            },
        }
    }

    /// The slice of the processed view the window currently reveals.
    pub fn slice<'a>(&self, view: &'a [Arc<Item>]) -> &'a [Arc<Item>] {
        match self.state {
            State::Paged { page } => {
                let start = ((page - 1) * self.page_size).min(view.len());
                let end = (start + self.page_size).min(view.len());
                &view[start..end]
            }
            State::Infinite { displayed, .. } => &view[..displayed.min(view.len())],
        }
    }

    fn notify(&self) {
        if let Some(listener) = &self.listener {
            listener(&self.window());
        }
    }
}

fn total_pages(total: usize, page_size: usize) -> usize {
    total.div_ceil(page_size).max(1)
}
