//! The infinite-scroll manager: decides, from visibility geometry, when to
//! ask the pagination layer to grow its window.
//!
//! Two independent observers feed it: a component observer tracking whether
//! the host element is anywhere near the viewport, and a trigger observer
//! watching the last few rendered items. Both sit behind capability traits
//! so the trigger logic is testable without a browser; the host environment
//! glue forwards real intersection callbacks into
//! [`InfiniteScrollManager::component_visibility_changed`] and
//! [`InfiniteScrollManager::trigger_intersected`].

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

/// Opaque handle to a rendered element, assigned by the host environment.
pub type ElementId = u64;

/// The resolved scroll container for trigger observation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScrollRoot {
    /// A concrete ancestor element (or the document body).
    Element(ElementId),
    /// No qualifying ancestor; observe against the viewport.
    Viewport,
}

/// Read-only view of the host's element tree, just enough to find the
/// nearest scrollable ancestor without coupling to a real DOM.
pub trait ScrollTree {
    /// Parent of an element, if any.
    fn parent(&self, el: ElementId) -> Option<ElementId>;
    /// Whether the element's computed overflow allows scrolling.
    fn is_scroll_container(&self, el: ElementId) -> bool;
    /// Whether the element's content actually overflows its box.
    fn content_overflows(&self, el: ElementId) -> bool;
    /// The document body, if the environment has one.
    fn body(&self) -> Option<ElementId>;
}

/// Walk up from `host` to the nearest ancestor that is both scrollable and
/// actually overflowing; fall back to the body, then the viewport.
pub fn resolve_scroll_root(tree: &dyn ScrollTree, host: ElementId) -> ScrollRoot {
    let mut current = tree.parent(host);
    while let Some(el) = current {
        if tree.is_scroll_container(el) && tree.content_overflows(el) {
            return ScrollRoot::Element(el);
        }
        current = tree.parent(el);
    }
    match tree.body() {
        Some(body) => ScrollRoot::Element(body),
        None => ScrollRoot::Viewport,
    }
}

/// One visibility observer instance (in a browser, an IntersectionObserver
/// wrapper). The manager drives targets; the environment calls back in.
pub trait VisibilityObserver: Send {
    /// Start observing a target.
    fn observe(&mut self, target: ElementId);
    /// Stop observing a target.
    fn unobserve(&mut self, target: ElementId);
    /// Stop observing everything and release the observer.
    fn disconnect(&mut self);
}

/// Tunables for trigger behavior.
#[derive(Debug, Clone)]
pub struct ScrollOptions {
    /// How many of the last rendered items act as load triggers.
    pub trigger_items: usize,
    /// Intersection threshold the environment applies to triggers.
    pub threshold: f64,
    /// Debounce applied to trigger firings to coalesce rapid scrolls.
    pub debounce: Duration,
}

impl Default for ScrollOptions {
    fn default() -> Self {
        ScrollOptions {
            trigger_items: 3,
            threshold: 0.1,
            debounce: Duration::from_millis(100),
        }
    }
}

type CanLoad = Arc<dyn Fn() -> bool + Send + Sync>;
type LoadMore = Arc<dyn Fn() + Send + Sync>;

/// Wraps the two observers and schedules debounced load-more calls.
pub struct InfiniteScrollManager {
    component_observer: Box<dyn VisibilityObserver>,
    trigger_observer: Box<dyn VisibilityObserver>,
    observed_triggers: Vec<ElementId>,
    component_visible: bool,
    can_load: CanLoad,
    load_more: LoadMore,
    debounce_seq: Arc<AtomicU64>,
    options: ScrollOptions,
}

impl InfiniteScrollManager {
    /// Wire the manager to its observers and callbacks. `can_load` gates
    /// scheduling (typically "has more and no load in flight"); `load_more`
    /// is invoked once per settled debounce window.
    pub fn new(
        component_observer: Box<dyn VisibilityObserver>,
        trigger_observer: Box<dyn VisibilityObserver>,
        host: ElementId,
        can_load: CanLoad,
        load_more: LoadMore,
        options: ScrollOptions,
    ) -> Self {
        let mut component_observer = component_observer;
        component_observer.observe(host);
        InfiniteScrollManager {
            component_observer,
            trigger_observer,
            observed_triggers: Vec::new(),
            // Assume visible until the first component callback says
            // otherwise; the first render usually happens on screen.
            component_visible: true,
            can_load,
            load_more,
            debounce_seq: Arc::new(AtomicU64::new(0)),
            options,
        }
    }

    /// Environment callback: the host element entered or left the viewport
    /// (with margin). Leaving pauses trigger observation entirely; entering
    /// resumes it against the current trigger set.
    pub fn component_visibility_changed(&mut self, visible: bool) {
        if self.component_visible == visible {
            return;
        }
        self.component_visible = visible;
        if visible {
            debug!("scroll: component visible again, resuming {} triggers", self.observed_triggers.len());
            for el in &self.observed_triggers {
                self.trigger_observer.observe(*el);
            }
        } else {
            debug!("scroll: component left view, pausing trigger observation");
            self.trigger_observer.disconnect();
            // Cancel any pending debounced load.
            self.debounce_seq.fetch_add(1, Ordering::SeqCst);
        }
    }

    /// Environment callback: a trigger element intersected the scroll root.
    /// Schedules a debounced `load_more` if the component is visible and
    /// the gate allows loading.
    pub fn trigger_intersected(&self, _el: ElementId) {
        if !self.component_visible {
            return;
        }
        if !(self.can_load)() {
            return;
        }
        let seq = self.debounce_seq.fetch_add(1, Ordering::SeqCst) + 1;
        let debounce_seq = self.debounce_seq.clone();
        let can_load = self.can_load.clone();
        let load_more = self.load_more.clone();
        let debounce = self.options.debounce;
        tokio::spawn(async move {
            tokio::time::sleep(debounce).await;
            if debounce_seq.load(Ordering::SeqCst) != seq {
                return; // coalesced into a later firing
            }
            if can_load() {
                load_more();
            }
        });
    }

    /// Re-resolve trigger targets after a render changed the item count:
    /// un-observe the old sentinels and observe the new last N. Stale
    /// targets are a correctness bug; the sentinel must always track the
    /// current end of the list.
    pub fn retarget(&mut self, rendered: &[ElementId]) {
        for el in self.observed_triggers.drain(..) {
            self.trigger_observer.unobserve(el);
        }
        let n = self.options.trigger_items.min(rendered.len());
        self.observed_triggers = rendered[rendered.len() - n..].to_vec();
        if self.component_visible {
            for el in &self.observed_triggers {
                self.trigger_observer.observe(*el);
            }
        }
        trace!("scroll: observing {} trigger items", self.observed_triggers.len());
    }

    /// Currently observed trigger elements (last N rendered).
    pub fn trigger_targets(&self) -> &[ElementId] {
        &self.observed_triggers
    }

    /// Whether trigger observation is currently active.
    pub fn is_active(&self) -> bool {
        self.component_visible
    }
}

impl Drop for InfiniteScrollManager {
    fn drop(&mut self) {
        // Invalidate any pending debounced load, then release both
        // observers so no callback outlives the component.
        self.debounce_seq.fetch_add(1, Ordering::SeqCst);
        self.trigger_observer.disconnect();
        self.component_observer.disconnect();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::sync::Mutex;
    use std::sync::atomic::AtomicUsize;

    #[derive(Default, Clone)]
    struct Recording {
        observed: Arc<Mutex<Vec<ElementId>>>,
        disconnects: Arc<AtomicUsize>,
    }

    impl VisibilityObserver for Recording {
        fn observe(&mut self, target: ElementId) {
            self.observed.lock().unwrap().push(target);
        }
        fn unobserve(&mut self, target: ElementId) {
            self.observed.lock().unwrap().retain(|el| *el != target);
        }
        fn disconnect(&mut self) {
            self.observed.lock().unwrap().clear();
            self.disconnects.fetch_add(1, Ordering::SeqCst);
        }
    }

    struct FakeTree {
        parents: HashMap<ElementId, ElementId>,
        scrollable: Vec<ElementId>,
        overflowing: Vec<ElementId>,
        body: Option<ElementId>,
    }

    impl ScrollTree for FakeTree {
        fn parent(&self, el: ElementId) -> Option<ElementId> {
            self.parents.get(&el).copied()
        }
        fn is_scroll_container(&self, el: ElementId) -> bool {
            self.scrollable.contains(&el)
        }
        fn content_overflows(&self, el: ElementId) -> bool {
            self.overflowing.contains(&el)
        }
        fn body(&self) -> Option<ElementId> {
            self.body
        }
    }

    #[test]
    fn resolves_nearest_scrollable_overflowing_ancestor() {
        // 1 (host) -> 2 (scrollable, no overflow) -> 3 (scrollable, overflows) -> 4
        let tree = FakeTree {
            parents: HashMap::from([(1, 2), (2, 3), (3, 4)]),
            scrollable: vec![2, 3],
            overflowing: vec![3],
            body: Some(100),
        };
        assert_eq!(resolve_scroll_root(&tree, 1), ScrollRoot::Element(3));
    }

    #[test]
    fn falls_back_to_body_then_viewport() {
        let with_body = FakeTree {
            parents: HashMap::from([(1, 2)]),
            scrollable: vec![],
            overflowing: vec![],
            body: Some(100),
        };
        assert_eq!(resolve_scroll_root(&with_body, 1), ScrollRoot::Element(100));

        let bare = FakeTree {
            parents: HashMap::new(),
            scrollable: vec![],
            overflowing: vec![],
            body: None,
        };
        assert_eq!(resolve_scroll_root(&bare, 1), ScrollRoot::Viewport);
    }

    fn manager_with(
        can_load: bool,
        loads: Arc<AtomicUsize>,
        debounce: Duration,
    ) -> (InfiniteScrollManager, Recording, Recording) {
        let component = Recording::default();
        let trigger = Recording::default();
        let manager = InfiniteScrollManager::new(
            Box::new(component.clone()),
            Box::new(trigger.clone()),
            1,
            Arc::new(move || can_load),
            Arc::new(move || {
                loads.fetch_add(1, Ordering::SeqCst);
            }),
            ScrollOptions {
                debounce,
                ..ScrollOptions::default()
            },
        );
        (manager, component, trigger)
    }

    #[test]
    fn retarget_tracks_last_n_items() {
        let loads = Arc::new(AtomicUsize::new(0));
        let (mut manager, _component, trigger) =
            manager_with(true, loads, Duration::from_millis(5));

        manager.retarget(&[10, 11, 12, 13, 14]);
        assert_eq!(manager.trigger_targets(), &[12, 13, 14]);
        assert_eq!(*trigger.observed.lock().unwrap(), vec![12, 13, 14]);

        // A render that grew the list moves the sentinels.
        manager.retarget(&[10, 11, 12, 13, 14, 15, 16]);
        assert_eq!(manager.trigger_targets(), &[14, 15, 16]);
        assert_eq!(*trigger.observed.lock().unwrap(), vec![14, 15, 16]);

        // Short lists observe everything that exists.
        manager.retarget(&[20]);
        assert_eq!(manager.trigger_targets(), &[20]);
    }

    #[test]
    fn hiding_pauses_and_showing_resumes() {
        let loads = Arc::new(AtomicUsize::new(0));
        let (mut manager, _component, trigger) =
            manager_with(true, loads, Duration::from_millis(5));
        manager.retarget(&[1, 2, 3]);

        manager.component_visibility_changed(false);
        assert!(!manager.is_active());
        assert!(trigger.observed.lock().unwrap().is_empty());

        manager.component_visibility_changed(true);
        assert_eq!(*trigger.observed.lock().unwrap(), vec![1, 2, 3]);
    }

    #[tokio::test]
    async fn rapid_triggers_coalesce_into_one_load() {
        let loads = Arc::new(AtomicUsize::new(0));
        let (mut manager, _component, _trigger) =
            manager_with(true, loads.clone(), Duration::from_millis(20));
        manager.retarget(&[1, 2, 3]);

        manager.trigger_intersected(3);
        manager.trigger_intersected(2);
        manager.trigger_intersected(3);
        tokio::time::sleep(Duration::from_millis(80)).await;
        assert_eq!(loads.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn no_load_when_hidden_or_gated() {
        let loads = Arc::new(AtomicUsize::new(0));
        let (mut manager, _component, _trigger) =
            manager_with(true, loads.clone(), Duration::from_millis(10));
        manager.retarget(&[1, 2, 3]);
        manager.component_visibility_changed(false);
        manager.trigger_intersected(3);
        tokio::time::sleep(Duration::from_millis(50)).await;
        assert_eq!(loads.load(Ordering::SeqCst), 0);

        let gated_loads = Arc::new(AtomicUsize::new(0));
        let (gated, _c, _t) = manager_with(false, gated_loads.clone(), Duration::from_millis(10));
        gated.trigger_intersected(1);
        tokio::time::sleep(Duration::from_millis(50)).await;
        assert_eq!(gated_loads.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn drop_cancels_pending_debounce_and_disconnects() {
        let loads = Arc::new(AtomicUsize::new(0));
        let (mut manager, component, trigger) =
            manager_with(true, loads.clone(), Duration::from_millis(30));
        manager.retarget(&[1, 2, 3]);
        manager.trigger_intersected(3);
        drop(manager);

        tokio::time::sleep(Duration::from_millis(80)).await;
        assert_eq!(loads.load(Ordering::SeqCst), 0);
        assert_eq!(component.disconnects.load(Ordering::SeqCst), 1);
        assert_eq!(trigger.disconnects.load(Ordering::SeqCst), 1);
    }
}
