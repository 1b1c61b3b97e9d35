//! Scroll triggers driving a real list: intersection callback, debounce,
//! load request, tick, grown window.

mod common;

use std::sync::{Arc, Mutex};
use std::time::Duration;

use datalist::prelude::*;

use common::token_collection;

#[derive(Default, Clone)]
struct NullObserver {
    observed: Arc<Mutex<Vec<ElementId>>>,
}

impl VisibilityObserver for NullObserver {
    fn observe(&mut self, target: ElementId) {
        self.observed.lock().unwrap().push(target);
    }
    fn unobserve(&mut self, target: ElementId) {
        self.observed.lock().unwrap().retain(|el| *el != target);
    }
    fn disconnect(&mut self) {
        self.observed.lock().unwrap().clear();
    }
}

#[tokio::test]
async fn trigger_intersection_grows_the_list_window() {
    common::init_logging();
    let store = Arc::new(MemoryStore::new());
    store.set(DataType::Token, token_collection(50));

    let options = ListOptionsBuilder::default()
        .enable_worker(false)
        .infinite_scroll(true)
        .items_per_page(20)
        .scroll_debounce(Duration::from_millis(10))
        .build()
        .unwrap();
    let scroll_options = options.scroll_options();
    let mut list = DataList::new(options, DataType::Token, store);
    list.refresh().await.unwrap();
    assert_eq!(list.visible().len(), 20);

    let (can_load, load_more) = list.scroll_hooks();
    let mut scroll = InfiniteScrollManager::new(
        Box::new(NullObserver::default()),
        Box::new(NullObserver::default()),
        1,
        can_load,
        load_more,
        scroll_options,
    );

    // Sentinels track the last rendered items.
    let rendered: Vec<ElementId> = (0..20).collect();
    scroll.retarget(&rendered);
    assert_eq!(scroll.trigger_targets(), &[17, 18, 19]);

    // A burst of intersections coalesces into a single load request.
    scroll.trigger_intersected(19);
    scroll.trigger_intersected(18);
    tokio::time::sleep(Duration::from_millis(50)).await;
    assert!(list.tick().await.unwrap());
    assert_eq!(list.visible().len(), 40);

    // Off-screen component means no loads, however hard we scroll.
    scroll.component_visibility_changed(false);
    scroll.trigger_intersected(19);
    tokio::time::sleep(Duration::from_millis(50)).await;
    assert_eq!(list.visible().len(), 40);

    // Back on screen: the final page loads and the gate closes.
    scroll.component_visibility_changed(true);
    scroll.trigger_intersected(19);
    tokio::time::sleep(Duration::from_millis(50)).await;
    assert!(list.tick().await.unwrap());
    assert_eq!(list.visible().len(), 50);
    match list.window() {
        Window::Infinite { has_more, .. } => assert!(!has_more),
        other => panic!("expected infinite window, got {other:?}"),
    }
}
