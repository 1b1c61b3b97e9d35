//! The worker path and the synchronous path must produce identical views
//! for identical inputs; offload is a routing decision, never a semantic
//! one.

mod common;

use std::time::Duration;

use datalist::prelude::*;

use common::{ids, pool, token_collection};

fn worker() -> WorkerManager {
    WorkerManager::new(WorkerOptions {
        timeout: Duration::from_secs(5),
        debounce: Duration::from_millis(10),
        respawn_backoff: Duration::from_millis(50),
    })
}

async fn assert_paths_agree(collection: &Collection, data_type: DataType, filter: &FilterState) {
    let aux = AuxContext::default();
    let sync = FilterManager::without_worker(0)
        .process_sync(collection, data_type, filter, &aux, Operation::Process)
        .unwrap();
    let offloaded = worker()
        .send_process(collection, data_type, filter, &aux)
        .await
        .unwrap();
    assert_eq!(ids(&offloaded.view), ids(&sync));
}

#[tokio::test]
async fn default_token_pipeline_agrees() {
    let collection = token_collection(200);
    assert_paths_agree(&collection, DataType::Token, &FilterState::for_tokens()).await;
}

#[tokio::test]
async fn query_and_sort_variants_agree() {
    let collection = token_collection(200);

    let mut queried = FilterState::for_tokens();
    queried.query = "Token 01".into();
    assert_paths_agree(&collection, DataType::Token, &queried).await;

    let mut by_name = FilterState::for_tokens();
    by_name.sort_key = SortKey::Name;
    by_name.sort_direction = SortDirection::Ascending;
    assert_paths_agree(&collection, DataType::Token, &by_name).await;
}

#[tokio::test]
async fn pool_aux_filter_agrees() {
    let collection: Collection = vec![
        pool("p1", "ATOM", "OSMO", "500", "12.4%"),
        pool("p2", "ETH", "USDC", "900", "3.1%"),
        pool("p3", "NTRN", "USDC", "50", "44%"),
    ];
    let mut filter = FilterState::for_pools();
    filter.aux = AuxFilter::Pool { my_pools_only: true };
    let aux = AuxContext {
        owned_pools: ["p1".to_string(), "p3".to_string()].into_iter().collect(),
    };

    let sync = FilterManager::without_worker(0)
        .process_sync(&collection, DataType::Pool, &filter, &aux, Operation::Process)
        .unwrap();
    let offloaded = worker()
        .send_process(&collection, DataType::Pool, &filter, &aux)
        .await
        .unwrap();
    assert_eq!(ids(&offloaded.view), ids(&sync));
    // pools default to liquidity descending
    assert_eq!(ids(&sync), ["p1", "p3"]);
}

#[tokio::test]
async fn processing_is_idempotent() {
    let collection = token_collection(80);
    let filter = FilterState::for_tokens();
    let aux = AuxContext::default();
    let manager = FilterManager::without_worker(0);

    let once = manager
        .process_sync(&collection, DataType::Token, &filter, &aux, Operation::Process)
        .unwrap();
    let twice = manager
        .process_sync(&once, DataType::Token, &filter, &aux, Operation::Process)
        .unwrap();
    assert_eq!(ids(&once), ids(&twice));
}
