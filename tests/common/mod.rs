//! Shared fixtures for integration tests.

// Each test binary uses a different subset of the fixtures.
#![allow(dead_code)]

use std::sync::Arc;

use indexmap::IndexSet;

use datalist::prelude::*;

/// Make `RUST_LOG=datalist=trace cargo test` show worker traffic.
pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

pub fn token(id: &str, name: &str, volume: u32) -> Arc<Item> {
    Arc::new(Item::Token {
        id: id.into(),
        name: name.into(),
        decimals: 6,
        price: "1.00".into(),
        volume_24h: volume.to_string(),
        change_24h: "0.0".into(),
        chains: IndexSet::new(),
        verified: true,
        tags: IndexSet::new(),
    })
}

pub fn chain(chain_id: u64, name: &str, kind: ChainKind) -> Arc<Item> {
    Arc::new(Item::Chain {
        chain_id,
        unique_id: format!("chain-{chain_id}"),
        name: name.into(),
        kind,
        explorer: format!("https://scan.example/{chain_id}"),
        factory: String::new(),
    })
}

pub fn pool(id: &str, a: &str, b: &str, liquidity: &str, apr: &str) -> Arc<Item> {
    Arc::new(Item::Pool {
        id: id.into(),
        token_a: TokenRef {
            id: a.to_lowercase(),
            symbol: a.into(),
        },
        token_b: TokenRef {
            id: b.to_lowercase(),
            symbol: b.into(),
        },
        liquidity: liquidity.into(),
        volume_24h: "0".into(),
        fees_24h: "0".into(),
        apr: apr.into(),
    })
}

/// A generated token collection large enough to cross any offload
/// threshold used in the tests.
pub fn token_collection(n: usize) -> Collection {
    (0..n)
        .map(|i| token(&format!("tok-{i:04}"), &format!("Token {i:04}"), (i * 7 % 101) as u32))
        .collect()
}

pub fn ids(items: &[Arc<Item>]) -> Vec<String> {
    items.iter().map(|i| i.id().to_string()).collect()
}
