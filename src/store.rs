//! Collection storage behind a trait, so the list can sit on top of
//! whatever the host keeps its data in.
//!
//! The contract is snapshot-plus-notify: `snapshot` hands out the current
//! collection as cheap `Arc` clones, and `subscribe` yields a channel that
//! ticks whenever the collection for that data type changes. The list
//! re-snapshots on every tick instead of diffing payloads.

use std::collections::HashMap;
use std::sync::Mutex;

use tokio::sync::mpsc::{UnboundedReceiver, UnboundedSender, unbounded_channel};

use crate::item::{Collection, DataType};

/// Read access to the host's collections.
pub trait CollectionStore: Send + Sync {
    /// Current collection for a data type. Empty when nothing is loaded.
    fn snapshot(&self, data_type: DataType) -> Collection;

    /// Change notifications for a data type. Each `()` means "re-snapshot".
    fn subscribe(&self, data_type: DataType) -> UnboundedReceiver<()>;
}

/// In-memory store, also the test double of choice.
#[derive(Default)]
pub struct MemoryStore {
    collections: Mutex<HashMap<DataType, Collection>>,
    subscribers: Mutex<HashMap<DataType, Vec<UnboundedSender<()>>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        MemoryStore::default()
    }

    /// Replace the collection for a data type and notify subscribers.
    pub fn set(&self, data_type: DataType, collection: Collection) {
        self.lock_collections().insert(data_type, collection);
        let mut subscribers = self.lock_subscribers();
        if let Some(senders) = subscribers.get_mut(&data_type) {
            // Closed receivers are pruned lazily, on the next change.
            senders.retain(|tx| tx.send(()).is_ok());
        }
    }

    /// Number of items currently held for a data type.
    pub fn len(&self, data_type: DataType) -> usize {
        self.lock_collections()
            .get(&data_type)
            .map_or(0, Vec::len)
    }

    pub fn is_empty(&self, data_type: DataType) -> bool {
        self.len(data_type) == 0
    }

    fn lock_collections(&self) -> std::sync::MutexGuard<'_, HashMap<DataType, Collection>> {
        self.collections.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn lock_subscribers(
        &self,
    ) -> std::sync::MutexGuard<'_, HashMap<DataType, Vec<UnboundedSender<()>>>> {
        self.subscribers.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl CollectionStore for MemoryStore {
    fn snapshot(&self, data_type: DataType) -> Collection {
        self.lock_collections()
            .get(&data_type)
            .cloned()
            .unwrap_or_default()
    }

    fn subscribe(&self, data_type: DataType) -> UnboundedReceiver<()> {
        let (tx, rx) = unbounded_channel();
        self.lock_subscribers().entry(data_type).or_default().push(tx);
        rx
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::item::{ChainKind, Item};
    use std::sync::Arc;

    fn chain(id: u64, name: &str) -> Arc<Item> {
        Arc::new(Item::Chain {
            chain_id: id,
            unique_id: format!("chain-{id}"),
            name: name.into(),
            kind: ChainKind::Evm,
            explorer: String::new(),
            factory: String::new(),
        })
    }

    #[test]
    fn snapshot_of_unset_type_is_empty() {
        let store = MemoryStore::new();
        assert!(store.snapshot(DataType::Token).is_empty());
        assert!(store.is_empty(DataType::Pool));
    }

    #[tokio::test]
    async fn set_notifies_only_matching_subscribers() {
        let store = MemoryStore::new();
        let mut chains = store.subscribe(DataType::Chain);
        let mut tokens = store.subscribe(DataType::Token);

        store.set(DataType::Chain, vec![chain(1, "Osmosis")]);
        assert!(chains.try_recv().is_ok());
        assert!(tokens.try_recv().is_err());
        assert_eq!(store.len(DataType::Chain), 1);
    }

    #[tokio::test]
    async fn dropped_subscribers_are_pruned() {
        let store = MemoryStore::new();
        let rx = store.subscribe(DataType::Chain);
        drop(rx);
        // Must not panic or grow the subscriber list forever.
        store.set(DataType::Chain, vec![chain(1, "Neutron")]);
        store.set(DataType::Chain, vec![chain(2, "Juno")]);
        assert_eq!(store.lock_subscribers()[&DataType::Chain].len(), 0);
    }
}
