use std::sync::Arc;

use crate::domain::Player;
use crate::store::{MemoryStore, RecordStore};

pub fn memory_store() -> Arc<dyn RecordStore> {
    Arc::new(MemoryStore::new())
}

pub fn store_with_players(names: &[&str]) -> Arc<dyn RecordStore> {
    let store = memory_store();
    for name in names {
        store.insert_player(&Player::new(name)).unwrap();
    }
    store
}
