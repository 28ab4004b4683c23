//! Sharded concurrent map backend

use super::{entry_footprint, KeyValueStore, StoreStats};
use bytes::Bytes;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use siphasher::sip::SipHasher13;
use std::hash::BuildHasherDefault;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};

type ConcurrentStoreMap = DashMap<Bytes, i64, BuildHasherDefault<SipHasher13>>;

/// Concurrent map with internally striped locking
///
/// Readers of one key never wait on writers of a key that lives in another
/// stripe. Synchronization is owned entirely by the map.
#[derive(Debug)]
pub struct ConcurrentMap {
    map: ConcurrentStoreMap,
    inserts: AtomicU64,
    memory_bytes: AtomicUsize,
}

impl ConcurrentMap {
    /// Create an empty concurrent map
    pub fn new() -> Self {
        ConcurrentMap {
            map: DashMap::with_hasher(BuildHasherDefault::<SipHasher13>::default()),
            inserts: AtomicU64::new(0),
            memory_bytes: AtomicUsize::new(0),
        }
    }

    fn record_insert(&self, key: &[u8]) {
        self.inserts.fetch_add(1, Ordering::Relaxed);
        self.memory_bytes.fetch_add(entry_footprint(key), Ordering::Relaxed);
    }
}

impl Default for ConcurrentMap {
    fn default() -> Self {
        Self::new()
    }
}

impl KeyValueStore for ConcurrentMap {
    fn set(&self, key: &str, value: i64) {
        let key = key.as_bytes();

        // Fast path: overwrite in place without copying the key
        if let Some(mut slot) = self.map.get_mut(key) {
            *slot = value;
            return;
        }

        // Another writer may have inserted between the two lookups
        match self.map.entry(Bytes::copy_from_slice(key)) {
            Entry::Occupied(mut occupied) => {
                occupied.insert(value);
            }
            Entry::Vacant(vacant) => {
                vacant.insert(value);
                self.record_insert(key);
            }
        }
    }

    fn get(&self, key: &str) -> i64 {
        self.map
            .get(key.as_bytes())
            .map(|slot| *slot)
            .unwrap_or_default()
    }

    fn stats(&self) -> StoreStats {
        StoreStats {
            keys: self.map.len(),
            inserts: self.inserts.load(Ordering::Relaxed),
            memory_bytes: self.memory_bytes.load(Ordering::Relaxed),
        }
    }

    fn name(&self) -> &'static str {
        "concurrent_map"
    }
}
