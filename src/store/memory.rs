//! Single-threaded in-memory map
//!
//! The unsynchronized core shared by every lock-based backend. Callers wrap
//! it in whatever lock discipline they are measuring.

use super::{entry_footprint, StoreStats};
use bytes::Bytes;
use siphasher::sip::SipHasher13;
use std::collections::HashMap;
use std::hash::BuildHasherDefault;

/// Type alias for our hash map with SipHasher
type StoreMap = HashMap<Bytes, i64, BuildHasherDefault<SipHasher13>>;

/// Plain key/value map with insertion bookkeeping
#[derive(Debug)]
pub struct MemoryStore {
    /// The main storage map
    store: StoreMap,

    /// New-key insertions since creation
    inserts: u64,

    /// Bytes held by keys and values
    memory_bytes: usize,
}

impl MemoryStore {
    /// Create a new memory store with default capacity
    pub fn new() -> Self {
        Self::with_capacity(16)
    }

    /// Create a new memory store with specified initial capacity
    pub fn with_capacity(capacity: usize) -> Self {
        MemoryStore {
            store: HashMap::with_capacity_and_hasher(
                capacity,
                BuildHasherDefault::<SipHasher13>::default(),
            ),
            inserts: 0,
            memory_bytes: 0,
        }
    }

    /// Set a key-value pair, returns true if the key is new
    ///
    /// The key is only copied into the map on first insertion; overwrites
    /// reuse the stored key.
    pub fn set(&mut self, key: &[u8], value: i64) -> bool {
        if let Some(slot) = self.store.get_mut(key) {
            *slot = value;
            return false;
        }

        self.store.insert(Bytes::copy_from_slice(key), value);
        self.inserts += 1;
        self.memory_bytes += entry_footprint(key);
        true
    }

    /// Get a value by key, `0` when absent
    pub fn get(&self, key: &[u8]) -> i64 {
        self.store.get(key).copied().unwrap_or_default()
    }

    /// Get the number of keys
    pub fn len(&self) -> usize {
        self.store.len()
    }

    /// Check if the store is empty
    pub fn is_empty(&self) -> bool {
        self.store.is_empty()
    }

    /// Get statistics about the store
    pub fn stats(&self) -> StoreStats {
        StoreStats {
            keys: self.store.len(),
            inserts: self.inserts,
            memory_bytes: self.memory_bytes,
        }
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}
