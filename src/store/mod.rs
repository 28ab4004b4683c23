//! Key/value store backends
//!
//! Every backend implements the same small capability interface
//! ([`KeyValueStore`]) so the harness can swap them per run. This module is
//! independent of the harness and of the buffer pool (loose coupling).

mod memory;
mod locked;
mod concurrent;
mod sharded;
mod router;

pub use memory::MemoryStore;
pub use locked::{LockedMap, RwLockedMap};
pub use concurrent::ConcurrentMap;
pub use sharded::ShardedMap;
pub use router::ShardRouter;

use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

/// Capability interface shared by every store backend
///
/// Implementations never fail under concurrent access. A missing key reads
/// as `0`.
pub trait KeyValueStore: Send + Sync {
    /// Set `key` to `value`, last writer wins
    fn set(&self, key: &str, value: i64);

    /// Read the value stored under `key`
    fn get(&self, key: &str) -> i64;

    /// Snapshot of the store's bookkeeping
    fn stats(&self) -> StoreStats;

    /// Short backend name used in reports
    fn name(&self) -> &'static str;
}

/// Which backend a harness run should build
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StoreVariant {
    /// One map behind one exclusive mutex (reads lock exclusively too)
    LockedMap,
    /// One map behind one reader/writer lock
    RwLockedMap,
    /// Sharded concurrent map
    ConcurrentMap,
    /// Independently locked shards routed by key hash
    ShardedMap,
}

impl StoreVariant {
    /// All variants, in report order
    pub const ALL: [StoreVariant; 4] = [
        StoreVariant::LockedMap,
        StoreVariant::RwLockedMap,
        StoreVariant::ConcurrentMap,
        StoreVariant::ShardedMap,
    ];

    /// Build a fresh, empty store of this variant
    pub fn build(self) -> Arc<dyn KeyValueStore> {
        match self {
            StoreVariant::LockedMap => Arc::new(LockedMap::new()),
            StoreVariant::RwLockedMap => Arc::new(RwLockedMap::new()),
            StoreVariant::ConcurrentMap => Arc::new(ConcurrentMap::new()),
            StoreVariant::ShardedMap => Arc::new(ShardedMap::new()),
        }
    }

    /// Name used in reports
    pub fn as_str(&self) -> &'static str {
        match self {
            StoreVariant::LockedMap => "locked_map",
            StoreVariant::RwLockedMap => "rw_locked_map",
            StoreVariant::ConcurrentMap => "concurrent_map",
            StoreVariant::ShardedMap => "sharded_map",
        }
    }
}

impl fmt::Display for StoreVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Statistics about a store
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct StoreStats {
    /// Number of distinct keys currently stored
    pub keys: usize,
    /// Number of new-key insertions since creation
    pub inserts: u64,
    /// Approximate bytes held by keys and values
    pub memory_bytes: usize,
}

/// Approximate footprint of one stored entry
pub(crate) fn entry_footprint(key: &[u8]) -> usize {
    key.len() + std::mem::size_of::<i64>()
}
