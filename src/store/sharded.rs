//! Hash-sharded map backend
//!
//! Splits the key space over several [`MemoryStore`]s, each behind its own
//! exclusive lock. Contention only arises between keys of the same shard.

use super::{KeyValueStore, MemoryStore, ShardRouter, StoreStats};
use parking_lot::Mutex;

/// Upper bound on the default shard count
const MAX_DEFAULT_SHARDS: usize = 16;

/// Independently locked shards routed by key hash
#[derive(Debug)]
pub struct ShardedMap {
    shards: Vec<Mutex<MemoryStore>>,
    router: ShardRouter,
}

impl ShardedMap {
    /// Create a sharded map with one shard per CPU core (min 1, max 16)
    pub fn new() -> Self {
        Self::with_shards(default_shard_count())
    }

    /// Create a sharded map with an explicit shard count
    pub fn with_shards(num_shards: usize) -> Self {
        let router = ShardRouter::new(num_shards);
        let shards = (0..num_shards)
            .map(|_| Mutex::new(MemoryStore::new()))
            .collect();

        ShardedMap { shards, router }
    }

    /// Number of shards
    pub fn num_shards(&self) -> usize {
        self.router.num_shards()
    }

    fn shard_for(&self, key: &[u8]) -> &Mutex<MemoryStore> {
        &self.shards[self.router.route_key(key)]
    }
}

impl Default for ShardedMap {
    fn default() -> Self {
        Self::new()
    }
}

/// One shard per CPU core, clamped to `1..=16`
pub fn default_shard_count() -> usize {
    num_cpus::get().clamp(1, MAX_DEFAULT_SHARDS)
}

impl KeyValueStore for ShardedMap {
    fn set(&self, key: &str, value: i64) {
        let key = key.as_bytes();
        self.shard_for(key).lock().set(key, value);
    }

    fn get(&self, key: &str) -> i64 {
        let key = key.as_bytes();
        self.shard_for(key).lock().get(key)
    }

    fn stats(&self) -> StoreStats {
        // Shards are locked one at a time, so the sum is not a global snapshot
        self.shards.iter().fold(StoreStats::default(), |mut acc, shard| {
            let stats = shard.lock().stats();
            acc.keys += stats.keys;
            acc.inserts += stats.inserts;
            acc.memory_bytes += stats.memory_bytes;
            acc
        })
    }

    fn name(&self) -> &'static str {
        "sharded_map"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_shard_count_is_clamped() {
        let map = ShardedMap::new();
        assert!(map.num_shards() >= 1);
        assert!(map.num_shards() <= MAX_DEFAULT_SHARDS);
    }

    #[test]
    fn test_keys_spread_across_shards() {
        let map = ShardedMap::with_shards(4);
        for i in 0..200 {
            map.set(&format!("key_{}", i), i);
        }

        let populated = map.shards.iter().filter(|s| !s.lock().is_empty()).count();
        assert!(populated > 1);
        assert_eq!(map.stats().keys, 200);
        assert_eq!(map.get("key_199"), 199);
    }

    #[test]
    fn test_set_and_get_use_the_routed_shard() {
        let map = ShardedMap::with_shards(8);
        let router = ShardRouter::new(8);

        for i in 0..64 {
            let key = format!("user:{}", i);
            map.set(&key, i);

            let home = router.route_key(key.as_bytes());
            for (index, shard) in map.shards.iter().enumerate() {
                let stored = shard.lock().get(key.as_bytes());
                if index == home {
                    assert_eq!(stored, i, "key {} missing from shard {}", key, home);
                } else {
                    assert_eq!(stored, 0, "key {} leaked into shard {}", key, index);
                }
            }
            assert_eq!(map.get(&key), i);
        }
    }

    #[test]
    fn test_single_shard_behaves_like_one_map() {
        let map = ShardedMap::with_shards(1);
        map.set("a", 1);
        map.set("b", 2);

        assert_eq!(map.shards[0].lock().len(), 2);
        assert_eq!(map.stats().inserts, 2);
    }
}
