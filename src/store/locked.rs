//! Lock-guarded map backends
//!
//! Both types wrap a single [`MemoryStore`] behind one lock. They differ only
//! in the read path: [`LockedMap`] takes the exclusive lock for reads too,
//! [`RwLockedMap`] lets readers share it.

use super::{KeyValueStore, MemoryStore, StoreStats};
use parking_lot::{Mutex, RwLock};

/// One map guarded by one exclusive lock
///
/// Readers and writers mutually exclude each other, which is exactly the
/// contention this variant exists to expose.
#[derive(Debug, Default)]
pub struct LockedMap {
    inner: Mutex<MemoryStore>,
}

impl LockedMap {
    /// Create an empty locked map
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for LockedMap {
    fn set(&self, key: &str, value: i64) {
        self.inner.lock().set(key.as_bytes(), value);
    }

    fn get(&self, key: &str) -> i64 {
        self.inner.lock().get(key.as_bytes())
    }

    fn stats(&self) -> StoreStats {
        self.inner.lock().stats()
    }

    fn name(&self) -> &'static str {
        "locked_map"
    }
}

/// One map guarded by one reader/writer lock
#[derive(Debug, Default)]
pub struct RwLockedMap {
    inner: RwLock<MemoryStore>,
}

impl RwLockedMap {
    /// Create an empty reader/writer locked map
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for RwLockedMap {
    fn set(&self, key: &str, value: i64) {
        self.inner.write().set(key.as_bytes(), value);
    }

    fn get(&self, key: &str) -> i64 {
        self.inner.read().get(key.as_bytes())
    }

    fn stats(&self) -> StoreStats {
        self.inner.read().stats()
    }

    fn name(&self) -> &'static str {
        "rw_locked_map"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[test]
    fn test_locked_map_threads_converge() {
        let map = Arc::new(LockedMap::new());

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let map = map.clone();
                std::thread::spawn(move || {
                    for _ in 0..1000 {
                        map.set("test", 1);
                    }
                })
            })
            .collect();

        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(map.get("test"), 1);
        assert_eq!(map.stats().inserts, 1);
    }

    #[test]
    fn test_rw_locked_map_readers_share() {
        let map = RwLockedMap::new();
        map.set("k", 5);

        // Two read guards at once must not deadlock
        let first = map.inner.read();
        let second = map.inner.read();
        assert_eq!(first.get(b"k"), second.get(b"k"));
    }
}
