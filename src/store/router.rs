//! Key routing logic for sharding
//!
//! Routes keys to shards using SipHash-1-3.

use siphasher::sip::SipHasher13;
use std::hash::Hasher;

/// Routes keys to shards using a stable hash
#[derive(Debug, Clone)]
pub struct ShardRouter {
    num_shards: usize,
}

impl ShardRouter {
    /// Create a new shard router
    pub fn new(num_shards: usize) -> Self {
        assert!(num_shards > 0, "Number of shards must be > 0");
        ShardRouter { num_shards }
    }

    /// Route a key to a shard index
    pub fn route_key(&self, key: &[u8]) -> usize {
        let hash = self.hash_key(key);
        (hash % self.num_shards as u64) as usize
    }

    /// Hash a key using SipHash13
    fn hash_key(&self, key: &[u8]) -> u64 {
        let mut hasher = SipHasher13::new();
        hasher.write(key);
        hasher.finish()
    }

    /// Get the number of shards
    pub fn num_shards(&self) -> usize {
        self.num_shards
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_same_key_same_shard_across_routers() {
        let a = ShardRouter::new(16);
        let b = ShardRouter::new(16);

        for i in 0..100 {
            let key = format!("session:{}", i);
            assert_eq!(a.route_key(key.as_bytes()), b.route_key(key.as_bytes()));
        }
    }

    #[test]
    fn test_routes_stay_in_range_and_reach_every_shard() {
        for num_shards in [1, 2, 3, 7, 16] {
            let router = ShardRouter::new(num_shards);
            let mut hit = vec![false; num_shards];

            for i in 0..2000 {
                let key = format!("key_{}", i);
                let shard = router.route_key(key.as_bytes());
                assert!(shard < num_shards);
                hit[shard] = true;
            }

            assert!(hit.iter().all(|&h| h), "unused shard with {} shards", num_shards);
        }
    }

    #[test]
    fn test_distribution_is_roughly_even() {
        let router = ShardRouter::new(4);
        let mut shard_counts = vec![0; 4];

        for i in 0..1000 {
            let key = format!("key_{}", i);
            shard_counts[router.route_key(key.as_bytes())] += 1;
        }

        for count in shard_counts {
            assert!(count > 180 && count < 320, "Uneven distribution: {}", count);
        }
    }

    #[test]
    fn test_empty_key_routes() {
        let router = ShardRouter::new(5);
        assert!(router.route_key(b"") < 5);
    }

    #[test]
    #[should_panic(expected = "Number of shards must be > 0")]
    fn test_zero_shards_rejected() {
        ShardRouter::new(0);
    }
}
