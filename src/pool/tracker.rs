//! Allocation accounting
//!
//! Every path that hands out a new buffer reports it here, which makes the
//! reuse benefit observable without hooking the global allocator.

use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};

/// Running allocation counters, shared by reference between tasks
#[derive(Debug, Default)]
pub struct AllocTracker {
    allocations: AtomicU64,
    bytes: AtomicU64,
}

impl AllocTracker {
    /// Create a tracker with zeroed counters
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one allocation of `bytes`
    pub fn record(&self, bytes: usize) {
        self.allocations.fetch_add(1, Ordering::Relaxed);
        self.bytes.fetch_add(bytes as u64, Ordering::Relaxed);
    }

    /// Fold counts gathered locally by one worker into the totals
    pub fn add(&self, local: AllocStats) {
        self.allocations.fetch_add(local.allocations, Ordering::Relaxed);
        self.bytes.fetch_add(local.bytes, Ordering::Relaxed);
    }

    /// Current totals
    pub fn snapshot(&self) -> AllocStats {
        AllocStats {
            allocations: self.allocations.load(Ordering::Relaxed),
            bytes: self.bytes.load(Ordering::Relaxed),
        }
    }
}

/// Allocation totals at one point in time
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct AllocStats {
    /// Number of allocations
    pub allocations: u64,
    /// Bytes requested across those allocations
    pub bytes: u64,
}

impl AllocStats {
    /// Record one allocation of `bytes` on this local tally
    pub fn record(&mut self, bytes: usize) {
        self.allocations += 1;
        self.bytes += bytes as u64;
    }

    /// Counters accumulated since `earlier`
    pub fn since(&self, earlier: &AllocStats) -> AllocStats {
        AllocStats {
            allocations: self.allocations.saturating_sub(earlier.allocations),
            bytes: self.bytes.saturating_sub(earlier.bytes),
        }
    }
}
