//! Buffer pooling
//!
//! An unbounded pool of reusable byte buffers plus the plain-allocation
//! baseline it is measured against. Pools are constructed explicitly and
//! shared by cloning the handle; there is no process-wide pool.

mod buffer;
mod tracker;

pub use buffer::PooledBuffer;
pub use tracker::{AllocStats, AllocTracker};

use bytes::BytesMut;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tracing::debug;

/// Builds a new buffer when the pool is empty
pub type BufferFactory = Box<dyn Fn() -> BytesMut + Send + Sync>;

/// How each benchmark iteration obtains its buffer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AllocationStrategy {
    /// Allocate a new buffer every iteration and discard it
    FreshAllocation,
    /// Check a buffer out of a shared pool and return it afterwards
    PooledReuse,
}

impl AllocationStrategy {
    /// Both strategies, in report order
    pub const ALL: [AllocationStrategy; 2] = [
        AllocationStrategy::FreshAllocation,
        AllocationStrategy::PooledReuse,
    ];

    /// Name used in reports
    pub fn as_str(&self) -> &'static str {
        match self {
            AllocationStrategy::FreshAllocation => "fresh_allocation",
            AllocationStrategy::PooledReuse => "pooled_reuse",
        }
    }
}

impl fmt::Display for AllocationStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Allocate a buffer outside any pool, recording it on a local tally
pub fn allocate_fresh(capacity: usize, tally: &mut AllocStats) -> BytesMut {
    tally.record(capacity);
    BytesMut::with_capacity(capacity)
}

/// State shared between a pool handle and its checked-out buffers
pub(crate) struct PoolShared {
    /// Buffers in the `Free` state, reused LIFO
    free: Mutex<Vec<BytesMut>>,
    factory: BufferFactory,
    tracker: Arc<AllocTracker>,
    created: AtomicUsize,
    checked_out: AtomicUsize,
}

/// Unbounded pool of reusable buffers
///
/// Cloning the pool clones the handle, not the buffers. Any clone may
/// reuse a buffer returned through any other clone.
#[derive(Clone)]
pub struct BufferPool {
    shared: Arc<PoolShared>,
}

impl BufferPool {
    /// Create a pool whose factory allocates `capacity`-byte buffers
    pub fn new(capacity: usize, tracker: Arc<AllocTracker>) -> Self {
        Self::with_factory(Box::new(move || BytesMut::with_capacity(capacity)), tracker)
    }

    /// Create a pool with a custom buffer factory
    pub fn with_factory(factory: BufferFactory, tracker: Arc<AllocTracker>) -> Self {
        BufferPool {
            shared: Arc::new(PoolShared {
                free: Mutex::new(Vec::new()),
                factory,
                tracker,
                created: AtomicUsize::new(0),
                checked_out: AtomicUsize::new(0),
            }),
        }
    }

    /// Check a buffer out of the pool
    ///
    /// Reuses a free buffer when one is available, otherwise builds one with
    /// the factory. The returned buffer always has length zero.
    pub fn acquire(&self) -> PooledBuffer {
        let reused = self.shared.free.lock().pop();

        let mut buf = match reused {
            Some(buf) => buf,
            None => self.create(),
        };
        buf.clear();

        self.shared.checked_out.fetch_add(1, Ordering::Relaxed);
        PooledBuffer::new(buf, self.shared.clone())
    }

    fn create(&self) -> BytesMut {
        let buf = (self.shared.factory)();
        self.shared.tracker.record(buf.capacity());

        let created = self.shared.created.fetch_add(1, Ordering::Relaxed) + 1;
        debug!("Buffer pool grew to {} buffers", created);
        buf
    }

    /// Counters describing the pool right now
    pub fn stats(&self) -> PoolStats {
        PoolStats {
            free: self.shared.free.lock().len(),
            checked_out: self.shared.checked_out.load(Ordering::Relaxed),
            created: self.shared.created.load(Ordering::Relaxed),
        }
    }

    /// Tracker this pool reports allocations to
    pub fn tracker(&self) -> &Arc<AllocTracker> {
        &self.shared.tracker
    }
}

impl fmt::Debug for BufferPool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BufferPool").field("stats", &self.stats()).finish()
    }
}

/// Statistics about a buffer pool
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct PoolStats {
    /// Buffers sitting in the pool
    pub free: usize,
    /// Buffers currently held by callers
    pub checked_out: usize,
    /// Buffers ever built by the factory
    pub created: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pool() -> BufferPool {
        BufferPool::new(100, Arc::new(AllocTracker::new()))
    }

    #[test]
    fn test_acquire_release_reuses_buffer() {
        let pool = pool();

        let mut buf = pool.acquire();
        buf.write_payload(b"hello world!");
        buf.release();

        let buf = pool.acquire();
        assert!(buf.is_empty());
        assert!(buf.capacity() >= 100);
        drop(buf);

        assert_eq!(pool.stats(), PoolStats { free: 1, checked_out: 0, created: 1 });
        assert_eq!(pool.tracker().snapshot().allocations, 1);
    }

    #[test]
    fn test_concurrent_checkouts_grow_pool() {
        let pool = pool();

        let first = pool.acquire();
        let second = pool.acquire();
        assert_eq!(pool.stats().checked_out, 2);

        drop(first);
        drop(second);
        assert_eq!(pool.stats(), PoolStats { free: 2, checked_out: 0, created: 2 });
    }

    #[test]
    fn test_stale_content_is_cleared() {
        let pool = BufferPool::with_factory(
            Box::new(|| {
                let mut buf = BytesMut::with_capacity(32);
                buf.extend_from_slice(b"stale");
                buf
            }),
            Arc::new(AllocTracker::new()),
        );

        let mut buf = pool.acquire();
        assert!(buf.is_empty());

        buf.write_payload(b"abc");
        assert_eq!(&buf[..], b"abc");
        buf.reset();
        assert!(buf.is_empty());
    }

    #[test]
    fn test_buffer_returned_from_other_thread_is_reused() {
        let pool = pool();
        let buf = pool.acquire();

        std::thread::spawn(move || drop(buf)).join().unwrap();

        let _again = pool.acquire();
        assert_eq!(pool.stats().created, 1);
    }

    #[test]
    fn test_growth_past_capacity_is_recorded() {
        let pool = BufferPool::new(4, Arc::new(AllocTracker::new()));

        let mut buf = pool.acquire();
        buf.write_payload(b"longer than four bytes");

        assert_eq!(pool.tracker().snapshot().allocations, 2);
    }

    #[test]
    fn test_allocate_fresh_records() {
        let mut tally = AllocStats::default();
        let buf = allocate_fresh(100, &mut tally);

        assert!(buf.capacity() >= 100);
        assert_eq!(tally, AllocStats { allocations: 1, bytes: 100 });
    }
}
