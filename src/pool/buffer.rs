//! Checked-out pool buffers

use super::PoolShared;
use bytes::{BufMut, BytesMut};
use std::ops::{Deref, DerefMut};
use std::sync::atomic::Ordering;
use std::sync::Arc;

/// A buffer currently checked out of a [`BufferPool`](super::BufferPool)
///
/// Holding one means the buffer is in the `CheckedOut` state and owned
/// exclusively by the holder. Dropping it (or calling [`release`]) moves it
/// back to `Free`.
///
/// [`release`]: PooledBuffer::release
pub struct PooledBuffer {
    buf: BytesMut,
    pool: Arc<PoolShared>,
}

impl PooledBuffer {
    pub(super) fn new(buf: BytesMut, pool: Arc<PoolShared>) -> Self {
        PooledBuffer { buf, pool }
    }

    /// Drop the logical contents, keeping the capacity
    pub fn reset(&mut self) {
        self.buf.clear();
    }

    /// Append `payload`, recording a new allocation if the buffer had to grow
    pub fn write_payload(&mut self, payload: &[u8]) {
        let before = self.buf.capacity();
        self.buf.put_slice(payload);

        let after = self.buf.capacity();
        if after > before {
            self.pool.tracker.record(after);
        }
    }

    /// Return the buffer to its pool
    pub fn release(self) {
        drop(self);
    }
}

impl Deref for PooledBuffer {
    type Target = BytesMut;

    fn deref(&self) -> &BytesMut {
        &self.buf
    }
}

impl DerefMut for PooledBuffer {
    fn deref_mut(&mut self) -> &mut BytesMut {
        &mut self.buf
    }
}

impl Drop for PooledBuffer {
    fn drop(&mut self) {
        // An empty BytesMut owns no heap memory
        let buf = std::mem::take(&mut self.buf);
        self.pool.free.lock().push(buf);
        self.pool.checked_out.fetch_sub(1, Ordering::Relaxed);
    }
}

impl std::fmt::Debug for PooledBuffer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PooledBuffer")
            .field("len", &self.len())
            .field("capacity", &self.capacity())
            .finish()
    }
}
