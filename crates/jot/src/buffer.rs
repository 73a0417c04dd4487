//! Fixed-capacity append buffer
//!
//! A `Buffer` is one slot of a [`BufferPool`](crate::pool::BufferPool): an
//! owned byte region that accumulates whole log lines until the pool marks
//! it full and the writer thread drains it. The region is allocated once
//! and reused across drain cycles; it is never shrunk.
//!
//! A buffer carries no synchronization of its own. Every access goes
//! through the backend's lock (producer side) or happens after the pool
//! swap transferred the buffer to the writer thread (drain side).

use bytes::BytesMut;

/// An owned byte region with a logical capacity and an explicit full flag.
///
/// The flag is distinct from `len() == capacity()`: a buffer is marked full
/// as soon as an append would not fit, even if bytes remain unused, so the
/// producer scan never revisits it until `reuse`.
#[derive(Debug)]
pub struct Buffer {
    data: BytesMut,
    capacity: usize,
    full: bool,
}

impl Buffer {
    /// Allocate a buffer with the given logical capacity.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            data: BytesMut::with_capacity(capacity),
            capacity,
            full: false,
        }
    }

    /// Logical capacity in bytes. Fixed for the lifetime of the buffer.
    #[inline]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Bytes written so far (the write offset).
    #[inline]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Whether nothing has been appended since the last `reuse`.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Remaining room: `capacity - len`.
    #[inline]
    pub fn rest(&self) -> usize {
        self.capacity - self.data.len()
    }

    /// Whether this buffer has been marked full.
    #[inline]
    pub fn full(&self) -> bool {
        self.full
    }

    /// Mark the buffer full. Cleared only by `reuse`.
    #[inline]
    pub fn mark_full(&mut self) {
        self.full = true;
    }

    /// Copy `bytes` onto the tail, advancing the write offset.
    ///
    /// The caller must have verified `rest() >= bytes.len()` first; the
    /// pool's placement logic is the only caller.
    #[inline]
    pub fn append(&mut self, bytes: &[u8]) {
        debug_assert!(self.rest() >= bytes.len());
        self.data.extend_from_slice(bytes);
    }

    /// The accumulated bytes, in append order.
    #[inline]
    pub fn bytes(&self) -> &[u8] {
        &self.data
    }

    /// Reset the write offset and clear the full flag.
    ///
    /// Does not reallocate; the region is reused as-is for the next cycle.
    pub fn reuse(&mut self) {
        self.data.clear();
        self.full = false;
    }
}

#[cfg(test)]
#[path = "buffer_test.rs"]
mod buffer_test;
