//! Ordered buffer pool and the producer-side line placement
//!
//! Two pools exist per backend: the front pool receives producer writes
//! under the backend's lock, the back pool is drained by the writer thread.
//! They trade places wholesale via `mem::swap` — the swap is the only point
//! where buffer contents change hands between threads.
//!
//! Insertion order is write order: the sink replays buffers front to back,
//! so everything appended under the lock comes out of the file in the order
//! it went in.

use crate::buffer::Buffer;

/// Outcome of placing one line into the pool.
#[derive(Debug, Clone, Copy, Default)]
pub struct Placed {
    /// A buffer was marked full; the caller should wake the writer.
    pub marked_full: bool,
    /// A new buffer had to be allocated.
    pub allocated: bool,
}

/// An ordered sequence of [`Buffer`]s, grown on demand and reused after
/// each drain.
///
/// At most the last buffer is non-full from the producer's perspective:
/// `push_line` fills front to back and marks a buffer full before ever
/// moving past it.
#[derive(Debug)]
pub struct BufferPool {
    buffers: Vec<Buffer>,
    buffer_capacity: usize,
}

impl BufferPool {
    /// Create an empty pool. Buffers are allocated on first use.
    pub fn new(buffer_capacity: usize) -> Self {
        Self {
            buffers: Vec::new(),
            buffer_capacity,
        }
    }

    /// Configured capacity for buffers allocated by this pool.
    #[inline]
    pub fn buffer_capacity(&self) -> usize {
        self.buffer_capacity
    }

    /// Number of buffers currently in the pool.
    #[inline]
    pub fn len(&self) -> usize {
        self.buffers.len()
    }

    /// Whether the pool holds no buffers at all.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.buffers.is_empty()
    }

    /// Cheap emptiness check: inspects only the first buffer.
    ///
    /// Producers fill in order, so an empty head buffer means nothing was
    /// appended this cycle. This is a heuristic, not a proof — shutdown
    /// paths that must not lose data use [`is_drained`](Self::is_drained).
    #[inline]
    pub fn looks_empty(&self) -> bool {
        self.buffers.first().is_none_or(|b| b.is_empty())
    }

    /// Strict emptiness: every buffer in the pool is empty.
    pub fn is_drained(&self) -> bool {
        self.buffers.iter().all(|b| b.is_empty())
    }

    /// Buffer at `index`. Panics on out-of-range; indices come from
    /// [`first_available`](Self::first_available) / [`grow_for`](Self::grow_for).
    #[inline]
    pub fn get_mut(&mut self, index: usize) -> &mut Buffer {
        &mut self.buffers[index]
    }

    /// Index of the first buffer not marked full, scanning from the front.
    pub fn first_available(&self) -> Option<usize> {
        self.buffers.iter().position(|b| !b.full())
    }

    /// Append a fresh buffer sized for `line_len` and return its index.
    ///
    /// The capacity is `max(configured, 2 * line_len)`: a line longer than
    /// the configured buffer size always gets a buffer it fits in, so no
    /// line is ever rejected.
    pub fn grow_for(&mut self, line_len: usize) -> usize {
        let capacity = self.buffer_capacity.max(line_len * 2);
        self.buffers.push(Buffer::with_capacity(capacity));
        self.buffers.len() - 1
    }

    /// Place one line into the pool. Runs under the backend's lock.
    ///
    /// Scans from the front for a buffer with room, marking exhausted
    /// buffers full along the way, and allocates (oversize rule) when the
    /// tail runs out. Returns what happened so the caller can signal the
    /// writer and count allocations.
    pub fn push_line(&mut self, line: &[u8]) -> Placed {
        let mut placed = Placed::default();
        loop {
            let index = match self.first_available() {
                Some(index) => index,
                None => {
                    placed.allocated = true;
                    self.grow_for(line.len())
                }
            };
            let last = index + 1 == self.buffers.len();
            let buffer = &mut self.buffers[index];

            if buffer.rest() > line.len() {
                buffer.append(line);
                return placed;
            }

            buffer.mark_full();
            placed.marked_full = true;
            if last {
                placed.allocated = true;
                let index = self.grow_for(line.len());
                self.buffers[index].append(line);
                return placed;
            }
            // A later buffer may still have room; rescan.
        }
    }

    /// Iterate buffers in write order.
    pub fn iter(&self) -> impl Iterator<Item = &Buffer> {
        self.buffers.iter()
    }

    /// Iterate buffers mutably in write order (drain side).
    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Buffer> {
        self.buffers.iter_mut()
    }

    /// Reset every buffer for reuse after its contents were written out.
    pub fn reset(&mut self) {
        for buffer in &mut self.buffers {
            buffer.reuse();
        }
    }
}

#[cfg(test)]
#[path = "pool_test.rs"]
mod pool_test;
