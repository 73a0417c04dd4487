//! Backend coordinator
//!
//! The backend owns the buffer pools, the lock and condvar, and (in
//! background mode) the writer thread. Producers call [`Backend::append`];
//! everything else is lifecycle.
//!
//! # Architecture
//!
//! ```text
//! [producer] --append--> [front pool]          (under the one mutex)
//!                             |
//!                        pool swap              (writer, under the mutex)
//!                             |
//! [writer thread] --drain--> [back pool] --write_all--> [FileSink]
//! ```
//!
//! The writer wakes when a buffer fills (condvar signal) or after the
//! flush interval, whichever comes first. It swaps the pools under the
//! lock, then rotates and writes entirely outside it — producers only ever
//! block for the duration of a memory copy.
//!
//! In direct mode there is no writer thread: `append` performs the
//! rotation check and write on the caller's thread, serialized by the same
//! mutex.

use std::mem;
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use chrono::Local;
use parking_lot::{Condvar, Mutex};
use thiserror::Error;

use crate::pool::BufferPool;
use crate::rotation::{RotationInterval, RotationPolicy};
use crate::sink::FileSink;

/// Errors surfaced by backend lifecycle operations.
///
/// `append` never fails observably; this covers `start` only.
#[derive(Debug, Error)]
pub enum BackendError {
    /// The writer thread could not be spawned. The backend stays up but
    /// has no active writer: appends buffer and nothing drains.
    #[error("failed to spawn log writer thread `{name}`")]
    ThreadSpawn {
        name: String,
        #[source]
        source: std::io::Error,
    },
}

/// Backend configuration. Every field has a default.
#[derive(Debug, Clone)]
pub struct BackendConfig {
    /// Background mode: hand lines to a writer thread. When false, writes
    /// happen on the caller's thread under the backend lock.
    pub background: bool,

    /// Output directory, created recursively before first use.
    pub dir: PathBuf,

    /// Filename prefix.
    pub prefix: String,

    /// Writer thread name.
    pub name: String,

    /// Filename suffix.
    pub suffix: String,

    /// Rotate once the active file exceeds this many bytes.
    pub rotate_size: u64,

    /// Capacity of each pool buffer in bytes.
    pub buffer_capacity: usize,

    /// Maximum time the writer waits before draining anyway.
    pub flush_interval: Duration,

    /// Rotate when the local day changes.
    pub rotate_daily: bool,

    /// Rotate when the local hour changes. Takes precedence over
    /// `rotate_daily` when both are set.
    pub rotate_hourly: bool,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            background: true,
            dir: PathBuf::from("logs"),
            prefix: "out".into(),
            name: "jot-writer".into(),
            suffix: ".log".into(),
            rotate_size: 100 * 1024 * 1024,
            buffer_capacity: 1024 * 1024,
            flush_interval: Duration::from_secs(3),
            rotate_daily: false,
            rotate_hourly: false,
        }
    }
}

impl BackendConfig {
    /// Write on the caller's thread instead of a background writer.
    #[must_use]
    pub fn direct(mut self) -> Self {
        self.background = false;
        self
    }

    /// Set the output directory.
    #[must_use]
    pub fn with_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.dir = dir.into();
        self
    }

    /// Set the filename prefix.
    #[must_use]
    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = prefix.into();
        self
    }

    /// Set the writer thread name.
    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Set the filename suffix.
    #[must_use]
    pub fn with_suffix(mut self, suffix: impl Into<String>) -> Self {
        self.suffix = suffix.into();
        self
    }

    /// Set the rotation size threshold in bytes.
    #[must_use]
    pub fn with_rotate_size(mut self, bytes: u64) -> Self {
        self.rotate_size = bytes;
        self
    }

    /// Set the per-buffer capacity in bytes.
    #[must_use]
    pub fn with_buffer_capacity(mut self, bytes: usize) -> Self {
        self.buffer_capacity = bytes;
        self
    }

    /// Set the flush interval.
    #[must_use]
    pub fn with_flush_interval(mut self, interval: Duration) -> Self {
        self.flush_interval = interval;
        self
    }

    /// Rotate hourly.
    #[must_use]
    pub fn with_hourly_rotation(mut self) -> Self {
        self.rotate_hourly = true;
        self
    }

    /// Rotate daily.
    #[must_use]
    pub fn with_daily_rotation(mut self) -> Self {
        self.rotate_daily = true;
        self
    }
}

/// Counters for backend activity.
#[derive(Debug, Default)]
pub struct BackendMetrics {
    /// Lines handed to `append`.
    pub lines_appended: AtomicU64,

    /// Bytes handed to `append`.
    pub bytes_appended: AtomicU64,

    /// Pool buffers allocated (growth, including the oversize rule).
    pub buffers_allocated: AtomicU64,

    /// Drain passes that wrote data.
    pub flush_cycles: AtomicU64,

    /// Successful file rotations.
    pub rotations: AtomicU64,

    /// Buffer or line writes dropped on sink failure.
    pub write_errors: AtomicU64,
}

impl BackendMetrics {
    pub const fn new() -> Self {
        Self {
            lines_appended: AtomicU64::new(0),
            bytes_appended: AtomicU64::new(0),
            buffers_allocated: AtomicU64::new(0),
            flush_cycles: AtomicU64::new(0),
            rotations: AtomicU64::new(0),
            write_errors: AtomicU64::new(0),
        }
    }

    #[inline]
    fn record_append(&self, bytes: u64) {
        self.lines_appended.fetch_add(1, Ordering::Relaxed);
        self.bytes_appended.fetch_add(bytes, Ordering::Relaxed);
    }

    #[inline]
    fn record_allocation(&self) {
        self.buffers_allocated.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    fn record_flush_cycle(&self) {
        self.flush_cycles.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    fn record_rotation(&self) {
        self.rotations.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    fn record_write_error(&self) {
        self.write_errors.fetch_add(1, Ordering::Relaxed);
    }

    /// Point-in-time copy of all counters.
    pub fn snapshot(&self) -> BackendMetricsSnapshot {
        BackendMetricsSnapshot {
            lines_appended: self.lines_appended.load(Ordering::Relaxed),
            bytes_appended: self.bytes_appended.load(Ordering::Relaxed),
            buffers_allocated: self.buffers_allocated.load(Ordering::Relaxed),
            flush_cycles: self.flush_cycles.load(Ordering::Relaxed),
            rotations: self.rotations.load(Ordering::Relaxed),
            write_errors: self.write_errors.load(Ordering::Relaxed),
        }
    }
}

/// Point-in-time snapshot of [`BackendMetrics`].
#[derive(Debug, Clone, Copy, Default)]
pub struct BackendMetricsSnapshot {
    pub lines_appended: u64,
    pub bytes_appended: u64,
    pub buffers_allocated: u64,
    pub flush_cycles: u64,
    pub rotations: u64,
    pub write_errors: u64,
}

/// State guarded by the backend mutex.
struct State {
    /// Pool receiving producer writes.
    front: BufferPool,

    /// Direct mode only; background writers own their sink.
    sink: Option<FileSink>,

    /// Stop requested. The writer drains once more and exits.
    stopping: bool,
}

/// Everything the producers and the writer thread share.
struct Shared {
    config: BackendConfig,
    policy: RotationPolicy,
    state: Mutex<State>,
    /// Signaled when a buffer fills, waking the writer early.
    filled: Condvar,
    metrics: BackendMetrics,
}

/// The append-only log backend.
///
/// Construct with [`BackendConfig`], call [`start`](Self::start) once for
/// background mode, hand it lines via [`append`](Self::append) from any
/// number of threads, and [`stop_and_join`](Self::stop_and_join) (or drop)
/// to flush and shut down.
pub struct Backend {
    shared: Arc<Shared>,
    started: AtomicBool,
    handle: Mutex<Option<JoinHandle<()>>>,
}

impl Backend {
    pub fn new(config: BackendConfig) -> Self {
        let policy = RotationPolicy::new(
            config.rotate_size,
            RotationInterval::from_flags(config.rotate_hourly, config.rotate_daily),
        );
        let sink = if config.background {
            None
        } else {
            Some(FileSink::new(&config.dir, &config.prefix, &config.suffix))
        };
        let state = State {
            front: BufferPool::new(config.buffer_capacity),
            sink,
            stopping: false,
        };
        Self {
            shared: Arc::new(Shared {
                config,
                policy,
                state: Mutex::new(state),
                filled: Condvar::new(),
                metrics: BackendMetrics::new(),
            }),
            started: AtomicBool::new(false),
            handle: Mutex::new(None),
        }
    }

    /// Spawn the writer thread. No-op in direct mode or when already
    /// started. On spawn failure the backend is left without an active
    /// writer; appends buffer but nothing drains.
    pub fn start(&self) -> Result<(), BackendError> {
        if !self.shared.config.background {
            return Ok(());
        }
        if self.started.swap(true, Ordering::SeqCst) {
            return Ok(());
        }

        let shared = Arc::clone(&self.shared);
        let builder = thread::Builder::new().name(self.shared.config.name.clone());
        match builder.spawn(move || shared.writer_loop()) {
            Ok(handle) => {
                *self.handle.lock() = Some(handle);
                Ok(())
            }
            Err(source) => {
                self.started.store(false, Ordering::SeqCst);
                let name = self.shared.config.name.clone();
                tracing::error!(thread = %name, error = %source, "failed to spawn log writer thread");
                Err(BackendError::ThreadSpawn { name, source })
            }
        }
    }

    /// Hand one formatted line to the backend.
    ///
    /// Never blocks on I/O and never fails observably. In background mode
    /// the line is copied into the front pool under the lock and the
    /// writer is woken if a buffer filled; the signal is best-effort — no
    /// waiter is fine. In direct mode the line goes straight to the sink.
    pub fn append(&self, line: &[u8]) {
        let shared = &*self.shared;
        let mut state = shared.state.lock();

        if let Some(sink) = state.sink.as_mut() {
            // Direct mode: rotation check, then write, on this thread.
            let now = Local::now();
            let stale =
                !sink.is_open() || shared.policy.should_rotate(sink.file_size(), sink.last_write(), now);
            if stale && sink.rotate(now) {
                shared.metrics.record_rotation();
            }
            if sink.write_all(line, now) {
                shared.metrics.record_append(line.len() as u64);
            } else {
                shared.metrics.record_write_error();
            }
            return;
        }

        let placed = state.front.push_line(line);
        drop(state);

        shared.metrics.record_append(line.len() as u64);
        if placed.allocated {
            shared.metrics.record_allocation();
        }
        if placed.marked_full {
            shared.filled.notify_one();
        }
    }

    /// Signal the writer to drain once more and exit, then join it.
    ///
    /// Idempotent: safe before `start`, after a previous stop, and from
    /// multiple callers. When it returns, every line appended before the
    /// call is on disk (background mode, writer running).
    pub fn stop_and_join(&self) {
        {
            let mut state = self.shared.state.lock();
            state.stopping = true;
        }
        self.shared.filled.notify_one();

        // Hold the handle lock across the join so concurrent callers all
        // return only once the final drain is on disk.
        let mut handle = self.handle.lock();
        if let Some(handle) = handle.take() {
            if handle.join().is_err() {
                tracing::error!("log writer thread panicked");
            }
        }
    }

    /// Backend activity counters.
    pub fn metrics(&self) -> &BackendMetrics {
        &self.shared.metrics
    }
}

impl Drop for Backend {
    fn drop(&mut self) {
        self.stop_and_join();
    }
}

impl Shared {
    /// Writer thread body: wait, swap, drain, until stop.
    fn writer_loop(&self) {
        let mut back = BufferPool::new(self.config.buffer_capacity);
        let mut sink = FileSink::new(&self.config.dir, &self.config.prefix, &self.config.suffix);

        loop {
            let mut state = self.state.lock();
            if !state.stopping {
                let _ = self.filled.wait_for(&mut state, self.config.flush_interval);
            }
            let stopping = state.stopping;
            mem::swap(&mut state.front, &mut back);
            drop(state);

            if stopping {
                self.drain(&mut back, &mut sink);
                // Keep swapping until the front pool is seen empty, so a
                // line that raced the stop signal still gets flushed.
                loop {
                    let mut state = self.state.lock();
                    if state.front.is_drained() {
                        break;
                    }
                    mem::swap(&mut state.front, &mut back);
                    drop(state);
                    self.drain(&mut back, &mut sink);
                }
                break;
            }

            if back.looks_empty() {
                // Nothing appended this cycle; skip the write phase so an
                // idle backend performs no rotation checks.
                continue;
            }
            self.drain(&mut back, &mut sink);
        }

        tracing::debug!(thread = %self.config.name, "log writer thread exiting");
    }

    /// Write every non-empty buffer of `pool` to the sink, in pool order,
    /// and reset the buffers for reuse. Rotation is decided once per call
    /// against a freshly sampled clock.
    fn drain(&self, pool: &mut BufferPool, sink: &mut FileSink) {
        if pool.is_drained() {
            return;
        }
        self.metrics.record_flush_cycle();

        let now = Local::now();
        let stale =
            !sink.is_open() || self.policy.should_rotate(sink.file_size(), sink.last_write(), now);
        if stale && sink.rotate(now) {
            self.metrics.record_rotation();
        }
        // On a failed rotation the sink stays unusable for this cycle; the
        // writes below drop and the next cycle retries.

        for buffer in pool.iter_mut() {
            if !buffer.is_empty() && !sink.write_all(buffer.bytes(), now) {
                self.metrics.record_write_error();
            }
            buffer.reuse();
        }
    }
}

#[cfg(test)]
#[path = "backend_test.rs"]
mod backend_test;
