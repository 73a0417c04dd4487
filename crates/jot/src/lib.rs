//! Jot - low-latency append-only log sink
//!
//! Application threads hand formatted lines to a background writer that
//! batches them into rotating files, decoupling producer latency from disk
//! latency. Producers never block on I/O; they briefly take one lock for a
//! memory copy.
//!
//! # Architecture
//!
//! ```text
//! [Logger] --append--> [Backend: front pool | back pool] --drain--> [FileSink]
//!                            mutex + condvar    writer thread        rotating files
//! ```
//!
//! Two buffer pools trade places under the backend's lock: producers fill
//! the front pool, the writer thread drains the back one. A buffer filling
//! up wakes the writer early; otherwise it drains on the flush interval.
//! Files rotate by size and, optionally, when the local hour or day
//! changes.
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use jot::{Backend, BackendConfig, Logger, log_info};
//!
//! let backend = Arc::new(Backend::new(
//!     BackendConfig::default()
//!         .with_dir("logs")
//!         .with_prefix("app")
//!         .with_hourly_rotation(),
//! ));
//! backend.start()?;
//!
//! let log = Logger::new("main", Arc::clone(&backend));
//! log_info!(log, "service up");
//!
//! backend.stop_and_join(); // flushes everything appended so far
//! # Ok::<(), jot::BackendError>(())
//! ```
//!
//! # Delivery guarantees
//!
//! Lines appended under the lock reach the file in that order. Everything
//! appended before `stop_and_join` returns is on disk afterwards. Lines
//! sitting in unflushed buffers are lost on crash or abrupt termination —
//! the accepted price of never blocking a producer.

/// Fixed-capacity append buffer.
pub mod buffer;

/// Ordered buffer pool and producer-side line placement.
pub mod pool;

/// Size/time rotation policy.
pub mod rotation;

/// Rotating file sink.
pub mod sink;

/// Backend coordinator: pools, writer thread, lifecycle.
pub mod backend;

/// Level-filtered logging front-end.
pub mod logger;

pub use backend::{Backend, BackendConfig, BackendError, BackendMetrics, BackendMetricsSnapshot};
pub use buffer::Buffer;
pub use logger::{Level, Logger};
pub use pool::BufferPool;
pub use rotation::{RotationInterval, RotationPolicy};
pub use sink::FileSink;
