//! Rotating file sink
//!
//! Owns the current output file and nothing else: the backend decides
//! *when* to rotate (see [`RotationPolicy`](crate::rotation::RotationPolicy))
//! and the sink carries it out. Failures are reported on the diagnostic
//! channel (`tracing`, which the host process points at stderr) and never
//! reach a producer — after a failed open the sink simply drops writes
//! until the next rotation succeeds.

use std::fs::{self, File};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use chrono::{DateTime, Local};

/// Timestamp component of rotated file names. Zero-padded so names sort in
/// rotation order.
const STAMP_FORMAT: &str = "%Y%m%d-%H%M%S";

/// Owns at most one open output file, replaced on rotation and closed
/// exactly once when dropped (or replaced).
///
/// `file` is `None` before the first rotation and after a failed open —
/// the unusable-descriptor state. Writes against it are dropped.
#[derive(Debug)]
pub struct FileSink {
    dir: PathBuf,
    prefix: String,
    suffix: String,
    file: Option<File>,
    /// Bytes written to the current file.
    written: u64,
    /// Time of the last successful write, for the time-rotation bucket.
    last_write: Option<DateTime<Local>>,
    last_stamp: String,
    sequence: u32,
}

impl FileSink {
    pub fn new(dir: impl Into<PathBuf>, prefix: impl Into<String>, suffix: impl Into<String>) -> Self {
        Self {
            dir: dir.into(),
            prefix: prefix.into(),
            suffix: suffix.into(),
            file: None,
            written: 0,
            last_write: None,
            last_stamp: String::new(),
            sequence: 0,
        }
    }

    /// Whether a usable file is open.
    #[inline]
    pub fn is_open(&self) -> bool {
        self.file.is_some()
    }

    /// Byte length of the current file.
    #[inline]
    pub fn file_size(&self) -> u64 {
        self.written
    }

    /// Time of the last successful write to the current file.
    #[inline]
    pub fn last_write(&self) -> Option<DateTime<Local>> {
        self.last_write
    }

    /// Path the next rotation at `stamp` would open. Rotations landing on
    /// the same stamp get a numeric sequence before the suffix.
    fn next_path(&mut self, stamp: &str) -> PathBuf {
        if stamp == self.last_stamp {
            self.sequence += 1;
        } else {
            self.last_stamp = stamp.to_owned();
            self.sequence = 0;
        }
        let name = if self.sequence == 0 {
            format!("{}.{}{}", self.prefix, stamp, self.suffix)
        } else {
            format!("{}.{}.{}{}", self.prefix, stamp, self.sequence, self.suffix)
        };
        self.dir.join(name)
    }

    /// Close the current file and open a fresh one named for `now`.
    ///
    /// Creates the output directory recursively on first use. On failure
    /// the sink is left unusable (writes drop) until the next rotation;
    /// returns whether the sink is usable afterwards.
    pub fn rotate(&mut self, now: DateTime<Local>) -> bool {
        // Replacing the handle closes the previous file.
        self.file = None;
        self.written = 0;
        self.last_write = None;

        let stamp = now.format(STAMP_FORMAT).to_string();
        let path = self.next_path(&stamp);

        if let Err(e) = fs::create_dir_all(&self.dir) {
            tracing::error!(dir = %self.dir.display(), error = %e, "failed to create log directory");
            return false;
        }

        match File::create(&path) {
            Ok(file) => {
                tracing::debug!(path = %path.display(), "rotated to new log file");
                self.file = Some(file);
                true
            }
            Err(e) => {
                tracing::error!(path = %path.display(), error = %e, "failed to open log file");
                false
            }
        }
    }

    /// Write `bytes` in full to the current file.
    ///
    /// Interrupted system calls are retried transparently. Any other error
    /// is reported and the remaining bytes of this call are abandoned; the
    /// producer never sees it. Returns whether every byte made it out, for
    /// metrics only.
    pub fn write_all(&mut self, bytes: &[u8], now: DateTime<Local>) -> bool {
        let Some(file) = self.file.as_mut() else {
            // Unusable since the last failed rotation; drop silently.
            return false;
        };

        let mut remaining = bytes;
        while !remaining.is_empty() {
            match file.write(remaining) {
                Ok(0) => {
                    tracing::error!(path = %self.dir.display(), "log file refused writes");
                    return false;
                }
                Ok(n) => {
                    self.written += n as u64;
                    self.last_write = Some(now);
                    remaining = &remaining[n..];
                }
                Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                Err(e) => {
                    tracing::error!(error = %e, dropped = remaining.len(), "log write failed");
                    return false;
                }
            }
        }
        true
    }

    /// Output directory.
    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

#[cfg(test)]
#[path = "sink_test.rs"]
mod sink_test;
