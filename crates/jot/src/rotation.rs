//! File rotation policy
//!
//! Decides when the active output file must be replaced, combining a size
//! threshold with an optional calendar granularity. The decision is made
//! once per flush cycle against a freshly sampled wall-clock time — caching
//! the time would let a long-idle backend starve rotation.

use chrono::{DateTime, Datelike, Local, Timelike};

/// Calendar granularity for time-based rotation.
///
/// Exactly one granularity is active per backend. When both config flags
/// are set, hourly wins; when neither is set, files only rotate by size.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RotationInterval {
    /// Never rotate on time.
    Never,
    /// Rotate when the local hour changes.
    Hourly,
    /// Rotate when the local day changes.
    Daily,
}

impl RotationInterval {
    /// Derive the interval from the two config flags. Hourly takes
    /// precedence when both are set.
    pub fn from_flags(hourly: bool, daily: bool) -> Self {
        if hourly {
            Self::Hourly
        } else if daily {
            Self::Daily
        } else {
            Self::Never
        }
    }

    /// Absolute bucket index for `t`: days-from-epoch, scaled to hours for
    /// hourly rotation. Minutes and seconds are always dropped; the hour is
    /// dropped too when rotating daily.
    fn bucket(&self, t: DateTime<Local>) -> Option<i64> {
        let days = i64::from(t.num_days_from_ce());
        match self {
            Self::Never => None,
            Self::Hourly => Some(days * 24 + i64::from(t.hour())),
            Self::Daily => Some(days),
        }
    }

    /// Whether `now` has moved past the bucket `last` was written in.
    ///
    /// Strictly greater: the comparison is monotonic, so a wall-clock
    /// rewind never rotates.
    pub fn needs_rotation(&self, last: DateTime<Local>, now: DateTime<Local>) -> bool {
        match (self.bucket(last), self.bucket(now)) {
            (Some(last), Some(now)) => now > last,
            _ => false,
        }
    }
}

/// Combined size/time rotation decision for one backend.
#[derive(Debug, Clone)]
pub struct RotationPolicy {
    size_limit: u64,
    interval: RotationInterval,
}

impl RotationPolicy {
    pub fn new(size_limit: u64, interval: RotationInterval) -> Self {
        Self {
            size_limit,
            interval,
        }
    }

    /// Size threshold in bytes.
    #[inline]
    pub fn size_limit(&self) -> u64 {
        self.size_limit
    }

    /// Active calendar granularity.
    #[inline]
    pub fn interval(&self) -> RotationInterval {
        self.interval
    }

    /// Whether the active file's byte length exceeds the limit.
    #[inline]
    pub fn needs_rotation_by_size(&self, file_size: u64) -> bool {
        file_size > self.size_limit
    }

    /// Full decision for one flush cycle. `last_write` is `None` until the
    /// file has been written to, which never triggers a time rotation on
    /// its own.
    pub fn should_rotate(
        &self,
        file_size: u64,
        last_write: Option<DateTime<Local>>,
        now: DateTime<Local>,
    ) -> bool {
        if self.needs_rotation_by_size(file_size) {
            return true;
        }
        match last_write {
            Some(last) => self.interval.needs_rotation(last, now),
            None => false,
        }
    }
}

#[cfg(test)]
#[path = "rotation_test.rs"]
mod rotation_test;
