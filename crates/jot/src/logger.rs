//! Level-filtered logging front-end
//!
//! Thin wrapper over [`Backend::append`]: a [`Logger`] formats one line
//! per call (timestamp, level, logger name, call site, message) and hands
//! the bytes to its backend — or to stdout, for loggers without one.
//!
//! The enabled level is plain state on the handle, set at construction and
//! injected wherever the handle is cloned to; there is no process-wide
//! mutable level.
//!
//! ```ignore
//! let backend = Arc::new(Backend::new(BackendConfig::default()));
//! backend.start()?;
//!
//! let log = Logger::new("ingest", Arc::clone(&backend));
//! log_info!(log, "accepted {} records", count);
//! ```

use std::fmt::{self, Write as FmtWrite};
use std::io::Write;
use std::sync::Arc;

use chrono::Local;

use crate::backend::Backend;

/// Timestamp layout on every line, microsecond precision.
const TIMESTAMP_FORMAT: &str = "%Y%m%d %H:%M:%S%.6f";

/// Severity of a log line. Ordered: a logger at `Info` drops `Debug`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Level {
    Debug,
    Info,
    Error,
    Fatal,
}

impl Level {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Debug => "DEBUG",
            Self::Info => "INFO",
            Self::Error => "ERROR",
            Self::Fatal => "FATAL",
        }
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Clone)]
enum Output {
    Backend(Arc<Backend>),
    Stdout,
}

/// A named, cloneable logging handle.
///
/// Cheap to clone; clones share the backend and keep their own name and
/// minimum level.
#[derive(Clone)]
pub struct Logger {
    name: Arc<str>,
    min_level: Level,
    output: Output,
}

impl Logger {
    /// A logger writing through `backend`.
    pub fn new(name: impl AsRef<str>, backend: Arc<Backend>) -> Self {
        Self {
            name: Arc::from(name.as_ref()),
            min_level: Level::Info,
            output: Output::Backend(backend),
        }
    }

    /// A logger writing formatted lines to stdout.
    pub fn stdout(name: impl AsRef<str>) -> Self {
        Self {
            name: Arc::from(name.as_ref()),
            min_level: Level::Info,
            output: Output::Stdout,
        }
    }

    /// Set the minimum level this handle emits.
    #[must_use]
    pub fn with_min_level(mut self, level: Level) -> Self {
        self.min_level = level;
        self
    }

    /// Logger name, included on every line.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Whether `level` passes this handle's filter. The `log_*!` macros
    /// check this before formatting anything.
    #[inline]
    pub fn enabled(&self, level: Level) -> bool {
        level >= self.min_level
    }

    /// Format one line and emit it. Called by the `log_*!` macros with the
    /// caller's `file!()` / `line!()`.
    pub fn log(&self, level: Level, file: &str, line: u32, args: fmt::Arguments<'_>) {
        if !self.enabled(level) {
            return;
        }
        let mut buf = String::with_capacity(128);
        format_line(&mut buf, &self.name, level, file, line, args);
        match &self.output {
            Output::Backend(backend) => backend.append(buf.as_bytes()),
            Output::Stdout => {
                let stdout = std::io::stdout();
                let _ = stdout.lock().write_all(buf.as_bytes());
            }
        }
    }
}

/// `{timestamp} {LEVEL} {name} {file}({line}) # {message}\n`
fn format_line(
    buf: &mut String,
    name: &str,
    level: Level,
    file: &str,
    line: u32,
    args: fmt::Arguments<'_>,
) {
    let now = Local::now();
    let _ = writeln!(
        buf,
        "{} {:<5} {} {}({}) # {}",
        now.format(TIMESTAMP_FORMAT),
        level.as_str(),
        name,
        file,
        line,
        args,
    );
}

/// Log at [`Level::Debug`] through a [`Logger`] handle.
#[macro_export]
macro_rules! log_debug {
    ($logger:expr, $($arg:tt)*) => {
        if $logger.enabled($crate::Level::Debug) {
            $logger.log($crate::Level::Debug, file!(), line!(), format_args!($($arg)*));
        }
    };
}

/// Log at [`Level::Info`] through a [`Logger`] handle.
#[macro_export]
macro_rules! log_info {
    ($logger:expr, $($arg:tt)*) => {
        if $logger.enabled($crate::Level::Info) {
            $logger.log($crate::Level::Info, file!(), line!(), format_args!($($arg)*));
        }
    };
}

/// Log at [`Level::Error`] through a [`Logger`] handle.
#[macro_export]
macro_rules! log_error {
    ($logger:expr, $($arg:tt)*) => {
        if $logger.enabled($crate::Level::Error) {
            $logger.log($crate::Level::Error, file!(), line!(), format_args!($($arg)*));
        }
    };
}

/// Log at [`Level::Fatal`] through a [`Logger`] handle.
#[macro_export]
macro_rules! log_fatal {
    ($logger:expr, $($arg:tt)*) => {
        if $logger.enabled($crate::Level::Fatal) {
            $logger.log($crate::Level::Fatal, file!(), line!(), format_args!($($arg)*));
        }
    };
}

#[cfg(test)]
#[path = "logger_test.rs"]
mod logger_test;
