//! Load generator for the jot backend
//!
//! Hammers a backend with formatted lines from N producer threads, then
//! stops and reports throughput.
//!
//! Usage:
//!   cargo run --release -p jot-bench --bin stress
//!   cargo run --release -p jot-bench --bin stress -- --threads 8 --lines 400000
//!
//! Diagnostics (rotation failures, writer lifecycle) go to stderr via
//! `RUST_LOG`; the generated log stream goes to `--dir`.

use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use anyhow::Result;
use clap::Parser;
use jot::{Backend, BackendConfig, Logger, log_info};
use tracing_subscriber::EnvFilter;

/// Load generator configuration
#[derive(Parser, Debug)]
#[command(name = "stress", about = "jot log sink load generator")]
struct Args {
    /// Output directory
    #[arg(short, long, default_value = "logs")]
    dir: std::path::PathBuf,

    /// Number of producer threads
    #[arg(short, long, default_value = "4")]
    threads: usize,

    /// Lines per producer
    #[arg(short, long, default_value = "100000")]
    lines: u64,

    /// Payload bytes per line (on top of the formatted header)
    #[arg(short, long, default_value = "128")]
    payload: usize,

    /// Per-buffer capacity in KiB
    #[arg(long, default_value = "1024")]
    buffer_kib: usize,

    /// Rotation size limit in MiB
    #[arg(long, default_value = "100")]
    rotate_mib: u64,

    /// Flush interval in milliseconds
    #[arg(long, default_value = "3000")]
    flush_ms: u64,

    /// Write on the producer threads instead of the background writer
    #[arg(long)]
    direct: bool,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    let mut config = BackendConfig::default()
        .with_dir(args.dir.clone())
        .with_prefix("stress")
        .with_buffer_capacity(args.buffer_kib * 1024)
        .with_rotate_size(args.rotate_mib * 1024 * 1024)
        .with_flush_interval(Duration::from_millis(args.flush_ms));
    if args.direct {
        config = config.direct();
    }

    let backend = Arc::new(Backend::new(config));
    backend.start()?;

    let payload = "x".repeat(args.payload);
    let start = Instant::now();

    let mut handles = Vec::with_capacity(args.threads);
    for t in 0..args.threads {
        let log = Logger::new(format!("producer-{t}"), Arc::clone(&backend));
        let payload = payload.clone();
        let lines = args.lines;
        handles.push(thread::spawn(move || {
            for i in 0..lines {
                log_info!(log, "{i} {payload}");
            }
        }));
    }
    for handle in handles {
        handle.join().expect("producer thread panicked");
    }
    let produced = start.elapsed();

    backend.stop_and_join();
    let total = start.elapsed();

    let snapshot = backend.metrics().snapshot();
    let mib = snapshot.bytes_appended as f64 / (1024.0 * 1024.0);
    println!(
        "appended {} lines ({:.1} MiB) from {} threads",
        snapshot.lines_appended, mib, args.threads
    );
    println!(
        "produce: {:.2}s ({:.0} lines/s, {:.1} MiB/s)",
        produced.as_secs_f64(),
        snapshot.lines_appended as f64 / produced.as_secs_f64(),
        mib / produced.as_secs_f64()
    );
    println!(
        "drained after {:.2}s ({} buffers allocated, {} rotations, {} write errors)",
        total.as_secs_f64(),
        snapshot.buffers_allocated,
        snapshot.rotations,
        snapshot.write_errors
    );

    Ok(())
}
