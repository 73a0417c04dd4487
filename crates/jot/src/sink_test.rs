//! Tests for the rotating file sink

use std::fs;

use chrono::{DateTime, Local, TimeZone};
use tempfile::TempDir;

use crate::sink::FileSink;

fn at(h: u32, mi: u32, s: u32) -> DateTime<Local> {
    Local.with_ymd_and_hms(2026, 8, 7, h, mi, s).unwrap()
}

fn file_names(dir: &TempDir) -> Vec<String> {
    let mut names: Vec<String> = fs::read_dir(dir.path())
        .unwrap()
        .map(|e| e.unwrap().file_name().into_string().unwrap())
        .collect();
    names.sort();
    names
}

#[test]
fn test_new_sink_is_closed() {
    let sink = FileSink::new("unused", "out", ".log");

    assert!(!sink.is_open());
    assert_eq!(sink.file_size(), 0);
    assert!(sink.last_write().is_none());
}

#[test]
fn test_rotate_opens_named_file() {
    let dir = TempDir::new().unwrap();
    let mut sink = FileSink::new(dir.path(), "out", ".log");

    assert!(sink.rotate(at(12, 30, 45)));
    assert!(sink.is_open());

    assert_eq!(file_names(&dir), vec!["out.20260807-123045.log"]);
}

#[test]
fn test_rotate_creates_directory_recursively() {
    let dir = TempDir::new().unwrap();
    let nested = dir.path().join("a").join("b");
    let mut sink = FileSink::new(&nested, "out", ".log");

    assert!(sink.rotate(at(1, 0, 0)));
    assert!(nested.join("out.20260807-010000.log").exists());
}

#[test]
fn test_same_stamp_rotations_get_sequence_numbers() {
    let dir = TempDir::new().unwrap();
    let mut sink = FileSink::new(dir.path(), "out", ".log");
    let now = at(12, 0, 0);

    assert!(sink.rotate(now));
    assert!(sink.rotate(now));
    assert!(sink.rotate(now));

    assert_eq!(
        file_names(&dir),
        vec![
            "out.20260807-120000.1.log",
            "out.20260807-120000.2.log",
            "out.20260807-120000.log",
        ]
    );

    // A new stamp resets the sequence.
    assert!(sink.rotate(at(12, 0, 1)));
    assert!(file_names(&dir).contains(&"out.20260807-120001.log".to_string()));
}

#[test]
fn test_write_all_tracks_size_and_last_write() {
    let dir = TempDir::new().unwrap();
    let mut sink = FileSink::new(dir.path(), "out", ".log");
    let now = at(9, 0, 0);
    sink.rotate(now);

    assert!(sink.write_all(b"hello ", now));
    assert!(sink.write_all(b"world\n", now));

    assert_eq!(sink.file_size(), 12);
    assert_eq!(sink.last_write(), Some(now));

    let path = dir.path().join("out.20260807-090000.log");
    assert_eq!(fs::read_to_string(path).unwrap(), "hello world\n");
}

#[test]
fn test_rotate_resets_size_and_last_write() {
    let dir = TempDir::new().unwrap();
    let mut sink = FileSink::new(dir.path(), "out", ".log");
    sink.rotate(at(9, 0, 0));
    sink.write_all(b"data", at(9, 0, 0));
    assert_eq!(sink.file_size(), 4);

    sink.rotate(at(10, 0, 0));

    assert_eq!(sink.file_size(), 0);
    assert!(sink.last_write().is_none());
    // Writes land in the new file; the old one is untouched.
    sink.write_all(b"fresh", at(10, 0, 1));
    let old = dir.path().join("out.20260807-090000.log");
    let new = dir.path().join("out.20260807-100000.log");
    assert_eq!(fs::read_to_string(old).unwrap(), "data");
    assert_eq!(fs::read_to_string(new).unwrap(), "fresh");
}

#[test]
fn test_write_to_closed_sink_is_dropped() {
    let mut sink = FileSink::new("unused", "out", ".log");

    // Never rotated: the write reports failure but does not panic or open
    // anything.
    assert!(!sink.write_all(b"lost", at(12, 0, 0)));
    assert_eq!(sink.file_size(), 0);
}

#[test]
fn test_failed_rotate_leaves_sink_unusable() {
    let dir = TempDir::new().unwrap();
    // A regular file where the directory should be makes create_dir_all fail.
    let blocker = dir.path().join("blocked");
    fs::write(&blocker, b"").unwrap();
    let mut sink = FileSink::new(&blocker, "out", ".log");

    assert!(!sink.rotate(at(12, 0, 0)));
    assert!(!sink.is_open());
    assert!(!sink.write_all(b"lost", at(12, 0, 0)));
}

#[test]
fn test_recovery_after_failed_rotate() {
    let dir = TempDir::new().unwrap();
    let blocker = dir.path().join("blocked");
    fs::write(&blocker, b"").unwrap();
    let mut sink = FileSink::new(&blocker, "out", ".log");
    assert!(!sink.rotate(at(12, 0, 0)));

    // Clearing the obstruction lets the next rotation succeed.
    fs::remove_file(&blocker).unwrap();
    assert!(sink.rotate(at(12, 0, 1)));
    assert!(sink.write_all(b"back\n", at(12, 0, 1)));
}
