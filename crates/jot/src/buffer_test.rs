//! Tests for the fixed-capacity append buffer

use crate::buffer::Buffer;

#[test]
fn test_new_buffer() {
    let buf = Buffer::with_capacity(64);

    assert_eq!(buf.capacity(), 64);
    assert_eq!(buf.len(), 0);
    assert_eq!(buf.rest(), 64);
    assert!(buf.is_empty());
    assert!(!buf.full());
}

#[test]
fn test_append_advances_offset() {
    let mut buf = Buffer::with_capacity(64);

    buf.append(b"hello ");
    buf.append(b"world");

    assert_eq!(buf.len(), 11);
    assert_eq!(buf.rest(), 53);
    assert_eq!(buf.bytes(), b"hello world");
}

#[test]
fn test_full_flag_is_distinct_from_exhaustion() {
    let mut buf = Buffer::with_capacity(64);
    buf.append(b"0123456789");

    // Marked full with 54 bytes of room left.
    buf.mark_full();
    assert!(buf.full());
    assert_eq!(buf.rest(), 54);
}

#[test]
fn test_exact_fill_is_not_full_until_marked() {
    let mut buf = Buffer::with_capacity(4);
    buf.append(b"abcd");

    assert_eq!(buf.rest(), 0);
    assert!(!buf.full());
}

#[test]
fn test_reuse_resets_offset_and_flag() {
    let mut buf = Buffer::with_capacity(64);
    buf.append(b"some bytes");
    buf.mark_full();

    buf.reuse();

    assert!(buf.is_empty());
    assert!(!buf.full());
    assert_eq!(buf.rest(), 64);
    // Capacity survives reuse; the region is not reallocated or shrunk.
    assert_eq!(buf.capacity(), 64);
}

#[test]
fn test_reuse_then_append_again() {
    let mut buf = Buffer::with_capacity(16);
    buf.append(b"first");
    buf.reuse();

    buf.append(b"second");
    assert_eq!(buf.bytes(), b"second");
}
