//! Tests for the ordered buffer pool and line placement

use std::mem;

use crate::pool::BufferPool;

#[test]
fn test_new_pool_is_empty() {
    let pool = BufferPool::new(1024);

    assert!(pool.is_empty());
    assert_eq!(pool.len(), 0);
    assert!(pool.looks_empty());
    assert!(pool.is_drained());
    assert_eq!(pool.first_available(), None);
}

#[test]
fn test_first_line_allocates_on_demand() {
    let mut pool = BufferPool::new(1024);

    let placed = pool.push_line(b"hello\n");

    assert!(placed.allocated);
    assert!(!placed.marked_full);
    assert_eq!(pool.len(), 1);
    assert_eq!(pool.get_mut(0).bytes(), b"hello\n");
}

#[test]
fn test_oversize_rule_doubles_line_length() {
    let mut pool = BufferPool::new(64);
    let line = vec![b'x'; 100];

    pool.push_line(&line);

    // 100-byte line against 64-byte buffers: the fresh buffer is 200 bytes.
    assert_eq!(pool.len(), 1);
    assert_eq!(pool.get_mut(0).capacity(), 200);
    assert_eq!(pool.get_mut(0).len(), 100);
}

#[test]
fn test_three_thirty_byte_lines_in_sixty_four_byte_buffers() {
    let mut pool = BufferPool::new(64);
    let line = [b'a'; 30];

    pool.push_line(&line);
    pool.push_line(&line);
    // First two fit: 60 of 64 bytes used, buffer not full.
    assert_eq!(pool.len(), 1);
    assert_eq!(pool.get_mut(0).len(), 60);
    assert!(!pool.get_mut(0).full());

    let placed = pool.push_line(&line);
    // Third does not fit: buffer 1 marked full, buffer 2 created.
    assert!(placed.marked_full);
    assert!(placed.allocated);
    assert_eq!(pool.len(), 2);
    assert!(pool.get_mut(0).full());
    assert_eq!(pool.get_mut(0).len(), 60);
    assert_eq!(pool.get_mut(1).len(), 30);
}

#[test]
fn test_exact_fit_marks_full_and_spills() {
    let mut pool = BufferPool::new(16);

    pool.push_line(b"abcdefgh"); // 8 of 16
    // rest() == line length is not enough; the line spills to a new buffer.
    pool.push_line(b"12345678");

    assert_eq!(pool.len(), 2);
    assert!(pool.get_mut(0).full());
    assert_eq!(pool.get_mut(0).bytes(), b"abcdefgh");
    assert_eq!(pool.get_mut(1).bytes(), b"12345678");
}

#[test]
fn test_scan_finds_first_non_full() {
    let mut pool = BufferPool::new(32);
    let fill = [b'z'; 16];

    pool.push_line(&fill);
    pool.push_line(&fill); // marks buffer 0 full, lands in buffer 1

    assert_eq!(pool.first_available(), Some(1));

    // The next small line goes to buffer 1, not a new buffer.
    let placed = pool.push_line(b"x");
    assert!(!placed.allocated);
    assert_eq!(pool.len(), 2);
    assert_eq!(pool.get_mut(1).len(), 17);
}

#[test]
fn test_scan_skips_full_buffers_after_reset_cycle() {
    let mut pool = BufferPool::new(16);

    pool.push_line(&[b'a'; 15]);
    pool.push_line(&[b'b'; 15]); // buffer 0 marked full, line lands in buffer 1
    pool.get_mut(1).mark_full();

    // Both full: a new buffer is created at the tail.
    let placed = pool.push_line(b"c");
    assert!(placed.allocated);
    assert_eq!(pool.len(), 3);
    assert_eq!(pool.get_mut(2).bytes(), b"c");
}

#[test]
fn test_looks_empty_inspects_only_head() {
    let mut pool = BufferPool::new(16);
    pool.push_line(b"data");

    assert!(!pool.looks_empty());

    pool.get_mut(0).reuse();
    // Head empty reads as empty, even with a second buffer appended.
    pool.grow_for(4);
    pool.get_mut(1).append(b"tail");
    assert!(pool.looks_empty());
    assert!(!pool.is_drained());
}

#[test]
fn test_reset_reuses_every_buffer() {
    let mut pool = BufferPool::new(16);
    pool.push_line(&[b'a'; 15]);
    pool.push_line(&[b'b'; 15]);
    assert_eq!(pool.len(), 2);

    pool.reset();

    assert!(pool.is_drained());
    assert_eq!(pool.len(), 2); // buffers are kept, not freed
    assert_eq!(pool.first_available(), Some(0));
}

#[test]
fn test_pool_swap_trades_contents() {
    let mut front = BufferPool::new(16);
    let mut back = BufferPool::new(16);
    front.push_line(b"queued");

    mem::swap(&mut front, &mut back);

    assert!(front.is_empty());
    assert_eq!(back.len(), 1);
    assert_eq!(back.get_mut(0).bytes(), b"queued");
}

#[test]
fn test_order_is_preserved_across_growth() {
    let mut pool = BufferPool::new(16);
    for i in 0..10 {
        pool.push_line(format!("line-{i}\n").as_bytes());
    }

    let mut all = Vec::new();
    for buffer in pool.iter() {
        all.extend_from_slice(buffer.bytes());
    }
    let expected: String = (0..10).map(|i| format!("line-{i}\n")).collect();
    assert_eq!(all, expected.as_bytes());
}
