//! Tests for Segment
//!
//! These tests verify:
//! - Offset assignment from the base offset
//! - Read-back of appended records
//! - Rollover readiness (index full, store full)
//! - Restart resumption from existing files
//! - Remove deletes both files
//! - Concurrent reads of a shared segment

use std::fs;
use std::path::PathBuf;

use commitlog::storage::ENT_WIDTH;
use commitlog::{Config, LogError, Record, Segment};
use tempfile::TempDir;

// =============================================================================
// Helper Functions
// =============================================================================

fn setup_temp_dir() -> (TempDir, PathBuf) {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("segments");
    (temp_dir, path)
}

fn config(max_store_bytes: u64, max_index_bytes: u64) -> Config {
    Config::builder()
        .max_store_bytes(max_store_bytes)
        .max_index_bytes(max_index_bytes)
        .build()
}

const PAYLOAD: &[u8] = b"hello world";

// =============================================================================
// Append / Read Tests
// =============================================================================

#[test]
fn test_open_empty_segment() {
    let (_temp, dir) = setup_temp_dir();

    let segment = Segment::open(&dir, 16, &config(1024, 1024)).unwrap();

    assert_eq!(segment.base_offset(), 16);
    assert_eq!(segment.next_offset(), 16);
    assert!(!segment.is_maxed());
    assert_eq!(segment.store_path(), dir.join("16.store"));
    assert_eq!(segment.index_path(), dir.join("16.index"));
    assert!(dir.join("16.store").exists());
    assert!(dir.join("16.index").exists());
}

#[test]
fn test_append_assigns_sequential_offsets() {
    let (_temp, dir) = setup_temp_dir();
    let mut segment = Segment::open(&dir, 100, &config(4096, 1024)).unwrap();

    for i in 0..10u64 {
        let mut record = Record::new(format!("record-{}", i));
        let offset = segment.append(&mut record).unwrap();
        assert_eq!(offset, 100 + i);
        assert_eq!(record.offset, offset);
    }

    assert_eq!(segment.next_offset(), 110);

    for i in 0..10u64 {
        let record = segment.read(100 + i).unwrap();
        assert_eq!(record.offset, 100 + i);
        assert_eq!(record.value, format!("record-{}", i).into_bytes());
    }
}

#[test]
fn test_read_outside_segment_is_eof() {
    let (_temp, dir) = setup_temp_dir();
    let mut segment = Segment::open(&dir, 16, &config(1024, 1024)).unwrap();

    assert!(matches!(segment.read(16), Err(LogError::Eof)));

    segment.append(&mut Record::new(PAYLOAD)).unwrap();

    assert!(matches!(segment.read(15), Err(LogError::Eof)));
    assert!(matches!(segment.read(17), Err(LogError::Eof)));
    assert!(segment.read(16).is_ok());
}

// =============================================================================
// Rollover Tests
// =============================================================================

#[test]
fn test_segment_lifecycle() {
    let (_temp, dir) = setup_temp_dir();
    let want = Record::new(PAYLOAD);

    // 3 entries of index capacity
    let mut segment = Segment::open(&dir, 16, &config(1024, ENT_WIDTH * 3)).unwrap();
    assert_eq!(segment.next_offset(), 16);
    assert!(!segment.is_maxed());

    for i in 0..3u64 {
        let mut record = want.clone();
        let offset = segment.append(&mut record).unwrap();
        assert_eq!(offset, 16 + i);

        let got = segment.read(offset).unwrap();
        assert_eq!(got.value, want.value);
    }

    let result = segment.append(&mut want.clone());
    assert!(matches!(result, Err(LogError::Eof)));
    assert!(segment.is_maxed());
    segment.close().unwrap();

    // Store is already past 3 payloads' worth of bytes
    let cfg = config(PAYLOAD.len() as u64 * 3, 1024);
    let segment = Segment::open(&dir, 16, &cfg).unwrap();
    assert!(segment.is_maxed());
    assert_eq!(segment.next_offset(), 19);

    segment.remove().unwrap();
    assert!(!dir.join("16.store").exists());
    assert!(!dir.join("16.index").exists());

    let segment = Segment::open(&dir, 16, &cfg).unwrap();
    assert!(!segment.is_maxed());
    assert_eq!(segment.next_offset(), 16);
}

#[test]
fn test_full_index_leaves_store_untouched() {
    let (_temp, dir) = setup_temp_dir();
    let mut segment = Segment::open(&dir, 0, &config(1024, ENT_WIDTH)).unwrap();

    segment.append(&mut Record::new(PAYLOAD)).unwrap();
    segment.close().unwrap();
    let size_after_first = fs::metadata(dir.join("0.store")).unwrap().len();

    let mut segment = Segment::open(&dir, 0, &config(1024, ENT_WIDTH)).unwrap();
    let mut record = Record::new(PAYLOAD);
    assert!(matches!(segment.append(&mut record), Err(LogError::Eof)));
    assert_eq!(segment.next_offset(), 1);
    segment.close().unwrap();

    assert_eq!(fs::metadata(dir.join("0.store")).unwrap().len(), size_after_first);
}

#[test]
fn test_maxed_by_store_size() {
    let (_temp, dir) = setup_temp_dir();
    let mut segment = Segment::open(&dir, 0, &config(64, 1024)).unwrap();

    let mut appended = 0;
    while !segment.is_maxed() {
        segment.append(&mut Record::new(PAYLOAD)).unwrap();
        appended += 1;
    }

    // Maxed is advisory at this layer: appends still go through
    assert!(appended > 0);
    let offset = segment.append(&mut Record::new(PAYLOAD)).unwrap();
    assert_eq!(offset, appended);
}

// =============================================================================
// Persistence Tests
// =============================================================================

#[test]
fn test_reopen_resumes_next_offset() {
    let (_temp, dir) = setup_temp_dir();
    let cfg = config(4096, 1024);

    {
        let mut segment = Segment::open(&dir, 42, &cfg).unwrap();
        for i in 0..5 {
            segment.append(&mut Record::new(format!("v{}", i))).unwrap();
        }
        segment.close().unwrap();
    }

    assert_eq!(fs::metadata(dir.join("42.index")).unwrap().len(), 5 * ENT_WIDTH);

    let mut segment = Segment::open(&dir, 42, &cfg).unwrap();
    assert_eq!(segment.next_offset(), 47);

    for i in 0..5u64 {
        let record = segment.read(42 + i).unwrap();
        assert_eq!(record.value, format!("v{}", i).into_bytes());
    }

    let offset = segment.append(&mut Record::new("after restart")).unwrap();
    assert_eq!(offset, 47);
    assert_eq!(segment.read(47).unwrap().value, &b"after restart"[..]);
}

#[test]
fn test_invalid_config_rejected() {
    let (_temp, dir) = setup_temp_dir();

    let result = Segment::open(&dir, 0, &config(0, 1024));
    assert!(matches!(result, Err(LogError::Config(_))));

    let result = Segment::open(&dir, 0, &config(1024, ENT_WIDTH - 1));
    assert!(matches!(result, Err(LogError::Config(_))));
}

// =============================================================================
// Concurrency Tests
// =============================================================================

#[test]
fn test_concurrent_reads() {
    let (_temp, dir) = setup_temp_dir();
    let mut segment = Segment::open(&dir, 0, &config(1 << 20, 1200)).unwrap();

    for i in 0..100 {
        segment.append(&mut Record::new(format!("value-{}", i))).unwrap();
    }

    let segment = &segment;
    crossbeam::scope(|s| {
        for t in 0..4u64 {
            s.spawn(move |_| {
                for i in (t..100).step_by(4) {
                    let record = segment.read(i).unwrap();
                    assert_eq!(record.value, format!("value-{}", i).into_bytes());
                }
            });
        }
    })
    .unwrap();
}
