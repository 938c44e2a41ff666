//! Conformance checks for [`BlobStore`] implementations.
//!
//! Every backend runs the same suite so that services can treat them as
//! interchangeable. Each check uses its own key prefix; a fresh, empty store
//! should be passed in.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Barrier;
use std::thread;

use crate::error::StoreError;
use crate::traits::BlobStore;
use crate::types::Generation;

const CONTENT_TYPE: &str = "application/octet-stream";

/// Run every contract check against `store`.
pub fn check_all<S: BlobStore>(store: &S) {
    absent_read_is_not_an_error(store);
    create_then_read(store);
    create_fails_when_present(store);
    stale_generation_is_rejected(store);
    update_of_absent_key_is_rejected(store);
    generations_strictly_increase(store);
    empty_payload_is_present(store);
    concurrent_creates_have_one_winner(store);
    concurrent_updates_have_one_winner(store);
}

/// Reading a key that was never written returns generation 0 and no bytes.
pub fn absent_read_is_not_an_error<S: BlobStore>(store: &S) {
    let read = store.read("contract/absent").expect("absent read must succeed");
    assert!(read.is_absent());
    assert!(read.bytes.is_none());
    assert_eq!(store.generation("contract/absent").unwrap(), Generation::ABSENT);
}

/// A create makes the bytes readable at the returned generation.
pub fn create_then_read<S: BlobStore>(store: &S) {
    let g = store
        .write("contract/create", CONTENT_TYPE, b"hello", Generation::ABSENT)
        .unwrap();
    assert!(!g.is_absent());

    let read = store.read("contract/create").unwrap();
    assert_eq!(read.bytes.as_deref(), Some(&b"hello"[..]));
    assert_eq!(read.generation, g);
    assert_eq!(read.content_type.as_deref(), Some(CONTENT_TYPE));
}

/// Create against an existing key fails and leaves the bytes alone.
pub fn create_fails_when_present<S: BlobStore>(store: &S) {
    let g = store
        .write("contract/dup", CONTENT_TYPE, b"first", Generation::ABSENT)
        .unwrap();
    let err = store
        .write("contract/dup", CONTENT_TYPE, b"second", Generation::ABSENT)
        .unwrap_err();
    assert!(matches!(err, StoreError::AlreadyExists { .. }), "got {err}");

    let read = store.read("contract/dup").unwrap();
    assert_eq!(read.bytes.as_deref(), Some(&b"first"[..]));
    assert_eq!(read.generation, g);
}

/// A write naming any generation other than the current one fails and
/// leaves the bytes alone.
pub fn stale_generation_is_rejected<S: BlobStore>(store: &S) {
    let g1 = store
        .write("contract/stale", CONTENT_TYPE, b"v1", Generation::ABSENT)
        .unwrap();
    let g2 = store
        .write("contract/stale", CONTENT_TYPE, b"v2", g1)
        .unwrap();

    let err = store
        .write("contract/stale", CONTENT_TYPE, b"v3", g1)
        .unwrap_err();
    match err {
        StoreError::GenerationMismatch {
            expected, actual, ..
        } => {
            assert_eq!(expected, g1);
            assert_eq!(actual, g2);
        }
        other => panic!("expected GenerationMismatch, got {other}"),
    }

    let bogus = Generation::new(g2.get() + 1000);
    let err = store
        .write("contract/stale", CONTENT_TYPE, b"v4", bogus)
        .unwrap_err();
    assert!(err.is_precondition_failure());

    let read = store.read("contract/stale").unwrap();
    assert_eq!(read.bytes.as_deref(), Some(&b"v2"[..]));
    assert_eq!(read.generation, g2);
}

/// Updating a key that does not exist fails and does not create it.
pub fn update_of_absent_key_is_rejected<S: BlobStore>(store: &S) {
    let err = store
        .write("contract/ghost", CONTENT_TYPE, b"x", Generation::new(1))
        .unwrap_err();
    assert!(matches!(err, StoreError::GenerationMismatch { .. }), "got {err}");
    assert!(store.read("contract/ghost").unwrap().is_absent());
}

/// Back-to-back writes never reuse a generation.
pub fn generations_strictly_increase<S: BlobStore>(store: &S) {
    let mut g = Generation::ABSENT;
    for i in 0..20u8 {
        let next = store
            .write("contract/rapid", CONTENT_TYPE, &[i], g)
            .unwrap();
        assert!(next > g, "generation went from {g} to {next}");
        g = next;
    }
    assert_eq!(store.read("contract/rapid").unwrap().bytes, Some(vec![19]));
}

/// An empty payload is still a present blob.
pub fn empty_payload_is_present<S: BlobStore>(store: &S) {
    let g = store
        .write("contract/empty", CONTENT_TYPE, b"", Generation::ABSENT)
        .unwrap();
    let read = store.read("contract/empty").unwrap();
    assert_eq!(read.generation, g);
    assert_eq!(read.bytes.as_deref(), Some(&b""[..]));
}

/// Racing creates of the same key: exactly one succeeds.
pub fn concurrent_creates_have_one_winner<S: BlobStore>(store: &S) {
    const WRITERS: usize = 8;
    let barrier = Barrier::new(WRITERS);
    let wins = AtomicUsize::new(0);

    thread::scope(|s| {
        for i in 0..WRITERS {
            let barrier = &barrier;
            let wins = &wins;
            s.spawn(move || {
                barrier.wait();
                match store.write(
                    "contract/race-create",
                    CONTENT_TYPE,
                    &[i as u8],
                    Generation::ABSENT,
                ) {
                    Ok(_) => {
                        wins.fetch_add(1, Ordering::SeqCst);
                    }
                    Err(e) => assert!(e.is_precondition_failure(), "got {e}"),
                }
            });
        }
    });

    assert_eq!(wins.load(Ordering::SeqCst), 1);
}

/// Racing updates from the same observed generation: exactly one succeeds.
pub fn concurrent_updates_have_one_winner<S: BlobStore>(store: &S) {
    const WRITERS: usize = 8;
    let base = store
        .write("contract/race-update", CONTENT_TYPE, b"base", Generation::ABSENT)
        .unwrap();
    let barrier = Barrier::new(WRITERS);
    let wins = AtomicUsize::new(0);

    thread::scope(|s| {
        for i in 0..WRITERS {
            let barrier = &barrier;
            let wins = &wins;
            s.spawn(move || {
                barrier.wait();
                match store.write("contract/race-update", CONTENT_TYPE, &[i as u8], base) {
                    Ok(_) => {
                        wins.fetch_add(1, Ordering::SeqCst);
                    }
                    Err(e) => assert!(e.is_precondition_failure(), "got {e}"),
                }
            });
        }
    });

    assert_eq!(wins.load(Ordering::SeqCst), 1);
    assert_ne!(store.read("contract/race-update").unwrap().generation, base);
}
