// Copyright 2025 the Parley Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use std::thread;

use proptest::prelude::*;

use super::utils::TrackingAllocator;
use crate::memory::{Memory, MemoryKind};
use crate::{Algorithm, BaseLevel, ErrorKind};

/// Text that grows every resolution container past its inline capacity: many level runs,
/// deeply nested embeddings and more bracket pairs than a single bracket list holds.
fn demanding_text() -> String {
    let mut text = "\u{202B}\u{202A}".repeat(12);
    text.push_str(&"a(".repeat(12));
    text.push_str(&")\u{05D0}".repeat(12));
    text.push_str(&"a\u{05D0} 1".repeat(10));
    text
}

#[test]
fn memory_is_returned_to_the_allocator() {
    let tracking = TrackingAllocator::new();
    let text = demanding_text();
    {
        let algorithm = Algorithm::with_allocator(text.as_str(), tracking.handle()).unwrap();
        assert_eq!(tracking.blocks(), 1, "algorithm keeps one block");

        let paragraph = algorithm
            .create_paragraph(0, text.len(), BaseLevel::DefaultLtr)
            .unwrap();
        assert_eq!(tracking.blocks(), 2, "resolution memory is released");

        let line = paragraph.create_line(0, text.len()).unwrap();
        assert_eq!(tracking.blocks(), 3, "line keeps one block");
        drop(paragraph);
        drop(algorithm);
        assert_eq!(tracking.blocks(), 3, "line keeps its dependencies");
        assert!(!line.runs().is_empty(), "line has runs");
    }
    assert_eq!(tracking.blocks(), 0, "blocks leaked");
    assert_eq!(tracking.bytes(), 0, "bytes leaked");
}

#[test]
fn every_allocation_failure_is_reported() {
    let tracking = TrackingAllocator::new();
    let text = demanding_text();
    let algorithm = Algorithm::with_allocator(text.as_str(), tracking.handle()).unwrap();

    let before = tracking.requests();
    let expected = algorithm
        .create_paragraph(0, text.len(), BaseLevel::DefaultLtr)
        .unwrap();
    let total = tracking.requests() - before;
    assert!(total >= 3, "resolution should need several blocks, got {total}");

    for request in 1..=total {
        tracking.fail_after(request);
        let error = algorithm
            .create_paragraph(0, text.len(), BaseLevel::DefaultLtr)
            .unwrap_err();
        assert_eq!(
            error.kind(),
            ErrorKind::AllocationFailed,
            "request {request} of {total}"
        );
        assert_eq!(tracking.blocks(), 2, "request {request} leaked blocks");
    }

    tracking.fail_after(0);
    let paragraph = algorithm
        .create_paragraph(0, text.len(), BaseLevel::DefaultLtr)
        .unwrap();
    assert_eq!(paragraph.levels(), expected.levels(), "levels after recovery");
}

#[test]
fn algorithm_creation_failure_is_reported() {
    let tracking = TrackingAllocator::new();
    tracking.fail_after(1);
    let error = Algorithm::with_allocator("abc", tracking.handle()).unwrap_err();
    assert_eq!(error.kind(), ErrorKind::AllocationFailed, "error kind");
    assert_eq!(tracking.blocks(), 0, "nothing is held after failure");
}

proptest! {
    #[test]
    fn arena_returns_every_block(
        requests in proptest::collection::vec((any::<bool>(), 1_usize..4096, 1_usize..4), 0..24),
    ) {
        let tracking = TrackingAllocator::new();
        let mut memory = Memory::new(tracking.handle());
        for round in 0..2 {
            for &(scratch, size, count) in &requests {
                let kind = match scratch {
                    true => MemoryKind::Scratch,
                    false => MemoryKind::Permanent,
                };
                let chunks = memory.allocate_chunks(kind, &vec![size; count]);
                prop_assert!(chunks.is_some(), "round {}", round);
            }
            prop_assert_eq!(tracking.blocks(), requests.len());
            memory.finalize();
            prop_assert_eq!(tracking.blocks(), 0);
            prop_assert_eq!(tracking.bytes(), 0);
        }
        memory.allocate_block(MemoryKind::Permanent, 64).unwrap();
        drop(memory);
        prop_assert_eq!(tracking.blocks(), 0);
    }

    #[test]
    fn references_are_shared_across_threads(
        retains in proptest::collection::vec(0_usize..6, 1..5),
    ) {
        let tracking = TrackingAllocator::new();
        let text = "abc \u{05D0}\u{05D1} (1)";
        let algorithm = Algorithm::with_allocator(text, tracking.handle()).unwrap();
        let paragraph = algorithm
            .create_paragraph(0, text.len(), BaseLevel::DefaultRtl)
            .unwrap();

        thread::scope(|scope| {
            for &count in &retains {
                let paragraph = paragraph.retain();
                scope.spawn(move || {
                    let handles: Vec<_> = (0..count).map(|_| paragraph.retain()).collect();
                    let line = paragraph.create_line(0, text.len()).unwrap();
                    assert_eq!(line.levels().len(), text.len(), "line length");
                    drop(handles);
                });
            }
        });

        prop_assert_eq!(paragraph.retain_count(), 1);
        prop_assert_eq!(algorithm.retain_count(), 2);
        drop(paragraph);
        prop_assert_eq!(algorithm.retain_count(), 1);
        drop(algorithm);
        prop_assert_eq!(tracking.blocks(), 0);
    }
}
