// Copyright 2025 the Parley Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use crate::allocator::{Allocator, AllocatorRef};
use crate::memory::Block;

/// Counts the blocks and bytes it hands out, and can be told to fail a given request.
///
/// It has no scratch memory, so every scratch request of an arena shows up here as a block.
#[derive(Debug, Default)]
pub(crate) struct TrackingAllocator {
    requests: AtomicUsize,
    blocks: AtomicUsize,
    bytes: AtomicUsize,
    /// Request number (1-based) that fails; 0 never fails.
    fail_at: AtomicUsize,
}

impl TrackingAllocator {
    pub(crate) fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub(crate) fn handle(self: &Arc<Self>) -> AllocatorRef {
        self.clone()
    }

    /// Number of block requests so far, including failed ones.
    pub(crate) fn requests(&self) -> usize {
        self.requests.load(Ordering::SeqCst)
    }

    /// Blocks handed out and not yet returned.
    pub(crate) fn blocks(&self) -> usize {
        self.blocks.load(Ordering::SeqCst)
    }

    /// Bytes handed out and not yet returned.
    pub(crate) fn bytes(&self) -> usize {
        self.bytes.load(Ordering::SeqCst)
    }

    /// Makes the `count`th request from now fail; 0 disables failures.
    pub(crate) fn fail_after(&self, count: usize) {
        let fail_at = match count {
            0 => 0,
            _ => self.requests() + count,
        };
        self.fail_at.store(fail_at, Ordering::SeqCst);
    }
}

impl Allocator for TrackingAllocator {
    fn allocate_block(&self, size: usize) -> Option<Block> {
        let request = self.requests.fetch_add(1, Ordering::SeqCst) + 1;
        if request == self.fail_at.load(Ordering::SeqCst) {
            return None;
        }
        let block = Block::new(size)?;
        self.blocks.fetch_add(1, Ordering::SeqCst);
        self.bytes.fetch_add(block.size(), Ordering::SeqCst);
        Some(block)
    }

    fn deallocate_block(&self, block: Block) {
        self.blocks.fetch_sub(1, Ordering::SeqCst);
        self.bytes.fetch_sub(block.size(), Ordering::SeqCst);
    }
}
