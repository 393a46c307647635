// Copyright 2025 the Parley Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Per-thread scratch memory.
//!
//! A fixed set of [`SCRATCH_POOL_SIZE`] buffers is shared by all threads through a bounded
//! channel. A thread checks a buffer out on its first scratch request and keeps it in a
//! thread-local lease until [`reset`] checks it back in. Each lease has a budget of
//! [`SCRATCH_BUFFER_SIZE`] bytes that is consumed bump-pointer style; once it runs out, or when
//! every buffer is checked out, requests fail and the caller falls back to heap blocks.
//!
//! Blocks handed back with [`recycle`] are kept by the lease and reused for later requests, so
//! a thread resolving many paragraphs stops touching the heap for its scratch memory.

use std::cell::RefCell;
use std::sync::OnceLock;

use crossbeam_channel::{Receiver, Sender};

use crate::config::{SCRATCH_ALIGNMENT, SCRATCH_BUFFER_SIZE, SCRATCH_POOL_SIZE};
use crate::memory::Block;

const MAX_SPARE_BLOCKS: usize = 16;

#[derive(Debug, Default)]
struct ScratchBuffer {
    offset: usize,
    spare: Vec<Block>,
}

impl ScratchBuffer {
    fn allocate(&mut self, size: usize) -> Option<Block> {
        let end = self
            .offset
            .checked_add(size.next_multiple_of(SCRATCH_ALIGNMENT))?;
        if end > SCRATCH_BUFFER_SIZE {
            return None;
        }
        let block = match self.take_spare(size) {
            Some(block) => block,
            None => Block::new(size)?,
        };
        self.offset = end;
        Some(block)
    }

    fn take_spare(&mut self, size: usize) -> Option<Block> {
        let index = self
            .spare
            .iter()
            .position(|block| block.capacity() >= size)?;
        self.spare.swap_remove(index).reuse(size).ok()
    }
}

#[derive(Debug)]
struct Pool {
    sender: Sender<ScratchBuffer>,
    receiver: Receiver<ScratchBuffer>,
}

fn pool() -> &'static Pool {
    static POOL: OnceLock<Pool> = OnceLock::new();
    POOL.get_or_init(|| {
        let (sender, receiver) = crossbeam_channel::bounded(SCRATCH_POOL_SIZE);
        for _ in 0..SCRATCH_POOL_SIZE {
            let stocked = give_back(&sender, ScratchBuffer::default());
            debug_assert!(stocked, "scratch pool has room for every buffer");
        }
        Pool { sender, receiver }
    })
}

/// Returns `buffer` to the pool behind `sender`.
///
/// A buffer the pool has no room for is dropped, and `false` is returned.
fn give_back(sender: &Sender<ScratchBuffer>, buffer: ScratchBuffer) -> bool {
    match sender.try_send(buffer) {
        Ok(()) => true,
        Err(error) => {
            log::warn!("scratch buffer could not be checked in ({error}); dropping it");
            false
        }
    }
}

/// The buffer checked out by the current thread.
#[derive(Debug, Default)]
struct Lease(Option<ScratchBuffer>);

impl Lease {
    fn check_in(&mut self) {
        if let Some(mut buffer) = self.0.take() {
            buffer.offset = 0;
            give_back(&pool().sender, buffer);
        }
    }
}

impl Drop for Lease {
    fn drop(&mut self) {
        self.check_in();
    }
}

thread_local! {
    static LEASE: RefCell<Lease> = RefCell::new(Lease::default());
}

/// Allocates `size` bytes of scratch memory for the calling thread.
pub(crate) fn allocate(size: usize) -> Option<Block> {
    LEASE
        .try_with(|lease| {
            let mut lease = lease.borrow_mut();
            if lease.0.is_none() {
                lease.0 = pool().receiver.try_recv().ok();
                if lease.0.is_none() {
                    log::debug!("scratch pool exhausted; falling back to heap blocks");
                }
            }
            lease.0.as_mut()?.allocate(size)
        })
        .ok()
        .flatten()
}

/// Keeps a finished scratch block for reuse by the calling thread.
pub(crate) fn recycle(block: Block) {
    let _ = LEASE.try_with(|lease| {
        if let Some(buffer) = lease.borrow_mut().0.as_mut() {
            if buffer.spare.len() < MAX_SPARE_BLOCKS {
                buffer.spare.push(block);
            }
        }
    });
}

/// Resets the calling thread's budget and returns its buffer to the pool.
pub(crate) fn reset() {
    let _ = LEASE.try_with(|lease| lease.borrow_mut().check_in());
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn budget_is_bounded() {
        let mut buffer = ScratchBuffer::default();
        let block = buffer.allocate(100).unwrap();
        assert_eq!(block.size(), 100);
        assert_eq!(buffer.offset, 112);
        assert!(buffer.allocate(SCRATCH_BUFFER_SIZE).is_none());
        assert_eq!(buffer.offset, 112);
        assert!(buffer.allocate(SCRATCH_BUFFER_SIZE - 112).is_some());
        assert!(buffer.allocate(1).is_none());
    }

    #[test]
    fn recycled_blocks_are_zeroed() {
        let mut buffer = ScratchBuffer::default();
        let mut block = buffer.allocate(32).unwrap();
        block.bytes_mut().fill(0xAB);
        buffer.spare.push(block);

        let block = buffer.allocate(24).unwrap();
        assert_eq!(block.bytes(), &[0; 24]);
        assert!(buffer.spare.is_empty());
    }

    #[test]
    fn lease_round_trip() {
        std::thread::spawn(|| {
            // Other tests may hold every buffer; an empty pool is a valid outcome.
            if let Some(block) = allocate(64) {
                assert_eq!(block.bytes(), &[0; 64]);
                recycle(block);
            }
            reset();
            LEASE.with_borrow(|lease| assert!(lease.0.is_none()));
        })
        .join()
        .unwrap();
    }

    #[test]
    fn full_pool_drops_the_returned_buffer() {
        let (sender, receiver) = crossbeam_channel::bounded(1);
        assert!(give_back(&sender, ScratchBuffer::default()), "pool has room");
        assert!(!give_back(&sender, ScratchBuffer::default()), "pool is full");
        assert_eq!(receiver.len(), 1, "only the first buffer was kept");

        drop(receiver);
        assert!(
            !give_back(&sender, ScratchBuffer::default()),
            "disconnected pool"
        );
    }
}
