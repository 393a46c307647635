// Copyright 2025 the Parley Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Pluggable block allocation.
//!
//! Every arena draws its blocks from an [`Allocator`]. The crate ships with
//! [`NativeAllocator`], which uses the global heap and, with the `scratch` feature, a shared
//! pool of per-thread scratch buffers. A process-wide default can be installed with
//! [`set_default`]; entry points capture [`current`] once and use it for the whole call.

use std::fmt;
use std::sync::{Arc, LazyLock, PoisonError, RwLock};

use crate::memory::Block;

/// Shared handle to an allocator.
pub type AllocatorRef = Arc<dyn Allocator>;

/// A strategy for obtaining and releasing memory blocks.
///
/// Only the block operations are required. Scratch support is optional: an allocator that
/// returns `None` from [`allocate_scratch`](Self::allocate_scratch) simply makes every scratch
/// request fall back to [`allocate_block`](Self::allocate_block).
pub trait Allocator: fmt::Debug + Send + Sync {
    /// Allocates a zeroed block of at least `size` bytes.
    fn allocate_block(&self, size: usize) -> Option<Block>;

    /// Resizes a block, preserving the common prefix of its contents.
    ///
    /// On failure the original block is handed back untouched.
    fn reallocate_block(&self, block: Block, size: usize) -> Result<Block, Block> {
        let Some(mut resized) = self.allocate_block(size) else {
            return Err(block);
        };
        let common = block.size().min(size);
        resized.bytes_mut()[..common].copy_from_slice(&block.bytes()[..common]);
        self.deallocate_block(block);
        Ok(resized)
    }

    /// Releases a block obtained from [`allocate_block`](Self::allocate_block).
    fn deallocate_block(&self, block: Block);

    /// Allocates short-lived memory for the calling thread.
    ///
    /// Returning `None` is not an error; the caller falls back to a heap block.
    fn allocate_scratch(&self, _size: usize) -> Option<Block> {
        None
    }

    /// Takes back a block that an arena obtained from
    /// [`allocate_scratch`](Self::allocate_scratch).
    fn recycle_scratch(&self, block: Block) {
        drop(block);
    }

    /// Releases all scratch memory claimed by the calling thread.
    fn reset_scratch(&self) {}
}

/// The built-in allocator, backed by the global heap.
#[derive(Copy, Clone, Debug, Default)]
pub struct NativeAllocator;

impl Allocator for NativeAllocator {
    fn allocate_block(&self, size: usize) -> Option<Block> {
        Block::new(size)
    }

    fn deallocate_block(&self, block: Block) {
        drop(block);
    }

    #[cfg(feature = "scratch")]
    fn allocate_scratch(&self, size: usize) -> Option<Block> {
        crate::scratch::allocate(size)
    }

    #[cfg(feature = "scratch")]
    fn recycle_scratch(&self, block: Block) {
        crate::scratch::recycle(block);
    }

    #[cfg(feature = "scratch")]
    fn reset_scratch(&self) {
        crate::scratch::reset();
    }
}

static NATIVE: LazyLock<AllocatorRef> = LazyLock::new(|| Arc::new(NativeAllocator));

static DEFAULT: RwLock<Option<AllocatorRef>> = RwLock::new(None);

/// Returns the built-in native allocator.
pub fn native() -> AllocatorRef {
    NATIVE.clone()
}

/// Installs a process-wide default allocator, or restores the native one with `None`.
///
/// Calls already in flight keep the allocator they captured on entry.
pub fn set_default(allocator: Option<AllocatorRef>) {
    log::debug!("default allocator replaced: {allocator:?}");
    *DEFAULT.write().unwrap_or_else(PoisonError::into_inner) = allocator;
}

/// Returns the installed default allocator, if any.
pub fn default_allocator() -> Option<AllocatorRef> {
    DEFAULT
        .read()
        .unwrap_or_else(PoisonError::into_inner)
        .clone()
}

/// Returns the allocator new objects should use: the installed default, or the native one.
pub fn current() -> AllocatorRef {
    default_allocator().unwrap_or_else(native)
}
