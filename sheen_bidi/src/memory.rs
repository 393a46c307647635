// Copyright 2025 the Parley Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Chunked arena memory.
//!
//! A [`Memory`] hands out blocks from an [`Allocator`](crate::allocator::Allocator) and keeps
//! them until it is finalized, at which point every block goes back to the allocator in one
//! sweep. Blocks can be split into several contiguous chunks with a single allocation, and each
//! chunk is addressed through a typed [`Chunk`] handle rather than a pointer.

use core::fmt;
use core::marker::PhantomData;

use bytemuck::Pod;
use smallvec::SmallVec;

use crate::allocator::AllocatorRef;

/// Alignment in bytes of every block and chunk.
pub const BLOCK_ALIGNMENT: usize = align_of::<u64>();

/// The allocator could not provide the requested memory.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct AllocError;

impl fmt::Display for AllocError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("memory allocation failed")
    }
}

impl core::error::Error for AllocError {}

/// A raw, zero-initialized, 8-byte aligned memory block.
pub struct Block {
    words: Box<[u64]>,
    size: usize,
}

impl Block {
    /// Allocates a zeroed block of `size` bytes, or `None` if the heap is exhausted.
    pub fn new(size: usize) -> Option<Self> {
        let count = size.div_ceil(BLOCK_ALIGNMENT);
        let mut words = Vec::new();
        words.try_reserve_exact(count).ok()?;
        words.resize(count, 0);
        Some(Self {
            words: words.into_boxed_slice(),
            size,
        })
    }

    /// The usable size of the block in bytes.
    pub fn size(&self) -> usize {
        self.size
    }

    /// The number of bytes backing the block, which may exceed [`size`](Self::size).
    pub fn capacity(&self) -> usize {
        self.words.len() * BLOCK_ALIGNMENT
    }

    /// Reuses this block's storage for a request of `size` bytes.
    ///
    /// The contents are zeroed again. Returns the block unchanged if it is too small.
    pub fn reuse(mut self, size: usize) -> Result<Self, Self> {
        if size > self.capacity() {
            return Err(self);
        }
        self.words.fill(0);
        self.size = size;
        Ok(self)
    }

    /// The usable bytes of the block.
    pub fn bytes(&self) -> &[u8] {
        &bytemuck::cast_slice(&self.words)[..self.size]
    }

    /// The usable bytes of the block, mutably.
    pub fn bytes_mut(&mut self) -> &mut [u8] {
        &mut bytemuck::cast_slice_mut(&mut self.words)[..self.size]
    }
}

impl fmt::Debug for Block {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Block")
            .field("size", &self.size)
            .field("capacity", &self.capacity())
            .finish_non_exhaustive()
    }
}

/// Where a block is requested from.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum MemoryKind {
    /// A heap block that lives as long as the arena.
    Permanent,
    /// Short-lived memory, served from the scratch pool when it has room.
    Scratch,
}

/// An untyped region carved out of a [`Memory`] block.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct RawChunk {
    block: u32,
    offset: u32,
    size: u32,
}

impl RawChunk {
    /// Size of the chunk in bytes.
    pub fn size(&self) -> usize {
        self.size as usize
    }

    /// Views the chunk as an array of `T`, truncating any trailing bytes.
    pub fn cast<T: Pod>(self) -> Chunk<T> {
        debug_assert!(
            align_of::<T>() <= BLOCK_ALIGNMENT,
            "chunk element alignment exceeds block alignment"
        );
        let len = self.size() / size_of::<T>().max(1);
        Chunk {
            raw: self,
            len,
            marker: PhantomData,
        }
    }
}

/// A typed handle to an array of `T` living in a [`Memory`].
pub struct Chunk<T> {
    raw: RawChunk,
    len: usize,
    marker: PhantomData<fn() -> T>,
}

impl<T> Chunk<T> {
    /// Number of elements in the chunk.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Returns `true` if the chunk holds no elements.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }
}

impl<T> Clone for Chunk<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for Chunk<T> {}

impl<T> fmt::Debug for Chunk<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Chunk")
            .field("raw", &self.raw)
            .field("len", &self.len)
            .finish()
    }
}

struct Slot {
    block: Block,
    kind: MemoryKind,
}

/// Arena of blocks that are all returned to their allocator together.
pub struct Memory {
    allocator: AllocatorRef,
    slots: Vec<Slot>,
}

impl Memory {
    /// Creates an empty arena drawing from `allocator`.
    pub fn new(allocator: AllocatorRef) -> Self {
        Self {
            allocator,
            slots: Vec::new(),
        }
    }

    /// The allocator this arena draws from.
    pub fn allocator(&self) -> &AllocatorRef {
        &self.allocator
    }

    /// Number of blocks currently held.
    pub fn block_count(&self) -> usize {
        self.slots.len()
    }

    /// Allocates one zeroed block of `size` bytes and returns it as a single chunk.
    ///
    /// Scratch requests are first tried against the allocator's scratch memory; if that has
    /// no room, a heap block is used instead.
    pub fn allocate_block(&mut self, kind: MemoryKind, size: usize) -> Option<RawChunk> {
        debug_assert!(size > 0, "block size must be non-zero");
        let size32 = u32::try_from(size).ok()?;
        let index = u32::try_from(self.slots.len()).ok()?;

        let scratch = match kind {
            MemoryKind::Scratch => self.allocator.allocate_scratch(size),
            MemoryKind::Permanent => None,
        };
        let slot = match scratch {
            Some(block) => Slot {
                block,
                kind: MemoryKind::Scratch,
            },
            None => Slot {
                block: self.allocator.allocate_block(size)?,
                kind: MemoryKind::Permanent,
            },
        };
        debug_assert!(slot.block.size() >= size, "allocator returned a short block");
        self.slots.push(slot);

        Some(RawChunk {
            block: index,
            offset: 0,
            size: size32,
        })
    }

    /// Allocates a single block and splits it into contiguous chunks of the given sizes.
    ///
    /// Every chunk starts on a [`BLOCK_ALIGNMENT`] boundary. Nothing is allocated on failure.
    pub fn allocate_chunks(
        &mut self,
        kind: MemoryKind,
        sizes: &[usize],
    ) -> Option<SmallVec<[RawChunk; 4]>> {
        let mut total = 0_usize;
        for &size in sizes {
            total = total.checked_add(align_up(size))?;
        }
        let block = self.allocate_block(kind, total)?;

        let mut chunks = SmallVec::with_capacity(sizes.len());
        let mut offset = 0_usize;
        for &size in sizes {
            chunks.push(RawChunk {
                block: block.block,
                offset: u32::try_from(offset).ok()?,
                size: u32::try_from(size).ok()?,
            });
            offset += align_up(size);
        }
        Some(chunks)
    }

    /// Allocates a zeroed array of `len` elements.
    pub fn allocate_array<T: Pod>(&mut self, kind: MemoryKind, len: usize) -> Option<Chunk<T>> {
        let size = len.checked_mul(size_of::<T>())?;
        Some(self.allocate_block(kind, size)?.cast())
    }

    /// Borrows the bytes of a chunk.
    pub fn bytes(&self, chunk: RawChunk) -> &[u8] {
        let start = chunk.offset as usize;
        &self.slots[chunk.block as usize].block.bytes()[start..start + chunk.size()]
    }

    /// Borrows the bytes of a chunk mutably.
    pub fn bytes_mut(&mut self, chunk: RawChunk) -> &mut [u8] {
        let start = chunk.offset as usize;
        &mut self.slots[chunk.block as usize].block.bytes_mut()[start..start + chunk.size()]
    }

    /// Borrows the elements of a typed chunk.
    #[inline]
    pub fn slice<T: Pod>(&self, chunk: Chunk<T>) -> &[T] {
        let bytes = &self.bytes(chunk.raw)[..chunk.len * size_of::<T>()];
        bytemuck::cast_slice(bytes)
    }

    /// Borrows the elements of a typed chunk mutably.
    #[inline]
    pub fn slice_mut<T: Pod>(&mut self, chunk: Chunk<T>) -> &mut [T] {
        let len = chunk.len * size_of::<T>();
        let bytes = &mut self.bytes_mut(chunk.raw)[..len];
        bytemuck::cast_slice_mut(bytes)
    }

    /// Returns every block to the allocator.
    ///
    /// Scratch blocks are handed back to the scratch side of the allocator and heap blocks
    /// are deallocated. The arena is empty afterwards and can be reused.
    pub fn finalize(&mut self) {
        for slot in self.slots.drain(..) {
            match slot.kind {
                MemoryKind::Scratch => self.allocator.recycle_scratch(slot.block),
                MemoryKind::Permanent => self.allocator.deallocate_block(slot.block),
            }
        }
    }
}

impl Drop for Memory {
    fn drop(&mut self) {
        self.finalize();
    }
}

impl fmt::Debug for Memory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Memory")
            .field("allocator", &self.allocator)
            .field("blocks", &self.slots.len())
            .finish()
    }
}

fn align_up(size: usize) -> usize {
    size.next_multiple_of(BLOCK_ALIGNMENT)
}
