// Copyright 2025 the Parley Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Reference-counted objects that own an arena.

use core::fmt;
use core::ops::Deref;
use std::sync::Arc;

use smallvec::SmallVec;

use crate::allocator::AllocatorRef;
use crate::memory::{AllocError, Memory, MemoryKind, RawChunk};

struct Inner<T> {
    // Declared first so the payload is dropped before its arena is freed.
    value: T,
    memory: Memory,
}

/// A shared, atomically reference-counted value bundled with its own [`Memory`].
///
/// The payload's storage chunks are carved out of one permanent block at creation time.
/// Cloning (or [`retain`](Self::retain)) adds a reference; dropping one releases it. When the
/// last reference goes away the payload's `Drop` runs first, then every block of the arena is
/// returned to the allocator that created it, on whichever thread released last.
pub struct Object<T> {
    inner: Arc<Inner<T>>,
}

impl<T> Object<T> {
    /// Creates an object whose arena holds one chunk per entry of `chunk_sizes`.
    ///
    /// `init` receives the arena and the chunks and builds the payload. If the chunk
    /// allocation or `init` fails, everything allocated so far is released before the error
    /// is returned.
    pub fn try_create<E>(
        allocator: AllocatorRef,
        chunk_sizes: &[usize],
        init: impl FnOnce(&mut Memory, &[RawChunk]) -> Result<T, E>,
    ) -> Result<Self, E>
    where
        E: From<AllocError>,
    {
        let mut memory = Memory::new(allocator);
        let chunks = if chunk_sizes.is_empty() {
            SmallVec::new()
        } else {
            memory
                .allocate_chunks(MemoryKind::Permanent, chunk_sizes)
                .ok_or(AllocError)?
        };
        let value = init(&mut memory, &chunks)?;
        Ok(Self {
            inner: Arc::new(Inner { value, memory }),
        })
    }

    /// Adds a reference and returns it.
    #[must_use]
    pub fn retain(&self) -> Self {
        self.clone()
    }

    /// Releases this reference, finalizing the object if it was the last one.
    pub fn release(self) {
        drop(self);
    }

    /// The number of live references to this object.
    pub fn retain_count(&self) -> usize {
        Arc::strong_count(&self.inner)
    }

    /// Returns `true` if both handles refer to the same object.
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }

    /// The arena owned by this object.
    pub fn memory(&self) -> &Memory {
        &self.inner.memory
    }
}

impl<T> Clone for Object<T> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

impl<T> Deref for Object<T> {
    type Target = T;

    fn deref(&self) -> &T {
        &self.inner.value
    }
}

impl<T: fmt::Debug> fmt::Debug for Object<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Object")
            .field("value", &self.inner.value)
            .field("retain_count", &self.retain_count())
            .finish()
    }
}
