// Copyright 2025 the Parley Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The directional status stack of rules X1 to X8.

use bytemuck::{Pod, Zeroable};
use smallvec::SmallVec;

use crate::bidi_type::{BidiType, Level};
use crate::config::STATUS_STACK_MAX_DEPTH;
use crate::memory::{AllocError, Chunk, Memory, MemoryKind};

const EMBEDDED_CAPACITY: usize = 16;

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Pod, Zeroable)]
#[repr(C)]
pub(crate) struct StatusEntry {
    level: Level,
    override_status: BidiType,
    isolate: u8,
}

/// A bounded stack of (embedding level, override status, isolate status) entries.
///
/// The first sixteen entries live inline. Deeper entries spill into arena lists, each sized
/// to the depth at which it was needed, and lists are kept for reuse once allocated.
#[derive(Debug)]
pub(crate) struct StatusStack {
    embedded: [StatusEntry; EMBEDDED_CAPACITY],
    lists: SmallVec<[Chunk<StatusEntry>; 4]>,
    /// Index of the list holding the top entry; 0 is the embedded array.
    list: usize,
    /// Index of the top entry within its list.
    top: usize,
    count: usize,
    peek: StatusEntry,
}

impl StatusStack {
    pub(crate) fn new() -> Self {
        Self {
            embedded: [StatusEntry::default(); EMBEDDED_CAPACITY],
            lists: SmallVec::new(),
            list: 0,
            top: 0,
            count: 0,
            peek: StatusEntry::default(),
        }
    }

    fn capacity(&self, list: usize) -> usize {
        match list {
            0 => EMBEDDED_CAPACITY,
            _ => self.lists[list - 1].len(),
        }
    }

    fn entry_mut<'a>(&'a mut self, memory: &'a mut Memory) -> &'a mut StatusEntry {
        match self.list {
            0 => &mut self.embedded[self.top],
            list => &mut memory.slice_mut(self.lists[list - 1])[self.top],
        }
    }

    fn entry(&self, memory: &Memory) -> StatusEntry {
        match self.list {
            0 => self.embedded[self.top],
            list => memory.slice(self.lists[list - 1])[self.top],
        }
    }

    pub(crate) fn push(
        &mut self,
        memory: &mut Memory,
        level: Level,
        override_status: BidiType,
        isolate: bool,
    ) -> Result<(), AllocError> {
        debug_assert!(
            self.count < STATUS_STACK_MAX_DEPTH,
            "status stack pushed past its maximum depth"
        );

        if self.count == 0 {
            self.list = 0;
            self.top = 0;
        } else if self.top + 1 < self.capacity(self.list) {
            self.top += 1;
        } else {
            if self.list == self.lists.len() {
                let list = memory
                    .allocate_array(MemoryKind::Scratch, self.count)
                    .ok_or(AllocError)?;
                self.lists.push(list);
            }
            self.list += 1;
            self.top = 0;
        }

        let entry = StatusEntry {
            level,
            override_status,
            isolate: isolate.into(),
        };
        *self.entry_mut(memory) = entry;
        self.peek = entry;
        self.count += 1;
        Ok(())
    }

    pub(crate) fn pop(&mut self, memory: &Memory) {
        debug_assert!(self.count > 0, "status stack popped while empty");

        self.count -= 1;
        if self.count == 0 {
            self.list = 0;
            self.top = 0;
            self.peek = StatusEntry::default();
            return;
        }
        if self.top > 0 {
            self.top -= 1;
        } else {
            self.list -= 1;
            self.top = self.capacity(self.list) - 1;
        }
        self.peek = self.entry(memory);
    }

    pub(crate) fn set_empty(&mut self) {
        self.list = 0;
        self.top = 0;
        self.count = 0;
        self.peek = StatusEntry::default();
    }

    pub(crate) fn count(&self) -> usize {
        self.count
    }

    #[inline]
    pub(crate) fn embedding_level(&self) -> Level {
        self.peek.level
    }

    #[inline]
    pub(crate) fn override_status(&self) -> BidiType {
        self.peek.override_status
    }

    #[inline]
    pub(crate) fn isolate_status(&self) -> bool {
        self.peek.isolate != 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::allocator::NativeAllocator;
    use proptest::prelude::*;
    use std::sync::Arc;

    fn memory() -> Memory {
        Memory::new(Arc::new(NativeAllocator))
    }

    #[test]
    fn holds_maximum_depth() {
        let mut memory = memory();
        let mut stack = StatusStack::new();
        for depth in 0..STATUS_STACK_MAX_DEPTH {
            #[allow(clippy::cast_possible_truncation, reason = "depth is below 128")]
            let level = depth as Level;
            stack
                .push(&mut memory, level, BidiType::ON, depth % 3 == 0)
                .unwrap();
            assert_eq!(stack.embedding_level(), level);
        }
        assert_eq!(stack.count(), STATUS_STACK_MAX_DEPTH);

        for depth in (0..STATUS_STACK_MAX_DEPTH).rev() {
            assert_eq!(stack.embedding_level() as usize, depth);
            assert_eq!(stack.isolate_status(), depth % 3 == 0);
            stack.pop(&memory);
        }
        assert_eq!(stack.count(), 0);
    }

    #[test]
    fn set_empty_reuses_lists() {
        let mut memory = memory();
        let mut stack = StatusStack::new();
        for _ in 0..40 {
            stack.push(&mut memory, 1, BidiType::R, false).unwrap();
        }
        let blocks = memory.block_count();
        stack.set_empty();
        assert_eq!(stack.count(), 0);

        for level in 0..40 {
            stack.push(&mut memory, level, BidiType::L, true).unwrap();
        }
        assert_eq!(memory.block_count(), blocks);
        assert_eq!(stack.embedding_level(), 39);
        assert_eq!(stack.override_status(), BidiType::L);
        assert!(stack.isolate_status());
    }

    proptest! {
        #[test]
        fn depth_tracks_pushes_and_pops(pushes in 1_usize..=STATUS_STACK_MAX_DEPTH, pops in 0_usize..=STATUS_STACK_MAX_DEPTH) {
            let pops = pops.min(pushes);
            let mut memory = memory();
            let mut stack = StatusStack::new();
            for depth in 0..pushes {
                #[allow(clippy::cast_possible_truncation, reason = "depth is below 128")]
                stack.push(&mut memory, depth as Level, BidiType::ON, false).unwrap();
            }
            for _ in 0..pops {
                stack.pop(&memory);
            }
            prop_assert_eq!(stack.count(), pushes - pops);
            if pushes > pops {
                prop_assert_eq!(stack.embedding_level() as usize, pushes - pops - 1);
            }
        }
    }
}
