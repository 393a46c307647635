// Copyright 2025 the Parley Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The paragraph's run-length compressed, singly linked list of bidi types.
//!
//! Link `i + 1` stands for the code unit at paragraph offset `i`; link 0 is the roller, a
//! sentinel that the last link points back to. A link covers every code unit up to the next
//! link, so removing a link from the list (rule X9) folds its code units into its predecessor
//! without touching any other storage.

use crate::bidi_type::{BidiType, Level};
use crate::memory::{AllocError, Chunk, Memory, MemoryKind};

pub(crate) type BidiLink = u32;

/// A link index that refers to nothing.
pub(crate) const LINK_NONE: BidiLink = u32::MAX;

/// Level marker of links that have not been resolved yet.
pub(crate) const LEVEL_INVALID: Level = u8::MAX;

#[derive(Debug)]
pub(crate) struct BidiChain {
    types: Chunk<BidiType>,
    levels: Chunk<Level>,
    links: Chunk<BidiLink>,
    roller: BidiLink,
    last: BidiLink,
}

impl BidiChain {
    /// Allocates a chain able to hold one link per code unit plus the two sentinels.
    pub(crate) fn new(memory: &mut Memory, length: usize) -> Result<Self, AllocError> {
        let count = length.checked_add(2).ok_or(AllocError)?;
        let chunks = memory
            .allocate_chunks(
                MemoryKind::Scratch,
                &[
                    count * size_of::<BidiType>(),
                    count * size_of::<Level>(),
                    count * size_of::<BidiLink>(),
                ],
            )
            .ok_or(AllocError)?;
        let chain = Self {
            types: chunks[0].cast(),
            levels: chunks[1].cast(),
            links: chunks[2].cast(),
            roller: 0,
            last: 0,
        };
        memory.slice_mut(chain.types)[0] = BidiType::NIL;
        memory.slice_mut(chain.levels)[0] = LEVEL_INVALID;
        memory.slice_mut(chain.links)[0] = chain.roller;
        Ok(chain)
    }

    pub(crate) fn roller(&self) -> BidiLink {
        self.roller
    }

    pub(crate) fn last(&self) -> BidiLink {
        self.last
    }

    /// The paragraph offset of the first code unit covered by `link`.
    #[inline]
    pub(crate) fn offset(link: BidiLink) -> usize {
        link as usize - 1
    }

    /// Appends a link of `bidi_type` after the previous one, which spanned `length` units.
    pub(crate) fn add(&mut self, memory: &mut Memory, bidi_type: BidiType, length: usize) {
        let last = self.last;
        #[allow(
            clippy::cast_possible_truncation,
            reason = "sequence lengths are validated to fit a link index"
        )]
        let current = last + length as BidiLink;

        memory.slice_mut(self.types)[current as usize] = bidi_type;
        let links = memory.slice_mut(self.links);
        links[current as usize] = self.roller;
        links[last as usize] = current;

        self.last = current;
    }

    #[inline]
    pub(crate) fn next(&self, memory: &Memory, link: BidiLink) -> BidiLink {
        memory.slice(self.links)[link as usize]
    }

    #[inline]
    pub(crate) fn bidi_type(&self, memory: &Memory, link: BidiLink) -> BidiType {
        memory.slice(self.types)[link as usize]
    }

    #[inline]
    pub(crate) fn set_type(&self, memory: &mut Memory, link: BidiLink, bidi_type: BidiType) {
        memory.slice_mut(self.types)[link as usize] = bidi_type;
    }

    #[inline]
    pub(crate) fn level(&self, memory: &Memory, link: BidiLink) -> Level {
        memory.slice(self.levels)[link as usize]
    }

    #[inline]
    pub(crate) fn set_level(&self, memory: &mut Memory, link: BidiLink, level: Level) {
        memory.slice_mut(self.levels)[link as usize] = level;
    }

    /// Returns `true` if every code unit after the first one in `link` was removed by rule X9.
    pub(crate) fn is_single(&self, memory: &Memory, link: BidiLink, bidi_types: &[BidiType]) -> bool {
        let next = self.next(memory, link);
        let start = Self::offset(link) + 1;
        let end = if next == self.roller {
            bidi_types.len()
        } else {
            Self::offset(next)
        };
        bidi_types[start.min(end)..end]
            .iter()
            .all(|bidi_type| bidi_type.is_removed_by_x9())
    }

    /// Unlinks the link following `link`, folding its code units into `link`.
    pub(crate) fn abandon_next(&self, memory: &mut Memory, link: BidiLink) {
        let links = memory.slice_mut(self.links);
        let next = links[link as usize];
        links[link as usize] = links[next as usize];
    }

    /// Folds the link following `first` into it if both have the same type and level.
    pub(crate) fn merge_next(&self, memory: &mut Memory, first: BidiLink) -> bool {
        let second = self.next(memory, first);
        if self.bidi_type(memory, first) == self.bidi_type(memory, second)
            && self.level(memory, first) == self.level(memory, second)
        {
            self.abandon_next(memory, first);
            true
        } else {
            false
        }
    }

    /// Writes the level of every code unit into `levels`, indexed by paragraph offset.
    ///
    /// Units folded into a link take that link's level; units before the first link take
    /// `base_level`.
    pub(crate) fn save_levels(&self, memory: &Memory, levels: &mut [Level], base_level: Level) {
        let mut index = 0;
        let mut level = base_level;
        let mut link = self.next(memory, self.roller);
        while link != self.roller {
            let offset = Self::offset(link).min(levels.len());
            levels[index..offset].fill(level);
            index = offset;
            level = self.level(memory, link);
            link = self.next(memory, link);
        }
        levels[index..].fill(level);
    }
}
