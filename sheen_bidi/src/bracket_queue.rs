// Copyright 2025 the Parley Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Bracket pair identification for rule N0 (BD16).
//!
//! Opening brackets are queued as they are seen. A closing bracket pairs with the most recent
//! open entry holding an equivalent bracket, and every entry opened after that one is dropped.
//! Once the scan is over the queue is marked populated and the complete pairs are dequeued in
//! the order of their opening brackets.

use bytemuck::{Pod, Zeroable};
use smallvec::SmallVec;

use crate::bidi_chain::{BidiLink, LINK_NONE};
use crate::bidi_type::BidiType;
use crate::config::BRACKET_QUEUE_MAX_OPEN_PAIRS;
use crate::memory::{AllocError, Chunk, Memory, MemoryKind};

const EMBEDDED_CAPACITY: usize = 8;

#[derive(Copy, Clone, Debug, PartialEq, Eq, Pod, Zeroable)]
#[repr(C)]
pub(crate) struct BracketEntry {
    prior_strong_link: BidiLink,
    opening_link: BidiLink,
    closing_link: BidiLink,
    /// The closing bracket this entry is waiting for.
    bracket: u32,
    inner_strong_type: BidiType,
    _padding: [u8; 3],
}

impl BracketEntry {
    const EMPTY: Self = Self {
        prior_strong_link: LINK_NONE,
        opening_link: LINK_NONE,
        closing_link: LINK_NONE,
        bracket: 0,
        inner_strong_type: BidiType::NIL,
        _padding: [0; 3],
    };

    fn is_open(&self) -> bool {
        self.opening_link != LINK_NONE && self.closing_link == LINK_NONE
    }

    fn is_complete(&self) -> bool {
        self.opening_link != LINK_NONE && self.closing_link != LINK_NONE
    }
}

/// Location of an entry: a list (0 is the embedded one) and an index within it.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
struct Position {
    list: usize,
    index: usize,
}

#[derive(Debug)]
pub(crate) struct BracketQueue {
    embedded: [BracketEntry; EMBEDDED_CAPACITY],
    lists: SmallVec<[Chunk<BracketEntry>; 4]>,
    rear_list: usize,
    /// Number of occupied entries in the rear list.
    rear_len: usize,
    front: Option<Position>,
    first_open_pair: Option<Position>,
    actual_count: usize,
    pair_count: usize,
    direction: BidiType,
    is_populated: bool,
}

impl BracketQueue {
    pub(crate) fn new() -> Self {
        Self {
            embedded: [BracketEntry::EMPTY; EMBEDDED_CAPACITY],
            lists: SmallVec::new(),
            rear_list: 0,
            rear_len: 0,
            front: None,
            first_open_pair: None,
            actual_count: 0,
            pair_count: 0,
            direction: BidiType::NIL,
            is_populated: false,
        }
    }

    /// Empties the queue for a new isolating run sequence whose embedding direction is
    /// `direction`. Allocated lists are kept.
    pub(crate) fn reset(&mut self, direction: BidiType) {
        self.rear_list = 0;
        self.rear_len = 0;
        self.front = None;
        self.first_open_pair = None;
        self.actual_count = 0;
        self.pair_count = 0;
        self.direction = direction;
        self.is_populated = false;
    }

    fn capacity(&self, list: usize) -> usize {
        match list {
            0 => EMBEDDED_CAPACITY,
            _ => self.lists[list - 1].len(),
        }
    }

    /// One past the last occupied index of `list`.
    fn end(&self, list: usize) -> usize {
        if list == self.rear_list {
            self.rear_len
        } else {
            self.capacity(list)
        }
    }

    fn entry(&self, memory: &Memory, position: Position) -> BracketEntry {
        match position.list {
            0 => self.embedded[position.index],
            list => memory.slice(self.lists[list - 1])[position.index],
        }
    }

    fn entry_mut<'a>(
        &'a mut self,
        memory: &'a mut Memory,
        position: Position,
    ) -> &'a mut BracketEntry {
        match position.list {
            0 => &mut self.embedded[position.index],
            list => &mut memory.slice_mut(self.lists[list - 1])[position.index],
        }
    }

    fn insert(&mut self, memory: &mut Memory) -> Result<Position, AllocError> {
        if self.rear_len < self.capacity(self.rear_list) {
            self.rear_len += 1;
        } else {
            if self.rear_list == self.lists.len() {
                let capacity = self.actual_count.max(EMBEDDED_CAPACITY);
                let list = memory
                    .allocate_array(MemoryKind::Scratch, capacity)
                    .ok_or(AllocError)?;
                self.lists.push(list);
            }
            self.rear_list += 1;
            self.rear_len = 1;
        }
        self.actual_count += 1;
        Ok(Position {
            list: self.rear_list,
            index: self.rear_len - 1,
        })
    }

    /// Records an opening bracket that pairs with the closing `bracket`.
    pub(crate) fn enqueue(
        &mut self,
        memory: &mut Memory,
        prior_strong_link: BidiLink,
        opening_link: BidiLink,
        bracket: char,
    ) -> Result<(), AllocError> {
        debug_assert!(!self.is_populated, "bracket queue is already populated");
        debug_assert!(
            self.open_pair_count() < BRACKET_QUEUE_MAX_OPEN_PAIRS,
            "too many open bracket pairs"
        );

        let position = self.insert(memory)?;
        *self.entry_mut(memory, position) = BracketEntry {
            prior_strong_link,
            opening_link,
            closing_link: LINK_NONE,
            bracket: bracket.into(),
            inner_strong_type: BidiType::NIL,
            _padding: [0; 3],
        };
        if self.first_open_pair.is_none() {
            self.first_open_pair = Some(position);
        }
        Ok(())
    }

    /// Visits positions from the rear back to `first`, stopping when `visit` returns `true`.
    fn scan_back(&self, first: Position, mut visit: impl FnMut(&Self, Position) -> bool) {
        let mut list = self.rear_list;
        loop {
            let start = if list == first.list { first.index } else { 0 };
            for index in (start..self.end(list)).rev() {
                if visit(self, Position { list, index }) {
                    return;
                }
            }
            if list == first.list {
                return;
            }
            list -= 1;
        }
    }

    /// Pairs `closing_link` with the latest open entry waiting for an equivalent bracket.
    ///
    /// Entries opened after the match are dropped. Nothing happens if there is no match.
    pub(crate) fn close_pair(&mut self, memory: &mut Memory, closing_link: BidiLink, bracket: char) {
        debug_assert!(!self.is_populated, "bracket queue is already populated");

        let Some(first) = self.first_open_pair else {
            return;
        };
        let mut matched = None;
        self.scan_back(first, |queue, position| {
            let entry = queue.entry(memory, position);
            let is_match = entry.is_open()
                && char::from_u32(entry.bracket)
                    .is_some_and(|open| sheen_bidi_data::is_equivalent_bracket(open, bracket));
            if is_match {
                matched = Some(position);
            }
            is_match
        });
        let Some(position) = matched else {
            return;
        };

        self.entry_mut(memory, position).closing_link = closing_link;
        self.pair_count += 1;
        self.invalidate_open_pairs(memory, position);
        if self.first_open_pair == Some(position) {
            self.first_open_pair = None;
        }
    }

    fn invalidate_open_pairs(&mut self, memory: &mut Memory, from: Position) {
        let mut invalid = 0;
        let mut position = from;
        while position.list <= self.rear_list {
            while position.index < self.end(position.list) {
                let entry = self.entry_mut(memory, position);
                if entry.is_open() {
                    entry.opening_link = LINK_NONE;
                    invalid += 1;
                }
                position.index += 1;
            }
            position = Position {
                list: position.list + 1,
                index: 0,
            };
        }
        self.actual_count -= invalid;
    }

    /// Records a strong type seen inside every currently open entry.
    ///
    /// An entry that already saw the embedding direction keeps it.
    pub(crate) fn assign_inner_strong_type(&mut self, memory: &mut Memory, strong_type: BidiType) {
        debug_assert!(!self.is_populated, "bracket queue is already populated");
        debug_assert!(
            strong_type == BidiType::L || strong_type == BidiType::R,
            "inner strong type must be L or R"
        );

        let Some(first) = self.first_open_pair else {
            return;
        };
        let mut positions = SmallVec::<[Position; 16]>::new();
        self.scan_back(first, |_, position| {
            positions.push(position);
            false
        });
        let direction = self.direction;
        for position in positions {
            let entry = self.entry_mut(memory, position);
            if entry.closing_link == LINK_NONE && entry.inner_strong_type != direction {
                entry.inner_strong_type = strong_type;
            }
        }
    }

    /// Ends the scanning phase and moves the front to the first complete pair.
    pub(crate) fn mark_populated(&mut self, memory: &Memory) {
        debug_assert!(!self.is_populated, "bracket queue is already populated");

        if self.pair_count > 0 {
            let first = Position { list: 0, index: 0 };
            self.front = Some(first);
            if !self.entry(memory, first).is_complete() {
                self.skip_to_next_pair(memory);
            }
        }
        self.actual_count = 0;
        self.is_populated = true;
    }

    /// Consumes the front pair.
    pub(crate) fn dequeue(&mut self, memory: &Memory) {
        debug_assert!(
            self.is_populated && self.pair_count > 0,
            "bracket queue dequeued while empty"
        );
        self.skip_to_next_pair(memory);
    }

    fn skip_to_next_pair(&mut self, memory: &Memory) {
        let Some(mut position) = self.front else {
            return;
        };
        let mut has_processed_first = false;
        while position.list <= self.rear_list {
            while position.index < self.end(position.list) {
                if self.entry(memory, position).is_complete() {
                    if has_processed_first {
                        self.front = Some(position);
                        return;
                    }
                    self.pair_count -= 1;
                }
                has_processed_first = true;
                position.index += 1;
            }
            position = Position {
                list: position.list + 1,
                index: 0,
            };
        }
        self.front = None;
    }

    pub(crate) fn pair_count(&self) -> usize {
        self.pair_count
    }

    pub(crate) fn open_pair_count(&self) -> usize {
        self.actual_count - self.pair_count
    }

    fn front(&self, memory: &Memory) -> BracketEntry {
        self.front
            .map_or(BracketEntry::EMPTY, |position| self.entry(memory, position))
    }

    pub(crate) fn prior_strong_link(&self, memory: &Memory) -> BidiLink {
        self.front(memory).prior_strong_link
    }

    pub(crate) fn opening_link(&self, memory: &Memory) -> BidiLink {
        self.front(memory).opening_link
    }

    pub(crate) fn closing_link(&self, memory: &Memory) -> BidiLink {
        self.front(memory).closing_link
    }

    pub(crate) fn inner_strong_type(&self, memory: &Memory) -> BidiType {
        self.front(memory).inner_strong_type
    }
}
