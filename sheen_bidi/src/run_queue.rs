// Copyright 2025 the Parley Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! FIFO of level runs that stitches isolate initiators to their terminators.
//!
//! Runs are addressed by their absolute enqueue index. Storage is a sequence of fixed-size
//! nodes: node 0 is inline, further nodes come from the arena in one bulk allocation and are
//! recycled through a free list as the front moves past them.

use std::collections::VecDeque;

use smallvec::SmallVec;

use crate::bidi_type::BidiType;
use crate::level_run::{LevelRun, RunIndex, RunKind, RUN_NONE};
use crate::memory::{AllocError, Chunk, Memory, MemoryKind};

const NODE_CAPACITY: usize = 8;

type NodeId = usize;

#[derive(Debug)]
pub(crate) struct RunQueue {
    embedded: [LevelRun; NODE_CAPACITY],
    /// Arena nodes; node id `k > 0` lives at `nodes[k - 1]`.
    nodes: SmallVec<[Chunk<LevelRun>; 4]>,
    /// Node ids holding the runs from the front block onwards.
    active: VecDeque<NodeId>,
    reusable: SmallVec<[NodeId; 8]>,
    front: usize,
    count: usize,
    partial: Option<usize>,
}

impl RunQueue {
    pub(crate) fn new() -> Self {
        let empty = LevelRun {
            first_link: 0,
            last_link: 0,
            subsequent_link: 0,
            next: RUN_NONE,
            sor: BidiType::NIL,
            eor: BidiType::NIL,
            kind: RunKind::SIMPLE,
            level: 0,
        };
        let mut reusable = SmallVec::new();
        reusable.push(0);
        Self {
            embedded: [empty; NODE_CAPACITY],
            nodes: SmallVec::new(),
            active: VecDeque::new(),
            reusable,
            front: 0,
            count: 0,
            partial: None,
        }
    }

    pub(crate) fn count(&self) -> usize {
        self.count
    }

    fn slot(&self, index: usize) -> (NodeId, usize) {
        debug_assert!(
            index >= self.front && index < self.front + self.count,
            "run index outside the queue"
        );
        let block = index / NODE_CAPACITY - self.front / NODE_CAPACITY;
        (self.active[block], index % NODE_CAPACITY)
    }

    /// Reads the run at absolute `index`.
    pub(crate) fn get(&self, memory: &Memory, index: usize) -> LevelRun {
        match self.slot(index) {
            (0, offset) => self.embedded[offset],
            (node, offset) => memory.slice(self.nodes[node - 1])[offset],
        }
    }

    fn set(&mut self, memory: &mut Memory, index: usize, run: LevelRun) {
        match self.slot(index) {
            (0, offset) => self.embedded[offset] = run,
            (node, offset) => memory.slice_mut(self.nodes[node - 1])[offset] = run,
        }
    }

    /// The oldest run that has not been dequeued.
    pub(crate) fn front(&self, memory: &Memory) -> LevelRun {
        self.get(memory, self.front)
    }

    fn acquire_node(&mut self, memory: &mut Memory) -> Result<NodeId, AllocError> {
        if self.reusable.is_empty() {
            let count = (self.count / NODE_CAPACITY).max(1);
            let size = NODE_CAPACITY * size_of::<LevelRun>();
            let sizes = SmallVec::<[usize; 8]>::from_elem(size, count);
            let chunks = memory
                .allocate_chunks(MemoryKind::Scratch, &sizes)
                .ok_or(AllocError)?;
            for chunk in chunks {
                self.nodes.push(chunk.cast());
                self.reusable.push(self.nodes.len());
            }
        }
        self.reusable.pop().ok_or(AllocError)
    }

    /// Appends a run, attaching it to the pending partial isolate if it terminates one.
    pub(crate) fn enqueue(&mut self, memory: &mut Memory, run: LevelRun) -> Result<(), AllocError> {
        let rear = self.front + self.count;
        if rear % NODE_CAPACITY == 0 || self.active.is_empty() {
            let node = self.acquire_node(memory)?;
            self.active.push_back(node);
        }
        self.count += 1;

        let mut run = run;
        #[allow(
            clippy::cast_possible_truncation,
            reason = "a paragraph has fewer runs than code units, which fit a link index"
        )]
        let rear_index = rear as RunIndex;

        if let (Some(partial), true) = (self.partial, run.kind.is_terminating()) {
            let mut partial_run = self.get(memory, partial);
            partial_run.attach(rear_index, &mut run);
            self.set(memory, partial, partial_run);
            self.set(memory, rear, run);
            self.partial = self.find_previous_partial(memory, partial);
        } else {
            self.set(memory, rear, run);
        }

        if run.kind.is_partial_isolate() {
            self.partial = Some(rear);
        }
        Ok(())
    }

    fn find_previous_partial(&self, memory: &Memory, from: usize) -> Option<usize> {
        (self.front..from)
            .rev()
            .find(|&index| self.get(memory, index).kind.is_partial_isolate())
    }

    /// Removes the front run.
    pub(crate) fn dequeue(&mut self) {
        debug_assert!(self.count > 0, "run queue dequeued while empty");

        self.front += 1;
        self.count -= 1;
        if self.front % NODE_CAPACITY == 0 {
            if let Some(node) = self.active.pop_front() {
                self.reusable.push(node);
            }
        }
        if self.count == 0 && !self.active.is_empty() {
            // Restart the empty queue at a node boundary so no partial node lingers.
            self.front = self.front.next_multiple_of(NODE_CAPACITY);
            self.reusable.extend(self.active.drain(..));
        }
        if self.partial.is_some_and(|partial| partial < self.front) {
            self.partial = None;
        }
    }
}
