// Copyright 2025 the Parley Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Paragraph resolution: explicit levels (rules X1 to X10) and the driver that hands each
//! isolating run sequence to [`IsolatingRun`].

use core::fmt;

use crate::algorithm::Algorithm;
use crate::allocator::AllocatorRef;
use crate::bidi_chain::{BidiChain, BidiLink, LINK_NONE};
use crate::bidi_type::{BaseLevel, BidiType, Level};
use crate::config::MAX_LEVEL;
use crate::error::Error;
use crate::isolating_run::{IsolatingRun, ParagraphInput};
use crate::level_run::LevelRun;
use crate::line::Line;
use crate::memory::{AllocError, Chunk, Memory};
use crate::object::Object;
use crate::run_queue::RunQueue;
use crate::status_stack::StatusStack;

/// Counters of rules X1 to X8 that live beside the status stack.
#[derive(Copy, Clone, Debug, Default)]
struct Overflow {
    isolate: usize,
    embedding: usize,
    valid_isolate: usize,
}

/// Working state of one paragraph resolution.
///
/// Everything here is allocated from a scratch arena that is released when the context is
/// dropped.
struct ParagraphContext<'a> {
    memory: Memory,
    chain: BidiChain,
    status_stack: StatusStack,
    run_queue: RunQueue,
    isolating_run: IsolatingRun,
    input: ParagraphInput<'a>,
}

impl<'a> ParagraphContext<'a> {
    fn new(allocator: AllocatorRef, input: ParagraphInput<'a>) -> Result<Self, AllocError> {
        let mut memory = Memory::new(allocator);
        let chain = BidiChain::new(&mut memory, input.bidi_types.len())?;
        let mut context = Self {
            memory,
            chain,
            status_stack: StatusStack::new(),
            run_queue: RunQueue::new(),
            isolating_run: IsolatingRun::new(),
            input,
        };
        context.populate_chain();
        Ok(context)
    }

    fn add_link(&mut self, bidi_type: BidiType, index: usize) {
        let length = index + 1 - self.chain.last() as usize;
        self.chain.add(&mut self.memory, bidi_type, length);
    }

    /// Builds the chain: one link per run of equal types, except that separators, `ON` and
    /// explicit formatting characters always get a link of their own.
    fn populate_chain(&mut self) {
        let types = self.input.bidi_types;
        let mut prior_type = BidiType::NIL;
        for (index, &bidi_type) in types.iter().enumerate() {
            match bidi_type {
                BidiType::B
                | BidiType::ON
                | BidiType::LRE
                | BidiType::RLE
                | BidiType::LRO
                | BidiType::RLO
                | BidiType::PDF
                | BidiType::LRI
                | BidiType::RLI
                | BidiType::FSI
                | BidiType::PDI => {
                    self.add_link(bidi_type, index);
                    if bidi_type == BidiType::B {
                        break;
                    }
                }
                _ if bidi_type != prior_type => self.add_link(bidi_type, index),
                _ => {}
            }
            prior_type = bidi_type;
        }
        self.add_link(BidiType::NIL, types.len());
    }

    /// Returns the link of the `PDI` closing the isolate opened at `skip_link`.
    fn skip_isolating_run(&self, skip_link: BidiLink, break_link: BidiLink) -> BidiLink {
        let mut depth = 1_usize;
        let mut link = self.chain.next(&self.memory, skip_link);
        while link != break_link {
            match self.chain.bidi_type(&self.memory, link) {
                BidiType::LRI | BidiType::RLI | BidiType::FSI => depth += 1,
                BidiType::PDI => {
                    depth -= 1;
                    if depth == 0 {
                        return link;
                    }
                }
                _ => {}
            }
            link = self.chain.next(&self.memory, link);
        }
        LINK_NONE
    }

    /// Rules P2 and P3 applied to the links after `skip_link`.
    fn determine_base_level(
        &self,
        skip_link: BidiLink,
        break_link: BidiLink,
        default_level: Level,
        is_isolate: bool,
    ) -> Level {
        let mut link = self.chain.next(&self.memory, skip_link);
        while link != break_link {
            match self.chain.bidi_type(&self.memory, link) {
                BidiType::L => return 0,
                BidiType::R | BidiType::AL => return 1,
                BidiType::LRI | BidiType::RLI | BidiType::FSI => {
                    link = self.skip_isolating_run(link, break_link);
                    if link == LINK_NONE {
                        break;
                    }
                }
                // Inside an isolate the matching PDI ends the search.
                BidiType::PDI if is_isolate => break,
                _ => {}
            }
            link = self.chain.next(&self.memory, link);
        }
        default_level
    }

    fn determine_paragraph_level(&self, base_level: BaseLevel) -> Level {
        let roller = self.chain.roller();
        match base_level {
            BaseLevel::Explicit(level) => {
                debug_assert!(level <= MAX_LEVEL, "explicit base level is out of range");
                level.min(MAX_LEVEL)
            }
            BaseLevel::DefaultLtr => self.determine_base_level(roller, roller, 0, false),
            BaseLevel::DefaultRtl => self.determine_base_level(roller, roller, 1, false),
        }
    }

    fn least_greater_odd_level(&self) -> Level {
        (self.status_stack.embedding_level() + 1) | 1
    }

    fn least_greater_even_level(&self) -> Level {
        (self.status_stack.embedding_level() + 2) & !1
    }

    /// Rules X2 to X5.
    fn push_embedding(
        &mut self,
        overflow: &mut Overflow,
        level: Level,
        override_status: BidiType,
    ) -> Result<(), AllocError> {
        if level <= MAX_LEVEL && overflow.isolate == 0 && overflow.embedding == 0 {
            self.status_stack
                .push(&mut self.memory, level, override_status, false)?;
        } else if overflow.isolate == 0 {
            overflow.embedding += 1;
        }
        Ok(())
    }

    /// Rules X5a to X5c. Returns `true` if `link` was merged into `prior_link`.
    fn push_isolate(
        &mut self,
        overflow: &mut Overflow,
        link: BidiLink,
        prior_link: BidiLink,
        level: Level,
    ) -> Result<bool, AllocError> {
        let prior_status = self.status_stack.override_status();
        self.chain
            .set_level(&mut self.memory, link, self.status_stack.embedding_level());

        if level <= MAX_LEVEL && overflow.isolate == 0 && overflow.embedding == 0 {
            overflow.valid_isolate += 1;
            self.status_stack
                .push(&mut self.memory, level, BidiType::ON, true)?;
        } else {
            overflow.isolate += 1;
        }

        Ok(self.apply_override(prior_status, link, prior_link))
    }

    /// Replaces the type of `link` with a pending override, merging it into `prior_link` when
    /// that leaves two equal neighbours. Returns `true` on a merge.
    fn apply_override(
        &mut self,
        override_status: BidiType,
        link: BidiLink,
        prior_link: BidiLink,
    ) -> bool {
        if override_status == BidiType::ON {
            return false;
        }
        self.chain.set_type(&mut self.memory, link, override_status);
        self.chain.merge_next(&mut self.memory, prior_link)
    }

    /// Rules X1 to X10 over the whole chain.
    fn determine_levels(&mut self, base_level: Level) -> Result<(), AllocError> {
        let roller = self.chain.roller();
        let mut prior_link = roller;
        let mut first_link = LINK_NONE;
        let mut prior_level = base_level;
        let mut sor = BidiType::NIL;
        let mut overflow = Overflow::default();

        // X1
        self.status_stack
            .push(&mut self.memory, base_level, BidiType::ON, false)?;

        let mut link = self.chain.next(&self.memory, roller);
        while link != roller {
            let current = link;
            link = self.chain.next(&self.memory, current);

            let mut bn_equivalent = false;
            let mut force_finish = false;

            match self.chain.bidi_type(&self.memory, current) {
                // X2 to X5
                BidiType::RLE => {
                    bn_equivalent = true;
                    let level = self.least_greater_odd_level();
                    self.push_embedding(&mut overflow, level, BidiType::ON)?;
                }
                BidiType::LRE => {
                    bn_equivalent = true;
                    let level = self.least_greater_even_level();
                    self.push_embedding(&mut overflow, level, BidiType::ON)?;
                }
                BidiType::RLO => {
                    bn_equivalent = true;
                    let level = self.least_greater_odd_level();
                    self.push_embedding(&mut overflow, level, BidiType::R)?;
                }
                BidiType::LRO => {
                    bn_equivalent = true;
                    let level = self.least_greater_even_level();
                    self.push_embedding(&mut overflow, level, BidiType::L)?;
                }
                // X5a to X5c
                isolate @ (BidiType::RLI | BidiType::LRI | BidiType::FSI) => {
                    let is_rtl = match isolate {
                        BidiType::RLI => true,
                        BidiType::LRI => false,
                        _ => self.determine_base_level(current, roller, 0, true) == 1,
                    };
                    let level = if is_rtl {
                        self.least_greater_odd_level()
                    } else {
                        self.least_greater_even_level()
                    };
                    if self.push_isolate(&mut overflow, current, prior_link, level)? {
                        continue;
                    }
                }
                // X6a
                BidiType::PDI => {
                    if overflow.isolate != 0 {
                        overflow.isolate -= 1;
                    } else if overflow.valid_isolate != 0 {
                        overflow.embedding = 0;
                        while !self.status_stack.isolate_status() {
                            self.status_stack.pop(&self.memory);
                        }
                        self.status_stack.pop(&self.memory);
                        overflow.valid_isolate -= 1;
                    }
                    self.chain
                        .set_level(&mut self.memory, current, self.status_stack.embedding_level());
                    let status = self.status_stack.override_status();
                    if self.apply_override(status, current, prior_link) {
                        continue;
                    }
                }
                // X7
                BidiType::PDF => {
                    bn_equivalent = true;
                    if overflow.isolate != 0 {
                        // An overflow isolate swallows the PDF.
                    } else if overflow.embedding != 0 {
                        overflow.embedding -= 1;
                    } else if !self.status_stack.isolate_status() && self.status_stack.count() >= 2
                    {
                        self.status_stack.pop(&self.memory);
                    }
                }
                // X8
                BidiType::B => {
                    self.status_stack.set_empty();
                    self.status_stack
                        .push(&mut self.memory, base_level, BidiType::ON, false)?;
                    overflow = Overflow::default();
                    self.chain.set_level(&mut self.memory, current, base_level);
                }
                BidiType::BN => bn_equivalent = true,
                BidiType::NIL => {
                    force_finish = true;
                    self.chain.set_level(&mut self.memory, current, base_level);
                }
                // X6
                _ => {
                    self.chain
                        .set_level(&mut self.memory, current, self.status_stack.embedding_level());
                    let status = self.status_stack.override_status();
                    if self.apply_override(status, current, prior_link) {
                        continue;
                    }
                }
            }

            // X9
            if bn_equivalent {
                self.chain.abandon_next(&mut self.memory, prior_link);
                continue;
            }

            let level = self.chain.level(&self.memory, current);
            if sor == BidiType::NIL {
                sor = BidiType::for_level(base_level.max(level));
                first_link = current;
                prior_level = level;
            } else if prior_level != level || force_finish {
                // The run ends at the prior link; `level` belongs to the next one.
                let eor = BidiType::for_level(prior_level.max(level));
                let run = LevelRun::new(&self.memory, &self.chain, first_link, prior_link, sor, eor);
                self.process_run(run, force_finish)?;

                sor = eor;
                first_link = current;
                prior_level = level;
            }

            prior_link = current;
        }
        Ok(())
    }

    /// Queues a level run and, once the paragraph is complete, resolves every isolating run
    /// sequence (rule X10).
    fn process_run(&mut self, run: LevelRun, resolve: bool) -> Result<(), AllocError> {
        self.run_queue.enqueue(&mut self.memory, run)?;
        if resolve {
            while self.run_queue.count() > 0 {
                let front = self.run_queue.front(&self.memory);
                if !front.kind.is_attached_terminating() {
                    self.isolating_run.resolve(
                        &mut self.memory,
                        &self.chain,
                        &self.run_queue,
                        &self.input,
                    )?;
                }
                self.run_queue.dequeue();
            }
        }
        Ok(())
    }

    /// Resolves the paragraph, writing one level per code unit into `levels`.
    fn resolve(&mut self, base_level: BaseLevel, levels: &mut [Level]) -> Result<Level, AllocError> {
        let paragraph_level = self.determine_paragraph_level(base_level);
        log::trace!("paragraph level: {paragraph_level}");

        self.input.level = paragraph_level;
        self.determine_levels(paragraph_level)?;
        self.chain.save_levels(&self.memory, levels, paragraph_level);
        log::trace!("embedding levels: {levels:?}");
        Ok(paragraph_level)
    }
}

struct ParagraphData<'a> {
    algorithm: Algorithm<'a>,
    offset: usize,
    length: usize,
    base_level: Level,
    levels: Chunk<Level>,
}

/// A paragraph with resolved embedding levels.
///
/// Created by [`Algorithm::create_paragraph`]. The paragraph keeps its algorithm alive and
/// shares ownership like the algorithm does: clones are cheap handles to the same levels.
#[derive(Clone)]
pub struct Paragraph<'a> {
    object: Object<ParagraphData<'a>>,
}

impl<'a> Paragraph<'a> {
    /// Resolves the paragraph covering `length` code units at `offset`.
    ///
    /// The range must already be a validated paragraph boundary.
    pub(crate) fn resolve(
        algorithm: Algorithm<'a>,
        offset: usize,
        length: usize,
        base_level: BaseLevel,
    ) -> Result<Self, Error> {
        let allocator = algorithm.allocator().clone();
        let input = ParagraphInput {
            sequence: algorithm.sequence(),
            bidi_types: &algorithm.bidi_types()[offset..offset + length],
            offset,
            level: 0,
        };

        let result = Object::try_create(
            allocator.clone(),
            &[length * size_of::<Level>()],
            |memory, chunks| {
                let levels = chunks[0].cast::<Level>();
                let mut context = ParagraphContext::new(allocator.clone(), input)?;
                let base_level = context.resolve(base_level, memory.slice_mut(levels))?;
                Ok::<_, Error>(ParagraphData {
                    algorithm: algorithm.clone(),
                    offset,
                    length,
                    base_level,
                    levels,
                })
            },
        );
        allocator.reset_scratch();

        Ok(Self { object: result? })
    }

    /// The algorithm this paragraph was created from.
    pub fn algorithm(&self) -> &Algorithm<'a> {
        &self.object.algorithm
    }

    /// Offset of the paragraph's first code unit in the sequence.
    pub fn offset(&self) -> usize {
        self.object.offset
    }

    /// Number of code units in the paragraph, including its separator.
    pub fn length(&self) -> usize {
        self.object.length
    }

    /// The resolved paragraph embedding level.
    pub fn base_level(&self) -> Level {
        self.object.base_level
    }

    /// The embedding level of every code unit of the paragraph.
    ///
    /// Code units removed by rule X9 report the level of the character before them, or the
    /// paragraph level at the start of the paragraph.
    pub fn levels(&self) -> &[Level] {
        self.object.memory().slice(self.object.levels)
    }

    /// Creates a line covering `length` code units at `offset` in the sequence.
    ///
    /// The range must be non-empty and lie within the paragraph.
    pub fn create_line(&self, offset: usize, length: usize) -> Result<Line<'a>, Error> {
        let end = self.offset() + self.length();
        match offset.checked_add(length) {
            Some(limit) if length > 0 && offset >= self.offset() && limit <= end => {
                Line::new(self.clone(), offset, length)
            }
            _ => Err(Error::invalid_range(
                offset,
                length,
                self.algorithm().sequence().len(),
            )),
        }
    }

    /// Adds a reference to the paragraph.
    #[must_use]
    pub fn retain(&self) -> Self {
        self.clone()
    }

    /// The number of live references to the paragraph.
    pub fn retain_count(&self) -> usize {
        self.object.retain_count()
    }
}

impl fmt::Debug for Paragraph<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Paragraph")
            .field("offset", &self.offset())
            .field("length", &self.length())
            .field("base_level", &self.base_level())
            .field("levels", &self.levels())
            .finish()
    }
}
