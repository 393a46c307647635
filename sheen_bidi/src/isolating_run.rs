// Copyright 2025 the Parley Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Resolution of one isolating run sequence: weak types (W1 to W7), paired brackets (N0),
//! remaining neutrals (N1, N2) and implicit levels (I1, I2).
//!
//! The links of the sequence are gathered from its level runs into a flat list, and the
//! weak and neutral rules work on a parallel list of types indexed by position in that
//! list. Only the final levels are written back to the chain.

use sheen_bidi_data::{BracketType, Properties};

use crate::bidi_chain::{BidiChain, BidiLink, LINK_NONE};
use crate::bidi_type::{BidiType, Level};
use crate::bracket_queue::BracketQueue;
use crate::codepoint_sequence::CodepointSequence;
use crate::config::BRACKET_QUEUE_MAX_OPEN_PAIRS;
use crate::level_run::RUN_NONE;
use crate::memory::{AllocError, Memory};
use crate::run_queue::RunQueue;

/// What the resolver needs to know about the paragraph being resolved.
#[derive(Copy, Clone, Debug)]
pub(crate) struct ParagraphInput<'a> {
    pub(crate) sequence: CodepointSequence<'a>,
    /// Types of the paragraph's code units, before any rule was applied.
    pub(crate) bidi_types: &'a [BidiType],
    /// Offset of the paragraph in `sequence`.
    pub(crate) offset: usize,
    pub(crate) level: Level,
}

impl ParagraphInput<'_> {
    fn original_type(&self, link: BidiLink) -> BidiType {
        self.bidi_types[BidiChain::offset(link)]
    }

    fn codepoint(&self, link: BidiLink) -> char {
        self.sequence.decode(self.offset + BidiChain::offset(link)).0
    }
}

/// Maps a resolved type to the strong direction it counts as for rules N0 to N2.
fn strong_direction(bidi_type: BidiType) -> Option<BidiType> {
    match bidi_type {
        BidiType::L => Some(BidiType::L),
        BidiType::R | BidiType::EN | BidiType::AN => Some(BidiType::R),
        _ => None,
    }
}

#[derive(Debug)]
pub(crate) struct IsolatingRun {
    brackets: BracketQueue,
    links: Vec<BidiLink>,
    types: Vec<BidiType>,
    sos: BidiType,
    eos: BidiType,
    level: Level,
}

impl IsolatingRun {
    pub(crate) fn new() -> Self {
        Self {
            brackets: BracketQueue::new(),
            links: Vec::new(),
            types: Vec::new(),
            sos: BidiType::NIL,
            eos: BidiType::NIL,
            level: 0,
        }
    }

    /// Resolves the sequence that starts with the front run of `runs`.
    pub(crate) fn resolve(
        &mut self,
        memory: &mut Memory,
        chain: &BidiChain,
        runs: &RunQueue,
        input: &ParagraphInput<'_>,
    ) -> Result<(), AllocError> {
        self.gather(memory, chain, runs, input);
        log::trace!(
            "isolating run: level {}, sos {}, eos {}, {} links",
            self.level,
            self.sos,
            self.eos,
            self.links.len()
        );

        self.resolve_weak_types(memory, chain, input);
        self.resolve_brackets(memory, input)?;
        self.resolve_neutral_types();
        self.resolve_implicit_levels(memory, chain);
        Ok(())
    }

    fn gather(
        &mut self,
        memory: &Memory,
        chain: &BidiChain,
        runs: &RunQueue,
        input: &ParagraphInput<'_>,
    ) {
        self.links.clear();
        self.types.clear();

        let first = runs.front(memory);
        let mut run = first;
        let last = loop {
            let mut link = run.first_link;
            loop {
                self.links.push(link);
                self.types.push(chain.bidi_type(memory, link));
                if link == run.last_link {
                    break;
                }
                link = chain.next(memory, link);
            }
            if run.next == RUN_NONE {
                break run;
            }
            run = runs.get(memory, run.next as usize);
        };

        self.level = first.level;
        self.sos = first.sor;
        self.eos = if last.kind.is_partial_isolate() {
            BidiType::for_level(last.level.max(input.level))
        } else {
            last.eor
        };
    }

    fn resolve_weak_types(&mut self, memory: &Memory, chain: &BidiChain, input: &ParagraphInput<'_>) {
        let types = &mut self.types;
        let count = types.len();

        // W1
        for index in 0..count {
            if types[index] == BidiType::NSM {
                types[index] = match index {
                    0 => self.sos,
                    _ if types[index - 1].is_isolate() => BidiType::ON,
                    _ => types[index - 1],
                };
            }
        }

        // W2, W3
        let mut last_strong = self.sos;
        for bidi_type in types.iter_mut() {
            match *bidi_type {
                BidiType::L | BidiType::R => last_strong = *bidi_type,
                BidiType::AL => {
                    last_strong = BidiType::AL;
                    *bidi_type = BidiType::R;
                }
                BidiType::EN if last_strong == BidiType::AL => *bidi_type = BidiType::AN,
                _ => {}
            }
        }

        // W4
        for index in 1..count.saturating_sub(1) {
            let (before, after) = (types[index - 1], types[index + 1]);
            let separates = match types[index] {
                BidiType::ES => before == BidiType::EN && after == BidiType::EN,
                BidiType::CS => before == after && before.is_number(),
                _ => false,
            };
            if separates && chain.is_single(memory, self.links[index], input.bidi_types) {
                types[index] = before;
            }
        }

        // W5
        let mut index = 0;
        while index < count {
            if types[index] != BidiType::ET {
                index += 1;
                continue;
            }
            let start = index;
            while index < count && types[index] == BidiType::ET {
                index += 1;
            }
            let touches_number = (start > 0 && types[start - 1] == BidiType::EN)
                || (index < count && types[index] == BidiType::EN);
            if touches_number {
                types[start..index].fill(BidiType::EN);
            }
        }

        // W6
        for bidi_type in types.iter_mut() {
            if matches!(*bidi_type, BidiType::ES | BidiType::ET | BidiType::CS) {
                *bidi_type = BidiType::ON;
            }
        }

        // W7
        let mut last_strong = self.sos;
        for bidi_type in types.iter_mut() {
            match *bidi_type {
                BidiType::L | BidiType::R => last_strong = *bidi_type,
                BidiType::EN if last_strong == BidiType::L => *bidi_type = BidiType::L,
                _ => {}
            }
        }
    }

    /// Identifies bracket pairs (BD16) and resolves them (N0).
    ///
    /// Positions in the sequence stand in for links in the bracket queue.
    fn resolve_brackets(
        &mut self,
        memory: &mut Memory,
        input: &ParagraphInput<'_>,
    ) -> Result<(), AllocError> {
        let direction = BidiType::for_level(self.level);
        self.brackets.reset(direction);

        let mut prior_strong = LINK_NONE;
        for index in 0..self.types.len() {
            #[allow(
                clippy::cast_possible_truncation,
                reason = "a sequence has no more positions than the chain has links"
            )]
            let position = index as BidiLink;
            let bidi_type = self.types[index];
            if bidi_type == BidiType::ON {
                let ch = input.codepoint(self.links[index]);
                let properties = Properties::get(ch);
                match properties.bracket_type() {
                    BracketType::Open => {
                        if self.brackets.open_pair_count() >= BRACKET_QUEUE_MAX_OPEN_PAIRS {
                            break;
                        }
                        let Some(closing) = properties.mirror_glyph() else {
                            continue;
                        };
                        self.brackets
                            .enqueue(memory, prior_strong, position, closing)?;
                    }
                    BracketType::Close => self.brackets.close_pair(memory, position, ch),
                    BracketType::None => {}
                }
            } else if let Some(strong) = strong_direction(bidi_type) {
                prior_strong = position;
                self.brackets.assign_inner_strong_type(memory, strong);
            }
        }
        self.brackets.mark_populated(memory);

        while self.brackets.pair_count() > 0 {
            let opening = self.brackets.opening_link(memory) as usize;
            let closing = self.brackets.closing_link(memory) as usize;
            let inner = self.brackets.inner_strong_type(memory);
            let prior = self.brackets.prior_strong_link(memory);
            self.brackets.dequeue(memory);

            let resolved = if inner == direction {
                direction
            } else if inner == BidiType::NIL {
                continue;
            } else if self.preceding_strong(opening, prior) == inner {
                inner
            } else {
                direction
            };
            self.set_bracket(opening, resolved, input);
            self.set_bracket(closing, resolved, input);
        }
        Ok(())
    }

    /// The strong direction established before `opening`, looking back no further than
    /// `prior`, where the last strong type was when the bracket was seen.
    fn preceding_strong(&self, opening: usize, prior: BidiLink) -> BidiType {
        let start = if prior == LINK_NONE { 0 } else { prior as usize };
        self.types[start..opening]
            .iter()
            .rev()
            .find_map(|&bidi_type| strong_direction(bidi_type))
            .unwrap_or(self.sos)
    }

    fn set_bracket(&mut self, position: usize, bidi_type: BidiType, input: &ParagraphInput<'_>) {
        self.types[position] = bidi_type;
        for index in position + 1..self.types.len() {
            if input.original_type(self.links[index]) != BidiType::NSM {
                break;
            }
            self.types[index] = bidi_type;
        }
    }

    /// Rules N1 and N2.
    fn resolve_neutral_types(&mut self) {
        let embedding = BidiType::for_level(self.level);
        let count = self.types.len();
        let mut index = 0;
        while index < count {
            if !self.types[index].is_neutral_or_isolate() {
                index += 1;
                continue;
            }
            let start = index;
            while index < count && self.types[index].is_neutral_or_isolate() {
                index += 1;
            }
            let before = match start {
                0 => Some(self.sos),
                _ => strong_direction(self.types[start - 1]),
            };
            let after = if index == count {
                Some(self.eos)
            } else {
                strong_direction(self.types[index])
            };
            let resolved = match (before, after) {
                (Some(before), Some(after)) if before == after => before,
                _ => embedding,
            };
            self.types[start..index].fill(resolved);
        }
    }

    /// Rules I1 and I2.
    fn resolve_implicit_levels(&self, memory: &mut Memory, chain: &BidiChain) {
        for (&link, &bidi_type) in self.links.iter().zip(&self.types) {
            let level = chain.level(memory, link);
            let raise = match (level & 1 == 0, bidi_type) {
                (true, BidiType::R) => 1,
                (true, BidiType::AN | BidiType::EN) => 2,
                (false, BidiType::L | BidiType::AN | BidiType::EN) => 1,
                _ => 0,
            };
            chain.set_level(memory, link, level + raise);
        }
    }
}
