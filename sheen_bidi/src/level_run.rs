// Copyright 2025 the Parley Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use bytemuck::{Pod, Zeroable};

use crate::bidi_chain::{BidiChain, BidiLink};
use crate::bidi_type::{BidiType, Level};
use crate::memory::Memory;

/// Index of a run in the run queue, or [`RUN_NONE`].
pub(crate) type RunIndex = u32;

pub(crate) const RUN_NONE: RunIndex = u32::MAX;

/// Flags describing how a level run takes part in an isolating run sequence.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Pod, Zeroable)]
#[repr(transparent)]
pub(crate) struct RunKind(u8);

impl RunKind {
    pub(crate) const SIMPLE: Self = Self(0);
    const ISOLATE_BIT: u8 = 0x01;
    const PARTIAL_BIT: u8 = 0x02;
    const TERMINATING_BIT: u8 = 0x04;
    const ATTACHED_BIT: u8 = 0x08;

    /// Ends with an isolate initiator whose matching terminator has not been seen.
    pub(crate) const PARTIAL_ISOLATE: Self = Self(Self::ISOLATE_BIT | Self::PARTIAL_BIT);
    /// Starts with `PDI`.
    pub(crate) const TERMINATING: Self = Self(Self::TERMINATING_BIT);

    pub(crate) fn is_isolate(self) -> bool {
        self.0 & Self::ISOLATE_BIT != 0
    }

    pub(crate) fn is_partial_isolate(self) -> bool {
        self.0 & Self::PARTIAL_BIT != 0
    }

    pub(crate) fn is_terminating(self) -> bool {
        self.0 & Self::TERMINATING_BIT != 0
    }

    pub(crate) fn is_attached_terminating(self) -> bool {
        let flags = Self::TERMINATING_BIT | Self::ATTACHED_BIT;
        self.0 & flags == flags
    }

    fn complete(self) -> Self {
        Self(self.0 & !Self::PARTIAL_BIT)
    }

    fn attached(self) -> Self {
        Self(self.0 | Self::ATTACHED_BIT)
    }
}

/// A maximal span of chain links sharing one embedding level.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Pod, Zeroable)]
#[repr(C)]
pub(crate) struct LevelRun {
    pub(crate) first_link: BidiLink,
    pub(crate) last_link: BidiLink,
    /// The link following the run in the paragraph.
    pub(crate) subsequent_link: BidiLink,
    /// The run continuing this one's isolating run sequence.
    pub(crate) next: RunIndex,
    pub(crate) sor: BidiType,
    pub(crate) eor: BidiType,
    pub(crate) kind: RunKind,
    pub(crate) level: Level,
}

impl LevelRun {
    pub(crate) fn new(
        memory: &Memory,
        chain: &BidiChain,
        first_link: BidiLink,
        last_link: BidiLink,
        sor: BidiType,
        eor: BidiType,
    ) -> Self {
        let mut kind = RunKind::SIMPLE;
        if chain.bidi_type(memory, last_link).is_isolate_initiator() {
            kind = RunKind(kind.0 | RunKind::PARTIAL_ISOLATE.0);
        }
        if chain.bidi_type(memory, first_link) == BidiType::PDI {
            kind = RunKind(kind.0 | RunKind::TERMINATING.0);
        }
        Self {
            first_link,
            last_link,
            subsequent_link: chain.next(memory, last_link),
            next: RUN_NONE,
            sor,
            eor,
            kind,
            level: chain.level(memory, first_link),
        }
    }

    /// Links this partial isolate run to the terminating run at `next`.
    pub(crate) fn attach(&mut self, next: RunIndex, next_run: &mut Self) {
        debug_assert!(self.next == RUN_NONE, "level run is already attached");
        debug_assert!(
            self.kind.is_isolate()
                && self.kind.is_partial_isolate()
                && next_run.kind.is_terminating(),
            "only a partial isolate can attach to a terminating run"
        );
        self.kind = self.kind.complete();
        next_run.kind = next_run.kind.attached();
        self.next = next;
    }
}
