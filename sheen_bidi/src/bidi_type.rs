// Copyright 2025 the Parley Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use core::fmt;

use bytemuck::{Pod, Zeroable};
use sheen_bidi_data::{BidiClass, Properties};

/// A resolved embedding level, 0 to 125 inclusive.
///
/// Even levels are left-to-right, odd levels are right-to-left.
pub type Level = u8;

/// The requested base level of a paragraph.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum BaseLevel {
    /// Use the given level, which must not exceed [`MAX_LEVEL`](crate::config::MAX_LEVEL).
    Explicit(Level),
    /// Detect the level from the first strong character, defaulting to left-to-right.
    #[default]
    DefaultLtr,
    /// Detect the level from the first strong character, defaulting to right-to-left.
    DefaultRtl,
}

/// A bidirectional character type.
///
/// This is a transparent wrapper over the type code so it can be stored directly in arena
/// memory. [`BidiType::NIL`] marks the chain sentinel and never comes from character data.
#[derive(Copy, Clone, Default, PartialEq, Eq, Hash, Pod, Zeroable)]
#[repr(transparent)]
pub struct BidiType(u8);

#[allow(missing_docs, reason = "the names are the UAX #9 abbreviations")]
impl BidiType {
    pub const NIL: Self = Self(0);
    pub const L: Self = Self(1);
    pub const R: Self = Self(2);
    pub const AL: Self = Self(3);
    pub const EN: Self = Self(4);
    pub const ES: Self = Self(5);
    pub const ET: Self = Self(6);
    pub const AN: Self = Self(7);
    pub const CS: Self = Self(8);
    pub const NSM: Self = Self(9);
    pub const BN: Self = Self(10);
    pub const B: Self = Self(11);
    pub const S: Self = Self(12);
    pub const WS: Self = Self(13);
    pub const ON: Self = Self(14);
    pub const LRE: Self = Self(15);
    pub const RLE: Self = Self(16);
    pub const LRO: Self = Self(17);
    pub const RLO: Self = Self(18);
    pub const PDF: Self = Self(19);
    pub const LRI: Self = Self(20);
    pub const RLI: Self = Self(21);
    pub const FSI: Self = Self(22);
    pub const PDI: Self = Self(23);
}

const NAMES: [&str; 24] = [
    "Nil", "L", "R", "AL", "EN", "ES", "ET", "AN", "CS", "NSM", "BN", "B", "S", "WS", "ON", "LRE",
    "RLE", "LRO", "RLO", "PDF", "LRI", "RLI", "FSI", "PDI",
];

impl BidiType {
    /// Looks up the type of a character.
    pub fn of(ch: char) -> Self {
        match Properties::get(ch).bidi_class() {
            BidiClass::LeftToRight => Self::L,
            BidiClass::RightToLeft => Self::R,
            BidiClass::ArabicLetter => Self::AL,
            BidiClass::EuropeanNumber => Self::EN,
            BidiClass::EuropeanSeparator => Self::ES,
            BidiClass::EuropeanTerminator => Self::ET,
            BidiClass::ArabicNumber => Self::AN,
            BidiClass::CommonSeparator => Self::CS,
            BidiClass::NonspacingMark => Self::NSM,
            BidiClass::BoundaryNeutral => Self::BN,
            BidiClass::ParagraphSeparator => Self::B,
            BidiClass::SegmentSeparator => Self::S,
            BidiClass::WhiteSpace => Self::WS,
            BidiClass::LeftToRightEmbedding => Self::LRE,
            BidiClass::RightToLeftEmbedding => Self::RLE,
            BidiClass::LeftToRightOverride => Self::LRO,
            BidiClass::RightToLeftOverride => Self::RLO,
            BidiClass::PopDirectionalFormat => Self::PDF,
            BidiClass::LeftToRightIsolate => Self::LRI,
            BidiClass::RightToLeftIsolate => Self::RLI,
            BidiClass::FirstStrongIsolate => Self::FSI,
            BidiClass::PopDirectionalIsolate => Self::PDI,
            _ => Self::ON,
        }
    }

    /// The normal strong type implied by an embedding level: `L` for even, `R` for odd.
    #[inline]
    pub fn for_level(level: Level) -> Self {
        if level & 1 == 0 {
            Self::L
        } else {
            Self::R
        }
    }

    /// `L`, `R` or `AL`.
    #[inline]
    pub fn is_strong(self) -> bool {
        matches!(self, Self::L | Self::R | Self::AL)
    }

    /// `EN` or `AN`.
    #[inline]
    pub fn is_number(self) -> bool {
        matches!(self, Self::EN | Self::AN)
    }

    /// `LRI`, `RLI` or `FSI`.
    #[inline]
    pub fn is_isolate_initiator(self) -> bool {
        matches!(self, Self::LRI | Self::RLI | Self::FSI)
    }

    /// An isolate initiator or `PDI`.
    #[inline]
    pub fn is_isolate(self) -> bool {
        self.is_isolate_initiator() || self == Self::PDI
    }

    /// `B`, `S`, `WS`, `ON` or an isolate formatting character (`NI` in UAX #9).
    #[inline]
    pub fn is_neutral_or_isolate(self) -> bool {
        matches!(self, Self::B | Self::S | Self::WS | Self::ON) || self.is_isolate()
    }

    /// Characters removed by rule X9: embeddings, overrides, `PDF` and `BN`.
    #[inline]
    pub fn is_removed_by_x9(self) -> bool {
        matches!(
            self,
            Self::LRE | Self::RLE | Self::LRO | Self::RLO | Self::PDF | Self::BN
        )
    }

    /// The raw type code.
    pub fn code(self) -> u8 {
        self.0
    }

    /// The UAX #9 abbreviation of the type.
    pub fn name(self) -> &'static str {
        NAMES.get(self.0 as usize).copied().unwrap_or("?")
    }
}

impl fmt::Debug for BidiType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl fmt::Display for BidiType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
