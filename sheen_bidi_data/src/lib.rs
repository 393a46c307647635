// Copyright 2025 the Parley Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! `sheen_bidi_data` packages the Unicode data that the bidirectional algorithm needs at runtime.
//! It exposes a compact [`Properties`] value per codepoint, holding the bidi class, the paired
//! bracket type and the mirroring glyph, all obtained from ICU4X compiled data.

#![no_std]

use icu_normalizer::properties::{CanonicalDecompositionBorrowed, Decomposed};
use icu_properties::props::{BidiMirroringGlyph, BidiPairedBracketType};
use icu_properties::CodePointMapData;

pub use icu_properties::props::BidiClass;

/// The `Bidi_Paired_Bracket_Type` of a character.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum BracketType {
    /// Not a paired bracket.
    #[default]
    None,
    /// An opening paired bracket.
    Open,
    /// A closing paired bracket.
    Close,
}

/// Unicode character properties relevant for bidirectional resolution.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Properties(u32);

impl Properties {
    const BIDI_BITS: u32 = 5;
    const BRACKET_BITS: u32 = 2;
    const MIRRORED_BITS: u32 = 1;
    const MIRROR_GLYPH_BITS: u32 = 21;

    const BIDI_SHIFT: u32 = 0;
    const BRACKET_SHIFT: u32 = Self::BIDI_SHIFT + Self::BIDI_BITS;
    const MIRRORED_SHIFT: u32 = Self::BRACKET_SHIFT + Self::BRACKET_BITS;
    const MIRROR_GLYPH_SHIFT: u32 = Self::MIRRORED_SHIFT + Self::MIRRORED_BITS;

    /// Returns the properties for a given character.
    pub fn get(ch: char) -> Self {
        let bidi = CodePointMapData::<BidiClass>::new().get(ch);
        let mirroring = CodePointMapData::<BidiMirroringGlyph>::new().get(ch);
        let bracket = match mirroring.paired_bracket_type {
            BidiPairedBracketType::Open => BracketType::Open,
            BidiPairedBracketType::Close => BracketType::Close,
            _ => BracketType::None,
        };
        Self::new(bidi, bracket, mirroring.mirrored, mirroring.mirroring_glyph)
    }

    /// Creates a new [`Properties`] from the given properties.
    pub fn new(
        bidi: BidiClass,
        bracket: BracketType,
        is_mirrored: bool,
        mirror_glyph: Option<char>,
    ) -> Self {
        let bidi = bidi.to_icu4c_value() as u32;
        let bracket = match bracket {
            BracketType::None => 0,
            BracketType::Open => 1,
            BracketType::Close => 2,
        };
        // A zero glyph means "none"; U+0000 never mirrors.
        let glyph = mirror_glyph.map_or(0, u32::from);

        Self(
            (bidi << Self::BIDI_SHIFT)
                | (bracket << Self::BRACKET_SHIFT)
                | ((is_mirrored as u32) << Self::MIRRORED_SHIFT)
                | (glyph << Self::MIRROR_GLYPH_SHIFT),
        )
    }

    #[inline(always)]
    fn bits(&self, shift: u32, bits: u32) -> u32 {
        (self.0 >> shift) & ((1 << bits) - 1)
    }

    /// Returns the bidirectional class for the character.
    #[inline(always)]
    pub fn bidi_class(&self) -> BidiClass {
        #[allow(
            clippy::cast_possible_truncation,
            reason = "bidi class data only occupies BIDI_BITS bits"
        )]
        BidiClass::from_icu4c_value(self.bits(Self::BIDI_SHIFT, Self::BIDI_BITS) as u8)
    }

    /// Returns the paired bracket type for the character.
    #[inline(always)]
    pub fn bracket_type(&self) -> BracketType {
        match self.bits(Self::BRACKET_SHIFT, Self::BRACKET_BITS) {
            1 => BracketType::Open,
            2 => BracketType::Close,
            _ => BracketType::None,
        }
    }

    /// Returns whether the character has the `Bidi_Mirrored` property.
    #[inline(always)]
    pub fn is_mirrored(&self) -> bool {
        self.bits(Self::MIRRORED_SHIFT, Self::MIRRORED_BITS) != 0
    }

    /// Returns the `Bidi_Mirroring_Glyph` of the character, if it has one.
    ///
    /// For paired brackets this is also the `Bidi_Paired_Bracket`.
    #[inline(always)]
    pub fn mirror_glyph(&self) -> Option<char> {
        match self.bits(Self::MIRROR_GLYPH_SHIFT, Self::MIRROR_GLYPH_BITS) {
            0 => None,
            glyph => char::from_u32(glyph),
        }
    }
}

impl From<Properties> for u32 {
    fn from(value: Properties) -> Self {
        value.0
    }
}

/// Returns the canonical form of a bracket character.
///
/// Brackets with a singleton canonical decomposition (such as U+2329 LEFT-POINTING ANGLE
/// BRACKET, which decomposes to U+3008 LEFT ANGLE BRACKET) map to their decomposition; every
/// other character maps to itself.
pub fn canonical_bracket(ch: char) -> char {
    match CanonicalDecompositionBorrowed::new().decompose(ch) {
        Decomposed::Singleton(canonical) => canonical,
        _ => ch,
    }
}

/// Returns whether two bracket characters are canonically equivalent.
pub fn is_equivalent_bracket(a: char, b: char) -> bool {
    a == b || canonical_bracket(a) == canonical_bracket(b)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bidi_classes() {
        assert_eq!(Properties::get('a').bidi_class(), BidiClass::LeftToRight);
        assert_eq!(Properties::get('\u{05D0}').bidi_class(), BidiClass::RightToLeft);
        assert_eq!(Properties::get('\u{0627}').bidi_class(), BidiClass::ArabicLetter);
        assert_eq!(Properties::get('1').bidi_class(), BidiClass::EuropeanNumber);
        assert_eq!(
            Properties::get('\u{2067}').bidi_class(),
            BidiClass::RightToLeftIsolate
        );
    }

    #[test]
    fn brackets() {
        let open = Properties::get('(');
        assert_eq!(open.bracket_type(), BracketType::Open);
        assert_eq!(open.mirror_glyph(), Some(')'));
        assert!(open.is_mirrored());

        let close = Properties::get(']');
        assert_eq!(close.bracket_type(), BracketType::Close);
        assert_eq!(close.mirror_glyph(), Some('['));

        let letter = Properties::get('x');
        assert_eq!(letter.bracket_type(), BracketType::None);
        assert_eq!(letter.mirror_glyph(), None);
        assert!(!letter.is_mirrored());
    }

    #[test]
    fn canonical_brackets() {
        assert_eq!(canonical_bracket('\u{2329}'), '\u{3008}');
        assert_eq!(canonical_bracket('\u{232A}'), '\u{3009}');
        assert_eq!(canonical_bracket(')'), ')');
        assert!(is_equivalent_bracket('\u{232A}', '\u{3009}'));
        assert!(!is_equivalent_bracket(')', ']'));
    }
}
