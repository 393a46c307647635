// Copyright 2025 the Parley Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Random single paragraphs resolved by both this crate and `unicode-bidi`.

use proptest::prelude::*;
use proptest::sample::select;

use crate::{Algorithm, BaseLevel, CodepointSequence};

/// At least one character of every class except paragraph separators.
const ALPHABET: &[char] = &[
    // L, R, AL
    'a', 'b', '\u{05D0}', '\u{05D1}', '\u{0627}',
    // EN, AN
    '1', '2', '\u{0661}', '\u{06F1}',
    // ES, ET, CS
    '+', '-', '$', '%', ',', '.', ':',
    // NSM, BN
    '\u{0301}', '\u{00AD}', '\u{200B}',
    // S, WS
    '\t', ' ',
    // ON, including bracket pairs
    '!', '"', '(', ')', '[', ']',
    // LRE, RLE, PDF, LRO, RLO
    '\u{202A}', '\u{202B}', '\u{202C}', '\u{202D}', '\u{202E}',
    // LRI, RLI, FSI, PDI
    '\u{2066}', '\u{2067}', '\u{2068}', '\u{2069}',
];

fn text() -> impl Strategy<Value = String> {
    prop::collection::vec(select(ALPHABET), 1..32).prop_map(String::from_iter)
}

fn base_level() -> impl Strategy<Value = (BaseLevel, Option<unicode_bidi::Level>)> {
    prop_oneof![
        Just((BaseLevel::DefaultLtr, None)),
        Just((BaseLevel::Explicit(0), Some(unicode_bidi::Level::ltr()))),
        Just((BaseLevel::Explicit(1), Some(unicode_bidi::Level::rtl()))),
    ]
}

proptest! {
    #[test]
    fn levels_match_unicode_bidi(text in text(), (base, reference_base) in base_level()) {
        let algorithm = Algorithm::new(CodepointSequence::Utf8(text.as_bytes())).unwrap();
        let paragraph = algorithm.create_paragraph(0, text.len(), base).unwrap();
        prop_assert_eq!(paragraph.length(), text.len(), "text must be one paragraph");
        let line = paragraph.create_line(0, text.len()).unwrap();
        let types = algorithm.bidi_types();

        let reference = unicode_bidi::BidiInfo::new(&text, reference_base);
        prop_assert_eq!(reference.paragraphs.len(), 1, "reference split the paragraph");
        let reference_paragraph = &reference.paragraphs[0];
        prop_assert_eq!(
            paragraph.base_level(),
            reference_paragraph.level.number(),
            "Paragraph level mismatch"
        );
        let reference_levels =
            reference.reordered_levels(reference_paragraph, reference_paragraph.range.clone());

        // Levels of characters removed by rule X9 are left to the implementation.
        for (index, _) in text.char_indices().filter(|&(index, _)| !types[index].is_removed_by_x9()) {
            prop_assert_eq!(
                line.levels()[index],
                reference_levels[index].number(),
                "Level mismatch at byte {} of {:?}",
                index,
                text
            );
        }
    }
}
