// Copyright 2025 the Parley Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use super::utils::BidiTest;
use crate::{Algorithm, BaseLevel, BidiType, CodepointSequence, ErrorKind};

#[test]
fn latin_text_stays_at_level_zero() {
    BidiTest::new("abc", BaseLevel::DefaultLtr)
        .expect_base_level(0)
        .expect_levels("0 0 0")
        .expect_order(&[0, 1, 2]);
}

#[test]
fn latin_inside_hebrew_is_raised_to_even_level() {
    BidiTest::new("\u{05D0}a\u{05D1}", BaseLevel::DefaultLtr)
        .expect_base_level(1)
        .expect_levels("1 2 1")
        .expect_order(&[2, 1, 0]);
}

#[test]
fn isolate_is_resolved_apart_from_its_context() {
    BidiTest::new("a\u{2067}\u{05D0}\u{2069}b", BaseLevel::DefaultLtr)
        .expect_base_level(0)
        .expect_levels("0 0 1 0 0")
        .expect_order(&[0, 1, 2, 3, 4]);
}

#[test]
fn default_rtl_applies_without_strong_characters() {
    BidiTest::new("123 !", BaseLevel::DefaultRtl)
        .expect_base_level(1)
        .expect_levels("2 2 2 1 1");
    BidiTest::new("123 !", BaseLevel::DefaultLtr).expect_base_level(0);
}

#[test]
fn characters_inside_isolates_do_not_set_paragraph_level() {
    BidiTest::new("\u{2066}\u{05D0}\u{2069}a", BaseLevel::DefaultRtl)
        .expect_base_level(0)
        .expect_levels("0 3 0 0");
    // Without a matching PDI the isolate runs to the end of the paragraph.
    BidiTest::new("\u{2066}\u{05D0}", BaseLevel::DefaultRtl).expect_base_level(1);
}

#[test]
fn levels_cover_every_code_unit() {
    // UTF-8: the Hebrew letter takes two units and the second inherits its level.
    let text = "a \u{05D0}\u{05D1}";
    let algorithm = Algorithm::new(text).unwrap();
    let paragraph = algorithm
        .create_paragraph(0, text.len(), BaseLevel::DefaultLtr)
        .unwrap();
    assert_eq!(paragraph.length(), 6, "paragraph length mismatch");
    assert_eq!(paragraph.levels(), &[0, 0, 1, 1, 1, 1], "level mismatch");

    // UTF-16: a surrogate pair resolves like a single character.
    let units: Vec<u16> = "\u{05D0}\u{1F600}\u{05D1}".encode_utf16().collect();
    let algorithm = Algorithm::new(CodepointSequence::Utf16(&units)).unwrap();
    let paragraph = algorithm
        .create_paragraph(0, units.len(), BaseLevel::DefaultLtr)
        .unwrap();
    assert_eq!(paragraph.levels(), &[1, 1, 1, 1], "level mismatch");
}

#[test]
fn paragraphs_split_at_separators() {
    let text = "abc\r\n\u{05D0}\u{05D1}\u{2029}d";
    let algorithm = Algorithm::new(text).unwrap();

    let first = algorithm
        .create_paragraph(0, text.len(), BaseLevel::DefaultLtr)
        .unwrap();
    assert_eq!((first.offset(), first.length()), (0, 5), "first paragraph");
    assert_eq!(first.base_level(), 0, "first paragraph level");
    assert_eq!(first.levels(), &[0; 5], "first paragraph levels");

    let offset = first.offset() + first.length();
    let second = algorithm
        .create_paragraph(offset, text.len() - offset, BaseLevel::DefaultLtr)
        .unwrap();
    // Two Hebrew letters of two bytes and a three byte separator.
    assert_eq!((second.offset(), second.length()), (5, 7), "second paragraph");
    assert_eq!(second.base_level(), 1, "second paragraph level");
    assert_eq!(second.levels(), &[1; 7], "second paragraph levels");

    let offset = second.offset() + second.length();
    let third = algorithm
        .create_paragraph(offset, text.len() - offset, BaseLevel::DefaultRtl)
        .unwrap();
    assert_eq!((third.offset(), third.length()), (12, 1), "third paragraph");
    assert_eq!(third.base_level(), 0, "third paragraph level");
}

#[test]
fn explicit_base_level_overrides_detection() {
    BidiTest::new("abc", BaseLevel::Explicit(1))
        .expect_base_level(1)
        .expect_levels("2 2 2");
    BidiTest::new("\u{05D0}", BaseLevel::Explicit(2))
        .expect_base_level(2)
        .expect_levels("3");
}

#[test]
fn objects_share_ownership() {
    let algorithm = Algorithm::new("abc \u{05D0}").unwrap();
    assert_eq!(algorithm.retain_count(), 1, "fresh algorithm");

    let paragraph = algorithm
        .create_paragraph(0, 6, BaseLevel::DefaultLtr)
        .unwrap();
    assert_eq!(algorithm.retain_count(), 2, "paragraph holds its algorithm");
    assert_eq!(paragraph.retain_count(), 1, "fresh paragraph");

    let retained = paragraph.retain();
    assert_eq!(paragraph.retain_count(), 2, "after retain");
    let line = paragraph.create_line(0, 4).unwrap();
    assert_eq!(paragraph.retain_count(), 3, "line holds its paragraph");

    drop(retained);
    drop(paragraph);
    assert_eq!(algorithm.retain_count(), 2, "line keeps the chain alive");
    assert_eq!(line.paragraph().levels().len(), 6, "levels outlive handles");

    drop(line);
    assert_eq!(algorithm.retain_count(), 1, "all dependents released");
}

#[test]
fn invalid_ranges_are_rejected() {
    let algorithm = Algorithm::new("ab\ncd").unwrap();
    let error = algorithm
        .create_paragraph(3, 5, BaseLevel::DefaultLtr)
        .unwrap_err();
    assert_eq!(error.kind(), ErrorKind::InvalidRange, "range past the end");

    let paragraph = algorithm
        .create_paragraph(0, 5, BaseLevel::DefaultLtr)
        .unwrap();
    assert_eq!(paragraph.length(), 3, "first paragraph ends after LF");
    let error = paragraph.create_line(2, 2).unwrap_err();
    assert_eq!(error.kind(), ErrorKind::InvalidRange, "line past paragraph");
    assert_eq!(error.len(), 5, "error reports the sequence length");
    assert!(paragraph.create_line(1, 0).is_err(), "empty line");
}

#[test]
fn bidi_types_follow_character_properties() {
    let types = super::utils::bidi_types("a\u{05D0}\u{0627}1\u{0661}+ \u{2067}");
    assert_eq!(
        types,
        [
            BidiType::L,
            BidiType::R,
            BidiType::AL,
            BidiType::EN,
            BidiType::AN,
            BidiType::ES,
            BidiType::WS,
            BidiType::RLI,
        ],
        "bidi type mismatch"
    );
}
