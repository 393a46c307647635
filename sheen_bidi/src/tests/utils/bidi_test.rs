// Copyright 2025 the Parley Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use crate::{Algorithm, BaseLevel, BidiType, CodepointSequence, Level, Mirror, Run};

/// Resolves a single-line paragraph and checks it the way `BidiCharacterTest.txt` does.
///
/// The text is resolved as UTF-32, so every offset below is a character index.
pub(crate) struct BidiTest {
    base_level: Level,
    levels: Vec<Level>,
    removed: Vec<bool>,
    runs: Vec<Run>,
    mirrors: Vec<Mirror>,
}

impl BidiTest {
    pub(crate) fn new(text: &str, base_level: BaseLevel) -> Self {
        let units: Vec<u32> = text.chars().map(u32::from).collect();
        let algorithm = Algorithm::new(CodepointSequence::Utf32(&units)).unwrap();
        let paragraph = algorithm
            .create_paragraph(0, units.len(), base_level)
            .unwrap();
        assert_eq!(paragraph.length(), units.len(), "text must be one paragraph");
        let line = paragraph.create_line(0, units.len()).unwrap();

        Self {
            base_level: paragraph.base_level(),
            levels: line.levels().to_vec(),
            removed: algorithm
                .bidi_types()
                .iter()
                .map(|bidi_type| bidi_type.is_removed_by_x9())
                .collect(),
            runs: line.runs().to_vec(),
            mirrors: line.mirrors().collect(),
        }
    }

    pub(crate) fn expect_base_level(self, expected: Level) -> Self {
        assert_eq!(self.base_level, expected, "Paragraph level mismatch");
        self
    }

    /// Compares against space separated levels, with `x` for characters removed by rule X9.
    pub(crate) fn expect_levels(self, expected: &str) -> Self {
        let actual: Vec<String> = self
            .levels
            .iter()
            .zip(&self.removed)
            .map(|(level, &removed)| match removed {
                true => "x".to_string(),
                false => level.to_string(),
            })
            .collect();
        assert_eq!(actual.join(" "), expected, "Level list mismatch");
        self
    }

    /// Compares the visual order of the characters that were not removed by rule X9.
    pub(crate) fn expect_order(self, expected: &[usize]) -> Self {
        let mut actual = Vec::new();
        for run in &self.runs {
            let indices = run.offset..run.offset + run.length;
            let visible = |index: &usize| !self.removed[*index];
            if run.is_rtl() {
                actual.extend(indices.rev().filter(visible));
            } else {
                actual.extend(indices.filter(visible));
            }
        }
        assert_eq!(actual, expected, "Visual order mismatch");
        self
    }

    pub(crate) fn expect_mirrors(self, expected: &[(usize, char)]) -> Self {
        let actual: Vec<_> = self
            .mirrors
            .iter()
            .map(|mirror| (mirror.index, mirror.mirror))
            .collect();
        assert_eq!(actual, expected, "Mirror list mismatch");
        self
    }
}

/// Types of the characters of `text`, for assertions on the lookup itself.
pub(crate) fn bidi_types(text: &str) -> Vec<BidiType> {
    text.chars().map(BidiType::of).collect()
}
