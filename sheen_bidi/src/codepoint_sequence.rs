// Copyright 2025 the Parley Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

/// The codepoint returned for ill-formed code unit sequences.
pub const FAULTY_CODEPOINT: char = char::REPLACEMENT_CHARACTER;

/// The encoding of a [`CodepointSequence`].
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Encoding {
    /// UTF-8, one byte per code unit.
    Utf8,
    /// UTF-16, native-endian code units.
    Utf16,
    /// UTF-32, native-endian code units.
    Utf32,
}

/// A borrowed string of code units in one of the Unicode encoding forms.
///
/// All offsets and lengths used by the algorithm are measured in code units of this sequence.
/// Ill-formed input is tolerated: each maximal ill-formed subpart decodes to
/// [`FAULTY_CODEPOINT`].
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum CodepointSequence<'a> {
    /// UTF-8 code units.
    Utf8(&'a [u8]),
    /// UTF-16 code units.
    Utf16(&'a [u16]),
    /// UTF-32 code units.
    Utf32(&'a [u32]),
}

impl<'a> From<&'a str> for CodepointSequence<'a> {
    fn from(text: &'a str) -> Self {
        Self::Utf8(text.as_bytes())
    }
}

impl<'a> CodepointSequence<'a> {
    /// The encoding of the code units.
    pub fn encoding(&self) -> Encoding {
        match self {
            Self::Utf8(_) => Encoding::Utf8,
            Self::Utf16(_) => Encoding::Utf16,
            Self::Utf32(_) => Encoding::Utf32,
        }
    }

    /// The number of code units.
    pub fn len(&self) -> usize {
        match self {
            Self::Utf8(units) => units.len(),
            Self::Utf16(units) => units.len(),
            Self::Utf32(units) => units.len(),
        }
    }

    /// Returns `true` if there are no code units.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Decodes the codepoint starting at `*index` and advances `*index` past it.
    ///
    /// Returns `None` once `*index` reaches the end of the sequence.
    pub fn next_codepoint(&self, index: &mut usize) -> Option<char> {
        if *index >= self.len() {
            return None;
        }
        let (ch, units) = self.decode(*index);
        *index += units;
        Some(ch)
    }

    /// Decodes the codepoint ending just before `*index` and moves `*index` back to its start.
    ///
    /// Returns `None` when `*index` is zero or past the end of the sequence.
    pub fn previous_codepoint(&self, index: &mut usize) -> Option<char> {
        if *index == 0 || *index > self.len() {
            return None;
        }
        let (ch, start) = match self {
            Self::Utf8(units) => previous_utf8(units, *index),
            Self::Utf16(units) => previous_utf16(units, *index),
            Self::Utf32(units) => (utf32(units[*index - 1]), *index - 1),
        };
        *index = start;
        Some(ch)
    }

    /// Iterates over `(offset, codepoint)` pairs.
    pub fn codepoints(&self) -> Codepoints<'a> {
        Codepoints {
            sequence: *self,
            index: 0,
        }
    }

    /// Decodes the codepoint at `index`, returning it and the number of units it spans.
    pub(crate) fn decode(&self, index: usize) -> (char, usize) {
        match self {
            Self::Utf8(units) => decode_utf8(units, index),
            Self::Utf16(units) => decode_utf16(units, index),
            Self::Utf32(units) => (utf32(units[index]), 1),
        }
    }

    /// Length in code units of the paragraph separator starting at `index`.
    ///
    /// A CR immediately followed by LF counts as one separator.
    pub(crate) fn separator_length(&self, index: usize) -> usize {
        let mut end = index;
        let Some(first) = self.next_codepoint(&mut end) else {
            return 0;
        };
        let length = end - index;
        if first == '\r' && self.next_codepoint(&mut end) == Some('\n') {
            return end - index;
        }
        length
    }
}

/// Iterator over the codepoints of a [`CodepointSequence`] with their offsets.
#[derive(Clone, Debug)]
pub struct Codepoints<'a> {
    sequence: CodepointSequence<'a>,
    index: usize,
}

impl Iterator for Codepoints<'_> {
    type Item = (usize, char);

    fn next(&mut self) -> Option<Self::Item> {
        let offset = self.index;
        let ch = self.sequence.next_codepoint(&mut self.index)?;
        Some((offset, ch))
    }
}

fn utf32(unit: u32) -> char {
    char::from_u32(unit).unwrap_or(FAULTY_CODEPOINT)
}

fn decode_utf8(units: &[u8], index: usize) -> (char, usize) {
    let lead = units[index];
    if lead < 0x80 {
        return (char::from(lead), 1);
    }
    // Well-formed byte sequences, Unicode table 3-7.
    let (len, low, high) = match lead {
        0xC2..=0xDF => (2, 0x80, 0xBF),
        0xE0 => (3, 0xA0, 0xBF),
        0xE1..=0xEC | 0xEE..=0xEF => (3, 0x80, 0xBF),
        0xED => (3, 0x80, 0x9F),
        0xF0 => (4, 0x90, 0xBF),
        0xF1..=0xF3 => (4, 0x80, 0xBF),
        0xF4 => (4, 0x80, 0x8F),
        _ => return (FAULTY_CODEPOINT, 1),
    };

    let mut scalar = u32::from(lead) & (0x7F >> len);
    for i in 1..len {
        let Some(&unit) = units.get(index + i) else {
            return (FAULTY_CODEPOINT, i);
        };
        let (low, high) = if i == 1 { (low, high) } else { (0x80, 0xBF) };
        if !(low..=high).contains(&unit) {
            return (FAULTY_CODEPOINT, i);
        }
        scalar = (scalar << 6) | u32::from(unit & 0x3F);
    }
    (utf32(scalar), len)
}

fn previous_utf8(units: &[u8], index: usize) -> (char, usize) {
    let earliest = index.saturating_sub(4);
    for start in (earliest..index).rev() {
        if (0x80..=0xBF).contains(&units[start]) {
            continue;
        }
        let (ch, len) = decode_utf8(units, start);
        if start + len == index {
            return (ch, start);
        }
        break;
    }
    (FAULTY_CODEPOINT, index - 1)
}

fn decode_utf16(units: &[u16], index: usize) -> (char, usize) {
    let first = units[index];
    match first {
        0xD800..=0xDBFF => match units.get(index + 1) {
            Some(&second @ 0xDC00..=0xDFFF) => {
                let scalar =
                    0x10000 + ((u32::from(first) - 0xD800) << 10) + (u32::from(second) - 0xDC00);
                (utf32(scalar), 2)
            }
            _ => (FAULTY_CODEPOINT, 1),
        },
        0xDC00..=0xDFFF => (FAULTY_CODEPOINT, 1),
        _ => (utf32(u32::from(first)), 1),
    }
}

fn previous_utf16(units: &[u16], index: usize) -> (char, usize) {
    let last = units[index - 1];
    if (0xDC00..=0xDFFF).contains(&last) && index >= 2 {
        if let (ch, 2) = decode_utf16(units, index - 2) {
            return (ch, index - 2);
        }
    }
    let (ch, _) = decode_utf16(units, index - 1);
    (ch, index - 1)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn forward(sequence: CodepointSequence<'_>) -> Vec<(usize, char)> {
        sequence.codepoints().collect()
    }

    fn backward(sequence: CodepointSequence<'_>) -> Vec<(usize, char)> {
        let mut index = sequence.len();
        let mut result = Vec::new();
        while let Some(ch) = sequence.previous_codepoint(&mut index) {
            result.push((index, ch));
        }
        result.reverse();
        result
    }

    #[test]
    fn utf8_well_formed() {
        let text = "a\u{05D0}\u{20AC}\u{1F600}";
        let sequence = CodepointSequence::from(text);
        let expected = vec![(0, 'a'), (1, '\u{05D0}'), (3, '\u{20AC}'), (6, '\u{1F600}')];
        assert_eq!(forward(sequence), expected);
        assert_eq!(backward(sequence), expected);
    }

    #[test]
    fn utf8_ill_formed() {
        // Truncated 3-byte sequence, stray continuation byte, surrogate encoding.
        let units = [0x61, 0xE2, 0x82, 0x62, 0x80, 0xED, 0xA0, 0x80];
        let sequence = CodepointSequence::Utf8(&units);
        assert_eq!(
            forward(sequence),
            vec![
                (0, 'a'),
                (1, FAULTY_CODEPOINT),
                (3, 'b'),
                (4, FAULTY_CODEPOINT),
                (5, FAULTY_CODEPOINT),
                (6, FAULTY_CODEPOINT),
                (7, FAULTY_CODEPOINT),
            ]
        );
    }

    #[test]
    fn utf16_surrogates() {
        let units = [0x0041, 0xD83D, 0xDE00, 0xDC00, 0xD800];
        let sequence = CodepointSequence::Utf16(&units);
        let expected = vec![
            (0, 'A'),
            (1, '\u{1F600}'),
            (3, FAULTY_CODEPOINT),
            (4, FAULTY_CODEPOINT),
        ];
        assert_eq!(forward(sequence), expected);
        assert_eq!(backward(sequence), expected);
    }

    #[test]
    fn utf32_out_of_range() {
        let units = [0x41, 0x11_0000, 0xD800, 0x05D0];
        let sequence = CodepointSequence::Utf32(&units);
        assert_eq!(
            forward(sequence),
            vec![
                (0, 'A'),
                (1, FAULTY_CODEPOINT),
                (2, FAULTY_CODEPOINT),
                (3, '\u{05D0}'),
            ]
        );
    }

    #[test]
    fn separators() {
        let sequence = CodepointSequence::from("a\r\nb\rc\u{2029}");
        assert_eq!(sequence.separator_length(1), 2);
        assert_eq!(sequence.separator_length(4), 1);
        assert_eq!(sequence.separator_length(6), 3);
        assert_eq!(sequence.separator_length(9), 0);
    }
}
