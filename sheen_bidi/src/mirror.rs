// Copyright 2025 the Parley Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use sheen_bidi_data::Properties;

use crate::line::Line;

/// A character that has to be displayed with its mirrored glyph.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Mirror {
    /// Offset of the character in the sequence.
    pub index: usize,
    /// The character itself.
    pub codepoint: char,
    /// The character whose glyph should be displayed instead.
    pub mirror: char,
}

/// Iterator over the mirrored characters of a line, created by [`Line::mirrors`].
///
/// Characters are visited run by run in visual order and, within a run, in logical order.
/// Only right-to-left runs are searched.
#[derive(Clone, Debug)]
pub struct Mirrors<'l, 'a> {
    line: &'l Line<'a>,
    run: usize,
    index: usize,
}

impl<'l, 'a> Mirrors<'l, 'a> {
    pub(crate) fn new(line: &'l Line<'a>) -> Self {
        let mut mirrors = Self {
            line,
            run: 0,
            index: 0,
        };
        mirrors.enter_run();
        mirrors
    }

    fn enter_run(&mut self) {
        if let Some(run) = self.line.runs().get(self.run) {
            self.index = run.offset;
        }
    }
}

impl Iterator for Mirrors<'_, '_> {
    type Item = Mirror;

    fn next(&mut self) -> Option<Mirror> {
        let sequence = self.line.paragraph().algorithm().sequence();
        while let Some(run) = self.line.runs().get(self.run) {
            let end = run.offset + run.length;
            if run.is_rtl() {
                while self.index < end {
                    let index = self.index;
                    let (codepoint, units) = sequence.decode(index);
                    self.index += units;
                    if let Some(mirror) = Properties::get(codepoint).mirror_glyph() {
                        return Some(Mirror {
                            index,
                            codepoint,
                            mirror,
                        });
                    }
                }
            }
            self.run += 1;
            self.enter_run();
        }
        None
    }
}
