// Copyright 2025 the Parley Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Lines of a paragraph in visual order (rules L1 and L2).

use core::fmt;

use crate::bidi_type::{BidiType, Level};
use crate::error::Error;
use crate::memory::{Chunk, Memory};
use crate::mirror::Mirrors;
use crate::object::Object;
use crate::paragraph::Paragraph;

/// A maximal span of a line at one embedding level.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Run {
    /// Offset of the first code unit in the sequence.
    pub offset: usize,
    /// Number of code units.
    pub length: usize,
    /// Embedding level of every code unit in the run.
    pub level: Level,
}

impl Run {
    /// Returns `true` if the run is laid out right to left.
    pub fn is_rtl(&self) -> bool {
        self.level & 1 != 0
    }
}

struct LineData<'a> {
    paragraph: Paragraph<'a>,
    offset: usize,
    length: usize,
    levels: Chunk<Level>,
    runs: Vec<Run>,
}

/// A line of a paragraph with its runs in visual order.
///
/// Created by [`Paragraph::create_line`].
#[derive(Clone)]
pub struct Line<'a> {
    object: Object<LineData<'a>>,
}

impl<'a> Line<'a> {
    pub(crate) fn new(paragraph: Paragraph<'a>, offset: usize, length: usize) -> Result<Self, Error> {
        let allocator = paragraph.algorithm().allocator().clone();
        let object = Object::try_create(
            allocator,
            &[length * size_of::<Level>()],
            |memory, chunks| {
                let levels = chunks[0].cast();
                reset_whitespace_levels(memory, levels, &paragraph, offset);
                let runs = reorder_runs(memory.slice(levels), offset);
                Ok::<_, Error>(LineData {
                    paragraph,
                    offset,
                    length,
                    levels,
                    runs,
                })
            },
        )?;
        Ok(Self { object })
    }

    /// The paragraph the line belongs to.
    pub fn paragraph(&self) -> &Paragraph<'a> {
        &self.object.paragraph
    }

    /// Offset of the line's first code unit in the sequence.
    pub fn offset(&self) -> usize {
        self.object.offset
    }

    /// Number of code units in the line.
    pub fn length(&self) -> usize {
        self.object.length
    }

    /// Levels of the line's code units after rule L1, in logical order.
    pub fn levels(&self) -> &[Level] {
        self.object.memory().slice(self.object.levels)
    }

    /// The runs of the line in visual order, left to right.
    pub fn runs(&self) -> &[Run] {
        &self.object.runs
    }

    /// Iterates over the characters of the line that are displayed as their mirror image.
    pub fn mirrors(&self) -> Mirrors<'_, 'a> {
        Mirrors::new(self)
    }
}

impl fmt::Debug for Line<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Line")
            .field("offset", &self.offset())
            .field("length", &self.length())
            .field("runs", &self.runs())
            .finish()
    }
}

/// Rule L1: separators, and whitespace before them or at the end of the line, go back to the
/// paragraph level.
fn reset_whitespace_levels(
    memory: &mut Memory,
    levels: Chunk<Level>,
    paragraph: &Paragraph<'_>,
    offset: usize,
) {
    let algorithm = paragraph.algorithm();
    let sequence = algorithm.sequence();
    let bidi_types = algorithm.bidi_types();
    let paragraph_level = paragraph.base_level();

    let levels = memory.slice_mut(levels);
    let start = offset - paragraph.offset();
    levels.copy_from_slice(&paragraph.levels()[start..start + levels.len()]);

    let mut trailing = None;
    let mut index = 0;
    while index < levels.len() {
        let (_, units) = sequence.decode(offset + index);
        let units = units.min(levels.len() - index);
        match bidi_types[offset + index] {
            BidiType::S | BidiType::B => {
                let from = trailing.take().unwrap_or(index);
                levels[from..index + units].fill(paragraph_level);
            }
            bidi_type if bidi_type == BidiType::WS
                || bidi_type.is_isolate()
                || bidi_type.is_removed_by_x9() =>
            {
                trailing.get_or_insert(index);
            }
            _ => trailing = None,
        }
        index += units;
    }
    if let Some(from) = trailing {
        levels[from..].fill(paragraph_level);
    }
}

/// Splits `levels` into runs and reverses them as rule L2 describes.
fn reorder_runs(levels: &[Level], offset: usize) -> Vec<Run> {
    let mut runs: Vec<Run> = Vec::new();
    for (index, &level) in levels.iter().enumerate() {
        match runs.last_mut() {
            Some(run) if run.level == level => run.length += 1,
            _ => runs.push(Run {
                offset: offset + index,
                length: 1,
                level,
            }),
        }
    }

    let highest = runs.iter().map(|run| run.level).max().unwrap_or(0);
    let lowest_odd = runs
        .iter()
        .map(|run| run.level | 1)
        .min()
        .unwrap_or(1);
    for level in (lowest_odd..=highest).rev() {
        let mut index = 0;
        while index < runs.len() {
            if runs[index].level < level {
                index += 1;
                continue;
            }
            let start = index;
            while index < runs.len() && runs[index].level >= level {
                index += 1;
            }
            runs[start..index].reverse();
        }
    }
    runs
}
