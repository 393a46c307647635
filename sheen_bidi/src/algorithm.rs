// Copyright 2025 the Parley Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use core::fmt;

use crate::allocator::{self, AllocatorRef};
use crate::bidi_type::{BaseLevel, BidiType};
use crate::codepoint_sequence::CodepointSequence;
use crate::error::Error;
use crate::memory::{Chunk, Memory};
use crate::object::Object;
use crate::paragraph::Paragraph;

/// Longest sequence a bidi chain can index: one link per code unit plus two sentinels.
const MAX_SEQUENCE_LEN: usize = u32::MAX as usize - 2;

struct AlgorithmData<'a> {
    sequence: CodepointSequence<'a>,
    bidi_types: Chunk<BidiType>,
}

/// The entry point of the bidirectional algorithm for one codepoint sequence.
///
/// Creating an algorithm looks up the bidi type of every code unit once; paragraphs are then
/// resolved from those types with [`create_paragraph`](Self::create_paragraph). The first code
/// unit of a codepoint carries its type and any further units are `BN`, so every offset of the
/// sequence has a type and, later, a level.
///
/// An `Algorithm` is a shared handle: cloning it is cheap and every paragraph keeps its
/// algorithm alive.
#[derive(Clone)]
pub struct Algorithm<'a> {
    object: Object<AlgorithmData<'a>>,
}

impl<'a> Algorithm<'a> {
    /// Creates an algorithm using the [current](allocator::current) allocator.
    pub fn new(sequence: impl Into<CodepointSequence<'a>>) -> Result<Self, Error> {
        Self::with_allocator(sequence, allocator::current())
    }

    /// Creates an algorithm whose memory comes from `allocator`.
    ///
    /// Paragraphs and lines created from the algorithm use the same allocator.
    pub fn with_allocator(
        sequence: impl Into<CodepointSequence<'a>>,
        allocator: AllocatorRef,
    ) -> Result<Self, Error> {
        let sequence = sequence.into();
        let len = sequence.len();
        if len == 0 {
            return Err(Error::empty_sequence());
        }
        if len > MAX_SEQUENCE_LEN {
            return Err(Error::sequence_too_long(len));
        }

        let object = Object::try_create(
            allocator,
            &[len * size_of::<BidiType>()],
            |memory, chunks| {
                let bidi_types = chunks[0].cast();
                determine_bidi_types(memory, bidi_types, sequence);
                Ok::<_, Error>(AlgorithmData {
                    sequence,
                    bidi_types,
                })
            },
        )?;
        Ok(Self { object })
    }

    /// The codepoint sequence the algorithm works on.
    pub fn sequence(&self) -> CodepointSequence<'a> {
        self.object.sequence
    }

    /// The bidi type of every code unit of the sequence.
    pub fn bidi_types(&self) -> &[BidiType] {
        self.object.memory().slice(self.object.bidi_types)
    }

    /// The allocator the algorithm and its paragraphs draw memory from.
    pub fn allocator(&self) -> &AllocatorRef {
        self.object.memory().allocator()
    }

    /// Finds the paragraph that starts at `offset`, looking no further than `length` code units.
    ///
    /// Returns the paragraph's length and the length of its separator. The paragraph ends
    /// after the first paragraph separator in the range, with a CR LF pair counted as one
    /// separator; without a separator it spans the whole range and the separator length is 0.
    pub fn paragraph_boundary(&self, offset: usize, length: usize) -> Result<(usize, usize), Error> {
        self.check_range(offset, length)?;
        let end = offset + length;
        let boundary = self.bidi_types()[offset..end]
            .iter()
            .position(|&bidi_type| bidi_type == BidiType::B)
            .map_or((length, 0), |index| {
                let separator = self.sequence().separator_length(offset + index);
                (index + separator, separator)
            });
        Ok(boundary)
    }

    /// Resolves the embedding levels of the paragraph that starts at `offset`.
    ///
    /// `length` is a suggestion: the paragraph ends earlier at the first paragraph separator,
    /// as [`paragraph_boundary`](Self::paragraph_boundary) describes.
    pub fn create_paragraph(
        &self,
        offset: usize,
        length: usize,
        base_level: BaseLevel,
    ) -> Result<Paragraph<'a>, Error> {
        log::trace!("paragraph input: offset {offset}, suggested length {length}, base {base_level:?}");
        let (actual, _) = self.paragraph_boundary(offset, length)?;
        log::trace!("paragraph boundary: actual length {actual}");
        Paragraph::resolve(self.clone(), offset, actual, base_level)
    }

    /// Adds a reference to the algorithm.
    #[must_use]
    pub fn retain(&self) -> Self {
        self.clone()
    }

    /// The number of live references to the algorithm.
    pub fn retain_count(&self) -> usize {
        self.object.retain_count()
    }

    fn check_range(&self, offset: usize, length: usize) -> Result<(), Error> {
        let len = self.sequence().len();
        match offset.checked_add(length) {
            Some(end) if length > 0 && end <= len => Ok(()),
            _ => Err(Error::invalid_range(offset, length, len)),
        }
    }
}

impl fmt::Debug for Algorithm<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Algorithm")
            .field("sequence", &self.sequence())
            .field("allocator", self.allocator())
            .finish_non_exhaustive()
    }
}

fn determine_bidi_types(
    memory: &mut Memory,
    bidi_types: Chunk<BidiType>,
    sequence: CodepointSequence<'_>,
) {
    let types = memory.slice_mut(bidi_types);
    let mut index = 0;
    while index < types.len() {
        let (ch, units) = sequence.decode(index);
        types[index] = BidiType::of(ch);
        types[index + 1..index + units].fill(BidiType::BN);
        index += units;
    }
}
