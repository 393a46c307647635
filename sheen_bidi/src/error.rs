// Copyright 2025 the Parley Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use crate::memory::AllocError;

/// Error type for algorithm, paragraph and line creation.
///
/// Carries a non-exhaustive [`ErrorKind`] plus the range that was requested and
/// the length of the codepoint sequence at the time of failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Error {
    /// The non-exhaustive category describing this error.
    kind: ErrorKind,

    /// The first code unit of the requested range.
    offset: usize,

    /// The number of code units in the requested range.
    length: usize,

    /// The length in code units of the underlying sequence.
    len: usize,
}

#[expect(
    clippy::len_without_is_empty,
    reason = "`Error::len` reports source sequence length context; an `is_empty` method would be misleading and unused."
)]
impl Error {
    /// The machine-readable category for this error.
    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    /// The first code unit of the range provided by the caller.
    pub fn offset(&self) -> usize {
        self.offset
    }

    /// The number of code units in the range provided by the caller.
    pub fn length(&self) -> usize {
        self.length
    }

    /// The length in code units of the codepoint sequence.
    pub fn len(&self) -> usize {
        self.len
    }

    pub(crate) fn allocation_failed() -> Self {
        Self {
            kind: ErrorKind::AllocationFailed,
            offset: 0,
            length: 0,
            len: 0,
        }
    }

    pub(crate) fn empty_sequence() -> Self {
        Self {
            kind: ErrorKind::EmptySequence,
            offset: 0,
            length: 0,
            len: 0,
        }
    }

    pub(crate) fn sequence_too_long(len: usize) -> Self {
        Self {
            kind: ErrorKind::SequenceTooLong,
            offset: 0,
            length: len,
            len,
        }
    }

    pub(crate) fn invalid_range(offset: usize, length: usize, len: usize) -> Self {
        Self {
            kind: ErrorKind::InvalidRange,
            offset,
            length,
            len,
        }
    }
}

impl From<AllocError> for Error {
    fn from(_: AllocError) -> Self {
        Self::allocation_failed()
    }
}

impl core::fmt::Display for Error {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self.kind {
            ErrorKind::AllocationFailed => write!(f, "memory allocation failed"),
            ErrorKind::EmptySequence => write!(f, "codepoint sequence is empty"),
            ErrorKind::SequenceTooLong => write!(
                f,
                "codepoint sequence of {} code units exceeds the supported length",
                self.len
            ),
            ErrorKind::InvalidRange => write!(
                f,
                "range at {} with length {} is invalid for sequence of len {}",
                self.offset, self.length, self.len
            ),
        }
    }
}

impl core::error::Error for Error {}

/// The non-exhaustive category of an error.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[non_exhaustive]
pub enum ErrorKind {
    /// The underlying allocator could not provide a block.
    AllocationFailed,

    /// The codepoint sequence has no code units.
    EmptySequence,

    /// The codepoint sequence has more code units than a bidi chain can index.
    SequenceTooLong,

    /// The requested range is empty or extends past the end of its parent.
    InvalidRange,
}
