// Copyright 2025 the Parley Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Sheen Bidi is an implementation of the Unicode Bidirectional Algorithm ([UAX #9]).
//!
//! An [`Algorithm`] is created for a [`CodepointSequence`] in UTF-8, UTF-16 or UTF-32. From it,
//! [`Paragraph`]s are resolved to one embedding level per code unit, and [`Line`]s of a
//! paragraph are broken into visually ordered [`Run`]s.
//!
//! ```
//! use sheen_bidi::{Algorithm, BaseLevel};
//!
//! let text = "car \u{05D0}\u{05D1}\u{05D2} bus";
//! let algorithm = Algorithm::new(text).unwrap();
//! let paragraph = algorithm
//!     .create_paragraph(0, text.len(), BaseLevel::DefaultLtr)
//!     .unwrap();
//! assert_eq!(paragraph.base_level(), 0);
//!
//! let line = paragraph.create_line(0, text.len()).unwrap();
//! assert_eq!(line.runs().len(), 3);
//! assert!(line.runs()[1].is_rtl());
//! ```
//!
//! All memory comes from an [`Allocator`](allocator::Allocator). Every object owns an arena
//! that is released as a whole together with the last reference to the object, and the
//! short-lived working memory of a paragraph resolution is taken from scratch buffers where
//! possible.
//!
//! ## Features
//!
//! - `scratch` (enabled by default): Serve resolution memory from a pool of per-thread
//!   scratch buffers. Without it, every request goes to the allocator's heap blocks.
//!
//! [UAX #9]: https://www.unicode.org/reports/tr9/

// LINEBENDER LINT SET - lib.rs - v3
// See https://linebender.org/wiki/canonical-lints/
// These lints shouldn't apply to examples or tests.
#![cfg_attr(not(test), warn(unused_crate_dependencies))]
// These lints shouldn't apply to examples.
#![warn(clippy::print_stdout, clippy::print_stderr)]
// Targeting e.g. 32-bit means structs containing usize can give false positives for 64-bit.
#![cfg_attr(target_pointer_width = "64", warn(clippy::trivially_copy_pass_by_ref))]
// END LINEBENDER LINT SET
#![cfg_attr(docsrs, feature(doc_cfg))]

mod algorithm;
mod bidi_chain;
mod bidi_type;
mod bracket_queue;
mod codepoint_sequence;
mod error;
mod isolating_run;
mod level_run;
mod line;
mod mirror;
mod object;
mod paragraph;
mod run_queue;
#[cfg(feature = "scratch")]
mod scratch;
mod status_stack;

pub mod allocator;
pub mod config;
pub mod memory;

#[cfg(test)]
mod tests;

pub use algorithm::Algorithm;
pub use bidi_type::{BaseLevel, BidiType, Level};
pub use codepoint_sequence::{Codepoints, CodepointSequence, Encoding, FAULTY_CODEPOINT};
pub use error::{Error, ErrorKind};
pub use line::{Line, Run};
pub use mirror::{Mirror, Mirrors};
pub use object::Object;
pub use paragraph::Paragraph;
