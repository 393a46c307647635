// Copyright 2025 the Parley Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Compile-time limits and tuning constants.

use crate::Level;

/// Number of scratch buffers shared by all threads.
pub const SCRATCH_POOL_SIZE: usize = 8;

/// Size in bytes of each scratch buffer.
pub const SCRATCH_BUFFER_SIZE: usize = 16 * 1024;

/// Alignment in bytes of scratch sub-allocations.
pub const SCRATCH_ALIGNMENT: usize = 16;

/// The highest explicit embedding level (rule BD2).
pub const MAX_LEVEL: Level = 125;

/// Maximum depth of the directional status stack.
pub const STATUS_STACK_MAX_DEPTH: usize = MAX_LEVEL as usize + 2;

/// Maximum number of simultaneously open bracket pairs (rule BD16).
pub const BRACKET_QUEUE_MAX_OPEN_PAIRS: usize = 63;
