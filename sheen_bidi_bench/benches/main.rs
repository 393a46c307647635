// Copyright 2025 the Parley Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Sheen Bidi benchmarks.

use tango_bench::{tango_benchmarks, tango_main};

use sheen_bidi_bench::benches::{lines, paragraphs, types};

tango_benchmarks!(types(), paragraphs(), lines());
tango_main!();
