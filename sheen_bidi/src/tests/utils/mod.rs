// Copyright 2025 the Parley Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

mod bidi_test;
mod tracking_allocator;

pub(crate) use bidi_test::{bidi_types, BidiTest};
pub(crate) use tracking_allocator::TrackingAllocator;
