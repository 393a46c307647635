// Copyright 2025 the Parley Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

mod test_allocation;
mod test_differential;
mod test_paragraph;
mod utils;
