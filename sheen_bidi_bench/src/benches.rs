// Copyright 2025 the Parley Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! # Benchmarks
//!
//! This module provides benchmarks for type lookup, paragraph resolution and line ordering.

use crate::get_samples;
use sheen_bidi::{Algorithm, BaseLevel, Paragraph};
use std::hint::black_box;
use tango_bench::{benchmark_fn, Benchmark};

/// Resolves every paragraph of the sequence and passes each one to `f`.
fn for_each_paragraph(algorithm: &Algorithm<'_>, mut f: impl FnMut(Paragraph<'_>)) {
    let len = algorithm.sequence().len();
    let mut offset = 0;
    while offset < len {
        let paragraph = algorithm
            .create_paragraph(offset, len - offset, BaseLevel::DefaultLtr)
            .unwrap();
        offset += paragraph.length();
        f(paragraph);
    }
}

/// Benchmark for bidi type lookup.
pub fn types() -> Vec<Benchmark> {
    get_samples()
        .iter()
        .map(|sample| {
            benchmark_fn(
                format!("Types - {} {}", sample.name, sample.modification),
                |b| {
                    b.iter(|| {
                        let algorithm = Algorithm::new(sample.text.as_str()).unwrap();
                        black_box(algorithm);
                    })
                },
            )
        })
        .collect()
}

/// Benchmark for paragraph resolution.
pub fn paragraphs() -> Vec<Benchmark> {
    get_samples()
        .iter()
        .map(|sample| {
            benchmark_fn(
                format!("Paragraphs - {} {}", sample.name, sample.modification),
                |b| {
                    let algorithm = Algorithm::new(sample.text.as_str()).unwrap();
                    b.iter(move || {
                        for_each_paragraph(&algorithm, |paragraph| {
                            black_box(paragraph);
                        });
                    })
                },
            )
        })
        .collect()
}

/// Benchmark for visual reordering of whole paragraphs as lines.
pub fn lines() -> Vec<Benchmark> {
    get_samples()
        .iter()
        .map(|sample| {
            benchmark_fn(
                format!("Lines - {} {}", sample.name, sample.modification),
                |b| {
                    let algorithm = Algorithm::new(sample.text.as_str()).unwrap();
                    b.iter(move || {
                        for_each_paragraph(&algorithm, |paragraph| {
                            let line = paragraph
                                .create_line(paragraph.offset(), paragraph.length())
                                .unwrap();
                            black_box(line.runs());
                            black_box(line.mirrors().count());
                        });
                    })
                },
            )
        })
        .collect()
}
