// Copyright 2025 the Parley Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! # Sheen Bidi Bench
//!
//! This crate provides benchmarks for the Sheen Bidi library.

use std::sync::OnceLock;

pub mod benches;

const LATIN: &str = "Lorem ipsum dolor sit amet, consectetur adipiscing elit, sed do eiusmod \
tempor incididunt ut labore et dolore magna aliqua (ut enim ad minim veniam).\n\
Duis aute irure dolor in reprehenderit in voluptate velit esse cillum dolore eu fugiat \
nulla pariatur, excepteur sint occaecat cupidatat non proident.\n";

const HEBREW: &str = "\u{05D6}\u{05D4}\u{05D5} \u{05DE}\u{05E9}\u{05E4}\u{05D8} \u{05D1}\
\u{05E2}\u{05D1}\u{05E8}\u{05D9}\u{05EA} (\u{05E2}\u{05DD} \u{05E1}\u{05D5}\u{05D2}\u{05E8}\
\u{05D9}\u{05D9}\u{05DD}) \u{05D5}\u{05DE}\u{05E1}\u{05E4}\u{05E8} 1234.\n\
\u{05E9}\u{05D5}\u{05E8}\u{05D4} \u{05E9}\u{05E0}\u{05D9}\u{05D9}\u{05D4} \u{05E2}\u{05DD} \
[\u{05E1}\u{05D5}\u{05D2}\u{05E8}\u{05D9}\u{05D9}\u{05DD}] \u{05E0}\u{05D5}\u{05E1}\u{05E4}\
\u{05D9}\u{05DD}.\n";

const ARABIC: &str = "\u{0647}\u{0630}\u{0627} \u{0646}\u{0635} \u{0639}\u{0631}\u{0628}\
\u{064A} \u{0645}\u{0639} \u{0623}\u{0631}\u{0642}\u{0627}\u{0645} \u{0661}\u{0662}\u{0663} \
\u{0648} 456 (\u{0642}\u{0648}\u{0633}\u{064A}\u{0646}).\n\
\u{0633}\u{0637}\u{0631} \u{062B}\u{0627}\u{0646} \u{0628}\u{0644}\u{0627} \u{0623}\u{0631}\
\u{0642}\u{0627}\u{0645}.\n";

const MIXED: &str = "The word \u{05E9}\u{05DC}\u{05D5}\u{05DD} means peace, \
\u{2067}\u{0633}\u{0644}\u{0627}\u{0645} 42\u{2069} too; see \u{202B}(\u{05D0}) b\u{202C} \
and \u{2068}x [\u{05D1}]\u{2069}.\n\
\u{05D0}\u{05D1}\u{05D2} {a (b) c} 3.14 \u{0661}\u{0662} \u{202E}override\u{202C} end.\n";

/// A sample to be used for benchmarking.
#[derive(Debug)]
pub struct Sample {
    /// The name of the sample.
    pub name: &'static str,
    /// The modification of the sample.
    pub modification: &'static str,
    /// The text of the sample.
    pub text: String,
}

static SAMPLES: OnceLock<Vec<Sample>> = OnceLock::new();

/// Returns a list of samples to be used for benchmarking.
pub fn get_samples() -> &'static [Sample] {
    const SOURCES: [(&str, &str); 4] = [
        ("Latin", LATIN),
        ("Hebrew", HEBREW),
        ("Arabic", ARABIC),
        ("Mixed", MIXED),
    ];

    SAMPLES.get_or_init(|| {
        let mut samples = Vec::new();
        for (name, text) in SOURCES {
            samples.push(Sample {
                name,
                modification: "1 paragraph",
                text: text.lines().next().unwrap_or_default().to_string(),
            });
        }
        for (name, text) in SOURCES {
            samples.push(Sample {
                name,
                modification: "16 paragraphs",
                text: text.repeat(8),
            });
        }
        samples
    })
}
