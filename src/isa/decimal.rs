// Copyright © 2025 Lukas Bower
// SPDX-License-Identifier: Apache-2.0
// Purpose: Parse decimal version fields and the version suffixes of ISA tokens.
// Author: Lukas Bower

//! Version suffix sub-parser.
//!
//! Single-letter tokens carry their version after the letter and are read
//! forward. Multi-letter tokens are delimited first and their version is
//! peeled off the end of the span.

use serde::Serialize;

use crate::error::DecimalError;

/// Version attached to an ISA token.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize)]
pub struct IsaVersion {
    /// Major version, `None` when absent or unparsable.
    pub major: Option<u32>,
    /// Minor version, zero when absent or unparsable.
    pub minor: u32,
}

impl IsaVersion {
    /// Version with no major and a zero minor.
    pub const UNSET: Self = Self {
        major: None,
        minor: 0,
    };
}

/// Number of leading ASCII digits in `bytes`.
pub fn digit_run(bytes: &[u8]) -> usize {
    bytes.iter().take_while(|b| b.is_ascii_digit()).count()
}

/// Convert the leading digit run of `bytes` into a `u32`.
pub fn parse_decimal(bytes: &[u8]) -> Result<u32, DecimalError> {
    let len = digit_run(bytes);
    if len == 0 {
        return Err(DecimalError::Invalid);
    }
    bytes[..len].iter().try_fold(0u32, |value, &b| {
        value
            .checked_mul(10)
            .and_then(|v| v.checked_add(u32::from(b - b'0')))
            .ok_or(DecimalError::Range)
    })
}

/// `u32::MAX` doubles as the unset marker in the shared records, so it is
/// never accepted as a real major version.
fn major_field(bytes: &[u8]) -> Option<u32> {
    parse_decimal(bytes).ok().filter(|&v| v != u32::MAX)
}

fn minor_field(bytes: &[u8]) -> u32 {
    parse_decimal(bytes).unwrap_or(0)
}

/// Read `<digits>[p<digits>]` at the start of `rest`.
///
/// Returns the version and the number of bytes consumed. A `p` that is not
/// followed by a digit is left for the next token.
pub fn parse_forward(rest: &[u8]) -> (IsaVersion, usize) {
    let major_len = digit_run(rest);
    if major_len == 0 {
        return (IsaVersion::UNSET, 0);
    }
    let mut version = IsaVersion {
        major: major_field(rest),
        minor: 0,
    };
    let mut consumed = major_len;
    let after = &rest[major_len..];
    if after.first() == Some(&b'p') {
        let minor_len = digit_run(&after[1..]);
        if minor_len > 0 {
            version.minor = minor_field(&after[1..]);
            consumed += 1 + minor_len;
        }
    }
    (version, consumed)
}

/// Split the trailing version off a multi-letter span.
///
/// Returns the length of the name part and the version. The first byte of a
/// multi-letter span is never a digit, so the name is never empty.
pub fn parse_backward(span: &[u8]) -> (usize, IsaVersion) {
    let trailing = span.iter().rev().take_while(|b| b.is_ascii_digit()).count();
    if trailing == 0 || trailing == span.len() {
        return (span.len(), IsaVersion::UNSET);
    }
    let digits_at = span.len() - trailing;
    if !ends_with_pair_separator(&span[..digits_at]) {
        let version = IsaVersion {
            major: major_field(&span[digits_at..]),
            minor: 0,
        };
        return (digits_at, version);
    }

    let minor = minor_field(&span[digits_at..]);
    let major_end = digits_at - 1;
    let major_len = span[..major_end]
        .iter()
        .rev()
        .take_while(|b| b.is_ascii_digit())
        .count();
    let major_at = major_end - major_len;
    let version = IsaVersion {
        major: major_field(&span[major_at..major_end]),
        minor,
    };
    (major_at, version)
}

/// `…<digit>p` directly before a trailing digit run.
fn ends_with_pair_separator(head: &[u8]) -> bool {
    matches!(head, [.., d, b'p'] if d.is_ascii_digit())
}

/// Whether `head` ends in a complete `<digits>p<digits>` pair.
pub fn ends_with_version_pair(head: &[u8]) -> bool {
    let minor_len = head.iter().rev().take_while(|b| b.is_ascii_digit()).count();
    minor_len > 0 && ends_with_pair_separator(&head[..head.len() - minor_len])
}
