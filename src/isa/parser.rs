// Copyright © 2025 Lukas Bower
// SPDX-License-Identifier: Apache-2.0
// Purpose: Tokenize a hart's riscv,isa string into versioned extension tokens.
// Author: Lukas Bower

//! ISA string tokenizer.
//!
//! After the width marker the string is a sequence of tokens, optionally
//! separated by underscores. Each token is classified by its first byte:
//!
//! * `s` directly followed by `u`, not after an underscore: a legacy
//!   supervisor/user marker emitted by some firmware. Both bytes are dropped.
//! * `s`, `x`, `z`: a multi-letter extension running to the next underscore.
//!   Its version is read backwards from the end of the span.
//! * anything else: a single-letter extension, version read forwards.
//!
//! Invalid tokens are yielded with `valid == false` and scanning resumes
//! right after them.

use serde::Serialize;

use crate::error::IsaError;
use crate::isa::decimal::{ends_with_version_pair, parse_backward, parse_forward, IsaVersion};
use crate::isa::ext::Xlen;

/// Shape of an extension token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum TokenKind {
    /// One lowercase letter, e.g. `m`.
    SingleLetter,
    /// `s`/`x`/`z`-prefixed name, e.g. `zba`.
    MultiLetter,
}

/// One token of an ISA string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ExtensionToken<'a> {
    /// Extension name without its version suffix.
    pub name: &'a str,
    /// Single- or multi-letter.
    pub kind: TokenKind,
    /// Parsed version, [`IsaVersion::UNSET`] when absent.
    pub version: IsaVersion,
    /// Whether the token is well-formed.
    pub valid: bool,
}

impl<'a> ExtensionToken<'a> {
    fn invalid(name: &'a str, kind: TokenKind) -> Self {
        Self {
            name,
            kind,
            version: IsaVersion::UNSET,
            valid: false,
        }
    }

    /// The letter of a valid single-letter token.
    #[must_use]
    pub fn letter(&self) -> Option<u8> {
        match (self.valid, self.kind) {
            (true, TokenKind::SingleLetter) => self.name.bytes().next(),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TokenClass {
    SingleLetter,
    MultiLetter,
    LegacyMarker,
}

fn classify(first: u8, second: Option<u8>, after_underscore: bool) -> TokenClass {
    match first {
        b's' if !after_underscore && second == Some(b'u') => TokenClass::LegacyMarker,
        b's' | b'x' | b'z' => TokenClass::MultiLetter,
        _ => TokenClass::SingleLetter,
    }
}

/// Parser bound to the build's base width.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IsaParser {
    xlen: Xlen,
}

impl IsaParser {
    /// Create a parser accepting strings for `xlen`.
    #[must_use]
    pub fn new(xlen: Xlen) -> Self {
        Self { xlen }
    }

    /// Base width this parser accepts.
    #[must_use]
    pub fn xlen(&self) -> Xlen {
        self.xlen
    }

    /// Strip the width marker and iterate over the tokens that follow.
    pub fn tokenize<'a>(&self, isa: &'a str) -> Result<IsaTokens<'a>, IsaError> {
        let prefix = self.xlen.prefix();
        let body = isa
            .strip_prefix(prefix)
            .ok_or_else(|| IsaError::MissingWidthPrefix {
                expected: prefix,
                isa: isa.to_owned(),
            })?;
        Ok(IsaTokens::new(body))
    }

    /// Collect every token of `isa`, valid or not.
    pub fn parse<'a>(&self, isa: &'a str) -> Result<Vec<ExtensionToken<'a>>, IsaError> {
        Ok(self.tokenize(isa)?.collect())
    }
}

/// Iterator over the tokens of one ISA string body.
#[derive(Debug, Clone)]
pub struct IsaTokens<'a> {
    input: &'a str,
    pos: usize,
    after_underscore: bool,
}

impl<'a> IsaTokens<'a> {
    fn new(input: &'a str) -> Self {
        Self {
            input,
            pos: 0,
            after_underscore: false,
        }
    }

    fn single_letter(&mut self, start: usize) -> ExtensionToken<'a> {
        let bytes = self.input.as_bytes();
        let first = bytes[start];
        if !first.is_ascii_lowercase() {
            let width = self.input[start..].chars().next().map_or(1, char::len_utf8);
            self.pos = start + width;
            return ExtensionToken::invalid(&self.input[start..self.pos], TokenKind::SingleLetter);
        }
        let (version, consumed) = parse_forward(&bytes[start + 1..]);
        self.pos = start + 1 + consumed;
        ExtensionToken {
            name: &self.input[start..start + 1],
            kind: TokenKind::SingleLetter,
            version,
            valid: true,
        }
    }

    fn multi_letter(&mut self, start: usize) -> ExtensionToken<'a> {
        let bytes = self.input.as_bytes();
        let mut end = start + 1;
        let mut valid = true;
        while let Some(&b) = bytes.get(end) {
            if b == b'_' {
                break;
            }
            // A complete `<n>p<m>` version may be followed directly by the
            // next multi-letter extension.
            if valid
                && matches!(b, b's' | b'x' | b'z')
                && ends_with_version_pair(&bytes[start..end])
            {
                break;
            }
            if !(b.is_ascii_lowercase() || b.is_ascii_digit()) {
                valid = false;
            }
            end += 1;
        }
        self.pos = end;

        let span = &self.input[start..end];
        if !valid {
            return ExtensionToken::invalid(span, TokenKind::MultiLetter);
        }
        let (name_len, version) = parse_backward(span.as_bytes());
        ExtensionToken {
            name: &span[..name_len],
            kind: TokenKind::MultiLetter,
            version,
            valid: true,
        }
    }
}

impl<'a> Iterator for IsaTokens<'a> {
    type Item = ExtensionToken<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        let bytes = self.input.as_bytes();
        loop {
            let first = *bytes.get(self.pos)?;
            if first == b'_' {
                self.pos += 1;
                self.after_underscore = true;
                continue;
            }
            let start = self.pos;
            let class = classify(first, bytes.get(start + 1).copied(), self.after_underscore);
            self.after_underscore = false;
            match class {
                TokenClass::LegacyMarker => {
                    log::debug!("isa: dropping legacy 'su' marker at offset {start}");
                    self.pos = start + 2;
                }
                TokenClass::MultiLetter => return Some(self.multi_letter(start)),
                TokenClass::SingleLetter => return Some(self.single_letter(start)),
            }
        }
    }
}
