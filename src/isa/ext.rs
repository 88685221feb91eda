// Copyright © 2025 Lukas Bower
// SPDX-License-Identifier: Apache-2.0
// Purpose: Name the base width and the multi-letter extensions that are persisted in hart pages.
// Author: Lukas Bower

//! Address width marker and the multi-letter allow-list.

use serde::{Deserialize, Serialize};

use rvext_layout::EXT_NAME_MAX_LEN;

use crate::error::ConfigError;
use crate::isa::bitmap::{ISA_EXT_BASE, ISA_EXT_MAX};

/// Bit of the `Sscofpmf` count-overflow extension.
pub const ISA_EXT_SSCOFPMF: usize = ISA_EXT_BASE;
/// Bit of `Zba`.
pub const ISA_EXT_ZBA: usize = ISA_EXT_BASE + 1;
/// Bit of `Zbb`.
pub const ISA_EXT_ZBB: usize = ISA_EXT_BASE + 2;
/// Bit of `Zfh`.
pub const ISA_EXT_ZFH: usize = ISA_EXT_BASE + 3;

const BUILTIN: [(&str, usize); 4] = [
    ("sscofpmf", ISA_EXT_SSCOFPMF),
    ("zba", ISA_EXT_ZBA),
    ("zbb", ISA_EXT_ZBB),
    ("zfh", ISA_EXT_ZFH),
];

/// Base integer width an ISA string must announce.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Xlen {
    /// `rv32`
    Rv32,
    /// `rv64`
    Rv64,
}

impl Xlen {
    /// Width of the running build.
    #[must_use]
    pub const fn native() -> Self {
        if cfg!(target_pointer_width = "32") {
            Self::Rv32
        } else {
            Self::Rv64
        }
    }

    /// Marker every ISA string for this width starts with.
    #[must_use]
    pub const fn prefix(self) -> &'static str {
        match self {
            Self::Rv32 => "rv32",
            Self::Rv64 => "rv64",
        }
    }
}

impl Default for Xlen {
    fn default() -> Self {
        Self::native()
    }
}

/// One allow-listed multi-letter extension.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AllowedExtension {
    /// Lowercase extension name as it appears in ISA strings.
    pub name: String,
    /// Bitmap position set when the extension is registered.
    pub bit: usize,
}

/// Multi-letter extensions that get a registry record and a bitmap bit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AllowList {
    entries: Vec<AllowedExtension>,
}

impl AllowList {
    /// Table compiled into the kernel.
    #[must_use]
    pub fn builtin() -> Self {
        Self {
            entries: BUILTIN
                .iter()
                .map(|&(name, bit)| AllowedExtension {
                    name: name.to_owned(),
                    bit,
                })
                .collect(),
        }
    }

    /// Add an entry. Names and bits must stay unique and bits must lie in
    /// the multi-letter range.
    pub fn insert(&mut self, name: &str, bit: usize) -> Result<(), ConfigError> {
        if !is_multi_letter_name(name) {
            return Err(ConfigError::InvalidExtensionName(name.to_owned()));
        }
        if name.len() > EXT_NAME_MAX_LEN {
            return Err(ConfigError::ExtensionNameTooLong {
                name: name.to_owned(),
                max: EXT_NAME_MAX_LEN,
            });
        }
        if !(ISA_EXT_BASE..ISA_EXT_MAX).contains(&bit) {
            return Err(ConfigError::BitOutOfRange {
                name: name.to_owned(),
                bit,
            });
        }
        if self.entries.iter().any(|e| e.name == name) {
            return Err(ConfigError::DuplicateExtension(name.to_owned()));
        }
        if let Some(existing) = self.entries.iter().find(|e| e.bit == bit) {
            return Err(ConfigError::DuplicateBit {
                bit,
                existing: existing.name.clone(),
            });
        }
        self.entries.push(AllowedExtension {
            name: name.to_owned(),
            bit,
        });
        Ok(())
    }

    /// Bitmap position for `name`, if allow-listed.
    #[must_use]
    pub fn bit_for(&self, name: &str) -> Option<usize> {
        self.entries.iter().find(|e| e.name == name).map(|e| e.bit)
    }

    /// Allow-listed entries in table order.
    pub fn iter(&self) -> impl Iterator<Item = &AllowedExtension> {
        self.entries.iter()
    }
}

impl Default for AllowList {
    fn default() -> Self {
        Self::builtin()
    }
}

/// Well-formed multi-letter names: `s`, `x` or `z` followed by lowercase
/// letters and digits, not ending in a digit (that would read as a version).
fn is_multi_letter_name(name: &str) -> bool {
    let bytes = name.as_bytes();
    matches!(bytes.first(), Some(b's' | b'x' | b'z'))
        && bytes.len() > 1
        && bytes
            .iter()
            .all(|b| b.is_ascii_lowercase() || b.is_ascii_digit())
        && !bytes.last().is_some_and(u8::is_ascii_digit)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_table_maps_known_extensions() {
        let list = AllowList::builtin();
        assert_eq!(list.bit_for("sscofpmf"), Some(ISA_EXT_SSCOFPMF));
        assert_eq!(list.bit_for("zba"), Some(ISA_EXT_ZBA));
        assert_eq!(list.bit_for("zbb"), Some(ISA_EXT_ZBB));
        assert_eq!(list.bit_for("zfh"), Some(ISA_EXT_ZFH));
        assert_eq!(list.bit_for("zbx"), None);
    }

    #[test]
    fn insert_extends_without_touching_builtin_bits() {
        let mut list = AllowList::builtin();
        list.insert("zicbom", 40).expect("insert zicbom");
        assert_eq!(list.bit_for("zicbom"), Some(40));
        assert_eq!(list.bit_for("zba"), Some(ISA_EXT_ZBA));
    }

    #[test]
    fn insert_rejects_bad_entries() {
        let mut list = AllowList::builtin();
        assert!(matches!(
            list.insert("zba", 40),
            Err(ConfigError::DuplicateExtension(_))
        ));
        assert!(matches!(
            list.insert("zbs", ISA_EXT_ZBA),
            Err(ConfigError::DuplicateBit { .. })
        ));
        assert!(matches!(
            list.insert("zbs", 3),
            Err(ConfigError::BitOutOfRange { .. })
        ));
        assert!(matches!(
            list.insert("zbs", ISA_EXT_MAX),
            Err(ConfigError::BitOutOfRange { .. })
        ));
        assert!(matches!(
            list.insert("Zbs", 40),
            Err(ConfigError::InvalidExtensionName(_))
        ));
        assert!(matches!(
            list.insert("zbs1", 40),
            Err(ConfigError::InvalidExtensionName(_))
        ));
        assert!(matches!(
            list.insert("m", 40),
            Err(ConfigError::InvalidExtensionName(_))
        ));
    }

    #[test]
    fn native_prefix_matches_pointer_width() {
        let expected = if cfg!(target_pointer_width = "32") { "rv32" } else { "rv64" };
        assert_eq!(Xlen::native().prefix(), expected);
    }
}
