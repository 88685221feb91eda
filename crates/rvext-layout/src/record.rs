// Copyright © 2025 Lukas Bower
// SPDX-License-Identifier: Apache-2.0
// Purpose: Describe a single versioned extension record stored in a hart page.
// Author: Lukas Bower

//! Extension record slot layout.

use crate::SLOT_NONE;

/// Bytes reserved for a record name, including the terminating NUL.
pub const EXT_NAME_CAPACITY: usize = 100;

/// Longest name a record can hold.
pub const EXT_NAME_MAX_LEN: usize = EXT_NAME_CAPACITY - 1;

/// Major version stored when the ISA string carried none.
pub const MAJOR_UNSET: u64 = u32::MAX as u64;

/// Version pair reported by a lookup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RecordVersion {
    /// Major version, [`MAJOR_UNSET`] when absent.
    pub major: u64,
    /// Minor version, zero when absent.
    pub minor: u64,
}

impl RecordVersion {
    /// Return the major version unless it is the unset sentinel.
    #[must_use]
    pub fn major(&self) -> Option<u64> {
        (self.major != MAJOR_UNSET).then_some(self.major)
    }
}

/// One registry slot.
#[repr(C)]
#[derive(Clone, Copy)]
pub struct ExtensionRecord {
    major: u64,
    minor: u64,
    next: u32,
    name: [u8; EXT_NAME_CAPACITY],
}

impl ExtensionRecord {
    pub(crate) const EMPTY: Self = Self {
        major: 0,
        minor: 0,
        next: SLOT_NONE,
        name: [0; EXT_NAME_CAPACITY],
    };

    /// Fill the slot. The caller has already validated `name`.
    pub(crate) fn fill(&mut self, name: &[u8], version: RecordVersion) {
        self.name = [0; EXT_NAME_CAPACITY];
        self.name[..name.len()].copy_from_slice(name);
        self.major = version.major;
        self.minor = version.minor;
        self.next = SLOT_NONE;
    }

    pub(crate) fn set_next(&mut self, next: u32) {
        self.next = next;
    }

    pub(crate) fn next(&self) -> u32 {
        self.next
    }

    /// Name bytes up to, not including, the terminating NUL.
    #[must_use]
    pub fn name(&self) -> &[u8] {
        let len = self
            .name
            .iter()
            .position(|&b| b == 0)
            .unwrap_or(EXT_NAME_CAPACITY);
        &self.name[..len]
    }

    /// Name as UTF-8 when it is valid.
    #[must_use]
    pub fn name_str(&self) -> Option<&str> {
        core::str::from_utf8(self.name()).ok()
    }

    /// Stored version pair.
    #[must_use]
    pub fn version(&self) -> RecordVersion {
        RecordVersion {
            major: self.major,
            minor: self.minor,
        }
    }
}

impl core::fmt::Debug for ExtensionRecord {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("ExtensionRecord")
            .field("name", &self.name_str().unwrap_or("<non-utf8>"))
            .field("major", &self.major)
            .field("minor", &self.minor)
            .field("next", &self.next)
            .finish()
    }
}

impl PartialEq for ExtensionRecord {
    fn eq(&self, other: &Self) -> bool {
        self.name() == other.name() && self.version() == other.version()
    }
}

impl Eq for ExtensionRecord {}
