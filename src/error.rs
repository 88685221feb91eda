// Copyright © 2025 Lukas Bower
// SPDX-License-Identifier: Apache-2.0
// Purpose: Error types for ISA parsing, registry building, lookup, configuration and boot.
// Author: Lukas Bower

//! Error types shared across the crate.

use rvext_layout::PushError;

use crate::platform::HartId;

/// Failure converting a decimal version field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum DecimalError {
    /// The field does not start with a digit.
    #[error("expected a decimal digit")]
    Invalid,
    /// The value does not fit the destination width.
    #[error("decimal value out of range")]
    Range,
}

/// Failure parsing a whole ISA string.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum IsaError {
    /// The string does not begin with the build's width marker.
    #[error("isa string {isa:?} does not start with {expected:?}")]
    MissingWidthPrefix {
        /// Marker the build expects.
        expected: &'static str,
        /// Offending string.
        isa: String,
    },
}

/// Failure persisting an extension record.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RegistryError {
    /// The hart page has no free slot left.
    #[error("hart {hart}: extension registry full ({capacity} records)")]
    Full {
        /// Hart whose page is full.
        hart: HartId,
        /// Slots in the page.
        capacity: usize,
    },
    /// The extension already has a record on this hart.
    #[error("hart {hart}: extension {name:?} already registered")]
    Duplicate {
        /// Hart being populated.
        hart: HartId,
        /// Repeated extension.
        name: String,
    },
    /// The page refused the record for another reason.
    #[error("hart {hart}: cannot record {name:?}: {reason}")]
    Rejected {
        /// Hart being populated.
        hart: HartId,
        /// Extension name.
        name: String,
        /// Layout-level reason.
        reason: PushError,
    },
}

/// Failure of the trapped lookup path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum LookupError {
    /// The query name is not terminated within the bounded buffer.
    #[error("extension name longer than {max} bytes")]
    NameTooLong {
        /// Longest accepted name.
        max: usize,
    },
    /// A user address could not be accessed.
    #[error("bad user address {addr:#x}")]
    Fault {
        /// Faulting address.
        addr: u64,
    },
}

impl LookupError {
    /// Negative errno returned to the caller.
    #[must_use]
    pub fn errno(self) -> i64 {
        match self {
            Self::NameTooLong { .. } => -ENAMETOOLONG,
            Self::Fault { .. } => -EFAULT,
        }
    }
}

/// Bad address.
pub const EFAULT: i64 = 14;
/// Invalid argument.
pub const EINVAL: i64 = 22;
/// File name too long.
pub const ENAMETOOLONG: i64 = 36;
/// Function not implemented.
pub const ENOSYS: i64 = 38;

/// Failure loading or validating configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// The file could not be read.
    #[error("cannot read {path}: {source}")]
    Io {
        /// Path that failed.
        path: String,
        /// Underlying I/O error.
        source: std::io::Error,
    },
    /// TOML syntax or schema error.
    #[error("invalid config: {0}")]
    Toml(#[from] toml::de::Error),
    /// JSON syntax or schema error in a platform description.
    #[error("invalid platform description: {0}")]
    Json(#[from] serde_json::Error),
    /// Allow-list name is not a lowercase `s`/`x`/`z` extension name.
    #[error("invalid multi-letter extension name {0:?}")]
    InvalidExtensionName(String),
    /// Allow-list name does not fit a record.
    #[error("extension name {name:?} longer than {max} bytes")]
    ExtensionNameTooLong {
        /// Offending name.
        name: String,
        /// Longest accepted name.
        max: usize,
    },
    /// Allow-list bit outside the multi-letter range.
    #[error("extension {name:?}: bit {bit} outside the multi-letter range")]
    BitOutOfRange {
        /// Extension name.
        name: String,
        /// Rejected bit.
        bit: usize,
    },
    /// Allow-list name listed twice.
    #[error("extension {0:?} listed twice")]
    DuplicateExtension(String),
    /// Allow-list bit already taken.
    #[error("bit {bit} already assigned to {existing:?}")]
    DuplicateBit {
        /// Contested bit.
        bit: usize,
        /// Extension that owns it.
        existing: String,
    },
    /// The hart page table must hold at least one hart.
    #[error("max_harts must be at least 1")]
    NoHarts,
}

/// Failure during discovery or publication.
#[derive(Debug, thiserror::Error)]
pub enum BootError {
    /// The discovery configuration is unusable.
    #[error(transparent)]
    Config(#[from] ConfigError),
    /// A snapshot has already been published.
    #[error("isa snapshot already published")]
    AlreadyPublished,
}
