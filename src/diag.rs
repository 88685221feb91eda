// Copyright © 2025 Lukas Bower
// SPDX-License-Identifier: Apache-2.0
// Purpose: Boot-time diagnostics retained in the published ISA snapshot.
// Author: Lukas Bower

//! Discovery diagnostics.

use core::fmt;

use serde::Serialize;

use crate::platform::HartId;

/// Notable event recorded while building the system snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum Diagnostic {
    /// F was advertised without D and has been masked out.
    FloatWithoutDouble,
    /// A hart ran out of record slots.
    RegistryFull {
        /// Affected hart.
        hart: HartId,
        /// Registrations refused.
        rejected: usize,
    },
    /// A hart's records differ from the query hart's records.
    RegistryMismatch {
        /// Differing hart.
        hart: HartId,
        /// Hart answering system-wide lookups.
        reference: HartId,
    },
    /// A hart id lies outside the page table. Its single-letter extensions
    /// still join the intersection but it records no extensions.
    NoRegistry {
        /// Affected hart.
        hart: HartId,
    },
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::FloatWithoutDouble => {
                f.write_str("systems with F but not D are not supported; F masked")
            }
            Self::RegistryFull { hart, rejected } => {
                write!(f, "hart {hart}: registry full, {rejected} extension(s) not recorded")
            }
            Self::RegistryMismatch { hart, reference } => {
                write!(f, "hart {hart}: extension records differ from hart {reference}")
            }
            Self::NoRegistry { hart } => {
                write!(f, "hart {hart}: outside the hart page table, no extension registry")
            }
        }
    }
}
