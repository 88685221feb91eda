// Copyright © 2025 Lukas Bower
// SPDX-License-Identifier: Apache-2.0
// Purpose: Root library for RISC-V ISA discovery, capability aggregation and extension lookup.
// Author: Lukas Bower

//! RISC-V ISA discovery.
//!
//! Boot reads every hart's ISA string, reduces the single-letter extensions
//! to the capability mask all harts share and records allow-listed
//! multi-letter extensions in each hart's shared page. The resulting
//! [`SystemSnapshot`] is published once and answers kernel queries, the
//! trap-free user lookup and the `riscv_check_extension` system call.

/// Per-hart folding into the system capability set
pub mod aggregate;

/// Discovery pass over firmware hart descriptions
pub mod boot;

/// Discovery configuration (TOML)
pub mod config;

/// Structured discovery diagnostics
pub mod diag;

/// Error types shared across the crate
pub mod error;

/// Legacy capability mask exported through the auxiliary vector
pub mod hwcap;

/// ISA string grammar, versions, extension table and bitmap
pub mod isa;

/// Firmware hart descriptions
pub mod platform;

/// Per-hart extension registry construction
pub mod registry;

/// Published system snapshot
pub mod snapshot;

/// `riscv_check_extension` system call
pub mod syscall;

/// Checked user memory access
pub mod uaccess;

pub use boot::discover;
pub use config::DiscoveryConfig;
pub use diag::Diagnostic;
pub use error::{BootError, ConfigError, IsaError, LookupError, RegistryError};
pub use hwcap::HwCap;
pub use isa::{IsaBitmap, IsaParser, Xlen};
pub use platform::{FirmwareSource, HartDescriptor, PlatformDescription};
pub use snapshot::{isa_extension_available, isa_extension_base, publish, system, SystemSnapshot};

pub use rvext_layout;
