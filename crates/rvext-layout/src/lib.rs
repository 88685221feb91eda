// Copyright © 2025 Lukas Bower
// SPDX-License-Identifier: Apache-2.0
// Purpose: Define the per-hart shared page and extension registry shared across privilege levels.
// Author: Lukas Bower
#![no_std]
#![forbid(unsafe_code)]
#![warn(missing_docs)]

//! Fixed-layout data shared between the kernel and unprivileged code.
//!
//! Every hart owns one [`SharedHartPage`]. The kernel fills it once during
//! boot and the page is read-only afterwards. Records are chained by slot
//! index rather than by address so both privilege domains can walk the list
//! without sharing a pointer representation.

#[cfg(test)]
extern crate std;

mod page;
mod record;
mod scan;
pub mod vdso;

pub use page::{HartIdentity, PushError, RecordBuffer, Records, SharedHartPage};
pub use record::{
    ExtensionRecord, RecordVersion, EXT_NAME_CAPACITY, EXT_NAME_MAX_LEN, MAJOR_UNSET,
};
pub use scan::find_extension;

/// Size in bytes of the per-hart record region.
pub const RECORD_BUFFER_SIZE: usize = 8192;

/// Size in bytes of one record slot.
pub const RECORD_SIZE: usize = core::mem::size_of::<ExtensionRecord>();

/// Number of records a single hart page can hold.
pub const RECORD_CAPACITY: usize = RECORD_BUFFER_SIZE / RECORD_SIZE;

/// Slot index terminating a record chain.
pub const SLOT_NONE: u32 = u32::MAX;
