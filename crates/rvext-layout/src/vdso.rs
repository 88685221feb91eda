// Copyright © 2025 Lukas Bower
// SPDX-License-Identifier: Apache-2.0
// Purpose: Answer extension queries directly from user-visible memory without a trap.
// Author: Lukas Bower

//! Trap-free extension lookup.
//!
//! Unprivileged code that has the hart page mapped can call
//! [`check_extension`] directly. The result codes match the system call so
//! callers may fall back to the trapped path transparently.

use core::ffi::CStr;

use crate::page::SharedHartPage;
use crate::scan::find_extension;

/// Outcome of an extension query.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(i32)]
pub enum LookupStatus {
    /// The extension is registered; version outputs were written.
    Found = 0,
    /// No record carries the queried name; outputs were left untouched.
    NotFound = -1,
}

impl LookupStatus {
    /// Raw return code as seen by callers of the C ABI.
    #[must_use]
    pub fn code(self) -> i32 {
        self as i32
    }
}

/// Look up `query` in `page`, writing the version on success.
pub fn check_extension(
    page: &SharedHartPage,
    query: &CStr,
    major: &mut u64,
    minor: &mut u64,
) -> LookupStatus {
    match find_extension(page, query.to_bytes()) {
        Some(version) => {
            *major = version.major;
            *minor = version.minor;
            LookupStatus::Found
        }
        None => LookupStatus::NotFound,
    }
}
