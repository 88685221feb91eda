// Copyright © 2025 Lukas Bower
// SPDX-License-Identifier: Apache-2.0
// Purpose: Trapped extension lookup and the system call table entry that reaches it.
// Author: Lukas Bower

//! Extension lookup system call.
//!
//! The trapped path copies the query out of user memory into a bounded
//! kernel buffer before scanning, then copies the version back. The scan
//! itself is the same one the trap-free path runs.

use rvext_layout::vdso::LookupStatus;
use rvext_layout::{find_extension, SharedHartPage, EXT_NAME_CAPACITY};

use crate::error::{LookupError, EINVAL, ENOSYS};
use crate::snapshot::SystemSnapshot;
use crate::uaccess::{UserAddr, UserMemory};

/// System call number of `riscv_check_extension`.
pub const SYS_RISCV_CHECK_EXTENSION: u32 = 260;

/// Largest query accepted, terminator included. Longer names cannot match
/// any record.
pub const QUERY_CAPACITY: usize = EXT_NAME_CAPACITY;

/// System calls served by this subsystem.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Syscall {
    /// `riscv_check_extension(name, major, minor)`
    CheckExtension,
    /// Anything else.
    Unknown(u32),
}

impl From<u32> for Syscall {
    fn from(id: u32) -> Self {
        match id {
            SYS_RISCV_CHECK_EXTENSION => Syscall::CheckExtension,
            other => Syscall::Unknown(other),
        }
    }
}

/// `riscv_check_extension`: look up the user string at `name` in `page`.
///
/// On a match the major and minor versions are written to the two user
/// slots. A miss writes nothing. Overlong names and bad addresses fail
/// before any scan or write.
pub fn sys_riscv_check_extension<M: UserMemory>(
    page: Option<&SharedHartPage>,
    mem: &mut M,
    name: UserAddr,
    major: UserAddr,
    minor: UserAddr,
) -> Result<LookupStatus, LookupError> {
    let query = mem.strncpy_from_user::<QUERY_CAPACITY>(name)?;
    let Some(version) = page.and_then(|page| find_extension(page, &query)) else {
        return Ok(LookupStatus::NotFound);
    };
    for slot in [major, minor] {
        if !mem.access_ok(slot, core::mem::size_of::<u64>()) {
            return Err(LookupError::Fault { addr: slot.0 });
        }
    }
    mem.write(major, &version.major.to_ne_bytes())?;
    mem.write(minor, &version.minor.to_ne_bytes())?;
    Ok(LookupStatus::Found)
}

/// Dispatch a system call by number and return the raw result.
///
/// Lookups are answered from the snapshot's query hart.
pub fn dispatch<M: UserMemory>(
    snapshot: &SystemSnapshot,
    mem: &mut M,
    syscall_id: u32,
    args: &[u64],
) -> i64 {
    match Syscall::from(syscall_id) {
        Syscall::CheckExtension => {
            let &[name, major, minor] = args else {
                return -EINVAL;
            };
            match sys_riscv_check_extension(
                snapshot.query_page(),
                mem,
                UserAddr(name),
                UserAddr(major),
                UserAddr(minor),
            ) {
                Ok(status) => i64::from(status.code()),
                Err(err) => {
                    log::debug!("riscv_check_extension: {err}");
                    err.errno()
                }
            }
        }
        Syscall::Unknown(id) => {
            log::debug!("unknown syscall_id={id} args={args:?}");
            -ENOSYS
        }
    }
}
