// Copyright © 2025 Lukas Bower
// SPDX-License-Identifier: Apache-2.0
// Purpose: Checked access to unprivileged memory for system call handlers.
// Author: Lukas Bower

//! User memory access.
//!
//! System call handlers never dereference caller-supplied addresses
//! directly. They go through [`UserMemory`], which validates every range and
//! reports a fault instead of touching memory outside the caller's mapping.

use crate::error::LookupError;

/// Address in the calling process's address space.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct UserAddr(pub u64);

impl UserAddr {
    /// Null user pointer.
    pub const NULL: UserAddr = UserAddr(0);

    fn offset(self, by: usize) -> Option<UserAddr> {
        u64::try_from(by)
            .ok()
            .and_then(|by| self.0.checked_add(by))
            .map(UserAddr)
    }
}

/// Memory of the process that issued a system call.
pub trait UserMemory {
    /// Whether `len` bytes at `addr` may be accessed.
    fn access_ok(&self, addr: UserAddr, len: usize) -> bool;

    /// Copy `buf.len()` bytes from user memory.
    fn read(&self, addr: UserAddr, buf: &mut [u8]) -> Result<(), LookupError>;

    /// Copy `bytes` into user memory.
    fn write(&mut self, addr: UserAddr, bytes: &[u8]) -> Result<(), LookupError>;

    /// Copy a NUL-terminated string into a bounded kernel buffer.
    ///
    /// Reads byte by byte so a short string at the end of a mapping does not
    /// fault. The terminator is not included in the result. Strings that do
    /// not terminate within `N` bytes are rejected.
    fn strncpy_from_user<const N: usize>(
        &self,
        src: UserAddr,
    ) -> Result<heapless::Vec<u8, N>, LookupError> {
        let mut out = heapless::Vec::new();
        for i in 0..N {
            let addr = src.offset(i).ok_or(LookupError::Fault { addr: src.0 })?;
            let mut byte = [0u8; 1];
            self.read(addr, &mut byte)?;
            if byte[0] == 0 {
                return Ok(out);
            }
            out.push(byte[0])
                .map_err(|_| LookupError::NameTooLong { max: N.saturating_sub(1) })?;
        }
        Err(LookupError::NameTooLong {
            max: N.saturating_sub(1),
        })
    }
}

/// Flat user address space backed by a byte vector.
///
/// Used by host builds and tests to stand in for a process mapping.
#[derive(Debug, Clone)]
pub struct UserArena {
    base: u64,
    bytes: Vec<u8>,
    next: usize,
}

impl UserArena {
    /// Mapping of `size` zeroed bytes starting at `base`.
    #[must_use]
    pub fn new(base: u64, size: usize) -> Self {
        Self {
            base,
            bytes: vec![0; size],
            next: 0,
        }
    }

    /// Place `bytes` in the arena and return their address.
    pub fn alloc(&mut self, bytes: &[u8]) -> Result<UserAddr, LookupError> {
        let end = self
            .next
            .checked_add(bytes.len())
            .filter(|&end| end <= self.bytes.len())
            .ok_or(LookupError::Fault {
                addr: self.base.saturating_add(self.next as u64),
            })?;
        let addr = UserAddr(self.base + self.next as u64);
        self.bytes[self.next..end].copy_from_slice(bytes);
        // Keep later allocations 8-byte aligned.
        self.next = end.next_multiple_of(8).min(self.bytes.len());
        Ok(addr)
    }

    /// Place a NUL-terminated copy of `s` in the arena.
    pub fn alloc_cstr(&mut self, s: &str) -> Result<UserAddr, LookupError> {
        let mut bytes = Vec::with_capacity(s.len() + 1);
        bytes.extend_from_slice(s.as_bytes());
        bytes.push(0);
        self.alloc(&bytes)
    }

    /// Place a `u64` slot holding `value` in the arena.
    pub fn alloc_u64(&mut self, value: u64) -> Result<UserAddr, LookupError> {
        self.alloc(&value.to_ne_bytes())
    }

    /// Read back a `u64` slot.
    pub fn read_u64(&self, addr: UserAddr) -> Result<u64, LookupError> {
        let mut buf = [0u8; 8];
        self.read(addr, &mut buf)?;
        Ok(u64::from_ne_bytes(buf))
    }

    fn range(&self, addr: UserAddr, len: usize) -> Option<core::ops::Range<usize>> {
        let start = usize::try_from(addr.0.checked_sub(self.base)?).ok()?;
        let end = start.checked_add(len)?;
        (end <= self.bytes.len()).then_some(start..end)
    }
}

impl UserMemory for UserArena {
    fn access_ok(&self, addr: UserAddr, len: usize) -> bool {
        self.range(addr, len).is_some()
    }

    fn read(&self, addr: UserAddr, buf: &mut [u8]) -> Result<(), LookupError> {
        let range = self
            .range(addr, buf.len())
            .ok_or(LookupError::Fault { addr: addr.0 })?;
        buf.copy_from_slice(&self.bytes[range]);
        Ok(())
    }

    fn write(&mut self, addr: UserAddr, bytes: &[u8]) -> Result<(), LookupError> {
        let range = self
            .range(addr, bytes.len())
            .ok_or(LookupError::Fault { addr: addr.0 })?;
        self.bytes[range].copy_from_slice(bytes);
        Ok(())
    }
}
