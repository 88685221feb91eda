// Copyright © 2025 Lukas Bower
// SPDX-License-Identifier: Apache-2.0
// Purpose: Lay out the per-hart shared page and maintain its slot-indexed record list.
// Author: Lukas Bower

//! Shared hart page and its record arena.

use core::fmt;

use crate::record::{ExtensionRecord, RecordVersion, EXT_NAME_MAX_LEN};
use crate::{RECORD_BUFFER_SIZE, RECORD_CAPACITY, RECORD_SIZE, SLOT_NONE};

const RECORD_PAD: usize = RECORD_BUFFER_SIZE - RECORD_CAPACITY * RECORD_SIZE;

const _: () = assert!(core::mem::size_of::<RecordBuffer>() == RECORD_BUFFER_SIZE);
const _: () = assert!(RECORD_CAPACITY < SLOT_NONE as usize);

/// Identification registers reported by firmware for one hart.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct HartIdentity {
    /// `mvendorid`.
    pub vendor_id: u64,
    /// `marchid`.
    pub arch_id: u64,
    /// `mimpid`.
    pub impl_id: u64,
}

/// Reasons a record cannot be appended to a page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PushError {
    /// Every slot in the record buffer is in use.
    Full {
        /// Number of slots in the buffer.
        capacity: usize,
    },
    /// The name does not fit a record.
    NameTooLong {
        /// Length of the rejected name.
        len: usize,
    },
    /// The name is empty or contains a NUL byte.
    InvalidName,
    /// A record with the same name is already present.
    Duplicate,
}

impl fmt::Display for PushError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Full { capacity } => write!(f, "record buffer full ({capacity} slots)"),
            Self::NameTooLong { len } => {
                write!(f, "name of {len} bytes exceeds {EXT_NAME_MAX_LEN}")
            }
            Self::InvalidName => f.write_str("empty name or embedded NUL"),
            Self::Duplicate => f.write_str("duplicate extension name"),
        }
    }
}

/// Fixed 8 KiB region holding the record slots.
#[repr(C)]
pub struct RecordBuffer {
    slots: [ExtensionRecord; RECORD_CAPACITY],
    _pad: [u8; RECORD_PAD],
}

/// Per-hart page shared between the kernel and unprivileged readers.
#[repr(C)]
pub struct SharedHartPage {
    vendor_id: u64,
    arch_id: u64,
    impl_id: u64,
    head: u32,
    tail: u32,
    len: u32,
    _reserved: u32,
    buffer: RecordBuffer,
}

impl SharedHartPage {
    /// Create an empty page with no identity and no records.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            vendor_id: 0,
            arch_id: 0,
            impl_id: 0,
            head: SLOT_NONE,
            tail: SLOT_NONE,
            len: 0,
            _reserved: 0,
            buffer: RecordBuffer {
                slots: [ExtensionRecord::EMPTY; RECORD_CAPACITY],
                _pad: [0; RECORD_PAD],
            },
        }
    }

    /// Record the hart identification triplet.
    pub fn set_identity(&mut self, identity: HartIdentity) {
        self.vendor_id = identity.vendor_id;
        self.arch_id = identity.arch_id;
        self.impl_id = identity.impl_id;
    }

    /// Hart identification triplet.
    #[must_use]
    pub fn identity(&self) -> HartIdentity {
        HartIdentity {
            vendor_id: self.vendor_id,
            arch_id: self.arch_id,
            impl_id: self.impl_id,
        }
    }

    /// Slot index of the first record, if any.
    #[must_use]
    pub fn head(&self) -> Option<u32> {
        (self.head != SLOT_NONE).then_some(self.head)
    }

    /// Number of records stored.
    #[must_use]
    pub fn len(&self) -> usize {
        self.len as usize
    }

    /// Whether no record has been stored yet.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Whether every slot is in use.
    #[must_use]
    pub fn is_full(&self) -> bool {
        self.len() >= RECORD_CAPACITY
    }

    /// Total slots available in the page.
    #[must_use]
    pub const fn capacity() -> usize {
        RECORD_CAPACITY
    }

    /// Record stored in `slot`, when that slot has been allocated.
    #[must_use]
    pub fn get(&self, slot: u32) -> Option<&ExtensionRecord> {
        let index = slot as usize;
        if index < self.len() {
            self.buffer.slots.get(index)
        } else {
            None
        }
    }

    /// Append a record at the tail of the list and return its slot.
    pub fn push(&mut self, name: &[u8], version: RecordVersion) -> Result<u32, PushError> {
        if name.is_empty() || name.contains(&0) {
            return Err(PushError::InvalidName);
        }
        if name.len() > EXT_NAME_MAX_LEN {
            return Err(PushError::NameTooLong { len: name.len() });
        }
        if self.records().any(|record| record.name() == name) {
            return Err(PushError::Duplicate);
        }
        if self.is_full() {
            return Err(PushError::Full {
                capacity: RECORD_CAPACITY,
            });
        }

        let slot = self.len;
        self.buffer.slots[slot as usize].fill(name, version);
        match self.head() {
            None => self.head = slot,
            Some(_) => self.buffer.slots[self.tail as usize].set_next(slot),
        }
        self.tail = slot;
        self.len += 1;
        Ok(slot)
    }

    /// Walk the records from head to tail.
    #[must_use]
    pub fn records(&self) -> Records<'_> {
        Records {
            page: self,
            cursor: self.head,
            remaining: self.len(),
        }
    }

    /// Whether both pages hold the same names and versions in the same order.
    #[must_use]
    pub fn same_records(&self, other: &SharedHartPage) -> bool {
        self.records().eq(other.records())
    }
}

impl Default for SharedHartPage {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for SharedHartPage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SharedHartPage")
            .field("identity", &self.identity())
            .field("records", &RecordList(self))
            .finish()
    }
}

struct RecordList<'a>(&'a SharedHartPage);

impl fmt::Debug for RecordList<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.0.records()).finish()
    }
}

/// Iterator over the record chain of a page.
///
/// The walk follows `next` slot indices but never visits more than the
/// number of allocated slots and never leaves the allocated range, so it
/// terminates even if the chain were corrupted.
#[derive(Clone)]
pub struct Records<'a> {
    page: &'a SharedHartPage,
    cursor: u32,
    remaining: usize,
}

impl<'a> Iterator for Records<'a> {
    type Item = &'a ExtensionRecord;

    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 || self.cursor == SLOT_NONE {
            return None;
        }
        let record = self.page.get(self.cursor)?;
        self.cursor = record.next();
        self.remaining -= 1;
        Some(record)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (0, Some(self.remaining))
    }
}
