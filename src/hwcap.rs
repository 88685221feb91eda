// Copyright © 2025 Lukas Bower
// SPDX-License-Identifier: Apache-2.0
// Purpose: Legacy ELF hardware capability mask reported to user processes.
// Author: Lukas Bower

//! `AT_HWCAP` capability mask.
//!
//! Bit `n` stands for the letter `'a' + n`. Only the letters below are ever
//! reported; the layout is part of the process ABI and must not change.

use bitflags::bitflags;

use crate::isa::bitmap::letters_of;

bitflags! {
    /// Coarse single-letter capabilities exposed through the auxiliary vector.
    #[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
    pub struct HwCap: u64 {
        /// Atomics.
        const ISA_A = 1 << (b'a' - b'a');
        /// Compressed instructions.
        const ISA_C = 1 << (b'c' - b'a');
        /// Double-precision float.
        const ISA_D = 1 << (b'd' - b'a');
        /// Single-precision float.
        const ISA_F = 1 << (b'f' - b'a');
        /// Base integer.
        const ISA_I = 1 << (b'i' - b'a');
        /// Multiply/divide.
        const ISA_M = 1 << (b'm' - b'a');
    }
}

/// Auxiliary vector key carrying the capability mask.
pub const AT_HWCAP: u64 = 16;

impl HwCap {
    /// Capability flag for a single-letter extension; empty for letters
    /// without one.
    #[must_use]
    pub fn from_letter(letter: u8) -> Self {
        match letter {
            b'i' => Self::ISA_I,
            b'm' => Self::ISA_M,
            b'a' => Self::ISA_A,
            b'f' => Self::ISA_F,
            b'd' => Self::ISA_D,
            b'c' => Self::ISA_C,
            _ => Self::empty(),
        }
    }

    /// Letters present in the mask, alphabetically.
    #[must_use]
    pub fn letters(&self) -> heapless::String<26> {
        letters_of(self.bits())
    }

    /// Whether any floating-point capability is present.
    #[must_use]
    pub fn has_fpu(&self) -> bool {
        self.intersects(Self::ISA_F | Self::ISA_D)
    }
}
