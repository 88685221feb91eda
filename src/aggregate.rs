// Copyright © 2025 Lukas Bower
// SPDX-License-Identifier: Apache-2.0
// Purpose: Reduce per-hart capabilities to the set guaranteed on every qualifying hart.
// Author: Lukas Bower

//! System-wide capability reduction.

use crate::diag::Diagnostic;
use crate::hwcap::HwCap;
use crate::isa::bitmap::{letter_bit, IsaBitmap};
use crate::platform::HartId;

/// Capabilities discovered on one hart.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct HartCapabilities {
    /// Legacy capability flags.
    pub hwcap: HwCap,
    /// Extension bitmap.
    pub isa: IsaBitmap,
}

impl HartCapabilities {
    /// Account for a valid single-letter extension.
    pub fn add_letter(&mut self, letter: u8) {
        self.hwcap |= HwCap::from_letter(letter);
        if let Some(bit) = letter_bit(letter) {
            self.isa.set(bit);
        }
    }
}

/// Result of the reduction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SystemCapabilities {
    /// Capability mask common to all qualifying harts, after policy.
    pub hwcap: HwCap,
    /// Extension bitmap common to all qualifying harts.
    pub isa: IsaBitmap,
    /// Harts that contributed, in fold order.
    pub harts: Vec<HartId>,
    /// Policy diagnostics raised by the reduction.
    pub diagnostics: Vec<Diagnostic>,
}

/// Folds qualifying harts into one capability set.
///
/// The first hart seeds the result; every later hart intersects with it.
/// Harts that never reach [`fold`](Self::fold) have no influence.
#[derive(Debug, Default)]
pub struct IsaBitmapAggregator {
    hwcap: HwCap,
    isa: IsaBitmap,
    harts: Vec<HartId>,
}

impl IsaBitmapAggregator {
    /// Empty aggregator.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add one qualifying hart.
    pub fn fold(&mut self, hart: HartId, caps: &HartCapabilities) {
        if self.harts.is_empty() {
            self.hwcap = caps.hwcap;
            self.isa = caps.isa;
        } else {
            self.hwcap &= caps.hwcap;
            self.isa.and_assign(&caps.isa);
        }
        self.harts.push(hart);
    }

    /// Apply the F-requires-D policy and return the system set.
    pub fn finish(self) -> SystemCapabilities {
        let mut hwcap = self.hwcap;
        let mut diagnostics = Vec::new();
        if hwcap.contains(HwCap::ISA_F) && !hwcap.contains(HwCap::ISA_D) {
            log::info!("This kernel does not support systems with F but not D");
            hwcap.remove(HwCap::ISA_F);
            diagnostics.push(Diagnostic::FloatWithoutDouble);
        }
        log::info!("riscv: base ISA extensions {}", self.isa.base_letters());
        log::info!("riscv: ELF capabilities {}", hwcap.letters());
        SystemCapabilities {
            hwcap,
            isa: self.isa,
            harts: self.harts,
            diagnostics,
        }
    }
}
