// Copyright © 2025 Lukas Bower
// SPDX-License-Identifier: Apache-2.0
// Purpose: Immutable system ISA snapshot, its one-time publication and kernel-facing queries.
// Author: Lukas Bower

//! Published ISA snapshot.
//!
//! Discovery produces a [`SystemSnapshot`]; [`publish`] installs it exactly
//! once. Nothing can modify the snapshot afterwards, so readers on any hart
//! need no synchronisation.

use once_cell::sync::OnceCell;
use serde::Serialize;

use rvext_layout::{find_extension, RecordVersion, SharedHartPage};

use crate::diag::Diagnostic;
use crate::error::BootError;
use crate::hwcap::{HwCap, AT_HWCAP};
use crate::isa::bitmap::IsaBitmap;
use crate::isa::ext::Xlen;
use crate::platform::HartId;

static SYSTEM: OnceCell<SystemSnapshot> = OnceCell::new();

/// Capabilities and registries of the whole system.
#[derive(Debug)]
pub struct SystemSnapshot {
    pub(crate) xlen: Xlen,
    pub(crate) hwcap: HwCap,
    pub(crate) isa: IsaBitmap,
    pub(crate) pages: Vec<Box<SharedHartPage>>,
    pub(crate) harts: Vec<HartId>,
    pub(crate) query_hart: Option<HartId>,
    pub(crate) diagnostics: Vec<Diagnostic>,
}

impl SystemSnapshot {
    /// Base width the snapshot was discovered for.
    #[must_use]
    pub fn xlen(&self) -> Xlen {
        self.xlen
    }

    /// Capability mask reported to processes.
    #[must_use]
    pub fn hwcap(&self) -> HwCap {
        self.hwcap
    }

    /// Extension bitmap common to every qualifying hart.
    #[must_use]
    pub fn isa(&self) -> &IsaBitmap {
        &self.isa
    }

    /// First word of the system bitmap.
    #[must_use]
    pub fn isa_extension_base(&self) -> u64 {
        self.isa.base_word()
    }

    /// Whether extension `bit` is available on every qualifying hart.
    #[must_use]
    pub fn isa_extension_available(&self, bit: usize) -> bool {
        self.isa.test(bit)
    }

    /// Whether floating-point state must be managed.
    #[must_use]
    pub fn has_fpu(&self) -> bool {
        self.hwcap.has_fpu()
    }

    /// Auxiliary vector entries contributed by this subsystem.
    #[must_use]
    pub fn auxv(&self) -> [(u64, u64); 1] {
        [(AT_HWCAP, self.hwcap.bits())]
    }

    /// Harts that reported a usable ISA string, in firmware order.
    #[must_use]
    pub fn qualifying_harts(&self) -> &[HartId] {
        &self.harts
    }

    /// Shared page of `hart`, if it lies inside the page table.
    #[must_use]
    pub fn page(&self, hart: HartId) -> Option<&SharedHartPage> {
        self.pages.get(hart as usize).map(|page| &**page)
    }

    /// Hart whose registry answers system-wide lookups.
    #[must_use]
    pub fn query_hart(&self) -> Option<HartId> {
        self.query_hart
    }

    /// Registry answering system-wide lookups.
    #[must_use]
    pub fn query_page(&self) -> Option<&SharedHartPage> {
        self.query_hart.and_then(|hart| self.page(hart))
    }

    /// Whether every qualifying hart registered the same extensions.
    #[must_use]
    pub fn registry_uniform(&self) -> bool {
        !self
            .diagnostics
            .iter()
            .any(|d| matches!(d, Diagnostic::RegistryMismatch { .. }))
    }

    /// Diagnostics raised during discovery.
    #[must_use]
    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    /// Kernel-internal lookup against the query registry.
    #[must_use]
    pub fn lookup(&self, name: &str) -> Option<RecordVersion> {
        self.query_page()
            .and_then(|page| find_extension(page, name.as_bytes()))
    }

    /// Serializable overview of the snapshot.
    #[must_use]
    pub fn summary(&self) -> SnapshotSummary {
        let harts = self
            .harts
            .iter()
            .filter_map(|&hart| self.page(hart).map(|page| (hart, page)))
            .map(|(hart, page)| {
                let identity = page.identity();
                HartSummary {
                    hart,
                    vendor_id: identity.vendor_id,
                    arch_id: identity.arch_id,
                    impl_id: identity.impl_id,
                    records: page
                        .records()
                        .map(|record| RecordSummary {
                            name: String::from_utf8_lossy(record.name()).into_owned(),
                            major: record.version().major(),
                            minor: record.version().minor,
                        })
                        .collect(),
                }
            })
            .collect();
        SnapshotSummary {
            xlen: self.xlen,
            hwcap: self.hwcap.bits(),
            hwcap_letters: self.hwcap.letters().as_str().to_owned(),
            base_letters: self.isa.base_letters().as_str().to_owned(),
            isa_bits: self.isa.iter().collect(),
            fpu: self.has_fpu(),
            query_hart: self.query_hart,
            registry_uniform: self.registry_uniform(),
            harts,
            diagnostics: self.diagnostics.clone(),
        }
    }
}

/// Printable view of a [`SystemSnapshot`].
#[derive(Debug, Clone, Serialize)]
pub struct SnapshotSummary {
    /// Base width.
    pub xlen: Xlen,
    /// Raw capability mask.
    pub hwcap: u64,
    /// Capability letters.
    pub hwcap_letters: String,
    /// Single-letter extensions in the bitmap.
    pub base_letters: String,
    /// Every set bitmap position.
    pub isa_bits: Vec<usize>,
    /// FPU gate.
    pub fpu: bool,
    /// Hart answering lookups.
    pub query_hart: Option<HartId>,
    /// Whether all registries agree.
    pub registry_uniform: bool,
    /// Per-hart registries.
    pub harts: Vec<HartSummary>,
    /// Discovery diagnostics.
    pub diagnostics: Vec<Diagnostic>,
}

/// Printable view of one hart page.
#[derive(Debug, Clone, Serialize)]
pub struct HartSummary {
    /// Hart index.
    pub hart: HartId,
    /// `mvendorid`.
    pub vendor_id: u64,
    /// `marchid`.
    pub arch_id: u64,
    /// `mimpid`.
    pub impl_id: u64,
    /// Records in list order.
    pub records: Vec<RecordSummary>,
}

/// Printable view of one record.
#[derive(Debug, Clone, Serialize)]
pub struct RecordSummary {
    /// Extension name.
    pub name: String,
    /// Major version if present.
    pub major: Option<u64>,
    /// Minor version.
    pub minor: u64,
}

/// Install `snapshot` as the system snapshot. Only the first call succeeds.
pub fn publish(snapshot: SystemSnapshot) -> Result<&'static SystemSnapshot, BootError> {
    SYSTEM
        .try_insert(snapshot)
        .map_err(|_| BootError::AlreadyPublished)
}

/// The published snapshot, once boot has installed one.
#[must_use]
pub fn system() -> Option<&'static SystemSnapshot> {
    SYSTEM.get()
}

/// Base extension word of `isa`, or of the published snapshot when `None`.
#[must_use]
pub fn isa_extension_base(isa: Option<&IsaBitmap>) -> u64 {
    isa.or_else(|| system().map(SystemSnapshot::isa))
        .map_or(0, IsaBitmap::base_word)
}

/// Whether `bit` is set in `isa`, or in the published snapshot when `None`.
#[must_use]
pub fn isa_extension_available(isa: Option<&IsaBitmap>, bit: usize) -> bool {
    isa.or_else(|| system().map(SystemSnapshot::isa))
        .is_some_and(|map| map.test(bit))
}
