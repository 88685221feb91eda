// Copyright © 2025 Lukas Bower
// SPDX-License-Identifier: Apache-2.0
// Purpose: Boot-time ISA discovery pass over every firmware-described hart.
// Author: Lukas Bower

//! Boot-time discovery.
//!
//! One sequential pass: every usable hart's ISA string is tokenized, its
//! single-letter extensions feed the capability fold and its allow-listed
//! multi-letter extensions are recorded in the hart's own page. The pass
//! runs before any lookup can happen, so it takes no locks.

use std::collections::BTreeSet;

use rvext_layout::SharedHartPage;

use crate::aggregate::{HartCapabilities, IsaBitmapAggregator};
use crate::config::DiscoveryConfig;
use crate::diag::Diagnostic;
use crate::error::{BootError, RegistryError};
use crate::isa::ext::AllowList;
use crate::isa::parser::{IsaParser, IsaTokens};
use crate::platform::{FirmwareSource, HartId, HartStatus};
use crate::registry::ExtensionRegistryBuilder;
use crate::snapshot::SystemSnapshot;

/// Run discovery over `firmware` and build the system snapshot.
pub fn discover<F>(config: &DiscoveryConfig, firmware: &F) -> Result<SystemSnapshot, BootError>
where
    F: FirmwareSource + ?Sized,
{
    config.validate()?;
    let allow = config.allow_list()?;
    let parser = IsaParser::new(config.xlen);
    let mut pages: Vec<Box<SharedHartPage>> = (0..config.max_harts)
        .map(|_| Box::new(SharedHartPage::new()))
        .collect();
    let mut seen = BTreeSet::new();
    let mut aggregator = IsaBitmapAggregator::new();
    let mut diagnostics = Vec::new();

    for desc in firmware.harts() {
        let hart = desc.hart_id;
        if desc.status != HartStatus::Okay {
            log::debug!("hart {hart}: not okay, skipped");
            continue;
        }
        if seen.contains(&hart) {
            log::warn!("hart {hart}: described twice, ignoring the repeat");
            continue;
        }
        let Some(isa) = desc.isa.as_deref() else {
            log::warn!("hart {hart}: Unable to find \"riscv,isa\" devicetree entry");
            continue;
        };
        let tokens = match parser.tokenize(isa) {
            Ok(tokens) => tokens,
            Err(err) => {
                log::warn!("hart {hart}: {err}, ignored");
                continue;
            }
        };
        seen.insert(hart);
        let page = match pages.get_mut(hart as usize) {
            Some(page) => {
                page.set_identity(desc.identity());
                Some(&mut **page)
            }
            None => {
                log::warn!(
                    "hart {hart}: beyond the {} hart pages, no extension registry",
                    config.max_harts
                );
                diagnostics.push(Diagnostic::NoRegistry { hart });
                None
            }
        };
        let caps = scan_hart(hart, tokens, page, &allow, &mut diagnostics);
        aggregator.fold(hart, &caps);
    }

    let system = aggregator.finish();
    diagnostics.extend(system.diagnostics);
    let with_page = |hart: &HartId| (*hart as usize) < pages.len();
    let query_hart = system.harts.iter().copied().filter(with_page).min();
    if let Some(reference) = query_hart {
        let reference_page = &pages[reference as usize];
        for &hart in system
            .harts
            .iter()
            .filter(|&h| with_page(h) && *h != reference)
        {
            if !pages[hart as usize].same_records(reference_page) {
                log::warn!(
                    "hart {hart}: extension records differ from hart {reference}; \
                     lookups answer for hart {reference}"
                );
                diagnostics.push(Diagnostic::RegistryMismatch { hart, reference });
            }
        }
    }

    Ok(SystemSnapshot {
        xlen: config.xlen,
        hwcap: system.hwcap,
        isa: system.isa,
        pages,
        harts: system.harts,
        query_hart,
        diagnostics,
    })
}

/// Fold one hart's tokens into its capabilities. Multi-letter extensions are
/// recorded, and their bits set, only when the hart has a page.
fn scan_hart(
    hart: HartId,
    tokens: IsaTokens<'_>,
    page: Option<&mut SharedHartPage>,
    allow: &AllowList,
    diagnostics: &mut Vec<Diagnostic>,
) -> HartCapabilities {
    let mut caps = HartCapabilities::default();
    let mut builder = page.map(|page| ExtensionRegistryBuilder::new(hart, page, allow));
    for token in tokens {
        if !token.valid {
            log::debug!("hart {hart}: dropping malformed token {:?}", token.name);
            continue;
        }
        if let Some(letter) = token.letter() {
            caps.add_letter(letter);
            continue;
        }
        let Some(registry) = builder.as_mut() else {
            continue;
        };
        match registry.register(&token, &mut caps.isa) {
            Ok(_) | Err(RegistryError::Full { .. }) => {}
            Err(err) => log::debug!("{err}"),
        }
    }
    if let Some(summary) = builder.map(ExtensionRegistryBuilder::finish) {
        if summary.rejected > 0 {
            diagnostics.push(Diagnostic::RegistryFull {
                hart,
                rejected: summary.rejected,
            });
        }
    }
    caps
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hwcap::HwCap;
    use crate::isa::ext::{Xlen, ISA_EXT_ZBA, ISA_EXT_ZBB};
    use crate::platform::HartDescriptor;
    use rvext_layout::RecordVersion;

    fn rv64() -> DiscoveryConfig {
        DiscoveryConfig {
            xlen: Xlen::Rv64,
            ..DiscoveryConfig::default()
        }
    }

    #[test]
    fn canonical_string_sets_six_capabilities() {
        let harts = vec![HartDescriptor::new(0, "rv64imafdc")];
        let snap = discover(&rv64(), &harts).expect("discover");
        assert_eq!(
            snap.hwcap(),
            HwCap::ISA_I | HwCap::ISA_M | HwCap::ISA_A | HwCap::ISA_F | HwCap::ISA_D | HwCap::ISA_C
        );
        assert!(snap.has_fpu());
        assert_eq!(snap.auxv(), [(16, snap.hwcap().bits())]);
    }

    #[test]
    fn identity_lands_in_page() {
        let mut desc = HartDescriptor::new(2, "rv64imac");
        desc.mvendorid = 0x489;
        desc.marchid = 7;
        desc.mimpid = 1;
        let snap = discover(&rv64(), &vec![desc]).expect("discover");
        let identity = snap.page(2).expect("page 2").identity();
        assert_eq!((identity.vendor_id, identity.arch_id, identity.impl_id), (0x489, 7, 1));
        assert_eq!(snap.query_hart(), Some(2));
    }

    #[test]
    fn skipped_harts_do_not_contribute() {
        let mut disabled = HartDescriptor::new(1, "rv64i");
        disabled.status = HartStatus::Disabled;
        let mut missing = HartDescriptor::new(2, "");
        missing.isa = None;
        let harts = vec![
            HartDescriptor::new(0, "rv64imac_zba"),
            disabled,
            missing,
            HartDescriptor::new(3, "rv32i"),
            HartDescriptor::new(0, "rv64i"),
        ];
        let snap = discover(&rv64(), &harts).expect("discover");
        assert_eq!(snap.qualifying_harts(), [0]);
        assert_eq!(snap.hwcap().letters().as_str(), "acim");
        assert!(snap.isa_extension_available(ISA_EXT_ZBA));
    }

    #[test]
    fn repeat_after_unusable_description_is_accepted() {
        let mut missing = HartDescriptor::new(1, "");
        missing.isa = None;
        let harts = vec![
            HartDescriptor::new(0, "rv64imafdc"),
            HartDescriptor::new(1, "rv32imafdc"),
            missing,
            HartDescriptor::new(1, "rv64imac"),
        ];
        let snap = discover(&rv64(), &harts).expect("discover");
        assert_eq!(snap.qualifying_harts(), [0, 1]);
        assert_eq!(snap.hwcap().letters().as_str(), "acim");
    }

    #[test]
    fn hart_beyond_page_table_still_intersects() {
        let harts = vec![
            HartDescriptor::new(0, "rv64imafdc_zba"),
            HartDescriptor::new(25, "rv64imac_zba"),
        ];
        let snap = discover(&rv64(), &harts).expect("discover");
        assert_eq!(snap.qualifying_harts(), [0, 25]);
        assert_eq!(snap.hwcap().letters().as_str(), "acim");
        assert!(!snap.isa_extension_available(ISA_EXT_ZBA));
        assert!(snap.page(25).is_none());
        assert_eq!(snap.query_hart(), Some(0));
        assert!(snap.registry_uniform());
        assert_eq!(snap.diagnostics(), [Diagnostic::NoRegistry { hart: 25 }]);
    }

    #[test]
    fn full_page_reports_rejections() {
        let allow = AllowList::builtin();
        let mut page = Box::new(SharedHartPage::new());
        let version = RecordVersion { major: 1, minor: 0 };
        for i in 0..SharedHartPage::capacity() {
            let name = format!("x{i}");
            page.push(name.as_bytes(), version).expect("free slot");
        }
        let tokens = IsaParser::new(Xlen::Rv64)
            .tokenize("rv64imac_zba_zfh")
            .expect("rv64 string");
        let mut diagnostics = Vec::new();
        let caps = scan_hart(3, tokens, Some(&mut *page), &allow, &mut diagnostics);
        assert_eq!(caps.hwcap.letters().as_str(), "acim");
        assert!(!caps.isa.test(ISA_EXT_ZBA));
        assert_eq!(diagnostics, [Diagnostic::RegistryFull { hart: 3, rejected: 2 }]);
    }

    #[test]
    fn differing_registries_are_flagged() {
        let harts = vec![
            HartDescriptor::new(0, "rv64imac_zba_zbb"),
            HartDescriptor::new(1, "rv64imac_zba"),
        ];
        let snap = discover(&rv64(), &harts).expect("discover");
        assert!(!snap.registry_uniform());
        assert_eq!(
            snap.diagnostics(),
            [Diagnostic::RegistryMismatch { hart: 1, reference: 0 }]
        );
        assert!(snap.isa_extension_available(ISA_EXT_ZBA));
        assert!(!snap.isa_extension_available(ISA_EXT_ZBB));
        assert!(snap.lookup("zbb").is_some(), "query hart 0 still has zbb");
    }

    #[test]
    fn configured_extensions_are_registered() {
        let config = DiscoveryConfig::from_toml_str(
            "xlen = \"rv64\"\n[[extensions]]\nname = \"zicbom\"\nbit = 30\n",
        )
        .expect("config");
        let harts = vec![HartDescriptor::new(0, "rv64imac_zicbom1p0")];
        let snap = discover(&config, &harts).expect("discover");
        assert!(snap.isa_extension_available(30));
        let version = snap.lookup("zicbom").expect("zicbom");
        assert_eq!((version.major, version.minor), (1, 0));
    }

    #[test]
    fn bad_config_aborts_discovery() {
        let config = DiscoveryConfig {
            max_harts: 0,
            ..rv64()
        };
        assert!(matches!(
            discover(&config, &Vec::<HartDescriptor>::new()),
            Err(BootError::Config(_))
        ));
    }
}
