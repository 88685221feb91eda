// Copyright © 2025 Lukas Bower
// SPDX-License-Identifier: Apache-2.0
// Purpose: End-to-end discovery over multi-hart platform descriptions.
// Author: Lukas Bower

use rvext::config::DiscoveryConfig;
use rvext::diag::Diagnostic;
use rvext::hwcap::HwCap;
use rvext::isa::ext::{Xlen, ISA_EXT_SSCOFPMF, ISA_EXT_ZBA, ISA_EXT_ZBB, ISA_EXT_ZFH};
use rvext::platform::{HartDescriptor, PlatformDescription};
use rvext::{discover, SystemSnapshot};

fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn rv64() -> DiscoveryConfig {
    DiscoveryConfig {
        xlen: Xlen::Rv64,
        ..DiscoveryConfig::default()
    }
}

fn run(isas: &[&str]) -> SystemSnapshot {
    init_logger();
    let harts: Vec<_> = isas
        .iter()
        .enumerate()
        .map(|(id, isa)| HartDescriptor::new(id as u32, *isa))
        .collect();
    discover(&rv64(), &harts).expect("discover")
}

fn record_names(snap: &SystemSnapshot, hart: u32) -> Vec<String> {
    snap.page(hart)
        .expect("hart page")
        .records()
        .filter_map(|r| r.name_str().map(str::to_owned))
        .collect()
}

#[test]
fn canonical_string_yields_exactly_imafdc() {
    let snap = run(&["rv64imafdc"]);
    assert_eq!(
        snap.hwcap(),
        HwCap::ISA_I | HwCap::ISA_M | HwCap::ISA_A | HwCap::ISA_F | HwCap::ISA_D | HwCap::ISA_C
    );
    assert_eq!(snap.isa().base_letters().as_str(), "acdfim");
    assert!(snap.diagnostics().is_empty());
}

#[test]
fn malformed_token_does_not_stop_registration() {
    let snap = run(&["rv64imac_zbA_zba1p0_zfh"]);
    assert_eq!(record_names(&snap, 0), ["zba", "zfh"]);
    assert!(snap.isa_extension_available(ISA_EXT_ZBA));
    assert!(snap.isa_extension_available(ISA_EXT_ZFH));
    assert!(!snap.isa_extension_available(ISA_EXT_ZBB));
    assert_eq!(snap.hwcap().letters().as_str(), "acim");
}

#[test]
fn harts_intersect_and_invalid_harts_are_excluded() {
    init_logger();
    let mut missing = HartDescriptor::new(2, "");
    missing.isa = None;
    let harts = vec![
        HartDescriptor::new(0, "rv64imac"),
        HartDescriptor::new(1, "rv64imafdc"),
        missing,
        HartDescriptor::new(3, "imafdc"),
    ];
    let snap = discover(&rv64(), &harts).expect("discover");
    assert_eq!(snap.qualifying_harts(), [0, 1]);
    assert_eq!(snap.hwcap().letters().as_str(), "acim");
    assert_eq!(snap.isa().base_letters().as_str(), "acim");
    assert!(!snap.has_fpu());
}

#[test]
fn hart_outside_page_table_joins_intersection() {
    init_logger();
    let config = DiscoveryConfig {
        xlen: Xlen::Rv64,
        ..DiscoveryConfig::default()
    };
    assert_eq!(config.max_harts, 20);
    let harts = vec![
        HartDescriptor::new(0, "rv64imafdc_zba"),
        HartDescriptor::new(25, "rv64imac"),
    ];
    let snap = discover(&config, &harts).expect("discover");
    assert_eq!(snap.qualifying_harts(), [0, 25]);
    assert!(!snap.hwcap().contains(HwCap::ISA_F));
    assert!(!snap.hwcap().contains(HwCap::ISA_D));
    assert_eq!(snap.hwcap().letters().as_str(), "acim");
    assert!(!snap.has_fpu());
    assert!(!snap.isa_extension_available(ISA_EXT_ZBA));
    assert_eq!(record_names(&snap, 0), ["zba"]);
    assert!(snap.page(25).is_none());
    assert_eq!(snap.query_hart(), Some(0));
    assert!(snap.diagnostics().contains(&Diagnostic::NoRegistry { hart: 25 }));
}

#[test]
fn float_without_double_is_reported_once() {
    let snap = run(&["rv64imafc", "rv64imafc", "rv64imafdc"]);
    assert!(!snap.hwcap().contains(HwCap::ISA_F));
    assert!(!snap.has_fpu());
    let count = snap
        .diagnostics()
        .iter()
        .filter(|d| **d == Diagnostic::FloatWithoutDouble)
        .count();
    assert_eq!(count, 1);
}

#[test]
fn legacy_su_marker_is_skipped() {
    let snap = run(&["rv64imafdcsu_zba"]);
    assert_eq!(snap.hwcap().letters().as_str(), "acdfim");
    let base = snap.isa_extension_base();
    assert_eq!(base & (1 << (b's' - b'a')), 0);
    assert_eq!(base & (1 << (b'u' - b'a')), 0);
    assert_eq!(record_names(&snap, 0), ["zba"]);
}

#[test]
fn unversioned_extension_keeps_unset_major() {
    let snap = run(&["rv64imac_sscofpmf"]);
    assert!(snap.isa_extension_available(ISA_EXT_SSCOFPMF));
    let version = snap.lookup("sscofpmf").expect("sscofpmf");
    assert_eq!(version.major(), None);
    assert_eq!(version.minor, 0);
}

#[test]
fn discovery_is_repeatable() {
    let isa = "rv64imafdc_zba1p0_zbb_zfh0p1";
    let first = run(&[isa, isa]);
    let second = run(&[isa, isa]);
    assert_eq!(first.hwcap(), second.hwcap());
    assert_eq!(first.isa(), second.isa());
    for hart in [0, 1] {
        let a = first.page(hart).expect("page");
        let b = second.page(hart).expect("page");
        assert!(a.same_records(b));
        assert_eq!(a.len(), 3);
    }
    assert!(first.registry_uniform());
}

#[test]
fn platform_json_drives_discovery() {
    init_logger();
    let description = PlatformDescription::from_json(
        r#"{
            "harts": [
                { "hart_id": 0, "isa": "rv64imafdc_zba", "mvendorid": 1161 },
                { "hart_id": 1, "status": "disabled", "isa": "rv64i" }
            ]
        }"#,
    )
    .expect("platform json");
    let snap = discover(&rv64(), &description).expect("discover");
    assert_eq!(snap.qualifying_harts(), [0]);
    assert_eq!(snap.page(0).expect("page").identity().vendor_id, 1161);
    let summary = serde_json::to_value(snap.summary()).expect("summary json");
    assert_eq!(summary["hwcap_letters"], "acdfim");
    assert_eq!(summary["harts"][0]["records"][0]["name"], "zba");
}
