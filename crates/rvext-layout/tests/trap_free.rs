// Copyright © 2025 Lukas Bower
// SPDX-License-Identifier: Apache-2.0
// Purpose: Exercise the trap-free lookup against populated and empty pages.
// Author: Lukas Bower
#![forbid(unsafe_code)]

use std::ffi::CStr;

use rvext_layout::vdso::{check_extension, LookupStatus};
use rvext_layout::{RecordVersion, SharedHartPage, MAJOR_UNSET};

fn cstr(bytes: &[u8]) -> &CStr {
    CStr::from_bytes_with_nul(bytes).expect("nul-terminated literal")
}

fn populated() -> Box<SharedHartPage> {
    let mut page = Box::new(SharedHartPage::new());
    page.push(b"sscofpmf", RecordVersion { major: MAJOR_UNSET, minor: 0 })
        .expect("push sscofpmf");
    page.push(b"zba", RecordVersion { major: 1, minor: 0 })
        .expect("push zba");
    page.push(b"zfh", RecordVersion { major: 0, minor: 1 })
        .expect("push zfh");
    page
}

#[test]
fn found_writes_both_outputs() {
    let page = populated();
    let (mut major, mut minor) = (99, 99);
    let status = check_extension(&page, cstr(b"zfh\0"), &mut major, &mut minor);
    assert_eq!(status, LookupStatus::Found);
    assert_eq!(status.code(), 0);
    assert_eq!((major, minor), (0, 1));
}

#[test]
fn missing_name_leaves_outputs_untouched() {
    let page = populated();
    let (mut major, mut minor) = (7, 8);
    let status = check_extension(&page, cstr(b"zbx\0"), &mut major, &mut minor);
    assert_eq!(status, LookupStatus::NotFound);
    assert_eq!(status.code(), -1);
    assert_eq!((major, minor), (7, 8));
}

#[test]
fn unset_major_is_reported_as_sentinel() {
    let page = populated();
    let (mut major, mut minor) = (0, 0);
    let status = check_extension(&page, cstr(b"sscofpmf\0"), &mut major, &mut minor);
    assert_eq!(status, LookupStatus::Found);
    assert_eq!(major, MAJOR_UNSET);
    assert_eq!(minor, 0);
}

#[test]
fn empty_page_reports_not_found() {
    let page = Box::new(SharedHartPage::new());
    let (mut major, mut minor) = (1, 1);
    for query in [&b"zba\0"[..], b"\0", b"s\0"] {
        let status = check_extension(&page, cstr(query), &mut major, &mut minor);
        assert_eq!(status, LookupStatus::NotFound);
    }
    assert_eq!((major, minor), (1, 1));
}
