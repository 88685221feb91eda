// Copyright © 2025 Lukas Bower
// SPDX-License-Identifier: Apache-2.0
// Purpose: Resolve an extension name against a hart page without mutating it.
// Author: Lukas Bower

//! Registry scan shared by the trapped and trap-free lookup paths.

use crate::page::SharedHartPage;
use crate::record::RecordVersion;

/// Find `name` in the page's record list.
///
/// Names compare byte for byte; the first matching record wins. An empty
/// page yields `None` without touching the record buffer.
#[must_use]
pub fn find_extension(page: &SharedHartPage, name: &[u8]) -> Option<RecordVersion> {
    page.records()
        .find(|record| record.name() == name)
        .map(|record| record.version())
}
