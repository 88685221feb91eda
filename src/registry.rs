// Copyright © 2025 Lukas Bower
// SPDX-License-Identifier: Apache-2.0
// Purpose: Persist allow-listed multi-letter extensions into a hart's shared page.
// Author: Lukas Bower

//! Extension registry builder.

use rvext_layout::{PushError, RecordVersion, SharedHartPage, MAJOR_UNSET};

use crate::error::RegistryError;
use crate::isa::bitmap::IsaBitmap;
use crate::isa::ext::AllowList;
use crate::isa::parser::{ExtensionToken, TokenKind};
use crate::platform::HartId;

/// Counters reported when a hart's registration pass ends.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RegistrySummary {
    /// Records stored on the page.
    pub recorded: usize,
    /// Registrations refused because the page was full.
    pub rejected: usize,
}

/// Writes records for one hart during its parse pass.
pub struct ExtensionRegistryBuilder<'a> {
    hart: HartId,
    page: &'a mut SharedHartPage,
    allow: &'a AllowList,
    rejected: usize,
}

impl<'a> ExtensionRegistryBuilder<'a> {
    /// Start populating `page` for `hart`.
    pub fn new(hart: HartId, page: &'a mut SharedHartPage, allow: &'a AllowList) -> Self {
        Self {
            hart,
            page,
            allow,
            rejected: 0,
        }
    }

    /// Record `token` if it is a valid allow-listed multi-letter extension.
    ///
    /// On success the extension's bit is set in `isa` and returned. Tokens
    /// that are not eligible yield `Ok(None)` and leave everything untouched.
    pub fn register(
        &mut self,
        token: &ExtensionToken<'_>,
        isa: &mut IsaBitmap,
    ) -> Result<Option<usize>, RegistryError> {
        if !token.valid || token.kind != TokenKind::MultiLetter {
            return Ok(None);
        }
        let Some(bit) = self.allow.bit_for(token.name) else {
            return Ok(None);
        };
        let version = RecordVersion {
            major: token.version.major.map_or(MAJOR_UNSET, u64::from),
            minor: u64::from(token.version.minor),
        };
        match self.page.push(token.name.as_bytes(), version) {
            Ok(slot) => {
                isa.set(bit);
                log::debug!(
                    "hart {}: registered {} (slot {slot}, {:?})",
                    self.hart,
                    token.name,
                    token.version
                );
                Ok(Some(bit))
            }
            Err(PushError::Full { capacity }) => {
                if self.rejected == 0 {
                    log::warn!(
                        "hart {}: extension registry full ({capacity} records), dropping {} and later extensions",
                        self.hart,
                        token.name
                    );
                }
                self.rejected += 1;
                Err(RegistryError::Full {
                    hart: self.hart,
                    capacity,
                })
            }
            Err(PushError::Duplicate) => Err(RegistryError::Duplicate {
                hart: self.hart,
                name: token.name.to_owned(),
            }),
            Err(reason) => Err(RegistryError::Rejected {
                hart: self.hart,
                name: token.name.to_owned(),
                reason,
            }),
        }
    }

    /// Finish the pass.
    pub fn finish(self) -> RegistrySummary {
        RegistrySummary {
            recorded: self.page.len(),
            rejected: self.rejected,
        }
    }
}
