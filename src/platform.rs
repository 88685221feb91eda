// Copyright © 2025 Lukas Bower
// SPDX-License-Identifier: Apache-2.0
// Purpose: Describe the per-hart firmware inputs consumed by ISA discovery.
// Author: Lukas Bower

//! Firmware-provided hart descriptions.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use rvext_layout::HartIdentity;

use crate::error::ConfigError;

/// Index of a hart.
pub type HartId = u32;

/// Devicetree `status` of a CPU node.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HartStatus {
    /// Usable hart.
    #[default]
    Okay,
    /// Present but not to be used.
    Disabled,
}

/// Everything firmware reports about one hart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HartDescriptor {
    /// Hart index.
    pub hart_id: HartId,
    /// Node status.
    #[serde(default)]
    pub status: HartStatus,
    /// `riscv,isa` property, absent on broken descriptions.
    #[serde(default)]
    pub isa: Option<String>,
    /// `mvendorid`.
    #[serde(default)]
    pub mvendorid: u64,
    /// `marchid`.
    #[serde(default)]
    pub marchid: u64,
    /// `mimpid`.
    #[serde(default)]
    pub mimpid: u64,
}

impl HartDescriptor {
    /// Okay hart with the given ISA string and zero identification.
    #[must_use]
    pub fn new(hart_id: HartId, isa: impl Into<String>) -> Self {
        Self {
            hart_id,
            status: HartStatus::Okay,
            isa: Some(isa.into()),
            mvendorid: 0,
            marchid: 0,
            mimpid: 0,
        }
    }

    /// Identification triplet as stored in the hart page.
    #[must_use]
    pub fn identity(&self) -> HartIdentity {
        HartIdentity {
            vendor_id: self.mvendorid,
            arch_id: self.marchid,
            impl_id: self.mimpid,
        }
    }
}

/// Source of hart descriptions at boot.
pub trait FirmwareSource {
    /// Hart descriptions in firmware order.
    fn harts(&self) -> &[HartDescriptor];
}

/// Platform description loaded from a JSON dump.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlatformDescription {
    /// CPU nodes.
    pub harts: Vec<HartDescriptor>,
}

impl PlatformDescription {
    /// Parse a JSON platform description.
    pub fn from_json(text: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(text)?)
    }

    /// Read and parse a JSON platform description.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_json(&text)
    }
}

impl FirmwareSource for PlatformDescription {
    fn harts(&self) -> &[HartDescriptor] {
        &self.harts
    }
}

impl FirmwareSource for [HartDescriptor] {
    fn harts(&self) -> &[HartDescriptor] {
        self
    }
}

impl FirmwareSource for Vec<HartDescriptor> {
    fn harts(&self) -> &[HartDescriptor] {
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn json_defaults_fill_missing_fields() {
        let desc = PlatformDescription::from_json(
            r#"{ "harts": [
                { "hart_id": 0, "isa": "rv64imac", "mvendorid": 1161 },
                { "hart_id": 1, "status": "disabled" }
            ] }"#,
        )
        .expect("valid json");
        assert_eq!(desc.harts.len(), 2);
        assert_eq!(desc.harts[0].status, HartStatus::Okay);
        assert_eq!(desc.harts[0].identity().vendor_id, 1161);
        assert_eq!(desc.harts[1].status, HartStatus::Disabled);
        assert_eq!(desc.harts[1].isa, None);
    }

    #[test]
    fn malformed_json_is_reported() {
        assert!(matches!(
            PlatformDescription::from_json("{ \"harts\": 3 }"),
            Err(ConfigError::Json(_))
        ));
    }
}
