// Copyright © 2025 Lukas Bower
// SPDX-License-Identifier: Apache-2.0
// Purpose: Load discovery settings: base width, hart table size and extra allow-list entries.
// Author: Lukas Bower

//! Discovery configuration.
//!
//! ```toml
//! xlen = "rv64"
//! max_harts = 8
//!
//! [[extensions]]
//! name = "zicbom"
//! bit = 30
//! ```

use std::fs;
use std::path::Path;

use serde::Deserialize;

use crate::error::ConfigError;
use crate::isa::ext::{AllowList, AllowedExtension, Xlen};

/// Hart page table size used when none is configured.
pub const DEFAULT_MAX_HARTS: usize = 20;

/// Settings applied to one discovery pass.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DiscoveryConfig {
    /// Width marker ISA strings must carry.
    pub xlen: Xlen,
    /// Number of hart pages; harts with larger ids are ignored.
    pub max_harts: usize,
    /// Allow-list entries added to the built-in table.
    pub extensions: Vec<AllowedExtension>,
}

impl Default for DiscoveryConfig {
    fn default() -> Self {
        Self {
            xlen: Xlen::native(),
            max_harts: DEFAULT_MAX_HARTS,
            extensions: Vec::new(),
        }
    }
}

impl DiscoveryConfig {
    /// Parse TOML text.
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Read and parse a TOML file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_toml_str(&text)
    }

    /// Check the settings without building anything.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_harts == 0 {
            return Err(ConfigError::NoHarts);
        }
        self.allow_list().map(|_| ())
    }

    /// Built-in allow-list extended with the configured entries.
    pub fn allow_list(&self) -> Result<AllowList, ConfigError> {
        let mut list = AllowList::builtin();
        for entry in &self.extensions {
            list.insert(&entry.name, entry.bit)?;
        }
        Ok(list)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_file_uses_defaults() {
        let config = DiscoveryConfig::from_toml_str("").expect("empty config");
        assert_eq!(config, DiscoveryConfig::default());
        assert_eq!(config.max_harts, DEFAULT_MAX_HARTS);
    }

    #[test]
    fn extensions_extend_allow_list() {
        let config = DiscoveryConfig::from_toml_str(
            r#"
            xlen = "rv32"
            max_harts = 4

            [[extensions]]
            name = "zicbom"
            bit = 30
            "#,
        )
        .expect("valid config");
        assert_eq!(config.xlen, Xlen::Rv32);
        assert_eq!(config.max_harts, 4);
        let list = config.allow_list().expect("allow list");
        assert_eq!(list.bit_for("zicbom"), Some(30));
        assert_eq!(list.bit_for("zba"), Some(crate::isa::ext::ISA_EXT_ZBA));
    }

    #[test]
    fn invalid_settings_are_rejected() {
        assert!(matches!(
            DiscoveryConfig::from_toml_str("max_harts = 0"),
            Err(ConfigError::NoHarts)
        ));
        assert!(matches!(
            DiscoveryConfig::from_toml_str("[[extensions]]\nname = \"zbb\"\nbit = 40\n"),
            Err(ConfigError::DuplicateExtension(_))
        ));
        assert!(matches!(
            DiscoveryConfig::from_toml_str("colour = \"blue\""),
            Err(ConfigError::Toml(_))
        ));
        assert!(matches!(
            DiscoveryConfig::from_toml_str("xlen = \"rv128\""),
            Err(ConfigError::Toml(_))
        ));
    }
}
