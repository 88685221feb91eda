// Copyright © 2025 Lukas Bower
// SPDX-License-Identifier: Apache-2.0
// Purpose: Group the ISA string grammar, version parsing, extension table and bitmap.
// Author: Lukas Bower

//! RISC-V ISA string handling.

pub mod bitmap;
pub mod decimal;
pub mod ext;
pub mod parser;

pub use bitmap::{letter_bit, IsaBitmap, ISA_EXT_BASE, ISA_EXT_MAX};
pub use decimal::IsaVersion;
pub use ext::{AllowList, AllowedExtension, Xlen};
pub use parser::{ExtensionToken, IsaParser, IsaTokens, TokenKind};
