// Copyright © 2025 Lukas Bower
// SPDX-License-Identifier: Apache-2.0
// Purpose: Host probe running ISA discovery over a platform description and answering lookups.
// Author: Lukas Bower

use std::ffi::CString;
use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context};
use clap::{Parser, Subcommand};

use rvext::config::DiscoveryConfig;
use rvext::isa::IsaParser;
use rvext::platform::PlatformDescription;
use rvext::snapshot::SystemSnapshot;
use rvext::syscall::{dispatch, SYS_RISCV_CHECK_EXTENSION};
use rvext::uaccess::UserArena;
use rvext_layout::vdso::{check_extension, LookupStatus};

#[derive(Parser)]
#[command(about = "RISC-V ISA discovery probe")]
struct Cli {
    /// Discovery configuration (TOML)
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    #[command(subcommand)]
    cmd: Cmd,
}

#[derive(Subcommand)]
enum Cmd {
    /// Run discovery over a JSON platform description and print the snapshot
    Scan { platform: PathBuf },
    /// Tokenize one ISA string
    Tokens { isa: String },
    /// Look up an extension by name
    Query {
        platform: PathBuf,
        name: String,
        /// Go through the system call instead of reading the page directly
        #[arg(long)]
        trapped: bool,
        /// Read this hart's page (trap-free path only)
        #[arg(long, conflicts_with = "trapped")]
        hart: Option<u32>,
    },
}

fn load_config(path: Option<&Path>) -> anyhow::Result<DiscoveryConfig> {
    match path {
        Some(path) => DiscoveryConfig::load(path)
            .with_context(|| format!("loading {}", path.display())),
        None => Ok(DiscoveryConfig::default()),
    }
}

fn discover(config: &DiscoveryConfig, platform: &Path) -> anyhow::Result<SystemSnapshot> {
    let description = PlatformDescription::load(platform)?;
    Ok(rvext::boot::discover(config, &description)?)
}

fn query_trapped(snapshot: &SystemSnapshot, name: &str) -> anyhow::Result<()> {
    let mut mem = UserArena::new(0x10_000, 4096);
    let name_addr = mem.alloc_cstr(name)?;
    let major = mem.alloc_u64(0)?;
    let minor = mem.alloc_u64(0)?;
    let ret = dispatch(
        snapshot,
        &mut mem,
        SYS_RISCV_CHECK_EXTENSION,
        &[name_addr.0, major.0, minor.0],
    );
    match ret {
        0 => println!("{name}: {}.{}", mem.read_u64(major)?, mem.read_u64(minor)?),
        -1 => println!("{name}: not present"),
        errno => return Err(anyhow!("riscv_check_extension failed: {errno}")),
    }
    Ok(())
}

fn query_direct(snapshot: &SystemSnapshot, name: &str, hart: Option<u32>) -> anyhow::Result<()> {
    let page = match hart {
        Some(hart) => snapshot.page(hart),
        None => snapshot.query_page(),
    }
    .ok_or_else(|| anyhow!("no registry for the requested hart"))?;
    let query = CString::new(name).context("extension name contains NUL")?;
    let (mut major, mut minor) = (0, 0);
    match check_extension(page, &query, &mut major, &mut minor) {
        LookupStatus::Found => println!("{name}: {major}.{minor}"),
        LookupStatus::NotFound => println!("{name}: not present"),
    }
    Ok(())
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let cli = Cli::parse();
    let config = load_config(cli.config.as_deref())?;
    match cli.cmd {
        Cmd::Scan { platform } => {
            let snapshot = discover(&config, &platform)?;
            println!("{}", serde_json::to_string_pretty(&snapshot.summary())?);
        }
        Cmd::Tokens { isa } => {
            let tokens = IsaParser::new(config.xlen).parse(&isa)?;
            println!("{}", serde_json::to_string_pretty(&tokens)?);
        }
        Cmd::Query {
            platform,
            name,
            trapped,
            hart,
        } => {
            let snapshot = discover(&config, &platform)?;
            if trapped {
                query_trapped(&snapshot, &name)?;
            } else {
                query_direct(&snapshot, &name, hart)?;
            }
        }
    }
    Ok(())
}
