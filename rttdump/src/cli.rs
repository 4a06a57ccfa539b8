use anyhow::{Context, Result, anyhow, bail};
use clap::Parser;
use rttdump_lib::snapshot::{DEFAULT_RTT_SYMBOL, resolve_symbol};
use rttdump_lib::utils::Utils;
use rttdump_lib::{ByteOrder, SnapshotFormat};
use std::path::PathBuf;

use crate::config::RttDumpConfig;

#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "Converts raw memory dumps into per-channel SEGGER RTT binaries",
    long_about = None
)]
pub struct Cli {
    /// JSON configuration file path
    #[arg(long = "config", short = 'f')]
    pub config: Option<String>,

    /// Memory dump of the target (raw binary or Intel HEX)
    pub snapshot: Option<PathBuf>,

    /// Target address of the first byte of the dump, decimal or 0x-prefixed hex
    #[arg(short = 'a', long = "base-addr")]
    pub base_addr: Option<String>,

    /// Memory byte order (default: little)
    #[arg(short = 'e', long = "endianness", value_enum)]
    pub endianness: Option<ByteOrder>,

    /// Dump file format (default: auto, by file extension)
    #[arg(long = "format", value_enum)]
    pub format: Option<SnapshotFormat>,

    /// ELF image to resolve the base address from
    #[arg(long = "elf")]
    pub elf: Option<PathBuf>,

    /// Symbol looked up in the ELF image (default: _SEGGER_RTT)
    #[arg(long = "symbol")]
    pub symbol: Option<String>,

    /// Directory the channel files are written to (default: current directory)
    #[arg(short = 'o', long = "output-dir")]
    pub output_dir: Option<PathBuf>,

    /// Channel file name prefix (default: buffer_)
    #[arg(long = "prefix")]
    pub prefix: Option<String>,

    /// Scan the dump for the control block instead of expecting it at offset 0
    #[arg(long = "search")]
    pub search: bool,
}

/// Fully resolved run settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MergedConfig {
    pub snapshot: PathBuf,
    pub base: BaseSource,
    pub byte_order: ByteOrder,
    pub format: SnapshotFormat,
    pub output_dir: PathBuf,
    pub prefix: String,
    pub search: bool,
}

/// Where the snapshot load address comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BaseSource {
    Address(u32),
    Symbol { elf: PathBuf, name: String },
    /// Use the address recorded in the dump itself.
    Snapshot,
}

impl BaseSource {
    /// Resolve to an address, falling back to `recorded` from the dump.
    pub fn resolve(&self, recorded: Option<u32>) -> Result<u32> {
        match self {
            BaseSource::Address(address) => Ok(*address),
            BaseSource::Symbol { elf, name } => resolve_symbol(elf, name)
                .with_context(|| format!("Failed to resolve '{}' in {}", name, elf.display())),
            BaseSource::Snapshot => recorded.ok_or_else(|| {
                anyhow!(
                    "No base address: pass --base-addr or --elf, or use a dump format that records addresses"
                )
            }),
        }
    }
}

/// Merge CLI arguments with configuration file, CLI args take precedence
pub fn merge_config(args: &Cli, config: Option<RttDumpConfig>) -> Result<MergedConfig> {
    let base_config = config.unwrap_or_else(RttDumpConfig::with_defaults);

    let snapshot = match (&args.snapshot, &base_config.snapshot) {
        (Some(path), _) => path.clone(),
        (None, Some(path)) => PathBuf::from(path),
        (None, None) => {
            bail!("Snapshot must be specified either on the command line or in config file")
        }
    };

    let base = if let Some(addr) = &args.base_addr {
        BaseSource::Address(
            Utils::str_to_u32(addr).with_context(|| format!("Invalid base address '{}'", addr))?,
        )
    } else if let Some(elf) = &args.elf {
        BaseSource::Symbol {
            elf: elf.clone(),
            name: symbol_name(args, &base_config),
        }
    } else if let Some(addr) = &base_config.base_addr {
        BaseSource::Address(
            addr.to_u32()
                .map_err(|e| anyhow!("Invalid base address in config: {}", e))?,
        )
    } else if let Some(elf) = &base_config.elf {
        BaseSource::Symbol {
            elf: PathBuf::from(elf),
            name: symbol_name(args, &base_config),
        }
    } else {
        BaseSource::Snapshot
    };

    let byte_order = match args.endianness {
        Some(order) => order,
        None => base_config
            .parse_endianness()
            .map_err(|e| anyhow!("Invalid endianness in config: {}", e))?,
    };

    let format = match args.format {
        Some(format) => format,
        None => base_config
            .parse_format()
            .map_err(|e| anyhow!("Invalid format in config: {}", e))?,
    };

    let output_dir = args
        .output_dir
        .clone()
        .unwrap_or_else(|| PathBuf::from(&base_config.output_dir));
    let prefix = args
        .prefix
        .clone()
        .unwrap_or_else(|| base_config.prefix.clone());
    let search = args.search || base_config.search;

    if prefix.contains(['/', '\\']) {
        bail!("Prefix '{}' must not contain path separators", prefix);
    }

    Ok(MergedConfig {
        snapshot,
        base,
        byte_order,
        format,
        output_dir,
        prefix,
        search,
    })
}

fn symbol_name(args: &Cli, config: &RttDumpConfig) -> String {
    args.symbol
        .clone()
        .or_else(|| config.symbol.clone())
        .unwrap_or_else(|| DEFAULT_RTT_SYMBOL.to_string())
}
