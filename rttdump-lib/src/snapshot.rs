//! Memory dump loading.
//!
//! Raw dumps carry no address information, so the caller supplies the load
//! address. Intel HEX dumps carry their own addresses and are flattened into
//! one contiguous image starting at the lowest record address.

use crate::{Error, Result};
use goblin::elf::Elf;
use ihex::Record;
use std::path::Path;
use strum::{Display, EnumString};

/// Symbol the RTT library places its control block at.
pub const DEFAULT_RTT_SYMBOL: &str = "_SEGGER_RTT";

/// Filler for address ranges an Intel HEX dump does not cover.
const GAP_FILL: u8 = 0x00;

/// Largest address span an Intel HEX dump may cover once flattened.
pub const MAX_IHEX_SPAN: u64 = 64 * 1024 * 1024;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, EnumString, Display)]
#[cfg_attr(feature = "cli", derive(clap::ValueEnum))]
#[strum(serialize_all = "lowercase")]
pub enum SnapshotFormat {
    /// Pick from the file extension
    #[default]
    Auto,
    Raw,
    Ihex,
}

impl SnapshotFormat {
    pub fn detect(path: &Path) -> Self {
        match path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| ext.to_ascii_lowercase())
            .as_deref()
        {
            Some("hex") | Some("ihex") => SnapshotFormat::Ihex,
            _ => SnapshotFormat::Raw,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Snapshot {
    pub data: Vec<u8>,
    /// Load address, when the dump format records it.
    pub base_address: Option<u32>,
}

impl Snapshot {
    pub fn load(path: &Path, format: SnapshotFormat) -> Result<Self> {
        let format = match format {
            SnapshotFormat::Auto => SnapshotFormat::detect(path),
            other => other,
        };
        tracing::info!("Reading {} snapshot {}", format, path.display());
        match format {
            SnapshotFormat::Ihex => Self::from_ihex_file(path),
            _ => Self::from_raw_file(path),
        }
    }

    pub fn from_raw_file(path: &Path) -> Result<Self> {
        let data = std::fs::read(path)?;
        tracing::debug!("Raw snapshot loaded, size: {} bytes", data.len());
        Ok(Self {
            data,
            base_address: None,
        })
    }

    pub fn from_ihex_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_ihex_str(&content)
    }

    pub fn from_ihex_str(content: &str) -> Result<Self> {
        let mut segments: Vec<(u32, Vec<u8>)> = Vec::new();
        let mut upper: u32 = 0;

        for record in ihex::Reader::new(content) {
            match record? {
                Record::Data { offset, value } => {
                    let address = upper.wrapping_add(offset as u32);
                    // Merge with the previous record when it continues it.
                    match segments.last_mut() {
                        Some((start, bytes))
                            if start.wrapping_add(bytes.len() as u32) == address =>
                        {
                            bytes.extend_from_slice(&value);
                        }
                        _ => segments.push((address, value)),
                    }
                }
                Record::ExtendedLinearAddress(high) => upper = (high as u32) << 16,
                Record::ExtendedSegmentAddress(segment) => upper = (segment as u32) << 4,
                Record::EndOfFile => break,
                _ => {}
            }
        }

        let base = segments
            .iter()
            .map(|(start, _)| *start)
            .min()
            .ok_or_else(|| Error::invalid_input("Intel HEX snapshot contains no data"))?;
        let end = segments
            .iter()
            .map(|(start, bytes)| *start as u64 + bytes.len() as u64)
            .max()
            .unwrap_or(base as u64);

        let span = end - base as u64;
        if span > MAX_IHEX_SPAN {
            return Err(Error::invalid_input(format!(
                "Intel HEX snapshot spans 0x{:08X}..0x{:08X} ({} bytes), more than the {} byte limit",
                base, end, span, MAX_IHEX_SPAN
            )));
        }
        let span = usize::try_from(span)
            .map_err(|_| Error::invalid_input("Intel HEX snapshot too large for this host"))?;

        let mut data = vec![GAP_FILL; span];
        for (start, bytes) in &segments {
            let offset = (start - base) as usize;
            data[offset..offset + bytes.len()].copy_from_slice(bytes);
        }

        tracing::debug!(
            "Intel HEX snapshot loaded: {} segment(s), base 0x{:08X}, size {} bytes",
            segments.len(),
            base,
            data.len()
        );
        Ok(Self {
            data,
            base_address: Some(base),
        })
    }
}

/// Look up the address of `symbol` in an ELF image.
pub fn resolve_symbol(elf_path: &Path, symbol: &str) -> Result<u32> {
    let bytes = std::fs::read(elf_path)?;
    let elf = Elf::parse(&bytes)?;

    let address = elf
        .syms
        .iter()
        .find(|sym| elf.strtab.get_at(sym.st_name) == Some(symbol))
        .map(|sym| sym.st_value)
        .ok_or_else(|| {
            Error::invalid_input(format!(
                "symbol '{}' not found in {}",
                symbol,
                elf_path.display()
            ))
        })?;

    let address = u32::try_from(address).map_err(|_| {
        Error::invalid_input(format!(
            "symbol '{}' at 0x{:X} does not fit a 32-bit address",
            symbol, address
        ))
    })?;
    tracing::info!("Resolved {} to 0x{:08X}", symbol, address);
    Ok(address)
}
