//! One extraction run over a snapshot.

use crate::byte_order::ByteOrder;
use crate::control_block::{ControlBlock, find_control_block};
use crate::emitter::ChannelEmitter;
use crate::ring::{ChannelData, extract_channel};
use crate::{Error, Result};

#[derive(Debug, Clone, Default)]
pub struct ExtractOptions {
    /// Target address of the first snapshot byte.
    pub base_address: u32,
    pub byte_order: ByteOrder,
    /// Scan the snapshot for the control block instead of expecting it at offset 0.
    pub search: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChannelStatus {
    Emitted { bytes: usize },
    Uninitialized,
    AddressOutOfRange(String),
    LengthMismatch { expected: u32, actual: usize },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChannelReport {
    pub index: usize,
    pub status: ChannelStatus,
}

#[derive(Debug, Clone)]
pub struct ExtractionReport {
    /// Snapshot offset the control block was parsed from.
    pub offset: usize,
    pub control_block: ControlBlock,
    pub channels: Vec<ChannelReport>,
}

impl ExtractionReport {
    pub fn emitted(&self) -> usize {
        self.channels
            .iter()
            .filter(|c| matches!(c.status, ChannelStatus::Emitted { .. }))
            .count()
    }

    pub fn skipped(&self) -> usize {
        self.channels.len() - self.emitted()
    }
}

/// Parse the control block, then reconstruct and emit every up buffer.
///
/// Header and signature failures abort the run. Channel failures are logged,
/// recorded in the report and skipped.
pub fn extract_channels(
    snapshot: &[u8],
    options: &ExtractOptions,
    emitter: &mut dyn ChannelEmitter,
) -> Result<ExtractionReport> {
    let offset = locate(snapshot, options.search)?;
    let control_block = ControlBlock::parse_at(snapshot, offset, options.byte_order)?;
    tracing::debug!("Control block at offset {:#X}:\n{}", offset, control_block);
    control_block.validate()?;

    tracing::info!(
        "Maximum number of buffer found : up {}  |  down {}",
        control_block.max_up_buffers,
        control_block.max_down_buffers
    );

    let mut channels = Vec::with_capacity(control_block.up.len());
    for (index, descriptor) in control_block.up.iter().enumerate() {
        let status = match extract_channel(descriptor, snapshot, options.base_address) {
            Ok(ChannelData::Data(data)) => {
                tracing::info!("Extracting up buffer {} ({} bytes)", index, data.len());
                emitter.emit(index, &data)?;
                ChannelStatus::Emitted { bytes: data.len() }
            }
            Ok(ChannelData::Uninitialized) => {
                tracing::warn!("Up buffer {} not initialized, skipped", index);
                ChannelStatus::Uninitialized
            }
            Err(e) if e.is_channel_local() => {
                tracing::warn!("Up buffer {} skipped: {}", index, e);
                match e {
                    Error::LengthMismatch { expected, actual } => {
                        ChannelStatus::LengthMismatch { expected, actual }
                    }
                    other => ChannelStatus::AddressOutOfRange(other.to_string()),
                }
            }
            Err(e) => return Err(e),
        };
        channels.push(ChannelReport { index, status });
    }

    Ok(ExtractionReport {
        offset,
        control_block,
        channels,
    })
}

fn locate(snapshot: &[u8], search: bool) -> Result<usize> {
    if !search {
        return Ok(0);
    }
    match find_control_block(snapshot) {
        Some(offset) => {
            tracing::info!("SEGGER RTT control block found at offset {:#X}", offset);
            Ok(offset)
        }
        None => {
            let mut found = [0u8; 16];
            let len = snapshot.len().min(found.len());
            found[..len].copy_from_slice(&snapshot[..len]);
            Err(Error::SignatureMismatch { found })
        }
    }
}
