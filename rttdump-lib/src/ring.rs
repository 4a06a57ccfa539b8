//! Up buffer content reconstruction.
//!
//! A snapshot taken after the target halted holds the ring storage of every
//! up buffer in physical order. The logical byte stream is recovered by taking
//! the region after the write cursor (oldest data, not yet overwritten since
//! the last wrap) followed by the region from the start of the buffer up to the
//! byte before the read cursor.
//!
//! This assumes the ring has wrapped at least once and `WrOff == RdOff - 1`.
//! Other cursor relations are still reconstructed, but the result only passes
//! when its length equals the buffer size.

use crate::address;
use crate::control_block::BufferDescriptor;
use crate::{Error, Result};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChannelData {
    /// `pBuffer` is null, the target never set the channel up.
    Uninitialized,
    Data(Vec<u8>),
}

/// Reorder the physical storage `window` of `descriptor` into its logical sequence.
///
/// `window` is the `SizeOfBuffer` bytes at the descriptor's translated address.
pub fn reconstruct(descriptor: &BufferDescriptor, window: &[u8]) -> Result<Vec<u8>> {
    let end = (descriptor.size as usize).min(window.len());
    let tail_start = (descriptor.write_offset as usize).min(end);
    let head_end = (descriptor.read_offset as usize).saturating_sub(1).min(end);

    let tail = &window[tail_start..end];
    let head = &window[..head_end];

    let actual = tail.len() + head.len();
    if actual != descriptor.size as usize {
        return Err(Error::LengthMismatch {
            expected: descriptor.size,
            actual,
        });
    }

    let mut data = Vec::with_capacity(actual);
    data.extend_from_slice(tail);
    data.extend_from_slice(head);
    Ok(data)
}

/// Locate the storage of `descriptor` in `snapshot` and reconstruct its contents.
pub fn extract_channel(
    descriptor: &BufferDescriptor,
    snapshot: &[u8],
    base: u32,
) -> Result<ChannelData> {
    if !descriptor.is_initialized() {
        return Ok(ChannelData::Uninitialized);
    }

    let window = address::window(snapshot, descriptor, base)?;
    tracing::debug!("Buffer raw data: {:02X?}", window);
    if descriptor.write_offset.wrapping_add(1) != descriptor.read_offset {
        tracing::debug!(
            "Cursor relation WrOff={} RdOff={} differs from the wrapped steady state",
            descriptor.write_offset,
            descriptor.read_offset
        );
    }
    reconstruct(descriptor, window).map(ChannelData::Data)
}
