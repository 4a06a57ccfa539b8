//! Target address to snapshot offset translation.

use crate::control_block::BufferDescriptor;
use crate::{Error, Result};

/// Translate a target pointer into an offset inside a snapshot loaded at `base`.
///
/// Fails when the pointer lies below `base` or when fewer than `size` bytes
/// remain in the snapshot after it.
pub fn translate(pointer: u32, base: u32, size: u32, snapshot_len: usize) -> Result<usize> {
    let out_of_range = || Error::AddressRange {
        pointer,
        base,
        size,
        snapshot_len,
    };

    let offset = pointer.checked_sub(base).ok_or_else(out_of_range)?;
    if offset as u64 + size as u64 > snapshot_len as u64 {
        return Err(out_of_range());
    }
    Ok(offset as usize)
}

/// The physical storage of a descriptor as a slice of the snapshot.
pub fn window<'a>(snapshot: &'a [u8], descriptor: &BufferDescriptor, base: u32) -> Result<&'a [u8]> {
    let offset = translate(descriptor.data_addr, base, descriptor.size, snapshot.len())?;
    Ok(&snapshot[offset..offset + descriptor.size as usize])
}
