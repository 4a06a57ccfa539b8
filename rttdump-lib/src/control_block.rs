//! SEGGER RTT control block layout.
//!
//! ```text
//! offset  size          field
//! 0       16            acID, "SEGGER RTT" padded with NUL
//! 16      4             MaxNumUpBuffers
//! 20      4             MaxNumDownBuffers
//! 24      24 * up       up buffer descriptors
//! ...     24 * down     down buffer descriptors
//! ```
//!
//! The descriptor counts come before the arrays they size, so the parser
//! reads the header scalars first and then walks the arrays with an explicit
//! cursor.

use crate::byte_order::{ByteOrder, FIELD_WIDTH, decode_u32};
use crate::{Error, Result};
use std::fmt;

pub const RTT_SIGNATURE: [u8; 16] = *b"SEGGER RTT\0\0\0\0\0\0";
pub const HEADER_SIZE: usize = 24;
pub const DESCRIPTOR_SIZE: usize = 24;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BufferDescriptor {
    /// Target pointer to the channel name. Never dereferenced.
    pub name_addr: u32,
    /// Target pointer to the ring storage, 0 when the channel is not initialized.
    pub data_addr: u32,
    pub size: u32,
    /// Next position the target will write.
    pub write_offset: u32,
    /// Last position consumed by the host.
    pub read_offset: u32,
    pub flags: u32,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ControlBlock {
    pub id: [u8; 16],
    pub max_up_buffers: u32,
    pub max_down_buffers: u32,
    pub up: Vec<BufferDescriptor>,
    pub down: Vec<BufferDescriptor>,
}

impl BufferDescriptor {
    /// Decode one descriptor at `cursor`, returning it with the advanced cursor.
    pub fn parse(bytes: &[u8], cursor: usize, order: ByteOrder) -> Result<(Self, usize)> {
        let available = bytes.len().saturating_sub(cursor) as u64;
        if available < DESCRIPTOR_SIZE as u64 {
            return Err(Error::format(
                "buffer descriptor",
                cursor,
                DESCRIPTOR_SIZE as u64,
                available,
            ));
        }

        let mut fields = [0u32; 6];
        for (i, field) in fields.iter_mut().enumerate() {
            *field = decode_u32(bytes, cursor + i * FIELD_WIDTH, order)?;
        }
        let [name_addr, data_addr, size, write_offset, read_offset, flags] = fields;

        let descriptor = Self {
            name_addr,
            data_addr,
            size,
            write_offset,
            read_offset,
            flags,
        };
        Ok((descriptor, cursor + DESCRIPTOR_SIZE))
    }

    pub fn is_initialized(&self) -> bool {
        self.data_addr != 0
    }
}

impl ControlBlock {
    /// Parse a control block located at the start of `bytes`.
    pub fn parse(bytes: &[u8], order: ByteOrder) -> Result<Self> {
        Self::parse_at(bytes, 0, order)
    }

    /// Parse a control block located at `offset`.
    pub fn parse_at(bytes: &[u8], offset: usize, order: ByteOrder) -> Result<Self> {
        let available = bytes.len().saturating_sub(offset) as u64;
        if available < HEADER_SIZE as u64 {
            return Err(Error::format(
                "control block header",
                offset,
                HEADER_SIZE as u64,
                available,
            ));
        }

        let mut id = [0u8; 16];
        id.copy_from_slice(&bytes[offset..offset + 16]);
        let max_up_buffers = decode_u32(bytes, offset + 16, order)?;
        let max_down_buffers = decode_u32(bytes, offset + 20, order)?;

        // Both counts come straight from target memory; check the whole
        // footprint before allocating anything sized by them.
        let needed = HEADER_SIZE as u64
            + DESCRIPTOR_SIZE as u64 * (max_up_buffers as u64 + max_down_buffers as u64);
        if needed > available {
            return Err(Error::format(
                format!(
                    "control block with {} up and {} down buffers",
                    max_up_buffers, max_down_buffers
                ),
                offset,
                needed,
                available,
            ));
        }

        let mut cursor = offset + HEADER_SIZE;
        let up = parse_descriptors(bytes, &mut cursor, max_up_buffers, order)?;
        let down = parse_descriptors(bytes, &mut cursor, max_down_buffers, order)?;

        Ok(Self {
            id,
            max_up_buffers,
            max_down_buffers,
            up,
            down,
        })
    }

    pub fn validate(&self) -> Result<()> {
        validate_signature(self)
    }

    /// Total size of the structure in target memory.
    pub fn encoded_len(&self) -> usize {
        HEADER_SIZE + DESCRIPTOR_SIZE * (self.up.len() + self.down.len())
    }
}

fn parse_descriptors(
    bytes: &[u8],
    cursor: &mut usize,
    count: u32,
    order: ByteOrder,
) -> Result<Vec<BufferDescriptor>> {
    let mut descriptors = Vec::with_capacity(count as usize);
    for _ in 0..count {
        let (descriptor, next) = BufferDescriptor::parse(bytes, *cursor, order)?;
        descriptors.push(descriptor);
        *cursor = next;
    }
    Ok(descriptors)
}

/// Check the control block tag against `"SEGGER RTT"`.
pub fn validate_signature(control_block: &ControlBlock) -> Result<()> {
    if control_block.id != RTT_SIGNATURE {
        return Err(Error::SignatureMismatch {
            found: control_block.id,
        });
    }
    Ok(())
}

/// Scan for the first occurrence of the control block tag and return its offset.
pub fn find_control_block(bytes: &[u8]) -> Option<usize> {
    bytes
        .windows(RTT_SIGNATURE.len())
        .position(|window| window == RTT_SIGNATURE)
}

impl fmt::Display for BufferDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "sName=0x{:08X} pBuffer=0x{:08X} SizeOfBuffer={} WrOff={} RdOff={} Flags={}",
            self.name_addr,
            self.data_addr,
            self.size,
            self.write_offset,
            self.read_offset,
            self.flags
        )
    }
}

impl fmt::Display for ControlBlock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "acID              = {}", self.id.escape_ascii())?;
        writeln!(f, "MaxNumUpBuffers   = {}", self.max_up_buffers)?;
        writeln!(f, "MaxNumDownBuffers = {}", self.max_down_buffers)?;
        for (index, descriptor) in self.up.iter().enumerate() {
            writeln!(f, "aUp[{}]   {}", index, descriptor)?;
        }
        for (index, descriptor) in self.down.iter().enumerate() {
            writeln!(f, "aDown[{}] {}", index, descriptor)?;
        }
        Ok(())
    }
}
