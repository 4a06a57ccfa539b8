//! Fixed-width integer decoding with an explicit byte order.
//!
//! The byte order is always passed in by the caller; nothing in here keeps
//! state between calls, so the same functions serve every field of every run.

use crate::{Error, Result};
use strum::{Display, EnumString};

/// Byte order of the target memory the snapshot was taken from.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, EnumString, Display)]
#[cfg_attr(feature = "cli", derive(clap::ValueEnum))]
#[strum(serialize_all = "lowercase")]
pub enum ByteOrder {
    #[default]
    Little,
    Big,
}

/// Width of every RTT control block field.
pub const FIELD_WIDTH: usize = 4;

/// Decode an unsigned integer of `width` bytes (1 to 8) starting at `offset`.
pub fn decode(bytes: &[u8], offset: usize, width: usize, order: ByteOrder) -> Result<u64> {
    if width == 0 || width > 8 {
        return Err(Error::invalid_input(format!(
            "unsupported field width {}",
            width
        )));
    }

    let field = offset
        .checked_add(width)
        .and_then(|end| bytes.get(offset..end))
        .ok_or_else(|| {
            Error::format(
                format!("{}-byte field", width),
                offset,
                width as u64,
                bytes.len().saturating_sub(offset) as u64,
            )
        })?;

    let mut buf = [0u8; 8];
    let value = match order {
        ByteOrder::Little => {
            buf[..width].copy_from_slice(field);
            u64::from_le_bytes(buf)
        }
        ByteOrder::Big => {
            buf[8 - width..].copy_from_slice(field);
            u64::from_be_bytes(buf)
        }
    };
    Ok(value)
}

/// Decode a 4-byte field.
pub fn decode_u32(bytes: &[u8], offset: usize, order: ByteOrder) -> Result<u32> {
    // A 4-byte decode never exceeds u32::MAX.
    decode(bytes, offset, FIELD_WIDTH, order).map(|v| v as u32)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn parses_textual_forms() {
        assert_eq!(ByteOrder::from_str("little").unwrap(), ByteOrder::Little);
        assert_eq!(ByteOrder::from_str("big").unwrap(), ByteOrder::Big);
        assert!(ByteOrder::from_str("middle").is_err());
        assert_eq!(ByteOrder::Big.to_string(), "big");
        assert_eq!(ByteOrder::default(), ByteOrder::Little);
    }

    #[test]
    fn decodes_narrow_widths() {
        let bytes = [0x12, 0x34, 0x56];
        assert_eq!(decode(&bytes, 0, 2, ByteOrder::Little).unwrap(), 0x3412);
        assert_eq!(decode(&bytes, 1, 2, ByteOrder::Big).unwrap(), 0x3456);
        assert_eq!(decode(&bytes, 2, 1, ByteOrder::Big).unwrap(), 0x56);
    }

    #[test]
    fn rejects_bad_width() {
        let bytes = [0u8; 16];
        assert!(matches!(
            decode(&bytes, 0, 0, ByteOrder::Little),
            Err(Error::InvalidInput(_))
        ));
        assert!(matches!(
            decode(&bytes, 0, 9, ByteOrder::Little),
            Err(Error::InvalidInput(_))
        ));
    }

    #[test]
    fn offset_overflow_is_a_format_error() {
        let bytes = [0u8; 4];
        assert!(matches!(
            decode_u32(&bytes, usize::MAX - 1, ByteOrder::Little),
            Err(Error::Format { .. })
        ));
    }
}
