use thiserror::Error;

/// Convenient result type for `rttdump-lib`.
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("Intel HEX parse error: {0}")]
    IntelHex(#[from] ihex::ReaderError),

    #[error("ELF parse error: {0}")]
    Elf(#[from] goblin::error::Error),

    #[error(
        "truncated {context} at offset {offset:#X}: need {needed} bytes, {available} available"
    )]
    Format {
        context: String,
        offset: usize,
        needed: u64,
        available: u64,
    },

    #[error("SEGGER RTT tag not found (found {})", escape_tag(.found))]
    SignatureMismatch { found: [u8; 16] },

    #[error(
        "buffer at {pointer:#010X} ({size} bytes) lies outside the snapshot \
         (base {base:#010X}, {snapshot_len} bytes)"
    )]
    AddressRange {
        pointer: u32,
        base: u32,
        size: u32,
        snapshot_len: usize,
    },

    #[error("not enough data: reconstructed {actual} bytes, expected {expected}")]
    LengthMismatch { expected: u32, actual: usize },

    #[error("invalid input: {0}")]
    InvalidInput(String),
}

impl Error {
    pub fn invalid_input(msg: impl Into<String>) -> Self {
        Self::InvalidInput(msg.into())
    }

    pub fn format(context: impl Into<String>, offset: usize, needed: u64, available: u64) -> Self {
        Self::Format {
            context: context.into(),
            offset,
            needed,
            available,
        }
    }

    /// Errors that only invalidate a single channel; the run carries on with the next one.
    pub fn is_channel_local(&self) -> bool {
        matches!(self, Self::AddressRange { .. } | Self::LengthMismatch { .. })
    }
}

fn escape_tag(tag: &[u8; 16]) -> String {
    tag.escape_ascii().to_string()
}
