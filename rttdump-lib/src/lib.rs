//! Post-mortem SEGGER RTT extraction.
//!
//! Parses the RTT control block out of a memory dump of a halted target and
//! rebuilds the contents of every up buffer from its wrapped ring storage.

pub mod address;
pub mod byte_order;
pub mod control_block;
pub mod emitter;
pub mod error;
pub mod extract;
pub mod ring;
pub mod snapshot;
pub mod utils;

pub use byte_order::ByteOrder;
pub use control_block::{BufferDescriptor, ControlBlock, RTT_SIGNATURE};
pub use emitter::{ChannelEmitter, FileEmitter};
pub use error::{Error, Result};
pub use extract::{ChannelReport, ChannelStatus, ExtractOptions, ExtractionReport, extract_channels};
pub use ring::ChannelData;
pub use snapshot::{Snapshot, SnapshotFormat};
