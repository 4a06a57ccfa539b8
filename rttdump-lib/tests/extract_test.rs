use rttdump_lib::control_block::{BufferDescriptor, RTT_SIGNATURE};
use rttdump_lib::emitter::{ChannelEmitter, FileEmitter, artifact_name};
use rttdump_lib::ring::{ChannelData, extract_channel, reconstruct};
use rttdump_lib::{ByteOrder, ChannelStatus, Error, ExtractOptions, Result, extract_channels};
use std::io;
use std::sync::{Arc, Mutex};

const BASE: u32 = 0x2000_0000;

#[derive(Default)]
struct CollectingEmitter {
    channels: Vec<(usize, Vec<u8>)>,
}

impl ChannelEmitter for CollectingEmitter {
    fn emit(&mut self, index: usize, data: &[u8]) -> Result<()> {
        self.channels.push((index, data.to_vec()));
        Ok(())
    }
}

fn descriptor(data_addr: u32, size: u32, write_offset: u32, read_offset: u32) -> BufferDescriptor {
    BufferDescriptor {
        name_addr: 0x0800_0000,
        data_addr,
        size,
        write_offset,
        read_offset,
        flags: 0,
    }
}

/// Lay out a little-endian control block at offset 0 followed by zero padding
/// up to `len` bytes.
fn snapshot_with(up: &[BufferDescriptor], len: usize) -> Vec<u8> {
    let mut buf = Vec::new();
    buf.extend_from_slice(&RTT_SIGNATURE);
    buf.extend_from_slice(&(up.len() as u32).to_le_bytes());
    buf.extend_from_slice(&1u32.to_le_bytes());
    for d in up.iter().chain(std::iter::once(&descriptor(0, 0, 0, 0))) {
        for field in [
            d.name_addr,
            d.data_addr,
            d.size,
            d.write_offset,
            d.read_offset,
            d.flags,
        ] {
            buf.extend_from_slice(&field.to_le_bytes());
        }
    }
    assert!(buf.len() <= len);
    buf.resize(len, 0);
    buf
}

fn fill_ramp(snapshot: &mut [u8], offset: usize, len: usize) {
    for (i, byte) in snapshot[offset..offset + len].iter_mut().enumerate() {
        *byte = i as u8;
    }
}

#[test]
fn test_reconstructs_tail_then_head() {
    let window: Vec<u8> = (0..128u8).collect();
    let d = descriptor(BASE, 128, 64, 65);

    let data = reconstruct(&d, &window).unwrap();
    assert_eq!(data.len(), 128);
    assert_eq!(&data[..64], &window[64..128]);
    assert_eq!(&data[64..], &window[0..64]);
}

#[test]
fn test_steady_state_cursors_always_fill_the_buffer() {
    let window = vec![0xAB; 32];
    for write_offset in 0..31 {
        let d = descriptor(BASE, 32, write_offset, write_offset + 1);
        assert_eq!(reconstruct(&d, &window).unwrap().len(), 32);
    }
}

#[test]
fn test_other_cursor_relations_are_length_mismatches() {
    let window = vec![0u8; 32];

    let err = reconstruct(&descriptor(BASE, 32, 10, 5), &window).unwrap_err();
    assert!(matches!(
        err,
        Error::LengthMismatch {
            expected: 32,
            actual: 26
        }
    ));

    // Cursors beyond the buffer clamp instead of panicking.
    let err = reconstruct(&descriptor(BASE, 32, 40, 20), &window).unwrap_err();
    assert!(matches!(err, Error::LengthMismatch { actual: 19, .. }));
}

#[test]
fn test_untouched_ring_reproduces_storage() {
    // Both cursors at zero: the whole buffer is the tail segment.
    let window: Vec<u8> = (0..32u8).collect();
    let data = reconstruct(&descriptor(BASE, 32, 0, 0), &window).unwrap();
    assert_eq!(data, window);
}

#[test]
fn test_null_buffer_pointer_is_uninitialized() {
    let d = descriptor(0, 128, 64, 65);
    assert_eq!(
        extract_channel(&d, &[0u8; 16], BASE).unwrap(),
        ChannelData::Uninitialized
    );
}

#[test]
fn test_extracts_initialized_channel_after_uninitialized_one() {
    let up = [descriptor(0, 0, 0, 0), descriptor(BASE + 0x100, 128, 64, 65)];
    let mut snapshot = snapshot_with(&up, 0x100 + 128);
    fill_ramp(&mut snapshot, 0x100, 128);

    let options = ExtractOptions {
        base_address: BASE,
        ..Default::default()
    };
    let mut emitter = CollectingEmitter::default();
    let report = extract_channels(&snapshot, &options, &mut emitter).unwrap();

    assert_eq!(emitter.channels.len(), 1);
    let (index, data) = &emitter.channels[0];
    assert_eq!(*index, 1);
    let expected: Vec<u8> = (64..128u8).chain(0..64u8).collect();
    assert_eq!(data, &expected);

    assert_eq!(report.offset, 0);
    assert_eq!(report.emitted(), 1);
    assert_eq!(report.skipped(), 1);
    assert_eq!(report.channels[0].status, ChannelStatus::Uninitialized);
    assert_eq!(
        report.channels[1].status,
        ChannelStatus::Emitted { bytes: 128 }
    );
    assert_eq!(report.control_block.down.len(), 1);
}

#[test]
fn test_channel_below_base_is_skipped_and_others_extract() {
    let up = [
        descriptor(BASE - 4, 16, 8, 9),
        descriptor(BASE + 0x80, 16, 8, 9),
    ];
    let snapshot = snapshot_with(&up, 0x80 + 16);

    let options = ExtractOptions {
        base_address: BASE,
        ..Default::default()
    };
    let mut emitter = CollectingEmitter::default();
    let report = extract_channels(&snapshot, &options, &mut emitter).unwrap();

    assert!(matches!(
        report.channels[0].status,
        ChannelStatus::AddressOutOfRange(_)
    ));
    assert_eq!(emitter.channels.len(), 1);
    assert_eq!(emitter.channels[0].0, 1);
}

#[test]
fn test_channel_past_snapshot_end_is_skipped() {
    let up = [descriptor(BASE + 0x80, 0x100, 0x10, 0x11)];
    let snapshot = snapshot_with(&up, 0x100);

    let options = ExtractOptions {
        base_address: BASE,
        ..Default::default()
    };
    let mut emitter = CollectingEmitter::default();
    let report = extract_channels(&snapshot, &options, &mut emitter).unwrap();

    assert!(emitter.channels.is_empty());
    assert!(matches!(
        report.channels[0].status,
        ChannelStatus::AddressOutOfRange(_)
    ));
}

#[test]
fn test_length_mismatch_skips_only_that_channel() {
    let up = [
        descriptor(BASE + 0x80, 32, 10, 5),
        descriptor(BASE + 0xA0, 32, 3, 4),
    ];
    let snapshot = snapshot_with(&up, 0xC0);

    let options = ExtractOptions {
        base_address: BASE,
        ..Default::default()
    };
    let mut emitter = CollectingEmitter::default();
    let report = extract_channels(&snapshot, &options, &mut emitter).unwrap();

    assert_eq!(
        report.channels[0].status,
        ChannelStatus::LengthMismatch {
            expected: 32,
            actual: 26
        }
    );
    assert_eq!(emitter.channels.len(), 1);
    assert_eq!(emitter.channels[0].0, 1);
    assert_eq!(emitter.channels[0].1.len(), 32);
}

#[test]
fn test_bad_signature_aborts_before_emitting() {
    let up = [descriptor(BASE + 0x80, 16, 8, 9)];
    let mut snapshot = snapshot_with(&up, 0x90);
    snapshot[0] = b's';

    let mut emitter = CollectingEmitter::default();
    let err = extract_channels(&snapshot, &ExtractOptions::default(), &mut emitter).unwrap_err();
    assert!(matches!(err, Error::SignatureMismatch { .. }));
    assert!(emitter.channels.is_empty());
}

#[test]
fn test_search_locates_control_block_inside_dump() {
    let up = [descriptor(BASE + 0x100, 16, 4, 5)];
    let block = snapshot_with(&up, 72);
    let mut snapshot = vec![0xCC; 0x20];
    snapshot.extend_from_slice(&block);
    snapshot.resize(0x110, 0);

    let options = ExtractOptions {
        base_address: BASE,
        byte_order: ByteOrder::Little,
        search: true,
    };
    let mut emitter = CollectingEmitter::default();
    let report = extract_channels(&snapshot, &options, &mut emitter).unwrap();
    assert_eq!(report.offset, 0x20);
    assert_eq!(emitter.channels.len(), 1);

    let mut emitter = CollectingEmitter::default();
    let err = extract_channels(&[0u8; 64], &options, &mut emitter).unwrap_err();
    assert!(matches!(err, Error::SignatureMismatch { .. }));
}

#[test]
fn test_file_emitter_writes_one_file_per_channel() {
    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("channels");

    let up = [descriptor(0, 0, 0, 0), descriptor(BASE + 0x80, 16, 8, 9)];
    let mut snapshot = snapshot_with(&up, 0x90);
    fill_ramp(&mut snapshot, 0x80, 16);

    let options = ExtractOptions {
        base_address: BASE,
        ..Default::default()
    };
    let mut emitter = FileEmitter::new(&out, "buffer_");
    extract_channels(&snapshot, &options, &mut emitter).unwrap();

    assert_eq!(artifact_name("buffer_", 1), "buffer_1.bin");
    assert_eq!(emitter.written(), &[out.join("buffer_1.bin")]);
    assert!(!out.join("buffer_0.bin").exists());

    let written = std::fs::read(out.join("buffer_1.bin")).unwrap();
    let expected: Vec<u8> = (8..16u8).chain(0..8u8).collect();
    assert_eq!(written, expected);
}

#[derive(Clone, Default)]
struct LogBuffer(Arc<Mutex<Vec<u8>>>);

impl io::Write for LogBuffer {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

#[test]
fn test_extract_channel_logs_raw_window() {
    let logs = LogBuffer::default();
    let writer = logs.clone();
    let subscriber = tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .with_ansi(false)
        .with_writer(move || writer.clone())
        .finish();

    let mut snapshot = vec![0u8; 16];
    fill_ramp(&mut snapshot, 8, 8);
    let d = descriptor(BASE + 8, 8, 3, 4);

    let data = tracing::subscriber::with_default(subscriber, || {
        extract_channel(&d, &snapshot, BASE).unwrap()
    });
    assert_eq!(data, ChannelData::Data(vec![3, 4, 5, 6, 7, 0, 1, 2]));

    let output = String::from_utf8(logs.0.lock().unwrap().clone()).unwrap();
    assert!(output.contains("Buffer raw data: [00, 01, 02, 03, 04, 05, 06, 07]"));
}
