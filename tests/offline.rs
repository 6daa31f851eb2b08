//! Replaying a pcap savefile through libpcap.

use framescope::capture::engine;
use framescope::capture::{CaptureLoop, FrameSource, SourceError};
use framescope::display::{DisplayOptions, JsonSink};
use serde_json::Value;
use std::io::Write;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;

/// Classic little-endian pcap file, Ethernet link type.
fn write_pcap(frames: &[(u32, Vec<u8>)]) -> tempfile::NamedTempFile {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    let mut buf = Vec::new();
    buf.extend_from_slice(&0xa1b2_c3d4u32.to_le_bytes());
    buf.extend_from_slice(&2u16.to_le_bytes());
    buf.extend_from_slice(&4u16.to_le_bytes());
    buf.extend_from_slice(&0i32.to_le_bytes()); // thiszone
    buf.extend_from_slice(&0u32.to_le_bytes()); // sigfigs
    buf.extend_from_slice(&65535u32.to_le_bytes()); // snaplen
    buf.extend_from_slice(&1u32.to_le_bytes()); // LINKTYPE_ETHERNET

    for (i, (orig_len, data)) in frames.iter().enumerate() {
        buf.extend_from_slice(&(1_700_000_000u32 + i as u32).to_le_bytes());
        buf.extend_from_slice(&250_000u32.to_le_bytes());
        buf.extend_from_slice(&(data.len() as u32).to_le_bytes());
        buf.extend_from_slice(&orig_len.to_le_bytes());
        buf.extend_from_slice(data);
    }
    file.write_all(&buf).unwrap();
    file.flush().unwrap();
    file
}

fn syn_frame() -> Vec<u8> {
    let mut pkt = vec![0u8; 54];
    pkt[12] = 0x08;
    pkt[14] = 0x45;
    pkt[16..18].copy_from_slice(&40u16.to_be_bytes());
    pkt[23] = 6;
    pkt[46] = 0x50;
    pkt[47] = 0x02;
    pkt
}

#[test]
fn offline_source_yields_frames_then_exhausts() {
    let syn = syn_frame();
    let file = write_pcap(&[(54, syn.clone()), (1514, syn[..34].to_vec())]);

    let mut source = engine::open_offline(file.path()).unwrap();

    let first = source.next_frame().unwrap();
    assert_eq!(first.data(), syn.as_slice());
    assert_eq!(first.wire_len(), 54);
    assert!((first.timestamp() - 1_700_000_000.25).abs() < 1e-6);

    let second = source.next_frame().unwrap();
    assert_eq!(second.len(), 34);
    assert_eq!(second.wire_len(), 1514);

    assert!(matches!(source.next_frame(), Err(SourceError::Exhausted)));
}

#[test]
fn offline_replay_through_the_loop() {
    let syn = syn_frame();
    let file = write_pcap(&[(54, syn.clone()), (34, syn[..34].to_vec()), (10, vec![0u8; 10])]);

    let source = engine::open_offline(file.path()).unwrap();
    let mut sink = JsonSink::new(Vec::new(), DisplayOptions::default());
    let stats = CaptureLoop::new(source, &mut sink, Arc::new(AtomicBool::new(true)))
        .run()
        .unwrap();

    assert_eq!(stats.frames, 3);
    assert_eq!(stats.complete, 1);
    assert_eq!(stats.decode_errors, 2);

    let records: Vec<Value> = String::from_utf8(sink.into_inner())
        .unwrap()
        .lines()
        .map(|l| serde_json::from_str(l).unwrap())
        .collect();
    let kinds: Vec<&str> = records.iter().map(|r| r["type"].as_str().unwrap()).collect();
    assert_eq!(
        kinds,
        ["frame", "frame", "diagnostic", "diagnostic", "summary"]
    );
    assert_eq!(records[0]["tcp"]["flags"]["syn"], true);
    assert_eq!(records[2]["error"]["stage"], "tcp");
    assert_eq!(records[3]["error"]["stage"], "ethernet");
}

#[test]
fn missing_savefile_is_an_open_error() {
    assert!(engine::open_offline(std::path::Path::new("/nonexistent/trace.pcap")).is_err());
}
