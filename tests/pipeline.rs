//! End-to-end: scripted frames through the capture loop into a recording sink.

use framescope::capture::replay::ReplaySource;
use framescope::capture::{CaptureError, CaptureLoop, Frame};
use framescope::display::{DisplayOptions, FrameSink, TextSink};
use framescope::protocol::{self, DecodeError, EtherType, IpProtocol, ResolvedFrame, Stage};
use std::io;
use std::net::Ipv4Addr;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// What a sink saw for one frame, copied out of the borrowed views.
#[derive(Debug, Clone, PartialEq)]
struct Seen {
    index: u64,
    ether_type: u16,
    ip_header_len: Option<usize>,
    tcp_header_len: Option<usize>,
    syn: Option<bool>,
    ack: Option<bool>,
}

#[derive(Default)]
struct Recorder {
    seen: Vec<Seen>,
    errors: Vec<(u64, DecodeError)>,
}

impl FrameSink for Recorder {
    fn report(&mut self, index: u64, _: &Frame<'_>, r: &ResolvedFrame<'_>) -> io::Result<()> {
        self.seen.push(Seen {
            index,
            ether_type: r.ethernet.ether_type_raw(),
            ip_header_len: r.ipv4.map(|ip| ip.header_len()),
            tcp_header_len: r.tcp.map(|tcp| tcp.header_len()),
            syn: r.tcp.map(|tcp| tcp.syn()),
            ack: r.tcp.map(|tcp| tcp.ack()),
        });
        Ok(())
    }

    fn diagnostic(&mut self, index: u64, _: &Frame<'_>, error: &DecodeError) -> io::Result<()> {
        self.errors.push((index, *error));
        Ok(())
    }
}

struct PacketShape {
    ihl: u8,
    protocol: u8,
    doff: u8,
    tcp_flags: u8,
}

impl Default for PacketShape {
    fn default() -> Self {
        PacketShape {
            ihl: 5,
            protocol: 6,
            doff: 5,
            tcp_flags: 0x02,
        }
    }
}

/// Build Ethernet + IPv4 (+ TCP when `with_tcp`) with known field values.
/// A DOFF below 5 still gets the 20 fixed TCP bytes.
fn build(shape: &PacketShape, with_tcp: bool) -> Vec<u8> {
    let ip_len = shape.ihl as usize * 4;
    let tcp_len = if with_tcp {
        (shape.doff as usize * 4).max(20)
    } else {
        0
    };
    let mut pkt = vec![0u8; 14 + ip_len + tcp_len];

    pkt[0..6].copy_from_slice(&[0x02, 0x00, 0x00, 0x00, 0x00, 0x01]);
    pkt[6..12].copy_from_slice(&[0x02, 0x00, 0x00, 0x00, 0x00, 0x02]);
    pkt[12..14].copy_from_slice(&0x0800u16.to_be_bytes());

    let ip = &mut pkt[14..14 + ip_len];
    ip[0] = 0x40 | shape.ihl;
    ip[1] = 0x10;
    ip[2..4].copy_from_slice(&((ip_len + tcp_len) as u16).to_be_bytes());
    ip[4..6].copy_from_slice(&0x1c46u16.to_be_bytes());
    ip[8] = 128;
    ip[9] = shape.protocol;
    ip[10..12].copy_from_slice(&0xb1e6u16.to_be_bytes());
    ip[12..16].copy_from_slice(&[172, 16, 0, 10]);
    ip[16..20].copy_from_slice(&[93, 184, 216, 34]);

    if with_tcp {
        let tcp = &mut pkt[14 + ip_len..];
        tcp[0..2].copy_from_slice(&0xc350u16.to_be_bytes());
        tcp[2..4].copy_from_slice(&443u16.to_be_bytes());
        tcp[4..8].copy_from_slice(&0xdead_beefu32.to_be_bytes());
        tcp[8..12].copy_from_slice(&0x0102_0304u32.to_be_bytes());
        tcp[12] = shape.doff << 4;
        tcp[13] = shape.tcp_flags;
        tcp[14..16].copy_from_slice(&0x7210u16.to_be_bytes());
        tcp[16..18].copy_from_slice(&0xabcdu16.to_be_bytes());
        tcp[18..20].copy_from_slice(&0x0007u16.to_be_bytes());
    }
    pkt
}

fn running() -> Arc<AtomicBool> {
    Arc::new(AtomicBool::new(true))
}

#[test]
fn syn_frame_resolves_all_three_headers() {
    let pkt = build(&PacketShape::default(), true);
    assert_eq!(pkt.len(), 54);

    let mut sink = Recorder::default();
    let stats = CaptureLoop::new(ReplaySource::new().frame(pkt), &mut sink, running())
        .run()
        .unwrap();

    assert_eq!(stats.frames, 1);
    assert_eq!(stats.complete, 1);
    assert!(sink.errors.is_empty());
    assert_eq!(
        sink.seen,
        vec![Seen {
            index: 1,
            ether_type: 0x0800,
            ip_header_len: Some(20),
            tcp_header_len: Some(20),
            syn: Some(true),
            ack: Some(false),
        }]
    );
}

#[test]
fn field_values_survive_big_endian_decoding() {
    let pkt = build(&PacketShape::default(), true);
    let r = protocol::resolve(&pkt).unwrap();

    assert_eq!(r.ethernet.ether_type(), EtherType::Ipv4);
    assert_eq!(r.ethernet.dst_mac(), [0x02, 0, 0, 0, 0, 0x01]);
    assert_eq!(r.ethernet.src_mac(), [0x02, 0, 0, 0, 0, 0x02]);

    let ip = r.ipv4.unwrap();
    assert_eq!(ip.version(), 4);
    assert_eq!(ip.ihl(), 5);
    assert_eq!(ip.tos(), 0x10);
    assert_eq!(ip.total_length(), 40);
    assert_eq!(ip.identification(), 0x1c46);
    assert_eq!(ip.ttl(), 128);
    assert_eq!(ip.protocol(), IpProtocol::Tcp);
    assert_eq!(ip.checksum(), 0xb1e6);
    assert_eq!(ip.src_addr(), Ipv4Addr::new(172, 16, 0, 10));
    assert_eq!(ip.dst_addr(), Ipv4Addr::new(93, 184, 216, 34));

    let tcp = r.tcp.unwrap();
    assert_eq!(tcp.src_port(), 50000);
    assert_eq!(tcp.dst_port(), 443);
    assert_eq!(tcp.sequence_number(), 0xdead_beef);
    assert_eq!(tcp.ack_number(), 0x0102_0304);
    assert_eq!(tcp.data_offset(), 5);
    assert_eq!(tcp.window_size(), 0x7210);
    assert_eq!(tcp.checksum(), 0xabcd);
    assert_eq!(tcp.urgent_pointer(), 7);
}

#[test]
fn resolving_twice_gives_identical_views() {
    let pkt = build(
        &PacketShape {
            ihl: 7,
            doff: 8,
            tcp_flags: 0x12,
            ..PacketShape::default()
        },
        true,
    );
    let first = protocol::resolve(&pkt).unwrap();
    let second = protocol::resolve(&pkt).unwrap();
    assert_eq!(first, second);
    assert_eq!(first.tcp.unwrap().header_len(), 32);
}

#[test]
fn missing_tcp_bytes_report_tcp_truncation() {
    let pkt = build(&PacketShape::default(), false);
    assert_eq!(pkt.len(), 34);

    let mut sink = Recorder::default();
    let stats = CaptureLoop::new(ReplaySource::new().frame(pkt), &mut sink, running())
        .run()
        .unwrap();

    assert_eq!(stats.decode_errors, 1);
    assert_eq!(sink.seen.len(), 1);
    assert_eq!(sink.seen[0].ip_header_len, Some(20));
    assert_eq!(sink.seen[0].tcp_header_len, None);
    assert_eq!(
        sink.errors,
        vec![(
            1,
            DecodeError::TruncatedHeader {
                stage: Stage::Tcp,
                expected: 54,
                actual: 34,
            }
        )]
    );
}

#[test]
fn max_ihl_with_non_tcp_protocol_never_tries_tcp() {
    let pkt = build(
        &PacketShape {
            ihl: 15,
            protocol: 17,
            ..PacketShape::default()
        },
        false,
    );
    assert_eq!(pkt.len(), 74);

    let r = protocol::resolve(&pkt).unwrap();
    assert!(r.is_complete());
    assert_eq!(r.ipv4.unwrap().header_len(), 60);
    assert_eq!(r.ipv4.unwrap().options().len(), 40);
    assert!(r.tcp.is_none());
}

#[test]
fn frames_shorter_than_ethernet_get_no_views() {
    let mut source = ReplaySource::new();
    for len in 0..14 {
        source = source.frame(vec![0xee; len]);
    }
    let mut sink = Recorder::default();
    let stats = CaptureLoop::new(source, &mut sink, running()).run().unwrap();

    assert_eq!(stats.frames, 14);
    assert_eq!(stats.decode_errors, 14);
    assert!(sink.seen.is_empty());
    for (i, (index, error)) in sink.errors.iter().enumerate() {
        assert_eq!(*index, i as u64 + 1);
        assert_eq!(
            *error,
            DecodeError::TruncatedHeader {
                stage: Stage::Ethernet,
                expected: 14,
                actual: i,
            }
        );
    }
}

#[test]
fn ihl_below_five_is_invalid_whatever_the_length() {
    for ihl in 0..5u8 {
        for extra in [0usize, 1, 19, 60] {
            let mut pkt = vec![0u8; 15 + extra];
            pkt[12] = 0x08;
            pkt[14] = 0x40 | ihl;
            let r = protocol::resolve(&pkt).unwrap();
            assert_eq!(
                r.error,
                Some(DecodeError::InvalidHeaderLength {
                    stage: Stage::Ipv4,
                    declared_words: ihl,
                })
            );
        }
    }
}

#[test]
fn every_legal_ihl_resolves_when_captured() {
    for ihl in 5..=15u8 {
        let pkt = build(
            &PacketShape {
                ihl,
                protocol: 1,
                ..PacketShape::default()
            },
            false,
        );
        let r = protocol::resolve(&pkt).unwrap();
        assert_eq!(r.ipv4.unwrap().header_len(), ihl as usize * 4);
    }
}

#[test]
fn bad_frames_do_not_stop_the_loop() {
    let good = build(&PacketShape::default(), true);
    let bad_doff = build(
        &PacketShape {
            doff: 2,
            ..PacketShape::default()
        },
        true,
    );
    let source = ReplaySource::new()
        .frame(vec![1, 2, 3])
        .frame(bad_doff)
        .empty_read()
        .frame(good);
    let released = source.release_flag();
    let mut sink = Recorder::default();

    let stats = CaptureLoop::new(source, &mut sink, running()).run().unwrap();
    assert_eq!(stats.frames, 3);
    assert_eq!(stats.complete, 1);
    assert_eq!(stats.decode_errors, 2);
    assert_eq!(stats.empty_reads, 1);
    assert_eq!(sink.seen.last().map(|s| s.index), Some(3));
    assert!(released.load(Ordering::SeqCst));
}

#[test]
fn fatal_source_error_propagates() {
    let source = ReplaySource::new()
        .frame(build(&PacketShape::default(), true))
        .fatal("socket closed");
    let released = source.release_flag();
    let sink = TextSink::summary(Vec::new(), DisplayOptions::default());

    match CaptureLoop::new(source, sink, running()).run() {
        Err(CaptureError::Fatal { cause }) => assert_eq!(cause.to_string(), "socket closed"),
        other => panic!("expected fatal error, got {:?}", other),
    }
    assert!(released.load(Ordering::SeqCst));
}

#[test]
fn sink_write_failure_ends_the_run() {
    struct Broken;

    impl io::Write for Broken {
        fn write(&mut self, _: &[u8]) -> io::Result<usize> {
            Err(io::Error::new(io::ErrorKind::BrokenPipe, "closed"))
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    let source = ReplaySource::from_frames(vec![build(&PacketShape::default(), true); 3]);
    let released = source.release_flag();
    let sink = TextSink::summary(Broken, DisplayOptions::default());

    let err = CaptureLoop::new(source, sink, running()).run().unwrap_err();
    assert!(matches!(err, CaptureError::Output(_)));
    assert!(released.load(Ordering::SeqCst));
}
