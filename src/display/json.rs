//! JSON-lines renderer. Each record carries a `"type"` tag: `frame`,
//! `diagnostic` or `summary`.

use super::{DisplayOptions, FrameSink};
use crate::capture::{CaptureStats, Frame};
use crate::protocol::ethernet::{format_mac, EthernetHeader};
use crate::protocol::ipv4::Ipv4Header;
use crate::protocol::tcp::TcpHeader;
use crate::protocol::{DecodeError, ResolvedFrame};
use serde::Serialize;
use std::io::{self, Write};
use std::net::Ipv4Addr;

#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum Record<'r> {
    Frame(FrameRecord),
    Diagnostic(DiagnosticRecord<'r>),
    Summary(&'r CaptureStats),
}

#[derive(Debug, Serialize)]
struct FrameRecord {
    index: u64,
    ts: f64,
    captured_len: usize,
    wire_len: u32,
    ethernet: EthernetRecord,
    #[serde(skip_serializing_if = "Option::is_none")]
    ipv4: Option<Ipv4Record>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tcp: Option<TcpRecord>,
    payload_len: usize,
}

#[derive(Debug, Serialize)]
struct EthernetRecord {
    dst: String,
    src: String,
    ether_type: u16,
}

impl From<&EthernetHeader<'_>> for EthernetRecord {
    fn from(eth: &EthernetHeader<'_>) -> Self {
        EthernetRecord {
            dst: format_mac(&eth.dst_mac()),
            src: format_mac(&eth.src_mac()),
            ether_type: eth.ether_type_raw(),
        }
    }
}

#[derive(Debug, Serialize)]
struct Ipv4Record {
    version: u8,
    ihl: u8,
    header_len: usize,
    tos: u8,
    total_length: u16,
    identification: u16,
    ttl: u8,
    protocol: u8,
    checksum: u16,
    checksum_valid: bool,
    src: Ipv4Addr,
    dst: Ipv4Addr,
}

impl From<&Ipv4Header<'_>> for Ipv4Record {
    fn from(ip: &Ipv4Header<'_>) -> Self {
        Ipv4Record {
            version: ip.version(),
            ihl: ip.ihl(),
            header_len: ip.header_len(),
            tos: ip.tos(),
            total_length: ip.total_length(),
            identification: ip.identification(),
            ttl: ip.ttl(),
            protocol: ip.protocol_raw(),
            checksum: ip.checksum(),
            checksum_valid: ip.verify_checksum(),
            src: ip.src_addr(),
            dst: ip.dst_addr(),
        }
    }
}

#[derive(Debug, Serialize)]
struct TcpRecord {
    src_port: u16,
    dst_port: u16,
    seq: u32,
    ack_seq: u32,
    data_offset: u8,
    header_len: usize,
    flags: TcpFlags,
    window: u16,
    checksum: u16,
    urgent_pointer: u16,
}

#[derive(Debug, Serialize)]
struct TcpFlags {
    urg: bool,
    ack: bool,
    psh: bool,
    rst: bool,
    syn: bool,
    fin: bool,
}

impl From<&TcpHeader<'_>> for TcpRecord {
    fn from(tcp: &TcpHeader<'_>) -> Self {
        TcpRecord {
            src_port: tcp.src_port(),
            dst_port: tcp.dst_port(),
            seq: tcp.sequence_number(),
            ack_seq: tcp.ack_number(),
            data_offset: tcp.data_offset(),
            header_len: tcp.header_len(),
            flags: TcpFlags {
                urg: tcp.urg(),
                ack: tcp.ack(),
                psh: tcp.psh(),
                rst: tcp.rst(),
                syn: tcp.syn(),
                fin: tcp.fin(),
            },
            window: tcp.window_size(),
            checksum: tcp.checksum(),
            urgent_pointer: tcp.urgent_pointer(),
        }
    }
}

#[derive(Debug, Serialize)]
struct DiagnosticRecord<'r> {
    index: u64,
    ts: f64,
    captured_len: usize,
    error: &'r DecodeError,
    message: String,
}

/// Writes one JSON object per line.
pub struct JsonSink<W: Write> {
    out: W,
    options: DisplayOptions,
}

impl<W: Write> JsonSink<W> {
    pub fn new(out: W, options: DisplayOptions) -> Self {
        JsonSink { out, options }
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    fn emit(&mut self, record: &Record<'_>) -> io::Result<()> {
        serde_json::to_writer(&mut self.out, record)?;
        self.out.write_all(b"\n")
    }
}

impl<W: Write> FrameSink for JsonSink<W> {
    fn report(
        &mut self,
        index: u64,
        frame: &Frame<'_>,
        resolved: &ResolvedFrame<'_>,
    ) -> io::Result<()> {
        if self.options.quiet {
            return Ok(());
        }
        let record = FrameRecord {
            index,
            ts: frame.timestamp(),
            captured_len: frame.len(),
            wire_len: frame.wire_len(),
            ethernet: EthernetRecord::from(&resolved.ethernet),
            ipv4: resolved.ipv4.as_ref().map(Ipv4Record::from),
            tcp: resolved.tcp.as_ref().map(TcpRecord::from),
            payload_len: resolved.payload().len(),
        };
        self.emit(&Record::Frame(record))
    }

    fn diagnostic(&mut self, index: u64, frame: &Frame<'_>, error: &DecodeError) -> io::Result<()> {
        self.emit(&Record::Diagnostic(DiagnosticRecord {
            index,
            ts: frame.timestamp(),
            captured_len: frame.len(),
            error,
            message: error.to_string(),
        }))
    }

    fn finish(&mut self, stats: &CaptureStats) -> io::Result<()> {
        self.emit(&Record::Summary(stats))?;
        self.out.flush()
    }
}
