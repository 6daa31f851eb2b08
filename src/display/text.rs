//! Human-readable renderers: a field-by-field detail report and a
//! one-line summary.

use super::{format_hex_dump, format_timestamp, DisplayOptions, FrameSink};
use crate::capture::{CaptureStats, Frame};
use crate::protocol::ethernet::{format_mac, EthernetHeader};
use crate::protocol::ipv4::Ipv4Header;
use crate::protocol::tcp::TcpHeader;
use crate::protocol::{DecodeError, ResolvedFrame};
use std::io::{self, Write};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Style {
    Detail,
    Summary,
}

/// Writes frames as text to any `io::Write`.
pub struct TextSink<W: Write> {
    out: W,
    style: Style,
    options: DisplayOptions,
}

impl<W: Write> TextSink<W> {
    /// Multi-line report listing every header field.
    pub fn detail(out: W, options: DisplayOptions) -> Self {
        TextSink {
            out,
            style: Style::Detail,
            options,
        }
    }

    /// One line per frame.
    pub fn summary(out: W, options: DisplayOptions) -> Self {
        TextSink {
            out,
            style: Style::Summary,
            options,
        }
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    fn write_summary(
        &mut self,
        index: u64,
        frame: &Frame<'_>,
        resolved: &ResolvedFrame<'_>,
    ) -> io::Result<()> {
        let mut line = format!(
            "#{:<6} {} Eth: {}",
            index,
            format_timestamp(frame.timestamp()),
            resolved.ethernet
        );
        if let Some(ip) = &resolved.ipv4 {
            line.push_str(&format!(" | IPv4: {}", ip));
        }
        if let Some(tcp) = &resolved.tcp {
            line.push_str(&format!(" | TCP {}", tcp));
        }
        if !resolved.payload().is_empty() {
            line.push_str(&format!(" | payload: {} bytes", resolved.payload().len()));
        }
        writeln!(self.out, "{}", line)
    }

    fn write_detail(
        &mut self,
        index: u64,
        frame: &Frame<'_>,
        resolved: &ResolvedFrame<'_>,
    ) -> io::Result<()> {
        writeln!(self.out, "{}", "=".repeat(60))?;
        writeln!(
            self.out,
            "Frame #{} at {}: {} bytes captured ({} on wire)",
            index,
            format_timestamp(frame.timestamp()),
            frame.len(),
            frame.wire_len()
        )?;

        self.write_ethernet(&resolved.ethernet)?;
        if let Some(ip) = &resolved.ipv4 {
            self.write_ipv4(ip)?;
        }
        if let Some(tcp) = &resolved.tcp {
            self.write_tcp(tcp)?;
        }

        writeln!(self.out)?;
        writeln!(self.out, "Payload: {} bytes", resolved.payload().len())?;

        if self.options.hex_dump {
            let data = frame.data();
            let shown = data.len().min(self.options.hex_dump_limit);
            writeln!(self.out, "Hex Dump ({} bytes):", data.len())?;
            write!(self.out, "{}", format_hex_dump(&data[..shown], "   "))?;
            if shown < data.len() {
                writeln!(self.out, "   ... ({} bytes remaining)", data.len() - shown)?;
            }
        }
        Ok(())
    }

    fn write_ethernet(&mut self, eth: &EthernetHeader<'_>) -> io::Result<()> {
        let out = &mut self.out;
        writeln!(out)?;
        writeln!(out, "Ethernet Header")?;
        writeln!(out, "   |-Destination Address: {}", format_mac(&eth.dst_mac()))?;
        writeln!(out, "   |-Source Address     : {}", format_mac(&eth.src_mac()))?;
        writeln!(
            out,
            "   |-Protocol           : 0x{:04x} ({})",
            eth.ether_type_raw(),
            eth.ether_type()
        )
    }

    fn write_ipv4(&mut self, ip: &Ipv4Header<'_>) -> io::Result<()> {
        let out = &mut self.out;
        writeln!(out)?;
        writeln!(out, "IP Header")?;
        writeln!(out, "   |-IP Version        : {}", ip.version())?;
        writeln!(
            out,
            "   |-IP Header Length  : {} DWORDS or {} Bytes",
            ip.ihl(),
            ip.header_len()
        )?;
        writeln!(out, "   |-Type Of Service   : {}", ip.tos())?;
        writeln!(
            out,
            "   |-IP Total Length   : {} Bytes(Size of Packet)",
            ip.total_length()
        )?;
        writeln!(out, "   |-Identification    : {}", ip.identification())?;
        writeln!(
            out,
            "   |-Flags             : DF={} MF={} offset={}",
            ip.dont_fragment() as u8,
            ip.more_fragments() as u8,
            ip.fragment_offset()
        )?;
        writeln!(out, "   |-TTL               : {}", ip.ttl())?;
        writeln!(
            out,
            "   |-Protocol          : {} ({})",
            ip.protocol_raw(),
            ip.protocol()
        )?;
        writeln!(
            out,
            "   |-Checksum          : 0x{:04x} ({})",
            ip.checksum(),
            if ip.verify_checksum() { "valid" } else { "invalid" }
        )?;
        writeln!(out, "   |-Source IP         : {}", ip.src_addr())?;
        writeln!(out, "   |-Destination IP    : {}", ip.dst_addr())?;
        if !ip.options().is_empty() {
            writeln!(out, "   |-Options           : {} bytes", ip.options().len())?;
        }
        Ok(())
    }

    fn write_tcp(&mut self, tcp: &TcpHeader<'_>) -> io::Result<()> {
        let out = &mut self.out;
        writeln!(out)?;
        writeln!(out, "TCP Header")?;
        writeln!(out, "   |-Source Port          : {}", tcp.src_port())?;
        writeln!(out, "   |-Destination Port     : {}", tcp.dst_port())?;
        writeln!(out, "   |-Sequence Number      : {}", tcp.sequence_number())?;
        writeln!(out, "   |-Acknowledge Number   : {}", tcp.ack_number())?;
        writeln!(
            out,
            "   |-Header Length        : {} DWORDS or {} BYTES",
            tcp.data_offset(),
            tcp.header_len()
        )?;
        writeln!(out, "   |-Urgent Flag          : {}", tcp.urg() as u8)?;
        writeln!(out, "   |-Acknowledgement Flag : {}", tcp.ack() as u8)?;
        writeln!(out, "   |-Push Flag            : {}", tcp.psh() as u8)?;
        writeln!(out, "   |-Reset Flag           : {}", tcp.rst() as u8)?;
        writeln!(out, "   |-Synchronise Flag     : {}", tcp.syn() as u8)?;
        writeln!(out, "   |-Finish Flag          : {}", tcp.fin() as u8)?;
        writeln!(out, "   |-Window               : {}", tcp.window_size())?;
        writeln!(out, "   |-Checksum             : 0x{:04x}", tcp.checksum())?;
        writeln!(out, "   |-Urgent Pointer       : {}", tcp.urgent_pointer())?;
        if !tcp.options().is_empty() {
            writeln!(out, "   |-Options              : {} bytes", tcp.options().len())?;
        }
        Ok(())
    }
}

impl<W: Write> FrameSink for TextSink<W> {
    fn report(
        &mut self,
        index: u64,
        frame: &Frame<'_>,
        resolved: &ResolvedFrame<'_>,
    ) -> io::Result<()> {
        if self.options.quiet {
            return Ok(());
        }
        match self.style {
            Style::Detail => self.write_detail(index, frame, resolved),
            Style::Summary => self.write_summary(index, frame, resolved),
        }
    }

    fn diagnostic(&mut self, index: u64, frame: &Frame<'_>, error: &DecodeError) -> io::Result<()> {
        writeln!(
            self.out,
            "#{:<6} {} [{} ERROR] {} bytes: {}",
            index,
            format_timestamp(frame.timestamp()),
            error.stage(),
            frame.len(),
            error
        )
    }

    fn finish(&mut self, stats: &CaptureStats) -> io::Result<()> {
        let rate = if stats.frames > 0 {
            stats.complete as f64 / stats.frames as f64 * 100.0
        } else {
            0.0
        };
        writeln!(self.out)?;
        writeln!(self.out, "{}", "=".repeat(50))?;
        writeln!(self.out, "Capture complete.")?;
        writeln!(self.out, "  Frames captured:   {}", stats.frames)?;
        writeln!(self.out, "  Fully decoded:     {}", stats.complete)?;
        writeln!(self.out, "  Decode errors:     {}", stats.decode_errors)?;
        writeln!(self.out, "  Empty reads:       {}", stats.empty_reads)?;
        writeln!(self.out, "  Success rate:      {:.1}%", rate)?;
        writeln!(self.out, "{}", "=".repeat(50))?;
        self.out.flush()
    }
}
