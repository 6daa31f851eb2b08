//! Header chain resolver.
//!
//! Walks Ethernet → IPv4 → TCP, anchoring each header at the end of the one
//! before it. Only an Ethernet failure leaves nothing to show; a later
//! failure keeps the headers already resolved and records the error.

use super::ethernet::{EthernetHeader, ETH_HEADER_LEN};
use super::ipv4::Ipv4Header;
use super::tcp::TcpHeader;
use super::{DecodeError, EtherType, IpProtocol, Stage};

/// Headers resolved from one frame, all borrowing from it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResolvedFrame<'a> {
    pub ethernet: EthernetHeader<'a>,
    pub ipv4: Option<Ipv4Header<'a>>,
    pub tcp: Option<TcpHeader<'a>>,
    /// Why resolution stopped before the chain was exhausted.
    pub error: Option<DecodeError>,
    payload: &'a [u8],
}

impl<'a> ResolvedFrame<'a> {
    /// Bytes following the last resolved header.
    ///
    /// Once an IPv4 header is known the payload ends at its total length,
    /// so Ethernet padding and trailers are excluded.
    #[inline]
    pub fn payload(&self) -> &'a [u8] {
        self.payload
    }

    /// True when no stage failed.
    #[inline]
    pub fn is_complete(&self) -> bool {
        self.error.is_none()
    }

    /// Deepest stage that produced a view.
    pub fn last_stage(&self) -> Stage {
        if self.tcp.is_some() {
            Stage::Tcp
        } else if self.ipv4.is_some() {
            Stage::Ipv4
        } else {
            Stage::Ethernet
        }
    }

    /// Combined length of the resolved headers in bytes.
    pub fn headers_len(&self) -> usize {
        match (&self.ipv4, &self.tcp) {
            (_, Some(tcp)) => tcp.end(),
            (Some(ip), None) => ip.end(),
            (None, None) => ETH_HEADER_LEN,
        }
    }
}

/// Resolve the header chain of one captured frame.
///
/// Returns `Err` only when the Ethernet header itself does not fit.
pub fn resolve(frame: &[u8]) -> Result<ResolvedFrame<'_>, DecodeError> {
    let ethernet = EthernetHeader::parse(frame)?;

    let mut resolved = ResolvedFrame {
        ethernet,
        ipv4: None,
        tcp: None,
        error: None,
        payload: &frame[ETH_HEADER_LEN..],
    };

    if ethernet.ether_type() != EtherType::Ipv4 {
        return Ok(resolved);
    }

    let ip = match Ipv4Header::parse(frame, ETH_HEADER_LEN) {
        Ok(ip) => ip,
        Err(e) => {
            resolved.error = Some(e);
            return Ok(resolved);
        }
    };
    resolved.ipv4 = Some(ip);

    // Total length can claim more than was captured, or less than the
    // headers when the sender lies; clamp to both.
    let datagram_end = (ip.offset() + ip.total_length() as usize).min(frame.len());
    resolved.payload = slice_between(frame, ip.end(), datagram_end);

    if ip.protocol() != IpProtocol::Tcp {
        return Ok(resolved);
    }

    match TcpHeader::parse(frame, ip.end()) {
        Ok(tcp) => {
            resolved.tcp = Some(tcp);
            resolved.payload = slice_between(frame, tcp.end(), datagram_end);
        }
        Err(e) => resolved.error = Some(e),
    }

    Ok(resolved)
}

fn slice_between(frame: &[u8], start: usize, end: usize) -> &[u8] {
    if end <= start {
        &frame[start..start]
    } else {
        &frame[start..end]
    }
}
