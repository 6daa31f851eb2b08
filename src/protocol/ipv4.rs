//! Zero-copy IPv4 header view.
//!
//! IPv4 header layout (20-60 bytes):
//!   0                   1                   2                   3
//!   0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1
//!  +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
//!  |Version|  IHL  |Type of Service|          Total Length         |
//!  +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
//!  |         Identification        |Flags|      Fragment Offset    |
//!  +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
//!  |  Time to Live |    Protocol   |         Header Checksum       |
//!  +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
//!  |                       Source Address                          |
//!  +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
//!  |                    Destination Address                        |
//!  +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
//!  |                    Options                    |    Padding    |
//!  +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+

use super::{require, DecodeError, IpProtocol, Stage};
use std::fmt;
use std::net::Ipv4Addr;

/// Minimum IPv4 header length (no options)
pub const IPV4_MIN_HEADER_LEN: usize = 20;

/// Smallest legal IHL, in 32-bit words.
pub const IPV4_MIN_IHL: u8 = 5;

/// IPv4 header borrowing exactly `IHL * 4` bytes of the frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ipv4Header<'a> {
    data: &'a [u8],
    offset: usize,
}

impl<'a> Ipv4Header<'a> {
    /// Build the view for the IPv4 header starting at `frame[offset]`.
    ///
    /// The IHL is checked against its minimum before the length comparison,
    /// so a short IHL is reported as such however many bytes were captured.
    pub fn parse(frame: &'a [u8], offset: usize) -> Result<Self, DecodeError> {
        // IHL lives in the first byte; without it nothing can be said
        // beyond the minimum header size.
        if frame.len() <= offset {
            return Err(DecodeError::TruncatedHeader {
                stage: Stage::Ipv4,
                expected: offset + IPV4_MIN_HEADER_LEN,
                actual: frame.len(),
            });
        }

        let ihl = frame[offset] & 0x0F;
        if ihl < IPV4_MIN_IHL {
            return Err(DecodeError::InvalidHeaderLength {
                stage: Stage::Ipv4,
                declared_words: ihl,
            });
        }

        let header_len = ihl as usize * 4;
        require(frame, Stage::Ipv4, offset + header_len)?;

        let version = frame[offset] >> 4;
        if version != 4 {
            return Err(DecodeError::UnsupportedVersion { version });
        }

        Ok(Ipv4Header {
            data: &frame[offset..offset + header_len],
            offset,
        })
    }

    /// Byte offset of this header within the frame.
    #[inline]
    pub fn offset(&self) -> usize {
        self.offset
    }

    /// Offset of the first byte after the header.
    #[inline]
    pub fn end(&self) -> usize {
        self.offset + self.data.len()
    }

    /// IP version (always 4).
    #[inline]
    pub fn version(&self) -> u8 {
        self.data[0] >> 4
    }

    /// Internet Header Length in 32-bit words.
    #[inline]
    pub fn ihl(&self) -> u8 {
        self.data[0] & 0x0F
    }

    /// Header length in bytes.
    #[inline]
    pub fn header_len(&self) -> usize {
        self.data.len()
    }

    /// Type of Service / DSCP + ECN.
    #[inline]
    pub fn tos(&self) -> u8 {
        self.data[1]
    }

    #[inline]
    pub fn dscp(&self) -> u8 {
        self.data[1] >> 2
    }

    #[inline]
    pub fn ecn(&self) -> u8 {
        self.data[1] & 0x03
    }

    /// Total length of the IP packet (header + payload) in bytes.
    #[inline]
    pub fn total_length(&self) -> u16 {
        u16::from_be_bytes([self.data[2], self.data[3]])
    }

    #[inline]
    pub fn identification(&self) -> u16 {
        u16::from_be_bytes([self.data[4], self.data[5]])
    }

    /// Don't Fragment flag.
    #[inline]
    pub fn dont_fragment(&self) -> bool {
        (self.data[6] >> 6) & 1 == 1
    }

    /// More Fragments flag.
    #[inline]
    pub fn more_fragments(&self) -> bool {
        (self.data[6] >> 5) & 1 == 1
    }

    /// Fragment offset in 8-byte units.
    #[inline]
    pub fn fragment_offset(&self) -> u16 {
        u16::from_be_bytes([self.data[6] & 0x1F, self.data[7]])
    }

    #[inline]
    pub fn ttl(&self) -> u8 {
        self.data[8]
    }

    #[inline]
    pub fn protocol(&self) -> IpProtocol {
        IpProtocol::from(self.data[9])
    }

    #[inline]
    pub fn protocol_raw(&self) -> u8 {
        self.data[9]
    }

    /// Header checksum as transmitted.
    #[inline]
    pub fn checksum(&self) -> u16 {
        u16::from_be_bytes([self.data[10], self.data[11]])
    }

    #[inline]
    pub fn src_addr(&self) -> Ipv4Addr {
        Ipv4Addr::new(self.data[12], self.data[13], self.data[14], self.data[15])
    }

    #[inline]
    pub fn dst_addr(&self) -> Ipv4Addr {
        Ipv4Addr::new(self.data[16], self.data[17], self.data[18], self.data[19])
    }

    /// Options bytes (empty when IHL is 5).
    #[inline]
    pub fn options(&self) -> &'a [u8] {
        &self.data[IPV4_MIN_HEADER_LEN..]
    }

    /// Verify the header checksum.
    /// Returns true if the one's-complement sum over the header is 0xFFFF.
    pub fn verify_checksum(&self) -> bool {
        let mut sum: u32 = self
            .data
            .chunks_exact(2)
            .map(|word| u16::from_be_bytes([word[0], word[1]]) as u32)
            .sum();
        while sum >> 16 != 0 {
            sum = (sum & 0xFFFF) + (sum >> 16);
        }
        sum == 0xFFFF
    }
}

impl<'a> fmt::Display for Ipv4Header<'a> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} -> {} proto={} ttl={} len={}",
            self.src_addr(),
            self.dst_addr(),
            self.protocol(),
            self.ttl(),
            self.total_length()
        )
    }
}
