//! Zero-copy TCP header view.
//!
//! TCP header layout (20-60 bytes):
//!   0                   1                   2                   3
//!   0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1
//!  +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
//!  |          Source Port          |       Destination Port        |
//!  +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
//!  |                        Sequence Number                       |
//!  +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
//!  |                    Acknowledgment Number                     |
//!  +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
//!  |  Data |           |U|A|P|R|S|F|                               |
//!  | Offset| Reserved  |R|C|S|S|Y|I|            Window             |
//!  |       |           |G|K|H|T|N|N|                               |
//!  +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
//!  |           Checksum            |         Urgent Pointer        |
//!  +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
//!  |                    Options                    |    Padding    |
//!  +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+

use super::{require, DecodeError, Stage};
use std::fmt;

/// Minimum TCP header length (no options)
pub const TCP_MIN_HEADER_LEN: usize = 20;

/// Smallest legal data offset, in 32-bit words.
pub const TCP_MIN_DOFF: u8 = 5;

/// Byte holding the data offset nibble.
const DOFF_BYTE: usize = 12;

/// TCP flags bitmask constants
pub mod flags {
    pub const FIN: u8 = 0x01;
    pub const SYN: u8 = 0x02;
    pub const RST: u8 = 0x04;
    pub const PSH: u8 = 0x08;
    pub const ACK: u8 = 0x10;
    pub const URG: u8 = 0x20;
    pub const ECE: u8 = 0x40;
    pub const CWR: u8 = 0x80;
}

/// TCP header borrowing exactly `DOFF * 4` bytes of the frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TcpHeader<'a> {
    data: &'a [u8],
    offset: usize,
}

impl<'a> TcpHeader<'a> {
    /// Build the view for the TCP header starting at `frame[offset]`.
    pub fn parse(frame: &'a [u8], offset: usize) -> Result<Self, DecodeError> {
        if frame.len() <= offset + DOFF_BYTE {
            return Err(DecodeError::TruncatedHeader {
                stage: Stage::Tcp,
                expected: offset + TCP_MIN_HEADER_LEN,
                actual: frame.len(),
            });
        }

        let doff = frame[offset + DOFF_BYTE] >> 4;
        if doff < TCP_MIN_DOFF {
            return Err(DecodeError::InvalidHeaderLength {
                stage: Stage::Tcp,
                declared_words: doff,
            });
        }

        let header_len = doff as usize * 4;
        require(frame, Stage::Tcp, offset + header_len)?;

        Ok(TcpHeader {
            data: &frame[offset..offset + header_len],
            offset,
        })
    }

    /// Byte offset of this header within the frame.
    #[inline]
    pub fn offset(&self) -> usize {
        self.offset
    }

    /// Offset of the first payload byte.
    #[inline]
    pub fn end(&self) -> usize {
        self.offset + self.data.len()
    }

    #[inline]
    pub fn src_port(&self) -> u16 {
        u16::from_be_bytes([self.data[0], self.data[1]])
    }

    #[inline]
    pub fn dst_port(&self) -> u16 {
        u16::from_be_bytes([self.data[2], self.data[3]])
    }

    #[inline]
    pub fn sequence_number(&self) -> u32 {
        u32::from_be_bytes([self.data[4], self.data[5], self.data[6], self.data[7]])
    }

    #[inline]
    pub fn ack_number(&self) -> u32 {
        u32::from_be_bytes([self.data[8], self.data[9], self.data[10], self.data[11]])
    }

    /// Data offset in 32-bit words.
    #[inline]
    pub fn data_offset(&self) -> u8 {
        self.data[DOFF_BYTE] >> 4
    }

    /// Header length in bytes.
    #[inline]
    pub fn header_len(&self) -> usize {
        self.data.len()
    }

    /// Raw flags byte.
    #[inline]
    pub fn flags_raw(&self) -> u8 {
        self.data[13]
    }

    #[inline]
    pub fn fin(&self) -> bool {
        self.data[13] & flags::FIN != 0
    }

    #[inline]
    pub fn syn(&self) -> bool {
        self.data[13] & flags::SYN != 0
    }

    #[inline]
    pub fn rst(&self) -> bool {
        self.data[13] & flags::RST != 0
    }

    #[inline]
    pub fn psh(&self) -> bool {
        self.data[13] & flags::PSH != 0
    }

    #[inline]
    pub fn ack(&self) -> bool {
        self.data[13] & flags::ACK != 0
    }

    #[inline]
    pub fn urg(&self) -> bool {
        self.data[13] & flags::URG != 0
    }

    /// Format flags as a string like "[SYN, ACK]".
    pub fn flags_string(&self) -> String {
        let named = [
            (self.syn(), "SYN"),
            (self.ack(), "ACK"),
            (self.fin(), "FIN"),
            (self.rst(), "RST"),
            (self.psh(), "PSH"),
            (self.urg(), "URG"),
        ];
        let parts: Vec<&str> = named
            .iter()
            .filter(|(set, _)| *set)
            .map(|(_, name)| *name)
            .collect();
        format!("[{}]", parts.join(", "))
    }

    #[inline]
    pub fn window_size(&self) -> u16 {
        u16::from_be_bytes([self.data[14], self.data[15]])
    }

    #[inline]
    pub fn checksum(&self) -> u16 {
        u16::from_be_bytes([self.data[16], self.data[17]])
    }

    #[inline]
    pub fn urgent_pointer(&self) -> u16 {
        u16::from_be_bytes([self.data[18], self.data[19]])
    }

    /// TCP options bytes (empty when DOFF is 5).
    #[inline]
    pub fn options(&self) -> &'a [u8] {
        &self.data[TCP_MIN_HEADER_LEN..]
    }
}

impl<'a> fmt::Display for TcpHeader<'a> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            ":{} -> :{} {} seq={} ack={} win={}",
            self.src_port(),
            self.dst_port(),
            self.flags_string(),
            self.sequence_number(),
            self.ack_number(),
            self.window_size()
        )
    }
}
