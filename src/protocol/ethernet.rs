//! Zero-copy Ethernet header view.
//!
//! An Ethernet II header has the following layout:
//!   - Destination MAC: 6 bytes
//!   - Source MAC:      6 bytes
//!   - EtherType:       2 bytes
//!
//! Total header size: 14 bytes. 802.1Q tags are not unwrapped; a tagged frame
//! reports EtherType 0x8100 and the chain stops there.

use super::{require, DecodeError, EtherType, Stage};
use std::fmt;

/// Ethernet header length (no VLAN tags)
pub const ETH_HEADER_LEN: usize = 14;

/// Ethernet header borrowing exactly the first 14 bytes of a frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EthernetHeader<'a> {
    data: &'a [u8],
}

impl<'a> EthernetHeader<'a> {
    /// Build the view over `frame[0..14]`.
    pub fn parse(frame: &'a [u8]) -> Result<Self, DecodeError> {
        require(frame, Stage::Ethernet, ETH_HEADER_LEN)?;
        Ok(EthernetHeader {
            data: &frame[..ETH_HEADER_LEN],
        })
    }

    /// Destination MAC address.
    #[inline]
    pub fn dst_mac(&self) -> [u8; 6] {
        [
            self.data[0],
            self.data[1],
            self.data[2],
            self.data[3],
            self.data[4],
            self.data[5],
        ]
    }

    /// Source MAC address.
    #[inline]
    pub fn src_mac(&self) -> [u8; 6] {
        [
            self.data[6],
            self.data[7],
            self.data[8],
            self.data[9],
            self.data[10],
            self.data[11],
        ]
    }

    /// EtherType field.
    #[inline]
    pub fn ether_type(&self) -> EtherType {
        EtherType::from(self.ether_type_raw())
    }

    /// Raw EtherType as u16.
    #[inline]
    pub fn ether_type_raw(&self) -> u16 {
        u16::from_be_bytes([self.data[12], self.data[13]])
    }

    #[inline]
    pub fn header_len(&self) -> usize {
        ETH_HEADER_LEN
    }

    /// The 14 header bytes this view covers.
    #[inline]
    pub fn as_bytes(&self) -> &'a [u8] {
        self.data
    }
}

/// Format a MAC address as XX:XX:XX:XX:XX:XX
pub fn format_mac(mac: &[u8; 6]) -> String {
    format!(
        "{:02X}:{:02X}:{:02X}:{:02X}:{:02X}:{:02X}",
        mac[0], mac[1], mac[2], mac[3], mac[4], mac[5]
    )
}

impl<'a> fmt::Display for EthernetHeader<'a> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} -> {} [{}]",
            format_mac(&self.src_mac()),
            format_mac(&self.dst_mac()),
            self.ether_type()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_valid_ethernet_frame() {
        let frame = [
            0xff, 0xff, 0xff, 0xff, 0xff, 0xff, // dst
            0x00, 0x11, 0x22, 0x33, 0x44, 0x55, // src
            0x08, 0x00, // EtherType = IPv4
            0x45, 0x00, 0x00, 0x00, // start of the next header
        ];

        let eth = EthernetHeader::parse(&frame).unwrap();
        assert_eq!(eth.dst_mac(), [0xff; 6]);
        assert_eq!(eth.src_mac(), [0x00, 0x11, 0x22, 0x33, 0x44, 0x55]);
        assert_eq!(eth.ether_type(), EtherType::Ipv4);
        assert_eq!(eth.ether_type_raw(), 0x0800);
        assert_eq!(eth.as_bytes().len(), ETH_HEADER_LEN);
    }

    #[test]
    fn reject_every_length_below_fourteen() {
        for len in 0..ETH_HEADER_LEN {
            let frame = vec![0u8; len];
            assert_eq!(
                EthernetHeader::parse(&frame),
                Err(DecodeError::TruncatedHeader {
                    stage: Stage::Ethernet,
                    expected: 14,
                    actual: len,
                })
            );
        }
    }

    #[test]
    fn ether_type_is_big_endian() {
        let mut frame = [0u8; 14];
        frame[12] = 0x86;
        frame[13] = 0xDD;
        let eth = EthernetHeader::parse(&frame).unwrap();
        assert_eq!(eth.ether_type(), EtherType::Ipv6);
        assert_eq!(eth.ether_type_raw(), 0x86DD);
    }

    #[test]
    fn format_mac_uses_uppercase_pairs() {
        assert_eq!(
            format_mac(&[0x00, 0x1b, 0x2c, 0x3d, 0x4e, 0x5f]),
            "00:1B:2C:3D:4E:5F"
        );
    }
}
