//! Zero-copy header views and the Ethernet → IPv4 → TCP chain resolver.
//!
//! Every view borrows an exact window of the captured frame. The window is
//! validated once, when the view is built; accessors after that point only
//! decode fields.

pub mod chain;
pub mod ethernet;
pub mod ipv4;
pub mod tcp;

pub use chain::{resolve, ResolvedFrame};

use serde::Serialize;
use std::fmt;
use thiserror::Error;

/// EtherType constants
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EtherType {
    Ipv4,
    Ipv6,
    Arp,
    VlanTagged,
    Unknown(u16),
}

impl From<u16> for EtherType {
    fn from(value: u16) -> Self {
        match value {
            0x0800 => EtherType::Ipv4,
            0x86DD => EtherType::Ipv6,
            0x0806 => EtherType::Arp,
            0x8100 => EtherType::VlanTagged,
            other => EtherType::Unknown(other),
        }
    }
}

impl EtherType {
    pub fn as_u16(&self) -> u16 {
        match self {
            EtherType::Ipv4 => 0x0800,
            EtherType::Ipv6 => 0x86DD,
            EtherType::Arp => 0x0806,
            EtherType::VlanTagged => 0x8100,
            EtherType::Unknown(v) => *v,
        }
    }
}

impl fmt::Display for EtherType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EtherType::Ipv4 => write!(f, "IPv4"),
            EtherType::Ipv6 => write!(f, "IPv6"),
            EtherType::Arp => write!(f, "ARP"),
            EtherType::VlanTagged => write!(f, "802.1Q VLAN"),
            EtherType::Unknown(v) => write!(f, "Unknown(0x{:04x})", v),
        }
    }
}

/// IP protocol numbers. Only TCP is dissected; the rest are named for display.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IpProtocol {
    Icmp,
    Tcp,
    Udp,
    Unknown(u8),
}

impl From<u8> for IpProtocol {
    fn from(value: u8) -> Self {
        match value {
            1 => IpProtocol::Icmp,
            6 => IpProtocol::Tcp,
            17 => IpProtocol::Udp,
            other => IpProtocol::Unknown(other),
        }
    }
}

impl fmt::Display for IpProtocol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IpProtocol::Icmp => write!(f, "ICMP"),
            IpProtocol::Tcp => write!(f, "TCP"),
            IpProtocol::Udp => write!(f, "UDP"),
            IpProtocol::Unknown(v) => write!(f, "Proto({})", v),
        }
    }
}

/// Position in the header chain a decode error was raised at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Stage {
    Ethernet,
    Ipv4,
    Tcp,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Stage::Ethernet => write!(f, "Ethernet"),
            Stage::Ipv4 => write!(f, "IPv4"),
            Stage::Tcp => write!(f, "TCP"),
        }
    }
}

/// Per-frame decode failure.
///
/// Byte counts are absolute frame lengths: `expected` is the number of bytes
/// the frame must hold for the header to fit, `actual` is the captured length.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DecodeError {
    #[error("{stage} header truncated: need {expected} bytes, got {actual}")]
    TruncatedHeader {
        stage: Stage,
        expected: usize,
        actual: usize,
    },

    #[error("{stage} header length {declared_words} words is below the minimum of 5")]
    InvalidHeaderLength { stage: Stage, declared_words: u8 },

    #[error("IPv4 header carries version {version}")]
    UnsupportedVersion { version: u8 },
}

impl DecodeError {
    /// The header stage that failed.
    pub fn stage(&self) -> Stage {
        match self {
            DecodeError::TruncatedHeader { stage, .. } => *stage,
            DecodeError::InvalidHeaderLength { stage, .. } => *stage,
            DecodeError::UnsupportedVersion { .. } => Stage::Ipv4,
        }
    }
}

/// Fail with `TruncatedHeader` unless `frame` holds at least `end` bytes.
#[inline]
pub(crate) fn require(frame: &[u8], stage: Stage, end: usize) -> Result<(), DecodeError> {
    if frame.len() < end {
        return Err(DecodeError::TruncatedHeader {
            stage,
            expected: end,
            actual: frame.len(),
        });
    }
    Ok(())
}
