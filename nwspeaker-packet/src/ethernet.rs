//! Ethernet II header encoding and parsing
//!
//! Only the 14-byte header is modelled. The payload stays opaque and no
//! minimum-size padding is applied; the NIC pads short frames on transmit.

use bytes::BufMut;
use nwspeaker_core::{ethertypes, Error, MacAddr, Result};
use std::fmt;

/// EtherType values this tool crafts
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EtherType {
    /// IPv4 (0x0800)
    IPv4,
    /// ARP (0x0806)
    ARP,
    /// Any other EtherType, kept verbatim
    Other(u16),
}

impl EtherType {
    /// Convert EtherType to u16 value
    pub fn to_u16(self) -> u16 {
        match self {
            EtherType::IPv4 => ethertypes::IPV4,
            EtherType::ARP => ethertypes::ARP,
            EtherType::Other(val) => val,
        }
    }

    /// Create EtherType from u16 value
    pub fn from_u16(value: u16) -> Self {
        match value {
            ethertypes::IPV4 => EtherType::IPv4,
            ethertypes::ARP => EtherType::ARP,
            val => EtherType::Other(val),
        }
    }
}

impl From<u16> for EtherType {
    fn from(value: u16) -> Self {
        EtherType::from_u16(value)
    }
}

impl fmt::Display for EtherType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EtherType::IPv4 => write!(f, "IPv4"),
            EtherType::ARP => write!(f, "ARP"),
            EtherType::Other(val) => write!(f, "0x{:04X}", val),
        }
    }
}

/// Ethernet II header
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EthernetHeader {
    /// Destination MAC address
    pub destination: MacAddr,
    /// Source MAC address
    pub source: MacAddr,
    /// EtherType
    pub ethertype: EtherType,
}

impl EthernetHeader {
    /// Ethernet header size (dst + src + type)
    pub const LEN: usize = 14;

    pub fn new(destination: MacAddr, source: MacAddr, ethertype: EtherType) -> Self {
        EthernetHeader {
            destination,
            source,
            ethertype,
        }
    }

    /// Encode the header as destination, source, type.
    pub fn encode(&self) -> [u8; Self::LEN] {
        let mut buffer = [0u8; Self::LEN];
        buffer[0..6].copy_from_slice(self.destination.as_bytes());
        buffer[6..12].copy_from_slice(self.source.as_bytes());
        buffer[12..14].copy_from_slice(&self.ethertype.to_u16().to_be_bytes());
        buffer
    }

    /// Split a frame into its header and the bytes following it.
    pub fn parse(frame: &[u8]) -> Result<(Self, &[u8])> {
        if frame.len() < Self::LEN {
            return Err(Error::TruncatedFrame {
                needed: Self::LEN,
                actual: frame.len(),
            });
        }

        let mut destination = [0u8; 6];
        destination.copy_from_slice(&frame[0..6]);
        let mut source = [0u8; 6];
        source.copy_from_slice(&frame[6..12]);
        let ethertype = u16::from_be_bytes([frame[12], frame[13]]);

        let header = EthernetHeader {
            destination: MacAddr(destination),
            source: MacAddr(source),
            ethertype: EtherType::from_u16(ethertype),
        };

        Ok((header, &frame[Self::LEN..]))
    }
}

/// Prepend the encoded header to `payload`.
pub fn frame(header: &EthernetHeader, payload: &[u8]) -> Vec<u8> {
    let mut buffer = Vec::with_capacity(EthernetHeader::LEN + payload.len());
    buffer.put_slice(&header.encode());
    buffer.put_slice(payload);
    buffer
}
