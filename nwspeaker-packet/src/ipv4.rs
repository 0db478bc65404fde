//! IPv4 packet construction and parsing
//!
//! Headers are always emitted without options (IHL = 5). Parsing tolerates
//! options on received packets and skips over them.

use crate::checksum::internet_checksum;
use bytes::BufMut;
use nwspeaker_core::{Error, Result};
use std::net::Ipv4Addr;

/// IPv4 version number
pub const VERSION: u8 = 4;

/// Default Time To Live for crafted packets
pub const DEFAULT_TTL: u8 = 255;

/// IP Protocol numbers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IpProtocol {
    /// ICMP (1)
    ICMP,
    /// TCP (6)
    TCP,
    /// UDP (17)
    UDP,
    /// Custom protocol number
    Custom(u8),
}

impl IpProtocol {
    pub fn to_u8(self) -> u8 {
        match self {
            IpProtocol::ICMP => 1,
            IpProtocol::TCP => 6,
            IpProtocol::UDP => 17,
            IpProtocol::Custom(val) => val,
        }
    }

    pub fn from_u8(value: u8) -> Self {
        match value {
            1 => IpProtocol::ICMP,
            6 => IpProtocol::TCP,
            17 => IpProtocol::UDP,
            val => IpProtocol::Custom(val),
        }
    }
}

/// The 3-bit flags field at the top of bytes 6-7
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct IpFlags(u8);

impl IpFlags {
    pub const NONE: IpFlags = IpFlags(0);
    pub const MORE_FRAGMENTS: IpFlags = IpFlags(0b001);
    pub const DONT_FRAGMENT: IpFlags = IpFlags(0b010);

    pub fn to_u8(self) -> u8 {
        self.0
    }

    /// Keeps the low three bits of `value`.
    pub fn from_u8(value: u8) -> Self {
        IpFlags(value & 0b111)
    }

    pub fn dont_fragment(self) -> bool {
        self.0 & Self::DONT_FRAGMENT.0 != 0
    }

    pub fn more_fragments(self) -> bool {
        self.0 & Self::MORE_FRAGMENTS.0 != 0
    }
}

impl std::ops::BitOr for IpFlags {
    type Output = IpFlags;

    fn bitor(self, rhs: IpFlags) -> IpFlags {
        IpFlags(self.0 | rhs.0)
    }
}

/// IPv4 header without options
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ipv4Header {
    /// Type of Service / DSCP
    pub tos: u8,
    /// Identification
    pub identification: u16,
    /// Flags
    pub flags: IpFlags,
    /// Fragment offset (in 8-byte blocks, 13 bits)
    pub fragment_offset: u16,
    /// Time to Live
    pub ttl: u8,
    /// Protocol
    pub protocol: IpProtocol,
    /// Header checksum as last encoded or parsed
    pub checksum: u16,
    /// Source IP address
    pub source: Ipv4Addr,
    /// Destination IP address
    pub destination: Ipv4Addr,
}

impl Ipv4Header {
    /// IPv4 header size without options
    pub const LEN: usize = 20;

    /// Header length in 32-bit words
    pub const IHL: u8 = (Self::LEN / 4) as u8;

    pub fn new(source: Ipv4Addr, destination: Ipv4Addr, protocol: IpProtocol) -> Self {
        Ipv4Header {
            tos: 0,
            identification: 0,
            flags: IpFlags::NONE,
            fragment_offset: 0,
            ttl: DEFAULT_TTL,
            protocol,
            checksum: 0,
            source,
            destination,
        }
    }

    /// Largest payload the 16-bit total length field can describe
    pub const MAX_PAYLOAD_LEN: usize = u16::MAX as usize - Self::LEN;

    /// Encode the header for a payload of `payload_len` bytes.
    ///
    /// The checksum is computed over the header with its checksum field
    /// zeroed and then written into bytes 10-11. Fails with
    /// [`Error::PayloadTooLarge`] above [`MAX_PAYLOAD_LEN`](Self::MAX_PAYLOAD_LEN).
    pub fn encode(&self, payload_len: usize) -> Result<[u8; Self::LEN]> {
        if payload_len > Self::MAX_PAYLOAD_LEN {
            return Err(Error::PayloadTooLarge {
                what: "IPv4",
                limit: Self::MAX_PAYLOAD_LEN,
                actual: payload_len,
            });
        }
        let total_length = (Self::LEN + payload_len) as u16;
        let fragment_offset = self.fragment_offset & 0x1FFF;

        let mut header = [0u8; Self::LEN];
        let mut buf = &mut header[..];
        buf.put_u8((VERSION << 4) | Self::IHL);
        buf.put_u8(self.tos);
        buf.put_u16(total_length);
        buf.put_u16(self.identification);
        buf.put_u8((self.flags.to_u8() << 5) | (fragment_offset >> 8) as u8);
        buf.put_u8(fragment_offset as u8);
        buf.put_u8(self.ttl);
        buf.put_u8(self.protocol.to_u8());
        buf.put_u16(0);
        buf.put_slice(&self.source.octets());
        buf.put_slice(&self.destination.octets());

        let checksum = internet_checksum(&header);
        header[10..12].copy_from_slice(&checksum.to_be_bytes());
        Ok(header)
    }
}

/// IPv4 header plus opaque payload
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ipv4Packet {
    pub header: Ipv4Header,
    pub payload: Vec<u8>,
}

impl Ipv4Packet {
    pub fn new(header: Ipv4Header, payload: Vec<u8>) -> Self {
        Ipv4Packet { header, payload }
    }

    /// Total length field value for this packet
    pub fn total_length(&self) -> usize {
        Ipv4Header::LEN + self.payload.len()
    }

    /// Header followed by the unmodified payload.
    pub fn encode(&self) -> Result<Vec<u8>> {
        let header = self.header.encode(self.payload.len())?;
        let mut buffer = Vec::with_capacity(self.total_length());
        buffer.put_slice(&header);
        buffer.put_slice(&self.payload);
        Ok(buffer)
    }

    /// Parse an IPv4 packet from bytes
    pub fn parse(data: &[u8]) -> Result<Self> {
        if data.len() < Ipv4Header::LEN {
            return Err(Error::TruncatedMessage {
                what: "IPv4",
                needed: Ipv4Header::LEN,
                actual: data.len(),
            });
        }

        let version = data[0] >> 4;
        let ihl = data[0] & 0x0F;
        if version != VERSION {
            return Err(Error::malformed(format!("IP version {} is not 4", version)));
        }
        if ihl < Ipv4Header::IHL {
            return Err(Error::malformed(format!("IPv4 header length {} below 5", ihl)));
        }

        let header_len = ihl as usize * 4;
        if data.len() < header_len {
            return Err(Error::TruncatedMessage {
                what: "IPv4",
                needed: header_len,
                actual: data.len(),
            });
        }

        let total_length = u16::from_be_bytes([data[2], data[3]]) as usize;
        let flags_and_offset = u16::from_be_bytes([data[6], data[7]]);

        let header = Ipv4Header {
            tos: data[1],
            identification: u16::from_be_bytes([data[4], data[5]]),
            flags: IpFlags::from_u8((flags_and_offset >> 13) as u8),
            fragment_offset: flags_and_offset & 0x1FFF,
            ttl: data[8],
            protocol: IpProtocol::from_u8(data[9]),
            checksum: u16::from_be_bytes([data[10], data[11]]),
            source: Ipv4Addr::new(data[12], data[13], data[14], data[15]),
            destination: Ipv4Addr::new(data[16], data[17], data[18], data[19]),
        };

        // Link-layer padding may follow the datagram.
        let end = total_length.clamp(header_len, data.len());
        let payload = data[header_len..end].to_vec();

        Ok(Ipv4Packet { header, payload })
    }
}
