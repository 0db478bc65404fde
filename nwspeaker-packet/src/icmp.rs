//! ICMP message structures
//!
//! Echo and Echo Reply are the only types given a structured body; anything
//! else is carried as raw bytes after the 4-byte header.

use bytes::BufMut;
use nwspeaker_core::{Error, Result};
use std::fmt;
use std::time::{SystemTime, UNIX_EPOCH};

use crate::checksum::internet_checksum;

/// Filler used when the caller supplies no echo data
pub const DEFAULT_ECHO_DATA: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ";

/// ICMP Message Types
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IcmpType {
    EchoReply,
    Echo,
    Other(u8),
}

impl IcmpType {
    pub fn to_u8(self) -> u8 {
        match self {
            IcmpType::EchoReply => 0,
            IcmpType::Echo => 8,
            IcmpType::Other(val) => val,
        }
    }

    pub fn from_u8(value: u8) -> Self {
        match value {
            0 => IcmpType::EchoReply,
            8 => IcmpType::Echo,
            val => IcmpType::Other(val),
        }
    }

    /// Types this tool can craft, in listing order
    pub fn supported() -> &'static [IcmpType] {
        &[IcmpType::Echo, IcmpType::EchoReply]
    }

    fn is_echo(self) -> bool {
        matches!(self, IcmpType::Echo | IcmpType::EchoReply)
    }
}

impl fmt::Display for IcmpType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IcmpType::EchoReply => write!(f, "Echo Reply"),
            IcmpType::Echo => write!(f, "Echo Request"),
            IcmpType::Other(val) => write!(f, "Type {}", val),
        }
    }
}

/// Where the echo identifier comes from.
///
/// Uniqueness is best effort in every case.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum IdentifierSource {
    /// A random 16-bit value
    #[default]
    Random,
    /// Low 16 bits of the current Unix time in seconds
    Clock,
    /// A caller-chosen value
    Fixed(u16),
}

impl IdentifierSource {
    pub fn next(self) -> u16 {
        match self {
            IdentifierSource::Random => rand::random::<u16>(),
            IdentifierSource::Clock => SystemTime::now()
                .duration_since(UNIX_EPOCH)
                .map(|d| d.as_secs() as u16)
                .unwrap_or(0),
            IdentifierSource::Fixed(id) => id,
        }
    }
}

/// Body of Echo and Echo Reply messages
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EchoPayload {
    pub identifier: u16,
    pub sequence: u16,
    pub data: Vec<u8>,
}

impl EchoPayload {
    /// Identifier and sequence number
    pub const HEADER_LEN: usize = 4;

    pub fn encode(&self) -> Vec<u8> {
        let mut buf = Vec::with_capacity(Self::HEADER_LEN + self.data.len());
        buf.put_u16(self.identifier);
        buf.put_u16(self.sequence);
        buf.put_slice(&self.data);
        buf
    }

    pub fn decode(data: &[u8]) -> Result<Self> {
        if data.len() < Self::HEADER_LEN {
            return Err(Error::TruncatedMessage {
                what: "ICMP echo",
                needed: IcmpMessage::HEADER_LEN + Self::HEADER_LEN,
                actual: IcmpMessage::HEADER_LEN + data.len(),
            });
        }
        Ok(EchoPayload {
            identifier: u16::from_be_bytes([data[0], data[1]]),
            sequence: u16::from_be_bytes([data[2], data[3]]),
            data: data[Self::HEADER_LEN..].to_vec(),
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IcmpPayload {
    Echo(EchoPayload),
    Raw(Vec<u8>),
}

impl IcmpPayload {
    pub fn encode(&self) -> Vec<u8> {
        match self {
            IcmpPayload::Echo(echo) => echo.encode(),
            IcmpPayload::Raw(bytes) => bytes.clone(),
        }
    }
}

/// ICMP message
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IcmpMessage {
    pub icmp_type: IcmpType,
    pub code: u8,
    /// Checksum as last parsed; recomputed on every encode
    pub checksum: u16,
    pub payload: IcmpPayload,
}

impl IcmpMessage {
    /// Type, code and checksum
    pub const HEADER_LEN: usize = 4;

    /// Serialize with the checksum computed over the whole message.
    pub fn encode(&self) -> Vec<u8> {
        let body = self.payload.encode();
        let mut buf = Vec::with_capacity(Self::HEADER_LEN + body.len());
        buf.put_u8(self.icmp_type.to_u8());
        buf.put_u8(self.code);
        buf.put_u16(0);
        buf.put_slice(&body);

        let checksum = internet_checksum(&buf);
        buf[2..4].copy_from_slice(&checksum.to_be_bytes());
        buf
    }

    /// Parse ICMP message from bytes
    pub fn parse(data: &[u8]) -> Result<Self> {
        if data.len() < Self::HEADER_LEN {
            return Err(Error::TruncatedMessage {
                what: "ICMP",
                needed: Self::HEADER_LEN,
                actual: data.len(),
            });
        }

        let icmp_type = IcmpType::from_u8(data[0]);
        let body = &data[Self::HEADER_LEN..];
        let payload = if icmp_type.is_echo() {
            IcmpPayload::Echo(EchoPayload::decode(body)?)
        } else {
            IcmpPayload::Raw(body.to_vec())
        };

        Ok(IcmpMessage {
            icmp_type,
            code: data[1],
            checksum: u16::from_be_bytes([data[2], data[3]]),
            payload,
        })
    }

    pub fn echo(&self) -> Option<&EchoPayload> {
        match &self.payload {
            IcmpPayload::Echo(echo) => Some(echo),
            IcmpPayload::Raw(_) => None,
        }
    }

    /// Whether `self` is the echo reply answering `request`
    pub fn answers(&self, request: &IcmpMessage) -> bool {
        match (self.icmp_type, self.echo(), request.echo()) {
            (IcmpType::EchoReply, Some(reply), Some(req)) => {
                reply.identifier == req.identifier && reply.sequence == req.sequence
            }
            _ => false,
        }
    }
}

/// Build an Echo request with sequence number 0.
///
/// Empty `data_override` selects [`DEFAULT_ECHO_DATA`].
pub fn build_echo(identifier_source: IdentifierSource, data_override: &[u8]) -> IcmpMessage {
    let data = if data_override.is_empty() {
        DEFAULT_ECHO_DATA.to_vec()
    } else {
        data_override.to_vec()
    };

    IcmpMessage {
        icmp_type: IcmpType::Echo,
        code: 0,
        checksum: 0,
        payload: IcmpPayload::Echo(EchoPayload {
            identifier: identifier_source.next(),
            sequence: 0,
            data,
        }),
    }
}
