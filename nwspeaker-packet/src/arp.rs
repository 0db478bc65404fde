//! ARP message structure and parsing
//!
//! Only the Ethernet/IPv4 flavour is supported: hardware addresses are six
//! bytes and protocol addresses four, giving a fixed 28-byte body.

use bytes::BufMut;
use nwspeaker_core::{ethertypes, parse_ipv4, Error, MacAddr, Result};
use std::net::Ipv4Addr;

use crate::ethernet::{EtherType, EthernetHeader};

/// Hardware types
pub const HTYPE_ETHERNET: u16 = 1;

/// Protocol types
pub const PTYPE_IPV4: u16 = ethertypes::IPV4;

/// ARP Operation Codes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArpOperation {
    /// ARP Request
    Request,
    /// ARP Reply
    Reply,
    /// Anything else seen on the wire
    Other(u16),
}

impl ArpOperation {
    pub fn to_u16(self) -> u16 {
        match self {
            ArpOperation::Request => 1,
            ArpOperation::Reply => 2,
            ArpOperation::Other(val) => val,
        }
    }

    pub fn from_u16(val: u16) -> Self {
        match val {
            1 => ArpOperation::Request,
            2 => ArpOperation::Reply,
            val => ArpOperation::Other(val),
        }
    }
}

/// ARP message
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArpMessage {
    /// Hardware type (1 for Ethernet)
    pub htype: u16,
    /// Protocol type (0x0800 for IPv4)
    pub ptype: u16,
    /// Hardware address length (6 for MAC)
    pub hlen: u8,
    /// Protocol address length (4 for IPv4)
    pub plen: u8,
    /// Operation
    pub operation: ArpOperation,
    /// Sender hardware address (MAC)
    pub sender_hw_addr: MacAddr,
    /// Sender protocol address (IP)
    pub sender_proto_addr: Ipv4Addr,
    /// Target hardware address (MAC)
    pub target_hw_addr: MacAddr,
    /// Target protocol address (IP)
    pub target_proto_addr: Ipv4Addr,
}

impl ArpMessage {
    /// Length of an Ethernet/IPv4 ARP body
    pub const LEN: usize = 28;

    fn with_operation(
        operation: ArpOperation,
        target_hw_addr: MacAddr,
        target_proto_addr: Ipv4Addr,
    ) -> Self {
        Self {
            htype: HTYPE_ETHERNET,
            ptype: PTYPE_IPV4,
            hlen: MacAddr::LEN as u8,
            plen: 4,
            operation,
            sender_hw_addr: MacAddr::ZERO,
            sender_proto_addr: Ipv4Addr::UNSPECIFIED,
            target_hw_addr,
            target_proto_addr,
        }
    }

    /// Fill the sender fields, normally from the outbound interface.
    pub fn with_sender(mut self, mac: MacAddr, ip: Ipv4Addr) -> Self {
        self.sender_hw_addr = mac;
        self.sender_proto_addr = ip;
        self
    }

    /// Encode the 28-byte body at fixed offsets.
    pub fn encode(&self) -> [u8; Self::LEN] {
        let mut out = [0u8; Self::LEN];
        let mut buf = &mut out[..];

        buf.put_u16(self.htype);
        buf.put_u16(self.ptype);
        buf.put_u8(self.hlen);
        buf.put_u8(self.plen);
        buf.put_u16(self.operation.to_u16());
        buf.put_slice(self.sender_hw_addr.as_bytes());
        buf.put_slice(&self.sender_proto_addr.octets());
        buf.put_slice(self.target_hw_addr.as_bytes());
        buf.put_slice(&self.target_proto_addr.octets());
        out
    }

    /// Parse an ARP message out of a full Ethernet frame.
    pub fn parse(frame: &[u8]) -> Result<Self> {
        let (_, body) = EthernetHeader::parse(frame)?;
        Self::decode(body)
    }

    /// Decode a bare ARP body (Ethernet header already removed).
    pub fn decode(data: &[u8]) -> Result<Self> {
        if data.len() < Self::LEN {
            return Err(Error::TruncatedMessage {
                what: "ARP",
                needed: Self::LEN,
                actual: data.len(),
            });
        }

        let be16 = |at: usize| u16::from_be_bytes([data[at], data[at + 1]]);
        let ipv4 = |at: usize| Ipv4Addr::new(data[at], data[at + 1], data[at + 2], data[at + 3]);
        let mac = |at: usize| {
            MacAddr::from_slice(&data[at..at + MacAddr::LEN]).unwrap_or_default()
        };

        Ok(Self {
            htype: be16(0),
            ptype: be16(2),
            hlen: data[4],
            plen: data[5],
            operation: ArpOperation::from_u16(be16(6)),
            sender_hw_addr: mac(8),
            sender_proto_addr: ipv4(14),
            target_hw_addr: mac(18),
            target_proto_addr: ipv4(24),
        })
    }

    /// Operation is 1
    pub fn is_request(&self) -> bool {
        self.operation == ArpOperation::Request
    }

    /// Operation is 2
    pub fn is_reply(&self) -> bool {
        self.operation == ArpOperation::Reply
    }

    /// EtherType to carry this message under
    pub fn ethertype(&self) -> EtherType {
        EtherType::ARP
    }
}

/// Build a request asking who owns `target_ip`.
///
/// The target hardware address is all zeros; sender fields are left for the
/// caller to fill with [`ArpMessage::with_sender`].
pub fn build_request(target_ip: &str) -> Result<ArpMessage> {
    let target = parse_ipv4(target_ip)?;
    Ok(ArpMessage::with_operation(
        ArpOperation::Request,
        MacAddr::ZERO,
        target,
    ))
}

/// Build a reply addressed to `target_mac`/`target_ip`.
pub fn build_reply(target_mac: &str, target_ip: &str) -> Result<ArpMessage> {
    let mac: MacAddr = target_mac.parse()?;
    let ip = parse_ipv4(target_ip)?;
    Ok(ArpMessage::with_operation(ArpOperation::Reply, mac, ip))
}

#[cfg(test)]
mod tests {
    use super::*;
    use nwspeaker_core::AddressKind;

    #[test]
    fn test_build_request() {
        let msg = build_request("192.168.0.1").unwrap();

        assert_eq!(msg.htype, HTYPE_ETHERNET);
        assert_eq!(msg.ptype, PTYPE_IPV4);
        assert_eq!(msg.hlen, 6);
        assert_eq!(msg.plen, 4);
        assert_eq!(msg.operation, ArpOperation::Request);
        assert_eq!(msg.target_hw_addr, MacAddr::ZERO);
        assert_eq!(msg.target_proto_addr, Ipv4Addr::new(192, 168, 0, 1));
        assert!(msg.is_request());
    }

    #[test]
    fn test_build_request_invalid() {
        for input in ["", "192.168.0", "fe80::1", "not-an-ip", "256.0.0.1"] {
            match build_request(input) {
                Err(Error::InvalidAddress { kind, .. }) => assert_eq!(kind, AddressKind::Ipv4),
                other => panic!("expected InvalidAddress for {:?}, got {:?}", input, other),
            }
        }
    }

    #[test]
    fn test_build_reply() {
        let msg = build_reply("aa:bb:cc:dd:ee:ff", "10.0.0.2").unwrap();
        assert!(msg.is_reply());
        assert_eq!(msg.target_hw_addr, MacAddr([0xaa, 0xbb, 0xcc, 0xdd, 0xee, 0xff]));
        assert_eq!(msg.target_proto_addr, Ipv4Addr::new(10, 0, 0, 2));
    }

    #[test]
    fn test_build_reply_invalid() {
        assert!(matches!(
            build_reply("aa:bb:cc", "10.0.0.2"),
            Err(Error::InvalidAddress { kind: AddressKind::Mac, .. })
        ));
        assert!(matches!(
            build_reply("aa:bb:cc:dd:ee:ff", "10.0.0"),
            Err(Error::InvalidAddress { kind: AddressKind::Ipv4, .. })
        ));
        assert!(matches!(
            build_reply("+a:+b:+c:+d:+e:+f", "10.0.0.1"),
            Err(Error::InvalidAddress { kind: AddressKind::Mac, .. })
        ));
        assert!(matches!(
            build_reply("aa:bb:cc:dd:ee:ff", " 10.0.0.1"),
            Err(Error::InvalidAddress { kind: AddressKind::Ipv4, .. })
        ));
    }

    #[test]
    fn test_encode_request_bytes() {
        let msg = build_request("192.168.0.1").unwrap().with_sender(
            MacAddr([0x11, 0x22, 0x33, 0x44, 0x55, 0x66]),
            Ipv4Addr::new(192, 168, 1, 0),
        );

        assert_eq!(
            msg.encode(),
            [
                0x00, 0x01, 0x08, 0x00, 0x06, 0x04, 0x00, 0x01, 0x11, 0x22, 0x33, 0x44, 0x55,
                0x66, 0xc0, 0xa8, 0x01, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0xc0, 0xa8,
                0x00, 0x01,
            ]
        );
    }

    #[test]
    fn test_parse_request_and_reply_frames() {
        let mut frame = vec![
            0xaa, 0xbb, 0xcc, 0xdd, 0xee, 0xff, 0x11, 0x22, 0x33, 0x44, 0x55, 0x66, 0x08, 0x06,
            0x00, 0x01, 0x08, 0x00, 0x06, 0x04, 0x00, 0x01, 0x11, 0x22, 0x33, 0x44, 0x55, 0x66,
            0xc0, 0xa8, 0x01, 0x00, 0xaa, 0xbb, 0xcc, 0xdd, 0xee, 0xff, 0xc0, 0xa8, 0x00, 0x01,
        ];
        assert_eq!(frame.len(), 42);

        let request = ArpMessage::parse(&frame).unwrap();
        assert_eq!(request.operation, ArpOperation::Request);

        frame[21] = 0x02;
        let reply = ArpMessage::parse(&frame).unwrap();
        assert_eq!(reply.operation, ArpOperation::Reply);

        for msg in [&request, &reply] {
            assert_eq!(msg.htype, HTYPE_ETHERNET);
            assert_eq!(msg.ptype, PTYPE_IPV4);
            assert_eq!(msg.hlen, 6);
            assert_eq!(msg.plen, 4);
            assert_eq!(msg.sender_hw_addr, MacAddr([0x11, 0x22, 0x33, 0x44, 0x55, 0x66]));
            assert_eq!(msg.sender_proto_addr, Ipv4Addr::new(192, 168, 1, 0));
            assert_eq!(msg.target_hw_addr, MacAddr([0xaa, 0xbb, 0xcc, 0xdd, 0xee, 0xff]));
            assert_eq!(msg.target_proto_addr, Ipv4Addr::new(192, 168, 0, 1));
        }
    }

    #[test]
    fn test_parse_unknown_operation_is_kept() {
        let mut body = build_request("10.0.0.1").unwrap().encode();
        body[7] = 0x03;
        let msg = ArpMessage::decode(&body).unwrap();
        assert_eq!(msg.operation, ArpOperation::Other(3));
        assert_eq!(msg.encode(), body);
    }

    #[test]
    fn test_parse_truncated_frame() {
        assert!(matches!(
            ArpMessage::parse(&[0u8; 10]),
            Err(Error::TruncatedFrame { .. })
        ));
    }

    #[test]
    fn test_parse_truncated_message() {
        match ArpMessage::parse(&[0u8; 14 + 27]) {
            Err(Error::TruncatedMessage { what, needed, actual }) => {
                assert_eq!(what, "ARP");
                assert_eq!(needed, 28);
                assert_eq!(actual, 27);
            }
            other => panic!("expected TruncatedMessage, got {:?}", other),
        }
    }
}
