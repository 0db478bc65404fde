//! Closed set of bodies that can ride inside a crafted frame

use crate::arp::ArpMessage;
use crate::ethernet::{self, EtherType, EthernetHeader};
use crate::icmp::IcmpMessage;
use crate::ipv4::Ipv4Packet;
use nwspeaker_core::{Error, MacAddr, Result};

/// A protocol body ready to be encoded
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Payload {
    Arp(ArpMessage),
    Ipv4(Ipv4Packet),
    Icmp(IcmpMessage),
}

impl Payload {
    pub fn encode(&self) -> Result<Vec<u8>> {
        match self {
            Payload::Arp(msg) => Ok(msg.encode().to_vec()),
            Payload::Ipv4(packet) => packet.encode(),
            Payload::Icmp(msg) => Ok(msg.encode()),
        }
    }

    /// EtherType the payload travels under when framed directly.
    ///
    /// `None` for ICMP, which has no EtherType of its own and must be
    /// wrapped in an [`Ipv4Packet`] first.
    pub fn ethertype(&self) -> Option<EtherType> {
        match self {
            Payload::Arp(_) => Some(EtherType::ARP),
            Payload::Ipv4(_) => Some(EtherType::IPv4),
            Payload::Icmp(_) => None,
        }
    }

    /// EtherType or an error naming the payload that cannot be framed
    pub fn require_ethertype(&self) -> Result<EtherType> {
        self.ethertype()
            .ok_or_else(|| Error::malformed("ICMP must be wrapped in IPv4 before framing"))
    }

    /// Encode and prepend an Ethernet header.
    pub fn to_frame(&self, destination: MacAddr, source: MacAddr) -> Result<Vec<u8>> {
        let header = EthernetHeader::new(destination, source, self.require_ethertype()?);
        Ok(ethernet::frame(&header, &self.encode()?))
    }
}

impl From<ArpMessage> for Payload {
    fn from(msg: ArpMessage) -> Self {
        Payload::Arp(msg)
    }
}

impl From<Ipv4Packet> for Payload {
    fn from(packet: Ipv4Packet) -> Self {
        Payload::Ipv4(packet)
    }
}

impl From<IcmpMessage> for Payload {
    fn from(msg: IcmpMessage) -> Self {
        Payload::Icmp(msg)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::arp::build_request;
    use crate::icmp::{build_echo, IdentifierSource};
    use crate::ipv4::{IpProtocol, Ipv4Header};
    use std::net::Ipv4Addr;

    #[test]
    fn test_dispatch_matches_inner_encode() {
        let arp = build_request("10.0.0.1").unwrap();
        assert_eq!(Payload::from(arp.clone()).encode().unwrap(), arp.encode().to_vec());

        let echo = build_echo(IdentifierSource::Fixed(7), b"x");
        assert_eq!(Payload::from(echo.clone()).encode().unwrap(), echo.encode());
    }

    #[test]
    fn test_ethertypes() {
        let arp = Payload::from(build_request("10.0.0.1").unwrap());
        assert_eq!(arp.ethertype(), Some(EtherType::ARP));

        let header = Ipv4Header::new(Ipv4Addr::LOCALHOST, Ipv4Addr::LOCALHOST, IpProtocol::ICMP);
        let ip = Payload::from(Ipv4Packet::new(header, vec![]));
        assert_eq!(ip.ethertype(), Some(EtherType::IPv4));

        let echo = Payload::from(build_echo(IdentifierSource::Fixed(1), b""));
        assert_eq!(echo.ethertype(), None);
    }

    #[test]
    fn test_to_frame_prepends_header() {
        let payload = Payload::from(build_request("10.0.0.1").unwrap());
        let frame = payload
            .to_frame(MacAddr::BROADCAST, MacAddr([2, 0, 0, 0, 0, 1]))
            .unwrap();

        assert_eq!(frame.len(), EthernetHeader::LEN + ArpMessage::LEN);
        assert_eq!(&frame[0..6], &[0xff; 6]);
        assert_eq!(&frame[12..14], &[0x08, 0x06]);
    }

    #[test]
    fn test_bare_icmp_cannot_be_framed() {
        let payload = Payload::from(build_echo(IdentifierSource::Fixed(7), b"x"));
        let err = payload
            .to_frame(MacAddr::BROADCAST, MacAddr([2, 0, 0, 0, 0, 1]))
            .unwrap_err();
        assert!(matches!(err, Error::Malformed(_)));
    }

    #[test]
    fn test_oversize_ipv4_fails_to_frame() {
        let header = Ipv4Header::new(Ipv4Addr::LOCALHOST, Ipv4Addr::LOCALHOST, IpProtocol::ICMP);
        let payload = Payload::from(Ipv4Packet::new(header, vec![0u8; 70_000]));
        assert!(matches!(
            payload.to_frame(MacAddr::BROADCAST, MacAddr::ZERO),
            Err(Error::PayloadTooLarge { .. })
        ));
    }
}
