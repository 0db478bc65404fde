//! IPv4 send path
//!
//! Wraps a payload in an IPv4 header sourced from the interface address and
//! frames it for a transport opened on the IPv4 EtherType. There is no ARP on
//! this path: the caller names the next-hop MAC in
//! [`Ipv4SendConfig::destination_mac`].

use std::net::Ipv4Addr;

use nwspeaker_core::{AddressKind, Error, MacAddr, Result};
use nwspeaker_packet::ipv4::{IpProtocol, Ipv4Header, Ipv4Packet, DEFAULT_TTL};
use nwspeaker_packet::{EtherType, Payload};
use tracing::debug;

use crate::Link;

/// Options for [`send`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ipv4SendConfig {
    /// Next-hop hardware address; required
    pub destination_mac: Option<MacAddr>,
    pub time_to_live: u8,
    /// Not unique per flow
    pub identification: u16,
    pub type_of_service: u8,
    /// Overrides the interface IPv4 address
    pub source_ip: Option<Ipv4Addr>,
    /// Overrides the interface MAC
    pub source_mac: Option<MacAddr>,
}

impl Default for Ipv4SendConfig {
    fn default() -> Self {
        Self {
            destination_mac: None,
            time_to_live: DEFAULT_TTL,
            identification: 0,
            type_of_service: 0,
            source_ip: None,
            source_mac: None,
        }
    }
}

impl Ipv4SendConfig {
    pub fn to(destination_mac: MacAddr) -> Self {
        Self {
            destination_mac: Some(destination_mac),
            ..Default::default()
        }
    }

    fn require_destination_mac(&self) -> Result<MacAddr> {
        self.destination_mac
            .ok_or_else(|| Error::invalid_address("(none)", AddressKind::Mac))
    }
}

/// Build the IPv4 packet carrying `payload` from `source` to `destination`.
pub fn build_packet(
    source: Ipv4Addr,
    destination: Ipv4Addr,
    payload: &Payload,
    protocol: IpProtocol,
    config: &Ipv4SendConfig,
) -> Result<Ipv4Packet> {
    let mut header = Ipv4Header::new(source, destination, protocol);
    header.ttl = config.time_to_live;
    header.identification = config.identification;
    header.tos = config.type_of_service;
    Ok(Ipv4Packet::new(header, payload.encode()?))
}

/// Resolve addressing for `destination` and build the complete frame.
///
/// Returns the frame and the MAC it should be sent to.
pub fn prepare_frame(
    link: &Link,
    destination: Ipv4Addr,
    payload: &Payload,
    protocol: IpProtocol,
    config: &Ipv4SendConfig,
) -> Result<(Vec<u8>, MacAddr)> {
    let destination_mac = config.require_destination_mac()?;
    let source = match config.source_ip {
        Some(ip) => ip,
        None => link.interface.require_ipv4()?,
    };

    let packet = build_packet(source, destination, payload, protocol, config)?;
    let source_mac = config.source_mac.unwrap_or(link.interface.mac_address);
    let frame = Payload::from(packet).to_frame(destination_mac, source_mac)?;
    Ok((frame, destination_mac))
}

/// Send `payload` to `destination` inside one IPv4 packet.
pub fn send(
    link: &Link,
    destination: Ipv4Addr,
    payload: &Payload,
    protocol: IpProtocol,
    config: &Ipv4SendConfig,
) -> Result<()> {
    let (frame, destination_mac) = prepare_frame(link, destination, payload, protocol, config)?;
    debug!(
        "IPv4 to {} protocol {} ttl {} ({} byte frame)",
        destination,
        protocol.to_u8(),
        config.time_to_live,
        frame.len()
    );

    let transport = link.open(EtherType::IPv4)?;
    transport.send(&frame, destination_mac)?;
    transport.close()
}

#[cfg(test)]
mod tests {
    use super::*;
    use nwspeaker_core::{ByteOrder, Interface};
    use nwspeaker_packet::checksum::verify;
    use nwspeaker_packet::icmp::{build_echo, IdentifierSource};
    use nwspeaker_packet::EthernetHeader;

    fn link(ipv4: Option<Ipv4Addr>) -> Link {
        Link::new(
            Interface {
                name: "test0".to_string(),
                index: 3,
                mac_address: MacAddr([0x02, 0, 0, 0, 0, 0x03]),
                ipv4,
                is_up: true,
                is_loopback: false,
            },
            ByteOrder::Little,
        )
    }

    #[test]
    fn test_defaults() {
        let config = Ipv4SendConfig::default();
        assert_eq!(config.time_to_live, 255);
        assert_eq!(config.identification, 0);
        assert_eq!(config.type_of_service, 0);
        assert!(config.destination_mac.is_none());
    }

    #[test]
    fn test_build_packet_applies_config() {
        let config = Ipv4SendConfig {
            time_to_live: 64,
            identification: 0x1234,
            type_of_service: 0x10,
            ..Default::default()
        };
        let payload = Payload::from(build_echo(IdentifierSource::Fixed(1), b"hi"));
        let packet = build_packet(
            Ipv4Addr::new(10, 0, 0, 1),
            Ipv4Addr::new(10, 0, 0, 2),
            &payload,
            IpProtocol::ICMP,
            &config,
        )
        .unwrap();

        let bytes = packet.encode().unwrap();
        assert_eq!(bytes[1], 0x10);
        assert_eq!(&bytes[4..6], &[0x12, 0x34]);
        assert_eq!(bytes[8], 64);
        assert_eq!(bytes[9], 1);
        assert!(verify(&bytes[..Ipv4Header::LEN]));
        assert_eq!(&bytes[Ipv4Header::LEN..], payload.encode().unwrap().as_slice());
    }

    #[test]
    fn test_missing_destination_mac() {
        let payload = Payload::from(build_echo(IdentifierSource::Fixed(1), b""));
        let err = prepare_frame(
            &link(Some(Ipv4Addr::new(10, 0, 0, 1))),
            Ipv4Addr::new(10, 0, 0, 2),
            &payload,
            IpProtocol::ICMP,
            &Ipv4SendConfig::default(),
        )
        .unwrap_err();
        assert!(matches!(
            err,
            Error::InvalidAddress {
                kind: AddressKind::Mac,
                ..
            }
        ));
    }

    #[test]
    fn test_oversize_payload_rejected() {
        let payload = Payload::from(build_echo(IdentifierSource::Fixed(1), &[0u8; 70_000]));
        let err = prepare_frame(
            &link(Some(Ipv4Addr::new(10, 0, 0, 1))),
            Ipv4Addr::new(10, 0, 0, 2),
            &payload,
            IpProtocol::ICMP,
            &Ipv4SendConfig::to(MacAddr::BROADCAST),
        )
        .unwrap_err();
        assert!(matches!(err, Error::PayloadTooLarge { what: "IPv4", .. }));
    }

    #[test]
    fn test_missing_interface_address() {
        let payload = Payload::from(build_echo(IdentifierSource::Fixed(1), b""));
        let err = prepare_frame(
            &link(None),
            Ipv4Addr::new(10, 0, 0, 2),
            &payload,
            IpProtocol::ICMP,
            &Ipv4SendConfig::to(MacAddr::BROADCAST),
        )
        .unwrap_err();
        assert!(matches!(err, Error::InterfaceLookup(_)));
    }

    #[test]
    fn test_prepare_frame_addressing() {
        let peer = MacAddr([0x02, 0, 0, 0, 0, 0x09]);
        let payload = Payload::from(build_echo(IdentifierSource::Fixed(1), b""));
        let (frame, to) = prepare_frame(
            &link(Some(Ipv4Addr::new(10, 0, 0, 1))),
            Ipv4Addr::new(10, 0, 0, 2),
            &payload,
            IpProtocol::ICMP,
            &Ipv4SendConfig::to(peer),
        )
        .unwrap();

        assert_eq!(to, peer);
        let (eth, body) = EthernetHeader::parse(&frame).unwrap();
        assert_eq!(eth.destination, peer);
        assert_eq!(eth.source, MacAddr([0x02, 0, 0, 0, 0, 0x03]));
        assert_eq!(eth.ethertype, EtherType::IPv4);

        let packet = Ipv4Packet::parse(body).unwrap();
        assert_eq!(packet.header.source, Ipv4Addr::new(10, 0, 0, 1));
        assert_eq!(packet.header.ttl, 255);
    }
}
