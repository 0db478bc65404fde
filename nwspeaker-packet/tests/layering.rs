//! Frame -> header chain round trips across the codec layers

use std::net::Ipv4Addr;

use nwspeaker_core::MacAddr;
use nwspeaker_packet::checksum::verify;
use nwspeaker_packet::ethernet::{self, EtherType, EthernetHeader};
use nwspeaker_packet::icmp::{build_echo, IcmpMessage, IcmpType, IdentifierSource};
use nwspeaker_packet::ipv4::{IpProtocol, Ipv4Header, Ipv4Packet};
use nwspeaker_packet::{arp, ArpMessage, ArpOperation, Payload};

const LOCAL_MAC: MacAddr = MacAddr([0x02, 0x42, 0xac, 0x11, 0x00, 0x02]);
const PEER_MAC: MacAddr = MacAddr([0x02, 0x42, 0xac, 0x11, 0x00, 0x03]);

#[test]
fn arp_request_survives_framing() {
    for ip in ["192.168.0.1", "10.0.0.254", "0.0.0.0", "255.255.255.255"] {
        let request = arp::build_request(ip)
            .unwrap()
            .with_sender(LOCAL_MAC, Ipv4Addr::new(172, 17, 0, 2));

        let header = EthernetHeader::new(MacAddr::BROADCAST, LOCAL_MAC, EtherType::ARP);
        let frame = ethernet::frame(&header, &request.encode());

        let parsed = ArpMessage::parse(&frame).unwrap();
        assert_eq!(parsed, request);
        assert_eq!(parsed.operation, ArpOperation::Request);
        assert_eq!(parsed.target_proto_addr, ip.parse::<Ipv4Addr>().unwrap());
    }
}

#[test]
fn arp_reply_addressed_to_peer() {
    let reply = arp::build_reply(&PEER_MAC.to_string(), "172.17.0.3")
        .unwrap()
        .with_sender(LOCAL_MAC, Ipv4Addr::new(172, 17, 0, 2));

    let frame = Payload::from(reply).to_frame(PEER_MAC, LOCAL_MAC).unwrap();
    let (eth, body) = EthernetHeader::parse(&frame).unwrap();
    assert_eq!(eth.destination, PEER_MAC);
    assert_eq!(eth.ethertype, EtherType::ARP);

    let parsed = ArpMessage::decode(body).unwrap();
    assert!(parsed.is_reply());
    assert_eq!(parsed.target_hw_addr, PEER_MAC);
}

#[test]
fn icmp_echo_in_ipv4_in_ethernet() {
    let echo = build_echo(IdentifierSource::Fixed(0x4d2), b"");
    let mut header = Ipv4Header::new(
        Ipv4Addr::new(172, 17, 0, 2),
        Ipv4Addr::new(172, 17, 0, 3),
        IpProtocol::ICMP,
    );
    header.identification = 0;
    let packet = Ipv4Packet::new(header, echo.encode());

    let frame = Payload::from(packet).to_frame(PEER_MAC, LOCAL_MAC).unwrap();
    assert_eq!(frame.len(), 14 + 20 + 8 + 26);

    let (eth, body) = EthernetHeader::parse(&frame).unwrap();
    assert_eq!(eth.ethertype, EtherType::IPv4);
    assert!(verify(&body[..Ipv4Header::LEN]));

    let ip = Ipv4Packet::parse(body).unwrap();
    assert_eq!(ip.header.protocol, IpProtocol::ICMP);
    assert_eq!(ip.header.ttl, 255);
    assert!(verify(&ip.payload));

    let icmp = IcmpMessage::parse(&ip.payload).unwrap();
    assert_eq!(icmp.icmp_type, IcmpType::Echo);
    assert_eq!(icmp.echo().unwrap().identifier, 0x4d2);
    assert_eq!(icmp.echo().unwrap().data, b"ABCDEFGHIJKLMNOPQRSTUVWXYZ");
}

#[test]
fn empty_payload_frames_to_bare_header() {
    let header = EthernetHeader::new(PEER_MAC, LOCAL_MAC, EtherType::Other(0x88b5));
    let frame = ethernet::frame(&header, &[]);
    assert_eq!(frame, header.encode().to_vec());

    let (parsed, rest) = EthernetHeader::parse(&frame).unwrap();
    assert_eq!(parsed, header);
    assert!(rest.is_empty());
}
