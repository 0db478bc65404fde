//! Example: Building an ICMP echo request inside IPv4
//!
//! Shows the checksums the codecs fill in on each layer.

use std::net::Ipv4Addr;
use nwspeaker_packet::icmp::{build_echo, IdentifierSource};
use nwspeaker_packet::ipv4::{IpProtocol, Ipv4Header, Ipv4Packet};

fn main() {
    let echo = build_echo(IdentifierSource::Clock, b"");
    let header = Ipv4Header::new(
        Ipv4Addr::new(192, 168, 1, 100),
        Ipv4Addr::new(192, 168, 1, 1),
        IpProtocol::ICMP,
    );
    let packet = Ipv4Packet::new(header, echo.encode())
        .encode()
        .expect("echo fits in one packet");

    println!("IPv4 packet: {} bytes", packet.len());
    println!(
        "IP header checksum: 0x{:04x}",
        u16::from_be_bytes([packet[10], packet[11]])
    );
    println!(
        "ICMP checksum: 0x{:04x}",
        u16::from_be_bytes([packet[22], packet[23]])
    );
    println!("ICMP message: {:02x?}", &packet[20..]);
}
