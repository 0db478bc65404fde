//! Example: Building an ARP request frame
//!
//! Prints the 42-byte broadcast frame asking who owns 192.168.0.1.

use std::net::Ipv4Addr;
use nwspeaker_core::MacAddr;
use nwspeaker_packet::{arp, ArpMessage, Payload};

fn main() {
    let src_mac = MacAddr([0x11, 0x22, 0x33, 0x44, 0x55, 0x66]);
    let src_ip = Ipv4Addr::new(192, 168, 1, 0);

    let request = arp::build_request("192.168.0.1")
        .expect("valid IPv4 literal")
        .with_sender(src_mac, src_ip);

    let frame = Payload::from(request)
        .to_frame(MacAddr::BROADCAST, src_mac)
        .expect("ARP always frames");

    println!("ARP request frame: {} bytes", frame.len());
    println!("Ethernet header: {:02x?}", &frame[..14]);
    println!("ARP body: {:02x?}", &frame[14..]);

    let parsed = ArpMessage::parse(&frame).expect("frame we just built");
    println!(
        "who-has {} tell {} ({})",
        parsed.target_proto_addr, parsed.sender_proto_addr, parsed.sender_hw_addr
    );
}
