//! Packet codecs for nwspeaker
//!
//! Byte-exact encoders and decoders for the headers nwspeaker crafts:
//!
//! - [`ethernet`] - Ethernet II header and framing
//! - [`arp`] - Ethernet/IPv4 ARP requests and replies
//! - [`ipv4`] - IPv4 header without options
//! - [`icmp`] - ICMP with Echo bodies
//! - [`checksum`] - Internet checksum (RFC 1071)
//! - [`payload`] - Closed union of the bodies above
//!
//! Everything here is pure: no sockets, no logging, no global state.
//!
//! # Building an ARP request frame
//!
//! ```rust
//! use std::net::Ipv4Addr;
//! use nwspeaker_core::MacAddr;
//! use nwspeaker_packet::{arp, Payload};
//!
//! let request = arp::build_request("192.168.0.1")
//!     .unwrap()
//!     .with_sender(MacAddr([0x11, 0x22, 0x33, 0x44, 0x55, 0x66]), Ipv4Addr::new(192, 168, 1, 0));
//!
//! let frame = Payload::from(request)
//!     .to_frame(MacAddr::BROADCAST, MacAddr([0x11, 0x22, 0x33, 0x44, 0x55, 0x66]))
//!     .unwrap();
//! assert_eq!(frame.len(), 42);
//! ```
//!
//! # Wrapping an ICMP echo in IPv4
//!
//! ```rust
//! use std::net::Ipv4Addr;
//! use nwspeaker_packet::icmp::{build_echo, IdentifierSource};
//! use nwspeaker_packet::ipv4::{IpProtocol, Ipv4Header, Ipv4Packet};
//!
//! let echo = build_echo(IdentifierSource::Random, b"");
//! let header = Ipv4Header::new(Ipv4Addr::new(10, 0, 0, 1), Ipv4Addr::new(10, 0, 0, 2), IpProtocol::ICMP);
//! let packet = Ipv4Packet::new(header, echo.encode());
//! assert_eq!(packet.encode().unwrap().len(), 20 + 8 + 26);
//! ```

pub mod arp;
pub mod checksum;
pub mod ethernet;
pub mod icmp;
pub mod ipv4;
pub mod payload;

// Re-export commonly used types for convenience
pub use arp::{ArpMessage, ArpOperation};
pub use checksum::{checksum16, internet_checksum};
pub use ethernet::{EtherType, EthernetHeader};
pub use icmp::{EchoPayload, IcmpMessage, IcmpPayload, IcmpType, IdentifierSource};
pub use ipv4::{IpFlags, IpProtocol, Ipv4Header, Ipv4Packet};
pub use payload::Payload;
