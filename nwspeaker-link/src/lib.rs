//! Raw link-layer I/O for nwspeaker
//!
//! [`LinkTransport`] wraps one `AF_PACKET` socket. The send helpers in
//! [`ethernet`], [`ip`], [`arp`] and [`echo`] open a transport on a [`Link`],
//! frame a payload from `nwspeaker-packet` and put it on the wire.

pub mod arp;
pub mod echo;
pub mod ethernet;
pub mod ip;
pub mod transport;

use nwspeaker_core::{ByteOrder, Interface, Result};
use nwspeaker_packet::EtherType;

pub use arp::{ArpSendConfig, ResolveConfig, Resolved};
pub use echo::{EchoConfig, EchoOutcome, EchoReply};
pub use ethernet::EthernetSendConfig;
pub use ip::Ipv4SendConfig;
pub use transport::LinkTransport;

/// An interface together with the host byte order probed at startup
#[derive(Debug, Clone)]
pub struct Link {
    pub interface: Interface,
    pub byte_order: ByteOrder,
}

impl Link {
    pub fn new(interface: Interface, byte_order: ByteOrder) -> Self {
        Self {
            interface,
            byte_order,
        }
    }

    /// Look up `name` and pair it with `byte_order`.
    pub fn by_name(name: &str, byte_order: ByteOrder) -> Result<Self> {
        Ok(Self::new(Interface::by_name(name)?, byte_order))
    }

    /// Open a transport for `ethertype` bound to this interface.
    pub fn open(&self, ethertype: EtherType) -> Result<LinkTransport> {
        LinkTransport::open_bound(ethertype.to_u16(), self.interface.index, self.byte_order)
    }
}
