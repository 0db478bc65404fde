//! Network interface lookup

use crate::{Error, MacAddr, Result};
use pnet_datalink::{self, NetworkInterface};
use std::fmt;
use std::net::Ipv4Addr;

/// Network interface
#[derive(Debug, Clone)]
pub struct Interface {
    /// Interface name (e.g., "eth0", "en0")
    pub name: String,
    /// Interface index
    pub index: u32,
    /// MAC address
    pub mac_address: MacAddr,
    /// First non-loopback IPv4 address, if any
    pub ipv4: Option<Ipv4Addr>,
    /// Is interface up?
    pub is_up: bool,
    /// Is this the loopback device?
    pub is_loopback: bool,
}

impl From<&NetworkInterface> for Interface {
    fn from(iface: &NetworkInterface) -> Self {
        let mac_address = iface
            .mac
            .map(|mac| MacAddr([mac.0, mac.1, mac.2, mac.3, mac.4, mac.5]))
            .unwrap_or(MacAddr::ZERO);

        Self {
            name: iface.name.clone(),
            index: iface.index,
            mac_address,
            ipv4: first_ipv4(iface),
            is_up: iface.is_up(),
            is_loopback: iface.is_loopback(),
        }
    }
}

fn first_ipv4(iface: &NetworkInterface) -> Option<Ipv4Addr> {
    iface.ips.iter().find_map(|network| match network {
        ipnetwork::IpNetwork::V4(v4) if !v4.ip().is_loopback() => Some(v4.ip()),
        _ => None,
    })
}

impl Interface {
    /// Get interface by name
    pub fn by_name(name: &str) -> Result<Self> {
        pnet_datalink::interfaces()
            .iter()
            .find(|iface| iface.name == name)
            .map(Interface::from)
            .ok_or_else(|| Error::interface_lookup(format!("no interface named '{}'", name)))
    }

    /// List all available interfaces
    pub fn list_all() -> Vec<Self> {
        pnet_datalink::interfaces()
            .iter()
            .map(Interface::from)
            .collect()
    }

    /// The IPv4 address used as the source of crafted packets
    pub fn require_ipv4(&self) -> Result<Ipv4Addr> {
        self.ipv4.ok_or_else(|| {
            Error::interface_lookup(format!("no IPv4 address is assigned to '{}'", self.name))
        })
    }
}

impl fmt::Display for Interface {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let ip = self
            .ipv4
            .map(|ip| ip.to_string())
            .unwrap_or_else(|| "-".to_string());
        write!(
            f,
            "{}\t{}\t{}\t{}\t{}",
            self.index,
            self.name,
            self.mac_address,
            ip,
            if self.is_up { "up" } else { "down" }
        )
    }
}
