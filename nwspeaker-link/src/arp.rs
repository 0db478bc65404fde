//! ARP send and resolve

use std::net::Ipv4Addr;
use std::time::{Duration, Instant};

use nwspeaker_core::{Error, MacAddr, Result};
use nwspeaker_packet::arp::{self, ArpMessage};
use nwspeaker_packet::{EtherType, Payload};
use tracing::{debug, info, trace};

use crate::ethernet::{self, EthernetSendConfig};
use crate::Link;

/// Sender overrides for crafted ARP messages
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ArpSendConfig {
    /// Sender hardware address; `None` uses the interface MAC
    pub source_mac: Option<MacAddr>,
    /// Sender protocol address; `None` uses the interface IPv4 address
    pub source_ip: Option<Ipv4Addr>,
}

impl ArpSendConfig {
    fn sender(&self, link: &Link) -> Result<(MacAddr, Ipv4Addr)> {
        sender_for(link, self.source_mac, self.source_ip)
    }
}

/// Options for [`resolve`]
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResolveConfig {
    pub source_mac: Option<MacAddr>,
    pub source_ip: Option<Ipv4Addr>,
    /// Give up after this long; `None` waits indefinitely
    pub timeout: Option<Duration>,
}

/// Outcome of a successful [`resolve`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolved {
    pub reply: ArpMessage,
    /// The reply frame as received, Ethernet header included
    pub frame: Vec<u8>,
}

impl Resolved {
    /// Hardware address the target answered with
    pub fn mac(&self) -> MacAddr {
        self.reply.sender_hw_addr
    }
}

fn sender_for(
    link: &Link,
    source_mac: Option<MacAddr>,
    source_ip: Option<Ipv4Addr>,
) -> Result<(MacAddr, Ipv4Addr)> {
    let mac = source_mac.unwrap_or(link.interface.mac_address);
    let ip = match source_ip {
        Some(ip) => ip,
        None => link.interface.require_ipv4()?,
    };
    Ok((mac, ip))
}

/// Where a crafted message goes on the wire.
///
/// Requests are broadcast; anything else goes to the target hardware address.
pub fn destination_for(message: &ArpMessage) -> MacAddr {
    if message.is_request() {
        MacAddr::BROADCAST
    } else {
        message.target_hw_addr
    }
}

/// Whether `message` is the reply `target` sends to an ARP request for itself
pub fn is_reply_from(message: &ArpMessage, target: Ipv4Addr) -> bool {
    message.is_reply() && message.sender_proto_addr == target
}

/// Fill in the sender fields of `message` and send it.
pub fn send_message(link: &Link, message: ArpMessage, config: &ArpSendConfig) -> Result<()> {
    let (mac, ip) = config.sender(link)?;
    let message = message.with_sender(mac, ip);
    let destination = destination_for(&message);

    debug!(
        "ARP {:?} {} ({}) -> {} ({})",
        message.operation,
        message.sender_proto_addr,
        message.sender_hw_addr,
        message.target_proto_addr,
        destination
    );

    let eth_config = EthernetSendConfig {
        source_mac: config.source_mac,
    };
    ethernet::send(link, destination, &Payload::from(message), &eth_config)
}

/// Broadcast a request for `target_ip` and wait for its reply.
///
/// Frames that are not an ARP reply from `target_ip` are skipped. Fails with
/// [`Error::TimedOut`] once `config.timeout` has elapsed.
pub fn resolve(link: &Link, target_ip: &str, config: &ResolveConfig) -> Result<Resolved> {
    let (mac, ip) = sender_for(link, config.source_mac, config.source_ip)?;
    let request = arp::build_request(target_ip)?.with_sender(mac, ip);
    let target = request.target_proto_addr;

    let transport = link.open(EtherType::ARP)?;
    let frame = Payload::from(request).to_frame(MacAddr::BROADCAST, mac)?;
    transport.send(&frame, MacAddr::BROADCAST)?;
    info!("Sent ARP request for {} on {}", target, link.interface.name);

    let deadline = config.timeout.map(|timeout| Instant::now() + timeout);
    loop {
        if let Some(deadline) = deadline {
            let remaining = deadline.saturating_duration_since(Instant::now());
            if remaining.is_zero() {
                return Err(Error::TimedOut);
            }
            transport.set_recv_timeout(Some(remaining))?;
        }

        let frame = transport.recv()?;
        match ArpMessage::parse(&frame) {
            Ok(reply) if is_reply_from(&reply, target) => {
                debug!("{} is at {}", target, reply.sender_hw_addr);
                transport.close()?;
                return Ok(Resolved { reply, frame });
            }
            Ok(other) => trace!(
                "Skipping ARP {:?} from {}",
                other.operation,
                other.sender_proto_addr
            ),
            Err(e) => trace!("Skipping unparseable frame: {}", e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nwspeaker_core::{ByteOrder, Interface};
    use nwspeaker_packet::ArpOperation;

    const LOCAL: MacAddr = MacAddr([0x02, 0, 0, 0, 0, 0x01]);
    const PEER: MacAddr = MacAddr([0x02, 0, 0, 0, 0, 0x02]);

    fn link(ipv4: Option<Ipv4Addr>) -> Link {
        Link::new(
            Interface {
                name: "test0".to_string(),
                index: 2,
                mac_address: LOCAL,
                ipv4,
                is_up: true,
                is_loopback: false,
            },
            ByteOrder::Little,
        )
    }

    #[test]
    fn test_request_is_broadcast() {
        let request = arp::build_request("10.0.0.2").unwrap();
        assert_eq!(destination_for(&request), MacAddr::BROADCAST);
    }

    #[test]
    fn test_reply_goes_to_target() {
        let reply = arp::build_reply(&PEER.to_string(), "10.0.0.2").unwrap();
        assert_eq!(destination_for(&reply), PEER);
    }

    #[test]
    fn test_sender_defaults_to_interface() {
        let link = link(Some(Ipv4Addr::new(10, 0, 0, 1)));
        let config = ArpSendConfig::default();
        assert_eq!(
            config.sender(&link).unwrap(),
            (LOCAL, Ipv4Addr::new(10, 0, 0, 1))
        );
    }

    #[test]
    fn test_sender_overrides_skip_interface_lookup() {
        let config = ArpSendConfig {
            source_mac: Some(PEER),
            source_ip: Some(Ipv4Addr::new(192, 168, 1, 9)),
        };
        assert_eq!(
            config.sender(&link(None)).unwrap(),
            (PEER, Ipv4Addr::new(192, 168, 1, 9))
        );
    }

    #[test]
    fn test_sender_without_address_fails() {
        let err = ArpSendConfig::default().sender(&link(None)).unwrap_err();
        assert!(matches!(err, Error::InterfaceLookup(_)));
    }

    #[test]
    fn test_reply_matching() {
        let target = Ipv4Addr::new(10, 0, 0, 2);
        let reply = arp::build_reply(&LOCAL.to_string(), "10.0.0.1")
            .unwrap()
            .with_sender(PEER, target);
        assert!(is_reply_from(&reply, target));
        assert!(!is_reply_from(&reply, Ipv4Addr::new(10, 0, 0, 3)));

        let mut request = reply.clone();
        request.operation = ArpOperation::Request;
        assert!(!is_reply_from(&request, target));
    }

    #[test]
    fn test_resolve_rejects_bad_target_before_opening() {
        let err = resolve(
            &link(Some(Ipv4Addr::new(10, 0, 0, 1))),
            "10.0.0",
            &ResolveConfig::default(),
        )
        .unwrap_err();
        assert!(matches!(err, Error::InvalidAddress { .. }));
    }

    #[test]
    fn test_resolved_mac_is_reply_sender() {
        let reply = arp::build_reply(&LOCAL.to_string(), "10.0.0.1")
            .unwrap()
            .with_sender(PEER, Ipv4Addr::new(10, 0, 0, 2));
        let resolved = Resolved {
            frame: Payload::from(reply.clone()).to_frame(LOCAL, PEER).unwrap(),
            reply,
        };
        assert_eq!(resolved.mac(), PEER);
        assert_eq!(resolved.frame.len(), 42);
    }
}
