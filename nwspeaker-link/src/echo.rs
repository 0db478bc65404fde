//! ICMP echo over the IPv4 send path

use std::net::Ipv4Addr;
use std::time::{Duration, Instant};

use nwspeaker_core::{Error, Result};
use nwspeaker_packet::icmp::{build_echo, IcmpMessage, IdentifierSource};
use nwspeaker_packet::ipv4::{IpProtocol, Ipv4Packet};
use nwspeaker_packet::{EtherType, EthernetHeader, Payload};
use tracing::{debug, info, trace};

use crate::ip::{self, Ipv4SendConfig};
use crate::Link;

/// Options for [`ping`]
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EchoConfig {
    pub identifier_source: IdentifierSource,
    /// Echo data; empty selects the default filler
    pub data: Vec<u8>,
    /// How long to wait for the reply; `None` sends without waiting
    pub wait: Option<Duration>,
}

/// What [`ping`] sent and, when it waited, what came back
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EchoOutcome {
    pub request: IcmpMessage,
    pub reply: Option<EchoReply>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EchoReply {
    pub message: IcmpMessage,
    pub ttl: u8,
    pub round_trip: Duration,
}

/// Pull the echo reply to `request` sent by `from` out of a received frame.
pub fn match_reply(
    frame: &[u8],
    request: &IcmpMessage,
    from: Ipv4Addr,
) -> Option<(Ipv4Packet, IcmpMessage)> {
    let (header, body) = EthernetHeader::parse(frame).ok()?;
    if header.ethertype != EtherType::IPv4 {
        return None;
    }

    let packet = Ipv4Packet::parse(body).ok()?;
    if packet.header.protocol != IpProtocol::ICMP || packet.header.source != from {
        return None;
    }

    let message = IcmpMessage::parse(&packet.payload).ok()?;
    message.answers(request).then_some((packet, message))
}

/// Send one echo request to `destination` and optionally wait for the reply.
///
/// Fails with [`Error::TimedOut`] if `config.wait` elapses first.
pub fn ping(
    link: &Link,
    destination: Ipv4Addr,
    config: &EchoConfig,
    ip_config: &Ipv4SendConfig,
) -> Result<EchoOutcome> {
    let request = build_echo(config.identifier_source, &config.data);
    let (frame, destination_mac) = ip::prepare_frame(
        link,
        destination,
        &Payload::from(request.clone()),
        IpProtocol::ICMP,
        ip_config,
    )?;

    let transport = link.open(EtherType::IPv4)?;
    let sent_at = Instant::now();
    transport.send(&frame, destination_mac)?;
    if let Some(echo) = request.echo() {
        info!(
            "Sent ICMP echo to {} via {} (id 0x{:04x}, {} data bytes)",
            destination,
            destination_mac,
            echo.identifier,
            echo.data.len()
        );
    }

    let Some(wait) = config.wait else {
        transport.close()?;
        return Ok(EchoOutcome {
            request,
            reply: None,
        });
    };

    let deadline = sent_at + wait;
    loop {
        let remaining = deadline.saturating_duration_since(Instant::now());
        if remaining.is_zero() {
            return Err(Error::TimedOut);
        }
        transport.set_recv_timeout(Some(remaining))?;

        let received = transport.recv()?;
        match match_reply(&received, &request, destination) {
            Some((packet, message)) => {
                let round_trip = sent_at.elapsed();
                debug!("Echo reply from {} after {:?}", destination, round_trip);
                transport.close()?;
                return Ok(EchoOutcome {
                    request,
                    reply: Some(EchoReply {
                        message,
                        ttl: packet.header.ttl,
                        round_trip,
                    }),
                });
            }
            None => trace!("Skipping {} byte frame", received.len()),
        }
    }
}
