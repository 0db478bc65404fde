//! One-shot Ethernet send

use nwspeaker_core::{MacAddr, Result};
use nwspeaker_packet::ethernet::{self, EtherType, EthernetHeader};
use nwspeaker_packet::Payload;
use tracing::debug;

use crate::Link;

/// Options for [`send`]
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EthernetSendConfig {
    /// Source address written into the header; `None` uses the interface MAC
    pub source_mac: Option<MacAddr>,
}

impl EthernetSendConfig {
    pub fn source_for(&self, link: &Link) -> MacAddr {
        self.source_mac.unwrap_or(link.interface.mac_address)
    }
}

/// Frame `payload` under its own EtherType, addressed to `destination`.
pub fn build_frame(
    link: &Link,
    destination: MacAddr,
    payload: &Payload,
    config: &EthernetSendConfig,
) -> Result<(EtherType, Vec<u8>)> {
    let ethertype = payload.require_ethertype()?;
    let header = EthernetHeader::new(destination, config.source_for(link), ethertype);
    Ok((ethertype, ethernet::frame(&header, &payload.encode()?)))
}

/// Frame `payload` and send it to `destination`.
///
/// Opens, binds and closes a transport for this one frame. Payloads with no
/// EtherType of their own fail before a socket is opened.
pub fn send(
    link: &Link,
    destination: MacAddr,
    payload: &Payload,
    config: &EthernetSendConfig,
) -> Result<()> {
    let (ethertype, frame) = build_frame(link, destination, payload, config)?;

    let transport = link.open(ethertype)?;
    transport.send(&frame, destination)?;
    debug!(
        "Sent {} byte {} frame on {} to {}",
        frame.len(),
        ethertype,
        link.interface.name,
        destination
    );
    transport.close()
}
