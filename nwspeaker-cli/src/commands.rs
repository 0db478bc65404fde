//! Subcommand implementations

use std::fmt::Write as _;
use std::net::Ipv4Addr;

use nwspeaker_core::{AddressKind, ByteOrder, Error, Interface, MacAddr, Result};
use nwspeaker_link::{arp, echo, Link};
use nwspeaker_packet::arp::{build_reply, build_request};
use nwspeaker_packet::icmp::IcmpType;
use tracing::info;

use crate::args::{self, ArpOp, Commands};

/// Run one parsed subcommand.
pub fn run(command: Commands, byte_order: ByteOrder) -> Result<()> {
    match command {
        Commands::Arp {
            interface,
            dst_ip,
            op,
            dst_mac,
            src_mac,
            src_ip,
        } => run_arp(
            &Link::by_name(&interface, byte_order)?,
            &dst_ip,
            op,
            dst_mac.as_deref(),
            args::arp_config(src_mac, src_ip),
        ),
        Commands::Resolve {
            interface,
            target_ip,
            timeout,
        } => run_resolve(
            &Link::by_name(&interface, byte_order)?,
            &target_ip,
            timeout,
        ),
        Commands::Icmp {
            list_types: true, ..
        } => {
            print!("{}", supported_types_table());
            Ok(())
        }
        Commands::Icmp {
            interface,
            dst_ip,
            dst_mac,
            data,
            ttl,
            wait,
            ..
        } => {
            let interface =
                interface.ok_or_else(|| Error::interface_lookup("no interface given"))?;
            let dst_ip =
                dst_ip.ok_or_else(|| Error::invalid_address("(none)", AddressKind::Ipv4))?;
            run_icmp(
                &Link::by_name(&interface, byte_order)?,
                dst_ip,
                dst_mac,
                data.as_deref(),
                ttl,
                wait,
            )
        }
        Commands::Interfaces => {
            print!("{}", interfaces_table(&Interface::list_all()));
            Ok(())
        }
    }
}

fn run_arp(
    link: &Link,
    dst_ip: &str,
    op: ArpOp,
    dst_mac: Option<&str>,
    config: arp::ArpSendConfig,
) -> Result<()> {
    let message = match op {
        ArpOp::Request => build_request(dst_ip)?,
        ArpOp::Reply => build_reply(dst_mac.unwrap_or_default(), dst_ip)?,
    };
    arp::send_message(link, message, &config)?;
    info!("ARP {:?} for {} sent on {}", op, dst_ip, link.interface.name);
    Ok(())
}

fn run_resolve(link: &Link, target_ip: &str, timeout: u64) -> Result<()> {
    let resolved = arp::resolve(link, target_ip, &args::resolve_config(timeout))?;
    println!("{} is at {}", resolved.reply.sender_proto_addr, resolved.mac());
    println!("{}", hex(&resolved.frame));
    Ok(())
}

fn run_icmp(
    link: &Link,
    dst_ip: Ipv4Addr,
    dst_mac: Option<MacAddr>,
    data: Option<&str>,
    ttl: u8,
    wait: Option<u64>,
) -> Result<()> {
    let outcome = echo::ping(
        link,
        dst_ip,
        &args::echo_config(data, wait),
        &args::ipv4_config(dst_mac, ttl),
    )?;

    if let Some(reply) = outcome.reply {
        let (id, len) = reply
            .message
            .echo()
            .map(|e| (e.identifier, e.data.len()))
            .unwrap_or_default();
        println!(
            "{} bytes from {}: id=0x{:04x} ttl={} time={:.3} ms",
            len,
            dst_ip,
            id,
            reply.ttl,
            reply.round_trip.as_secs_f64() * 1000.0
        );
    }
    Ok(())
}

/// Lowercase hex with no separators
pub fn hex(bytes: &[u8]) -> String {
    bytes.iter().fold(String::with_capacity(bytes.len() * 2), |mut out, b| {
        let _ = write!(out, "{:02x}", b);
        out
    })
}

pub fn supported_types_table() -> String {
    let mut out = String::from("TypeCode  Message\n");
    for icmp_type in IcmpType::supported() {
        let _ = writeln!(out, "{:<8}  {}", icmp_type.to_u8(), icmp_type);
    }
    out
}

pub fn interfaces_table(interfaces: &[Interface]) -> String {
    let mut out = String::from("INDEX\tNAME\tMAC\tIPV4\tSTATE\n");
    for iface in interfaces {
        let _ = writeln!(out, "{}", iface);
    }
    out
}
