//! CLI argument parsing
//!
//! One subcommand per crafted protocol, plus interface listing.

use clap::{Parser, Subcommand, ValueEnum};
use nwspeaker_core::MacAddr;
use nwspeaker_link::{ArpSendConfig, EchoConfig, Ipv4SendConfig, ResolveConfig};
use nwspeaker_packet::ipv4::DEFAULT_TTL;
use std::net::Ipv4Addr;
use std::time::Duration;

#[derive(Parser, Debug)]
#[command(name = "nwspeaker")]
#[command(version, about = "Craft and send link-layer packets", long_about = None)]
pub struct Cli {
    /// Verbose output (-v, -vv, -vvv for increasing verbosity)
    #[arg(short = 'v', long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

/// ARP operation to craft
#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum ArpOp {
    #[default]
    Request,
    Reply,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Craft one ARP request or reply
    Arp {
        /// Output interface
        #[arg(short, long)]
        interface: String,

        /// Target protocol address
        #[arg(long, value_name = "IP")]
        dst_ip: String,

        /// ARP operation
        #[arg(long, value_enum, default_value_t = ArpOp::Request)]
        op: ArpOp,

        /// Target hardware address; required for replies
        #[arg(long, value_name = "MAC", required_if_eq("op", "reply"))]
        dst_mac: Option<String>,

        /// Sender hardware address (defaults to the interface MAC)
        #[arg(long, value_name = "MAC")]
        src_mac: Option<MacAddr>,

        /// Sender protocol address (defaults to the interface IPv4 address)
        #[arg(long, value_name = "IP")]
        src_ip: Option<Ipv4Addr>,
    },

    /// Resolve an IPv4 address to a MAC address with ARP
    Resolve {
        /// Output interface
        #[arg(short, long)]
        interface: String,

        /// Address to resolve
        #[arg(value_name = "TARGET_IP")]
        target_ip: String,

        /// Seconds to wait for the reply (0 waits forever)
        #[arg(short, long, value_name = "SECONDS", default_value = "0")]
        timeout: u64,
    },

    /// Send one ICMP echo request inside IPv4
    Icmp {
        /// Output interface
        #[arg(short, long, required_unless_present = "list_types")]
        interface: Option<String>,

        /// Destination IPv4 address
        #[arg(long, value_name = "IP", required_unless_present = "list_types")]
        dst_ip: Option<Ipv4Addr>,

        /// Next-hop MAC address
        #[arg(long, value_name = "MAC", required_unless_present = "list_types")]
        dst_mac: Option<MacAddr>,

        /// Echo data (defaults to the alphabet)
        #[arg(long)]
        data: Option<String>,

        /// IPv4 time to live
        #[arg(long, default_value_t = DEFAULT_TTL)]
        ttl: u8,

        /// Wait this many seconds for the echo reply
        #[arg(short, long, value_name = "SECONDS")]
        wait: Option<u64>,

        /// Print supported ICMP type codes and exit
        #[arg(short, long)]
        list_types: bool,
    },

    /// List available network interfaces
    Interfaces,
}

impl Cli {
    /// Parse command-line arguments
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Default log filter for the `-v` count
    pub fn log_level(&self) -> &'static str {
        match self.verbose {
            0 => "warn",
            1 => "info",
            2 => "debug",
            _ => "trace",
        }
    }
}

/// `0` means no deadline
pub fn timeout_from_secs(secs: u64) -> Option<Duration> {
    (secs > 0).then(|| Duration::from_secs(secs))
}

pub fn arp_config(src_mac: Option<MacAddr>, src_ip: Option<Ipv4Addr>) -> ArpSendConfig {
    ArpSendConfig {
        source_mac: src_mac,
        source_ip: src_ip,
    }
}

pub fn resolve_config(timeout: u64) -> ResolveConfig {
    ResolveConfig {
        timeout: timeout_from_secs(timeout),
        ..Default::default()
    }
}

pub fn echo_config(data: Option<&str>, wait: Option<u64>) -> EchoConfig {
    EchoConfig {
        data: data.map(|d| d.as_bytes().to_vec()).unwrap_or_default(),
        wait: wait.and_then(timeout_from_secs),
        ..Default::default()
    }
}

pub fn ipv4_config(dst_mac: Option<MacAddr>, ttl: u8) -> Ipv4SendConfig {
    Ipv4SendConfig {
        destination_mac: dst_mac,
        time_to_live: ttl,
        ..Default::default()
    }
}
