//! Error types for nwspeaker

use std::io;
use thiserror::Error;

/// Result type alias for nwspeaker operations
pub type Result<T> = std::result::Result<T, Error>;

/// The kind of literal that failed to parse
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddressKind {
    /// IPv4 dotted-quad literal
    Ipv4,
    /// Colon or dash separated MAC literal
    Mac,
}

impl std::fmt::Display for AddressKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AddressKind::Ipv4 => write!(f, "IPv4"),
            AddressKind::Mac => write!(f, "MAC"),
        }
    }
}

/// Main error type for nwspeaker
#[derive(Error, Debug)]
pub enum Error {
    /// Malformed IP or MAC literal
    #[error("invalid {kind} address '{input}'")]
    InvalidAddress { input: String, kind: AddressKind },

    /// Frame shorter than an Ethernet header
    #[error("truncated frame: need {needed} bytes, got {actual}")]
    TruncatedFrame { needed: usize, actual: usize },

    /// Protocol message shorter than its fixed layout
    #[error("truncated {what} message: need {needed} bytes, got {actual}")]
    TruncatedMessage {
        what: &'static str,
        needed: usize,
        actual: usize,
    },

    /// Payload larger than the enclosing header's length field can describe
    #[error("{what} payload of {actual} bytes exceeds the {limit} byte limit")]
    PayloadTooLarge {
        what: &'static str,
        limit: usize,
        actual: usize,
    },

    /// Field value that makes the message unusable
    #[error("malformed packet: {0}")]
    Malformed(String),

    /// Interface could not be resolved or has no usable address
    #[error("interface lookup failed: {0}")]
    InterfaceLookup(String),

    /// Raw socket could not be created
    #[error("failed to open raw socket: {0}")]
    Socket(#[source] io::Error),

    /// Raw socket could not be bound to the interface
    #[error("failed to bind raw socket: {0}")]
    Bind(#[source] io::Error),

    /// Send or receive failure on the raw socket
    #[error("transport error: {0}")]
    Transport(String),

    /// A receive deadline set by the caller expired
    #[error("timed out waiting for a reply")]
    TimedOut,
}

impl Error {
    /// Create an invalid address error for the given input
    pub fn invalid_address<S: Into<String>>(input: S, kind: AddressKind) -> Self {
        Error::InvalidAddress {
            input: input.into(),
            kind,
        }
    }

    /// Create an interface lookup error with a custom message
    pub fn interface_lookup<S: Into<String>>(msg: S) -> Self {
        Error::InterfaceLookup(msg.into())
    }

    /// Create a transport error with a custom message
    pub fn transport<S: Into<String>>(msg: S) -> Self {
        Error::Transport(msg.into())
    }

    /// Create a malformed packet error with a custom message
    pub fn malformed<S: Into<String>>(msg: S) -> Self {
        Error::Malformed(msg.into())
    }

    /// True for the permission failure raw sockets report without CAP_NET_RAW
    pub fn is_permission_denied(&self) -> bool {
        match self {
            Error::Socket(e) | Error::Bind(e) => e.kind() == io::ErrorKind::PermissionDenied,
            _ => false,
        }
    }
}
