//! nwspeaker core library
//!
//! This crate provides the error taxonomy, address types, the host byte-order
//! probe and interface lookup shared by the packet codecs, the raw-socket
//! transport and the command-line front end.

pub mod endian;
pub mod error;
pub mod interface;
pub mod types;

// Re-export commonly used types
pub use endian::ByteOrder;
pub use error::{AddressKind, Error, Result};
pub use interface::Interface;
pub use types::*;
