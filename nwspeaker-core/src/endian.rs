//! Host byte-order probe
//!
//! Socket APIs take some fields (the `AF_PACKET` protocol number among them)
//! in network order packed into a host integer. The probe runs once at startup
//! and the resulting value is handed to whatever needs the conversion.

/// Byte order of the running host
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ByteOrder {
    Little,
    Big,
}

impl ByteOrder {
    /// Detect the host byte order by inspecting a native-endian integer
    pub fn probe() -> Self {
        match 0x0001u16.to_ne_bytes() {
            [0x01, 0x00] => ByteOrder::Little,
            _ => ByteOrder::Big,
        }
    }

    /// Convert a 16-bit value from host order to network order
    pub fn htons(self, value: u16) -> u16 {
        match self {
            ByteOrder::Big => value,
            ByteOrder::Little => value.swap_bytes(),
        }
    }

    /// Convert a 16-bit value from network order to host order
    pub fn ntohs(self, value: u16) -> u16 {
        self.htons(value)
    }
}
