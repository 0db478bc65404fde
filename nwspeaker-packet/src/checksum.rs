//! Internet checksum (RFC 1071)
//!
//! The one's complement of the one's-complement sum of big-endian 16-bit
//! words. IPv4 runs it over the header, ICMP over the whole message. Callers
//! zero the checksum field before computing; nothing here skips it for them.

/// Calculates the Internet checksum and returns it serialized big-endian.
///
/// An odd trailing byte is treated as the high half of a final word padded
/// with zero, so `checksum16(&[0x01])` equals `checksum16(&[0x01, 0x00])`.
///
/// # Examples
///
/// ```
/// use nwspeaker_packet::checksum::checksum16;
///
/// assert_eq!(checksum16(&[0x00, 0x01, 0xf2, 0x03]), [0x0d, 0xfb]);
/// ```
pub fn checksum16(data: &[u8]) -> [u8; 2] {
    internet_checksum(data).to_be_bytes()
}

/// Calculates the Internet checksum as an integer.
pub fn internet_checksum(data: &[u8]) -> u16 {
    !ones_complement_sum(data)
}

/// Checks a buffer whose checksum field is already filled in.
///
/// Summing a correctly checksummed buffer yields 0xFFFF, whose complement is
/// zero.
pub fn verify(data: &[u8]) -> bool {
    internet_checksum(data) == 0
}

/// One's-complement sum with end-around carry, before the final complement.
pub fn ones_complement_sum(data: &[u8]) -> u16 {
    let mut sum: u32 = 0;

    let mut chunks = data.chunks_exact(2);
    for chunk in &mut chunks {
        sum += u16::from_be_bytes([chunk[0], chunk[1]]) as u32;
        sum = fold(sum);
    }

    if let Some(&byte) = chunks.remainder().first() {
        sum += (byte as u32) << 8;
        sum = fold(sum);
    }

    sum as u16
}

fn fold(mut sum: u32) -> u32 {
    while (sum >> 16) != 0 {
        sum = (sum & 0xFFFF) + (sum >> 16);
    }
    sum
}
