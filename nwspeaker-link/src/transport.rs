//! Raw link-layer transport over `AF_PACKET`
//!
//! A [`LinkTransport`] owns one `SOCK_RAW` packet socket. It is opened for a
//! single EtherType, bound once to a single interface, and from then on sends
//! complete Ethernet frames and receives whatever the kernel delivers for that
//! protocol on that interface. Creating the socket needs `CAP_NET_RAW`.

use std::io;
use std::mem;
use std::os::fd::{AsRawFd, FromRawFd, IntoRawFd, OwnedFd, RawFd};
use std::time::Duration;

use libc::{c_int, c_void, sockaddr, sockaddr_ll, socklen_t, timeval};
use nwspeaker_core::{ByteOrder, Error, MacAddr, Result};
use tracing::{debug, trace};

/// Receive buffer size; larger than any untagged Ethernet frame
pub const RECV_BUFFER_LEN: usize = 4096;

/// Raw `AF_PACKET` socket bound to one protocol and one interface
#[derive(Debug)]
pub struct LinkTransport {
    fd: OwnedFd,
    /// EtherType in host order
    protocol: u16,
    /// EtherType in network order, as `socket(2)` and `sockaddr_ll` want it
    wire_protocol: u16,
    interface_index: Option<c_int>,
}

impl LinkTransport {
    /// Open a raw packet socket for `protocol` (an EtherType).
    pub fn open(protocol: u16, byte_order: ByteOrder) -> Result<Self> {
        let wire_protocol = byte_order.htons(protocol);

        let fd = unsafe {
            libc::socket(
                libc::AF_PACKET,
                libc::SOCK_RAW | libc::SOCK_CLOEXEC,
                wire_protocol as c_int,
            )
        };
        if fd < 0 {
            return Err(Error::Socket(io::Error::last_os_error()));
        }

        debug!("Opened raw socket fd {} for EtherType 0x{:04x}", fd, protocol);

        Ok(Self {
            fd: unsafe { OwnedFd::from_raw_fd(fd) },
            protocol,
            wire_protocol,
            interface_index: None,
        })
    }

    /// Open and bind in one step.
    pub fn open_bound(protocol: u16, interface_index: u32, byte_order: ByteOrder) -> Result<Self> {
        let mut transport = Self::open(protocol, byte_order)?;
        transport.bind(interface_index)?;
        Ok(transport)
    }

    /// Bind the socket to an interface. A transport is bound at most once.
    pub fn bind(&mut self, interface_index: u32) -> Result<()> {
        if let Some(current) = self.interface_index {
            return Err(Error::Bind(io::Error::new(
                io::ErrorKind::AlreadyExists,
                format!("already bound to interface index {}", current),
            )));
        }

        let ifindex = c_int::try_from(interface_index).map_err(|_| {
            Error::Bind(io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("interface index {} out of range", interface_index),
            ))
        })?;

        let addr = self.link_addr(ifindex, None);
        let rc = unsafe {
            libc::bind(
                self.fd.as_raw_fd(),
                &addr as *const sockaddr_ll as *const sockaddr,
                mem::size_of::<sockaddr_ll>() as socklen_t,
            )
        };
        if rc < 0 {
            return Err(Error::Bind(io::Error::last_os_error()));
        }

        self.interface_index = Some(ifindex);
        debug!("Bound raw socket to interface index {}", ifindex);
        Ok(())
    }

    /// Send one complete frame to `destination`. No retry on failure.
    pub fn send(&self, frame: &[u8], destination: MacAddr) -> Result<()> {
        let ifindex = self
            .interface_index
            .ok_or_else(|| Error::transport("send on a transport that is not bound"))?;

        let addr = self.link_addr(ifindex, Some(destination));
        let sent = unsafe {
            libc::sendto(
                self.fd.as_raw_fd(),
                frame.as_ptr() as *const c_void,
                frame.len(),
                0,
                &addr as *const sockaddr_ll as *const sockaddr,
                mem::size_of::<sockaddr_ll>() as socklen_t,
            )
        };
        if sent < 0 {
            return Err(Error::transport(format!(
                "send failed: {}",
                io::Error::last_os_error()
            )));
        }
        if sent as usize != frame.len() {
            return Err(Error::transport(format!(
                "short write: {} of {} bytes",
                sent,
                frame.len()
            )));
        }

        trace!("Sent {} bytes to {}: {:02x?}", frame.len(), destination, frame);
        Ok(())
    }

    /// Block until one frame arrives and return exactly the bytes received.
    ///
    /// Without a deadline from [`set_recv_timeout`](Self::set_recv_timeout)
    /// this waits indefinitely.
    pub fn recv(&self) -> Result<Vec<u8>> {
        let mut buffer = vec![0u8; RECV_BUFFER_LEN];
        let received = unsafe {
            libc::recv(
                self.fd.as_raw_fd(),
                buffer.as_mut_ptr() as *mut c_void,
                buffer.len(),
                0,
            )
        };
        if received < 0 {
            let err = io::Error::last_os_error();
            return match err.kind() {
                io::ErrorKind::WouldBlock | io::ErrorKind::TimedOut => Err(Error::TimedOut),
                _ => Err(Error::transport(format!("recv failed: {}", err))),
            };
        }

        buffer.truncate(received as usize);
        trace!("Received {} bytes", buffer.len());
        Ok(buffer)
    }

    /// Set or clear the `SO_RCVTIMEO` deadline applied to each [`recv`](Self::recv).
    ///
    /// `None` (or a zero duration) restores blocking without a deadline.
    pub fn set_recv_timeout(&self, timeout: Option<Duration>) -> Result<()> {
        let timeout = timeout.unwrap_or(Duration::ZERO);
        // A zero timeval means "no timeout"; round sub-microsecond waits up.
        let micros = if timeout.is_zero() {
            0
        } else {
            timeout.subsec_micros().max(u32::from(timeout.as_secs() == 0))
        };
        let tv = timeval {
            tv_sec: timeout.as_secs() as libc::time_t,
            tv_usec: micros as libc::suseconds_t,
        };

        let rc = unsafe {
            libc::setsockopt(
                self.fd.as_raw_fd(),
                libc::SOL_SOCKET,
                libc::SO_RCVTIMEO,
                &tv as *const timeval as *const c_void,
                mem::size_of::<timeval>() as socklen_t,
            )
        };
        if rc < 0 {
            return Err(Error::transport(format!(
                "failed to set receive timeout: {}",
                io::Error::last_os_error()
            )));
        }
        Ok(())
    }

    /// Release the socket.
    pub fn close(self) -> Result<()> {
        let fd = self.fd.into_raw_fd();
        if unsafe { libc::close(fd) } < 0 {
            return Err(Error::transport(format!(
                "close failed: {}",
                io::Error::last_os_error()
            )));
        }
        debug!("Closed raw socket fd {}", fd);
        Ok(())
    }

    /// EtherType this transport was opened for
    pub fn protocol(&self) -> u16 {
        self.protocol
    }

    /// Interface index, once bound
    pub fn interface_index(&self) -> Option<u32> {
        self.interface_index.map(|index| index as u32)
    }

    fn link_addr(&self, ifindex: c_int, destination: Option<MacAddr>) -> sockaddr_ll {
        let mut addr: sockaddr_ll = unsafe { mem::zeroed() };
        addr.sll_family = libc::AF_PACKET as u16;
        addr.sll_protocol = self.wire_protocol;
        addr.sll_ifindex = ifindex;
        if let Some(mac) = destination {
            addr.sll_halen = MacAddr::LEN as u8;
            addr.sll_addr[..MacAddr::LEN].copy_from_slice(mac.as_bytes());
        }
        addr
    }
}

impl AsRawFd for LinkTransport {
    fn as_raw_fd(&self) -> RawFd {
        self.fd.as_raw_fd()
    }
}
