//! Best-effort local address lookup, shown next to the waypipe settings so the
//! user knows where to point the remote side. Display only.

use std::net::{Ipv4Addr, SocketAddr, UdpSocket};

pub trait AddressLookup {
    fn local_ipv4(&self) -> Option<Ipv4Addr>;
}

/// Asks the OS which interface it would route an outbound datagram through.
/// Connecting a UDP socket sends nothing.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemLookup;

impl AddressLookup for SystemLookup {
    fn local_ipv4(&self) -> Option<Ipv4Addr> {
        let socket = UdpSocket::bind((Ipv4Addr::UNSPECIFIED, 0)).ok()?;
        socket.connect((Ipv4Addr::new(192, 0, 2, 1), 9)).ok()?;
        match socket.local_addr().ok()? {
            SocketAddr::V4(addr) if usable(*addr.ip()) => Some(*addr.ip()),
            _ => None,
        }
    }
}

fn usable(ip: Ipv4Addr) -> bool {
    !ip.is_loopback() && !ip.is_unspecified() && !ip.is_link_local()
}

/// Text for the address row.
pub fn display_address(addr: Option<Ipv4Addr>) -> String {
    addr.map_or_else(|| "Not available".to_string(), |ip| ip.to_string())
}
