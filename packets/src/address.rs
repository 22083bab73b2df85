// Copyright (c) 2024 Botho Foundation

//! Transport addresses carried in coordination headers.
//!
//! An address occupies a 16-bit port and a 16-byte host field. IPv4 hosts
//! use the first four bytes of the host field and leave the rest zero. The
//! variant is stored separately as a 4-bit tag:
//!
//! | tag | variant |
//! |-----|---------|
//! | 0 | IPv4, WebSocket |
//! | 1 | IPv4, UDP |
//! | 2 | IPv6, WebSocket |
//! | 3 | IPv6, UDP |

use crate::{constants::HOST_LENGTH, PacketError, PacketResult};
use serde::{Deserialize, Serialize};
use std::{
    fmt,
    net::{IpAddr, Ipv4Addr, Ipv6Addr, SocketAddr},
};

const TAG_UDP: u8 = 0b01;
const TAG_IPV6: u8 = 0b10;

/// How a peer is reached.
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransportKind {
    /// WebSocket over TCP
    #[default]
    WebSocket,
    /// Raw UDP datagrams
    Udp,
}

impl TransportKind {
    /// URL scheme for this transport.
    pub fn scheme(&self) -> &'static str {
        match self {
            TransportKind::WebSocket => "ws",
            TransportKind::Udp => "udp",
        }
    }
}

impl fmt::Display for TransportKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TransportKind::WebSocket => write!(f, "websocket"),
            TransportKind::Udp => write!(f, "udp"),
        }
    }
}

/// A reachable endpoint: transport, host and port.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq, Serialize, Deserialize)]
pub struct Address {
    /// Transport used to reach the endpoint
    #[serde(rename = "type", default)]
    pub kind: TransportKind,
    /// Host address
    pub host: IpAddr,
    /// Port number
    pub port: u16,
}

impl Address {
    /// Create an address.
    pub fn new(kind: TransportKind, host: IpAddr, port: u16) -> Self {
        Self { kind, host, port }
    }

    /// WebSocket address.
    pub fn websocket(host: IpAddr, port: u16) -> Self {
        Self::new(TransportKind::WebSocket, host, port)
    }

    /// Socket address of the endpoint.
    pub fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }

    /// URL used to dial the endpoint, e.g. `ws://127.0.0.1:8080/`.
    pub fn url(&self) -> String {
        format!("{}://{}/", self.kind.scheme(), self.socket_addr())
    }

    /// The 4-bit header tag for this address variant.
    pub fn tag(&self) -> u8 {
        let mut tag = 0;
        if self.host.is_ipv6() {
            tag |= TAG_IPV6;
        }
        if self.kind == TransportKind::Udp {
            tag |= TAG_UDP;
        }
        tag
    }

    /// Write port and host at the given header offsets.
    pub(crate) fn write(&self, header: &mut [u8], port_offset: usize, host_offset: usize) {
        header[port_offset..port_offset + 2].copy_from_slice(&self.port.to_be_bytes());

        let host = &mut header[host_offset..host_offset + HOST_LENGTH];
        host.fill(0);
        match self.host {
            IpAddr::V4(v4) => host[..4].copy_from_slice(&v4.octets()),
            IpAddr::V6(v6) => host.copy_from_slice(&v6.octets()),
        }
    }

    /// Read an address of variant `tag` from the given header offsets.
    pub(crate) fn read(
        tag: u8,
        header: &[u8],
        port_offset: usize,
        host_offset: usize,
    ) -> PacketResult<Self> {
        if tag > (TAG_IPV6 | TAG_UDP) {
            return Err(PacketError::UnknownAddressType(tag));
        }

        let kind = if tag & TAG_UDP != 0 {
            TransportKind::Udp
        } else {
            TransportKind::WebSocket
        };

        let port = u16::from_be_bytes([header[port_offset], header[port_offset + 1]]);

        let raw = &header[host_offset..host_offset + HOST_LENGTH];
        let host = if tag & TAG_IPV6 != 0 {
            let mut octets = [0u8; HOST_LENGTH];
            octets.copy_from_slice(raw);
            IpAddr::V6(Ipv6Addr::from(octets))
        } else {
            IpAddr::V4(Ipv4Addr::new(raw[0], raw[1], raw[2], raw[3]))
        };

        Ok(Self { kind, host, port })
    }
}

impl From<SocketAddr> for Address {
    fn from(addr: SocketAddr) -> Self {
        Self::websocket(addr.ip(), addr.port())
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}://{}", self.kind.scheme(), self.socket_addr())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tags() {
        let v4: IpAddr = "10.0.0.1".parse().unwrap();
        let v6: IpAddr = "fe80::1".parse().unwrap();
        assert_eq!(Address::new(TransportKind::WebSocket, v4, 1).tag(), 0);
        assert_eq!(Address::new(TransportKind::Udp, v4, 1).tag(), 1);
        assert_eq!(Address::new(TransportKind::WebSocket, v6, 1).tag(), 2);
        assert_eq!(Address::new(TransportKind::Udp, v6, 1).tag(), 3);
    }

    #[test]
    fn test_ipv6_layout() {
        let address = Address::websocket("2001:db8::ff00:42:8329".parse().unwrap(), 0x1f90);
        let mut header = [0u8; 64];
        address.write(&mut header, 12, 16);

        assert_eq!(&header[12..14], &[0x1f, 0x90]);
        assert_eq!(
            &header[16..32],
            &[0x20, 0x01, 0x0d, 0xb8, 0, 0, 0, 0, 0, 0, 0xff, 0x00, 0x00, 0x42, 0x83, 0x29]
        );
        assert_eq!(Address::read(address.tag(), &header, 12, 16), Ok(address));
    }

    #[test]
    fn test_ipv4_layout() {
        let address = Address::new(TransportKind::Udp, "192.168.1.20".parse().unwrap(), 443);
        let mut header = [0xeeu8; 64];
        address.write(&mut header, 14, 32);

        assert_eq!(&header[14..16], &[0x01, 0xbb]);
        assert_eq!(&header[32..36], &[192, 168, 1, 20]);
        assert!(header[36..48].iter().all(|&b| b == 0));
        assert_eq!(Address::read(address.tag(), &header, 14, 32), Ok(address));
    }

    #[test]
    fn test_unknown_tag() {
        let header = [0u8; 64];
        assert_eq!(
            Address::read(4, &header, 12, 16),
            Err(PacketError::UnknownAddressType(4))
        );
    }

    #[test]
    fn test_url() {
        let v4 = Address::websocket("127.0.0.1".parse().unwrap(), 8080);
        assert_eq!(v4.url(), "ws://127.0.0.1:8080/");
        let v6 = Address::websocket("::1".parse().unwrap(), 8080);
        assert_eq!(v6.url(), "ws://[::1]:8080/");
    }

    #[test]
    fn test_serde_field_names() {
        #[derive(Deserialize)]
        struct Wrapper {
            coordination: Address,
        }
        let wrapper: Wrapper = toml::from_str(
            "[coordination]\ntype = \"udp\"\nhost = \"::1\"\nport = 9000\n",
        )
        .unwrap();
        assert_eq!(
            wrapper.coordination,
            Address::new(TransportKind::Udp, "::1".parse().unwrap(), 9000)
        );
    }
}
