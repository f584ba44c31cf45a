//! Frame builder with a fluent API
//!
//! Headers are supplied as already-constructed values and encoded as-is, so
//! length, checksum and ethertype fields are whatever the caller set.

use bytes::{BufMut, Bytes, BytesMut};
use vswitch_core::{Error, Result};

use crate::arp::ArpMessage;
use crate::codec::Header;
use crate::ethernet::EtherFrame;
use crate::ipv4::Ipv4Header;
use crate::tcp::TcpHeader;
use crate::udp::UdpHeader;
use crate::vlan::VlanTag;

/// Layer carried after the Ethernet header and tags
#[derive(Debug, Clone)]
enum Network {
    Arp(ArpMessage),
    Ipv4(Ipv4Header),
}

/// Layer carried by IPv4
#[derive(Debug, Clone, Copy)]
enum Transport {
    Tcp(TcpHeader),
    Udp(UdpHeader),
}

/// Frame builder
///
/// # Examples
///
/// ```
/// use std::net::Ipv4Addr;
/// use vswitch_packet::{ArpMessage, EtherFrame, EtherType, FrameBuilder, MacAddress};
///
/// let frame = FrameBuilder::new()
///     .ethernet(EtherFrame::with_addresses(
///         MacAddress::BROADCAST,
///         MacAddress::DEFAULT,
///         EtherType::ARP,
///     ))
///     .arp(ArpMessage::request(
///         MacAddress::DEFAULT,
///         Ipv4Addr::new(192, 168, 1, 10),
///         Ipv4Addr::new(192, 168, 1, 1),
///     ))
///     .build()
///     .unwrap();
///
/// assert_eq!(frame.len(), 42);
/// ```
#[derive(Debug, Clone, Default)]
pub struct FrameBuilder {
    ethernet: Option<EtherFrame>,
    vlans: Vec<VlanTag>,
    network: Vec<Network>,
    transport: Option<Transport>,
    payload: Vec<u8>,
}

impl FrameBuilder {
    /// Create an empty builder
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the Ethernet header
    pub fn ethernet(mut self, frame: EtherFrame) -> Self {
        self.ethernet = Some(frame);
        self
    }

    /// Append an 802.1Q tag; tags are written in the order they are added
    pub fn vlan(mut self, tag: VlanTag) -> Self {
        self.vlans.push(tag);
        self
    }

    /// Add an ARP message
    pub fn arp(mut self, arp: ArpMessage) -> Self {
        self.network.push(Network::Arp(arp));
        self
    }

    /// Add an IPv4 header
    pub fn ipv4(mut self, ip: Ipv4Header) -> Self {
        self.network.push(Network::Ipv4(ip));
        self
    }

    /// Set a TCP header; replaces any transport set earlier
    pub fn tcp(mut self, tcp: TcpHeader) -> Self {
        self.transport = Some(Transport::Tcp(tcp));
        self
    }

    /// Set a UDP header; replaces any transport set earlier
    pub fn udp(mut self, udp: UdpHeader) -> Self {
        self.transport = Some(Transport::Udp(udp));
        self
    }

    /// Set the payload data
    pub fn payload(mut self, data: impl Into<Vec<u8>>) -> Self {
        self.payload = data.into();
        self
    }

    /// Encode every configured layer in order
    ///
    /// # Errors
    ///
    /// Returns `PacketConstruction` if the layers do not stack (no Ethernet
    /// header, more than one network layer, a transport header without IPv4),
    /// or the first error raised by a layer's encoder.
    pub fn build(self) -> Result<Bytes> {
        let ethernet = self
            .ethernet
            .ok_or_else(|| Error::PacketConstruction("an Ethernet header is required".into()))?;

        if self.network.len() > 1 {
            return Err(Error::PacketConstruction(
                "only one of ARP or IPv4 may follow the Ethernet header".into(),
            ));
        }
        let network = self.network.into_iter().next();

        if self.transport.is_some() && !matches!(network, Some(Network::Ipv4(_))) {
            return Err(Error::PacketConstruction(
                "a TCP or UDP header requires an IPv4 header".into(),
            ));
        }

        let mut len = ethernet.header_len()
            + self.vlans.iter().map(Header::header_len).sum::<usize>()
            + self.payload.len();
        len += match &network {
            Some(Network::Arp(arp)) => arp.header_len(),
            Some(Network::Ipv4(ip)) => ip.header_len(),
            None => 0,
        };
        len += match &self.transport {
            Some(Transport::Tcp(tcp)) => tcp.header_len(),
            Some(Transport::Udp(udp)) => udp.header_len(),
            None => 0,
        };

        let mut buf = BytesMut::with_capacity(len);
        ethernet.encode_into(&mut buf)?;
        for tag in &self.vlans {
            tag.encode_into(&mut buf)?;
        }
        match &network {
            Some(Network::Arp(arp)) => arp.encode_into(&mut buf)?,
            Some(Network::Ipv4(ip)) => ip.encode_into(&mut buf)?,
            None => {}
        }
        match &self.transport {
            Some(Transport::Tcp(tcp)) => tcp.encode_into(&mut buf)?,
            Some(Transport::Udp(udp)) => udp.encode_into(&mut buf)?,
            None => {}
        }
        buf.put_slice(&self.payload);

        Ok(buf.freeze())
    }
}
