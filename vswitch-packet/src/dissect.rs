//! Chained decoding of a complete frame
//!
//! [`dissect`] walks a raw frame from the Ethernet header inwards: any number
//! of 802.1Q tags (up to [`CodecConfig::max_vlan_depth`]), then ARP or IPv4,
//! then TCP or UDP. A layer whose type is not handled ends the walk without an
//! error; the caller decides what to do with the remaining bytes.

use std::fmt;
use tracing::{debug, trace};
use vswitch_core::{CodecConfig, Error, Result};

use crate::arp::ArpMessage;
use crate::codec::Header;
use crate::ethernet::{EtherFrame, EtherPayload, EtherType};
use crate::ipv4::{Ipv4Header, Transport};
use crate::tcp::TcpHeader;
use crate::udp::UdpHeader;
use crate::vlan::VlanTag;

/// Layer following the Ethernet header and VLAN tags
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NetworkLayer {
    Arp(ArpMessage),
    Ipv4(Ipv4Header),
}

/// Layer following an IPv4 header
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransportLayer {
    Tcp(TcpHeader),
    Udp(UdpHeader),
}

/// Every header decoded from one frame
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Dissection {
    /// Outer Ethernet header
    pub ethernet: EtherFrame,
    /// 802.1Q tags, outermost first
    pub vlans: Vec<VlanTag>,
    /// ARP or IPv4, if the innermost EtherType is one of them
    pub network: Option<NetworkLayer>,
    /// TCP or UDP, if the IPv4 header announces one and is not a later fragment
    pub transport: Option<TransportLayer>,
    /// Number of bytes consumed by the decoded headers
    pub payload_offset: usize,
}

impl Dissection {
    /// EtherType of the payload after all VLAN tags
    pub fn ethertype(&self) -> EtherType {
        self.vlans
            .last()
            .map(|tag| tag.ethertype)
            .unwrap_or(self.ethernet.ethertype)
    }

    /// Innermost VLAN ID, if the frame is tagged
    pub fn vlan_id(&self) -> Option<u16> {
        self.vlans.last().map(|tag| tag.vlan_id)
    }

    /// ARP message, if the frame carries one
    pub fn arp(&self) -> Option<&ArpMessage> {
        match &self.network {
            Some(NetworkLayer::Arp(arp)) => Some(arp),
            _ => None,
        }
    }

    /// IPv4 header, if the frame carries one
    pub fn ipv4(&self) -> Option<&Ipv4Header> {
        match &self.network {
            Some(NetworkLayer::Ipv4(ip)) => Some(ip),
            _ => None,
        }
    }

    /// Bytes of `frame` that follow the last decoded header
    pub fn payload<'a>(&self, frame: &'a [u8]) -> &'a [u8] {
        frame.get(self.payload_offset..).unwrap_or(&[])
    }
}

impl fmt::Display for Dissection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", self.ethernet)?;
        for tag in &self.vlans {
            writeln!(f, "  {}", tag)?;
        }
        match &self.network {
            Some(NetworkLayer::Arp(arp)) => writeln!(f, "  {}", arp)?,
            Some(NetworkLayer::Ipv4(ip)) => writeln!(f, "  {}", ip)?,
            None => writeln!(f, "  payload type {}", self.ethertype())?,
        }
        match &self.transport {
            Some(TransportLayer::Tcp(tcp)) => writeln!(f, "    {}", tcp)?,
            Some(TransportLayer::Udp(udp)) => writeln!(f, "    {}", udp)?,
            None => {}
        }
        write!(f, "  headers: {} bytes", self.payload_offset)
    }
}

/// Bytes after a `len`-byte layer starting at `start`, or `TooShort` for `layer`
/// if the frame ends first.
fn layer_bytes<'a>(
    frame: &'a [u8],
    start: usize,
    len: usize,
    layer: &'static str,
) -> Result<&'a [u8]> {
    let available = frame.len().saturating_sub(start);
    if available < len {
        return Err(Error::too_short(layer, len, available));
    }
    Ok(&frame[start + len..])
}

/// Decode every recognised header in `frame`
pub fn dissect(frame: &[u8], config: &CodecConfig) -> Result<Dissection> {
    let ethernet = EtherFrame::decode_with(frame, config)?;
    trace!(ethertype = %ethernet.ethertype, "decoded ethernet header");

    let mut offset = ethernet.header_len();
    let mut next = ethernet.next_layer();
    let mut vlans = Vec::new();

    while next == EtherPayload::Vlan {
        if vlans.len() >= config.max_vlan_depth {
            debug!(depth = vlans.len(), "too many stacked VLAN tags");
            return Err(Error::malformed(
                VlanTag::LAYER,
                format!("more than {} stacked tags", config.max_vlan_depth),
            ));
        }
        let tag = VlanTag::decode_with(&frame[offset..], config)?;
        trace!(vlan_id = tag.vlan_id, ethertype = %tag.ethertype, "decoded VLAN tag");
        offset += tag.header_len();
        next = tag.next_layer();
        vlans.push(tag);
    }

    let mut dissection = Dissection {
        ethernet,
        vlans,
        network: None,
        transport: None,
        payload_offset: offset,
    };

    match next {
        EtherPayload::Arp => {
            let arp = ArpMessage::decode_with(&frame[offset..], config)?;
            trace!(operation = %arp.operation, "decoded ARP message");
            dissection.payload_offset = offset + arp.header_len();
            dissection.network = Some(NetworkLayer::Arp(arp));
        }
        EtherPayload::Ipv4 => {
            let ip = Ipv4Header::decode_with(&frame[offset..], config)?;
            trace!(protocol = %ip.protocol, source = %ip.source, destination = %ip.destination, "decoded IPv4 header");
            layer_bytes(frame, offset, ip.payload_offset(), Ipv4Header::LAYER)?;
            offset += ip.payload_offset();
            dissection.payload_offset = offset;
            dissection.network = Some(NetworkLayer::Ipv4(ip));

            if ip.fragment_offset != 0 {
                debug!(
                    fragment_offset = ip.fragment_offset,
                    "later fragment carries no transport header"
                );
                return Ok(dissection);
            }

            match ip.transport() {
                Transport::Tcp => {
                    let tcp = TcpHeader::decode_with(&frame[offset..], config)?;
                    trace!(source_port = tcp.source_port, destination_port = tcp.destination_port, "decoded TCP header");
                    layer_bytes(frame, offset, tcp.payload_offset(), TcpHeader::LAYER)?;
                    dissection.payload_offset = offset + tcp.payload_offset();
                    dissection.transport = Some(TransportLayer::Tcp(tcp));
                }
                Transport::Udp => {
                    let udp = UdpHeader::decode_with(&frame[offset..], config)?;
                    trace!(source_port = udp.source_port, destination_port = udp.destination_port, "decoded UDP header");
                    dissection.payload_offset = offset + udp.header_len();
                    dissection.transport = Some(TransportLayer::Udp(udp));
                }
                Transport::Other(protocol) => {
                    debug!(protocol = %ip.protocol, raw = protocol, "transport not decoded");
                }
            }
        }
        EtherPayload::Vlan | EtherPayload::Unknown(_) => {
            debug!(ethertype = %dissection.ethertype(), "payload not decoded");
        }
    }

    Ok(dissection)
}
