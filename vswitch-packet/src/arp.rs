//! ARP message codec
//!
//! ARP carries four addresses whose widths are declared inside the message
//! itself, so the total length is only known after the fixed 8-byte prefix
//! has been read:
//!
//! ```text
//! htype[2] ptype[2] hlen[1] plen[1] oper[2]
//! sha[hlen] spa[plen] tha[hlen] tpa[plen]
//! ```
//!
//! The full length is checked against the buffer before any address is read.

use bytes::{Buf, BufMut, Bytes, BytesMut};
use std::fmt;
use std::net::Ipv4Addr;
use vswitch_core::{CodecConfig, Error, Result};

use crate::address::MacAddress;
use crate::codec::{ensure_len, Header};
use crate::ethernet::EtherType;

/// Hardware type for Ethernet (10Mb and up)
pub const HTYPE_ETHERNET: u16 = 1;

/// IPv4 address length
const IPV4_ADDR_LEN: u8 = 4;

/// ARP operation
///
/// Equality compares wire opcodes, so `Other(1)` equals `Request` and both
/// survive an encode/decode round trip as the same value.
#[derive(Debug, Clone, Copy)]
pub enum ArpOperation {
    /// ARP Request (1)
    Request,
    /// ARP Reply (2)
    Reply,
    /// Any other opcode
    Other(u16),
}

impl ArpOperation {
    /// Classify a wire opcode
    pub fn from_u16(val: u16) -> Self {
        match val {
            1 => ArpOperation::Request,
            2 => ArpOperation::Reply,
            other => ArpOperation::Other(other),
        }
    }

    /// Wire opcode
    pub fn to_u16(self) -> u16 {
        match self {
            ArpOperation::Request => 1,
            ArpOperation::Reply => 2,
            ArpOperation::Other(val) => val,
        }
    }
}

impl PartialEq for ArpOperation {
    fn eq(&self, other: &Self) -> bool {
        self.to_u16() == other.to_u16()
    }
}

impl Eq for ArpOperation {}

impl fmt::Display for ArpOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match Self::from_u16(self.to_u16()) {
            ArpOperation::Request => write!(f, "request"),
            ArpOperation::Reply => write!(f, "reply"),
            ArpOperation::Other(val) => write!(f, "op {}", val),
        }
    }
}

/// ARP message
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArpMessage {
    /// Hardware type (1 for Ethernet)
    pub htype: u16,
    /// Protocol type (0x0800 for IPv4)
    pub ptype: u16,
    /// Hardware address length
    pub hlen: u8,
    /// Protocol address length
    pub plen: u8,
    /// Operation
    pub operation: ArpOperation,
    /// Sender hardware address (`hlen` bytes)
    pub sender_hw_addr: Bytes,
    /// Sender protocol address (`plen` bytes)
    pub sender_proto_addr: Bytes,
    /// Target hardware address (`hlen` bytes)
    pub target_hw_addr: Bytes,
    /// Target protocol address (`plen` bytes)
    pub target_proto_addr: Bytes,
}

impl ArpMessage {
    /// Size of the fixed part preceding the addresses
    pub const FIXED_SIZE: usize = 8;

    /// Size of an Ethernet/IPv4 message
    pub const ETHERNET_IPV4_SIZE: usize = 28;

    /// Ethernet/IPv4 request with every address zeroed
    pub fn new() -> Self {
        Self::ethernet_ipv4(
            ArpOperation::Request,
            MacAddress::ZERO,
            Ipv4Addr::UNSPECIFIED,
            MacAddress::ZERO,
            Ipv4Addr::UNSPECIFIED,
        )
    }

    /// Request asking who owns `target_ip`
    pub fn request(sender_mac: MacAddress, sender_ip: Ipv4Addr, target_ip: Ipv4Addr) -> Self {
        Self::ethernet_ipv4(
            ArpOperation::Request,
            sender_mac,
            sender_ip,
            MacAddress::ZERO,
            target_ip,
        )
    }

    /// Reply telling `target_mac` that `sender_ip` lives at `sender_mac`
    pub fn reply(
        sender_mac: MacAddress,
        sender_ip: Ipv4Addr,
        target_mac: MacAddress,
        target_ip: Ipv4Addr,
    ) -> Self {
        Self::ethernet_ipv4(
            ArpOperation::Reply,
            sender_mac,
            sender_ip,
            target_mac,
            target_ip,
        )
    }

    fn ethernet_ipv4(
        operation: ArpOperation,
        sender_mac: MacAddress,
        sender_ip: Ipv4Addr,
        target_mac: MacAddress,
        target_ip: Ipv4Addr,
    ) -> Self {
        ArpMessage {
            htype: HTYPE_ETHERNET,
            ptype: EtherType::IPV4.to_u16(),
            hlen: MacAddress::LEN as u8,
            plen: IPV4_ADDR_LEN,
            operation,
            sender_hw_addr: Bytes::copy_from_slice(sender_mac.as_bytes()),
            sender_proto_addr: Bytes::copy_from_slice(&sender_ip.octets()),
            target_hw_addr: Bytes::copy_from_slice(target_mac.as_bytes()),
            target_proto_addr: Bytes::copy_from_slice(&target_ip.octets()),
        }
    }

    /// Total wire length implied by the two declared address lengths.
    ///
    /// Computed in `usize`; the largest possible value is 8 + 2 * 510.
    pub fn required_len(hlen: u8, plen: u8) -> usize {
        Self::FIXED_SIZE + 2 * (hlen as usize + plen as usize)
    }

    /// Protocol addresses are IPv4
    pub fn is_ipv4(&self) -> bool {
        self.ptype == EtherType::IPV4.to_u16()
    }

    /// Operation is a request
    pub fn is_request(&self) -> bool {
        self.operation == ArpOperation::Request
    }

    /// Operation is a reply
    pub fn is_reply(&self) -> bool {
        self.operation == ArpOperation::Reply
    }

    /// Sender and target protocol addresses are the same
    pub fn is_gratuitous(&self) -> bool {
        self.sender_proto_addr == self.target_proto_addr
    }

    /// Sender hardware address, if it is six bytes long
    pub fn sender_mac(&self) -> Option<MacAddress> {
        MacAddress::from_slice(&self.sender_hw_addr)
    }

    /// Target hardware address, if it is six bytes long
    pub fn target_mac(&self) -> Option<MacAddress> {
        MacAddress::from_slice(&self.target_hw_addr)
    }

    /// Sender protocol address, if it is four bytes long
    pub fn sender_ip(&self) -> Option<Ipv4Addr> {
        ipv4_from_slice(&self.sender_proto_addr)
    }

    /// Target protocol address, if it is four bytes long
    pub fn target_ip(&self) -> Option<Ipv4Addr> {
        ipv4_from_slice(&self.target_proto_addr)
    }

    fn check_field(&self, name: &str, field: &Bytes, declared: u8) -> Result<()> {
        if field.len() != declared as usize {
            return Err(Error::malformed(
                Self::LAYER,
                format!(
                    "{} is {} bytes but the declared length is {}",
                    name,
                    field.len(),
                    declared
                ),
            ));
        }
        Ok(())
    }
}

fn ipv4_from_slice(slice: &[u8]) -> Option<Ipv4Addr> {
    let octets: [u8; 4] = slice.try_into().ok()?;
    Some(Ipv4Addr::from(octets))
}

impl Default for ArpMessage {
    fn default() -> Self {
        Self::new()
    }
}

impl Header for ArpMessage {
    const LAYER: &'static str = "arp";
    const MIN_LEN: usize = Self::FIXED_SIZE;

    fn decode_with(data: &[u8], _config: &CodecConfig) -> Result<Self> {
        ensure_len(Self::LAYER, data, Self::FIXED_SIZE)?;

        let mut buf = data;
        let htype = buf.get_u16();
        let ptype = buf.get_u16();
        let hlen = buf.get_u8();
        let plen = buf.get_u8();
        let operation = ArpOperation::from_u16(buf.get_u16());

        ensure_len(Self::LAYER, data, Self::required_len(hlen, plen))?;

        let sender_hw_addr = buf.copy_to_bytes(hlen as usize);
        let sender_proto_addr = buf.copy_to_bytes(plen as usize);
        let target_hw_addr = buf.copy_to_bytes(hlen as usize);
        let target_proto_addr = buf.copy_to_bytes(plen as usize);

        Ok(ArpMessage {
            htype,
            ptype,
            hlen,
            plen,
            operation,
            sender_hw_addr,
            sender_proto_addr,
            target_hw_addr,
            target_proto_addr,
        })
    }

    fn header_len(&self) -> usize {
        Self::required_len(self.hlen, self.plen)
    }

    fn encode_into(&self, buf: &mut BytesMut) -> Result<()> {
        self.check_field("sender hardware address", &self.sender_hw_addr, self.hlen)?;
        self.check_field("sender protocol address", &self.sender_proto_addr, self.plen)?;
        self.check_field("target hardware address", &self.target_hw_addr, self.hlen)?;
        self.check_field("target protocol address", &self.target_proto_addr, self.plen)?;

        buf.reserve(self.header_len());
        buf.put_u16(self.htype);
        buf.put_u16(self.ptype);
        buf.put_u8(self.hlen);
        buf.put_u8(self.plen);
        buf.put_u16(self.operation.to_u16());
        buf.put_slice(&self.sender_hw_addr);
        buf.put_slice(&self.sender_proto_addr);
        buf.put_slice(&self.target_hw_addr);
        buf.put_slice(&self.target_proto_addr);
        Ok(())
    }
}

impl fmt::Display for ArpMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (
            self.sender_mac(),
            self.sender_ip(),
            self.target_ip(),
        ) {
            (Some(sha), Some(spa), Some(tpa)) => write!(
                f,
                "ARP {} {} ({}) -> {}",
                self.operation, spa, sha, tpa
            ),
            _ => write!(
                f,
                "ARP {} htype {} ptype 0x{:04X} hlen {} plen {}",
                self.operation, self.htype, self.ptype, self.hlen, self.plen
            ),
        }
    }
}
