//! Ethernet II header codec
//!
//! This module decodes and encodes the 14-byte Ethernet II header and
//! classifies the payload by EtherType. Payload bytes are never copied; the
//! next layer starts at [`EtherFrame::HEADER_SIZE`] in the input buffer.

use bytes::{Buf, BufMut, BytesMut};
use std::fmt;
use vswitch_core::{CodecConfig, Result};

use crate::address::MacAddress;
use crate::codec::{ensure_len, Header};

/// EtherType field value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct EtherType(pub u16);

impl EtherType {
    /// IPv4 (0x0800)
    pub const IPV4: EtherType = EtherType(0x0800);

    /// ARP (0x0806)
    pub const ARP: EtherType = EtherType(0x0806);

    /// 802.1Q VLAN-tagged frame (0x8100)
    pub const VLAN: EtherType = EtherType(0x8100);

    /// IPv6 (0x86DD), recognised but not decoded
    pub const IPV6: EtherType = EtherType(0x86DD);

    /// Wrap a raw EtherType value
    pub fn new(value: u16) -> Self {
        EtherType(value)
    }

    /// Raw EtherType value
    pub fn to_u16(self) -> u16 {
        self.0
    }

    /// Classify the layer this EtherType announces
    pub fn next_layer(self) -> EtherPayload {
        match self {
            EtherType::VLAN => EtherPayload::Vlan,
            EtherType::ARP => EtherPayload::Arp,
            EtherType::IPV4 => EtherPayload::Ipv4,
            EtherType(other) => EtherPayload::Unknown(other),
        }
    }
}

impl From<u16> for EtherType {
    fn from(value: u16) -> Self {
        EtherType(value)
    }
}

impl From<EtherType> for u16 {
    fn from(ethertype: EtherType) -> Self {
        ethertype.0
    }
}

impl fmt::Display for EtherType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            EtherType::IPV4 => write!(f, "IPv4"),
            EtherType::ARP => write!(f, "ARP"),
            EtherType::VLAN => write!(f, "VLAN"),
            EtherType::IPV6 => write!(f, "IPv6"),
            EtherType(val) => write!(f, "0x{:04X}", val),
        }
    }
}

/// The layer that follows an Ethernet header or VLAN tag
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EtherPayload {
    /// An 802.1Q tag follows
    Vlan,
    /// An ARP message follows
    Arp,
    /// An IPv4 header follows
    Ipv4,
    /// Anything else, carrying the raw EtherType
    Unknown(u16),
}

/// Ethernet II header
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EtherFrame {
    /// Destination MAC address
    pub destination: MacAddress,
    /// Source MAC address
    pub source: MacAddress,
    /// EtherType
    pub ethertype: EtherType,
}

impl EtherFrame {
    /// Ethernet header size (dst + src + type)
    pub const HEADER_SIZE: usize = 14;

    /// Create a header with zeroed addresses
    pub fn new(ethertype: EtherType) -> Self {
        EtherFrame {
            destination: MacAddress::ZERO,
            source: MacAddress::ZERO,
            ethertype,
        }
    }

    /// Create a header with explicit addresses
    pub fn with_addresses(
        destination: MacAddress,
        source: MacAddress,
        ethertype: EtherType,
    ) -> Self {
        EtherFrame {
            destination,
            source,
            ethertype,
        }
    }

    /// Header announcing an ARP payload
    pub fn arp() -> Self {
        Self::new(EtherType::ARP)
    }

    /// Header announcing an IPv4 payload
    pub fn ipv4() -> Self {
        Self::new(EtherType::IPV4)
    }

    /// Classify the layer that follows this header
    pub fn next_layer(&self) -> EtherPayload {
        self.ethertype.next_layer()
    }

    /// Check if an 802.1Q tag follows
    pub fn is_vlan(&self) -> bool {
        self.ethertype == EtherType::VLAN
    }

    /// Check if an ARP message follows
    pub fn is_arp(&self) -> bool {
        self.ethertype == EtherType::ARP
    }

    /// Check if an IPv4 header follows
    pub fn is_ipv4(&self) -> bool {
        self.ethertype == EtherType::IPV4
    }
}

impl Header for EtherFrame {
    const LAYER: &'static str = "ethernet";
    const MIN_LEN: usize = Self::HEADER_SIZE;

    fn decode_with(data: &[u8], _config: &CodecConfig) -> Result<Self> {
        ensure_len(Self::LAYER, data, Self::HEADER_SIZE)?;

        let mut buf = &data[..Self::HEADER_SIZE];
        let mut destination = [0u8; 6];
        buf.copy_to_slice(&mut destination);
        let mut source = [0u8; 6];
        buf.copy_to_slice(&mut source);
        let ethertype = EtherType(buf.get_u16());

        Ok(EtherFrame {
            destination: MacAddress(destination),
            source: MacAddress(source),
            ethertype,
        })
    }

    fn header_len(&self) -> usize {
        Self::HEADER_SIZE
    }

    fn encode_into(&self, buf: &mut BytesMut) -> Result<()> {
        buf.put_slice(self.destination.as_bytes());
        buf.put_slice(self.source.as_bytes());
        buf.put_u16(self.ethertype.to_u16());
        Ok(())
    }
}

impl fmt::Display for EtherFrame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Ethernet {} > {} type {}",
            self.source, self.destination, self.ethertype
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ethertype_classification() {
        assert_eq!(EtherType::VLAN.next_layer(), EtherPayload::Vlan);
        assert_eq!(EtherType::ARP.next_layer(), EtherPayload::Arp);
        assert_eq!(EtherType::IPV4.next_layer(), EtherPayload::Ipv4);
        assert_eq!(
            EtherType::IPV6.next_layer(),
            EtherPayload::Unknown(0x86DD)
        );
        assert_eq!(EtherType(0x1234).next_layer(), EtherPayload::Unknown(0x1234));
    }

    #[test]
    fn test_ethertype_display() {
        assert_eq!(EtherType::IPV4.to_string(), "IPv4");
        assert_eq!(EtherType(0x88CC).to_string(), "0x88CC");
    }

    #[test]
    fn test_decode_ipv4_type() {
        let mut data = [0u8; 14];
        data[12] = 0x08;
        data[13] = 0x00;

        let frame = EtherFrame::decode(&data).unwrap();
        assert_eq!(frame.ethertype.to_u16(), 0x0800);
        assert!(frame.is_ipv4());
        assert!(!frame.is_arp());
        assert!(!frame.is_vlan());
        assert_eq!(frame.next_layer(), EtherPayload::Ipv4);
    }

    #[test]
    fn test_decode_addresses() {
        let data = vec![
            0xAA, 0xBB, 0xCC, 0xDD, 0xEE, 0xFF, // dst
            0x00, 0x11, 0x22, 0x33, 0x44, 0x55, // src
            0x08, 0x06, // ARP
            0x01, 0x02, 0x03, 0x04, // payload, untouched
        ];

        let frame = EtherFrame::decode(&data).unwrap();
        assert_eq!(frame.destination.0, [0xAA, 0xBB, 0xCC, 0xDD, 0xEE, 0xFF]);
        assert_eq!(frame.source.0, [0x00, 0x11, 0x22, 0x33, 0x44, 0x55]);
        assert!(frame.is_arp());
        assert_eq!(frame.header_len(), 14);
    }

    #[test]
    fn test_decode_too_short() {
        for len in 0..EtherFrame::HEADER_SIZE {
            let err = EtherFrame::decode(&vec![0u8; len]).unwrap_err();
            assert!(err.is_truncation(), "length {} accepted", len);
        }
    }

    #[test]
    fn test_encode_layout() {
        let frame = EtherFrame::with_addresses(
            MacAddress::BROADCAST,
            MacAddress::DEFAULT,
            EtherType::VLAN,
        );
        let bytes = frame.encode().unwrap();

        assert_eq!(bytes.len(), 14);
        assert_eq!(&bytes[0..6], &[0xFF; 6]);
        assert_eq!(&bytes[6..12], MacAddress::DEFAULT.as_bytes());
        assert_eq!(&bytes[12..14], &[0x81, 0x00]);
    }

    #[test]
    fn test_default_constructors() {
        let arp = EtherFrame::arp();
        assert!(arp.is_arp());
        assert_eq!(arp.source, MacAddress::ZERO);
        assert_eq!(arp.destination, MacAddress::ZERO);

        assert!(EtherFrame::ipv4().is_ipv4());
    }

    #[test]
    fn test_roundtrip() {
        let frame = EtherFrame::with_addresses(
            MacAddress([0xAA, 0xBB, 0xCC, 0xDD, 0xEE, 0xFF]),
            MacAddress([0x00, 0x11, 0x22, 0x33, 0x44, 0x55]),
            EtherType(0x1234),
        );
        let bytes = frame.encode().unwrap();
        assert_eq!(EtherFrame::decode(&bytes).unwrap(), frame);
    }
}
