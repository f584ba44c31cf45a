//! 802.1Q VLAN tag codec
//!
//! The tag follows an Ethernet header whose EtherType is 0x8100. On the wire
//! it is four bytes:
//!
//! ```text
//! | tag control (4 bits) | VLAN ID (12 bits) | inner EtherType (16 bits) |
//! ```
//!
//! The tag control nibble carries the 3-bit priority code point followed by
//! the drop eligible indicator. VLAN IDs 0 and 4095 are reserved by 802.1Q but
//! still appear on the wire, so the codec accepts the full 12-bit range.

use bytes::{Buf, BufMut, BytesMut};
use std::fmt;
use vswitch_core::{CodecConfig, Error, Result};

use crate::codec::{ensure_len, Header};
use crate::ethernet::{EtherPayload, EtherType};

/// VLAN ID mask (12 bits)
const VLAN_ID_MASK: u16 = 0x0FFF;

/// Largest value the 12-bit VLAN ID field can carry
pub const MAX_VLAN_ID: u16 = 4095;

/// Largest value of the 4-bit tag control field
pub const MAX_TAG_CONTROL: u8 = 0x0F;

/// 802.1Q tag
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VlanTag {
    /// Priority and drop-eligible bits (top nibble of the TCI)
    pub tag_control: u8,
    /// VLAN identifier (0-4095)
    pub vlan_id: u16,
    /// EtherType of the encapsulated payload
    pub ethertype: EtherType,
}

impl VlanTag {
    /// Size of the tag in bytes
    pub const HEADER_SIZE: usize = 4;

    /// Create a tag, validating both bit-packed fields
    pub fn new(tag_control: u8, vlan_id: u16, ethertype: EtherType) -> Result<Self> {
        let tag = VlanTag {
            tag_control,
            vlan_id,
            ethertype,
        };
        tag.validate()?;
        Ok(tag)
    }

    fn validate(&self) -> Result<()> {
        if self.tag_control > MAX_TAG_CONTROL {
            return Err(Error::invalid_field(
                "tag_control",
                format!("{} does not fit in 4 bits", self.tag_control),
            ));
        }
        if self.vlan_id > MAX_VLAN_ID {
            return Err(Error::invalid_field(
                "vlan_id",
                format!("{} exceeds {}", self.vlan_id, MAX_VLAN_ID),
            ));
        }
        Ok(())
    }

    /// Tag control information as it appears on the wire
    pub fn tci(&self) -> u16 {
        ((self.tag_control as u16) << 12) | (self.vlan_id & VLAN_ID_MASK)
    }

    /// Priority code point (0-7)
    pub fn priority(&self) -> u8 {
        (self.tag_control >> 1) & 0x07
    }

    /// Drop eligible indicator
    pub fn drop_eligible(&self) -> bool {
        self.tag_control & 0x01 != 0
    }

    /// Classify the layer that follows this tag
    pub fn next_layer(&self) -> EtherPayload {
        self.ethertype.next_layer()
    }
}

impl Header for VlanTag {
    const LAYER: &'static str = "vlan";
    const MIN_LEN: usize = Self::HEADER_SIZE;

    fn decode_with(data: &[u8], _config: &CodecConfig) -> Result<Self> {
        ensure_len(Self::LAYER, data, Self::HEADER_SIZE)?;

        let mut buf = &data[..Self::HEADER_SIZE];
        let tci = buf.get_u16();
        let ethertype = EtherType(buf.get_u16());

        Ok(VlanTag {
            tag_control: (tci >> 12) as u8,
            vlan_id: tci & VLAN_ID_MASK,
            ethertype,
        })
    }

    fn header_len(&self) -> usize {
        Self::HEADER_SIZE
    }

    fn encode_into(&self, buf: &mut BytesMut) -> Result<()> {
        self.validate()?;
        buf.put_u16(self.tci());
        buf.put_u16(self.ethertype.to_u16());
        Ok(())
    }
}

impl fmt::Display for VlanTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "VLAN {} (Priority: {}, DEI: {}) type {}",
            self.vlan_id,
            self.priority(),
            if self.drop_eligible() { "1" } else { "0" },
            self.ethertype
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_split() {
        // PCP=5, DEI=0, VID=100, inner IPv4
        let data = [0xA0, 0x64, 0x08, 0x00];
        let tag = VlanTag::decode(&data).unwrap();

        assert_eq!(tag.tag_control, 0x0A);
        assert_eq!(tag.vlan_id, 100);
        assert_eq!(tag.priority(), 5);
        assert!(!tag.drop_eligible());
        assert_eq!(tag.next_layer(), EtherPayload::Ipv4);
    }

    #[test]
    fn test_decode_too_short() {
        for len in 0..VlanTag::HEADER_SIZE {
            let err = VlanTag::decode(&vec![0x81; len]).unwrap_err();
            assert_eq!(err, Error::too_short("vlan", 4, len));
        }
    }

    #[test]
    fn test_max_vlan_id_roundtrip() {
        let tag = VlanTag::new(0, 4095, EtherType::ARP).unwrap();
        let bytes = tag.encode().unwrap();
        assert_eq!(&bytes[..], &[0x0F, 0xFF, 0x08, 0x06]);

        let decoded = VlanTag::decode(&bytes).unwrap();
        assert_eq!(decoded.vlan_id, 4095);
        assert_eq!(decoded.tag_control, 0);
    }

    #[test]
    fn test_tci_reconstructs_bits() {
        for tci in [0x0000u16, 0x0001, 0x1FFF, 0xA064, 0xF000, 0xFFFF] {
            let wire = [(tci >> 8) as u8, tci as u8, 0x08, 0x00];
            let tag = VlanTag::decode(&wire).unwrap();
            assert_eq!(tag.tci(), tci);
            assert_eq!(&tag.encode().unwrap()[..], &wire);
        }
    }

    #[test]
    fn test_new_rejects_out_of_range() {
        assert!(VlanTag::new(0, 4096, EtherType::IPV4).is_err());
        assert!(VlanTag::new(16, 1, EtherType::IPV4).is_err());
        assert!(VlanTag::new(15, 4095, EtherType::IPV4).is_ok());
    }

    #[test]
    fn test_encode_rejects_wide_vlan_id() {
        // Built directly so validation only happens at encode time
        let tag = VlanTag {
            tag_control: 0,
            vlan_id: 0x1001,
            ethertype: EtherType::IPV4,
        };
        match tag.encode() {
            Err(Error::InvalidField { name, .. }) => assert_eq!(name, "vlan_id"),
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn test_display() {
        let tag = VlanTag::new(0x0B, 200, EtherType::IPV4).unwrap();
        let display = tag.to_string();
        assert!(display.contains("VLAN 200"));
        assert!(display.contains("Priority: 5"));
        assert!(display.contains("DEI: 1"));
    }
}
