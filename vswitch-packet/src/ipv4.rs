//! IPv4 header codec
//!
//! Only the fixed 20-byte header is decoded. Options announced by an IHL above
//! five are skipped or rejected according to [`OptionsPolicy`]; they are never
//! parsed and never re-encoded. The header checksum is carried as-is.

use bytes::{Buf, BufMut, BytesMut};
use std::borrow::Cow;
use std::fmt;
use std::net::Ipv4Addr;
use vswitch_core::{CodecConfig, Error, Result};

use crate::codec::{ensure_len, Header};

/// IP version handled by this codec
pub const IPV4_VERSION: u8 = 4;

/// IHL of a header without options
pub const MIN_IHL: u8 = 5;

/// Fragment offset mask (13 bits)
const FRAGMENT_OFFSET_MASK: u16 = 0x1FFF;

/// Largest 3-bit flags value
const MAX_FLAGS: u8 = 0b111;

/// Don't Fragment bit within the 3-bit flags
pub const FLAG_DONT_FRAGMENT: u8 = 0b010;

/// More Fragments bit within the 3-bit flags
pub const FLAG_MORE_FRAGMENTS: u8 = 0b001;

/// IP protocol number
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct IpProtocol(pub u8);

impl IpProtocol {
    /// ICMP (1)
    pub const ICMP: IpProtocol = IpProtocol(0x01);
    /// IGMP (2)
    pub const IGMP: IpProtocol = IpProtocol(0x02);
    /// IP-in-IP (4)
    pub const IPIP: IpProtocol = IpProtocol(0x04);
    /// TCP (6)
    pub const TCP: IpProtocol = IpProtocol(0x06);
    /// UDP (17)
    pub const UDP: IpProtocol = IpProtocol(0x11);
    /// ESP (50)
    pub const ESP: IpProtocol = IpProtocol(0x32);
    /// AH (51)
    pub const AH: IpProtocol = IpProtocol(0x33);
    /// OSPF (89)
    pub const OSPF: IpProtocol = IpProtocol(0x59);
    /// PIM (103)
    pub const PIM: IpProtocol = IpProtocol(0x67);
    /// VRRP (112)
    pub const VRRP: IpProtocol = IpProtocol(0x70);
    /// IS-IS over IPv4 (124)
    pub const ISIS: IpProtocol = IpProtocol(0x7C);

    /// Raw protocol number
    pub fn to_u8(self) -> u8 {
        self.0
    }

    /// Canonical lowercase name, or two hex digits for unlisted numbers
    pub fn name(self) -> Cow<'static, str> {
        match self {
            IpProtocol::ICMP => Cow::Borrowed("icmp"),
            IpProtocol::IGMP => Cow::Borrowed("igmp"),
            IpProtocol::IPIP => Cow::Borrowed("ipip"),
            IpProtocol::TCP => Cow::Borrowed("tcp"),
            IpProtocol::UDP => Cow::Borrowed("udp"),
            IpProtocol::ESP => Cow::Borrowed("esp"),
            IpProtocol::AH => Cow::Borrowed("ah"),
            IpProtocol::OSPF => Cow::Borrowed("ospf"),
            IpProtocol::PIM => Cow::Borrowed("pim"),
            IpProtocol::VRRP => Cow::Borrowed("vrrp"),
            IpProtocol::ISIS => Cow::Borrowed("isis"),
            IpProtocol(other) => Cow::Owned(format!("{:02x}", other)),
        }
    }

    /// Classify the transport layer this protocol number announces
    pub fn transport(self) -> Transport {
        match self {
            IpProtocol::TCP => Transport::Tcp,
            IpProtocol::UDP => Transport::Udp,
            IpProtocol(other) => Transport::Other(other),
        }
    }
}

impl From<u8> for IpProtocol {
    fn from(value: u8) -> Self {
        IpProtocol(value)
    }
}

impl fmt::Display for IpProtocol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name())
    }
}

/// Name of an IPv4 protocol number for logs and diagnostics
pub fn ip_proto_name(protocol: u8) -> Cow<'static, str> {
    IpProtocol(protocol).name()
}

/// The layer that follows an IPv4 header
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transport {
    Tcp,
    Udp,
    /// Any other protocol, carrying the raw number
    Other(u8),
}

/// IPv4 header
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ipv4Header {
    /// Version (always 4)
    pub version: u8,
    /// Internet Header Length in 32-bit words
    pub ihl: u8,
    /// Type of Service / DSCP
    pub tos: u8,
    /// Total length (header + data) in bytes
    pub total_length: u16,
    /// Identification
    pub identification: u16,
    /// Flags (3 bits: reserved, DF, MF)
    pub flags: u8,
    /// Fragment offset in 8-byte blocks (13 bits)
    pub fragment_offset: u16,
    /// Time to Live
    pub ttl: u8,
    /// Protocol
    pub protocol: IpProtocol,
    /// Header checksum, not validated
    pub checksum: u16,
    /// Source address
    pub source: Ipv4Addr,
    /// Destination address
    pub destination: Ipv4Addr,
}

impl Ipv4Header {
    /// Size of the fixed header
    pub const HEADER_SIZE: usize = 20;

    /// Header with IHL 5, TTL 255 and everything else zero
    pub fn new() -> Self {
        Ipv4Header {
            version: IPV4_VERSION,
            ihl: MIN_IHL,
            tos: 0,
            total_length: 0,
            identification: 0,
            flags: 0,
            fragment_offset: 0,
            ttl: 0xFF,
            protocol: IpProtocol(0),
            checksum: 0,
            source: Ipv4Addr::UNSPECIFIED,
            destination: Ipv4Addr::UNSPECIFIED,
        }
    }

    /// Header addressed from `source` to `destination` carrying `protocol`
    pub fn with_addresses(source: Ipv4Addr, destination: Ipv4Addr, protocol: IpProtocol) -> Self {
        Ipv4Header {
            source,
            destination,
            protocol,
            ..Self::new()
        }
    }

    /// Transport layer announced by the protocol field
    pub fn transport(&self) -> Transport {
        self.protocol.transport()
    }

    /// Offset of the transport header from the start of this header.
    ///
    /// Options are skipped, so this is `IHL * 4`, never less than the fixed
    /// header size.
    pub fn payload_offset(&self) -> usize {
        (self.ihl.max(MIN_IHL) as usize) * 4
    }

    /// Don't Fragment bit is set
    pub fn dont_fragment(&self) -> bool {
        self.flags & FLAG_DONT_FRAGMENT != 0
    }

    /// More Fragments bit is set
    pub fn more_fragments(&self) -> bool {
        self.flags & FLAG_MORE_FRAGMENTS != 0
    }

    /// Part of a fragmented datagram
    pub fn is_fragment(&self) -> bool {
        self.more_fragments() || self.fragment_offset != 0
    }

    fn validate(&self) -> Result<()> {
        if self.version != IPV4_VERSION {
            return Err(Error::UnsupportedVersion {
                version: self.version,
            });
        }
        if self.ihl > 0x0F {
            return Err(Error::invalid_field(
                "ihl",
                format!("{} does not fit in 4 bits", self.ihl),
            ));
        }
        if self.flags > MAX_FLAGS {
            return Err(Error::invalid_field(
                "flags",
                format!("{:#05b} does not fit in 3 bits", self.flags),
            ));
        }
        if self.fragment_offset > FRAGMENT_OFFSET_MASK {
            return Err(Error::invalid_field(
                "fragment_offset",
                format!("{} does not fit in 13 bits", self.fragment_offset),
            ));
        }
        Ok(())
    }
}

impl Default for Ipv4Header {
    fn default() -> Self {
        Self::new()
    }
}

impl Header for Ipv4Header {
    const LAYER: &'static str = "ipv4";
    const MIN_LEN: usize = Self::HEADER_SIZE;

    fn decode_with(data: &[u8], config: &CodecConfig) -> Result<Self> {
        ensure_len(Self::LAYER, data, Self::HEADER_SIZE)?;

        let mut buf = &data[..Self::HEADER_SIZE];
        let version_ihl = buf.get_u8();
        let version = version_ihl >> 4;
        let ihl = version_ihl & 0x0F;
        let tos = buf.get_u8();
        let total_length = buf.get_u16();
        let identification = buf.get_u16();
        let flags_and_offset = buf.get_u16();
        let ttl = buf.get_u8();
        let protocol = IpProtocol(buf.get_u8());
        let checksum = buf.get_u16();

        if version != IPV4_VERSION {
            return Err(Error::UnsupportedVersion { version });
        }

        if config.rejects_options() {
            if ihl < MIN_IHL {
                return Err(Error::malformed(
                    Self::LAYER,
                    format!("IHL {} is below the minimum of {}", ihl, MIN_IHL),
                ));
            }
            if ihl > MIN_IHL {
                return Err(Error::UnsupportedOptions {
                    layer: Self::LAYER,
                    header_len: ihl as usize * 4,
                });
            }
        }

        let source = Ipv4Addr::from(buf.get_u32());
        let destination = Ipv4Addr::from(buf.get_u32());

        Ok(Ipv4Header {
            version,
            ihl,
            tos,
            total_length,
            identification,
            flags: (flags_and_offset >> 13) as u8,
            fragment_offset: flags_and_offset & FRAGMENT_OFFSET_MASK,
            ttl,
            protocol,
            checksum,
            source,
            destination,
        })
    }

    /// Always the fixed 20 bytes, whatever the IHL says; see `payload_offset`
    fn header_len(&self) -> usize {
        Self::HEADER_SIZE
    }

    fn encode_into(&self, buf: &mut BytesMut) -> Result<()> {
        self.validate()?;

        buf.put_u8((self.version << 4) | self.ihl);
        buf.put_u8(self.tos);
        buf.put_u16(self.total_length);
        buf.put_u16(self.identification);
        buf.put_u16(((self.flags as u16) << 13) | self.fragment_offset);
        buf.put_u8(self.ttl);
        buf.put_u8(self.protocol.to_u8());
        buf.put_u16(self.checksum);
        buf.put_slice(&self.source.octets());
        buf.put_slice(&self.destination.octets());
        Ok(())
    }
}

impl fmt::Display for Ipv4Header {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "IPv4 {} > {} proto {} ttl {} len {}",
            self.source, self.destination, self.protocol, self.ttl, self.total_length
        )?;
        if self.is_fragment() {
            write!(f, " frag {}", self.fragment_offset)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use vswitch_core::OptionsPolicy;

    fn sample_bytes() -> Vec<u8> {
        vec![
            0x45, // version 4, IHL 5
            0x00, // ToS
            0x00, 0x3C, // total length 60
            0x1C, 0x46, // identification
            0x40, 0x00, // DF, offset 0
            0x40, // TTL 64
            0x06, // TCP
            0xB1, 0xE6, // checksum
            0xC0, 0xA8, 0x01, 0x01, // 192.168.1.1
            0xC0, 0xA8, 0x01, 0x02, // 192.168.1.2
        ]
    }

    #[test]
    fn test_protocol_names() {
        assert_eq!(IpProtocol::ICMP.name(), "icmp");
        assert_eq!(IpProtocol::IGMP.name(), "igmp");
        assert_eq!(IpProtocol::IPIP.name(), "ipip");
        assert_eq!(IpProtocol::TCP.name(), "tcp");
        assert_eq!(IpProtocol::UDP.name(), "udp");
        assert_eq!(IpProtocol::ESP.name(), "esp");
        assert_eq!(IpProtocol::AH.name(), "ah");
        assert_eq!(IpProtocol::OSPF.name(), "ospf");
        assert_eq!(IpProtocol::PIM.name(), "pim");
        assert_eq!(IpProtocol::VRRP.name(), "vrrp");
        assert_eq!(IpProtocol::ISIS.name(), "isis");
    }

    #[test]
    fn test_unknown_protocol_name_is_hex() {
        assert_eq!(ip_proto_name(0x2F), "2f");
        assert_eq!(ip_proto_name(0), "00");
        assert_eq!(ip_proto_name(0xFF), "ff");
        assert_eq!(IpProtocol(0x3A).to_string(), "3a");
    }

    #[test]
    fn test_transport_classification() {
        assert_eq!(IpProtocol::TCP.transport(), Transport::Tcp);
        assert_eq!(IpProtocol::UDP.transport(), Transport::Udp);
        assert_eq!(IpProtocol::ICMP.transport(), Transport::Other(1));
    }

    #[test]
    fn test_decode_fields() {
        let header = Ipv4Header::decode(&sample_bytes()).unwrap();

        assert_eq!(header.version, 4);
        assert_eq!(header.ihl, 5);
        assert_eq!(header.total_length, 60);
        assert_eq!(header.identification, 0x1C46);
        assert_eq!(header.flags, FLAG_DONT_FRAGMENT);
        assert!(header.dont_fragment());
        assert!(!header.is_fragment());
        assert_eq!(header.fragment_offset, 0);
        assert_eq!(header.ttl, 64);
        assert_eq!(header.protocol, IpProtocol::TCP);
        assert_eq!(header.checksum, 0xB1E6);
        assert_eq!(header.source, Ipv4Addr::new(192, 168, 1, 1));
        assert_eq!(header.destination, Ipv4Addr::new(192, 168, 1, 2));
        assert_eq!(header.transport(), Transport::Tcp);
    }

    #[test]
    fn test_flags_field_split() {
        let mut data = sample_bytes();
        data[6] = 0x20;
        data[7] = 0x00;

        let header = Ipv4Header::decode(&data).unwrap();
        assert_eq!(header.flags, 1);
        assert_eq!(header.fragment_offset, 0);
        assert!(header.more_fragments());

        let bytes = header.encode().unwrap();
        assert_eq!(&bytes[6..8], &[0x20, 0x00]);
    }

    #[test]
    fn test_flags_offset_roundtrip() {
        let mut header = Ipv4Header::new();
        header.flags = 2;
        header.fragment_offset = 100;

        let decoded = Ipv4Header::decode(&header.encode().unwrap()).unwrap();
        assert_eq!(decoded.flags, 2);
        assert_eq!(decoded.fragment_offset, 100);
        assert!(decoded.is_fragment());
    }

    #[test]
    fn test_decode_too_short() {
        let data = sample_bytes();
        for len in 0..Ipv4Header::HEADER_SIZE {
            let err = Ipv4Header::decode(&data[..len]).unwrap_err();
            assert_eq!(err, Error::too_short("ipv4", 20, len));
        }
    }

    #[test]
    fn test_decode_wrong_version() {
        let mut data = sample_bytes();
        data[0] = 0x65;
        assert_eq!(
            Ipv4Header::decode(&data).unwrap_err(),
            Error::UnsupportedVersion { version: 6 }
        );
    }

    #[test]
    fn test_options_ignored_by_default() {
        let mut data = sample_bytes();
        data[0] = 0x46;
        data.extend_from_slice(&[0x01, 0x01, 0x01, 0x00]);

        let header = Ipv4Header::decode(&data).unwrap();
        assert_eq!(header.ihl, 6);
        assert_eq!(header.payload_offset(), 24);
        assert_eq!(header.header_len(), 20);

        // IHL is preserved, option bytes are not
        let bytes = header.encode().unwrap();
        assert_eq!(bytes.len(), 20);
        assert_eq!(&bytes[..], &data[..20]);
    }

    #[test]
    fn test_options_rejected_by_policy() {
        let config = CodecConfig::new().with_options_policy(OptionsPolicy::Reject);

        let mut data = sample_bytes();
        data[0] = 0x46;
        assert_eq!(
            Ipv4Header::decode_with(&data, &config).unwrap_err(),
            Error::UnsupportedOptions {
                layer: "ipv4",
                header_len: 24
            }
        );

        data[0] = 0x44;
        assert!(matches!(
            Ipv4Header::decode_with(&data, &config),
            Err(Error::MalformedLength { .. })
        ));

        data[0] = 0x45;
        assert!(Ipv4Header::decode_with(&data, &config).is_ok());
    }

    #[test]
    fn test_short_ihl_payload_offset() {
        let mut data = sample_bytes();
        data[0] = 0x42;
        let header = Ipv4Header::decode(&data).unwrap();
        assert_eq!(header.payload_offset(), 20);
    }

    #[test]
    fn test_encode_validation() {
        let mut header = Ipv4Header::new();
        header.fragment_offset = 0x2000;
        assert!(matches!(
            header.encode(),
            Err(Error::InvalidField {
                name: "fragment_offset",
                ..
            })
        ));

        let mut header = Ipv4Header::new();
        header.flags = 8;
        assert!(header.encode().is_err());

        let mut header = Ipv4Header::new();
        header.version = 6;
        assert_eq!(
            header.encode().unwrap_err(),
            Error::UnsupportedVersion { version: 6 }
        );
    }

    #[test]
    fn test_default_header() {
        let header = Ipv4Header::default();
        assert_eq!(header.version, 4);
        assert_eq!(header.ihl, 5);
        assert_eq!(header.ttl, 255);
        assert_eq!(header.encode().unwrap()[0], 0x45);
    }

    #[test]
    fn test_roundtrip() {
        let header = Ipv4Header {
            tos: 0x10,
            total_length: 1500,
            identification: 0xBEEF,
            flags: 0b011,
            fragment_offset: 0x1FFF,
            ttl: 1,
            checksum: 0x1234,
            ..Ipv4Header::with_addresses(
                Ipv4Addr::new(10, 0, 0, 1),
                Ipv4Addr::new(10, 0, 0, 2),
                IpProtocol::UDP,
            )
        };
        let decoded = Ipv4Header::decode(&header.encode().unwrap()).unwrap();
        assert_eq!(decoded, header);
    }
}
