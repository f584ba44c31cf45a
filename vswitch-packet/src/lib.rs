//! Packet header codecs for the vswitch data path
//!
//! Each header type decodes from a byte slice into an owned value and encodes
//! back to exactly the bytes it came from:
//!
//! - [`ethernet`] - Ethernet II header and EtherType classification
//! - [`vlan`] - 802.1Q tags
//! - [`arp`] - ARP messages with variable-length addresses
//! - [`ipv4`] - IPv4 header and IP protocol classification
//! - [`tcp`] / [`udp`] - transport headers
//!
//! On top of the individual codecs, [`dissect`] decodes a whole frame layer by
//! layer and [`FrameBuilder`] assembles one.
//!
//! # Quick Start
//!
//! ```rust
//! use vswitch_packet::{dissect, CodecConfig, Header, UdpHeader};
//!
//! let frame = [
//!     0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0x00, 0x16, 0x3e, 0x02, 0x56, 0x23, 0x08, 0x00,
//!     0x45, 0x00, 0x00, 0x1c, 0x00, 0x00, 0x00, 0x00, 0x40, 0x11, 0x00, 0x00,
//!     0x0a, 0x00, 0x00, 0x01, 0x0a, 0x00, 0x00, 0x02,
//!     0x13, 0x88, 0x00, 0x35, 0x00, 0x08, 0x00, 0x00,
//! ];
//!
//! let d = dissect(&frame, &CodecConfig::default()).unwrap();
//! assert_eq!(d.ipv4().unwrap().protocol.name(), "udp");
//! assert_eq!(UdpHeader::decode(&frame[34..]).unwrap().destination_port, 53);
//! ```
//!
//! Malformed input never panics; every decoder returns a
//! [`vswitch_core::Error`] instead.

pub mod address;
pub mod arp;
pub mod builder;
pub mod codec;
pub mod dissect;
pub mod ethernet;
pub mod ipv4;
pub mod tcp;
pub mod udp;
pub mod vlan;

pub use address::MacAddress;
pub use arp::{ArpMessage, ArpOperation};
pub use builder::FrameBuilder;
pub use codec::Header;
pub use dissect::{dissect, Dissection, NetworkLayer, TransportLayer};
pub use ethernet::{EtherFrame, EtherPayload, EtherType};
pub use ipv4::{ip_proto_name, IpProtocol, Ipv4Header, Transport};
pub use tcp::{TcpFlags, TcpHeader};
pub use udp::UdpHeader;
pub use vlan::VlanTag;
pub use vswitch_core::{CodecConfig, Error, OptionsPolicy, Result};
