//! Command-line frame dissector
//!
//! Argument parsing lives in [`args`]; the functions here do the work behind
//! each subcommand so the binary stays a thin shell around them.

pub mod args;

pub use args::{Cli, Commands};

use bytes::Bytes;
use std::net::Ipv4Addr;
use tracing::debug;
use vswitch_core::{CodecConfig, Result};
use vswitch_packet::{dissect, ArpMessage, EtherFrame, EtherType, FrameBuilder, MacAddress};

/// Parse a hex frame, ignoring whitespace, ':' and '-' separators and a leading `0x`
pub fn parse_frame(input: &str) -> std::result::Result<Vec<u8>, hex::FromHexError> {
    let trimmed = input.trim();
    let trimmed = trimmed
        .strip_prefix("0x")
        .or_else(|| trimmed.strip_prefix("0X"))
        .unwrap_or(trimmed);
    let digits: String = trimmed
        .chars()
        .filter(|c| !c.is_whitespace() && *c != ':' && *c != '-')
        .collect();
    hex::decode(digits)
}

/// Human-readable description of every layer in `frame`
pub fn describe(frame: &[u8], config: &CodecConfig) -> Result<String> {
    let dissection = dissect(frame, config)?;
    debug!(
        layers = 1 + dissection.vlans.len()
            + dissection.network.is_some() as usize
            + dissection.transport.is_some() as usize,
        "frame decoded"
    );

    let mut out = dissection.to_string();
    let payload = dissection.payload(frame);
    if !payload.is_empty() {
        out.push_str(&format!("\n  payload: {} bytes", payload.len()));
    }
    Ok(out)
}

/// Broadcast ARP request asking for `target_ip`
pub fn arp_request_frame(
    sender_mac: MacAddress,
    sender_ip: Ipv4Addr,
    target_ip: Ipv4Addr,
) -> Result<Bytes> {
    FrameBuilder::new()
        .ethernet(EtherFrame::with_addresses(
            MacAddress::BROADCAST,
            sender_mac,
            EtherType::ARP,
        ))
        .arp(ArpMessage::request(sender_mac, sender_ip, target_ip))
        .build()
}

#[cfg(test)]
mod tests {
    use super::*;
    use vswitch_core::Error;
    use vswitch_packet::Header;

    #[test]
    fn test_parse_frame_separators() {
        assert_eq!(parse_frame("0xFF ff:00-01").unwrap(), vec![0xFF, 0xFF, 0x00, 0x01]);
        assert_eq!(parse_frame("").unwrap(), Vec::<u8>::new());
        assert!(parse_frame("abc").is_err());
        assert!(parse_frame("zz").is_err());
    }

    #[test]
    fn test_arp_request_frame() {
        let frame = arp_request_frame(
            MacAddress::DEFAULT,
            Ipv4Addr::new(192, 168, 1, 10),
            Ipv4Addr::new(192, 168, 1, 1),
        )
        .unwrap();

        assert_eq!(frame.len(), 42);
        let ether = EtherFrame::decode(&frame).unwrap();
        assert!(ether.destination.is_broadcast());
        assert_eq!(ether.ethertype, EtherType::ARP);

        let arp = ArpMessage::decode(&frame[14..]).unwrap();
        assert!(arp.is_request());
        assert_eq!(arp.target_ip(), Some(Ipv4Addr::new(192, 168, 1, 1)));
    }

    #[test]
    fn test_describe_round_trip() {
        let frame = arp_request_frame(
            MacAddress::DEFAULT,
            Ipv4Addr::new(10, 0, 0, 1),
            Ipv4Addr::new(10, 0, 0, 2),
        )
        .unwrap();
        let hex = hex::encode(&frame);
        let text = describe(&parse_frame(&hex).unwrap(), &CodecConfig::default()).unwrap();

        assert!(text.starts_with("Ethernet 00:16:3e:02:56:23 > ff:ff:ff:ff:ff:ff type ARP"));
        assert!(text.contains("ARP request 10.0.0.1"));
        assert!(!text.contains("payload:"));
    }

    #[test]
    fn test_describe_reports_payload() {
        let mut frame = vec![0u8; 12];
        frame.extend_from_slice(&[0x88, 0xCC, 0x01, 0x02, 0x03]);
        let text = describe(&frame, &CodecConfig::default()).unwrap();
        assert!(text.ends_with("payload: 3 bytes"));
    }

    #[test]
    fn test_describe_error() {
        let err = describe(&[0u8; 10], &CodecConfig::default()).unwrap_err();
        assert_eq!(err, Error::too_short("ethernet", 14, 10));
    }
}
