//! Example: building a tagged UDP frame and decoding it again

use std::net::Ipv4Addr;
use vswitch_packet::{
    dissect, CodecConfig, EtherFrame, EtherType, FrameBuilder, IpProtocol, Ipv4Header, MacAddress,
    UdpHeader, VlanTag,
};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let src_mac = MacAddress([0x00, 0x11, 0x22, 0x33, 0x44, 0x55]);
    let dst_mac = MacAddress([0xAA, 0xBB, 0xCC, 0xDD, 0xEE, 0xFF]);

    // DNS query header (simplified)
    let dns_query = vec![
        0x12, 0x34, // Transaction ID
        0x01, 0x00, // Flags: standard query
        0x00, 0x01, // Questions: 1
        0x00, 0x00, // Answer RRs: 0
        0x00, 0x00, // Authority RRs: 0
        0x00, 0x00, // Additional RRs: 0
    ];

    let udp = UdpHeader::new(54321, 53, dns_query.len() as u16);
    let ip = Ipv4Header {
        total_length: (Ipv4Header::HEADER_SIZE + UdpHeader::HEADER_SIZE + dns_query.len()) as u16,
        ttl: 64,
        ..Ipv4Header::with_addresses(
            Ipv4Addr::new(192, 168, 1, 100),
            Ipv4Addr::new(192, 168, 1, 1),
            IpProtocol::UDP,
        )
    };

    let frame = FrameBuilder::new()
        .ethernet(EtherFrame::with_addresses(dst_mac, src_mac, EtherType::VLAN))
        .vlan(VlanTag::new(0b1010, 42, EtherType::IPV4)?)
        .ipv4(ip)
        .udp(udp)
        .payload(dns_query)
        .build()?;

    println!("Frame built: {} bytes", frame.len());
    println!("{:02X?}", &frame[..]);
    println!();

    let d = dissect(&frame, &CodecConfig::default())?;
    println!("{}", d);
    println!("  payload: {:02X?}", d.payload(&frame));

    Ok(())
}
