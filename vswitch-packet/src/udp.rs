//! UDP header codec

use bytes::{Buf, BufMut, BytesMut};
use std::fmt;
use vswitch_core::{CodecConfig, Result};

use crate::codec::{ensure_len, Header};

/// UDP header
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct UdpHeader {
    /// Source port
    pub source_port: u16,
    /// Destination port
    pub destination_port: u16,
    /// Length (header + data)
    pub length: u16,
    /// Checksum, not validated
    pub checksum: u16,
}

impl UdpHeader {
    /// UDP header size in bytes
    pub const HEADER_SIZE: usize = 8;

    /// Header for a datagram carrying `payload_len` bytes; checksum left at 0
    pub fn new(source_port: u16, destination_port: u16, payload_len: u16) -> Self {
        UdpHeader {
            source_port,
            destination_port,
            length: (Self::HEADER_SIZE as u16).saturating_add(payload_len),
            checksum: 0,
        }
    }

    /// Payload length announced by the length field
    pub fn payload_len(&self) -> usize {
        (self.length as usize).saturating_sub(Self::HEADER_SIZE)
    }
}

impl Header for UdpHeader {
    const LAYER: &'static str = "udp";
    const MIN_LEN: usize = Self::HEADER_SIZE;

    fn decode_with(data: &[u8], _config: &CodecConfig) -> Result<Self> {
        ensure_len(Self::LAYER, data, Self::HEADER_SIZE)?;

        let mut buf = &data[..Self::HEADER_SIZE];
        Ok(UdpHeader {
            source_port: buf.get_u16(),
            destination_port: buf.get_u16(),
            length: buf.get_u16(),
            checksum: buf.get_u16(),
        })
    }

    fn header_len(&self) -> usize {
        Self::HEADER_SIZE
    }

    fn encode_into(&self, buf: &mut BytesMut) -> Result<()> {
        buf.put_u16(self.source_port);
        buf.put_u16(self.destination_port);
        buf.put_u16(self.length);
        buf.put_u16(self.checksum);
        Ok(())
    }
}

impl fmt::Display for UdpHeader {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "UDP {} > {} len {}",
            self.source_port, self.destination_port, self.length
        )
    }
}
