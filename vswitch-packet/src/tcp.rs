//! TCP header codec
//!
//! Only the fixed 20-byte header is handled. The data offset and control bit
//! bytes are kept exactly as received so that re-encoding is bit-exact;
//! [`TcpHeader::flags`] gives a structured view of the control bits.

use bytes::{Buf, BufMut, BytesMut};
use std::fmt;
use vswitch_core::{CodecConfig, Error, Result};

use crate::codec::{ensure_len, Header};

/// Data offset of a header without options, in 32-bit words
pub const MIN_DATA_OFFSET: u8 = 5;

/// TCP flags
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TcpFlags {
    /// FIN - No more data from sender
    pub fin: bool,
    /// SYN - Synchronize sequence numbers
    pub syn: bool,
    /// RST - Reset the connection
    pub rst: bool,
    /// PSH - Push function
    pub psh: bool,
    /// ACK - Acknowledgment field is significant
    pub ack: bool,
    /// URG - Urgent pointer field is significant
    pub urg: bool,
    /// ECE - ECN-Echo
    pub ece: bool,
    /// CWR - Congestion Window Reduced
    pub cwr: bool,
}

impl TcpFlags {
    pub const FIN: u8 = 0b0000_0001;
    pub const SYN: u8 = 0b0000_0010;
    pub const RST: u8 = 0b0000_0100;
    pub const PSH: u8 = 0b0000_1000;
    pub const ACK: u8 = 0b0001_0000;
    pub const URG: u8 = 0b0010_0000;
    pub const ECE: u8 = 0b0100_0000;
    pub const CWR: u8 = 0b1000_0000;

    /// Convert flags to the control bits byte
    pub fn to_u8(self) -> u8 {
        let mut flags = 0u8;
        if self.fin {
            flags |= Self::FIN;
        }
        if self.syn {
            flags |= Self::SYN;
        }
        if self.rst {
            flags |= Self::RST;
        }
        if self.psh {
            flags |= Self::PSH;
        }
        if self.ack {
            flags |= Self::ACK;
        }
        if self.urg {
            flags |= Self::URG;
        }
        if self.ece {
            flags |= Self::ECE;
        }
        if self.cwr {
            flags |= Self::CWR;
        }
        flags
    }

    /// Parse flags from the control bits byte
    pub fn from_u8(value: u8) -> Self {
        TcpFlags {
            fin: value & Self::FIN != 0,
            syn: value & Self::SYN != 0,
            rst: value & Self::RST != 0,
            psh: value & Self::PSH != 0,
            ack: value & Self::ACK != 0,
            urg: value & Self::URG != 0,
            ece: value & Self::ECE != 0,
            cwr: value & Self::CWR != 0,
        }
    }
}

impl fmt::Display for TcpFlags {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names = [
            (self.syn, 'S'),
            (self.fin, 'F'),
            (self.rst, 'R'),
            (self.psh, 'P'),
            (self.ack, '.'),
            (self.urg, 'U'),
            (self.ece, 'E'),
            (self.cwr, 'W'),
        ];
        let mut any = false;
        for (set, c) in names {
            if set {
                write!(f, "{}", c)?;
                any = true;
            }
        }
        if !any {
            write!(f, "none")?;
        }
        Ok(())
    }
}

/// TCP header
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TcpHeader {
    /// Source port
    pub source_port: u16,
    /// Destination port
    pub destination_port: u16,
    /// Sequence number
    pub sequence_number: u32,
    /// Acknowledgment number
    pub acknowledgment_number: u32,
    /// Data offset byte: header length in words (high nibble) plus reserved bits
    pub data_offset: u8,
    /// Control bits byte
    pub control_bits: u8,
    /// Window size
    pub window_size: u16,
    /// Checksum, not validated
    pub checksum: u16,
    /// Urgent pointer
    pub urgent_pointer: u16,
}

impl TcpHeader {
    /// Size of the fixed header
    pub const HEADER_SIZE: usize = 20;

    /// Header with a five-word data offset
    pub fn new(
        source_port: u16,
        destination_port: u16,
        sequence_number: u32,
        acknowledgment_number: u32,
        flags: TcpFlags,
        window_size: u16,
    ) -> Self {
        TcpHeader {
            source_port,
            destination_port,
            sequence_number,
            acknowledgment_number,
            data_offset: MIN_DATA_OFFSET << 4,
            control_bits: flags.to_u8(),
            window_size,
            checksum: 0,
            urgent_pointer: 0,
        }
    }

    /// Header length in 32-bit words
    pub fn header_words(&self) -> u8 {
        self.data_offset >> 4
    }

    /// Structured view of the control bits
    pub fn flags(&self) -> TcpFlags {
        TcpFlags::from_u8(self.control_bits)
    }

    /// Offset of the segment payload; option bytes are skipped
    pub fn payload_offset(&self) -> usize {
        (self.header_words().max(MIN_DATA_OFFSET) as usize) * 4
    }
}

impl Header for TcpHeader {
    const LAYER: &'static str = "tcp";
    const MIN_LEN: usize = Self::HEADER_SIZE;

    fn decode_with(data: &[u8], config: &CodecConfig) -> Result<Self> {
        ensure_len(Self::LAYER, data, Self::HEADER_SIZE)?;

        let mut buf = &data[..Self::HEADER_SIZE];
        let header = TcpHeader {
            source_port: buf.get_u16(),
            destination_port: buf.get_u16(),
            sequence_number: buf.get_u32(),
            acknowledgment_number: buf.get_u32(),
            data_offset: buf.get_u8(),
            control_bits: buf.get_u8(),
            window_size: buf.get_u16(),
            checksum: buf.get_u16(),
            urgent_pointer: buf.get_u16(),
        };

        if config.rejects_options() {
            let words = header.header_words();
            if words < MIN_DATA_OFFSET {
                return Err(Error::malformed(
                    Self::LAYER,
                    format!("data offset {} is below the minimum of {}", words, MIN_DATA_OFFSET),
                ));
            }
            if words > MIN_DATA_OFFSET {
                return Err(Error::UnsupportedOptions {
                    layer: Self::LAYER,
                    header_len: words as usize * 4,
                });
            }
        }

        Ok(header)
    }

    /// Always the fixed 20 bytes, whatever the data offset says; see `payload_offset`
    fn header_len(&self) -> usize {
        Self::HEADER_SIZE
    }

    fn encode_into(&self, buf: &mut BytesMut) -> Result<()> {
        buf.put_u16(self.source_port);
        buf.put_u16(self.destination_port);
        buf.put_u32(self.sequence_number);
        buf.put_u32(self.acknowledgment_number);
        buf.put_u8(self.data_offset);
        buf.put_u8(self.control_bits);
        buf.put_u16(self.window_size);
        buf.put_u16(self.checksum);
        buf.put_u16(self.urgent_pointer);
        Ok(())
    }
}

impl fmt::Display for TcpHeader {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "TCP {} > {} [{}] seq {} ack {} win {}",
            self.source_port,
            self.destination_port,
            self.flags(),
            self.sequence_number,
            self.acknowledgment_number,
            self.window_size
        )
    }
}
