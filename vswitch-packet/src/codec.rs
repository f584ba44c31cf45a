//! The `Header` trait shared by every layer codec

use bytes::{Bytes, BytesMut};
use vswitch_core::{CodecConfig, Error, Result};

/// A fixed or self-describing protocol header that can be read from and
/// written to wire bytes.
///
/// Decoding copies every field out of the input, so a decoded header never
/// borrows from the buffer it came from.
pub trait Header: Sized {
    /// Short lowercase layer name used in errors and logs
    const LAYER: &'static str;

    /// Minimum number of bytes `decode` needs before it reads anything
    const MIN_LEN: usize;

    /// Decode with a specific policy
    fn decode_with(data: &[u8], config: &CodecConfig) -> Result<Self>;

    /// Decode with the default policy
    fn decode(data: &[u8]) -> Result<Self> {
        Self::decode_with(data, &CodecConfig::default())
    }

    /// Number of bytes `encode` produces
    ///
    /// Option bytes that IPv4 and TCP skip on decode are not included; their
    /// `payload_offset` gives where the next layer starts.
    fn header_len(&self) -> usize;

    /// Append the wire representation to `buf`
    fn encode_into(&self, buf: &mut BytesMut) -> Result<()>;

    /// Encode into a freshly allocated buffer of exactly `header_len` bytes
    fn encode(&self) -> Result<Bytes> {
        let mut buf = BytesMut::with_capacity(self.header_len());
        self.encode_into(&mut buf)?;
        Ok(buf.freeze())
    }
}

/// Fail with `TooShort` unless `data` holds at least `expected` bytes.
pub(crate) fn ensure_len(layer: &'static str, data: &[u8], expected: usize) -> Result<()> {
    if data.len() < expected {
        return Err(Error::too_short(layer, expected, data.len()));
    }
    Ok(())
}
