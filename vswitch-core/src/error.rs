//! Error types for the vswitch codecs

use thiserror::Error;

/// Result type alias for codec operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for decoding and encoding packet headers
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// Buffer is smaller than the layer needs
    #[error("{layer} header too short: {actual} bytes, expected {expected}")]
    TooShort {
        layer: &'static str,
        expected: usize,
        actual: usize,
    },

    /// IPv4 version nibble is not 4
    #[error("Unsupported IP version: 0x{version:x}")]
    UnsupportedVersion { version: u8 },

    /// A length field is inconsistent with the layer or the data it describes
    #[error("Malformed {layer} length: {reason}")]
    MalformedLength { layer: &'static str, reason: String },

    /// Header announces options and the active policy rejects them
    #[error("{layer} options are not supported (header length {header_len} bytes)")]
    UnsupportedOptions {
        layer: &'static str,
        header_len: usize,
    },

    /// Field value cannot be represented on the wire
    #[error("Invalid field '{name}': {reason}")]
    InvalidField { name: &'static str, reason: String },

    /// Packet construction error
    #[error("Packet construction error: {0}")]
    PacketConstruction(String),
}

impl Error {
    /// Create a too-short error for a layer
    pub fn too_short(layer: &'static str, expected: usize, actual: usize) -> Self {
        Error::TooShort {
            layer,
            expected,
            actual,
        }
    }

    /// Create a malformed-length error with a custom message
    pub fn malformed<S: Into<String>>(layer: &'static str, reason: S) -> Self {
        Error::MalformedLength {
            layer,
            reason: reason.into(),
        }
    }

    /// Create an invalid field error
    pub fn invalid_field<S: Into<String>>(name: &'static str, reason: S) -> Self {
        Error::InvalidField {
            name,
            reason: reason.into(),
        }
    }

    /// True when the input was simply truncated rather than inconsistent
    pub fn is_truncation(&self) -> bool {
        matches!(self, Error::TooShort { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_too_short_display() {
        let err = Error::too_short("tcp", 20, 10);
        assert_eq!(
            err.to_string(),
            "tcp header too short: 10 bytes, expected 20"
        );
        assert!(err.is_truncation());
    }

    #[test]
    fn test_unsupported_version_display() {
        let err = Error::UnsupportedVersion { version: 6 };
        assert_eq!(err.to_string(), "Unsupported IP version: 0x6");
        assert!(!err.is_truncation());
    }

    #[test]
    fn test_invalid_field_display() {
        let err = Error::invalid_field("vlan_id", "4096 exceeds 12 bits");
        assert_eq!(
            err.to_string(),
            "Invalid field 'vlan_id': 4096 exceeds 12 bits"
        );
    }
}
