//! Hardware address type and the sentinel addresses used as header defaults

use std::fmt;
use std::str::FromStr;

use vswitch_core::Error;

/// MAC address (6 bytes)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct MacAddress(pub [u8; 6]);

impl MacAddress {
    /// Zero MAC address (00:00:00:00:00:00)
    pub const ZERO: MacAddress = MacAddress([0x00, 0x00, 0x00, 0x00, 0x00, 0x00]);

    /// Broadcast MAC address (FF:FF:FF:FF:FF:FF)
    pub const BROADCAST: MacAddress = MacAddress([0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF]);

    /// Default locally used switch address (00:16:3E:02:56:23)
    pub const DEFAULT: MacAddress = MacAddress([0x00, 0x16, 0x3E, 0x02, 0x56, 0x23]);

    /// Address length in bytes
    pub const LEN: usize = 6;

    /// Create a MAC address from raw bytes
    pub fn new(bytes: [u8; 6]) -> Self {
        MacAddress(bytes)
    }

    /// Create a MAC address from a slice of exactly six bytes
    pub fn from_slice(slice: &[u8]) -> Option<Self> {
        let bytes: [u8; 6] = slice.try_into().ok()?;
        Some(MacAddress(bytes))
    }

    /// Get the MAC address as bytes
    pub fn as_bytes(&self) -> &[u8; 6] {
        &self.0
    }

    /// Check if this is the broadcast address
    pub fn is_broadcast(&self) -> bool {
        *self == Self::BROADCAST
    }

    /// Check if every byte is zero
    pub fn is_zero(&self) -> bool {
        *self == Self::ZERO
    }

    /// Group bit (bit 0 of the first octet) is set
    pub fn is_multicast(&self) -> bool {
        self.0[0] & 0x01 == 0x01
    }
}

impl fmt::Display for MacAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:02x}:{:02x}:{:02x}:{:02x}:{:02x}:{:02x}",
            self.0[0], self.0[1], self.0[2], self.0[3], self.0[4], self.0[5]
        )
    }
}

impl FromStr for MacAddress {
    type Err = Error;

    /// Parse `aa:bb:cc:dd:ee:ff` or `aa-bb-cc-dd-ee-ff`
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || Error::invalid_field("mac", format!("'{}' is not a MAC address", s));

        let mut bytes = [0u8; 6];
        let mut parts = s.split(|c| c == ':' || c == '-');
        for byte in bytes.iter_mut() {
            let part = parts.next().ok_or_else(invalid)?;
            if part.len() != 2 || !part.bytes().all(|b| b.is_ascii_hexdigit()) {
                return Err(invalid());
            }
            *byte = u8::from_str_radix(part, 16).map_err(|_| invalid())?;
        }
        if parts.next().is_some() {
            return Err(invalid());
        }
        Ok(MacAddress(bytes))
    }
}

impl From<[u8; 6]> for MacAddress {
    fn from(bytes: [u8; 6]) -> Self {
        MacAddress(bytes)
    }
}

impl From<MacAddress> for [u8; 6] {
    fn from(mac: MacAddress) -> Self {
        mac.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sentinels() {
        assert!(MacAddress::ZERO.is_zero());
        assert!(MacAddress::BROADCAST.is_broadcast());
        assert!(MacAddress::BROADCAST.is_multicast());
        assert!(!MacAddress::DEFAULT.is_multicast());
        assert_eq!(MacAddress::default(), MacAddress::ZERO);
    }

    #[test]
    fn test_display() {
        assert_eq!(MacAddress::DEFAULT.to_string(), "00:16:3e:02:56:23");
    }

    #[test]
    fn test_from_slice() {
        assert_eq!(
            MacAddress::from_slice(&[0xFF; 6]),
            Some(MacAddress::BROADCAST)
        );
        assert_eq!(MacAddress::from_slice(&[0; 5]), None);
        assert_eq!(MacAddress::from_slice(&[0; 7]), None);
    }

    #[test]
    fn test_parse() {
        let mac: MacAddress = "00:16:3e:02:56:23".parse().unwrap();
        assert_eq!(mac, MacAddress::DEFAULT);

        let mac: MacAddress = "FF-FF-FF-FF-FF-FF".parse().unwrap();
        assert!(mac.is_broadcast());
    }

    #[test]
    fn test_parse_invalid() {
        assert!("".parse::<MacAddress>().is_err());
        assert!("00:16:3e:02:56".parse::<MacAddress>().is_err());
        assert!("00:16:3e:02:56:23:00".parse::<MacAddress>().is_err());
        assert!("00:16:3e:02:56:zz".parse::<MacAddress>().is_err());
        assert!("0:16:3e:02:56:23".parse::<MacAddress>().is_err());
    }

    #[test]
    fn test_parse_rejects_sign() {
        assert!("00:16:3e:02:56:+f".parse::<MacAddress>().is_err());
        assert!("+0:16:3e:02:56:23".parse::<MacAddress>().is_err());
        assert!("00:16:3e:02:56:-f".parse::<MacAddress>().is_err());
    }
}
