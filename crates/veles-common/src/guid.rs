//! .NET GUID type.
//!
//! UniqueId and Uuid text records carry a 16-byte GUID in the order
//! `Guid.ToByteArray()` produces: the first three groups little-endian, the
//! last two groups in display order.

use std::fmt;
use std::str::FromStr;

use zerocopy::{FromBytes, Immutable, IntoBytes, KnownLayout};

use crate::Error;

/// A 16-byte GUID in .NET wire order.
///
/// Format: `XXXXXXXX-XXXX-XXXX-XXXX-XXXXXXXXXXXX`
///
/// # Byte Layout
///
/// - String positions 0-7 (first group): bytes 3,2,1,0
/// - String positions 9-12 (second group): bytes 5,4
/// - String positions 14-17 (third group): bytes 7,6
/// - String positions 19-22 (fourth group): bytes 8,9
/// - String positions 24-35 (fifth group): bytes 10..=15
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default, FromBytes, IntoBytes, Immutable, KnownLayout)]
#[repr(C)]
pub struct DotNetGuid {
    bytes: [u8; 16],
}

impl DotNetGuid {
    /// Empty GUID (all zeros).
    pub const EMPTY: Self = Self { bytes: [0; 16] };

    /// Create a new DotNetGuid from raw wire bytes.
    #[inline]
    pub const fn from_bytes(bytes: [u8; 16]) -> Self {
        Self { bytes }
    }

    /// Get the raw wire bytes of the GUID.
    #[inline]
    pub const fn as_bytes(&self) -> &[u8; 16] {
        &self.bytes
    }

    /// Check if the GUID is empty (all zeros).
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.bytes == [0; 16]
    }
}

impl fmt::Debug for DotNetGuid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "DotNetGuid({})", self)
    }
}

impl fmt::Display for DotNetGuid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:02x}{:02x}{:02x}{:02x}-{:02x}{:02x}-{:02x}{:02x}-{:02x}{:02x}-{:02x}{:02x}{:02x}{:02x}{:02x}{:02x}",
            self.bytes[3], self.bytes[2], self.bytes[1], self.bytes[0],
            self.bytes[5], self.bytes[4],
            self.bytes[7], self.bytes[6],
            self.bytes[8], self.bytes[9],
            self.bytes[10], self.bytes[11], self.bytes[12], self.bytes[13], self.bytes[14], self.bytes[15]
        )
    }
}

impl FromStr for DotNetGuid {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let chars: Vec<char> = s.chars().collect();
        if chars.len() != 36 {
            return Err(Error::InvalidGuid(format!(
                "expected 36 characters, got {}",
                chars.len()
            )));
        }

        // Validate hyphens
        if chars[8] != '-' || chars[13] != '-' || chars[18] != '-' || chars[23] != '-' {
            return Err(Error::InvalidGuid("invalid hyphen positions".into()));
        }

        let parse_hex = |start: usize| -> Result<u8, Error> {
            let hex_str: String = chars[start..start + 2].iter().collect();
            u8::from_str_radix(&hex_str, 16)
                .map_err(|_| Error::InvalidGuid(format!("invalid hex at position {}", start)))
        };

        let mut bytes = [0u8; 16];

        // Map string positions to byte positions (inverse of Display)
        // First group (0-7): bytes 3,2,1,0
        bytes[3] = parse_hex(0)?;
        bytes[2] = parse_hex(2)?;
        bytes[1] = parse_hex(4)?;
        bytes[0] = parse_hex(6)?;

        // Second group (9-12): bytes 5,4
        bytes[5] = parse_hex(9)?;
        bytes[4] = parse_hex(11)?;

        // Third group (14-17): bytes 7,6
        bytes[7] = parse_hex(14)?;
        bytes[6] = parse_hex(16)?;

        // Fourth group (19-22): bytes 8,9
        bytes[8] = parse_hex(19)?;
        bytes[9] = parse_hex(21)?;

        // Fifth group (24-35): bytes 10..=15
        bytes[10] = parse_hex(24)?;
        bytes[11] = parse_hex(26)?;
        bytes[12] = parse_hex(28)?;
        bytes[13] = parse_hex(30)?;
        bytes[14] = parse_hex(32)?;
        bytes[15] = parse_hex(34)?;

        Ok(Self { bytes })
    }
}

#[cfg(feature = "serde")]
impl serde::Serialize for DotNetGuid {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}

#[cfg(feature = "serde")]
impl<'de> serde::Deserialize<'de> for DotNetGuid {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_guid() {
        let guid = DotNetGuid::EMPTY;
        assert!(guid.is_empty());
        assert_eq!(guid.to_string(), "00000000-0000-0000-0000-000000000000");
    }

    #[test]
    fn test_wire_byte_mapping() {
        let guid = DotNetGuid::from_bytes([
            0x33, 0x22, 0x11, 0x00, 0x55, 0x44, 0x77, 0x66, 0x88, 0x99, 0xAA, 0xBB, 0xCC, 0xDD,
            0xEE, 0xFF,
        ]);
        assert_eq!(guid.to_string(), "00112233-4455-6677-8899-aabbccddeeff");
    }

    #[test]
    fn test_roundtrip() {
        let original = "12345678-abcd-ef01-2345-6789abcdef01";
        let guid: DotNetGuid = original.parse().unwrap();
        assert_eq!(guid.to_string(), original);
    }

    #[test]
    fn test_invalid_length() {
        assert!("too-short".parse::<DotNetGuid>().is_err());
    }

    #[test]
    fn test_invalid_hyphens() {
        assert!("12345678_abcd-ef01-2345-6789abcdef01"
            .parse::<DotNetGuid>()
            .is_err());
    }
}
