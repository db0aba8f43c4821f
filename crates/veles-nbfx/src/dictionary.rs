//! The static protocol string dictionary.
//!
//! The string-table index space is split in two: static dictionary strings
//! defined by [MC-NBFS] occupy the even indices, session strings negotiated
//! per connection occupy the odd indices. A session index can only be
//! resolved from an in-band dictionary blob (see [`crate::inband`]); until
//! that happens it renders as a `[[VALUE_0xNN]]` placeholder so the
//! reference stays visible and survives a decode/edit/encode round trip.
//!
//! The table below covers the SOAP, WS-Addressing, WS-RM and WS-Security
//! core of the protocol dictionary (indices 0x00-0xC4).

use std::collections::HashMap;
use std::sync::OnceLock;

use crate::{Error, Result};

#[rustfmt::skip]
static STRINGS: [&str; 99] = [
    "mustUnderstand",
    "Envelope",
    "http://www.w3.org/2003/05/soap-envelope",
    "http://www.w3.org/2005/08/addressing",
    "Header",
    "Action",
    "To",
    "Body",
    "Algorithm",
    "RelatesTo",
    "http://www.w3.org/2005/08/addressing/anonymous",
    "URI",
    "Reference",
    "MessageID",
    "Id",
    "Identifier",
    "http://schemas.xmlsoap.org/ws/2005/02/rm",
    "Transforms",
    "Transform",
    "DigestMethod",
    "DigestValue",
    "Address",
    "ReplyTo",
    "SequenceAcknowledgement",
    "AcknowledgementRange",
    "Upper",
    "Lower",
    "BufferRemaining",
    "http://schemas.microsoft.com/ws/2006/05/rm",
    "http://schemas.xmlsoap.org/ws/2005/02/rm/SequenceAcknowledgement",
    "SecurityTokenReference",
    "Sequence",
    "MessageNumber",
    "http://www.w3.org/2000/09/xmldsig#",
    "http://www.w3.org/2000/09/xmldsig#enveloped-signature",
    "KeyInfo",
    "http://www.w3.org/2001/04/xmlenc#",
    "http://schemas.xmlsoap.org/ws/2005/02/sc",
    "DerivedKeyToken",
    "Nonce",
    "Signature",
    "SignedInfo",
    "CanonicalizationMethod",
    "SignatureMethod",
    "SignatureValue",
    "DataReference",
    "EncryptedData",
    "EncryptionMethod",
    "CipherData",
    "CipherValue",
    "http://schemas.xmlsoap.org/ws/2005/02/trust",
    "TokenType",
    "RequestSecurityTokenResponseCollection",
    "http://schemas.xmlsoap.org/ws/2005/02/trust#BinarySecret",
    "http://schemas.microsoft.com/ws/2006/02/transactions",
    "s",
    "Fault",
    "MustUnderstand",
    "role",
    "relay",
    "Code",
    "Reason",
    "Text",
    "Node",
    "Role",
    "Detail",
    "Value",
    "Subcode",
    "NotUnderstood",
    "qname",
    "",
    "From",
    "FaultTo",
    "EndpointReference",
    "PortType",
    "ServiceName",
    "PortName",
    "ReferenceProperties",
    "RelationshipType",
    "Reply",
    "a",
    "http://schemas.xmlsoap.org/ws/2006/02/addressingidentity",
    "Identity",
    "Spn",
    "Upn",
    "Rsa",
    "Dns",
    "X509v3Certificate",
    "http://www.w3.org/2005/08/addressing/fault",
    "ReferenceParameters",
    "IsReferenceParameter",
    "http://www.w3.org/2005/08/addressing/reply",
    "http://www.w3.org/2005/08/addressing/none",
    "Metadata",
    "http://schemas.xmlsoap.org/ws/2004/08/addressing",
    "http://schemas.xmlsoap.org/ws/2004/08/addressing/role/anonymous",
    "http://schemas.xmlsoap.org/ws/2004/08/addressing/fault",
    "http://schemas.xmlsoap.org/ws/2004/04/addressing",
    "http://schemas.xmlsoap.org/ws/2004/04/addressing/role/anonymous",
];

/// Resolve a string-table index to renderable text.
///
/// Static-space (even) indices must have a well-known entry; a session-space
/// (odd) index renders as its placeholder, since only in-band correlation
/// can supply the value.
pub fn resolve(index: u32) -> Result<String> {
    if index % 2 == 1 {
        return Ok(placeholder(index));
    }
    match STRINGS.get((index / 2) as usize) {
        Some(s) => Ok((*s).to_string()),
        None => Err(Error::DictionaryIndexOutOfRange { index }),
    }
}

/// The visible form of an unresolved string-table reference.
pub fn placeholder(index: u32) -> String {
    format!("[[VALUE_0x{index:02x}]]")
}

/// Parse a `[[VALUE_0xNN]]` placeholder back to its index.
pub fn placeholder_index(s: &str) -> Option<u32> {
    let hex = s.strip_prefix("[[VALUE_0x")?.strip_suffix("]]")?;
    u32::from_str_radix(hex, 16).ok()
}

/// Look up the static-dictionary index of a well-known string.
pub fn index_of(s: &str) -> Option<u32> {
    static INDEX: OnceLock<HashMap<&'static str, u32>> = OnceLock::new();
    INDEX
        .get_or_init(|| {
            STRINGS
                .iter()
                .enumerate()
                .map(|(i, s)| (*s, i as u32 * 2))
                .collect()
        })
        .get(s)
        .copied()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_static_entries() {
        assert_eq!(resolve(0x00).unwrap(), "mustUnderstand");
        assert_eq!(resolve(0x02).unwrap(), "Envelope");
        assert_eq!(resolve(0x04).unwrap(), "http://www.w3.org/2003/05/soap-envelope");
        assert_eq!(resolve(0x6E).unwrap(), "s");
        assert_eq!(resolve(0xC4).unwrap(), "http://schemas.xmlsoap.org/ws/2004/04/addressing/role/anonymous");
    }

    #[test]
    fn test_session_space_renders_placeholder() {
        assert_eq!(resolve(0x07).unwrap(), "[[VALUE_0x07]]");
        assert_eq!(resolve(0x1CD).unwrap(), "[[VALUE_0x1cd]]");
    }

    #[test]
    fn test_static_space_out_of_range() {
        assert!(matches!(
            resolve(0xC6),
            Err(Error::DictionaryIndexOutOfRange { index: 0xC6 })
        ));
    }

    #[test]
    fn test_placeholder_round_trip() {
        assert_eq!(placeholder_index(&placeholder(0x07)), Some(0x07));
        assert_eq!(placeholder_index("[[VALUE_0x2b]]"), Some(0x2B));
        assert_eq!(placeholder_index("[[VALUE_0x]]"), None);
        assert_eq!(placeholder_index("[[OTHER_0x07]]"), None);
        assert_eq!(placeholder_index("plain text"), None);
    }

    #[test]
    fn test_index_of_inverts_resolve() {
        assert_eq!(index_of("Envelope"), Some(0x02));
        assert_eq!(index_of("mustUnderstand"), Some(0x00));
        assert_eq!(index_of("s"), Some(0x6E));
        assert_eq!(index_of("NotInTheDictionary"), None);
    }
}
