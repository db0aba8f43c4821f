//! .NET Binary XML codec for Windows Communication Foundation traffic.
//!
//! WCF endpoints exchange SOAP messages in the .NET Binary XML wire formats:
//! [MC-NBFX] (raw records), [MC-NBFS] (records resolved against the static
//! protocol dictionary) and [MC-NBFSE] (the session variant, which prefixes
//! each frame with an in-band string dictionary blob). This crate decodes
//! captured frames to editable XML text and re-encodes edited text back to
//! valid binary.
//!
//! Dictionary references that only the peer session can resolve are kept
//! visible in the decoded text: `[[VALUE_0xNN]]` for an unresolved index,
//! `[[value|ST_0xNN]]` once an in-band entry has been correlated with it.
//!
//! # Example
//!
//! ```
//! let frame = [0x40, 0x04, b'T', b'e', b's', b't', 0x01];
//!
//! let xml = veles_nbfx::decode(&frame)?;
//! assert_eq!(xml, "<Test/>");
//!
//! let bytes = veles_nbfx::encode_canonical(&xml)?;
//! assert_eq!(bytes, frame);
//! # Ok::<(), veles_nbfx::Error>(())
//! ```

mod attribute;
mod codec;
mod document;
mod error;
mod from_xml;
mod record;
mod text;

pub mod dictionary;
pub mod inband;
pub mod tags;

pub use attribute::AttributeRecord;
pub use codec::{decode, encode_canonical, encode_with_inband_dictionary};
pub use document::Document;
pub use error::{Error, Result};
pub use record::{ElementRecord, NameRef, Record, MAX_DEPTH};
pub use text::TextValue;
