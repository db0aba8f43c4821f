//! Veles - .NET Binary XML protocol analysis library.
//!
//! This crate provides a unified interface to the Veles library ecosystem
//! for working with WCF binary XML traffic.
//!
//! # Crates
//!
//! - [`veles_common`] - Common utilities (binary reading, varints, GUIDs)
//! - [`veles_nbfx`] - The binary XML codec (MC-NBFX / MC-NBFS / MC-NBFSE)
//!
//! # Example
//!
//! ```
//! use veles::prelude::*;
//!
//! // Decode a captured frame to editable XML text
//! let frame = [0x40, 0x04, b'T', b'e', b's', b't', 0x01];
//! let xml = decode(&frame)?;
//! assert_eq!(xml, "<Test/>");
//!
//! // Re-encode the (possibly edited) text back to binary
//! let bytes = encode_canonical(&xml)?;
//! assert_eq!(bytes, frame);
//! # Ok::<(), veles::nbfx::Error>(())
//! ```

// Re-export all sub-crates
pub use veles_common as common;
pub use veles_nbfx as nbfx;

/// Prelude module for convenient imports.
pub mod prelude {
    pub use veles_common::{varint, BinaryReader, DotNetGuid};
    pub use veles_nbfx::{
        decode, encode_canonical, encode_with_inband_dictionary, Document, Record, TextValue,
    };
}

/// Version information.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
