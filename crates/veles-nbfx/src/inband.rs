//! In-band string dictionary layer for the session form.
//!
//! A session frame prefixes the canonical record stream with the string
//! dictionary entries this message adds to the connection's shared table:
//!
//! ```text
//! [optional varint blob size][in-band entries][56 02 0B ... canonical body]
//! ```
//!
//! The blob itself is untyped - a flat run of `[1-byte length][raw bytes]`
//! segments - and nothing in the frame says which string-table index each
//! entry lands on. Correlation recovers the indices from the other side:
//! the canonical body is decoded first, the `[[VALUE_0xNN]]` placeholders it
//! produces reveal which session indices the message references, and the
//! entries are matched up positionally (see `correlation_window`).

use std::collections::BTreeMap;
use std::sync::OnceLock;

use memchr::memmem;
use regex::Regex;
use veles_common::varint;

use crate::{Error, Result};

/// First bytes of every dictionary-mode SOAP body: a PrefixDictionaryElement
/// with prefix 's' naming "Envelope", followed by a DictionaryXmlnsAttribute
/// tag. The canonical record stream of a session frame starts here.
pub const ENVELOPE_MARKER: &[u8] = &[0x56, 0x02, 0x0B];

/// Find the offset of the envelope marker.
pub fn locate_envelope(data: &[u8]) -> Option<usize> {
    if data.starts_with(ENVELOPE_MARKER) {
        return Some(0);
    }
    memmem::find(data, ENVELOPE_MARKER)
}

/// Split a session frame into its in-band blob region and canonical body.
pub fn split_session(data: &[u8]) -> Result<(&[u8], &[u8])> {
    match locate_envelope(data) {
        Some(offset) => Ok((&data[..offset], &data[offset..])),
        None => Err(Error::EnvelopeMarkerNotFound),
    }
}

/// Validate the optional declared-length framing of a blob region.
///
/// The declared length is trusted only when it accounts for every byte
/// between the varint and the envelope marker.
fn framed_payload(region: &[u8]) -> Result<&[u8]> {
    let (declared, consumed) = varint::decode(region)?;
    let declared = declared as usize;
    if declared + consumed == region.len() {
        Ok(&region[consumed..])
    } else {
        Err(Error::BlobLengthMismatch {
            declared,
            actual: region.len().saturating_sub(consumed),
        })
    }
}

/// Extract the ordered in-band entries from the bytes before the marker.
///
/// Handles both framings: if the leading varint does not check out as a
/// declared length, the whole region is reinterpreted as entries from
/// offset 0.
pub fn extract_entries(region: &[u8]) -> Result<Vec<String>> {
    let payload = framed_payload(region).unwrap_or(region);

    let mut entries = Vec::new();
    let mut pos = 0;
    while pos < payload.len() {
        let len = payload[pos] as usize;
        let end = pos + 1 + len;
        if end > payload.len() {
            return Err(Error::Common(veles_common::Error::TruncatedString {
                offset: pos,
                declared: len,
                available: payload.len() - pos - 1,
            }));
        }
        let entry = std::str::from_utf8(&payload[pos + 1..end])
            .map_err(|e| Error::Common(e.into()))?;
        entries.push(entry.to_string());
        pos = end;
    }
    Ok(entries)
}

/// Correlated slice of the session string table.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PartialStringTable {
    entries: BTreeMap<u32, String>,
}

impl PartialStringTable {
    /// Look up an index.
    pub fn get(&self, index: u32) -> Option<&str> {
        self.entries.get(&index).map(String::as_str)
    }

    /// Iterate entries in ascending index order.
    pub fn iter(&self) -> impl Iterator<Item = (u32, &str)> {
        self.entries.iter().map(|(i, s)| (*i, s.as_str()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// The even-stepped window heuristic.
///
/// Session indices are odd and each message's new entries occupy consecutive
/// session slots, so in observed traffic `count` in-band entries fill the
/// window of every other index counting down from the highest referenced
/// index. This is a structural assumption about captures, not a documented
/// protocol guarantee: a message whose in-band block is non-contiguous, or
/// interleaved with references to older session strings inside the window,
/// will correlate wrongly. The assumption lives only in this function so the
/// strategy can be swapped without touching extraction or rewriting.
fn correlation_window(max_index: u32, count: usize) -> Vec<i64> {
    (0..count as i64)
        .rev()
        .map(|k| max_index as i64 - 2 * k)
        .collect()
}

fn placeholder_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\[\[VALUE_0x([0-9a-fA-F]+)\]\]").expect("placeholder regex"))
}

fn reference_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\[\[(.*?)\|ST_0x([0-9a-fA-F]+)\]\]").expect("reference regex"))
}

/// Correlate extracted in-band entries with the placeholders in decoded text.
///
/// Entries are assigned FIFO to the window slots in ascending index order.
/// A window that starts below index 1 (more entries than referenced
/// indices) still consumes entries for the out-of-range slots, keeping the
/// positional pairing of the remainder intact.
pub fn build_partial_stringtable(decoded: &str, entries: Vec<String>) -> PartialStringTable {
    let mut max_index: u32 = 1;
    for capture in placeholder_regex().captures_iter(decoded) {
        if let Ok(index) = u32::from_str_radix(&capture[1], 16) {
            max_index = max_index.max(index);
        }
    }

    let window = correlation_window(max_index, entries.len());
    let mut table = BTreeMap::new();
    let mut fifo = entries.into_iter();
    for slot in window {
        let Some(entry) = fifo.next() else { break };
        if slot >= 0 {
            table.insert(slot as u32, entry);
        }
    }
    PartialStringTable { entries: table }
}

/// Rewrite each matched `[[VALUE_0xNN]]` to its annotated
/// `[[value|ST_0xNN]]` form, keeping both the resolved text and the index.
pub fn annotate_references(decoded: &str, table: &PartialStringTable) -> String {
    let mut text = decoded.to_string();
    for (index, value) in &table.entries {
        let needle = format!("[[VALUE_0x{index:02x}]]");
        let replacement = format!("[[{value}|ST_0x{index:02x}]]");
        text = text.replace(&needle, &replacement);
    }
    text
}

/// Inverse of annotation: collect `[[value|ST_0xNN]]` references into an
/// index-to-value map and rewrite them back to bare placeholders.
///
/// Fails fast on malformed references so no bytes are emitted from a frame
/// that would not round-trip.
pub fn extract_references(text: &str) -> Result<(String, BTreeMap<u32, String>)> {
    let mut table = BTreeMap::new();
    for capture in reference_regex().captures_iter(text) {
        let index = u32::from_str_radix(&capture[2], 16)
            .map_err(|_| Error::MalformedReference(capture[0].to_string()))?;
        table.insert(index, capture[1].to_string());
    }

    let bare = reference_regex()
        .replace_all(text, |caps: &regex::Captures| {
            let index = u32::from_str_radix(&caps[2], 16).unwrap_or(0);
            format!("[[VALUE_0x{index:02x}]]")
        })
        .into_owned();

    if bare.contains("|ST_0x") {
        return Err(Error::MalformedReference(
            "unterminated string-table reference".to_string(),
        ));
    }
    Ok((bare, table))
}

/// Serialize an index-to-value map into the flat in-band blob format,
/// ascending by index, optionally prefixed with the blob's varint length.
pub fn serialize_table(
    table: &BTreeMap<u32, String>,
    suppress_length_prefix: bool,
) -> Result<Vec<u8>> {
    let mut blob = Vec::new();
    for (index, value) in table {
        let len = u8::try_from(value.len()).map_err(|_| Error::InbandEntryTooLong {
            index: *index,
            len: value.len(),
        })?;
        blob.push(len);
        blob.extend_from_slice(value.as_bytes());
    }

    if suppress_length_prefix {
        return Ok(blob);
    }
    let total = u32::try_from(blob.len()).map_err(|_| Error::OversizedText { len: blob.len() })?;
    let mut framed = varint::to_vec(total);
    framed.extend_from_slice(&blob);
    Ok(framed)
}
