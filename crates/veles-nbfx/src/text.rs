//! Text-record payloads.
//!
//! The protocol types its text content on the wire: a boolean is one tag
//! byte, small integers shrink to their narrowest width, binary data rides
//! as raw bytes and renders as base64. All variants render to plain text for
//! the XML side; [`TextValue::from_text`] maps edited text back to a typed
//! record only when the typed form renders to exactly the same text.

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use veles_common::{BinaryReader, DotNetGuid};

use crate::error::eof_to_truncated;
use crate::{dictionary, tags, Error, Result};

/// Payload of a single text record.
#[derive(Debug, Clone, PartialEq)]
pub enum TextValue {
    Zero,
    One,
    False,
    True,
    Int8(i8),
    Int16(i16),
    Int32(i32),
    Int64(i64),
    UInt64(u64),
    Float(f32),
    Double(f64),
    Chars(String),
    Bytes(Vec<u8>),
    Empty,
    Dictionary(u32),
    UniqueId(DotNetGuid),
    Uuid(DotNetGuid),
    Bool(bool),
}

impl TextValue {
    /// True when `tag` is a registered text record (either member of its
    /// plain / with-end-element pair).
    pub fn is_text_tag(tag: u8) -> bool {
        matches!(
            tag & !1,
            tags::ZERO_TEXT
                | tags::ONE_TEXT
                | tags::FALSE_TEXT
                | tags::TRUE_TEXT
                | tags::INT8_TEXT
                | tags::INT16_TEXT
                | tags::INT32_TEXT
                | tags::INT64_TEXT
                | tags::FLOAT_TEXT
                | tags::DOUBLE_TEXT
                | tags::CHARS8_TEXT
                | tags::CHARS16_TEXT
                | tags::CHARS32_TEXT
                | tags::BYTES8_TEXT
                | tags::BYTES16_TEXT
                | tags::BYTES32_TEXT
                | tags::EMPTY_TEXT
                | tags::DICTIONARY_TEXT
                | tags::UNIQUE_ID_TEXT
                | tags::UUID_TEXT
                | tags::UINT64_TEXT
                | tags::BOOL_TEXT
        )
    }

    /// Parse the payload of a text record whose tag byte is already consumed.
    pub(crate) fn parse(tag: u8, reader: &mut BinaryReader) -> Result<Self> {
        let offset = reader.position();
        let value = match tag & !1 {
            tags::ZERO_TEXT => Self::Zero,
            tags::ONE_TEXT => Self::One,
            tags::FALSE_TEXT => Self::False,
            tags::TRUE_TEXT => Self::True,
            tags::INT8_TEXT => Self::Int8(reader.read_i8().map_err(|e| eof_to_truncated(e, offset))?),
            tags::INT16_TEXT => {
                Self::Int16(reader.read_i16().map_err(|e| eof_to_truncated(e, offset))?)
            }
            tags::INT32_TEXT => {
                Self::Int32(reader.read_i32().map_err(|e| eof_to_truncated(e, offset))?)
            }
            tags::INT64_TEXT => {
                Self::Int64(reader.read_i64().map_err(|e| eof_to_truncated(e, offset))?)
            }
            tags::UINT64_TEXT => {
                Self::UInt64(reader.read_u64().map_err(|e| eof_to_truncated(e, offset))?)
            }
            tags::FLOAT_TEXT => {
                Self::Float(reader.read_f32().map_err(|e| eof_to_truncated(e, offset))?)
            }
            tags::DOUBLE_TEXT => {
                Self::Double(reader.read_f64().map_err(|e| eof_to_truncated(e, offset))?)
            }
            tags::CHARS8_TEXT => {
                let len = reader.read_u8().map_err(|e| eof_to_truncated(e, offset))? as usize;
                Self::Chars(read_chars(reader, len, offset)?)
            }
            tags::CHARS16_TEXT => {
                let len = reader.read_u16().map_err(|e| eof_to_truncated(e, offset))? as usize;
                Self::Chars(read_chars(reader, len, offset)?)
            }
            tags::CHARS32_TEXT => {
                let len = reader.read_i32().map_err(|e| eof_to_truncated(e, offset))?;
                let len = usize::try_from(len).map_err(|_| Error::TruncatedRecord { offset })?;
                Self::Chars(read_chars(reader, len, offset)?)
            }
            tags::BYTES8_TEXT => {
                let len = reader.read_u8().map_err(|e| eof_to_truncated(e, offset))? as usize;
                Self::Bytes(read_raw(reader, len, offset)?)
            }
            tags::BYTES16_TEXT => {
                let len = reader.read_u16().map_err(|e| eof_to_truncated(e, offset))? as usize;
                Self::Bytes(read_raw(reader, len, offset)?)
            }
            tags::BYTES32_TEXT => {
                let len = reader.read_i32().map_err(|e| eof_to_truncated(e, offset))?;
                let len = usize::try_from(len).map_err(|_| Error::TruncatedRecord { offset })?;
                Self::Bytes(read_raw(reader, len, offset)?)
            }
            tags::EMPTY_TEXT => Self::Empty,
            tags::DICTIONARY_TEXT => Self::Dictionary(reader.read_varint()?),
            tags::UNIQUE_ID_TEXT => Self::UniqueId(
                reader
                    .read_struct::<DotNetGuid>()
                    .map_err(|e| eof_to_truncated(e, offset))?,
            ),
            tags::UUID_TEXT => Self::Uuid(
                reader
                    .read_struct::<DotNetGuid>()
                    .map_err(|e| eof_to_truncated(e, offset))?,
            ),
            tags::BOOL_TEXT => {
                Self::Bool(reader.read_bool().map_err(|e| eof_to_truncated(e, offset))?)
            }
            _ => {
                return Err(Error::UnknownRecordType {
                    tag,
                    offset: offset.saturating_sub(1),
                })
            }
        };
        Ok(value)
    }

    /// Append the binary encoding, using the with-end-element tag variant
    /// when `ends_element` is set.
    pub(crate) fn encode_into(&self, out: &mut Vec<u8>, ends_element: bool) -> Result<()> {
        let end = ends_element as u8;
        match self {
            Self::Zero => out.push(tags::ZERO_TEXT | end),
            Self::One => out.push(tags::ONE_TEXT | end),
            Self::False => out.push(tags::FALSE_TEXT | end),
            Self::True => out.push(tags::TRUE_TEXT | end),
            Self::Int8(v) => {
                out.push(tags::INT8_TEXT | end);
                out.push(*v as u8);
            }
            Self::Int16(v) => {
                out.push(tags::INT16_TEXT | end);
                out.extend_from_slice(&v.to_le_bytes());
            }
            Self::Int32(v) => {
                out.push(tags::INT32_TEXT | end);
                out.extend_from_slice(&v.to_le_bytes());
            }
            Self::Int64(v) => {
                out.push(tags::INT64_TEXT | end);
                out.extend_from_slice(&v.to_le_bytes());
            }
            Self::UInt64(v) => {
                out.push(tags::UINT64_TEXT | end);
                out.extend_from_slice(&v.to_le_bytes());
            }
            Self::Float(v) => {
                out.push(tags::FLOAT_TEXT | end);
                out.extend_from_slice(&v.to_le_bytes());
            }
            Self::Double(v) => {
                out.push(tags::DOUBLE_TEXT | end);
                out.extend_from_slice(&v.to_le_bytes());
            }
            Self::Chars(s) => encode_sized(s.as_bytes(), tags::CHARS8_TEXT, end, out)?,
            Self::Bytes(b) => encode_sized(b, tags::BYTES8_TEXT, end, out)?,
            Self::Empty => out.push(tags::EMPTY_TEXT | end),
            Self::Dictionary(index) => {
                out.push(tags::DICTIONARY_TEXT | end);
                veles_common::varint::encode(*index, out);
            }
            Self::UniqueId(guid) => {
                out.push(tags::UNIQUE_ID_TEXT | end);
                out.extend_from_slice(guid.as_bytes());
            }
            Self::Uuid(guid) => {
                out.push(tags::UUID_TEXT | end);
                out.extend_from_slice(guid.as_bytes());
            }
            Self::Bool(v) => {
                out.push(tags::BOOL_TEXT | end);
                out.push(*v as u8);
            }
        }
        Ok(())
    }

    /// Render the payload as XML text.
    pub(crate) fn render(&self) -> Result<String> {
        let text = match self {
            Self::Zero => "0".to_string(),
            Self::One => "1".to_string(),
            Self::False => "false".to_string(),
            Self::True => "true".to_string(),
            Self::Int8(v) => v.to_string(),
            Self::Int16(v) => v.to_string(),
            Self::Int32(v) => v.to_string(),
            Self::Int64(v) => v.to_string(),
            Self::UInt64(v) => v.to_string(),
            Self::Float(v) => v.to_string(),
            Self::Double(v) => v.to_string(),
            Self::Chars(s) => s.clone(),
            Self::Bytes(b) => BASE64.encode(b),
            Self::Empty => String::new(),
            Self::Dictionary(index) => dictionary::resolve(*index)?,
            Self::UniqueId(guid) => format!("urn:uuid:{guid}"),
            Self::Uuid(guid) => guid.to_string(),
            Self::Bool(v) => v.to_string(),
        };
        Ok(text)
    }

    /// Map XML text back to a typed record.
    ///
    /// Only forms whose rendering reproduces the input exactly are typed;
    /// everything else stays a character record. Floats always stay
    /// character records to avoid lossy re-parsing.
    pub(crate) fn from_text(s: &str) -> Self {
        match s {
            "0" => return Self::Zero,
            "1" => return Self::One,
            "false" => return Self::False,
            "true" => return Self::True,
            "" => return Self::Empty,
            _ => {}
        }
        if let Some(index) = dictionary::placeholder_index(s) {
            return Self::Dictionary(index);
        }
        if let Ok(v) = s.parse::<i64>() {
            if v.to_string() == s {
                return narrow_int(v);
            }
        }
        if let Some(rest) = s.strip_prefix("urn:uuid:") {
            if let Ok(guid) = rest.parse::<DotNetGuid>() {
                if guid.to_string() == rest {
                    return Self::UniqueId(guid);
                }
            }
        }
        Self::Chars(s.to_string())
    }
}

/// Pick the narrowest integer record that holds `v`.
fn narrow_int(v: i64) -> TextValue {
    if let Ok(v) = i8::try_from(v) {
        TextValue::Int8(v)
    } else if let Ok(v) = i16::try_from(v) {
        TextValue::Int16(v)
    } else if let Ok(v) = i32::try_from(v) {
        TextValue::Int32(v)
    } else {
        TextValue::Int64(v)
    }
}

fn read_chars(reader: &mut BinaryReader, len: usize, offset: usize) -> Result<String> {
    let bytes = read_raw(reader, len, offset)?;
    String::from_utf8(bytes).map_err(|e| Error::Common(e.utf8_error().into()))
}

fn read_raw(reader: &mut BinaryReader, len: usize, offset: usize) -> Result<Vec<u8>> {
    // Bounds-checked against the remaining buffer before any allocation.
    let bytes = reader
        .read_bytes(len)
        .map_err(|e| eof_to_truncated(e, offset))?;
    Ok(bytes.to_vec())
}

/// Write a length-prefixed payload, choosing the 8/16/32-bit length form.
fn encode_sized(payload: &[u8], base8_tag: u8, end: u8, out: &mut Vec<u8>) -> Result<()> {
    // The 16-bit form is base8 + 2, the 32-bit form base8 + 4.
    if let Ok(len) = u8::try_from(payload.len()) {
        out.push(base8_tag | end);
        out.push(len);
    } else if let Ok(len) = u16::try_from(payload.len()) {
        out.push((base8_tag + 2) | end);
        out.extend_from_slice(&len.to_le_bytes());
    } else {
        let len = i32::try_from(payload.len()).map_err(|_| Error::OversizedText {
            len: payload.len(),
        })?;
        out.push((base8_tag + 4) | end);
        out.extend_from_slice(&len.to_le_bytes());
    }
    out.extend_from_slice(payload);
    Ok(())
}
