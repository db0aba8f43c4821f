//! The tagged record model and its recursive parse/encode state machine.
//!
//! One tag byte selects the record form; the form dictates which fields
//! follow. An element record then owns its attributes (greedy, while the
//! next tag is in the attribute range) and its children (recursive, until an
//! end-element record or a with-end-element text record). Encoding walks the
//! same structure in the same order, so parse and encode are exact inverses
//! at the byte level.

use veles_common::BinaryReader;

use crate::attribute::AttributeRecord;
use crate::error::eof_to_truncated;
use crate::tags::{self, NameSource, PrefixSource};
use crate::text::TextValue;
use crate::{dictionary, Error, Result};

/// Maximum element nesting accepted from untrusted input.
pub const MAX_DEPTH: usize = 256;

/// An element or attribute name: literal UTF-8 or a string-table index.
#[derive(Debug, Clone, PartialEq)]
pub enum NameRef {
    Literal(String),
    Dictionary(u32),
}

impl NameRef {
    pub(crate) fn parse(source: NameSource, reader: &mut BinaryReader) -> Result<Self> {
        match source {
            NameSource::Literal => Ok(Self::Literal(reader.read_prefixed_str()?.to_string())),
            NameSource::Dictionary => Ok(Self::Dictionary(reader.read_varint()?)),
        }
    }

    /// Resolve to renderable text (placeholder for session-space indices).
    pub(crate) fn render(&self) -> Result<String> {
        match self {
            Self::Literal(s) => Ok(s.clone()),
            Self::Dictionary(index) => dictionary::resolve(*index),
        }
    }

    /// Map an XML name to its wire form: placeholders and well-known strings
    /// become dictionary references, everything else stays literal.
    pub(crate) fn from_xml_name(name: &str) -> Self {
        if let Some(index) = dictionary::placeholder_index(name) {
            Self::Dictionary(index)
        } else if let Some(index) = dictionary::index_of(name) {
            Self::Dictionary(index)
        } else {
            Self::Literal(name.to_string())
        }
    }
}

/// An element record with its attributes and children.
#[derive(Debug, Clone, PartialEq)]
pub struct ElementRecord {
    pub prefix: Option<String>,
    pub name: NameRef,
    pub attributes: Vec<AttributeRecord>,
    pub children: Vec<Record>,
}

/// One record in the document forest.
#[derive(Debug, Clone, PartialEq)]
pub enum Record {
    Element(ElementRecord),
    /// A text node; `ends_element` marks the with-end-element tag variant,
    /// which closes the enclosing element without a separate end record.
    Text {
        value: TextValue,
        ends_element: bool,
    },
    Comment(String),
}

impl Record {
    /// Parse a top-level record sequence until the buffer is exhausted.
    pub(crate) fn parse_sequence(reader: &mut BinaryReader) -> Result<Vec<Record>> {
        let mut records = Vec::new();
        while !reader.is_empty() {
            let offset = reader.position();
            let tag = reader.read_u8().map_err(|e| eof_to_truncated(e, offset))?;
            if tag == tags::END_ELEMENT {
                return Err(Error::UnexpectedEndElement { offset });
            }
            let record = Self::parse_child(tag, offset, reader, 0)?;
            if let Record::Text {
                ends_element: true, ..
            } = record
            {
                return Err(Error::UnexpectedEndElement { offset });
            }
            records.push(record);
        }
        Ok(records)
    }

    /// Parse one non-end record whose tag byte is already consumed.
    fn parse_child(
        tag: u8,
        tag_offset: usize,
        reader: &mut BinaryReader,
        depth: usize,
    ) -> Result<Record> {
        if let Some(form) = tags::element_form(tag) {
            return Ok(Record::Element(ElementRecord::parse(form, reader, depth)?));
        }
        if TextValue::is_text_tag(tag) {
            let ends_element = tag & 1 == 1;
            let value = TextValue::parse(tag, reader)?;
            return Ok(Record::Text {
                value,
                ends_element,
            });
        }
        if tag == tags::COMMENT {
            return Ok(Record::Comment(reader.read_prefixed_str()?.to_string()));
        }
        Err(Error::UnknownRecordType {
            tag,
            offset: tag_offset,
        })
    }

    /// Append the binary encoding of this record.
    pub(crate) fn encode_into(&self, out: &mut Vec<u8>) -> Result<()> {
        match self {
            Record::Element(element) => element.encode_into(out),
            Record::Text {
                value,
                ends_element,
            } => value.encode_into(out, *ends_element),
            Record::Comment(text) => {
                out.push(tags::COMMENT);
                write_prefixed_str(text, out)
            }
        }
    }
}

impl ElementRecord {
    /// Parse fields, attributes and children of an element whose tag byte is
    /// already consumed.
    fn parse(form: tags::ElementForm, reader: &mut BinaryReader, depth: usize) -> Result<Self> {
        if depth >= MAX_DEPTH {
            return Err(Error::DepthLimitExceeded { limit: MAX_DEPTH });
        }

        let prefix = match form.prefix {
            PrefixSource::None => None,
            PrefixSource::Literal => Some(reader.read_prefixed_str()?.to_string()),
            PrefixSource::Fixed(letter) => Some((letter as char).to_string()),
        };
        let name = NameRef::parse(form.name, reader)?;

        let mut attributes = Vec::new();
        loop {
            let next = reader
                .peek_u8()
                .map_err(|e| eof_to_truncated(e, reader.position()))?;
            if !tags::is_attribute(next) {
                break;
            }
            let tag_offset = reader.position();
            let tag = reader.read_u8().map_err(|e| eof_to_truncated(e, tag_offset))?;
            attributes.push(AttributeRecord::parse(tag, tag_offset, reader)?);
        }

        let mut children = Vec::new();
        loop {
            let offset = reader.position();
            let tag = reader.read_u8().map_err(|e| eof_to_truncated(e, offset))?;
            if tag == tags::END_ELEMENT {
                break;
            }
            let child = Record::parse_child(tag, offset, reader, depth + 1)?;
            let closes = matches!(
                child,
                Record::Text {
                    ends_element: true,
                    ..
                }
            );
            children.push(child);
            if closes {
                break;
            }
        }

        Ok(Self {
            prefix,
            name,
            attributes,
            children,
        })
    }

    /// Append the binary encoding: tag byte, fields, attributes, children,
    /// close marker.
    pub(crate) fn encode_into(&self, out: &mut Vec<u8>) -> Result<()> {
        let letter = self.prefix.as_deref().and_then(tags::prefix_letter_index);
        match (&self.prefix, letter, &self.name) {
            (None, _, NameRef::Literal(name)) => {
                out.push(tags::SHORT_ELEMENT);
                write_prefixed_str(name, out)?;
            }
            (None, _, NameRef::Dictionary(index)) => {
                out.push(tags::SHORT_DICTIONARY_ELEMENT);
                veles_common::varint::encode(*index, out);
            }
            (Some(_), Some(i), NameRef::Literal(name)) => {
                out.push(tags::PREFIX_ELEMENT_A + i);
                write_prefixed_str(name, out)?;
            }
            (Some(_), Some(i), NameRef::Dictionary(index)) => {
                out.push(tags::PREFIX_DICTIONARY_ELEMENT_A + i);
                veles_common::varint::encode(*index, out);
            }
            (Some(prefix), None, NameRef::Literal(name)) => {
                out.push(tags::ELEMENT);
                write_prefixed_str(prefix, out)?;
                write_prefixed_str(name, out)?;
            }
            (Some(prefix), None, NameRef::Dictionary(index)) => {
                out.push(tags::DICTIONARY_ELEMENT);
                write_prefixed_str(prefix, out)?;
                veles_common::varint::encode(*index, out);
            }
        }

        for attribute in &self.attributes {
            attribute.encode_into(out)?;
        }
        for child in &self.children {
            child.encode_into(out)?;
        }

        // A trailing with-end-element text record already closed us.
        let closed_by_text = matches!(
            self.children.last(),
            Some(Record::Text {
                ends_element: true,
                ..
            })
        );
        if !closed_by_text {
            out.push(tags::END_ELEMENT);
        }
        Ok(())
    }
}

/// Qualified XML name from an optional prefix and a local name.
pub(crate) fn qualified_name(prefix: Option<&str>, local: &str) -> String {
    match prefix {
        Some(p) => format!("{p}:{local}"),
        None => local.to_string(),
    }
}

/// Write a varint byte count followed by the UTF-8 bytes.
pub(crate) fn write_prefixed_str(s: &str, out: &mut Vec<u8>) -> Result<()> {
    let len = u32::try_from(s.len()).map_err(|_| Error::OversizedText { len: s.len() })?;
    veles_common::varint::encode(len, out);
    out.extend_from_slice(s.as_bytes());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse_all(data: &[u8]) -> Result<Vec<Record>> {
        let mut reader = BinaryReader::new(data);
        Record::parse_sequence(&mut reader)
    }

    fn encode_all(records: &[Record]) -> Vec<u8> {
        let mut out = Vec::new();
        for record in records {
            record.encode_into(&mut out).unwrap();
        }
        out
    }

    #[test]
    fn test_minimal_element_round_trip() {
        let data = [tags::SHORT_ELEMENT, 0x04, b'T', b'e', b's', b't', tags::END_ELEMENT];
        let records = parse_all(&data).unwrap();
        assert_eq!(records.len(), 1);
        match &records[0] {
            Record::Element(e) => {
                assert_eq!(e.prefix, None);
                assert_eq!(e.name, NameRef::Literal("Test".to_string()));
                assert!(e.attributes.is_empty());
                assert!(e.children.is_empty());
            }
            other => panic!("expected element, got {other:?}"),
        }
        assert_eq!(encode_all(&records), data);
    }

    #[test]
    fn test_letter_prefix_dictionary_element() {
        // 0x44 + 18 = 0x56: prefix 's', dictionary name 0x02 = Envelope
        let data = [0x56, 0x02, tags::END_ELEMENT];
        let records = parse_all(&data).unwrap();
        match &records[0] {
            Record::Element(e) => {
                assert_eq!(e.prefix.as_deref(), Some("s"));
                assert_eq!(e.name, NameRef::Dictionary(0x02));
            }
            other => panic!("expected element, got {other:?}"),
        }
        assert_eq!(encode_all(&records), data);
    }

    #[test]
    fn test_literal_prefix_element() {
        let data = [
            tags::ELEMENT,
            0x02,
            b'n',
            b's',
            0x01,
            b'E',
            tags::END_ELEMENT,
        ];
        let records = parse_all(&data).unwrap();
        assert_eq!(encode_all(&records), data);
    }

    #[test]
    fn test_attributes_then_children() {
        let data = [
            tags::SHORT_ELEMENT,
            0x01,
            b'a',
            tags::SHORT_ATTRIBUTE,
            0x01,
            b'k',
            tags::CHARS8_TEXT,
            0x01,
            b'v',
            tags::SHORT_ELEMENT,
            0x01,
            b'b',
            tags::END_ELEMENT,
            tags::END_ELEMENT,
        ];
        let records = parse_all(&data).unwrap();
        match &records[0] {
            Record::Element(e) => {
                assert_eq!(e.attributes.len(), 1);
                assert_eq!(e.children.len(), 1);
            }
            other => panic!("expected element, got {other:?}"),
        }
        assert_eq!(encode_all(&records), data);
    }

    #[test]
    fn test_with_end_element_text_closes() {
        let data = [
            tags::SHORT_ELEMENT,
            0x01,
            b'a',
            tags::CHARS8_TEXT + 1,
            0x02,
            b'h',
            b'i',
        ];
        let records = parse_all(&data).unwrap();
        assert_eq!(records.len(), 1);
        match &records[0] {
            Record::Element(e) => {
                assert_eq!(e.children.len(), 1);
                assert!(matches!(
                    e.children[0],
                    Record::Text {
                        ends_element: true,
                        ..
                    }
                ));
            }
            other => panic!("expected element, got {other:?}"),
        }
        assert_eq!(encode_all(&records), data);
    }

    #[test]
    fn test_comment_record() {
        let data = [
            tags::SHORT_ELEMENT,
            0x01,
            b'a',
            tags::COMMENT,
            0x02,
            b'h',
            b'i',
            tags::END_ELEMENT,
        ];
        let records = parse_all(&data).unwrap();
        match &records[0] {
            Record::Element(e) => {
                assert_eq!(e.children, vec![Record::Comment("hi".to_string())]);
            }
            other => panic!("expected element, got {other:?}"),
        }
        assert_eq!(encode_all(&records), data);
    }

    #[test]
    fn test_unknown_tag() {
        let data = [tags::SHORT_ELEMENT, 0x01, b'a', 0x03, tags::END_ELEMENT];
        assert!(matches!(
            parse_all(&data),
            Err(Error::UnknownRecordType {
                tag: 0x03,
                offset: 3,
            })
        ));
    }

    #[test]
    fn test_missing_end_element() {
        let data = [tags::SHORT_ELEMENT, 0x04, b'T', b'e', b's', b't'];
        assert!(matches!(
            parse_all(&data),
            Err(Error::TruncatedRecord { offset: 6 })
        ));
    }

    #[test]
    fn test_unexpected_end_element_at_top_level() {
        assert!(matches!(
            parse_all(&[tags::END_ELEMENT]),
            Err(Error::UnexpectedEndElement { offset: 0 })
        ));
    }

    #[test]
    fn test_truncated_name_propagates_string_error() {
        let data = [tags::SHORT_ELEMENT, 0x10, b'a'];
        assert!(matches!(
            parse_all(&data),
            Err(Error::Common(veles_common::Error::TruncatedString { .. }))
        ));
    }

    #[test]
    fn test_depth_limit() {
        // MAX_DEPTH + 1 nested opens; the parser must refuse before recursing
        // past the bound.
        let mut data = Vec::new();
        for _ in 0..=MAX_DEPTH {
            data.extend_from_slice(&[tags::SHORT_ELEMENT, 0x01, b'a']);
        }
        for _ in 0..=MAX_DEPTH {
            data.push(tags::END_ELEMENT);
        }
        assert!(matches!(
            parse_all(&data),
            Err(Error::DepthLimitExceeded { limit: MAX_DEPTH })
        ));
    }

    #[test]
    fn test_forest_of_roots() {
        let data = [
            tags::SHORT_ELEMENT,
            0x01,
            b'a',
            tags::END_ELEMENT,
            tags::SHORT_ELEMENT,
            0x01,
            b'b',
            tags::END_ELEMENT,
        ];
        let records = parse_all(&data).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(encode_all(&records), data);
    }
}
