//! Attribute records.

use veles_common::BinaryReader;

use crate::record::{qualified_name, write_prefixed_str, NameRef};
use crate::tags::{self, AttributeForm, PrefixSource};
use crate::text::TextValue;
use crate::{Error, Result};

/// An attribute attached to an element record.
#[derive(Debug, Clone, PartialEq)]
pub enum AttributeRecord {
    /// A named attribute; the value is a single text record.
    Named {
        prefix: Option<String>,
        name: NameRef,
        value: TextValue,
    },
    /// An `xmlns` / `xmlns:prefix` namespace declaration.
    Xmlns {
        prefix: Option<String>,
        value: NameRef,
    },
}

impl AttributeRecord {
    /// Parse an attribute record whose tag byte is already consumed.
    pub(crate) fn parse(tag: u8, tag_offset: usize, reader: &mut BinaryReader) -> Result<Self> {
        let Some(form) = tags::attribute_form(tag) else {
            return Err(Error::UnknownRecordType {
                tag,
                offset: tag_offset,
            });
        };

        match form {
            AttributeForm::Named { name, prefix } => {
                let prefix = read_prefix(prefix, reader)?;
                let name = NameRef::parse(name, reader)?;
                let value = parse_value(reader)?;
                Ok(Self::Named {
                    prefix,
                    name,
                    value,
                })
            }
            AttributeForm::Xmlns { has_prefix, name } => {
                let prefix = if has_prefix {
                    Some(reader.read_prefixed_str()?.to_string())
                } else {
                    None
                };
                let value = NameRef::parse(name, reader)?;
                Ok(Self::Xmlns { prefix, value })
            }
        }
    }

    /// Append the binary encoding: tag byte, then fields in parse order.
    pub(crate) fn encode_into(&self, out: &mut Vec<u8>) -> Result<()> {
        match self {
            Self::Named {
                prefix,
                name,
                value,
            } => {
                let letter = prefix.as_deref().and_then(tags::prefix_letter_index);
                match (prefix, letter, name) {
                    (None, _, NameRef::Literal(name)) => {
                        out.push(tags::SHORT_ATTRIBUTE);
                        write_prefixed_str(name, out)?;
                    }
                    (None, _, NameRef::Dictionary(index)) => {
                        out.push(tags::SHORT_DICTIONARY_ATTRIBUTE);
                        veles_common::varint::encode(*index, out);
                    }
                    (Some(_), Some(i), NameRef::Literal(name)) => {
                        out.push(tags::PREFIX_ATTRIBUTE_A + i);
                        write_prefixed_str(name, out)?;
                    }
                    (Some(_), Some(i), NameRef::Dictionary(index)) => {
                        out.push(tags::PREFIX_DICTIONARY_ATTRIBUTE_A + i);
                        veles_common::varint::encode(*index, out);
                    }
                    (Some(prefix), None, NameRef::Literal(name)) => {
                        out.push(tags::ATTRIBUTE);
                        write_prefixed_str(prefix, out)?;
                        write_prefixed_str(name, out)?;
                    }
                    (Some(prefix), None, NameRef::Dictionary(index)) => {
                        out.push(tags::DICTIONARY_ATTRIBUTE);
                        write_prefixed_str(prefix, out)?;
                        veles_common::varint::encode(*index, out);
                    }
                }
                value.encode_into(out, false)
            }
            Self::Xmlns { prefix, value } => {
                match (prefix, value) {
                    (None, NameRef::Literal(uri)) => {
                        out.push(tags::SHORT_XMLNS_ATTRIBUTE);
                        write_prefixed_str(uri, out)?;
                    }
                    (None, NameRef::Dictionary(index)) => {
                        out.push(tags::SHORT_DICTIONARY_XMLNS_ATTRIBUTE);
                        veles_common::varint::encode(*index, out);
                    }
                    (Some(prefix), NameRef::Literal(uri)) => {
                        out.push(tags::XMLNS_ATTRIBUTE);
                        write_prefixed_str(prefix, out)?;
                        write_prefixed_str(uri, out)?;
                    }
                    (Some(prefix), NameRef::Dictionary(index)) => {
                        out.push(tags::DICTIONARY_XMLNS_ATTRIBUTE);
                        write_prefixed_str(prefix, out)?;
                        veles_common::varint::encode(*index, out);
                    }
                }
                Ok(())
            }
        }
    }

    /// Render as an XML attribute key/value pair.
    pub(crate) fn render(&self) -> Result<(String, String)> {
        match self {
            Self::Named {
                prefix,
                name,
                value,
            } => Ok((
                qualified_name(prefix.as_deref(), &name.render()?),
                value.render()?,
            )),
            Self::Xmlns { prefix, value } => {
                let key = match prefix {
                    Some(p) => format!("xmlns:{p}"),
                    None => "xmlns".to_string(),
                };
                Ok((key, value.render()?))
            }
        }
    }
}

fn read_prefix(source: PrefixSource, reader: &mut BinaryReader) -> Result<Option<String>> {
    match source {
        PrefixSource::None => Ok(None),
        PrefixSource::Literal => Ok(Some(reader.read_prefixed_str()?.to_string())),
        PrefixSource::Fixed(letter) => Ok(Some((letter as char).to_string())),
    }
}

/// An attribute's value is exactly one text record.
fn parse_value(reader: &mut BinaryReader) -> Result<TextValue> {
    let offset = reader.position();
    let tag = reader
        .read_u8()
        .map_err(|e| crate::error::eof_to_truncated(e, offset))?;
    if !TextValue::is_text_tag(tag) {
        return Err(Error::UnknownRecordType { tag, offset });
    }
    // The with-end-element bit has no meaning in attribute position.
    TextValue::parse(tag, reader)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse_bytes(data: &[u8]) -> Result<AttributeRecord> {
        let mut reader = BinaryReader::new(data);
        let tag = reader.read_u8().unwrap();
        AttributeRecord::parse(tag, 0, &mut reader)
    }

    fn round_trip(data: &[u8]) -> AttributeRecord {
        let attr = parse_bytes(data).unwrap();
        let mut out = Vec::new();
        attr.encode_into(&mut out).unwrap();
        assert_eq!(out, data);
        attr
    }

    #[test]
    fn test_short_attribute() {
        let attr = round_trip(&[
            tags::SHORT_ATTRIBUTE,
            0x04,
            b'N',
            b'a',
            b'm',
            b'e',
            tags::CHARS8_TEXT,
            0x02,
            b'o',
            b'k',
        ]);
        assert_eq!(attr.render().unwrap(), ("Name".to_string(), "ok".to_string()));
    }

    #[test]
    fn test_prefixed_attribute() {
        let attr = round_trip(&[
            tags::ATTRIBUTE,
            0x02,
            b'n',
            b's',
            0x03,
            b'k',
            b'e',
            b'y',
            tags::TRUE_TEXT,
        ]);
        assert_eq!(
            attr.render().unwrap(),
            ("ns:key".to_string(), "true".to_string())
        );
    }

    #[test]
    fn test_letter_prefixed_dictionary_attribute() {
        // 0x0C + 18 = letter 's', dictionary name 0x00 = mustUnderstand
        let attr = round_trip(&[
            tags::PREFIX_DICTIONARY_ATTRIBUTE_A + 18,
            0x00,
            tags::ONE_TEXT,
        ]);
        assert_eq!(
            attr.render().unwrap(),
            ("s:mustUnderstand".to_string(), "1".to_string())
        );
    }

    #[test]
    fn test_xmlns_forms() {
        let attr = round_trip(&[tags::SHORT_DICTIONARY_XMLNS_ATTRIBUTE, 0x04]);
        assert_eq!(
            attr.render().unwrap(),
            (
                "xmlns".to_string(),
                "http://www.w3.org/2003/05/soap-envelope".to_string()
            )
        );

        let attr = round_trip(&[tags::DICTIONARY_XMLNS_ATTRIBUTE, 0x01, b's', 0x04]);
        assert_eq!(
            attr.render().unwrap(),
            (
                "xmlns:s".to_string(),
                "http://www.w3.org/2003/05/soap-envelope".to_string()
            )
        );
    }

    #[test]
    fn test_attribute_value_must_be_text() {
        let result = parse_bytes(&[tags::SHORT_ATTRIBUTE, 0x01, b'a', tags::SHORT_ELEMENT]);
        assert!(matches!(
            result,
            Err(Error::UnknownRecordType {
                tag: tags::SHORT_ELEMENT,
                ..
            })
        ));
    }
}
