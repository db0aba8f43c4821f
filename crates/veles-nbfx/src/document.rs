//! Parsed document forest and its XML renderer.

use std::io::Write;

use quick_xml::events::{BytesEnd, BytesStart, BytesText, Event};
use quick_xml::Writer;
use veles_common::BinaryReader;

use crate::record::{qualified_name, ElementRecord, Record};
use crate::{Error, Result};

/// A parsed binary XML document: an ordered forest of records.
///
/// This is the only intermediate form between wire bytes and XML text, and
/// it is a plain value - decoding and encoding thread everything through it,
/// so concurrent calls never share state.
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    records: Vec<Record>,
}

impl Document {
    /// Parse a canonical record stream.
    pub fn parse(data: &[u8]) -> Result<Self> {
        Self::parse_at(data, 0)
    }

    /// Parse a canonical record stream starting at `offset`.
    pub fn parse_at(data: &[u8], offset: usize) -> Result<Self> {
        let mut reader = BinaryReader::new_at(data, offset);
        let records = Record::parse_sequence(&mut reader)?;
        Ok(Self { records })
    }

    /// Build a document from an existing record forest.
    pub fn from_records(records: Vec<Record>) -> Self {
        Self { records }
    }

    /// The record forest in document order.
    pub fn records(&self) -> &[Record] {
        &self.records
    }

    /// Encode back to the canonical binary form.
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        let mut out = Vec::new();
        for record in &self.records {
            record.encode_into(&mut out)?;
        }
        Ok(out)
    }

    /// Convert to an XML string.
    ///
    /// Output is compact - no declaration, no indentation - so that decoded
    /// text re-encodes without picking up synthetic whitespace. Unresolved
    /// dictionary references render as `[[VALUE_0xNN]]` tokens.
    pub fn to_xml_string(&self) -> Result<String> {
        let mut output = Vec::new();
        self.write_xml(&mut output)?;
        String::from_utf8(output).map_err(|e| Error::Xml(e.to_string()))
    }

    /// Write XML to a writer.
    pub fn write_xml<W: Write>(&self, writer: &mut W) -> Result<()> {
        let mut xml_writer = Writer::new(writer);
        for record in &self.records {
            write_record(&mut xml_writer, record)?;
        }
        Ok(())
    }
}

fn write_record<W: Write>(writer: &mut Writer<W>, record: &Record) -> Result<()> {
    match record {
        Record::Element(element) => write_element(writer, element),
        Record::Text { value, .. } => {
            let text = value.render()?;
            writer
                .write_event(Event::Text(BytesText::new(&text)))
                .map_err(|e| Error::Xml(e.to_string()))
        }
        Record::Comment(text) => writer
            .write_event(Event::Comment(BytesText::from_escaped(text.as_str())))
            .map_err(|e| Error::Xml(e.to_string())),
    }
}

/// Write a single element and its children.
fn write_element<W: Write>(writer: &mut Writer<W>, element: &ElementRecord) -> Result<()> {
    let tag_name = qualified_name(element.prefix.as_deref(), &element.name.render()?);

    let mut elem = BytesStart::new(&tag_name);
    for attribute in &element.attributes {
        let (key, value) = attribute.render()?;
        elem.push_attribute((key.as_str(), value.as_str()));
    }

    if element.children.is_empty() {
        // Self-closing element
        writer
            .write_event(Event::Empty(elem))
            .map_err(|e| Error::Xml(e.to_string()))?;
    } else {
        writer
            .write_event(Event::Start(elem))
            .map_err(|e| Error::Xml(e.to_string()))?;

        for child in &element.children {
            write_record(writer, child)?;
        }

        writer
            .write_event(Event::End(BytesEnd::new(&tag_name)))
            .map_err(|e| Error::Xml(e.to_string()))?;
    }

    Ok(())
}
