//! Parse XML text into a record forest.

use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;

use crate::attribute::AttributeRecord;
use crate::record::{ElementRecord, NameRef, Record};
use crate::text::TextValue;
use crate::{Document, Error, Result};

impl Document {
    /// Parse XML text into a document that can produce binary XML bytes.
    ///
    /// The input is the editable form [`Document::to_xml_string`] produces:
    /// a bare fragment, `[[VALUE_0xNN]]` tokens for session dictionary
    /// references, well-known names free to appear as plain text.
    ///
    /// # Example
    ///
    /// ```
    /// use veles_nbfx::Document;
    ///
    /// let doc = Document::from_xml(r#"<Ping id="1"/>"#)?;
    /// let bytes = doc.to_bytes()?;
    /// # Ok::<(), veles_nbfx::Error>(())
    /// ```
    pub fn from_xml(xml: &str) -> Result<Self> {
        let records = parse_xml_records(xml)?;
        Ok(Document::from_records(records))
    }
}

/// Parse XML text into a record forest using an explicit open-element stack.
fn parse_xml_records(xml: &str) -> Result<Vec<Record>> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    let mut stack: Vec<ElementRecord> = Vec::new();
    let mut roots: Vec<Record> = Vec::new();

    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) => {
                stack.push(element_from_start(&e)?);
            }
            Ok(Event::Empty(e)) => {
                // Self-closing element
                let element = element_from_start(&e)?;
                attach(Record::Element(element), &mut stack, &mut roots);
            }
            Ok(Event::End(_)) => {
                if let Some(element) = stack.pop() {
                    attach(Record::Element(element), &mut stack, &mut roots);
                }
            }
            Ok(Event::Text(e)) => {
                let text = e
                    .unescape()
                    .map_err(|e| Error::Xml(format!("XML parse error: {}", e)))?;
                if !text.trim().is_empty() {
                    let value = TextValue::from_text(&text);
                    attach(
                        Record::Text {
                            value,
                            ends_element: false,
                        },
                        &mut stack,
                        &mut roots,
                    );
                }
            }
            Ok(Event::Comment(e)) => {
                let text = std::str::from_utf8(e.as_ref())
                    .map_err(|e| Error::Xml(format!("XML parse error: {}", e)))?;
                attach(Record::Comment(text.to_string()), &mut stack, &mut roots);
            }
            Ok(Event::Eof) => break,
            Ok(_) => {} // Ignore declarations, processing instructions, etc.
            Err(e) => return Err(Error::Xml(format!("XML parse error: {}", e))),
        }
    }

    if !stack.is_empty() {
        return Err(Error::Xml("unclosed element in XML input".to_string()));
    }
    if roots.is_empty() {
        return Err(Error::Xml("no records found in XML input".to_string()));
    }
    Ok(roots)
}

/// Attach a finished record to the open element on top of the stack, or to
/// the root sequence when nothing is open.
fn attach(record: Record, stack: &mut Vec<ElementRecord>, roots: &mut Vec<Record>) {
    if let Some(parent) = stack.last_mut() {
        parent.children.push(record);
    } else {
        roots.push(record);
    }
}

/// Build an element record from a start or empty tag.
fn element_from_start(e: &BytesStart) -> Result<ElementRecord> {
    let raw = String::from_utf8_lossy(e.name().as_ref()).into_owned();
    let (prefix, local) = split_qname(&raw);
    let name = NameRef::from_xml_name(local);

    let mut attributes = Vec::new();
    for attribute in e.attributes() {
        let attribute = attribute.map_err(|e| Error::Xml(format!("XML parse error: {}", e)))?;
        let key = String::from_utf8_lossy(attribute.key.as_ref()).into_owned();
        let value = attribute
            .unescape_value()
            .map_err(|e| Error::Xml(format!("XML parse error: {}", e)))?;

        let record = if key == "xmlns" {
            AttributeRecord::Xmlns {
                prefix: None,
                value: NameRef::from_xml_name(&value),
            }
        } else if let Some(ns_prefix) = key.strip_prefix("xmlns:") {
            AttributeRecord::Xmlns {
                prefix: Some(ns_prefix.to_string()),
                value: NameRef::from_xml_name(&value),
            }
        } else {
            let (attr_prefix, attr_local) = split_qname(&key);
            AttributeRecord::Named {
                prefix: attr_prefix,
                name: NameRef::from_xml_name(attr_local),
                value: TextValue::from_text(&value),
            }
        };
        attributes.push(record);
    }

    Ok(ElementRecord {
        prefix,
        name,
        attributes,
        children: Vec::new(),
    })
}

/// Split `prefix:local` into its parts.
fn split_qname(raw: &str) -> (Option<String>, &str) {
    match raw.split_once(':') {
        Some((prefix, local)) if !prefix.is_empty() => (Some(prefix.to_string()), local),
        _ => (None, raw),
    }
}
