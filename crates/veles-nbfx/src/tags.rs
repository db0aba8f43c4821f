//! Record-type tag bytes and the tag-to-form dispatch tables.
//!
//! The protocol burns a dedicated tag byte per field layout instead of
//! carrying layout flags: four base element forms, four base attribute forms
//! plus the xmlns family, and two 26-entry ranges that pre-bind a single
//! lowercase letter as the namespace prefix. The original implementation
//! generated one class per tag; here the whole space collapses into a pair
//! of lookup functions over policy descriptors, so adding a record form is
//! one new match arm.

pub const END_ELEMENT: u8 = 0x01;
pub const COMMENT: u8 = 0x02;

pub const SHORT_ATTRIBUTE: u8 = 0x04;
pub const ATTRIBUTE: u8 = 0x05;
pub const SHORT_DICTIONARY_ATTRIBUTE: u8 = 0x06;
pub const DICTIONARY_ATTRIBUTE: u8 = 0x07;
pub const SHORT_XMLNS_ATTRIBUTE: u8 = 0x08;
pub const XMLNS_ATTRIBUTE: u8 = 0x09;
pub const SHORT_DICTIONARY_XMLNS_ATTRIBUTE: u8 = 0x0A;
pub const DICTIONARY_XMLNS_ATTRIBUTE: u8 = 0x0B;
pub const PREFIX_DICTIONARY_ATTRIBUTE_A: u8 = 0x0C;
pub const PREFIX_DICTIONARY_ATTRIBUTE_Z: u8 = 0x25;
pub const PREFIX_ATTRIBUTE_A: u8 = 0x26;
pub const PREFIX_ATTRIBUTE_Z: u8 = 0x3F;

pub const SHORT_ELEMENT: u8 = 0x40;
pub const ELEMENT: u8 = 0x41;
pub const SHORT_DICTIONARY_ELEMENT: u8 = 0x42;
pub const DICTIONARY_ELEMENT: u8 = 0x43;
pub const PREFIX_DICTIONARY_ELEMENT_A: u8 = 0x44;
pub const PREFIX_DICTIONARY_ELEMENT_Z: u8 = 0x5D;
pub const PREFIX_ELEMENT_A: u8 = 0x5E;
pub const PREFIX_ELEMENT_Z: u8 = 0x77;

// Text records come in pairs: the even tag is the plain form, the odd tag
// also closes the enclosing element.
pub const ZERO_TEXT: u8 = 0x80;
pub const ONE_TEXT: u8 = 0x82;
pub const FALSE_TEXT: u8 = 0x84;
pub const TRUE_TEXT: u8 = 0x86;
pub const INT8_TEXT: u8 = 0x88;
pub const INT16_TEXT: u8 = 0x8A;
pub const INT32_TEXT: u8 = 0x8C;
pub const INT64_TEXT: u8 = 0x8E;
pub const FLOAT_TEXT: u8 = 0x90;
pub const DOUBLE_TEXT: u8 = 0x92;
pub const CHARS8_TEXT: u8 = 0x98;
pub const CHARS16_TEXT: u8 = 0x9A;
pub const CHARS32_TEXT: u8 = 0x9C;
pub const BYTES8_TEXT: u8 = 0x9E;
pub const BYTES16_TEXT: u8 = 0xA0;
pub const BYTES32_TEXT: u8 = 0xA2;
pub const EMPTY_TEXT: u8 = 0xA8;
pub const DICTIONARY_TEXT: u8 = 0xAA;
pub const UNIQUE_ID_TEXT: u8 = 0xAC;
pub const UUID_TEXT: u8 = 0xB0;
pub const UINT64_TEXT: u8 = 0xB2;
pub const BOOL_TEXT: u8 = 0xB4;

/// How a record encodes its name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NameSource {
    /// Length-prefixed UTF-8 string in the stream.
    Literal,
    /// Varint index into the string-table space.
    Dictionary,
}

/// How a record carries its namespace prefix.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PrefixSource {
    /// No prefix field.
    None,
    /// Length-prefixed UTF-8 string in the stream.
    Literal,
    /// Single lowercase ASCII letter baked into the tag byte.
    Fixed(u8),
}

/// Field layout for one element tag.
#[derive(Debug, Clone, Copy)]
pub struct ElementForm {
    pub name: NameSource,
    pub prefix: PrefixSource,
}

/// Field layout for one attribute tag.
#[derive(Debug, Clone, Copy)]
pub enum AttributeForm {
    /// A named attribute followed by one text record as its value.
    Named {
        name: NameSource,
        prefix: PrefixSource,
    },
    /// An `xmlns` / `xmlns:prefix` declaration; the namespace URI is the name.
    Xmlns { has_prefix: bool, name: NameSource },
}

/// Look up the element form for a tag byte.
pub fn element_form(tag: u8) -> Option<ElementForm> {
    let form = match tag {
        SHORT_ELEMENT => ElementForm {
            name: NameSource::Literal,
            prefix: PrefixSource::None,
        },
        ELEMENT => ElementForm {
            name: NameSource::Literal,
            prefix: PrefixSource::Literal,
        },
        SHORT_DICTIONARY_ELEMENT => ElementForm {
            name: NameSource::Dictionary,
            prefix: PrefixSource::None,
        },
        DICTIONARY_ELEMENT => ElementForm {
            name: NameSource::Dictionary,
            prefix: PrefixSource::Literal,
        },
        PREFIX_DICTIONARY_ELEMENT_A..=PREFIX_DICTIONARY_ELEMENT_Z => ElementForm {
            name: NameSource::Dictionary,
            prefix: PrefixSource::Fixed(b'a' + (tag - PREFIX_DICTIONARY_ELEMENT_A)),
        },
        PREFIX_ELEMENT_A..=PREFIX_ELEMENT_Z => ElementForm {
            name: NameSource::Literal,
            prefix: PrefixSource::Fixed(b'a' + (tag - PREFIX_ELEMENT_A)),
        },
        _ => return None,
    };
    Some(form)
}

/// Look up the attribute form for a tag byte.
pub fn attribute_form(tag: u8) -> Option<AttributeForm> {
    let form = match tag {
        SHORT_ATTRIBUTE => AttributeForm::Named {
            name: NameSource::Literal,
            prefix: PrefixSource::None,
        },
        ATTRIBUTE => AttributeForm::Named {
            name: NameSource::Literal,
            prefix: PrefixSource::Literal,
        },
        SHORT_DICTIONARY_ATTRIBUTE => AttributeForm::Named {
            name: NameSource::Dictionary,
            prefix: PrefixSource::None,
        },
        DICTIONARY_ATTRIBUTE => AttributeForm::Named {
            name: NameSource::Dictionary,
            prefix: PrefixSource::Literal,
        },
        SHORT_XMLNS_ATTRIBUTE => AttributeForm::Xmlns {
            has_prefix: false,
            name: NameSource::Literal,
        },
        XMLNS_ATTRIBUTE => AttributeForm::Xmlns {
            has_prefix: true,
            name: NameSource::Literal,
        },
        SHORT_DICTIONARY_XMLNS_ATTRIBUTE => AttributeForm::Xmlns {
            has_prefix: false,
            name: NameSource::Dictionary,
        },
        DICTIONARY_XMLNS_ATTRIBUTE => AttributeForm::Xmlns {
            has_prefix: true,
            name: NameSource::Dictionary,
        },
        PREFIX_DICTIONARY_ATTRIBUTE_A..=PREFIX_DICTIONARY_ATTRIBUTE_Z => AttributeForm::Named {
            name: NameSource::Dictionary,
            prefix: PrefixSource::Fixed(b'a' + (tag - PREFIX_DICTIONARY_ATTRIBUTE_A)),
        },
        PREFIX_ATTRIBUTE_A..=PREFIX_ATTRIBUTE_Z => AttributeForm::Named {
            name: NameSource::Literal,
            prefix: PrefixSource::Fixed(b'a' + (tag - PREFIX_ATTRIBUTE_A)),
        },
        _ => return None,
    };
    Some(form)
}

/// Check if a tag byte is in the attribute range.
#[inline]
pub fn is_attribute(tag: u8) -> bool {
    (SHORT_ATTRIBUTE..=PREFIX_ATTRIBUTE_Z).contains(&tag)
}

/// Check if a tag byte is in the element range.
#[inline]
pub fn is_element(tag: u8) -> bool {
    (SHORT_ELEMENT..=PREFIX_ELEMENT_Z).contains(&tag)
}

/// Letter index for prefixes that have dedicated tag ranges.
///
/// Returns `Some(0..=25)` when the prefix is exactly one lowercase ASCII
/// letter, the case the protocol optimizes with the A-Z ranges.
pub fn prefix_letter_index(prefix: &str) -> Option<u8> {
    match prefix.as_bytes() {
        [c @ b'a'..=b'z'] => Some(c - b'a'),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_element_forms() {
        let form = element_form(SHORT_ELEMENT).unwrap();
        assert_eq!(form.name, NameSource::Literal);
        assert_eq!(form.prefix, PrefixSource::None);

        let form = element_form(DICTIONARY_ELEMENT).unwrap();
        assert_eq!(form.name, NameSource::Dictionary);
        assert_eq!(form.prefix, PrefixSource::Literal);
    }

    #[test]
    fn test_letter_range_bounds() {
        assert_eq!(
            element_form(PREFIX_DICTIONARY_ELEMENT_A).unwrap().prefix,
            PrefixSource::Fixed(b'a')
        );
        assert_eq!(
            element_form(PREFIX_DICTIONARY_ELEMENT_Z).unwrap().prefix,
            PrefixSource::Fixed(b'z')
        );
        assert_eq!(
            element_form(PREFIX_ELEMENT_A).unwrap().prefix,
            PrefixSource::Fixed(b'a')
        );
        assert_eq!(
            element_form(PREFIX_ELEMENT_Z).unwrap().prefix,
            PrefixSource::Fixed(b'z')
        );
        assert_eq!(
            attribute_form(PREFIX_ATTRIBUTE_Z)
                .map(|f| matches!(f, AttributeForm::Named { prefix: PrefixSource::Fixed(b'z'), .. })),
            Some(true)
        );
    }

    #[test]
    fn test_unregistered_tags() {
        assert!(element_form(0x03).is_none());
        assert!(element_form(0x78).is_none());
        assert!(attribute_form(0x40).is_none());
        assert!(attribute_form(0x03).is_none());
    }

    #[test]
    fn test_range_predicates() {
        assert!(is_attribute(SHORT_ATTRIBUTE));
        assert!(is_attribute(PREFIX_ATTRIBUTE_Z));
        assert!(!is_attribute(SHORT_ELEMENT));
        assert!(is_element(PREFIX_ELEMENT_Z));
        assert!(!is_element(0x78));
    }

    #[test]
    fn test_prefix_letter_index() {
        assert_eq!(prefix_letter_index("a"), Some(0));
        assert_eq!(prefix_letter_index("s"), Some(18));
        assert_eq!(prefix_letter_index("z"), Some(25));
        assert_eq!(prefix_letter_index("A"), None);
        assert_eq!(prefix_letter_index("ab"), None);
        assert_eq!(prefix_letter_index(""), None);
    }
}
