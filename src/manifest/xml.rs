//! Span-aware XML element scanning
//!
//! quick-xml validates the document and locates matching elements; the
//! attributes of each match are then tokenized in place so that callers get
//! the byte range of every attribute value in the original text. Writers
//! splice a new value into that range and leave every other byte alone.

use quick_xml::escape::{escape, unescape};
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use std::ops::Range;

const BOM: char = '\u{feff}';

/// An attribute of a matched element
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct XmlAttribute {
    /// Qualified attribute name as written
    pub name: String,
    /// Unescaped value
    pub value: String,
    /// Byte range of the raw value (between the quotes) in the document
    pub value_range: Range<usize>,
}

/// An element whose local name matched the requested one
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct XmlElement {
    pub attributes: Vec<XmlAttribute>,
}

impl XmlElement {
    /// Returns the attribute with exactly this name
    pub fn attribute(&self, name: &str) -> Option<&XmlAttribute> {
        self.attributes.iter().find(|a| a.name == name)
    }

    /// Returns the value of an attribute if it is present and not blank
    pub fn non_empty_value(&self, name: &str) -> Option<&str> {
        self.attribute(name)
            .map(|a| a.value.as_str())
            .filter(|v| !v.trim().is_empty())
    }
}

/// Scans a whole document and returns every element with the given local name
///
/// The complete document is read so malformed structure anywhere is reported,
/// not only before the last match.
pub(crate) fn find_elements(content: &str, local_name: &str) -> Result<Vec<XmlElement>, String> {
    let offset = if content.starts_with(BOM) {
        BOM.len_utf8()
    } else {
        0
    };
    let body = &content[offset..];

    let mut reader = Reader::from_str(body);
    let mut elements = Vec::new();
    let mut depth: usize = 0;
    let mut seen_root = false;

    loop {
        let event = reader
            .read_event()
            .map_err(|e| format!("{} (at byte {})", e, reader.error_position()))?;

        match event {
            Event::Start(ref tag) | Event::Empty(ref tag) => {
                let is_empty = matches!(event, Event::Empty(_));
                if depth == 0 && seen_root {
                    return Err("multiple root elements".to_string());
                }
                if !is_empty {
                    depth += 1;
                }
                seen_root = true;

                for attr in tag.attributes() {
                    attr.map_err(|e| format!("invalid attribute: {}", e))?;
                }

                if tag.local_name().as_ref() == local_name.as_bytes() {
                    let end = reader.buffer_position() as usize;
                    let element = read_element(body, tag, end, is_empty)?;
                    elements.push(shift(element, offset));
                }
            }
            Event::End(_) => {
                depth = depth.saturating_sub(1);
            }
            Event::Eof => break,
            _ => {}
        }
    }

    if depth != 0 {
        return Err("unexpected end of document: unclosed element".to_string());
    }
    if !seen_root {
        return Err("document has no root element".to_string());
    }

    Ok(elements)
}

/// Replaces the value range of an attribute with an escaped new value
pub(crate) fn replace_value(content: &str, range: Range<usize>, new_value: &str) -> String {
    let escaped = escape(new_value);
    let mut out = String::with_capacity(content.len() + escaped.len());
    out.push_str(&content[..range.start]);
    out.push_str(&escaped);
    out.push_str(&content[range.end..]);
    out
}

fn shift(mut element: XmlElement, offset: usize) -> XmlElement {
    for attr in &mut element.attributes {
        attr.value_range = attr.value_range.start + offset..attr.value_range.end + offset;
    }
    element
}

/// Locates the tag text of `tag` ending at `end` and tokenizes its attributes
fn read_element(
    body: &str,
    tag: &BytesStart<'_>,
    end: usize,
    is_empty: bool,
) -> Result<XmlElement, String> {
    let raw: &[u8] = tag;
    // `<` + raw + `>` or `<` + raw + `/>`
    let closing = if is_empty { 2 } else { 1 };
    let start = end
        .checked_sub(raw.len() + closing + 1)
        .ok_or_else(|| "cannot locate element in document".to_string())?;
    let raw_start = start + 1;

    let located = body.as_bytes().get(start) == Some(&b'<')
        && body.as_bytes().get(raw_start..raw_start + raw.len()) == Some(raw);
    if !located {
        return Err("cannot locate element in document".to_string());
    }

    let attributes = tokenize_attributes(body, raw_start, raw_start + raw.len())?;
    Ok(XmlElement { attributes })
}

/// Tokenizes `name="value"` pairs in `body[start..end]` (the tag without `<`)
fn tokenize_attributes(body: &str, start: usize, end: usize) -> Result<Vec<XmlAttribute>, String> {
    let bytes = body.as_bytes();
    let mut pos = start;
    let mut attributes = Vec::new();

    // element name
    while pos < end && !bytes[pos].is_ascii_whitespace() {
        pos += 1;
    }

    loop {
        while pos < end && bytes[pos].is_ascii_whitespace() {
            pos += 1;
        }
        if pos >= end {
            break;
        }

        let name_start = pos;
        while pos < end && bytes[pos] != b'=' && !bytes[pos].is_ascii_whitespace() {
            pos += 1;
        }
        let name = &body[name_start..pos];

        while pos < end && bytes[pos].is_ascii_whitespace() {
            pos += 1;
        }
        if pos >= end || bytes[pos] != b'=' {
            return Err(format!("attribute '{}' has no value", name));
        }
        pos += 1;
        while pos < end && bytes[pos].is_ascii_whitespace() {
            pos += 1;
        }
        if pos >= end || (bytes[pos] != b'"' && bytes[pos] != b'\'') {
            return Err(format!("attribute '{}' value is not quoted", name));
        }
        let quote = bytes[pos];
        pos += 1;
        let value_start = pos;
        while pos < end && bytes[pos] != quote {
            pos += 1;
        }
        if pos >= end {
            return Err(format!("attribute '{}' value is not terminated", name));
        }
        let raw_value = &body[value_start..pos];
        pos += 1;

        let value = unescape(raw_value)
            .map_err(|e| format!("attribute '{}': {}", name, e))?
            .into_owned();

        attributes.push(XmlAttribute {
            name: name.to_string(),
            value,
            value_range: value_start..value_start + raw_value.len(),
        });
    }

    Ok(attributes)
}
