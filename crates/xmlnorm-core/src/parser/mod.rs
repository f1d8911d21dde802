//! XML parser adapter: text → [`Document`]
//!
//! Wraps `quick-xml`'s pull reader and builds the owned tree. Every failure
//! of the underlying reader is reported as [`Error::MalformedXml`] with the
//! line and column of the reader position.
//!
//! What ends up in the tree:
//! - elements with their attributes (values entity-expanded, never coerced)
//! - character data; CDATA is folded into the surrounding text
//!
//! Line endings are normalized before reading (`\r\n` and lone `\r` become
//! `\n`), and attribute values get the attribute-value normalization of
//! XML 1.0: a literal tab, newline or carriage return reads as a space while
//! the same character written as a reference is kept.
//!
//! The XML declaration, comments, processing instructions and the DOCTYPE
//! carry nothing the comparison needs and are dropped.

pub mod precheck;

use std::borrow::Cow;

use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;

use crate::tree::{Attribute, Document, Element, Node};
use crate::{Error, Result};

/// Deepest element nesting accepted. Every later stage walks the tree
/// recursively, so deeper documents are refused up front.
pub const MAX_DEPTH: usize = 1024;

/// Parse XML text into a document tree
///
/// # Guarantees
/// - `<e/>` and `<e></e>` produce identical trees
/// - adjacent text and CDATA pieces merge into one text node
/// - only the five predefined entities and numeric character references
///   are expanded; anything else is rejected
///
/// # Errors
/// `MalformedXml` for any well-formedness violation, including characters
/// outside the XML `Char` production and invalid names. `ResourceExhausted`
/// when nesting exceeds [`MAX_DEPTH`].
pub fn parse(xml: &str) -> Result<Document> {
    let normalized = normalize_line_endings(xml);
    let xml: &str = &normalized;

    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(false);

    let mut builder = TreeBuilder::new(xml);

    loop {
        let event = match reader.read_event() {
            Ok(event) => event,
            Err(e) => {
                return Err(Error::malformed_at(
                    e.to_string(),
                    xml,
                    reader.buffer_position() as usize,
                ))
            }
        };
        let offset = reader.buffer_position() as usize;

        match event {
            Event::Start(e) => {
                let element = builder.element_from(&e, offset)?;
                builder.open(element, offset)?;
            }
            Event::Empty(e) => {
                let element = builder.element_from(&e, offset)?;
                builder.check_depth(offset)?;
                builder.attach(element, offset)?;
            }
            Event::End(e) => {
                let name = decode_name(e.name().as_ref(), xml, offset)?;
                builder.close(&name, offset)?;
            }
            Event::Text(e) => {
                let text = e
                    .unescape()
                    .map_err(|err| Error::malformed_at(err.to_string(), xml, offset))?;
                check_chars(&text, xml, offset)?;
                builder.text(&text, offset)?;
            }
            Event::CData(e) => {
                let text = std::str::from_utf8(e.as_ref())
                    .map_err(|err| Error::malformed_at(err.to_string(), xml, offset))?;
                check_chars(text, xml, offset)?;
                builder.cdata(text, offset)?;
            }
            Event::Decl(_) | Event::PI(_) | Event::Comment(_) | Event::DocType(_) => {}
            Event::Eof => break,
        }
    }

    builder.finish()
}

/// Incremental tree construction from reader events
struct TreeBuilder<'a> {
    source: &'a str,
    stack: Vec<Element>,
    root: Option<Element>,
}

impl<'a> TreeBuilder<'a> {
    fn new(source: &'a str) -> Self {
        TreeBuilder {
            source,
            stack: Vec::new(),
            root: None,
        }
    }

    fn element_from(&self, start: &BytesStart<'_>, offset: usize) -> Result<Element> {
        let tag = decode_name(start.name().as_ref(), self.source, offset)?;
        let mut element = Element::new(tag);
        check_attribute_separation(start.attributes_raw(), self.source, offset)?;

        for attr in start.attributes() {
            let attr = attr.map_err(|e| Error::malformed_at(e.to_string(), self.source, offset))?;
            let name = decode_name(attr.key.as_ref(), self.source, offset)?;
            let value = attribute_value(&attr.value, self.source, offset)?;
            element.attributes.push(Attribute::new(name, value));
        }

        Ok(element)
    }

    fn check_depth(&self, offset: usize) -> Result<()> {
        if self.stack.len() >= MAX_DEPTH {
            let loc = crate::error::Location::from_offset(self.source, offset);
            return Err(Error::ResourceExhausted(format!(
                "element nesting exceeds {} levels at {}; reduce the document depth",
                MAX_DEPTH, loc
            )));
        }
        Ok(())
    }

    fn open(&mut self, element: Element, offset: usize) -> Result<()> {
        self.check_depth(offset)?;
        if self.stack.is_empty() && self.root.is_some() {
            return Err(self.multiple_roots(&element.tag, offset));
        }
        self.stack.push(element);
        Ok(())
    }

    fn close(&mut self, name: &str, offset: usize) -> Result<()> {
        let element = match self.stack.pop() {
            Some(el) => el,
            None => {
                return Err(Error::malformed_at(
                    format!("unexpected end tag </{}>", name),
                    self.source,
                    offset,
                ))
            }
        };
        if element.tag != name {
            return Err(Error::malformed_at(
                format!("expected </{}>, found </{}>", element.tag, name),
                self.source,
                offset,
            ));
        }
        self.attach(element, offset)
    }

    fn attach(&mut self, element: Element, offset: usize) -> Result<()> {
        match self.stack.last_mut() {
            Some(parent) => {
                parent.children.push(Node::Element(element));
                Ok(())
            }
            None if self.root.is_some() => Err(self.multiple_roots(&element.tag, offset)),
            None => {
                self.root = Some(element);
                Ok(())
            }
        }
    }

    fn text(&mut self, text: &str, offset: usize) -> Result<()> {
        match self.stack.last_mut() {
            Some(parent) => {
                push_text(parent, text);
                Ok(())
            }
            None if text.chars().all(|c| matches!(c, ' ' | '\t' | '\n' | '\r' | '\u{feff}')) => {
                Ok(())
            }
            None => Err(Error::malformed_at(
                "text outside the root element",
                self.source,
                offset,
            )),
        }
    }

    fn cdata(&mut self, text: &str, offset: usize) -> Result<()> {
        match self.stack.last_mut() {
            Some(parent) => {
                push_text(parent, text);
                Ok(())
            }
            None => Err(Error::malformed_at(
                "CDATA section outside the root element",
                self.source,
                offset,
            )),
        }
    }

    fn finish(mut self) -> Result<Document> {
        if let Some(open) = self.stack.pop() {
            return Err(Error::malformed_at(
                format!("unclosed tag <{}>", open.tag),
                self.source,
                self.source.len(),
            ));
        }
        match self.root {
            Some(root) => Ok(Document::new(root)),
            None => Err(Error::malformed("no root element")),
        }
    }

    fn multiple_roots(&self, tag: &str, offset: usize) -> Error {
        Error::malformed_at(
            format!("multiple root elements: <{}> follows the document root", tag),
            self.source,
            offset,
        )
    }
}

/// Append character data, merging with a preceding text node
fn push_text(parent: &mut Element, text: &str) {
    if text.is_empty() {
        return;
    }
    match parent.children.last_mut() {
        Some(Node::Text(existing)) => existing.push_str(text),
        _ => parent.children.push(Node::Text(text.to_string())),
    }
}

fn decode_name(raw: &[u8], source: &str, offset: usize) -> Result<String> {
    let name = std::str::from_utf8(raw)
        .map_err(|e| Error::malformed_at(format!("invalid name: {}", e), source, offset))?;
    if !is_name(name) {
        return Err(Error::malformed_at(
            format!("invalid name {:?}", name),
            source,
            offset,
        ));
    }
    Ok(name.to_string())
}

/// `\r\n` and lone `\r` become `\n`
fn normalize_line_endings(xml: &str) -> Cow<'_, str> {
    if !xml.contains('\r') {
        return Cow::Borrowed(xml);
    }
    let mut out = String::with_capacity(xml.len());
    let mut chars = xml.chars().peekable();
    while let Some(c) = chars.next() {
        if c == '\r' {
            if chars.peek() == Some(&'\n') {
                chars.next();
            }
            out.push('\n');
        } else {
            out.push(c);
        }
    }
    Cow::Owned(out)
}

/// Literal whitespace characters become spaces before references expand,
/// so `&#10;` survives as a newline while a raw line break does not.
fn attribute_value(raw: &[u8], source: &str, offset: usize) -> Result<String> {
    let raw = std::str::from_utf8(raw)
        .map_err(|e| Error::malformed_at(e.to_string(), source, offset))?;
    let spaced = raw.replace(['\t', '\n', '\r'], " ");
    let value = quick_xml::escape::unescape(&spaced)
        .map_err(|e| Error::malformed_at(e.to_string(), source, offset))?;
    check_chars(&value, source, offset)?;
    Ok(value.into_owned())
}

/// Every attribute after the first must be preceded by whitespace
fn check_attribute_separation(raw: &[u8], source: &str, offset: usize) -> Result<()> {
    let mut quote: Option<u8> = None;
    for (i, &b) in raw.iter().enumerate() {
        match quote {
            Some(q) if b == q => {
                quote = None;
                match raw.get(i + 1) {
                    None | Some(b' ' | b'\t' | b'\n' | b'\r' | b'/') => {}
                    Some(_) => {
                        return Err(Error::malformed_at(
                            "missing whitespace between attributes",
                            source,
                            offset,
                        ))
                    }
                }
            }
            Some(_) => {}
            None if b == b'"' || b == b'\'' => quote = Some(b),
            None => {}
        }
    }
    Ok(())
}

fn check_chars(text: &str, source: &str, offset: usize) -> Result<()> {
    match text.chars().find(|&c| !is_xml_char(c)) {
        Some(c) => Err(Error::malformed_at(
            format!("invalid character U+{:04X}", c as u32),
            source,
            offset,
        )),
        None => Ok(()),
    }
}

/// The XML 1.0 `Char` production
fn is_xml_char(c: char) -> bool {
    matches!(
        c,
        '\u{9}'
            | '\u{A}'
            | '\u{D}'
            | '\u{20}'..='\u{D7FF}'
            | '\u{E000}'..='\u{FFFD}'
            | '\u{10000}'..='\u{10FFFF}'
    )
}

fn is_name_start_char(c: char) -> bool {
    matches!(
        c,
        ':' | 'A'..='Z'
            | '_'
            | 'a'..='z'
            | '\u{C0}'..='\u{D6}'
            | '\u{D8}'..='\u{F6}'
            | '\u{F8}'..='\u{2FF}'
            | '\u{370}'..='\u{37D}'
            | '\u{37F}'..='\u{1FFF}'
            | '\u{200C}'..='\u{200D}'
            | '\u{2070}'..='\u{218F}'
            | '\u{2C00}'..='\u{2FEF}'
            | '\u{3001}'..='\u{D7FF}'
            | '\u{F900}'..='\u{FDCF}'
            | '\u{FDF0}'..='\u{FFFD}'
            | '\u{10000}'..='\u{EFFFF}'
    )
}

fn is_name_char(c: char) -> bool {
    is_name_start_char(c)
        || matches!(
            c,
            '-' | '.' | '0'..='9' | '\u{B7}' | '\u{300}'..='\u{36F}' | '\u{203F}'..='\u{2040}'
        )
}

fn is_name(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) => is_name_start_char(first) && chars.all(is_name_char),
        None => false,
    }
}
