//! A small read-only element tree built from the `quick-xml` event stream.
//!
//! Names are local names: namespace prefixes are dropped and namespace
//! declarations are not kept as attributes, so `xsi:type` is looked up as
//! `type`.

use std::borrow::Cow;

use quick_xml::Reader;
use quick_xml::escape::{resolve_predefined_entity, unescape};
use quick_xml::events::{BytesStart, Event};

use crate::error::{CodecError, Result};

#[derive(Debug, Clone, Default, PartialEq)]
pub(crate) struct Element {
    pub name: String,
    attributes: Vec<(String, String)>,
    pub children: Vec<Element>,
    text: String,
}

impl Element {
    pub fn child(&self, name: &str) -> Option<&Element> {
        self.children.iter().find(|child| child.name == name)
    }

    pub fn children_named<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a Element> {
        self.children.iter().filter(move |child| child.name == name)
    }

    pub fn require_child(&self, name: &str) -> Result<&Element> {
        self.child(name).ok_or_else(|| {
            CodecError::malformed(format!("<{}> is missing required <{name}>", self.name))
        })
    }

    /// Descend through a chain of first-match children.
    pub fn path(&self, names: &[&str]) -> Option<&Element> {
        names
            .iter()
            .try_fold(self, |element, name| element.child(name))
    }

    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    pub fn require_attr(&self, name: &str) -> Result<&str> {
        self.attr(name).ok_or_else(|| {
            CodecError::malformed(format!("<{}> is missing attribute '{name}'", self.name))
        })
    }

    /// Character content with surrounding whitespace removed.
    pub fn text(&self) -> &str {
        self.text.trim()
    }

    /// Character content exactly as written.
    pub fn raw_text(&self) -> &str {
        &self.text
    }
}

fn utf8<'a>(bytes: &'a [u8], what: &str) -> Result<&'a str> {
    std::str::from_utf8(bytes)
        .map_err(|err| CodecError::malformed(format!("{what} is not valid UTF-8: {err}")))
}

fn unescaped(raw: &str) -> Result<Cow<'_, str>> {
    unescape(raw).map_err(|err| CodecError::malformed(err.to_string()))
}

fn resolve_reference(name: &str) -> Result<String> {
    if let Some(number) = name.strip_prefix('#') {
        let code = match number.strip_prefix('x') {
            Some(hex) => u32::from_str_radix(hex, 16),
            None => number.parse::<u32>(),
        };
        return code
            .ok()
            .and_then(char::from_u32)
            .map(String::from)
            .ok_or_else(|| CodecError::malformed(format!("invalid character reference &{name};")));
    }
    resolve_predefined_entity(name)
        .map(str::to_string)
        .ok_or_else(|| CodecError::malformed(format!("unknown entity &{name};")))
}

fn open_element(start: &BytesStart<'_>) -> Result<Element> {
    let name = utf8(start.local_name().as_ref(), "element name")?.to_string();
    let mut attributes = Vec::new();
    for attribute in start.attributes() {
        let attribute = attribute.map_err(|err| CodecError::malformed(err.to_string()))?;
        if attribute.key.as_ref().starts_with(b"xmlns") {
            continue;
        }
        let key = utf8(attribute.key.local_name().as_ref(), "attribute name")?.to_string();
        let value = unescaped(utf8(&attribute.value, "attribute value")?)?.into_owned();
        attributes.push((key, value));
    }
    Ok(Element {
        name,
        attributes,
        children: Vec::new(),
        text: String::new(),
    })
}

fn attach(stack: &mut [Element], root: &mut Option<Element>, element: Element) -> Result<()> {
    match stack.last_mut() {
        Some(parent) => {
            parent.children.push(element);
            Ok(())
        }
        None if root.is_none() => {
            *root = Some(element);
            Ok(())
        }
        None => Err(CodecError::malformed("more than one root element")),
    }
}

/// Parse a complete document into its root element.
pub(crate) fn parse(bytes: &[u8]) -> Result<Element> {
    let source = utf8(bytes, "document")?;
    let mut reader = Reader::from_str(source);
    let mut stack: Vec<Element> = Vec::new();
    let mut root: Option<Element> = None;

    loop {
        let event = reader.read_event().map_err(|err| {
            CodecError::malformed(format!(
                "XML error at byte {}: {err}",
                reader.error_position()
            ))
        })?;
        match event {
            Event::Start(start) => stack.push(open_element(&start)?),
            Event::Empty(start) => {
                let element = open_element(&start)?;
                attach(&mut stack, &mut root, element)?;
            }
            Event::End(_) => {
                let element = stack
                    .pop()
                    .ok_or_else(|| CodecError::malformed("unbalanced closing tag"))?;
                attach(&mut stack, &mut root, element)?;
            }
            Event::Text(text) => {
                if let Some(current) = stack.last_mut() {
                    let raw = utf8(&text, "text")?;
                    current.text.push_str(&unescaped(raw)?);
                }
            }
            Event::CData(data) => {
                if let Some(current) = stack.last_mut() {
                    current.text.push_str(utf8(&data, "CDATA")?);
                }
            }
            Event::GeneralRef(reference) => {
                if let Some(current) = stack.last_mut() {
                    let name = utf8(&reference, "entity reference")?;
                    current.text.push_str(&resolve_reference(name)?);
                }
            }
            Event::Eof => break,
            // declarations, comments, processing instructions, doctype
            _ => {}
        }
    }

    if !stack.is_empty() {
        return Err(CodecError::malformed("document ended inside an element"));
    }
    root.ok_or_else(|| CodecError::malformed("document has no root element"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builds_tree_with_local_names() {
        let xml = br#"<?xml version="1.0"?>
<AnnotatedECG xmlns="urn:hl7-org:v3" xmlns:xsi="http://www.w3.org/2001/XMLSchema-instance">
  <id root="1.2.3"/>
  <value xsi:type="ST">hello &amp; goodbye</value>
</AnnotatedECG>"#;
        let root = parse(xml).unwrap();
        assert_eq!(root.name, "AnnotatedECG");
        assert_eq!(root.attr("xmlns"), None);
        assert_eq!(root.child("id").and_then(|id| id.attr("root")), Some("1.2.3"));
        let value = root.child("value").unwrap();
        assert_eq!(value.attr("type"), Some("ST"));
        assert_eq!(value.text(), "hello & goodbye");
    }

    #[test]
    fn raw_text_keeps_surrounding_whitespace() {
        let root = parse(b"<a>  two  spaces </a>").unwrap();
        assert_eq!(root.raw_text(), "  two  spaces ");
        assert_eq!(root.text(), "two  spaces");
    }

    #[test]
    fn character_references_resolve() {
        let root = parse(b"<a>&#65;&#x42;&lt;</a>").unwrap();
        assert_eq!(root.text(), "AB<");
    }

    #[test]
    fn rejects_broken_documents() {
        assert!(parse(b"").is_err());
        assert!(parse(b"<a><b></a>").is_err());
        assert!(parse(b"<a>").is_err());
        assert!(parse(b"<a/><b/>").is_err());
        assert!(parse(b"<a>&bogus;</a>").is_err());
    }

    #[test]
    fn path_follows_first_matches() {
        let root = parse(b"<a><b><c x='1'/></b></a>").unwrap();
        assert_eq!(root.path(&["b", "c"]).and_then(|c| c.attr("x")), Some("1"));
        assert!(root.path(&["b", "d"]).is_none());
    }
}
