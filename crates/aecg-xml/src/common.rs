//! Shared wire constants and the XML writer wrapper.

use quick_xml::Writer;
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};

use crate::error::{CodecError, Result};

/// HL7 v3 namespace (default namespace of the document).
pub const HL7_NS: &str = "urn:hl7-org:v3";

/// XML Schema instance namespace, for `xsi:type`.
pub const XSI_NS: &str = "http://www.w3.org/2001/XMLSchema-instance";

pub const ROOT_ELEMENT: &str = "AnnotatedECG";

/// Options for [`crate::encode_with`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EncodeOptions {
    /// Spaces per nesting level; zero writes everything on one line.
    pub indent: usize,
}

impl Default for EncodeOptions {
    fn default() -> Self {
        Self { indent: 2 }
    }
}

/// Shortest decimal that parses back to the same `f64`, never in
/// scientific notation.
pub fn format_decimal(value: f64) -> String {
    value.to_string()
}

/// Sample codes separated by single spaces.
pub fn format_digits(digits: &[i32]) -> String {
    let mut out = String::with_capacity(digits.len() * 4);
    for (index, digit) in digits.iter().enumerate() {
        if index > 0 {
            out.push(' ');
        }
        out.push_str(&digit.to_string());
    }
    out
}

/// In-memory XML writer mapping write failures to [`CodecError::Write`].
pub(crate) struct XmlSink {
    writer: Writer<Vec<u8>>,
}

impl XmlSink {
    pub(crate) fn new(options: &EncodeOptions) -> Self {
        let writer = if options.indent == 0 {
            Writer::new(Vec::new())
        } else {
            Writer::new_with_indent(Vec::new(), b' ', options.indent)
        };
        Self { writer }
    }

    fn write(&mut self, event: Event<'_>) -> Result<()> {
        self.writer.write_event(event).map_err(CodecError::write)
    }

    pub(crate) fn declaration(&mut self) -> Result<()> {
        self.write(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))
    }

    pub(crate) fn open(&mut self, element: BytesStart<'_>) -> Result<()> {
        self.write(Event::Start(element))
    }

    pub(crate) fn open_tag(&mut self, name: &str) -> Result<()> {
        self.open(BytesStart::new(name))
    }

    pub(crate) fn close(&mut self, name: &str) -> Result<()> {
        self.write(Event::End(BytesEnd::new(name)))
    }

    pub(crate) fn empty(&mut self, element: BytesStart<'_>) -> Result<()> {
        self.write(Event::Empty(element))
    }

    pub(crate) fn text(&mut self, text: &str) -> Result<()> {
        self.write(Event::Text(BytesText::new(text)))
    }

    pub(crate) fn text_element(&mut self, name: &str, text: &str) -> Result<()> {
        self.open_tag(name)?;
        self.text(text)?;
        self.close(name)
    }

    pub(crate) fn finish(self) -> Vec<u8> {
        self.writer.into_inner()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decimals_are_shortest_and_never_exponential() {
        assert_eq!(format_decimal(0.002), "0.002");
        assert_eq!(format_decimal(5.0), "5");
        assert_eq!(format_decimal(-2.5), "-2.5");
        assert_eq!(format_decimal(1.0 / 3.0), "0.3333333333333333");
        assert_eq!(format_decimal(1e-7), "0.0000001");
        assert_eq!(format_decimal(1e21), "1000000000000000000000");
    }

    #[test]
    fn digits_have_single_spaces_and_no_trailing_separator() {
        assert_eq!(format_digits(&[1, -20, 300]), "1 -20 300");
        assert_eq!(format_digits(&[7]), "7");
        assert_eq!(format_digits(&[]), "");
    }
}
