//! Buffered XML output.

use std::io::Cursor;

use quick_xml::Writer;
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};

use crate::error::{Result, VrmatError};

/// In-memory XML writer; nothing reaches a file until [`XmlSink::finish`]
/// hands the complete buffer back.
pub(crate) struct XmlSink {
    writer: Writer<Cursor<Vec<u8>>>,
}

impl XmlSink {
    pub fn new(indent: usize) -> Self {
        let buffer = Cursor::new(Vec::new());
        let writer = if indent == 0 {
            Writer::new(buffer)
        } else {
            Writer::new_with_indent(buffer, b' ', indent)
        };
        Self { writer }
    }

    fn emit(&mut self, event: Event<'_>) -> Result<()> {
        self.writer
            .write_event(event)
            .map_err(|e| VrmatError::write(format!("XML output failed: {e}")))
    }

    pub fn declaration(&mut self) -> Result<()> {
        self.emit(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))
    }

    pub fn open(&mut self, start: BytesStart<'_>) -> Result<()> {
        self.emit(Event::Start(start))
    }

    pub fn close(&mut self, name: &str) -> Result<()> {
        self.emit(Event::End(BytesEnd::new(name)))
    }

    pub fn empty(&mut self, start: BytesStart<'_>) -> Result<()> {
        self.emit(Event::Empty(start))
    }

    /// `<name>text</name>`, with `text` escaped. Empty text is written as
    /// `<name/>` so indentation never ends up inside the element.
    pub fn text_element(&mut self, name: &str, text: &str) -> Result<()> {
        check_xml_chars(name, text)?;
        if text.is_empty() {
            return self.empty(BytesStart::new(name));
        }
        self.open(BytesStart::new(name))?;
        self.emit(Event::Text(BytesText::new(text)))?;
        self.close(name)
    }

    pub fn finish(self) -> Vec<u8> {
        let mut output = self.writer.into_inner().into_inner();
        output.push(b'\n');
        output
    }
}

/// XML 1.0 cannot carry most control characters, escaped or not.
pub(crate) fn check_xml_chars(what: &str, text: &str) -> Result<()> {
    match text
        .chars()
        .find(|&c| (c as u32) < 0x20 && !matches!(c, '\t' | '\n' | '\r'))
    {
        Some(c) => Err(VrmatError::write(format!(
            "{what} contains U+{:04X}, which XML cannot represent",
            c as u32
        ))),
        None => Ok(()),
    }
}
