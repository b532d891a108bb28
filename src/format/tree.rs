//! Minimal element tree over quick-xml events.
//!
//! The document family is small and both grammars need look-ahead (version
//! detection inspects the root's children before anything is built), so the
//! input is first read into a tree of [`XmlNode`]s. Only elements, attributes
//! and character data are kept.

use quick_xml::Reader;
use quick_xml::events::{BytesStart, Event};

use crate::error::{Result, VrmatError};

/// One XML element.
#[derive(Clone, Debug, Default)]
pub(crate) struct XmlNode {
    pub name: String,
    pub attrs: Vec<(String, String)>,
    pub children: Vec<XmlNode>,
    /// Concatenated character data directly inside this element.
    pub text: String,
    /// Byte offset of the start tag in the input.
    pub position: u64,
}

impl XmlNode {
    pub fn attr(&self, key: &str) -> Option<&str> {
        self.attrs
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Direct children named `name`.
    pub fn children_named<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a XmlNode> + 'a {
        self.children.iter().filter(move |child| child.name == name)
    }

    pub fn child(&self, name: &str) -> Option<&XmlNode> {
        self.children.iter().find(|child| child.name == name)
    }

    pub fn has_child(&self, name: &str) -> bool {
        self.child(name).is_some()
    }

    /// Parse error pointing at this element.
    pub fn error(&self, message: impl Into<String>) -> VrmatError {
        VrmatError::parse(self.position, message)
    }

    /// Attach this element's position to an error raised while building the
    /// document from it.
    pub fn locate(&self, err: VrmatError) -> VrmatError {
        match err {
            VrmatError::Parse { .. } => err,
            other => self.error(other.to_string()),
        }
    }

    /// A non-empty attribute, if present.
    pub fn non_empty_attr(&self, key: &str) -> Option<&str> {
        self.attr(key).filter(|value| !value.is_empty())
    }

    /// A required attribute that must also be non-empty.
    pub fn required_attr(&self, key: &str) -> Result<&str> {
        self.non_empty_attr(key)
            .ok_or_else(|| self.error(format!("<{}> is missing the '{key}' attribute", self.name)))
    }

    /// An optional integer attribute.
    pub fn int_attr(&self, key: &str) -> Result<Option<i32>> {
        match self.non_empty_attr(key) {
            None => Ok(None),
            Some(raw) => raw
                .trim()
                .parse()
                .map(Some)
                .map_err(|_| self.error(format!("'{key}' must be an integer, got '{raw}'"))),
        }
    }
}

const BOM: &[u8] = b"\xEF\xBB\xBF";

/// Read `input` into a tree and return its root element.
pub(crate) fn read_tree(input: &[u8]) -> Result<XmlNode> {
    let input = input.strip_prefix(BOM).unwrap_or(input);
    let mut reader = Reader::from_reader(input);
    reader.config_mut().trim_text(false);

    let mut buf = Vec::new();
    let mut stack: Vec<XmlNode> = Vec::new();
    let mut root: Option<XmlNode> = None;

    loop {
        let position = reader.buffer_position() as u64;
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(ref e)) => {
                let node = start_node(e, position)?;
                if stack.is_empty() && root.is_some() {
                    return Err(VrmatError::parse(position, "more than one root element"));
                }
                stack.push(node);
            }
            Ok(Event::Empty(ref e)) => {
                let node = start_node(e, position)?;
                attach(&mut stack, &mut root, node)?;
            }
            Ok(Event::End(_)) => {
                let node = stack
                    .pop()
                    .ok_or_else(|| VrmatError::parse(position, "unexpected closing tag"))?;
                attach(&mut stack, &mut root, node)?;
            }
            Ok(Event::Text(e)) => {
                let text = e
                    .unescape()
                    .map_err(|e| VrmatError::parse(position, format!("text error: {e}")))?;
                match stack.last_mut() {
                    Some(parent) => parent.text.push_str(&text),
                    None if text.trim().is_empty() => {}
                    None => {
                        return Err(VrmatError::parse(position, "text outside the root element"));
                    }
                }
            }
            Ok(Event::CData(e)) => {
                let text = std::str::from_utf8(&e)
                    .map_err(|e| VrmatError::parse(position, format!("CDATA is not UTF-8: {e}")))?;
                if let Some(parent) = stack.last_mut() {
                    parent.text.push_str(text);
                }
            }
            Ok(Event::Eof) => break,
            Err(e) => {
                return Err(VrmatError::parse(
                    reader.error_position() as u64,
                    format!("XML error: {e}"),
                ));
            }
            // Declarations, comments, processing instructions, doctype.
            _ => {}
        }
        buf.clear();
    }

    if let Some(open) = stack.last() {
        return Err(open.error(format!("<{}> is never closed", open.name)));
    }
    root.ok_or_else(|| VrmatError::parse(0, "document has no root element"))
}

fn start_node(e: &BytesStart<'_>, position: u64) -> Result<XmlNode> {
    let name = std::str::from_utf8(e.name().as_ref())
        .map_err(|e| VrmatError::parse(position, format!("invalid tag name: {e}")))?
        .to_string();

    let mut attrs = Vec::new();
    for attr in e.attributes() {
        let attr = attr.map_err(|e| VrmatError::parse(position, format!("attribute error: {e}")))?;
        let key = std::str::from_utf8(attr.key.as_ref())
            .map_err(|e| VrmatError::parse(position, format!("attribute key error: {e}")))?
            .to_string();
        let value = attr
            .unescape_value()
            .map_err(|e| VrmatError::parse(position, format!("attribute value error: {e}")))?
            .into_owned();
        attrs.push((key, value));
    }

    Ok(XmlNode {
        name,
        attrs,
        position,
        ..XmlNode::default()
    })
}

fn attach(stack: &mut [XmlNode], root: &mut Option<XmlNode>, node: XmlNode) -> Result<()> {
    match stack.last_mut() {
        Some(parent) => parent.children.push(node),
        None if root.is_none() => *root = Some(node),
        None => return Err(node.error("more than one root element")),
    }
    Ok(())
}
