//! Serialization engine: XML text to and from a [`Document`].
//!
//! ```text
//! bytes ──read_tree──▶ XmlNode ──detect_version──▶ Legacy | Compact ──read──▶ Document
//! Document ──Legacy | Compact::write──▶ XmlSink (in memory) ──finish──▶ bytes
//! ```
//!
//! Parsing always builds a fresh document and returns it only when the whole
//! input was understood; serialization buffers the complete output before
//! returning it. Neither ever leaves partial state behind.

mod compact;
mod legacy;
mod options;
mod payload;
mod sink;
mod tree;

pub use options::FormatOptions;

use tracing::debug;

use self::compact::Compact;
use self::legacy::Legacy;
use self::sink::XmlSink;
use self::tree::{XmlNode, read_tree};
use crate::base::ElementId;
use crate::error::Result;
use crate::model::{Document, RootTag, SchemaVersion};
use crate::value::{Multiplicity, ParamType};

/// One of the two textual grammars.
pub(crate) trait SchemaFormat {
    /// Human-readable name for logs.
    fn name(&self) -> &'static str;

    fn version(&self) -> SchemaVersion;

    /// Populate an empty document from the root element.
    fn read(&self, root: &XmlNode, doc: &mut Document) -> Result<()>;

    /// Write the complete document, root element included.
    fn write(&self, doc: &Document, sink: &mut XmlSink, options: &FormatOptions) -> Result<()>;
}

fn grammar(version: SchemaVersion) -> &'static dyn SchemaFormat {
    match version {
        SchemaVersion::Legacy => &Legacy,
        SchemaVersion::Compact => &Compact,
    }
}

/// Parse a complete document.
pub fn parse(input: &[u8]) -> Result<Document> {
    let root = read_tree(input)?;
    let version = detect_root_version(&root)?;
    let format = grammar(version);

    let mut doc = Document::new();
    doc.version = version;
    doc.tag = RootTag::parse(&root.name)
        .ok_or_else(|| root.error(format!("unknown root element <{}>", root.name)))?;
    format.read(&root, &mut doc)?;

    debug!(
        format = format.name(),
        version = %format.version(),
        plugins = doc.plugin_count(),
        "parsed document"
    );
    Ok(doc)
}

/// Serialize `doc` using the grammar of `version`, regardless of the version
/// it was read from.
pub fn serialize(
    doc: &Document,
    version: SchemaVersion,
    options: &FormatOptions,
) -> Result<Vec<u8>> {
    let format = grammar(version);
    let mut sink = XmlSink::new(options.indent);
    sink.declaration()?;
    format.write(doc, &mut sink, options)?;
    let output = sink.finish();

    debug!(
        format = format.name(),
        version = %format.version(),
        plugins = doc.plugin_count(),
        bytes = output.len(),
        "serialized document"
    );
    Ok(output)
}

/// Determine which grammar `input` is written in without building a document.
pub fn detect_version(input: &[u8]) -> Result<SchemaVersion> {
    detect_root_version(&read_tree(input)?)
}

const ASSET_TAG: &str = "Asset";
const PLUGIN_TAG: &str = "plugin";

fn detect_root_version(root: &XmlNode) -> Result<SchemaVersion> {
    let legacy_marker = root.has_child(ASSET_TAG);
    let compact_marker = root.has_child(PLUGIN_TAG);

    let version = match root.non_empty_attr("version") {
        Some(raw) => {
            let number = raw
                .trim()
                .parse::<u32>()
                .map_err(|_| root.error(format!("invalid document version '{raw}'")))?;
            SchemaVersion::from_number(number).map_err(|e| root.locate(e))?
        }
        None if legacy_marker => SchemaVersion::Legacy,
        None if compact_marker => SchemaVersion::Compact,
        None => SchemaVersion::Legacy,
    };

    let foreign = match version {
        SchemaVersion::Legacy => compact_marker.then_some(PLUGIN_TAG),
        SchemaVersion::Compact => legacy_marker.then_some(ASSET_TAG),
    };
    if let Some(marker) = foreign {
        return Err(root.error(format!(
            "version {version} document contains a top-level <{marker}>"
        )));
    }
    Ok(version)
}

// ============================================================================
// SHARED READ HELPERS
// ============================================================================

/// Attributes of one parameter element, as decoded by a grammar.
pub(crate) struct ParsedParam<'a> {
    pub name: &'a str,
    pub param_type: ParamType,
    pub multiplicity: Multiplicity,
    pub custom: bool,
    pub file_path: bool,
}

/// Add a decoded parameter and its value to `plugin`.
pub(crate) fn insert_parameter(
    doc: &mut Document,
    plugin: ElementId,
    node: &XmlNode,
    parsed: ParsedParam<'_>,
) -> Result<()> {
    let value = payload::read_value(node, parsed.param_type, parsed.multiplicity)?;
    let id = doc
        .add_parameter(plugin, parsed.name, parsed.param_type, parsed.custom)
        .map_err(|e| node.locate(e))?;
    if let Some(param) = doc.parameter_mut(id) {
        param.file_path = parsed.file_path;
    }
    if let Some(value) = value {
        doc.put_value(id, value).map_err(|e| node.locate(e))?;
    }
    Ok(())
}

/// Parse a declared type, accepting legacy aliases.
pub(crate) fn parse_type(node: &XmlNode, raw: &str) -> Result<ParamType> {
    let param_type = ParamType::parse(raw)
        .ok_or_else(|| node.error(format!("unknown parameter type '{raw}'")))?;
    if ParamType::is_legacy_alias(raw) {
        tracing::trace!(alias = raw, canonical = %param_type, "normalized legacy type");
    }
    Ok(param_type)
}

/// Decode `<preview>`.
pub(crate) fn read_preview(node: &XmlNode) -> Option<String> {
    let preview = node.text.trim();
    (!preview.is_empty()).then(|| preview.to_string())
}

pub(crate) fn skip(node: &XmlNode, parent: &str) {
    tracing::trace!(element = %node.name, parent, "ignored unknown element");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::VrmatError;

    #[test]
    fn test_detect_version() {
        assert_eq!(detect_version(b"<vismat/>").unwrap(), SchemaVersion::Legacy);
        assert_eq!(
            detect_version(br#"<vrmat version="1"/>"#).unwrap(),
            SchemaVersion::Compact
        );
        assert_eq!(
            detect_version(b"<vrmat><plugin name='a' type='b'/></vrmat>").unwrap(),
            SchemaVersion::Compact
        );
        assert_eq!(
            detect_version(b"<vrmat><Asset url='a'/></vrmat>").unwrap(),
            SchemaVersion::Legacy
        );
    }

    #[test]
    fn test_detect_rejects_mixed_markers() {
        assert!(detect_version(br#"<vrmat version="1"><Asset url="a"/></vrmat>"#).is_err());
        assert!(detect_version(br#"<vrmat version="0"><plugin name="a"/></vrmat>"#).is_err());
        assert!(detect_version(b"<vrmat><Asset url='a'/><plugin name='b'/></vrmat>").is_err());
        assert!(detect_version(br#"<vrmat version="7"/>"#).is_err());
        assert!(detect_version(br#"<vrmat version="x"/>"#).is_err());
    }

    #[test]
    fn test_unknown_root_tag() {
        assert!(matches!(
            parse(b"<material/>"),
            Err(VrmatError::Parse { .. })
        ));
    }

    #[test]
    fn test_empty_document_roundtrip() {
        let doc = parse(b"<vrmat/>").unwrap();
        assert_eq!(doc.version(), SchemaVersion::Legacy);
        assert!(doc.is_empty());
        let text = serialize(&doc, SchemaVersion::Compact, &FormatOptions::default()).unwrap();
        let back = parse(&text).unwrap();
        assert_eq!(back.version(), SchemaVersion::Compact);
    }
}
