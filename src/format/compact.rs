//! Version 1 grammar.
//!
//! ```text
//! <vrmat version="1" category=CATEGORY>
//!   <preview>…</preview>
//!   <plugin name=NAME type=TYPE class=CLASS version=N>
//!     <param name=P type=T list=0|1 custom=0|1 filePath=0|1>
//!       <value>…</value>
//! ```

use quick_xml::events::BytesStart;

use super::payload::{check_plugin_text, flag, parse_flag, write_param};
use super::sink::{XmlSink, check_xml_chars};
use super::tree::XmlNode;
use super::{
    FormatOptions, PLUGIN_TAG, ParsedParam, SchemaFormat, insert_parameter, parse_type,
    read_preview, skip,
};
use crate::base::ElementId;
use crate::error::Result;
use crate::model::{Document, Plugin, SchemaVersion};
use crate::value::Multiplicity;

const PREVIEW_TAG: &str = "preview";
const PARAM_TAG: &str = "param";

pub(crate) struct Compact;

impl SchemaFormat for Compact {
    fn name(&self) -> &'static str {
        "compact"
    }

    fn version(&self) -> SchemaVersion {
        SchemaVersion::Compact
    }

    fn read(&self, root: &XmlNode, doc: &mut Document) -> Result<()> {
        doc.category = root.attr("category").map(str::to_string);
        for child in &root.children {
            match child.name.as_str() {
                PREVIEW_TAG => doc.preview = read_preview(child),
                PLUGIN_TAG => read_plugin(child, doc)?,
                _ => skip(child, &root.name),
            }
        }
        Ok(())
    }

    fn write(&self, doc: &Document, sink: &mut XmlSink, options: &FormatOptions) -> Result<()> {
        let tag = doc.tag().modern().as_str();
        let mut root = BytesStart::new(tag);
        root.push_attribute(("version", "1"));
        if let Some(category) = doc.category() {
            check_xml_chars("category", category)?;
            root.push_attribute(("category", category));
        }
        sink.open(root)?;
        if let Some(preview) = doc.preview() {
            sink.text_element(PREVIEW_TAG, preview)?;
        }
        for plugin in doc.plugins() {
            write_plugin(plugin, sink, options)?;
        }
        sink.close(tag)
    }
}

// ── Read ────────────────────────────────────────────────────────────

fn read_plugin(node: &XmlNode, doc: &mut Document) -> Result<()> {
    let name = node.required_attr("name")?;
    let plugin_type = node.attr("type").unwrap_or_default();
    let class = node.attr("class").unwrap_or_default();
    let version = node.int_attr("version")?;

    let id = doc
        .add_plugin(name, plugin_type, class)
        .map_err(|e| node.locate(e))?;
    if let Some(plugin) = doc.plugin_mut(id) {
        plugin.version = version;
    }

    for child in &node.children {
        match child.name.as_str() {
            PARAM_TAG => read_param(child, doc, id)?,
            _ => skip(child, PLUGIN_TAG),
        }
    }
    Ok(())
}

fn read_param(node: &XmlNode, doc: &mut Document, plugin: ElementId) -> Result<()> {
    let multiplicity = if parse_flag(node, "list")? {
        Multiplicity::List
    } else {
        Multiplicity::Single
    };
    insert_parameter(
        doc,
        plugin,
        node,
        ParsedParam {
            name: node.required_attr("name")?,
            param_type: parse_type(node, node.required_attr("type")?)?,
            multiplicity,
            custom: parse_flag(node, "custom")?,
            file_path: parse_flag(node, "filePath")?,
        },
    )
}

// ── Write ───────────────────────────────────────────────────────────

fn write_plugin(plugin: &Plugin, sink: &mut XmlSink, options: &FormatOptions) -> Result<()> {
    check_plugin_text(plugin)?;

    let mut start = BytesStart::new(PLUGIN_TAG);
    start.push_attribute(("name", plugin.name()));
    start.push_attribute(("type", plugin.plugin_type()));
    start.push_attribute(("class", plugin.class()));
    if let Some(version) = plugin.version().or(options.plugin_version_fallback) {
        start.push_attribute(("version", version.to_string().as_str()));
    }
    if plugin.parameter_count() == 0 {
        return sink.empty(start);
    }
    sink.open(start)?;

    for param in plugin.parameters() {
        let mut start = BytesStart::new(PARAM_TAG);
        start.push_attribute(("name", param.name()));
        start.push_attribute(("type", param.param_type().as_str()));
        if param.value().is_some_and(|v| v.descriptor().is_list()) {
            start.push_attribute(("list", "1"));
        }
        start.push_attribute(("custom", flag(param.is_custom())));
        start.push_attribute(("filePath", flag(param.is_file_path())));
        write_param(sink, PARAM_TAG, start, param, options)?;
    }
    sink.close(PLUGIN_TAG)
}
