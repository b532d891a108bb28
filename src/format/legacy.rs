//! Version 0 grammar.
//!
//! ```text
//! <vismat>
//!   <preview>…</preview>
//!   <Asset url=NAME type=CLASS>
//!     <plugin>
//!       <vrayplugin name=TYPE type=CLASS version=N>
//!         <parameter name=P label=P type=T|list listType=T isUserData=0|1 handler=…>
//!           <value>…</value>
//! ```
//!
//! The plugin class appears twice; the `vrayplugin` copy wins.

use quick_xml::events::BytesStart;
use tracing::{trace, warn};

use super::payload::{check_plugin_text, flag, parse_flag, write_param};
use super::sink::XmlSink;
use super::tree::XmlNode;
use super::{
    ASSET_TAG, FormatOptions, PLUGIN_TAG, ParsedParam, SchemaFormat, insert_parameter, parse_type,
    read_preview, skip,
};
use crate::base::ElementId;
use crate::error::Result;
use crate::model::{Document, Plugin, SchemaVersion};
use crate::value::Multiplicity;

const PREVIEW_TAG: &str = "preview";
const VRAYPLUGIN_TAG: &str = "vrayplugin";
const PARAMETER_TAG: &str = "parameter";
const LIST_TYPE: &str = "list";
const FILE_HANDLER: &str = "FileBrowserHandler";

pub(crate) struct Legacy;

impl SchemaFormat for Legacy {
    fn name(&self) -> &'static str {
        "legacy"
    }

    fn version(&self) -> SchemaVersion {
        SchemaVersion::Legacy
    }

    fn read(&self, root: &XmlNode, doc: &mut Document) -> Result<()> {
        for child in &root.children {
            match child.name.as_str() {
                PREVIEW_TAG => doc.preview = read_preview(child),
                ASSET_TAG => read_asset(child, doc)?,
                _ => skip(child, &root.name),
            }
        }
        Ok(())
    }

    fn write(&self, doc: &Document, sink: &mut XmlSink, options: &FormatOptions) -> Result<()> {
        let tag = doc.tag().as_str();
        sink.open(BytesStart::new(tag))?;
        if let Some(preview) = doc.preview() {
            sink.text_element(PREVIEW_TAG, preview)?;
        }
        for plugin in doc.plugins() {
            write_asset(plugin, sink, options)?;
        }
        sink.close(tag)
    }
}

// ── Read ────────────────────────────────────────────────────────────

fn read_asset(asset: &XmlNode, doc: &mut Document) -> Result<()> {
    let name = asset.required_attr("url")?;
    let vrayplugin = asset
        .child(PLUGIN_TAG)
        .and_then(|plugin| plugin.child(VRAYPLUGIN_TAG))
        .ok_or_else(|| asset.error(format!("asset '{name}' has no <plugin><vrayplugin>")))?;
    let plugin_type = vrayplugin.attr("name").unwrap_or_default();

    let class = match (vrayplugin.non_empty_attr("type"), asset.non_empty_attr("type")) {
        (Some(inner), Some(outer)) => {
            if inner != outer {
                warn!(plugin = name, asset = outer, vrayplugin = inner, "conflicting plugin class");
            }
            inner
        }
        (Some(class), None) | (None, Some(class)) => class,
        (None, None) => "",
    };
    let version = vrayplugin.int_attr("version")?;

    let id = doc
        .add_plugin(name, plugin_type, class)
        .map_err(|e| asset.locate(e))?;
    if let Some(plugin) = doc.plugin_mut(id) {
        plugin.version = version;
    }

    for child in &vrayplugin.children {
        match child.name.as_str() {
            PARAMETER_TAG => read_parameter(child, doc, id)?,
            _ => skip(child, VRAYPLUGIN_TAG),
        }
    }
    Ok(())
}

fn read_parameter(node: &XmlNode, doc: &mut Document, plugin: ElementId) -> Result<()> {
    let name = node
        .non_empty_attr("name")
        .or_else(|| node.non_empty_attr("label"))
        .ok_or_else(|| node.error("<parameter> has neither 'name' nor 'label'"))?;

    let declared = node.required_attr("type")?;
    let (param_type, multiplicity) = if declared == LIST_TYPE {
        (parse_type(node, node.required_attr("listType")?)?, Multiplicity::List)
    } else {
        (parse_type(node, declared)?, Multiplicity::Single)
    };

    let handler = node.attr("handler");
    if let Some(other) = handler.filter(|h| !h.is_empty() && *h != FILE_HANDLER) {
        trace!(parameter = name, handler = other, "ignored parameter handler");
    }

    insert_parameter(
        doc,
        plugin,
        node,
        ParsedParam {
            name,
            param_type,
            multiplicity,
            custom: parse_flag(node, "isUserData")?,
            file_path: handler == Some(FILE_HANDLER),
        },
    )
}

// ── Write ───────────────────────────────────────────────────────────

fn write_asset(plugin: &Plugin, sink: &mut XmlSink, options: &FormatOptions) -> Result<()> {
    check_plugin_text(plugin)?;

    let mut asset = BytesStart::new(ASSET_TAG);
    asset.push_attribute(("url", plugin.name()));
    asset.push_attribute(("type", plugin.class()));
    sink.open(asset)?;
    sink.open(BytesStart::new(PLUGIN_TAG))?;

    let mut vrayplugin = BytesStart::new(VRAYPLUGIN_TAG);
    vrayplugin.push_attribute(("name", plugin.plugin_type()));
    vrayplugin.push_attribute(("type", plugin.class()));
    if let Some(version) = plugin.version().or(options.plugin_version_fallback) {
        vrayplugin.push_attribute(("version", version.to_string().as_str()));
    }
    sink.open(vrayplugin)?;

    for param in plugin.parameters() {
        let param_type = param.param_type().as_str();
        let mut start = BytesStart::new(PARAMETER_TAG);
        start.push_attribute(("name", param.name()));
        start.push_attribute(("label", param.name()));
        match param.value() {
            Some(value) if value.descriptor().is_list() => {
                start.push_attribute(("type", LIST_TYPE));
                start.push_attribute(("listType", param_type));
            }
            _ => start.push_attribute(("type", param_type)),
        }
        start.push_attribute(("isUserData", flag(param.is_custom())));
        if param.is_file_path() {
            start.push_attribute(("handler", FILE_HANDLER));
        }
        write_param(sink, PARAMETER_TAG, start, param, options)?;
    }

    sink.close(VRAYPLUGIN_TAG)?;
    sink.close(PLUGIN_TAG)?;
    sink.close(ASSET_TAG)
}

#[cfg(test)]
mod tests {
    use crate::format::{FormatOptions, parse, serialize};
    use crate::model::{RootTag, SchemaVersion};
    use crate::value::ParamType;

    const SAMPLE: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<vismat>
  <preview>iVBORw==</preview>
  <Asset url="/Mtl" type="material" layer="3">
    <plugin>
      <vrayplugin name="MtlSingleBRDF" type="material" version="2">
        <parameter name="brdf" label="brdf" type="plugin" isUserData="0">
          <value>/Brdf</value>
        </parameter>
        <parameter label="opacity" type="float texture" isUserData="1">
          <value>0.25</value>
        </parameter>
        <parameter name="maps" type="list" listType="string" handler="FileBrowserHandler">
          <value>a.png</value>
          <value>b.png</value>
        </parameter>
        <ui/>
      </vrayplugin>
    </plugin>
  </Asset>
</vismat>"#;

    #[test]
    fn test_read_sample() {
        let doc = parse(SAMPLE.as_bytes()).unwrap();
        assert_eq!(doc.version(), SchemaVersion::Legacy);
        assert_eq!(doc.tag(), RootTag::Vismat);
        assert_eq!(doc.preview(), Some("iVBORw=="));

        let plugin = doc.plugin_by_name("/Mtl").unwrap();
        assert_eq!(plugin.plugin_type(), "MtlSingleBRDF");
        assert_eq!(plugin.class(), "material");
        assert_eq!(plugin.version(), Some(2));
        assert_eq!(plugin.parameter_count(), 3);

        let opacity = plugin.parameter_by_name("opacity").unwrap();
        assert_eq!(opacity.param_type(), ParamType::Float);
        assert!(opacity.is_custom());

        let maps = plugin.parameter_by_name("maps").unwrap();
        assert!(maps.is_file_path());
        assert_eq!(maps.value().unwrap().list_len(), 2);
    }

    #[test]
    fn test_class_falls_back_to_asset() {
        let xml = r#"<vismat><Asset url="/T" type="texture"><plugin><vrayplugin name="TexBitmap"/></plugin></Asset></vismat>"#;
        let doc = parse(xml.as_bytes()).unwrap();
        assert_eq!(doc.plugin_by_name("/T").unwrap().class(), "texture");
    }

    #[test]
    fn test_asset_without_vrayplugin() {
        let xml = r#"<vismat><Asset url="/T" type="texture"/></vismat>"#;
        assert!(parse(xml.as_bytes()).is_err());
    }

    #[test]
    fn test_write_normalizes_alias() {
        let doc = parse(SAMPLE.as_bytes()).unwrap();
        let out = serialize(&doc, SchemaVersion::Legacy, &FormatOptions::default()).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert!(text.contains(r#"type="float""#));
        assert!(!text.contains("float texture"));
        assert!(text.contains(r#"type="list" listType="string""#));
        assert!(text.contains(r#"handler="FileBrowserHandler""#));
        assert!(text.starts_with("<?xml"));
        assert!(text.contains("<vismat>"));
    }
}
