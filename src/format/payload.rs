//! The `<value>` payload codec shared by both grammars.
//!
//! Numeric values are one `<value>` holding whitespace- or comma-separated
//! scalars. String values are one `<value>` per entry, so entries may hold
//! any text, separators included.

use quick_xml::events::BytesStart;

use super::options::FormatOptions;
use super::sink::{XmlSink, check_xml_chars};
use super::tree::XmlNode;
use crate::error::{Result, VrmatError};
use crate::model::{Parameter, Plugin};
use crate::value::{Multiplicity, ParamType, RawKind, Value, ValueView};

pub(crate) const VALUE_TAG: &str = "value";

/// Parse a boolean attribute; a missing attribute is `false`.
pub(crate) fn parse_flag(node: &XmlNode, key: &str) -> Result<bool> {
    match node.attr(key).map(str::trim) {
        None | Some("") => Ok(false),
        Some("1") => Ok(true),
        Some("0") => Ok(false),
        Some(v) if v.eq_ignore_ascii_case("true") => Ok(true),
        Some(v) if v.eq_ignore_ascii_case("false") => Ok(false),
        Some(v) => Err(node.error(format!("'{key}' must be a boolean, got '{v}'"))),
    }
}

pub(crate) fn flag(value: bool) -> &'static str {
    if value { "1" } else { "0" }
}

/// Build the value of a parameter element from its `<value>` children.
///
/// A non-list parameter without any `<value>` is unset (`None`); a list
/// parameter without one is an empty list.
pub(crate) fn read_value(
    node: &XmlNode,
    param_type: ParamType,
    multiplicity: Multiplicity,
) -> Result<Option<Value>> {
    let values: Vec<&XmlNode> = node.children_named(VALUE_TAG).collect();
    let is_list = multiplicity == Multiplicity::List;
    if values.is_empty() && !is_list {
        return Ok(None);
    }
    let descriptor = param_type.descriptor(multiplicity);

    let value = match descriptor.raw() {
        RawKind::String => {
            if !is_list && values.len() != 1 {
                return Err(node.error(format!(
                    "a single {param_type} value needs one <value>, found {}",
                    values.len()
                )));
            }
            let entries = values.iter().map(|v| v.text.clone()).collect();
            Value::from_strings(descriptor, entries)
        }
        RawKind::Float => {
            let data = scalars(&values)
                .map(|(token, at)| {
                    token
                        .parse::<f32>()
                        .map_err(|_| at.error(format!("'{token}' is not a number")))
                })
                .collect::<Result<Vec<_>>>()?;
            Value::from_floats(descriptor, data)
        }
        RawKind::Int => {
            let data = scalars(&values)
                .map(|(token, at)| parse_int(token, param_type, at))
                .collect::<Result<Vec<_>>>()?;
            Value::from_ints(descriptor, data)
        }
        RawKind::None => return Err(node.error("parameter has no storage type")),
    };

    value.map(Some).map_err(|e| match e {
        VrmatError::InvalidArgument(message) => node.error(message),
        other => other,
    })
}

fn scalars<'a>(values: &'a [&'a XmlNode]) -> impl Iterator<Item = (&'a str, &'a XmlNode)> + 'a {
    values.iter().flat_map(|node| {
        node.text
            .split(|c: char| c.is_whitespace() || c == ',')
            .filter(|token| !token.is_empty())
            .map(move |token| (token, *node))
    })
}

fn parse_int(token: &str, param_type: ParamType, at: &XmlNode) -> Result<i32> {
    if let Ok(n) = token.parse::<i32>() {
        return Ok(n);
    }
    if param_type == ParamType::Bool {
        if token.eq_ignore_ascii_case("true") {
            return Ok(1);
        }
        if token.eq_ignore_ascii_case("false") {
            return Ok(0);
        }
    }
    Err(at.error(format!("'{token}' is not an integer")))
}

/// Write a parameter element: `start` followed by its `<value>` children.
///
/// Fails without writing anything when the stored layout does not match the
/// declared type, e.g. after the type was changed through metadata.
pub(crate) fn write_param(
    sink: &mut XmlSink,
    tag: &str,
    start: BytesStart<'_>,
    param: &Parameter,
    options: &FormatOptions,
) -> Result<()> {
    check_xml_chars("parameter name", param.name())?;
    let Some(value) = param.value() else {
        return sink.empty(start);
    };
    check_layout(param.name(), param.param_type(), value)?;
    if value.list_len() == 0 {
        return sink.empty(start);
    }

    sink.open(start)?;
    match value.view() {
        ValueView::Floats { data, .. } => {
            let text = data
                .iter()
                .map(|x| options.format_float(*x))
                .collect::<Vec<_>>()
                .join(" ");
            sink.text_element(VALUE_TAG, &text)?;
        }
        ValueView::Ints { data, .. } => {
            let text = data
                .iter()
                .map(i32::to_string)
                .collect::<Vec<_>>()
                .join(" ");
            sink.text_element(VALUE_TAG, &text)?;
        }
        ValueView::Strings { entries, .. } => {
            for entry in entries {
                sink.text_element(VALUE_TAG, entry.value)?;
            }
        }
    }
    sink.close(tag)
}

/// Reject plugin attributes that XML cannot carry.
pub(crate) fn check_plugin_text(plugin: &Plugin) -> Result<()> {
    check_xml_chars("plugin name", plugin.name())?;
    check_xml_chars("plugin type", plugin.plugin_type())?;
    check_xml_chars("plugin class", plugin.class())
}

/// Verify a stored value can be written under `param_type`.
pub(crate) fn check_layout(param_name: &str, param_type: ParamType, value: &Value) -> Result<()> {
    let descriptor = value.descriptor();
    if param_type.accepts(&descriptor) {
        return Ok(());
    }
    Err(VrmatError::write(format!(
        "parameter '{param_name}' is declared {param_type} but stores {:?} x{}",
        descriptor.raw(),
        descriptor.components()
    )))
}
