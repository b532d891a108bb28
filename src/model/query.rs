//! Unique-name synthesis and cursors over plugins and parameters.
//!
//! Cursors borrow the [`Document`] immutably for as long as they live, so a
//! structural change while one is open does not compile:
//!
//! ```compile_fail
//! use vrmat::model::Document;
//!
//! let mut doc = Document::new();
//! doc.add_plugin("/A", "MtlSingleBRDF", "material").unwrap();
//! let mut cursor = doc.iterate_plugins();
//! doc.add_plugin("/B", "MtlSingleBRDF", "material").unwrap();
//! cursor.next();
//! ```

use super::document::{Document, Parameter, Plugin};
use crate::base::ElementId;
use crate::error::{Result, VrmatError};
use crate::value::ValueView;

impl Document {
    /// Return `suggested` if no plugin owns it, otherwise the first free
    /// `suggested_N` for N = 1, 2, ...
    ///
    /// Does not reserve the name; two calls against the same document state
    /// return the same candidate.
    pub fn unique_name(&self, suggested: &str) -> Result<String> {
        if suggested.is_empty() {
            return Err(VrmatError::invalid("suggested name must not be empty"));
        }
        if !self.contains_plugin_name(suggested) {
            return Ok(suggested.to_string());
        }
        // At most plugin_count() candidates can be taken.
        (1..=self.plugin_count() + 1)
            .map(|n| format!("{suggested}_{n}"))
            .find(|candidate| !self.contains_plugin_name(candidate))
            .ok_or_else(|| VrmatError::conflict("plugin", suggested))
    }

    /// Cursor over the ids of all plugins.
    pub fn iterate_plugins(&self) -> PluginCursor<'_> {
        PluginCursor {
            inner: Box::new(self.plugins()),
        }
    }

    /// Cursor over the parameters of one plugin, yielding each parameter
    /// together with its metadata and value.
    pub fn iterate_parameters(&self, plugin: ElementId) -> Result<ParamCursor<'_>> {
        let plugin = self
            .plugin(plugin)
            .ok_or_else(|| VrmatError::unknown_id(plugin))?;
        Ok(ParamCursor {
            plugin: plugin.id(),
            inner: Box::new(plugin.parameters()),
        })
    }
}

/// Read-only cursor over a document's plugins.
pub struct PluginCursor<'a> {
    inner: Box<dyn Iterator<Item = &'a Plugin> + 'a>,
}

impl Iterator for PluginCursor<'_> {
    type Item = ElementId;

    fn next(&mut self) -> Option<ElementId> {
        self.inner.next().map(Plugin::id)
    }
}

/// Read-only cursor over one plugin's parameters.
pub struct ParamCursor<'a> {
    plugin: ElementId,
    inner: Box<dyn Iterator<Item = &'a Parameter> + 'a>,
}

impl ParamCursor<'_> {
    /// The plugin this cursor walks.
    pub fn plugin(&self) -> ElementId {
        self.plugin
    }
}

impl<'a> Iterator for ParamCursor<'a> {
    type Item = ParamEntry<'a>;

    fn next(&mut self) -> Option<ParamEntry<'a>> {
        self.inner.next().map(|param| ParamEntry {
            plugin: self.plugin,
            param,
        })
    }
}

/// Current element of a [`ParamCursor`].
#[derive(Clone, Copy, Debug)]
pub struct ParamEntry<'a> {
    pub plugin: ElementId,
    pub param: &'a Parameter,
}

impl<'a> ParamEntry<'a> {
    pub fn id(&self) -> ElementId {
        self.param.id()
    }

    pub fn name(&self) -> &'a str {
        self.param.name()
    }

    /// The stored value, or `None` when the parameter is unset.
    pub fn value(&self) -> Option<ValueView<'a>> {
        self.param.value().map(|value| value.view())
    }
}
