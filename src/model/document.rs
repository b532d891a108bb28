//! The document: a flat collection of plugins, each holding named parameters.
//!
//! ```text
//! Document
//! ├── root attributes (version, tag, category, preview, file path)
//! ├── plugins: IndexMap<ElementId, Plugin>
//! │   └── params: IndexMap<ElementId, Parameter>
//! ├── plugin_names: name -> plugin id
//! └── param_owners: parameter id -> plugin id
//! ```
//!
//! Plugins reference each other only through string values of `plugin`
//! typed parameters. Those references are resolved lazily by name, so
//! renaming or removing a plugin never touches other plugins, and a dangling
//! reference is a valid state.

use std::path::{Path, PathBuf};

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use indexmap::IndexMap;
use rustc_hash::FxHashMap;
use smol_str::SmolStr;

use super::root::{RootTag, SchemaVersion};
use crate::base::{ElementId, ElementKind, IdAllocator};
use crate::error::{Result, VrmatError};
use crate::value::{ParamType, TypeDescriptor, Value, ValueInput, ValueView};

// ============================================================================
// PARAMETER
// ============================================================================

/// A named, typed value slot of a plugin.
#[derive(Clone, Debug)]
pub struct Parameter {
    id: ElementId,
    plugin: ElementId,
    pub(crate) name: SmolStr,
    pub(crate) param_type: ParamType,
    pub(crate) custom: bool,
    pub(crate) file_path: bool,
    pub(crate) value: Option<Value>,
}

impl Parameter {
    pub fn id(&self) -> ElementId {
        self.id
    }

    /// Id of the owning plugin.
    pub fn plugin(&self) -> ElementId {
        self.plugin
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn param_type(&self) -> ParamType {
        self.param_type
    }

    /// Custom user data rather than a native plugin parameter.
    pub fn is_custom(&self) -> bool {
        self.custom
    }

    /// The value is meant to be a file path.
    pub fn is_file_path(&self) -> bool {
        self.file_path
    }

    pub fn value(&self) -> Option<&Value> {
        self.value.as_ref()
    }

    /// Plugin names referenced by this parameter, if it is `plugin` typed.
    pub fn references(&self) -> impl Iterator<Item = &str> {
        let entries = match (&self.value, self.param_type.is_reference()) {
            (Some(value), true) => value.view().strings(),
            _ => None,
        };
        entries.into_iter().flatten().map(|entry| entry.value)
    }
}

// ============================================================================
// PLUGIN
// ============================================================================

/// A uniquely named record with a type, a class and a set of parameters.
#[derive(Clone, Debug)]
pub struct Plugin {
    id: ElementId,
    pub(crate) name: SmolStr,
    pub(crate) plugin_type: SmolStr,
    pub(crate) class: SmolStr,
    pub(crate) version: Option<i32>,
    pub(crate) params: IndexMap<ElementId, Parameter>,
    param_names: FxHashMap<SmolStr, ElementId>,
}

impl Plugin {
    pub fn id(&self) -> ElementId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Plugin type, e.g. `MtlSingleBRDF`.
    pub fn plugin_type(&self) -> &str {
        &self.plugin_type
    }

    /// Plugin class or category, e.g. `material`.
    pub fn class(&self) -> &str {
        &self.class
    }

    /// Stored plugin version, used only for migration when saving.
    pub fn version(&self) -> Option<i32> {
        self.version
    }

    pub fn parameter_count(&self) -> usize {
        self.params.len()
    }

    /// Parameters in insertion order.
    pub fn parameters(&self) -> impl Iterator<Item = &Parameter> {
        self.params.values()
    }

    pub fn parameter(&self, id: ElementId) -> Option<&Parameter> {
        self.params.get(&id)
    }

    pub fn parameter_by_name(&self, name: &str) -> Option<&Parameter> {
        self.param_names.get(name).and_then(|id| self.params.get(id))
    }
}

// ============================================================================
// DOCUMENT
// ============================================================================

/// Root of a material description.
#[derive(Clone, Debug, Default)]
pub struct Document {
    pub(crate) version: SchemaVersion,
    pub(crate) category: Option<String>,
    pub(crate) preview: Option<String>,
    pub(crate) tag: RootTag,
    pub(crate) file_path: Option<PathBuf>,
    plugins: IndexMap<ElementId, Plugin>,
    plugin_names: FxHashMap<SmolStr, ElementId>,
    param_owners: FxHashMap<ElementId, ElementId>,
    ids: IdAllocator,
}

impl Document {
    /// Create an empty document.
    pub fn new() -> Self {
        Self::default()
    }

    // ── Root attributes ─────────────────────────────────────────────

    pub fn version(&self) -> SchemaVersion {
        self.version
    }

    pub fn set_version(&mut self, version: SchemaVersion) {
        self.version = version;
    }

    pub fn tag(&self) -> RootTag {
        self.tag
    }

    pub fn set_tag(&mut self, tag: RootTag) {
        self.tag = tag;
    }

    /// Stored category, whether or not the current version can carry it.
    pub fn category(&self) -> Option<&str> {
        self.category.as_deref()
    }

    pub fn set_category(&mut self, category: Option<String>) {
        self.category = category;
    }

    /// Base64 encoded preview image.
    pub fn preview(&self) -> Option<&str> {
        self.preview.as_deref()
    }

    pub fn set_preview(&mut self, preview: Option<String>) {
        self.preview = preview;
    }

    /// Decode the preview image.
    pub fn preview_image(&self) -> Result<Option<Vec<u8>>> {
        let Some(preview) = self.preview.as_deref() else {
            return Ok(None);
        };
        let compact: String = preview.split_ascii_whitespace().collect();
        STANDARD
            .decode(compact)
            .map(Some)
            .map_err(|e| VrmatError::invalid(format!("preview is not valid base64: {e}")))
    }

    /// Store raw image bytes as the base64 preview.
    pub fn set_preview_image(&mut self, bytes: &[u8]) {
        self.preview = Some(STANDARD.encode(bytes));
    }

    /// Path the document was opened from, if any.
    pub fn file_path(&self) -> Option<&Path> {
        self.file_path.as_deref()
    }

    pub fn set_file_path(&mut self, path: Option<PathBuf>) {
        self.file_path = path;
    }

    // ── Graph queries ───────────────────────────────────────────────

    pub fn plugin_count(&self) -> usize {
        self.plugins.len()
    }

    pub fn is_empty(&self) -> bool {
        self.plugins.is_empty()
    }

    /// Plugins in insertion order.
    pub fn plugins(&self) -> impl Iterator<Item = &Plugin> {
        self.plugins.values()
    }

    pub fn plugin(&self, id: ElementId) -> Option<&Plugin> {
        self.plugins.get(&id)
    }

    pub fn plugin_by_name(&self, name: &str) -> Option<&Plugin> {
        self.plugin_names.get(name).and_then(|id| self.plugins.get(id))
    }

    pub fn parameter(&self, id: ElementId) -> Option<&Parameter> {
        let owner = self.param_owners.get(&id)?;
        self.plugins.get(owner)?.params.get(&id)
    }

    pub(crate) fn plugin_mut(&mut self, id: ElementId) -> Option<&mut Plugin> {
        self.plugins.get_mut(&id)
    }

    pub(crate) fn parameter_mut(&mut self, id: ElementId) -> Option<&mut Parameter> {
        let owner = self.param_owners.get(&id)?;
        self.plugins.get_mut(owner)?.params.get_mut(&id)
    }

    /// Which collection `id` lives in, or `None` if it is unknown or removed.
    pub fn element_kind(&self, id: ElementId) -> Option<ElementKind> {
        if self.plugins.contains_key(&id) {
            Some(ElementKind::Plugin)
        } else if self.param_owners.contains_key(&id) {
            Some(ElementKind::Parameter)
        } else {
            None
        }
    }

    /// Look up a plugin by name (`plugin == None`) or a parameter by name
    /// within the given plugin.
    pub fn resolve_id(&self, plugin: Option<ElementId>, name: &str) -> Result<ElementId> {
        match plugin {
            None => self
                .plugin_names
                .get(name)
                .copied()
                .ok_or_else(|| VrmatError::unknown_name("plugin", name)),
            Some(plugin_id) => {
                let plugin = self
                    .plugins
                    .get(&plugin_id)
                    .ok_or_else(|| VrmatError::unknown_id(plugin_id))?;
                plugin
                    .param_names
                    .get(name)
                    .copied()
                    .ok_or_else(|| VrmatError::unknown_name("parameter", name))
            }
        }
    }

    /// Whether any plugin currently owns `name`.
    pub fn contains_plugin_name(&self, name: &str) -> bool {
        self.plugin_names.contains_key(name)
    }

    // ── Graph mutation ──────────────────────────────────────────────

    fn allocate_id(&mut self) -> Result<ElementId> {
        self.ids.allocate().ok_or(VrmatError::IdSpaceExhausted)
    }

    /// Add a plugin. The name must be non-empty and not used by another plugin.
    pub fn add_plugin(&mut self, name: &str, plugin_type: &str, class: &str) -> Result<ElementId> {
        if name.is_empty() {
            return Err(VrmatError::invalid("plugin name must not be empty"));
        }
        if self.plugin_names.contains_key(name) {
            return Err(VrmatError::conflict("plugin", name));
        }
        let id = self.allocate_id()?;
        let name = SmolStr::new(name);
        self.plugin_names.insert(name.clone(), id);
        self.plugins.insert(
            id,
            Plugin {
                id,
                name,
                plugin_type: SmolStr::new(plugin_type),
                class: SmolStr::new(class),
                version: None,
                params: IndexMap::new(),
                param_names: FxHashMap::default(),
            },
        );
        tracing::trace!(%id, "added plugin");
        Ok(id)
    }

    /// Add a parameter to a plugin. The name must be unique within that plugin.
    pub fn add_parameter(
        &mut self,
        plugin: ElementId,
        name: &str,
        param_type: ParamType,
        custom: bool,
    ) -> Result<ElementId> {
        if name.is_empty() {
            return Err(VrmatError::invalid("parameter name must not be empty"));
        }
        let owner = self
            .plugins
            .get(&plugin)
            .ok_or_else(|| VrmatError::unknown_id(plugin))?;
        if owner.param_names.contains_key(name) {
            return Err(VrmatError::conflict("parameter", name));
        }
        let id = self.allocate_id()?;
        let name = SmolStr::new(name);
        let Some(owner) = self.plugins.get_mut(&plugin) else {
            return Err(VrmatError::unknown_id(plugin));
        };
        owner.param_names.insert(name.clone(), id);
        owner.params.insert(
            id,
            Parameter {
                id,
                plugin,
                name,
                param_type,
                custom,
                file_path: false,
                value: None,
            },
        );
        self.param_owners.insert(id, plugin);
        Ok(id)
    }

    /// Remove a plugin together with its parameters, or a single parameter.
    ///
    /// References to a removed plugin held by other parameters are left as
    /// they are and simply stop resolving.
    pub fn remove_element(&mut self, id: ElementId) -> Result<ElementKind> {
        if let Some(plugin) = self.plugins.shift_remove(&id) {
            self.plugin_names.remove(&plugin.name);
            for param_id in plugin.params.keys() {
                self.param_owners.remove(param_id);
            }
            tracing::trace!(%id, params = plugin.params.len(), "removed plugin");
            return Ok(ElementKind::Plugin);
        }

        let owner_id = self
            .param_owners
            .remove(&id)
            .ok_or_else(|| VrmatError::unknown_id(id))?;
        if let Some(owner) = self.plugins.get_mut(&owner_id) {
            if let Some(param) = owner.params.shift_remove(&id) {
                owner.param_names.remove(&param.name);
            }
        }
        Ok(ElementKind::Parameter)
    }

    pub(crate) fn rename_plugin(&mut self, id: ElementId, new_name: &str) -> Result<()> {
        let plugin = self.plugins.get(&id).ok_or_else(|| VrmatError::unknown_id(id))?;
        if plugin.name == new_name {
            return Ok(());
        }
        self.check_plugin_name_free(new_name)?;
        let new_name = SmolStr::new(new_name);
        if let Some(plugin) = self.plugins.get_mut(&id) {
            let old = std::mem::replace(&mut plugin.name, new_name.clone());
            self.plugin_names.remove(&old);
            self.plugin_names.insert(new_name, id);
        }
        Ok(())
    }

    pub(crate) fn check_plugin_name_free(&self, name: &str) -> Result<()> {
        if name.is_empty() {
            return Err(VrmatError::invalid("plugin name must not be empty"));
        }
        if self.plugin_names.contains_key(name) {
            return Err(VrmatError::conflict("plugin", name));
        }
        Ok(())
    }

    pub(crate) fn check_param_name_free(&self, param: ElementId, name: &str) -> Result<()> {
        if name.is_empty() {
            return Err(VrmatError::invalid("parameter name must not be empty"));
        }
        let owner = self
            .param_owners
            .get(&param)
            .and_then(|owner| self.plugins.get(owner))
            .ok_or_else(|| VrmatError::unknown_id(param))?;
        match owner.param_names.get(name) {
            Some(existing) if *existing != param => Err(VrmatError::conflict("parameter", name)),
            _ => Ok(()),
        }
    }

    pub(crate) fn rename_parameter(&mut self, id: ElementId, new_name: &str) -> Result<()> {
        self.check_param_name_free(id, new_name)?;
        let owner_id = self
            .param_owners
            .get(&id)
            .copied()
            .ok_or_else(|| VrmatError::unknown_id(id))?;
        let Some(owner) = self.plugins.get_mut(&owner_id) else {
            return Err(VrmatError::unknown_id(id));
        };
        let new_name = SmolStr::new(new_name);
        if let Some(param) = owner.params.get_mut(&id) {
            let old = std::mem::replace(&mut param.name, new_name.clone());
            owner.param_names.remove(&old);
            owner.param_names.insert(new_name, id);
        }
        Ok(())
    }

    // ── Values ──────────────────────────────────────────────────────

    /// Replace a parameter's value with a copy of the caller's buffer.
    ///
    /// The new value is fully built before the old one is dropped, so a
    /// failed call leaves the previous value in place.
    pub fn set_value(
        &mut self,
        param: ElementId,
        descriptor: TypeDescriptor,
        input: ValueInput<'_>,
        list_length: usize,
    ) -> Result<()> {
        if self.parameter(param).is_none() {
            return Err(VrmatError::unknown_id(param));
        }
        let value = Value::new(descriptor, input, list_length)?;
        self.put_value(param, value)
    }

    /// Store an already validated value.
    pub fn put_value(&mut self, param: ElementId, value: Value) -> Result<()> {
        let slot = self
            .parameter_mut(param)
            .ok_or_else(|| VrmatError::unknown_id(param))?;
        slot.value = Some(value);
        Ok(())
    }

    /// Drop a parameter's value, leaving it unset.
    pub fn clear_value(&mut self, param: ElementId) -> Result<()> {
        let slot = self
            .parameter_mut(param)
            .ok_or_else(|| VrmatError::unknown_id(param))?;
        slot.value = None;
        Ok(())
    }

    /// Borrow a parameter's value. `Ok(None)` means the parameter exists but
    /// has never been given a value.
    pub fn get_value(&self, param: ElementId) -> Result<Option<ValueView<'_>>> {
        let slot = self
            .parameter(param)
            .ok_or_else(|| VrmatError::unknown_id(param))?;
        Ok(slot.value.as_ref().map(Value::view))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::Shape;

    fn doc_with_plugin() -> (Document, ElementId) {
        let mut doc = Document::new();
        let id = doc.add_plugin("/Mtl", "MtlSingleBRDF", "material").unwrap();
        (doc, id)
    }

    #[test]
    fn test_add_plugin_rejects_empty_and_duplicate() {
        let (mut doc, _) = doc_with_plugin();
        assert!(matches!(
            doc.add_plugin("", "T", "c"),
            Err(VrmatError::InvalidArgument(_))
        ));
        assert!(matches!(
            doc.add_plugin("/Mtl", "T", "c"),
            Err(VrmatError::Conflict { .. })
        ));
        assert_eq!(doc.plugin_count(), 1);
    }

    #[test]
    fn test_parameter_names_scoped_per_plugin() {
        let (mut doc, a) = doc_with_plugin();
        let b = doc.add_plugin("/Other", "BRDFVRayMtl", "bsdf").unwrap();
        let pa = doc.add_parameter(a, "diffuse", ParamType::Color, false).unwrap();
        let pb = doc.add_parameter(b, "diffuse", ParamType::Color, false).unwrap();
        assert_ne!(pa, pb);
        assert!(doc.add_parameter(a, "diffuse", ParamType::Float, false).is_err());
        assert_eq!(doc.resolve_id(Some(a), "diffuse").unwrap(), pa);
        assert_eq!(doc.resolve_id(Some(b), "diffuse").unwrap(), pb);
    }

    #[test]
    fn test_remove_plugin_cascades() {
        let (mut doc, a) = doc_with_plugin();
        let p = doc.add_parameter(a, "brdf", ParamType::Plugin, false).unwrap();
        assert_eq!(doc.remove_element(a).unwrap(), ElementKind::Plugin);
        assert!(doc.parameter(p).is_none());
        assert!(doc.element_kind(p).is_none());
        assert!(doc.resolve_id(None, "/Mtl").unwrap_err().is_not_found());
        assert!(doc.remove_element(p).unwrap_err().is_not_found());
    }

    #[test]
    fn test_ids_are_not_reused() {
        let (mut doc, a) = doc_with_plugin();
        doc.remove_element(a).unwrap();
        let b = doc.add_plugin("/Mtl", "MtlSingleBRDF", "material").unwrap();
        assert!(b > a);
    }

    #[test]
    fn test_failed_set_value_keeps_previous() {
        let (mut doc, a) = doc_with_plugin();
        let p = doc.add_parameter(a, "color", ParamType::Color, false).unwrap();
        let desc = TypeDescriptor::float(Shape::Array3);
        doc.set_value(p, desc, ValueInput::Floats(&[0.1, 0.2, 0.3]), 0)
            .unwrap();
        assert!(doc.set_value(p, desc, ValueInput::Floats(&[1.0]), 0).is_err());

        let view = doc.get_value(p).unwrap().unwrap();
        assert_eq!(view.as_floats(), Some(&[0.1, 0.2, 0.3][..]));
    }

    #[test]
    fn test_references_are_lazy() {
        let (mut doc, a) = doc_with_plugin();
        let p = doc.add_parameter(a, "brdf", ParamType::Plugin, false).unwrap();
        doc.set_value(p, TypeDescriptor::string(), ValueInput::Strings(&["/Brdf"]), 1)
            .unwrap();
        let refs: Vec<_> = doc.parameter(p).unwrap().references().collect();
        assert_eq!(refs, ["/Brdf"]);
        assert!(doc.resolve_id(None, "/Brdf").is_err());
    }

    #[test]
    fn test_rename_plugin_updates_index() {
        let (mut doc, a) = doc_with_plugin();
        doc.add_plugin("/Taken", "T", "c").unwrap();
        assert!(doc.rename_plugin(a, "/Taken").is_err());
        doc.rename_plugin(a, "/Renamed").unwrap();
        assert_eq!(doc.resolve_id(None, "/Renamed").unwrap(), a);
        assert!(!doc.contains_plugin_name("/Mtl"));
    }

    #[test]
    fn test_rename_parameter_updates_index() {
        let (mut doc, a) = doc_with_plugin();
        let p = doc.add_parameter(a, "diffuse", ParamType::Color, false).unwrap();
        doc.add_parameter(a, "taken", ParamType::Color, false).unwrap();
        assert!(doc.rename_parameter(p, "taken").is_err());
        doc.rename_parameter(p, "base").unwrap();
        assert_eq!(doc.resolve_id(Some(a), "base").unwrap(), p);
        assert!(doc.resolve_id(Some(a), "diffuse").is_err());
        assert_eq!(doc.parameter(p).unwrap().name(), "base");
    }

    #[test]
    fn test_preview_image() {
        let mut doc = Document::new();
        assert_eq!(doc.preview_image().unwrap(), None);
        doc.set_preview_image(b"\x89PNG");
        assert_eq!(doc.preview(), Some("iVBORw=="));
        assert_eq!(doc.preview_image().unwrap().as_deref(), Some(&b"\x89PNG"[..]));
        doc.set_preview(Some("***".into()));
        assert!(doc.preview_image().is_err());
    }
}
