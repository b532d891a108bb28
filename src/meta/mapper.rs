//! Masked reads and writes of element metadata.
//!
//! `None` as the target addresses the document itself and accepts only root
//! bits; a plugin id accepts only plugin bits, a parameter id only parameter
//! bits. Writes validate every masked field before applying any of them.

use smol_str::SmolStr;

use super::mask::MetaMask;
use super::record::{Meta, MetaRecord, ParamMeta, PluginMeta, RootMeta};
use crate::base::{ElementId, ElementKind};
use crate::error::{Result, VrmatError};
use crate::model::{Document, SchemaVersion};

#[derive(Clone, Copy)]
enum Scope {
    Root,
    Plugin(ElementId),
    Param(ElementId),
}

impl Scope {
    fn check<R: MetaRecord>(mask: MetaMask) -> Result<()> {
        if R::GROUP.contains(mask) {
            Ok(())
        } else {
            Err(VrmatError::MetaScopeMismatch {
                target: R::TARGET,
                mask: mask.bits(),
            })
        }
    }
}

fn required<'a, T>(field: &'a Option<T>, what: &str) -> Result<&'a T> {
    field
        .as_ref()
        .ok_or_else(|| VrmatError::invalid(format!("{what} cannot be cleared")))
}

impl Document {
    fn meta_scope(&self, target: Option<ElementId>) -> Result<Scope> {
        let Some(id) = target else {
            return Ok(Scope::Root);
        };
        match self.element_kind(id) {
            Some(ElementKind::Plugin) => Ok(Scope::Plugin(id)),
            Some(ElementKind::Parameter) => Ok(Scope::Param(id)),
            None => Err(VrmatError::unknown_id(id)),
        }
    }

    /// Read the fields selected by `requested`.
    ///
    /// The returned mask holds exactly the requested bits the element
    /// actually carries; fields outside it are `None` in the record.
    pub fn get_meta(
        &self,
        target: Option<ElementId>,
        requested: MetaMask,
    ) -> Result<(MetaMask, Meta)> {
        let meta: Meta = match self.meta_scope(target)? {
            Scope::Root => {
                Scope::check::<RootMeta>(requested)?;
                let mut meta = self.root_meta();
                meta.retain(requested);
                meta.into()
            }
            Scope::Plugin(id) => {
                Scope::check::<PluginMeta>(requested)?;
                let mut meta = self.plugin_meta(id)?;
                meta.retain(requested);
                meta.into()
            }
            Scope::Param(id) => {
                Scope::check::<ParamMeta>(requested)?;
                let mut meta = self.param_meta(id)?;
                meta.retain(requested);
                meta.into()
            }
        };
        Ok((meta.present(), meta))
    }

    /// Overwrite the fields selected by `mask` with the values in `meta`.
    ///
    /// Unmasked fields are left untouched, including a stored category on a
    /// version 0 document. On error nothing is changed.
    pub fn set_meta(
        &mut self,
        target: Option<ElementId>,
        mask: MetaMask,
        meta: &Meta,
    ) -> Result<()> {
        match (self.meta_scope(target)?, meta) {
            (Scope::Root, Meta::Root(fields)) => {
                Scope::check::<RootMeta>(mask)?;
                self.apply_root_meta(mask, fields)
            }
            (Scope::Plugin(id), Meta::Plugin(fields)) => {
                Scope::check::<PluginMeta>(mask)?;
                self.apply_plugin_meta(id, mask, fields)
            }
            (Scope::Param(id), Meta::Param(fields)) => {
                Scope::check::<ParamMeta>(mask)?;
                self.apply_param_meta(id, mask, fields)
            }
            (Scope::Root, _) => Err(VrmatError::MetaScopeMismatch {
                target: RootMeta::TARGET,
                mask: mask.bits(),
            }),
            (Scope::Plugin(_), _) => Err(VrmatError::MetaScopeMismatch {
                target: PluginMeta::TARGET,
                mask: mask.bits(),
            }),
            (Scope::Param(_), _) => Err(VrmatError::MetaScopeMismatch {
                target: ParamMeta::TARGET,
                mask: mask.bits(),
            }),
        }
    }

    // ── Reads ───────────────────────────────────────────────────────

    fn root_meta(&self) -> RootMeta {
        let category = match self.version {
            SchemaVersion::Compact => self.category.clone(),
            SchemaVersion::Legacy => None,
        };
        RootMeta {
            version: Some(self.version),
            category,
            preview: self.preview.clone(),
            tag: Some(self.tag),
            file_path: self.file_path.clone(),
        }
    }

    fn plugin_meta(&self, id: ElementId) -> Result<PluginMeta> {
        let plugin = self.plugin(id).ok_or_else(|| VrmatError::unknown_id(id))?;
        Ok(PluginMeta {
            name: Some(plugin.name().to_string()),
            plugin_type: Some(plugin.plugin_type().to_string()),
            class: Some(plugin.class().to_string()),
            version: plugin.version(),
        })
    }

    fn param_meta(&self, id: ElementId) -> Result<ParamMeta> {
        let param = self.parameter(id).ok_or_else(|| VrmatError::unknown_id(id))?;
        Ok(ParamMeta {
            name: Some(param.name().to_string()),
            param_type: Some(param.param_type()),
            custom: Some(param.is_custom()),
            file_path: Some(param.is_file_path()),
        })
    }

    // ── Writes ──────────────────────────────────────────────────────

    fn apply_root_meta(&mut self, mask: MetaMask, fields: &RootMeta) -> Result<()> {
        let version = if mask.contains(MetaMask::ROOT_VERSION) {
            Some(*required(&fields.version, "document version")?)
        } else {
            None
        };
        let tag = if mask.contains(MetaMask::ROOT_TAG) {
            Some(*required(&fields.tag, "root tag")?)
        } else {
            None
        };

        if let Some(version) = version {
            self.version = version;
        }
        if let Some(tag) = tag {
            self.tag = tag;
        }
        if mask.contains(MetaMask::ROOT_CATEGORY) {
            self.category = fields.category.clone();
        }
        if mask.contains(MetaMask::ROOT_PREVIEW) {
            self.preview = fields.preview.clone();
        }
        if mask.contains(MetaMask::ROOT_FILE_PATH) {
            self.file_path = fields.file_path.clone();
        }
        Ok(())
    }

    fn apply_plugin_meta(
        &mut self,
        id: ElementId,
        mask: MetaMask,
        fields: &PluginMeta,
    ) -> Result<()> {
        let current = self.plugin(id).ok_or_else(|| VrmatError::unknown_id(id))?;

        let rename = if mask.contains(MetaMask::PLUGIN_NAME) {
            let name = required(&fields.name, "plugin name")?;
            if name != current.name() {
                self.check_plugin_name_free(name)?;
                Some(name.as_str())
            } else {
                None
            }
        } else {
            None
        };
        let plugin_type = if mask.contains(MetaMask::PLUGIN_TYPE) {
            Some(SmolStr::new(required(&fields.plugin_type, "plugin type")?))
        } else {
            None
        };
        let class = if mask.contains(MetaMask::PLUGIN_CLASS) {
            Some(SmolStr::new(required(&fields.class, "plugin class")?))
        } else {
            None
        };

        if let Some(name) = rename {
            self.rename_plugin(id, name)?;
        }
        let plugin = self.plugin_mut(id).ok_or_else(|| VrmatError::unknown_id(id))?;
        if let Some(plugin_type) = plugin_type {
            plugin.plugin_type = plugin_type;
        }
        if let Some(class) = class {
            plugin.class = class;
        }
        if mask.contains(MetaMask::PLUGIN_VERSION) {
            plugin.version = fields.version;
        }
        Ok(())
    }

    fn apply_param_meta(
        &mut self,
        id: ElementId,
        mask: MetaMask,
        fields: &ParamMeta,
    ) -> Result<()> {
        let rename = if mask.contains(MetaMask::PARAM_NAME) {
            let name = required(&fields.name, "parameter name")?;
            self.check_param_name_free(id, name)?;
            Some(name.as_str())
        } else {
            None
        };
        let param_type = if mask.contains(MetaMask::PARAM_TYPE) {
            Some(*required(&fields.param_type, "parameter type")?)
        } else {
            None
        };
        let custom = if mask.contains(MetaMask::PARAM_CUSTOM) {
            Some(*required(&fields.custom, "custom flag")?)
        } else {
            None
        };
        let file_path = if mask.contains(MetaMask::PARAM_FILE_PATH) {
            Some(*required(&fields.file_path, "file path flag")?)
        } else {
            None
        };

        if let Some(name) = rename {
            self.rename_parameter(id, name)?;
        }
        let param = self.parameter_mut(id).ok_or_else(|| VrmatError::unknown_id(id))?;
        if let Some(param_type) = param_type {
            param.param_type = param_type;
        }
        if let Some(custom) = custom {
            param.custom = custom;
        }
        if let Some(file_path) = file_path {
            param.file_path = file_path;
        }
        Ok(())
    }
}
