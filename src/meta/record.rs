//! Per-kind metadata records.
//!
//! Each field is optional. Read results carry `Some` exactly for the fields
//! whose bit is in the returned mask; on write, the mask decides which fields
//! are applied and `None` clears a field where clearing is allowed.

use std::path::PathBuf;

use super::mask::MetaMask;
use crate::model::{RootTag, SchemaVersion};
use crate::value::ParamType;

/// Capability shared by the three record kinds.
pub trait MetaRecord: Default {
    /// Bits this record kind can carry.
    const GROUP: MetaMask;

    /// Name of the addressed element kind, for error reporting.
    const TARGET: &'static str;

    /// Bits whose field holds a value.
    fn present(&self) -> MetaMask;

    /// Clear every field whose bit is not in `mask`.
    fn retain(&mut self, mask: MetaMask);
}

fn keep<T>(field: &mut Option<T>, mask: MetaMask, bit: MetaMask) {
    if !mask.contains(bit) {
        *field = None;
    }
}

fn bit_if<T>(field: &Option<T>, bit: MetaMask) -> MetaMask {
    if field.is_some() { bit } else { MetaMask::empty() }
}

// ============================================================================
// ROOT
// ============================================================================

#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RootMeta {
    pub version: Option<SchemaVersion>,
    pub category: Option<String>,
    pub preview: Option<String>,
    pub tag: Option<RootTag>,
    pub file_path: Option<PathBuf>,
}

impl MetaRecord for RootMeta {
    const GROUP: MetaMask = MetaMask::ROOT;
    const TARGET: &'static str = "document";

    fn present(&self) -> MetaMask {
        bit_if(&self.version, MetaMask::ROOT_VERSION)
            | bit_if(&self.category, MetaMask::ROOT_CATEGORY)
            | bit_if(&self.preview, MetaMask::ROOT_PREVIEW)
            | bit_if(&self.tag, MetaMask::ROOT_TAG)
            | bit_if(&self.file_path, MetaMask::ROOT_FILE_PATH)
    }

    fn retain(&mut self, mask: MetaMask) {
        keep(&mut self.version, mask, MetaMask::ROOT_VERSION);
        keep(&mut self.category, mask, MetaMask::ROOT_CATEGORY);
        keep(&mut self.preview, mask, MetaMask::ROOT_PREVIEW);
        keep(&mut self.tag, mask, MetaMask::ROOT_TAG);
        keep(&mut self.file_path, mask, MetaMask::ROOT_FILE_PATH);
    }
}

// ============================================================================
// PLUGIN
// ============================================================================

#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PluginMeta {
    pub name: Option<String>,
    pub plugin_type: Option<String>,
    pub class: Option<String>,
    pub version: Option<i32>,
}

impl MetaRecord for PluginMeta {
    const GROUP: MetaMask = MetaMask::PLUGIN;
    const TARGET: &'static str = "plugin";

    fn present(&self) -> MetaMask {
        bit_if(&self.name, MetaMask::PLUGIN_NAME)
            | bit_if(&self.plugin_type, MetaMask::PLUGIN_TYPE)
            | bit_if(&self.class, MetaMask::PLUGIN_CLASS)
            | bit_if(&self.version, MetaMask::PLUGIN_VERSION)
    }

    fn retain(&mut self, mask: MetaMask) {
        keep(&mut self.name, mask, MetaMask::PLUGIN_NAME);
        keep(&mut self.plugin_type, mask, MetaMask::PLUGIN_TYPE);
        keep(&mut self.class, mask, MetaMask::PLUGIN_CLASS);
        keep(&mut self.version, mask, MetaMask::PLUGIN_VERSION);
    }
}

// ============================================================================
// PARAMETER
// ============================================================================

#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ParamMeta {
    pub name: Option<String>,
    pub param_type: Option<ParamType>,
    pub custom: Option<bool>,
    pub file_path: Option<bool>,
}

impl MetaRecord for ParamMeta {
    const GROUP: MetaMask = MetaMask::PARAM;
    const TARGET: &'static str = "parameter";

    fn present(&self) -> MetaMask {
        bit_if(&self.name, MetaMask::PARAM_NAME)
            | bit_if(&self.param_type, MetaMask::PARAM_TYPE)
            | bit_if(&self.custom, MetaMask::PARAM_CUSTOM)
            | bit_if(&self.file_path, MetaMask::PARAM_FILE_PATH)
    }

    fn retain(&mut self, mask: MetaMask) {
        keep(&mut self.name, mask, MetaMask::PARAM_NAME);
        keep(&mut self.param_type, mask, MetaMask::PARAM_TYPE);
        keep(&mut self.custom, mask, MetaMask::PARAM_CUSTOM);
        keep(&mut self.file_path, mask, MetaMask::PARAM_FILE_PATH);
    }
}

// ============================================================================
// ANY RECORD
// ============================================================================

/// A metadata record of whichever kind the addressed element has.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Meta {
    Root(RootMeta),
    Plugin(PluginMeta),
    Param(ParamMeta),
}

impl Meta {
    /// Bits whose field holds a value.
    pub fn present(&self) -> MetaMask {
        match self {
            Self::Root(meta) => meta.present(),
            Self::Plugin(meta) => meta.present(),
            Self::Param(meta) => meta.present(),
        }
    }

    pub fn as_root(&self) -> Option<&RootMeta> {
        match self {
            Self::Root(meta) => Some(meta),
            _ => None,
        }
    }

    pub fn as_plugin(&self) -> Option<&PluginMeta> {
        match self {
            Self::Plugin(meta) => Some(meta),
            _ => None,
        }
    }

    pub fn as_param(&self) -> Option<&ParamMeta> {
        match self {
            Self::Param(meta) => Some(meta),
            _ => None,
        }
    }
}

impl From<RootMeta> for Meta {
    fn from(meta: RootMeta) -> Self {
        Self::Root(meta)
    }
}

impl From<PluginMeta> for Meta {
    fn from(meta: PluginMeta) -> Self {
        Self::Plugin(meta)
    }
}

impl From<ParamMeta> for Meta {
    fn from(meta: ParamMeta) -> Self {
        Self::Param(meta)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_retain_and_present() {
        let mut meta = PluginMeta {
            name: Some("/Mtl".into()),
            plugin_type: Some("MtlSingleBRDF".into()),
            class: Some("material".into()),
            version: None,
        };
        assert_eq!(
            meta.present(),
            MetaMask::PLUGIN_NAME | MetaMask::PLUGIN_TYPE | MetaMask::PLUGIN_CLASS
        );
        meta.retain(MetaMask::PLUGIN_TYPE | MetaMask::PLUGIN_VERSION);
        assert_eq!(meta.present(), MetaMask::PLUGIN_TYPE);
        assert_eq!(meta.name, None);
    }

    #[test]
    fn test_meta_accessors() {
        let meta: Meta = ParamMeta {
            custom: Some(true),
            ..Default::default()
        }
        .into();
        assert_eq!(meta.present(), MetaMask::PARAM_CUSTOM);
        assert!(meta.as_param().is_some());
        assert!(meta.as_root().is_none());
    }
}
