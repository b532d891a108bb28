//! # vrmat
//!
//! In-memory model, validation and XML serialization for `.vrmat` material
//! documents.
//!
//! ## Module Structure (dependency order)
//!
//! ```text
//! container → Open/load/save with swap-on-success and atomic commit
//!   ↓
//! format    → Legacy (v0) and compact (v1) XML grammars
//!   ↓
//! meta      → Masked, per-kind metadata records
//!   ↓
//! model     → Document, plugins, parameters, name indexes, cursors
//!   ↓
//! value     → Type descriptors, parameter types, stored values
//!   ↓
//! base      → Element ids
//! ```

// ============================================================================
// MODULES (dependency order: base → value → model → meta → format → container)
// ============================================================================

/// Errors shared by every module
pub mod error;

/// Foundation types: ElementId, IdAllocator
pub mod base;

/// Type descriptors and parameter values
pub mod value;

/// Element graph and iteration
pub mod model;

/// Masked metadata access
pub mod meta;

/// XML parsing and serialization
pub mod format;

/// File and buffer boundary
pub mod container;

pub use base::{ElementId, ElementKind};
pub use container::DataContainer;
pub use error::{Result, VrmatError};
pub use format::{FormatOptions, detect_version, parse, serialize};
pub use meta::{Meta, MetaMask, ParamMeta, PluginMeta, RootMeta};
pub use model::{Document, ParamEntry, Parameter, Plugin, RootTag, SchemaVersion};
pub use value::{
    Multiplicity, ParamType, RawKind, Shape, TypeDescriptor, Value, ValueInput, ValueView,
};
