//! Element graph: the document, its plugins and their parameters.
//!
//! - [`Document`] - root attributes plus id-keyed plugin storage
//! - [`Plugin`] / [`Parameter`] - read access to elements
//! - [`PluginCursor`] / [`ParamCursor`] - borrowing traversal
//!
//! All mutation goes through `&mut Document`; elements are never handed out
//! mutably, so the name indexes cannot drift from the stored names.

mod document;
mod query;
mod root;

pub use document::{Document, Parameter, Plugin};
pub use query::{ParamCursor, ParamEntry, PluginCursor};
pub use root::{RootTag, SchemaVersion};
