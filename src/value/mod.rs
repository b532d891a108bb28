//! Type & value store.
//!
//! - [`TypeDescriptor`] - validated `(RawKind, Shape, Multiplicity)` triple
//! - [`ParamType`] - declared logical type, with legacy alias normalization
//! - [`Value`] - owned, immutable payload; replaced wholesale on write
//! - [`ValueView`] - borrowed read access, string lists streamed entry by entry

mod descriptor;
mod param_type;
mod store;

pub use descriptor::{Multiplicity, RawKind, Shape, TypeDescriptor};
pub use param_type::ParamType;
pub use store::{StringEntries, StringEntry, Value, ValueInput, ValueView};
