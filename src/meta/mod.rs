//! Metadata mapper.
//!
//! ```text
//! MetaMask ──selects──▶ RootMeta   ◀──▶ Document root attributes
//!                       PluginMeta ◀──▶ Plugin name/type/class/version
//!                       ParamMeta  ◀──▶ Parameter name/type/flags
//! ```
//!
//! Entry points are [`Document::get_meta`](crate::model::Document::get_meta)
//! and [`Document::set_meta`](crate::model::Document::set_meta).

mod mapper;
mod mask;
mod record;

pub use mask::MetaMask;
pub use record::{Meta, MetaRecord, ParamMeta, PluginMeta, RootMeta};
