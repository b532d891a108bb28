//! Foundation types for the document model.
//!
//! This module provides the identity primitives shared by every other module:
//! - [`ElementId`] - Non-zero identifier for plugins and parameters
//! - [`IdAllocator`] - Monotonic id source that never reuses a value
//! - [`ElementKind`] - Which collection an id addresses
//!
//! This module has NO dependencies on other vrmat modules.

mod id;

pub use id::{ElementId, ElementKind, IdAllocator};
