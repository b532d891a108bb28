//! Error types for document operations.

use thiserror::Error;

/// Result alias used throughout the crate.
pub type Result<T, E = VrmatError> = std::result::Result<T, E>;

/// Errors that can occur while building, querying or (de)serializing a
/// [`Document`](crate::model::Document).
#[derive(Debug, Error)]
pub enum VrmatError {
    /// Empty required name, reserved id, or an invalid type descriptor.
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// Unknown element id or unresolved name.
    #[error("{kind} not found: {key}")]
    NotFound { kind: &'static str, key: String },

    /// Duplicate name within the required uniqueness scope.
    #[error("{kind} named '{name}' already exists")]
    Conflict { kind: &'static str, name: String },

    /// Metadata category bits do not match the addressed element kind.
    #[error("Metadata mask {mask:#06x} does not apply to {target}")]
    MetaScopeMismatch { target: &'static str, mask: u32 },

    /// Malformed or ambiguous textual input.
    #[error("Parse error at byte {position}: {message}")]
    Parse { position: u64, message: String },

    /// The requested output cannot be produced.
    #[error("Write error: {0}")]
    Write(String),

    /// IO error during open/save.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// All 32-bit element ids of this document have been handed out.
    #[error("Element id space exhausted")]
    IdSpaceExhausted,
}

impl VrmatError {
    /// Create an invalid argument error.
    pub fn invalid(message: impl Into<String>) -> Self {
        Self::InvalidArgument(message.into())
    }

    /// Create a not-found error for an element id.
    pub fn unknown_id(id: impl std::fmt::Display) -> Self {
        Self::NotFound {
            kind: "element",
            key: id.to_string(),
        }
    }

    /// Create a not-found error for a plugin or parameter name.
    pub fn unknown_name(kind: &'static str, name: impl Into<String>) -> Self {
        Self::NotFound {
            kind,
            key: name.into(),
        }
    }

    /// Create a duplicate-name error.
    pub fn conflict(kind: &'static str, name: impl Into<String>) -> Self {
        Self::Conflict {
            kind,
            name: name.into(),
        }
    }

    /// Create a parse error at a byte offset of the input.
    pub fn parse(position: u64, message: impl Into<String>) -> Self {
        Self::Parse {
            position,
            message: message.into(),
        }
    }

    /// Create a write error.
    pub fn write(message: impl Into<String>) -> Self {
        Self::Write(message.into())
    }

    /// True for lookups that failed because the element does not exist.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}
