//! Logical parameter types.
//!
//! The declared type of a parameter is what the textual formats carry in
//! their `type` attributes. Several logical types share one storage layout
//! (`integer`/`bool`, `color`/`vector`, `string`/`plugin`); only the declared
//! type tells them apart.
//!
//! Old documents also use texture-qualified spellings such as
//! `float texture`. These are accepted by [`ParamType::parse`] and mapped to
//! the canonical type, so they are never written back out.

use std::fmt;
use std::str::FromStr;

use super::descriptor::{Multiplicity, RawKind, Shape, TypeDescriptor};
use crate::error::VrmatError;

/// Declared type of a parameter.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum ParamType {
    Integer,
    Bool,
    Float,
    String,
    Color,
    AColor,
    Vector,
    Matrix,
    Transform,
    /// String value(s) naming other plugins.
    Plugin,
}

impl ParamType {
    /// Every canonical type, in vocabulary order.
    pub const ALL: [ParamType; 10] = [
        Self::Integer,
        Self::Bool,
        Self::Float,
        Self::String,
        Self::Color,
        Self::AColor,
        Self::Vector,
        Self::Matrix,
        Self::Transform,
        Self::Plugin,
    ];

    /// Canonical type string, as written by the serializer.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Integer => "integer",
            Self::Bool => "bool",
            Self::Float => "float",
            Self::String => "string",
            Self::Color => "color",
            Self::AColor => "acolor",
            Self::Vector => "vector",
            Self::Matrix => "matrix",
            Self::Transform => "transform",
            Self::Plugin => "plugin",
        }
    }

    /// Parse a canonical type string or one of its legacy aliases.
    pub fn parse(s: &str) -> Option<Self> {
        let ty = match s.trim() {
            "integer" | "int" | "integer texture" | "int texture" => Self::Integer,
            "bool" | "boolean" => Self::Bool,
            "float" | "float texture" => Self::Float,
            "string" => Self::String,
            "color" | "color texture" => Self::Color,
            "acolor" | "acolor texture" | "texture" => Self::AColor,
            "vector" | "vector texture" => Self::Vector,
            "matrix" | "matrix texture" => Self::Matrix,
            "transform" | "transform texture" => Self::Transform,
            "plugin" => Self::Plugin,
            _ => return None,
        };
        Some(ty)
    }

    /// True when `s` is accepted only as a deprecated spelling.
    pub fn is_legacy_alias(s: &str) -> bool {
        Self::parse(s).is_some_and(|ty| ty.as_str() != s.trim())
    }

    pub fn raw_kind(self) -> RawKind {
        match self {
            Self::Integer | Self::Bool => RawKind::Int,
            Self::String | Self::Plugin => RawKind::String,
            _ => RawKind::Float,
        }
    }

    pub fn shape(self) -> Shape {
        match self {
            Self::Color | Self::Vector => Shape::Array3,
            Self::AColor => Shape::Array4,
            Self::Matrix => Shape::Array9,
            Self::Transform => Shape::Array12,
            _ => Shape::Single,
        }
    }

    /// Storage descriptor for a value of this type.
    pub fn descriptor(self, multiplicity: Multiplicity) -> TypeDescriptor {
        let single = match self.raw_kind() {
            RawKind::Int => TypeDescriptor::int(),
            RawKind::String => TypeDescriptor::string(),
            _ => TypeDescriptor::float(self.shape()),
        };
        single.with_multiplicity(multiplicity)
    }

    /// Whether a stored value with `descriptor` can be written under this type.
    pub fn accepts(self, descriptor: &TypeDescriptor) -> bool {
        descriptor.raw() == self.raw_kind() && descriptor.shape() == self.shape()
    }

    /// Whether values of this type are plugin references.
    pub fn is_reference(self) -> bool {
        self == Self::Plugin
    }
}

impl fmt::Display for ParamType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ParamType {
    type Err = VrmatError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s).ok_or_else(|| VrmatError::invalid(format!("unknown parameter type '{s}'")))
    }
}
