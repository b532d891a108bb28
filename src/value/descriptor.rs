//! The three-axis type descriptor of a stored value.
//!
//! A descriptor is the triple `(RawKind, Shape, Multiplicity)`. The only way
//! to obtain one is [`TypeDescriptor::new`], which rejects combinations that
//! cannot be stored (an unset raw kind, or an array shape on integers and
//! strings). Everything downstream can therefore rely on a descriptor being
//! internally consistent.
//!
//! The host API historically passed descriptors as one packed `u32`;
//! [`TypeDescriptor::from_bits`] and [`TypeDescriptor::to_bits`] translate
//! that layout at the boundary and are not used internally.

use crate::error::{Result, VrmatError};

/// The fundamental scalar type of a value.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum RawKind {
    /// Marks "unset"; never accepted by the store.
    None,
    Float,
    Int,
    String,
}

/// How many scalars make up one instance of a value.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Shape {
    #[default]
    Single,
    /// Colors and vectors.
    Array3,
    /// Colors with alpha.
    Array4,
    /// 3x3 matrix, column-major.
    Array9,
    /// 3x4 transform: matrix columns followed by the offset.
    Array12,
}

impl Shape {
    /// Number of scalars per instance.
    pub fn width(self) -> usize {
        match self {
            Self::Single => 1,
            Self::Array3 => 3,
            Self::Array4 => 4,
            Self::Array9 => 9,
            Self::Array12 => 12,
        }
    }
}

/// Whether a value holds one instance or an ordered sequence of instances.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Multiplicity {
    #[default]
    Single,
    List,
}

/// Validated `(RawKind, Shape, Multiplicity)` triple.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct TypeDescriptor {
    raw: RawKind,
    shape: Shape,
    multiplicity: Multiplicity,
}

// Packed boundary layout, one bit per enumerator.
const RAW_FLOAT: u32 = 1 << 0;
const RAW_INT: u32 = 1 << 1;
const RAW_STRING: u32 = 1 << 2;
const RAW_MASK: u32 = RAW_FLOAT | RAW_INT | RAW_STRING;

const SHAPE_SINGLE: u32 = 1 << 3;
const SHAPE_ARRAY3: u32 = 1 << 4;
const SHAPE_ARRAY4: u32 = 1 << 5;
const SHAPE_ARRAY9: u32 = 1 << 6;
const SHAPE_ARRAY12: u32 = 1 << 7;
const SHAPE_MASK: u32 = SHAPE_SINGLE | SHAPE_ARRAY3 | SHAPE_ARRAY4 | SHAPE_ARRAY9 | SHAPE_ARRAY12;

const MULT_SINGLE: u32 = 1 << 8;
const MULT_LIST: u32 = 1 << 9;
const MULT_MASK: u32 = MULT_SINGLE | MULT_LIST;

impl TypeDescriptor {
    /// Build a descriptor, rejecting combinations the store cannot hold.
    pub fn new(raw: RawKind, shape: Shape, multiplicity: Multiplicity) -> Result<Self> {
        match (raw, shape) {
            (RawKind::None, _) => Err(VrmatError::invalid("raw kind must not be None")),
            (RawKind::Int | RawKind::String, s) if s != Shape::Single => Err(VrmatError::invalid(
                format!("{raw:?} values cannot have shape {shape:?}"),
            )),
            _ => Ok(Self {
                raw,
                shape,
                multiplicity,
            }),
        }
    }

    /// Single float of the given shape.
    pub fn float(shape: Shape) -> Self {
        Self {
            raw: RawKind::Float,
            shape,
            multiplicity: Multiplicity::Single,
        }
    }

    /// Single integer.
    pub fn int() -> Self {
        Self {
            raw: RawKind::Int,
            shape: Shape::Single,
            multiplicity: Multiplicity::Single,
        }
    }

    /// Single string.
    pub fn string() -> Self {
        Self {
            raw: RawKind::String,
            shape: Shape::Single,
            multiplicity: Multiplicity::Single,
        }
    }

    /// The same descriptor as a list.
    pub fn into_list(self) -> Self {
        Self {
            multiplicity: Multiplicity::List,
            ..self
        }
    }

    /// The same descriptor with the given multiplicity.
    pub fn with_multiplicity(self, multiplicity: Multiplicity) -> Self {
        Self {
            multiplicity,
            ..self
        }
    }

    pub fn raw(&self) -> RawKind {
        self.raw
    }

    pub fn shape(&self) -> Shape {
        self.shape
    }

    pub fn multiplicity(&self) -> Multiplicity {
        self.multiplicity
    }

    /// Shorthand for `multiplicity() == Multiplicity::List`.
    pub fn is_list(&self) -> bool {
        self.multiplicity == Multiplicity::List
    }

    /// Scalars per instance (1 for ints and strings).
    pub fn components(&self) -> usize {
        self.shape.width()
    }

    /// Total scalar footprint of a value with `count` instances.
    pub fn footprint(&self, count: usize) -> Option<usize> {
        self.shape.width().checked_mul(count)
    }

    // ── Boundary encoding ───────────────────────────────────────────

    /// Decode the packed host representation.
    ///
    /// Each axis must carry exactly one bit; the result is then validated
    /// like any other descriptor.
    pub fn from_bits(bits: u32) -> Result<Self> {
        if bits & !(RAW_MASK | SHAPE_MASK | MULT_MASK) != 0 {
            return Err(VrmatError::invalid(format!(
                "unknown bits in type descriptor {bits:#x}"
            )));
        }
        let raw = match bits & RAW_MASK {
            RAW_FLOAT => RawKind::Float,
            RAW_INT => RawKind::Int,
            RAW_STRING => RawKind::String,
            0 => RawKind::None,
            other => {
                return Err(VrmatError::invalid(format!(
                    "ambiguous raw kind bits {other:#x}"
                )));
            }
        };
        let shape = match bits & SHAPE_MASK {
            SHAPE_SINGLE => Shape::Single,
            SHAPE_ARRAY3 => Shape::Array3,
            SHAPE_ARRAY4 => Shape::Array4,
            SHAPE_ARRAY9 => Shape::Array9,
            SHAPE_ARRAY12 => Shape::Array12,
            other => {
                return Err(VrmatError::invalid(format!(
                    "shape bits {other:#x} must select exactly one shape"
                )));
            }
        };
        let multiplicity = match bits & MULT_MASK {
            MULT_SINGLE => Multiplicity::Single,
            MULT_LIST => Multiplicity::List,
            other => {
                return Err(VrmatError::invalid(format!(
                    "multiplicity bits {other:#x} must select exactly one multiplicity"
                )));
            }
        };
        Self::new(raw, shape, multiplicity)
    }

    /// Encode into the packed host representation.
    pub fn to_bits(&self) -> u32 {
        let raw = match self.raw {
            RawKind::None => 0,
            RawKind::Float => RAW_FLOAT,
            RawKind::Int => RAW_INT,
            RawKind::String => RAW_STRING,
        };
        let shape = match self.shape {
            Shape::Single => SHAPE_SINGLE,
            Shape::Array3 => SHAPE_ARRAY3,
            Shape::Array4 => SHAPE_ARRAY4,
            Shape::Array9 => SHAPE_ARRAY9,
            Shape::Array12 => SHAPE_ARRAY12,
        };
        let multiplicity = match self.multiplicity {
            Multiplicity::Single => MULT_SINGLE,
            Multiplicity::List => MULT_LIST,
        };
        raw | shape | multiplicity
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejects_unset_raw_kind() {
        let err = TypeDescriptor::new(RawKind::None, Shape::Single, Multiplicity::Single);
        assert!(matches!(err, Err(VrmatError::InvalidArgument(_))));
    }

    #[test]
    fn test_rejects_shaped_ints_and_strings() {
        for raw in [RawKind::Int, RawKind::String] {
            for shape in [Shape::Array3, Shape::Array4, Shape::Array9, Shape::Array12] {
                assert!(TypeDescriptor::new(raw, shape, Multiplicity::List).is_err());
            }
            assert!(TypeDescriptor::new(raw, Shape::Single, Multiplicity::List).is_ok());
        }
    }

    #[test]
    fn test_float_accepts_every_shape() {
        for shape in [
            Shape::Single,
            Shape::Array3,
            Shape::Array4,
            Shape::Array9,
            Shape::Array12,
        ] {
            let desc = TypeDescriptor::new(RawKind::Float, shape, Multiplicity::Single).unwrap();
            assert_eq!(desc.components(), shape.width());
        }
    }

    #[test]
    fn test_packed_bits() {
        // Float | Array3 | List, as a host would pass a list of vectors.
        let bits = (1 << 0) | (1 << 4) | (1 << 9);
        let desc = TypeDescriptor::from_bits(bits).unwrap();
        assert_eq!(desc.raw(), RawKind::Float);
        assert_eq!(desc.shape(), Shape::Array3);
        assert!(desc.is_list());
        assert_eq!(desc.to_bits(), bits);
    }

    #[test]
    fn test_packed_bits_validation() {
        // Int | Array3 | Single
        assert!(TypeDescriptor::from_bits((1 << 1) | (1 << 4) | (1 << 8)).is_err());
        // two shapes at once
        assert!(TypeDescriptor::from_bits((1 << 0) | (1 << 3) | (1 << 4) | (1 << 8)).is_err());
        // missing multiplicity
        assert!(TypeDescriptor::from_bits((1 << 0) | (1 << 3)).is_err());
        // stray high bit
        assert!(TypeDescriptor::from_bits((1 << 0) | (1 << 3) | (1 << 8) | (1 << 20)).is_err());
    }
}
