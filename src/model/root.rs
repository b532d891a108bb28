//! Document-level attributes: schema version and root tag.

use std::fmt;

use crate::error::{Result, VrmatError};

/// Which textual grammar a document is read from or written to.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum SchemaVersion {
    /// Nested `Asset`/`vrayplugin` layout with duplicated attributes.
    #[default]
    Legacy,
    /// Flat layout with a root category.
    Compact,
}

impl SchemaVersion {
    /// Numeric version as used in files and at the host boundary.
    pub fn number(self) -> u32 {
        match self {
            Self::Legacy => 0,
            Self::Compact => 1,
        }
    }

    /// Look up a numeric version.
    pub fn from_number(number: u32) -> Result<Self> {
        match number {
            0 => Ok(Self::Legacy),
            1 => Ok(Self::Compact),
            n => Err(VrmatError::invalid(format!("unsupported schema version {n}"))),
        }
    }
}

impl fmt::Display for SchemaVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.number())
    }
}

/// Root element name of a document.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum RootTag {
    /// Legacy material document.
    Vismat,
    /// Legacy options document.
    Visopt,
    /// Material document.
    #[default]
    Vrmat,
    /// Options document.
    Vropt,
}

impl RootTag {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Vismat => "vismat",
            Self::Visopt => "visopt",
            Self::Vrmat => "vrmat",
            Self::Vropt => "vropt",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "vismat" => Some(Self::Vismat),
            "visopt" => Some(Self::Visopt),
            "vrmat" => Some(Self::Vrmat),
            "vropt" => Some(Self::Vropt),
            _ => None,
        }
    }

    pub fn is_legacy(self) -> bool {
        matches!(self, Self::Vismat | Self::Visopt)
    }

    /// The modern spelling of this tag.
    pub fn modern(self) -> Self {
        match self {
            Self::Vismat => Self::Vrmat,
            Self::Visopt => Self::Vropt,
            other => other,
        }
    }
}

impl fmt::Display for RootTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for RootTag {
    type Err = VrmatError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s).ok_or_else(|| VrmatError::invalid(format!("unknown root tag '{s}'")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_numbers() {
        assert_eq!(SchemaVersion::from_number(0).unwrap(), SchemaVersion::Legacy);
        assert_eq!(SchemaVersion::from_number(1).unwrap(), SchemaVersion::Compact);
        assert!(SchemaVersion::from_number(2).is_err());
    }

    #[test]
    fn test_tag_migration() {
        assert_eq!(RootTag::Vismat.modern(), RootTag::Vrmat);
        assert_eq!(RootTag::Visopt.modern(), RootTag::Vropt);
        assert_eq!(RootTag::Vropt.modern(), RootTag::Vropt);
        assert!("material".parse::<RootTag>().is_err());
    }
}
