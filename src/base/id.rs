//! Element identity.
//!
//! Plugins and parameters share one id space per document. Ids are handed
//! out in increasing order and are never reused, so a stale id of a removed
//! element can never alias a newer one. The numeric value 0 is reserved at
//! the host boundary to mean "the document itself" or "no element", which
//! is why [`ElementId`] wraps a [`NonZeroU32`].

use std::num::NonZeroU32;

/// Unique identifier of a plugin or parameter within one document.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ElementId(NonZeroU32);

impl ElementId {
    /// Convert a raw boundary id. Returns `None` for the reserved value 0.
    pub fn new(raw: u32) -> Option<Self> {
        NonZeroU32::new(raw).map(Self)
    }

    /// The raw numeric value, as handed across the host boundary.
    pub fn get(self) -> u32 {
        self.0.get()
    }
}

impl std::fmt::Display for ElementId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Which collection an [`ElementId`] belongs to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ElementKind {
    Plugin,
    Parameter,
}

impl ElementKind {
    /// Human-readable name used in error messages.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Plugin => "plugin",
            Self::Parameter => "parameter",
        }
    }
}

/// Monotonic id source for a single document.
#[derive(Clone, Debug)]
pub struct IdAllocator {
    next: Option<NonZeroU32>,
}

impl Default for IdAllocator {
    fn default() -> Self {
        Self {
            next: Some(NonZeroU32::MIN),
        }
    }
}

impl IdAllocator {
    /// Create an allocator whose first id is 1.
    pub fn new() -> Self {
        Self::default()
    }

    /// Hand out the next id, or `None` once the 32-bit space is used up.
    pub fn allocate(&mut self) -> Option<ElementId> {
        let current = self.next?;
        self.next = current.checked_add(1);
        Some(ElementId(current))
    }

    /// Number of ids handed out so far.
    pub fn issued(&self) -> u32 {
        match self.next {
            Some(next) => next.get() - 1,
            None => u32::MAX,
        }
    }
}
