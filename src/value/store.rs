//! Owned parameter values and borrowed views over them.
//!
//! ```text
//! ValueInput<'_> ──Value::new──▶ Value (owns a flat buffer) ──view()──▶ ValueView<'_>
//! ```
//!
//! Numeric data is one flat buffer of `shape width × count` scalars.
//! Strings are kept as independent entries, even for a single string, and are
//! read back one entry at a time through [`StringEntries`].

use super::descriptor::{RawKind, TypeDescriptor};
use crate::error::{Result, VrmatError};

/// Borrowed caller data handed to [`Value::new`].
#[derive(Clone, Copy, Debug)]
pub enum ValueInput<'a> {
    Floats(&'a [f32]),
    Ints(&'a [i32]),
    Strings(&'a [&'a str]),
}

impl ValueInput<'_> {
    fn raw_kind(&self) -> RawKind {
        match self {
            Self::Floats(_) => RawKind::Float,
            Self::Ints(_) => RawKind::Int,
            Self::Strings(_) => RawKind::String,
        }
    }

    fn len(&self) -> usize {
        match self {
            Self::Floats(data) => data.len(),
            Self::Ints(data) => data.len(),
            Self::Strings(data) => data.len(),
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
enum Payload {
    Floats(Box<[f32]>),
    Ints(Box<[i32]>),
    Strings(Box<[Box<str>]>),
}

/// A typed parameter value owned by the document.
#[derive(Clone, Debug, PartialEq)]
pub struct Value {
    descriptor: TypeDescriptor,
    count: usize,
    payload: Payload,
}

impl Value {
    /// Copy caller data into a new value.
    ///
    /// For a single (non-list) descriptor `list_length` may be 0 or 1; both
    /// mean one instance. The buffer must hold exactly
    /// `shape width × instances` scalars of the descriptor's raw kind.
    pub fn new(
        descriptor: TypeDescriptor,
        input: ValueInput<'_>,
        list_length: usize,
    ) -> Result<Self> {
        let count = instance_count(&descriptor, list_length)?;
        if input.raw_kind() != descriptor.raw() {
            return Err(VrmatError::invalid(format!(
                "buffer holds {:?} data but the descriptor declares {:?}",
                input.raw_kind(),
                descriptor.raw()
            )));
        }
        check_footprint(&descriptor, count, input.len())?;

        let payload = match input {
            ValueInput::Floats(data) => Payload::Floats(data.into()),
            ValueInput::Ints(data) => Payload::Ints(data.into()),
            ValueInput::Strings(data) => {
                if let Some(bad) = data.iter().position(|s| s.contains('\0')) {
                    return Err(VrmatError::invalid(format!(
                        "string entry {bad} contains a NUL character"
                    )));
                }
                Payload::Strings(data.iter().map(|s| Box::<str>::from(*s)).collect())
            }
        };
        Ok(Self {
            descriptor,
            count,
            payload,
        })
    }

    /// Take ownership of parsed floats.
    pub(crate) fn from_floats(descriptor: TypeDescriptor, data: Vec<f32>) -> Result<Self> {
        let count = Self::count_from_len(&descriptor, data.len())?;
        Ok(Self {
            descriptor,
            count,
            payload: Payload::Floats(data.into_boxed_slice()),
        })
    }

    /// Take ownership of parsed integers.
    pub(crate) fn from_ints(descriptor: TypeDescriptor, data: Vec<i32>) -> Result<Self> {
        let count = Self::count_from_len(&descriptor, data.len())?;
        Ok(Self {
            descriptor,
            count,
            payload: Payload::Ints(data.into_boxed_slice()),
        })
    }

    /// Take ownership of parsed string entries.
    pub(crate) fn from_strings(descriptor: TypeDescriptor, entries: Vec<String>) -> Result<Self> {
        let count = Self::count_from_len(&descriptor, entries.len())?;
        Ok(Self {
            descriptor,
            count,
            payload: Payload::Strings(entries.into_iter().map(String::into_boxed_str).collect()),
        })
    }

    fn count_from_len(descriptor: &TypeDescriptor, len: usize) -> Result<usize> {
        let width = descriptor.components();
        if len % width != 0 {
            return Err(VrmatError::invalid(format!(
                "{len} scalars do not divide into instances of {width}"
            )));
        }
        let count = len / width;
        if !descriptor.is_list() && count != 1 {
            return Err(VrmatError::invalid(format!(
                "a single value needs exactly {width} scalars, got {len}"
            )));
        }
        Ok(count)
    }

    pub fn descriptor(&self) -> TypeDescriptor {
        self.descriptor
    }

    /// Number of instances (1 for non-list values).
    pub fn list_len(&self) -> usize {
        self.count
    }

    /// Borrow the value for reading.
    pub fn view(&self) -> ValueView<'_> {
        match &self.payload {
            Payload::Floats(data) => ValueView::Floats {
                descriptor: self.descriptor,
                count: self.count,
                data,
            },
            Payload::Ints(data) => ValueView::Ints {
                descriptor: self.descriptor,
                count: self.count,
                data,
            },
            Payload::Strings(entries) => ValueView::Strings {
                descriptor: self.descriptor,
                entries: StringEntries {
                    entries,
                    index: 0,
                },
            },
        }
    }
}

fn instance_count(descriptor: &TypeDescriptor, list_length: usize) -> Result<usize> {
    if descriptor.is_list() {
        return Ok(list_length);
    }
    match list_length {
        0 | 1 => Ok(1),
        n => Err(VrmatError::invalid(format!(
            "list length {n} given for a non-list descriptor"
        ))),
    }
}

fn check_footprint(descriptor: &TypeDescriptor, count: usize, len: usize) -> Result<()> {
    let expected = descriptor
        .footprint(count)
        .ok_or_else(|| VrmatError::invalid("list length overflows the value footprint"))?;
    if expected != len {
        return Err(VrmatError::invalid(format!(
            "expected {expected} scalars ({} per instance × {count}), got {len}",
            descriptor.components()
        )));
    }
    Ok(())
}

// ============================================================================
// VIEWS
// ============================================================================

/// Read-only view of a stored value, valid while the document is borrowed.
#[derive(Clone, Debug)]
pub enum ValueView<'a> {
    Floats {
        descriptor: TypeDescriptor,
        count: usize,
        data: &'a [f32],
    },
    Ints {
        descriptor: TypeDescriptor,
        count: usize,
        data: &'a [i32],
    },
    Strings {
        descriptor: TypeDescriptor,
        entries: StringEntries<'a>,
    },
}

impl<'a> ValueView<'a> {
    pub fn descriptor(&self) -> TypeDescriptor {
        match self {
            Self::Floats { descriptor, .. }
            | Self::Ints { descriptor, .. }
            | Self::Strings { descriptor, .. } => *descriptor,
        }
    }

    /// Number of instances (1 for non-list values).
    pub fn list_count(&self) -> usize {
        match self {
            Self::Floats { count, .. } | Self::Ints { count, .. } => *count,
            Self::Strings { entries, .. } => entries.entries.len(),
        }
    }

    pub fn is_list(&self) -> bool {
        self.descriptor().is_list()
    }

    /// Scalars per instance.
    pub fn components(&self) -> usize {
        self.descriptor().components()
    }

    pub fn as_floats(&self) -> Option<&'a [f32]> {
        match self {
            Self::Floats { data, .. } => Some(*data),
            _ => None,
        }
    }

    pub fn as_ints(&self) -> Option<&'a [i32]> {
        match self {
            Self::Ints { data, .. } => Some(*data),
            _ => None,
        }
    }

    /// Iterator over string entries, restarted from the first entry.
    pub fn strings(&self) -> Option<StringEntries<'a>> {
        match self {
            Self::Strings { entries, .. } => Some(StringEntries {
                entries: entries.entries,
                index: 0,
            }),
            _ => None,
        }
    }
}

/// One entry of a string value.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct StringEntry<'a> {
    /// Position of this entry in the list.
    pub index: usize,
    /// Total number of entries.
    pub count: usize,
    pub value: &'a str,
}

/// Streams the entries of a string value one at a time.
#[derive(Clone, Debug)]
pub struct StringEntries<'a> {
    entries: &'a [Box<str>],
    index: usize,
}

impl<'a> Iterator for StringEntries<'a> {
    type Item = StringEntry<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        let value = self.entries.get(self.index)?;
        let entry = StringEntry {
            index: self.index,
            count: self.entries.len(),
            value,
        };
        self.index += 1;
        Some(entry)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let left = self.entries.len() - self.index;
        (left, Some(left))
    }
}

impl ExactSizeIterator for StringEntries<'_> {}
