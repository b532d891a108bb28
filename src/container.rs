//! Host-facing entry point: owns one [`Document`] and moves it between memory
//! and files.
//!
//! ## Quick start
//!
//! ```no_run
//! use vrmat::{DataContainer, SchemaVersion};
//!
//! let mut container = DataContainer::new();
//! container.open("material.vrmat".as_ref())?;
//! let doc = container.document_mut();
//! let id = doc.resolve_id(None, "/Mtl")?;
//! doc.remove_element(id)?;
//! container.save("material.vrmat".as_ref(), SchemaVersion::Compact)?;
//! # Ok::<(), vrmat::VrmatError>(())
//! ```

use std::io::Write;
use std::path::Path;

use tempfile::NamedTempFile;
use tracing::debug;

use crate::error::{Result, VrmatError};
use crate::format::{self, FormatOptions};
use crate::model::{Document, SchemaVersion};

/// Owns a document for its whole lifetime; dropping the container releases
/// every plugin, parameter and value in one go.
#[derive(Clone, Debug, Default)]
pub struct DataContainer {
    document: Document,
    options: FormatOptions,
}

impl DataContainer {
    // ── Construction ─────────────────────────────────────────────────

    /// An empty document with default output options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Wrap an already constructed document.
    pub fn from_document(document: Document) -> Self {
        Self {
            document,
            options: FormatOptions::default(),
        }
    }

    pub fn with_options(mut self, options: FormatOptions) -> Self {
        self.options = options;
        self
    }

    // ── Access ───────────────────────────────────────────────────────

    pub fn document(&self) -> &Document {
        &self.document
    }

    pub fn document_mut(&mut self) -> &mut Document {
        &mut self.document
    }

    /// Consume the container and return the document.
    pub fn into_document(self) -> Document {
        self.document
    }

    pub fn options(&self) -> &FormatOptions {
        &self.options
    }

    pub fn set_options(&mut self, options: FormatOptions) {
        self.options = options;
    }

    // ── Load / save ──────────────────────────────────────────────────

    /// Replace the document with the contents of a file.
    ///
    /// The current document is kept if reading or parsing fails. On success
    /// the path is recorded as the document's file path.
    pub fn open(&mut self, path: &Path) -> Result<()> {
        let bytes = std::fs::read(path)?;
        let mut document = format::parse(&bytes)?;
        document.file_path = Some(path.to_path_buf());
        debug!(path = %path.display(), "opened document");
        self.document = document;
        Ok(())
    }

    /// Replace the document by parsing `bytes[..length]`.
    ///
    /// A `length` of 0 reads up to the first NUL byte, or the whole slice if
    /// there is none. The current document is kept if parsing fails.
    pub fn load(&mut self, bytes: &[u8], length: usize) -> Result<()> {
        let input = match length {
            0 => {
                let end = bytes.iter().position(|b| *b == 0).unwrap_or(bytes.len());
                &bytes[..end]
            }
            n => bytes.get(..n).ok_or_else(|| {
                VrmatError::invalid(format!("length {n} exceeds the {} byte buffer", bytes.len()))
            })?,
        };
        self.document = format::parse(input)?;
        Ok(())
    }

    /// Serialize to memory with the container's options.
    pub fn to_bytes(&self, version: SchemaVersion) -> Result<Vec<u8>> {
        format::serialize(&self.document, version, &self.options)
    }

    /// Write the document to `path` in the grammar of `version`.
    ///
    /// The output goes to a temporary file next to `path`, which replaces
    /// `path` only once it is completely written. An existing file is left
    /// untouched on any failure. The document itself is not modified.
    pub fn save(&self, path: &Path, version: SchemaVersion) -> Result<()> {
        let bytes = self.to_bytes(version)?;

        let dir = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        let mut file = NamedTempFile::new_in(dir)?;
        file.write_all(&bytes)?;
        file.as_file().sync_all()?;
        file.persist(path).map_err(|e| e.error)?;

        debug!(path = %path.display(), %version, bytes = bytes.len(), "saved document");
        Ok(())
    }
}
