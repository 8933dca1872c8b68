//! Opening source PDFs.
//!
//! [`PdfReader`] turns a path into a [`SourcePdf`]: a parsed document plus the
//! ordered list of its page objects. Everything the concatenation needs to
//! know about a source (page geometry, bookmarks, whether it carries a form)
//! is answered from that in-memory document.
//!
//! # Examples
//!
//! ```no_run
//! use pdfconcat::engine::SourceDocument;
//! use pdfconcat::io::{PdfReader, SourceId};
//! use std::path::Path;
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let reader = PdfReader::new();
//! let source = reader.load(Path::new("document.pdf"), SourceId::default())?;
//! println!("{} has {} pages", source.path().display(), source.page_count());
//! # Ok(())
//! # }
//! ```

use std::path::{Path, PathBuf};
use std::time::Instant;

use lopdf::{Document, Object, ObjectId};

use super::{MAX_TREE_DEPTH, destinations, outlines, rectangle, resolve, resolve_dict};
use crate::engine::{DEFAULT_MEDIA_BOX, PageGeometry, SourceDocument};
use crate::error::{ConcatError, Result};
use crate::outline::Bookmark;

/// Page attributes a page may inherit from its ancestors in the page tree.
pub(crate) const INHERITABLE_ATTRIBUTES: [&[u8]; 4] = [b"Resources", b"MediaBox", b"CropBox", b"Rotate"];

/// Identity of one opened source within an engine.
///
/// Opening the same file twice yields two different ids, so each occurrence
/// is imported independently.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct SourceId(pub(crate) usize);

/// A loaded source document.
#[derive(Debug)]
pub struct SourcePdf {
    id: SourceId,
    path: PathBuf,
    document: Document,
    page_ids: Vec<ObjectId>,
    file_size: u64,
}

impl SourcePdf {
    /// Identity assigned when the document was opened.
    pub fn id(&self) -> SourceId {
        self.id
    }

    /// The parsed document.
    pub fn document(&self) -> &Document {
        &self.document
    }

    /// Page objects in page order.
    pub fn page_ids(&self) -> &[ObjectId] {
        &self.page_ids
    }

    /// Object id of the 1-based `page`.
    pub fn page_id(&self, page: u32) -> Option<ObjectId> {
        let index = usize::try_from(page.checked_sub(1)?).ok()?;
        self.page_ids.get(index).copied()
    }

    /// Size of the file on disk in bytes.
    pub fn file_size(&self) -> u64 {
        self.file_size
    }

    /// PDF header version, e.g. `"1.7"`.
    pub fn version(&self) -> &str {
        &self.document.version
    }

    /// Look up `key` on the page, then on its ancestors.
    pub(crate) fn inherited_attribute(&self, page_id: ObjectId, key: &[u8]) -> Option<&Object> {
        let mut node = self.document.get_dictionary(page_id).ok()?;
        for _ in 0..MAX_TREE_DEPTH {
            if let Ok(value) = node.get(key) {
                return Some(value);
            }
            let parent = node.get(b"Parent").and_then(Object::as_reference).ok()?;
            node = self.document.get_dictionary(parent).ok()?;
        }
        None
    }

    fn missing_page(&self, page: u32) -> ConcatError {
        ConcatError::page_import(
            &self.path,
            page,
            format!("document has {} pages", self.page_ids.len()),
        )
    }
}

impl SourceDocument for SourcePdf {
    fn path(&self) -> &Path {
        &self.path
    }

    fn page_count(&self) -> u32 {
        u32::try_from(self.page_ids.len()).unwrap_or(u32::MAX)
    }

    fn page_geometry(&self, page: u32) -> Result<PageGeometry> {
        let page_id = self.page_id(page).ok_or_else(|| self.missing_page(page))?;

        let media_box = self
            .inherited_attribute(page_id, b"MediaBox")
            .and_then(|value| rectangle(&self.document, value))
            .unwrap_or(DEFAULT_MEDIA_BOX);
        let rotation = self
            .inherited_attribute(page_id, b"Rotate")
            .and_then(|value| resolve(&self.document, value))
            .and_then(|value| {
                value
                    .as_i64()
                    .ok()
                    .or_else(|| value.as_float().ok().map(|degrees| degrees as i64))
            })
            .unwrap_or(0);

        Ok(PageGeometry::new(media_box, rotation))
    }

    fn consolidate_named_destinations(&mut self) -> Result<usize> {
        let rewritten = destinations::consolidate(&mut self.document, &self.page_ids);
        if rewritten > 0 {
            tracing::debug!(
                path = %self.path.display(),
                rewritten,
                "resolved named destinations"
            );
        }
        Ok(rewritten)
    }

    fn bookmarks(&self) -> Result<Vec<Bookmark>> {
        outlines::read_outlines(&self.document, &self.page_ids)
            .map_err(|err| ConcatError::outline(&self.path, err.to_string()))
    }

    fn has_form(&self) -> bool {
        self.document
            .catalog()
            .ok()
            .and_then(|catalog| catalog.get(b"AcroForm").ok())
            .and_then(|form| resolve_dict(&self.document, form))
            .is_some()
    }
}

/// Loader for source documents.
#[derive(Debug, Clone)]
pub struct PdfReader {
    /// Whether to reject documents without pages.
    verify: bool,
}

impl PdfReader {
    /// Create a new PDF reader with default settings.
    pub fn new() -> Self {
        Self { verify: true }
    }

    /// Create a reader that accepts documents without pages.
    pub fn without_verification() -> Self {
        Self { verify: false }
    }

    /// Load the document at `path`.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - the file cannot be read or is not a valid PDF
    /// - the PDF is encrypted
    /// - the PDF has no pages (unless verification is disabled)
    pub fn load(&self, path: &Path, id: SourceId) -> Result<SourcePdf> {
        let start = Instant::now();

        let document = Document::load(path).map_err(|err| {
            let message = err.to_string();
            let lowered = message.to_lowercase();
            if ["encrypt", "password", "decrypt"]
                .iter()
                .any(|needle| lowered.contains(needle))
            {
                ConcatError::encrypted_input(path)
            } else {
                ConcatError::input_open(path, message)
            }
        })?;

        if document.is_encrypted() {
            return Err(ConcatError::encrypted_input(path));
        }

        let page_ids: Vec<ObjectId> = document.get_pages().into_values().collect();
        if self.verify && page_ids.is_empty() {
            return Err(ConcatError::input_open(path, "PDF has no pages"));
        }

        let file_size = std::fs::metadata(path).map(|m| m.len()).unwrap_or(0);
        let load_time = start.elapsed();

        tracing::debug!(
            path = %path.display(),
            pages = page_ids.len(),
            version = %document.version,
            ?load_time,
            "opened source"
        );

        Ok(SourcePdf {
            id,
            path: path.to_path_buf(),
            document,
            page_ids,
            file_size,
        })
    }
}

impl Default for PdfReader {
    fn default() -> Self {
        Self::new()
    }
}
