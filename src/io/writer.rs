//! Assembling and writing the output document.
//!
//! [`OutputPdf`] owns the document being built. Pages are appended to a
//! single flat page tree; forms and outlines are attached to its catalog.
//! Nothing touches the destination until [`close`](OutputDocument::close):
//! the document is serialized into a temporary file next to the destination
//! and renamed over it, so a failed run never leaves a truncated file behind.
//!
//! # Examples
//!
//! ```no_run
//! use pdfconcat::engine::{OutputDocument, PageGeometry};
//! use pdfconcat::io::{OutputPdf, WriteOptions};
//! use std::path::Path;
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let output = OutputPdf::create(
//!     Path::new("output.pdf"),
//!     PageGeometry::default(),
//!     WriteOptions::default(),
//! )?;
//! let stats = output.close()?;
//! println!("Wrote {} bytes in {:?}", stats.file_size, stats.write_time);
//! # Ok(())
//! # }
//! ```

use std::fs;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::time::Instant;

use lopdf::{Dictionary, Document, Object, ObjectId};

use super::import::ImportSession;
use super::outlines::OutlineWriter;
use super::reader::INHERITABLE_ATTRIBUTES;
use super::{SourcePdf, rectangle_object};
use crate::config::CompressionLevel;
use crate::engine::{DEFAULT_MEDIA_BOX, OutputDocument, PageGeometry, SourceDocument, WriteStatistics};
use crate::error::{ConcatError, Result};
use crate::outline::Bookmark;

/// Options for writing PDF files.
#[derive(Debug, Clone)]
pub struct WriteOptions {
    /// Use atomic writes (write to temp file, then rename).
    pub atomic: bool,

    /// How hard to compress the output.
    pub compression: CompressionLevel,

    /// Buffer size for writing (in bytes).
    pub buffer_size: usize,
}

impl Default for WriteOptions {
    fn default() -> Self {
        Self {
            atomic: true,
            compression: CompressionLevel::Standard,
            buffer_size: 8192,
        }
    }
}

/// The document being assembled.
#[derive(Debug)]
pub struct OutputPdf {
    document: Document,
    path: PathBuf,
    pages_id: ObjectId,
    page_ids: Vec<ObjectId>,
    session: Option<ImportSession>,
    form_source: Option<PathBuf>,
    options: WriteOptions,
}

impl OutputPdf {
    /// Create an empty document bound to `path`.
    ///
    /// Missing parent directories are created right away; the file itself is
    /// only written by [`close`](OutputDocument::close).
    pub fn create(path: &Path, geometry: PageGeometry, options: WriteOptions) -> Result<Self> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| ConcatError::output_write(path, e))?;
        }
        if path.is_dir() {
            return Err(ConcatError::output_write(
                path,
                std::io::Error::other("destination is a directory"),
            ));
        }

        let mut document = Document::with_version("1.4");
        let pages_id = document.new_object_id();
        let mut pages = Dictionary::new();
        pages.set("Type", Object::Name(b"Pages".to_vec()));
        pages.set("Kids", Object::Array(Vec::new()));
        pages.set("Count", Object::Integer(0));
        pages.set("MediaBox", rectangle_object(geometry.media_box));
        document.objects.insert(pages_id, Object::Dictionary(pages));

        let mut catalog = Dictionary::new();
        catalog.set("Type", Object::Name(b"Catalog".to_vec()));
        catalog.set("Pages", Object::Reference(pages_id));
        let catalog_id = document.add_object(catalog);
        document.trailer.set("Root", Object::Reference(catalog_id));

        tracing::debug!(
            path = %path.display(),
            width = geometry.width(),
            height = geometry.height(),
            rotation = geometry.rotation,
            "created output document"
        );

        Ok(Self {
            document,
            path: path.to_path_buf(),
            pages_id,
            page_ids: Vec::new(),
            session: None,
            form_source: None,
            options,
        })
    }

    /// Destination path.
    pub fn path(&self) -> &Path {
        &self.path
    }


    /// Source whose form is currently attached, if any.
    pub fn form_source(&self) -> Option<&Path> {
        self.form_source.as_deref()
    }

    /// The document as assembled so far.
    pub fn document(&self) -> &Document {
        &self.document
    }

    /// Reuse the session of `source` or start a new one.
    fn take_session(&mut self, source: &SourcePdf) -> ImportSession {
        match self.session.take() {
            Some(session) if session.source() == source.id() => session,
            _ => ImportSession::begin(source, &mut self.document),
        }
    }

    /// Appends a page reference to the page tree root.
    fn append_to_page_tree(&mut self, page_id: ObjectId) -> Result<()> {
        let pages = self.document.get_object_mut(self.pages_id)?.as_dict_mut()?;
        pages
            .get_mut(b"Kids")?
            .as_array_mut()?
            .push(Object::Reference(page_id));
        let count = pages.get(b"Count")?.as_i64()?;
        pages.set("Count", Object::Integer(count + 1));
        Ok(())
    }

    fn raise_version(&mut self, version: &str) {
        if parse_version(version) > parse_version(&self.document.version) {
            self.document.version = version.to_string();
        }
    }

    fn write_atomic(&mut self) -> Result<()> {
        let dir = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        let mut temp = tempfile::Builder::new()
            .prefix(".concat-")
            .suffix(".pdf.tmp")
            .tempfile_in(dir)
            .map_err(|e| ConcatError::output_write(&self.path, e))?;

        {
            let mut writer = BufWriter::with_capacity(self.options.buffer_size, temp.as_file_mut());
            self.document
                .save_to(&mut writer)
                .map_err(|e| ConcatError::output_write(&self.path, std::io::Error::other(e)))?;
            writer
                .flush()
                .map_err(|e| ConcatError::output_write(&self.path, e))?;
        }

        temp.persist(&self.path)
            .map_err(|e| ConcatError::output_write(&self.path, e.error))?;
        Ok(())
    }

    fn write_direct(&mut self) -> Result<()> {
        let file = fs::File::create(&self.path).map_err(|e| ConcatError::output_write(&self.path, e))?;
        let mut writer = BufWriter::with_capacity(self.options.buffer_size, file);
        self.document
            .save_to(&mut writer)
            .map_err(|e| ConcatError::output_write(&self.path, std::io::Error::other(e)))?;
        writer
            .flush()
            .map_err(|e| ConcatError::output_write(&self.path, e))
    }
}

impl OutputDocument for OutputPdf {
    type Source = SourcePdf;

    fn import_page(&mut self, source: &SourcePdf, page: u32) -> Result<()> {
        let page_id = source.page_id(page).ok_or_else(|| {
            ConcatError::page_import(
                source.path(),
                page,
                format!("document has {} pages", source.page_count()),
            )
        })?;
        let mut page_dict = source
            .document()
            .get_dictionary(page_id)
            .map_err(|e| ConcatError::page_import(source.path(), page, e.to_string()))?
            .clone();

        // Imported pages hang directly off the output root, so anything they
        // inherited from intermediate nodes must be copied onto the page.
        for key in INHERITABLE_ATTRIBUTES {
            if !page_dict.has(key)
                && let Some(value) = source.inherited_attribute(page_id, key)
            {
                page_dict.set(key.to_vec(), value.clone());
            }
        }
        if !page_dict.has(b"MediaBox") {
            page_dict.set("MediaBox", rectangle_object(DEFAULT_MEDIA_BOX));
        }
        page_dict.remove(b"Parent");
        // Article beads point into the source's thread list, which is not copied.
        page_dict.remove(b"B");

        let mut session = self.take_session(source);
        if !session.mark_imported(page) {
            self.session = Some(session);
            return Err(ConcatError::page_import(
                source.path(),
                page,
                "page was already imported from this source",
            ));
        }
        let Some(target_id) = session.mapped(page_id) else {
            self.session = Some(session);
            return Err(ConcatError::page_import(
                source.path(),
                page,
                "page has no reserved object id",
            ));
        };

        let mut copied = session
            .copier(source.document(), &mut self.document, self.pages_id)
            .copy_dictionary(&page_dict);
        self.session = Some(session);

        copied.set("Parent", Object::Reference(self.pages_id));
        self.document.objects.insert(target_id, Object::Dictionary(copied));
        self.append_to_page_tree(target_id)?;
        self.page_ids.push(target_id);
        self.raise_version(source.version());

        Ok(())
    }

    fn copy_form(&mut self, source: &SourcePdf) -> Result<()> {
        let form = source
            .document()
            .catalog()
            .ok()
            .and_then(|catalog| catalog.get(b"AcroForm").ok())
            .cloned()
            .ok_or_else(|| ConcatError::form_copy(source.path(), "document has no form"))?;

        let mut session = self.take_session(source);
        let copied = session
            .copier(source.document(), &mut self.document, self.pages_id)
            .copy_object(&form);
        self.session = Some(session);

        let form_id = match copied {
            Object::Reference(id) => id,
            Object::Dictionary(_) => self.document.add_object(copied),
            _ => {
                return Err(ConcatError::form_copy(
                    source.path(),
                    "AcroForm is not a dictionary",
                ));
            }
        };
        if self.document.get_dictionary(form_id).is_err() {
            return Err(ConcatError::form_copy(
                source.path(),
                "AcroForm does not resolve to a dictionary",
            ));
        }

        if let Some(previous) = self.form_source.replace(source.path().to_path_buf()) {
            tracing::warn!(
                previous = %previous.display(),
                replacement = %source.path().display(),
                "replacing form copied from an earlier source"
            );
        }
        self.document
            .catalog_mut()?
            .set("AcroForm", Object::Reference(form_id));

        Ok(())
    }

    fn set_outlines(&mut self, bookmarks: &[Bookmark]) -> Result<()> {
        if bookmarks.is_empty() {
            self.document.catalog_mut()?.remove(b"Outlines");
            return Ok(());
        }

        let (root_id, dropped) = OutlineWriter::new(&mut self.document, &self.page_ids).write(bookmarks);
        if dropped > 0 {
            tracing::warn!(dropped, "some bookmarks lost their destination");
        }
        self.document
            .catalog_mut()?
            .set("Outlines", Object::Reference(root_id));

        Ok(())
    }

    fn page_count(&self) -> u32 {
        u32::try_from(self.page_ids.len()).unwrap_or(u32::MAX)
    }

    fn close(mut self) -> Result<WriteStatistics> {
        let start = Instant::now();

        let compressed = match self.options.compression {
            CompressionLevel::None => false,
            CompressionLevel::Standard => {
                self.document.compress();
                true
            }
            CompressionLevel::Maximum => {
                self.document.prune_objects();
                self.document.renumber_objects();
                self.document.compress();
                true
            }
        };

        if self.options.atomic {
            self.write_atomic()?;
        } else {
            self.write_direct()?;
        }

        let write_time = start.elapsed();
        let file_size = fs::metadata(&self.path).map(|m| m.len()).unwrap_or(0);

        tracing::info!(
            path = %self.path.display(),
            pages = self.page_ids.len(),
            file_size,
            ?write_time,
            "wrote output"
        );

        Ok(WriteStatistics {
            pages: self.page_count(),
            output_path: self.path,
            file_size,
            write_time,
            compressed,
        })
    }
}

fn parse_version(version: &str) -> (u32, u32) {
    let mut parts = version.trim().split('.').map(|part| part.parse().unwrap_or(0));
    (parts.next().unwrap_or(0), parts.next().unwrap_or(0))
}
