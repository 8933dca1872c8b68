//! lopdf-backed implementation of the engine contract.
//!
//! - [`reader`]: opening sources and answering page/bookmark/form queries
//! - [`writer`]: assembling and atomically writing the output document
//! - `destinations`: named destination consolidation
//! - `outlines`: translating between `/Outlines` trees and [`Bookmark`](crate::outline::Bookmark)s
//! - `import`: copying object graphs between documents

mod destinations;
mod import;
mod outlines;
pub mod reader;
pub mod writer;

pub use reader::{PdfReader, SourceId, SourcePdf};
pub use writer::{OutputPdf, WriteOptions};

use std::path::Path;

use lopdf::{Dictionary, Document, Object};

use crate::engine::{PageGeometry, PdfEngine};
use crate::error::Result;

/// Maximum nesting followed when walking page trees, outlines and name trees.
pub(crate) const MAX_TREE_DEPTH: usize = 64;

/// [`PdfEngine`] built on `lopdf`.
#[derive(Debug, Clone, Default)]
pub struct LopdfEngine {
    reader: PdfReader,
    options: WriteOptions,
    next_source: usize,
}

impl LopdfEngine {
    /// Create an engine writing with `options`.
    pub fn new(options: WriteOptions) -> Self {
        Self {
            reader: PdfReader::new(),
            options,
            next_source: 0,
        }
    }
}

impl PdfEngine for LopdfEngine {
    type Source = SourcePdf;
    type Output = OutputPdf;

    fn open_reader(&mut self, path: &Path) -> Result<SourcePdf> {
        let id = SourceId(self.next_source);
        self.next_source += 1;
        self.reader.load(path, id)
    }

    fn create_writer(&mut self, path: &Path, geometry: PageGeometry) -> Result<OutputPdf> {
        OutputPdf::create(path, geometry, self.options.clone())
    }
}

/// Follow `object` if it is a reference.
pub(crate) fn resolve<'a>(doc: &'a Document, object: &'a Object) -> Option<&'a Object> {
    doc.dereference(object).ok().map(|(_, resolved)| resolved)
}

pub(crate) fn resolve_dict<'a>(doc: &'a Document, object: &'a Object) -> Option<&'a Dictionary> {
    resolve(doc, object).and_then(|resolved| resolved.as_dict().ok())
}

pub(crate) fn resolve_array<'a>(doc: &'a Document, object: &'a Object) -> Option<&'a Vec<Object>> {
    resolve(doc, object).and_then(|resolved| resolved.as_array().ok())
}

pub(crate) fn name_of(object: &Object) -> Option<&[u8]> {
    match object {
        Object::Name(name) => Some(name.as_slice()),
        _ => None,
    }
}

pub(crate) fn string_bytes(object: &Object) -> Option<&[u8]> {
    match object {
        Object::String(bytes, _) => Some(bytes.as_slice()),
        _ => None,
    }
}

/// Read a `[llx lly urx ury]` rectangle.
pub(crate) fn rectangle(doc: &Document, object: &Object) -> Option<[f32; 4]> {
    let items = resolve_array(doc, object)?;
    if items.len() != 4 {
        return None;
    }

    let mut rect = [0.0; 4];
    for (slot, item) in rect.iter_mut().zip(items) {
        *slot = resolve(doc, item)?.as_float().ok()?;
    }
    Some(rect)
}

pub(crate) fn rectangle_object(rect: [f32; 4]) -> Object {
    Object::Array(rect.iter().map(|value| Object::Real(*value)).collect())
}
