//! Contract between the concatenation logic and the PDF codec.
//!
//! [`Concatenator`](crate::concat::Concatenator) only talks to these traits.
//! The production implementation is [`LopdfEngine`](crate::io::LopdfEngine);
//! anything else that can open documents, import pages and attach outlines
//! and forms can be plugged in instead.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Serialize;

use crate::error::{ConcatError, Result};
use crate::outline::Bookmark;

/// US Letter, the size assumed when a page declares no media box.
pub const DEFAULT_MEDIA_BOX: [f32; 4] = [0.0, 0.0, 612.0, 792.0];

/// Size and orientation of a page.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PageGeometry {
    /// `[llx lly urx ury]` in points.
    pub media_box: [f32; 4],
    /// Clockwise rotation in degrees, one of 0, 90, 180, 270.
    pub rotation: i64,
}

impl PageGeometry {
    /// Build a geometry, normalizing the rotation into `0..360`.
    pub fn new(media_box: [f32; 4], rotation: i64) -> Self {
        Self {
            media_box,
            rotation: rotation.rem_euclid(360),
        }
    }

    /// Width of the media box in points.
    pub fn width(&self) -> f32 {
        (self.media_box[2] - self.media_box[0]).abs()
    }

    /// Height of the media box in points.
    pub fn height(&self) -> f32 {
        (self.media_box[3] - self.media_box[1]).abs()
    }
}

impl Default for PageGeometry {
    fn default() -> Self {
        Self::new(DEFAULT_MEDIA_BOX, 0)
    }
}

/// Statistics about the finished output file.
#[derive(Debug, Clone)]
pub struct WriteStatistics {
    /// Path where the file was written.
    pub output_path: PathBuf,
    /// Number of pages in the output.
    pub pages: u32,
    /// Size of the written file in bytes.
    pub file_size: u64,
    /// Time taken to serialize and write the file.
    pub write_time: Duration,
    /// Whether stream compression was applied.
    pub compressed: bool,
}

/// An opened source document.
pub trait SourceDocument {
    /// Path the document was opened from.
    fn path(&self) -> &Path;

    /// Number of pages.
    fn page_count(&self) -> u32;

    /// Size and rotation of the 1-based `page`.
    fn page_geometry(&self, page: u32) -> Result<PageGeometry>;

    /// Replace named destinations with direct page references so links and
    /// bookmarks survive the merge. Returns how many references were rewritten.
    fn consolidate_named_destinations(&mut self) -> Result<usize>;

    /// Bookmark trees of the document, using its own page numbering.
    fn bookmarks(&self) -> Result<Vec<Bookmark>>;

    /// Whether the document carries an interactive form.
    fn has_form(&self) -> bool;
}

/// The document being assembled.
pub trait OutputDocument {
    /// Source type pages and forms are imported from.
    type Source: SourceDocument;

    /// Append the 1-based `page` of `source` after the pages already added.
    fn import_page(&mut self, source: &Self::Source, page: u32) -> Result<()>;

    /// Copy the form of `source` into the output, replacing any earlier one.
    fn copy_form(&mut self, source: &Self::Source) -> Result<()>;

    /// Attach `bookmarks` (in output page numbering) as the outline tree.
    fn set_outlines(&mut self, bookmarks: &[Bookmark]) -> Result<()>;

    /// Pages appended so far.
    fn page_count(&self) -> u32;

    /// Flush everything to the destination.
    fn close(self) -> Result<WriteStatistics>;
}

/// Factory for readers and writers.
pub trait PdfEngine {
    /// Reader type.
    type Source: SourceDocument;
    /// Writer type, able to import from [`Self::Source`].
    type Output: OutputDocument<Source = Self::Source>;

    /// Cheap check that `path` can be opened, run for every input before the
    /// output is created.
    fn preflight(&self, path: &Path) -> Result<()> {
        if !path.try_exists()? {
            return Err(ConcatError::input_not_found(path));
        }
        if !path.is_file() {
            return Err(ConcatError::not_a_file(path));
        }
        Ok(())
    }

    /// Open the document at `path`.
    fn open_reader(&mut self, path: &Path) -> Result<Self::Source>;

    /// Create the output bound to `path`, with `geometry` as the default page
    /// geometry.
    fn create_writer(&mut self, path: &Path, geometry: PageGeometry) -> Result<Self::Output>;
}
