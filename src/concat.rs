//! Concatenation of several PDF documents into one.
//!
//! The run is a left fold over the sources, in order. The accumulator holds
//! the number of pages already appended, the merged bookmark list and the
//! output document, which is created lazily once the first source is open
//! (its first page supplies the default page geometry). Each step:
//!
//! 1. opens the source and resolves its named destinations,
//! 2. reads its bookmarks and shifts them by the page offset,
//! 3. imports every page in order,
//! 4. copies its form, if any (the last source with a form wins),
//! 5. releases the source before the next one is opened.
//!
//! After the fold the merged bookmarks are attached, but only when there
//! are any, and the output is closed.

use std::path::{Path, PathBuf};
use std::time::Instant;

use serde::Serialize;
use tracing::{debug, info};

use crate::engine::{OutputDocument, PdfEngine, SourceDocument};
use crate::error::{ConcatError, Result};
use crate::outline::{self, Bookmark};
use crate::output::OutputFormatter;

/// What to carry over besides pages.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConcatOptions {
    /// Carry bookmarks over.
    pub outlines: bool,
    /// Carry interactive forms over.
    pub forms: bool,
}

impl Default for ConcatOptions {
    fn default() -> Self {
        Self {
            outlines: true,
            forms: true,
        }
    }
}

/// Per-source part of a [`ConcatReport`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FileSummary {
    /// Source path.
    pub path: PathBuf,
    /// Pages contributed.
    pub pages: u32,
    /// Output page number of the first page of this source.
    pub first_page: u32,
    /// Bookmarks contributed, children included.
    pub bookmarks: usize,
    /// Named destination references that were resolved.
    pub named_destinations: usize,
    /// Whether the source carries a form.
    pub has_form: bool,
}

/// Outcome of a run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConcatReport {
    /// Destination path.
    pub output: PathBuf,
    /// Sources in concatenation order.
    pub files: Vec<FileSummary>,
    /// Pages in the output.
    pub total_pages: u32,
    /// Bookmarks in the output, children included.
    pub bookmarks: usize,
    /// Source whose form ended up in the output.
    pub form_source: Option<PathBuf>,
    /// Size of the written file; 0 for a dry run.
    pub output_size: u64,
    /// Whether the destination was left untouched.
    pub dry_run: bool,
    /// Wall-clock duration of the run in milliseconds.
    pub elapsed_ms: u64,
}

/// Fold accumulator.
struct ConcatState<O> {
    page_offset: u32,
    bookmarks: Vec<Bookmark>,
    output: Option<O>,
    files: Vec<FileSummary>,
    form_source: Option<PathBuf>,
}

impl<O> ConcatState<O> {
    fn new() -> Self {
        Self {
            page_offset: 0,
            bookmarks: Vec::new(),
            output: None,
            files: Vec::new(),
            form_source: None,
        }
    }
}

/// Drives a [`PdfEngine`] through a concatenation.
///
/// # Examples
///
/// ```no_run
/// use pdfconcat::concat::Concatenator;
/// use pdfconcat::io::LopdfEngine;
/// use std::path::{Path, PathBuf};
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let mut concatenator = Concatenator::new(LopdfEngine::default());
/// let report = concatenator.concatenate(
///     Path::new("book.pdf"),
///     &[PathBuf::from("a.pdf"), PathBuf::from("b.pdf")],
/// )?;
/// println!("{} pages", report.total_pages);
/// # Ok(())
/// # }
/// ```
pub struct Concatenator<E> {
    engine: E,
    options: ConcatOptions,
    formatter: OutputFormatter,
}

impl<E: PdfEngine> Concatenator<E> {
    /// Create a concatenator with default options and no progress output.
    pub fn new(engine: E) -> Self {
        Self {
            engine,
            options: ConcatOptions::default(),
            formatter: OutputFormatter::quiet(),
        }
    }

    /// Set what is carried over besides pages.
    pub fn with_options(mut self, options: ConcatOptions) -> Self {
        self.options = options;
        self
    }

    /// Report progress through `formatter`.
    pub fn with_formatter(mut self, formatter: OutputFormatter) -> Self {
        self.formatter = formatter;
        self
    }

    /// Concatenate `inputs` into `output`.
    ///
    /// Every input is preflighted before the output is created; the first
    /// failure aborts the run and nothing is written.
    ///
    /// # Errors
    ///
    /// Returns [`ConcatError::Usage`] for an empty input list, otherwise the
    /// first error raised by the engine.
    #[tracing::instrument(skip_all, fields(output = %output.display(), inputs = inputs.len()))]
    pub fn concatenate(&mut self, output: &Path, inputs: &[PathBuf]) -> Result<ConcatReport> {
        let start = Instant::now();
        self.preflight(inputs)?;

        let total = inputs.len();
        let state = inputs
            .iter()
            .enumerate()
            .try_fold(ConcatState::new(), |state, (index, path)| {
                self.append_source(state, output, index + 1, total, path)
            })?;

        self.finish(state, output, start)
    }

    /// Open every input and report what [`concatenate`](Self::concatenate)
    /// would produce, without creating the output.
    #[tracing::instrument(skip_all, fields(output = %output.display(), inputs = inputs.len()))]
    pub fn plan(&mut self, output: &Path, inputs: &[PathBuf]) -> Result<ConcatReport> {
        let start = Instant::now();
        self.preflight(inputs)?;

        let total = inputs.len();
        let mut state: ConcatState<E::Output> = ConcatState::new();
        for (index, path) in inputs.iter().enumerate() {
            let (_source, summary, bookmarks) = self.inspect(path, state.page_offset, index + 1, total)?;
            if summary.has_form && self.options.forms {
                state.form_source = Some(summary.path.clone());
            }
            state.page_offset += summary.pages;
            state.bookmarks.extend(bookmarks);
            state.files.push(summary);
        }

        Ok(ConcatReport {
            output: output.to_path_buf(),
            files: state.files,
            total_pages: state.page_offset,
            bookmarks: outline::count(&state.bookmarks),
            form_source: state.form_source,
            output_size: 0,
            dry_run: true,
            elapsed_ms: elapsed_ms(start),
        })
    }

    fn preflight(&self, inputs: &[PathBuf]) -> Result<()> {
        if inputs.is_empty() {
            return Err(ConcatError::Usage);
        }
        inputs.iter().try_for_each(|path| self.engine.preflight(path))
    }

    /// Open `path` and gather what the fold needs from it, with bookmarks
    /// already in output numbering.
    fn inspect(
        &mut self,
        path: &Path,
        page_offset: u32,
        index: usize,
        total: usize,
    ) -> Result<(E::Source, FileSummary, Vec<Bookmark>)> {
        let mut source = self.engine.open_reader(path)?;
        let named_destinations = source.consolidate_named_destinations()?;
        let pages = source.page_count();
        info!("There are {pages} pages in {}", path.display());
        self.formatter.file_opened(index, total, path, pages);

        let mut bookmarks = if self.options.outlines {
            source.bookmarks()?
        } else {
            Vec::new()
        };
        outline::shift_page_numbers(&mut bookmarks, page_offset);

        let summary = FileSummary {
            path: path.to_path_buf(),
            pages,
            first_page: page_offset + 1,
            bookmarks: outline::count(&bookmarks),
            named_destinations,
            has_form: source.has_form(),
        };

        if self.formatter.is_verbose() {
            let geometry = source.page_geometry(1)?;
            self.formatter.detail(
                "first page",
                &format!(
                    "{} x {} pt, rotated {}",
                    geometry.width(),
                    geometry.height(),
                    geometry.rotation
                ),
            );
            self.formatter.detail("bookmarks", &summary.bookmarks.to_string());
            self.formatter.detail("form", if summary.has_form { "yes" } else { "no" });
        }

        Ok((source, summary, bookmarks))
    }

    fn append_source(
        &mut self,
        mut state: ConcatState<E::Output>,
        output: &Path,
        index: usize,
        total: usize,
        path: &Path,
    ) -> Result<ConcatState<E::Output>> {
        let (source, summary, bookmarks) = self.inspect(path, state.page_offset, index, total)?;
        state.bookmarks.extend(bookmarks);

        let mut writer = match state.output.take() {
            Some(writer) => writer,
            None => {
                let geometry = source.page_geometry(1)?;
                debug!(?geometry, "creating output from first page of {}", path.display());
                self.engine.create_writer(output, geometry)?
            }
        };

        for page in 1..=summary.pages {
            writer.import_page(&source, page)?;
            debug!("Processed page {page}");
        }

        if summary.has_form && self.options.forms {
            writer.copy_form(&source)?;
            state.form_source = Some(path.to_path_buf());
        }

        state.page_offset += summary.pages;
        state.files.push(summary);
        state.output = Some(writer);
        Ok(state)
    }

    fn finish(&mut self, state: ConcatState<E::Output>, output: &Path, start: Instant) -> Result<ConcatReport> {
        let ConcatState {
            page_offset,
            bookmarks,
            output: writer,
            files,
            form_source,
        } = state;
        let Some(mut writer) = writer else {
            return Err(ConcatError::Usage);
        };

        if !bookmarks.is_empty() {
            writer.set_outlines(&bookmarks)?;
        }
        debug_assert_eq!(writer.page_count(), page_offset);

        let stats = writer.close()?;
        debug!(
            output = %output.display(),
            pages = stats.pages,
            file_size = stats.file_size,
            "output closed"
        );

        Ok(ConcatReport {
            output: stats.output_path,
            files,
            total_pages: page_offset,
            bookmarks: outline::count(&bookmarks),
            form_source,
            output_size: stats.file_size,
            dry_run: false,
            elapsed_ms: elapsed_ms(start),
        })
    }
}

fn elapsed_ms(start: Instant) -> u64 {
    u64::try_from(start.elapsed().as_millis()).unwrap_or(u64::MAX)
}
