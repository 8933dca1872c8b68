//! Engine-neutral bookmark (outline) tree.
//!
//! Bookmarks are read from every source as a list of [`Bookmark`] trees whose
//! page targets use the source's own 1-based page numbering. Before they are
//! appended to the merged list, [`shift_page_numbers`] moves those targets
//! into output page numbering.

use serde::{Deserialize, Serialize};

/// How a destination page is framed when the bookmark is followed.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Fit {
    /// `/XYZ left top zoom`; `None` keeps the viewer's current value.
    Xyz {
        /// Left edge in user space.
        left: Option<f32>,
        /// Top edge in user space.
        top: Option<f32>,
        /// Zoom factor.
        zoom: Option<f32>,
    },
    /// `/Fit`: whole page in the window.
    #[default]
    Fit,
    /// `/FitH top`.
    FitH {
        /// Top edge in user space.
        top: Option<f32>,
    },
    /// `/FitV left`.
    FitV {
        /// Left edge in user space.
        left: Option<f32>,
    },
    /// `/FitR left bottom right top`.
    FitR {
        /// Left edge.
        left: f32,
        /// Bottom edge.
        bottom: f32,
        /// Right edge.
        right: f32,
        /// Top edge.
        top: f32,
    },
    /// `/FitB`: bounding box of the page contents.
    FitB,
    /// `/FitBH top`.
    FitBH {
        /// Top edge in user space.
        top: Option<f32>,
    },
    /// `/FitBV left`.
    FitBV {
        /// Left edge in user space.
        left: Option<f32>,
    },
}

/// A page inside the document a bookmark belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PageTarget {
    /// 1-based page number.
    pub page: u32,
    /// View applied when jumping to the page.
    pub fit: Fit,
}

impl PageTarget {
    /// Target the given page, fitted to the window.
    pub fn new(page: u32) -> Self {
        Self {
            page,
            fit: Fit::Fit,
        }
    }
}

/// Where a `GoToR` action lands inside the other document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RemoteDestination {
    /// A page of the other document, 1-based.
    Page(PageTarget),
    /// A named destination of the other document.
    Named(String),
}

/// What happens when a bookmark is activated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Action {
    /// Jump to a page of this document.
    GoTo(PageTarget),
    /// Open an external URI.
    Uri(String),
    /// Jump into another PDF file. Its page numbers belong to that file and
    /// are never renumbered.
    GoToRemote {
        /// File specification of the other document.
        file: String,
        /// Target inside the other document.
        destination: RemoteDestination,
        /// `/NewWindow`, when the entry sets it.
        new_window: Option<bool>,
    },
    /// Launch an application or open a file.
    Launch {
        /// File specification to launch.
        file: String,
        /// `/NewWindow`, when the entry sets it.
        new_window: Option<bool>,
    },
    /// Viewer-defined action such as `NextPage` or `LastPage`.
    Named(String),
}

/// Text style flags of an outline entry (`/F`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct BookmarkStyle {
    /// Render the title in italics.
    pub italic: bool,
    /// Render the title in bold.
    pub bold: bool,
}

impl BookmarkStyle {
    /// Decode the `/F` flag word.
    pub fn from_flags(flags: i64) -> Self {
        Self {
            italic: flags & 1 != 0,
            bold: flags & 2 != 0,
        }
    }

    /// Encode as an `/F` flag word.
    pub fn flags(&self) -> i64 {
        i64::from(self.italic) | (i64::from(self.bold) << 1)
    }

    /// True when neither flag is set.
    pub fn is_plain(&self) -> bool {
        !self.italic && !self.bold
    }
}

/// One navigation node, possibly with nested children.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bookmark {
    /// Title shown in the viewer.
    pub title: String,
    /// Destination or action; `None` for pure grouping nodes.
    pub action: Option<Action>,
    /// Whether the children are expanded initially.
    pub open: bool,
    /// RGB title colour, components in `0.0..=1.0`.
    pub color: Option<[f32; 3]>,
    /// Title style.
    #[serde(default)]
    pub style: BookmarkStyle,
    /// Nested entries.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<Bookmark>,
}

impl Bookmark {
    /// A closed bookmark without a destination.
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            action: None,
            open: false,
            color: None,
            style: BookmarkStyle::default(),
            children: Vec::new(),
        }
    }

    /// A bookmark jumping to `page`.
    pub fn to_page(title: impl Into<String>, page: u32) -> Self {
        Self {
            action: Some(Action::GoTo(PageTarget::new(page))),
            ..Self::new(title)
        }
    }

    /// Builder-style helper to attach children.
    pub fn with_children(mut self, children: Vec<Bookmark>) -> Self {
        self.children = children;
        self
    }

    /// The page this bookmark points to, if any.
    pub fn page(&self) -> Option<u32> {
        match &self.action {
            Some(Action::GoTo(target)) => Some(target.page),
            _ => None,
        }
    }
}

/// Add `offset` to every page reference in `bookmarks`, children included.
///
/// Entries without a page target (URI actions, grouping nodes) are left as
/// they are.
pub fn shift_page_numbers(bookmarks: &mut [Bookmark], offset: u32) {
    if offset == 0 {
        return;
    }

    for bookmark in bookmarks {
        if let Some(Action::GoTo(target)) = &mut bookmark.action {
            target.page += offset;
        }
        shift_page_numbers(&mut bookmark.children, offset);
    }
}

/// Total number of entries in the forest, children included.
pub fn count(bookmarks: &[Bookmark]) -> usize {
    bookmarks
        .iter()
        .map(|bookmark| 1 + count(&bookmark.children))
        .sum()
}

/// Number of entries a viewer shows when the forest is displayed: every
/// top-level entry plus the visible descendants of open entries.
pub fn visible_count(bookmarks: &[Bookmark]) -> usize {
    bookmarks
        .iter()
        .map(|bookmark| {
            1 + if bookmark.open {
                visible_count(&bookmark.children)
            } else {
                0
            }
        })
        .sum()
}

/// Page targets of the forest in depth-first order.
pub fn page_targets(bookmarks: &[Bookmark]) -> Vec<u32> {
    let mut pages = Vec::new();
    collect_pages(bookmarks, &mut pages);
    pages
}

fn collect_pages(bookmarks: &[Bookmark], pages: &mut Vec<u32>) {
    for bookmark in bookmarks {
        if let Some(page) = bookmark.page() {
            pages.push(page);
        }
        collect_pages(&bookmark.children, pages);
    }
}
