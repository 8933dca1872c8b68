//! Shared fixtures for integration tests.
//!
//! PDFs are generated on the fly with `lopdf`. Every page draws a marker
//! string `"<name>-<page>"` so the origin of each output page can be checked.

#![allow(dead_code)]

use std::path::{Path, PathBuf};

use lopdf::{Document, Object, ObjectId, Stream, dictionary};
use pdfconcat::Config;
use pdfconcat::engine::SourceDocument;
use pdfconcat::io::{PdfReader, SourceId};
use pdfconcat::outline::Bookmark;
use tempfile::TempDir;

/// Destination of a fixture bookmark.
enum Target {
    Page(u32),
    Named(String),
}

/// Builder for a small test PDF.
pub struct Fixture {
    name: String,
    pages: u32,
    media_box: [i64; 4],
    rotate: Option<i64>,
    bookmarks: Vec<(String, Target, Vec<(String, u32)>)>,
    named_destinations: Vec<(String, u32)>,
    form_field: Option<String>,
}

impl Fixture {
    /// A fixture with `pages` Letter-sized pages.
    pub fn new(name: &str, pages: u32) -> Self {
        Self {
            name: name.to_string(),
            pages,
            media_box: [0, 0, 612, 792],
            rotate: None,
            bookmarks: Vec::new(),
            named_destinations: Vec::new(),
            form_field: None,
        }
    }

    /// Media box inherited by every page from the page tree root.
    pub fn media_box(mut self, media_box: [i64; 4]) -> Self {
        self.media_box = media_box;
        self
    }

    /// Rotation set directly on the first page.
    pub fn rotate(mut self, degrees: i64) -> Self {
        self.rotate = Some(degrees);
        self
    }

    /// Top-level bookmark to the 1-based `page`.
    pub fn bookmark(mut self, title: &str, page: u32) -> Self {
        self.bookmarks
            .push((title.to_string(), Target::Page(page), Vec::new()));
        self
    }

    /// Top-level bookmark with children, each pointing at a page.
    pub fn bookmark_with_children(mut self, title: &str, page: u32, children: &[(&str, u32)]) -> Self {
        let children = children
            .iter()
            .map(|(title, page)| (title.to_string(), *page))
            .collect();
        self.bookmarks
            .push((title.to_string(), Target::Page(page), children));
        self
    }

    /// Named destination `name` to `page` plus a bookmark using it by name.
    pub fn named_bookmark(mut self, title: &str, name: &str, page: u32) -> Self {
        self.named_destinations.push((name.to_string(), page));
        self.bookmarks
            .push((title.to_string(), Target::Named(name.to_string()), Vec::new()));
        self
    }

    /// Interactive form with one text field.
    pub fn form(mut self, field: &str) -> Self {
        self.form_field = Some(field.to_string());
        self
    }

    /// Write the fixture into `dir`.
    pub fn write(self, dir: &TempDir) -> PathBuf {
        let mut doc = Document::with_version("1.5");
        let pages_id = doc.new_object_id();
        let resources_id = doc.add_object(dictionary! {
            "Font" => dictionary! {
                "F1" => dictionary! { "Type" => "Font", "Subtype" => "Type1", "BaseFont" => "Helvetica" },
            },
        });

        let mut page_ids = Vec::new();
        for page in 1..=self.pages {
            let content = format!("BT /F1 12 Tf 72 720 Td ({}-{page}) Tj ET", self.name);
            let content_id = doc.add_object(Stream::new(dictionary! {}, content.into_bytes()));
            let mut page_dict = dictionary! {
                "Type" => "Page",
                "Parent" => pages_id,
                "Contents" => content_id,
            };
            if page == 1
                && let Some(degrees) = self.rotate
            {
                page_dict.set("Rotate", degrees);
            }
            page_ids.push(doc.add_object(page_dict));
        }

        let kids: Vec<Object> = page_ids.iter().map(|&id| id.into()).collect();
        let media_box: Vec<Object> = self.media_box.iter().map(|&v| v.into()).collect();
        doc.objects.insert(
            pages_id,
            Object::Dictionary(dictionary! {
                "Type" => "Pages",
                "Kids" => kids,
                "Count" => self.pages as i64,
                "Resources" => resources_id,
                "MediaBox" => media_box,
            }),
        );

        let mut catalog = dictionary! { "Type" => "Catalog", "Pages" => pages_id };

        if !self.named_destinations.is_empty() {
            let mut pairs = Vec::new();
            for (name, page) in &self.named_destinations {
                pairs.push(Object::string_literal(name.as_str()));
                pairs.push(fit_destination(page_ids[*page as usize - 1]));
            }
            catalog.set(
                "Names",
                dictionary! { "Dests" => dictionary! { "Names" => pairs } },
            );
        }

        if !self.bookmarks.is_empty() {
            let outlines_id = write_outlines(&mut doc, &page_ids, &self.bookmarks);
            catalog.set("Outlines", outlines_id);
        }

        if let Some(field) = &self.form_field {
            let field_id = doc.add_object(dictionary! {
                "FT" => "Tx",
                "T" => Object::string_literal(field.as_str()),
            });
            let form_id = doc.add_object(dictionary! { "Fields" => vec![field_id.into()] });
            catalog.set("AcroForm", form_id);
        }

        let catalog_id = doc.add_object(catalog);
        doc.trailer.set("Root", catalog_id);

        let path = dir.path().join(&self.name);
        doc.save(&path).unwrap();
        path
    }
}

fn fit_destination(page_id: ObjectId) -> Object {
    Object::Array(vec![page_id.into(), "Fit".into()])
}

fn write_outlines(
    doc: &mut Document,
    page_ids: &[ObjectId],
    bookmarks: &[(String, Target, Vec<(String, u32)>)],
) -> ObjectId {
    let outlines_id = doc.new_object_id();
    let item_ids: Vec<ObjectId> = bookmarks.iter().map(|_| doc.new_object_id()).collect();

    for (index, (title, target, children)) in bookmarks.iter().enumerate() {
        let dest = match target {
            Target::Page(page) => fit_destination(page_ids[*page as usize - 1]),
            Target::Named(name) => Object::string_literal(name.as_str()),
        };
        let mut item = dictionary! {
            "Title" => Object::string_literal(title.as_str()),
            "Parent" => outlines_id,
            "Dest" => dest,
        };
        if index > 0 {
            item.set("Prev", item_ids[index - 1]);
        }
        if index + 1 < item_ids.len() {
            item.set("Next", item_ids[index + 1]);
        }

        if !children.is_empty() {
            let child_ids: Vec<ObjectId> = children.iter().map(|_| doc.new_object_id()).collect();
            for (child_index, (child_title, page)) in children.iter().enumerate() {
                let mut child = dictionary! {
                    "Title" => Object::string_literal(child_title.as_str()),
                    "Parent" => item_ids[index],
                    "Dest" => fit_destination(page_ids[*page as usize - 1]),
                };
                if child_index > 0 {
                    child.set("Prev", child_ids[child_index - 1]);
                }
                if child_index + 1 < child_ids.len() {
                    child.set("Next", child_ids[child_index + 1]);
                }
                doc.objects
                    .insert(child_ids[child_index], Object::Dictionary(child));
            }
            item.set("First", child_ids[0]);
            item.set("Last", child_ids[child_ids.len() - 1]);
            item.set("Count", child_ids.len() as i64);
        }

        doc.objects.insert(item_ids[index], Object::Dictionary(item));
    }

    doc.objects.insert(
        outlines_id,
        Object::Dictionary(dictionary! {
            "Type" => "Outlines",
            "First" => item_ids[0],
            "Last" => item_ids[item_ids.len() - 1],
            "Count" => item_ids.len() as i64,
        }),
    );
    outlines_id
}

/// A quiet configuration writing `output` from `inputs`.
pub fn config(output: &Path, inputs: &[&PathBuf]) -> Config {
    let mut config = Config::new(output, inputs.iter().map(|p| p.to_path_buf()).collect());
    config.quiet = true;
    config
}

/// Marker strings of every page of the PDF at `path`, in page order.
pub fn page_markers(path: &Path) -> Vec<String> {
    let doc = Document::load(path).unwrap();
    doc.get_pages()
        .values()
        .map(|&page_id| {
            let content = doc.get_page_content(page_id).unwrap();
            let text = String::from_utf8_lossy(&content);
            let start = text.find('(').unwrap() + 1;
            let end = text[start..].find(')').unwrap() + start;
            text[start..end].to_string()
        })
        .collect()
}

/// Bookmarks of the PDF at `path`, in its own page numbering.
pub fn bookmarks(path: &Path) -> Vec<Bookmark> {
    PdfReader::new()
        .load(path, SourceId::default())
        .unwrap()
        .bookmarks()
        .unwrap()
}

/// Whether the PDF at `path` carries an interactive form.
pub fn has_form(path: &Path) -> bool {
    PdfReader::new()
        .load(path, SourceId::default())
        .unwrap()
        .has_form()
}

/// Names of the form fields of the PDF at `path`.
pub fn form_field_names(path: &Path) -> Vec<String> {
    let doc = Document::load(path).unwrap();
    let catalog = doc.catalog().unwrap();
    let form_id = catalog.get(b"AcroForm").unwrap().as_reference().unwrap();
    let form = doc.get_dictionary(form_id).unwrap();
    form.get(b"Fields")
        .unwrap()
        .as_array()
        .unwrap()
        .iter()
        .map(|field| {
            let field = doc.get_dictionary(field.as_reference().unwrap()).unwrap();
            let name = field.get(b"T").unwrap().as_str().unwrap();
            String::from_utf8_lossy(name).into_owned()
        })
        .collect()
}

/// Media box of the output page tree root.
pub fn root_media_box(path: &Path) -> Vec<f32> {
    let doc = Document::load(path).unwrap();
    let pages_id = doc
        .catalog()
        .unwrap()
        .get(b"Pages")
        .unwrap()
        .as_reference()
        .unwrap();
    doc.get_dictionary(pages_id)
        .unwrap()
        .get(b"MediaBox")
        .unwrap()
        .as_array()
        .unwrap()
        .iter()
        .map(|v| v.as_float().unwrap())
        .collect()
}

/// `/Rotate` of the 1-based `page`, if set on the page itself.
pub fn page_rotation(path: &Path, page: u32) -> Option<i64> {
    let doc = Document::load(path).unwrap();
    let page_id = doc.get_pages()[&page];
    doc.get_dictionary(page_id)
        .unwrap()
        .get(b"Rotate")
        .ok()
        .and_then(|r| r.as_i64().ok())
}
