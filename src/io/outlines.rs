//! Reading and writing `/Outlines` trees.

use std::collections::{HashMap, HashSet};

use lopdf::{Dictionary, Document, Object, ObjectId, StringFormat};

use super::{MAX_TREE_DEPTH, name_of, resolve, resolve_array, resolve_dict, string_bytes};
use crate::outline::{Action, Bookmark, BookmarkStyle, Fit, PageTarget, RemoteDestination, visible_count};

/// Read the outline of `doc` as bookmarks numbered after `page_ids`.
///
/// Destinations pointing outside `page_ids`, or still naming a destination
/// that could not be resolved, leave the bookmark without an action.
pub(crate) fn read_outlines(doc: &Document, page_ids: &[ObjectId]) -> lopdf::Result<Vec<Bookmark>> {
    let catalog = doc.catalog()?;
    let Ok(root) = catalog.get(b"Outlines") else {
        return Ok(Vec::new());
    };
    let root = doc.dereference(root)?.1.as_dict()?;

    let page_numbers: HashMap<ObjectId, u32> = page_ids
        .iter()
        .zip(1u32..)
        .map(|(id, number)| (*id, number))
        .collect();
    let mut visited = HashSet::new();

    Ok(read_siblings(
        doc,
        root.get(b"First").ok(),
        &page_numbers,
        &mut visited,
        0,
    ))
}

/// Ids of every outline item of `doc`, root excluded.
pub(crate) fn outline_item_ids(doc: &Document) -> Vec<ObjectId> {
    let mut ids = Vec::new();
    let first = doc
        .catalog()
        .ok()
        .and_then(|catalog| catalog.get(b"Outlines").ok())
        .and_then(|root| resolve_dict(doc, root))
        .and_then(|root| root.get(b"First").ok());
    let mut visited = HashSet::new();
    collect_item_ids(doc, first, &mut visited, &mut ids, 0);
    ids
}

fn collect_item_ids(
    doc: &Document,
    first: Option<&Object>,
    visited: &mut HashSet<ObjectId>,
    ids: &mut Vec<ObjectId>,
    depth: usize,
) {
    if depth > MAX_TREE_DEPTH {
        return;
    }

    let mut next = first.and_then(|o| o.as_reference().ok());
    while let Some(id) = next {
        if !visited.insert(id) {
            break;
        }
        let Ok(item) = doc.get_dictionary(id) else {
            break;
        };
        ids.push(id);
        collect_item_ids(doc, item.get(b"First").ok(), visited, ids, depth + 1);
        next = item.get(b"Next").and_then(Object::as_reference).ok();
    }
}

fn read_siblings(
    doc: &Document,
    first: Option<&Object>,
    pages: &HashMap<ObjectId, u32>,
    visited: &mut HashSet<ObjectId>,
    depth: usize,
) -> Vec<Bookmark> {
    let mut items = Vec::new();
    if depth > MAX_TREE_DEPTH {
        return items;
    }

    let mut next = first.and_then(|o| o.as_reference().ok());
    while let Some(id) = next {
        if !visited.insert(id) {
            tracing::warn!(?id, "outline loops back on itself, truncating");
            break;
        }
        let Ok(item) = doc.get_dictionary(id) else {
            break;
        };

        let title = item
            .get(b"Title")
            .ok()
            .and_then(|t| resolve(doc, t))
            .and_then(string_bytes)
            .map(decode_text)
            .unwrap_or_default();

        items.push(Bookmark {
            title,
            action: read_action(doc, item, pages),
            open: item.get(b"Count").and_then(Object::as_i64).is_ok_and(|count| count > 0),
            color: item.get(b"C").ok().and_then(|c| read_color(doc, c)),
            style: item
                .get(b"F")
                .and_then(Object::as_i64)
                .map(BookmarkStyle::from_flags)
                .unwrap_or_default(),
            children: read_siblings(doc, item.get(b"First").ok(), pages, visited, depth + 1),
        });

        next = item.get(b"Next").and_then(Object::as_reference).ok();
    }

    items
}

fn read_action(doc: &Document, item: &Dictionary, pages: &HashMap<ObjectId, u32>) -> Option<Action> {
    if let Ok(dest) = item.get(b"Dest") {
        return read_destination(doc, dest, pages).map(Action::GoTo);
    }

    let action = resolve_dict(doc, item.get(b"A").ok()?)?;
    match action.get(b"S").ok().and_then(name_of)? {
        b"GoTo" => read_destination(doc, action.get(b"D").ok()?, pages).map(Action::GoTo),
        b"URI" => action
            .get(b"URI")
            .ok()
            .and_then(|uri| resolve(doc, uri))
            .and_then(string_bytes)
            .map(|uri| Action::Uri(String::from_utf8_lossy(uri).into_owned())),
        b"GoToR" => Some(Action::GoToRemote {
            file: read_file_spec(doc, action.get(b"F").ok()?)?,
            destination: read_remote_destination(doc, action.get(b"D").ok()?)?,
            new_window: new_window(action),
        }),
        b"Launch" => Some(Action::Launch {
            file: read_file_spec(doc, action.get(b"F").ok()?)?,
            new_window: new_window(action),
        }),
        b"Named" => action
            .get(b"N")
            .ok()
            .and_then(name_of)
            .map(|name| Action::Named(String::from_utf8_lossy(name).into_owned())),
        _ => None,
    }
}

/// A file specification is either a string or a dictionary with `/UF` or `/F`.
fn read_file_spec(doc: &Document, spec: &Object) -> Option<String> {
    let spec = resolve(doc, spec)?;
    if let Some(bytes) = string_bytes(spec) {
        return Some(decode_text(bytes));
    }

    let dict = spec.as_dict().ok()?;
    [b"UF".as_slice(), b"F".as_slice()]
        .into_iter()
        .find_map(|key| dict.get(key).ok().and_then(|value| resolve(doc, value)))
        .and_then(string_bytes)
        .map(decode_text)
}

/// Remote destinations address pages by 0-based index, or by name.
fn read_remote_destination(doc: &Document, dest: &Object) -> Option<RemoteDestination> {
    let dest = resolve(doc, dest)?;
    if let Ok(items) = dest.as_array() {
        let (target, params) = items.split_first()?;
        let index = u32::try_from(resolve(doc, target)?.as_i64().ok()?).ok()?;
        return Some(RemoteDestination::Page(PageTarget {
            page: index.checked_add(1)?,
            fit: read_fit(params),
        }));
    }

    let name = name_of(dest).or_else(|| string_bytes(dest))?;
    Some(RemoteDestination::Named(decode_text(name)))
}

fn new_window(action: &Dictionary) -> Option<bool> {
    action.get(b"NewWindow").and_then(Object::as_bool).ok()
}

fn read_destination(doc: &Document, dest: &Object, pages: &HashMap<ObjectId, u32>) -> Option<PageTarget> {
    let (target, params) = resolve_array(doc, dest)?.split_first()?;
    let page = match target {
        Object::Reference(id) => *pages.get(id)?,
        Object::Integer(index) => u32::try_from(*index).ok()?.checked_add(1)?,
        _ => return None,
    };

    Some(PageTarget {
        page,
        fit: read_fit(params),
    })
}

fn read_fit(params: &[Object]) -> Fit {
    let number = |index: usize| params.get(index).and_then(|value| value.as_float().ok());

    match params.first().and_then(name_of) {
        Some(b"XYZ") => Fit::Xyz {
            left: number(1),
            top: number(2),
            zoom: number(3).filter(|zoom| *zoom != 0.0),
        },
        Some(b"FitH") => Fit::FitH { top: number(1) },
        Some(b"FitV") => Fit::FitV { left: number(1) },
        Some(b"FitR") => match (number(1), number(2), number(3), number(4)) {
            (Some(left), Some(bottom), Some(right), Some(top)) => Fit::FitR {
                left,
                bottom,
                right,
                top,
            },
            _ => Fit::Fit,
        },
        Some(b"FitB") => Fit::FitB,
        Some(b"FitBH") => Fit::FitBH { top: number(1) },
        Some(b"FitBV") => Fit::FitBV { left: number(1) },
        _ => Fit::Fit,
    }
}

fn read_color(doc: &Document, value: &Object) -> Option<[f32; 3]> {
    match resolve_array(doc, value)?.as_slice() {
        [r, g, b] => Some([r.as_float().ok()?, g.as_float().ok()?, b.as_float().ok()?]),
        _ => None,
    }
}

/// Decode a PDF text string: UTF-16BE with byte order mark, UTF-8 with byte
/// order mark, otherwise single-byte PDFDocEncoding (read as Latin-1).
pub(crate) fn decode_text(bytes: &[u8]) -> String {
    if let Some(utf16) = bytes.strip_prefix(&[0xFE, 0xFF]) {
        let units = utf16
            .chunks_exact(2)
            .map(|pair| u16::from_be_bytes([pair[0], pair[1]]));
        return char::decode_utf16(units)
            .map(|unit| unit.unwrap_or(char::REPLACEMENT_CHARACTER))
            .collect();
    }
    if let Some(utf8) = bytes.strip_prefix(&[0xEF, 0xBB, 0xBF]) {
        return String::from_utf8_lossy(utf8).into_owned();
    }
    bytes.iter().map(|&byte| char::from(byte)).collect()
}

/// Encode a title as a PDF text string.
pub(crate) fn encode_text(text: &str) -> Object {
    if text.is_ascii() {
        return Object::string_literal(text);
    }

    let mut bytes = vec![0xFE, 0xFF];
    bytes.extend(text.encode_utf16().flat_map(u16::to_be_bytes));
    Object::String(bytes, StringFormat::Hexadecimal)
}

/// Writes a bookmark forest into a document as its outline tree.
pub(crate) struct OutlineWriter<'a> {
    document: &'a mut Document,
    page_ids: &'a [ObjectId],
    dropped: usize,
}

impl<'a> OutlineWriter<'a> {
    pub(crate) fn new(document: &'a mut Document, page_ids: &'a [ObjectId]) -> Self {
        Self {
            document,
            page_ids,
            dropped: 0,
        }
    }

    /// Write `bookmarks` and return the outline root together with the
    /// number of page targets that had to be dropped.
    pub(crate) fn write(mut self, bookmarks: &[Bookmark]) -> (ObjectId, usize) {
        let root_id = self.document.new_object_id();

        let mut root = Dictionary::new();
        root.set("Type", Object::Name(b"Outlines".to_vec()));
        if let Some((first, last)) = self.write_level(root_id, bookmarks) {
            root.set("First", Object::Reference(first));
            root.set("Last", Object::Reference(last));
        }
        root.set("Count", Object::Integer(visible_count(bookmarks) as i64));

        self.document.objects.insert(root_id, Object::Dictionary(root));
        (root_id, self.dropped)
    }

    fn write_level(&mut self, parent: ObjectId, items: &[Bookmark]) -> Option<(ObjectId, ObjectId)> {
        let ids: Vec<ObjectId> = items.iter().map(|_| self.document.new_object_id()).collect();

        for (index, (item, &id)) in items.iter().zip(&ids).enumerate() {
            let mut dict = Dictionary::new();
            dict.set("Title", encode_text(&item.title));
            dict.set("Parent", Object::Reference(parent));
            if index > 0 {
                dict.set("Prev", Object::Reference(ids[index - 1]));
            }
            if let Some(next) = ids.get(index + 1) {
                dict.set("Next", Object::Reference(*next));
            }

            if let Some((first, last)) = self.write_level(id, &item.children) {
                dict.set("First", Object::Reference(first));
                dict.set("Last", Object::Reference(last));
                let visible = visible_count(&item.children) as i64;
                dict.set("Count", if item.open { visible } else { -visible });
            }

            match &item.action {
                Some(Action::GoTo(target)) => match self.destination(target) {
                    Some(dest) => dict.set("Dest", dest),
                    None => {
                        self.dropped += 1;
                        tracing::warn!(
                            title = %item.title,
                            page = target.page,
                            pages = self.page_ids.len(),
                            "bookmark points past the last page, dropping its destination"
                        );
                    }
                },
                Some(Action::Uri(uri)) => {
                    let mut action = Dictionary::new();
                    action.set("S", Object::Name(b"URI".to_vec()));
                    action.set("URI", Object::string_literal(uri.as_str()));
                    dict.set("A", Object::Dictionary(action));
                }
                Some(Action::GoToRemote {
                    file,
                    destination,
                    new_window,
                }) => {
                    let mut action = Dictionary::new();
                    action.set("S", Object::Name(b"GoToR".to_vec()));
                    action.set("F", encode_text(file));
                    let dest = match destination {
                        RemoteDestination::Page(target) => {
                            let mut dest = vec![Object::Integer(i64::from(target.page.saturating_sub(1)))];
                            dest.extend(fit_operands(target.fit));
                            Object::Array(dest)
                        }
                        RemoteDestination::Named(name) => encode_text(name),
                    };
                    action.set("D", dest);
                    if let Some(new_window) = new_window {
                        action.set("NewWindow", *new_window);
                    }
                    dict.set("A", Object::Dictionary(action));
                }
                Some(Action::Launch { file, new_window }) => {
                    let mut action = Dictionary::new();
                    action.set("S", Object::Name(b"Launch".to_vec()));
                    action.set("F", encode_text(file));
                    if let Some(new_window) = new_window {
                        action.set("NewWindow", *new_window);
                    }
                    dict.set("A", Object::Dictionary(action));
                }
                Some(Action::Named(name)) => {
                    let mut action = Dictionary::new();
                    action.set("S", Object::Name(b"Named".to_vec()));
                    action.set("N", Object::Name(name.as_bytes().to_vec()));
                    dict.set("A", Object::Dictionary(action));
                }
                None => {}
            }

            if let Some([r, g, b]) = item.color {
                dict.set("C", vec![Object::Real(r), Object::Real(g), Object::Real(b)]);
            }
            if !item.style.is_plain() {
                dict.set("F", item.style.flags());
            }

            self.document.objects.insert(id, Object::Dictionary(dict));
        }

        Some((*ids.first()?, *ids.last()?))
    }

    fn destination(&self, target: &PageTarget) -> Option<Object> {
        let index = usize::try_from(target.page.checked_sub(1)?).ok()?;
        let page_id = *self.page_ids.get(index)?;

        let mut dest = vec![Object::Reference(page_id)];
        dest.extend(fit_operands(target.fit));
        Some(Object::Array(dest))
    }
}

/// `/Fit` name followed by its parameters, as they follow the page in a
/// destination array.
fn fit_operands(fit: Fit) -> Vec<Object> {
    let optional = |value: Option<f32>| value.map_or(Object::Null, Object::Real);
    let (name, params): (&[u8], Vec<Object>) = match fit {
        Fit::Xyz { left, top, zoom } => (b"XYZ", vec![optional(left), optional(top), optional(zoom)]),
        Fit::Fit => (b"Fit", Vec::new()),
        Fit::FitH { top } => (b"FitH", vec![optional(top)]),
        Fit::FitV { left } => (b"FitV", vec![optional(left)]),
        Fit::FitR {
            left,
            bottom,
            right,
            top,
        } => (
            b"FitR",
            [left, bottom, right, top].into_iter().map(Object::Real).collect(),
        ),
        Fit::FitB => (b"FitB", Vec::new()),
        Fit::FitBH { top } => (b"FitBH", vec![optional(top)]),
        Fit::FitBV { left } => (b"FitBV", vec![optional(left)]),
    };

    let mut operands = vec![Object::Name(name.to_vec())];
    operands.extend(params);
    operands
}
