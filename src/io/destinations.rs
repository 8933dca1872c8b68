//! Named destination consolidation.
//!
//! Named destinations live in the source catalog (`/Dests`, or the `/Dests`
//! name tree under `/Names`). Those tables are not carried into the output,
//! so before pages are imported every outline item, link annotation and
//! `GoTo` action that refers to a destination by name is rewritten to use the
//! explicit `[page /Fit ...]` array instead. Page references inside those
//! arrays are then remapped by the normal object import.

use std::collections::{HashMap, HashSet};

use lopdf::{Dictionary, Document, Object, ObjectId};

use super::{MAX_TREE_DEPTH, name_of, outlines, resolve, resolve_array, resolve_dict, string_bytes};

/// Destination name to explicit destination array.
pub(crate) type DestinationMap = HashMap<Vec<u8>, Vec<Object>>;

/// Replace named destinations in `doc` by explicit ones. Returns the number
/// of references rewritten.
pub(crate) fn consolidate(doc: &mut Document, page_ids: &[ObjectId]) -> usize {
    let names = collect_named_destinations(doc);
    if names.is_empty() {
        return 0;
    }

    let holders = destination_holders(doc, page_ids);
    let mut rewritten = 0;
    for id in holders {
        if let Ok(object) = doc.get_object_mut(id) {
            rewritten += rewrite_object(object, &names);
        }
    }
    rewritten
}

/// Every named destination declared by the document.
pub(crate) fn collect_named_destinations(doc: &Document) -> DestinationMap {
    let mut names = DestinationMap::new();
    let Ok(catalog) = doc.catalog() else {
        return names;
    };

    if let Some(dests) = catalog.get(b"Dests").ok().and_then(|d| resolve_dict(doc, d)) {
        for (name, value) in dests.iter() {
            if let Some(explicit) = explicit_destination(doc, value) {
                names.insert(name.clone(), explicit);
            }
        }
    }

    let tree = catalog
        .get(b"Names")
        .ok()
        .and_then(|n| resolve_dict(doc, n))
        .and_then(|n| n.get(b"Dests").ok())
        .and_then(|d| resolve_dict(doc, d));
    if let Some(tree) = tree {
        walk_name_tree(doc, tree, &mut names, 0);
    }

    names
}

fn walk_name_tree(doc: &Document, node: &Dictionary, names: &mut DestinationMap, depth: usize) {
    if depth > MAX_TREE_DEPTH {
        return;
    }

    if let Some(pairs) = node.get(b"Names").ok().and_then(|n| resolve_array(doc, n)) {
        for pair in pairs.chunks_exact(2) {
            let key = resolve(doc, &pair[0]).and_then(string_bytes);
            if let (Some(key), Some(explicit)) = (key, explicit_destination(doc, &pair[1])) {
                names.insert(key.to_vec(), explicit);
            }
        }
    }

    if let Some(kids) = node.get(b"Kids").ok().and_then(|k| resolve_array(doc, k)) {
        for kid in kids {
            if let Some(kid) = resolve_dict(doc, kid) {
                walk_name_tree(doc, kid, names, depth + 1);
            }
        }
    }
}

/// A destination value is either the explicit array or a dictionary whose
/// `/D` entry holds it.
fn explicit_destination(doc: &Document, value: &Object) -> Option<Vec<Object>> {
    match resolve(doc, value)? {
        Object::Array(items) => Some(items.clone()),
        Object::Dictionary(dict) => dict
            .get(b"D")
            .ok()
            .and_then(|d| resolve_array(doc, d))
            .cloned(),
        _ => None,
    }
}

/// Indirect objects that may hold a `/Dest` or a `GoTo` action: outline
/// items, pages (for inline annotations), annotation arrays, annotations and
/// the action dictionaries they point to.
fn destination_holders(doc: &Document, page_ids: &[ObjectId]) -> Vec<ObjectId> {
    let mut holders = outlines::outline_item_ids(doc);
    holders.extend_from_slice(page_ids);

    for &page_id in page_ids {
        let Some(annots) = doc
            .get_dictionary(page_id)
            .ok()
            .and_then(|page| page.get(b"Annots").ok())
        else {
            continue;
        };
        if let Object::Reference(id) = annots {
            holders.push(*id);
        }
        if let Some(items) = resolve_array(doc, annots) {
            holders.extend(items.iter().filter_map(|item| item.as_reference().ok()));
        }
    }

    let mut actions = Vec::new();
    for &id in &holders {
        if let Ok(object) = doc.get_object(id) {
            collect_action_references(object, &mut actions);
        }
    }
    holders.extend(actions);

    let mut seen = HashSet::new();
    holders.retain(|id| seen.insert(*id));
    holders
}

fn collect_action_references(object: &Object, actions: &mut Vec<ObjectId>) {
    match object {
        Object::Dictionary(dict) => {
            if let Ok(Object::Reference(id)) = dict.get(b"A") {
                actions.push(*id);
            }
            if let Ok(annots @ Object::Array(_)) = dict.get(b"Annots") {
                collect_action_references(annots, actions);
            }
        }
        Object::Array(items) => {
            for item in items {
                if let Object::Dictionary(_) = item {
                    collect_action_references(item, actions);
                }
            }
        }
        _ => {}
    }
}

fn rewrite_object(object: &mut Object, names: &DestinationMap) -> usize {
    match object {
        Object::Dictionary(dict) => {
            let mut rewritten = rewrite_dictionary(dict, names);
            if let Ok(annots @ Object::Array(_)) = dict.get_mut(b"Annots") {
                rewritten += rewrite_object(annots, names);
            }
            rewritten
        }
        Object::Array(items) => items
            .iter_mut()
            .filter(|item| matches!(item, Object::Dictionary(_)))
            .map(|item| rewrite_object(item, names))
            .sum(),
        _ => 0,
    }
}

fn rewrite_dictionary(dict: &mut Dictionary, names: &DestinationMap) -> usize {
    let mut rewritten = 0;

    if let Some(explicit) = dict.get(b"Dest").ok().and_then(|d| lookup(d, names)) {
        dict.set("Dest", Object::Array(explicit));
        rewritten += 1;
    }

    let is_goto = dict.get(b"S").ok().and_then(name_of) == Some(b"GoTo".as_slice());
    if is_goto {
        if let Some(explicit) = dict.get(b"D").ok().and_then(|d| lookup(d, names)) {
            dict.set("D", Object::Array(explicit));
            rewritten += 1;
        }
    }

    if let Ok(Object::Dictionary(action)) = dict.get_mut(b"A") {
        rewritten += rewrite_dictionary(action, names);
    }

    rewritten
}

fn lookup(dest: &Object, names: &DestinationMap) -> Option<Vec<Object>> {
    let name = match dest {
        Object::Name(name) => name,
        Object::String(name, _) => name,
        _ => return None,
    };
    names.get(name).cloned()
}
