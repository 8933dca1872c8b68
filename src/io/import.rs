//! Copying object graphs from a source document into the output.
//!
//! Object ids of a source and of the output live in different number spaces,
//! so every indirect object reached from an imported page gets a fresh id in
//! the output. The mapping is kept per source for the duration of its import
//! session: resources shared by several pages of one source are copied once.

use std::collections::{HashMap, HashSet};

use lopdf::{Dictionary, Document, Object, ObjectId};

use super::{SourceId, SourcePdf, name_of};

/// Object id mapping for the source currently being imported.
#[derive(Debug)]
pub(crate) struct ImportSession {
    source: SourceId,
    remap: HashMap<ObjectId, ObjectId>,
    imported: HashSet<u32>,
}

impl ImportSession {
    /// Start importing from `source`.
    ///
    /// Output ids are reserved up front for every page so that links and
    /// destinations pointing at pages not yet imported still resolve.
    pub(crate) fn begin(source: &SourcePdf, target: &mut Document) -> Self {
        let remap = source
            .page_ids()
            .iter()
            .map(|&page_id| (page_id, target.new_object_id()))
            .collect();

        Self {
            source: source.id(),
            remap,
            imported: HashSet::new(),
        }
    }

    pub(crate) fn source(&self) -> SourceId {
        self.source
    }

    /// Output id reserved for a source object.
    pub(crate) fn mapped(&self, id: ObjectId) -> Option<ObjectId> {
        self.remap.get(&id).copied()
    }

    /// Record that `page` was imported. Returns `false` if it already was.
    pub(crate) fn mark_imported(&mut self, page: u32) -> bool {
        self.imported.insert(page)
    }

    pub(crate) fn copier<'a>(
        &'a mut self,
        source: &'a Document,
        target: &'a mut Document,
        pages_root: ObjectId,
    ) -> ObjectCopier<'a> {
        ObjectCopier {
            source,
            target,
            remap: &mut self.remap,
            pages_root,
        }
    }
}

/// Deep copy of source objects into the target document.
pub(crate) struct ObjectCopier<'a> {
    source: &'a Document,
    target: &'a mut Document,
    remap: &'a mut HashMap<ObjectId, ObjectId>,
    pages_root: ObjectId,
}

impl ObjectCopier<'_> {
    /// Copy `object`, rewriting every reference it contains.
    pub(crate) fn copy_object(&mut self, object: &Object) -> Object {
        match object {
            Object::Reference(id) => Object::Reference(self.copy_reference(*id)),
            Object::Dictionary(dict) => Object::Dictionary(self.copy_dictionary(dict)),
            Object::Array(items) => Object::Array(items.iter().map(|item| self.copy_object(item)).collect()),
            Object::Stream(stream) => {
                let mut copy = stream.clone();
                copy.dict = self.copy_dictionary(&stream.dict);
                Object::Stream(copy)
            }
            other => other.clone(),
        }
    }

    pub(crate) fn copy_dictionary(&mut self, dict: &Dictionary) -> Dictionary {
        let mut copy = Dictionary::new();
        for (key, value) in dict.iter() {
            copy.set(key.clone(), self.copy_object(value));
        }
        copy
    }

    /// Output id for the source object `id`, copying it on first use.
    ///
    /// Page tree nodes are not copied: they are redirected to the output's
    /// own page tree root. Pages already have a reserved id and are filled
    /// in when they are imported. References to objects missing from the
    /// source end up pointing at `null`.
    fn copy_reference(&mut self, id: ObjectId) -> ObjectId {
        if let Some(mapped) = self.remap.get(&id) {
            return *mapped;
        }

        let Ok(object) = self.source.get_object(id) else {
            let mapped = self.target.add_object(Object::Null);
            self.remap.insert(id, mapped);
            return mapped;
        };

        if is_page_tree_node(object) {
            self.remap.insert(id, self.pages_root);
            return self.pages_root;
        }

        let mapped = self.target.new_object_id();
        self.remap.insert(id, mapped);
        let copy = self.copy_object(object);
        self.target.objects.insert(mapped, copy);
        mapped
    }
}

fn is_page_tree_node(object: &Object) -> bool {
    object
        .as_dict()
        .ok()
        .and_then(|dict| dict.get(b"Type").ok())
        .and_then(name_of)
        == Some(b"Pages".as_slice())
}
