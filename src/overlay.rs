//! Stamping onto documents this crate did not write.
//!
//! The stamp is composed as an ordinary one-page [Document] and written with
//! [pdf_writer]. That page is then reloaded with [lopdf], its objects are
//! renumbered past the source document's, and it is attached to the target page
//! as a Form XObject carrying its own resources. The source page's original
//! content is wrapped in `q`/`Q` so no graphics state leaks into the stamp.

use crate::document::Document as Overlay;
use crate::rect::Rect;
use crate::units::Pt;
use crate::StampError;
use lopdf::{dictionary, Dictionary, Document, Object, ObjectId, Stream};
use miniz_oxide::deflate::{compress_to_vec_zlib, CompressionLevel};
use std::collections::BTreeSet;

/// Guard against malformed page trees with circular `Parent` links
const MAX_TREE_DEPTH: usize = 32;

/// An existing PDF loaded for stamping
pub struct SourcePdf {
    document: Document,
}

impl SourcePdf {
    pub fn load(bytes: &[u8]) -> Result<SourcePdf, StampError> {
        let document = Document::load_mem(bytes)?;
        if document.get_pages().is_empty() {
            return Err(StampError::EmptyDocument);
        }
        Ok(SourcePdf { document })
    }

    pub fn page_count(&self) -> usize {
        self.document.get_pages().len()
    }

    /// Clamp a 1-based page number into the document, returning a 0-based index
    pub fn clamp_page(&self, page_number: usize) -> usize {
        page_number
            .saturating_sub(1)
            .min(self.page_count().saturating_sub(1))
    }

    fn page_id(&self, index: usize) -> Result<ObjectId, StampError> {
        self.document
            .get_pages()
            .values()
            .nth(index)
            .copied()
            .ok_or(StampError::PageMissing(index))
    }

    /// The media box of the page at `index` (0-based), inherited through the page
    /// tree when the page does not carry its own. Falls back to A4.
    pub fn page_box(&self, index: usize) -> Result<Rect, StampError> {
        let page_id = self.page_id(index)?;
        let media_box = self
            .inherited(page_id, b"MediaBox")
            .and_then(|object| rect_from_object(&self.document, &object));
        Ok(media_box.unwrap_or_else(|| {
            let (width, height) = crate::pagesize::A4;
            log::debug!("page {index} has no usable MediaBox, assuming A4");
            Rect::from_origin(Pt(0.0), Pt(0.0), width, height)
        }))
    }

    /// Width and height of the page at `index` (0-based)
    pub fn page_size(&self, index: usize) -> Result<(Pt, Pt), StampError> {
        let media_box = self.page_box(index)?;
        Ok((media_box.width(), media_box.height()))
    }

    /// Look up a page attribute, walking up through `Parent` nodes
    fn inherited(&self, page_id: ObjectId, key: &[u8]) -> Option<Object> {
        let mut node = self.document.get_dictionary(page_id).ok()?;
        for _ in 0..MAX_TREE_DEPTH {
            if let Ok(value) = node.get(key) {
                return Some(value.clone());
            }
            let parent = node.get(b"Parent").and_then(Object::as_reference).ok()?;
            node = self.document.get_dictionary(parent).ok()?;
        }
        None
    }

    /// Draw the single page of `overlay` on top of the page at `index` (0-based)
    /// and serialize the result. The overlay page is expected to have the same size
    /// as the target page; it is shifted to the target's media box origin.
    pub fn stamp(mut self, index: usize, overlay: Overlay) -> Result<Vec<u8>, StampError> {
        let page_id = self.page_id(index)?;
        let target_box = self.page_box(index)?;

        let form = self.import_overlay(overlay, target_box)?;

        let mut resources = self.page_resources(page_id);
        let mut xobjects = resources
            .get(b"XObject")
            .ok()
            .and_then(|object| resolve_dict(&self.document, object))
            .unwrap_or_default();
        let name = (0..)
            .map(|n| format!("Stamp{n}"))
            .find(|name| !xobjects.has(name.as_bytes()))
            .unwrap_or_else(|| "Stamp".to_string());
        xobjects.set(name.as_str(), Object::Reference(form));
        resources.set("XObject", Object::Dictionary(xobjects));

        let mut contents = self.page_contents(page_id);
        let save = self.add_content(b"q\n".to_vec());
        let draw = self.add_content(format!("Q\nq /{name} Do Q\n").into_bytes());
        contents.insert(0, Object::Reference(save));
        contents.push(Object::Reference(draw));
        log::debug!("stamping page {index} as /{name}");

        let page = self.document.get_dictionary_mut(page_id)?;
        page.set("Resources", Object::Dictionary(resources));
        page.set("Contents", Object::Array(contents));

        let mut bytes = Vec::new();
        self.document.save_to(&mut bytes)?;
        Ok(bytes)
    }

    /// Move the overlay's objects into the source document and wrap its page in a
    /// Form XObject, returning the form's id
    fn import_overlay(&mut self, overlay: Overlay, target: Rect) -> Result<ObjectId, StampError> {
        let rendered = overlay.write()?;
        let mut stamp = Document::load_mem(&rendered)?;
        stamp.renumber_objects_with(self.document.max_id + 1);

        let stamp_page = stamp
            .get_pages()
            .values()
            .next()
            .copied()
            .ok_or(StampError::EmptyDocument)?;
        let content = stamp.get_page_content(stamp_page)?;
        let page = stamp.get_dictionary(stamp_page)?;
        let resources = match page.get(b"Resources") {
            Ok(object) => resolve_dict(&stamp, object).unwrap_or_default(),
            Err(_) => Dictionary::new(),
        };
        let bbox = page
            .get(b"MediaBox")
            .ok()
            .and_then(|object| rect_from_object(&stamp, object))
            .unwrap_or(Rect::from_origin(
                Pt(0.0),
                Pt(0.0),
                target.width(),
                target.height(),
            ));

        // the page itself and its scaffolding stay behind
        let mut skipped: BTreeSet<ObjectId> = stamp.get_page_contents(stamp_page).into_iter().collect();
        skipped.insert(stamp_page);
        for key in [&b"Root"[..], b"Info"] {
            if let Ok(Object::Reference(id)) = stamp.trailer.get(key) {
                skipped.insert(*id);
            }
        }
        if let Ok(Object::Reference(parent)) = page.get(b"Parent") {
            skipped.insert(*parent);
        }

        let max_id = stamp.max_id;
        for (id, object) in std::mem::take(&mut stamp.objects) {
            if !skipped.contains(&id) {
                self.document.objects.insert(id, object);
            }
        }
        self.document.max_id = self.document.max_id.max(max_id);

        let compressed = compress_to_vec_zlib(&content, CompressionLevel::DefaultCompression as u8);
        let form = Stream::new(
            dictionary! {
                "Type" => "XObject",
                "Subtype" => "Form",
                "BBox" => vec![bbox.x1.0.into(), bbox.y1.0.into(), bbox.x2.0.into(), bbox.y2.0.into()],
                "Matrix" => vec![
                    1.into(), 0.into(), 0.into(), 1.into(),
                    target.x1.0.into(), target.y1.0.into(),
                ],
                "Resources" => resources,
                "Filter" => "FlateDecode",
            },
            compressed,
        );
        Ok(self.document.add_object(form))
    }

    /// The page's resources as an inline dictionary, resolving references and
    /// inheritance
    fn page_resources(&self, page_id: ObjectId) -> Dictionary {
        self.inherited(page_id, b"Resources")
            .and_then(|object| resolve_dict(&self.document, &object))
            .unwrap_or_default()
    }

    /// References to the page's existing content streams
    fn page_contents(&self, page_id: ObjectId) -> Vec<Object> {
        let Ok(page) = self.document.get_dictionary(page_id) else {
            return Vec::new();
        };
        match page.get(b"Contents") {
            Ok(Object::Reference(id)) => match self.document.get_object(*id) {
                Ok(Object::Array(items)) => items.clone(),
                _ => vec![Object::Reference(*id)],
            },
            Ok(Object::Array(items)) => items.clone(),
            _ => Vec::new(),
        }
    }

    fn add_content(&mut self, content: Vec<u8>) -> ObjectId {
        self.document
            .add_object(Stream::new(Dictionary::new(), content))
    }
}

fn resolve_dict(document: &Document, object: &Object) -> Option<Dictionary> {
    match object {
        Object::Dictionary(dict) => Some(dict.clone()),
        Object::Reference(id) => match document.get_object(*id) {
            Ok(Object::Dictionary(dict)) => Some(dict.clone()),
            _ => None,
        },
        _ => None,
    }
}

fn rect_from_object(document: &Document, object: &Object) -> Option<Rect> {
    let items = match object {
        Object::Array(items) => items.clone(),
        Object::Reference(id) => document.get_object(*id).ok()?.as_array().ok()?.clone(),
        _ => return None,
    };
    let numbers: Vec<f32> = items
        .iter()
        .map(|item| item.as_float().ok())
        .collect::<Option<Vec<f32>>>()?;
    match numbers.as_slice() {
        [x1, y1, x2, y2] => Some(Rect {
            x1: Pt(x1.min(*x2)),
            y1: Pt(y1.min(*y2)),
            x2: Pt(x1.max(*x2)),
            y2: Pt(y1.max(*y2)),
        }),
        _ => None,
    }
}
