//! Wrapping PDF pages as Form XObjects
//!
//! Both the template page and the overlay page are copied into the output
//! document as Form XObjects so they can be painted one after the other on a
//! fresh page.

use crate::constants::DEFAULT_PAGE_DIMENSIONS;
use crate::types::{CertificateError, Result};
use lopdf::{Dictionary, Document, Object, ObjectId, Stream};
use std::collections::HashMap;

/// Maximum page-tree depth walked when resolving inherited attributes.
const MAX_INHERITANCE_DEPTH: usize = 32;

/// Object id of the first page of `doc`.
pub fn first_page_id(doc: &Document) -> Result<ObjectId> {
    doc.get_pages()
        .values()
        .next()
        .copied()
        .ok_or(CertificateError::NoPages)
}

/// Copy a page into `output` as a Form XObject whose BBox is the page MediaBox.
///
/// `cache` maps source object ids to ids already copied into `output`, so
/// resources shared between calls are only copied once.
pub fn create_page_xobject(
    output: &mut Document,
    source: &Document,
    page_id: ObjectId,
    cache: &mut HashMap<ObjectId, ObjectId>,
) -> Result<ObjectId> {
    let page_dict = source.get_dictionary(page_id)?;
    let media_box = page_media_box(source, page_id)?;
    let content = page_content(source, page_dict)?;

    let mut xobject_dict = Dictionary::new();
    xobject_dict.set("Type", Object::Name(b"XObject".to_vec()));
    xobject_dict.set("Subtype", Object::Name(b"Form".to_vec()));
    xobject_dict.set("FormType", Object::Integer(1));
    xobject_dict.set("BBox", rect_object(media_box));

    if let Some(resources) = inherited(source, page_id, b"Resources")? {
        xobject_dict.set(
            "Resources",
            copy_object_deep(output, source, &resources, cache)?,
        );
    }

    Ok(output.add_object(Stream::new(xobject_dict, content)))
}

/// Page MediaBox as `[llx, lly, urx, ury]`, following page-tree inheritance.
pub fn page_media_box(doc: &Document, page_id: ObjectId) -> Result<[f32; 4]> {
    Ok(inherited_rect(doc, page_id, b"MediaBox")?.unwrap_or([
        0.0,
        0.0,
        DEFAULT_PAGE_DIMENSIONS.0,
        DEFAULT_PAGE_DIMENSIONS.1,
    ]))
}

/// A page rectangle such as CropBox, if the page or an ancestor defines a
/// well-formed one.
pub(crate) fn inherited_rect(
    doc: &Document,
    page_id: ObjectId,
    key: &[u8],
) -> Result<Option<[f32; 4]>> {
    let Some(Object::Array(values)) = inherited(doc, page_id, key)? else {
        return Ok(None);
    };
    if values.len() != 4 {
        return Ok(None);
    }

    let mut rect = [0.0; 4];
    for (slot, value) in rect.iter_mut().zip(&values) {
        *slot = resolve(doc, value).and_then(number).unwrap_or(0.0);
    }
    Ok(Some(rect))
}

/// Page width and height in points.
pub fn page_dimensions(doc: &Document, page_id: ObjectId) -> Result<(f32, f32)> {
    let [llx, lly, urx, ury] = page_media_box(doc, page_id)?;
    Ok(((urx - llx).abs(), (ury - lly).abs()))
}

pub(crate) fn rect_object(rect: [f32; 4]) -> Object {
    Object::Array(rect.iter().map(|v| Object::Real(*v)).collect())
}

/// Look up `key` on the page or the nearest ancestor that defines it.
/// References are resolved one level so callers get the actual value.
pub(crate) fn inherited(doc: &Document, page_id: ObjectId, key: &[u8]) -> Result<Option<Object>> {
    let mut node = doc.get_dictionary(page_id)?;

    for _ in 0..MAX_INHERITANCE_DEPTH {
        if let Ok(value) = node.get(key) {
            return Ok(resolve(doc, value).cloned());
        }
        match node.get(b"Parent") {
            Ok(Object::Reference(parent)) => node = doc.get_dictionary(*parent)?,
            _ => break,
        }
    }

    Ok(None)
}

fn resolve<'a>(doc: &'a Document, obj: &'a Object) -> Option<&'a Object> {
    match obj {
        Object::Reference(id) => doc.get_object(*id).ok(),
        other => Some(other),
    }
}

fn number(obj: &Object) -> Option<f32> {
    match obj {
        Object::Integer(i) => Some(*i as f32),
        Object::Real(r) => Some(*r),
        _ => None,
    }
}

// =============================================================================
// Content Streams
// =============================================================================

/// Decoded content of a page; a page without `Contents` is blank.
fn page_content(doc: &Document, page_dict: &Dictionary) -> Result<Vec<u8>> {
    let ids: Vec<ObjectId> = match page_dict.get(b"Contents") {
        Ok(Object::Reference(id)) => match doc.get_object(*id)? {
            // An indirect array of streams
            Object::Array(items) => items.iter().filter_map(|o| o.as_reference().ok()).collect(),
            _ => vec![*id],
        },
        Ok(Object::Array(items)) => items.iter().filter_map(|o| o.as_reference().ok()).collect(),
        _ => return Ok(Vec::new()),
    };

    let mut content = Vec::new();
    for id in ids {
        if let Ok(stream) = doc.get_object(id)?.as_stream() {
            let data = stream
                .decompressed_content()
                .unwrap_or_else(|_| stream.content.clone());
            content.extend_from_slice(&data);
            content.push(b'\n');
        }
    }
    Ok(content)
}

// =============================================================================
// Deep Copy
// =============================================================================

/// Copy `obj` from `source` into `output`, following references.
pub fn copy_object_deep(
    output: &mut Document,
    source: &Document,
    obj: &Object,
    cache: &mut HashMap<ObjectId, ObjectId>,
) -> Result<Object> {
    Ok(match obj {
        Object::Reference(id) => {
            if let Some(&copied) = cache.get(id) {
                return Ok(Object::Reference(copied));
            }
            // Reserve the id first so self-referencing objects terminate
            let new_id = output.new_object_id();
            cache.insert(*id, new_id);

            let copied = copy_object_deep(output, source, source.get_object(*id)?, cache)?;
            output.objects.insert(new_id, copied);
            Object::Reference(new_id)
        }
        Object::Dictionary(dict) => Object::Dictionary(copy_dictionary(output, source, dict, cache)?),
        Object::Array(items) => Object::Array(
            items
                .iter()
                .map(|item| copy_object_deep(output, source, item, cache))
                .collect::<Result<_>>()?,
        ),
        Object::Stream(stream) => {
            let dict = copy_dictionary(output, source, &stream.dict, cache)?;
            let mut copied = Stream::new(dict, stream.content.clone());
            copied.allows_compression = stream.allows_compression;
            Object::Stream(copied)
        }
        other => other.clone(),
    })
}

fn copy_dictionary(
    output: &mut Document,
    source: &Document,
    dict: &Dictionary,
    cache: &mut HashMap<ObjectId, ObjectId>,
) -> Result<Dictionary> {
    let mut copied = Dictionary::new();
    for (key, value) in dict.iter() {
        // Parent links lead back into the source page tree
        if key.as_slice() == b"Parent" {
            continue;
        }
        copied.set(key.clone(), copy_object_deep(output, source, value, cache)?);
    }
    Ok(copied)
}
