//! Compositing overlays onto the certificate template
//!
//! Every output page paints the template's first page and then the overlay
//! page on top of it, both as Form XObjects. The output page takes the
//! template's MediaBox, its other page boxes and its rotation, inherited
//! ones included, so it always matches the template page.

use super::xobject::{
    create_page_xobject, first_page_id, inherited, inherited_rect, page_dimensions, page_media_box,
    rect_object,
};
use crate::types::{CertificateError, Result};
use lopdf::{Dictionary, Document, Object, ObjectId, Stream};
use std::collections::HashMap;
use std::path::Path;

const TEMPLATE_XOBJECT: &str = "Tpl";
const OVERLAY_XOBJECT: &str = "Ovl";

/// Page boxes besides MediaBox carried from the template onto every output page.
const CARRIED_BOXES: [&str; 4] = ["CropBox", "BleedBox", "TrimBox", "ArtBox"];

/// The background PDF, loaded once and shared read-only by every record.
#[derive(Debug, Clone)]
pub struct Template {
    document: Document,
    page_id: ObjectId,
    media_box: [f32; 4],
    size: (f32, f32),
    boxes: Vec<(&'static str, [f32; 4])>,
    rotation: Option<i64>,
}

impl Template {
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        Self::from_document(Document::load_mem(bytes)?)
    }

    pub fn from_document(document: Document) -> Result<Self> {
        let page_id = first_page_id(&document)?;
        let media_box = page_media_box(&document, page_id)?;
        let size = page_dimensions(&document, page_id)?;

        let mut boxes = Vec::new();
        for key in CARRIED_BOXES {
            if let Some(rect) = inherited_rect(&document, page_id, key.as_bytes())? {
                boxes.push((key, rect));
            }
        }
        let rotation = inherited(&document, page_id, b"Rotate")?.and_then(|o| o.as_i64().ok());

        Ok(Self {
            document,
            page_id,
            media_box,
            size,
            boxes,
            rotation,
        })
    }

    /// Load a template PDF from disk
    pub async fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_owned();
        let bytes = tokio::fs::read(&path).await?;
        let template = tokio::task::spawn_blocking(move || Self::from_bytes(&bytes)).await??;

        log::info!(
            "Template {}: {:.0} x {:.0} pt",
            path.display(),
            template.width(),
            template.height()
        );
        Ok(template)
    }

    pub fn width(&self) -> f32 {
        self.size.0
    }

    pub fn height(&self) -> f32 {
        self.size.1
    }

    pub fn media_box(&self) -> [f32; 4] {
        self.media_box
    }

    pub fn document(&self) -> &Document {
        &self.document
    }

    pub fn page_id(&self) -> ObjectId {
        self.page_id
    }

    /// Page rotation in degrees, inherited from the page tree if needed.
    pub fn rotation(&self) -> Option<i64> {
        self.rotation
    }
}

/// Output document being filled with merged certificate pages.
pub struct CertificateDocument<'t> {
    template: &'t Template,
    output: Document,
    pages_id: ObjectId,
    page_refs: Vec<Object>,
    template_xobject: Option<ObjectId>,
    template_cache: HashMap<ObjectId, ObjectId>,
}

impl<'t> CertificateDocument<'t> {
    pub fn new(template: &'t Template) -> Self {
        let mut output = Document::with_version("1.7");
        let pages_id = output.new_object_id();
        Self {
            template,
            output,
            pages_id,
            page_refs: Vec::new(),
            template_xobject: None,
            template_cache: HashMap::new(),
        }
    }

    /// Merge an overlay PDF onto the template and append the result as a page.
    pub fn push_page(&mut self, overlay_pdf: &[u8]) -> Result<()> {
        let overlay = Document::load_mem(overlay_pdf)?;
        let overlay_page = first_page_id(&overlay)?;

        let template_xobject = match self.template_xobject {
            Some(id) => id,
            None => {
                let id = create_page_xobject(
                    &mut self.output,
                    self.template.document(),
                    self.template.page_id(),
                    &mut self.template_cache,
                )?;
                self.template_xobject = Some(id);
                id
            }
        };
        let mut overlay_cache = HashMap::new();
        let overlay_xobject =
            create_page_xobject(&mut self.output, &overlay, overlay_page, &mut overlay_cache)?;

        let mut xobjects = Dictionary::new();
        xobjects.set(TEMPLATE_XOBJECT, Object::Reference(template_xobject));
        xobjects.set(OVERLAY_XOBJECT, Object::Reference(overlay_xobject));
        let mut resources = Dictionary::new();
        resources.set("XObject", Object::Dictionary(xobjects));

        // Template first, overlay last so the text sits on top
        let content = format!("q /{TEMPLATE_XOBJECT} Do Q\nq /{OVERLAY_XOBJECT} Do Q\n");
        let content_id = self
            .output
            .add_object(Stream::new(Dictionary::new(), content.into_bytes()));

        let mut page = Dictionary::new();
        page.set("Type", Object::Name(b"Page".to_vec()));
        page.set("Parent", Object::Reference(self.pages_id));
        page.set("MediaBox", rect_object(self.template.media_box()));
        for (key, rect) in &self.template.boxes {
            page.set(*key, rect_object(*rect));
        }
        page.set("Resources", Object::Dictionary(resources));
        page.set("Contents", Object::Reference(content_id));
        if let Some(rotate) = self.template.rotation() {
            page.set("Rotate", Object::Integer(rotate));
        }

        let page_id = self.output.add_object(page);
        self.page_refs.push(Object::Reference(page_id));
        Ok(())
    }

    pub fn page_count(&self) -> usize {
        self.page_refs.len()
    }

    /// Close the page tree and return the finished document.
    pub fn finish(mut self) -> Result<Document> {
        if self.page_refs.is_empty() {
            return Err(CertificateError::NoPages);
        }

        let count = self.page_refs.len() as i64;
        let pages_dict = Dictionary::from_iter(vec![
            ("Type", Object::Name(b"Pages".to_vec())),
            ("Kids", Object::Array(self.page_refs)),
            ("Count", Object::Integer(count)),
        ]);
        self.output
            .objects
            .insert(self.pages_id, Object::Dictionary(pages_dict));

        let catalog_id = self.output.add_object(Dictionary::from_iter(vec![
            ("Type", Object::Name(b"Catalog".to_vec())),
            ("Pages", Object::Reference(self.pages_id)),
        ]));
        self.output.trailer.set("Root", catalog_id);

        Ok(self.output)
    }
}

/// Merge one overlay onto the template, producing a single-page document.
pub fn compose_certificate(template: &Template, overlay_pdf: &[u8]) -> Result<Document> {
    let mut doc = CertificateDocument::new(template);
    doc.push_page(overlay_pdf)?;
    doc.finish()
}

/// Serialize a document to PDF bytes.
pub fn document_bytes(mut doc: Document) -> Result<Vec<u8>> {
    let mut writer = Vec::new();
    doc.save_to(&mut writer)?;
    Ok(writer)
}
