#![allow(dead_code)]

use lopdf::{Dictionary, Document, Object, ObjectId, Stream};
use pdf_certificates::Record;

pub const LANDSCAPE_A4: (i64, i64) = (842, 595);

/// Build a template PDF whose pages draw a filled border rectangle.
pub fn create_template(num_pages: usize, width: i64, height: i64) -> Document {
    let mut doc = Document::with_version("1.7");
    let pages_id = doc.new_object_id();

    let mut kids = Vec::new();
    for _ in 0..num_pages {
        let content = format!("q 0.9 g 10 10 {} {} re f Q", width - 20, height - 20);
        let content_id = doc.add_object(Stream::new(Dictionary::new(), content.into_bytes()));

        let page_id = doc.add_object(Dictionary::from_iter(vec![
            ("Type", Object::Name(b"Page".to_vec())),
            ("Parent", Object::Reference(pages_id)),
            (
                "MediaBox",
                Object::Array(vec![
                    Object::Integer(0),
                    Object::Integer(0),
                    Object::Integer(width),
                    Object::Integer(height),
                ]),
            ),
            ("Resources", Object::Dictionary(Dictionary::new())),
            ("Contents", Object::Reference(content_id)),
        ]));
        kids.push(Object::Reference(page_id));
    }

    let pages_dict = Dictionary::from_iter(vec![
        ("Type", Object::Name(b"Pages".to_vec())),
        ("Kids", Object::Array(kids)),
        ("Count", Object::Integer(num_pages as i64)),
    ]);
    doc.objects.insert(pages_id, Object::Dictionary(pages_dict));

    let catalog_id = doc.add_object(Dictionary::from_iter(vec![
        ("Type", Object::Name(b"Catalog".to_vec())),
        ("Pages", Object::Reference(pages_id)),
    ]));
    doc.trailer.set("Root", catalog_id);

    doc
}

pub fn template_bytes(num_pages: usize, width: i64, height: i64) -> Vec<u8> {
    let mut doc = create_template(num_pages, width, height);
    let mut writer = Vec::new();
    doc.save_to(&mut writer).unwrap();
    writer
}

pub fn record(name: &str) -> Record {
    Record {
        name: name.to_string(),
        class: "4a klasė".to_string(),
        kind: "PADEKA".to_string(),
        comment: "Uz puikius mokymosi rezultatus".to_string(),
        year: "Vilnius, 2025".to_string(),
    }
}

pub fn media_box(doc: &Document, page_id: ObjectId) -> Vec<f32> {
    doc.get_dictionary(page_id)
        .unwrap()
        .get(b"MediaBox")
        .unwrap()
        .as_array()
        .unwrap()
        .iter()
        .map(|v| match v {
            Object::Integer(i) => *i as f32,
            Object::Real(r) => *r,
            _ => panic!("non-numeric MediaBox entry"),
        })
        .collect()
}

/// Decoded content of the overlay XObject painted on `page_id`.
pub fn overlay_content(doc: &Document, page_id: ObjectId) -> Vec<u8> {
    let page = doc.get_dictionary(page_id).unwrap();
    let resources = page.get(b"Resources").unwrap().as_dict().unwrap();
    let xobjects = resources.get(b"XObject").unwrap().as_dict().unwrap();
    let overlay_id = xobjects.get(b"Ovl").unwrap().as_reference().unwrap();
    let stream = doc.get_object(overlay_id).unwrap().as_stream().unwrap();
    stream
        .decompressed_content()
        .unwrap_or_else(|_| stream.content.clone())
}
