mod common;

use chrono::NaiveDate;
use common::*;
use lopdf::Document;
use pdf_certificates::*;
use std::io::{Cursor, Read};

fn job(names: &[&str], mode: OutputMode) -> BatchJob {
    let (width, height) = LANDSCAPE_A4;
    let template = Template::from_bytes(&template_bytes(1, width, height)).unwrap();
    BatchJob {
        records: names.iter().map(|name| record(name)).collect(),
        layout: LayoutOptions::for_page_width(template.width()),
        template,
        fonts: FontSet::default(),
        mode,
        prefix: "Padekos_rastas".to_string(),
        timestamp: NaiveDate::from_ymd_opt(2025, 6, 20)
            .unwrap()
            .and_hms_opt(14, 5, 9)
            .unwrap(),
    }
}

#[test]
fn test_single_mode_has_one_page_per_row_in_order() {
    let names = ["Ona", "Jonas Jonaitis", "Petras"];
    let job = job(&names, OutputMode::Single);

    let output = job.run().unwrap();
    assert_eq!(output.count, 3);
    assert_eq!(output.mode, OutputMode::Single);
    assert_eq!(output.file_name, "Padekos_rastas_visi_20250620_140509.pdf");

    let doc = Document::load_mem(&output.bytes).unwrap();
    let pages = doc.get_pages();
    assert_eq!(pages.len(), 3);

    // Each combined page carries the same overlay as that row's standalone PDF
    for (i, name) in names.iter().enumerate() {
        let page_id = *pages.get(&(i as u32 + 1)).unwrap();
        assert_eq!(media_box(&doc, page_id), vec![0.0, 0.0, 842.0, 595.0]);

        let single = Document::load_mem(&job.certificate(&record(name)).unwrap()).unwrap();
        let single_page = *single.get_pages().get(&1).unwrap();
        assert_eq!(
            overlay_content(&doc, page_id),
            overlay_content(&single, single_page)
        );
    }
}

#[test]
fn test_zip_mode_has_one_entry_per_row() {
    let job = job(&["Jonas/Jonaitis", "Ona", "  "], OutputMode::Zip);

    let output = job.run().unwrap();
    assert_eq!(output.count, 3);
    assert_eq!(output.file_name, "Padekos_rastas_20250620_140509.zip");

    let mut archive = zip::ZipArchive::new(Cursor::new(output.bytes)).unwrap();
    assert_eq!(archive.len(), 3);

    let expected = [
        "Padekos_rastas_Jonas_Jonaitis.pdf",
        "Padekos_rastas_Ona.pdf",
        "Padekos_rastas_record_3.pdf",
    ];
    for (i, name) in expected.iter().enumerate() {
        let mut entry = archive.by_index(i).unwrap();
        assert_eq!(entry.name(), *name);

        let mut bytes = Vec::new();
        entry.read_to_end(&mut bytes).unwrap();
        let doc = Document::load_mem(&bytes).unwrap();
        let pages = doc.get_pages();
        assert_eq!(pages.len(), 1);
        assert_eq!(
            media_box(&doc, *pages.get(&1).unwrap()),
            vec![0.0, 0.0, 842.0, 595.0]
        );
    }
}

#[test]
fn test_zip_entries_stay_unique() {
    let job = job(&["Ona", "Ona"], OutputMode::Zip);
    let output = job.run().unwrap();

    let mut archive = zip::ZipArchive::new(Cursor::new(output.bytes)).unwrap();
    assert_eq!(archive.len(), 2);
    assert_eq!(archive.by_index(0).unwrap().name(), "Padekos_rastas_Ona.pdf");
    assert_eq!(archive.by_index(1).unwrap().name(), "Padekos_rastas_Ona_2.pdf");
}

#[test]
fn test_certificates_are_named_and_ordered() {
    let job = job(&["Petras", "Ona"], OutputMode::Zip);
    let files = job.certificates().unwrap();
    let names: Vec<_> = files.iter().map(|f| f.file_name.as_str()).collect();
    assert_eq!(names, vec!["Padekos_rastas_Petras.pdf", "Padekos_rastas_Ona.pdf"]);
}

#[test]
fn test_empty_input_is_rejected() {
    let job = job(&[], OutputMode::Single);
    assert!(matches!(job.run(), Err(CertificateError::Config(_))));
}

#[test]
fn test_invalid_layout_aborts_before_rendering() {
    let mut job = job(&["Ona"], OutputMode::Zip);
    job.layout.name.font_size = 0.0;
    assert!(matches!(job.run(), Err(CertificateError::Config(_))));
}

#[test]
fn test_wrap_width_wider_than_template_is_rejected() {
    let mut job = job(&["Ona"], OutputMode::Single);
    job.layout.name_max_width = 900.0;
    assert!(job.layout.validate().is_ok());
    assert!(matches!(job.run(), Err(CertificateError::Config(_))));
    assert!(matches!(job.preview(0), Err(CertificateError::Config(_))));
}

#[test]
fn test_preview_selects_row() {
    let job = job(&["Ona", "Jonas/Jonaitis"], OutputMode::Zip);
    let preview = job.preview(1).unwrap();
    assert_eq!(preview.file_name, "preview_Jonas_Jonaitis.pdf");

    let doc = Document::load_mem(&preview.bytes).unwrap();
    assert_eq!(doc.get_pages().len(), 1);
}

#[test]
fn test_preview_out_of_range() {
    let job = job(&["Ona"], OutputMode::Zip);
    match job.preview(5) {
        Err(CertificateError::RowOutOfRange { index, len }) => {
            assert_eq!(index, 5);
            assert_eq!(len, 1);
        }
        other => panic!("Expected RowOutOfRange error, got {:?}", other.map(|f| f.file_name)),
    }
}

#[tokio::test]
async fn test_generate_and_write_output() {
    let dir = tempfile::tempdir().unwrap();
    let output = generate(job(&["Ona", "Jonas"], OutputMode::Single))
        .await
        .unwrap();

    let path = output.write_to(dir.path().join("out")).await.unwrap();
    assert_eq!(
        path.file_name().unwrap().to_str().unwrap(),
        "Padekos_rastas_visi_20250620_140509.pdf"
    );
    let doc = Document::load(&path).unwrap();
    assert_eq!(doc.get_pages().len(), 2);
}

#[tokio::test]
async fn test_preview_writes_file() {
    let dir = tempfile::tempdir().unwrap();
    let file = preview(job(&["Ona"], OutputMode::Zip), 0).await.unwrap();
    let path = file.write_to(dir.path()).await.unwrap();
    assert!(path.ends_with("preview_Ona.pdf"));
    assert!(path.exists());
}
