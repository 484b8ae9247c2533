mod common;

use common::*;
use lopdf::Document;
use pdf_certificates::render::{OverlayCanvas, OverlayPlan, page_dimensions, plan_overlay};
use pdf_certificates::*;

fn comment_y(plan: &OverlayPlan) -> f32 {
    plan.field_lines(Field::Comment).next().unwrap().y
}

#[test]
fn test_two_line_name_shifts_comment_by_fixed_offset() {
    let fonts = FontSet::default();
    let layout = LayoutOptions {
        name_max_width: 300.0,
        ..LayoutOptions::for_page_width(842.0)
    };

    let short = record("Ona");
    let long = record("Konstantinas Aleksandravičius-Žemaitaitis");

    let short_plan = plan_overlay(&short, &layout, &fonts);
    let long_plan = plan_overlay(&long, &layout, &fonts);

    assert_eq!(short_plan.name_lines, 1);
    assert_eq!(long_plan.name_lines, 2);
    assert_eq!(
        comment_y(&short_plan) - comment_y(&long_plan),
        NAME_WRAP_COMMENT_OFFSET
    );
}

#[test]
fn test_name_never_exceeds_two_lines() {
    let layout = LayoutOptions {
        name_max_width: 100.0,
        ..Default::default()
    };
    let plan = plan_overlay(
        &record("Ana Marija Ona Elena Birutė Jonaitytė"),
        &layout,
        &FontSet::default(),
    );

    let name_lines: Vec<_> = plan.field_lines(Field::Name).collect();
    assert_eq!(plan.name_lines, 2);
    assert_eq!(name_lines.len(), 2);

    // Second line sits one line height below the first
    let step = layout.name.font_size * LINE_HEIGHT_FACTOR;
    assert!((name_lines[0].y - name_lines[1].y - step).abs() < 0.001);
    assert_eq!(name_lines[0].y, layout.name.y);
}

#[test]
fn test_comment_wraps_only_when_enabled() {
    let fonts = FontSet::default();
    let mut rec = record("Ona");
    rec.comment = "Už puikų mokymąsi, aktyvų dalyvavimą olimpiadose, konkursuose ir \
                   mokyklos renginiuose visus mokslo metus"
        .to_string();

    let wrapping = LayoutOptions {
        comment_max_width: 200.0,
        ..Default::default()
    };
    let plan = plan_overlay(&rec, &wrapping, &fonts);
    let lines: Vec<_> = plan.field_lines(Field::Comment).collect();
    assert!(lines.len() > 2);
    for line in &lines {
        assert!(fonts.light.text_width(&line.text, line.font_size) <= 200.0);
    }

    let single = LayoutOptions {
        wrap_comment: false,
        comment_max_width: 200.0,
        ..Default::default()
    };
    let plan = plan_overlay(&rec, &single, &fonts);
    assert_eq!(plan.field_lines(Field::Comment).count(), 1);
}

#[test]
fn test_short_fields_never_wrap() {
    let mut rec = record("Ona");
    rec.kind = "PADĖKA UŽ IŠSKIRTINIUS PASIEKIMUS MATEMATIKOS OLIMPIADOJE".to_string();
    rec.class = "1a 2b 3c 4d 5e 6f 7g 8h 9i 10j 11k 12l 13m 14n 15o".to_string();

    let plan = plan_overlay(&rec, &LayoutOptions::default(), &FontSet::default());
    assert_eq!(plan.field_lines(Field::Kind).count(), 1);
    assert_eq!(plan.field_lines(Field::Class).count(), 1);
    assert_eq!(plan.field_lines(Field::Year).count(), 1);
}

#[test]
fn test_fields_use_their_font_roles() {
    let plan = plan_overlay(&record("Ona"), &LayoutOptions::default(), &FontSet::default());
    for line in &plan.lines {
        assert_eq!(line.role, line.field.font_role());
    }
    assert_eq!(Field::Kind.font_role(), FontRole::Bold);
    assert_eq!(Field::Comment.font_role(), FontRole::Light);
}

#[test]
fn test_overlay_page_matches_template_size() {
    let bytes = render_overlay(
        &record("Jonas Jonaitis"),
        &LayoutOptions::default(),
        &FontSet::default(),
        842.0,
        595.0,
    )
    .unwrap();

    let doc = Document::load_mem(&bytes).unwrap();
    let pages = doc.get_pages();
    assert_eq!(pages.len(), 1);

    let page_id = *pages.get(&1).unwrap();
    let (width, height) = page_dimensions(&doc, page_id).unwrap();
    assert!((width - 842.0).abs() < 0.5);
    assert!((height - 595.0).abs() < 0.5);
}

#[test]
fn test_empty_canvas_still_produces_a_page() {
    let fonts = FontSet::default();
    let mut canvas = OverlayCanvas::new(595.0, 842.0, &fonts).unwrap();
    canvas.draw_text(FontRole::Regular, 12.0, 10.0, 10.0, "");

    let bytes = canvas.finish().unwrap();
    let doc = Document::load_mem(&bytes).unwrap();
    assert_eq!(doc.get_pages().len(), 1);
}
