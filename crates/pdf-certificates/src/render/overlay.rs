//! Per-record text overlay
//!
//! Rendering happens in two steps. [`plan_overlay`] decides what text goes
//! where (wrapping, alignment, the comment shift after a two-line name) and
//! [`OverlayCanvas`] turns the planned lines into a one-page PDF the size of
//! the template.

use crate::constants::{LINE_HEIGHT_FACTOR, NAME_MAX_LINES, NAME_WRAP_COMMENT_OFFSET, OVERLAY_TITLE};
use crate::fonts::{EmbeddedFont, FontFace, FontSet, TextMeasure};
use crate::options::{FieldPlacement, LayoutOptions};
use crate::types::{CertificateError, Field, FontRole, Record, Result};
use crate::wrap::wrap_text;
use printpdf::*;
use std::collections::HashMap;

// =============================================================================
// Planning
// =============================================================================

/// One line of text at its final baseline position.
#[derive(Debug, Clone, PartialEq)]
pub struct PlacedLine {
    pub field: Field,
    pub role: FontRole,
    pub font_size: f32,
    pub x: f32,
    pub y: f32,
    pub text: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct OverlayPlan {
    pub lines: Vec<PlacedLine>,
    /// Lines the name actually used (1 or 2)
    pub name_lines: usize,
}

impl OverlayPlan {
    pub fn field_lines(&self, field: Field) -> impl Iterator<Item = &PlacedLine> {
        self.lines.iter().filter(move |line| line.field == field)
    }
}

/// Lay out all five fields of `record`.
pub fn plan_overlay(record: &Record, layout: &LayoutOptions, fonts: &FontSet) -> OverlayPlan {
    let mut lines = Vec::new();
    let mut place = |field: Field, placement: FieldPlacement, wrap: Option<(f32, Option<usize>)>| {
        place_field(
            &mut lines,
            field,
            record.field(field),
            &placement,
            fonts.face(field.font_role()),
            layout.center_text,
            wrap,
        )
    };

    place(Field::Kind, layout.kind, None);
    let name_lines = place(
        Field::Name,
        layout.name,
        Some((layout.name_max_width, Some(NAME_MAX_LINES))),
    );
    place(Field::Class, layout.class, None);

    let comment_wrap = layout
        .wrap_comment
        .then_some((layout.comment_max_width, None));
    place(Field::Comment, comment_anchor(layout, name_lines), comment_wrap);

    place(Field::Year, layout.year, None);

    OverlayPlan { lines, name_lines }
}

/// Comment position after accounting for the name block.
///
/// A name that wrapped onto a second line pushes the comment down by a fixed
/// offset; the shift does not depend on the name font size.
pub fn comment_anchor(layout: &LayoutOptions, name_lines: usize) -> FieldPlacement {
    let mut anchor = layout.comment;
    if name_lines > 1 {
        anchor.y -= NAME_WRAP_COMMENT_OFFSET;
    }
    anchor
}

/// Wrap and position one field, returning the number of lines used.
fn place_field(
    out: &mut Vec<PlacedLine>,
    field: Field,
    text: &str,
    placement: &FieldPlacement,
    face: &FontFace,
    center: bool,
    wrap: Option<(f32, Option<usize>)>,
) -> usize {
    let (max_width, max_lines) = match wrap {
        Some((width, lines)) => (Some(width), lines),
        None => (None, None),
    };
    let wrapped = wrap_text(text, face, placement.font_size, max_width, max_lines);
    let line_height = placement.font_size * LINE_HEIGHT_FACTOR;

    for (i, line) in wrapped.iter().enumerate() {
        let x = if center {
            placement.x - face.text_width(line, placement.font_size) / 2.0
        } else {
            placement.x
        };
        out.push(PlacedLine {
            field,
            role: field.font_role(),
            font_size: placement.font_size,
            x,
            y: placement.y - i as f32 * line_height,
            text: line.clone(),
        });
    }

    wrapped.len()
}

// =============================================================================
// Drawing
// =============================================================================

/// Accumulates text draws for a single overlay page.
pub struct OverlayCanvas<'a> {
    doc: PdfDocument,
    fonts: &'a FontSet,
    font_ids: HashMap<FontRole, FontId>,
    width_pt: f32,
    height_pt: f32,
    ops: Vec<Op>,
}

impl<'a> OverlayCanvas<'a> {
    pub fn new(width_pt: f32, height_pt: f32, fonts: &'a FontSet) -> Result<Self> {
        let mut doc = PdfDocument::new(OVERLAY_TITLE);

        // Roles sharing one loaded file share one embedded font
        let mut embedded: Vec<(&EmbeddedFont, FontId)> = Vec::new();
        let mut font_ids = HashMap::new();
        for role in [FontRole::Regular, FontRole::Bold, FontRole::Light] {
            let FontFace::Embedded(font) = fonts.face(role) else {
                continue;
            };
            let id = match embedded.iter().find(|(seen, _)| seen.same_source(font)) {
                Some((_, id)) => id.clone(),
                None => {
                    let id = doc.add_font(&font.to_parsed()?);
                    embedded.push((font, id.clone()));
                    id
                }
            };
            font_ids.insert(role, id);
        }

        Ok(Self {
            doc,
            fonts,
            font_ids,
            width_pt,
            height_pt,
            ops: Vec::new(),
        })
    }

    /// Draw one line with its left edge at `(x, y)`.
    pub fn draw_text(&mut self, role: FontRole, font_size: f32, x: f32, y: f32, text: &str) {
        if text.is_empty() {
            return;
        }

        let fonts = self.fonts;
        let font_id = self.font_ids.get(&role).cloned();

        self.ops.push(Op::StartTextSection);
        match (fonts.face(role), font_id) {
            (FontFace::Embedded(_), Some(font_id)) => {
                self.ops.push(Op::SetFontSize {
                    font: font_id.clone(),
                    size: Pt(font_size),
                });
                self.ops.push(Op::SetTextMatrix {
                    matrix: TextMatrix::Translate(Pt(x), Pt(y)),
                });
                self.ops.push(Op::WriteText {
                    items: vec![TextItem::Text(text.to_string())],
                    font: font_id,
                });
            }
            (face, _) => {
                let font = match face {
                    FontFace::Builtin(font) => *font,
                    FontFace::Embedded(_) => BuiltinFont::Helvetica,
                };
                self.ops.push(Op::SetFontSizeBuiltinFont {
                    font,
                    size: Pt(font_size),
                });
                self.ops.push(Op::SetTextCursor {
                    pos: Point { x: Pt(x), y: Pt(y) },
                });
                self.ops.push(Op::WriteTextBuiltinFont {
                    items: vec![TextItem::Text(text.to_string())],
                    font,
                });
            }
        }
        self.ops.push(Op::EndTextSection);
    }

    pub fn draw_line(&mut self, line: &PlacedLine) {
        self.draw_text(line.role, line.font_size, line.x, line.y, &line.text);
    }

    /// Serialize the page into PDF bytes.
    pub fn finish(mut self) -> Result<Vec<u8>> {
        self.doc.pages.push(PdfPage::new(
            Mm::from(Pt(self.width_pt)),
            Mm::from(Pt(self.height_pt)),
            self.ops,
        ));

        let mut warnings = Vec::new();
        let bytes = self.doc.save(&PdfSaveOptions::default(), &mut warnings);
        if bytes.is_empty() {
            return Err(CertificateError::Render(
                "overlay serialized to an empty document".to_string(),
            ));
        }
        Ok(bytes)
    }
}

/// Render the overlay page for one record.
pub fn render_overlay(
    record: &Record,
    layout: &LayoutOptions,
    fonts: &FontSet,
    width_pt: f32,
    height_pt: f32,
) -> Result<Vec<u8>> {
    let plan = plan_overlay(record, layout, fonts);

    let mut canvas = OverlayCanvas::new(width_pt, height_pt, fonts)?;
    for line in &plan.lines {
        canvas.draw_line(line);
    }
    canvas.finish()
}
