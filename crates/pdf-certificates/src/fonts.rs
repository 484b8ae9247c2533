//! Fonts and text measurement
//!
//! Fields are drawn with one of three font roles (regular, bold, light). Each
//! role is backed either by a PDF base-14 Helvetica face, measured with the
//! standard AFM widths, or by an embedded TrueType file measured from its
//! `hmtx` advances.

use crate::types::{CertificateError, FontRole, Result};
use printpdf::{BuiltinFont, ParsedFont};
use std::collections::HashMap;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Measures the rendered width of a string in points.
pub trait TextMeasure {
    fn text_width(&self, text: &str, font_size: f32) -> f32;
}

// =============================================================================
// Font Faces
// =============================================================================

/// A font that can both be measured and drawn into an overlay.
#[derive(Clone)]
pub enum FontFace {
    Builtin(BuiltinFont),
    Embedded(EmbeddedFont),
}

/// A TrueType font loaded from disk.
///
/// Holds the raw file and a per-character advance table. The printpdf
/// representation is built by the overlay canvas on the rendering thread.
#[derive(Clone)]
pub struct EmbeddedFont {
    pub name: String,
    data: Arc<Vec<u8>>,
    advances: Arc<HashMap<char, u16>>,
    units_per_em: f32,
}

impl EmbeddedFont {
    pub fn from_bytes(name: impl Into<String>, data: Vec<u8>) -> Result<Self> {
        let name = name.into();

        let face = ttf_parser::Face::parse(&data, 0)
            .map_err(|e| CertificateError::Font(format!("{name}: {e}")))?;
        let units_per_em = face.units_per_em() as f32;
        let advances = advance_table(&face);

        let font = Self {
            name,
            data: Arc::new(data),
            advances: Arc::new(advances),
            units_per_em,
        };
        // Reject files printpdf cannot embed
        font.to_parsed()?;
        Ok(font)
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    pub fn units_per_em(&self) -> f32 {
        self.units_per_em
    }

    /// True when both handles come from the same loaded file.
    pub fn same_source(&self, other: &EmbeddedFont) -> bool {
        Arc::ptr_eq(&self.data, &other.data)
    }

    /// Parse the font for embedding with printpdf.
    pub fn to_parsed(&self) -> Result<ParsedFont> {
        let mut warnings = Vec::new();
        ParsedFont::from_bytes(&self.data, 0, &mut warnings).ok_or_else(|| {
            CertificateError::Font(format!("{}: failed to parse font", self.name))
        })
    }
}

/// Horizontal advance of every character mapped by the font's Unicode cmaps.
fn advance_table(face: &ttf_parser::Face<'_>) -> HashMap<char, u16> {
    let mut advances = HashMap::new();
    let Some(cmap) = face.tables().cmap else {
        return advances;
    };

    for subtable in cmap.subtables {
        if !subtable.is_unicode() {
            continue;
        }
        subtable.codepoints(|code| {
            let Some(ch) = char::from_u32(code) else {
                return;
            };
            if let Some(advance) = subtable
                .glyph_index(code)
                .and_then(|glyph| face.glyph_hor_advance(glyph))
            {
                advances.entry(ch).or_insert(advance);
            }
        });
    }
    advances
}

impl fmt::Debug for EmbeddedFont {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EmbeddedFont")
            .field("name", &self.name)
            .field("units_per_em", &self.units_per_em)
            .finish()
    }
}

impl fmt::Debug for FontFace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FontFace::Builtin(font) => write!(f, "Builtin({})", builtin_name(*font)),
            FontFace::Embedded(font) => font.fmt(f),
        }
    }
}

impl FontFace {
    /// Load a TrueType font, naming it after the file stem.
    pub async fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_owned();
        let data = tokio::fs::read(&path).await?;
        let name = path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| "font".to_string());

        let font = tokio::task::spawn_blocking(move || EmbeddedFont::from_bytes(name, data))
            .await??;
        Ok(FontFace::Embedded(font))
    }

    pub fn name(&self) -> &str {
        match self {
            FontFace::Builtin(font) => builtin_name(*font),
            FontFace::Embedded(font) => &font.name,
        }
    }
}

impl TextMeasure for FontFace {
    fn text_width(&self, text: &str, font_size: f32) -> f32 {
        match self {
            FontFace::Builtin(font) => builtin_text_width(*font, text, font_size),
            FontFace::Embedded(font) => font.text_width(text, font_size),
        }
    }
}

impl TextMeasure for EmbeddedFont {
    fn text_width(&self, text: &str, font_size: f32) -> f32 {
        let units: u32 = text
            .chars()
            .map(|ch| self.advances.get(&ch).copied().unwrap_or(0) as u32)
            .sum();

        units as f32 / self.units_per_em * font_size
    }
}

// =============================================================================
// Font Sets
// =============================================================================

/// Font files supplied by the operator. Any may be absent.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FontPaths {
    pub regular: Option<PathBuf>,
    pub bold: Option<PathBuf>,
    pub light: Option<PathBuf>,
}

/// The three faces used by the overlay renderer.
#[derive(Debug, Clone)]
pub struct FontSet {
    pub regular: FontFace,
    pub bold: FontFace,
    pub light: FontFace,
}

impl Default for FontSet {
    /// Helvetica for every role.
    fn default() -> Self {
        Self::uniform(FontFace::Builtin(BuiltinFont::Helvetica))
    }
}

impl FontSet {
    pub fn uniform(face: FontFace) -> Self {
        Self {
            regular: face.clone(),
            bold: face.clone(),
            light: face,
        }
    }

    pub fn face(&self, role: FontRole) -> &FontFace {
        match role {
            FontRole::Regular => &self.regular,
            FontRole::Bold => &self.bold,
            FontRole::Light => &self.light,
        }
    }

    /// Load the configured fonts, falling back where a file is absent or broken.
    ///
    /// Regular falls back to Helvetica; bold and light fall back to regular.
    pub async fn load(paths: &FontPaths) -> Self {
        let regular = match load_optional(paths.regular.as_deref(), "regular").await {
            Some(face) => face,
            None => FontFace::Builtin(BuiltinFont::Helvetica),
        };
        let bold = load_optional(paths.bold.as_deref(), "bold")
            .await
            .unwrap_or_else(|| regular.clone());
        let light = load_optional(paths.light.as_deref(), "light")
            .await
            .unwrap_or_else(|| regular.clone());

        log::info!(
            "Fonts: regular={}, bold={}, light={}",
            regular.name(),
            bold.name(),
            light.name()
        );

        Self {
            regular,
            bold,
            light,
        }
    }
}

async fn load_optional(path: Option<&Path>, role: &str) -> Option<FontFace> {
    let path = path?;
    match FontFace::load(path).await {
        Ok(face) => Some(face),
        Err(e) => {
            log::warn!(
                "Could not load {} font {}: {}; using fallback",
                role,
                path.display(),
                e
            );
            None
        }
    }
}

// =============================================================================
// Base-14 Metrics
// =============================================================================

fn builtin_name(font: BuiltinFont) -> &'static str {
    match font {
        BuiltinFont::HelveticaBold => "Helvetica-Bold",
        BuiltinFont::HelveticaOblique => "Helvetica-Oblique",
        BuiltinFont::HelveticaBoldOblique => "Helvetica-BoldOblique",
        BuiltinFont::Courier
        | BuiltinFont::CourierBold
        | BuiltinFont::CourierOblique
        | BuiltinFont::CourierBoldOblique => "Courier",
        _ => "Helvetica",
    }
}

fn builtin_text_width(font: BuiltinFont, text: &str, font_size: f32) -> f32 {
    let units: u32 = match font {
        BuiltinFont::Courier
        | BuiltinFont::CourierBold
        | BuiltinFont::CourierOblique
        | BuiltinFont::CourierBoldOblique => text.chars().count() as u32 * COURIER_WIDTH,
        BuiltinFont::HelveticaBold | BuiltinFont::HelveticaBoldOblique => text
            .chars()
            .map(|ch| afm_width(&HELVETICA_BOLD_WIDTHS, ch, 611))
            .sum(),
        _ => text
            .chars()
            .map(|ch| afm_width(&HELVETICA_WIDTHS, ch, 556))
            .sum(),
    };
    units as f32 / 1000.0 * font_size
}

fn afm_width(table: &[u16; 95], ch: char, fallback: u16) -> u32 {
    let code = ch as u32;
    if (32..127).contains(&code) {
        table[(code - 32) as usize] as u32
    } else {
        fallback as u32
    }
}

const COURIER_WIDTH: u32 = 600;

/// Helvetica advance widths for ASCII 32..=126 (1000 units per em).
#[rustfmt::skip]
const HELVETICA_WIDTHS: [u16; 95] = [
    278, 278, 355, 556, 556, 889, 667, 191, 333, 333, 389, 584, 278, 333, 278, 278,
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556, 278, 278, 584, 584, 584, 556,
    1015, 667, 667, 722, 722, 667, 611, 778, 722, 278, 500, 667, 556, 833, 722, 778,
    667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611, 278, 278, 278, 469, 556,
    333, 556, 556, 500, 556, 556, 278, 556, 556, 222, 222, 500, 222, 833, 556, 556,
    556, 556, 333, 500, 278, 556, 500, 722, 500, 500, 500, 334, 260, 334, 584,
];

/// Helvetica-Bold advance widths for ASCII 32..=126.
#[rustfmt::skip]
const HELVETICA_BOLD_WIDTHS: [u16; 95] = [
    278, 333, 474, 556, 556, 889, 722, 238, 333, 333, 389, 584, 278, 333, 278, 278,
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556, 333, 333, 584, 584, 584, 611,
    975, 722, 722, 722, 722, 667, 611, 778, 722, 278, 556, 722, 611, 833, 722, 778,
    667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611, 333, 278, 333, 584, 556,
    333, 556, 611, 556, 611, 556, 333, 611, 611, 278, 278, 556, 278, 889, 611, 611,
    611, 611, 389, 556, 333, 611, 556, 778, 556, 556, 500, 389, 280, 389, 584,
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_helvetica_space_and_letters() {
        let face = FontFace::Builtin(BuiltinFont::Helvetica);
        // "Hi" = H(722) + i(222)
        assert!((face.text_width("Hi", 10.0) - 9.44).abs() < 0.001);
        assert!((face.text_width(" ", 1000.0) - 278.0).abs() < 0.001);
    }

    #[test]
    fn test_bold_is_wider() {
        let regular = FontFace::Builtin(BuiltinFont::Helvetica);
        let bold = FontFace::Builtin(BuiltinFont::HelveticaBold);
        assert!(bold.text_width("certificate", 12.0) > regular.text_width("certificate", 12.0));
    }

    #[test]
    fn test_width_scales_with_size() {
        let face = FontFace::Builtin(BuiltinFont::Helvetica);
        let w10 = face.text_width("Jonas", 10.0);
        let w20 = face.text_width("Jonas", 20.0);
        assert!((w20 - 2.0 * w10).abs() < 0.001);
    }

    #[test]
    fn test_non_ascii_uses_fallback_width() {
        let face = FontFace::Builtin(BuiltinFont::Helvetica);
        assert!((face.text_width("ž", 1000.0) - 556.0).abs() < 0.001);
    }

    #[test]
    fn test_courier_is_monospaced() {
        let face = FontFace::Builtin(BuiltinFont::Courier);
        assert_eq!(face.text_width("iiii", 10.0), face.text_width("MMMM", 10.0));
    }

    #[test]
    fn test_font_sets_move_across_threads() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<FontSet>();
        assert_send_sync::<EmbeddedFont>();
    }

    #[tokio::test]
    async fn test_missing_font_files_fall_back() {
        let paths = FontPaths {
            regular: Some(PathBuf::from("/nonexistent/regular.ttf")),
            bold: None,
            light: Some(PathBuf::from("/nonexistent/light.ttf")),
        };
        let fonts = FontSet::load(&paths).await;
        assert_eq!(fonts.regular.name(), "Helvetica");
        assert_eq!(fonts.bold.name(), "Helvetica");
        assert_eq!(fonts.light.name(), "Helvetica");
    }
}
