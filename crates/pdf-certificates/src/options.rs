use crate::constants::*;
use crate::types::*;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Where and how large one field is drawn. Coordinates are points from the
/// bottom-left corner of the template page.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct FieldPlacement {
    pub x: f32,
    pub y: f32,
    pub font_size: f32,
}

impl FieldPlacement {
    pub fn new(x: f32, y: f32, font_size: f32) -> Self {
        Self { x, y, font_size }
    }
}

/// Text layout for one run. Read-only while rendering.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct LayoutOptions {
    // Field positions
    pub kind: FieldPlacement,
    pub name: FieldPlacement,
    pub class: FieldPlacement,
    pub comment: FieldPlacement,
    pub year: FieldPlacement,

    // Alignment and wrapping
    pub center_text: bool,
    pub wrap_comment: bool,
    pub comment_max_width: f32,
    pub name_max_width: f32,
}

impl Default for LayoutOptions {
    /// Defaults for an A4 landscape template (842pt wide).
    fn default() -> Self {
        Self::for_page_width(842.0)
    }
}

impl LayoutOptions {
    /// Default layout for a template of the given width: every field centered
    /// horizontally, names wrapping at three quarters of the page.
    pub fn for_page_width(width: f32) -> Self {
        let center = width / 2.0;
        Self {
            kind: FieldPlacement::new(center, DEFAULT_KIND_Y, DEFAULT_KIND_SIZE),
            name: FieldPlacement::new(center, DEFAULT_NAME_Y, DEFAULT_NAME_SIZE),
            class: FieldPlacement::new(center, DEFAULT_CLASS_Y, DEFAULT_CLASS_SIZE),
            comment: FieldPlacement::new(center, DEFAULT_COMMENT_Y, DEFAULT_COMMENT_SIZE),
            year: FieldPlacement::new(center, DEFAULT_YEAR_Y, DEFAULT_YEAR_SIZE),
            center_text: true,
            wrap_comment: true,
            comment_max_width: DEFAULT_COMMENT_MAX_WIDTH.min(width.floor()),
            name_max_width: (width * DEFAULT_NAME_WIDTH_RATIO).floor(),
        }
    }

    pub fn placement(&self, field: Field) -> &FieldPlacement {
        match field {
            Field::Kind => &self.kind,
            Field::Name => &self.name,
            Field::Class => &self.class,
            Field::Comment => &self.comment,
            Field::Year => &self.year,
        }
    }

    pub fn placement_mut(&mut self, field: Field) -> &mut FieldPlacement {
        match field {
            Field::Kind => &mut self.kind,
            Field::Name => &mut self.name,
            Field::Class => &mut self.class,
            Field::Comment => &mut self.comment,
            Field::Year => &mut self.year,
        }
    }

    /// Validate the layout on its own, without a template.
    pub fn validate(&self) -> Result<()> {
        for field in Field::ALL {
            let p = self.placement(field);
            if !p.x.is_finite() || !p.y.is_finite() {
                return Err(CertificateError::Config(format!(
                    "{} position must be a finite number",
                    field.name()
                )));
            }
            if !(MIN_FONT_SIZE..=MAX_FONT_SIZE).contains(&p.font_size) {
                return Err(CertificateError::Config(format!(
                    "{} font size must be between {} and {} pt (got {})",
                    field.name(),
                    MIN_FONT_SIZE,
                    MAX_FONT_SIZE,
                    p.font_size
                )));
            }
        }

        for (label, width) in self.wrap_widths() {
            if !(width >= MIN_WRAP_WIDTH) {
                return Err(CertificateError::Config(format!(
                    "{} width must be at least {} pt (got {})",
                    label, MIN_WRAP_WIDTH, width
                )));
            }
        }

        Ok(())
    }

    /// Validate the layout for a template page `page_width` points wide.
    /// Wrap widths may not exceed the page.
    pub fn validate_for_page(&self, page_width: f32) -> Result<()> {
        self.validate()?;

        for (label, width) in self.wrap_widths() {
            if width > page_width {
                return Err(CertificateError::Config(format!(
                    "{} width {} pt is wider than the {} pt template",
                    label, width, page_width
                )));
            }
        }

        Ok(())
    }

    /// Wrap widths in effect; the comment width only counts while wrapping.
    fn wrap_widths(&self) -> Vec<(&'static str, f32)> {
        let mut widths = vec![("Name", self.name_max_width)];
        if self.wrap_comment {
            widths.push(("Comment", self.comment_max_width));
        }
        widths
    }
}

/// CSV header labels for each field.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct ColumnNames {
    pub name: String,
    pub class: String,
    pub kind: String,
    pub comment: String,
    /// Optional column; missing or blank cells get the city/year default
    pub year: String,
}

impl Default for ColumnNames {
    fn default() -> Self {
        Self {
            name: "Vardas".to_string(),
            class: "Klasė".to_string(),
            kind: "TIPAS".to_string(),
            comment: "Komentaras".to_string(),
            year: "Metai".to_string(),
        }
    }
}

impl ColumnNames {
    /// Columns that must be present in the input, in reporting order.
    pub fn required(&self) -> [&str; 4] {
        [&self.name, &self.class, &self.kind, &self.comment]
    }
}

/// Everything an operator can set for a run, as stored in a JSON config.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct CertificateConfig {
    pub layout: LayoutOptions,
    pub columns: ColumnNames,
    /// City used for blank year cells
    pub city: String,
    /// Output file name prefix
    pub prefix: String,
    pub output_mode: OutputMode,
}

impl Default for CertificateConfig {
    fn default() -> Self {
        Self {
            layout: LayoutOptions::default(),
            columns: ColumnNames::default(),
            city: DEFAULT_CITY.to_string(),
            prefix: DEFAULT_PREFIX.to_string(),
            output_mode: OutputMode::default(),
        }
    }
}

impl CertificateConfig {
    /// Defaults with the layout derived from the template width.
    pub fn for_page_width(width: f32) -> Self {
        Self {
            layout: LayoutOptions::for_page_width(width),
            ..Default::default()
        }
    }

    /// Load options from JSON file
    #[cfg(feature = "serde")]
    pub async fn load(path: impl AsRef<std::path::Path>) -> Result<Self> {
        let bytes = tokio::fs::read(path).await?;
        let config = serde_json::from_slice(&bytes)
            .map_err(|e| CertificateError::Config(format!("Failed to parse config: {}", e)))?;
        Ok(config)
    }

    /// Save options to JSON file
    #[cfg(feature = "serde")]
    pub async fn save(&self, path: impl AsRef<std::path::Path>) -> Result<()> {
        let json = serde_json::to_string_pretty(self)
            .map_err(|e| CertificateError::Config(format!("Failed to serialize config: {}", e)))?;
        tokio::fs::write(path, json).await?;
        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        self.layout.validate()?;

        if self.prefix.trim().is_empty() {
            return Err(CertificateError::Config(
                "Output prefix must not be empty".to_string(),
            ));
        }

        let required = self.columns.required();
        for (i, column) in required.iter().enumerate() {
            if column.trim().is_empty() {
                return Err(CertificateError::Config(
                    "Column names must not be empty".to_string(),
                ));
            }
            if required[..i].contains(column) {
                return Err(CertificateError::Config(format!(
                    "Column \"{}\" is mapped to more than one field",
                    column
                )));
            }
        }

        Ok(())
    }
}
