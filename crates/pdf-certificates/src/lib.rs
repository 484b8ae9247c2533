//! Personalized certificate PDFs from CSV rows
//!
//! Each row is rendered as a text overlay, merged onto the first page of a
//! template PDF and packaged either as one combined PDF or as a zip archive of
//! single-page PDFs.

pub mod batch;
mod constants;
pub mod csv;
pub mod fonts;
mod options;
pub mod render;
mod types;
pub mod wrap;

pub use batch::{BatchJob, BatchOutput, CertificateFile, generate, preview, safe_file_stem};
pub use constants::{LINE_HEIGHT_FACTOR, NAME_MAX_LINES, NAME_WRAP_COMMENT_OFFSET};
pub use self::csv::{current_year, fill_year, load_records, parse_records, write_sample_csv};
pub use fonts::{FontFace, FontPaths, FontSet, TextMeasure};
pub use options::*;
pub use render::{CertificateDocument, Template, compose_certificate, document_bytes, render_overlay};
pub use types::*;
pub use wrap::wrap_text;
