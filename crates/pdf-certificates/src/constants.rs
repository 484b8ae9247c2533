//! Shared constants for certificate rendering
//!
//! Layout defaults are tuned for the A4 landscape certificate template the
//! tool was built around; all values are in PDF points.

// =============================================================================
// Text Layout
// =============================================================================

/// Line height as a multiple of font size for wrapped fields.
pub const LINE_HEIGHT_FACTOR: f32 = 1.2;

/// Maximum number of lines the name field may occupy.
pub const NAME_MAX_LINES: usize = 2;

/// How far the comment moves down when the name wraps onto a second line.
///
/// Tuned for the default 46pt name; larger name fonts can still overlap.
pub const NAME_WRAP_COMMENT_OFFSET: f32 = 55.0;

// =============================================================================
// Default Layout
// =============================================================================

pub const DEFAULT_KIND_Y: f32 = 540.0;
pub const DEFAULT_NAME_Y: f32 = 400.0;
pub const DEFAULT_CLASS_Y: f32 = 460.0;
pub const DEFAULT_COMMENT_Y: f32 = 360.0;
pub const DEFAULT_YEAR_Y: f32 = 55.0;

pub const DEFAULT_KIND_SIZE: f32 = 46.0;
pub const DEFAULT_NAME_SIZE: f32 = 46.0;
pub const DEFAULT_CLASS_SIZE: f32 = 20.0;
pub const DEFAULT_COMMENT_SIZE: f32 = 20.0;
pub const DEFAULT_YEAR_SIZE: f32 = 14.0;

/// Default comment wrap width (points)
pub const DEFAULT_COMMENT_MAX_WIDTH: f32 = 420.0;

/// Default name wrap width as a fraction of the template width
pub const DEFAULT_NAME_WIDTH_RATIO: f32 = 0.75;

// =============================================================================
// Operator Bounds
// =============================================================================

pub const MIN_FONT_SIZE: f32 = 8.0;
pub const MAX_FONT_SIZE: f32 = 96.0;

/// Narrowest wrap width accepted for the name and comment. The widest is the
/// template width.
pub const MIN_WRAP_WIDTH: f32 = 100.0;

// =============================================================================
// Output
// =============================================================================

pub const DEFAULT_CITY: &str = "Vilnius";
pub const DEFAULT_PREFIX: &str = "Padekos_rastas";

/// Marker between the prefix and timestamp of the combined PDF name.
pub const COMBINED_MARKER: &str = "visi";

/// Timestamp format used in batch artifact names.
pub const TIMESTAMP_FORMAT: &str = "%Y%m%d_%H%M%S";

/// Title written into every overlay document.
pub const OVERLAY_TITLE: &str = "Certificate";

// =============================================================================
// Page Dimensions
// =============================================================================

/// Fallback page size when a template page has no usable MediaBox (A4 portrait).
pub const DEFAULT_PAGE_DIMENSIONS: (f32, f32) = (595.0, 842.0);
