//! PDF rendering for certificates
//!
//! - Drawing the per-record text overlay
//! - Wrapping template and overlay pages as XObjects
//! - Compositing them into output pages

mod compose;
mod overlay;
mod xobject;

pub use compose::{CertificateDocument, Template, compose_certificate, document_bytes};
pub use overlay::{
    OverlayCanvas, OverlayPlan, PlacedLine, comment_anchor, plan_overlay, render_overlay,
};
pub use xobject::{copy_object_deep, create_page_xobject, first_page_id, page_dimensions, page_media_box};
