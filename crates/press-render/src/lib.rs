//! Press Render - PDF backend
//!
//! Paints laid-out pages into PDF bytes with pdf-writer:
//! - One page object per layout page, MediaBox equal to the page size
//! - Embedded TrueType/OpenType fonts (Type0, Identity-H, ToUnicode)
//! - Standard Helvetica when no font file was available
//! - JPEG passthrough and Flate-compressed RGB images with soft masks
//!
//! Output is deterministic: no timestamps or document IDs, and every
//! resource is numbered in first-use order.

mod fonts;
mod images;
mod paint;

pub use images::{ImageResource, ResourceSet};
pub use paint::{PaintOptions, Painter};

use press_layout::Page;

/// Paint error types
#[derive(Debug, Clone, thiserror::Error)]
pub enum PaintError {
    #[error("Nothing to paint: layout produced no pages")]
    NoPages,

    #[error("Failed to decode image {src:?}: {reason}")]
    ImageDecode { src: String, reason: String },

    #[error("Painting did not finish before its deadline")]
    DeadlineExceeded,
}

pub type Result<T> = std::result::Result<T, PaintError>;

/// Paint `pages` with `options`
pub fn paint(pages: &[Page], resources: &ResourceSet, options: &PaintOptions) -> Result<Vec<u8>> {
    Painter::new(options.clone()).paint(pages, resources)
}
