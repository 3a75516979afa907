//! Press Text - fonts and text measurement
//!
//! This crate provides everything layout and paint need to know about text:
//! - Font loading and matching (fontdb), cached process-wide
//! - Text shaping (rustybuzz - HarfBuzz port)
//! - Built-in Helvetica metrics when no font file can be loaded
//! - Greedy line breaking

pub mod font;
pub mod linebreak;
pub mod shaping;

pub use font::{FontContext, FontHandle, FontKey, FontLibrary, FontQuery, LoadedFace};
pub use linebreak::{Segment, break_lines, force_break};
pub use shaping::{ShapedGlyph, ShapedRun, measure, shape};

/// Text error types
#[derive(Debug, Clone, thiserror::Error)]
pub enum TextError {
    #[error("No installed font matches {families:?} (weight {weight})")]
    FontResolution { families: Vec<String>, weight: u16 },

    #[error("Failed to parse font: {0}")]
    FontParsing(String),

    #[error("Shaping failed: {0}")]
    ShapingFailed(String),
}

pub type Result<T> = std::result::Result<T, TextError>;
