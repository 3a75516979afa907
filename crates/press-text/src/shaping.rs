//! Text shaping
//!
//! Installed faces are shaped with rustybuzz; the built-in fallback maps
//! characters to WinAnsi codes and uses the Helvetica width table. Advances
//! are returned in points.

use rustybuzz::{Face, UnicodeBuffer};

use crate::font::{FontHandle, builtin_advance, winansi_code};
use crate::{Result, TextError};

/// A shaped glyph
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ShapedGlyph {
    /// Glyph id in the face, or the WinAnsi code for the built-in font
    pub id: u16,
    /// Byte offset of the glyph's cluster in the run text
    pub cluster: u32,
    /// Horizontal advance in points, letter spacing included
    pub x_advance: f32,
    pub x_offset: f32,
    pub y_offset: f32,
}

/// A run of shaped glyphs
#[derive(Debug, Clone, PartialEq)]
pub struct ShapedRun {
    pub text: String,
    pub glyphs: Vec<ShapedGlyph>,
    pub font_size: f32,
    /// Total advance in points
    pub width: f32,
}

impl ShapedRun {
    pub fn len(&self) -> usize {
        self.glyphs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.glyphs.is_empty()
    }

    /// Source text of glyph `i`'s cluster; empty for later glyphs of a
    /// cluster that maps to several glyphs
    pub fn cluster_text(&self, i: usize) -> &str {
        let Some(glyph) = self.glyphs.get(i) else { return "" };
        let start = glyph.cluster as usize;
        if i > 0 && self.glyphs[i - 1].cluster == glyph.cluster {
            return "";
        }
        let end = self.glyphs[i + 1..]
            .iter()
            .map(|g| g.cluster as usize)
            .find(|&c| c > start)
            .unwrap_or(self.text.len());
        self.text.get(start..end).unwrap_or("")
    }
}

/// Shape `text` at `size` points with extra `letter_spacing` per character
pub fn shape(font: &FontHandle, text: &str, size: f32, letter_spacing: f32) -> Result<ShapedRun> {
    let glyphs = match font {
        FontHandle::Builtin { bold, .. } => shape_builtin(text, size, letter_spacing, *bold),
        FontHandle::Face(face) => {
            let rb = Face::from_slice(&face.data, face.index)
                .ok_or_else(|| TextError::FontParsing(face.postscript_name.clone()))?;
            let scale = face.scale(size);

            let mut buffer = UnicodeBuffer::new();
            buffer.push_str(text);
            let output = rustybuzz::shape(&rb, &[], buffer);

            let mut glyphs: Vec<ShapedGlyph> = output
                .glyph_infos()
                .iter()
                .zip(output.glyph_positions())
                .map(|(info, pos)| ShapedGlyph {
                    id: info.glyph_id as u16,
                    cluster: info.cluster,
                    x_advance: pos.x_advance as f32 * scale,
                    x_offset: pos.x_offset as f32 * scale,
                    y_offset: pos.y_offset as f32 * scale,
                })
                .collect();

            if letter_spacing != 0.0 {
                for i in 0..glyphs.len() {
                    let last_of_cluster = glyphs.get(i + 1).is_none_or(|next| next.cluster != glyphs[i].cluster);
                    if last_of_cluster {
                        glyphs[i].x_advance += letter_spacing;
                    }
                }
            }
            glyphs
        }
    };

    let width = glyphs.iter().map(|g| g.x_advance).sum();
    Ok(ShapedRun {
        text: text.to_string(),
        glyphs,
        font_size: size,
        width,
    })
}

fn shape_builtin(text: &str, size: f32, letter_spacing: f32, bold: bool) -> Vec<ShapedGlyph> {
    text.char_indices()
        .map(|(i, c)| {
            let code = winansi_code(c);
            ShapedGlyph {
                id: code as u16,
                cluster: i as u32,
                x_advance: builtin_advance(code, bold) as f32 / 1000.0 * size + letter_spacing,
                x_offset: 0.0,
                y_offset: 0.0,
            }
        })
        .collect()
}

/// Advance width of `text` in points
///
/// Shaping failures measure with the built-in metrics instead.
pub fn measure(font: &FontHandle, text: &str, size: f32, letter_spacing: f32) -> f32 {
    match shape(font, text, size, letter_spacing) {
        Ok(run) => run.width,
        Err(e) => {
            tracing::debug!("measuring with built-in metrics: {}", e);
            shape_builtin(text, size, letter_spacing, false)
                .iter()
                .map(|g| g.x_advance)
                .sum()
        }
    }
}
