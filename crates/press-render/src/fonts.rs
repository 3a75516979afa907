//! PDF font objects
//!
//! Installed faces are embedded whole as composite fonts (Type0 with an
//! Identity-H CIDFont), so content streams address glyphs by id and a
//! ToUnicode CMap keeps the text extractable. The built-in fallback is
//! written as the standard Helvetica Type1 font with WinAnsi encoding.

use std::collections::{BTreeMap, HashMap};

use pdf_writer::types::{CidFontType, FontFlags, SystemInfo, UnicodeCmap};
use pdf_writer::{Filter, Name, Pdf, Rect, Ref, Str};
use press_text::font::{builtin_advance, builtin_name};
use press_text::{FontHandle, FontKey, LoadedFace, ShapedRun};

const IDENTITY: SystemInfo = SystemInfo {
    registry: Str(b"Adobe"),
    ordering: Str(b"Identity"),
    supplement: 0,
};

/// A font used by the document, with the glyphs drawn in it
#[derive(Debug)]
struct FontEntry {
    handle: FontHandle,
    /// Glyph advances in font units, empty for the built-in font
    advances: Vec<u16>,
    /// Glyph id (or WinAnsi code) to the text it was drawn for
    used: BTreeMap<u16, String>,
}

/// Fonts in first-use order, keyed by identity
#[derive(Debug, Default)]
pub(crate) struct FontRegistry {
    entries: Vec<FontEntry>,
    index: HashMap<FontKey, usize>,
}

impl FontRegistry {
    /// Register the font of a run and the glyphs it draws; returns the
    /// font's index
    pub fn record(&mut self, font: &FontHandle, run: &ShapedRun) -> usize {
        let index = *self.index.entry(font.key()).or_insert_with(|| {
            let advances = match font {
                FontHandle::Face(face) => face.advances(),
                FontHandle::Builtin { .. } => Vec::new(),
            };
            self.entries.push(FontEntry {
                handle: font.clone(),
                advances,
                used: BTreeMap::new(),
            });
            self.entries.len() - 1
        });

        let entry = &mut self.entries[index];
        for (i, glyph) in run.glyphs.iter().enumerate() {
            let text = run.cluster_text(i);
            let slot = entry.used.entry(glyph.id).or_default();
            if slot.is_empty() && !text.is_empty() {
                *slot = text.to_string();
            }
        }
        index
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Resource name of font `index`
    pub fn resource_name(index: usize) -> String {
        format!("F{}", index + 1)
    }

    /// Advance the PDF viewer applies for a glyph, in points
    pub fn natural_advance(&self, index: usize, glyph: u16, size: f32) -> f32 {
        let entry = &self.entries[index];
        match &entry.handle {
            FontHandle::Face(face) => {
                let units = entry.advances.get(glyph as usize).copied().unwrap_or(0);
                units as f32 * face.scale(size)
            }
            FontHandle::Builtin { bold, .. } => builtin_advance(glyph as u8, *bold) as f32 / 1000.0 * size,
        }
    }

    /// Append the string encoding of a glyph
    pub fn encode(&self, index: usize, glyph: u16, out: &mut Vec<u8>) {
        match self.entries[index].handle {
            FontHandle::Face(_) => out.extend_from_slice(&glyph.to_be_bytes()),
            FontHandle::Builtin { .. } => out.push(glyph as u8),
        }
    }

    /// Write every font object; returns `(resource name, font ref)` pairs
    pub fn write(&self, pdf: &mut Pdf, alloc: &mut Ref) -> Vec<(String, Ref)> {
        self.entries
            .iter()
            .enumerate()
            .map(|(i, entry)| {
                let id = alloc.bump();
                match &entry.handle {
                    FontHandle::Builtin { bold, italic } => {
                        pdf.type1_font(id)
                            .base_font(Name(builtin_name(*bold, *italic).as_bytes()))
                            .encoding_predefined(Name(b"WinAnsiEncoding"));
                    }
                    FontHandle::Face(face) => write_composite(pdf, alloc, id, face, entry),
                }
                (Self::resource_name(i), id)
            })
            .collect()
    }
}

fn write_composite(pdf: &mut Pdf, alloc: &mut Ref, type0_id: Ref, face: &LoadedFace, entry: &FontEntry) {
    let cid_id = alloc.bump();
    let descriptor_id = alloc.bump();
    let file_id = alloc.bump();
    let cmap_id = alloc.bump();

    let base = base_font_name(face);
    let base = Name(base.as_bytes());
    let to_pdf = |units: f32| units * 1000.0 / face.units_per_em.max(1) as f32;

    pdf.type0_font(type0_id)
        .base_font(base)
        .encoding_predefined(Name(b"Identity-H"))
        .descendant_font(cid_id)
        .to_unicode(cmap_id);

    {
        let mut cid = pdf.cid_font(cid_id);
        cid.subtype(if face.is_cff { CidFontType::Type0 } else { CidFontType::Type2 });
        cid.base_font(base);
        cid.system_info(IDENTITY);
        cid.font_descriptor(descriptor_id);
        if !face.is_cff {
            cid.cid_to_gid_map_predefined(Name(b"Identity"));
        }
        let mut widths = cid.widths();
        for gid in entry.used.keys() {
            let advance = entry.advances.get(*gid as usize).copied().unwrap_or(0);
            widths.consecutive(*gid, [to_pdf(advance as f32)]);
        }
    }

    let mut flags = FontFlags::NON_SYMBOLIC;
    if face.monospaced {
        flags.insert(FontFlags::FIXED_PITCH);
    }
    if face.italic {
        flags.insert(FontFlags::ITALIC);
    }
    let (x_min, y_min, x_max, y_max) = face.bbox;
    {
        let mut descriptor = pdf.font_descriptor(descriptor_id);
        descriptor
            .name(base)
            .flags(flags)
            .bbox(Rect::new(
                to_pdf(x_min as f32),
                to_pdf(y_min as f32),
                to_pdf(x_max as f32),
                to_pdf(y_max as f32),
            ))
            .italic_angle(if face.italic { -12.0 } else { 0.0 })
            .ascent(to_pdf(face.ascender as f32))
            .descent(to_pdf(face.descender as f32))
            .cap_height(to_pdf(face.cap_height as f32))
            .stem_v(if face.bold { 120.0 } else { 80.0 });
        if face.is_cff {
            descriptor.font_file3(file_id);
        } else {
            descriptor.font_file2(file_id);
        }
    }

    let compressed = miniz_oxide::deflate::compress_to_vec_zlib(&face.data, 6);
    {
        let mut file = pdf.stream(file_id, &compressed);
        file.filter(Filter::FlateDecode);
        if face.is_cff {
            file.pair(Name(b"Subtype"), Name(b"OpenType"));
        } else {
            file.pair(Name(b"Length1"), face.data.len() as i32);
        }
    }

    let mut cmap: UnicodeCmap = UnicodeCmap::new(Name(b"Custom"), IDENTITY);
    for (gid, text) in &entry.used {
        if !text.is_empty() {
            cmap.pair_with_multiple(*gid, text.chars());
        }
    }
    pdf.stream(cmap_id, &cmap.finish());
}

/// PostScript name usable as a PDF name
fn base_font_name(face: &LoadedFace) -> String {
    let name: String = face
        .postscript_name
        .chars()
        .filter(|c| c.is_ascii_graphic() && !"()<>[]{}/%#".contains(*c))
        .collect();
    if name.is_empty() {
        face.family.replace(' ', "")
    } else {
        name
    }
}
