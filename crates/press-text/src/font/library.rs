//! Process-wide font library
//!
//! The fontdb database is scanned once and never mutated afterwards. Parsed
//! face data lives in write-once cells, one per face, so concurrent jobs read
//! it without locking.

use std::collections::HashMap;
use std::path::Path;
use std::sync::{Arc, OnceLock};

use fontdb::{Database, Family, ID, Query, Stretch, Style, Weight};

use super::{FontQuery, resolve_generic_family};

/// Environment variable naming an extra directory of font files
pub const FONT_DIR_ENV: &str = "PRESS_FONT_DIR";

/// Font data and metrics for one face, loaded on first use
#[derive(Debug)]
pub struct LoadedFace {
    pub id: ID,
    pub data: Arc<Vec<u8>>,
    pub index: u32,
    pub postscript_name: String,
    pub family: String,
    pub units_per_em: u16,
    pub ascender: i16,
    pub descender: i16,
    pub cap_height: i16,
    /// Global bounding box (x_min, y_min, x_max, y_max) in font units
    pub bbox: (i16, i16, i16, i16),
    pub glyph_count: u16,
    pub monospaced: bool,
    pub italic: bool,
    pub bold: bool,
    /// Outlines are CFF (embedded as OpenType) rather than TrueType
    pub is_cff: bool,
}

impl LoadedFace {
    fn parse(id: ID, data: Vec<u8>, index: u32, family: String, postscript_name: String) -> Option<Self> {
        // a face inside a collection cannot be embedded as a standalone font file
        if data.starts_with(b"ttcf") {
            tracing::debug!("skipping collection face {}", postscript_name);
            return None;
        }
        let face = ttf_parser::Face::parse(&data, index).ok()?;
        let bbox = face.global_bounding_box();
        let (units_per_em, ascender, descender) = (face.units_per_em(), face.ascender(), face.descender());
        let cap_height = face.capital_height().unwrap_or(ascender);
        let glyph_count = face.number_of_glyphs();
        let (monospaced, italic, bold) = (face.is_monospaced(), face.is_italic(), face.is_bold());
        let is_cff = face.tables().cff.is_some();
        Some(Self {
            id,
            data: Arc::new(data),
            index,
            postscript_name,
            family,
            units_per_em,
            ascender,
            descender,
            cap_height,
            bbox: (bbox.x_min, bbox.y_min, bbox.x_max, bbox.y_max),
            glyph_count,
            monospaced,
            italic,
            bold,
            is_cff,
        })
    }

    /// Horizontal advance of every glyph id, in font units
    pub fn advances(&self) -> Vec<u16> {
        let Ok(face) = ttf_parser::Face::parse(&self.data, self.index) else {
            return Vec::new();
        };
        (0..self.glyph_count)
            .map(|gid| face.glyph_hor_advance(ttf_parser::GlyphId(gid)).unwrap_or(0))
            .collect()
    }

    /// Scale from font units to points at `size`
    pub fn scale(&self, size: f32) -> f32 {
        size / self.units_per_em.max(1) as f32
    }
}

/// Immutable font database plus lazily parsed faces
pub struct FontLibrary {
    db: Database,
    faces: HashMap<ID, OnceLock<Option<Arc<LoadedFace>>>>,
}

impl FontLibrary {
    /// Library with no fonts; everything resolves to the built-in fallback
    pub fn empty() -> Self {
        Self::from_database(Database::new())
    }

    /// Library with system fonts plus `PRESS_FONT_DIR`, if set
    pub fn with_system_fonts() -> Self {
        let mut db = Database::new();
        db.load_system_fonts();
        if let Ok(dir) = std::env::var(FONT_DIR_ENV) {
            db.load_fonts_dir(Path::new(&dir));
        }
        tracing::info!("Font library loaded {} faces", db.len());
        Self::from_database(db)
    }

    /// Library over a prepared database
    pub fn from_database(db: Database) -> Self {
        let faces = db.faces().map(|f| (f.id, OnceLock::new())).collect();
        Self { db, faces }
    }

    /// Process-wide library, scanned on first use
    pub fn global() -> Arc<FontLibrary> {
        static GLOBAL: OnceLock<Arc<FontLibrary>> = OnceLock::new();
        GLOBAL
            .get_or_init(|| Arc::new(FontLibrary::with_system_fonts()))
            .clone()
    }

    /// Best face for a query; families are tried in order
    pub fn query(&self, query: &FontQuery) -> Option<ID> {
        let style = if query.italic { Style::Italic } else { Style::Normal };
        for family in &query.families {
            let generic = resolve_generic_family(family);
            let mut candidates: Vec<Family<'_>> = if generic.is_empty() {
                vec![Family::Name(family.as_str())]
            } else {
                generic.iter().map(|name| Family::Name(*name)).collect()
            };
            match family.to_ascii_lowercase().as_str() {
                "serif" => candidates.push(Family::Serif),
                "sans-serif" => candidates.push(Family::SansSerif),
                "monospace" => candidates.push(Family::Monospace),
                _ => {}
            }

            let found = self.db.query(&Query {
                families: &candidates,
                weight: Weight(query.weight),
                stretch: Stretch::Normal,
                style,
            });
            if found.is_some() {
                return found;
            }
        }
        None
    }

    /// Parsed face data, loaded once per face
    pub fn load(&self, id: ID) -> Option<Arc<LoadedFace>> {
        let cell = self.faces.get(&id)?;
        cell.get_or_init(|| {
            let info = self.db.face(id)?;
            let family = info.families.first().map(|(name, _)| name.clone()).unwrap_or_default();
            let postscript_name = info.post_script_name.clone();
            let parsed = self
                .db
                .with_face_data(id, |data, index| LoadedFace::parse(id, data.to_vec(), index, family, postscript_name))
                .flatten();
            if parsed.is_none() {
                tracing::warn!("Failed to load font face {:?}", id);
            }
            parsed.map(Arc::new)
        })
        .clone()
    }

    /// Number of known faces
    pub fn len(&self) -> usize {
        self.db.len()
    }

    pub fn is_empty(&self) -> bool {
        self.db.len() == 0
    }
}

impl std::fmt::Debug for FontLibrary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FontLibrary").field("faces", &self.db.len()).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_library_matches_nothing() {
        let lib = FontLibrary::empty();
        assert!(lib.is_empty());
        assert!(lib.query(&FontQuery::new(&["serif", "Arial"])).is_none());
    }

    #[test]
    fn test_system_library_loads_matched_face() {
        let lib = FontLibrary::global();
        if lib.is_empty() {
            // Skip on systems without fonts
            return;
        }
        if let Some(id) = lib.query(&FontQuery::default()) {
            let face = lib.load(id).expect("matched face should load");
            assert!(face.units_per_em > 0);
            // Second load hits the cell
            assert!(Arc::ptr_eq(&face, &lib.load(id).unwrap()));
        }
    }
}
