//! Font resolution
//!
//! [`FontContext`] turns a family list, weight and style into a usable
//! [`FontHandle`]. Resolution failure is an error the caller can treat as
//! recoverable: [`FontContext::resolve_or_fallback`] substitutes the default
//! family and finally the built-in Helvetica metrics.

use std::sync::Arc;

use super::builtin::{BUILTIN_ASCENT, BUILTIN_DESCENT};
use super::library::{FontLibrary, LoadedFace};
use super::FontQuery;
use crate::{Result, TextError};

/// A resolved font
#[derive(Debug, Clone)]
pub enum FontHandle {
    /// An installed face
    Face(Arc<LoadedFace>),
    /// Standard-14 Helvetica, no font file
    Builtin { bold: bool, italic: bool },
}

/// Identity of a resolved font, used to share PDF font objects
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FontKey {
    Face(fontdb::ID),
    Builtin { bold: bool, italic: bool },
}

impl FontHandle {
    pub fn key(&self) -> FontKey {
        match self {
            Self::Face(face) => FontKey::Face(face.id),
            Self::Builtin { bold, italic } => FontKey::Builtin {
                bold: *bold,
                italic: *italic,
            },
        }
    }

    pub fn is_builtin(&self) -> bool {
        matches!(self, Self::Builtin { .. })
    }

    /// Distance from baseline to the top of the em box, in points
    pub fn ascent(&self, size: f32) -> f32 {
        match self {
            Self::Face(face) => face.ascender as f32 * face.scale(size),
            Self::Builtin { .. } => BUILTIN_ASCENT / 1000.0 * size,
        }
    }

    /// Distance from baseline to the bottom of the em box (positive), in points
    pub fn descent(&self, size: f32) -> f32 {
        match self {
            Self::Face(face) => -(face.descender as f32) * face.scale(size),
            Self::Builtin { .. } => -BUILTIN_DESCENT / 1000.0 * size,
        }
    }

    /// Human-readable name for logs
    pub fn name(&self) -> String {
        match self {
            Self::Face(face) => face.postscript_name.clone(),
            Self::Builtin { bold, italic } => super::builtin_name(*bold, *italic).to_string(),
        }
    }
}

/// Shared font resolution context
#[derive(Debug, Clone)]
pub struct FontContext {
    library: Arc<FontLibrary>,
}

impl FontContext {
    /// Context over a specific library
    pub fn new(library: Arc<FontLibrary>) -> Self {
        Self { library }
    }

    /// Context over the process-wide library
    pub fn global() -> Self {
        Self::new(FontLibrary::global())
    }

    /// Context with no installed fonts (always the built-in fallback)
    pub fn builtin_only() -> Self {
        Self::new(Arc::new(FontLibrary::empty()))
    }

    pub fn library(&self) -> &FontLibrary {
        &self.library
    }

    /// Best installed face for `query`
    pub fn resolve(&self, query: &FontQuery) -> Result<FontHandle> {
        self.library
            .query(query)
            .and_then(|id| self.library.load(id))
            .map(FontHandle::Face)
            .ok_or_else(|| TextError::FontResolution {
                families: query.families.clone(),
                weight: query.weight,
            })
    }

    /// Resolve, substituting `sans-serif` and then built-in Helvetica
    ///
    /// Returns the handle and, when a substitution happened, the error that
    /// caused it.
    pub fn resolve_or_fallback(&self, query: &FontQuery) -> (FontHandle, Option<TextError>) {
        let err = match self.resolve(query) {
            Ok(handle) => return (handle, None),
            Err(e) => e,
        };

        let default = FontQuery {
            families: vec!["sans-serif".to_string()],
            ..query.clone()
        };
        let handle = match self.resolve(&default) {
            Ok(handle) => handle,
            Err(_) => FontHandle::Builtin {
                bold: query.is_bold(),
                italic: query.italic,
            },
        };
        tracing::warn!("{}; using {}", err, handle.name());
        (handle, Some(err))
    }
}

impl Default for FontContext {
    fn default() -> Self {
        Self::global()
    }
}
