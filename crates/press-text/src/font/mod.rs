//! Font loading and matching module

mod builtin;
mod context;
mod library;

pub use builtin::{BUILTIN_ASCENT, BUILTIN_DESCENT, builtin_advance, builtin_name, winansi_code};
pub use context::{FontContext, FontHandle, FontKey};
pub use library::{FontLibrary, LoadedFace};

/// Font query for matching
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FontQuery {
    /// Font families to try (in order)
    pub families: Vec<String>,
    /// Desired weight (100-900)
    pub weight: u16,
    pub italic: bool,
}

impl FontQuery {
    /// Create a new font query
    pub fn new(families: &[&str]) -> Self {
        Self {
            families: families.iter().map(|s| s.to_string()).collect(),
            weight: 400,
            italic: false,
        }
    }

    /// Build a query from a computed family list
    pub fn from_families(families: &[String], weight: u16, italic: bool) -> Self {
        Self {
            families: families.to_vec(),
            weight: weight.clamp(100, 900),
            italic,
        }
    }

    /// Set font weight
    pub fn weight(mut self, weight: u16) -> Self {
        self.weight = weight.clamp(100, 900);
        self
    }

    /// Set bold weight
    pub fn bold(self) -> Self {
        self.weight(700)
    }

    /// Set italic style
    pub fn italic(mut self) -> Self {
        self.italic = true;
        self
    }

    pub fn is_bold(&self) -> bool {
        self.weight >= 600
    }
}

impl Default for FontQuery {
    fn default() -> Self {
        Self::new(&["sans-serif"])
    }
}

/// Resolve a generic font family to common installed families
pub fn resolve_generic_family(family: &str) -> &'static [&'static str] {
    match family.to_ascii_lowercase().as_str() {
        "serif" => &["Times New Roman", "Times", "Liberation Serif", "DejaVu Serif", "Noto Serif"],
        "sans-serif" => &["Arial", "Helvetica", "Liberation Sans", "DejaVu Sans", "Noto Sans"],
        "monospace" => &["Courier New", "Liberation Mono", "DejaVu Sans Mono", "Noto Sans Mono"],
        "cursive" => &["Comic Sans MS", "Brush Script MT"],
        "fantasy" => &["Impact", "Papyrus"],
        "system-ui" => &["Segoe UI", "Ubuntu", "Cantarell", "DejaVu Sans"],
        _ => &[],
    }
}

/// Whether `family` is a CSS generic family keyword
pub fn is_generic_family(family: &str) -> bool {
    !resolve_generic_family(family).is_empty()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_query_builder() {
        let q = FontQuery::new(&["Georgia", "serif"]).bold().italic();
        assert_eq!(q.families, vec!["Georgia", "serif"]);
        assert!(q.is_bold());
        assert!(q.italic);
    }

    #[test]
    fn test_weight_is_clamped() {
        assert_eq!(FontQuery::default().weight(5000).weight, 900);
        assert_eq!(FontQuery::from_families(&["x".into()], 0, false).weight, 100);
    }

    #[test]
    fn test_generic_families() {
        assert!(is_generic_family("Serif"));
        assert!(is_generic_family("monospace"));
        assert!(!is_generic_family("Roboto"));
    }
}
