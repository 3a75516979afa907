//! Paged Media
//!
//! Page geometry and the `@page` rule: page size, page margins and the
//! running content placed in margin boxes (`@bottom-center { content: ... }`).

use crate::computed::{DEFAULT_FONT_SIZE, Edges};
use crate::values::{Color, Length, parse_number, split_commas, split_components, unquote};
use crate::{Declaration, PageRule};

/// Named page sizes, portrait, in points
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageSize {
    A3,
    A4,
    A5,
    B5,
    Letter,
    Legal,
}

impl PageSize {
    pub fn dimensions(self) -> (f32, f32) {
        match self {
            Self::A3 => (841.89, 1190.55),
            Self::A4 => (595.28, 841.89),
            Self::A5 => (419.53, 595.28),
            Self::B5 => (498.9, 708.66),
            Self::Letter => (612.0, 792.0),
            Self::Legal => (612.0, 1008.0),
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Some(match name.to_ascii_lowercase().as_str() {
            "a3" => Self::A3,
            "a4" => Self::A4,
            "a5" => Self::A5,
            "b5" => Self::B5,
            "letter" => Self::Letter,
            "legal" => Self::Legal,
            _ => return None,
        })
    }
}

/// Page box: size and margins, in points
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageGeometry {
    pub width: f32,
    pub height: f32,
    pub margin: Edges<f32>,
}

impl PageGeometry {
    /// A4 with 2cm margins
    pub fn a4() -> Self {
        let (width, height) = PageSize::A4.dimensions();
        Self {
            width,
            height,
            margin: Edges::all(2.0 * crate::values::PT_PER_CM),
        }
    }

    pub fn new(width: f32, height: f32, margin: Edges<f32>) -> Self {
        Self { width, height, margin }
    }

    pub fn content_width(&self) -> f32 {
        self.width - self.margin.horizontal()
    }

    pub fn content_height(&self) -> f32 {
        self.height - self.margin.vertical()
    }

    /// Content area origin (top-left)
    pub fn content_origin(&self) -> (f32, f32) {
        (self.margin.left, self.margin.top)
    }

    /// Positive size with a positive content area
    pub fn is_valid(&self) -> bool {
        let finite = [self.width, self.height, self.margin.top, self.margin.right, self.margin.bottom, self.margin.left]
            .iter()
            .all(|v| v.is_finite());
        finite
            && self.width > 0.0
            && self.height > 0.0
            && [self.margin.top, self.margin.right, self.margin.bottom, self.margin.left]
                .iter()
                .all(|m| *m >= 0.0)
            && self.content_width() > 0.0
            && self.content_height() > 0.0
    }
}

impl Default for PageGeometry {
    fn default() -> Self {
        Self::a4()
    }
}

/// Margin box slots that can carry running content
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MarginBoxPosition {
    TopLeft,
    TopCenter,
    TopRight,
    BottomLeft,
    BottomCenter,
    BottomRight,
}

impl MarginBoxPosition {
    pub fn is_top(self) -> bool {
        matches!(self, Self::TopLeft | Self::TopCenter | Self::TopRight)
    }
}

/// A piece of generated `content`
#[derive(Debug, Clone, PartialEq)]
pub enum ContentPart {
    Text(String),
    /// `counter(page)`
    PageNumber,
    /// `counter(pages)`
    PageCount,
}

/// Running content for one margin box
#[derive(Debug, Clone, PartialEq)]
pub struct MarginBox {
    pub position: MarginBoxPosition,
    pub content: Vec<ContentPart>,
    pub font_families: Vec<String>,
    pub font_size: f32,
    pub font_weight: u16,
    pub color: Color,
}

impl MarginBox {
    /// Text for page `page` (1-based) of `pages`
    pub fn text_for(&self, page: usize, pages: usize) -> String {
        self.content
            .iter()
            .map(|part| match part {
                ContentPart::Text(t) => t.clone(),
                ContentPart::PageNumber => page.to_string(),
                ContentPart::PageCount => pages.to_string(),
            })
            .collect()
    }
}

/// Result of the `@page` cascade
#[derive(Debug, Clone, PartialEq)]
pub struct PageSetup {
    pub geometry: PageGeometry,
    pub margin_boxes: Vec<MarginBox>,
}

impl PageSetup {
    /// Cascade `@page` rules (later rules win) over a default geometry
    pub fn from_rules<'a>(rules: impl IntoIterator<Item = &'a PageRule>, default: PageGeometry) -> Self {
        let mut geometry = default;
        let mut boxes: Vec<MarginBox> = Vec::new();

        for rule in rules {
            for decl in &rule.declarations {
                apply_page_declaration(&mut geometry, decl);
            }
            for (position, decls) in &rule.margin_boxes {
                let existing = boxes.iter().position(|b| b.position == *position);
                let mut mbox = existing.map(|i| boxes.remove(i)).unwrap_or_else(|| MarginBox {
                    position: *position,
                    content: Vec::new(),
                    font_families: vec!["sans-serif".to_string()],
                    font_size: 9.0,
                    font_weight: 400,
                    color: Color::rgb(0x55, 0x55, 0x55),
                });
                for decl in decls {
                    apply_margin_box_declaration(&mut mbox, decl);
                }
                boxes.push(mbox);
            }
        }

        boxes.retain(|b| !b.content.is_empty());
        boxes.sort_by_key(|b| b.position as u8);
        Self {
            geometry,
            margin_boxes: boxes,
        }
    }
}

impl Default for PageSetup {
    fn default() -> Self {
        Self {
            geometry: PageGeometry::default(),
            margin_boxes: Vec::new(),
        }
    }
}

fn apply_page_declaration(geometry: &mut PageGeometry, decl: &Declaration) {
    let value = decl.value.trim();
    let points = |v: &str| Length::parse(v).and_then(|l| l.to_points(DEFAULT_FONT_SIZE, DEFAULT_FONT_SIZE));

    match decl.property.as_str() {
        "size" => match parse_page_size(value) {
            Some((w, h)) => {
                geometry.width = w;
                geometry.height = h;
            }
            None => tracing::warn!("ignoring @page size {:?}", value),
        },
        "margin-top" => geometry.margin.top = points(value).unwrap_or(geometry.margin.top),
        "margin-right" => geometry.margin.right = points(value).unwrap_or(geometry.margin.right),
        "margin-bottom" => geometry.margin.bottom = points(value).unwrap_or(geometry.margin.bottom),
        "margin-left" => geometry.margin.left = points(value).unwrap_or(geometry.margin.left),
        _ => {}
    }
}

/// Parse an `@page { size }` value
pub fn parse_page_size(value: &str) -> Option<(f32, f32)> {
    let parts: Vec<String> = split_components(&value.to_ascii_lowercase());
    let mut landscape = false;
    let mut named: Option<(f32, f32)> = None;
    let mut lengths = Vec::new();

    for part in &parts {
        match part.as_str() {
            "landscape" => landscape = true,
            "portrait" | "auto" => {}
            p => {
                if let Some(size) = PageSize::from_name(p) {
                    named = Some(size.dimensions());
                } else {
                    lengths.push(Length::parse(p)?.to_points(DEFAULT_FONT_SIZE, DEFAULT_FONT_SIZE)?);
                }
            }
        }
    }

    let (w, h) = match (named, lengths.as_slice()) {
        (Some(size), []) => size,
        (None, [side]) => (*side, *side),
        (None, [w, h]) => (*w, *h),
        (None, []) => PageSize::A4.dimensions(),
        _ => return None,
    };
    if w <= 0.0 || h <= 0.0 {
        return None;
    }
    Some(if landscape { (w.max(h), w.min(h)) } else { (w, h) })
}

fn apply_margin_box_declaration(mbox: &mut MarginBox, decl: &Declaration) {
    let value = decl.value.trim();
    match decl.property.as_str() {
        "content" => mbox.content = parse_content(value),
        "font-size" => {
            if let Some(size) = Length::parse(value).and_then(|l| l.to_points(mbox.font_size, DEFAULT_FONT_SIZE)) {
                mbox.font_size = size;
            }
        }
        "font-family" => {
            let families: Vec<String> = split_commas(value).iter().map(|f| unquote(f).to_string()).collect();
            if !families.is_empty() {
                mbox.font_families = families;
            }
        }
        "font-weight" => {
            mbox.font_weight = match value.to_ascii_lowercase().as_str() {
                "bold" => 700,
                "normal" => 400,
                other => parse_number(other).map(|w| w as u16).unwrap_or(mbox.font_weight),
            }
        }
        "color" => {
            if let Some(c) = Color::parse(value) {
                mbox.color = c;
            }
        }
        _ => {}
    }
}

/// Parse generated content: strings, `counter(page)` and `counter(pages)`
fn parse_content(value: &str) -> Vec<ContentPart> {
    let mut parts = Vec::new();
    for token in split_components(value) {
        let lower = token.to_ascii_lowercase();
        if token.starts_with('"') || token.starts_with('\'') {
            parts.push(ContentPart::Text(unescape(unquote(&token))));
        } else if lower.starts_with("counter(") {
            let name = lower
                .trim_start_matches("counter(")
                .trim_end_matches(')')
                .split(',')
                .next()
                .unwrap_or("")
                .trim();
            match name {
                "page" => parts.push(ContentPart::PageNumber),
                "pages" => parts.push(ContentPart::PageCount),
                other => tracing::debug!("unsupported counter {:?} in margin box", other),
            }
        } else if lower == "none" || lower == "normal" {
            return Vec::new();
        }
    }
    parts
}

/// Resolve CSS string escapes (`\"`, `\A`)
fn unescape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut chars = s.chars().peekable();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        let mut hex = String::new();
        while let Some(&h) = chars.peek() {
            if h.is_ascii_hexdigit() && hex.len() < 6 {
                hex.push(h);
                chars.next();
            } else {
                break;
            }
        }
        if hex.is_empty() {
            if let Some(next) = chars.next() {
                out.push(next);
            }
        } else {
            if chars.peek() == Some(&' ') {
                chars.next();
            }
            if let Some(ch) = u32::from_str_radix(&hex, 16).ok().and_then(char::from_u32) {
                out.push(ch);
            }
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rule(decls: &[(&str, &str)], boxes: Vec<(MarginBoxPosition, Vec<Declaration>)>) -> PageRule {
        PageRule {
            declarations: decls.iter().map(|(p, v)| Declaration::new(*p, *v)).collect(),
            margin_boxes: boxes,
        }
    }

    #[test]
    fn test_page_sizes() {
        assert_eq!(parse_page_size("A4"), Some((595.28, 841.89)));
        assert_eq!(parse_page_size("a4 landscape"), Some((841.89, 595.28)));
        assert_eq!(parse_page_size("8.5in 11in"), Some((612.0, 792.0)));
        assert_eq!(parse_page_size("10cm").map(|(w, h)| w == h), Some(true));
        assert_eq!(parse_page_size("huge"), None);
    }

    #[test]
    fn test_geometry_validity() {
        assert!(PageGeometry::a4().is_valid());
        let bad = PageGeometry::new(100.0, 100.0, Edges::all(60.0));
        assert!(!bad.is_valid());
        let negative = PageGeometry::new(-1.0, 100.0, Edges::all(0.0));
        assert!(!negative.is_valid());
    }

    #[test]
    fn test_page_setup_cascade() {
        let first = rule(&[("size", "letter"), ("margin-top", "1in")], vec![]);
        let second = rule(&[("margin-top", "2cm")], vec![]);
        let setup = PageSetup::from_rules([&first, &second], PageGeometry::a4());
        assert_eq!(setup.geometry.width, 612.0);
        assert!((setup.geometry.margin.top - 56.69).abs() < 0.01);
    }

    #[test]
    fn test_footer_content() {
        let footer = rule(
            &[],
            vec![(
                MarginBoxPosition::BottomCenter,
                vec![
                    Declaration::new("content", "\"Page \" counter(page) \" of \" counter(pages)"),
                    Declaration::new("font-size", "9pt"),
                ],
            )],
        );
        let setup = PageSetup::from_rules([&footer], PageGeometry::a4());
        assert_eq!(setup.margin_boxes.len(), 1);
        assert_eq!(setup.margin_boxes[0].text_for(2, 5), "Page 2 of 5");
        assert_eq!(setup.margin_boxes[0].font_size, 9.0);
    }

    #[test]
    fn test_empty_content_box_is_dropped() {
        let r = rule(&[], vec![(MarginBoxPosition::TopLeft, vec![Declaration::new("content", "none")])]);
        assert!(PageSetup::from_rules([&r], PageGeometry::a4()).margin_boxes.is_empty());
    }

    #[test]
    fn test_unescape() {
        assert_eq!(unescape(r"a\\b"), r"a\b");
        assert_eq!(unescape(r"\2014 x"), "\u{2014}x");
    }
}
