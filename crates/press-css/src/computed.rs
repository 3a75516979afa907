//! Computed Styles
//!
//! Typed, fully resolved style of one element. Lengths are in points;
//! percentages that depend on layout stay as [`Dimension::Percent`].

use crate::values::{Color, Dimension, Length, LengthUnit, PT_PER_PX, parse_number, split_commas, unquote};

/// Default font size (16px)
pub const DEFAULT_FONT_SIZE: f32 = 12.0;

/// Four-sided value
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Edges<T> {
    pub top: T,
    pub right: T,
    pub bottom: T,
    pub left: T,
}

impl<T: Copy> Edges<T> {
    pub const fn all(v: T) -> Self {
        Self { top: v, right: v, bottom: v, left: v }
    }

    pub fn map<U>(self, f: impl Fn(T) -> U) -> Edges<U> {
        Edges {
            top: f(self.top),
            right: f(self.right),
            bottom: f(self.bottom),
            left: f(self.left),
        }
    }

    fn side_mut(&mut self, side: &str) -> Option<&mut T> {
        match side {
            "top" => Some(&mut self.top),
            "right" => Some(&mut self.right),
            "bottom" => Some(&mut self.bottom),
            "left" => Some(&mut self.left),
            _ => None,
        }
    }

    fn side(&self, side: &str) -> Option<T> {
        match side {
            "top" => Some(self.top),
            "right" => Some(self.right),
            "bottom" => Some(self.bottom),
            "left" => Some(self.left),
            _ => None,
        }
    }
}

impl Edges<f32> {
    pub fn horizontal(&self) -> f32 {
        self.left + self.right
    }

    pub fn vertical(&self) -> f32 {
        self.top + self.bottom
    }
}

/// Outer display type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Display {
    Block,
    #[default]
    Inline,
    ListItem,
    None,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FontSlant {
    #[default]
    Normal,
    Italic,
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum LineHeight {
    #[default]
    Normal,
    /// Multiple of the element's font size
    Number(f32),
    Points(f32),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TextAlign {
    #[default]
    Left,
    Right,
    Center,
    Justify,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TextTransform {
    #[default]
    None,
    Uppercase,
    Lowercase,
    Capitalize,
}

impl TextTransform {
    /// Apply to a run of text
    pub fn apply(self, text: &str) -> String {
        match self {
            Self::None => text.to_string(),
            Self::Uppercase => text.to_uppercase(),
            Self::Lowercase => text.to_lowercase(),
            Self::Capitalize => {
                let mut out = String::with_capacity(text.len());
                let mut at_word_start = true;
                for c in text.chars() {
                    if at_word_start && c.is_alphabetic() {
                        out.extend(c.to_uppercase());
                        at_word_start = false;
                    } else {
                        out.push(c);
                        at_word_start = c.is_whitespace();
                    }
                }
                out
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TextDecoration {
    pub underline: bool,
    pub line_through: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WhiteSpace {
    #[default]
    Normal,
    NoWrap,
    Pre,
    PreWrap,
    PreLine,
}

impl WhiteSpace {
    /// Whitespace sequences are kept as written
    pub fn preserves_spaces(self) -> bool {
        matches!(self, Self::Pre | Self::PreWrap)
    }

    /// Newlines in the source force line breaks
    pub fn preserves_newlines(self) -> bool {
        matches!(self, Self::Pre | Self::PreWrap | Self::PreLine)
    }

    /// Lines may wrap at the content edge
    pub fn wraps(self) -> bool {
        !matches!(self, Self::Pre | Self::NoWrap)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ListStyleType {
    None,
    #[default]
    Disc,
    Circle,
    Square,
    Decimal,
    LowerAlpha,
    UpperAlpha,
}

impl ListStyleType {
    /// Marker text for the `ordinal`-th item (1-based)
    pub fn marker(self, ordinal: u32) -> Option<String> {
        let alpha = |base: u8| -> String {
            let mut n = ordinal.max(1);
            let mut out = Vec::new();
            while n > 0 {
                n -= 1;
                out.push((base + (n % 26) as u8) as char);
                n /= 26;
            }
            out.iter().rev().collect::<String>() + "."
        };
        match self {
            Self::None => None,
            Self::Disc => Some("\u{2022}".into()),
            Self::Circle => Some("\u{25E6}".into()),
            Self::Square => Some("\u{25AA}".into()),
            Self::Decimal => Some(format!("{ordinal}.")),
            Self::LowerAlpha => Some(alpha(b'a')),
            Self::UpperAlpha => Some(alpha(b'A')),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BorderStyle {
    #[default]
    None,
    Solid,
    Dashed,
    Dotted,
    Double,
}

/// Fully resolved style for one element
#[derive(Debug, Clone, PartialEq)]
pub struct ComputedStyle {
    pub display: Display,
    pub visible: bool,

    // Inherited text properties
    pub color: Color,
    pub font_families: Vec<String>,
    pub font_size: f32,
    pub font_weight: u16,
    pub font_style: FontSlant,
    pub line_height: LineHeight,
    pub text_align: TextAlign,
    pub text_transform: TextTransform,
    pub text_decoration: TextDecoration,
    pub letter_spacing: f32,
    pub white_space: WhiteSpace,
    pub list_style_type: ListStyleType,

    // Box model
    pub background_color: Color,
    pub margin: Edges<Dimension>,
    pub padding: Edges<Dimension>,
    pub border_width: Edges<f32>,
    pub border_style: Edges<BorderStyle>,
    /// `None` means `currentColor`
    pub border_color: Edges<Option<Color>>,
    pub width: Dimension,
    pub height: Dimension,
    pub min_height: Dimension,
    pub max_width: Dimension,
    pub max_height: Dimension,
    /// Explicit `overflow: visible`; lets an explicit width exceed the
    /// containing block
    pub overflow_visible: bool,

    // Paged media
    pub page_break_before: bool,
    pub page_break_after: bool,
    pub page_break_inside_avoid: bool,
}

impl Default for ComputedStyle {
    fn default() -> Self {
        Self {
            display: Display::Inline,
            visible: true,
            color: Color::BLACK,
            font_families: vec!["serif".to_string()],
            font_size: DEFAULT_FONT_SIZE,
            font_weight: 400,
            font_style: FontSlant::Normal,
            line_height: LineHeight::Normal,
            text_align: TextAlign::Left,
            text_transform: TextTransform::None,
            text_decoration: TextDecoration::default(),
            letter_spacing: 0.0,
            white_space: WhiteSpace::Normal,
            list_style_type: ListStyleType::Disc,
            background_color: Color::TRANSPARENT,
            margin: Edges::all(Dimension::Points(0.0)),
            padding: Edges::all(Dimension::Points(0.0)),
            border_width: Edges::all(3.0 * PT_PER_PX),
            border_style: Edges::all(BorderStyle::None),
            border_color: Edges::all(None),
            width: Dimension::Auto,
            height: Dimension::Auto,
            min_height: Dimension::Auto,
            max_width: Dimension::Auto,
            max_height: Dimension::Auto,
            overflow_visible: false,
            page_break_before: false,
            page_break_after: false,
            page_break_inside_avoid: false,
        }
    }
}

/// Inherited properties
const INHERITED: &[&str] = &[
    "color",
    "font-family",
    "font-size",
    "font-weight",
    "font-style",
    "line-height",
    "text-align",
    "text-transform",
    "text-decoration",
    "letter-spacing",
    "white-space",
    "list-style-type",
    "visibility",
];

/// Whether a property inherits by default
pub fn inherits_by_default(property: &str) -> bool {
    INHERITED.contains(&property)
}

impl ComputedStyle {
    /// Start a child style: inherited properties from `parent`, everything
    /// else at its initial value
    pub fn inherit_from(parent: &ComputedStyle) -> Self {
        Self {
            color: parent.color,
            font_families: parent.font_families.clone(),
            font_size: parent.font_size,
            font_weight: parent.font_weight,
            font_style: parent.font_style,
            line_height: parent.line_height,
            text_align: parent.text_align,
            text_transform: parent.text_transform,
            // Decorations propagate to descendants' text
            text_decoration: parent.text_decoration,
            letter_spacing: parent.letter_spacing,
            white_space: parent.white_space,
            list_style_type: parent.list_style_type,
            visible: parent.visible,
            ..Self::default()
        }
    }

    /// Used line height in points
    pub fn line_height_points(&self) -> f32 {
        match self.line_height {
            LineHeight::Normal => self.font_size * 1.2,
            LineHeight::Number(n) => self.font_size * n,
            LineHeight::Points(p) => p,
        }
    }

    /// Border widths, zero where the border style is `none`
    pub fn used_border_width(&self) -> Edges<f32> {
        let w = self.border_width;
        let s = self.border_style;
        let used = |width: f32, style: BorderStyle| {
            if style == BorderStyle::None { 0.0 } else { width }
        };
        Edges {
            top: used(w.top, s.top),
            right: used(w.right, s.right),
            bottom: used(w.bottom, s.bottom),
            left: used(w.left, s.left),
        }
    }

    /// Border colors with `currentColor` resolved
    pub fn used_border_color(&self) -> Edges<Color> {
        let current = self.color;
        self.border_color.map(|c| c.unwrap_or(current))
    }

    pub fn is_bold(&self) -> bool {
        self.font_weight >= 600
    }

    /// Apply one declared longhand value
    ///
    /// `font-size` must be applied before anything else so `em` lengths
    /// resolve against the element's own font size. Returns `false` for
    /// unknown properties and unparseable values, leaving the style as is.
    pub fn apply(&mut self, property: &str, value: &str, parent: &ComputedStyle, root_font_size: f32) -> bool {
        let keyword = value.trim().to_ascii_lowercase();
        match keyword.as_str() {
            "inherit" => return self.copy_property(property, parent),
            "initial" => return self.copy_property(property, &ComputedStyle::default()),
            "unset" => {
                let source = if inherits_by_default(property) {
                    parent
                } else {
                    &ComputedStyle::default()
                };
                return self.copy_property(property, source);
            }
            _ => {}
        }

        let fs = self.font_size;
        let dim = |v: &str| Dimension::parse(v, fs, root_font_size);
        let len = |v: &str| Length::parse(v).and_then(|l| l.to_points(fs, root_font_size));

        if let Some(rest) = property.strip_prefix("margin-") {
            return match (dim(&keyword), self.margin.side_mut(rest)) {
                (Some(d), Some(slot)) => {
                    *slot = d;
                    true
                }
                _ => false,
            };
        }
        if let Some(rest) = property.strip_prefix("padding-") {
            return match (dim(&keyword), self.padding.side_mut(rest)) {
                (Some(d), Some(slot)) if !d.is_auto() => {
                    *slot = d;
                    true
                }
                _ => false,
            };
        }
        if let Some(rest) = property.strip_prefix("border-") {
            return self.apply_border(rest, &keyword, fs, root_font_size);
        }

        match property {
            "display" => match parse_display(&keyword) {
                Some(d) => self.display = d,
                None => return false,
            },
            "visibility" => self.visible = keyword != "hidden" && keyword != "collapse",
            "color" => match Color::parse(&keyword) {
                Some(c) => self.color = c,
                None if keyword == "currentcolor" => self.color = parent.color,
                None => return false,
            },
            "background-color" => match Color::parse(&keyword) {
                Some(c) => self.background_color = c,
                None if keyword == "currentcolor" => self.background_color = self.color,
                None => return false,
            },
            "font-family" => {
                let families: Vec<String> = split_commas(value)
                    .iter()
                    .map(|f| unquote(f).to_string())
                    .filter(|f| !f.is_empty())
                    .collect();
                if families.is_empty() {
                    return false;
                }
                self.font_families = families;
            }
            "font-size" => match parse_font_size(&keyword, parent.font_size, root_font_size) {
                Some(size) => self.font_size = size,
                None => return false,
            },
            "font-weight" => match parse_font_weight(&keyword, parent.font_weight) {
                Some(w) => self.font_weight = w,
                None => return false,
            },
            "font-style" => {
                self.font_style = match keyword.as_str() {
                    "italic" | "oblique" => FontSlant::Italic,
                    "normal" => FontSlant::Normal,
                    _ => return false,
                }
            }
            "line-height" => {
                self.line_height = if keyword == "normal" {
                    LineHeight::Normal
                } else if let Some(n) = parse_number(&keyword) {
                    LineHeight::Number(n.max(0.0))
                } else {
                    match Length::parse(&keyword) {
                        Some(l) if l.unit == LengthUnit::Percent => LineHeight::Number(l.value / 100.0),
                        Some(l) => match l.to_points(fs, root_font_size) {
                            Some(p) => LineHeight::Points(p.max(0.0)),
                            None => return false,
                        },
                        None => return false,
                    }
                }
            }
            "text-align" => {
                self.text_align = match keyword.as_str() {
                    "left" | "start" => TextAlign::Left,
                    "right" | "end" => TextAlign::Right,
                    "center" => TextAlign::Center,
                    "justify" => TextAlign::Justify,
                    _ => return false,
                }
            }
            "text-transform" => {
                self.text_transform = match keyword.as_str() {
                    "none" => TextTransform::None,
                    "uppercase" => TextTransform::Uppercase,
                    "lowercase" => TextTransform::Lowercase,
                    "capitalize" => TextTransform::Capitalize,
                    _ => return false,
                }
            }
            "text-decoration" => {
                let mut deco = TextDecoration::default();
                for part in keyword.split_whitespace() {
                    match part {
                        "underline" => deco.underline = true,
                        "line-through" => deco.line_through = true,
                        _ => {}
                    }
                }
                self.text_decoration = deco;
            }
            "letter-spacing" => {
                self.letter_spacing = if keyword == "normal" {
                    0.0
                } else {
                    match len(&keyword) {
                        Some(v) => v,
                        None => return false,
                    }
                }
            }
            "white-space" => {
                self.white_space = match keyword.as_str() {
                    "normal" => WhiteSpace::Normal,
                    "nowrap" => WhiteSpace::NoWrap,
                    "pre" => WhiteSpace::Pre,
                    "pre-wrap" | "break-spaces" => WhiteSpace::PreWrap,
                    "pre-line" => WhiteSpace::PreLine,
                    _ => return false,
                }
            }
            "list-style-type" => {
                self.list_style_type = match keyword.as_str() {
                    "none" => ListStyleType::None,
                    "disc" => ListStyleType::Disc,
                    "circle" => ListStyleType::Circle,
                    "square" => ListStyleType::Square,
                    "decimal" => ListStyleType::Decimal,
                    "lower-alpha" | "lower-latin" => ListStyleType::LowerAlpha,
                    "upper-alpha" | "upper-latin" => ListStyleType::UpperAlpha,
                    _ => return false,
                }
            }
            "width" | "height" | "min-height" | "max-width" | "max-height" => {
                let Some(d) = dim(&keyword) else { return false };
                match property {
                    "width" => self.width = d,
                    "height" => self.height = d,
                    "min-height" => self.min_height = d,
                    "max-width" => self.max_width = d,
                    _ => self.max_height = d,
                }
            }
            "overflow" => self.overflow_visible = keyword == "visible",
            "page-break-before" => self.page_break_before = is_forced_break(&keyword),
            "page-break-after" => self.page_break_after = is_forced_break(&keyword),
            "page-break-inside" => self.page_break_inside_avoid = keyword == "avoid",
            _ => return false,
        }
        true
    }

    fn apply_border(&mut self, rest: &str, keyword: &str, fs: f32, root_font_size: f32) -> bool {
        let Some((side, part)) = rest.split_once('-') else {
            return false;
        };
        match part {
            "width" => {
                let width = match keyword {
                    "thin" => PT_PER_PX,
                    "medium" => 3.0 * PT_PER_PX,
                    "thick" => 5.0 * PT_PER_PX,
                    other => match Length::parse(other).and_then(|l| l.to_points(fs, root_font_size)) {
                        Some(w) => w.max(0.0),
                        None => return false,
                    },
                };
                self.border_width.side_mut(side).map(|s| *s = width).is_some()
            }
            "style" => {
                let style = match keyword {
                    "none" | "hidden" => BorderStyle::None,
                    "dashed" => BorderStyle::Dashed,
                    "dotted" => BorderStyle::Dotted,
                    "double" => BorderStyle::Double,
                    // groove/ridge/inset/outset are drawn solid
                    _ => BorderStyle::Solid,
                };
                self.border_style.side_mut(side).map(|s| *s = style).is_some()
            }
            "color" => {
                let color = if keyword == "currentcolor" {
                    None
                } else {
                    match Color::parse(keyword) {
                        Some(c) => Some(c),
                        None => return false,
                    }
                };
                self.border_color.side_mut(side).map(|s| *s = color).is_some()
            }
            _ => false,
        }
    }

    /// Copy one property's computed value from `source`
    fn copy_property(&mut self, property: &str, source: &ComputedStyle) -> bool {
        if let Some(side) = property.strip_prefix("margin-") {
            return source.margin.side(side).and_then(|v| self.margin.side_mut(side).map(|s| *s = v)).is_some();
        }
        if let Some(side) = property.strip_prefix("padding-") {
            return source.padding.side(side).and_then(|v| self.padding.side_mut(side).map(|s| *s = v)).is_some();
        }
        if let Some(rest) = property.strip_prefix("border-") {
            let Some((side, part)) = rest.split_once('-') else {
                return false;
            };
            return match part {
                "width" => source.border_width.side(side).and_then(|v| self.border_width.side_mut(side).map(|s| *s = v)),
                "style" => source.border_style.side(side).and_then(|v| self.border_style.side_mut(side).map(|s| *s = v)),
                "color" => source.border_color.side(side).and_then(|v| self.border_color.side_mut(side).map(|s| *s = v)),
                _ => None,
            }
            .is_some();
        }
        match property {
            "display" => self.display = source.display,
            "visibility" => self.visible = source.visible,
            "color" => self.color = source.color,
            "background-color" => self.background_color = source.background_color,
            "font-family" => self.font_families = source.font_families.clone(),
            "font-size" => self.font_size = source.font_size,
            "font-weight" => self.font_weight = source.font_weight,
            "font-style" => self.font_style = source.font_style,
            "line-height" => self.line_height = source.line_height,
            "text-align" => self.text_align = source.text_align,
            "text-transform" => self.text_transform = source.text_transform,
            "text-decoration" => self.text_decoration = source.text_decoration,
            "letter-spacing" => self.letter_spacing = source.letter_spacing,
            "white-space" => self.white_space = source.white_space,
            "list-style-type" => self.list_style_type = source.list_style_type,
            "width" => self.width = source.width,
            "height" => self.height = source.height,
            "min-height" => self.min_height = source.min_height,
            "max-width" => self.max_width = source.max_width,
            "max-height" => self.max_height = source.max_height,
            "overflow" => self.overflow_visible = source.overflow_visible,
            "page-break-before" => self.page_break_before = source.page_break_before,
            "page-break-after" => self.page_break_after = source.page_break_after,
            "page-break-inside" => self.page_break_inside_avoid = source.page_break_inside_avoid,
            _ => return false,
        }
        true
    }
}

fn parse_display(keyword: &str) -> Option<Display> {
    Some(match keyword {
        "none" => Display::None,
        "inline" | "contents" => Display::Inline,
        "list-item" => Display::ListItem,
        // Flex, grid and table layouts flow as plain blocks
        "block" | "flow-root" | "inline-block" | "flex" | "inline-flex" | "grid" | "inline-grid" | "table"
        | "inline-table" | "table-row" | "table-cell" | "table-row-group" | "table-header-group"
        | "table-footer-group" | "table-caption" => Display::Block,
        other if other.starts_with("block") => Display::Block,
        _ => return None,
    })
}

fn parse_font_size(keyword: &str, parent_size: f32, root_font_size: f32) -> Option<f32> {
    let px = |v: f32| v * PT_PER_PX;
    let size = match keyword {
        "xx-small" => px(9.0),
        "x-small" => px(10.0),
        "small" => px(13.0),
        "medium" => px(16.0),
        "large" => px(18.0),
        "x-large" => px(24.0),
        "xx-large" => px(32.0),
        "smaller" => parent_size / 1.2,
        "larger" => parent_size * 1.2,
        other => {
            let len = Length::parse(other)?;
            match len.unit {
                LengthUnit::Percent => parent_size * len.value / 100.0,
                // `em` on font-size refers to the parent's size
                LengthUnit::Em => parent_size * len.value,
                _ => len.to_points(parent_size, root_font_size)?,
            }
        }
    };
    (size >= 0.0).then_some(size)
}

fn parse_font_weight(keyword: &str, parent: u16) -> Option<u16> {
    Some(match keyword {
        "normal" => 400,
        "bold" => 700,
        "bolder" => match parent {
            0..=349 => 400,
            350..=549 => 700,
            _ => 900,
        },
        "lighter" => match parent {
            0..=549 => 100,
            550..=749 => 400,
            _ => 700,
        },
        other => {
            let w = other.parse::<f32>().ok()?;
            if !(1.0..=1000.0).contains(&w) {
                return None;
            }
            w.round() as u16
        }
    })
}

fn is_forced_break(keyword: &str) -> bool {
    matches!(keyword, "always" | "page" | "left" | "right")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn apply(style: &mut ComputedStyle, prop: &str, value: &str) -> bool {
        let parent = ComputedStyle::default();
        style.apply(prop, value, &parent, DEFAULT_FONT_SIZE)
    }

    #[test]
    fn test_font_size_em_uses_parent() {
        let parent = ComputedStyle { font_size: 10.0, ..ComputedStyle::default() };
        let mut child = ComputedStyle::inherit_from(&parent);
        assert!(child.apply("font-size", "2em", &parent, 12.0));
        assert_eq!(child.font_size, 20.0);

        // Other em lengths use the element's own (new) size
        assert!(child.apply("margin-top", "1em", &parent, 12.0));
        assert_eq!(child.margin.top, Dimension::Points(20.0));
    }

    #[test]
    fn test_font_weight_keywords() {
        let mut s = ComputedStyle::default();
        assert!(apply(&mut s, "font-weight", "bold"));
        assert_eq!(s.font_weight, 700);
        assert!(s.is_bold());
        assert!(!apply(&mut s, "font-weight", "heavy"));
        assert_eq!(s.font_weight, 700);
    }

    #[test]
    fn test_inherit_copies_non_inherited_property() {
        let parent = ComputedStyle { background_color: Color::WHITE, ..ComputedStyle::default() };
        let mut child = ComputedStyle::inherit_from(&parent);
        assert!(child.background_color.is_transparent());
        assert!(child.apply("background-color", "inherit", &parent, 12.0));
        assert_eq!(child.background_color, Color::WHITE);
    }

    #[test]
    fn test_inherit_from_keeps_text_properties() {
        let mut parent = ComputedStyle::default();
        apply(&mut parent, "color", "#ff0000");
        apply(&mut parent, "margin-left", "10px");
        let child = ComputedStyle::inherit_from(&parent);
        assert_eq!(child.color, Color::rgb(255, 0, 0));
        assert_eq!(child.margin.left, Dimension::Points(0.0));
    }

    #[test]
    fn test_border_width_is_zero_without_style() {
        let mut s = ComputedStyle::default();
        apply(&mut s, "border-top-width", "2px");
        assert_eq!(s.used_border_width().top, 0.0);
        apply(&mut s, "border-top-style", "solid");
        assert_eq!(s.used_border_width().top, 1.5);
    }

    #[test]
    fn test_line_height() {
        let mut s = ComputedStyle { font_size: 10.0, ..ComputedStyle::default() };
        apply(&mut s, "line-height", "1.6");
        assert!((s.line_height_points() - 16.0).abs() < 1e-4);
        apply(&mut s, "line-height", "150%");
        assert!((s.line_height_points() - 15.0).abs() < 1e-4);
        apply(&mut s, "line-height", "20pt");
        assert_eq!(s.line_height_points(), 20.0);
    }

    #[test]
    fn test_display_variants() {
        let mut s = ComputedStyle::default();
        apply(&mut s, "display", "flex");
        assert_eq!(s.display, Display::Block);
        apply(&mut s, "display", "none");
        assert_eq!(s.display, Display::None);
        apply(&mut s, "display", "list-item");
        assert_eq!(s.display, Display::ListItem);
    }

    #[test]
    fn test_list_markers() {
        assert_eq!(ListStyleType::Decimal.marker(3).as_deref(), Some("3."));
        assert_eq!(ListStyleType::LowerAlpha.marker(28).as_deref(), Some("ab."));
        assert_eq!(ListStyleType::None.marker(1), None);
    }

    #[test]
    fn test_text_transform() {
        assert_eq!(TextTransform::Uppercase.apply("abc"), "ABC");
        assert_eq!(TextTransform::Capitalize.apply("hello big world"), "Hello Big World");
    }

    #[test]
    fn test_font_family_unquotes() {
        let mut s = ComputedStyle::default();
        apply(&mut s, "font-family", "'Open Sans', Arial, sans-serif");
        assert_eq!(s.font_families, vec!["Open Sans", "Arial", "sans-serif"]);
    }

    #[test]
    fn test_page_breaks() {
        let mut s = ComputedStyle::default();
        apply(&mut s, "page-break-before", "always");
        apply(&mut s, "page-break-inside", "avoid");
        assert!(s.page_break_before);
        assert!(s.page_break_inside_avoid);
    }
}
