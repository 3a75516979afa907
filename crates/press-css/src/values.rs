//! CSS Values
//!
//! Lengths, colors and the small tokenizing helpers used to read
//! serialized declaration values. All resolved lengths are in points.

/// Points per CSS pixel (96px = 72pt)
pub const PT_PER_PX: f32 = 0.75;
/// Points per centimetre
pub const PT_PER_CM: f32 = 72.0 / 2.54;

/// CSS length value
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Length {
    pub value: f32,
    pub unit: LengthUnit,
}

/// Length units
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LengthUnit {
    Pt,
    Px,
    Cm,
    Mm,
    In,
    Pc,
    Em,
    Rem,
    Percent,
}

impl Length {
    pub fn pt(value: f32) -> Self {
        Self { value, unit: LengthUnit::Pt }
    }

    pub fn px(value: f32) -> Self {
        Self { value, unit: LengthUnit::Px }
    }

    pub fn percent(value: f32) -> Self {
        Self { value, unit: LengthUnit::Percent }
    }

    /// Parse a single length token such as `12px`, `2.5cm`, `50%` or `0`
    pub fn parse(s: &str) -> Option<Self> {
        let s = s.trim().to_ascii_lowercase();
        if s.is_empty() {
            return None;
        }
        if let Some(num) = s.strip_suffix('%') {
            return parse_number(num).map(Self::percent);
        }

        let split = s
            .find(|c: char| c.is_ascii_alphabetic())
            .unwrap_or(s.len());
        let (num, unit) = s.split_at(split);
        let value = parse_number(num)?;
        let unit = match unit {
            "" if value == 0.0 => LengthUnit::Pt,
            "pt" => LengthUnit::Pt,
            "px" => LengthUnit::Px,
            "cm" => LengthUnit::Cm,
            "mm" => LengthUnit::Mm,
            "in" => LengthUnit::In,
            "pc" => LengthUnit::Pc,
            "em" => LengthUnit::Em,
            "rem" => LengthUnit::Rem,
            _ => return None,
        };
        Some(Self { value, unit })
    }

    /// Convert to points; `None` for percentages, which need a reference size
    pub fn to_points(self, font_size: f32, root_font_size: f32) -> Option<f32> {
        let v = self.value;
        Some(match self.unit {
            LengthUnit::Pt => v,
            LengthUnit::Px => v * PT_PER_PX,
            LengthUnit::Cm => v * PT_PER_CM,
            LengthUnit::Mm => v * PT_PER_CM / 10.0,
            LengthUnit::In => v * 72.0,
            LengthUnit::Pc => v * 12.0,
            LengthUnit::Em => v * font_size,
            LengthUnit::Rem => v * root_font_size,
            LengthUnit::Percent => return None,
        })
    }

    /// Convert to points, resolving percentages against `base`
    pub fn resolve(self, base: f32, font_size: f32, root_font_size: f32) -> f32 {
        match self.unit {
            LengthUnit::Percent => base * self.value / 100.0,
            _ => self.to_points(font_size, root_font_size).unwrap_or(0.0),
        }
    }
}

/// A size that may be `auto` or relative to a containing block
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum Dimension {
    #[default]
    Auto,
    Points(f32),
    Percent(f32),
}

impl Dimension {
    /// Parse `auto`, `none` (treated as auto) or a length
    pub fn parse(value: &str, font_size: f32, root_font_size: f32) -> Option<Self> {
        let v = value.trim();
        if v.eq_ignore_ascii_case("auto") || v.eq_ignore_ascii_case("none") {
            return Some(Self::Auto);
        }
        let len = Length::parse(v)?;
        Some(match len.unit {
            LengthUnit::Percent => Self::Percent(len.value),
            _ => Self::Points(len.to_points(font_size, root_font_size)?),
        })
    }

    /// Resolve against a reference size; `None` stays auto
    pub fn resolve(self, base: Option<f32>) -> Option<f32> {
        match self {
            Self::Auto => None,
            Self::Points(v) => Some(v),
            Self::Percent(p) => base.map(|b| b * p / 100.0),
        }
    }

    /// Resolve, treating auto as zero
    pub fn resolve_or_zero(self, base: f32) -> f32 {
        self.resolve(Some(base)).unwrap_or(0.0)
    }

    pub fn is_auto(self) -> bool {
        matches!(self, Self::Auto)
    }
}

/// CSS color
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Default for Color {
    fn default() -> Self {
        Self::BLACK
    }
}

impl Color {
    pub const TRANSPARENT: Color = Color { r: 0, g: 0, b: 0, a: 0 };
    pub const BLACK: Color = Color { r: 0, g: 0, b: 0, a: 255 };
    pub const WHITE: Color = Color { r: 255, g: 255, b: 255, a: 255 };

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    pub const fn rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    pub fn is_transparent(&self) -> bool {
        self.a == 0
    }

    /// Components as 0.0..=1.0 floats
    pub fn to_unit_rgb(&self) -> (f32, f32, f32) {
        (
            self.r as f32 / 255.0,
            self.g as f32 / 255.0,
            self.b as f32 / 255.0,
        )
    }

    /// Parse any supported color syntax
    pub fn parse(value: &str) -> Option<Self> {
        let v = value.trim().to_ascii_lowercase();
        if v.starts_with('#') {
            return Self::from_hex(&v);
        }
        if let Some(args) = v.strip_prefix("rgba(").or_else(|| v.strip_prefix("rgb(")) {
            return Self::from_rgb_function(args.strip_suffix(')')?);
        }
        Self::from_name(&v)
    }

    /// Parse a hex color (#RGB, #RGBA, #RRGGBB, #RRGGBBAA)
    pub fn from_hex(hex: &str) -> Option<Self> {
        let hex = hex.trim_start_matches('#');
        if !hex.is_ascii() {
            return None;
        }
        let nibble = |i: usize| u8::from_str_radix(&hex[i..i + 1], 16).ok().map(|v| v * 17);
        let byte = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).ok();
        match hex.len() {
            3 => Some(Self::rgb(nibble(0)?, nibble(1)?, nibble(2)?)),
            4 => Some(Self::rgba(nibble(0)?, nibble(1)?, nibble(2)?, nibble(3)?)),
            6 => Some(Self::rgb(byte(0)?, byte(2)?, byte(4)?)),
            8 => Some(Self::rgba(byte(0)?, byte(2)?, byte(4)?, byte(6)?)),
            _ => None,
        }
    }

    fn from_rgb_function(args: &str) -> Option<Self> {
        let parts: Vec<&str> = args
            .split(|c: char| c == ',' || c == '/' || c.is_whitespace())
            .filter(|p| !p.is_empty())
            .collect();
        if parts.len() < 3 {
            return None;
        }
        let channel = |p: &str| -> Option<u8> {
            let v = match p.strip_suffix('%') {
                Some(pct) => parse_number(pct)? * 2.55,
                None => parse_number(p)?,
            };
            Some(v.round().clamp(0.0, 255.0) as u8)
        };
        let alpha = match parts.get(3) {
            Some(p) => {
                let a = match p.strip_suffix('%') {
                    Some(pct) => parse_number(pct)? / 100.0,
                    None => parse_number(p)?,
                };
                (a.clamp(0.0, 1.0) * 255.0).round() as u8
            }
            None => 255,
        };
        Some(Self::rgba(
            channel(parts[0])?,
            channel(parts[1])?,
            channel(parts[2])?,
            alpha,
        ))
    }

    /// Parse a named color
    pub fn from_name(name: &str) -> Option<Self> {
        Some(match name {
            "transparent" => Self::TRANSPARENT,
            "black" => Self::BLACK,
            "white" => Self::WHITE,
            "red" => Self::rgb(255, 0, 0),
            "green" => Self::rgb(0, 128, 0),
            "blue" => Self::rgb(0, 0, 255),
            "yellow" => Self::rgb(255, 255, 0),
            "cyan" | "aqua" => Self::rgb(0, 255, 255),
            "magenta" | "fuchsia" => Self::rgb(255, 0, 255),
            "gray" | "grey" => Self::rgb(128, 128, 128),
            "darkgray" | "darkgrey" => Self::rgb(169, 169, 169),
            "lightgray" | "lightgrey" => Self::rgb(211, 211, 211),
            "dimgray" | "dimgrey" => Self::rgb(105, 105, 105),
            "whitesmoke" => Self::rgb(245, 245, 245),
            "gainsboro" => Self::rgb(220, 220, 220),
            "silver" => Self::rgb(192, 192, 192),
            "maroon" => Self::rgb(128, 0, 0),
            "olive" => Self::rgb(128, 128, 0),
            "lime" => Self::rgb(0, 255, 0),
            "navy" => Self::rgb(0, 0, 128),
            "purple" => Self::rgb(128, 0, 128),
            "teal" => Self::rgb(0, 128, 128),
            "orange" => Self::rgb(255, 165, 0),
            "brown" => Self::rgb(165, 42, 42),
            "pink" => Self::rgb(255, 192, 203),
            "gold" => Self::rgb(255, 215, 0),
            "indigo" => Self::rgb(75, 0, 130),
            "crimson" => Self::rgb(220, 20, 60),
            "darkblue" => Self::rgb(0, 0, 139),
            "darkred" => Self::rgb(139, 0, 0),
            "darkgreen" => Self::rgb(0, 100, 0),
            "steelblue" => Self::rgb(70, 130, 180),
            "slategray" | "slategrey" => Self::rgb(112, 128, 144),
            "beige" => Self::rgb(245, 245, 220),
            "ivory" => Self::rgb(255, 255, 240),
            "linen" => Self::rgb(250, 240, 230),
            "aliceblue" => Self::rgb(240, 248, 255),
            _ => return None,
        })
    }
}

/// Parse a plain number (`1`, `-0.5`, `.75`)
pub fn parse_number(s: &str) -> Option<f32> {
    let s = s.trim();
    if s.is_empty() {
        return None;
    }
    s.parse::<f32>().ok().filter(|v| v.is_finite())
}

/// Split a value on top-level whitespace, keeping `rgb(1, 2, 3)` and quoted
/// strings intact
pub fn split_components(value: &str) -> Vec<String> {
    split_top_level(value, |c| c.is_whitespace())
}

/// Split a value on top-level commas
pub fn split_commas(value: &str) -> Vec<String> {
    split_top_level(value, |c| c == ',')
}

fn split_top_level(value: &str, is_sep: impl Fn(char) -> bool) -> Vec<String> {
    let mut parts = Vec::new();
    let mut current = String::new();
    let mut depth = 0usize;
    let mut quote: Option<char> = None;

    for c in value.chars() {
        match quote {
            Some(q) => {
                current.push(c);
                if c == q {
                    quote = None;
                }
                continue;
            }
            None if c == '"' || c == '\'' => {
                quote = Some(c);
                current.push(c);
                continue;
            }
            None => {}
        }
        match c {
            '(' | '[' => {
                depth += 1;
                current.push(c);
            }
            ')' | ']' => {
                depth = depth.saturating_sub(1);
                current.push(c);
            }
            c if depth == 0 && is_sep(c) => {
                let part = current.trim();
                if !part.is_empty() {
                    parts.push(part.to_string());
                }
                current.clear();
            }
            c => current.push(c),
        }
    }
    let part = current.trim();
    if !part.is_empty() {
        parts.push(part.to_string());
    }
    parts
}

/// Strip one level of matching quotes
pub fn unquote(s: &str) -> &str {
    let s = s.trim();
    for q in ['"', '\''] {
        if s.len() >= 2 && s.starts_with(q) && s.ends_with(q) {
            return &s[1..s.len() - 1];
        }
    }
    s
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_length_units_to_points() {
        let cases = [
            ("16px", 12.0),
            ("1in", 72.0),
            ("2.54cm", 72.0),
            ("25.4mm", 72.0),
            ("1pc", 12.0),
            ("10pt", 10.0),
            ("0", 0.0),
        ];
        for (src, expected) in cases {
            let pts = Length::parse(src).unwrap().to_points(12.0, 12.0).unwrap();
            assert!((pts - expected).abs() < 0.01, "{src} -> {pts}");
        }
    }

    #[test]
    fn test_relative_lengths() {
        assert_eq!(Length::parse("2em").unwrap().to_points(10.0, 12.0), Some(20.0));
        assert_eq!(Length::parse("2rem").unwrap().to_points(10.0, 12.0), Some(24.0));
        assert_eq!(Length::parse("50%").unwrap().to_points(10.0, 12.0), None);
        assert_eq!(Length::parse("50%").unwrap().resolve(300.0, 10.0, 12.0), 150.0);
    }

    #[test]
    fn test_unitless_nonzero_is_not_a_length() {
        assert_eq!(Length::parse("5"), None);
        assert_eq!(Length::parse("5furlongs"), None);
    }

    #[test]
    fn test_dimension() {
        assert_eq!(Dimension::parse("auto", 12.0, 12.0), Some(Dimension::Auto));
        assert_eq!(Dimension::parse("50%", 12.0, 12.0), Some(Dimension::Percent(50.0)));
        assert_eq!(Dimension::Percent(50.0).resolve(Some(200.0)), Some(100.0));
        assert_eq!(Dimension::Percent(50.0).resolve(None), None);
    }

    #[test]
    fn test_colors() {
        assert_eq!(Color::parse("#333"), Some(Color::rgb(0x33, 0x33, 0x33)));
        assert_eq!(Color::parse("#2C3E50"), Some(Color::rgb(0x2c, 0x3e, 0x50)));
        assert_eq!(Color::parse("rgb(255, 0, 0)"), Some(Color::rgb(255, 0, 0)));
        assert_eq!(Color::parse("rgba(0,0,0,0.5)").unwrap().a, 128);
        assert_eq!(Color::parse("White"), Some(Color::WHITE));
        assert_eq!(Color::parse("#zzz"), None);
        assert_eq!(Color::parse("#ééé"), None);
    }

    #[test]
    fn test_split_components() {
        assert_eq!(
            split_components("1px solid rgb(1, 2, 3)"),
            vec!["1px", "solid", "rgb(1, 2, 3)"]
        );
        assert_eq!(
            split_commas("\"Open Sans\", Arial, sans-serif"),
            vec!["\"Open Sans\"", "Arial", "sans-serif"]
        );
        assert_eq!(unquote("'Lato'"), "Lato");
    }
}
