//! Shorthand expansion
//!
//! Shorthands are expanded into longhands when a declaration is read, so the
//! cascade orders `margin` and `margin-top` like any other pair of
//! declarations.

use crate::values::{Color, Length, split_commas, split_components};

const SIDES: [&str; 4] = ["top", "right", "bottom", "left"];

/// Expand a declaration into `(longhand, value)` pairs
///
/// Non-shorthand properties come back unchanged. Unrecognized shorthand
/// values expand to nothing and are dropped.
pub fn expand(name: &str, value: &str) -> Vec<(String, String)> {
    let name = name.trim().to_ascii_lowercase();
    let value = value.trim();

    match name.as_str() {
        "margin" | "padding" => box_sides(value)
            .map(|sides| {
                SIDES
                    .iter()
                    .zip(sides)
                    .map(|(side, v)| (format!("{name}-{side}"), v))
                    .collect()
            })
            .unwrap_or_default(),
        "border-width" | "border-style" | "border-color" => {
            let suffix = &name["border-".len()..];
            box_sides(value)
                .map(|sides| {
                    SIDES
                        .iter()
                        .zip(sides)
                        .map(|(side, v)| (format!("border-{side}-{suffix}"), v))
                        .collect()
                })
                .unwrap_or_default()
        }
        "border" => SIDES
            .iter()
            .flat_map(|side| border_side(side, value))
            .collect(),
        "border-top" | "border-right" | "border-bottom" | "border-left" => {
            border_side(&name["border-".len()..], value)
        }
        "background" => background(value),
        "list-style" => list_style(value),
        "font" => font(value),
        "text-decoration-line" => vec![("text-decoration".into(), value.into())],
        "break-before" | "break-after" => {
            let target = name.replace("break-", "page-break-");
            let v = match value.to_ascii_lowercase().as_str() {
                "page" | "always" | "left" | "right" | "recto" | "verso" => "always",
                "avoid" | "avoid-page" => "avoid",
                _ => "auto",
            };
            vec![(target, v.into())]
        }
        "break-inside" => {
            let v = if value.to_ascii_lowercase().starts_with("avoid") { "avoid" } else { "auto" };
            vec![("page-break-inside".into(), v.into())]
        }
        "overflow-x" | "overflow-y" => vec![("overflow".into(), value.into())],
        _ => vec![(name, value.to_string())],
    }
}

/// Expand 1-4 box values into top/right/bottom/left
fn box_sides(value: &str) -> Option<[String; 4]> {
    let parts = split_components(value);
    let [t, r, b, l] = match parts.as_slice() {
        [a] => [a, a, a, a],
        [v, h] => [v, h, v, h],
        [t, h, b] => [t, h, b, h],
        [t, r, b, l] => [t, r, b, l],
        _ => return None,
    };
    Some([t.clone(), r.clone(), b.clone(), l.clone()])
}

fn is_border_style(s: &str) -> bool {
    matches!(
        s,
        "none" | "hidden" | "solid" | "dashed" | "dotted" | "double" | "groove" | "ridge" | "inset" | "outset"
    )
}

fn is_border_width(s: &str) -> bool {
    matches!(s, "thin" | "medium" | "thick") || Length::parse(s).is_some()
}

fn border_side(side: &str, value: &str) -> Vec<(String, String)> {
    let mut width = "medium".to_string();
    let mut style = "none".to_string();
    let mut color = "currentcolor".to_string();

    for part in split_components(value) {
        let lower = part.to_ascii_lowercase();
        if is_border_style(&lower) {
            style = lower;
        } else if is_border_width(&lower) {
            width = lower;
        } else if Color::parse(&lower).is_some() || lower == "currentcolor" {
            color = lower;
        } else {
            return Vec::new();
        }
    }

    vec![
        (format!("border-{side}-width"), width),
        (format!("border-{side}-style"), style),
        (format!("border-{side}-color"), color),
    ]
}

fn background(value: &str) -> Vec<(String, String)> {
    // Only the color layer is painted; images and gradients are ignored
    let color = split_components(value)
        .into_iter()
        .rev()
        .find(|p| Color::parse(p).is_some())
        .unwrap_or_else(|| "transparent".to_string());
    vec![("background-color".into(), color)]
}

fn list_style(value: &str) -> Vec<(String, String)> {
    const TYPES: [&str; 7] = ["disc", "circle", "square", "decimal", "lower-alpha", "upper-alpha", "none"];
    split_components(value)
        .into_iter()
        .map(|p| p.to_ascii_lowercase())
        .find(|p| TYPES.contains(&p.as_str()))
        .map(|t| vec![("list-style-type".to_string(), t)])
        .unwrap_or_default()
}

/// `font: [style] [weight] size[/line-height] family[, family]*`
fn font(value: &str) -> Vec<(String, String)> {
    let families_start = value.find(',').unwrap_or(value.len());
    let (head, rest) = value.split_at(families_start);
    let mut parts = split_components(head);
    if parts.len() < 2 {
        return Vec::new();
    }

    // Everything after the size token belongs to the family list
    let Some(size_index) = parts.iter().position(|p| {
        let size = p.split('/').next().unwrap_or(p);
        Length::parse(size).is_some()
    }) else {
        return Vec::new();
    };
    let family_head = parts.split_off(size_index + 1).join(" ");
    let size_token = parts.pop().unwrap_or_default();

    let mut out = Vec::new();
    for p in parts {
        let lower = p.to_ascii_lowercase();
        match lower.as_str() {
            "italic" | "oblique" => out.push(("font-style".to_string(), lower)),
            "bold" | "bolder" | "lighter" => out.push(("font-weight".to_string(), lower)),
            w if w.parse::<u16>().is_ok() => out.push(("font-weight".to_string(), lower)),
            _ => {}
        }
    }

    let mut size_parts = size_token.splitn(2, '/');
    if let Some(size) = size_parts.next() {
        out.push(("font-size".to_string(), size.to_string()));
    }
    if let Some(lh) = size_parts.next() {
        out.push(("line-height".to_string(), lh.to_string()));
    }

    let families = format!("{family_head}{rest}");
    if split_commas(&families).is_empty() {
        return Vec::new();
    }
    out.push(("font-family".to_string(), families.trim().to_string()));
    out
}
