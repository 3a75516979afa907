//! Inline Layout
//!
//! Consecutive inline-level nodes are flattened into measured items (words,
//! images, forced breaks), packed greedily into line boxes, aligned, and
//! emitted as text and image boxes. Each line is placed through the flow,
//! so lines are the unit of pagination.

use std::ops::Range;

use press_css::{ComputedStyle, Display, TextAlign, WhiteSpace};
use press_dom::{ElementKind, NodeId};
use press_text::{FontHandle, Segment, break_lines, force_break, measure, shape};

use crate::block::Containing;
use crate::box_model::Rect;
use crate::flow::{Flow, PendingMarker};
use crate::image::image_size;
use crate::page::{BoxKind, LayoutBox, TextRun};

/// Spaces a tab expands to in preformatted text
const TAB_WIDTH: usize = 4;

#[derive(Debug, Clone)]
enum ItemKind {
    Text { text: String, font: FontHandle },
    Image { src: String, height: f32 },
    Break,
}

/// One measured piece of inline content
#[derive(Debug, Clone)]
struct Item<'s> {
    kind: ItemKind,
    node: NodeId,
    style: &'s ComputedStyle,
    width: f32,
    space_after: f32,
    break_after: bool,
    glue_after: bool,
}

impl Item<'_> {
    fn segment(&self) -> Segment {
        Segment {
            width: self.width,
            space_after: self.space_after,
            break_after: self.break_after,
            glue_after: self.glue_after,
        }
    }
}

/// Builds the item list, collapsing whitespace across node boundaries
struct ItemCollector<'s> {
    items: Vec<Item<'s>>,
    /// Space seen since the last item
    pending_space: Option<f32>,
}

impl<'s> ItemCollector<'s> {
    fn new() -> Self {
        Self {
            items: Vec::new(),
            pending_space: None,
        }
    }

    fn push(&mut self, item: Item<'s>) {
        let space = self.pending_space.take();
        if let Some(prev) = self.items.last_mut() {
            if !prev.break_after {
                match space {
                    Some(width) => {
                        prev.space_after = width;
                        prev.glue_after = !prev.style.white_space.wraps();
                    }
                    None => prev.glue_after = true,
                }
            }
        }
        self.items.push(item);
    }

    fn push_break(&mut self, node: NodeId, style: &'s ComputedStyle) {
        self.pending_space = None;
        self.items.push(Item {
            kind: ItemKind::Break,
            node,
            style,
            width: 0.0,
            space_after: 0.0,
            break_after: true,
            glue_after: false,
        });
    }

    /// Record a space; collapsible spaces merge, preserved ones add up.
    /// Spaces at the start of a line are dropped.
    fn space(&mut self, width: f32, preserved: bool) {
        if !self.items.last().is_some_and(|i| !i.break_after) {
            return;
        }
        self.pending_space = Some(match self.pending_space {
            Some(w) if preserved => w + width,
            Some(w) => w.max(width),
            None => width,
        });
    }
}

/// Measured line box
struct Line {
    range: Range<usize>,
    height: f32,
    /// Baseline offset from the line top
    ascent: f32,
    width: f32,
}

impl<'a> Flow<'a> {
    /// Lay out a run of inline-level children of `parent`
    pub fn layout_inline(&mut self, parent: NodeId, run: &[NodeId], cb: Containing) {
        let styled = self.styled;
        let Some(block_style) = styled.effective_style(parent) else {
            return;
        };

        let mut collector = ItemCollector::new();
        for &node in run {
            self.collect(node, &mut collector, cb);
        }
        let mut items = collector.items;
        if items.is_empty() {
            return;
        }

        let wraps = block_style.white_space.wraps();
        if wraps {
            items = split_long_words(items, cb.width);
        }
        let available = if wraps { cb.width } else { f32::INFINITY };
        let segments: Vec<Segment> = items.iter().map(Item::segment).collect();
        let ranges = break_lines(&segments, available);
        let line_count = ranges.len();

        let strut_font = self.font_for(block_style);
        let strut = line_extent(&strut_font, block_style);

        for (i, range) in ranges.into_iter().enumerate() {
            let line = measure_line(&items, range, strut);
            let is_last = i + 1 == line_count || items[line.range.end - 1].break_after;
            self.place_line(&items, &line, block_style, cb, is_last);
        }
    }

    /// Flatten one inline node into items
    fn collect(&mut self, node: NodeId, out: &mut ItemCollector<'a>, cb: Containing) {
        let styled = self.styled;
        let tree = styled.tree();
        let Some(data) = tree.get(node) else { return };

        if let Some(text) = data.as_text() {
            if let Some(style) = styled.effective_style(node) {
                self.collect_text(node, text, style, out);
            }
            return;
        }

        let Some(element) = data.as_element() else { return };
        let Some(style) = styled.style(node) else { return };
        if style.display == Display::None {
            return;
        }

        match element.kind {
            ElementKind::Br => out.push_break(node, style),
            ElementKind::Img => {
                let Some(src) = element.get_attr("src") else { return };
                match self.images.intrinsic_size(src) {
                    Some(intrinsic) => {
                        let (width, height) = image_size(style, intrinsic, cb.width, cb.height);
                        out.push(Item {
                            kind: ItemKind::Image {
                                src: src.to_string(),
                                height,
                            },
                            node,
                            style,
                            width,
                            space_after: 0.0,
                            break_after: false,
                            glue_after: false,
                        });
                    }
                    None => self.missing_image(src),
                }
            }
            _ => {
                for child in tree.children(node) {
                    self.collect(child, out, cb);
                }
            }
        }
    }

    fn collect_text(&mut self, node: NodeId, raw: &str, style: &'a ComputedStyle, out: &mut ItemCollector<'a>) {
        let text = style.text_transform.apply(raw);
        let font = self.font_for(style);
        let size = style.font_size;
        let spacing = style.letter_spacing;
        let space = measure(&font, " ", size, spacing);

        let word = |out: &mut ItemCollector<'a>, text: String| {
            let width = measure(&font, &text, size, spacing);
            out.push(Item {
                kind: ItemKind::Text {
                    text,
                    font: font.clone(),
                },
                node,
                style,
                width,
                space_after: 0.0,
                break_after: false,
                glue_after: false,
            });
        };

        match style.white_space {
            WhiteSpace::Normal | WhiteSpace::NoWrap => collapsed_words(&text, space, out, &word),
            WhiteSpace::PreLine => {
                for (i, line) in text.split('\n').enumerate() {
                    if i > 0 {
                        out.push_break(node, style);
                    }
                    collapsed_words(line, space, out, &word);
                }
            }
            WhiteSpace::Pre => {
                for (i, line) in preformatted_lines(&text).enumerate() {
                    if i > 0 {
                        out.push_break(node, style);
                    }
                    if !line.is_empty() {
                        word(out, line);
                    }
                }
            }
            WhiteSpace::PreWrap => {
                for (i, line) in preformatted_lines(&text).enumerate() {
                    if i > 0 {
                        out.push_break(node, style);
                    }
                    let body = line.trim_start_matches(' ');
                    let indent = line.len() - body.len();
                    for (j, piece) in body.split(' ').enumerate() {
                        if j > 0 {
                            out.space(space, true);
                        }
                        if piece.is_empty() {
                            continue;
                        }
                        if j == 0 && indent > 0 {
                            word(out, format!("{}{piece}", " ".repeat(indent)));
                        } else {
                            word(out, piece.to_string());
                        }
                    }
                }
            }
        }
    }

    fn place_line(&mut self, items: &[Item<'_>], line: &Line, block_style: &ComputedStyle, cb: Containing, is_last: bool) {
        if self.expired() {
            return;
        }
        let first_node = items[line.range.start].node;
        let Some(top) = self.place(first_node, line.height) else {
            return;
        };
        let baseline = top + line.ascent;

        let slack = (cb.width - line.width).max(0.0);
        let gaps = items[line.range.clone()]
            .iter()
            .rev()
            .skip(1)
            .filter(|i| i.space_after > 0.0)
            .count();
        let justify = block_style.text_align == TextAlign::Justify && !is_last && gaps > 0;
        let (offset, extra_gap) = match block_style.text_align {
            TextAlign::Left => (0.0, 0.0),
            TextAlign::Right => (slack, 0.0),
            TextAlign::Center => (slack / 2.0, 0.0),
            TextAlign::Justify if justify => (0.0, slack / gaps as f32),
            TextAlign::Justify => (0.0, 0.0),
        };

        if let Some(marker) = self.marker.take() {
            self.emit_marker(marker, baseline);
        }

        let mut x = cb.x + offset;
        // (start x, text, index of the first item) of the run being merged
        let mut pending: Option<(f32, String, usize)> = None;
        let end = line.range.end;

        for idx in line.range.clone() {
            let item = &items[idx];
            match &item.kind {
                ItemKind::Text { text, .. } => {
                    let merge = !justify
                        && pending
                            .as_ref()
                            .is_some_and(|(_, _, first)| same_run_style(&items[*first], item));
                    if merge {
                        if let Some((_, buf, _)) = pending.as_mut() {
                            if items[idx - 1].space_after > 0.0 {
                                buf.push(' ');
                            }
                            buf.push_str(text);
                        }
                    } else {
                        if let Some((start_x, buf, first)) = pending.take() {
                            self.emit_text(&items[first], start_x, baseline, &buf);
                        }
                        pending = Some((x, text.clone(), idx));
                    }
                }
                ItemKind::Image { src, height } => {
                    if let Some((start_x, buf, first)) = pending.take() {
                        self.emit_text(&items[first], start_x, baseline, &buf);
                    }
                    if item.style.visible {
                        let rect = Rect::new(x, baseline - height, item.width, *height);
                        self.push_box(Some(item.node), rect, BoxKind::Image { src: src.clone() });
                    }
                }
                ItemKind::Break => {}
            }

            x += item.width;
            if idx + 1 < end && item.space_after > 0.0 {
                x += item.space_after + extra_gap;
            }
        }
        if let Some((start_x, buf, first)) = pending.take() {
            self.emit_text(&items[first], start_x, baseline, &buf);
        }
    }

    fn emit_text(&mut self, item: &Item<'_>, x: f32, baseline: f32, text: &str) {
        let ItemKind::Text { font, .. } = &item.kind else { return };
        if !item.style.visible || text.is_empty() {
            return;
        }
        self.push_text(Some(item.node), font.clone(), item.style, x, baseline, text);
    }

    pub fn push_text(&mut self, node: Option<NodeId>, font: FontHandle, style: &ComputedStyle, x: f32, baseline: f32, text: &str) {
        if let Some(text_box) = text_box(node, font, style, x, baseline, text, &mut self.warnings) {
            self.push_box(text_box.node, text_box.rect, text_box.kind);
        }
    }

    /// List marker hung left of the item's first line
    fn emit_marker(&mut self, marker: PendingMarker, baseline: f32) {
        if !marker.style.visible {
            return;
        }
        let style = ComputedStyle {
            text_decoration: Default::default(),
            letter_spacing: 0.0,
            ..marker.style
        };
        let font = self.font_for(&style);
        let width = measure(&font, &marker.text, style.font_size, 0.0);
        let x = marker.content_x - style.font_size * 0.5 - width;
        self.push_text(Some(marker.node), font, &style, x, baseline, &marker.text);
    }
}

/// Shape `text` into a positioned text box
///
/// Shaping failures fall back to the built-in font and are recorded in
/// `warnings`.
pub(crate) fn text_box(
    node: Option<NodeId>,
    font: FontHandle,
    style: &ComputedStyle,
    x: f32,
    baseline: f32,
    text: &str,
    warnings: &mut Vec<String>,
) -> Option<LayoutBox> {
    let size = style.font_size;
    let (font, shaped) = match shape(&font, text, size, style.letter_spacing) {
        Ok(run) => (font, run),
        Err(e) => {
            tracing::warn!("shaping failed, using built-in font: {}", e);
            warnings.push(e.to_string());
            let builtin = FontHandle::Builtin {
                bold: style.is_bold(),
                italic: false,
            };
            (builtin.clone(), shape(&builtin, text, size, style.letter_spacing).ok()?)
        }
    };
    let ascent = font.ascent(size);
    Some(LayoutBox {
        node,
        rect: Rect::new(x, baseline - ascent, shaped.width, ascent + font.descent(size)),
        kind: BoxKind::Text(TextRun {
            font,
            font_size: size,
            color: style.color,
            baseline,
            decoration: style.text_decoration,
            shaped,
        }),
    })
}

/// Push the words of whitespace-collapsing text
fn collapsed_words<'s>(text: &str, space: f32, out: &mut ItemCollector<'s>, word: &impl Fn(&mut ItemCollector<'s>, String)) {
    if text.starts_with(char::is_whitespace) {
        out.space(space, false);
    }
    let mut words = text.split_whitespace().peekable();
    while let Some(w) = words.next() {
        word(out, w.to_string());
        if words.peek().is_some() {
            out.space(space, false);
        }
    }
    if text.ends_with(char::is_whitespace) {
        out.space(space, false);
    }
}

/// Split words wider than the line into pieces that each fit
fn split_long_words(items: Vec<Item<'_>>, available: f32) -> Vec<Item<'_>> {
    let mut out = Vec::with_capacity(items.len());
    for item in items {
        let ItemKind::Text { text, font } = &item.kind else {
            out.push(item);
            continue;
        };
        if item.width <= available || !item.style.white_space.wraps() {
            out.push(item);
            continue;
        }

        let style = item.style;
        let pieces = force_break(text, available, |s| measure(font, s, style.font_size, style.letter_spacing));
        let count = pieces.len();
        for (i, piece) in pieces.into_iter().enumerate() {
            let last = i + 1 == count;
            out.push(Item {
                width: measure(font, &piece, style.font_size, style.letter_spacing),
                kind: ItemKind::Text {
                    text: piece,
                    font: font.clone(),
                },
                space_after: if last { item.space_after } else { 0.0 },
                glue_after: last && item.glue_after,
                break_after: last && item.break_after,
                ..item.clone()
            });
        }
    }
    out
}

/// Text items that can be drawn as one run
fn same_run_style(a: &Item<'_>, b: &Item<'_>) -> bool {
    match (&a.kind, &b.kind) {
        (ItemKind::Text { font: fa, .. }, ItemKind::Text { font: fb, .. }) => {
            std::ptr::eq(a.style, b.style) && fa.key() == fb.key() && !a.style.white_space.preserves_spaces()
        }
        _ => false,
    }
}

/// (above baseline, below baseline) extent of a line-height strut
fn line_extent(font: &FontHandle, style: &ComputedStyle) -> (f32, f32) {
    let size = style.font_size;
    let ascent = font.ascent(size);
    let descent = font.descent(size);
    let half_leading = (style.line_height_points() - (ascent + descent)) / 2.0;
    (ascent + half_leading, descent + half_leading)
}

fn measure_line(items: &[Item<'_>], range: Range<usize>, strut: (f32, f32)) -> Line {
    let (mut above, mut below) = strut;
    let mut width = 0.0;
    for idx in range.clone() {
        let item = &items[idx];
        match &item.kind {
            ItemKind::Text { font, .. } => {
                let (a, b) = line_extent(font, item.style);
                above = above.max(a);
                below = below.max(b);
            }
            ItemKind::Image { height, .. } => above = above.max(*height),
            ItemKind::Break => {}
        }
        width += item.width;
        if idx + 1 < range.end {
            width += item.space_after;
        }
    }
    Line {
        range,
        height: (above + below).max(0.0),
        ascent: above,
        width,
    }
}

/// Split preformatted text into lines with tabs expanded
fn preformatted_lines(text: &str) -> impl Iterator<Item = String> + '_ {
    let tab = " ".repeat(TAB_WIDTH);
    text.split('\n').map(move |line| line.replace('\t', &tab))
}

#[cfg(test)]
mod tests {
    use super::*;
    use press_css::LineHeight;

    fn text_item<'s>(style: &'s ComputedStyle, text: &str, width: f32) -> Item<'s> {
        Item {
            kind: ItemKind::Text {
                text: text.to_string(),
                font: FontHandle::Builtin { bold: false, italic: false },
            },
            node: NodeId::ROOT,
            style,
            width,
            space_after: 0.0,
            break_after: false,
            glue_after: false,
        }
    }

    #[test]
    fn test_preformatted_lines() {
        let lines: Vec<String> = preformatted_lines("a\tb\nc").collect();
        assert_eq!(lines, vec!["a    b", "c"]);
    }

    #[test]
    fn test_line_extent_centers_leading() {
        let font = FontHandle::Builtin { bold: false, italic: false };
        let style = ComputedStyle {
            font_size: 10.0,
            line_height: LineHeight::Points(20.0),
            ..ComputedStyle::default()
        };
        let (above, below) = line_extent(&font, &style);
        assert!((above + below - 20.0).abs() < 1e-4);
        assert!(above > below);
    }

    #[test]
    fn test_collector_collapses_spaces() {
        let style = ComputedStyle::default();
        let mut out = ItemCollector::new();
        out.space(3.0, false);
        out.push(text_item(&style, "a", 5.0));
        out.space(3.0, false);
        out.space(3.0, false);
        out.push(text_item(&style, "b", 5.0));
        assert_eq!(out.items.len(), 2);
        assert_eq!(out.items[0].space_after, 3.0);
        assert!(!out.items[0].glue_after);
    }

    #[test]
    fn test_preserved_spaces_add_up() {
        let style = ComputedStyle::default();
        let mut out = ItemCollector::new();
        out.push(text_item(&style, "a", 5.0));
        out.space(3.0, true);
        out.space(3.0, true);
        out.push(text_item(&style, "b", 5.0));
        assert_eq!(out.items[0].space_after, 6.0);
    }

    #[test]
    fn test_collector_glues_adjacent_items() {
        let style = ComputedStyle::default();
        let mut out = ItemCollector::new();
        out.push(text_item(&style, "foo", 5.0));
        out.push(text_item(&style, "bar", 5.0));
        assert!(out.items[0].glue_after);
    }

    #[test]
    fn test_nowrap_spaces_glue() {
        let style = ComputedStyle {
            white_space: WhiteSpace::NoWrap,
            ..ComputedStyle::default()
        };
        let mut out = ItemCollector::new();
        out.push(text_item(&style, "a", 5.0));
        out.space(3.0, false);
        out.push(text_item(&style, "b", 5.0));
        assert!(out.items[0].glue_after);
        assert_eq!(out.items[0].space_after, 3.0);
    }

    #[test]
    fn test_space_dropped_after_break() {
        let style = ComputedStyle::default();
        let mut out = ItemCollector::new();
        out.push(text_item(&style, "a", 5.0));
        out.push_break(NodeId::ROOT, &style);
        out.space(3.0, false);
        out.push(text_item(&style, "b", 5.0));
        assert_eq!(out.items.len(), 3);
        assert_eq!(out.items[1].space_after, 0.0);
    }

    #[test]
    fn test_long_word_split() {
        let style = ComputedStyle::default();
        let items = vec![text_item(&style, "aaaaaaaaaaaaaaaaaaaa", 120.0)];
        let split = split_long_words(items, 30.0);
        assert!(split.len() > 1);
        assert!(split.iter().all(|i| i.width <= 30.0 + 0.01));
    }

    #[test]
    fn test_measure_line_ignores_trailing_space() {
        let style = ComputedStyle::default();
        let mut a = text_item(&style, "a", 10.0);
        a.space_after = 4.0;
        let mut b = text_item(&style, "b", 10.0);
        b.space_after = 4.0;
        let line = measure_line(&[a, b], 0..2, (8.0, 2.0));
        assert_eq!(line.width, 24.0);
        assert!(line.height >= 10.0);
    }
}
