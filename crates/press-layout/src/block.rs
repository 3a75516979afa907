//! Block Layout
//!
//! Block boxes stack vertically inside their parent's content box. Widths
//! resolve top-down from the containing block; heights grow from content
//! as the flow cursor advances, so pagination happens while blocks are laid
//! out rather than afterwards.

use press_css::{Color, ComputedStyle, Dimension, Display};
use press_dom::{ElementKind, NodeId};

use crate::box_model::{BoxDimensions, Rect};
use crate::flow::{Flow, PendingMarker};
use crate::image::image_size;
use crate::page::{BlockDecoration, BoxKind};

/// Containing block of a box's children
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct Containing {
    pub x: f32,
    pub width: f32,
    /// Definite height, when known, for percentage heights
    pub height: Option<f32>,
}

impl Flow<'_> {
    /// Lay out the whole document from the `<html>` element down
    pub fn layout_root(&mut self) {
        let styled = self.styled;
        let doc = styled.document();
        let (x, _) = self.geometry.content_origin();
        let cb = Containing {
            x,
            width: self.geometry.content_width(),
            height: Some(self.geometry.content_height()),
        };

        let html = doc.document_element();
        if html.is_valid() {
            self.layout_block(html, cb);
        } else {
            self.layout_children(NodeId::ROOT, cb);
        }
    }

    /// Lay out one block-level element and its subtree
    pub fn layout_block(&mut self, node: NodeId, cb: Containing) {
        if self.expired() {
            return;
        }
        let styled = self.styled;
        let Some(style) = styled.style(node) else { return };
        if style.display == Display::None {
            return;
        }

        if style.page_break_before {
            self.request_break();
        }

        let is_image = styled.tree().element(node).is_some_and(|e| e.kind == ElementKind::Img);
        if is_image {
            self.layout_block_image(node, style, cb);
        } else if style.page_break_inside_avoid {
            let snapshot = self.snapshot();
            let at_page_start = snapshot.was_at_page_start();
            self.layout_block_box(node, style, cb);
            if self.pages_since(&snapshot) > 0 && !at_page_start {
                tracing::debug!("moving {:?} to a new page to avoid breaking inside it", node);
                self.restore(snapshot);
                self.new_page();
                self.layout_block_box(node, style, cb);
            }
        } else {
            self.layout_block_box(node, style, cb);
        }

        if style.page_break_after {
            self.request_break();
        }
    }

    fn layout_block_box(&mut self, node: NodeId, style: &ComputedStyle, cb: Containing) {
        let dims = block_dimensions(style, cb);
        let mut decoration = BlockDecoration {
            background: style.background_color,
            border: dims.border,
            border_style: style.border_style,
            border_color: style.used_border_color(),
        };
        if self.canvas_node == Some(node) {
            decoration.background = Color::TRANSPARENT;
        }

        let explicit_height = style.height.resolve(cb.height);
        let min_height = style.min_height.resolve(cb.height);
        let has_edge = dims.inner_top() > 0.0 || dims.inner_bottom() > 0.0 || decoration.is_visible();
        let sized = explicit_height.is_some() || min_height.is_some();

        self.add_margin(dims.margin.top);
        if has_edge || sized {
            self.apply_forced_break();
            self.flush_margin();
        }

        self.open_block(node, decoration, dims.border_x, dims.border_box_width(), style.visible);
        self.advance(dims.inner_top());
        let content_page = self.page_index();
        let content_top = self.cursor();

        if style.display == Display::ListItem {
            self.set_marker(node, style, dims.content_x());
        }

        let child_cb = Containing {
            x: dims.content_x(),
            width: dims.content_width,
            height: explicit_height.map(|h| match style.max_height.resolve(cb.height) {
                Some(max) => h.min(max),
                None => h,
            }),
        };
        self.layout_children(node, child_cb);

        if self.marker.as_ref().is_some_and(|m| m.node == node) {
            self.marker = None;
        }

        if let Some(target) = explicit_height.into_iter().chain(min_height).reduce(f32::max) {
            self.flush_margin();
            let used = self.distance_since(content_page, content_top);
            if used < target {
                self.advance(target - used);
            }
        }

        if has_edge || sized {
            self.flush_margin();
        }
        self.advance(dims.inner_bottom());
        self.close_block();
        self.add_margin(dims.margin.bottom);
    }

    /// Content height consumed since `(page, y)`, counting full pages between
    fn distance_since(&self, page: usize, y: f32) -> f32 {
        let pages = self.page_index() - page;
        if pages == 0 {
            return (self.cursor() - y).max(0.0);
        }
        let first = (self.page_bottom() - y).max(0.0);
        let middle = (pages - 1) as f32 * self.geometry.content_height();
        let last = self.cursor() - self.page_top();
        first + middle + last
    }

    /// Lay out the children of a block container
    ///
    /// Runs of consecutive inline-level children form anonymous inline
    /// formatting contexts between the block-level children.
    pub fn layout_children(&mut self, parent: NodeId, cb: Containing) {
        let styled = self.styled;
        let tree = styled.tree();
        let mut run: Vec<NodeId> = Vec::new();

        for child in tree.children(parent) {
            if self.expired() {
                return;
            }
            if self.is_hidden(child) {
                continue;
            }
            if self.is_block_level(child) {
                if !run.is_empty() {
                    self.layout_inline(parent, &run, cb);
                    run.clear();
                }
                self.layout_block(child, cb);
            } else {
                run.push(child);
            }
        }
        if !run.is_empty() {
            self.layout_inline(parent, &run, cb);
        }
    }

    fn is_hidden(&self, node: NodeId) -> bool {
        self.styled.style(node).is_some_and(|s| s.display == Display::None)
    }

    /// Block-level boxes, including inline elements that contain blocks
    fn is_block_level(&self, node: NodeId) -> bool {
        let styled = self.styled;
        let Some(style) = styled.style(node) else {
            return false;
        };
        match style.display {
            Display::Block | Display::ListItem => true,
            Display::None => false,
            Display::Inline => styled
                .tree()
                .children(node)
                .any(|c| !self.is_hidden(c) && self.is_block_level(c)),
        }
    }

    fn set_marker(&mut self, node: NodeId, style: &ComputedStyle, content_x: f32) {
        let ordinal = list_ordinal(self, node);
        let Some(text) = style.list_style_type.marker(ordinal) else {
            return;
        };
        self.marker = Some(PendingMarker {
            node,
            text,
            style: style.clone(),
            content_x,
        });
    }

    /// `<img style="display: block">` placed as a leaf block
    fn layout_block_image(&mut self, node: NodeId, style: &ComputedStyle, cb: Containing) {
        let styled = self.styled;
        let Some(src) = styled.tree().element(node).and_then(|e| e.get_attr("src")) else {
            return;
        };
        let Some(intrinsic) = self.images.intrinsic_size(src) else {
            self.missing_image(src);
            return;
        };
        let (width, height) = image_size(style, intrinsic, cb.width, cb.height);

        let margin_top = style.margin.top.resolve_or_zero(cb.width);
        let margin_bottom = style.margin.bottom.resolve_or_zero(cb.width);
        let x = match (style.margin.left, style.margin.right) {
            (Dimension::Auto, Dimension::Auto) => cb.x + ((cb.width - width) / 2.0).max(0.0),
            (Dimension::Auto, right) => cb.x + (cb.width - width - right.resolve_or_zero(cb.width)).max(0.0),
            (left, _) => cb.x + left.resolve_or_zero(cb.width),
        };

        self.add_margin(margin_top);
        if let Some(y) = self.place(node, height) {
            if style.visible {
                self.push_box(Some(node), Rect::new(x, y, width, height), BoxKind::Image { src: src.to_string() });
            }
        }
        self.add_margin(margin_bottom);
    }

    pub fn missing_image(&mut self, src: &str) {
        let shown: String = src.chars().take(64).collect();
        tracing::warn!("skipping image {:?}: missing or undecodable", shown);
        self.warnings.push(format!("image {shown:?} could not be loaded"));
    }
}

/// Resolve a block's horizontal metrics against its containing block
///
/// An explicit width is clamped so the border box fits the containing
/// block, unless the element sets `overflow: visible`.
pub(crate) fn block_dimensions(style: &ComputedStyle, cb: Containing) -> BoxDimensions {
    let padding = style.padding.map(|d| d.resolve_or_zero(cb.width));
    let border = style.used_border_width();
    let frame = padding.horizontal() + border.horizontal();

    let margin_left = style.margin.left.resolve(Some(cb.width));
    let margin_right = style.margin.right.resolve(Some(cb.width));

    let mut content_width = match style.width.resolve(Some(cb.width)) {
        Some(w) => w,
        None => cb.width - margin_left.unwrap_or(0.0) - margin_right.unwrap_or(0.0) - frame,
    };
    if let Some(max) = style.max_width.resolve(Some(cb.width)) {
        content_width = content_width.min(max);
    }
    if !style.overflow_visible {
        content_width = content_width.min(cb.width - frame);
    }
    let content_width = content_width.max(0.0);
    let used = content_width + frame;

    let (left, right) = match (margin_left, margin_right) {
        (None, None) => {
            let m = ((cb.width - used) / 2.0).max(0.0);
            (m, m)
        }
        (None, Some(r)) => ((cb.width - used - r).max(0.0), r),
        (Some(l), None) => (l, (cb.width - used - l).max(0.0)),
        (Some(l), Some(r)) => (l, r),
    };

    let mut margin = style.margin.map(|d| d.resolve_or_zero(cb.width));
    margin.left = left;
    margin.right = right;

    BoxDimensions {
        margin,
        border,
        padding,
        border_x: cb.x + left,
        content_width,
    }
}

/// 1-based position of a list item, honoring `<ol start>`
fn list_ordinal(flow: &Flow<'_>, node: NodeId) -> u32 {
    let tree = flow.styled.tree();
    let mut ordinal: u32 = tree
        .parent(node)
        .and_then(|p| tree.element(p))
        .filter(|e| e.kind == ElementKind::Ol)
        .and_then(|e| e.get_attr("start"))
        .and_then(|s| s.trim().parse().ok())
        .unwrap_or(1);

    let mut prev = tree.prev_element_sibling(node);
    while let Some(p) = prev {
        if flow.styled.style(p).is_some_and(|s| s.display == Display::ListItem) {
            ordinal += 1;
        }
        prev = tree.prev_element_sibling(p);
    }
    ordinal
}

#[cfg(test)]
mod tests {
    use super::*;
    use press_css::Edges;

    const CB: Containing = Containing {
        x: 10.0,
        width: 200.0,
        height: None,
    };

    #[test]
    fn test_auto_width_fills_containing_block() {
        let style = ComputedStyle {
            padding: Edges::all(Dimension::Points(5.0)),
            margin: Edges::all(Dimension::Points(10.0)),
            ..ComputedStyle::default()
        };
        let dims = block_dimensions(&style, CB);
        assert_eq!(dims.content_width, 170.0);
        assert_eq!(dims.border_x, 20.0);
        assert_eq!(dims.content_x(), 25.0);
    }

    #[test]
    fn test_explicit_width_clamped_to_containing_block() {
        let style = ComputedStyle {
            width: Dimension::Points(500.0),
            ..ComputedStyle::default()
        };
        assert_eq!(block_dimensions(&style, CB).content_width, 200.0);
    }

    #[test]
    fn test_overflow_visible_keeps_explicit_width() {
        let style = ComputedStyle {
            width: Dimension::Points(500.0),
            overflow_visible: true,
            ..ComputedStyle::default()
        };
        assert_eq!(block_dimensions(&style, CB).content_width, 500.0);
    }

    #[test]
    fn test_auto_margins_center() {
        let style = ComputedStyle {
            width: Dimension::Percent(50.0),
            margin: Edges {
                top: Dimension::Points(0.0),
                right: Dimension::Auto,
                bottom: Dimension::Points(0.0),
                left: Dimension::Auto,
            },
            ..ComputedStyle::default()
        };
        let dims = block_dimensions(&style, CB);
        assert_eq!(dims.content_width, 100.0);
        assert_eq!(dims.border_x, 60.0);
    }

    #[test]
    fn test_max_width() {
        let style = ComputedStyle {
            max_width: Dimension::Points(80.0),
            ..ComputedStyle::default()
        };
        assert_eq!(block_dimensions(&style, CB).content_width, 80.0);
    }
}
