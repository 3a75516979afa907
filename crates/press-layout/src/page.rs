//! Pages and positioned boxes
//!
//! The output of layout: a finite list of pages, each holding boxes in paint
//! order with page-absolute geometry.

use press_css::{BorderStyle, Color, Edges, PageGeometry, TextDecoration};
use press_dom::NodeId;
use press_text::{FontHandle, ShapedRun};

use crate::box_model::Rect;

/// Result of laying out a document
#[derive(Debug, Clone)]
pub struct Layout {
    pub pages: Vec<Page>,
    /// Unbreakable items taller than a page, skipped
    pub overflows: Vec<LayoutOverflow>,
    /// Recovered problems (missing images, font substitutions)
    pub warnings: Vec<String>,
}

impl Layout {
    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    /// Every box on every page
    pub fn boxes(&self) -> impl Iterator<Item = &LayoutBox> {
        self.pages.iter().flat_map(|p| p.boxes.iter())
    }
}

/// An item that could not be placed on any page
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LayoutOverflow {
    pub node: NodeId,
    pub height: f32,
}

/// One output page
#[derive(Debug, Clone)]
pub struct Page {
    /// 0-based page index
    pub index: usize,
    pub geometry: PageGeometry,
    /// Canvas background propagated from the root or body element
    pub background: Option<Color>,
    /// Boxes in paint order
    pub boxes: Vec<LayoutBox>,
}

impl Page {
    pub fn new(index: usize, geometry: PageGeometry) -> Self {
        Self {
            index,
            geometry,
            background: None,
            boxes: Vec::new(),
        }
    }

    /// Text runs on this page, in paint order
    pub fn text_runs(&self) -> impl Iterator<Item = (&Rect, &TextRun)> {
        self.boxes.iter().filter_map(|b| match &b.kind {
            BoxKind::Text(run) => Some((&b.rect, run)),
            _ => None,
        })
    }
}

/// A positioned box
#[derive(Debug, Clone)]
pub struct LayoutBox {
    /// Source element or text node; `None` for generated content
    pub node: Option<NodeId>,
    pub rect: Rect,
    pub kind: BoxKind,
}

#[derive(Debug, Clone)]
pub enum BoxKind {
    /// Background and borders of a block (one fragment per page)
    Block(BlockDecoration),
    /// One line fragment of text (or a list marker, or running footer)
    Text(TextRun),
    /// A replaced image; `rect` is the drawn size
    Image { src: String },
}

/// Paint data of a block fragment
#[derive(Debug, Clone, PartialEq)]
pub struct BlockDecoration {
    pub background: Color,
    /// Border widths; zero on sides not drawn in this fragment
    pub border: Edges<f32>,
    pub border_style: Edges<BorderStyle>,
    pub border_color: Edges<Color>,
}

impl BlockDecoration {
    pub fn is_visible(&self) -> bool {
        !self.background.is_transparent()
            || [self.border.top, self.border.right, self.border.bottom, self.border.left]
                .iter()
                .any(|w| *w > 0.0)
    }
}

/// Shaped text placed on a line
#[derive(Debug, Clone)]
pub struct TextRun {
    pub font: FontHandle,
    pub font_size: f32,
    pub color: Color,
    /// Absolute y of the baseline
    pub baseline: f32,
    pub decoration: TextDecoration,
    pub shaped: ShapedRun,
}

impl TextRun {
    pub fn text(&self) -> &str {
        &self.shaped.text
    }
}
