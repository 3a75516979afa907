//! CSS Box Model

use press_css::Edges;

/// Rectangle in page coordinates (points, top-left origin)
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Rect {
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self { x, y, width, height }
    }

    pub fn right(&self) -> f32 {
        self.x + self.width
    }

    pub fn bottom(&self) -> f32 {
        self.y + self.height
    }

    pub fn contains(&self, x: f32, y: f32) -> bool {
        x >= self.x && x <= self.right() && y >= self.y && y <= self.bottom()
    }

    /// Grow outward by the given edges
    pub fn expand(&self, edges: Edges<f32>) -> Self {
        Self {
            x: self.x - edges.left,
            y: self.y - edges.top,
            width: self.width + edges.horizontal(),
            height: self.height + edges.vertical(),
        }
    }

    /// Shrink inward by the given edges, never below zero size
    pub fn shrink(&self, edges: Edges<f32>) -> Self {
        Self {
            x: self.x + edges.left,
            y: self.y + edges.top,
            width: (self.width - edges.horizontal()).max(0.0),
            height: (self.height - edges.vertical()).max(0.0),
        }
    }
}

/// Horizontal box metrics of a block, resolved against its containing block
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct BoxDimensions {
    pub margin: Edges<f32>,
    pub border: Edges<f32>,
    pub padding: Edges<f32>,
    /// x of the border box's left edge
    pub border_x: f32,
    pub content_width: f32,
}

impl BoxDimensions {
    pub fn content_x(&self) -> f32 {
        self.border_x + self.border.left + self.padding.left
    }

    pub fn border_box_width(&self) -> f32 {
        self.content_width + self.padding.horizontal() + self.border.horizontal()
    }

    /// Space above the content inside the border box
    pub fn inner_top(&self) -> f32 {
        self.border.top + self.padding.top
    }

    /// Space below the content inside the border box
    pub fn inner_bottom(&self) -> f32 {
        self.border.bottom + self.padding.bottom
    }
}
