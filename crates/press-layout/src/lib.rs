//! Press Layout Engine
//!
//! Turns a styled document into a list of fixed-size pages of positioned
//! boxes. Block boxes stack vertically, inline content is broken into line
//! boxes, and pagination happens during layout: lines, images and block
//! decorations are placed on the current page or pushed to the next.

mod block;
mod box_model;
mod flow;
mod image;
mod inline;
mod page;

pub use box_model::{BoxDimensions, Rect};
pub use image::{ImageProvider, NoImages, image_size};
pub use page::{BlockDecoration, BoxKind, Layout, LayoutBox, LayoutOverflow, Page, TextRun};

use std::time::Instant;

use press_css::{Color, ComputedStyle, MarginBox, MarginBoxPosition, PageGeometry, StyledDocument};
use press_text::{FontContext, measure};

use flow::Flow;

/// Layout error types
#[derive(Debug, Clone, thiserror::Error)]
pub enum LayoutError {
    #[error("Page geometry leaves no content area ({width}x{height}pt)")]
    InvalidGeometry { width: f32, height: f32 },

    #[error("Layout did not finish before its deadline")]
    DeadlineExceeded,
}

pub type Result<T> = std::result::Result<T, LayoutError>;

/// Paginating layout engine
pub struct LayoutEngine<'a> {
    fonts: &'a FontContext,
    images: &'a dyn ImageProvider,
    deadline: Option<Instant>,
}

impl<'a> LayoutEngine<'a> {
    pub fn new(fonts: &'a FontContext) -> Self {
        Self {
            fonts,
            images: &NoImages,
            deadline: None,
        }
    }

    /// Give up with [`LayoutError::DeadlineExceeded`] once `deadline` passes
    pub fn with_deadline(mut self, deadline: Instant) -> Self {
        self.deadline = Some(deadline);
        self
    }

    /// Use `images` for intrinsic image sizes
    pub fn with_images(mut self, images: &'a dyn ImageProvider) -> Self {
        self.images = images;
        self
    }

    /// Lay out `styled` onto pages of `geometry`
    pub fn layout(&self, styled: &StyledDocument, geometry: PageGeometry) -> Result<Layout> {
        if !geometry.is_valid() {
            return Err(LayoutError::InvalidGeometry {
                width: geometry.content_width(),
                height: geometry.content_height(),
            });
        }

        let mut flow = Flow::new(styled, self.fonts, self.images, geometry);
        flow.set_deadline(self.deadline);
        let background = canvas_background(styled, &mut flow);
        flow.layout_root();
        if flow.expired() {
            return Err(LayoutError::DeadlineExceeded);
        }

        let count = flow.page_index() + 1;
        let running = margin_box_runs(&mut flow, &styled.page_setup().margin_boxes, count);

        let overflows = std::mem::take(&mut flow.overflows);
        let warnings = std::mem::take(&mut flow.warnings);
        let mut pages = flow.into_pages();
        for page in &mut pages {
            page.background = background;
        }
        for (index, text_box) in running {
            if let Some(page) = pages.get_mut(index) {
                page.boxes.push(text_box);
            }
        }

        tracing::debug!("laid out {} page(s), {} overflow(s)", pages.len(), overflows.len());
        Ok(Layout {
            pages,
            overflows,
            warnings,
        })
    }
}

/// Lay out a styled document with its own page setup
pub fn layout_document(styled: &StyledDocument, fonts: &FontContext) -> Result<Layout> {
    LayoutEngine::new(fonts).layout(styled, styled.page_setup().geometry)
}

/// Canvas color from `<html>`, or `<body>` when the root has none; the
/// element it came from no longer paints its own background
fn canvas_background(styled: &StyledDocument, flow: &mut Flow<'_>) -> Option<Color> {
    let doc = styled.document();
    for node in [doc.document_element(), doc.body()] {
        if !node.is_valid() {
            continue;
        }
        if let Some(style) = styled.style(node) {
            if !style.background_color.is_transparent() {
                flow.canvas_node = Some(node);
                return Some(style.background_color);
            }
        }
    }
    None
}

/// Running headers and footers for every page, once the page count is
/// known
fn margin_box_runs(flow: &mut Flow<'_>, boxes: &[MarginBox], count: usize) -> Vec<(usize, LayoutBox)> {
    let geometry = flow.geometry;
    let (left, right) = (geometry.margin.left, geometry.width - geometry.margin.right);
    let mut runs = Vec::new();

    for mbox in boxes {
        let style = ComputedStyle {
            font_families: mbox.font_families.clone(),
            font_size: mbox.font_size,
            font_weight: mbox.font_weight,
            color: mbox.color,
            ..ComputedStyle::default()
        };
        let font = flow.font_for(&style);
        let middle = if mbox.position.is_top() {
            geometry.margin.top / 2.0
        } else {
            geometry.height - geometry.margin.bottom / 2.0
        };
        let baseline = middle + style.font_size * 0.35;

        for index in 0..count {
            let text = mbox.text_for(index + 1, count);
            if text.is_empty() {
                continue;
            }
            let width = measure(&font, &text, style.font_size, 0.0);
            let x = match mbox.position {
                MarginBoxPosition::TopLeft | MarginBoxPosition::BottomLeft => left,
                MarginBoxPosition::TopCenter | MarginBoxPosition::BottomCenter => (left + right - width) / 2.0,
                MarginBoxPosition::TopRight | MarginBoxPosition::BottomRight => right - width,
            };
            if let Some(text_box) = inline::text_box(None, font.clone(), &style, x, baseline, &text, &mut flow.warnings) {
                runs.push((index, text_box));
            }
        }
    }
    runs
}

#[cfg(test)]
mod tests {
    use super::*;
    use press_css::{Edges, StyleResolver};

    #[test]
    fn test_invalid_geometry_rejected() {
        let doc = press_html::parse("<p>x</p>").unwrap();
        let styled = StyleResolver::new().resolve(doc);
        let fonts = FontContext::builtin_only();
        let geometry = PageGeometry::new(100.0, 100.0, Edges::all(60.0));
        let err = LayoutEngine::new(&fonts).layout(&styled, geometry).unwrap_err();
        assert!(matches!(err, LayoutError::InvalidGeometry { .. }));
    }

    #[test]
    fn test_empty_document_has_one_page() {
        let doc = press_html::parse("<html><body></body></html>").unwrap();
        let styled = StyleResolver::new().resolve(doc);
        let fonts = FontContext::builtin_only();
        let layout = layout_document(&styled, &fonts).unwrap();
        assert_eq!(layout.page_count(), 1);
        assert_eq!(layout.boxes().count(), 0);
    }

    #[test]
    fn test_body_background_moves_to_canvas() {
        let doc = press_html::parse(r#"<body style="background-color: #ff0000"><p>x</p></body>"#).unwrap();
        let styled = StyleResolver::new().resolve(doc);
        let fonts = FontContext::builtin_only();
        let layout = layout_document(&styled, &fonts).unwrap();
        assert_eq!(layout.pages[0].background, Some(Color::rgb(255, 0, 0)));
        assert!(!layout.boxes().any(|b| matches!(b.kind, BoxKind::Block(_))));
    }
}
