//! Painter - paints laid-out pages into a PDF document
//!
//! Layout uses a top-left origin; PDF user space starts bottom-left, so
//! every y is flipped against the page height while painting.

use std::collections::HashMap;
use std::time::Instant;

use pdf_writer::{Content, Filter, Name, Pdf, Rect as PdfRect, Ref, Str, TextStr};
use press_css::{BorderStyle, Color};
use press_layout::{BlockDecoration, BoxKind, Page, Rect, TextRun};

use crate::fonts::FontRegistry;
use crate::images::ResourceSet;
use crate::{PaintError, Result};

/// Output settings
#[derive(Debug, Clone, PartialEq)]
pub struct PaintOptions {
    /// Flate-compress page content streams
    pub compress: bool,
    /// Document title for the info dictionary
    pub title: Option<String>,
}

impl Default for PaintOptions {
    fn default() -> Self {
        Self {
            compress: true,
            title: None,
        }
    }
}

/// Image XObjects in first-use order
#[derive(Debug, Default)]
struct ImageRegistry {
    order: Vec<String>,
    index: HashMap<String, usize>,
}

impl ImageRegistry {
    fn use_image(&mut self, src: &str) -> String {
        let next = self.order.len();
        let index = *self.index.entry(src.to_string()).or_insert_with(|| {
            self.order.push(src.to_string());
            next
        });
        format!("Im{}", index + 1)
    }
}

/// Painter for laid-out pages
#[derive(Debug, Clone, Default)]
pub struct Painter {
    options: PaintOptions,
    deadline: Option<Instant>,
}

impl Painter {
    pub fn new(options: PaintOptions) -> Self {
        Self { options, deadline: None }
    }

    /// Give up with [`PaintError::DeadlineExceeded`] once `deadline` passes
    pub fn with_deadline(mut self, deadline: Instant) -> Self {
        self.deadline = Some(deadline);
        self
    }

    pub fn options(&self) -> &PaintOptions {
        &self.options
    }

    /// Paint `pages` into a complete PDF file
    pub fn paint(&self, pages: &[Page], resources: &ResourceSet) -> Result<Vec<u8>> {
        if pages.is_empty() {
            return Err(PaintError::NoPages);
        }

        let mut pdf = Pdf::new();
        let mut alloc = Ref::new(1);
        let catalog_id = alloc.bump();
        let tree_id = alloc.bump();

        let mut fonts = FontRegistry::default();
        let mut images = ImageRegistry::default();
        let mut page_ids = Vec::with_capacity(pages.len());

        for page in pages {
            if self.deadline.is_some_and(|d| Instant::now() >= d) {
                return Err(PaintError::DeadlineExceeded);
            }
            let page_id = alloc.bump();
            let content_id = alloc.bump();
            let content = paint_page(page, &mut fonts, &mut images, resources);
            let raw = content.finish();
            if self.options.compress {
                let compressed = miniz_oxide::deflate::compress_to_vec_zlib(&raw, 6);
                pdf.stream(content_id, &compressed).filter(Filter::FlateDecode);
            } else {
                pdf.stream(content_id, &raw);
            }
            page_ids.push((page_id, content_id));
        }

        let font_refs = fonts.write(&mut pdf, &mut alloc);
        let mut image_refs = Vec::with_capacity(images.order.len());
        for (i, src) in images.order.iter().enumerate() {
            if let Some(image) = resources.get(src) {
                let id = alloc.bump();
                image.write(&mut pdf, &mut alloc, id);
                image_refs.push((format!("Im{}", i + 1), id));
            }
        }

        for (page, (page_id, content_id)) in pages.iter().zip(&page_ids) {
            let mut writer = pdf.page(*page_id);
            writer
                .media_box(PdfRect::new(0.0, 0.0, page.geometry.width, page.geometry.height))
                .parent(tree_id)
                .contents(*content_id);
            let mut res = writer.resources();
            if !font_refs.is_empty() {
                let mut dict = res.fonts();
                for (name, id) in &font_refs {
                    dict.pair(Name(name.as_bytes()), *id);
                }
            }
            if !image_refs.is_empty() {
                let mut dict = res.x_objects();
                for (name, id) in &image_refs {
                    dict.pair(Name(name.as_bytes()), *id);
                }
            }
        }

        pdf.pages(tree_id)
            .kids(page_ids.iter().map(|(id, _)| *id))
            .count(pages.len() as i32);
        pdf.catalog(catalog_id).pages(tree_id);

        let info_id = alloc.bump();
        let mut info = pdf.document_info(info_id);
        info.producer(TextStr("Press"));
        if let Some(title) = self.options.title.as_deref().filter(|t| !t.trim().is_empty()) {
            info.title(TextStr(title.trim()));
        }
        drop(info);

        let bytes = pdf.finish();
        tracing::debug!(
            "painted {} page(s) with {} font(s) and {} image(s): {} bytes",
            pages.len(),
            fonts.len(),
            image_refs.len(),
            bytes.len()
        );
        Ok(bytes)
    }
}

fn paint_page(page: &Page, fonts: &mut FontRegistry, images: &mut ImageRegistry, resources: &ResourceSet) -> Content {
    let mut content = Content::new();
    let height = page.geometry.height;

    if let Some(color) = page.background.filter(|c| !c.is_transparent()) {
        fill_rect(&mut content, height, Rect::new(0.0, 0.0, page.geometry.width, height), color);
    }

    for layout_box in &page.boxes {
        match &layout_box.kind {
            BoxKind::Block(decoration) => paint_block(&mut content, height, layout_box.rect, decoration),
            BoxKind::Image { src } => {
                if !resources.contains(src) {
                    tracing::warn!("image {:.48} was laid out but is not available", src);
                    continue;
                }
                let name = images.use_image(src);
                let r = layout_box.rect;
                content.save_state();
                content.transform([r.width, 0.0, 0.0, r.height, r.x, height - r.bottom()]);
                content.x_object(Name(name.as_bytes()));
                content.restore_state();
            }
            BoxKind::Text(run) => paint_text(&mut content, height, layout_box.rect, run, fonts),
        }
    }
    content
}

fn fill_rect(content: &mut Content, page_height: f32, rect: Rect, color: Color) {
    let (r, g, b) = color.to_unit_rgb();
    content.set_fill_rgb(r, g, b);
    content.rect(rect.x, page_height - rect.bottom(), rect.width, rect.height);
    content.fill_nonzero();
}

fn paint_block(content: &mut Content, page_height: f32, rect: Rect, decoration: &BlockDecoration) {
    if !decoration.background.is_transparent() {
        fill_rect(content, page_height, rect, decoration.background);
    }

    let border = decoration.border;
    let sides = [
        (border.top, decoration.border_style.top, decoration.border_color.top, Rect::new(rect.x, rect.y, rect.width, border.top)),
        (
            border.right,
            decoration.border_style.right,
            decoration.border_color.right,
            Rect::new(rect.right() - border.right, rect.y, border.right, rect.height),
        ),
        (
            border.bottom,
            decoration.border_style.bottom,
            decoration.border_color.bottom,
            Rect::new(rect.x, rect.bottom() - border.bottom, rect.width, border.bottom),
        ),
        (border.left, decoration.border_style.left, decoration.border_color.left, Rect::new(rect.x, rect.y, border.left, rect.height)),
    ];
    for (width, style, color, side) in sides {
        if width > 0.0 && !color.is_transparent() {
            paint_border_side(content, page_height, side, width, style, color);
        }
    }
}

/// Paint one border side occupying `side`
fn paint_border_side(content: &mut Content, page_height: f32, side: Rect, width: f32, style: BorderStyle, color: Color) {
    match style {
        BorderStyle::None => {}
        BorderStyle::Solid => fill_rect(content, page_height, side, color),
        BorderStyle::Double => {
            let third = width / 3.0;
            let horizontal = side.width >= side.height;
            let (first, second) = if horizontal {
                (
                    Rect::new(side.x, side.y, side.width, third),
                    Rect::new(side.x, side.bottom() - third, side.width, third),
                )
            } else {
                (
                    Rect::new(side.x, side.y, third, side.height),
                    Rect::new(side.right() - third, side.y, third, side.height),
                )
            };
            fill_rect(content, page_height, first, color);
            fill_rect(content, page_height, second, color);
        }
        BorderStyle::Dashed | BorderStyle::Dotted => {
            let (r, g, b) = color.to_unit_rgb();
            let dash = if style == BorderStyle::Dashed { [width * 3.0, width * 2.0] } else { [width, width] };
            let horizontal = side.width >= side.height;
            let (x1, y1, x2, y2) = if horizontal {
                let y = side.y + side.height / 2.0;
                (side.x, y, side.right(), y)
            } else {
                let x = side.x + side.width / 2.0;
                (x, side.y, x, side.bottom())
            };
            content.save_state();
            content.set_stroke_rgb(r, g, b);
            content.set_line_width(width);
            content.set_dash_pattern(dash, 0.0);
            content.move_to(x1, page_height - y1);
            content.line_to(x2, page_height - y2);
            content.stroke();
            content.restore_state();
        }
    }
}

fn paint_text(content: &mut Content, page_height: f32, rect: Rect, run: &TextRun, fonts: &mut FontRegistry) {
    if run.shaped.is_empty() || run.color.is_transparent() {
        return;
    }
    let size = run.font_size;
    let index = fonts.record(&run.font, &run.shaped);
    let name = FontRegistry::resource_name(index);
    let (r, g, b) = run.color.to_unit_rgb();

    content.set_fill_rgb(r, g, b);
    content.begin_text();
    content.set_font(Name(name.as_bytes()), size);
    content.set_text_matrix([1.0, 0.0, 0.0, 1.0, rect.x, page_height - run.baseline]);
    {
        let mut shown = content.show_positioned();
        let mut items = shown.items();
        let mut buf = Vec::new();
        for glyph in &run.shaped.glyphs {
            if glyph.x_offset != 0.0 {
                flush(&mut items, &mut buf);
                items.adjust(-glyph.x_offset * 1000.0 / size);
            }
            fonts.encode(index, glyph.id, &mut buf);

            // TJ adjustments are in thousandths of text space; positive moves left
            let natural = fonts.natural_advance(index, glyph.id, size);
            let adjust = (natural - glyph.x_advance + glyph.x_offset) * 1000.0 / size;
            if adjust.abs() > 0.01 {
                flush(&mut items, &mut buf);
                items.adjust(adjust);
            }
        }
        flush(&mut items, &mut buf);
    }
    content.end_text();

    let thickness = (size / 18.0).max(0.5);
    if run.decoration.underline {
        let y = run.baseline + size * 0.12;
        fill_rect(content, page_height, Rect::new(rect.x, y, rect.width, thickness), run.color);
    }
    if run.decoration.line_through {
        let y = run.baseline - size * 0.3;
        fill_rect(content, page_height, Rect::new(rect.x, y, rect.width, thickness), run.color);
    }
}

fn flush(items: &mut pdf_writer::writers::PositionedItems<'_>, buf: &mut Vec<u8>) {
    if !buf.is_empty() {
        items.show(Str(buf.as_slice()));
        buf.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use press_css::{Edges, PageGeometry};
    use press_layout::LayoutBox;
    use press_text::{FontHandle, shape};

    fn page_with(boxes: Vec<LayoutBox>) -> Page {
        let mut page = Page::new(0, PageGeometry::new(200.0, 300.0, Edges::all(20.0)));
        page.boxes = boxes;
        page
    }

    fn text_box(text: &str, x: f32, baseline: f32) -> LayoutBox {
        let font = FontHandle::Builtin { bold: false, italic: false };
        let shaped = shape(&font, text, 12.0, 0.0).unwrap();
        LayoutBox {
            node: None,
            rect: Rect::new(x, baseline - 9.0, shaped.width, 12.0),
            kind: BoxKind::Text(TextRun {
                font,
                font_size: 12.0,
                color: Color::BLACK,
                baseline,
                decoration: Default::default(),
                shaped,
            }),
        }
    }

    fn uncompressed() -> Painter {
        Painter::new(PaintOptions {
            compress: false,
            title: None,
        })
    }

    #[test]
    fn test_no_pages_is_an_error() {
        let err = Painter::default().paint(&[], &ResourceSet::new()).unwrap_err();
        assert!(matches!(err, PaintError::NoPages));
    }

    #[test]
    fn test_text_is_drawn_with_flipped_baseline() {
        let page = page_with(vec![text_box("Hello", 20.0, 40.0)]);
        let bytes = uncompressed().paint(&[page], &ResourceSet::new()).unwrap();
        let pdf = String::from_utf8_lossy(&bytes);
        assert!(pdf.contains("(Hello)"));
        assert!(pdf.contains("1 0 0 1 20 260 Tm"));
        assert!(pdf.contains("/F1 12 Tf"));
    }

    #[test]
    fn test_background_fills_page() {
        let mut page = page_with(Vec::new());
        page.background = Some(Color::rgb(255, 0, 0));
        let bytes = uncompressed().paint(&[page], &ResourceSet::new()).unwrap();
        let pdf = String::from_utf8_lossy(&bytes);
        assert!(pdf.contains("1 0 0 rg"));
        assert!(pdf.contains("0 0 200 300 re"));
    }

    #[test]
    fn test_image_registry_names_in_first_use_order() {
        let mut images = ImageRegistry::default();
        assert_eq!(images.use_image("a.png"), "Im1");
        assert_eq!(images.use_image("b.png"), "Im2");
        assert_eq!(images.use_image("a.png"), "Im1");
        assert_eq!(images.order, vec!["a.png", "b.png"]);
    }

    #[test]
    fn test_expired_deadline() {
        let painter = uncompressed().with_deadline(Instant::now());
        let err = painter.paint(&[page_with(Vec::new())], &ResourceSet::new()).unwrap_err();
        assert!(matches!(err, PaintError::DeadlineExceeded));
    }

    #[test]
    fn test_title_in_info_dictionary() {
        let painter = Painter::new(PaintOptions {
            compress: true,
            title: Some("Field Guide".into()),
        });
        let bytes = painter.paint(&[page_with(Vec::new())], &ResourceSet::new()).unwrap();
        let pdf = String::from_utf8_lossy(&bytes);
        assert!(pdf.contains("/Title (Field Guide)"));
        assert!(pdf.contains("/Producer (Press)"));
    }
}
