//! Layout and pagination tests
//!
//! Documents are parsed and styled for real; fonts are restricted to the
//! built-in metrics so positions do not depend on installed fonts.

use std::time::Instant;

use press_css::{Edges, PageGeometry, StyleResolver, StyledDocument, parse_stylesheet};
use press_layout::{BoxKind, Layout, LayoutEngine, LayoutError, TextRun, layout_document};
use press_text::FontContext;

fn styled(html: &str, css: &str) -> StyledDocument {
    let doc = press_html::parse(html).unwrap();
    let mut resolver = StyleResolver::new();
    for sheet in doc.style_sheets() {
        resolver.add_stylesheet(parse_stylesheet(&sheet).unwrap());
    }
    resolver.add_stylesheet(parse_stylesheet(css).unwrap());
    resolver.resolve(doc)
}

fn layout(html: &str, css: &str) -> Layout {
    let fonts = FontContext::builtin_only();
    layout_document(&styled(html, css), &fonts).unwrap()
}

fn layout_on(html: &str, geometry: PageGeometry) -> Layout {
    let fonts = FontContext::builtin_only();
    LayoutEngine::new(&fonts).layout(&styled(html, ""), geometry).unwrap()
}

/// (page index, run) for every text run containing `needle`
fn find_text<'a>(layout: &'a Layout, needle: &str) -> Vec<(usize, &'a TextRun)> {
    layout
        .pages
        .iter()
        .flat_map(|p| p.text_runs().map(move |(_, run)| (p.index, run)))
        .filter(|(_, run)| run.text().contains(needle))
        .collect()
}

fn paragraphs(count: usize) -> String {
    (0..count)
        .map(|i| format!("<p>Paragraph {i} with a handful of words to fill the line.</p>"))
        .collect()
}

// ============================================================================
// Pagination
// ============================================================================

#[test]
fn test_long_document_paginates_within_content_area() {
    let layout = layout(&paragraphs(150), "");
    assert!(layout.page_count() >= 2);

    for page in &layout.pages {
        let g = page.geometry;
        for (rect, _) in page.text_runs() {
            assert!(rect.y >= g.margin.top - 0.01, "run above content area on page {}", page.index);
            assert!(
                rect.bottom() <= g.height - g.margin.bottom + 0.01,
                "run below content area on page {}",
                page.index
            );
        }
    }
}

#[test]
fn test_pages_are_numbered_in_order() {
    let layout = layout(&paragraphs(150), "");
    for (i, page) in layout.pages.iter().enumerate() {
        assert_eq!(page.index, i);
    }
    let first = find_text(&layout, "Paragraph 0 ");
    let last = find_text(&layout, "Paragraph 149 ");
    assert_eq!(first[0].0, 0);
    assert_eq!(last[0].0, layout.page_count() - 1);
}

#[test]
fn test_forced_page_break() {
    let layout = layout(
        r#"<p>first</p><p style="page-break-before: always">second</p><p>third</p>"#,
        "",
    );
    assert_eq!(layout.page_count(), 2);
    assert_eq!(find_text(&layout, "first")[0].0, 0);
    assert_eq!(find_text(&layout, "second")[0].0, 1);
    assert_eq!(find_text(&layout, "third")[0].0, 1);
}

#[test]
fn test_break_before_first_content_adds_no_page() {
    let layout = layout(r#"<h1 style="page-break-before: always">Title</h1>"#, "");
    assert_eq!(layout.page_count(), 1);
}

#[test]
fn test_break_after() {
    let layout = layout(r#"<p style="page-break-after: always">a</p><p>b</p>"#, "");
    assert_eq!(layout.page_count(), 2);
    assert_eq!(find_text(&layout, "b")[0].0, 1);
}

#[test]
fn test_page_break_inside_avoid_keeps_block_together() {
    let mut html = paragraphs(24);
    html.push_str(r#"<div style="page-break-inside: avoid">"#);
    for i in 0..8 {
        html.push_str(&format!("<p>Kept line {i}</p>"));
    }
    html.push_str("</div>");

    let layout = layout(&html, "");
    let pages: Vec<usize> = (0..8).map(|i| find_text(&layout, &format!("Kept line {i}"))[0].0).collect();
    assert!(pages.iter().all(|p| *p == pages[0]), "split across pages: {pages:?}");
}

#[test]
fn test_tall_line_recorded_as_overflow() {
    let geometry = PageGeometry::new(300.0, 200.0, Edges::all(20.0));
    let layout = layout_on(r#"<p style="font-size: 300pt">X</p><p>after</p>"#, geometry);
    assert_eq!(layout.overflows.len(), 1);
    assert!(layout.overflows[0].height > geometry.content_height());
    assert!(find_text(&layout, "X").is_empty());
    assert_eq!(find_text(&layout, "after").len(), 1);
}

#[test]
fn test_large_top_margin_does_not_push_text_off_the_page() {
    let geometry = PageGeometry::new(200.0, 140.0, Edges::all(20.0));
    let layout = layout_on(r#"<p style="margin-top: 150pt">hello</p>"#, geometry);
    let bottom = geometry.height - geometry.margin.bottom;
    for page in &layout.pages {
        for (rect, run) in page.text_runs() {
            assert!(
                rect.y >= geometry.margin.top - 0.01 && rect.bottom() <= bottom + 0.01,
                "{:?} drawn outside the content area at y={} on page {}",
                run.text(),
                rect.y,
                page.index
            );
        }
    }
    assert_eq!(find_text(&layout, "hello").len(), 1);
}

#[test]
fn test_expired_deadline_stops_layout() {
    let doc = styled(&paragraphs(50), "");
    let fonts = FontContext::builtin_only();
    let err = LayoutEngine::new(&fonts)
        .with_deadline(Instant::now())
        .layout(&doc, doc.page_setup().geometry)
        .unwrap_err();
    assert!(matches!(err, LayoutError::DeadlineExceeded));
}

#[test]
fn test_decorated_block_split_into_fragments() {
    let html = format!(r#"<div id="box" style="background-color: #eeeeee">{}</div>"#, paragraphs(150));
    let doc = styled(&html, "");
    let node = doc.document().get_element_by_id("box").unwrap();
    let fonts = FontContext::builtin_only();
    let layout = layout_document(&doc, &fonts).unwrap();
    assert!(layout.page_count() >= 2);

    for page in &layout.pages {
        let fragments: Vec<_> = page
            .boxes
            .iter()
            .filter(|b| b.node == Some(node) && matches!(b.kind, BoxKind::Block(_)))
            .collect();
        assert_eq!(fragments.len(), 1, "page {} has {} fragments", page.index, fragments.len());
        assert!(fragments[0].rect.height <= page.geometry.content_height() + 0.01);
        // painted below the text it contains
        assert!(matches!(page.boxes[0].kind, BoxKind::Block(_)));
    }
}

// ============================================================================
// Inline layout
// ============================================================================

#[test]
fn test_lines_wrap_within_content_width() {
    let text = "word ".repeat(400);
    let layout = layout(&format!("<p>{text}</p>"), "");
    let page = &layout.pages[0];
    let (x, _) = page.geometry.content_origin();
    let right = x + page.geometry.content_width();

    let runs: Vec<_> = page.text_runs().collect();
    assert!(runs.len() > 1);
    for (rect, _) in runs {
        assert!(rect.right() <= right + 0.01);
    }
}

#[test]
fn test_br_starts_new_line() {
    let layout = layout("<p>above<br>below</p>", "");
    let above = find_text(&layout, "above")[0].1;
    let below = find_text(&layout, "below")[0].1;
    assert!(below.baseline > above.baseline);
}

#[test]
fn test_pre_keeps_lines() {
    let layout = layout("<pre>one\ntwo\nthree</pre>", "");
    let baselines: Vec<f32> = ["one", "two", "three"]
        .iter()
        .map(|t| find_text(&layout, t)[0].1.baseline)
        .collect();
    assert!(baselines[0] < baselines[1] && baselines[1] < baselines[2]);
}

#[test]
fn test_center_alignment() {
    let layout = layout(r#"<p style="text-align: center">hi</p>"#, "body { margin: 0 }");
    let page = &layout.pages[0];
    let (x, _) = page.geometry.content_origin();
    let (rect, _) = page.text_runs().next().unwrap();
    let expected = x + (page.geometry.content_width() - rect.width) / 2.0;
    assert!((rect.x - expected).abs() < 0.5);
}

#[test]
fn test_hidden_text_takes_space_but_is_not_drawn() {
    let layout = layout(r#"<p style="visibility: hidden">ghost</p><p>shown</p>"#, "");
    assert!(find_text(&layout, "ghost").is_empty());
    let shown = find_text(&layout, "shown")[0].1;
    let alone = self::layout("<p>shown</p>", "");
    assert!(shown.baseline > find_text(&alone, "shown")[0].1.baseline);
}

#[test]
fn test_display_none_removed() {
    let layout = layout(r#"<p style="display: none">gone</p><p>kept</p>"#, "");
    assert!(find_text(&layout, "gone").is_empty());
    assert_eq!(find_text(&layout, "kept").len(), 1);
}

// ============================================================================
// Lists and running content
// ============================================================================

#[test]
fn test_list_markers_hang_left_of_items() {
    let layout = layout("<ul><li>apple</li><li>pear</li></ul>", "");
    let page = &layout.pages[0];
    let markers: Vec<_> = page.text_runs().filter(|(_, r)| r.text() == "\u{2022}").collect();
    assert_eq!(markers.len(), 2);

    let (item_rect, item) = page.text_runs().find(|(_, r)| r.text() == "apple").unwrap();
    let (marker_rect, marker) = markers[0];
    assert!(marker_rect.right() < item_rect.x);
    assert_eq!(marker.baseline, item.baseline);
}

#[test]
fn test_ordered_list_start() {
    let layout = layout(r#"<ol start="3"><li>c</li><li>d</li></ol>"#, "");
    assert_eq!(find_text(&layout, "3.").len(), 1);
    assert_eq!(find_text(&layout, "4.").len(), 1);
}

#[test]
fn test_running_footer_on_every_page() {
    let css = r#"@page { @bottom-center { content: "Page " counter(page) " of " counter(pages) } }"#;
    let layout = layout(&paragraphs(150), css);
    let n = layout.page_count();
    assert!(n >= 2);

    for page in &layout.pages {
        let label = format!("Page {} of {}", page.index + 1, n);
        let footer = page
            .boxes
            .iter()
            .find(|b| matches!(&b.kind, BoxKind::Text(run) if run.text() == label))
            .unwrap_or_else(|| panic!("missing footer {label:?}"));
        assert!(footer.node.is_none());
        assert!(footer.rect.y > page.geometry.height - page.geometry.margin.bottom);
    }
}
