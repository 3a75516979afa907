//! Pagination state
//!
//! [`Flow`] owns the page list while the document is laid out top to
//! bottom. It tracks the running cursor on the current page, the collapsed
//! margin waiting to be applied, and the decorated blocks that are still
//! open, so their backgrounds and borders can be cut into one fragment per
//! page.

use std::collections::HashMap;
use std::time::Instant;

use press_css::{ComputedStyle, FontSlant, PageGeometry, StyledDocument};
use press_dom::NodeId;
use press_text::{FontContext, FontHandle, FontQuery};

use crate::box_model::Rect;
use crate::image::ImageProvider;
use crate::page::{BlockDecoration, BoxKind, LayoutBox, LayoutOverflow, Page};

/// Slack for float accumulation in fit checks
pub(crate) const EPSILON: f32 = 0.01;

/// Adjoining vertical margins, collapsed as they accumulate
#[derive(Debug, Clone, Copy, Default)]
struct PendingMargin {
    positive: f32,
    negative: f32,
}

impl PendingMargin {
    fn add(&mut self, margin: f32) {
        if margin >= 0.0 {
            self.positive = self.positive.max(margin);
        } else {
            self.negative = self.negative.min(margin);
        }
    }

    fn take(&mut self) -> f32 {
        let value = self.positive + self.negative;
        *self = Self::default();
        value
    }
}

/// A block whose decoration is still being laid out
#[derive(Debug, Clone)]
struct OpenBlock {
    node: NodeId,
    decoration: BlockDecoration,
    x: f32,
    width: f32,
    /// Top of the current fragment
    start_y: f32,
    /// Box index on the current page where the fragment is inserted
    insert_at: usize,
    first_fragment: bool,
    painted: bool,
}

/// List marker waiting for the first line of its item
#[derive(Debug, Clone)]
pub(crate) struct PendingMarker {
    pub node: NodeId,
    pub text: String,
    pub style: ComputedStyle,
    /// Left content edge of the list item
    pub content_x: f32,
}

/// Saved state for rolling back a `page-break-inside: avoid` attempt
pub(crate) struct Snapshot {
    page_count: usize,
    current: Page,
    cursor: f32,
    pending: PendingMargin,
    page_has_content: bool,
    forced_break: bool,
    open: Vec<OpenBlock>,
    overflows: usize,
    warnings: usize,
    marker: Option<PendingMarker>,
}

impl Snapshot {
    /// Whether the content since the snapshot started at the top of a page
    pub fn was_at_page_start(&self) -> bool {
        !self.page_has_content
    }
}

pub(crate) struct Flow<'a> {
    pub styled: &'a StyledDocument,
    pub fonts: &'a FontContext,
    pub images: &'a dyn ImageProvider,
    pub geometry: PageGeometry,
    pub overflows: Vec<LayoutOverflow>,
    pub warnings: Vec<String>,
    pub marker: Option<PendingMarker>,
    /// Element whose background is painted on the page canvas instead
    pub canvas_node: Option<NodeId>,
    pages: Vec<Page>,
    cursor: f32,
    pending: PendingMargin,
    page_has_content: bool,
    forced_break: bool,
    open: Vec<OpenBlock>,
    font_cache: HashMap<FontQuery, FontHandle>,
    deadline: Option<Instant>,
    expired: bool,
}

impl<'a> Flow<'a> {
    pub fn new(
        styled: &'a StyledDocument,
        fonts: &'a FontContext,
        images: &'a dyn ImageProvider,
        geometry: PageGeometry,
    ) -> Self {
        Self {
            styled,
            fonts,
            images,
            geometry,
            overflows: Vec::new(),
            warnings: Vec::new(),
            marker: None,
            canvas_node: None,
            pages: vec![Page::new(0, geometry)],
            cursor: geometry.margin.top,
            pending: PendingMargin::default(),
            page_has_content: false,
            forced_break: false,
            open: Vec::new(),
            font_cache: HashMap::new(),
            deadline: None,
            expired: false,
        }
    }

    /// Stop laying out once `deadline` has passed
    pub fn set_deadline(&mut self, deadline: Option<Instant>) {
        self.deadline = deadline;
    }

    /// Whether the deadline has passed; sticky once true
    pub fn expired(&mut self) -> bool {
        if !self.expired && self.deadline.is_some_and(|d| Instant::now() >= d) {
            tracing::debug!("layout deadline passed on page {}", self.page_index() + 1);
            self.expired = true;
        }
        self.expired
    }

    pub fn page_top(&self) -> f32 {
        self.geometry.margin.top
    }

    pub fn page_bottom(&self) -> f32 {
        self.geometry.height - self.geometry.margin.bottom
    }

    pub fn cursor(&self) -> f32 {
        self.cursor
    }

    pub fn page_index(&self) -> usize {
        self.pages.len() - 1
    }

    fn current_page(&mut self) -> &mut Page {
        let last = self.pages.len() - 1;
        &mut self.pages[last]
    }

    pub fn push_box(&mut self, node: Option<NodeId>, rect: Rect, kind: BoxKind) {
        self.current_page().boxes.push(LayoutBox { node, rect, kind });
    }

    // ------------------------------------------------------------------
    // Margins and breaks
    // ------------------------------------------------------------------

    pub fn add_margin(&mut self, margin: f32) {
        self.pending.add(margin);
    }

    /// Apply the collapsed pending margin; margins adjoining a page break
    /// are truncated
    pub fn flush_margin(&mut self) {
        let margin = self.pending.take();
        let at_break = self.page_index() > 0 && !self.page_has_content && self.cursor <= self.page_top() + EPSILON;
        if !at_break {
            self.cursor += margin;
        }
    }

    /// Request a page break before the next placed content
    pub fn request_break(&mut self) {
        self.forced_break = true;
    }

    /// Perform a requested break if content exists on the current page
    pub fn apply_forced_break(&mut self) {
        if std::mem::take(&mut self.forced_break) && (self.page_has_content || self.cursor > self.page_top() + EPSILON) {
            self.new_page();
        }
    }

    /// Close the current page and continue on a fresh one
    pub fn new_page(&mut self) {
        let end = self.cursor;
        for i in (0..self.open.len()).rev() {
            let block = self.open[i].clone();
            self.emit_fragment(&block, end, false);
        }

        let index = self.pages.len();
        self.pages.push(Page::new(index, self.geometry));
        self.cursor = self.page_top();
        self.pending = PendingMargin::default();
        self.page_has_content = false;

        let top = self.cursor;
        for block in &mut self.open {
            block.start_y = top;
            block.insert_at = 0;
            block.first_fragment = false;
        }
        tracing::trace!("page break, now on page {}", index + 1);
    }

    // ------------------------------------------------------------------
    // Placement
    // ------------------------------------------------------------------

    /// Reserve `height` for one unbreakable item and return its top y
    ///
    /// Items taller than a page's content area are recorded as overflow and
    /// get `None`.
    pub fn place(&mut self, node: NodeId, height: f32) -> Option<f32> {
        if height > self.geometry.content_height() + EPSILON {
            tracing::warn!("{:?} is {:.1}pt tall and cannot fit on any page", node, height);
            self.overflows.push(LayoutOverflow { node, height });
            self.warnings.push(format!("content taller than a page ({height:.1}pt) was skipped"));
            return None;
        }

        self.apply_forced_break();
        self.flush_margin();
        let page_used = self.page_has_content || self.cursor > self.page_top() + EPSILON;
        if self.cursor + height > self.page_bottom() + EPSILON && page_used {
            self.new_page();
        }
        let y = self.cursor;
        self.cursor += height;
        self.page_has_content = true;
        Some(y)
    }

    /// Consume breakable space (padding, borders, explicit heights),
    /// continuing on following pages as needed
    pub fn advance(&mut self, height: f32) {
        if height <= 0.0 {
            return;
        }
        self.apply_forced_break();
        self.flush_margin();
        let mut remaining = height;
        loop {
            let room = (self.page_bottom() - self.cursor).max(0.0);
            if remaining <= room + EPSILON {
                self.cursor += remaining;
                break;
            }
            remaining -= room;
            self.cursor = self.page_bottom();
            self.new_page();
        }
        self.page_has_content = true;
    }

    // ------------------------------------------------------------------
    // Block decorations
    // ------------------------------------------------------------------

    /// Open a decorated block at the cursor; its border box spans `x..x+width`
    pub fn open_block(&mut self, node: NodeId, decoration: BlockDecoration, x: f32, width: f32, painted: bool) {
        let insert_at = self.current_page().boxes.len();
        self.open.push(OpenBlock {
            node,
            decoration,
            x,
            width,
            start_y: self.cursor,
            insert_at,
            first_fragment: true,
            painted,
        });
    }

    /// Close the innermost open block at the cursor
    pub fn close_block(&mut self) {
        if let Some(block) = self.open.pop() {
            let end = self.cursor;
            self.emit_fragment(&block, end, true);
        }
    }

    fn emit_fragment(&mut self, block: &OpenBlock, end_y: f32, last: bool) {
        if !block.painted || !block.decoration.is_visible() {
            return;
        }
        let top = block.start_y.max(self.page_top());
        let bottom = end_y.min(self.page_bottom());
        if bottom - top <= 0.0 {
            return;
        }

        let mut decoration = block.decoration.clone();
        if !block.first_fragment {
            decoration.border.top = 0.0;
        }
        if !last {
            decoration.border.bottom = 0.0;
        }
        let rect = Rect::new(block.x, top, block.width, bottom - top);
        let page = self.current_page();
        let at = block.insert_at.min(page.boxes.len());
        page.boxes.insert(
            at,
            LayoutBox {
                node: Some(block.node),
                rect,
                kind: BoxKind::Block(decoration),
            },
        );
    }

    // ------------------------------------------------------------------
    // Rollback
    // ------------------------------------------------------------------

    pub fn snapshot(&mut self) -> Snapshot {
        Snapshot {
            page_count: self.pages.len(),
            current: self.current_page().clone(),
            cursor: self.cursor,
            pending: self.pending,
            page_has_content: self.page_has_content,
            forced_break: self.forced_break,
            open: self.open.clone(),
            overflows: self.overflows.len(),
            warnings: self.warnings.len(),
            marker: self.marker.clone(),
        }
    }

    /// Pages started since the snapshot
    pub fn pages_since(&self, snapshot: &Snapshot) -> usize {
        self.pages.len() - snapshot.page_count
    }

    pub fn restore(&mut self, snapshot: Snapshot) {
        self.pages.truncate(snapshot.page_count);
        *self.current_page() = snapshot.current;
        self.cursor = snapshot.cursor;
        self.pending = snapshot.pending;
        self.page_has_content = snapshot.page_has_content;
        self.forced_break = snapshot.forced_break;
        self.open = snapshot.open;
        self.overflows.truncate(snapshot.overflows);
        self.warnings.truncate(snapshot.warnings);
        self.marker = snapshot.marker;
    }

    // ------------------------------------------------------------------
    // Fonts
    // ------------------------------------------------------------------

    /// Resolved font for a style, substituting on failure
    pub fn font_for(&mut self, style: &ComputedStyle) -> FontHandle {
        let query = FontQuery::from_families(&style.font_families, style.font_weight, style.font_style == FontSlant::Italic);
        self.font_for_query(query)
    }

    pub fn font_for_query(&mut self, query: FontQuery) -> FontHandle {
        if let Some(handle) = self.font_cache.get(&query) {
            return handle.clone();
        }
        let (handle, err) = self.fonts.resolve_or_fallback(&query);
        if let Some(err) = err {
            self.warnings.push(format!("{err}; substituted {}", handle.name()));
        }
        self.font_cache.insert(query, handle.clone());
        handle
    }

    pub fn into_pages(self) -> Vec<Page> {
        self.pages
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::image::NoImages;
    use press_css::{Color, Edges, StyleResolver};

    fn styled() -> StyledDocument {
        let doc = press_html::parse("<p>x</p>").unwrap();
        StyleResolver::new().resolve(doc)
    }

    fn geometry() -> PageGeometry {
        // 100pt content height
        PageGeometry::new(200.0, 140.0, Edges::all(20.0))
    }

    fn decoration() -> BlockDecoration {
        BlockDecoration {
            background: Color::rgb(200, 200, 200),
            border: Edges::all(1.0),
            border_style: Edges::all(press_css::BorderStyle::Solid),
            border_color: Edges::all(Color::BLACK),
        }
    }

    #[test]
    fn test_place_breaks_pages() {
        let doc = styled();
        let fonts = FontContext::builtin_only();
        let mut flow = Flow::new(&doc, &fonts, &NoImages, geometry());
        let node = NodeId::ROOT;
        assert_eq!(flow.place(node, 60.0), Some(20.0));
        assert_eq!(flow.place(node, 60.0), Some(20.0));
        assert_eq!(flow.page_index(), 1);
    }

    #[test]
    fn test_too_tall_item_is_overflow() {
        let doc = styled();
        let fonts = FontContext::builtin_only();
        let mut flow = Flow::new(&doc, &fonts, &NoImages, geometry());
        assert_eq!(flow.place(NodeId::ROOT, 150.0), None);
        assert_eq!(flow.overflows.len(), 1);
        assert_eq!(flow.cursor(), 20.0);
    }

    #[test]
    fn test_margins_collapse_and_truncate_at_break() {
        let doc = styled();
        let fonts = FontContext::builtin_only();
        let mut flow = Flow::new(&doc, &fonts, &NoImages, geometry());
        flow.add_margin(10.0);
        flow.add_margin(6.0);
        flow.place(NodeId::ROOT, 10.0);
        assert_eq!(flow.cursor(), 40.0);

        flow.new_page();
        flow.add_margin(10.0);
        assert_eq!(flow.place(NodeId::ROOT, 10.0), Some(20.0));
    }

    #[test]
    fn test_large_margin_on_empty_page_moves_item() {
        let doc = styled();
        let fonts = FontContext::builtin_only();
        let mut flow = Flow::new(&doc, &fonts, &NoImages, geometry());
        flow.add_margin(150.0);
        assert_eq!(flow.place(NodeId::ROOT, 12.0), Some(20.0));
        assert_eq!(flow.page_index(), 1);
        assert!(flow.cursor() <= flow.page_bottom());
    }

    #[test]
    fn test_deadline_expires() {
        let doc = styled();
        let fonts = FontContext::builtin_only();
        let mut flow = Flow::new(&doc, &fonts, &NoImages, geometry());
        assert!(!flow.expired());
        flow.set_deadline(Some(Instant::now()));
        assert!(flow.expired());
    }

    #[test]
    fn test_decoration_split_across_pages() {
        let doc = styled();
        let fonts = FontContext::builtin_only();
        let mut flow = Flow::new(&doc, &fonts, &NoImages, geometry());
        flow.open_block(NodeId::ROOT, decoration(), 20.0, 160.0, true);
        flow.place(NodeId::ROOT, 80.0);
        flow.place(NodeId::ROOT, 80.0);
        flow.close_block();

        let pages = flow.into_pages();
        assert_eq!(pages.len(), 2);
        for page in &pages {
            let first = &page.boxes[0];
            assert!(matches!(first.kind, BoxKind::Block(_)));
            assert!(first.rect.height <= 100.0);
        }
        let BoxKind::Block(ref first) = pages[0].boxes[0].kind else { unreachable!() };
        assert_eq!(first.border.bottom, 0.0);
        assert_eq!(first.border.top, 1.0);
        let BoxKind::Block(ref second) = pages[1].boxes[0].kind else { unreachable!() };
        assert_eq!(second.border.top, 0.0);
        assert_eq!(second.border.bottom, 1.0);
    }

    #[test]
    fn test_forced_break_is_lazy() {
        let doc = styled();
        let fonts = FontContext::builtin_only();
        let mut flow = Flow::new(&doc, &fonts, &NoImages, geometry());
        flow.request_break();
        flow.place(NodeId::ROOT, 10.0);
        assert_eq!(flow.page_index(), 0, "no break before the first content");
        flow.request_break();
        flow.place(NodeId::ROOT, 10.0);
        assert_eq!(flow.page_index(), 1);
    }

    #[test]
    fn test_snapshot_restore() {
        let doc = styled();
        let fonts = FontContext::builtin_only();
        let mut flow = Flow::new(&doc, &fonts, &NoImages, geometry());
        flow.place(NodeId::ROOT, 50.0);
        let snap = flow.snapshot();
        flow.place(NodeId::ROOT, 80.0);
        assert_eq!(flow.pages_since(&snap), 1);
        flow.restore(snap);
        assert_eq!(flow.page_index(), 0);
        assert_eq!(flow.cursor(), 70.0);
    }
}
