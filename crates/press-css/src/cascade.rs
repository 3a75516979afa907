//! Style Cascade & Resolver
//!
//! Computes the final styles for DOM elements by:
//! 1. Matching selectors against elements
//! 2. Sorting by importance, origin, specificity and source order
//! 3. Computing typed values, inheriting from the parent's computed style
//!
//! Elements are visited in one explicit pre-order pass, so a parent's
//! computed style always exists before its children are resolved.

use std::collections::BTreeMap;

use press_dom::{Document, DomTree, NodeId};

use crate::computed::{ComputedStyle, DEFAULT_FONT_SIZE, Display};
use crate::page::{PageGeometry, PageSetup};
use crate::ua::user_agent_stylesheet;
use crate::{CssParser, Declaration, Origin, Specificity, Stylesheet};

/// Style resolver - computes styles for a document
pub struct StyleResolver {
    /// Author stylesheets in cascade order
    author_styles: Vec<Stylesheet>,
    default_page: PageGeometry,
}

/// One matched declaration with its cascade sort key
struct Matched<'a> {
    important: bool,
    origin: Origin,
    specificity: Specificity,
    order: usize,
    decl: &'a Declaration,
}

impl StyleResolver {
    pub fn new() -> Self {
        Self {
            author_styles: Vec::new(),
            default_page: PageGeometry::default(),
        }
    }

    /// Page geometry used when no `@page` rule sets one
    pub fn with_page_geometry(mut self, geometry: PageGeometry) -> Self {
        self.default_page = geometry;
        self
    }

    /// Add an author stylesheet; later sheets win ties
    pub fn add_stylesheet(&mut self, stylesheet: Stylesheet) {
        self.author_styles.push(stylesheet);
    }

    /// Resolve styles for every element of `document`
    pub fn resolve(&self, document: Document) -> StyledDocument {
        let tree = document.tree();
        let inline_parser = CssParser::new();
        let mut styles: Vec<Option<ComputedStyle>> = vec![None; tree.len()];
        let mut declared: Vec<BTreeMap<String, String>> = vec![BTreeMap::new(); tree.len()];
        let mut root_font_size = DEFAULT_FONT_SIZE;

        styles[NodeId::ROOT.index()] = Some(ComputedStyle {
            display: Display::Block,
            ..ComputedStyle::default()
        });

        let sheets: Vec<(Origin, &Stylesheet)> = std::iter::once((Origin::UserAgent, user_agent_stylesheet()))
            .chain(self.author_styles.iter().map(|s| (Origin::Author, s)))
            .collect();

        for node in tree.descendants(NodeId::ROOT) {
            let Some(elem) = tree.element(node) else { continue };
            let parent_id = tree.parent(node).unwrap_or(NodeId::ROOT);
            let parent_style = styles[parent_id.index()].clone().unwrap_or_default();

            let inline = elem
                .get_attr("style")
                .map(|s| inline_parser.parse_inline(s))
                .unwrap_or_default();

            let mut matched = Vec::new();
            let mut order = 0usize;
            for (origin, sheet) in &sheets {
                for rule in &sheet.rules {
                    let best = rule
                        .selectors
                        .iter()
                        .filter(|s| s.matches(tree, node))
                        .map(|s| s.specificity)
                        .max();
                    for decl in &rule.declarations {
                        order += 1;
                        if let Some(specificity) = best {
                            matched.push(Matched {
                                important: decl.important,
                                origin: *origin,
                                specificity,
                                order,
                                decl,
                            });
                        }
                    }
                }
            }

            for decl in &inline {
                order += 1;
                matched.push(Matched {
                    important: decl.important,
                    origin: Origin::Inline,
                    specificity: Specificity::default(),
                    order,
                    decl,
                });
            }

            matched.sort_by_key(|m| (m.important, m.origin, m.specificity, m.order));

            let values = &mut declared[node.index()];
            for m in &matched {
                values.insert(m.decl.property.clone(), m.decl.value.clone());
            }

            let style = compute(values, &parent_style, root_font_size);
            if parent_id == NodeId::ROOT {
                root_font_size = style.font_size;
            }
            styles[node.index()] = Some(style);
        }

        let page = PageSetup::from_rules(
            self.author_styles.iter().flat_map(|s| s.pages.iter()),
            self.default_page,
        );

        tracing::debug!(
            "Resolved styles for {} nodes, page {}x{}",
            tree.len(),
            page.geometry.width,
            page.geometry.height
        );

        StyledDocument {
            document,
            styles,
            declared,
            page,
        }
    }
}

impl Default for StyleResolver {
    fn default() -> Self {
        Self::new()
    }
}

/// Turn the winning declared values into a computed style
fn compute(values: &BTreeMap<String, String>, parent: &ComputedStyle, root_font_size: f32) -> ComputedStyle {
    let mut style = ComputedStyle::inherit_from(parent);

    // font-size first (em units), then color (currentColor)
    for first in ["font-size", "color"] {
        if let Some(v) = values.get(first) {
            apply_logged(&mut style, first, v, parent, root_font_size);
        }
    }
    for (property, value) in values {
        if property == "font-size" || property == "color" {
            continue;
        }
        apply_logged(&mut style, property, value, parent, root_font_size);
    }
    style
}

fn apply_logged(style: &mut ComputedStyle, property: &str, value: &str, parent: &ComputedStyle, root_font_size: f32) {
    if !style.apply(property, value, parent, root_font_size) {
        tracing::trace!("ignored declaration {}: {}", property, value);
    }
}

/// A document with resolved styles and page setup
#[derive(Debug, Clone)]
pub struct StyledDocument {
    document: Document,
    styles: Vec<Option<ComputedStyle>>,
    declared: Vec<BTreeMap<String, String>>,
    page: PageSetup,
}

impl StyledDocument {
    pub fn document(&self) -> &Document {
        &self.document
    }

    pub fn tree(&self) -> &DomTree {
        self.document.tree()
    }

    /// Computed style of an element
    pub fn style(&self, node: NodeId) -> Option<&ComputedStyle> {
        self.styles.get(node.index()).and_then(Option::as_ref)
    }

    /// Style governing a node: its own for elements, the nearest styled
    /// ancestor's for text
    pub fn effective_style(&self, node: NodeId) -> Option<&ComputedStyle> {
        self.style(node)
            .or_else(|| self.tree().ancestors(node).find_map(|a| self.style(a)))
    }

    /// Winning cascaded `property -> value` mapping of an element
    pub fn declared(&self, node: NodeId) -> Option<&BTreeMap<String, String>> {
        self.declared.get(node.index())
    }

    /// Page size, margins and margin boxes from `@page` rules
    pub fn page_setup(&self) -> &PageSetup {
        &self.page
    }

    /// Override the page geometry (request options beat `@page`)
    pub fn set_page_geometry(&mut self, geometry: PageGeometry) {
        self.page.geometry = geometry;
    }

    pub fn title(&self) -> Option<String> {
        self.document.title()
    }
}
