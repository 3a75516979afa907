//! HTML5 Parser implementation
//!
//! Parses into html5ever's RcDom, then copies the result into the arena
//! tree. The copy uses an explicit work stack so deeply nested input cannot
//! exhaust the call stack.

use html5ever::parse_document;
use html5ever::tendril::TendrilSink;
use markup5ever_rcdom::{Handle, NodeData as RcNodeData, RcDom};
use press_dom::{Document, DomTree, ElementData, ElementKind, NodeId};

use crate::{HtmlError, Result};

/// HTML5 parser
pub struct HtmlParser;

impl HtmlParser {
    /// Create a new HTML parser
    pub fn new() -> Self {
        Self
    }

    /// Parse an HTML string into a Document
    pub fn parse(&self, html: &str) -> Result<Document> {
        if html.trim().is_empty() {
            return Err(HtmlError::EmptyDocument);
        }

        let dom = parse_document(RcDom::default(), Default::default())
            .from_utf8()
            .read_from(&mut html.as_bytes())?;

        let mut tree = DomTree::new();
        convert(&dom.document, &mut tree);

        tracing::debug!("Parsed {} nodes", tree.len());
        Ok(Document::from_tree(tree))
    }
}

impl Default for HtmlParser {
    fn default() -> Self {
        Self::new()
    }
}

/// Copy an RcDom subtree below the arena root
fn convert(document: &Handle, tree: &mut DomTree) {
    let mut stack: Vec<(Handle, NodeId)> = document
        .children
        .borrow()
        .iter()
        .rev()
        .map(|child| (child.clone(), NodeId::ROOT))
        .collect();

    while let Some((handle, parent)) = stack.pop() {
        let id = match &handle.data {
            RcNodeData::Text { contents } => {
                let text = contents.borrow();
                Some(tree.create_text(&text))
            }
            RcNodeData::Element { name, attrs, .. } => {
                let mut elem = ElementData::new(ElementKind::from_tag(&name.local));
                for attr in attrs.borrow().iter() {
                    elem.set_attr(&attr.name.local, attr.value.to_string());
                }
                Some(tree.create_element_with(elem))
            }
            // Doctype, comments and processing instructions carry nothing to render
            _ => None,
        };

        let Some(id) = id else { continue };
        if let Err(err) = tree.append_child(parent, id) {
            tracing::warn!("dropping node from parse tree: {}", err);
            continue;
        }

        let children = handle.children.borrow();
        for child in children.iter().rev() {
            stack.push((child.clone(), id));
        }
    }
}
