//! Document - High-level document API

use crate::{DomTree, ElementKind, NodeId};

/// HTML Document
#[derive(Debug, Clone)]
pub struct Document {
    tree: DomTree,
    html_element: NodeId,
    head_element: NodeId,
    body_element: NodeId,
}

impl Document {
    /// Wrap a parsed tree and locate `html`, `head` and `body`
    pub fn from_tree(tree: DomTree) -> Self {
        let mut doc = Self {
            tree,
            html_element: NodeId::NONE,
            head_element: NodeId::NONE,
            body_element: NodeId::NONE,
        };
        doc.finalize();
        doc
    }

    fn finalize(&mut self) {
        self.html_element = self
            .tree
            .element_children(NodeId::ROOT)
            .find(|&n| self.tree.element(n).is_some_and(|e| e.kind == ElementKind::Html))
            .unwrap_or(NodeId::NONE);

        if self.html_element.is_valid() {
            for child in self.tree.element_children(self.html_element) {
                match self.tree.element(child).map(|e| &e.kind) {
                    Some(ElementKind::Head) => self.head_element = child,
                    Some(ElementKind::Body) => self.body_element = child,
                    _ => {}
                }
            }
        }
    }

    /// Document title from `<title>`, whitespace collapsed
    pub fn title(&self) -> Option<String> {
        let title = self.tree.find_first(&ElementKind::Title)?;
        let text = self.tree.text_content(title);
        let collapsed = text.split_whitespace().collect::<Vec<_>>().join(" ");
        (!collapsed.is_empty()).then_some(collapsed)
    }

    /// Text of every `<style>` element, in document order
    pub fn style_sheets(&self) -> Vec<String> {
        self.tree
            .descendants(NodeId::ROOT)
            .into_iter()
            .filter(|&n| {
                self.tree
                    .element(n)
                    .is_some_and(|e| e.kind == ElementKind::Style && is_print_media(e.get_attr("media")))
            })
            .map(|n| self.tree.text_content(n))
            .collect()
    }

    /// `<html>` element
    pub fn document_element(&self) -> NodeId {
        self.html_element
    }

    /// `<head>` element
    pub fn head(&self) -> NodeId {
        self.head_element
    }

    /// `<body>` element
    pub fn body(&self) -> NodeId {
        self.body_element
    }

    /// Element with the given `id` attribute
    pub fn get_element_by_id(&self, id: &str) -> Option<NodeId> {
        self.tree
            .descendants(NodeId::ROOT)
            .into_iter()
            .find(|&n| self.tree.element(n).and_then(|e| e.id.as_deref()) == Some(id))
    }

    /// Access the DOM tree
    pub fn tree(&self) -> &DomTree {
        &self.tree
    }

    /// Access the DOM tree mutably
    pub fn tree_mut(&mut self) -> &mut DomTree {
        &mut self.tree
    }
}

fn is_print_media(media: Option<&str>) -> bool {
    match media {
        None => true,
        Some(m) => {
            let m = m.to_ascii_lowercase();
            m.trim().is_empty() || m.contains("print") || m.contains("all")
        }
    }
}
